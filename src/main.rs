use anyhow::Result;
use clap::Parser;
use lifeterm::{config, logging, KeyboardStop, Simulator, TerminalSink};
use rand::{rngs::StdRng, SeedableRng};

fn main() -> Result<()> {
    let args = config::Args::parse();
    let settings = config::resolve(&args)?;
    logging::init(logging::log_path(settings.log_file.as_deref()).as_deref())?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let sim = Simulator::from_settings(&settings, &mut rng)?;

    let sink = TerminalSink::begin()?;
    let finished = sim.run(sink, KeyboardStop)?;
    // leave the alternate screen before printing
    drop(finished.sink);

    println!(
        "Stopped after {} generations ({} alive, seed {seed}).",
        finished.summary.generations, finished.summary.population
    );
    Ok(())
}
