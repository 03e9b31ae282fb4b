use crate::board::Board;
use crate::config::Settings;
use crate::control::{Control, Phase};
use crate::engine::Engine;
use crate::grid::{CellView, Grid};
use crate::input::{InputWatcher, StopSignal};
use crate::render::{RenderSink, Renderer};
use anyhow::{anyhow, ensure, Result};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Fresh grid for `settings`: random seeding, or a fixed pattern centered
/// on an otherwise dead board.
pub fn seed_grid<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Grid {
    let (w, h) = (settings.width, settings.height);
    match settings.pattern.cells() {
        None => Grid::populate(w, h, settings.edge, settings.alive_probability, rng),
        Some(cells) => {
            let pw = cells.iter().map(|c| c.0 + 1).max().unwrap_or(0);
            let ph = cells.iter().map(|c| c.1 + 1).max().unwrap_or(0);
            let ox = w.saturating_sub(pw) / 2;
            let oy = h.saturating_sub(ph) / 2;
            let placed: Vec<_> = cells.iter().map(|&(x, y)| (x + ox, y + oy)).collect();
            Grid::with_alive(w, h, settings.edge, &placed)
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    /// Pause between generations. Zero only yields.
    pub tick: Duration,
    pub frame: Duration,
}

impl Pacing {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick: Duration::from_millis(settings.tick_ms),
            frame: Duration::from_nanos(1_000_000_000 / settings.fps.max(1) as u64),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub generations: u64,
    pub frames: u64,
    pub population: usize,
}

/// What is left once the simulation has stopped.
pub struct Finished<S> {
    pub summary: Summary,
    pub grid: Grid,
    pub sink: S,
}

/// Owns the grid and the shared state, and runs the update, render and
/// input threads.
pub struct Simulator {
    engine: Engine,
    board: Arc<Board>,
    control: Arc<Control>,
    renderer: Renderer,
    pacing: Pacing,
    max_generations: Option<u64>,
}

impl Simulator {
    pub fn new(seed: Grid, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        ensure!(
            (seed.width(), seed.height()) == (settings.width, settings.height),
            "seed grid is {}x{} but settings ask for {}x{}",
            seed.width(),
            seed.height(),
            settings.width,
            settings.height
        );
        let board = Arc::new(Board::new(&seed, settings.consistency));
        Ok(Self {
            engine: Engine::new(seed),
            board,
            control: Arc::new(Control::new()),
            renderer: Renderer::default(),
            pacing: Pacing::from_settings(settings),
            max_generations: settings.max_generations,
        })
    }

    pub fn from_settings<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Result<Self> {
        settings.validate()?;
        Self::new(seed_grid(settings, rng), settings)
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn control(&self) -> Arc<Control> {
        Arc::clone(&self.control)
    }

    pub fn phase(&self) -> Phase {
        self.control.phase()
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    /// Run until the stop signal (or the generation limit). Blocks until the
    /// update and render threads have exited; the input thread is left
    /// detached.
    pub fn run<S, I>(self, sink: S, stop: I) -> Result<Finished<S>>
    where
        S: RenderSink + Send + 'static,
        I: StopSignal + 'static,
    {
        let Simulator {
            engine,
            board,
            control,
            renderer,
            pacing,
            max_generations,
        } = self;

        control.start();
        log::info!(
            "running {}x{} grid, {:?} consistency, edge {:?}",
            engine.grid().width(),
            engine.grid().height(),
            board.consistency(),
            engine.grid().edge()
        );

        let watcher = InputWatcher::new(stop, Arc::clone(&control));
        spawn_or_stop(&control, "input", move || watcher.watch())?;

        let update = {
            let board = Arc::clone(&board);
            let ctl = Arc::clone(&control);
            spawn_or_stop(&control, "update", move || {
                update_loop(engine, &board, &ctl, pacing.tick, max_generations)
            })?
        };

        let render = {
            let ctl = Arc::clone(&control);
            spawn_or_stop(&control, "render", move || {
                render_loop(&renderer, &board, &ctl, sink, pacing.frame)
            })
        };
        let render = match render {
            Ok(handle) => handle,
            Err(err) => {
                let _ = update.join();
                return Err(err);
            }
        };

        let updated = update.join();
        if updated.is_err() {
            control.request_stop();
        }
        let rendered = render.join();
        control.finish();
        let engine = updated.map_err(|_| anyhow!("update thread panicked"))?;
        let (frames, sink) = rendered.map_err(|_| anyhow!("render thread panicked"))??;
        log::info!("stopped after {} generations", engine.generation());

        Ok(Finished {
            summary: Summary {
                generations: engine.generation(),
                frames,
                population: engine.grid().population(),
            },
            grid: engine.grid().clone(),
            sink,
        })
    }
}

fn spawn_or_stop<T, F>(control: &Control, name: &str, f: F) -> Result<thread::JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map_err(|err| {
            control.request_stop();
            anyhow!("failed to spawn {name} thread: {err}")
        })
}

fn update_loop(
    mut engine: Engine,
    board: &Board,
    control: &Control,
    tick: Duration,
    max_generations: Option<u64>,
) -> Engine {
    log::debug!("update loop started");
    while control.is_running() {
        if max_generations.is_some_and(|n| engine.generation() >= n) {
            log::info!("generation limit reached");
            control.request_stop();
            break;
        }
        engine.step();
        board.publish(engine.grid(), engine.generation());
        if tick.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(tick);
        }
    }
    log::debug!("update loop exited at generation {}", engine.generation());
    engine
}

fn render_loop<S: RenderSink>(
    renderer: &Renderer,
    board: &Board,
    control: &Control,
    mut sink: S,
    frame: Duration,
) -> Result<(u64, S)> {
    log::debug!("render loop started");
    let mut frames = 0;
    if let Err(err) = draw_until_stopped(renderer, board, control, &mut sink, frame, &mut frames) {
        log::error!("render failed: {err:#}");
        control.request_stop();
        return Err(err);
    }
    log::debug!("render loop exited after {frames} frames");
    Ok((frames, sink))
}

fn draw_until_stopped<S: RenderSink>(
    renderer: &Renderer,
    board: &Board,
    control: &Control,
    sink: &mut S,
    frame: Duration,
    frames: &mut u64,
) -> Result<()> {
    while control.is_running() {
        let started = Instant::now();
        board.with_view(|view, generation| renderer.render(view, generation, false, sink))?;
        *frames += 1;
        wait_for_next_frame(started, frame, control);
    }
    // one last frame carrying the stop notice
    let stopping = control.take_stop_notice();
    board.with_view(|view, generation| renderer.render(view, generation, stopping, sink))?;
    *frames += 1;
    Ok(())
}

/// Longest single nap while waiting out a frame.
const FRAME_SLICE: Duration = Duration::from_millis(5);

/// Sleep until `started + frame`, in short slices so a stop request ends the
/// wait early.
fn wait_for_next_frame(started: Instant, frame: Duration, control: &Control) {
    let deadline = started + frame;
    while control.is_running() {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        thread::sleep(left.min(FRAME_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pattern;
    use crate::grid::EdgePolicy;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn pattern_is_centered() {
        let settings = Settings {
            width: 9,
            height: 9,
            pattern: Pattern::Blinker,
            ..Settings::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let grid = seed_grid(&settings, &mut rng);
        let alive: Vec<_> = grid.cells().filter(|c| c.alive).map(|c| (c.x, c.y)).collect();
        assert_eq!(alive, vec![(3, 4), (4, 4), (5, 4)]);
    }

    #[test]
    fn seeding_is_reproducible() {
        let settings = Settings::default();
        let a = seed_grid(&settings, &mut StdRng::seed_from_u64(11));
        let b = seed_grid(&settings, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
        assert_eq!(a.edge(), EdgePolicy::Skip);
    }

    #[test]
    fn pacing_from_fps() {
        let settings = Settings {
            fps: 20,
            tick_ms: 0,
            ..Settings::default()
        };
        let pacing = Pacing::from_settings(&settings);
        assert_eq!(pacing.frame, Duration::from_millis(50));
        assert!(pacing.tick.is_zero());
    }

    #[test]
    fn frame_wait_ends_on_stop() {
        let control = Control::new();
        control.start();
        let started = Instant::now();
        wait_for_next_frame(started, Duration::from_millis(20), &control);
        assert!(started.elapsed() >= Duration::from_millis(20));

        control.request_stop();
        let started = Instant::now();
        wait_for_next_frame(started, Duration::from_secs(10), &control);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = Settings {
            width: 70_000,
            height: 1,
            ..Settings::default()
        };
        let seed = Grid::empty(70_000, 1, EdgePolicy::Skip);
        assert!(Simulator::new(seed, &settings).is_err());

        let settings = Settings {
            alive_probability: -0.5,
            ..Settings::default()
        };
        assert!(Simulator::from_settings(&settings, &mut StdRng::seed_from_u64(1)).is_err());

        let mismatched = Grid::empty(5, 5, EdgePolicy::Skip);
        assert!(Simulator::new(mismatched, &Settings::default()).is_err());
    }

    #[test]
    fn update_loop_honors_limit() {
        let seed = Grid::with_alive(6, 6, EdgePolicy::Skip, &[(1, 2), (2, 2), (3, 2)]);
        let board = Board::new(&seed, Default::default());
        let control = Control::new();
        control.start();
        let engine = update_loop(Engine::new(seed), &board, &control, Duration::ZERO, Some(7));
        assert_eq!(engine.generation(), 7);
        assert_eq!(board.generation(), 7);
        assert!(!control.is_running());
        assert_eq!(control.phase(), Phase::Stopping);
    }
}
