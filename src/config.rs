use crate::board::Consistency;
use crate::grid::EdgePolicy;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const GLIDER: &[(usize, usize)] = &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
const BLINKER: &[(usize, usize)] = &[(0, 0), (1, 0), (2, 0)];
const R_PENTOMINO: &[(usize, usize)] = &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    /// Every cell alive with `alive_probability`.
    #[default]
    Random,
    Glider,
    Blinker,
    RPentomino,
}

impl Pattern {
    /// Live cells relative to the pattern's top-left corner, or `None` for
    /// random seeding.
    pub fn cells(self) -> Option<&'static [(usize, usize)]> {
        match self {
            Pattern::Random => None,
            Pattern::Glider => Some(GLIDER),
            Pattern::Blinker => Some(BLINKER),
            Pattern::RPentomino => Some(R_PENTOMINO),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub alive_probability: f64,
    pub edge: EdgePolicy,
    pub consistency: Consistency,
    pub fps: u32,
    pub tick_ms: u64,
    pub seed: Option<u64>,
    pub max_generations: Option<u64>,
    pub pattern: Pattern,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 60,
            height: 30,
            alive_probability: 0.2,
            edge: EdgePolicy::Skip,
            consistency: Consistency::Buffered,
            fps: 30,
            tick_ms: 50,
            seed: None,
            max_generations: None,
            pattern: Pattern::Random,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= 1 && self.height >= 1,
            "grid must be at least 1x1 (got {}x{})",
            self.width,
            self.height
        );
        ensure!(
            self.width <= u16::MAX as usize && self.height < u16::MAX as usize - 1,
            "grid {}x{} does not fit a terminal",
            self.width,
            self.height
        );
        ensure!(
            (0.0..=1.0).contains(&self.alive_probability),
            "alive probability must be within [0, 1] (got {})",
            self.alive_probability
        );
        ensure!(self.fps >= 1, "fps must be at least 1");
        Ok(())
    }

    /// Command-line values win over whatever the settings file held.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(v) = args.width {
            self.width = v;
        }
        if let Some(v) = args.height {
            self.height = v;
        }
        if let Some(v) = args.probability {
            self.alive_probability = v;
        }
        if let Some(v) = args.edge {
            self.edge = v;
        }
        if args.relaxed {
            self.consistency = Consistency::Relaxed;
        }
        if let Some(v) = args.fps {
            self.fps = v;
        }
        if let Some(v) = args.tick_ms {
            self.tick_ms = v;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.generations.is_some() {
            self.max_generations = args.generations;
        }
        if let Some(v) = args.pattern {
            self.pattern = v;
        }
        if args.log_file.is_some() {
            self.log_file = args.log_file.clone();
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "lifeterm", about = "Conway's Game of Life in the terminal", long_about = None)]
pub struct Args {
    /// settings file (JSON); defaults to the per-user config directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// grid width in cells
    #[arg(long)]
    pub width: Option<usize>,

    /// grid height in cells
    #[arg(long)]
    pub height: Option<usize>,

    /// chance that a cell starts alive
    #[arg(long)]
    pub probability: Option<f64>,

    /// how neighbors past the border are handled
    #[arg(long, value_enum)]
    pub edge: Option<EdgePolicy>,

    /// let the renderer read cells while a generation is being published
    #[arg(long, default_value_t = false)]
    pub relaxed: bool,

    /// frames drawn per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// ms between generations (0 = as fast as possible)
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// rng seed for a reproducible start
    #[arg(long)]
    pub seed: Option<u64>,

    /// stop by itself after N generations
    #[arg(long)]
    pub generations: Option<u64>,

    /// starting pattern
    #[arg(long, value_enum)]
    pub pattern: Option<Pattern>,

    /// log file (default: lifeterm.log in the per-user data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub fn default_settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "lifeterm", "Lifeterm")
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join("settings.json"))
}

pub fn default_log_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "lifeterm", "Lifeterm")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir();
    fs::create_dir_all(dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(dir.join("lifeterm.log"))
}

pub fn read_settings(path: &Path) -> Result<Settings> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("could not read settings file {}", path.display()))?;
    serde_json::from_str(&s)
        .with_context(|| format!("malformed settings file {}", path.display()))
}

/// Like [`read_settings`], but a file that does not exist yields defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    read_settings(path)
}

/// File (explicit or default location), then flags, then validation.
pub fn resolve(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(p) => read_settings(p)?,
        None => match default_settings_path() {
            Ok(p) => load_settings(&p)?,
            Err(_) => Settings::default(),
        },
    };
    settings.apply_args(args);
    settings.validate()?;
    Ok(settings)
}
