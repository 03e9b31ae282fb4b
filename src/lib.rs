//! Conway's Game of Life on a fixed grid, drawn to the terminal while it runs.
//!
//! One thread advances generations, one redraws, and one waits for the stop
//! key; they share a [`board::Board`] and a [`control::Control`].

pub mod board;
pub mod config;
pub mod control;
pub mod engine;
pub mod grid;
pub mod input;
pub mod logging;
pub mod render;
pub mod sim;

pub use board::Consistency;
pub use config::{Args, Pattern, Settings};
pub use control::{Control, Phase};
pub use engine::{next_state, step, step_into, Engine};
pub use grid::{Cell, CellView, EdgePolicy, Grid};
pub use input::{InputWatcher, KeyboardStop, StopSignal};
pub use render::{MemorySink, RenderSink, Renderer, TerminalSink};
pub use sim::{Finished, Simulator, Summary};
