use crate::grid::CellView;
use anyhow::{ensure, Result};
use crossterm::{
    cursor, execute, queue,
    style::{Print, ResetColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Positioned text output.
pub trait RenderSink {
    fn begin_frame(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_at(&mut self, x: u16, y: u16, text: &str) -> Result<()>;

    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Alternate-screen terminal. Restores the terminal when dropped.
pub struct TerminalSink {
    out: Stdout,
}

impl TerminalSink {
    pub fn begin() -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self { out })
    }
}

impl RenderSink for TerminalSink {
    fn begin_frame(&mut self) -> Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        Ok(())
    }

    fn write_at(&mut self, x: u16, y: u16, text: &str) -> Result<()> {
        queue!(self.out, cursor::MoveTo(x, y), Print(text))?;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkWrite {
    pub x: u16,
    pub y: u16,
    pub text: String,
}

/// Records every write, grouped by frame.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<Vec<SinkWrite>>,
    current: Vec<SinkWrite>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&[SinkWrite]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl RenderSink for MemorySink {
    fn begin_frame(&mut self) -> Result<()> {
        self.current.clear();
        Ok(())
    }

    fn write_at(&mut self, x: u16, y: u16, text: &str) -> Result<()> {
        self.current.push(SinkWrite {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames.push(std::mem::take(&mut self.current));
        Ok(())
    }
}

pub const STOPPING_TEXT: &str = "Stopping Simulation.";

#[derive(Clone, Debug)]
pub struct Renderer {
    pub alive: String,
    pub dead: String,
    /// Row of the grid's top edge on the sink.
    pub top: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            alive: "■".to_string(),
            dead: " ".to_string(),
            top: 0,
        }
    }
}

impl Renderer {
    pub fn status_text(generation: u64, population: usize) -> String {
        format!("Current Generation: {generation}  Population: {population}")
    }

    /// Draw one full frame. Reads `view` only.
    pub fn render<S: RenderSink + ?Sized>(
        &self,
        view: &dyn CellView,
        generation: u64,
        stopping: bool,
        sink: &mut S,
    ) -> Result<()> {
        // the stop notice sits one row below the status line
        let last_row = view.height() + usize::from(self.top) + 1;
        ensure!(
            view.width() <= usize::from(u16::MAX) && last_row <= usize::from(u16::MAX),
            "{}x{} grid at row {} does not fit the sink",
            view.width(),
            view.height(),
            self.top
        );
        sink.begin_frame()?;
        let mut population = 0;
        for y in 0..view.height() {
            for x in 0..view.width() {
                let glyph = if view.is_alive(x, y) {
                    population += 1;
                    &self.alive
                } else {
                    &self.dead
                };
                sink.write_at(x as u16, y as u16 + self.top, glyph)?;
            }
        }

        let status_y = view.height() as u16 + self.top;
        // Trailing spaces wipe leftovers from a longer previous line.
        let status = format!("{:<48}", Self::status_text(generation, population));
        sink.write_at(0, status_y, &status)?;
        if stopping {
            sink.write_at(0, status_y + 1, STOPPING_TEXT)?;
        }
        sink.present()
    }
}
