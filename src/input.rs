use crate::control::Control;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;

/// How long one poll may wait for input before re-checking the running flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of the external stop signal.
pub trait StopSignal: Send {
    /// Wait up to `timeout` for the signal. `Ok(true)` once it has been seen.
    fn poll_stop(&mut self, timeout: Duration) -> Result<bool>;
}

/// Esc, `q`, or Ctrl-C (raw mode swallows SIGINT).
pub fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Stop keys from the terminal event queue.
#[derive(Debug, Default)]
pub struct KeyboardStop;

impl StopSignal for KeyboardStop {
    fn poll_stop(&mut self, timeout: Duration) -> Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        // drain whatever is queued so a burst of keys is seen in one call
        loop {
            if let Event::Key(k) = event::read()? {
                if is_stop_key(&k) {
                    return Ok(true);
                }
            }
            if !event::poll(Duration::ZERO)? {
                return Ok(false);
            }
        }
    }
}

pub struct InputWatcher<S> {
    source: S,
    control: Arc<Control>,
}

impl<S: StopSignal> InputWatcher<S> {
    pub fn new(source: S, control: Arc<Control>) -> Self {
        Self { source, control }
    }

    /// One check of the stop signal; requests the stop when it is seen.
    pub fn poll_stop_key(&mut self) -> Result<bool> {
        if self.source.poll_stop(POLL_INTERVAL)? {
            self.control.request_stop();
            return Ok(true);
        }
        Ok(false)
    }

    /// Run until the stop signal is seen or something else stops the
    /// simulation. Input errors end the simulation too.
    pub fn watch(mut self) {
        while self.control.is_running() {
            match self.poll_stop_key() {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => {
                    log::error!("input watcher failed: {err:#}");
                    self.control.request_stop();
                    break;
                }
            }
        }
        log::debug!("input watcher exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct AfterPolls(usize);

    impl StopSignal for AfterPolls {
        fn poll_stop(&mut self, _timeout: Duration) -> Result<bool> {
            if self.0 == 0 {
                return Ok(true);
            }
            self.0 -= 1;
            Ok(false)
        }
    }

    struct Broken;

    impl StopSignal for Broken {
        fn poll_stop(&mut self, _timeout: Duration) -> Result<bool> {
            bail!("tty gone")
        }
    }

    #[test]
    fn stop_keys() {
        let press = |code, mods| KeyEvent::new(code, mods);
        assert!(is_stop_key(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_stop_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_stop_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_stop_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_stop_key(&press(KeyCode::Enter, KeyModifiers::NONE)));

        let mut release = press(KeyCode::Esc, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_stop_key(&release));
    }

    #[test]
    fn watcher_flips_running_flag() {
        let control = Arc::new(Control::new());
        control.start();
        let mut watcher = InputWatcher::new(AfterPolls(2), control.clone());
        assert!(!watcher.poll_stop_key().unwrap());
        assert!(!watcher.poll_stop_key().unwrap());
        assert!(control.is_running());
        assert!(watcher.poll_stop_key().unwrap());
        assert!(!control.is_running());
        assert!(control.take_stop_notice());
    }

    #[test]
    fn input_error_stops_simulation() {
        let control = Arc::new(Control::new());
        control.start();
        InputWatcher::new(Broken, control.clone()).watch();
        assert!(!control.is_running());
    }
}
