use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug)]
struct StopState {
    requested: bool,
    notice: bool,
    phase: Phase,
}

/// State shared by every simulation thread: the running flag, plus the
/// stop record and lifecycle phase behind one lock.
#[derive(Debug)]
pub struct Control {
    running: AtomicBool,
    stop: Mutex<StopState>,
}

impl Default for Control {
    fn default() -> Self {
        Self::new()
    }
}

impl Control {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            stop: Mutex::new(StopState {
                requested: false,
                notice: false,
                phase: Phase::Idle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StopState> {
        self.stop.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Enter `Running`. A stop requested while still idle is honored: the
    /// flag stays off and the phase goes straight to `Stopping`.
    pub(crate) fn start(&self) {
        let mut st = self.lock();
        if st.requested {
            st.phase = Phase::Stopping;
            self.running.store(false, Ordering::Release);
            return;
        }
        st.phase = Phase::Running;
        self.running.store(true, Ordering::Release);
    }

    /// Flip the running flag off. Only the first call has any effect; it
    /// returns `true`.
    pub fn request_stop(&self) -> bool {
        let mut st = self.lock();
        if st.requested {
            return false;
        }
        st.requested = true;
        st.notice = true;
        if st.phase == Phase::Running {
            st.phase = Phase::Stopping;
        }
        self.running.store(false, Ordering::Release);
        log::info!("stop requested");
        true
    }

    pub fn stop_requested(&self) -> bool {
        self.lock().requested
    }

    /// Whether the "stopping" notice should be drawn. Consumed by the frame
    /// that shows it.
    pub fn take_stop_notice(&self) -> bool {
        std::mem::take(&mut self.lock().notice)
    }

    pub(crate) fn finish(&self) {
        self.lock().phase = Phase::Stopped;
        self.running.store(false, Ordering::Release);
    }
}
