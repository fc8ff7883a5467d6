use crate::runtime::error::{self, ForthError};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::Notify;

/// Without a delay, yield to the executor this often so host tasks on the same thread still run.
const YIELD_INTERVAL: usize = 64;

/// How the interpreter paces itself at each pause point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Keep going, sleeping for the configured delay after each visible step.
    Run,

    /// Wait for a step signal after each visible step.
    Step,

    /// Abandon the current evaluation at the next pause point.
    Stop,
}

impl ExecutionMode {
    fn to_u8(self) -> u8 {
        match self {
            ExecutionMode::Run => 0,
            ExecutionMode::Step => 1,
            ExecutionMode::Stop => 2,
        }
    }

    fn from_u8(value: u8) -> ExecutionMode {
        match value {
            1 => ExecutionMode::Step,
            2 => ExecutionMode::Stop,
            _ => ExecutionMode::Run,
        }
    }
}

struct ControlState {
    mode: AtomicU8,
    delay_ms: AtomicU64,
    checkpoints: AtomicUsize,

    /// Holds at most one pending step.
    step: Notify,

    /// Wakes a waiting checkpoint when the mode changes.
    wake: Notify,
}

/// The host's handle on a running interpreter.  Clones share state and may be used from other tasks
/// or threads.
#[derive(Clone)]
pub struct ExecutionControl {
    state: Arc<ControlState>,
}

impl Default for ExecutionControl {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl ExecutionControl {
    pub fn new(delay: Duration) -> ExecutionControl {
        ExecutionControl {
            state: Arc::new(ControlState {
                mode: AtomicU8::new(ExecutionMode::Run.to_u8()),
                delay_ms: AtomicU64::new(delay.as_millis() as u64),
                checkpoints: AtomicUsize::new(0),
                step: Notify::new(),
                wake: Notify::new(),
            }),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_u8(self.state.mode.load(Ordering::SeqCst))
    }

    /// Change the mode, waking a checkpoint that is currently waiting.
    pub fn set_mode(&self, mode: ExecutionMode) {
        self.state.mode.store(mode.to_u8(), Ordering::SeqCst);
        self.state.wake.notify_waiters();
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.state.delay_ms.load(Ordering::SeqCst))
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Let a paused interpreter take one more step.  Repeated calls before the interpreter reaches
    /// its next pause point count once.
    pub fn step(&self) {
        self.state.step.notify_one();
    }

    pub fn stop(&self) {
        self.set_mode(ExecutionMode::Stop);
    }

    pub fn is_stopped(&self) -> bool {
        self.mode() == ExecutionMode::Stop
    }

    /// Fail with `Halted` if a stop has been requested.
    pub fn check_stop(&self) -> error::Result<()> {
        if self.is_stopped() {
            return Err(ForthError::Halted);
        }

        Ok(())
    }

    /// Forget a stop request left over from an earlier evaluation.
    pub fn clear_stop(&self) {
        let _ = self.state.mode.compare_exchange(
            ExecutionMode::Stop.to_u8(),
            ExecutionMode::Run.to_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// The pause point the interpreter awaits after each visible step.
    pub async fn checkpoint(&self) -> error::Result<()> {
        loop {
            // Register for the wake signal before reading the mode so a mode change made between
            // the two is not missed.
            let wake = self.state.wake.notified();
            tokio::pin!(wake);
            let _ = wake.as_mut().enable();

            match self.mode() {
                ExecutionMode::Stop => return Err(ForthError::Halted),

                ExecutionMode::Run => {
                    let delay = self.delay();

                    if delay.is_zero() {
                        let count = self.state.checkpoints.fetch_add(1, Ordering::Relaxed);

                        if count % YIELD_INTERVAL == YIELD_INTERVAL - 1 {
                            tokio::task::yield_now().await;
                        }
                    } else {
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => {}
                            _ = &mut wake => {}
                        }
                    }

                    return self.check_stop();
                }

                ExecutionMode::Step => {
                    tokio::select! {
                        _ = self.state.step.notified() => return self.check_stop(),
                        _ = &mut wake => continue,
                    }
                }
            }
        }
    }
}
