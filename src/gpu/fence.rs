//! CPU side of the GPU completion counter.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::{GpuResult, Queue, SyncError};

#[derive(Debug, Default)]
struct FenceState {
    completed: u64,
    lost: bool,
}

/// Monotonic completion value published by the GPU timeline.
#[derive(Debug, Default)]
pub struct Fence {
    state: Mutex<FenceState>,
    completed: Condvar,
}

impl Fence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_value(&self) -> u64 {
        self.state.lock().completed
    }

    /// Publishes `value`. Values below the current one are ignored.
    pub fn signal(&self, value: u64) {
        let mut state = self.state.lock();
        if value > state.completed {
            state.completed = value;
        }
        self.completed.notify_all();
    }

    /// Wakes every waiter with [`SyncError::DeviceLost`].
    pub fn mark_device_lost(&self) {
        self.state.lock().lost = true;
        self.completed.notify_all();
    }

    pub fn is_device_lost(&self) -> bool {
        self.state.lock().lost
    }

    /// Blocks without timeout until the completed value reaches `value`.
    pub fn wait_until(&self, value: u64) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        loop {
            if state.completed >= value {
                return Ok(());
            }
            if state.lost {
                return Err(SyncError::DeviceLost(value));
            }
            self.completed.wait(&mut state);
        }
    }
}

/// The frame synchronizer: owns the submission counter and its fence.
#[derive(Debug)]
pub struct FrameSync {
    fence: Arc<Fence>,
    last_signaled: u64,
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSync {
    pub fn new() -> Self {
        Self {
            fence: Arc::new(Fence::new()),
            last_signaled: 0,
        }
    }

    pub fn fence(&self) -> &Arc<Fence> {
        &self.fence
    }

    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    /// Increments the counter and asks `queue` to publish it once all work
    /// submitted so far has finished.
    pub fn signal<Q: Queue + ?Sized>(&mut self, queue: &Q) -> GpuResult<u64> {
        let value = self.last_signaled + 1;
        queue.signal(&self.fence, value)?;
        self.last_signaled = value;
        Ok(value)
    }

    pub fn is_complete(&self, value: u64) -> bool {
        self.fence.completed_value() >= value
    }

    pub fn wait_until(&self, value: u64) -> Result<(), SyncError> {
        if value > self.last_signaled {
            return Err(SyncError::NeverSignaled {
                requested: value,
                last_signaled: self.last_signaled,
            });
        }

        if !self.is_complete(value) {
            log::trace!("Waiting for completion value {}", value);
        }
        self.fence.wait_until(value)
    }

    /// Waits for everything signaled so far.
    pub fn wait_idle(&self) -> Result<(), SyncError> {
        self.wait_until(self.last_signaled)
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn wait_returns_immediately_when_reached() {
        let fence = Fence::new();
        fence.signal(3);

        assert_eq!(fence.wait_until(2), Ok(()));
        assert_eq!(fence.wait_until(3), Ok(()));
        assert_eq!(fence.wait_until(0), Ok(()));
        assert_eq!(fence.wait_until(3), Ok(()));
    }

    #[test]
    fn completed_value_never_decreases() {
        let fence = Fence::new();
        fence.signal(5);
        fence.signal(2);

        assert_eq!(fence.completed_value(), 5);
    }

    #[test]
    fn wait_blocks_until_signaled() {
        let fence = Arc::new(Fence::new());
        let signaler = {
            let fence = fence.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                fence.signal(1);
                thread::sleep(Duration::from_millis(30));
                fence.signal(2);
            })
        };

        fence.wait_until(2).unwrap();
        assert!(fence.completed_value() >= 2);
        signaler.join().unwrap();
    }

    #[test]
    fn device_lost_wakes_waiters() {
        let fence = Arc::new(Fence::new());
        let waiter = {
            let fence = fence.clone();
            thread::spawn(move || fence.wait_until(1))
        };

        thread::sleep(Duration::from_millis(20));
        fence.mark_device_lost();

        assert_eq!(waiter.join().unwrap(), Err(SyncError::DeviceLost(1)));
    }

    #[test]
    fn never_signaled_value_is_refused() {
        let sync = FrameSync::new();

        assert_eq!(
            sync.wait_until(1),
            Err(SyncError::NeverSignaled {
                requested: 1,
                last_signaled: 0
            })
        );
        assert_eq!(sync.wait_idle(), Ok(()));
    }
}
