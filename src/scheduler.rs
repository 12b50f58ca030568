//! Frame scheduling
//!
//! A field asks its scheduler for "one callback on the next display
//! refresh" and gets back a handle. The host loop learns which handles came
//! due via `take_due` and feeds each one, with the refresh timestamp, back
//! into the field that requested it.

/// Opaque token for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

pub trait FrameScheduler {
    /// Request a callback on the next refresh
    fn schedule(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// Hand out every request that is due on this refresh, in request order.
    /// Handles scheduled while those are being serviced wait for the next call.
    fn take_due(&mut self) -> Vec<FrameHandle>;
}

/// Scheduler whose requests all come due on the next `take_due` call
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting to fire
    pub fn live_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }

    fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut q = FrameQueue::new();
        let a = q.schedule();
        let b = q.schedule();
        assert_ne!(a, b);
        assert_eq!(q.live_count(), 2);
    }

    #[test]
    fn test_cancel_removes_only_that_handle() {
        let mut q = FrameQueue::new();
        let a = q.schedule();
        let b = q.schedule();
        q.cancel(a);
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));
        // double cancel is harmless
        q.cancel(a);
        assert_eq!(q.take_due(), vec![b]);
    }

    #[test]
    fn test_take_due_drains() {
        let mut q = FrameQueue::new();
        let a = q.schedule();
        assert_eq!(q.take_due(), vec![a]);
        assert!(q.take_due().is_empty());
        // a fired handle can no longer be canceled into anything
        q.cancel(a);
        assert_eq!(q.live_count(), 0);
    }
}
