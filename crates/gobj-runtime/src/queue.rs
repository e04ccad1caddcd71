use gobj_types::LeakReport;
use parking_lot::Mutex;

/// Leaks waiting for the next frame boundary, in finalization order.
#[derive(Default)]
pub(crate) struct ReportQueue {
    pending: Mutex<Vec<LeakReport>>,
}

impl ReportQueue {
    pub(crate) fn push(&self, report: LeakReport) {
        self.pending.lock().push(report);
    }

    /// Swaps the live queue for an empty one and hands back what it held.
    /// Anything pushed after the swap waits for the next call.
    pub(crate) fn take(&self) -> Vec<LeakReport> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub(crate) fn snapshot(&self) -> Vec<LeakReport> {
        self.pending.lock().clone()
    }
}
