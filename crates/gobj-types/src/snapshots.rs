use facet::Facet;

use crate::{InstanceId, LeakReport, LifecycleRecord, Timestamp};

/// Members currently attached to one container.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub container: InstanceId,
    /// Sorted by identity.
    pub members: Vec<InstanceId>,
}

/// Point-in-time view of detector state, for debugging consoles and dumps.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct DetectorSnapshot {
    pub captured_at: Timestamp,
    /// Live records, sorted by identity.
    pub live: Vec<LifecycleRecord>,
    /// Leaks waiting for the next frame update, in finalization order.
    pub queued: Vec<LeakReport>,
    /// Containment index, sorted by container identity.
    pub containers: Vec<ContainerSnapshot>,
}

impl DetectorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.queued.is_empty() && self.containers.is_empty()
    }
}
