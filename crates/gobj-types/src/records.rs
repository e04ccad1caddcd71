use facet::Facet;

use crate::{CreationTrace, InstanceId, ResourceKind, SceneTag, Timestamp, Visibility};

/// Lifecycle record for one live tracked resource.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct LifecycleRecord {
    /// Identity minted at construction; valid after the resource is gone.
    pub id: InstanceId,

    /// Tracked type of the resource.
    pub kind: ResourceKind,

    /// Scene active at construction.
    pub scene: SceneTag,

    /// Call site or full stack at construction.
    pub trace: CreationTrace,

    pub created_at: Timestamp,

    /// Container the resource is currently attached to.
    pub container: Option<InstanceId>,

    pub visibility: Visibility,
}

impl LifecycleRecord {
    pub fn new(
        id: InstanceId,
        kind: ResourceKind,
        scene: SceneTag,
        trace: CreationTrace,
        visibility: Visibility,
    ) -> Self {
        Self {
            id,
            kind,
            scene,
            trace,
            created_at: Timestamp::now(),
            container: None,
            visibility,
        }
    }
}

/// A resource that was finalized without being disposed.
///
/// Built by the finalization sink and never mutated afterwards.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct LeakReport {
    pub record: LifecycleRecord,
    pub finalized_at: Timestamp,
}

impl LeakReport {
    pub fn new(record: LifecycleRecord) -> Self {
        Self {
            record,
            finalized_at: Timestamp::now(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.record.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.record.kind
    }

    pub fn scene(&self) -> &SceneTag {
        &self.record.scene
    }
}
