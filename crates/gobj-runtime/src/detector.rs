use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use gobj_types::{
    CreationTrace, DetectorSnapshot, InstanceId, LeakReport, LifecycleRecord, ResourceKind,
    SceneTag, Timestamp, Visibility,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::db::LeakDb;
use crate::queue::ReportQueue;
use crate::{
    ConsoleReporter, ContainerPolicy, DetectorConfig, Finalize, LogFileReporter, ReportError,
    Reporter, ScriptTable, WeakSweeper,
};

/// A container as seen by a member at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: InstanceId,
    pub visible: bool,
}

/// Leak detector state: registry, containment index, report queue, and the
/// reporters that drain it at frame boundaries.
///
/// Every method takes `&self`; registry and index share one coarse lock.
pub struct Detector {
    config: DetectorConfig,
    scripts: ScriptTable,
    enabled: bool,
    db: Mutex<LeakDb>,
    queue: ReportQueue,
    reporters: Mutex<Vec<Box<dyn Reporter>>>,
    sweeper: WeakSweeper,
}

impl Detector {
    /// Builds a detector whose reporters follow `config`.
    pub fn new(config: DetectorConfig, scripts: ScriptTable) -> Self {
        let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();
        if config.notify_on_console {
            reporters.push(Box::new(ConsoleReporter::stderr()));
        }
        if config.write_log_file {
            reporters.push(Box::new(LogFileReporter::new(config.log_path.clone())));
        }
        Self::with_reporters(config, scripts, reporters)
    }

    /// Builds a detector with explicit reporters. With none, nothing is tracked.
    pub fn with_reporters(
        config: DetectorConfig,
        scripts: ScriptTable,
        reporters: Vec<Box<dyn Reporter>>,
    ) -> Self {
        Self {
            config,
            scripts,
            enabled: !reporters.is_empty(),
            db: Mutex::new(LeakDb::default()),
            queue: ReportQueue::default(),
            reporters: Mutex::new(reporters),
            sweeper: WeakSweeper::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn scripts(&self) -> &ScriptTable {
        &self.scripts
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ── Lifecycle hooks ──────────────────────────────────

    /// Records a freshly constructed resource. Returns `None` when tracking is
    /// off or no identity could be minted.
    pub fn track(
        &self,
        kind: ResourceKind,
        scene: SceneTag,
        trace: CreationTrace,
        visibility: Visibility,
    ) -> Option<InstanceId> {
        if !self.enabled {
            return None;
        }
        let id = match InstanceId::next_process_local() {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, %kind, "could not mint identity; resource will not be tracked");
                return None;
            }
        };
        let trace = if self.config.write_log_file {
            trace
        } else {
            CreationTrace::empty(self.config.abridged_trace)
        };
        self.db
            .lock()
            .registry
            .put(LifecycleRecord::new(id, kind, scene, trace, visibility));
        Some(id)
    }

    /// Explicit release: the resource will never be reported.
    pub fn release(&self, id: InstanceId) -> bool {
        self.exempt(id)
    }

    /// Stops tracking a live resource without treating it as released or
    /// leaked. Returns whether a record existed.
    pub fn exempt(&self, id: InstanceId) -> bool {
        let removed = self.db.lock().unlink(id).is_some();
        if removed {
            self.sweeper.unwatch(id);
        }
        removed
    }

    pub fn set_self_visible(&self, id: InstanceId, visible: bool) {
        if let Some(record) = self.db.lock().registry.get_mut(id) {
            record.visibility.self_visible = visible;
        }
    }

    pub fn set_opaque(&self, id: InstanceId, opaque: bool) {
        if let Some(record) = self.db.lock().registry.get_mut(id) {
            record.visibility.opaque = opaque;
        }
    }

    /// Moves `member` to `container` (or detaches it with `None`). Callers
    /// pass `None` for a container that is already released.
    pub fn set_container(&self, member: InstanceId, container: Option<ContainerRef>) {
        let visible = container.is_none_or(|c| c.visible);
        self.db
            .lock()
            .reattach(member, container.map(|c| c.id), visible);
    }

    /// Mirrors a container's visibility onto every attached member.
    pub fn container_visibility_changed(&self, container: InstanceId, visible: bool) {
        let mut db = self.db.lock();
        let members: Vec<InstanceId> = db.containment.members_of(container).collect();
        for member in members {
            if let Some(record) = db.registry.get_mut(member) {
                record.visibility.container_visible = visible;
            }
        }
    }

    /// Container lifecycle hook, run before the container itself is released.
    pub fn container_released(&self, container: InstanceId) {
        let mut db = self.db.lock();
        let members = db.orphan_members(container);
        match self.config.container_policy {
            ContainerPolicy::AutoRelease => {
                for member in &members {
                    db.registry.remove(*member);
                }
            }
            ContainerPolicy::MarkInvisible => {
                for member in &members {
                    if let Some(record) = db.registry.get_mut(*member) {
                        record.visibility.container_visible = false;
                    }
                }
            }
        }
        debug!(
            %container,
            members = members.len(),
            policy = ?self.config.container_policy,
            "container released"
        );
    }

    /// Watches a shared host object; it is finalized by a later sweep once
    /// every strong handle is gone.
    pub fn watch<T: Any + Send + Sync>(&self, target: &Arc<T>, id: InstanceId) {
        self.sweeper.watch(target, id);
    }

    // ── Finalization sink ────────────────────────────────

    /// Called after the resource behind `id` became unreachable. Never
    /// panics and performs no I/O.
    pub fn finalize(&self, id: InstanceId) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.finalize_inner(id)));
    }

    fn finalize_inner(&self, id: InstanceId) {
        let mut db = self.db.lock();
        let Some(record) = db.unlink(id) else {
            return;
        };
        db.orphan_members(id);
        let reportable =
            !self.config.filter_invisible_or_transparent || record.visibility.is_shown();
        if reportable {
            self.queue.push(LeakReport::new(record));
        }
    }

    // ── Drain ────────────────────────────────────────────

    /// Takes every queued leak and hands it to the reporters. Errors are
    /// logged and skipped per entry.
    pub fn drain(&self) -> Vec<LeakReport> {
        self.sweeper.sweep(self);
        let batch = self.queue.take();
        if batch.is_empty() {
            return batch;
        }

        let mut reporters = self.reporters.lock();
        for reporter in reporters.iter_mut() {
            if let Err(err) = guarded(|| reporter.begin_batch(&batch)) {
                warn!(%err, "leak reporter failed to emit batch summary");
            }
            for report in &batch {
                if let Err(err) = guarded(|| reporter.report(report, &self.scripts)) {
                    warn!(
                        %err,
                        id = %report.id(),
                        kind = %report.kind(),
                        "failed to emit leak report"
                    );
                }
            }
        }
        debug!(count = batch.len(), "drained leak reports");
        batch
    }

    /// Frame-update hook: drain, then run the host's own update.
    pub fn frame_update<R>(&self, update: impl FnOnce() -> R) -> R {
        let _ = catch_unwind(AssertUnwindSafe(|| self.drain()));
        update()
    }

    // ── Observation ──────────────────────────────────────

    pub fn live_count(&self) -> usize {
        self.db.lock().registry.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_tracked(&self, id: InstanceId) -> bool {
        self.db.lock().registry.get(id).is_some()
    }

    pub fn record(&self, id: InstanceId) -> Option<LifecycleRecord> {
        self.db.lock().registry.get(id).cloned()
    }

    /// Members attached to `container`, sorted by identity.
    pub fn members_of(&self, container: InstanceId) -> Vec<InstanceId> {
        let mut members: Vec<InstanceId> =
            self.db.lock().containment.members_of(container).collect();
        members.sort();
        members
    }

    pub fn snapshot(&self) -> DetectorSnapshot {
        let (live, containers) = {
            let db = self.db.lock();
            let mut live: Vec<LifecycleRecord> = db.registry.records().cloned().collect();
            live.sort_by_key(|record| record.id);
            (live, db.containment.snapshot())
        };
        DetectorSnapshot {
            captured_at: Timestamp::now(),
            live,
            queued: self.queue.snapshot(),
            containers,
        }
    }

    pub fn snapshot_json(&self) -> Result<String, String> {
        facet_json::to_string(&self.snapshot()).map_err(|e| e.to_string())
    }
}

impl Finalize for Detector {
    fn finalize(&self, id: InstanceId) {
        Detector::finalize(self, id);
    }
}

fn guarded(f: impl FnOnce() -> Result<(), ReportError>) -> Result<(), ReportError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(ReportError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
