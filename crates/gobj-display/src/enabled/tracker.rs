use std::any::Any;
use std::panic::Location;
use std::sync::Arc;

use gobj_runtime::{Detector, DetectorConfig, HostContext, capture_trace, scene_tag};
use gobj_types::{InstanceId, ResourceKind, Visibility};
use tracing::warn;

use super::tracked::TrackHandle;
use super::{Container, Graphics, Tracked};
use crate::{Attachable, FrameUpdate, HostResource};

/// Constructs tracked resources: the detector they report to plus the host
/// queried for the scene and script stack at construction time.
#[derive(Clone)]
pub struct Tracker {
    detector: Arc<Detector>,
    host: Arc<dyn HostContext>,
}

impl Tracker {
    pub fn new(detector: Arc<Detector>, host: Arc<dyn HostContext>) -> Self {
        Self { detector, host }
    }

    /// Uses the process-wide detector, activating it with `config` on the
    /// first call.
    pub fn activate(config: DetectorConfig, host: Arc<dyn HostContext>) -> Self {
        let detector = gobj_runtime::activate(config, host.as_ref());
        Self::new(detector, host)
    }

    /// [`Tracker::activate`] with the configuration read from `GOBJ_*`
    /// variables. An invalid value falls back to the defaults.
    pub fn from_env(host: Arc<dyn HostContext>) -> Self {
        let config = DetectorConfig::from_env().unwrap_or_else(|err| {
            warn!(%err, "invalid gobj configuration, using defaults");
            DetectorConfig::default()
        });
        Self::activate(config, host)
    }

    pub fn detector(&self) -> &Arc<Detector> {
        &self.detector
    }

    #[track_caller]
    pub fn track<R: HostResource>(&self, resource: R) -> Tracked<R> {
        let handle = self.register(&resource, Location::caller());
        Tracked::from_parts(resource, handle)
    }

    #[track_caller]
    pub fn track_container<C: HostResource>(&self, resource: C) -> Container<C> {
        let handle = self.register(&resource, Location::caller());
        Container::from_tracked(Tracked::from_parts(resource, handle))
    }

    /// Tracks `resource` and attaches it to `container` in one step.
    #[track_caller]
    pub fn track_in<R, C>(&self, resource: R, container: &Container<C>) -> Tracked<R>
    where
        R: Attachable<C>,
        C: HostResource,
    {
        let handle = self.register(&resource, Location::caller());
        let mut tracked = Tracked::from_parts(resource, handle);
        tracked.set_container(Some(container));
        tracked
    }

    /// Tracks a host object shared behind an `Arc`. It counts as collected
    /// once every strong handle is gone, checked at each frame update.
    /// Release it with [`Detector::release`] on the returned identity.
    #[track_caller]
    pub fn track_shared<T: Any + Send + Sync>(
        &self,
        kind: ResourceKind,
        target: &Arc<T>,
    ) -> Option<InstanceId> {
        let id = self.record(kind, Visibility::default(), Location::caller())?;
        self.detector.watch(target, id);
        Some(id)
    }

    /// Wraps the host's frame update so each call drains pending leaks first.
    pub fn graphics<U: FrameUpdate>(&self, inner: U) -> Graphics<U> {
        Graphics::with_detector(inner, Some(self.detector.clone()))
    }

    fn register<R: HostResource>(
        &self,
        resource: &R,
        location: &Location<'_>,
    ) -> Option<TrackHandle> {
        if resource.is_released() {
            return None;
        }
        let visibility = Visibility {
            self_visible: resource.is_visible(),
            container_visible: true,
            opaque: Visibility::opaque_from(resource.opacity()),
        };
        let id = self.record(R::KIND, visibility, location)?;
        Some(TrackHandle::new(id, self.detector.clone()))
    }

    fn record(
        &self,
        kind: ResourceKind,
        visibility: Visibility,
        location: &Location<'_>,
    ) -> Option<InstanceId> {
        if !self.detector.is_enabled() {
            return None;
        }
        let host = self.host.as_ref();
        let trace = capture_trace(host, location, self.detector.config().abridged_trace);
        self.detector.track(kind, scene_tag(host), trace, visibility)
    }
}
