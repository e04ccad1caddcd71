//! Pass-through wrappers with the same surface as the tracked ones. Nothing is
//! recorded and nothing is reported.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use gobj_runtime::{Detector, DetectorConfig, HostContext, ScriptTable};
use gobj_types::{InstanceId, ResourceKind};

use crate::{Attachable, FrameUpdate, HostResource};

#[derive(Clone)]
pub struct Tracker {
    detector: Arc<Detector>,
}

impl Tracker {
    pub fn new(detector: Arc<Detector>, _host: Arc<dyn HostContext>) -> Self {
        Self { detector }
    }

    /// Builds an inert detector; the process-wide one is left alone.
    pub fn activate(config: DetectorConfig, _host: Arc<dyn HostContext>) -> Self {
        let detector = Detector::with_reporters(config, ScriptTable::default(), Vec::new());
        Self {
            detector: Arc::new(detector),
        }
    }

    pub fn from_env(host: Arc<dyn HostContext>) -> Self {
        Self::activate(DetectorConfig::default(), host)
    }

    pub fn detector(&self) -> &Arc<Detector> {
        &self.detector
    }

    pub fn track<R: HostResource>(&self, resource: R) -> Tracked<R> {
        Tracked { inner: resource }
    }

    pub fn track_container<C: HostResource>(&self, resource: C) -> Container<C> {
        Container {
            tracked: Tracked { inner: resource },
        }
    }

    pub fn track_in<R, C>(&self, resource: R, container: &Container<C>) -> Tracked<R>
    where
        R: Attachable<C>,
        C: HostResource,
    {
        let mut tracked = Tracked { inner: resource };
        tracked.set_container(Some(container));
        tracked
    }

    pub fn track_shared<T: Any + Send + Sync>(
        &self,
        _kind: ResourceKind,
        _target: &Arc<T>,
    ) -> Option<InstanceId> {
        None
    }

    pub fn graphics<U: FrameUpdate>(&self, inner: U) -> Graphics<U> {
        Graphics { inner }
    }
}

pub struct Tracked<R: HostResource> {
    inner: R,
}

impl<R: HostResource> Tracked<R> {
    pub fn id(&self) -> Option<InstanceId> {
        None
    }

    pub fn get(&self) -> &R {
        &self.inner
    }

    pub fn dispose(&mut self) {
        if !self.inner.is_released() {
            self.inner.release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_released()
    }

    pub fn exempt(&mut self) -> bool {
        false
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible);
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.inner.set_opacity(opacity);
    }

    pub fn set_container<C>(&mut self, container: Option<&Container<C>>)
    where
        R: Attachable<C>,
        C: HostResource,
    {
        let container = container.filter(|c| !c.is_disposed());
        self.inner.set_container(container.map(Container::get));
    }
}

impl<R: HostResource + fmt::Debug> fmt::Debug for Tracked<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

pub struct Container<C: HostResource> {
    tracked: Tracked<C>,
}

impl<C: HostResource> Container<C> {
    pub fn id(&self) -> Option<InstanceId> {
        None
    }

    pub fn get(&self) -> &C {
        self.tracked.get()
    }

    pub fn dispose(&mut self) {
        self.tracked.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.tracked.is_disposed()
    }

    pub fn exempt(&mut self) -> bool {
        false
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.tracked.set_visible(visible);
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.tracked.set_opacity(opacity);
    }
}

impl<C: HostResource + fmt::Debug> fmt::Debug for Container<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tracked.fmt(f)
    }
}

pub struct Graphics<U: FrameUpdate> {
    inner: U,
}

impl<U: FrameUpdate> Graphics<U> {
    pub fn new(inner: U) -> Self {
        Self { inner }
    }

    pub fn with_detector(inner: U, _detector: Option<Arc<Detector>>) -> Self {
        Self { inner }
    }

    pub fn update(&mut self) {
        self.inner.update();
    }

    pub fn get(&self) -> &U {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut U {
        &mut self.inner
    }
}
