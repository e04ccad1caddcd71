use std::fmt;
use std::sync::Arc;

use gobj_runtime::{ContainerRef, Detector, Finalize, FinalizerGuard};
use gobj_types::{InstanceId, Visibility};

use crate::{Attachable, HostResource};

pub(crate) struct TrackHandle {
    detector: Arc<Detector>,
    guard: FinalizerGuard,
}

impl TrackHandle {
    pub(crate) fn new(id: InstanceId, detector: Arc<Detector>) -> Self {
        let sink: Arc<dyn Finalize> = detector.clone();
        Self {
            detector,
            guard: FinalizerGuard::new(id, sink),
        }
    }

    fn id(&self) -> InstanceId {
        self.guard.id()
    }
}

/// A host resource recorded with the leak detector.
///
/// Dropping it without [`Tracked::dispose`] is reported as a leak.
pub struct Tracked<R: HostResource> {
    // Declared first: the host resource drops before the finalizer fires.
    inner: R,
    handle: Option<TrackHandle>,
}

impl<R: HostResource> Tracked<R> {
    pub(crate) fn from_parts(inner: R, handle: Option<TrackHandle>) -> Self {
        Self { inner, handle }
    }

    /// `None` when the detector was not tracking at construction.
    pub fn id(&self) -> Option<InstanceId> {
        self.handle.as_ref().map(TrackHandle::id)
    }

    pub fn get(&self) -> &R {
        &self.inner
    }

    /// Releases the host resource and stops tracking it, even when the host
    /// already freed it. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.detector.release(handle.id());
            handle.guard.disarm();
        }
        if !self.inner.is_released() {
            self.inner.release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_released()
    }

    /// Stops tracking without disposing. The resource is never reported.
    pub fn exempt(&mut self) -> bool {
        match &mut self.handle {
            Some(handle) => {
                handle.guard.disarm();
                handle.detector.exempt(handle.id())
            }
            None => false,
        }
    }

    /// The record mirrors what the host reports afterwards, not `visible`.
    pub fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible);
        if let Some(handle) = &self.handle {
            handle
                .detector
                .set_self_visible(handle.id(), self.inner.is_visible());
        }
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.inner.set_opacity(opacity);
        if let Some(handle) = &self.handle {
            let opaque = Visibility::opaque_from(self.inner.opacity());
            handle.detector.set_opaque(handle.id(), opaque);
        }
    }

    /// Attaches to `container`, or detaches with `None`. A disposed container
    /// counts as `None`.
    pub fn set_container<C>(&mut self, container: Option<&Container<C>>)
    where
        R: Attachable<C>,
        C: HostResource,
    {
        let container = container.filter(|c| !c.is_disposed());
        self.inner.set_container(container.map(Container::get));
        if let Some(handle) = &self.handle {
            let target = container.and_then(|c| {
                c.id().map(|id| ContainerRef {
                    id,
                    visible: c.get().is_visible(),
                })
            });
            handle.detector.set_container(handle.id(), target);
        }
    }

    fn detector_and_id(&self) -> Option<(&Detector, InstanceId)> {
        self.handle
            .as_ref()
            .map(|handle| (handle.detector.as_ref(), handle.id()))
    }
}

impl<R: HostResource + fmt::Debug> fmt::Debug for Tracked<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("id", &self.id())
            .field("kind", &R::KIND)
            .field("inner", &self.inner)
            .finish()
    }
}

/// A tracked resource other resources attach to (a viewport).
///
/// Disposing it runs the container hook first, so members the host disposes
/// along with it are not reported.
pub struct Container<C: HostResource> {
    tracked: Tracked<C>,
}

impl<C: HostResource> Container<C> {
    pub(crate) fn from_tracked(tracked: Tracked<C>) -> Self {
        Self { tracked }
    }

    pub fn id(&self) -> Option<InstanceId> {
        self.tracked.id()
    }

    pub fn get(&self) -> &C {
        self.tracked.get()
    }

    pub fn dispose(&mut self) {
        if let Some((detector, id)) = self.tracked.detector_and_id() {
            detector.container_released(id);
        }
        self.tracked.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.tracked.is_disposed()
    }

    pub fn exempt(&mut self) -> bool {
        self.tracked.exempt()
    }

    /// Also updates the container visibility of every attached member.
    pub fn set_visible(&mut self, visible: bool) {
        self.tracked.set_visible(visible);
        if let Some((detector, id)) = self.tracked.detector_and_id() {
            detector.container_visibility_changed(id, self.get().is_visible());
        }
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.tracked.set_opacity(opacity);
    }
}

impl<C: HostResource + fmt::Debug> fmt::Debug for Container<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Container").field(&self.tracked).finish()
    }
}
