use std::sync::Arc;

use gobj_runtime::Detector;

use crate::FrameUpdate;

/// The host's frame update with the drain hook in front of it.
pub struct Graphics<U: FrameUpdate> {
    inner: U,
    detector: Option<Arc<Detector>>,
}

impl<U: FrameUpdate> Graphics<U> {
    /// Drains into the process-wide detector, if one is active.
    pub fn new(inner: U) -> Self {
        Self::with_detector(inner, gobj_runtime::active())
    }

    pub fn with_detector(inner: U, detector: Option<Arc<Detector>>) -> Self {
        Self { inner, detector }
    }

    /// Reports everything finalized since the last update, then runs the
    /// host's update. Reporting never stops the update from running.
    pub fn update(&mut self) {
        let inner = &mut self.inner;
        match &self.detector {
            Some(detector) => detector.frame_update(|| inner.update()),
            None => inner.update(),
        }
    }

    pub fn get(&self) -> &U {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut U {
        &mut self.inner
    }
}
