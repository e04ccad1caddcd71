use gobj_types::ResourceKind;

/// A host display resource that has to be disposed explicitly.
pub trait HostResource {
    /// Name used in leak reports.
    const KIND: ResourceKind;

    /// Frees the host-side resource. Called at most once by the wrappers.
    fn release(&mut self);

    fn is_released(&self) -> bool;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// `None` for types without an opacity. `0` is fully transparent.
    fn opacity(&self) -> Option<u8> {
        None
    }

    fn set_opacity(&mut self, _opacity: u8) {}
}

/// A resource that can be attached to a container of host type `C`.
pub trait Attachable<C: HostResource>: HostResource {
    fn set_container(&mut self, container: Option<&C>);
}

/// The host's per-frame graphics update.
pub trait FrameUpdate {
    fn update(&mut self);
}
