use gobj_types::{CreationTrace, SceneTag, TraceFrame};
use std::error::Error;
use std::fmt;
use std::panic::Location;

/// Failure reported by the host while answering a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host has no notion of the queried state.
    Unsupported(&'static str),
    Failed(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(what) => write!(f, "host does not support {what}"),
            Self::Failed(reason) => write!(f, "host query failed: {reason}"),
        }
    }
}

impl Error for HostError {}

/// Queries the detector makes against the embedding host.
///
/// Only called from hook call sites and the frame-update drain, never from
/// finalization.
pub trait HostContext: Send + Sync {
    /// Name of the active scene, `None` before the first scene exists.
    fn current_scene(&self) -> Result<Option<String>, HostError> {
        Err(HostError::Unsupported("scene queries"))
    }

    /// Script-level call stack, innermost first, e.g. `{3}:45:in 'update'`.
    /// Empty when the host cannot provide one.
    fn script_stack(&self) -> Vec<String> {
        Vec::new()
    }

    /// Names of the loaded scripts in load order. Read once at activation.
    fn loaded_scripts(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Host with no scene, stack, or script information.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostContext for NullHost {}

pub fn scene_tag(host: &dyn HostContext) -> SceneTag {
    SceneTag::from_query(host.current_scene())
}

/// Builds the creation trace for a resource constructed at `location`.
///
/// Script frames from the host win; without them the Rust call site is used.
pub fn capture_trace(
    host: &dyn HostContext,
    location: &Location<'_>,
    abridged: bool,
) -> CreationTrace {
    let stack = host.script_stack();
    if stack.is_empty() {
        CreationTrace::new(vec![TraceFrame::from_location(location)], abridged)
    } else {
        CreationTrace::from_raw(stack, abridged)
    }
}
