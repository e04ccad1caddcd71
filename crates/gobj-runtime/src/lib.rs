//! Leak detector for display resources that must be disposed explicitly.
//!
//! The detector keeps a registry of every live tracked resource. When a
//! resource's finalizer runs and its record is still there, the resource was
//! dropped without being disposed: the record moves to a report queue. The
//! queue is drained at the next frame update, which is the first point where
//! writing to the console or a log file is safe.
//!
//! Two things suppress reports:
//! - disposing a container stops tracking (or hides) everything attached to it;
//! - with filtering on, resources that were hidden or fully transparent when
//!   finalized are dropped silently.
//!
//! The detector is usually activated once per process with [`activate`]; the
//! display wrappers pick it up from [`active`].

use std::sync::{Arc, OnceLock};

use tracing::debug;

mod config;
pub(crate) mod db;
mod detector;
mod finalizer;
mod host;
pub(crate) mod queue;
mod report;
mod scripts;

pub use self::config::*;
pub use self::detector::*;
pub use self::finalizer::*;
pub use self::host::*;
pub use self::report::*;
pub use self::scripts::*;
pub use gobj_types::*;


static ACTIVE: OnceLock<Arc<Detector>> = OnceLock::new();

/// Installs the process-wide detector. The host's script list is read here,
/// once. Subsequent calls are ignored (first write wins).
pub fn activate(config: DetectorConfig, host: &dyn HostContext) -> Arc<Detector> {
    ACTIVE
        .get_or_init(|| {
            let scripts = ScriptTable::from_names(host.loaded_scripts());
            debug!(
                scripts = scripts.len(),
                console = config.notify_on_console,
                log_file = config.write_log_file,
                log_path = %config.log_path.display(),
                "gobj leak detection activated"
            );
            Arc::new(Detector::new(config, scripts))
        })
        .clone()
}

/// The process-wide detector, if [`activate`] has run.
pub fn active() -> Option<Arc<Detector>> {
    ACTIVE.get().cloned()
}
