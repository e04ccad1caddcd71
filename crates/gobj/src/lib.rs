//! Leak detection for display resources that must be disposed explicitly.
//!
//! Host display resources (sprites, planes, windows, tilemaps, viewports) hold
//! memory the host only frees on `dispose`. Forgetting to call it leaks that
//! memory silently. `gobj` records every tracked resource with the scene and
//! call stack that created it, and reports the ones dropped without being
//! disposed at the next frame update.
//!
//! # Using this crate
//!
//! Implement [`HostResource`] for the host's resource types (and
//! [`Attachable`] for the ones that live inside a viewport), then construct
//! them through a [`Tracker`]:
//!
//! ```toml
//! # Cargo.toml
//! gobj = { ..., features = ["diagnostics"] }
//! ```
//!
//! ```rust,ignore
//! let tracker = gobj::Tracker::from_env(host.clone());
//! let mut graphics = tracker.graphics(host_graphics);
//!
//! let viewport = tracker.track_container(HostViewport::new());
//! let sprite = tracker.track_in(HostSprite::new(), &viewport);
//! drop(sprite); // never disposed
//!
//! graphics.update(); // "Undisposed graphical objects garbage collected: [[Sprite, Scene_Map]]"
//! ```
//!
//! # Cargo features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | *(default, none)* | All wrappers are pass-throughs; nothing is tracked. |
//! | `diagnostics` | Records resources and reports the undisposed ones. |
//!
//! # Configuration
//!
//! [`Tracker::from_env`] reads:
//!
//! | Variable | Default | Effect |
//! |----------|---------|--------|
//! | `GOBJ_NOTIFY_LEAK` | on | One console line per frame listing its leaks. |
//! | `GOBJ_DEBUG_FILE` | on | Append a record per leak to the log file. |
//! | `GOBJ_LOG_PATH` | `gobj.txt` | Log file path. |
//! | `GOBJ_ABRIDGED_LOG` | off | Keep only the creation call site. |
//! | `GOBJ_CONTAINER_POLICY` | `auto-release` | Or `mark-invisible`. |
//! | `GOBJ_FILTER_HIDDEN` | off | Skip leaks that were hidden or transparent. |
//!
//! With both outputs off nothing is tracked.

pub use gobj_display::*;
pub use gobj_runtime::{
    CONSOLE_PREFIX, CollectingReporter, ConfigError, ConsoleReporter, ContainerPolicy,
    CreationTrace, Detector, DetectorConfig, DetectorSnapshot, HostContext, HostError, InstanceId,
    LeakReport, LifecycleRecord, LogFileReporter, NullHost, ReportError, Reporter, ResourceKind,
    SceneTag, ScriptTable, SourceUnit, TraceFrame, Visibility, active,
};
