//! Data model for tracked display resources and the leaks found among them.

use chrono::{DateTime, TimeZone};
use facet::Facet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

mod records;
mod snapshots;

pub use gobj_trace_types::{CreationTrace, InstanceId, InvariantError, SourceUnit, TraceFrame};
pub use records::*;
pub use snapshots::*;

/// Tracked resource types.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ResourceKind {
    Sprite,
    Plane,
    Window,
    Tilemap,
    /// Container for the other kinds; disposing it releases what it holds.
    Viewport,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Sprite,
        ResourceKind::Plane,
        ResourceKind::Window,
        ResourceKind::Tilemap,
        ResourceKind::Viewport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sprite => "Sprite",
            Self::Plane => "Plane",
            Self::Window => "Window",
            Self::Tilemap => "Tilemap",
            Self::Viewport => "Viewport",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, Self::Viewport)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The scene that was active when a resource was created.
#[derive(Facet, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SceneTag {
    /// Created before any scene existed, or the scene could not be queried.
    NoScene,
    Named(String),
}

impl Default for SceneTag {
    fn default() -> Self {
        Self::NoScene
    }
}

impl SceneTag {
    /// Folds a host scene query into a tag. Failures are not fatal.
    pub fn from_query<E>(query: Result<Option<String>, E>) -> Self {
        match query {
            Ok(Some(name)) if !name.is_empty() => Self::Named(name),
            _ => Self::NoScene,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoScene => "NoScene",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for SceneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[facet(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis().min(i64::MAX as u128) as i64)
            .unwrap_or_default();
        Self(ms)
    }

    pub const fn from_unix_ms(ms: i64) -> Self {
        Self(ms)
    }

    pub fn unix_ms(self) -> i64 {
        self.0
    }

    pub fn to_datetime<Tz: TimeZone>(self, tz: &Tz) -> Option<DateTime<Tz>> {
        DateTime::from_timestamp_millis(self.0).map(|utc| utc.with_timezone(tz))
    }

    /// Renders as `2024-05-01 18:03:22 +0200` in the given zone.
    pub fn format_in<Tz>(self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self.to_datetime(tz) {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            None => format!("@{}ms", self.0),
        }
    }
}

/// Visibility state mirrored from the host, used to filter low-value leaks.
#[derive(Facet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Visibility {
    pub self_visible: bool,
    pub container_visible: bool,
    /// Opacity is above fully transparent (or the type has no opacity).
    pub opaque: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            self_visible: true,
            container_visible: true,
            opaque: true,
        }
    }
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        self.self_visible && self.container_visible && self.opaque
    }

    /// Host opacity is 0..=255; only 0 counts as transparent.
    pub fn opaque_from(opacity: Option<u8>) -> bool {
        opacity.is_none_or(|value| value > 0)
    }
}
