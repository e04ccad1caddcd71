//! Identity tokens and creation traces for tracked display resources.
//!
//! An [`InstanceId`] is minted when a tracked resource is constructed and stays
//! comparable after the resource itself is gone, so a finalizer can find the
//! record without touching the (already unreachable) instance.
//!
//! Creation traces are plain data: a list of `(source unit, line)` frames, not a
//! captured language-level backtrace object.

use facet::Facet;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// A value that cannot be a valid identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    ZeroId(&'static str),
    IdOutOfRange {
        field: &'static str,
        max: u64,
        got: u64,
    },
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroId(field) => write!(f, "{field} must be non-zero"),
            Self::IdOutOfRange { field, max, got } => {
                write!(f, "{field} must be <= {max}, got {got}")
            }
        }
    }
}

impl Error for InvariantError {}

pub const ID_COUNTER_BITS: u32 = 37;
pub const ID_COUNTER_MAX_U64: u64 = (1u64 << ID_COUNTER_BITS) - 1;
/// Largest identity that survives a snapshot JSON reader parsing numbers as
/// `f64`. Prefix plus counter never exceed it.
pub const JSON_SAFE_ID_MAX_U64: u64 = (1u64 << 53) - 1;

fn process_prefix_u16() -> u16 {
    static PROCESS_PREFIX: OnceLock<u16> = OnceLock::new();
    *PROCESS_PREFIX.get_or_init(|| {
        let pid = std::process::id() as u64;
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos() as u64)
            .unwrap_or(0);
        ((seed ^ pid) & 0xFFFF) as u16
    })
}

macro_rules! define_u64_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        field = $field:literal
        , max = $max:expr
    ) => {
        #[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[facet(transparent)]
        $(#[$meta])*
        pub struct $name(u64);

        impl $name {
            fn from_raw(value: u64) -> Result<Self, InvariantError> {
                if value == 0 {
                    return Err(InvariantError::ZeroId($field));
                }
                if value > $max {
                    return Err(InvariantError::IdOutOfRange {
                        field: $field,
                        max: $max,
                        got: value,
                    });
                }
                Ok(Self(value))
            }

            pub fn from_prefixed_counter(prefix: u16, counter: u64) -> Result<Self, InvariantError> {
                if counter > ID_COUNTER_MAX_U64 {
                    return Err(InvariantError::IdOutOfRange {
                        field: $field,
                        max: ID_COUNTER_MAX_U64,
                        got: counter,
                    });
                }
                let raw = ((u64::from(prefix)) << ID_COUNTER_BITS) | counter;
                Self::from_raw(raw)
            }

            pub fn from_process_local_counter(counter: u64) -> Result<Self, InvariantError> {
                Self::from_prefixed_counter(process_prefix_u16(), counter)
            }

            /// Mints the next identity for this process. Counters only grow, so
            /// an identity is never handed out twice.
            pub fn next_process_local() -> Result<Self, InvariantError> {
                static NEXT_COUNTER: AtomicU64 = AtomicU64::new(1);
                let counter = NEXT_COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::from_process_local_counter(counter)
            }

            pub fn get(self) -> u64 {
                self.0
            }

            pub fn process_prefix(self) -> u16 {
                (self.0 >> ID_COUNTER_BITS) as u16
            }

            pub fn counter(self) -> u64 {
                self.0 & ID_COUNTER_MAX_U64
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_u64_id!(
    /// Identity of one tracked display resource.
    InstanceId,
    field = "instance_id",
    max = JSON_SAFE_ID_MAX_U64
);

// ── Creation traces ──────────────────────────────────────

/// Where a frame's code lives.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum SourceUnit {
    /// Index into the host's loaded script list.
    Script(u32),
    /// A file path (host script file or Rust source file).
    Path(String),
    /// The frame text could not be split into unit and line.
    Unknown,
}

/// One frame of a creation trace.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceFrame {
    pub unit: SourceUnit,
    pub line: u32,
    /// Whatever followed `unit:line` in the raw frame (e.g. `:in 'update'`).
    /// For [`SourceUnit::Unknown`] this is the whole raw frame.
    pub detail: String,
}

static SCRIPT_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{(\d+)\}:(\d+)(.*)$")
        .expect("invariant violated: script frame pattern must compile")
});

static PATH_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):(\d+)(.*)$")
        .expect("invariant violated: path frame pattern must compile")
});

impl TraceFrame {
    pub fn script(index: u32, line: u32, detail: impl Into<String>) -> Self {
        Self {
            unit: SourceUnit::Script(index),
            line,
            detail: detail.into(),
        }
    }

    pub fn path(path: impl Into<String>, line: u32, detail: impl Into<String>) -> Self {
        Self {
            unit: SourceUnit::Path(path.into()),
            line,
            detail: detail.into(),
        }
    }

    /// Parses a host frame such as `{12}:40:in 'start'` or `lib/foo.rb:3`.
    pub fn parse(raw: &str) -> Self {
        if let Some(caps) = SCRIPT_FRAME.captures(raw)
            && let (Ok(index), Ok(line)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>())
        {
            return Self::script(index, line, &caps[3]);
        }
        if let Some(caps) = PATH_FRAME.captures(raw)
            && let Ok(line) = caps[2].parse::<u32>()
        {
            return Self::path(&caps[1], line, &caps[3]);
        }
        Self {
            unit: SourceUnit::Unknown,
            line: 0,
            detail: raw.to_string(),
        }
    }

    /// Frame for a Rust call site captured with `#[track_caller]`.
    pub fn from_location(location: &std::panic::Location<'_>) -> Self {
        Self::path(location.file(), location.line(), "")
    }
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            SourceUnit::Script(index) => write!(f, "{{{index}}}:{}{}", self.line, self.detail),
            SourceUnit::Path(path) => write!(f, "{path}:{}{}", self.line, self.detail),
            SourceUnit::Unknown => f.write_str(&self.detail),
        }
    }
}

/// Call-site information captured when a tracked resource was constructed.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Default)]
pub struct CreationTrace {
    /// `true` when only the immediate call site was kept.
    pub abridged: bool,
    pub frames: Vec<TraceFrame>,
}

impl CreationTrace {
    pub fn new(frames: Vec<TraceFrame>, abridged: bool) -> Self {
        let frames = if abridged {
            frames.into_iter().take(1).collect()
        } else {
            frames
        };
        Self { abridged, frames }
    }

    pub fn from_raw<I, S>(raw: I, abridged: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frames = raw
            .into_iter()
            .map(|frame| TraceFrame::parse(frame.as_ref()))
            .collect();
        Self::new(frames, abridged)
    }

    pub fn empty(abridged: bool) -> Self {
        Self {
            abridged,
            frames: Vec::new(),
        }
    }

    /// Heading used in persisted records.
    pub fn label(&self) -> &'static str {
        if self.abridged { "Point" } else { "Stack" }
    }

    pub fn call_site(&self) -> Option<&TraceFrame> {
        self.frames.first()
    }
}
