use gobj_types::{SourceUnit, TraceFrame};

/// Script index → human-readable script name, built once from the host's
/// loaded script list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTable {
    names: Vec<String>,
}

impl ScriptTable {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Renders a frame for the persisted log. Script frames become
    /// `Script <index> -- <name>, Line: <line>`; others render as captured.
    pub fn render(&self, frame: &TraceFrame) -> String {
        match frame.unit {
            SourceUnit::Script(index) => format!(
                "Script {index} -- {}, Line: {}{}",
                self.name(index).unwrap_or(""),
                frame.line,
                frame.detail
            ),
            _ => frame.to_string(),
        }
    }
}
