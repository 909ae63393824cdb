#![forbid(unsafe_code)]

use core::fmt;

/// Errors surfaced by [`PanelSet`](crate::PanelSet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The kind name does not match any panel.
    UnknownPanel(String),
    /// Panel data did not deserialize.
    InvalidData { panel: &'static str, reason: String },
    /// The panel is not mounted.
    NotMounted(&'static str),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanel(name) => write!(f, "unknown panel `{name}`"),
            Self::InvalidData { panel, reason } => {
                write!(f, "invalid data for panel `{panel}`: {reason}")
            }
            Self::NotMounted(panel) => write!(f, "panel `{panel}` is not mounted"),
        }
    }
}

impl std::error::Error for PanelError {}
