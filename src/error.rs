//! Error types for loading templates

use thiserror::Error;

/// Errors that can occur when loading or interpreting a template file
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse template TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Anchor key that is not a positive decimal number
    #[error("panel '{panel}': anchor key '{key}' is not a valid number")]
    InvalidNumber { panel: String, key: String },

    #[error("panel '{panel}' is defined more than once")]
    DuplicatePanel { panel: String },

    /// Two anchor keys that name the same number, such as "7" and "07"
    #[error("panel '{panel}': anchor for number {number} is given more than once")]
    DuplicateAnchor { panel: String, number: u32 },

    /// A `[start, end]` pair with start after end
    #[error("{context}: range [{start}, {end}] is empty")]
    InvalidRange { context: String, start: u32, end: u32 },

    /// A validation setting outside its usable range
    #[error("validation setting '{setting}' {reason}")]
    InvalidSetting { setting: String, reason: String },
}

impl TemplateError {
    pub fn invalid_number(panel: impl Into<String>, key: impl Into<String>) -> Self {
        Self::InvalidNumber {
            panel: panel.into(),
            key: key.into(),
        }
    }

    pub fn duplicate_panel(panel: impl Into<String>) -> Self {
        Self::DuplicatePanel {
            panel: panel.into(),
        }
    }

    pub fn duplicate_anchor(panel: impl Into<String>, number: u32) -> Self {
        Self::DuplicateAnchor {
            panel: panel.into(),
            number,
        }
    }

    pub fn invalid_range(context: impl Into<String>, start: u32, end: u32) -> Self {
        Self::InvalidRange {
            context: context.into(),
            start,
            end,
        }
    }

    pub fn invalid_setting(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}
