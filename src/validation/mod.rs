//! Structural validation of panel coordinate maps
//!
//! The validator needs no ground truth: it samples numbers from each panel's
//! map and checks that the coordinates exist and are plausible, recording
//! coverage of the expected number range along the way.

pub mod config;
pub mod result;
pub mod validator;

pub use config::ValidatorConfig;
pub use result::{PanelStatus, PanelValidationResult, TemplateValidationResult};
pub use validator::{PanelCoordinates, TemplateValidator};
