//! Sync engine errors.

use thiserror::Error;

use super::Section;
use crate::gateway::GatewayError;

/// Failure of a `load_section` / `save_section` call.
///
/// None of these are fatal: the section keeps its previous value and can
/// be reloaded later.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("failed to load {section} section: {source}")]
    SectionLoadFailed {
        section: Section,
        #[source]
        source: GatewayError,
    },

    #[error("failed to save {section} section: {source}")]
    SectionSaveFailed {
        section: Section,
        #[source]
        source: GatewayError,
    },

    #[error("failed to save sections: {failed:?}")]
    SectionsSaveFailed { failed: Vec<Section> },

    #[error("sync engine has been disposed")]
    Disposed,
}

impl SyncError {
    /// The section this error is about, if it concerns exactly one.
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::SectionLoadFailed { section, .. } | Self::SectionSaveFailed { section, .. } => {
                Some(*section)
            }
            Self::SectionsSaveFailed { .. } | Self::Disposed => None,
        }
    }
}
