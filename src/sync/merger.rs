//! Folding section payloads into a configuration snapshot.
//!
//! This is the only place that knows which snapshot fields a section
//! owns. Loads, saves and the startup fallback all go through it.

use std::sync::Arc;

use super::section::{Section, SectionPayload};
use super::snapshot::{ConfigurationSnapshot, Slot};

/// Return a new snapshot with the fields owned by `payload`'s section
/// replaced. Other sections are carried over by `Arc` clone.
///
/// Empty strings in `payload` are kept as empty; they are never swapped
/// for defaults.
pub fn merge(current: &ConfigurationSnapshot, payload: &SectionPayload) -> ConfigurationSnapshot {
    let mut next = current.clone();

    match payload {
        SectionPayload::Site(info) => next.site = Slot::Loaded(Arc::new(info.clone())),
        SectionPayload::Appearance(theme) => {
            next.appearance = Slot::Loaded(Arc::new(theme.clone()))
        }
        SectionPayload::Menu(categories) => {
            next.menu = Slot::Loaded(Arc::new(categories.clone()))
        }
    }

    next
}

/// Outcome of merging a fetch result.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub snapshot: ConfigurationSnapshot,
    /// What the section cache should now hold.
    pub payload: SectionPayload,
}

/// Merge the result of a remote read.
///
/// `None` means the store has no row for the section. A section that was
/// already loaded keeps its data; one that never loaded becomes loaded
/// with explicit empty values.
pub fn merge_fetched(
    current: &ConfigurationSnapshot,
    section: Section,
    fetched: Option<SectionPayload>,
) -> Merged {
    match fetched {
        Some(payload) => Merged {
            snapshot: merge(current, &payload),
            payload,
        },
        None => match section_payload(current, section) {
            Some(payload) => Merged {
                snapshot: current.clone(),
                payload,
            },
            None => {
                let payload = SectionPayload::empty(section);
                Merged {
                    snapshot: merge(current, &payload),
                    payload,
                }
            }
        },
    }
}

/// The loaded value of `section` in `snapshot`, if any.
pub fn section_payload(snapshot: &ConfigurationSnapshot, section: Section) -> Option<SectionPayload> {
    match section {
        Section::Site => snapshot
            .site
            .get()
            .map(|info| SectionPayload::Site(info.clone())),
        Section::Appearance => snapshot
            .appearance
            .get()
            .map(|theme| SectionPayload::Appearance(theme.clone())),
        Section::Menu => snapshot
            .menu
            .get()
            .map(|menu| SectionPayload::Menu(menu.clone())),
    }
}
