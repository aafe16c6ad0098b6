//! Cold start: load every section once, concurrently.

use std::sync::Arc;

use tracing::{info, warn};

use super::{Section, SyncEngine, SyncError};
use crate::fallback::LocalStore;

/// What happened to each section during bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub loaded: Vec<Section>,
    pub failed: Vec<Section>,
    /// Failed sections that were filled from the local store.
    pub from_fallback: Vec<Section>,
}

/// Runs the initial load of all sections.
///
/// A failed section does not stop the others or the startup; it stays
/// unloaded (or holds local fallback data) until a later load succeeds.
pub struct BootstrapLoader {
    engine: Arc<SyncEngine>,
    fallback: Option<Arc<dyn LocalStore>>,
}

impl BootstrapLoader {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            fallback: None,
        }
    }

    /// Use `store` for sections the remote store cannot provide.
    #[must_use]
    pub fn with_fallback(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.fallback = Some(store);
        self
    }

    /// Load all sections, seed fallbacks, then mark the engine ready.
    pub async fn run(self) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for (section, result) in self.engine.load_all().await {
            match result {
                Ok(()) => report.loaded.push(section),
                Err(err) => {
                    warn!("Bootstrap could not load {} section: {}", section, err);
                    report.failed.push(section);

                    if self.seed_from_fallback(section, &err).await {
                        report.from_fallback.push(section);
                    }
                }
            }
        }

        self.engine.mark_ready();

        info!(
            "Bootstrap finished: loaded {:?}, failed {:?}, from fallback {:?}",
            report.loaded, report.failed, report.from_fallback
        );

        report
    }

    async fn seed_from_fallback(&self, section: Section, err: &SyncError) -> bool {
        let Some(store) = &self.fallback else {
            return false;
        };

        if matches!(err, SyncError::Disposed) {
            return false;
        }

        match store.read(section).await {
            Ok(Some(payload)) => {
                let seeded = self.engine.seed_fallback(payload);
                if seeded {
                    warn!("Serving {} section from local fallback", section);
                }
                seeded
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read local fallback for {} section: {:#}", section, e);
                false
            }
        }
    }
}
