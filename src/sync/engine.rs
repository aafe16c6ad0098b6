//! The synchronization engine.
//!
//! Decides per section whether a request is served from the cache or the
//! remote store, collapses concurrent loads of one section into a single
//! fetch, and folds every successful read or write into the shared
//! snapshot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::merger;
use super::section::{Section, SectionLoadStatus, SectionPayload, SectionState, SectionUpdate};
use super::snapshot::ConfigurationSnapshot;
use super::SyncError;
use crate::cache::{CacheConfig, SectionCache};
use crate::events::{ConfigEvent, EventBus};
use crate::gateway::{ConfigGateway, GatewayError};

/// A load that other callers can attach to.
type SharedLoad = Shared<BoxFuture<'static, Result<(), SyncError>>>;

/// State mutated together under one lock.
struct EngineState {
    snapshot: Arc<ConfigurationSnapshot>,
    loaded: SectionLoadStatus,
    /// Bumped by every committed save. A load that started under an older
    /// epoch must not overwrite what the save wrote.
    save_epochs: [u64; 3],
    /// Bumped by every invalidation. A load that started under an older
    /// epoch may have read the row the invalidation was about, so its
    /// result is kept but not trusted as fresh.
    invalidate_epochs: [u64; 3],
}

/// Epochs a fetch captured when it was spawned.
#[derive(Debug, Clone, Copy)]
struct FetchEpochs {
    save: u64,
    invalidate: u64,
}

/// Removes a section's in-flight entry when its fetch task ends, whether
/// the fetch returned or the gateway panicked.
struct InflightGuard {
    engine: Arc<SyncEngine>,
    section: Section,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.engine.inflight.lock().remove(&self.section);
    }
}

/// Owns the configuration snapshot, the section cache and the event bus.
pub struct SyncEngine {
    gateway: Arc<dyn ConfigGateway>,
    cache: SectionCache,
    state: RwLock<EngineState>,
    inflight: Mutex<HashMap<Section, SharedLoad>>,
    events: EventBus,
    ready: watch::Sender<bool>,
    disposed: AtomicBool,
}

impl SyncEngine {
    /// Create an engine with an empty snapshot and cache.
    pub fn create(gateway: Arc<dyn ConfigGateway>, config: CacheConfig) -> Arc<Self> {
        let (ready, _) = watch::channel(false);

        info!("Sync engine created (cache ttl {:?})", config.ttl);

        Arc::new(Self {
            gateway,
            cache: SectionCache::new(config),
            state: RwLock::new(EngineState {
                snapshot: Arc::new(ConfigurationSnapshot::default()),
                loaded: SectionLoadStatus::default(),
                save_epochs: [0; 3],
                invalidate_epochs: [0; 3],
            }),
            inflight: Mutex::new(HashMap::new()),
            events: EventBus::new(),
            ready,
            disposed: AtomicBool::new(false),
        })
    }

    /// Current merged configuration.
    pub fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        Arc::clone(&self.state.read().snapshot)
    }

    /// Which sections have loaded at least once.
    pub fn section_loaded(&self) -> SectionLoadStatus {
        self.state.read().loaded
    }

    /// Where `section` is in its load lifecycle.
    pub fn state(&self, section: Section) -> SectionState {
        if self.inflight.lock().contains_key(&section) {
            return SectionState::Loading;
        }

        if self.state.read().loaded.get(section) {
            SectionState::Loaded {
                fresh: self.cache.is_fresh(section),
            }
        } else {
            SectionState::Unloaded
        }
    }

    /// The event bus consumers subscribe to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Time since `section` was last written to the cache.
    pub fn cache_age(&self, section: Section) -> Option<Duration> {
        self.cache.age(section)
    }

    /// Make `section` stale so the next load goes to the store.
    ///
    /// A fetch already in flight still updates the snapshot when it lands,
    /// but its result stays stale. Returns `false` if nothing was cached.
    pub fn invalidate(&self, section: Section, reason: &str) -> bool {
        let mut state = self.state.write();
        state.invalidate_epochs[section.index()] += 1;
        self.cache.invalidate(section, reason)
    }

    /// Ensure `section` is loaded and fresh.
    ///
    /// A fresh cache entry is served without touching the store. Otherwise
    /// one fetch is started, and any caller arriving while it runs waits
    /// on that same fetch. The fetch runs to completion even if every
    /// caller stops waiting.
    ///
    /// On failure the previously loaded value stays in place.
    pub async fn load_section(self: &Arc<Self>, section: Section) -> Result<(), SyncError> {
        self.ensure_live()?;

        let load = {
            let mut inflight = self.inflight.lock();

            // Checked under the lock: a finishing fetch writes the cache
            // before it removes itself from `inflight`.
            if self.cache.is_fresh(section) {
                debug!("Cache hit for {} section", section);
                return Ok(());
            }

            match inflight.get(&section) {
                Some(load) => {
                    debug!("Joining in-flight {} load", section);
                    load.clone()
                }
                None => {
                    let load = self.spawn_fetch(section);
                    inflight.insert(section, load.clone());
                    load
                }
            }
        };

        load.await
    }

    /// Load every section concurrently.
    pub async fn load_all(self: &Arc<Self>) -> Vec<(Section, Result<(), SyncError>)> {
        let loads = Section::ALL.map(|section| async move {
            (section, self.load_section(section).await)
        });

        join_all(loads).await
    }

    /// Reload every section that is not fresh: expired or invalidated
    /// ones, and ones that never loaded (a failed bootstrap is retried
    /// here). Returns the sections that failed.
    pub async fn refresh_stale(self: &Arc<Self>) -> Vec<SyncError> {
        let stale: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|section| !self.cache.is_fresh(*section))
            .collect();

        if stale.is_empty() {
            return Vec::new();
        }

        debug!("Refreshing stale sections: {:?}", stale);

        join_all(stale.into_iter().map(|section| self.load_section(section)))
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    /// Write a section to the store.
    ///
    /// Never served from the cache. On success the stored value replaces
    /// the cached one and is merged into the snapshot, then `ConfigSaved`
    /// (site, appearance) or `MenuSaved` (menu) is published. On failure
    /// nothing local changes.
    pub async fn save_section(&self, update: SectionUpdate) -> Result<(), SyncError> {
        self.ensure_live()?;
        let section = update.section();

        match self.persist(&update).await {
            Ok(snapshot) => {
                match section {
                    Section::Menu => self.events.publish(ConfigEvent::MenuSaved),
                    _ => self.events.publish(ConfigEvent::ConfigSaved {
                        snapshot,
                        success: true,
                        failed_sections: Vec::new(),
                    }),
                };
                Ok(())
            }
            Err(err) => {
                if section != Section::Menu {
                    self.events.publish(ConfigEvent::ConfigSaved {
                        snapshot: self.snapshot(),
                        success: false,
                        failed_sections: vec![section],
                    });
                }
                Err(err)
            }
        }
    }

    /// Write several sections concurrently and publish one `ConfigSaved`
    /// describing the whole batch.
    pub async fn save_sections(&self, updates: Vec<SectionUpdate>) -> Result<(), SyncError> {
        self.ensure_live()?;

        let results = join_all(updates.iter().map(|update| async move {
            (update.section(), self.persist(update).await)
        }))
        .await;

        let mut failed = Vec::new();
        let mut menu_saved = false;

        for (section, result) in results {
            match result {
                Ok(_) if section == Section::Menu => menu_saved = true,
                Ok(_) => {}
                Err(_) => failed.push(section),
            }
        }

        if menu_saved {
            self.events.publish(ConfigEvent::MenuSaved);
        }

        self.events.publish(ConfigEvent::ConfigSaved {
            snapshot: self.snapshot(),
            success: failed.is_empty(),
            failed_sections: failed.clone(),
        });

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SyncError::SectionsSaveFailed { failed })
        }
    }

    /// Put a locally stored payload into the snapshot without counting the
    /// section as loaded. The cache entry starts stale so the next load
    /// still goes to the store.
    ///
    /// Returns `false` if the section already holds remote data.
    pub fn seed_fallback(&self, payload: SectionPayload) -> bool {
        let section = payload.section();
        let mut state = self.state.write();

        if state.loaded.get(section) {
            return false;
        }

        state.snapshot = Arc::new(merger::merge(&state.snapshot, &payload));
        self.cache.write_stale(payload, "fallback");
        true
    }

    /// Mark startup as finished.
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until startup has finished.
    pub async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = ready.wait_for(|r| *r).await;
    }

    /// Tear the engine down. Later loads and saves fail with `Disposed`;
    /// the last snapshot stays readable.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inflight.lock().clear();
        self.cache.clear();
        self.events.clear();
        info!("Sync engine disposed");
    }

    fn ensure_live(&self) -> Result<(), SyncError> {
        if self.disposed.load(Ordering::SeqCst) {
            Err(SyncError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Start a fetch on its own task so it completes regardless of who is
    /// still waiting for it.
    fn spawn_fetch(self: &Arc<Self>, section: Section) -> SharedLoad {
        let epochs = {
            let state = self.state.read();
            FetchEpochs {
                save: state.save_epochs[section.index()],
                invalidate: state.invalidate_epochs[section.index()],
            }
        };
        let guard = InflightGuard {
            engine: Arc::clone(self),
            section,
        };
        let task = tokio::spawn(async move {
            let result = guard.engine.fetch(section, epochs).await;
            drop(guard);
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(SyncError::SectionLoadFailed {
                    section,
                    source: GatewayError::StoreUnavailable(format!("load task failed: {e}")),
                })
            })
        }
        .boxed()
        .shared()
    }

    async fn fetch(&self, section: Section, epochs: FetchEpochs) -> Result<(), SyncError> {
        debug!("Fetching {} section", section);

        let fetched = match self.gateway.get(section).await {
            Ok(fetched) => Ok(fetched),
            Err(GatewayError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        };

        match fetched {
            Ok(fetched) => {
                self.apply_fetched(section, epochs, fetched);
                Ok(())
            }
            Err(source) => {
                warn!("Failed to load {} section: {}", section, source);
                Err(SyncError::SectionLoadFailed { section, source })
            }
        }
    }

    fn apply_fetched(&self, section: Section, epochs: FetchEpochs, fetched: Option<SectionPayload>) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        let mut state = self.state.write();

        if state.save_epochs[section.index()] != epochs.save {
            debug!("Discarding {} load superseded by a save", section);
            return;
        }

        let merged = merger::merge_fetched(&state.snapshot, section, fetched);

        // Keep the old Arc when nothing changed so consumers comparing
        // pointers do not re-render.
        if merged.snapshot != *state.snapshot {
            state.snapshot = Arc::new(merged.snapshot);
        }

        if state.invalidate_epochs[section.index()] == epochs.invalidate {
            self.cache.write(merged.payload);
        } else {
            debug!("{} section invalidated while loading, keeping it stale", section);
            self.cache.write_stale(merged.payload, "invalidated during load");
        }
        state.loaded.set(section, true);
    }

    /// Write to the store and commit the stored value locally.
    async fn persist(&self, update: &SectionUpdate) -> Result<Arc<ConfigurationSnapshot>, SyncError> {
        let section = update.section();

        let stored = self.gateway.save(update).await.map_err(|source| {
            warn!("Failed to save {} section: {}", section, source);
            SyncError::SectionSaveFailed { section, source }
        })?;

        let mut state = self.state.write();
        state.save_epochs[section.index()] += 1;
        state.snapshot = Arc::new(merger::merge(&state.snapshot, &stored));
        self.cache.write(stored);
        state.loaded.set(section, true);

        debug!("Saved {} section", section);
        Ok(Arc::clone(&state.snapshot))
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("section_loaded", &self.section_loaded())
            .field("inflight", &self.inflight.lock().len())
            .field("events", &self.events)
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}
