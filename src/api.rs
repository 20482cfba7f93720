use crate::config::KpiSettings;
use crate::error::SheetResult;
use crate::layout::{derive_layout, DerivedLayout};
use crate::loader;
use crate::types::AssessmentData;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Handle for one in-flight load. Only the most recently issued ticket may
/// install its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub section_id: String,
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Applied(Arc<DerivedLayout>),
    /// A newer request started before this one completed.
    Stale,
}

impl LoadOutcome {
    pub fn layout(&self) -> Option<&Arc<DerivedLayout>> {
        match self {
            Self::Applied(layout) => Some(layout),
            Self::Stale => None,
        }
    }
}

pub fn payload_digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Cache key of a derived layout: the payload digest plus the KPI settings
/// it was derived with.
pub fn layout_key(payload_digest: &str, kpi: &KpiSettings) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload_digest.as_bytes());
    hasher.update([kpi.kpi_individual, kpi.kpi_class]);
    hex::encode(hasher.finalize())
}

struct Loaded {
    section_id: String,
    payload_digest: String,
    key: String,
    data: Arc<AssessmentData>,
    layout: Arc<DerivedLayout>,
}

/// Owns the last derived layout for one viewer.
pub struct ResultSheetService {
    generation: AtomicU64,
    kpi: Mutex<KpiSettings>,
    loaded: Mutex<Option<Loaded>>,
}

impl Default for ResultSheetService {
    fn default() -> Self {
        Self::new(KpiSettings::default())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResultSheetService {
    pub fn new(kpi: KpiSettings) -> Self {
        Self {
            generation: AtomicU64::new(0),
            kpi: Mutex::new(kpi),
            loaded: Mutex::new(None),
        }
    }

    pub fn kpi(&self) -> KpiSettings {
        *lock(&self.kpi)
    }

    /// Starts a load for `section_id`, superseding every earlier ticket.
    pub fn begin(&self, section_id: &str) -> RequestTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("   Request #{} started for section '{}'", generation, section_id);
        RequestTicket {
            section_id: section_id.to_string(),
            generation,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Installs the payload fetched for `ticket`, unless a newer request
    /// started meanwhile. Identical input reuses the stored layout.
    pub fn complete(&self, ticket: &RequestTicket, raw: &str) -> SheetResult<LoadOutcome> {
        if !self.is_current(ticket) {
            warn!(
                "Discarding stale result #{} for section '{}'",
                ticket.generation, ticket.section_id
            );
            return Ok(LoadOutcome::Stale);
        }

        let kpi = self.kpi();
        let payload_digest = payload_digest(raw);
        let key = layout_key(&payload_digest, &kpi);
        {
            let loaded = lock(&self.loaded);
            if let Some(l) = loaded.as_ref() {
                if l.key == key && l.section_id == ticket.section_id {
                    debug!("   Input unchanged ({}), reusing layout", &key[..12]);
                    return Ok(LoadOutcome::Applied(Arc::clone(&l.layout)));
                }
            }
        }

        let normalized = loader::parse_response(raw)?;
        let layout = Arc::new(derive_layout(&normalized.data, &kpi));

        let mut loaded = lock(&self.loaded);
        // Re-check under the lock: a newer ticket may have been issued while
        // this one was deriving.
        if !self.is_current(ticket) {
            warn!(
                "Discarding stale result #{} for section '{}'",
                ticket.generation, ticket.section_id
            );
            return Ok(LoadOutcome::Stale);
        }
        *loaded = Some(Loaded {
            section_id: ticket.section_id.clone(),
            payload_digest,
            key,
            data: Arc::new(normalized.data),
            layout: Arc::clone(&layout),
        });
        info!(
            "Applied request #{} for section '{}'",
            ticket.generation, ticket.section_id
        );
        Ok(LoadOutcome::Applied(layout))
    }

    pub fn current(&self) -> Option<Arc<DerivedLayout>> {
        lock(&self.loaded).as_ref().map(|l| Arc::clone(&l.layout))
    }

    /// Validates and applies new KPI percentages, re-deriving the stored
    /// layout from its already normalized data.
    pub fn set_kpi(&self, kpi: KpiSettings) -> SheetResult<Option<Arc<DerivedLayout>>> {
        kpi.validate()?;
        *lock(&self.kpi) = kpi;

        let mut loaded = lock(&self.loaded);
        let Some(l) = loaded.as_mut() else {
            return Ok(None);
        };
        let layout = Arc::new(derive_layout(&l.data, &kpi));
        l.key = layout_key(&l.payload_digest, &kpi);
        l.layout = Arc::clone(&layout);
        info!("KPI updated to {}%/{}%", kpi.kpi_individual, kpi.kpi_class);
        Ok(Some(layout))
    }
}
