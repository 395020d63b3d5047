//! Shared slot for the most recently fetched rate table

use tokio::sync::Mutex;
use tracing::debug;

use crate::core::rates::RateMapping;

struct Inner {
    latest: u64,
    mapping: Option<RateMapping>,
}

/// The single slot rate fetches install into.
///
/// Every fetch carries a ticket from [`begin`]; only the latest-issued
/// ticket may install its table, so a slow response that was
/// superseded by a newer base selection cannot clobber fresher rates.
///
/// [`begin`]: RateBook::begin
pub struct RateBook {
    inner: Mutex<Inner>,
}

impl RateBook {
    pub fn new() -> Self {
        RateBook {
            inner: Mutex::new(Inner {
                latest: 0,
                mapping: None,
            }),
        }
    }

    /// Issues the ticket for the next fetch.
    pub async fn begin(&self) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.latest += 1;
        inner.latest
    }

    /// Installs a mapping when `ticket` is still the latest issued.
    /// Returns whether the install happened.
    pub async fn install(&self, ticket: u64, mapping: RateMapping) -> bool {
        let mut inner = self.inner.lock().await;
        if ticket != inner.latest {
            debug!(
                "Discarding stale {} rates (ticket {ticket}, latest {})",
                mapping.base(),
                inner.latest
            );
            return false;
        }
        debug!("Installing {} rates for {}", mapping.len(), mapping.base());
        inner.mapping = Some(mapping);
        true
    }

    /// Clone of the current mapping, `None` until a fetch succeeds.
    pub async fn snapshot(&self) -> Option<RateMapping> {
        self.inner.lock().await.mapping.clone()
    }
}

impl Default for RateBook {
    fn default() -> Self {
        Self::new()
    }
}
