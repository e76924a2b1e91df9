//! Per-tenant notification queue and the background poller that fills it.
//!
//! The poller wakes on a fixed interval, scans every onboarded tenant, and
//! queues alerts whose kind is not already pending. `GET /notifications`
//! drains the queue. Nothing is persisted, so a restart drops queued alerts.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use mona_core::TenantId;

use crate::db::{RepositoryError, StoreSettingsRepository};
use crate::intelligence::{
    Alert, AlertKind, BusinessMetrics, compute_alerts, dedup_by_kind, morning_briefing_text,
};

/// Bounded in-memory notification queues with a background poller.
///
/// Cloning is cheap; clones share the same queues and poller.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

struct Inner {
    queues: Mutex<HashMap<TenantId, VecDeque<Alert>>>,
    capacity: usize,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationService {
    /// Create a service holding at most `capacity` alerts per tenant.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                queues: Mutex::new(HashMap::new()),
                capacity: capacity.max(1),
                shutdown,
                task: Mutex::new(None),
            }),
        }
    }

    fn queues(&self) -> MutexGuard<'_, HashMap<TenantId, VecDeque<Alert>>> {
        self.inner
            .queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an alert unless one of the same kind is already pending.
    ///
    /// At capacity the oldest alert is evicted. Returns whether the alert
    /// was queued.
    pub fn enqueue(&self, tenant: &TenantId, alert: Alert) -> bool {
        let mut queues = self.queues();
        let queue = queues.entry(tenant.clone()).or_default();

        if queue.iter().any(|queued| queued.kind == alert.kind) {
            return false;
        }
        if queue.len() >= self.inner.capacity {
            if let Some(evicted) = queue.pop_front() {
                debug!(user_id = %tenant, kind = ?evicted.kind, "Notification queue full, evicting oldest");
            }
        }

        if alert.kind == AlertKind::MorningBriefing {
            queue.push_front(alert);
        } else {
            queue.push_back(alert);
        }
        true
    }

    /// Queue several alerts; returns how many were new.
    pub fn enqueue_all(&self, tenant: &TenantId, alerts: impl IntoIterator<Item = Alert>) -> usize {
        alerts
            .into_iter()
            .filter(|alert| self.enqueue(tenant, alert.clone()))
            .count()
    }

    /// Remove and return everything queued for a tenant.
    pub fn drain(&self, tenant: &TenantId) -> Vec<Alert> {
        self.queues()
            .remove(tenant)
            .map(Vec::from)
            .unwrap_or_default()
    }

    /// Number of alerts waiting for a tenant.
    #[must_use]
    pub fn pending(&self, tenant: &TenantId) -> usize {
        self.queues().get(tenant).map_or(0, VecDeque::len)
    }

    /// Drain queued alerts and merge in freshly computed ones, one per kind.
    pub async fn fetch(&self, pool: &SqlitePool, tenant: &TenantId) -> Vec<Alert> {
        let queued = self.drain(tenant);
        let fresh = fresh_alerts(pool, tenant).await;
        dedup_by_kind(queued.into_iter().chain(fresh))
    }

    /// Run one scan over all onboarded tenants. Returns alerts queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant list cannot be read. Per-tenant
    /// failures are logged and skipped.
    #[instrument(skip(self, pool))]
    pub async fn poll_once(
        &self,
        pool: &SqlitePool,
        now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let tenants = StoreSettingsRepository::new(pool).onboarded_tenants().await?;
        let mut queued = 0;

        for tenant in &tenants {
            let metrics = match BusinessMetrics::collect(pool, Some(tenant), now).await {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(user_id = %tenant, error = %e, "Skipping tenant in notification scan");
                    continue;
                }
            };

            let mut alerts = compute_alerts(&metrics);
            if is_briefing_window(now) {
                alerts.insert(0, Alert::briefing(morning_briefing_text(&metrics.orders, now)));
            }
            queued += self.enqueue_all(tenant, alerts);
        }

        info!(stores = tenants.len(), queued, "Notification check complete");
        Ok(queued)
    }

    /// Spawn the background poller. Calling this twice has no effect; after
    /// [`shutdown`](Self::shutdown) the poller can be started again.
    pub fn start(&self, pool: SqlitePool, interval: Duration) {
        let mut task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            warn!("Notification poller already running");
            return;
        }

        self.inner.shutdown.send_replace(false);
        let service = self.clone();
        let mut shutdown = self.inner.shutdown.subscribe();

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "Notification poller started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = service.poll_once(&pool, Utc::now()).await {
                            error!(error = %e, "Notification scan failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow_and_update() {
                            break;
                        }
                    }
                }
            }

            info!("Notification poller stopped");
        }));
    }

    /// Stop the poller and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
        let handle = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Notification poller panicked");
            }
        }
    }
}

/// Alerts for a tenant computed from current data; empty on failure.
pub async fn fresh_alerts(pool: &SqlitePool, tenant: &TenantId) -> Vec<Alert> {
    match BusinessMetrics::collect(pool, Some(tenant), Utc::now()).await {
        Ok(metrics) => compute_alerts(&metrics),
        Err(e) => {
            error!(user_id = %tenant, error = %e, "Failed to compute notifications");
            Vec::new()
        }
    }
}

/// 08:00 to 08:29 UTC.
fn is_briefing_window(now: DateTime<Utc>) -> bool {
    now.hour() == 8 && now.minute() < 30
}
