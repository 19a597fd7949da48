//! In-memory token revocation store

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Concurrent set of revoked token keys, each held until the token would
/// have expired anyway.
///
/// Entries past their expiry are logically absent: lookups evict them lazily
/// and [`RevocationStore::sweep`] removes them in bulk.
#[derive(Debug, Default)]
pub struct RevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token key until `expires_at`.
    ///
    /// Idempotent; the first recorded expiry wins.
    pub fn revoke(&self, key: impl Into<String>, expires_at: DateTime<Utc>) {
        self.entries.entry(key.into()).or_insert(expires_at);
    }

    pub fn is_revoked(&self, key: &str) -> bool {
        self.is_revoked_at(key, Utc::now())
    }

    /// True iff the key is revoked and its entry has not yet expired at `now`
    pub fn is_revoked_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        let expires_at = match self.entries.get(key) {
            Some(entry) => *entry.value(),
            None => return false,
        };

        if expires_at > now {
            return true;
        }

        // The read guard is released above; removing while holding it would
        // deadlock on the shard.
        self.entries.remove_if(key, |_, exp| *exp <= now);
        false
    }

    /// Remove every entry expired at `now`, returning how many were removed
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;

        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Background task that periodically sweeps a [`RevocationStore`]
#[derive(Debug)]
pub struct RevocationSweeper {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RevocationSweeper {
    /// Start sweeping `store` every `period`
    pub fn spawn(store: Arc<RevocationStore>, period: Duration) -> Self {
        let (shutdown, mut stop) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let removed = store.sweep(Utc::now());
                        if removed > 0 {
                            debug!(removed, remaining = store.len(), "Swept expired revocations");
                        }
                    }
                }
            }
        });

        info!(period_secs = period.as_secs(), "Revocation sweeper started");

        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            debug!(error = %e, "Revocation sweeper task ended abnormally");
        }
        info!("Revocation sweeper stopped");
    }
}
