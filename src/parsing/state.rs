//! Process-wide parsing status with busy and cooldown gating

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::store::{Result, Storage, StoreKey};

/// Default minimum spacing between network parses
pub const DEFAULT_COOLDOWN_MS: i64 = 5_000;

/// Default age after which a `parsing` status left by a dead holder is reclaimed
pub const DEFAULT_LEASE_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsingStatus {
    Parsable,
    Parsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another network parse is in flight
    Busy,
    /// The previous attempt finished less than the cooldown ago
    Cooldown { remaining_ms: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginParse {
    Accepted,
    Rejected(Rejection),
}

/// Gate in front of the network parse.
///
/// Status and timestamps live in the store so the CLI and long-running hosts
/// observe the same state. `gate` serializes check-and-set within a process.
/// A `parsing` status older than the lease is treated as abandoned, which
/// recovers from a holder that died without releasing.
pub struct ParsingStateMachine {
    storage: Storage,
    cooldown_ms: i64,
    lease_ms: i64,
    gate: Mutex<()>,
    held: AtomicBool,
}

impl ParsingStateMachine {
    pub fn new(storage: Storage, cooldown_ms: i64) -> Self {
        Self {
            storage,
            cooldown_ms,
            lease_ms: DEFAULT_LEASE_MS,
            gate: Mutex::new(()),
            held: AtomicBool::new(false),
        }
    }

    pub fn with_lease_ms(mut self, lease_ms: i64) -> Self {
        self.lease_ms = lease_ms;
        self
    }

    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_ms
    }

    pub fn lease_ms(&self) -> i64 {
        self.lease_ms
    }

    /// True while a parse accepted by this process has not been released
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Reset to parsable, clearing a status left behind by a dead process
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.gate.lock().await;
        let previous: ParsingStatus = self.storage.load(StoreKey::ParsingStatus).await?;
        if previous == ParsingStatus::Parsing {
            info!("Clearing stale parsing status");
        }
        self.storage
            .save(StoreKey::ParsingStatus, &ParsingStatus::Parsable)
            .await?;
        self.held.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub async fn status(&self) -> Result<ParsingStatus> {
        self.storage.load(StoreKey::ParsingStatus).await
    }

    pub async fn last_parsing_timestamp(&self) -> Result<i64> {
        self.storage.load(StoreKey::LastParsingTimestamp).await
    }

    pub async fn try_begin_parse(&self, now: i64) -> Result<BeginParse> {
        let _guard = self.gate.lock().await;

        if self.status().await? == ParsingStatus::Parsing {
            let leased_at: i64 = self.storage.load(StoreKey::ParsingLeaseTimestamp).await?;
            let held_ms = now.saturating_sub(leased_at);
            if held_ms < self.lease_ms {
                debug!("Parse rejected: busy");
                return Ok(BeginParse::Rejected(Rejection::Busy));
            }
            warn!(held_ms, "Reclaiming expired parsing status");
        }

        let elapsed = now.saturating_sub(self.last_parsing_timestamp().await?);
        if elapsed < self.cooldown_ms {
            let remaining_ms = self.cooldown_ms - elapsed;
            debug!(remaining_ms, "Parse rejected: cooldown");
            return Ok(BeginParse::Rejected(Rejection::Cooldown { remaining_ms }));
        }

        self.storage
            .save(StoreKey::ParsingLeaseTimestamp, &now)
            .await?;
        self.storage
            .save(StoreKey::ParsingStatus, &ParsingStatus::Parsing)
            .await?;
        self.held.store(true, Ordering::SeqCst);
        debug!(now, "Parse accepted");
        Ok(BeginParse::Accepted)
    }

    /// Release the gate and stamp the attempt time, whatever the result
    pub async fn end_parse(&self, now: i64) -> Result<()> {
        let _guard = self.gate.lock().await;
        self.storage
            .save(StoreKey::ParsingStatus, &ParsingStatus::Parsable)
            .await?;
        self.storage.save(StoreKey::LastParsingTimestamp, &now).await?;
        self.held.store(false, Ordering::SeqCst);
        debug!(now, "Parse released");
        Ok(())
    }

    /// Release the status if a parse accepted here is still holding it.
    /// Returns whether anything was released.
    pub async fn release_held(&self, now: i64) -> Result<bool> {
        if !self.is_held() {
            return Ok(false);
        }
        self.end_parse(now).await?;
        Ok(true)
    }
}

/// Ownership of the parsing status for one accepted parse.
///
/// [`ParseLease::release`] ends the parse. A lease dropped without being
/// released (cancelled future, aborted task, panic) schedules the release on
/// the current tokio runtime.
#[must_use = "dropping the lease releases the parsing status"]
pub struct ParseLease {
    state: Arc<ParsingStateMachine>,
    clock: Arc<dyn Clock>,
    released: bool,
}

impl ParseLease {
    /// Wrap a status already taken with [`ParsingStateMachine::try_begin_parse`]
    pub fn new(state: Arc<ParsingStateMachine>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state,
            clock,
            released: false,
        }
    }

    pub async fn release(mut self) -> Result<()> {
        let result = self.state.end_parse(self.clock.now_ms()).await;
        self.released = true;
        result
    }
}

impl Drop for ParseLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let state = Arc::clone(&self.state);
        let now = self.clock.now_ms();
        match Handle::try_current() {
            Ok(handle) => {
                warn!("Parse abandoned before completion, releasing parsing status");
                handle.spawn(async move {
                    if let Err(e) = state.end_parse(now).await {
                        error!(error = %e, "Failed to release abandoned parsing status");
                    }
                });
            }
            Err(_) => {
                error!("No runtime to release abandoned parsing status, waiting for lease expiry");
            }
        }
    }
}
