//! Component wiring shared by the binary and integration tests

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::clipboard::Clipboard;
use crate::clock::Clock;
use crate::config::Config;
use crate::ledger::HistoryLedger;
use crate::lifecycle::Lifecycle;
use crate::notify::Notifier;
use crate::observability::Metrics;
use crate::options::OptionsStore;
use crate::parsing::{ParsingStateMachine, VideoParser};
use crate::remote::{BiliClient, ClientError};
use crate::store::{FjallStore, Storage, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client error: {0}")]
    Client(#[from] ClientError),
}

/// Open the configured fjall store, or an in-memory one when `ephemeral`
pub fn open_storage(config: &Config, ephemeral: bool) -> Result<Storage, StoreError> {
    if ephemeral {
        return Ok(Storage::in_memory());
    }
    let store = FjallStore::open(&config.store.fjall_path)?;
    let stats = store.stats()?;
    info!(
        local_records = stats.local.len(),
        synced_records = stats.synced.len(),
        "Store ready"
    );
    Ok(Storage::new(Arc::new(store)))
}

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub ledger: HistoryLedger,
    pub options: OptionsStore,
    pub state: Arc<ParsingStateMachine>,
    pub parser: Arc<VideoParser>,
    pub lifecycle: Arc<Lifecycle>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<Metrics>,
}

impl App {
    pub fn new(
        config: Config,
        storage: Storage,
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let client = BiliClient::new(config.endpoints.clone(), &config.http)?;
        let ledger = HistoryLedger::new(storage.clone());
        let options = OptionsStore::new(storage.clone());
        let state = Arc::new(
            ParsingStateMachine::new(storage.clone(), config.parsing.cooldown.as_millis_i64())
                .with_lease_ms(config.parsing.lease.as_millis_i64()),
        );
        let metrics = Arc::new(Metrics::new());

        let parser = VideoParser::builder()
            .client(client)
            .ledger(ledger.clone())
            .state(state.clone())
            .options(options.clone())
            .clipboard(clipboard)
            .notifier(notifier.clone())
            .clock(clock.clone())
            .reuse_window_ms(config.parsing.reuse_window.as_millis_i64())
            .metrics(metrics.clone())
            .build();

        let lifecycle = Lifecycle::new(
            storage.clone(),
            state.clone(),
            ledger.clone(),
            options.clone(),
            clock.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            ledger,
            options,
            state,
            parser: Arc::new(parser),
            lifecycle: Arc::new(lifecycle),
            notifier,
            clock,
            metrics,
        })
    }
}
