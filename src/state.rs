use crate::config::AppConfig;
use crate::models::black76::Black76;
use crate::models::{OptionType, PricingModel};
use crate::session::CalculationSnapshot;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

// ── Messages pushed to WS clients ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "curve_updated")]
    CurveUpdated {
        request_id: String,
        computed_at: String,
        option_type: OptionType,
        forward: f64,
        strike: f64,
        price: f64,
        point_count: usize,
    },

    #[serde(rename = "request_rejected")]
    RequestRejected { reason: String },
}

impl WsMessage {
    pub fn curve_updated(snapshot: &CalculationSnapshot) -> Self {
        Self::CurveUpdated {
            request_id: snapshot.request_id.clone(),
            computed_at: snapshot.computed_at.clone(),
            option_type: snapshot.contract.option_type,
            forward: snapshot.contract.forward,
            strike: snapshot.contract.strike,
            price: snapshot.result.price,
            point_count: snapshot.curve.len(),
        }
    }
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub calculations: AtomicU64,
    pub stale_results: AtomicU64,
    pub metric_reads: AtomicU64,
    pub rejected_requests: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            calculations: AtomicU64::new(0),
            stale_results: AtomicU64::new(0),
            metric_reads: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self::new()
    }
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,
    pub model: Arc<dyn PricingModel>,

    // Latest calculation. Replaced whole on every request, so readers never
    // see a curve mixing two requests.
    pub snapshot_tx: watch::Sender<Option<Arc<CalculationSnapshot>>>,
    pub snapshot_rx: watch::Receiver<Option<Arc<CalculationSnapshot>>>,

    // Event stream for WS clients
    pub ws_tx: broadcast::Sender<WsMessage>,

    // Handed out when a request arrives; orders publication
    next_sequence: AtomicU64,

    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Self::with_model(config, Arc::new(Black76::new()))
    }

    pub fn with_model(config: AppConfig, model: Arc<dyn PricingModel>) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        Arc::new(Self {
            config,
            model,
            snapshot_tx,
            snapshot_rx,
            ws_tx,
            next_sequence: AtomicU64::new(1),
            counters: PerfCounters::new(),
        })
    }

    /// Latest snapshot, if any calculation has completed.
    #[inline]
    pub fn latest(&self) -> Option<Arc<CalculationSnapshot>> {
        self.snapshot_rx.borrow().clone()
    }

    /// Reserve the arrival slot for a new request. Call before pricing.
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Atomically replace the cached snapshot and notify WS clients.
    /// A snapshot older than the cached one is dropped; returns whether it was published.
    pub fn publish(&self, snapshot: Arc<CalculationSnapshot>) -> bool {
        let msg = WsMessage::curve_updated(&snapshot);
        let sequence = snapshot.sequence;

        let published = self.snapshot_tx.send_if_modified(|current| {
            if current.as_ref().is_some_and(|c| c.sequence > sequence) {
                return false;
            }
            *current = Some(snapshot);
            true
        });

        if !published {
            self.counters.stale_results.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(sequence, "stale calculation result dropped");
            return false;
        }

        self.counters.calculations.fetch_add(1, Ordering::Relaxed);
        self.broadcast(msg);
        true
    }

    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        self.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
        let _ = self.ws_tx.send(msg);
    }
}
