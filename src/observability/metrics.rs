//! Metrics registry and instrument handles.
//!
//! # Responsibilities
//! - Own the Prometheus recorder for the process
//! - Register counter/histogram instruments, each name exactly once
//! - Render all instrument values in Prometheus exposition format
//!
//! # Design Decisions
//! - One registry instance per process, constructed in `main` and shared
//!   via `Arc` — no global recorder, so tests can build isolated registries
//! - Duplicate instrument names are a fatal configuration error surfaced
//!   at startup; the first registration remains valid
//! - Recording goes through lock-free atomics inside the `metrics` crate;
//!   the mutex here only guards the one-time registration phase
//! - Recording problems (label arity mismatch) are logged and swallowed,
//!   never surfaced to the request path

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use metrics::{Key, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use thiserror::Error;

/// Error type for instrument registration.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// An instrument with this name has already been registered.
    #[error("instrument {0:?} already registered")]
    AlreadyRegistered(String),
}

/// Process-wide instrument registry.
///
/// Guarantees each instrument name is registered at most once. Handles
/// returned from registration record through the registry's recorder and
/// stay valid for the life of the process.
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    names: Mutex<HashSet<String>>,
}

/// Exponential buckets starting at 100ms, factor 1.5.
const DURATION_SECONDS_BUCKETS: &[f64] = &[0.1, 0.15, 0.225, 0.3375, 0.50625];

impl MetricsRegistry {
    /// Create a new registry with its own Prometheus recorder.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new()
            .set_buckets(DURATION_SECONDS_BUCKETS)
            .unwrap_or_else(|_| PrometheusBuilder::new())
            .build_recorder();
        let handle = recorder.handle();
        Self {
            recorder: Arc::new(recorder),
            handle,
            names: Mutex::new(HashSet::new()),
        }
    }

    /// Register a counter instrument.
    ///
    /// Fails if `name` has already been registered, leaving the earlier
    /// registration untouched.
    pub fn register_counter(
        &self,
        name: &str,
        label_names: &'static [&'static str],
    ) -> Result<CounterHandle, MetricsError> {
        self.claim_name(name)?;
        Ok(CounterHandle {
            recorder: self.recorder.clone(),
            name: name.to_string(),
            label_names,
        })
    }

    /// Register a histogram instrument.
    pub fn register_histogram(
        &self,
        name: &str,
        label_names: &'static [&'static str],
    ) -> Result<HistogramHandle, MetricsError> {
        self.claim_name(name)?;
        Ok(HistogramHandle {
            recorder: self.recorder.clone(),
            name: name.to_string(),
            label_names,
        })
    }

    /// Render a snapshot of all instrument values in exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    fn claim_name(&self, name: &str) -> Result<(), MetricsError> {
        let mut names = self
            .names
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !names.insert(name.to_string()) {
            return Err(MetricsError::AlreadyRegistered(name.to_string()));
        }
        Ok(())
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered counter, labeled per-observation.
#[derive(Clone)]
pub struct CounterHandle {
    recorder: Arc<PrometheusRecorder>,
    name: String,
    label_names: &'static [&'static str],
}

impl CounterHandle {
    /// Increment the counter for the given label values.
    ///
    /// Label values are positional, matching the label names the
    /// instrument was registered with.
    pub fn increment(&self, label_values: &[&str]) {
        let Some(labels) = zip_labels(&self.name, self.label_names, label_values) else {
            return;
        };
        let key = Key::from_parts(self.name.clone(), labels);
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        self.recorder.register_counter(&key, &metadata).increment(1);
    }
}

/// Handle to a registered histogram, labeled per-observation.
#[derive(Clone)]
pub struct HistogramHandle {
    recorder: Arc<PrometheusRecorder>,
    name: String,
    label_names: &'static [&'static str],
}

impl HistogramHandle {
    /// Observe a value for the given label values.
    pub fn observe(&self, value: f64, label_values: &[&str]) {
        let Some(labels) = zip_labels(&self.name, self.label_names, label_values) else {
            return;
        };
        let key = Key::from_parts(self.name.clone(), labels);
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        self.recorder
            .register_histogram(&key, &metadata)
            .record(value);
    }
}

/// Pair label names with values; a mismatch is logged and dropped so a
/// metrics mistake can never affect the response being produced.
fn zip_labels(
    name: &str,
    label_names: &[&'static str],
    label_values: &[&str],
) -> Option<Vec<Label>> {
    if label_names.len() != label_values.len() {
        tracing::warn!(
            instrument = name,
            expected = label_names.len(),
            got = label_values.len(),
            "label arity mismatch, dropping observation"
        );
        return None;
    }
    Some(
        label_names
            .iter()
            .zip(label_values)
            .map(|(k, v)| Label::new(*k, v.to_string()))
            .collect(),
    )
}

/// The request instruments every route is wrapped with.
///
/// Names and labels match the scaffold's Prometheus conventions:
/// `http_requests_total` partitioned by handler, method, and status;
/// `http_requests_duration_seconds` partitioned by handler.
#[derive(Clone)]
pub struct RequestMetrics {
    pub requests: CounterHandle,
    pub duration: HistogramHandle,
}

impl RequestMetrics {
    /// Register both request instruments. Fails fast on duplicate names.
    pub fn register(registry: &MetricsRegistry) -> Result<Self, MetricsError> {
        let requests =
            registry.register_counter("http_requests_total", &["handler", "method", "status"])?;
        let duration =
            registry.register_histogram("http_requests_duration_seconds", &["handler"])?;
        Ok(Self { requests, duration })
    }
}
