//! Bounded-concurrency fan-out of model invocations.
//!
//! One task per record is spawned into a [`JoinSet`]; a [`Semaphore`] with
//! `workers` permits caps how many invocations are in flight. Each task returns
//! its record index and the collector writes that slot of a pre-sized buffer,
//! so output order equals input order whatever the completion order.
//!
//! Per-record failures (provider errors, timeouts, even a panicking invoker)
//! become [`RawResponse::Failed`] in their own slot. Only configuration errors
//! abort a batch, and they are raised before anything is invoked.

use std::sync::Arc;
use std::time::Duration;

use polarity_core::{
    BatchResult, ConfigError, ItemDiagnostics, ItemOutcome, LabelVocabulary, RawResponse,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::invoker::{InvocationError, ModelInvoker};
use crate::prompt::PromptTemplate;

/// Worker limit used when none is configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Outer deadline applied to each invocation unless overridden.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for one classification batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub model: String,
    pub template: String,
    pub vocabulary: LabelVocabulary,
    /// `None` means [`DEFAULT_WORKERS`].
    pub workers: Option<usize>,
    /// Retain [`ItemDiagnostics`] for every record.
    pub debug: bool,
    /// `None` disables the dispatcher-side deadline.
    pub call_timeout: Option<Duration>,
}

impl BatchConfig {
    pub fn new(
        model: impl Into<String>,
        template: impl Into<String>,
        vocabulary: LabelVocabulary,
    ) -> Self {
        Self {
            model: model.into(),
            template: template.into(),
            vocabulary,
            workers: None,
            debug: false,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn worker_limit(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }

    /// Check the settings and compile the prompt template.
    pub fn validate(&self) -> Result<PromptTemplate, ConfigError> {
        if self.worker_limit() == 0 {
            return Err(ConfigError::InvalidWorkerLimit);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        PromptTemplate::new(self.template.as_str())
    }
}

/// One record's rendered request. Correlated to its record by `index` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub index: usize,
    pub prompt: String,
}

/// Classify every record, returning one outcome per record in input order.
///
/// Never fails because of individual invocations; see the module docs.
pub async fn classify_batch<S: AsRef<str>>(
    invoker: Arc<dyn ModelInvoker>,
    records: &[S],
    config: &BatchConfig,
) -> Result<BatchResult, ConfigError> {
    let template = config.validate()?;
    let workers = config.worker_limit();
    let total = records.len();
    let started = Instant::now();

    info!(
        records = total,
        workers,
        model = %config.model,
        labels = config.vocabulary.len(),
        "dispatching classification batch"
    );

    let semaphore = Arc::new(Semaphore::new(workers));
    let model: Arc<str> = Arc::from(config.model.as_str());
    let mut tasks = JoinSet::new();

    for (index, record) in records.iter().enumerate() {
        let request = ClassificationRequest {
            index,
            prompt: template.render(record.as_ref(), &config.vocabulary),
        };
        let invoker = Arc::clone(&invoker);
        let semaphore = Arc::clone(&semaphore);
        let model = Arc::clone(&model);
        let call_timeout = config.call_timeout;
        let debug = config.debug;

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("batch semaphore is never closed");
            let outcome = run_one(invoker.as_ref(), &model, &request, call_timeout, debug).await;
            (request.index, outcome)
        });
    }

    let mut slots: Vec<Option<ItemOutcome>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => warn!(error = %e, "classification task did not complete"),
        }
    }

    let items: Vec<ItemOutcome> = slots
        .into_iter()
        .zip(records)
        .enumerate()
        .map(|(index, (slot, record))| {
            slot.unwrap_or_else(|| {
                let request = ClassificationRequest {
                    index,
                    prompt: template.render(record.as_ref(), &config.vocabulary),
                };
                failed_outcome(&request, "worker task panicked".to_string(), 0, config.debug)
            })
        })
        .collect();

    let result = BatchResult::new(items);
    info!(
        records = result.len(),
        failed = result.failed_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "classification batch complete"
    );
    Ok(result)
}

async fn run_one(
    invoker: &dyn ModelInvoker,
    model: &str,
    request: &ClassificationRequest,
    call_timeout: Option<Duration>,
    debug: bool,
) -> ItemOutcome {
    let started = Instant::now();
    let reply = match call_timeout {
        Some(limit) => tokio::time::timeout(limit, invoker.invoke(model, &request.prompt))
            .await
            .unwrap_or(Err(InvocationError::Timeout(limit))),
        None => invoker.invoke(model, &request.prompt).await,
    };
    let latency_ms = started.elapsed().as_millis() as u64;

    match reply {
        Ok(text) => {
            if debug {
                debug!(index = request.index, latency_ms, reply = %text, "model replied");
            }
            ItemOutcome {
                response: RawResponse::Reply(text),
                diagnostics: debug.then(|| ItemDiagnostics {
                    prompt: request.prompt.clone(),
                    latency_ms,
                    error: None,
                }),
            }
        }
        Err(e) => {
            warn!(index = request.index, latency_ms, error = %e, "model invocation failed");
            failed_outcome(request, e.to_string(), latency_ms, debug)
        }
    }
}

fn failed_outcome(
    request: &ClassificationRequest,
    reason: String,
    latency_ms: u64,
    debug: bool,
) -> ItemOutcome {
    ItemOutcome {
        diagnostics: debug.then(|| ItemDiagnostics {
            prompt: request.prompt.clone(),
            latency_ms,
            error: Some(reason.clone()),
        }),
        response: RawResponse::Failed(reason),
    }
}
