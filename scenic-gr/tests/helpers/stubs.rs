//! Call-counting stand-ins for the completion service and taxonomy source

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use scenic_gr::completion::{CompletionError, CompletionRequest, CompletionService};
use scenic_gr::taxonomy::{DetailedRecord, InMemorySource, MainRecord, TaxonomyError, TaxonomySource};

/// Canned behaviour for one stage
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// Upstream answered with this HTTP status
    Status(u16),
    /// Never answers
    Hang,
}

/// Completion stub keyed on the requested output schema
pub struct ScriptedCompletion {
    main: Reply,
    sub: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(main: Reply, sub: Reply) -> Self {
        Self {
            main,
            sub,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompts sent for the given schema name, in call order
    pub fn prompts_for(&self, schema: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.output.name == schema)
            .map(|r| r.prompt)
            .collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match request.output.name {
            "main_genre_selection" => self.main.clone(),
            _ => self.sub.clone(),
        };
        self.requests.lock().unwrap().push(request);

        match reply {
            Reply::Json(value) => Ok(value),
            Reply::Status(status) => Err(CompletionError::Api {
                status,
                body: "upstream error".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(CompletionError::EmptyResponse)
            }
        }
    }
}

/// Taxonomy source that counts loads and can fail its first N attempts
pub struct CountingSource {
    inner: InMemorySource,
    loads: AtomicUsize,
    failures_left: AtomicUsize,
}

impl CountingSource {
    pub fn new(mains: Vec<MainRecord>, detailed: Vec<DetailedRecord>) -> Self {
        Self {
            inner: InMemorySource::new(mains, detailed),
            loads: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
        }
    }

    pub fn failing_first(self, attempts: usize) -> Self {
        self.failures_left.store(attempts, Ordering::SeqCst);
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaxonomySource for CountingSource {
    fn describe(&self) -> String {
        "counting test source".to_string()
    }

    async fn load_main_records(&self) -> Result<Vec<MainRecord>, TaxonomyError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to pile up on the same load
        tokio::time::sleep(Duration::from_millis(20)).await;

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TaxonomyError::Unavailable("scripted failure".to_string()));
        }
        self.inner.load_main_records().await
    }

    async fn load_detailed_records(&self) -> Result<Vec<DetailedRecord>, TaxonomyError> {
        self.inner.load_detailed_records().await
    }
}
