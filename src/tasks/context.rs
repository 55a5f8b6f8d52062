use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::reconcile::ReconcileResult;

/// Shared context for task execution.
pub struct Context {
    /// Loaded configuration and manifests.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Whether to report changes without making them.
    pub dry_run: bool,
    /// Set by the Ctrl-C handler; checked between items.
    pub interrupted: Arc<AtomicBool>,
    results: Mutex<ReconcileResult>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("dry_run", &self.dry_run)
            .field("interrupted", &self.interrupted)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a context with a fresh, unset interrupt flag.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            log,
            executor,
            dry_run,
            interrupted: Arc::new(AtomicBool::new(false)),
            results: Mutex::new(ReconcileResult::default()),
        }
    }

    /// Share an existing interrupt flag (e.g. one wired to Ctrl-C).
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Whether an interrupt has been requested.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Append a reconcile pass to the run's outcome log.
    pub fn record(&self, result: ReconcileResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(result);
    }

    /// Take every recorded outcome, leaving the log empty.
    #[must_use]
    pub fn take_results(&self) -> ReconcileResult {
        std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
