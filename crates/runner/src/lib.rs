//! Process supervisor for the meter binaries.
//!
//! Named processes run concurrently on a shared [`CancellationToken`]. The
//! first failure, a SIGINT or a SIGTERM cancels the rest. Closers then run
//! once under a timeout.
//!
//! ```no_run
//! use meter_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_named_process("heartbeat", |ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => return Ok(()),
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("still alive");
//!                     }
//!                 }
//!             }
//!         })
//!         .with_closer(|| async move { Ok(()) })
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type BoxedResultFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Long-running unit of work; must return once the token is cancelled
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxedResultFuture + Send>;

/// Cleanup step run after every process has stopped
pub type Closer = Box<dyn FnOnce() -> BoxedResultFuture + Send>;

const DEFAULT_CLOSER_TIMEOUT: Duration = Duration::from_secs(10);

struct NamedProcess {
    name: String,
    process: AppProcess,
}

pub struct Runner {
    processes: Vec<NamedProcess>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: DEFAULT_CLOSER_TIMEOUT,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Register a process; its name shows up in lifecycle logs
    pub fn with_named_process<F, Fut>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.processes.push(NamedProcess {
            name: name.into(),
            process: Box::new(|token| Box::pin(process(token))),
        });
        self
    }

    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    /// Upper bound on the time all closers together may take
    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Share cancellation with something outside the runner
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Run everything, then exit the process with 0 or 1.
    pub async fn run(self) {
        spawn_signal_handlers(self.cancellation_token.clone());

        match self.run_until_complete().await {
            Ok(()) => {
                info!("Application exiting normally");
                std::process::exit(0);
            }
            Err(err) => {
                error!("Application exiting with error: {:#}", err);
                std::process::exit(1);
            }
        }
    }

    /// Run every process until they all return or one of them fails, then
    /// run the closers. Returns the first process error, if any.
    ///
    /// Unlike [`Runner::run`] this installs no signal handlers and never
    /// exits the process.
    pub async fn run_until_complete(self) -> anyhow::Result<()> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for NamedProcess { name, process } in self.processes {
            let process_token = token.clone();
            info!(process = %name, "Starting process");
            join_set.spawn(async move { (name, process(process_token).await) });
        }

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    debug!(process = %name, "Process completed");
                }
                Ok((name, Err(err))) => {
                    if token.is_cancelled() {
                        warn!(process = %name, "Process failed during shutdown: {:#}", err);
                    } else {
                        error!(process = %name, "Process failed: {:#}", err);
                        first_error = Some(err.context(format!("process '{}' failed", name)));
                        token.cancel();
                    }
                }
                Err(err) => {
                    error!("Process panicked: {}", err);
                    if first_error.is_none() && !token.is_cancelled() {
                        first_error = Some(anyhow::anyhow!("process panicked: {}", err));
                    }
                    token.cancel();
                }
            }
        }

        run_closers(self.closers, self.closer_timeout).await;

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT");
                ctrl_c_token.cancel();
            }
            Err(err) => error!("Failed to listen for SIGINT: {}", err),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM");
                token.cancel();
            }
            Err(err) => error!("Failed to listen for SIGTERM: {}", err),
        }
    });
}

async fn run_closers(closers: Vec<Closer>, timeout: Duration) {
    if closers.is_empty() {
        return;
    }

    info!("Running closers with timeout of {:?}", timeout);

    let mut closer_set = JoinSet::new();
    for closer in closers {
        closer_set.spawn(closer());
    }

    let drain = async {
        while let Some(result) = closer_set.join_next().await {
            match result {
                Ok(Ok(())) => debug!("Closer completed"),
                Ok(Err(err)) => error!("Closer error: {:#}", err),
                Err(err) => error!("Closer panicked: {}", err),
            }
        }
    };

    if tokio::time::timeout(timeout, drain).await.is_err() {
        error!("Closers timed out after {:?}", timeout);
        closer_set.abort_all();
    } else {
        info!("All closers completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn wait_for_cancel(ctx: CancellationToken) -> impl Future<Output = anyhow::Result<()>> {
        async move {
            ctx.cancelled().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_processes_stop_on_external_cancellation() {
        let token = CancellationToken::new();
        let closer_called = Arc::new(AtomicBool::new(false));
        let closer_flag = closer_called.clone();

        let runner = Runner::new()
            .with_named_process("first", wait_for_cancel)
            .with_named_process("second", wait_for_cancel)
            .with_closer(move || async move {
                closer_flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .with_cancellation_token(token.clone());

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        runner.run_until_complete().await.unwrap();
        assert!(closer_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_process_cancels_siblings() {
        let token = CancellationToken::new();

        let result = Runner::new()
            .with_named_process("sibling", wait_for_cancel)
            .with_named_process("broken", |_ctx| async move {
                Err(anyhow::anyhow!("listener bind failed"))
            })
            .with_cancellation_token(token.clone())
            .run_until_complete()
            .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("listener bind failed"));
        assert!(format!("{:#}", err).contains("broken"));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_completed_processes_return_ok() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut runner = Runner::new();
        for i in 0..3 {
            let runs = runs.clone();
            runner = runner.with_named_process(format!("worker_{}", i), move |_ctx| async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        runner.run_until_complete().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_closer_errors_do_not_stop_other_closers() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_flag = ran.clone();

        Runner::new()
            .with_closer(|| async move { Err(anyhow::anyhow!("flush failed")) })
            .with_closer(move || async move {
                ran_flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .run_until_complete()
            .await
            .unwrap();

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_slow_closer_is_bounded_by_timeout() {
        let started = tokio::time::Instant::now();

        Runner::new()
            .with_closer(|| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .with_closer_timeout(Duration::from_millis(50))
            .run_until_complete()
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
