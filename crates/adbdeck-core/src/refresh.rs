// ── Refresh coordinator ──
//
// Polls an enumerate operation and publishes the result as the view's
// record snapshot. At most one call is in flight; requests that arrive
// meanwhile collapse into a single trailing call. Empty results only
// replace a non-empty snapshot once confirmed by consecutive polls.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::batch::Reload;
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::stream::RecordStream;

/// The enumerate side of a view.
pub trait RecordSource: Send + Sync + 'static {
    type Record: Clone + PartialEq + Send + Sync + 'static;

    /// Short label used in logs and error messages.
    fn label(&self) -> &'static str;

    fn enumerate(&self) -> impl Future<Output = Result<Vec<Self::Record>, CoreError>> + Send;
}

/// Whether a refresh raises the `refreshing` indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Silent,
    Visible,
}

/// What happened to the last call a `refresh_now` led.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Applied,
    /// The result equalled the current snapshot.
    Unchanged,
    /// An empty result was held back pending confirmation.
    HeldEmpty,
    /// Another call was in flight; a trailing call was queued.
    Queued,
    /// The snapshot was invalidated while the call was in flight.
    Discarded,
    /// The call failed; the previous snapshot was kept.
    Failed(CoreError),
    /// The coordinator was torn down.
    Cancelled,
}

/// Observable poll state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStatus {
    /// A visible refresh is in progress.
    pub refreshing: bool,
    /// The timer is running.
    pub polling: bool,
    /// Message of the last failed call; cleared by the next success.
    pub last_error: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct PollSession {
    in_flight: bool,
    queued: bool,
    empty_streak: u32,
    generation: u64,
    torn_down: bool,
}

/// Called with every authoritative snapshot, after hysteresis.
///
/// Runs while the coordinator's session lock is held, so it must not call
/// back into the coordinator.
pub type PublishHook<R> = Box<dyn Fn(&[R]) + Send + Sync>;

/// Coordinates polling of one [`RecordSource`].
///
/// Cheaply cloneable; clones share the same session and snapshot.
pub struct RefreshCoordinator<S: RecordSource> {
    inner: Arc<Inner<S>>,
}

impl<S: RecordSource> Clone for RefreshCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S: RecordSource> {
    source: S,
    config: CoordinatorConfig,
    session: Mutex<PollSession>,
    records: watch::Sender<Arc<Vec<S::Record>>>,
    status: watch::Sender<PollStatus>,
    on_publish: Option<PublishHook<S::Record>>,
    teardown: CancellationToken,
    poller: Mutex<Option<CancellationToken>>,
}

impl<S: RecordSource> RefreshCoordinator<S> {
    pub fn new(source: S, config: CoordinatorConfig) -> Self {
        Self::build(source, config, None)
    }

    /// Like [`new`](Self::new), calling `hook` with every authoritative
    /// snapshot.
    pub fn with_publish_hook(source: S, config: CoordinatorConfig, hook: PublishHook<S::Record>) -> Self {
        Self::build(source, config, Some(hook))
    }

    fn build(source: S, config: CoordinatorConfig, on_publish: Option<PublishHook<S::Record>>) -> Self {
        let (records, _) = watch::channel(Arc::new(Vec::new()));
        let (status, _) = watch::channel(PollStatus::default());
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                session: Mutex::new(PollSession::default()),
                records,
                status,
                on_publish,
                teardown: CancellationToken::new(),
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// The last published snapshot.
    pub fn current_records(&self) -> Arc<Vec<S::Record>> {
        self.inner.records.borrow().clone()
    }

    pub fn subscribe(&self) -> RecordStream<S::Record> {
        RecordStream::new(self.inner.records.subscribe())
    }

    pub fn status(&self) -> PollStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PollStatus> {
        self.inner.status.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.status.borrow().refreshing
    }

    pub fn is_torn_down(&self) -> bool {
        self.session().torn_down
    }

    fn session(&self) -> MutexGuard<'_, PollSession> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Begin polling every `interval`, starting with an immediate visible
    /// refresh. Restarting replaces the previous timer. Must be called
    /// from within a Tokio runtime.
    pub fn start(&self, interval: Duration) {
        if self.is_torn_down() {
            warn!(source = self.inner.source.label(), "start after teardown ignored");
            return;
        }

        let token = self.inner.teardown.child_token();
        if let Some(previous) = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        self.session().empty_streak = 0;
        self.inner.status.send_if_modified(|s| !std::mem::replace(&mut s.polling, true));
        debug!(source = self.inner.source.label(), ?interval, "polling started");

        let this = self.clone();
        tokio::spawn(async move {
            this.refresh_now(RefreshMode::Visible).await;

            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        this.refresh_now(RefreshMode::Silent).await;
                    }
                }
            }
            trace!(source = this.inner.source.label(), "poll task exited");
        });
    }

    /// [`start`](Self::start) with the configured interval.
    pub fn start_default(&self) {
        self.start(self.inner.config.interval);
    }

    /// Stop the timer. A call already in flight still settles.
    pub fn stop(&self) {
        if let Some(token) = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
            let session = self.session();
            if !session.torn_down {
                self.inner.status.send_if_modified(|s| std::mem::replace(&mut s.polling, false));
            }
            debug!(source = self.inner.source.label(), "polling stopped");
        }
    }

    /// Stop polling for good. Any call in flight is dropped and nothing is
    /// published afterwards.
    pub fn teardown(&self) {
        {
            let mut session = self.session();
            if session.torn_down {
                return;
            }
            session.torn_down = true;
        }
        self.inner.teardown.cancel();
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!(source = self.inner.source.label(), "torn down");
    }

    /// Drop the current snapshot so that a call already in flight for the
    /// old source parameters is discarded when it settles.
    pub fn invalidate(&self) {
        let mut session = self.session();
        if session.torn_down {
            return;
        }
        session.generation += 1;
        session.empty_streak = 0;
        self.inner.records.send_if_modified(|current| {
            if current.is_empty() {
                false
            } else {
                *current = Arc::new(Vec::new());
                true
            }
        });
        self.inner.status.send_if_modified(|s| s.last_error.take().is_some());
        drop(session);
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Request a refresh.
    ///
    /// If a call is already in flight the request is folded into one
    /// queued trailing call and this returns [`RefreshOutcome::Queued`]
    /// immediately. Otherwise this call leads: it runs the enumerate call
    /// and any trailing call queued meanwhile, returning the outcome of the
    /// last one.
    pub async fn refresh_now(&self, mode: RefreshMode) -> RefreshOutcome {
        {
            let mut session = self.session();
            if session.torn_down {
                return RefreshOutcome::Cancelled;
            }
            if session.in_flight {
                session.queued = true;
                trace!(source = self.inner.source.label(), "refresh queued");
                return RefreshOutcome::Queued;
            }
            session.in_flight = true;
        }

        let mut guard = InFlightGuard {
            coordinator: self,
            armed: true,
        };
        let mut mode = mode;
        loop {
            let outcome = self.run_once(mode).await;
            if outcome == RefreshOutcome::Cancelled {
                return outcome;
            }

            let trailing = {
                let mut session = self.session();
                let trailing = session.queued && !session.torn_down;
                session.queued = false;
                if !trailing {
                    session.in_flight = false;
                }
                trailing
            };
            if trailing {
                mode = RefreshMode::Silent;
                continue;
            }
            guard.armed = false;
            return outcome;
        }
    }

    async fn run_once(&self, mode: RefreshMode) -> RefreshOutcome {
        let label = self.inner.source.label();
        let visible = mode == RefreshMode::Visible;
        let generation = {
            let session = self.session();
            if session.torn_down {
                return RefreshOutcome::Cancelled;
            }
            if visible {
                self.inner.status.send_if_modified(|s| !std::mem::replace(&mut s.refreshing, true));
            }
            session.generation
        };

        let limit = self.inner.config.call_timeout;
        let result = tokio::select! {
            biased;
            () = self.inner.teardown.cancelled() => return RefreshOutcome::Cancelled,
            result = tokio::time::timeout(limit, self.inner.source.enumerate()) => match result {
                Ok(result) => result,
                Err(_) => Err(CoreError::Timeout {
                    operation: format!("listing {label}"),
                    timeout_secs: limit.as_secs(),
                }),
            },
        };

        // Every write below happens under the session lock so that a
        // concurrent teardown either precedes all of them or follows them.
        let mut session = self.session();
        if session.torn_down {
            return RefreshOutcome::Cancelled;
        }
        if visible {
            self.inner.status.send_if_modified(|s| std::mem::replace(&mut s.refreshing, false));
        }
        if session.generation != generation {
            debug!(source = label, "stale result discarded");
            return RefreshOutcome::Discarded;
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                let e = e.during(&format!("listing {label}"));
                warn!(source = label, error = %e, "refresh failed");
                let message = e.to_string();
                self.inner.status.send_modify(|s| s.last_error = Some(message));
                drop(session);
                return RefreshOutcome::Failed(e);
            }
        };

        if records.is_empty() {
            session.empty_streak = session.empty_streak.saturating_add(1);
            let confirmed = session.empty_streak >= self.inner.config.empty_confirmations.max(1);
            if !confirmed && !self.inner.records.borrow().is_empty() {
                trace!(source = label, streak = session.empty_streak, "empty result held");
                self.mark_success();
                drop(session);
                return RefreshOutcome::HeldEmpty;
            }
        } else {
            session.empty_streak = 0;
        }

        self.mark_success();
        let changed = self.inner.records.send_if_modified(|current| {
            if current.as_slice() == records.as_slice() {
                false
            } else {
                *current = Arc::new(records);
                true
            }
        });
        if let Some(hook) = &self.inner.on_publish {
            let snapshot = self.current_records();
            hook(&snapshot);
        }
        drop(session);

        if changed {
            debug!(source = label, count = self.inner.records.borrow().len(), "snapshot published");
            RefreshOutcome::Applied
        } else {
            RefreshOutcome::Unchanged
        }
    }

    fn mark_success(&self) {
        self.inner.status.send_if_modified(|s| {
            s.last_refreshed = Some(Utc::now());
            s.last_error = None;
            true
        });
    }
}

impl<S: RecordSource> Reload for RefreshCoordinator<S> {
    async fn reload(&self) {
        self.refresh_now(RefreshMode::Visible).await;
    }
}

/// Releases the in-flight slot if the leading future is dropped early.
struct InFlightGuard<'a, S: RecordSource> {
    coordinator: &'a RefreshCoordinator<S>,
    armed: bool,
}

impl<S: RecordSource> Drop for InFlightGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.coordinator.session();
        session.in_flight = false;
        session.queued = false;
        if !session.torn_down {
            self.coordinator
                .inner
                .status
                .send_if_modified(|s| std::mem::replace(&mut s.refreshing, false));
        }
    }
}
