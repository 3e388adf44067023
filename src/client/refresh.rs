//! Per-view refresh loop.
//!
//! Each mounted view owns a timer task. A tick starts a fetch unless the
//! previous one is still outstanding; fetch results are published through a
//! `watch` channel. Unmounting stops the timer and makes any fetch that is
//! still running drop its result instead of publishing it.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::fetch::ClientError;

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: Option<T>,
    pub loading: bool,
    /// Fixed, user-facing message of the last failed fetch
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState {
            data: None,
            loading: true,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> ViewState<T> {
    fn settle(&mut self, result: Result<T, ClientError>, spec: &ViewSpec) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.updated_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(view = spec.name, "Refresh failed: {}", e);
                self.error = Some(spec.error_message.to_string());
            }
        }
    }
}

/// Static description of a view's refresh behaviour.
#[derive(Debug, Clone)]
pub struct ViewSpec {
    pub name: &'static str,
    /// `None` fetches once on mount
    pub period: Option<Duration>,
    pub error_message: &'static str,
}

impl ViewSpec {
    pub fn match_list(period: Duration) -> Self {
        ViewSpec {
            name: "match-list",
            period: Some(period),
            error_message: "Failed to load matches",
        }
    }

    pub fn live_score(period: Duration) -> Self {
        ViewSpec {
            name: "live-score",
            period: Some(period),
            error_message: "Failed to load live score",
        }
    }

    pub fn scorecard() -> Self {
        ViewSpec {
            name: "scorecard",
            period: None,
            error_message: "Failed to load scorecard",
        }
    }

    pub fn match_info() -> Self {
        ViewSpec {
            name: "match-info",
            period: None,
            error_message: "Failed to load match information",
        }
    }
}

/// Handle to a mounted view. Dropping it unmounts the view.
pub struct MountedView<T> {
    name: &'static str,
    state: Arc<watch::Sender<ViewState<T>>>,
    mounted: Arc<AtomicBool>,
    ticker: JoinHandle<()>,
}

impl<T> MountedView<T> {
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Stop refreshing. A fetch already in flight runs to completion but its
    /// result is discarded.
    pub fn unmount(&self) {
        if !self.is_mounted() {
            return;
        }
        self.ticker.abort();
        // Flip the flag under the channel's write lock so no settle can
        // interleave with it.
        self.state.send_if_modified(|_| {
            self.mounted.store(false, Ordering::Release);
            false
        });
        debug!(view = self.name, "View unmounted");
    }
}

impl<T> Drop for MountedView<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Flag the view as loading unless it has been unmounted. A tick that was
/// already being polled when `unmount` aborted the ticker lands here.
fn begin_fetch<T>(state: &watch::Sender<ViewState<T>>, mounted: &AtomicBool) -> bool {
    state.send_if_modified(|s| {
        if !mounted.load(Ordering::Acquire) {
            return false;
        }
        s.loading = true;
        true
    })
}

/// Mount a view: fetch immediately, then on every period tick.
pub fn mount<T, F, Fut>(spec: ViewSpec, fetch: F) -> MountedView<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    let (tx, _) = watch::channel(ViewState::default());
    let state = Arc::new(tx);
    let mounted = Arc::new(AtomicBool::new(true));
    let in_flight = Arc::new(AtomicBool::new(false));

    let ticker = {
        let state = Arc::clone(&state);
        let mounted = Arc::clone(&mounted);
        let spec = spec.clone();
        tokio::spawn(async move {
            info!(view = spec.name, period = ?spec.period, "View mounted");
            let mut interval = spec.period.map(|period| {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                interval
            });

            loop {
                if let Some(interval) = interval.as_mut() {
                    interval.tick().await;
                }

                if in_flight.swap(true, Ordering::AcqRel) {
                    debug!(view = spec.name, "Previous fetch still outstanding, skipping tick");
                } else {
                    if !begin_fetch(&*state, &*mounted) {
                        in_flight.store(false, Ordering::Release);
                        break;
                    }
                    let fut = fetch();
                    let state = Arc::clone(&state);
                    let mounted = Arc::clone(&mounted);
                    let in_flight = Arc::clone(&in_flight);
                    let spec = spec.clone();
                    tokio::spawn(async move {
                        let result = fut.await;
                        in_flight.store(false, Ordering::Release);
                        state.send_if_modified(|s| {
                            if !mounted.load(Ordering::Acquire) {
                                debug!(view = spec.name, "Discarding result fetched after unmount");
                                return false;
                            }
                            s.settle(result, &spec);
                            true
                        });
                    });
                }

                if interval.is_none() {
                    break;
                }
            }
        })
    };

    MountedView {
        name: spec.name,
        state,
        mounted,
        ticker,
    }
}
