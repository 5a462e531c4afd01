//! Connectivity probe run before the first navigation.
//!
//! The main window starts on a local placeholder page. A small HTTP request
//! checks that the target site is reachable; on failure it is retried with
//! exponential backoff (250 ms doubling to a 4 s ceiling) for as long as the
//! process lives. The first success navigates the web view to the target,
//! exactly once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tauri::Url;

use crate::error::{ShellError, ShellResult};

/// Delay after the first failed probe.
pub const INITIAL_DELAY_MS: u64 = 250;

/// Delays never grow past this.
pub const MAX_DELAY_MS: u64 = 4000;

/// Per-request timeout for the HTTP probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Doubling retry delay with a hard ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    current_ms: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            current_ms: INITIAL_DELAY_MS,
        }
    }

    /// Delay to wait now; the following call returns double, up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current_ms;
        self.current_ms = (self.current_ms * 2).min(MAX_DELAY_MS);
        Duration::from_millis(delay)
    }
}

/// A single best-effort reachability check.
pub trait ReachabilityCheck: Send + Sync {
    fn check(&self) -> impl Future<Output = ShellResult<()>> + Send;
}

/// Performs the final navigation once the site is reachable.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url) -> ShellResult<()>;
}

/// Plain HTTP GET probe. Any transport error or HTTP error status fails.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> ShellResult<Self> {
        let client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ReachabilityCheck for HttpProbe {
    async fn check(&self) -> ShellResult<()> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Probes until reachable, then navigates once.
pub struct Prober<C, N> {
    check: C,
    navigator: N,
    target: Url,
    backoff: Mutex<Backoff>,
    navigated: AtomicBool,
}

impl<C: ReachabilityCheck, N: Navigator> Prober<C, N> {
    pub fn new(check: C, navigator: N, target: Url) -> Self {
        Self {
            check,
            navigator,
            target,
            backoff: Mutex::new(Backoff::new()),
            navigated: AtomicBool::new(false),
        }
    }

    /// Whether the final navigation has happened.
    pub fn has_navigated(&self) -> bool {
        self.navigated.load(Ordering::SeqCst)
    }

    /// Probe until the target is reachable. Returns immediately if the
    /// navigation already happened.
    pub async fn run(&self) {
        while !self.has_navigated() {
            let outcome = match self.check.check().await {
                Ok(()) => self.on_reachable().map(|_| ()),
                Err(e) => Err(e),
            };

            if let Err(e) = outcome {
                let delay = self.backoff.lock().next_delay();
                log::debug!(
                    "[PROBE] {} unreachable ({}), retrying in {} ms",
                    self.target,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Navigate to the target unless that already happened.
    ///
    /// Returns `Ok(true)` for the call that performed the navigation.
    pub fn on_reachable(&self) -> ShellResult<bool> {
        if self.navigated.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        match self.navigator.navigate(&self.target) {
            Ok(()) => {
                log::info!("[PROBE] {} reachable, navigating", self.target);
                Ok(true)
            },
            Err(e) => {
                self.navigated.store(false, Ordering::SeqCst);
                Err(ShellError::Probe(format!("navigation failed: {}", e)))
            },
        }
    }
}
