//! One-shot CDN availability probe.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::domain::errors::ProbeError;
use crate::domain::ports::ProbePort;
use crate::domain::{AvailabilityState, ProbeOutcome};

/// Default deadline for the whole probe, retries included.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Where and how long to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Minimal resource tried first.
    pub primary_url: String,
    /// Resource tried once if the primary fails.
    pub secondary_url: String,
    /// Hard deadline for the whole probe.
    pub timeout: Duration,
}

/// Memoized liveness check driving the CDN fallback decision.
///
/// The first [`probe`](Self::probe) runs the check; concurrent callers share
/// the in-flight result and later callers get the settled state without
/// touching the network. A settled prober never checks again.
pub struct AvailabilityProber {
    port: Arc<dyn ProbePort>,
    settings: ProbeSettings,
    state: RwLock<AvailabilityState>,
    outcome: OnceCell<ProbeOutcome>,
    state_tx: watch::Sender<AvailabilityState>,
}

impl std::fmt::Debug for AvailabilityProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityProber")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AvailabilityProber {
    /// Creates a prober in the `Unknown` state.
    #[must_use]
    pub fn new(port: Arc<dyn ProbePort>, settings: ProbeSettings) -> Self {
        let (state_tx, _) = watch::channel(AvailabilityState::Unknown);
        Self {
            port,
            settings,
            state: RwLock::new(AvailabilityState::Unknown),
            outcome: OnceCell::new(),
            state_tx,
        }
    }

    /// Runs the probe if needed and returns the settled state.
    pub async fn probe(&self) -> AvailabilityState {
        self.outcome.get_or_init(|| self.run()).await.state()
    }

    /// Synchronous snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AvailabilityState {
        *self.state.read()
    }

    /// Returns true only once the probe settled as available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state().is_available()
    }

    /// Settled outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&ProbeOutcome> {
        self.outcome.get()
    }

    /// Receives every state transition; the terminal one is the last.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.state_tx.subscribe()
    }

    /// Settles the prober without network access.
    ///
    /// Returns false if a probe already settled or is in flight.
    pub fn force_outcome(&self, outcome: ProbeOutcome) -> bool {
        match self.outcome.set(outcome.clone()) {
            Ok(()) => {
                self.settle(&outcome);
                true
            }
            Err(_) => false,
        }
    }

    /// The configured probe settings.
    #[must_use]
    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    async fn run(&self) -> ProbeOutcome {
        self.transition(AvailabilityState::Checking);

        let outcome = match tokio::time::timeout(self.settings.timeout, self.check()).await {
            Ok(result) => ProbeOutcome::from(result),
            Err(_) => ProbeOutcome::Unavailable(ProbeError::timeout(self.settings.timeout)),
        };

        self.settle(&outcome);
        outcome
    }

    async fn check(&self) -> Result<(), ProbeError> {
        match self.port.fetch(&self.settings.primary_url).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!(error = %e, url = %self.settings.secondary_url, "Primary probe failed, retrying secondary path");
                self.port.fetch(&self.settings.secondary_url).await
            }
        }
    }

    fn settle(&self, outcome: &ProbeOutcome) {
        match outcome.reason() {
            None => info!("CDN available, serving optimized images"),
            Some(reason) => warn!(reason = %reason, "CDN unavailable, serving original images"),
        }
        self.transition(outcome.state());
    }

    fn transition(&self, next: AvailabilityState) {
        *self.state.write() = next;
        self.state_tx.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockProbePort;

    fn settings() -> ProbeSettings {
        ProbeSettings {
            primary_url: "https://cdn.test/probe.png?w=1&h=1".to_string(),
            secondary_url: "https://cdn.test/favicon.ico?w=1&h=1".to_string(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    #[tokio::test]
    async fn test_probe_success() {
        let port = Arc::new(MockProbePort::healthy());
        let prober = AvailabilityProber::new(port.clone(), settings());

        assert_eq!(prober.state(), AvailabilityState::Unknown);
        assert_eq!(prober.probe().await, AvailabilityState::Available);
        assert!(prober.is_available());
        assert_eq!(port.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_secondary_path_retry() {
        let port = Arc::new(MockProbePort::new([
            Err(ProbeError::network("HTTP 404")),
            Ok(()),
        ]));
        let prober = AvailabilityProber::new(port.clone(), settings());

        assert_eq!(prober.probe().await, AvailabilityState::Available);
        assert_eq!(
            port.calls(),
            vec![settings().primary_url, settings().secondary_url]
        );
    }

    #[tokio::test]
    async fn test_both_paths_fail() {
        let port = Arc::new(MockProbePort::down());
        let prober = AvailabilityProber::new(port.clone(), settings());

        assert_eq!(prober.probe().await, AvailabilityState::Unavailable);
        assert_eq!(port.calls().len(), 2);
        assert!(matches!(
            prober.outcome(),
            Some(ProbeOutcome::Unavailable(ProbeError::NetworkFailure { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_forces_unavailable() {
        let port = Arc::new(MockProbePort::healthy().with_delay(Duration::from_secs(10)));
        let prober = AvailabilityProber::new(port, settings());

        assert_eq!(prober.probe().await, AvailabilityState::Unavailable);
        assert_eq!(
            prober.outcome(),
            Some(&ProbeOutcome::Unavailable(ProbeError::Timeout { after_ms: 3000 }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_probe() {
        let port = Arc::new(MockProbePort::healthy().with_delay(Duration::from_millis(500)));
        let prober = Arc::new(AvailabilityProber::new(port.clone(), settings()));
        let mut rx = prober.subscribe();

        let first = tokio::spawn({
            let prober = prober.clone();
            async move { prober.probe().await }
        });
        rx.wait_for(|s| *s == AvailabilityState::Checking)
            .await
            .unwrap();
        assert_eq!(prober.state(), AvailabilityState::Checking);

        let (a, b) = tokio::join!(prober.probe(), first);

        assert_eq!(a, AvailabilityState::Available);
        assert_eq!(b.unwrap(), AvailabilityState::Available);
        assert_eq!(port.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_state_is_never_rechecked() {
        let port = Arc::new(MockProbePort::down());
        let prober = AvailabilityProber::new(port.clone(), settings());

        prober.probe().await;
        prober.probe().await;

        assert_eq!(port.calls().len(), 2);
        assert_eq!(prober.state(), AvailabilityState::Unavailable);
    }

    #[tokio::test]
    async fn test_subscribers_see_terminal_transition() {
        let prober = AvailabilityProber::new(Arc::new(MockProbePort::healthy()), settings());
        let mut rx = prober.subscribe();

        prober.probe().await;

        let state = *rx.wait_for(|s| s.is_terminal()).await.unwrap();
        assert_eq!(state, AvailabilityState::Available);
    }

    #[tokio::test]
    async fn test_force_outcome() {
        let port = Arc::new(MockProbePort::healthy());
        let prober = AvailabilityProber::new(port.clone(), settings());

        assert!(prober.force_outcome(ProbeOutcome::Unavailable(ProbeError::network("offline"))));
        assert!(!prober.force_outcome(ProbeOutcome::Available));

        assert_eq!(prober.probe().await, AvailabilityState::Unavailable);
        assert!(port.calls().is_empty());
    }
}
