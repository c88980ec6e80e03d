//! Port for reaching the CDN during availability probes.

use async_trait::async_trait;

use crate::domain::errors::ProbeError;

/// Issues a single liveness request.
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Requests `url`; any successful response means the CDN is alive.
    async fn fetch(&self, url: &str) -> Result<(), ProbeError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Scripted probe port. Replies are consumed in call order; once the
    /// script runs out every call fails.
    #[derive(Default)]
    pub struct MockProbePort {
        replies: Mutex<VecDeque<Result<(), ProbeError>>>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockProbePort {
        /// Creates a mock answering with the given replies.
        pub fn new(replies: impl IntoIterator<Item = Result<(), ProbeError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Self::default()
            }
        }

        /// Mock whose first request succeeds.
        pub fn healthy() -> Self {
            Self::new([Ok(())])
        }

        /// Mock where every request fails.
        pub fn down() -> Self {
            Self::new([])
        }

        /// Delays every reply.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// URLs requested so far.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ProbePort for MockProbePort {
        async fn fetch(&self, url: &str) -> Result<(), ProbeError> {
            self.calls.lock().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ProbeError::network("mock: connection refused")))
        }
    }
}
