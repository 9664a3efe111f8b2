use std::fmt;
use std::sync::Arc;

use tokio::time::sleep;

use crate::{
    response::parse_response,
    transport::{FailureKind, Transport},
    Payload, PrintessError, Request, Response, Result, RetryPolicy,
};

/// Retry + parse orchestration around one logical API call.
#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("transport", &self.transport.version_descriptor())
            .field("retry", &self.retry)
            .finish()
    }
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends `request`, retrying connect failures, and parses the response.
    ///
    /// The only suspension points besides the network call are the retry
    /// delays; dropping the returned future cancels a pending delay.
    pub async fn execute(&self, request: &Request) -> Result<Payload> {
        let response = self.send(request).await?;
        let parsed = parse_response(&response, request);
        #[cfg(feature = "tracing")]
        if let Err(err) = &parsed {
            tracing::debug!(status = response.status(), "printess call failed: {err}");
        }
        parsed
    }

    /// Retry loop without parsing: the buffered response of the first
    /// attempt that reached the server.
    pub(crate) async fn send(&self, request: &Request) -> Result<Response> {
        let mut attempt = 0usize;
        loop {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %request.method(),
                url = request.url(),
                attempt,
                "sending printess request"
            );

            let err = match self.transport.send(request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let decision = self.retry.decide(attempt, err.kind);
            if decision.should_retry {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    attempt,
                    delay_ms = decision.delay_ms,
                    "connect failure, retrying: {err}"
                );
                if decision.delay_ms > 0 {
                    sleep(decision.delay()).await;
                }
                attempt += 1;
                continue;
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt, "giving up on printess request: {err}");

            let kind = match err.kind {
                FailureKind::None => FailureKind::OtherTransportFailure,
                kind => kind,
            };
            return Err(PrintessError::transport(kind, err.message, request));
        }
    }
}
