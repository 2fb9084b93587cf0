//! Tracing spans for request execution.

use std::future::Future;
use tracing::{field, info_span, Instrument, Span};

/// Span covering one call, including all of its retry attempts.
///
/// `attempt` and `outcome` start empty and are filled in by the executor.
pub fn call_span(method: &str, url: &str, server: &str) -> Span {
    info_span!(
        "call",
        method = %method,
        url = %url,
        server = %server,
        attempt = field::Empty,
        outcome = field::Empty,
    )
}

/// Record the current attempt number on `span`.
pub fn record_attempt(span: &Span, attempt: u32) {
    span.record("attempt", attempt);
}

/// Record the final outcome of a call on `span`.
pub fn record_outcome(span: &Span, outcome: &str) {
    span.record("outcome", outcome);
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %self.elapsed_ms(),
            "operation completed"
        );
    }
}
