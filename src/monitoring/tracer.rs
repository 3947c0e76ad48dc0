/*!
 * Call Tracing
 * Structured tracing for trapped calls using the tracing crate
 *
 * Features:
 * - Trace ID per trapped call for correlating relay traffic
 * - JSON-formatted logs for structured parsing
 * - Slow-call warnings (relay waits can stall on the front-end)
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

use crate::core::limits::SLOW_CALL_THRESHOLD;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SEMIHOST_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SEMIHOST_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for call correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one trapped call from decode to register write-back
pub struct CallSpan {
    span: tracing::Span,
    start: Instant,
    call_name: &'static str,
    trace_id: String,
}

impl CallSpan {
    pub fn new(call_name: &'static str, call_id: u32) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "semihosting_call",
            trace_id = %trace_id,
            call = call_name,
            call_id = call_id,
            return_value = tracing::field::Empty,
            interrupted = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            call_name,
            trace_id,
        }
    }

    /// Get the trace ID for this call
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record the value written back into r0
    pub fn record_return(&self, value: i32) {
        self.span.record("return_value", value);
    }

    /// Record whether the front-end flagged a user break
    pub fn record_interrupted(&self, interrupted: bool) {
        self.span.record("interrupted", interrupted);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for CallSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration > SLOW_CALL_THRESHOLD {
            warn!(
                trace_id = %self.trace_id,
                call = self.call_name,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow semihosting call"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                call = self.call_name,
                duration_us = duration.as_micros() as u64,
                "semihosting call completed"
            );
        }
    }
}
