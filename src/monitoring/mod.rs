/*!
 * Monitoring
 * Tracing setup and per-call spans
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, CallSpan};
