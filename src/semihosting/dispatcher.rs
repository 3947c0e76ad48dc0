/*!
 * Semihosting Dispatcher
 * Entry point for trapped calls: decode, execute through the backend, write back
 */

use std::io;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::limits::CALL_ID_REGISTER;
use crate::core::types::{RetCode, CALL_FAILED};
use crate::monitoring::CallSpan;
use crate::target::Target;

use super::backend::{Backend, DirectBackend};
use super::clock::ClockCalibration;
use super::config::SemihostingConfig;
use super::relay::{PacketHandler, RelayBackend, Transport};
use super::types::{CallKind, CallRequest, CallResult};

/// Services trapped calls for one debug session
pub struct SemihostingDispatcher {
    pub(super) backend: Box<dyn Backend>,
    pub(super) clock: Arc<ClockCalibration>,
    pub(super) config: SemihostingConfig,
}

// ============================================================================
// Construction
// ============================================================================

impl SemihostingDispatcher {
    /// Dispatcher over an already-built backend, with default configuration
    pub fn new(backend: Box<dyn Backend>) -> Self {
        info!(backend = backend.name(), "Semihosting dispatcher initialized");
        Self {
            backend,
            clock: ClockCalibration::shared(),
            config: SemihostingConfig::default(),
        }
    }

    /// Serve calls with the debugging host's own files and stdio
    pub fn direct(config: SemihostingConfig) -> Self {
        Self::new(Box::new(DirectBackend::stdio())).with_config(config)
    }

    /// Relay calls to the front-end over `transport`
    ///
    /// With `redirect_console` set, stdout/stderr writes go to the host's
    /// stdout instead of the front-end.
    pub fn relayed<T, H>(transport: T, handler: H, config: SemihostingConfig) -> Self
    where
        T: Transport + 'static,
        H: PacketHandler + 'static,
    {
        let mut backend =
            RelayBackend::new(transport, handler).with_system_calls(config.system_calls_allowed);
        if config.redirect_console {
            backend = backend.with_console_redirect(io::stdout());
        }
        Self::new(Box::new(backend)).with_config(config)
    }

    /// Use a private clock origin instead of the process-wide one
    pub fn with_clock(mut self, clock: Arc<ClockCalibration>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SemihostingConfig) -> Self {
        self.config = config;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl SemihostingDispatcher {
    pub fn config(&self) -> &SemihostingConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn clock_calibration(&self) -> &Arc<ClockCalibration> {
        &self.clock
    }

    /// Error code the errno call would report right now
    pub fn last_errno(&self) -> i32 {
        self.backend.last_errno()
    }

    /// Whether the debug link went away during the most recent relayed call
    pub fn session_lost(&self) -> bool {
        self.backend.link_lost()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

impl SemihostingDispatcher {
    /// Service the call the halted target trapped into
    ///
    /// The result lands in r0; the return value tells the caller whether the
    /// user interrupted the call on the front-end.
    pub fn handle_trapped_call(&mut self, target: &mut dyn Target) -> bool {
        let request = CallRequest::fetch(target);
        let result = self.execute(target, &request);
        target.write_register(CALL_ID_REGISTER, result.value as u32);
        result.interrupted
    }

    /// Execute an already-decoded call without touching r0
    pub fn execute(&mut self, target: &mut dyn Target, request: &CallRequest) -> CallResult {
        self.backend.begin_call();

        let span = CallSpan::new(request.kind.name(), request.kind.id());
        let _guard = span.enter();

        let [a0, a1, a2, a3] = request.params;
        info!(
            call = request.kind.name(),
            trace_id = %span.trace_id(),
            args = %format!("{a0:x} {a1:x} {a2:x} {a3:x}"),
            "semihosting call"
        );

        let value = self.dispatch(target, request);
        let interrupted = self.backend.interrupted();

        span.record_return(value);
        span.record_interrupted(interrupted);
        CallResult::new(value, interrupted)
    }

    fn dispatch(&mut self, target: &mut dyn Target, request: &CallRequest) -> RetCode {
        match request.kind {
            CallKind::Open => self.open(target, request),
            CallKind::Close => self.close(target, request),
            CallKind::Read => self.read(target, request),
            CallKind::Write => self.write(target, request),
            CallKind::WriteC => self.writec(target, request),
            CallKind::Write0 => self.write0(target, request),
            CallKind::IsTty => self.is_tty(target, request),
            CallKind::Seek => self.seek(target, request),
            CallKind::Rename => self.rename(target, request),
            CallKind::Remove => self.remove(target, request),
            CallKind::System => self.system(target, request),
            CallKind::Flen => self.file_length(target, request),
            CallKind::Clock => self.clock(target),
            CallKind::Time => self.time(target),
            CallKind::ReadC => self.readc(target),
            CallKind::Errno => self.errno(),
            CallKind::Exit => self.exit(target, request),
            CallKind::ExitExtended => self.exit_extended(target, request),
            CallKind::GetCmdline => self.get_cmdline(target, request),
            CallKind::IsError => self.is_error(request),
            CallKind::HeapInfo => self.heapinfo(target, request),
            CallKind::TmpNam => self.tmpnam(target, request),
            CallKind::Elapsed | CallKind::TickFreq => self.unsupported(request.kind),
            CallKind::Unrecognized(id) => {
                warn!(id = %format!("{id:#x}"), "unrecognized semihosting call");
                CALL_FAILED
            }
        }
    }
}
