/*!
 * Relayed Backend
 * Forwards each call to the debugging front-end and waits for its reply
 *
 * The relay shares one channel with the rest of the debug protocol, so while a
 * reply is outstanding every other inbound packet is handed to the main loop.
 * Calls that need a host-side result structure (fstat, gettimeofday and the
 * one-byte console read) point the front-end at a local scratch buffer; the
 * main loop's memory writes land there through the scratch-routed capability
 * and the buffer is decoded once the reply arrives.
 */

mod reply;
mod request;
mod transport;

pub use reply::RelayReply;
pub use request::{RelayRequest, SeekWhence};
pub use transport::{IgnoreUnrelated, PacketDisposition, PacketHandler, Transport};

use std::io::Write;
use tracing::{debug, error, info, warn};

use crate::core::errors::{MarshalError, RelayError};
use crate::core::limits::{
    CONSOLE_CHUNK_SIZE, LOCAL_SCRATCH_BASE, REPLY_MARKER, STAT_BUFFER_SIZE, STAT_SIZE_OFFSET,
    STDERR_FD, STDIN_FD, STDOUT_FD, TIMEVAL_BUFFER_SIZE,
};
use crate::core::types::{Fd, RelayResult, RetCode, TargetAddr, CALL_FAILED, TARGET_NULL};
use crate::semihosting::marshal::{self, TargetString};
use crate::semihosting::types::{OpenFlags, TargetErrno, TimeValue};
use crate::target::{MemoryAccess, ScratchBuffer, Target};

use super::backend::Backend;

/// Backend that relays every call over the debug link
pub struct RelayBackend<T: Transport, H: PacketHandler> {
    transport: T,
    handler: H,
    errno: i32,
    interrupted: bool,
    link_lost: bool,
    system_calls_allowed: bool,
    console_sink: Option<Box<dyn Write + Send>>,
}

impl<T: Transport, H: PacketHandler> RelayBackend<T, H> {
    pub fn new(transport: T, handler: H) -> Self {
        Self {
            transport,
            handler,
            errno: 0,
            interrupted: false,
            link_lost: false,
            system_calls_allowed: false,
            console_sink: None,
        }
    }

    /// Allow `system` to be relayed; the front-end must also permit it
    pub fn with_system_calls(mut self, allowed: bool) -> Self {
        self.system_calls_allowed = allowed;
        self
    }

    /// Stream stdout/stderr writes to `sink` instead of the front-end
    pub fn with_console_redirect(mut self, sink: impl Write + Send + 'static) -> Self {
        self.console_sink = Some(Box::new(sink));
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Drain inbound traffic until the reply to the pending call arrives
    pub fn await_reply(&mut self, access: &mut MemoryAccess<'_>) -> RelayResult<RelayReply> {
        loop {
            let packet = self.transport.receive()?;
            if self.transport.is_escape(&packet) {
                return Err(RelayError::Escaped);
            }
            if let Some((&REPLY_MARKER, body)) = packet.split_first() {
                return Ok(RelayReply::decode(body)?);
            }
            match self.handler.handle_packet(&packet, access) {
                PacketDisposition::Disconnected => return Err(RelayError::Disconnected),
                PacketDisposition::Handled | PacketDisposition::Unhandled => {}
            }
        }
    }

    fn exchange(
        &mut self,
        request: &RelayRequest,
        access: &mut MemoryAccess<'_>,
    ) -> RelayResult<RelayReply> {
        let packet = request.encode();
        debug!(request = request.name(), packet = %packet, "relaying call");
        self.transport.send(&packet)?;
        self.await_reply(access)
    }

    /// One request/reply round trip; failures collapse to -1
    fn call(&mut self, request: RelayRequest, access: &mut MemoryAccess<'_>) -> RetCode {
        match self.exchange(&request, access) {
            Ok(reply) => {
                self.errno = reply.errno;
                self.interrupted = reply.interrupted;
                if reply.interrupted {
                    info!(request = request.name(), "front-end reported a user break");
                }
                reply.retcode
            }
            Err(err) if err.is_link_loss() => {
                error!(request = request.name(), error = %err, "debug link lost during relay call");
                self.link_lost = true;
                self.interrupted = false;
                CALL_FAILED
            }
            Err(err) => {
                warn!(request = request.name(), error = %err, "undecodable relay reply");
                self.interrupted = false;
                self.errno = TargetErrno::Unknown.code();
                CALL_FAILED
            }
        }
    }

    fn call_target(&mut self, target: &mut dyn Target, request: RelayRequest) -> RetCode {
        self.call(request, &mut MemoryAccess::target(target))
    }

    /// Run `request` with memory traffic captured in a fresh scratch buffer.
    /// The scratch route ends with the inner access on every path.
    fn scratch_call(
        &mut self,
        target: &mut dyn Target,
        size: usize,
        fill: u8,
        request: impl FnOnce(TargetAddr) -> RelayRequest,
    ) -> (RetCode, ScratchBuffer) {
        let mut scratch = ScratchBuffer::new(LOCAL_SCRATCH_BASE, size, fill);
        let request = request(scratch.base());
        let result = {
            let mut access = MemoryAccess::scratch(target, &mut scratch);
            self.call(request, &mut access)
        };
        (result, scratch)
    }

    fn fail(&mut self, errno: TargetErrno) -> RetCode {
        self.errno = errno.code();
        CALL_FAILED
    }

    fn fail_marshal(&mut self, err: &MarshalError) -> RetCode {
        debug!(error = %err, "rejected target string");
        self.fail(TargetErrno::from(err))
    }

    fn check_string(string: TargetString) -> Result<(), MarshalError> {
        if string.addr == TARGET_NULL {
            return Err(MarshalError::NullAddress);
        }
        if string.len == 0 {
            return Err(MarshalError::ZeroLength(string.addr));
        }
        Ok(())
    }

    /// Copy target memory to the local console sink in fixed chunks
    fn redirect_console(&mut self, target: &mut dyn Target, buf: TargetAddr, count: u32) -> RetCode {
        let mut access = MemoryAccess::target(target);
        let mut addr = buf;
        let mut remaining = count as usize;
        while remaining > 0 {
            let len = remaining.min(CONSOLE_CHUNK_SIZE);
            let chunk = match marshal::read_bytes(&mut access, addr, len) {
                Ok(chunk) => chunk,
                Err(err) => return self.fail_marshal(&err),
            };
            let Some(sink) = self.console_sink.as_mut() else {
                return self.fail(TargetErrno::BadF);
            };
            if let Err(err) = sink.write_all(&chunk) {
                return self.fail(TargetErrno::from(&err));
            }
            addr = addr.wrapping_add(len as u32);
            remaining -= len;
        }
        if let Some(sink) = self.console_sink.as_mut() {
            if let Err(err) = sink.flush() {
                return self.fail(TargetErrno::from(&err));
            }
        }
        count as RetCode
    }
}

impl<T: Transport, H: PacketHandler> Backend for RelayBackend<T, H> {
    fn name(&self) -> &'static str {
        "relayed"
    }

    fn open(
        &mut self,
        target: &mut dyn Target,
        path: TargetString,
        flags: OpenFlags,
        mode: u32,
    ) -> RetCode {
        if let Err(err) = Self::check_string(path) {
            return self.fail_marshal(&err);
        }
        self.call_target(target, RelayRequest::Open { path, flags, mode })
    }

    fn close(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode {
        self.call_target(target, RelayRequest::Close { fd })
    }

    fn read(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode {
        self.call_target(target, RelayRequest::Read { fd, buf, count })
    }

    fn write(&mut self, target: &mut dyn Target, fd: Fd, buf: TargetAddr, count: u32) -> RetCode {
        if self.console_sink.is_some() && matches!(fd, STDOUT_FD | STDERR_FD) {
            return self.redirect_console(target, buf, count);
        }
        self.call_target(target, RelayRequest::Write { fd, buf, count })
    }

    fn seek(&mut self, target: &mut dyn Target, fd: Fd, offset: i64) -> i64 {
        let request = RelayRequest::Lseek {
            fd,
            offset,
            whence: SeekWhence::Set,
        };
        self.call_target(target, request).into()
    }

    fn is_tty(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode {
        self.call_target(target, RelayRequest::IsaTty { fd })
    }

    fn rename(&mut self, target: &mut dyn Target, from: TargetString, to: TargetString) -> RetCode {
        if let Err(err) = Self::check_string(from).and_then(|()| Self::check_string(to)) {
            return self.fail_marshal(&err);
        }
        self.call_target(target, RelayRequest::Rename { from, to })
    }

    fn remove(&mut self, target: &mut dyn Target, path: TargetString) -> RetCode {
        if let Err(err) = Self::check_string(path) {
            return self.fail_marshal(&err);
        }
        self.call_target(target, RelayRequest::Unlink { path })
    }

    fn system(&mut self, target: &mut dyn Target, command: TargetString) -> RetCode {
        if !self.system_calls_allowed {
            warn!("system call refused: remote command execution is not enabled");
            return self.fail(TargetErrno::Perm);
        }
        if let Err(err) = Self::check_string(command) {
            return self.fail_marshal(&err);
        }
        self.call_target(target, RelayRequest::System { command })
    }

    fn file_length(&mut self, target: &mut dyn Target, fd: Fd) -> RetCode {
        let (result, stat) =
            self.scratch_call(target, STAT_BUFFER_SIZE, 0, |buf| RelayRequest::Fstat { fd, buf });
        if result != 0 {
            return CALL_FAILED;
        }
        let size = marshal::be_u64(stat.as_bytes(), STAT_SIZE_OFFSET);
        match size.map(RetCode::try_from) {
            Some(Ok(length)) => length,
            _ => self.fail(TargetErrno::FBig),
        }
    }

    fn time_of_day(&mut self, target: &mut dyn Target) -> TimeValue {
        let (result, timeval) = self.scratch_call(target, TIMEVAL_BUFFER_SIZE, 0, |tv| {
            RelayRequest::GetTimeOfDay { tv, tz: TARGET_NULL }
        });
        if result != 0 {
            return TimeValue::FAILED;
        }
        match <&[u8; TIMEVAL_BUFFER_SIZE]>::try_from(timeval.as_bytes()) {
            Ok(bytes) => TimeValue::from_be_bytes(bytes),
            Err(_) => TimeValue::FAILED,
        }
    }

    fn read_char(&mut self, target: &mut dyn Target) -> RetCode {
        let (result, byte) = self.scratch_call(target, 1, b'?', |buf| RelayRequest::Read {
            fd: STDIN_FD,
            buf,
            count: 1,
        });
        match (result, byte.as_bytes()) {
            (1, [ch]) => RetCode::from(*ch),
            _ => CALL_FAILED,
        }
    }

    fn last_errno(&self) -> i32 {
        self.errno
    }

    fn interrupted(&self) -> bool {
        self.interrupted
    }

    fn begin_call(&mut self) {
        self.interrupted = false;
        self.link_lost = false;
    }

    fn link_lost(&self) -> bool {
        self.link_lost
    }
}
