/*!
 * Host Console
 * The three console streams the Direct backend serves descriptors 0-2 from
 */

use parking_lot::Mutex;
use std::io::{self, IsTerminal, Read, Write};
use std::sync::Arc;

/// Console streams plus their terminal status
pub struct HostConsole {
    pub(super) stdin: Box<dyn Read + Send>,
    pub(super) stdout: Box<dyn Write + Send>,
    pub(super) stderr: Box<dyn Write + Send>,
    pub(super) tty: [bool; 3],
}

impl HostConsole {
    /// The debugging host's own stdio
    pub fn stdio() -> Self {
        let tty = [
            io::stdin().is_terminal(),
            io::stdout().is_terminal(),
            io::stderr().is_terminal(),
        ];
        Self {
            stdin: Box::new(io::stdin()),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            tty,
        }
    }

    /// Custom streams; none of them report as a terminal
    pub fn new(
        stdin: impl Read + Send + 'static,
        stdout: impl Write + Send + 'static,
        stderr: impl Write + Send + 'static,
    ) -> Self {
        Self {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            tty: [false; 3],
        }
    }

    /// Override the terminal status of stdin, stdout and stderr
    pub fn with_tty(mut self, tty: [bool; 3]) -> Self {
        self.tty = tty;
        self
    }
}

impl std::fmt::Debug for HostConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConsole").field("tty", &self.tty).finish()
    }
}

/// Shared in-memory sink, clonable so the writer and an observer can both hold it
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
