/*!
 * Semihosting
 * Trapped-call dispatch over a Direct or Relayed backend
 */

pub mod backend;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod marshal;
pub mod relay;
pub mod types;

pub use backend::{Backend, CaptureBuffer, DirectBackend, HostConsole};
pub use clock::ClockCalibration;
pub use config::SemihostingConfig;
pub use dispatcher::SemihostingDispatcher;
pub use marshal::TargetString;
pub use relay::{
    IgnoreUnrelated, PacketDisposition, PacketHandler, RelayBackend, RelayReply, RelayRequest,
    SeekWhence, Transport,
};
pub use types::{descriptor, CallKind, CallRequest, CallResult, OpenFlags, OpenMode, TargetErrno, TimeValue};
