/*!
 * Semihosting Types
 * Call ids, results, error codes, open flags and time values
 */

mod call;
mod errno;
mod flags;
mod time;

pub use call::{descriptor, CallKind, CallRequest, CallResult};
pub use errno::TargetErrno;
pub use flags::{OpenFlags, OpenMode};
pub use time::TimeValue;
