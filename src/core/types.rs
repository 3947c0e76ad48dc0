/*!
 * Core Types
 * Common types used across the relay
 */

/// Address in the halted target's address space
pub type TargetAddr = u32;

/// Backend-level descriptor (already decoded from the call convention)
pub type Fd = i32;

/// Signed call-convention return value written back into r0
pub type RetCode = i32;

/// Common result type for relay internals
pub type RelayResult<T> = Result<T, super::errors::RelayError>;

/// Common result type for address-space marshalling
pub type MarshalResult<T> = Result<T, super::errors::MarshalError>;

/// Value returned to the target for any failed call
pub const CALL_FAILED: RetCode = -1;

/// Null pointer in the target's address space
pub const TARGET_NULL: TargetAddr = 0;
