//! Crate-wide error taxonomy.
//!
//! Kept hand-rolled (no `thiserror`) rather than derived, because this crate
//! must stay usable under `no_std` + `alloc`, and `thiserror`'s generated
//! `std::error::Error` impl is not available there. The `std`-only codec
//! layer (`tml-codec`) derives its own error type with `thiserror` on top
//! of this one, where I/O source-chaining is actually needed.

use core::fmt;

#[cfg(feature = "std")]
use std::borrow::Cow;

#[cfg(not(feature = "std"))]
use alloc::borrow::Cow;

/// Result alias used throughout `tml-core`.
pub type TmlResult<T> = core::result::Result<T, TmlError>;

/// The five error kinds a TML implementation can raise.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TmlError {
    /// Requested coercion or kind is not supported yet (programmer error).
    IncompleteImplementation(Cow<'static, str>),
    /// User-supplied payload violates a kind's contract.
    WrongDataFormat(Cow<'static, str>),
    /// Decoded bytes are not a valid stream (unknown type byte, etc).
    InvalidProtocol(Cow<'static, str>),
    /// Reader/Writer was constructed without a byte source/sink.
    InvalidDevice,
    /// Underlying source/sink refused to open or read/write.
    DeviceAccess(Cow<'static, str>),
}

impl TmlError {
    /// Builds an [`TmlError::IncompleteImplementation`].
    pub fn incomplete(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::IncompleteImplementation(msg.into())
    }

    /// Builds a [`TmlError::WrongDataFormat`].
    pub fn wrong_format(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::WrongDataFormat(msg.into())
    }

    /// Builds an [`TmlError::InvalidProtocol`].
    pub fn invalid_protocol(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidProtocol(msg.into())
    }

    /// Builds a [`TmlError::DeviceAccess`].
    pub fn device_access(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::DeviceAccess(msg.into())
    }
}

impl fmt::Display for TmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteImplementation(msg) => write!(f, "incomplete implementation: {msg}"),
            Self::WrongDataFormat(msg) => write!(f, "wrong data format: {msg}"),
            Self::InvalidProtocol(msg) => write!(f, "invalid protocol: {msg}"),
            Self::InvalidDevice => write!(f, "invalid device: no byte source/sink"),
            Self::DeviceAccess(msg) => write!(f, "device access failed: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TmlError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_non_empty() {
        let err = TmlError::wrong_format("bad vbyte");
        assert!(err.to_string().contains("bad vbyte"));
    }
}
