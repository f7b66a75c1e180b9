//! Codec-level error type: wraps [`tml_core::TmlError`] plus I/O failures.

use std::io;

/// Result alias used throughout `tml-codec`.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors a `Reader`/`Writer`/`Cell` operation can raise.
///
/// Kept separate from [`tml_core::TmlError`] (rather than extending that
/// enum) because only this, std-only, crate has an `std::io::Error` to
/// chain: `tml-core` stays `no_std`-clean and has nothing to chain from.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// One of the five core error kinds (see [`tml_core::TmlError`]).
    #[error(transparent)]
    Core(#[from] tml_core::TmlError),

    /// The underlying byte source/sink failed to open or perform I/O.
    #[error("device access failed: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Builds a [`tml_core::TmlError::IncompleteImplementation`]-flavored error.
    #[must_use]
    pub fn incomplete(msg: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        tml_core::TmlError::incomplete(msg).into()
    }

    /// Builds a [`tml_core::TmlError::WrongDataFormat`]-flavored error.
    #[must_use]
    pub fn wrong_format(msg: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        tml_core::TmlError::wrong_format(msg).into()
    }

    /// Builds a [`tml_core::TmlError::InvalidProtocol`]-flavored error.
    #[must_use]
    pub fn invalid_protocol(msg: impl Into<std::borrow::Cow<'static, str>>) -> Self {
        tml_core::TmlError::invalid_protocol(msg).into()
    }

    /// Builds a [`tml_core::TmlError::InvalidDevice`]-flavored error.
    #[must_use]
    pub fn invalid_device() -> Self {
        tml_core::TmlError::InvalidDevice.into()
    }
}
