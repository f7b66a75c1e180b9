//! tml-core — leaf primitives for the Tagged Marker Language codec (no_std-ready)
//!
//! Provides:
//! - `vbyte`: continuation-bit varint coding (vbyte-32, vbyte-64)
//! - `endian`: big-endian scalar layout, routed through regardless of host
//! - `NameTag`: 4-byte ASCII tag aliased as a `u32`
//! - `TimeSlot`: minutes-since-midnight start + duration, with its custom order
//! - `entity`: HTML entity name → code point table
//! - `TmlError` + `TmlResult<T>`
//!
//! Features:
//! - `std` (default): enables `std::error::Error` for [`TmlError`]
//! - `serde`: derive (de)serialization on the value types

#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod endian;
pub mod entity;
pub mod error;
pub mod nametag;
pub mod timeslot;
pub mod vbyte;

pub use entity::{entity_lookup, ENTITIES};
pub use error::{TmlError, TmlResult};
pub use nametag::NameTag;
pub use timeslot::TimeSlot;

/// Convenience re-exports for glob-importing the commonly used types.
pub mod prelude {
    pub use crate::endian::{read_be, write_be, BigEndianScalar};
    pub use crate::entity::entity_lookup;
    pub use crate::error::{TmlError, TmlResult};
    pub use crate::nametag::NameTag;
    pub use crate::timeslot::TimeSlot;
    pub use crate::vbyte::{decode_u32, decode_u64, encode_u32, encode_u64, peek_u32, peek_u64};
}
