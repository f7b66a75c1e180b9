//! Frozen kind-code table and per-kind wire layout category.
//!
//! These numeric codes are load-bearing: existing stored data depends on
//! them. Extension is allowed only by adding new codes, never by
//! renumbering.

use crate::error::{CodecError, CodecResult};

/// One of the ~35 wire kinds, including the framing and name-variant
/// pseudo-kinds that only ever appear on the wire (never on a materialized
/// [`crate::Cell`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// Unset-but-present value, distinct from [`Kind::Invalid`].
    Null = 0,
    /// Boolean `true`.
    True = 1,
    /// Boolean `false`.
    False = 2,
    /// Signed 32-bit integer.
    Int32 = 3,
    /// 64-bit float.
    Double = 4,
    /// 32-bit float.
    Float = 5,
    /// Julian day, as i32.
    Date = 10,
    /// Packed time-of-day, u32 with MSB UTC flag.
    Time = 11,
    /// DateTime, legacy `(time, date)` wire order.
    DateTimeOld = 12,
    /// 4-byte ASCII tag.
    Tag = 13,
    /// Unsigned 8-bit integer.
    UInt8 = 14,
    /// Signed 64-bit integer.
    Int64 = 15,
    /// `(start, duration)` pair, each u16.
    TimeSlot = 16,
    /// DateTime, current `(date, time)` wire order.
    DateTimeNew = 17,
    /// Unsigned 16-bit integer.
    UInt16 = 18,
    /// 32-bit name identifier.
    Atom = 20,
    /// Percent-encoded ASCII URL.
    Url = 22,
    /// 16-byte UUID.
    Uuid = 23,
    /// 64-bit object id.
    Oid = 24,
    /// Generic unsigned 32-bit id, multibyte-encoded.
    Id32 = 25,
    /// Generic unsigned 64-bit id, multibyte-encoded.
    Id64 = 26,
    /// 32-bit stream id, multibyte-encoded.
    Sid = 27,
    /// 64-bit relation id.
    Rid = 28,
    /// Unsigned 64-bit integer.
    UInt64 = 29,
    /// Unsigned 32-bit integer.
    UInt32 = 30,
    /// NUL-terminated Latin-1 text.
    Latin1 = 40,
    /// UTF-8 text.
    String = 41,
    /// HTML text (UTF-8 on the wire).
    Html = 42,
    /// XML text (UTF-8 on the wire).
    Xml = 43,
    /// NUL-terminated 7-bit ASCII text.
    Ascii = 44,
    /// Opaque byte blob.
    Lob = 60,
    /// Embedded TML/BML document.
    Bml = 66,
    /// Opaque image payload.
    Img = 64,
    /// Opaque picture payload.
    Pic = 65,
    /// Frame-open marker.
    FrameStart = 110,
    /// Frame name, atom flavor.
    FrameName = 111,
    /// Frame-close marker.
    FrameEnd = 112,
    /// Slot name, atom flavor.
    SlotName = 113,
    /// Frame name, ASCII-literal flavor (interning miss).
    FrameNameStr = 114,
    /// Slot name, ASCII-literal flavor (interning miss).
    SlotNameStr = 115,
    /// Frame name, 4-byte tag flavor.
    FrameNameTag = 116,
    /// Slot name, 4-byte tag flavor.
    SlotNameTag = 117,
    /// Frame name, string-table index flavor (interning hit).
    FrameNameIdx = 118,
    /// Slot name, string-table index flavor (interning hit).
    SlotNameIdx = 119,
    /// Unset cell; never appears on the wire.
    Invalid = 127,
}

/// Per-kind wire layout behavior tag (reference implementation's
/// `typeByteCount` sentinel family).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fixed-width big-endian scalar of the given byte count (0, 1, 2, 4, 8).
    Fixed(u8),
    /// UTF-8 text, vbyte-32 length prefix including the implicit NUL.
    Unistr,
    /// NUL-terminated ASCII/Latin-1, vbyte-32 length prefix including the NUL.
    Cstring,
    /// Raw bytes, vbyte-32 length prefix.
    Binary,
    /// vbyte-32 encoded integer.
    MByte32,
    /// vbyte-64 encoded integer.
    MByte64,
}

impl Kind {
    /// Maps a wire byte's low 7 bits to a `Kind`, or `None` if out of range.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Kind::Null,
            1 => Kind::True,
            2 => Kind::False,
            3 => Kind::Int32,
            4 => Kind::Double,
            5 => Kind::Float,
            10 => Kind::Date,
            11 => Kind::Time,
            12 => Kind::DateTimeOld,
            13 => Kind::Tag,
            14 => Kind::UInt8,
            15 => Kind::Int64,
            16 => Kind::TimeSlot,
            17 => Kind::DateTimeNew,
            18 => Kind::UInt16,
            20 => Kind::Atom,
            22 => Kind::Url,
            23 => Kind::Uuid,
            24 => Kind::Oid,
            25 => Kind::Id32,
            26 => Kind::Id64,
            27 => Kind::Sid,
            28 => Kind::Rid,
            29 => Kind::UInt64,
            30 => Kind::UInt32,
            40 => Kind::Latin1,
            41 => Kind::String,
            42 => Kind::Html,
            43 => Kind::Xml,
            44 => Kind::Ascii,
            60 => Kind::Lob,
            64 => Kind::Img,
            65 => Kind::Pic,
            66 => Kind::Bml,
            110 => Kind::FrameStart,
            111 => Kind::FrameName,
            112 => Kind::FrameEnd,
            113 => Kind::SlotName,
            114 => Kind::FrameNameStr,
            115 => Kind::SlotNameStr,
            116 => Kind::FrameNameTag,
            117 => Kind::SlotNameTag,
            118 => Kind::FrameNameIdx,
            119 => Kind::SlotNameIdx,
            127 => Kind::Invalid,
            _ => return None,
        })
    }

    /// The low-7-bit wire code for this kind (without the compression flag).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Parses a full wire type byte into `(kind, compressed)`.
    pub fn from_type_byte(byte: u8) -> CodecResult<(Self, bool)> {
        let compressed = byte & 0x80 != 0;
        let kind = Self::from_code(byte & 0x7f)
            .ok_or_else(|| CodecError::invalid_protocol(format!("unknown kind code {}", byte & 0x7f)))?;
        Ok((kind, compressed))
    }

    /// Builds the full wire type byte for `(self, compressed)`.
    #[must_use]
    pub const fn to_type_byte(self, compressed: bool) -> u8 {
        self.code() | if compressed { 0x80 } else { 0 }
    }

    /// The wire layout category for this kind.
    #[must_use]
    pub const fn layout(self) -> Layout {
        use Layout::{Binary, Cstring, Fixed, MByte32, MByte64, Unistr};
        match self {
            Kind::Null | Kind::True | Kind::False | Kind::FrameStart | Kind::FrameEnd | Kind::Invalid => Fixed(0),
            Kind::UInt8 => Fixed(1),
            Kind::UInt16 => Fixed(2),
            Kind::Int32
            | Kind::UInt32
            | Kind::Float
            | Kind::Date
            | Kind::Time
            | Kind::TimeSlot
            | Kind::Atom
            | Kind::Tag
            | Kind::FrameName
            | Kind::FrameNameTag
            | Kind::SlotName
            | Kind::SlotNameTag => Fixed(4),
            Kind::Int64 | Kind::UInt64 | Kind::Double | Kind::DateTimeOld | Kind::DateTimeNew => Fixed(8),
            Kind::Oid | Kind::Rid | Kind::Id64 => MByte64,
            Kind::Sid | Kind::Id32 | Kind::FrameNameIdx | Kind::SlotNameIdx => MByte32,
            Kind::Latin1 | Kind::Ascii | Kind::Url | Kind::FrameNameStr | Kind::SlotNameStr => Cstring,
            Kind::String | Kind::Html | Kind::Xml => Unistr,
            Kind::Lob | Kind::Bml | Kind::Img | Kind::Pic | Kind::Uuid => Binary,
        }
    }

    /// `true` if this kind only ever appears on the wire (framing and
    /// name-variant pseudo-kinds), never on a materialized `Cell`.
    #[must_use]
    pub const fn is_wire_only(self) -> bool {
        matches!(
            self,
            Kind::FrameStart
                | Kind::FrameName
                | Kind::FrameEnd
                | Kind::SlotName
                | Kind::FrameNameStr
                | Kind::SlotNameStr
                | Kind::FrameNameTag
                | Kind::SlotNameTag
                | Kind::FrameNameIdx
                | Kind::SlotNameIdx
        )
    }

    /// Canonical materialized kind a name-variant pseudo-kind coerces to,
    /// per §4.3.4 (`FrameName`→`Atom`, `*Str`→`Ascii`, `*Idx`→`Id32`,
    /// `*Tag`→`Tag`). Frame/slot markers map to themselves.
    ///
    /// `DateTimeOld` also folds into `DateTimeNew` here: both wire kinds
    /// materialize to the same single `Cell::DateTime` variant, the way the
    /// reference implementation's internal `TypeDateTime` is one type fed by
    /// two wire encodings.
    #[must_use]
    pub const fn canonical(self) -> Self {
        match self {
            Kind::FrameName | Kind::SlotName => Kind::Atom,
            Kind::FrameNameStr | Kind::SlotNameStr => Kind::Ascii,
            Kind::FrameNameIdx | Kind::SlotNameIdx => Kind::Id32,
            Kind::FrameNameTag | Kind::SlotNameTag => Kind::Tag,
            Kind::DateTimeOld => Kind::DateTimeNew,
            other => other,
        }
    }
}

/// Validates that `bytes` is 7-bit clean ASCII (reference `checkAscii`).
#[must_use]
pub fn check_ascii(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b < 0x80)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_codes_roundtrip() {
        for &(kind, code) in &[
            (Kind::Null, 0u8),
            (Kind::Atom, 20),
            (Kind::String, 41),
            (Kind::Bml, 66),
            (Kind::FrameStart, 110),
            (Kind::Invalid, 127),
        ] {
            assert_eq!(kind.code(), code);
            assert_eq!(Kind::from_code(code), Some(kind));
        }
    }

    #[test]
    fn type_byte_compression_flag() {
        let (kind, compressed) = Kind::from_type_byte(Kind::Latin1.to_type_byte(true)).unwrap();
        assert_eq!(kind, Kind::Latin1);
        assert!(compressed);
    }

    #[test]
    fn unknown_code_is_invalid_protocol() {
        assert!(Kind::from_type_byte(6).is_err());
    }

    #[test]
    fn check_ascii_rejects_high_bytes() {
        assert!(check_ascii(b"hello"));
        assert!(!check_ascii(&[0xFF]));
    }
}
