//! `Cell`: one typed, materialized value, plus the peek/read/write machinery
//! that turns it into wire bytes and back.

use std::io::{Read, Write};

use tml_core::endian::{read_be, write_be, BigEndianScalar};
use tml_core::vbyte::{decode_u32, encode_u32, encode_u64, peek_u32, peek_u64};
use tml_core::{entity_lookup, NameTag, TimeSlot};

use crate::compress::{compress, decompress, COMPRESSION_THRESHOLD};
use crate::datetime::{self, CalendarDate, ClockTime};
use crate::error::{CodecError, CodecResult};
use crate::io::PeekReader;
use crate::kind::{Kind, Layout};

/// A self-describing, fully materialized value: one variant per
/// canonical kind. Framing markers (`FrameStart`/`FrameEnd`) and the
/// name-variant wire pseudo-kinds never appear here — a name cell read off
/// the wire materializes to the plain kind it coerces to (see
/// [`Kind::canonical`]).
#[derive(Debug, Clone)]
pub enum Cell {
    /// Unset cell: distinct from [`Cell::Null`], never written to the wire.
    /// [`crate::writer::Writer::write_slot`] silently drops a slot whose
    /// value is `Invalid` instead of emitting anything for it.
    Invalid,
    /// Present-but-unset value.
    Null,
    /// Boolean `true`.
    True,
    /// Boolean `false`.
    False,
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 64-bit float.
    Double(f64),
    /// 32-bit float.
    Float(f32),
    /// Julian day number.
    Date(i32),
    /// Packed time-of-day, MSB is the UTC flag.
    Time(u32),
    /// `(julian_day, packed_time)`. Always written as `DateTimeNew`.
    DateTime {
        /// Julian day number of the date component.
        julian_day: i32,
        /// Packed time-of-day, MSB is the UTC flag.
        packed_time: u32,
    },
    /// `(start, duration)` time-of-day slot.
    TimeSlot(TimeSlot),
    /// 4-byte ASCII tag.
    Tag(NameTag),
    /// 32-bit name identifier.
    Atom(u32),
    /// Percent-encoded ASCII URL, stored without its trailing NUL.
    Url(Vec<u8>),
    /// 16 raw bytes: `u32 data1 (BE) || u16 data2 (BE) || u16 data3 (BE) || data4[8]`.
    Uuid([u8; 16]),
    /// 64-bit object id.
    Oid(u64),
    /// Generic unsigned 32-bit id.
    Id32(u32),
    /// Generic unsigned 64-bit id.
    Id64(u64),
    /// 32-bit stream id.
    Sid(u32),
    /// 64-bit relation id.
    Rid(u64),
    /// NUL-terminated Latin-1 text, stored without its trailing NUL.
    Latin1(Vec<u8>),
    /// UTF-8 text.
    String(String),
    /// HTML text.
    Html(String),
    /// XML text.
    Xml(String),
    /// 7-bit ASCII text, stored without its trailing NUL.
    Ascii(Vec<u8>),
    /// Opaque byte blob.
    Lob(Vec<u8>),
    /// Embedded TML/BML document.
    Bml(Vec<u8>),
    /// Opaque image payload.
    Img(Vec<u8>),
    /// Opaque picture payload.
    Pic(Vec<u8>),
}

impl Cell {
    /// The canonical kind of this cell.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Cell::Invalid => Kind::Invalid,
            Cell::Null => Kind::Null,
            Cell::True => Kind::True,
            Cell::False => Kind::False,
            Cell::Int32(_) => Kind::Int32,
            Cell::UInt32(_) => Kind::UInt32,
            Cell::UInt8(_) => Kind::UInt8,
            Cell::UInt16(_) => Kind::UInt16,
            Cell::Int64(_) => Kind::Int64,
            Cell::UInt64(_) => Kind::UInt64,
            Cell::Double(_) => Kind::Double,
            Cell::Float(_) => Kind::Float,
            Cell::Date(_) => Kind::Date,
            Cell::Time(_) => Kind::Time,
            Cell::DateTime { .. } => Kind::DateTimeNew,
            Cell::TimeSlot(_) => Kind::TimeSlot,
            Cell::Tag(_) => Kind::Tag,
            Cell::Atom(_) => Kind::Atom,
            Cell::Url(_) => Kind::Url,
            Cell::Uuid(_) => Kind::Uuid,
            Cell::Oid(_) => Kind::Oid,
            Cell::Id32(_) => Kind::Id32,
            Cell::Id64(_) => Kind::Id64,
            Cell::Sid(_) => Kind::Sid,
            Cell::Rid(_) => Kind::Rid,
            Cell::Latin1(_) => Kind::Latin1,
            Cell::String(_) => Kind::String,
            Cell::Html(_) => Kind::Html,
            Cell::Xml(_) => Kind::Xml,
            Cell::Ascii(_) => Kind::Ascii,
            Cell::Lob(_) => Kind::Lob,
            Cell::Bml(_) => Kind::Bml,
            Cell::Img(_) => Kind::Img,
            Cell::Pic(_) => Kind::Pic,
        }
    }

    /// `true` for [`Cell::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    // --- coercions (§4.3.6) ------------------------------------------

    /// Renders this cell as text: the text kinds return their content
    /// (optionally with HTML/XML markup stripped and entities resolved);
    /// numeric kinds render decimal; `Date`/`Time`/`DateTime` render
    /// ISO-8601; `Tag` renders its 4-character view; `Uuid` renders
    /// braced-canonical form; `Bml` concatenates the embedded document's
    /// top-level UNISTR slot values.
    pub fn to_pretty_string(&self, strip_markup: bool) -> CodecResult<String> {
        Ok(match self {
            Cell::Invalid => {
                return Err(CodecError::incomplete("toString: Invalid cell has no text form"))
            }
            Cell::Null => String::new(),
            Cell::True => "true".to_string(),
            Cell::False => "false".to_string(),
            Cell::Int32(v) => v.to_string(),
            Cell::UInt32(v) => v.to_string(),
            Cell::UInt8(v) => v.to_string(),
            Cell::UInt16(v) => v.to_string(),
            Cell::Int64(v) => v.to_string(),
            Cell::UInt64(v) => v.to_string(),
            Cell::Double(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Atom(v) | Cell::Id32(v) | Cell::Sid(v) => v.to_string(),
            Cell::Oid(v) | Cell::Id64(v) | Cell::Rid(v) => v.to_string(),
            Cell::Date(jdn) => {
                let d = datetime::from_julian_day(*jdn);
                format!("{:04}-{:02}-{:02}", d.year, d.month, d.day)
            }
            Cell::Time(packed) => {
                let t = datetime::unpack_time(*packed);
                format!("{:02}:{:02}:{:02}.{:03}", t.hour, t.minute, t.second, t.millis)
            }
            Cell::DateTime { julian_day, packed_time } => {
                let d = datetime::from_julian_day(*julian_day);
                let t = datetime::unpack_time(*packed_time);
                let suffix = if datetime::is_utc(*packed_time) { "Z" } else { "" };
                format!(
                    "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}{suffix}",
                    d.year, d.month, d.day, t.hour, t.minute, t.second, t.millis
                )
            }
            Cell::TimeSlot(ts) => format!("{}+{}", ts.start(), ts.raw_duration()),
            Cell::Tag(tag) => tag.to_string(),
            Cell::Uuid(bytes) => format_uuid(bytes),
            Cell::Url(bytes) | Cell::Latin1(bytes) | Cell::Ascii(bytes) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            Cell::String(s) => s.clone(),
            Cell::Html(s) | Cell::Xml(s) => {
                if strip_markup {
                    strip_markup_text(s)
                } else {
                    s.clone()
                }
            }
            Cell::Bml(bytes) => extract_bml_strings(bytes, true)?,
            Cell::Lob(_) | Cell::Img(_) | Cell::Pic(_) => {
                return Err(CodecError::incomplete("toString: opaque binary kind has no text form"))
            }
        })
    }

    /// Accepts any integer-like kind (`Atom`, `Oid`, `Rid`, `Sid`, `Id32`,
    /// `Id64`, `UInt64`) and returns its value as u64 bits. Other kinds
    /// fail with `IncompleteImplementation`.
    pub fn to_id64(&self) -> CodecResult<u64> {
        Ok(match self {
            Cell::Atom(v) | Cell::Id32(v) | Cell::Sid(v) => u64::from(*v),
            Cell::Oid(v) | Cell::Rid(v) | Cell::Id64(v) | Cell::UInt64(v) => *v,
            _ => return Err(CodecError::incomplete(format!("toId64: unsupported kind {:?}", self.kind()))),
        })
    }

    // --- peek / read / write -----------------------------------------

    /// Looks ahead at the next cell's header on `src` without consuming
    /// anything. Returns `Ok(None)` if the header is not yet fully
    /// available (a short/non-blocking read), not an error.
    pub fn peek<R: Read>(src: &mut PeekReader<R>) -> CodecResult<Option<Peek>> {
        let head = src.peek(1)?;
        let Some(&type_byte) = head.first() else { return Ok(None) };
        let (kind, compressed) = Kind::from_type_byte(type_byte)?;
        if kind == Kind::Invalid {
            return Err(CodecError::invalid_protocol("invalid type"));
        }
        match kind.layout() {
            Layout::Fixed(n) => Ok(Some(Peek { kind, compressed, off: 0, len: u32::from(n) })),
            Layout::Unistr | Layout::Cstring | Layout::Binary => {
                let lookahead = src.peek(1 + tml_core::vbyte::MAX_VBYTE32_LEN)?;
                if lookahead.len() < 2 {
                    return Ok(None);
                }
                let Some((len, n)) = peek_u32(&lookahead[1..]) else { return Ok(None) };
                Ok(Some(Peek { kind, compressed, off: n as u8, len }))
            }
            Layout::MByte32 => {
                let lookahead = src.peek(1 + tml_core::vbyte::MAX_VBYTE32_LEN)?;
                if lookahead.len() < 2 {
                    return Ok(None);
                }
                let Some((_, n)) = peek_u32(&lookahead[1..]) else { return Ok(None) };
                Ok(Some(Peek { kind, compressed, off: 0, len: n as u32 }))
            }
            Layout::MByte64 => {
                let lookahead = src.peek(1 + tml_core::vbyte::MAX_VBYTE64_LEN)?;
                if lookahead.len() < 2 {
                    return Ok(None);
                }
                let Some((_, n)) = peek_u64(&lookahead[1..]) else { return Ok(None) };
                Ok(Some(Peek { kind, compressed, off: 0, len: n as u32 }))
            }
        }
    }

    /// Reads one full cell off `src`. Returns `Ok(None)` if the header or
    /// payload is not yet fully available.
    ///
    /// On a `FrameName*`/`SlotName*` wire kind the materialized cell is
    /// coerced to its canonical kind (see [`Kind::canonical`]).
    pub fn read<R: Read>(src: &mut PeekReader<R>) -> CodecResult<Option<Cell>> {
        let Some(peek) = Self::peek(src)? else { return Ok(None) };
        let Some(bytes) = src.take(peek.cell_length() as usize)? else { return Ok(None) };
        let body = &bytes[peek.header_length() as usize..];
        Self::from_wire(peek.kind, peek.compressed, body).map(Some)
    }

    fn from_wire(kind: Kind, compressed: bool, body: &[u8]) -> CodecResult<Cell> {
        let canonical = kind.canonical();
        match kind.layout() {
            Layout::Unistr => {
                let payload = if compressed { decompress(body)? } else { body.to_vec() };
                let text = decode_nul_terminated_utf8(&payload)?;
                Ok(match canonical {
                    Kind::String => Cell::String(text),
                    Kind::Html => Cell::Html(text),
                    Kind::Xml => Cell::Xml(text),
                    _ => return Err(CodecError::invalid_protocol("UNISTR layout on non-text kind")),
                })
            }
            Layout::Cstring => {
                let payload = if compressed { decompress(body)? } else { body.to_vec() };
                let bytes = strip_trailing_nul(payload);
                Ok(match canonical {
                    Kind::Latin1 => Cell::Latin1(bytes),
                    Kind::Ascii => Cell::Ascii(bytes),
                    Kind::Url => Cell::Url(bytes),
                    _ => return Err(CodecError::invalid_protocol("CSTRING layout on non-text kind")),
                })
            }
            Layout::Binary => {
                let payload = if compressed { decompress(body)? } else { body.to_vec() };
                Ok(match canonical {
                    Kind::Lob => Cell::Lob(payload),
                    Kind::Bml => Cell::Bml(payload),
                    Kind::Img => Cell::Img(payload),
                    Kind::Pic => Cell::Pic(payload),
                    Kind::Uuid => {
                        if payload.len() < 16 {
                            return Err(CodecError::wrong_format("Uuid payload shorter than 16 bytes"));
                        }
                        let mut buf = [0u8; 16];
                        buf.copy_from_slice(&payload[..16]);
                        Cell::Uuid(buf)
                    }
                    _ => return Err(CodecError::invalid_protocol("BINARY layout on unexpected kind")),
                })
            }
            Layout::MByte32 => {
                let (value, _) =
                    decode_u32(body).ok_or_else(|| CodecError::wrong_format("truncated vbyte-32"))?;
                Ok(match canonical {
                    Kind::Sid => Cell::Sid(value),
                    Kind::Id32 => Cell::Id32(value),
                    _ => return Err(CodecError::invalid_protocol("MBYTE32 layout on unexpected kind")),
                })
            }
            Layout::MByte64 => {
                let (value, _) = tml_core::vbyte::decode_u64(body)
                    .ok_or_else(|| CodecError::wrong_format("truncated vbyte-64"))?;
                Ok(match canonical {
                    Kind::Oid => Cell::Oid(value),
                    Kind::Rid => Cell::Rid(value),
                    Kind::Id64 => Cell::Id64(value),
                    _ => return Err(CodecError::invalid_protocol("MBYTE64 layout on unexpected kind")),
                })
            }
            Layout::Fixed(_) => Self::fixed_from_wire(canonical, kind, body),
        }
    }

    fn fixed_from_wire(canonical: Kind, wire_kind: Kind, body: &[u8]) -> CodecResult<Cell> {
        Ok(match canonical {
            Kind::Null => Cell::Null,
            Kind::True => Cell::True,
            Kind::False => Cell::False,
            Kind::UInt8 => Cell::UInt8(body.first().copied().unwrap_or(0)),
            Kind::UInt16 => Cell::UInt16(read_be(body)),
            Kind::Int32 => Cell::Int32(read_be(body)),
            Kind::UInt32 => Cell::UInt32(read_be(body)),
            Kind::Int64 => Cell::Int64(read_be(body)),
            Kind::UInt64 => Cell::UInt64(read_be(body)),
            Kind::Double => Cell::Double(read_be(body)),
            Kind::Float => Cell::Float(read_be(body)),
            Kind::Date => Cell::Date(read_be(body)),
            Kind::Time => Cell::Time(read_be(body)),
            Kind::Atom => Cell::Atom(read_be(body)),
            Kind::Tag => {
                let mut buf = [0u8; 4];
                buf[..body.len().min(4)].copy_from_slice(&body[..body.len().min(4)]);
                Cell::Tag(NameTag::from(buf))
            }
            Kind::TimeSlot => {
                let start: u16 = read_be(&body[0..2]);
                let duration: u16 = read_be(&body[2..4]);
                Cell::TimeSlot(TimeSlot::new(start as i16, duration))
            }
            Kind::DateTimeNew => {
                // Wire order depends on whether this was DateTimeOld or DateTimeNew.
                let (julian_day, packed_time) = if wire_kind == Kind::DateTimeOld {
                    let time: u32 = read_be(&body[0..4]);
                    let date: i32 = read_be(&body[4..8]);
                    (date, time)
                } else {
                    let date: i32 = read_be(&body[0..4]);
                    let time: u32 = read_be(&body[4..8]);
                    (date, time)
                };
                Cell::DateTime { julian_day, packed_time }
            }
            _ => return Err(CodecError::incomplete(format!("readCell: kind {canonical:?} not supported"))),
        })
    }

    /// Writes this cell to `sink`.
    ///
    /// `data_only` omits the type byte and length prefix for fixed-width
    /// kinds (used for index keys, never for stream data meant to be read
    /// back with [`Cell::read`]). `compressed` requests compression on
    /// text/byte-array payloads but is silently declined when the encoded
    /// payload is at or below [`COMPRESSION_THRESHOLD`] bytes.
    pub fn write<W: Write>(&self, sink: &mut W, data_only: bool, compressed: bool) -> CodecResult<()> {
        if matches!(self, Cell::Invalid) {
            return Ok(());
        }
        match self.kind().layout() {
            Layout::Unistr => {
                let Cell::String(s) | Cell::Html(s) | Cell::Xml(s) = self else { unreachable!() };
                let mut payload = s.as_bytes().to_vec();
                payload.push(0);
                write_array(sink, self.kind(), &payload, data_only, compressed)
            }
            Layout::Cstring => {
                let bytes = match self {
                    Cell::Latin1(b) | Cell::Ascii(b) | Cell::Url(b) => b,
                    _ => unreachable!(),
                };
                let mut payload = bytes.clone();
                payload.push(0);
                write_array(sink, self.kind(), &payload, data_only, compressed)
            }
            Layout::Binary => {
                let payload = match self {
                    Cell::Lob(b) | Cell::Bml(b) | Cell::Img(b) | Cell::Pic(b) => b.clone(),
                    Cell::Uuid(b) => b.to_vec(),
                    _ => unreachable!(),
                };
                write_array(sink, self.kind(), &payload, data_only, compressed)
            }
            Layout::MByte32 => {
                let value = match self {
                    Cell::Sid(v) | Cell::Id32(v) => *v,
                    _ => unreachable!(),
                };
                if !data_only {
                    sink.write_all(&[self.kind().to_type_byte(false)])?;
                }
                sink.write_all(encode_u32(value).as_bytes())?;
                Ok(())
            }
            Layout::MByte64 => {
                let value = match self {
                    Cell::Oid(v) | Cell::Rid(v) | Cell::Id64(v) => *v,
                    _ => unreachable!(),
                };
                if !data_only {
                    sink.write_all(&[self.kind().to_type_byte(false)])?;
                }
                sink.write_all(encode_u64(value).as_bytes())?;
                Ok(())
            }
            Layout::Fixed(_) => self.write_fixed(sink, data_only),
        }
    }

    fn write_fixed<W: Write>(&self, sink: &mut W, data_only: bool) -> CodecResult<()> {
        if !data_only {
            sink.write_all(&[self.kind().to_type_byte(false)])?;
        }
        match self {
            Cell::Null => {
                if data_only {
                    sink.write_all(&[0u8])?;
                }
            }
            Cell::True => {
                if data_only {
                    sink.write_all(&[1u8])?;
                }
            }
            Cell::False => {
                if data_only {
                    sink.write_all(&[0u8])?;
                }
            }
            Cell::UInt8(v) => sink.write_all(&[*v])?,
            Cell::UInt16(v) => write_scalar(sink, *v)?,
            Cell::Int32(v) => write_scalar(sink, *v)?,
            Cell::UInt32(v) => write_scalar(sink, *v)?,
            Cell::Int64(v) => write_scalar(sink, *v)?,
            Cell::UInt64(v) => write_scalar(sink, *v)?,
            Cell::Double(v) => write_scalar(sink, *v)?,
            Cell::Float(v) => write_scalar(sink, *v)?,
            Cell::Date(v) => write_scalar(sink, *v)?,
            Cell::Time(v) => write_scalar(sink, *v)?,
            Cell::Atom(v) => write_scalar(sink, *v)?,
            Cell::Tag(tag) => sink.write_all(&tag.to_bytes())?,
            Cell::TimeSlot(ts) => {
                write_scalar(sink, ts.start() as u16)?;
                write_scalar(sink, ts.raw_duration())?;
            }
            Cell::DateTime { julian_day, packed_time } => {
                write_scalar(sink, *julian_day)?;
                write_scalar(sink, *packed_time)?;
            }
            _ => unreachable!("non-fixed kind routed through write_fixed"),
        }
        Ok(())
    }
}

fn write_scalar<W: Write, T: BigEndianScalar>(sink: &mut W, value: T) -> CodecResult<()> {
    let mut buf = vec![0u8; T::WIDTH];
    write_be(value, &mut buf);
    sink.write_all(&buf)?;
    Ok(())
}

fn write_array<W: Write>(
    sink: &mut W,
    kind: Kind,
    payload: &[u8],
    data_only: bool,
    compressed: bool,
) -> CodecResult<()> {
    let compressed = compressed && payload.len() > COMPRESSION_THRESHOLD;
    let wire = if compressed { compress(payload)? } else { payload.to_vec() };
    if !data_only {
        sink.write_all(&[kind.to_type_byte(compressed)])?;
        sink.write_all(encode_u32(wire.len() as u32).as_bytes())?;
    }
    if data_only && wire.is_empty() {
        sink.write_all(&[0u8])?;
    } else {
        sink.write_all(&wire)?;
    }
    Ok(())
}

fn decode_nul_terminated_utf8(payload: &[u8]) -> CodecResult<String> {
    let bytes = strip_trailing_nul(payload.to_vec());
    String::from_utf8(bytes).map_err(|e| CodecError::wrong_format(format!("invalid UTF-8: {e}")))
}

/// Truncates at the first NUL byte, if any. Tolerates the legacy double-NUL
/// payloads a CSTRING cell can accumulate after repeated read/write cycles.
fn strip_trailing_nul(mut bytes: Vec<u8>) -> Vec<u8> {
    if let Some(pos) = bytes.iter().position(|&b| b == 0) {
        if bytes[pos..].iter().any(|&b| b != 0) {
            tracing::warn!("CSTRING payload has trailing bytes after its first NUL");
        } else if bytes.len() - pos > 1 {
            tracing::warn!("legacy double-NUL CSTRING payload tolerated");
        }
        bytes.truncate(pos);
    }
    bytes
}

fn format_uuid(bytes: &[u8; 16]) -> String {
    format!(
        "{{{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

/// Strips HTML/XML tags and resolves `&name;` entities, the way
/// `stripMarkup` does. Unknown entities resolve to nothing (dropped).
fn strip_markup_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut in_tag = false;
    while let Some(c) = chars.next() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            '&' if !in_tag => {
                let mut name = String::new();
                let mut consumed = Vec::new();
                while let Some(&next) = chars.peek() {
                    if next == ';' {
                        consumed.push(chars.next().unwrap());
                        break;
                    }
                    if !next.is_ascii_alphanumeric() || name.len() > 16 {
                        break;
                    }
                    name.push(next);
                    consumed.push(chars.next().unwrap());
                }
                match entity_lookup(&name) {
                    Some(resolved) => out.push(resolved),
                    None => {
                        out.push('&');
                        out.push_str(&name);
                        out.extend(consumed.iter().filter(|&&c| c == ';'));
                    }
                }
            }
            _ if in_tag => {}
            _ => out.push(c),
        }
    }
    out
}

/// Concatenates the UNISTR slot payloads of an embedded BML document at its
/// top level, per §4.3.6's `toString` rule for `Bml` cells.
fn extract_bml_strings(bml_bytes: &[u8], separate_by_space: bool) -> CodecResult<String> {
    let mut src = PeekReader::new(bml_bytes);
    let mut out = String::new();
    while let Some(cell) = Cell::read(&mut src)? {
        if matches!(cell.kind(), Kind::String | Kind::Html | Kind::Xml) {
            if !out.is_empty() && separate_by_space {
                out.push(' ');
            }
            out.push_str(&cell.to_pretty_string(false)?);
        }
    }
    Ok(out)
}

/// A cell header discovered by [`Cell::peek`]: the kind, its compression
/// flag, and how many bytes the length field and payload occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peek {
    /// The wire kind (not yet coerced to its canonical materialized kind).
    pub kind: Kind,
    /// `true` if the compression flag bit is set.
    pub compressed: bool,
    off: u8,
    len: u32,
}

impl Peek {
    /// `1 + ` the number of bytes the length field occupies (0 for fixed
    /// and multibyte-self-delimited kinds).
    #[must_use]
    pub const fn header_length(&self) -> u32 {
        1 + self.off as u32
    }

    /// Total bytes this cell occupies on the wire, including its type byte.
    #[must_use]
    pub const fn cell_length(&self) -> u32 {
        1 + self.off as u32 + self.len
    }
}

impl PartialEq for Cell {
    /// Two cells compare equal iff their kinds match and the active
    /// payload compares equal. Floats compare by bit pattern (a
    /// fixed-width memcmp), not IEEE equality, so `NaN == NaN` here.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Invalid, Cell::Invalid)
            | (Cell::Null, Cell::Null)
            | (Cell::True, Cell::True)
            | (Cell::False, Cell::False) => true,
            (Cell::Int32(a), Cell::Int32(b)) => a == b,
            (Cell::UInt32(a), Cell::UInt32(b)) => a == b,
            (Cell::UInt8(a), Cell::UInt8(b)) => a == b,
            (Cell::UInt16(a), Cell::UInt16(b)) => a == b,
            (Cell::Int64(a), Cell::Int64(b)) => a == b,
            (Cell::UInt64(a), Cell::UInt64(b)) => a == b,
            (Cell::Double(a), Cell::Double(b)) => a.to_bits() == b.to_bits(),
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Date(a), Cell::Date(b)) => a == b,
            (Cell::Time(a), Cell::Time(b)) => a == b,
            (Cell::DateTime { julian_day: ja, packed_time: pa }, Cell::DateTime { julian_day: jb, packed_time: pb }) => {
                ja == jb && pa == pb
            }
            (Cell::TimeSlot(a), Cell::TimeSlot(b)) => a == b,
            (Cell::Tag(a), Cell::Tag(b)) => a == b,
            (Cell::Atom(a), Cell::Atom(b)) => a == b,
            (Cell::Url(a), Cell::Url(b))
            | (Cell::Latin1(a), Cell::Latin1(b))
            | (Cell::Ascii(a), Cell::Ascii(b))
            | (Cell::Lob(a), Cell::Lob(b))
            | (Cell::Bml(a), Cell::Bml(b))
            | (Cell::Img(a), Cell::Img(b))
            | (Cell::Pic(a), Cell::Pic(b)) => a == b,
            (Cell::Uuid(a), Cell::Uuid(b)) => a == b,
            (Cell::Oid(a), Cell::Oid(b)) => a == b,
            (Cell::Id32(a), Cell::Id32(b)) => a == b,
            (Cell::Id64(a), Cell::Id64(b)) => a == b,
            (Cell::Sid(a), Cell::Sid(b)) => a == b,
            (Cell::Rid(a), Cell::Rid(b)) => a == b,
            (Cell::String(a), Cell::String(b)) => a == b,
            (Cell::Html(a), Cell::Html(b)) => a == b,
            (Cell::Xml(a), Cell::Xml(b)) => a == b,
            _ => false,
        }
    }
}

/// Convenience constructor for a UTC `DateTime` cell from calendar fields.
#[must_use]
pub fn make_utc_datetime(date: CalendarDate, time: ClockTime) -> Cell {
    Cell::DateTime {
        julian_day: datetime::to_julian_day(date),
        packed_time: datetime::pack_time(time) | datetime::UTC_FLAG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(cell: &Cell) -> Cell {
        let mut buf = Vec::new();
        cell.write(&mut buf, false, false).unwrap();
        let mut src = PeekReader::new(&buf[..]);
        Cell::read(&mut src).unwrap().unwrap()
    }

    #[test]
    fn scalar_roundtrip() {
        assert_eq!(roundtrip(&Cell::Int32(-42)), Cell::Int32(-42));
        assert_eq!(roundtrip(&Cell::UInt64(u64::MAX)), Cell::UInt64(u64::MAX));
        assert_eq!(roundtrip(&Cell::Double(3.25)), Cell::Double(3.25));
        assert_eq!(roundtrip(&Cell::Null), Cell::Null);
        assert_eq!(roundtrip(&Cell::True), Cell::True);
    }

    #[test]
    fn ascii_text_roundtrip() {
        let cell = Cell::Ascii(b"hello".to_vec());
        assert_eq!(roundtrip(&cell), cell);
    }

    #[test]
    fn utf8_text_roundtrip() {
        let cell = Cell::String("héllo wörld".to_string());
        assert_eq!(roundtrip(&cell), cell);
    }

    #[test]
    fn mbyte_roundtrip() {
        assert_eq!(roundtrip(&Cell::Id32(300_000)), Cell::Id32(300_000));
        assert_eq!(roundtrip(&Cell::Oid(u64::from(u32::MAX) + 7)), Cell::Oid(u64::from(u32::MAX) + 7));
    }

    #[test]
    fn uuid_roundtrip() {
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let cell = Cell::Uuid(bytes);
        assert_eq!(roundtrip(&cell), cell);
        assert_eq!(
            cell.to_pretty_string(false).unwrap(),
            "{00010203-0405-0607-0809-0a0b0c0d0e0f}"
        );
    }

    #[test]
    fn timeslot_roundtrip() {
        let cell = Cell::TimeSlot(TimeSlot::new(23 * 60 + 45, 30));
        assert_eq!(roundtrip(&cell), cell);
    }

    #[test]
    fn scenario_s5_utc_datetime() {
        let cell = make_utc_datetime(CalendarDate { year: 2020, month: 6, day: 15 }, ClockTime { hour: 14, minute: 30, second: 0, millis: 0 });
        let round = roundtrip(&cell);
        let Cell::DateTime { packed_time, .. } = round else { panic!("expected DateTime") };
        assert!(datetime::is_utc(packed_time));
        assert_eq!(round, cell);
    }

    #[test]
    fn legacy_date_time_old_wire_order_decodes_same_value() {
        let cell = make_utc_datetime(CalendarDate { year: 2020, month: 6, day: 15 }, ClockTime { hour: 14, minute: 30, second: 0, millis: 0 });
        let Cell::DateTime { julian_day, packed_time } = cell else { unreachable!() };
        let mut old_wire = vec![Kind::DateTimeOld.to_type_byte(false)];
        old_wire.extend_from_slice(&packed_time.to_be_bytes());
        old_wire.extend_from_slice(&julian_day.to_be_bytes());
        let mut src = PeekReader::new(&old_wire[..]);
        let decoded = Cell::read(&mut src).unwrap().unwrap();
        assert_eq!(decoded, Cell::DateTime { julian_day, packed_time });
    }

    #[test]
    fn compressed_payload_roundtrip() {
        let cell = Cell::Ascii(b"x".repeat(500));
        let mut buf = Vec::new();
        cell.write(&mut buf, false, true).unwrap();
        assert!(buf[0] & 0x80 != 0);
        let mut src = PeekReader::new(&buf[..]);
        assert_eq!(Cell::read(&mut src).unwrap().unwrap(), cell);
    }

    #[test]
    fn small_payload_ignores_compression_request() {
        let cell = Cell::Ascii(b"tiny".to_vec());
        let mut buf = Vec::new();
        cell.write(&mut buf, false, true).unwrap();
        assert_eq!(buf[0] & 0x80, 0);
    }

    #[test]
    fn legacy_double_nul_is_tolerated() {
        let mut wire = vec![Kind::Ascii.to_type_byte(false)];
        wire.extend_from_slice(encode_u32(7).as_bytes());
        wire.extend_from_slice(b"hi\0\0\0\0\0");
        let mut src = PeekReader::new(&wire[..]);
        let cell = Cell::read(&mut src).unwrap().unwrap();
        assert_eq!(cell, Cell::Ascii(b"hi".to_vec()));
    }

    #[test]
    fn data_only_null_emits_placeholder_byte() {
        let mut buf = Vec::new();
        Cell::Null.write(&mut buf, true, false).unwrap();
        assert_eq!(buf, vec![0u8]);
        let mut buf2 = Vec::new();
        Cell::True.write(&mut buf2, true, false).unwrap();
        assert_eq!(buf2, vec![1u8]);
    }

    #[test]
    fn strip_markup_resolves_entities_and_tags() {
        let out = strip_markup_text("<b>Caf&eacute;</b> &amp; co");
        assert_eq!(out, "Café & co");
    }

    #[test]
    fn to_id64_rejects_text() {
        assert!(Cell::String("x".into()).to_id64().is_err());
        assert_eq!(Cell::Oid(7).to_id64().unwrap(), 7);
    }
}
