//! Flat materialization of a single frame's top-level slots.

use std::collections::BTreeMap;

use tml_core::NameTag;

use crate::cell::Cell;
use crate::error::CodecResult;
use crate::reader::{Reader, Token};

/// A frame's slots, bucketed by name flavor. Nested frames are not
/// descended into — only slots at the level `readFrom` starts at are
/// collected.
///
/// Ordering mirrors the reference implementation's sorted `QMap`s: later
/// writes of the same key replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Slots with no name, in stream order.
    pub array: Vec<Cell>,
    /// Slots named with an `Atom`.
    pub atoms: BTreeMap<u32, Cell>,
    /// Slots named with a `Tag`.
    pub tags: BTreeMap<NameTag, Cell>,
    /// Slots named with a first-occurrence ASCII literal.
    ///
    /// A *repeated* ASCII name resolves through the reader's string table to
    /// a `Latin1` name cell rather than `Ascii` (see
    /// [`crate::reader::Reader`]), so only the first use of a given slot
    /// name lands here — matching the reference implementation's
    /// `BmlRecord`, which keys this bucket on `TypeAscii` specifically.
    pub strings: BTreeMap<Vec<u8>, Cell>,
}

impl Record {
    /// Builds an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all buckets.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Reads top-level slots from a byte stream until the first non-`Slot`
    /// token (a nested `BeginFrame`, an `EndFrame`, or running out of data).
    pub fn read_from(bytes: &[u8]) -> CodecResult<Self> {
        let mut record = Self::new();
        let mut reader = Reader::new(bytes);
        let mut token = reader.next_token(false)?;
        while token == Token::Slot {
            let value = reader.value().cloned().unwrap_or(Cell::Null);
            match reader.name() {
                Cell::Null => record.array.push(value),
                Cell::Atom(id) => {
                    record.atoms.insert(*id, value);
                }
                Cell::Tag(tag) => {
                    record.tags.insert(*tag, value);
                }
                Cell::Ascii(name) => {
                    record.strings.insert(name.clone(), value);
                }
                _ => {}
            }
            token = reader.next_token(false)?;
        }
        Ok(record)
    }

    /// Reads top-level slots out of an embedded `Cell::Bml` document; any
    /// other kind yields an empty record.
    pub fn read_from_cell(cell: &Cell) -> CodecResult<Self> {
        match cell {
            Cell::Bml(bytes) => Self::read_from(bytes),
            _ => Ok(Self::new()),
        }
    }

    /// Emits the record's contents via `tracing::debug!`, mirroring
    /// `BmlRecord::dump`.
    pub fn dump(&self) {
        tracing::debug!("*** BmlRecord start");
        for (i, cell) in self.array.iter().enumerate() {
            tracing::debug!(index = i, value = ?cell, "array slot");
        }
        for (atom, cell) in &self.atoms {
            tracing::debug!(atom = format!("0x{atom:x}"), value = ?cell, "atom slot");
        }
        for (tag, cell) in &self.tags {
            tracing::debug!(tag = %tag, value = ?cell, "tag slot");
        }
        for (name, cell) in &self.strings {
            tracing::debug!(name = %String::from_utf8_lossy(name), value = ?cell, "string slot");
        }
        tracing::debug!("*** BmlRecord end");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ElementName, Writer};

    fn sample_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_slot(&Cell::Int32(1), ElementName::None, false).unwrap();
        w.write_slot(&Cell::Int32(2), ElementName::Atom(7), false).unwrap();
        w.write_slot(&Cell::True, ElementName::Tag(NameTag::from_ascii(b"ABC")), false).unwrap();
        w.write_slot(&Cell::False, ElementName::Ascii("foo"), false).unwrap();
        buf
    }

    #[test]
    fn buckets_slots_by_name_flavor() {
        let record = Record::read_from(&sample_bytes()).unwrap();
        assert_eq!(record.array, vec![Cell::Int32(1)]);
        assert_eq!(record.atoms.get(&7), Some(&Cell::Int32(2)));
        assert_eq!(record.tags.get(&NameTag::from_ascii(b"ABC")), Some(&Cell::True));
        assert_eq!(record.strings.get(b"foo".as_slice()), Some(&Cell::False));
    }

    #[test]
    fn repeated_ascii_name_resolves_to_latin1_and_is_dropped() {
        let mut buf = Vec::new();
        {
            let mut w = Writer::new(&mut buf);
            w.write_slot(&Cell::Int32(1), ElementName::Ascii("foo"), false).unwrap();
            w.write_slot(&Cell::Int32(2), ElementName::Ascii("foo"), false).unwrap();
        }
        let record = Record::read_from(&buf).unwrap();
        assert_eq!(record.strings.get(b"foo".as_slice()), Some(&Cell::Int32(1)));
        assert!(record.array.is_empty());
        assert!(record.atoms.is_empty());
    }

    #[test]
    fn does_not_descend_into_nested_frames() {
        let mut buf = Vec::new();
        {
            let mut w = Writer::new(&mut buf);
            w.write_slot(&Cell::Int32(1), ElementName::None, false).unwrap();
            w.start_frame(ElementName::None).unwrap();
            w.write_slot(&Cell::Int32(99), ElementName::None, false).unwrap();
            w.end_frame().unwrap();
        }
        let record = Record::read_from(&buf).unwrap();
        assert_eq!(record.array, vec![Cell::Int32(1)]);
    }

    #[test]
    fn non_bml_cell_yields_empty_record() {
        let record = Record::read_from_cell(&Cell::Int32(1)).unwrap();
        assert!(record.array.is_empty() && record.atoms.is_empty());
    }
}
