//! Stateful frame/slot emitter: the write-side counterpart to [`crate::reader::Reader`].

use std::collections::HashMap;
use std::io::Write;

use tml_core::vbyte::encode_u32;
use tml_core::NameTag;

use crate::cell::Cell;
use crate::error::CodecResult;
use crate::io::Sink;
use crate::kind::Kind;

/// How to name a frame or slot being written.
#[derive(Debug, Clone, Copy)]
pub enum ElementName<'a> {
    /// No name record is emitted.
    None,
    /// Atom (32-bit id) flavor.
    Atom(u32),
    /// 4-byte tag flavor.
    Tag(NameTag),
    /// ASCII-literal flavor, interned against the writer's string table.
    Ascii(&'a str),
}

/// Writes frames and slots to a sink, interning ASCII slot/frame names the
/// way the reference implementation's `DataWriter` does.
pub struct Writer<'a> {
    sink: Sink<'a>,
    names: HashMap<Vec<u8>, u32>,
    level: i16,
    cells: u32,
    nulls: u32,
}

impl<'a> Writer<'a> {
    /// Builds a writer over an owned byte sink.
    pub fn new(sink: impl Write + 'a) -> Self {
        Self::from_sink(Sink::Owned(Box::new(sink)))
    }

    /// Builds a writer over a borrowed byte sink.
    pub fn borrowed(sink: &'a mut dyn Write) -> Self {
        Self::from_sink(Sink::Borrowed(sink))
    }

    fn from_sink(sink: Sink<'a>) -> Self {
        Self { sink, names: HashMap::new(), level: 0, cells: 0, nulls: 0 }
    }

    /// Current frame nesting depth.
    #[must_use]
    pub const fn level(&self) -> i16 {
        self.level
    }

    /// Count of top-level cells written (frames and slots opened/written at
    /// level 0), matching the reference implementation's `getNrOfCells`.
    #[must_use]
    pub const fn cells(&self) -> u32 {
        self.cells
    }

    /// Count of top-level slots written with a `Cell::Null` value.
    #[must_use]
    pub const fn nulls(&self) -> u32 {
        self.nulls
    }

    /// Opens a frame, optionally named.
    pub fn start_frame(&mut self, name: ElementName<'_>) -> CodecResult<()> {
        self.sink.write_all(&[Kind::FrameStart.to_type_byte(false)])?;
        self.begin();
        self.write_name(name, Kind::FrameName, Kind::FrameNameTag, Kind::FrameNameStr, Kind::FrameNameIdx)
    }

    /// Closes the innermost open frame. A no-op at level 0.
    pub fn end_frame(&mut self) -> CodecResult<()> {
        if self.level == 0 {
            return Ok(());
        }
        self.level -= 1;
        self.sink.write_all(&[Kind::FrameEnd.to_type_byte(false)])?;
        Ok(())
    }

    /// Writes a slot: an optional name record followed by `value`. A value
    /// of `Cell::Invalid` is a silent no-op: no name record, no value bytes.
    pub fn write_slot(&mut self, value: &Cell, name: ElementName<'_>, compress: bool) -> CodecResult<()> {
        if matches!(value, Cell::Invalid) {
            return Ok(());
        }
        self.write_name(name, Kind::SlotName, Kind::SlotNameTag, Kind::SlotNameStr, Kind::SlotNameIdx)?;
        value.write(&mut self.sink, false, compress)?;
        if self.level == 0 {
            self.cells += 1;
            if value.is_null() {
                self.nulls += 1;
            }
        }
        Ok(())
    }

    fn begin(&mut self) {
        if self.level == 0 {
            self.cells += 1;
        }
        self.level += 1;
    }

    fn write_name(
        &mut self,
        name: ElementName<'_>,
        atom_kind: Kind,
        tag_kind: Kind,
        str_kind: Kind,
        idx_kind: Kind,
    ) -> CodecResult<()> {
        match name {
            ElementName::None => Ok(()),
            ElementName::Atom(0) => Ok(()),
            ElementName::Atom(id) => {
                self.sink.write_all(&[atom_kind.to_type_byte(false)])?;
                self.sink.write_all(&id.to_be_bytes())?;
                Ok(())
            }
            ElementName::Tag(tag) if tag.is_null() => Ok(()),
            ElementName::Tag(tag) => {
                self.sink.write_all(&[tag_kind.to_type_byte(false)])?;
                self.sink.write_all(&tag.to_bytes())?;
                Ok(())
            }
            ElementName::Ascii(s) => self.write_ascii_name(s, str_kind, idx_kind),
        }
    }

    /// Interns `name`: on the first occurrence, writes the literal and
    /// records `name -> (table size before insertion)`; on a repeat, writes
    /// the stored index instead.
    fn write_ascii_name(&mut self, name: &str, str_kind: Kind, idx_kind: Kind) -> CodecResult<()> {
        if let Some(&index) = self.names.get(name.as_bytes()) {
            self.sink.write_all(&[idx_kind.to_type_byte(false)])?;
            self.sink.write_all(encode_u32(index).as_bytes())?;
            return Ok(());
        }
        let index = self.names.len() as u32;
        self.names.insert(name.as_bytes().to_vec(), index);
        self.sink.write_all(&[str_kind.to_type_byte(false)])?;
        let mut payload = name.as_bytes().to_vec();
        payload.push(0);
        self.sink.write_all(encode_u32(payload.len() as u32).as_bytes())?;
        self.sink.write_all(&payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_frame_below_zero_is_noop() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.end_frame().unwrap();
        assert!(buf.is_empty());
        assert_eq!(w.level(), 0);
    }

    #[test]
    fn top_level_counters_only_update_at_level_zero() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.start_frame(ElementName::None).unwrap();
        w.write_slot(&Cell::Null, ElementName::None, false).unwrap();
        w.end_frame().unwrap();
        // one top-level frame cell, plus the nested slot does not count
        assert_eq!(w.cells(), 1);
        assert_eq!(w.nulls(), 0);

        w.write_slot(&Cell::Null, ElementName::None, false).unwrap();
        assert_eq!(w.cells(), 2);
        assert_eq!(w.nulls(), 1);
    }

    #[test]
    fn ascii_name_interns_on_repeat() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_slot(&Cell::Int32(1), ElementName::Ascii("foo"), false).unwrap();
        w.write_slot(&Cell::Int32(2), ElementName::Ascii("foo"), false).unwrap();
        w.write_slot(&Cell::Int32(3), ElementName::Ascii("bar"), false).unwrap();
        // foo -> index 0 on second use, bar -> index 1 is never replayed here
        assert_eq!(buf[0], Kind::SlotNameStr.to_type_byte(false));
        let second_name_start = {
            // first record: SlotNameStr(0x28 len=4 "foo\0") + Int32 value (5 bytes)
            1 + 1 + 4 + 1 + 4
        };
        assert_eq!(buf[second_name_start], Kind::SlotNameIdx.to_type_byte(false));
        assert_eq!(buf[second_name_start + 1], 0); // index 0, single-byte vbyte
    }

    #[test]
    fn invalid_value_suppresses_the_whole_slot() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_slot(&Cell::Invalid, ElementName::Ascii("foo"), false).unwrap();
        assert!(buf.is_empty());
        assert_eq!(w.cells(), 0);
    }

    #[test]
    fn atom_zero_and_tag_null_suppress_name_record() {
        let mut buf = Vec::new();
        let mut w = Writer::new(&mut buf);
        w.write_slot(&Cell::True, ElementName::Atom(0), false).unwrap();
        assert_eq!(buf, vec![Kind::True.to_type_byte(false)]);

        let mut buf2 = Vec::new();
        let mut w2 = Writer::new(&mut buf2);
        w2.write_slot(&Cell::True, ElementName::Tag(NameTag::NULL), false).unwrap();
        assert_eq!(buf2, vec![Kind::True.to_type_byte(false)]);
    }
}
