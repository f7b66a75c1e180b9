//! Pull-style token reader over a byte stream of cells.

use std::io::Read;

use tml_core::NameTag;

use crate::cell::{Cell, Peek};
use crate::error::CodecResult;
use crate::io::{PeekReader, Source};
use crate::kind::Kind;

/// One step of the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Not enough bytes are available yet to assemble the next token.
    Pending,
    /// A frame was opened; [`Reader::name`] holds its name (or `Cell::Null`).
    BeginFrame,
    /// A frame was closed.
    EndFrame,
    /// A slot was read; [`Reader::name`] and [`Reader::value`] hold it.
    Slot,
}

impl Token {
    /// `true` for every token except [`Token::Pending`].
    #[must_use]
    pub const fn is_useful(self) -> bool {
        !matches!(self, Token::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    FrameNamePending,
    SlotPeekPending,
    SlotValuePending,
}

/// Drives a byte source through the frame/slot token stream.
pub struct Reader<'a> {
    src: PeekReader<Source<'a>>,
    name: Cell,
    value: Option<Cell>,
    state: State,
    last_token: Token,
    peeking: bool,
    level: i16,
    names: Vec<Vec<u8>>,
}

impl<'a> Reader<'a> {
    /// Builds a reader over an owned byte source.
    pub fn new(source: impl Read + 'a) -> Self {
        Self::from_source(Source::Owned(Box::new(source)))
    }

    /// Builds a reader over a borrowed byte source.
    pub fn borrowed(source: &'a mut dyn Read) -> Self {
        Self::from_source(Source::Borrowed(source))
    }

    fn from_source(source: Source<'a>) -> Self {
        Self {
            src: PeekReader::new(source),
            name: Cell::Null,
            value: None,
            state: State::Idle,
            last_token: Token::Pending,
            peeking: false,
            level: 0,
            names: Vec::new(),
        }
    }

    /// Current frame nesting depth.
    #[must_use]
    pub const fn level(&self) -> i16 {
        self.level
    }

    /// The most recently materialized name cell (`Cell::Null` if anonymous).
    #[must_use]
    pub const fn name(&self) -> &Cell {
        &self.name
    }

    /// The most recently materialized slot value, if the last token was
    /// [`Token::Slot`].
    #[must_use]
    pub const fn value(&self) -> Option<&Cell> {
        self.value.as_ref()
    }

    /// Advances the token stream.
    ///
    /// With `peek = true`, the computed token is staged rather than
    /// consumed: the next call (with any `peek` value) returns the same
    /// staged token without re-advancing, until a call with `peek = false`
    /// un-stages it. Only one token may be staged at a time.
    pub fn next_token(&mut self, peek: bool) -> CodecResult<Token> {
        if peek {
            if self.peeking {
                return Ok(self.last_token);
            }
            self.peeking = true;
            self.fetch_next()?;
            Ok(self.last_token)
        } else {
            if self.peeking {
                self.peeking = false;
                return Ok(self.last_token);
            }
            self.fetch_next()?;
            Ok(self.last_token)
        }
    }

    /// Advances until a level-dropping `EndFrame` is consumed (inclusive).
    /// Returns `true` if one was found, `false` on running out of data.
    pub fn skip_to_end_frame(&mut self) -> CodecResult<bool> {
        let start_level = self.level;
        let mut token = self.next_token(false)?;
        while token.is_useful() {
            if token == Token::EndFrame && self.level < start_level {
                return Ok(true);
            }
            token = self.next_token(false)?;
        }
        Ok(false)
    }

    /// Drains the whole stream, concatenating every `String`/`Html`/`Xml`
    /// (and, if `unicode_only` is false, `Latin1`/`Ascii`) slot value.
    pub fn extract_string(&mut self, unicode_only: bool, separate_by_space: bool) -> CodecResult<String> {
        let mut out = String::new();
        let mut token = self.next_token(false)?;
        while token.is_useful() {
            if token == Token::Slot {
                let piece = match self.value.as_ref() {
                    Some(Cell::String(s)) => Some(s.clone()),
                    Some(Cell::Latin1(b) | Cell::Ascii(b)) if !unicode_only => {
                        Some(String::from_utf8_lossy(b).into_owned())
                    }
                    _ => None,
                };
                if let Some(piece) = piece {
                    if separate_by_space && !out.is_empty() && !out.ends_with(char::is_whitespace) {
                        out.push(' ');
                    }
                    out.push_str(&piece);
                }
            }
            token = self.next_token(false)?;
        }
        Ok(out)
    }

    /// Drains the whole stream, emitting one `tracing::debug!` event per
    /// token. A diagnostic aid, not a core concern.
    pub fn dump(&mut self, title: &str) -> CodecResult<()> {
        tracing::debug!(title, "***Start BML");
        let mut token = self.next_token(false)?;
        while token.is_useful() {
            match token {
                Token::BeginFrame => {
                    tracing::debug!(name = ?self.name, "BeginFrame");
                }
                Token::EndFrame => tracing::debug!("EndFrame"),
                Token::Slot => {
                    tracing::debug!(name = ?self.name, value = ?self.value, "Slot");
                }
                Token::Pending => unreachable!("filtered by is_useful"),
            }
            token = self.next_token(false)?;
        }
        tracing::debug!("***End BML");
        Ok(())
    }

    fn fetch_next(&mut self) -> CodecResult<()> {
        let head = self.src.peek(1)?;
        if head.is_empty() {
            self.last_token = Token::Pending;
            return Ok(());
        }

        match self.state {
            State::Idle => self.fetch_from_idle()?,
            State::FrameNamePending => self.fetch_frame_name_pending()?,
            State::SlotPeekPending => self.fetch_slot_peek_pending()?,
            State::SlotValuePending => self.fetch_slot_value_pending()?,
        }
        Ok(())
    }

    fn peeked_kind(&mut self) -> CodecResult<Option<Kind>> {
        let head = self.src.peek(1)?;
        let Some(&byte) = head.first() else { return Ok(None) };
        Ok(Some(Kind::from_type_byte(byte)?.0))
    }

    fn fetch_from_idle(&mut self) -> CodecResult<()> {
        let kind = self.peeked_kind()?.expect("checked non-empty by fetch_next");
        if kind == Kind::FrameStart {
            self.src.take(1)?; // consume FrameStart; it is always exactly 1 byte
            let Some(next_kind) = self.peeked_kind()? else {
                self.last_token = Token::Pending;
                return Ok(());
            };
            if is_frame_name_kind(next_kind) {
                match self.read_name_cell()? {
                    None => {
                        self.state = State::FrameNamePending;
                        self.last_token = Token::Pending;
                    }
                    Some(()) => {
                        self.level += 1;
                        self.last_token = Token::BeginFrame;
                    }
                }
            } else {
                self.name = Cell::Null;
                self.level += 1;
                self.last_token = Token::BeginFrame;
            }
        } else if kind == Kind::FrameEnd {
            self.src.take(1)?;
            self.level -= 1;
            self.last_token = Token::EndFrame;
        } else if is_slot_name_kind(kind) {
            match self.read_name_cell()? {
                None => self.last_token = Token::Pending,
                Some(()) => self.begin_slot_value()?,
            }
        } else {
            self.name = Cell::Null;
            self.begin_slot_value()?;
        }
        Ok(())
    }

    fn fetch_frame_name_pending(&mut self) -> CodecResult<()> {
        match self.read_name_cell()? {
            None => self.last_token = Token::Pending,
            Some(()) => {
                self.level += 1;
                self.state = State::Idle;
                self.last_token = Token::BeginFrame;
            }
        }
        Ok(())
    }

    fn fetch_slot_peek_pending(&mut self) -> CodecResult<()> {
        match Cell::peek(&mut self.src)? {
            None => self.last_token = Token::Pending,
            Some(_) => {
                self.state = State::SlotValuePending;
                self.try_complete_slot_value()?;
            }
        }
        Ok(())
    }

    fn fetch_slot_value_pending(&mut self) -> CodecResult<()> {
        self.try_complete_slot_value()
    }

    /// Peeks the slot value header; stages `SlotPeekPending`/`SlotValuePending`
    /// and attempts to finish immediately, matching the eager-completion
    /// behavior of the reference implementation's `fetchNext`.
    fn begin_slot_value(&mut self) -> CodecResult<()> {
        match Cell::peek(&mut self.src)? {
            None => {
                self.last_token = Token::Pending;
            }
            Some(_) => {
                self.state = State::SlotValuePending;
                self.try_complete_slot_value()?;
            }
        }
        Ok(())
    }

    fn try_complete_slot_value(&mut self) -> CodecResult<()> {
        match Cell::read(&mut self.src)? {
            None => self.last_token = Token::Pending,
            Some(value) => {
                self.value = Some(value);
                self.state = State::Idle;
                self.last_token = Token::Slot;
            }
        }
        Ok(())
    }

    /// Reads a name cell (frame or slot flavor) and applies the string-table
    /// interning/resolution policy. Returns `Ok(None)` if not yet fully
    /// available (state is left unchanged so a retry re-peeks from scratch).
    fn read_name_cell(&mut self) -> CodecResult<Option<()>> {
        let Some(peek) = Cell::peek(&mut self.src)? else { return Ok(None) };
        let wire_kind = peek.kind;
        let Some(cell) = Cell::read(&mut self.src)? else { return Ok(None) };

        match wire_kind {
            Kind::FrameNameStr | Kind::SlotNameStr => {
                if let Cell::Ascii(bytes) = &cell {
                    self.names.push(bytes.clone());
                }
                self.name = cell;
            }
            Kind::FrameNameIdx | Kind::SlotNameIdx => {
                if let Cell::Id32(idx) = cell {
                    self.name = match self.names.get(idx as usize) {
                        Some(bytes) => Cell::Latin1(bytes.clone()),
                        None => {
                            tracing::warn!(idx, "out-of-range name-table index resolved to empty");
                            Cell::Latin1(Vec::new())
                        }
                    };
                } else {
                    self.name = cell;
                }
            }
            _ => self.name = cell,
        }
        Ok(Some(()))
    }
}

const fn is_frame_name_kind(kind: Kind) -> bool {
    matches!(kind, Kind::FrameName | Kind::FrameNameTag | Kind::FrameNameStr | Kind::FrameNameIdx)
}

const fn is_slot_name_kind(kind: Kind) -> bool {
    matches!(kind, Kind::SlotName | Kind::SlotNameTag | Kind::SlotNameStr | Kind::SlotNameIdx)
}

/// The name cell's `NameTag`, if it carries one (`Cell::Null`/other kinds
/// return `NameTag::NULL`). A convenience for callers keying off tag names.
#[must_use]
pub fn name_as_tag(name: &Cell) -> NameTag {
    match name {
        Cell::Tag(tag) => *tag,
        _ => NameTag::NULL,
    }
}
