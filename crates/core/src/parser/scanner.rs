//! Byte-level scanner for PCL XL binary streams.
//!
//! Turns the bytes between two operator tags into attributes of an
//! [`AttributeSet`] and stops at each operator tag. A value always precedes
//! its attribute tag on the wire:
//!
//! ```text
//! c1 58 02        uint16 600        (value)
//! f8 89           attribute 137     (UnitsPerMeasure)
//! 41              BeginSession      (operator)
//! ```
//!
//! Embedded data (`0xFA` with a uint32 length, `0xFB` with a ubyte length)
//! may directly follow an operator tag and is returned with it.

use crate::attr::{ArrayPayload, AttributeSet, Number};
use crate::config::InterpreterOptions;
use crate::error::{PxlError, Result};
use crate::model::{AttributeId, DataType, NumericKind, ProtocolVersion, Shape, attribute_info};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::trace;

/// Universal Exit Language sequence; ends a PCL XL stream.
pub const UEL: &[u8] = b"\x1b%-12345X";

const ATTR_UBYTE: u8 = 0xF8;
const ATTR_UINT16: u8 = 0xF9;
const DATA_UINT32: u8 = 0xFA;
const DATA_UBYTE: u8 = 0xFB;

const STREAM_PREFIX: &[u8] = b" HP-PCL XL;";

/// Byte order of multi-byte values, fixed by the stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    LittleEndian,
    BigEndian,
}

impl Binding {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            b')' => Ok(Self::LittleEndian),
            b'(' => Ok(Self::BigEndian),
            b'\'' => Err(PxlError::UnsupportedBinding('\'')),
            other => Err(PxlError::IllegalStreamHeader(format!(
                "unknown binding byte {other:#04x}"
            ))),
        }
    }
}

/// Parsed stream header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub binding: Binding,
    pub version: ProtocolVersion,
    pub comment: Option<String>,
}

/// An operator tag with its optional embedded data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedOperator<'d> {
    pub tag: u8,
    /// Offset of the tag in the input.
    pub pos: usize,
    pub data: Option<&'d [u8]>,
}

#[derive(Debug)]
enum PendingValue {
    Scalar(Number),
    Structured(Shape, ArrayPayload),
}

pub struct Scanner<'d> {
    data: &'d [u8],
    pos: usize,
    binding: Binding,
    version: ProtocolVersion,
    max_embedded_data: usize,
    strict_attribute_versions: bool,
    /// A decoded value waiting for its attribute tag, with its offset.
    pending: Option<(PendingValue, usize)>,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x00 | 0x09..=0x0D | 0x20)
}

fn decode<B: ByteOrder>(kind: NumericKind, buf: &[u8]) -> Number {
    match kind {
        NumericKind::UByte => Number::UByte(buf[0]),
        NumericKind::UInt16 => Number::UInt16(B::read_u16(buf)),
        NumericKind::UInt32 => Number::UInt32(B::read_u32(buf)),
        NumericKind::SInt16 => Number::SInt16(B::read_i16(buf)),
        NumericKind::SInt32 => Number::SInt32(B::read_i32(buf)),
        NumericKind::Real32 => Number::Real32(B::read_f32(buf)),
    }
}

impl<'d> Scanner<'d> {
    /// Scanner positioned at the start of `data`, little-endian, at the
    /// options' default protocol level until a header is read.
    pub fn new(data: &'d [u8], options: &InterpreterOptions) -> Self {
        Self {
            data,
            pos: 0,
            binding: Binding::LittleEndian,
            version: options.default_version,
            max_embedded_data: options.max_embedded_data,
            strict_attribute_versions: options.strict_attribute_versions,
            pending: None,
        }
    }

    pub const fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub const fn tell(&self) -> usize {
        self.pos
    }

    pub const fn binding(&self) -> Binding {
        self.binding
    }

    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn remaining(&self) -> &'d [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn take(&mut self, n: usize) -> Result<&'d [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(PxlError::UnexpectedEof {
                pos: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_uel(&self) -> bool {
        self.remaining().starts_with(UEL)
    }

    /// Skip a UEL and PJL preamble, if any.
    ///
    /// With a preamble, the stream starts on the line after
    /// `@PJL ENTER LANGUAGE=PCLXL`. Without one the position is unchanged.
    pub fn locate_stream(&mut self) -> Result<()> {
        if !self.at_uel() {
            return Ok(());
        }
        self.pos += UEL.len();
        loop {
            self.skip_whitespace();
            let rest = self.remaining();
            if !rest.starts_with(b"@PJL") {
                return Err(PxlError::IllegalStreamHeader(
                    "PJL preamble without ENTER LANGUAGE".into(),
                ));
            }
            let line_len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            let line = String::from_utf8_lossy(&rest[..line_len]).to_ascii_uppercase();
            self.pos += (line_len + 1).min(rest.len());
            if line.contains("ENTER") && line.contains("LANGUAGE") {
                if line.contains("PCLXL") {
                    return Ok(());
                }
                return Err(PxlError::IllegalStreamHeader(format!(
                    "preamble enters another language: {}",
                    line.trim()
                )));
            }
            trace!(line = line.trim(), "skipped PJL line");
        }
    }

    /// Parse `<binding> HP-PCL XL;<class>;<revision>[;comment]` up to LF.
    pub fn read_header(&mut self) -> Result<StreamHeader> {
        let start = self.pos;
        let binding = Binding::from_byte(self.peek().ok_or(PxlError::UnexpectedEof { pos: start })?)?;
        self.pos += 1;

        let rest = self.remaining();
        let line_len = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(PxlError::UnexpectedEof {
                pos: self.data.len(),
            })?;
        let line = &rest[..line_len];
        self.pos += line_len + 1;

        let Some(fields) = line.strip_prefix(STREAM_PREFIX) else {
            return Err(PxlError::IllegalStreamHeader(
                String::from_utf8_lossy(line).into_owned(),
            ));
        };
        let text = String::from_utf8_lossy(fields);
        let text = text.trim_end_matches('\r');
        let mut parts = text.splitn(3, ';');
        let class = parse_level(parts.next(), "class")?;
        let revision = parse_level(parts.next(), "revision")?;
        if class == 0 {
            return Err(PxlError::IllegalStreamHeader(format!(
                "protocol class {class}.{revision}"
            )));
        }
        let comment = parts.next().map(str::to_owned);

        self.binding = binding;
        self.version = ProtocolVersion::new(class, revision);
        trace!(?binding, version = %self.version, "stream header");
        Ok(StreamHeader {
            binding,
            version: self.version,
            comment,
        })
    }

    /// Scan attributes into `set` up to the next operator tag.
    ///
    /// Returns `None` at the end of input or at a UEL. Input that ends with
    /// values or attributes still waiting for an operator is truncated.
    pub fn next_operator(&mut self, set: &mut AttributeSet) -> Result<Option<ScannedOperator<'d>>> {
        loop {
            self.skip_whitespace();
            let pos = self.pos;
            let Some(tag) = self.peek() else {
                return self.finish(set);
            };
            match tag {
                0x1B if self.at_uel() => return self.finish(set),
                0x41..=0xBF => {
                    if self.pending.is_some() {
                        return Err(PxlError::IllegalTag { tag, pos });
                    }
                    self.pos += 1;
                    let data = self.read_embedded_data()?;
                    return Ok(Some(ScannedOperator { tag, pos, data }));
                }
                0xC0..=0xEF => {
                    let data_type =
                        DataType::from_tag(tag).ok_or(PxlError::IllegalTag { tag, pos })?;
                    if self.pending.is_some() {
                        return Err(PxlError::IllegalTag { tag, pos });
                    }
                    self.pos += 1;
                    let value = self.read_value(data_type)?;
                    self.pending = Some((value, pos));
                }
                ATTR_UBYTE | ATTR_UINT16 => {
                    self.pos += 1;
                    let id = if tag == ATTR_UBYTE {
                        u16::from(self.take(1)?[0])
                    } else {
                        self.read_u16()?
                    };
                    let (value, _) = self
                        .pending
                        .take()
                        .ok_or(PxlError::IllegalTag { tag, pos })?;
                    self.add_attribute(set, AttributeId(id), value, pos)?;
                }
                _ => return Err(PxlError::IllegalTag { tag, pos }),
            }
        }
    }

    fn finish(&mut self, set: &AttributeSet) -> Result<Option<ScannedOperator<'d>>> {
        if let Some((_, pos)) = self.pending {
            return Err(PxlError::UnexpectedEof { pos });
        }
        if !set.is_empty() {
            return Err(PxlError::UnexpectedEof { pos: self.pos });
        }
        Ok(None)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let buf = self.take(2)?;
        Ok(match self.binding {
            Binding::LittleEndian => LittleEndian::read_u16(buf),
            Binding::BigEndian => BigEndian::read_u16(buf),
        })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let buf = self.take(4)?;
        Ok(match self.binding {
            Binding::LittleEndian => LittleEndian::read_u32(buf),
            Binding::BigEndian => BigEndian::read_u32(buf),
        })
    }

    fn read_number(&mut self, kind: NumericKind) -> Result<Number> {
        let buf = self.take(kind.size())?;
        Ok(match self.binding {
            Binding::LittleEndian => decode::<LittleEndian>(kind, buf),
            Binding::BigEndian => decode::<BigEndian>(kind, buf),
        })
    }

    fn read_elements(&mut self, kind: NumericKind, count: usize) -> Result<ArrayPayload> {
        let buf = self.take(count * kind.size())?;
        match self.binding {
            Binding::LittleEndian => Ok(ArrayPayload::from_le_bytes(kind, buf)),
            Binding::BigEndian => {
                let mut payload = ArrayPayload::with_capacity(kind, count);
                for chunk in buf.chunks_exact(kind.size()) {
                    payload.push(decode::<BigEndian>(kind, chunk));
                }
                Ok(payload)
            }
        }
    }

    fn read_value(&mut self, data_type: DataType) -> Result<PendingValue> {
        let kind = data_type.kind;
        match data_type.shape {
            Shape::Scalar => Ok(PendingValue::Scalar(self.read_number(kind)?)),
            Shape::Array => {
                let pos = self.pos;
                let prefix = self.peek().ok_or(PxlError::UnexpectedEof { pos })?;
                self.pos += 1;
                let count = match DataType::from_tag(prefix) {
                    Some(DataType::UBYTE) => usize::from(self.take(1)?[0]),
                    Some(DataType::UINT16) => usize::from(self.read_u16()?),
                    _ => return Err(PxlError::IllegalTag { tag: prefix, pos }),
                };
                let bytes = count * kind.size();
                if bytes > self.max_embedded_data {
                    return Err(PxlError::IllegalArraySize {
                        size: count as u64,
                        pos,
                    });
                }
                let payload = self.read_elements(kind, count)?;
                Ok(PendingValue::Structured(Shape::Array, payload))
            }
            shape => {
                let count = shape.fixed_len().unwrap_or(0);
                let payload = self.read_elements(kind, count)?;
                Ok(PendingValue::Structured(shape, payload))
            }
        }
    }

    fn add_attribute(
        &mut self,
        set: &mut AttributeSet,
        id: AttributeId,
        value: PendingValue,
        pos: usize,
    ) -> Result<()> {
        let info = attribute_info(id);
        if self.strict_attribute_versions
            && !info.is_unknown()
            && !self.version.supports(info.min_version)
        {
            return Err(PxlError::IllegalAttribute {
                attribute: info.name,
                declared: self.version,
            });
        }

        let handle = set.get_new().ok_or(PxlError::TooManyAttributes { pos })?;
        let slot = set.slot_mut(handle);
        match value {
            PendingValue::Scalar(n) => slot.set_scalar(id, n),
            PendingValue::Structured(shape, payload) => slot.set_array(id, shape, payload),
        }
        let attr = set.add(handle);
        trace!(attribute = %id, data_type = %attr.data_type, pos, "attribute");
        Ok(())
    }

    fn read_embedded_data(&mut self) -> Result<Option<&'d [u8]>> {
        let pos = self.pos;
        let len = match self.peek() {
            Some(DATA_UINT32) => {
                self.pos += 1;
                u64::from(self.read_u32()?)
            }
            Some(DATA_UBYTE) => {
                self.pos += 1;
                u64::from(self.take(1)?[0])
            }
            _ => return Ok(None),
        };
        if len > self.max_embedded_data as u64 {
            return Err(PxlError::EmbeddedDataTooLarge {
                size: len,
                limit: self.max_embedded_data,
            });
        }
        let data = self.take(len as usize)?;
        trace!(len, pos, "embedded data");
        Ok(Some(data))
    }
}

fn parse_level(field: Option<&str>, what: &str) -> Result<u8> {
    field
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(|| PxlError::IllegalStreamHeader(format!("bad protocol {what}")))
}
