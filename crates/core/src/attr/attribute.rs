//! Decoded attribute values and typed accessors.

use crate::error::{PxlError, Result};
use crate::model::{AttributeId, DataType, NumericKind, Shape};
use byteorder::{ByteOrder, LittleEndian};
use smallvec::SmallVec;

/// Array payloads up to this many bytes live inside the attribute itself.
pub const INLINE_ARRAY_BYTES: usize = 16;

/// A single numeric element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    UByte(u8),
    UInt16(u16),
    UInt32(u32),
    SInt16(i16),
    SInt32(i32),
    Real32(f32),
}

impl Number {
    pub const fn kind(self) -> NumericKind {
        match self {
            Self::UByte(_) => NumericKind::UByte,
            Self::UInt16(_) => NumericKind::UInt16,
            Self::UInt32(_) => NumericKind::UInt32,
            Self::SInt16(_) => NumericKind::SInt16,
            Self::SInt32(_) => NumericKind::SInt32,
            Self::Real32(_) => NumericKind::Real32,
        }
    }

    /// Integer value, or `None` for reals.
    pub const fn to_i64(self) -> Option<i64> {
        match self {
            Self::UByte(n) => Some(n as i64),
            Self::UInt16(n) => Some(n as i64),
            Self::UInt32(n) => Some(n as i64),
            Self::SInt16(n) => Some(n as i64),
            Self::SInt32(n) => Some(n as i64),
            Self::Real32(_) => None,
        }
    }

    pub fn to_f32(self) -> f32 {
        match self {
            Self::Real32(n) => n,
            // 32-bit integers above 2^24 lose precision
            other => other.to_i64().unwrap_or_default() as f32,
        }
    }

    fn read_le(kind: NumericKind, buf: &[u8]) -> Self {
        match kind {
            NumericKind::UByte => Self::UByte(buf[0]),
            NumericKind::UInt16 => Self::UInt16(LittleEndian::read_u16(buf)),
            NumericKind::UInt32 => Self::UInt32(LittleEndian::read_u32(buf)),
            NumericKind::SInt16 => Self::SInt16(LittleEndian::read_i16(buf)),
            NumericKind::SInt32 => Self::SInt32(LittleEndian::read_i32(buf)),
            NumericKind::Real32 => Self::Real32(LittleEndian::read_f32(buf)),
        }
    }

    fn write_le(self, out: &mut SmallVec<[u8; INLINE_ARRAY_BYTES]>) {
        let mut buf = [0u8; 4];
        let len = self.kind().size();
        match self {
            Self::UByte(n) => buf[0] = n,
            Self::UInt16(n) => LittleEndian::write_u16(&mut buf, n),
            Self::UInt32(n) => LittleEndian::write_u32(&mut buf, n),
            Self::SInt16(n) => LittleEndian::write_i16(&mut buf, n),
            Self::SInt32(n) => LittleEndian::write_i32(&mut buf, n),
            Self::Real32(n) => LittleEndian::write_f32(&mut buf, n),
        }
        out.extend_from_slice(&buf[..len]);
    }
}

/// Element payload of an array, xy or box value.
///
/// Elements are stored little-endian regardless of the stream binding.
/// Short payloads stay inline; longer ones own a heap buffer that is freed
/// when the value is dropped or overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPayload {
    kind: NumericKind,
    count: usize,
    bytes: SmallVec<[u8; INLINE_ARRAY_BYTES]>,
}

impl ArrayPayload {
    pub fn new(kind: NumericKind) -> Self {
        Self {
            kind,
            count: 0,
            bytes: SmallVec::new(),
        }
    }

    pub fn with_capacity(kind: NumericKind, count: usize) -> Self {
        Self {
            kind,
            count: 0,
            bytes: SmallVec::with_capacity(count.saturating_mul(kind.size())),
        }
    }

    /// Build from already little-endian element bytes.
    ///
    /// Trailing bytes that do not form a whole element are dropped.
    pub fn from_le_bytes(kind: NumericKind, bytes: &[u8]) -> Self {
        let count = bytes.len() / kind.size();
        Self {
            kind,
            count,
            bytes: SmallVec::from_slice(&bytes[..count * kind.size()]),
        }
    }

    pub fn from_numbers(kind: NumericKind, numbers: &[Number]) -> Self {
        let mut payload = Self::with_capacity(kind, numbers.len());
        for &n in numbers {
            payload.push(n);
        }
        payload
    }

    /// Append one element. Its kind must match the payload kind.
    pub fn push(&mut self, n: Number) {
        debug_assert_eq!(n.kind(), self.kind);
        n.write_le(&mut self.bytes);
        self.count += 1;
    }

    pub const fn kind(&self) -> NumericKind {
        self.kind
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn element_size(&self) -> usize {
        self.kind.size()
    }

    /// Whether the payload lives in the inline buffer.
    pub fn is_inline(&self) -> bool {
        !self.bytes.spilled()
    }

    pub fn get(&self, index: usize) -> Option<Number> {
        if index >= self.count {
            return None;
        }
        let size = self.kind.size();
        Some(Number::read_le(self.kind, &self.bytes[index * size..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> + '_ {
        self.bytes
            .chunks_exact(self.kind.size())
            .map(|chunk| Number::read_le(self.kind, chunk))
    }

    /// Raw little-endian element bytes.
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// The value carried by an attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Slot not yet filled, or released.
    #[default]
    Empty,
    Scalar(Number),
    Array(ArrayPayload),
}

/// One decoded attribute.
///
/// Attributes live in the fixed slots of an [`AttributeSet`](super::AttributeSet);
/// `slot_index` records which one, so the set can verify that an attribute
/// handed back to it came from its own `get_new`.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub id: AttributeId,
    pub data_type: DataType,
    pub value: Value,
    slot_index: u8,
}

impl Attribute {
    pub(crate) const fn vacant(slot_index: u8) -> Self {
        Self {
            id: AttributeId(0),
            data_type: DataType::UBYTE,
            value: Value::Empty,
            slot_index,
        }
    }

    pub const fn slot_index(&self) -> u8 {
        self.slot_index
    }

    /// Fill in a scalar value.
    pub fn set_scalar(&mut self, id: AttributeId, n: Number) {
        self.id = id;
        self.data_type = DataType::new(n.kind(), Shape::Scalar);
        self.value = Value::Scalar(n);
    }

    /// Fill in a structured value of the given shape.
    pub fn set_array(&mut self, id: AttributeId, shape: Shape, payload: ArrayPayload) {
        debug_assert!(shape != Shape::Scalar);
        self.id = id;
        self.data_type = DataType::new(payload.kind(), shape);
        self.value = Value::Array(payload);
    }

    /// Drop the value, releasing any heap payload.
    pub(crate) fn release(&mut self) {
        self.value = Value::Empty;
    }

    /// Element count: 1 for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Empty => 0,
            Value::Scalar(_) => 1,
            Value::Array(payload) => payload.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn payload(&self) -> Option<&ArrayPayload> {
        match &self.value {
            Value::Array(payload) => Some(payload),
            _ => None,
        }
    }

    fn conversion(&self, target: &'static str) -> PxlError {
        PxlError::AttributeConversion {
            attribute: self.id.name(),
            data_type: self.data_type,
            target,
        }
    }

    fn scalar(&self, target: &'static str) -> Result<Number> {
        match self.value {
            Value::Scalar(n) => Ok(n),
            _ => Err(self.conversion(target)),
        }
    }

    fn shaped(&self, shape: Shape, target: &'static str) -> Result<&ArrayPayload> {
        match &self.value {
            Value::Array(payload) if self.data_type.shape == shape => Ok(payload),
            _ => Err(self.conversion(target)),
        }
    }

    /// Unsigned integer scalar, widened to u32. Negative values fail.
    pub fn as_uint(&self) -> Result<u32> {
        self.scalar("uint")?
            .to_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.conversion("uint"))
    }

    /// Integer scalar, widened to i32. uint32 values above `i32::MAX` fail.
    pub fn as_int(&self) -> Result<i32> {
        self.scalar("int")?
            .to_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| self.conversion("int"))
    }

    pub fn as_real(&self) -> Result<f32> {
        Ok(self.scalar("real")?.to_f32())
    }

    pub fn as_xy_real(&self) -> Result<(f32, f32)> {
        let p = self.shaped(Shape::Xy, "real xy")?;
        match (p.get(0), p.get(1)) {
            (Some(x), Some(y)) => Ok((x.to_f32(), y.to_f32())),
            _ => Err(self.conversion("real xy")),
        }
    }

    pub fn as_xy_int(&self) -> Result<(i32, i32)> {
        let p = self.shaped(Shape::Xy, "int xy")?;
        let x = p.get(0).and_then(number_to_i32);
        let y = p.get(1).and_then(number_to_i32);
        x.zip(y).ok_or_else(|| self.conversion("int xy"))
    }

    pub fn as_box_real(&self) -> Result<[f32; 4]> {
        let p = self.shaped(Shape::Box, "real box")?;
        let mut out = [0.0; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = p.get(i).ok_or_else(|| self.conversion("real box"))?.to_f32();
        }
        Ok(out)
    }

    pub fn as_box_int(&self) -> Result<[i32; 4]> {
        let p = self.shaped(Shape::Box, "int box")?;
        let mut out = [0; 4];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = p
                .get(i)
                .and_then(number_to_i32)
                .ok_or_else(|| self.conversion("int box"))?;
        }
        Ok(out)
    }

    /// Contents of a ubyte array; the slice length is the element count.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match &self.value {
            Value::Array(payload)
                if self.data_type.shape == Shape::Array && payload.kind() == NumericKind::UByte =>
            {
                Ok(payload.as_le_bytes())
            }
            _ => Err(self.conversion("byte array")),
        }
    }

    /// Elements of an unsigned integer array, widened to u32.
    pub fn as_uint_array(&self) -> Result<Vec<u32>> {
        let p = self.shaped(Shape::Array, "uint array")?;
        p.iter()
            .map(|n| n.to_i64().and_then(|v| u32::try_from(v).ok()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.conversion("uint array"))
    }

    /// Elements of any numeric array, converted to f32.
    pub fn as_real_array(&self) -> Result<Vec<f32>> {
        let p = self.shaped(Shape::Array, "real array")?;
        Ok(p.iter().map(Number::to_f32).collect())
    }
}

fn number_to_i32(n: Number) -> Option<i32> {
    n.to_i64().and_then(|v| i32::try_from(v).ok())
}
