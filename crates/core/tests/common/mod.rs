//! Little-endian PCL XL stream builder for tests.
#![allow(dead_code)]

use pxl_core::interp::Operator;
use pxl_core::model::AttributeId;

pub struct Job {
    buf: Vec<u8>,
}

impl Job {
    /// A stream starting with a little-endian header at `class.revision`.
    pub fn new(class: u8, revision: u8) -> Self {
        let header = format!(") HP-PCL XL;{class};{revision};test\n");
        Self {
            buf: header.into_bytes(),
        }
    }

    /// Operators only, no header.
    pub fn body() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn attr(mut self, id: AttributeId) -> Self {
        if id.0 <= 0xFF {
            self.buf.extend_from_slice(&[0xF8, id.0 as u8]);
        } else {
            self.buf.push(0xF9);
            self.buf.extend_from_slice(&id.0.to_le_bytes());
        }
        self
    }

    pub fn ubyte(mut self, id: AttributeId, v: u8) -> Self {
        self.buf.extend_from_slice(&[0xC0, v]);
        self.attr(id)
    }

    pub fn uint16(mut self, id: AttributeId, v: u16) -> Self {
        self.buf.push(0xC1);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self.attr(id)
    }

    pub fn uint32(mut self, id: AttributeId, v: u32) -> Self {
        self.buf.push(0xC2);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self.attr(id)
    }

    pub fn real32(mut self, id: AttributeId, v: f32) -> Self {
        self.buf.push(0xC5);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self.attr(id)
    }

    pub fn uint16_xy(mut self, id: AttributeId, x: u16, y: u16) -> Self {
        self.buf.push(0xD1);
        self.buf.extend_from_slice(&x.to_le_bytes());
        self.buf.extend_from_slice(&y.to_le_bytes());
        self.attr(id)
    }

    pub fn uint16_box(mut self, id: AttributeId, b: [u16; 4]) -> Self {
        self.buf.push(0xE1);
        for v in b {
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
        self.attr(id)
    }

    pub fn ubyte_array(mut self, id: AttributeId, bytes: &[u8]) -> Self {
        self.buf.push(0xC8);
        if bytes.len() <= 0xFF {
            self.buf.extend_from_slice(&[0xC0, bytes.len() as u8]);
        } else {
            self.buf.push(0xC1);
            self.buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        }
        self.buf.extend_from_slice(bytes);
        self.attr(id)
    }

    pub fn op(mut self, op: Operator) -> Self {
        self.buf.push(op.tag());
        self
    }

    /// Embedded data block for the preceding operator.
    pub fn data(mut self, bytes: &[u8]) -> Self {
        if bytes.len() <= 0xFF {
            self.buf.extend_from_slice(&[0xFB, bytes.len() as u8]);
        } else {
            self.buf.push(0xFA);
            self.buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        }
        self.buf.extend_from_slice(bytes);
        self
    }

    /// BeginSession at 600 units per inch.
    pub fn begin_session(self) -> Self {
        self.ubyte(AttributeId::MEASURE, 0)
            .uint16_xy(AttributeId::UNITS_PER_MEASURE, 600, 600)
            .op(Operator::BeginSession)
    }

    /// Portrait letter page.
    pub fn begin_page(self) -> Self {
        self.ubyte(AttributeId::ORIENTATION, 0)
            .ubyte_array(AttributeId::MEDIA_SIZE, b"LETTER")
            .op(Operator::BeginPage)
    }

    pub fn end_page(self) -> Self {
        self.op(Operator::EndPage)
    }

    pub fn end_session(self) -> Self {
        self.op(Operator::EndSession)
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
