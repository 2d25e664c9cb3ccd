//! Device boundary for validated operators.
//!
//! The interpreter validates structure and attributes, then hands each
//! operator to a [`PxlDevice`]. Session, page and resource operators get
//! dedicated callbacks; everything else arrives through
//! [`PxlDevice::operator`] with its matched attributes. All methods default
//! to no-ops so a device only implements what it consumes.

use super::operator::Operator;
use crate::attr::Matched;
use crate::error::{PxlError, Result};
use smol_str::SmolStr;
use std::fmt;

/// Unit of the session's user coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Inch,
    Millimeter,
    TenthsOfMillimeter,
}

impl Measure {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Inch),
            1 => Ok(Self::Millimeter),
            2 => Ok(Self::TenthsOfMillimeter),
            _ => Err(PxlError::IllegalAttributeValue {
                attribute: "Measure",
                msg: format!("unknown measure {code}"),
            }),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Inch => "inch",
            Self::Millimeter => "mm",
            Self::TenthsOfMillimeter => "0.1mm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    pub measure: Measure,
    pub units_per_measure: (f32, f32),
    /// Requested error reporting mode; 0 means none.
    pub error_report: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
    Default,
}

impl Orientation {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Portrait),
            1 => Ok(Self::Landscape),
            2 => Ok(Self::ReversePortrait),
            3 => Ok(Self::ReverseLandscape),
            4 => Ok(Self::Default),
            _ => Err(PxlError::IllegalAttributeValue {
                attribute: "Orientation",
                msg: format!("unknown orientation {code}"),
            }),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
            Self::ReversePortrait => "reverse-portrait",
            Self::ReverseLandscape => "reverse-landscape",
            Self::Default => "default",
        }
    }
}

/// Media selection of a page.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSize {
    /// Enumerated media size code.
    Code(u32),
    /// Media size given by name, e.g. `LETTER`.
    Named(SmolStr),
    /// Explicit dimensions in the given unit code.
    Custom { size: (f32, f32), units: u32 },
    /// No size given; the device picks.
    Default,
}

impl fmt::Display for MediaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "#{code}"),
            Self::Named(name) => f.write_str(name),
            Self::Custom { size, units } => write!(f, "{}x{} units {units}", size.0, size.1),
            Self::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub orientation: Orientation,
    pub media: MediaSize,
    pub media_source: Option<u32>,
    pub duplex: Option<u32>,
}

/// Receiver of validated operators.
///
/// Byte strings (font names, comments) are passed raw; the protocol does
/// not fix their encoding.
pub trait PxlDevice {
    fn begin_session(&mut self, _session: &SessionInfo) {}

    fn end_session(&mut self) {}

    fn begin_page(&mut self, _page: &PageInfo) {}

    fn end_page(&mut self, _copies: u32) {}

    fn comment(&mut self, _text: &[u8]) {}

    /// A complete downloaded font header.
    fn define_font(&mut self, _name: &[u8], _format: u32, _header: &[u8]) {}

    /// One downloaded glyph of a defined font.
    fn define_glyph(&mut self, _font: &[u8], _code: u32, _data: &[u8]) {}

    fn remove_font(&mut self, _name: &[u8]) {}

    /// Any operator without a dedicated callback.
    fn operator(&mut self, _op: Operator, _attrs: &Matched<'_>) {}

    /// Embedded data following an operator, after `operator` for the same op.
    fn embedded_data(&mut self, _op: Operator, _attrs: &Matched<'_>, _data: &[u8]) {}
}

/// Device that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDevice;

impl PxlDevice for NullDevice {}

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    BeginSession {
        measure: Measure,
        units: (f32, f32),
    },
    EndSession,
    BeginPage {
        orientation: Orientation,
        media: MediaSize,
    },
    EndPage {
        copies: u32,
    },
    Comment(SmolStr),
    DefineFont {
        name: SmolStr,
        format: u32,
        header_len: usize,
    },
    DefineGlyph {
        font: SmolStr,
        code: u32,
        len: usize,
    },
    RemoveFont(SmolStr),
    Operator {
        op: Operator,
        attributes: Vec<&'static str>,
    },
    Data {
        op: Operator,
        len: usize,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeginSession { measure, units } => {
                write!(f, "session {}x{} per {}", units.0, units.1, measure.name())
            }
            Self::EndSession => f.write_str("end session"),
            Self::BeginPage { orientation, media } => {
                write!(f, "page {} {media}", orientation.name())
            }
            Self::EndPage { copies } => write!(f, "end page x{copies}"),
            Self::Comment(text) => write!(f, "comment {text:?}"),
            Self::DefineFont {
                name,
                format,
                header_len,
            } => write!(f, "font {name:?} format {format} header {header_len}"),
            Self::DefineGlyph { font, code, len } => {
                write!(f, "glyph {font:?} code {code} len {len}")
            }
            Self::RemoveFont(name) => write!(f, "remove font {name:?}"),
            Self::Operator { op, attributes } => {
                write!(f, "{op}")?;
                for name in attributes {
                    write!(f, " {name}")?;
                }
                Ok(())
            }
            Self::Data { op, len } => write!(f, "{op} data {len}"),
        }
    }
}

pub(crate) fn lossy(bytes: &[u8]) -> SmolStr {
    SmolStr::new(String::from_utf8_lossy(bytes))
}

/// Device that records every call as an [`Event`].
#[derive(Debug, Default, Clone)]
pub struct RecordingDevice {
    events: Vec<Event>,
    pages: usize,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of completed pages.
    pub const fn pages(&self) -> usize {
        self.pages
    }

    /// The event log, one event per line.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&event.to_string());
            out.push('\n');
        }
        out
    }
}

impl PxlDevice for RecordingDevice {
    fn begin_session(&mut self, session: &SessionInfo) {
        self.events.push(Event::BeginSession {
            measure: session.measure,
            units: session.units_per_measure,
        });
    }

    fn end_session(&mut self) {
        self.events.push(Event::EndSession);
    }

    fn begin_page(&mut self, page: &PageInfo) {
        self.events.push(Event::BeginPage {
            orientation: page.orientation,
            media: page.media.clone(),
        });
    }

    fn end_page(&mut self, copies: u32) {
        self.pages += 1;
        self.events.push(Event::EndPage { copies });
    }

    fn comment(&mut self, text: &[u8]) {
        self.events.push(Event::Comment(lossy(text)));
    }

    fn define_font(&mut self, name: &[u8], format: u32, header: &[u8]) {
        self.events.push(Event::DefineFont {
            name: lossy(name),
            format,
            header_len: header.len(),
        });
    }

    fn define_glyph(&mut self, font: &[u8], code: u32, data: &[u8]) {
        self.events.push(Event::DefineGlyph {
            font: lossy(font),
            code,
            len: data.len(),
        });
    }

    fn remove_font(&mut self, name: &[u8]) {
        self.events.push(Event::RemoveFont(lossy(name)));
    }

    fn operator(&mut self, op: Operator, attrs: &Matched<'_>) {
        self.events.push(Event::Operator {
            op,
            attributes: attrs.iter().map(|attr| attr.id.name()).collect(),
        });
    }

    fn embedded_data(&mut self, op: Operator, _attrs: &Matched<'_>, data: &[u8]) {
        self.events.push(Event::Data {
            op,
            len: data.len(),
        });
    }
}
