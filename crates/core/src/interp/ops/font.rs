//! Font download operators.
//!
//! Handles: BeginFontHeader, ReadFontHeader, EndFontHeader, BeginChar,
//! ReadChar, EndChar, RemoveFont
//!
//! A font header arrives in one or more ReadFontHeader blocks and is handed
//! to the device whole at EndFontHeader. Glyphs may only be downloaded for
//! fonts whose header is complete.

use super::{attr_text, check_length, req};
use crate::attr::{AttrSpec, match_empty, match_exact};
use crate::error::{PxlError, Result};
use crate::interp::device::{PxlDevice, lossy};
use crate::interp::interpreter::{FontCapture, Interpreter};
use crate::interp::operator::Operator;
use crate::model::AttributeId as A;
use tracing::debug;

const BEGIN_FONT_HEADER: &[AttrSpec] = &[req(A::FONT_NAME), req(A::FONT_FORMAT)];

const READ_FONT_HEADER: &[AttrSpec] = &[req(A::FONT_HEADER_LENGTH)];

const FONT_NAME: &[AttrSpec] = &[req(A::FONT_NAME)];

const READ_CHAR: &[AttrSpec] = &[req(A::CHAR_CODE), req(A::CHAR_DATA_SIZE)];

impl<D: PxlDevice> Interpreter<'_, D> {
    pub(crate) fn do_begin_font_header(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, BEGIN_FONT_HEADER)?;
        let name = attr_text(matched.require(A::FONT_NAME)?)?;
        let format = matched.require(A::FONT_FORMAT)?.as_uint()?;
        if format != 0 {
            return Err(PxlError::IllegalAttributeValue {
                attribute: A::FONT_FORMAT.name(),
                msg: format!("unknown font format {format}"),
            });
        }
        self.font_capture = Some(FontCapture {
            name,
            format,
            header: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn do_read_font_header(&mut self, data: &[u8]) -> Result<()> {
        let matched = match_exact(&self.set, READ_FONT_HEADER)?;
        check_length(matched.require(A::FONT_HEADER_LENGTH)?.as_uint()?, data)?;
        if let Some(capture) = self.font_capture.as_mut() {
            capture.header.extend_from_slice(data);
        }
        Ok(())
    }

    pub(crate) fn do_end_font_header(&mut self) -> Result<()> {
        match_empty(&self.set)?;
        let Some(capture) = self.font_capture.take() else {
            return Ok(());
        };
        if capture.header.is_empty() {
            return Err(PxlError::MissingData {
                operator: Operator::ReadFontHeader,
            });
        }
        debug!(
            font = %lossy(&capture.name),
            header = capture.header.len(),
            "font defined"
        );
        self.device
            .define_font(&capture.name, capture.format, &capture.header);
        self.fonts.insert(capture.name);
        Ok(())
    }

    pub(crate) fn do_begin_char(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, FONT_NAME)?;
        let name = attr_text(matched.require(A::FONT_NAME)?)?;
        if !self.fonts.contains(&name) {
            return Err(PxlError::FontUndefined(lossy(&name).to_string()));
        }
        self.char_font = Some(name);
        Ok(())
    }

    pub(crate) fn do_read_char(&mut self, data: &[u8]) -> Result<()> {
        let matched = match_exact(&self.set, READ_CHAR)?;
        let code = matched.require(A::CHAR_CODE)?.as_uint()?;
        check_length(matched.require(A::CHAR_DATA_SIZE)?.as_uint()?, data)?;
        if let Some(font) = &self.char_font {
            self.device.define_glyph(font, code, data);
        }
        Ok(())
    }

    pub(crate) fn do_end_char(&mut self) -> Result<()> {
        match_empty(&self.set)?;
        self.char_font = None;
        Ok(())
    }

    pub(crate) fn do_remove_font(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, FONT_NAME)?;
        let name = attr_text(matched.require(A::FONT_NAME)?)?;
        if !self.fonts.remove(&name) {
            return Err(PxlError::FontUndefined(lossy(&name).to_string()));
        }
        self.device.remove_font(&name);
        Ok(())
    }
}
