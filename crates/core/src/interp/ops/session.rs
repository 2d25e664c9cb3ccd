//! Session, page and job-level operators.
//!
//! Handles: BeginSession, EndSession, BeginPage, EndPage, OpenDataSource,
//! CloseDataSource, Comment, EchoComment, Query, VendorUnique

use super::{attr_text, check_length, opt, req};
use crate::attr::{AttrSpec, MatchMode, match_exact};
use crate::error::{PxlError, Result};
use crate::interp::device::{
    MediaSize, Measure, Orientation, PageInfo, PxlDevice, SessionInfo, lossy,
};
use crate::interp::interpreter::Interpreter;
use crate::interp::operator::Operator;
use crate::model::{AttributeId as A, ProtocolVersion};
use tracing::debug;

const BEGIN_SESSION: &[AttrSpec] = &[
    req(A::MEASURE),
    req(A::UNITS_PER_MEASURE),
    opt(A::ERROR_REPORT),
];

const BEGIN_PAGE: &[AttrSpec] = &[
    opt(A::ORIENTATION),
    opt(A::MEDIA_SIZE),
    opt(A::CUSTOM_MEDIA_SIZE),
    opt(A::CUSTOM_MEDIA_SIZE_UNITS),
    opt(A::MEDIA_SOURCE),
    opt(A::MEDIA_TYPE),
    opt(A::MEDIA_DESTINATION),
    opt(A::SIMPLEX_PAGE_MODE),
    opt(A::DUPLEX_PAGE_MODE),
    opt(A::DUPLEX_PAGE_SIDE),
];

const END_PAGE: &[AttrSpec] = &[opt(A::PAGE_COPIES)];

const OPEN_DATA_SOURCE: &[AttrSpec] = &[req(A::SOURCE_TYPE), req(A::DATA_ORG)];

const COMMENT: &[AttrSpec] = &[opt(A::COMMENT_DATA)];

const QUERY: &[AttrSpec] = &[req(A::QUERY_KEY)];

const VENDOR_UNIQUE: &[AttrSpec] = &[req(A::VU_EXTENSION), opt(A::VU_DATA_LENGTH)];

pub(super) fn schema(op: Operator) -> Option<(MatchMode, &'static [AttrSpec])> {
    use MatchMode::{Empty, Exact};
    use Operator as Op;
    let entry: (MatchMode, &'static [AttrSpec]) = match op {
        Op::BeginSession => (Exact, BEGIN_SESSION),
        Op::BeginPage => (Exact, BEGIN_PAGE),
        Op::EndPage => (Exact, END_PAGE),
        Op::OpenDataSource => (Exact, OPEN_DATA_SOURCE),
        Op::Comment | Op::EchoComment => (Exact, COMMENT),
        Op::Query => (Exact, QUERY),
        Op::VendorUnique => (Exact, VENDOR_UNIQUE),
        Op::EndSession | Op::CloseDataSource => (Empty, &[]),
        _ => return None,
    };
    Some(entry)
}

impl<D: PxlDevice> Interpreter<'_, D> {
    pub(crate) fn do_begin_session(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, BEGIN_SESSION)?;
        let measure = Measure::from_code(matched.require(A::MEASURE)?.as_uint()?)?;
        let units = matched.require(A::UNITS_PER_MEASURE)?.as_xy_real()?;
        if units.0 <= 0.0 || units.1 <= 0.0 {
            return Err(PxlError::IllegalAttributeValue {
                attribute: "UnitsPerMeasure",
                msg: format!("{} x {}", units.0, units.1),
            });
        }
        let error_report = match matched.get(A::ERROR_REPORT) {
            Some(attr) => attr.as_uint()?,
            None => 0,
        };
        self.device.begin_session(&SessionInfo {
            measure,
            units_per_measure: units,
            error_report,
        });
        Ok(())
    }

    /// Resources downloaded during the session go away with it.
    pub(crate) fn do_end_session(&mut self) -> Result<()> {
        crate::attr::match_empty(&self.set)?;
        if !self.streams.is_empty() || !self.fonts.is_empty() {
            debug!(
                streams = self.streams.len(),
                fonts = self.fonts.len(),
                "releasing session resources"
            );
        }
        self.streams.clear();
        self.fonts.clear();
        self.device.end_session();
        Ok(())
    }

    /// Orientation may only be omitted from class 3.0 on.
    pub(crate) fn do_begin_page(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, BEGIN_PAGE)?;

        let orientation = match matched.get(A::ORIENTATION) {
            Some(attr) => Orientation::from_code(attr.as_uint()?)?,
            None if self.version.supports(ProtocolVersion::V3_0) => Orientation::Default,
            None => {
                return Err(PxlError::MissingAttribute {
                    attribute: A::ORIENTATION.name(),
                });
            }
        };

        let media = match (
            matched.get(A::MEDIA_SIZE),
            matched.get(A::CUSTOM_MEDIA_SIZE),
        ) {
            (Some(_), Some(_)) => {
                return Err(PxlError::IllegalAttributeValue {
                    attribute: A::CUSTOM_MEDIA_SIZE.name(),
                    msg: "given together with MediaSize".into(),
                });
            }
            (Some(size), None) => match size.as_bytes() {
                Ok(name) => MediaSize::Named(lossy(name)),
                Err(_) => MediaSize::Code(size.as_uint()?),
            },
            (None, Some(custom)) => MediaSize::Custom {
                size: custom.as_xy_real()?,
                units: matched.require(A::CUSTOM_MEDIA_SIZE_UNITS)?.as_uint()?,
            },
            (None, None) => MediaSize::Default,
        };

        let media_source = matched
            .get(A::MEDIA_SOURCE)
            .map(|attr| attr.as_uint())
            .transpose()?;
        let duplex = matched
            .get(A::DUPLEX_PAGE_MODE)
            .map(|attr| attr.as_uint())
            .transpose()?;

        self.device.begin_page(&PageInfo {
            orientation,
            media,
            media_source,
            duplex,
        });
        Ok(())
    }

    pub(crate) fn do_end_page(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, END_PAGE)?;
        let copies = match matched.get(A::PAGE_COPIES) {
            Some(attr) => attr.as_uint()?,
            None => 1,
        };
        self.pages += 1;
        self.device.end_page(copies);
        Ok(())
    }

    pub(crate) fn do_comment(&mut self) -> Result<()> {
        let matched = match_exact(&self.set, COMMENT)?;
        if let Some(attr) = matched.get(A::COMMENT_DATA) {
            let text = attr_text(attr)?;
            self.device.comment(&text);
        }
        Ok(())
    }

    /// VendorUnique: extension payload passed through to the device.
    ///
    /// VUDataLength announces embedded data of exactly that length.
    pub(crate) fn do_vendor_unique(&mut self, data: Option<&[u8]>) -> Result<()> {
        let matched = match_exact(&self.set, VENDOR_UNIQUE)?;
        match (matched.get(A::VU_DATA_LENGTH), data) {
            (Some(length), Some(data)) => check_length(length.as_uint()?, data)?,
            (Some(_), None) => {
                return Err(PxlError::MissingData {
                    operator: Operator::VendorUnique,
                });
            }
            (None, Some(_)) => {
                return Err(PxlError::UnexpectedData {
                    operator: Operator::VendorUnique,
                });
            }
            (None, None) => {}
        }
        self.device.operator(Operator::VendorUnique, &matched);
        if let Some(data) = data {
            self.device
                .embedded_data(Operator::VendorUnique, &matched, data);
        }
        Ok(())
    }
}
