//! The operator dispatch loop.
//!
//! [`Interpreter`] pulls operators from a [`Scanner`], checks each one
//! against the declared protocol level and the sequence state machine, runs
//! its handler on the collected attribute set and empties the set for the
//! next operator. The first error aborts the job.

use super::device::PxlDevice;
use super::operator::{DataUse, Operator, TagClass, classify_tag};
use super::sequence::{ParserState, StateStack, Transition, transition};
use crate::attr::AttributeSet;
use crate::config::InterpreterOptions;
use crate::error::{PxlError, Result};
use crate::model::ProtocolVersion;
use crate::parser::scanner::{Binding, Scanner};
use bytes::{Bytes, BytesMut};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// A font header being downloaded.
#[derive(Debug)]
pub(crate) struct FontCapture {
    pub(crate) name: Vec<u8>,
    pub(crate) format: u32,
    pub(crate) header: Vec<u8>,
}

/// A named stream being captured.
#[derive(Debug)]
pub(crate) struct StreamCapture {
    pub(crate) name: Vec<u8>,
    pub(crate) body: BytesMut,
}

/// Interpreter for one PCL XL job.
pub struct Interpreter<'a, D: PxlDevice> {
    pub(crate) device: &'a mut D,
    pub(crate) options: InterpreterOptions,
    pub(crate) set: AttributeSet,
    pub(crate) states: StateStack,
    /// Protocol level of the stream currently being scanned.
    pub(crate) version: ProtocolVersion,
    /// Keep attributes across operators instead of emptying the set.
    capture_attributes: bool,
    pub(crate) font_capture: Option<FontCapture>,
    /// Font of the open BeginChar scope.
    pub(crate) char_font: Option<Vec<u8>>,
    pub(crate) stream_capture: Option<StreamCapture>,
    pub(crate) streams: FxHashMap<Vec<u8>, Bytes>,
    pub(crate) fonts: FxHashSet<Vec<u8>>,
    /// Current ExecStream recursion depth.
    pub(crate) stream_depth: usize,
    /// State depth at the innermost ExecStream; a stored stream may not
    /// pop the frames below it.
    exec_floor: usize,
    operators: usize,
    pub(crate) pages: usize,
}

impl<'a, D: PxlDevice> Interpreter<'a, D> {
    pub fn new(device: &'a mut D) -> Self {
        Self::with_options(device, InterpreterOptions::default())
    }

    pub fn with_options(device: &'a mut D, options: InterpreterOptions) -> Self {
        let version = options.default_version;
        Self {
            device,
            options,
            set: AttributeSet::new(),
            states: StateStack::new(),
            version,
            capture_attributes: false,
            font_capture: None,
            char_font: None,
            stream_capture: None,
            streams: FxHashMap::default(),
            fonts: FxHashSet::default(),
            stream_depth: 0,
            exec_floor: 0,
            operators: 0,
            pages: 0,
        }
    }

    pub const fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Override the protocol level, e.g. when feeding operators by hand.
    pub fn set_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }

    pub const fn state(&self) -> ParserState {
        self.states.current()
    }

    pub const fn state_depth(&self) -> usize {
        self.states.depth()
    }

    /// Operators dispatched so far, including those inside executed streams.
    pub const fn operator_count(&self) -> usize {
        self.operators
    }

    pub const fn page_count(&self) -> usize {
        self.pages
    }

    pub const fn attributes(&self) -> &AttributeSet {
        &self.set
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.set
    }

    /// Defer emptying the attribute set after each operator.
    ///
    /// Used while caching a pass-through sequence that needs the raw
    /// attributes as well. Turning capture off empties the set.
    pub fn set_attribute_capture(&mut self, on: bool) {
        self.capture_attributes = on;
        if !on {
            self.set.empty();
        }
    }

    /// Drop all job state: open scopes, captures and stored resources.
    pub fn reset(&mut self) {
        self.set.empty();
        self.states.reset();
        self.font_capture = None;
        self.char_font = None;
        self.stream_capture = None;
        self.streams.clear();
        self.fonts.clear();
        self.stream_depth = 0;
        self.exec_floor = 0;
    }

    /// Fail when the job left a session or page open.
    ///
    /// `run` only warns about open scopes, so that a job can be fed in
    /// several pieces; call this once the last piece is in.
    pub fn check_complete(&self) -> Result<()> {
        if self.states.depth() > 1 {
            return Err(PxlError::UnclosedScope {
                state: self.states.current(),
            });
        }
        Ok(())
    }

    /// Run a complete job: optional PJL preamble, stream header, operators.
    pub fn run(&mut self, data: &[u8]) -> Result<()> {
        let mut scanner = Scanner::new(data, &self.options);
        let result = self.run_stream(&mut scanner);
        self.finish_job(result)
    }

    /// Run operators from a body without a stream header, at the
    /// configured default protocol level.
    pub fn run_body(&mut self, data: &[u8], binding: Binding) -> Result<()> {
        self.version = self.options.default_version;
        let mut scanner = Scanner::new(data, &self.options).with_binding(binding);
        let result = self.run_scanner(&mut scanner);
        self.finish_job(result)
    }

    fn run_stream(&mut self, scanner: &mut Scanner<'_>) -> Result<()> {
        scanner.locate_stream()?;
        let header = scanner.read_header()?;
        self.version = header.version;
        debug!(version = %header.version, binding = ?header.binding, "stream header");
        self.run_scanner(scanner)
    }

    fn finish_job(&mut self, result: Result<()>) -> Result<()> {
        match &result {
            Err(err) => warn!(
                error = %err,
                state = %self.states.current(),
                operators = self.operators,
                "job aborted"
            ),
            Ok(()) if self.states.depth() > 1 => warn!(
                state = %self.states.current(),
                "stream ended with open scopes"
            ),
            Ok(()) => {}
        }
        self.set.empty();
        result
    }

    pub(crate) fn run_scanner(&mut self, scanner: &mut Scanner<'_>) -> Result<()> {
        loop {
            let scanned = match scanner.next_operator(&mut self.set) {
                Ok(Some(scanned)) => scanned,
                Ok(None) => return Ok(()),
                Err(err) => {
                    self.set.empty();
                    return Err(err);
                }
            };
            self.handle_operator(scanned.tag, scanned.data)?;
        }
    }

    /// Validate and run one operator on the current attribute set.
    ///
    /// The set is emptied afterwards whether or not the operator succeeded,
    /// unless attribute capture is on.
    pub fn handle_operator(&mut self, tag: u8, data: Option<&[u8]>) -> Result<()> {
        let result = self.dispatch(tag, data);
        if !self.capture_attributes {
            self.set.empty();
        }
        result
    }

    fn dispatch(&mut self, tag: u8, data: Option<&[u8]>) -> Result<()> {
        let op = match classify_tag(tag) {
            TagClass::Operator(op) => op,
            TagClass::Unassigned | TagClass::Reserved | TagClass::OutOfRange => {
                return Err(PxlError::IllegalOperatorTag {
                    tag,
                    declared: self.version,
                    required: None,
                });
            }
        };
        if !self.version.supports(op.min_version()) {
            return Err(PxlError::IllegalOperatorTag {
                tag,
                declared: self.version,
                required: Some(op.min_version()),
            });
        }

        let state = self.states.current();
        if self.stream_depth > 0
            && self.states.depth() <= self.exec_floor
            && transition(state, op) == Transition::Pop
        {
            return Err(PxlError::IllegalOperatorSequence {
                operator: op,
                state,
            });
        }
        self.states.apply(op)?;
        self.operators += 1;

        match (op.data_use(), data) {
            (DataUse::Required, None) => return Err(PxlError::MissingData { operator: op }),
            (DataUse::None, Some(_)) => return Err(PxlError::UnexpectedData { operator: op }),
            _ => {}
        }

        debug!(
            operator = %op,
            attributes = self.set.len(),
            state = %state,
            data = data.map_or(0, <[u8]>::len),
            "dispatch"
        );
        self.dispatch_operator(op, data)
    }

    /// Run the handler for `op`. Presence of embedded data has already
    /// been checked against the operator's [`DataUse`].
    fn dispatch_operator(&mut self, op: Operator, data: Option<&[u8]>) -> Result<()> {
        use Operator as Op;
        let block = data.unwrap_or_default();
        match op {
            // Session and page structure
            Op::BeginSession => self.do_begin_session(),
            Op::EndSession => self.do_end_session(),
            Op::BeginPage => self.do_begin_page(),
            Op::EndPage => self.do_end_page(),
            Op::Comment => self.do_comment(),
            Op::VendorUnique => self.do_vendor_unique(data),

            // Font download
            Op::BeginFontHeader => self.do_begin_font_header(),
            Op::ReadFontHeader => self.do_read_font_header(block),
            Op::EndFontHeader => self.do_end_font_header(),
            Op::BeginChar => self.do_begin_char(),
            Op::ReadChar => self.do_read_char(block),
            Op::EndChar => self.do_end_char(),
            Op::RemoveFont => self.do_remove_font(),

            // Named streams
            Op::BeginStream => self.do_begin_stream(),
            Op::ReadStream => self.do_read_stream(block),
            Op::EndStream => self.do_end_stream(),
            Op::ExecStream => self.do_exec_stream(),
            Op::RemoveStream => self.do_remove_stream(),

            // Raster data
            Op::ReadImage | Op::ReadRastPattern => self.do_read_raster(op, block),
            Op::BeginImage | Op::BeginRastPattern => self.do_begin_raster(op),

            // Point lists
            Op::LinePath | Op::LineRelPath | Op::BezierPath | Op::BezierRelPath => {
                self.do_point_path(op, data)
            }

            _ => self.do_forward(op, data),
        }
    }

    /// Run a stored stream through this interpreter.
    ///
    /// The stream carries its own header. Scopes opened inside it must be
    /// closed by its end, and it may not close the scopes it was called from.
    pub(crate) fn exec_stream(&mut self, body: Bytes) -> Result<()> {
        if self.stream_depth >= self.options.max_stream_nesting {
            return Err(PxlError::StreamNestingTooDeep(
                self.options.max_stream_nesting,
            ));
        }
        let mut scanner = Scanner::new(&body, &self.options);
        let header = scanner.read_header()?;

        let outer_version = self.version;
        let outer_floor = self.exec_floor;
        let frames = self.states.clone();
        self.version = header.version;
        self.exec_floor = frames.depth();
        self.stream_depth += 1;
        let result = self.run_scanner(&mut scanner);
        self.stream_depth -= 1;
        self.exec_floor = outer_floor;
        self.version = outer_version;
        result?;

        if self.states.frames() != frames.frames() {
            return Err(PxlError::IllegalOperatorSequence {
                operator: Operator::ExecStream,
                state: self.states.current(),
            });
        }
        Ok(())
    }
}
