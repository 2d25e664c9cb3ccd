//! Operator validation, dispatch and device output.
//!
//! This module contains:
//! - `operator`: Operator tags, protocol levels and data use
//! - `sequence`: The operator sequence state machine
//! - `interpreter`: The dispatch loop
//! - `device`: Output device trait and implementations
//! - `ops`: Operator handlers by category

pub mod device;
pub mod interpreter;
pub mod operator;
pub mod ops;
pub mod sequence;

// Re-export main types for convenience
pub use device::{
    Event, MediaSize, Measure, NullDevice, Orientation, PageInfo, PxlDevice, RecordingDevice,
    SessionInfo,
};
pub use interpreter::Interpreter;
pub use operator::{DataUse, Operator, TagClass, classify_tag};
pub use sequence::{MAX_STATE_DEPTH, ParserState, StateStack, Transition, transition};
