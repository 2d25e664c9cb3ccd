//! Operator sequence state machine.
//!
//! Every operator is checked against the innermost open scope before its
//! handler runs. `Begin…` operators push a capture scope and the matching
//! `End…` pops it; operators foreign to the open scope are rejected. No
//! scope lists its own `Begin…` as legal, so same-kind captures never nest.

use super::operator::Operator;
use crate::error::{PxlError, Result};
use std::fmt;

/// Deepest legal nesting is job > session > page > capture.
pub const MAX_STATE_DEPTH: usize = 8;

/// A nesting context of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    /// Outside any session. The bottom frame; never popped.
    Job,
    Session,
    Page,
    FontHeader,
    Char,
    /// Capturing a named stream.
    Stream,
    Image,
    RastPattern,
    Scan,
    /// Defining a user line cap.
    LineCap,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Job => "job",
            Self::Session => "session",
            Self::Page => "page",
            Self::FontHeader => "font header",
            Self::Char => "char",
            Self::Stream => "stream",
            Self::Image => "image",
            Self::RastPattern => "raster pattern",
            Self::Scan => "scan",
            Self::LineCap => "line cap",
        };
        f.write_str(name)
    }
}

/// Effect of an operator on the state stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    ChangeTo(ParserState),
    Push(ParserState),
    Pop,
    Reject,
}

/// Operators that only build the current path.
const fn is_path_construction(op: Operator) -> bool {
    use Operator::*;
    matches!(
        op,
        NewPath
            | CloseSubPath
            | SetCursor
            | SetCursorRel
            | LinePath
            | LineRelPath
            | BezierPath
            | BezierRelPath
            | ArcPath
            | ChordPath
            | EllipsePath
            | PiePath
            | RectanglePath
            | RoundRectanglePath
    )
}

/// Drawing and graphics-state operators with no scoping effect.
const fn is_page_marking(op: Operator) -> bool {
    use Operator::*;
    is_path_construction(op)
        || matches!(
            op,
            PopGS
                | PushGS
                | SetClipReplace
                | SetBrushSource
                | SetCharAngle
                | SetCharScale
                | SetCharShear
                | SetClipIntersect
                | SetClipRectangle
                | SetClipToPage
                | SetColorSpace
                | SetHalftoneMethod
                | SetFillMode
                | SetFont
                | SetLineDash
                | SetLineCap
                | SetLineJoin
                | SetMiterLimit
                | SetPageDefaultCTM
                | SetPageOrigin
                | SetPageRotation
                | SetPageScale
                | SetPaintTxMode
                | SetPenSource
                | SetPenWidth
                | SetROP
                | SetSourceTxMode
                | SetCharBoldValue
                | SetClipMode
                | SetPathToClip
                | SetCharSubMode
                | SetCharAttributes
                | SetColorTreatment
                | SetAdaptiveHalftoning
                | PaintPath
                | Chord
                | Ellipse
                | Pie
                | Rectangle
                | RoundRectangle
                | Text
                | TextPath
        )
}

/// The legal-operator matrix.
pub fn transition(state: ParserState, op: Operator) -> Transition {
    use Operator as Op;
    use ParserState as S;
    use Transition::*;

    match (state, op) {
        (_, Op::Comment) => NoChange,

        (S::Job, Op::BeginSession) => Push(S::Session),
        (S::Session, Op::EndSession) => Pop,
        (S::Session, Op::BeginPage) => Push(S::Page),
        (S::Page, Op::EndPage) => Pop,

        (S::Session, Op::OpenDataSource | Op::CloseDataSource) => ChangeTo(S::Session),
        (
            S::Session | S::Page,
            Op::EchoComment
            | Op::Query
            | Op::VendorUnique
            | Op::SetDefaultGS
            | Op::RemoveFont
            | Op::RemoveStream,
        ) => ChangeTo(state),

        (S::Session | S::Page, Op::BeginFontHeader) => Push(S::FontHeader),
        (S::FontHeader, Op::ReadFontHeader) => NoChange,
        (S::FontHeader, Op::EndFontHeader) => Pop,

        (S::Session | S::Page, Op::BeginChar) => Push(S::Char),
        (S::Char, Op::ReadChar) => NoChange,
        (S::Char, Op::EndChar) => Pop,

        (S::Session | S::Page, Op::BeginStream) => Push(S::Stream),
        (S::Stream, Op::ReadStream) => NoChange,
        (S::Stream, Op::EndStream) => Pop,
        (S::Page, Op::ExecStream) => ChangeTo(S::Page),

        (S::Page, Op::BeginImage) => Push(S::Image),
        (S::Image, Op::ReadImage) => NoChange,
        (S::Image, Op::EndImage) => Pop,

        (S::Session | S::Page, Op::BeginRastPattern) => Push(S::RastPattern),
        (S::RastPattern, Op::ReadRastPattern) => NoChange,
        (S::RastPattern, Op::EndRastPattern) => Pop,

        (S::Page, Op::BeginScan) => Push(S::Scan),
        (S::Scan, Op::ScanLineRel) => NoChange,
        (S::Scan, Op::EndScan) => Pop,

        (S::Page, Op::BeginUserDefinedLineCap) => Push(S::LineCap),
        (S::LineCap, Op::EndUserDefinedLineCap) => Pop,
        (S::LineCap, op) if is_path_construction(op) => ChangeTo(S::LineCap),

        (S::Page, op) if is_page_marking(op) => ChangeTo(S::Page),

        _ => Reject,
    }
}

/// Bounded stack of open scopes; the top is the current state.
#[derive(Debug, Clone)]
pub struct StateStack {
    frames: [ParserState; MAX_STATE_DEPTH],
    depth: usize,
}

impl StateStack {
    pub const fn new() -> Self {
        Self {
            frames: [ParserState::Job; MAX_STATE_DEPTH],
            depth: 1,
        }
    }

    pub const fn current(&self) -> ParserState {
        self.frames[self.depth - 1]
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Open scopes, outermost first.
    pub fn frames(&self) -> &[ParserState] {
        &self.frames[..self.depth]
    }

    /// Check `op` against the current state and apply its transition.
    ///
    /// On rejection the stack is left untouched.
    ///
    /// # Panics
    /// On overflow past [`MAX_STATE_DEPTH`] or when popping the outermost
    /// frame; the transition table makes both unreachable.
    pub fn apply(&mut self, op: Operator) -> Result<Transition> {
        let state = self.current();
        let t = transition(state, op);
        match t {
            Transition::Reject => {
                return Err(PxlError::IllegalOperatorSequence {
                    operator: op,
                    state,
                });
            }
            Transition::NoChange => {}
            Transition::ChangeTo(next) => self.frames[self.depth - 1] = next,
            Transition::Push(next) => {
                assert!(self.depth < MAX_STATE_DEPTH, "parser state stack overflow");
                self.frames[self.depth] = next;
                self.depth += 1;
            }
            Transition::Pop => {
                assert!(self.depth > 1, "parser state stack underflow");
                self.depth -= 1;
            }
        }
        Ok(t)
    }

    /// Back to the outermost state.
    pub fn reset(&mut self) {
        self.depth = 1;
        self.frames[0] = ParserState::Job;
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_frame_is_never_popped() {
        for &op in Operator::ALL {
            assert_ne!(transition(ParserState::Job, op), Transition::Pop, "{op}");
        }
    }

    #[test]
    fn test_captures_do_not_nest() {
        let captures = [
            (ParserState::FontHeader, Operator::BeginFontHeader),
            (ParserState::Char, Operator::BeginChar),
            (ParserState::Stream, Operator::BeginStream),
            (ParserState::Image, Operator::BeginImage),
            (ParserState::RastPattern, Operator::BeginRastPattern),
            (ParserState::Scan, Operator::BeginScan),
            (ParserState::LineCap, Operator::BeginUserDefinedLineCap),
            (ParserState::Session, Operator::BeginSession),
            (ParserState::Page, Operator::BeginPage),
        ];
        for (state, begin) in captures {
            assert_eq!(transition(state, begin), Transition::Reject, "{begin}");
        }
    }

    #[test]
    fn test_comment_is_legal_everywhere() {
        let mut stack = StateStack::new();
        for op in [
            Operator::BeginSession,
            Operator::BeginPage,
            Operator::BeginImage,
        ] {
            stack.apply(op).unwrap();
            assert_eq!(stack.apply(Operator::Comment).unwrap(), Transition::NoChange);
        }
        assert_eq!(stack.depth(), 4);
    }
}
