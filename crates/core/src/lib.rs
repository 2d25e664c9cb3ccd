//! pxl-core - Validation and dispatch core for PCL XL print streams.
//!
//! A job is scanned into per-operator attribute sets, each operator is
//! checked against the declared protocol level and the operator sequence
//! state machine, its attributes are matched against the operator's schema
//! and the result is handed to a [`PxlDevice`](interp::PxlDevice).
//!
//! ```no_run
//! use pxl_core::interp::{Interpreter, RecordingDevice};
//!
//! let job = std::fs::read("job.pxl").unwrap();
//! let mut device = RecordingDevice::new();
//! Interpreter::new(&mut device).run(&job).unwrap();
//! print!("{}", device.transcript());
//! ```

pub mod attr;
pub mod config;
pub mod error;
pub mod interp;
pub mod model;
pub mod parser;

pub use config::InterpreterOptions;
pub use error::{ErrorKind, PxlError, Result};
