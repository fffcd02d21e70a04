//! GlyphPad library
//!
//! This library provides the modules behind a handwritten math symbol
//! collector: capturing pointer gestures as timestamped strokes, normalizing
//! them into a fixed frame, packaging them into a versioned dataset format,
//! and classifying them against an external backend. It includes:
//!
//! - `stroke`: Timestamped points and the stroke/stroke-set aliases
//! - `geometry`: Bounding boxes and frame normalization
//! - `capture`: The pointer-gesture capture state machine
//! - `sample`: Labeled, normalized training samples
//! - `dataset`: The versioned JSON container, export and load
//! - `classify`: HTTP client for the classification backend
//! - `inspector`: Paging and deletion marks over stored samples
//! - `typeset`: Seam to an external typesetting engine
//! - `gui`: The egui desktop application
//!
//! # Example
//!
//! ```rust,ignore
//! use glyphpad::capture::CaptureSession;
//! use glyphpad::{dataset, geometry, sample::Sample};
//!
//! // Capture a gesture
//! let mut session = CaptureSession::new();
//! session.pointer_down(10, 10, 0);
//! session.pointer_move(120, 140, 35);
//! session.pointer_up();
//!
//! // Normalize it into a 300x300 frame and wrap it into a dataset
//! let strokes = geometry::normalize(300, 300, 0.1, session.strokes());
//! let sample = Sample::build(0, "\\sum", "U+2211", 300, 300, strokes);
//! let json = dataset::to_json(&dataset::serialize(&[sample], 0.1))?;
//! ```

pub mod capture;
pub mod classify;
pub mod dataset;
pub mod geometry;
pub mod gui;
pub mod inspector;
pub mod sample;
pub mod stroke;
pub mod typeset;

pub use capture::CaptureSession;
pub use classify::{Classification, ClassifyClient, ClassifyError, StrokePreprocessing};
pub use dataset::{Dataset, DatasetError};
pub use sample::Sample;
pub use stroke::{Point, Stroke, StrokeSet};
