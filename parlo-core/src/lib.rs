//! # parlo-core
//!
//! Streaming utterance segmentation engine.
//!
//! ## Architecture
//!
//! ```text
//! byte stream → ChunkReader ──► BoundaryScanner
//!                   │                 │
//!                   │            cut offset
//!                   ▼                 │
//!        SpeechDecoder feed ◄─────────┘
//!        (start / feed* / end / hypothesis per utterance)
//!                   │
//!                   ▼
//!        UtteranceSink (one record per recognized utterance)
//! ```
//!
//! The whole pipeline is synchronous and single-threaded: each chunk is
//! fully read, fully scanned, and fully decoded before the next one
//! begins. The decoding backend sits behind the narrow [`SpeechDecoder`]
//! trait; this crate implements everything up to that seam.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod buffering;
pub mod decode;
pub mod error;
pub mod records;
pub mod scan;
pub mod session;

// Convenience re-exports for downstream crates
pub use decode::{DecoderHandle, Hypothesis, SpeechDecoder};
pub use error::{ParloError, Result};
pub use records::{JsonLineSink, UtteranceRecord, UtteranceSink};
pub use session::{Segmenter, SessionConfig, SessionSummary};
