//! Fixed-capacity sample buffering and carry-over stitching.
//!
//! The `ChunkReader` owns the one sample buffer in the system and is
//! its only writer; the boundary scanner only reads it. Samples cut off
//! the end of one chunk are flushed to the decoder at the start of the
//! next cycle rather than copied into the new read.

pub mod reader;

pub use reader::{ChunkReader, ChunkStatus};

/// Width of one stored sample on the wire (16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;
