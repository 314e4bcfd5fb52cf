//! Chunk reading with carry-over stitching.
//!
//! ## Cycle
//!
//! ```text
//! next_chunk():
//!   1. If the previous read filled the buffer and the cut fell short of
//!      the fill, feed the leftover tail [cut, filled) to the decoder —
//!      those samples open the *current* utterance.
//!   2. Overwrite the buffer with up to `capacity` new samples.
//!   3. Report the fill length; a short fill marks the final chunk.
//! emit_segment(cut):
//!   Feed [0, cut) to the decoder and remember the cut so the next
//!   cycle can flush the tail.
//! ```
//!
//! The `processed` counter advances exactly as samples are handed to the
//! decoder (carry flush + emitted segment). It is the single source of
//! truth for utterance start times.

use std::io::{self, Read};

use tracing::debug;

use crate::buffering::BYTES_PER_SAMPLE;
use crate::decode::SpeechDecoder;
use crate::error::{ParloError, Result};

/// Outcome of one `next_chunk` call.
#[derive(Debug, Clone, Copy)]
pub struct ChunkStatus {
    /// Samples actually read into the buffer.
    pub filled: usize,
    /// True when the read came up short — end of stream.
    pub is_final: bool,
    /// Carry-over samples flushed to the decoder before the read.
    pub carry_flushed: usize,
    /// Stream position in seconds when this cycle began, before the
    /// carry flush. Carried samples count toward the new utterance.
    pub start_secs: f64,
}

/// Owns the fixed-capacity sample buffer and the read/carry bookkeeping.
pub struct ChunkReader {
    /// The one sample buffer; length is always `capacity`.
    buf: Vec<i16>,
    /// Raw-byte staging area for the wire format.
    scratch: Vec<u8>,
    /// Valid prefix of `buf` after the last read.
    filled: usize,
    /// Cut offset chosen for the last chunk; `filled` when nothing is
    /// carried.
    cut: usize,
    /// Whether the last read filled the buffer completely. Carry-over
    /// only exists after a full read.
    last_read_full: bool,
    /// Samples handed to the decoder so far (monotonic).
    processed: u64,
    /// Samples pulled from the stream so far.
    total_read: u64,
    /// Completed `next_chunk` calls.
    chunks: u64,
    sample_rate: u32,
}

impl ChunkReader {
    pub fn new(capacity: usize, sample_rate: u32) -> Self {
        Self {
            buf: vec![0; capacity],
            scratch: vec![0; capacity * BYTES_PER_SAMPLE],
            filled: 0,
            cut: 0,
            last_read_full: false,
            processed: 0,
            total_read: 0,
            chunks: 0,
            sample_rate,
        }
    }

    /// Flush any carry-over to the decoder, then fill the buffer with
    /// new samples from `input`.
    ///
    /// # Errors
    /// - `ParloError::NoAudioData` if the very first read yields zero
    ///   samples. A zero-sample read later is a normal final chunk.
    /// - I/O errors from the stream.
    pub fn next_chunk<R: Read>(
        &mut self,
        input: &mut R,
        decoder: &mut dyn SpeechDecoder,
    ) -> Result<ChunkStatus> {
        let start_secs = self.position_secs();

        let mut carry_flushed = 0;
        if self.last_read_full && self.cut < self.filled {
            let leftover = &self.buf[self.cut..self.filled];
            decoder.feed(leftover)?;
            carry_flushed = leftover.len();
            self.processed += carry_flushed as u64;
            debug!(samples = carry_flushed, "carry-over flushed into new utterance");
        }

        let filled = self.read_samples(input)?;
        if filled == 0 && self.chunks == 0 {
            return Err(ParloError::NoAudioData);
        }

        self.chunks += 1;
        self.total_read += filled as u64;
        self.filled = filled;
        self.cut = filled;
        self.last_read_full = filled == self.buf.len();

        debug!(chunk = self.chunks, filled, "chunk read");

        Ok(ChunkStatus {
            filled,
            is_final: filled < self.buf.len(),
            carry_flushed,
            start_secs,
        })
    }

    /// Feed `[0, cut)` to the decoder and record the cut; `[cut, filled)`
    /// becomes carry-over for the next cycle.
    pub fn emit_segment(&mut self, decoder: &mut dyn SpeechDecoder, cut: usize) -> Result<usize> {
        debug_assert!(cut <= self.filled, "cut offset beyond fill length");
        if cut > 0 {
            decoder.feed(&self.buf[..cut])?;
        }
        self.cut = cut;
        self.processed += cut as u64;
        Ok(cut)
    }

    /// The valid samples of the current chunk.
    pub fn filled_samples(&self) -> &[i16] {
        &self.buf[..self.filled]
    }

    /// Stream position in seconds, derived from the processed counter.
    pub fn position_secs(&self) -> f64 {
        self.processed as f64 / self.sample_rate as f64
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total_read(&self) -> u64 {
        self.total_read
    }

    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Fill the buffer from `input`, decoding little-endian 16-bit
    /// samples. Reads until the buffer is full or the stream ends; a
    /// trailing odd byte at end-of-stream is discarded.
    fn read_samples<R: Read>(&mut self, input: &mut R) -> Result<usize> {
        let mut bytes = 0;
        while bytes < self.scratch.len() {
            match input.read(&mut self.scratch[bytes..]) {
                Ok(0) => break,
                Ok(n) => bytes += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let samples = bytes / BYTES_PER_SAMPLE;
        for (slot, pair) in self.buf[..samples]
            .iter_mut()
            .zip(self.scratch[..samples * BYTES_PER_SAMPLE].chunks_exact(BYTES_PER_SAMPLE))
        {
            *slot = i16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(samples)
    }
}
