//! Utterance records and the sinks that consume them.
//!
//! One record is produced per non-empty decode result and handed to the
//! sink immediately; nothing is persisted. Field names are the output
//! contract — do not rename.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One recognized utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceRecord {
    /// The decoded text.
    pub text: String,
    /// Voice id. Always 0 — no diarization is implemented.
    pub speaker: u32,
    /// Start of the utterance in stream seconds, rounded to 2 decimals.
    pub time_start: f64,
    /// Length of the utterance in seconds, rounded to 2 decimals.
    pub time_len: f64,
    /// Decoder confidence score.
    pub score: i32,
}

impl UtteranceRecord {
    /// Build a record, rounding both times to hundredths of a second.
    pub fn new(text: String, start_secs: f64, len_secs: f64, score: i32) -> Self {
        Self {
            text,
            speaker: 0,
            time_start: round_hundredths(start_secs),
            time_len: round_hundredths(len_secs),
            score,
        }
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Consumer of utterance records.
pub trait UtteranceSink {
    fn emit(&mut self, record: &UtteranceRecord) -> Result<()>;
}

/// Collects records in memory. Mostly useful in tests and embedding hosts.
impl UtteranceSink for Vec<UtteranceRecord> {
    fn emit(&mut self, record: &UtteranceRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per line to any `Write`.
pub struct JsonLineSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give the wrapped writer back (e.g. to inspect a buffer).
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> UtteranceSink for JsonLineSink<W> {
    fn emit(&mut self, record: &UtteranceRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record).map_err(anyhow::Error::from)?;
        writeln!(self.out)?;
        Ok(())
    }
}
