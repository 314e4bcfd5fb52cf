//! `StubDecoder` — placeholder backend that echoes metadata without real
//! recognition.
//!
//! Lets the full read → scan → emit pipeline run end-to-end before a
//! real decoding backend is wired in. Also enforces the strict
//! start/feed/end call protocol, so protocol slips surface as
//! `DecodeCycle` errors instead of silent corruption.

use tracing::debug;

use crate::decode::{Hypothesis, SpeechDecoder};
use crate::error::{ParloError, Result};

/// Utterances shorter than this produce an empty hypothesis, mimicking
/// a real backend's no-recognition outcome on near-silent segments.
const MIN_HYPOTHESIS_SAMPLES: usize = 160;

/// Echo-style stub decoder.
///
/// For every ended utterance that received at least
/// `MIN_HYPOTHESIS_SAMPLES` samples it reports
/// `"[stub: <N> samples]"` with a score of 0.
pub struct StubDecoder {
    utterance_open: bool,
    utterance_count: u32,
    fed_samples: usize,
    last_utterance_samples: usize,
}

impl StubDecoder {
    pub fn new() -> Self {
        Self {
            utterance_open: false,
            utterance_count: 0,
            fed_samples: 0,
            last_utterance_samples: 0,
        }
    }
}

impl Default for StubDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechDecoder for StubDecoder {
    fn start_utterance(&mut self, id: &str) -> Result<()> {
        if self.utterance_open {
            return Err(ParloError::DecodeCycle(format!(
                "start_utterance({id}) while an utterance is still open"
            )));
        }
        self.utterance_open = true;
        self.utterance_count += 1;
        self.fed_samples = 0;
        debug!(id, "stub utterance opened");
        Ok(())
    }

    fn feed(&mut self, samples: &[i16]) -> Result<()> {
        if !self.utterance_open {
            return Err(ParloError::DecodeCycle(
                "feed without an open utterance".into(),
            ));
        }
        self.fed_samples += samples.len();
        Ok(())
    }

    fn end_utterance(&mut self) -> Result<()> {
        if !self.utterance_open {
            return Err(ParloError::DecodeCycle(
                "end_utterance without an open utterance".into(),
            ));
        }
        self.utterance_open = false;
        self.last_utterance_samples = self.fed_samples;
        debug!(samples = self.fed_samples, "stub utterance closed");
        Ok(())
    }

    fn hypothesis(&mut self) -> Hypothesis {
        if self.last_utterance_samples < MIN_HYPOTHESIS_SAMPLES {
            return Hypothesis::none();
        }
        Hypothesis {
            text: format!("[stub: {} samples]", self.last_utterance_samples),
            score: 0,
        }
    }
}
