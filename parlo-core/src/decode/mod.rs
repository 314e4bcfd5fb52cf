//! Speech decoder abstraction.
//!
//! The `SpeechDecoder` trait decouples the segmentation session from any
//! specific recognition backend (stub echo, PocketSphinx bindings, a
//! network decoder, etc.). The call protocol is strict and stateful:
//! `start_utterance`, zero or more `feed` calls, `end_utterance`, then
//! `hypothesis` — never interleaved across utterances.
//!
//! `&mut self` intentionally expresses that decoders are stateful —
//! lattice caches, per-utterance accumulators, etc. All mutation is
//! serialised through `DecoderHandle`'s `parking_lot::Mutex`.

pub mod stub;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// The decoder's answer for one completed utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Recognised text. Empty when nothing was recognised — a normal
    /// outcome, not an error.
    pub text: String,
    /// Backend-specific confidence score.
    pub score: i32,
}

impl Hypothesis {
    /// An empty hypothesis (no recognition).
    pub fn none() -> Self {
        Self {
            text: String::new(),
            score: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Contract for speech recognition backends.
pub trait SpeechDecoder: Send + 'static {
    /// Open a new utterance. `id` is a caller-assigned label carried
    /// through for logging and backend bookkeeping.
    ///
    /// # Errors
    /// Returns an error if an utterance is already open or the backend
    /// failed to initialise the decode cycle.
    fn start_utterance(&mut self, id: &str) -> Result<()>;

    /// Submit mono 16-bit PCM samples to the open utterance.
    /// May be called zero or more times between start and end.
    fn feed(&mut self, samples: &[i16]) -> Result<()>;

    /// Close the open utterance. A failure here is fatal for the run
    /// (`ParloError::DecodeCycle`); no mid-utterance retry exists.
    fn end_utterance(&mut self) -> Result<()>;

    /// Hypothesis for the most recently ended utterance.
    fn hypothesis(&mut self) -> Hypothesis;
}

/// Thread-safe reference-counted handle to any `SpeechDecoder` implementor.
///
/// The session itself is single-threaded, but the handle keeps the
/// strict call protocol serialised for any host that shares the decoder.
#[derive(Clone)]
pub struct DecoderHandle(pub Arc<Mutex<dyn SpeechDecoder>>);

impl DecoderHandle {
    /// Wrap any `SpeechDecoder` in a `DecoderHandle`.
    pub fn new<D: SpeechDecoder>(decoder: D) -> Self {
        Self(Arc::new(Mutex::new(decoder)))
    }
}

impl std::fmt::Debug for DecoderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderHandle").finish_non_exhaustive()
    }
}
