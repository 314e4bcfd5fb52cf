//! The synchronous segmentation session.
//!
//! ## Loop (per chunk)
//!
//! ```text
//! 1. start_utterance on the decoder
//! 2. ChunkReader::next_chunk — flush carry-over, refill the buffer
//! 3. BoundaryScanner::cut_offset — pick where the utterance ends
//! 4. ChunkReader::emit_segment — feed [0, cut) to the decoder
//! 5. end_utterance; read the hypothesis if anything was fed
//! 6. Non-empty text → one record to the sink; empty → nothing
//! 7. Short read → stop
//! ```
//!
//! The decoder protocol requires strict start/end alternation, so every
//! started utterance is ended, even when the stream ends with an empty
//! final chunk. The one exception is a fatal error mid-cycle: the run
//! unwinds immediately and no further decoder calls are made.

use std::io::Read;

use tracing::{debug, info};

use crate::buffering::{ChunkReader, BYTES_PER_SAMPLE};
use crate::decode::DecoderHandle;
use crate::error::Result;
use crate::records::{UtteranceRecord, UtteranceSink};
use crate::scan::BoundaryScanner;

/// Configuration for a segmentation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sample buffer capacity — the maximum utterance window.
    /// Default: 65536 (≈ 4.1 s at 16 kHz).
    pub capacity: usize,
    /// Frame width for boundary scanning. Default: 64 samples.
    pub frame_size: usize,
    /// Input sample rate in Hz. Default: 16000.
    pub sample_rate: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 65_536,
            frame_size: 64,
            sample_rate: 16_000,
        }
    }
}

/// Counters reported when a session finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    /// Chunks read from the stream.
    pub chunks: u64,
    /// Records handed to the sink.
    pub utterances: u64,
    /// Samples pulled from the stream.
    pub samples_read: u64,
    /// Samples handed to the decoder.
    pub samples_processed: u64,
    /// Audio seconds read.
    pub seconds_read: f64,
}

/// Drives the read → scan → decode loop over one input stream.
pub struct Segmenter {
    config: SessionConfig,
    reader: ChunkReader,
    scanner: BoundaryScanner,
    decoder: DecoderHandle,
}

impl Segmenter {
    pub fn new(config: SessionConfig, decoder: DecoderHandle) -> Self {
        let reader = ChunkReader::new(config.capacity, config.sample_rate);
        let scanner = BoundaryScanner::new(config.frame_size, config.sample_rate);
        Self {
            config,
            reader,
            scanner,
            decoder,
        }
    }

    /// Consume the stream until exhaustion, emitting one record per
    /// recognized utterance.
    ///
    /// # Errors
    /// Fatal per the error taxonomy: an empty first read
    /// (`NoAudioData`), stream I/O failures, and decoder cycle failures.
    /// All unwind immediately; there are no retries.
    pub fn run<R: Read, S: UtteranceSink>(
        &mut self,
        mut input: R,
        sink: &mut S,
    ) -> Result<SessionSummary> {
        info!(
            capacity = self.config.capacity,
            kib = self.config.capacity * BYTES_PER_SAMPLE / 1024,
            window_secs = format_args!(
                "{:.2}",
                self.config.capacity as f64 / self.config.sample_rate as f64
            ),
            "read buffer allocated — max utterance window"
        );

        let mut utterances = 0u64;
        let mut index = 0u64;

        loop {
            index += 1;
            let id = format!("utt-{index}");

            let mut decoder = self.decoder.0.lock();
            decoder.start_utterance(&id)?;

            let status = self.reader.next_chunk(&mut input, &mut *decoder)?;
            let cut = self
                .scanner
                .cut_offset(self.reader.filled_samples(), status.is_final);
            self.reader.emit_segment(&mut *decoder, cut)?;

            decoder.end_utterance()?;

            let fed = status.carry_flushed + cut;
            if fed > 0 {
                let hypothesis = decoder.hypothesis();
                let end_secs = self.reader.position_secs();
                if hypothesis.is_empty() {
                    debug!(utterance = %id, "empty hypothesis — nothing emitted");
                } else {
                    let record = UtteranceRecord::new(
                        hypothesis.text,
                        status.start_secs,
                        end_secs - status.start_secs,
                        hypothesis.score,
                    );
                    info!(
                        utterance = %id,
                        time_start = record.time_start,
                        time_len = record.time_len,
                        score = record.score,
                        "utterance emitted"
                    );
                    sink.emit(&record)?;
                    utterances += 1;
                }
            }
            drop(decoder);

            if status.is_final {
                break;
            }
        }

        let summary = SessionSummary {
            chunks: self.reader.chunks(),
            utterances,
            samples_read: self.reader.total_read(),
            samples_processed: self.reader.processed(),
            seconds_read: self.reader.total_read() as f64 / self.config.sample_rate as f64,
        };
        info!(
            chunks = summary.chunks,
            utterances = summary.utterances,
            kib_read = summary.samples_read * BYTES_PER_SAMPLE as u64 / 1024,
            seconds = format_args!("{:.2}", summary.seconds_read),
            "stream exhausted — session summary"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::decode::{Hypothesis, SpeechDecoder};
    use crate::error::ParloError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(String),
        Feed(usize),
        End,
    }

    /// Decoder double recording the protocol call sequence.
    struct ScriptedDecoder {
        calls: Arc<Mutex<Vec<Call>>>,
        hypothesis_text: Option<String>,
        fail_end: bool,
    }

    impl ScriptedDecoder {
        fn new(calls: Arc<Mutex<Vec<Call>>>, hypothesis_text: Option<&str>) -> Self {
            Self {
                calls,
                hypothesis_text: hypothesis_text.map(str::to_owned),
                fail_end: false,
            }
        }

        fn failing_end(calls: Arc<Mutex<Vec<Call>>>) -> Self {
            Self {
                calls,
                hypothesis_text: None,
                fail_end: true,
            }
        }
    }

    impl SpeechDecoder for ScriptedDecoder {
        fn start_utterance(&mut self, id: &str) -> crate::error::Result<()> {
            self.calls.lock().push(Call::Start(id.to_string()));
            Ok(())
        }

        fn feed(&mut self, samples: &[i16]) -> crate::error::Result<()> {
            self.calls.lock().push(Call::Feed(samples.len()));
            Ok(())
        }

        fn end_utterance(&mut self) -> crate::error::Result<()> {
            self.calls.lock().push(Call::End);
            if self.fail_end {
                return Err(ParloError::DecodeCycle("scripted end failure".into()));
            }
            Ok(())
        }

        fn hypothesis(&mut self) -> Hypothesis {
            match &self.hypothesis_text {
                Some(text) => Hypothesis {
                    text: text.clone(),
                    score: -100,
                },
                None => Hypothesis::none(),
            }
        }
    }

    fn le_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn small_config() -> SessionConfig {
        SessionConfig {
            capacity: 1024,
            frame_size: 64,
            sample_rate: 16_000,
        }
    }

    /// 1024 silent samples with one loud frame at [896, 960), followed
    /// by a short final chunk. The scanner cuts the first chunk at 768.
    fn two_chunk_stream(tail_len: usize) -> Vec<u8> {
        let mut samples = vec![0i16; 1024];
        for s in &mut samples[896..960] {
            *s = 8000;
        }
        samples.extend(std::iter::repeat(400i16).take(tail_len));
        le_bytes(&samples)
    }

    #[test]
    fn protocol_calls_alternate_strictly_across_utterances() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), Some("ok"));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        let summary = segmenter
            .run(Cursor::new(two_chunk_stream(500)), &mut records)
            .unwrap();

        assert_eq!(
            &*calls.lock(),
            &vec![
                Call::Start("utt-1".into()),
                Call::Feed(768),
                Call::End,
                Call::Start("utt-2".into()),
                Call::Feed(256), // carry-over from the first chunk
                Call::Feed(500),
                Call::End,
            ]
        );
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.utterances, 2);
    }

    #[test]
    fn processed_count_matches_total_read_after_a_full_run() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), Some("ok"));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        let summary = segmenter
            .run(Cursor::new(two_chunk_stream(500)), &mut records)
            .unwrap();

        // No samples double-counted or dropped: carry flush + segments
        // account for every sample read.
        assert_eq!(summary.samples_processed, summary.samples_read);
        assert_eq!(summary.samples_read, 1024 + 500);
    }

    #[test]
    fn utterance_times_chain_across_the_cut() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), Some("ok"));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        segmenter
            .run(Cursor::new(two_chunk_stream(500)), &mut records)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time_start, 0.0);
        // 768 samples at 16 kHz = 0.048 s, rounded to 0.05.
        assert_eq!(records[0].time_len, 0.05);
        // Second utterance starts at the cut (768/16000 = 0.048 → 0.05)
        // and covers the 256-sample carry plus the 500-sample tail.
        assert_eq!(records[1].time_start, 0.05);
        assert_eq!(records[1].speaker, 0);
        assert_eq!(records[1].score, -100);
    }

    #[test]
    fn empty_hypothesis_emits_no_record() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), None);
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        let summary = segmenter
            .run(Cursor::new(two_chunk_stream(500)), &mut records)
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(summary.utterances, 0);
        // The decoder was still driven through both full cycles.
        assert_eq!(
            calls.lock().iter().filter(|c| matches!(c, Call::End)).count(),
            2
        );
    }

    #[test]
    fn end_utterance_failure_is_fatal() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::failing_end(Arc::clone(&calls));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        let err = segmenter
            .run(Cursor::new(two_chunk_stream(500)), &mut records)
            .unwrap_err();
        assert!(matches!(err, ParloError::DecodeCycle(_)));
        assert!(records.is_empty());
    }

    #[test]
    fn empty_stream_is_no_audio_data() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), Some("ok"));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let mut records: Vec<UtteranceRecord> = Vec::new();
        let err = segmenter
            .run(Cursor::new(Vec::new()), &mut records)
            .unwrap_err();
        assert!(matches!(err, ParloError::NoAudioData));
        assert!(records.is_empty());
        // The fatal error unwinds mid-cycle: the opened utterance is
        // abandoned, not ended.
        assert_eq!(&*calls.lock(), &vec![Call::Start("utt-1".into())]);
    }

    #[test]
    fn single_short_chunk_is_one_final_utterance() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let decoder = ScriptedDecoder::new(Arc::clone(&calls), Some("short"));
        let mut segmenter = Segmenter::new(small_config(), DecoderHandle::new(decoder));

        let samples = vec![1234i16; 500];
        let mut records: Vec<UtteranceRecord> = Vec::new();
        let summary = segmenter
            .run(Cursor::new(le_bytes(&samples)), &mut records)
            .unwrap();

        // Final read below capacity: no scan, the cut is the fill length.
        assert_eq!(
            &*calls.lock(),
            &vec![Call::Start("utt-1".into()), Call::Feed(500), Call::End]
        );
        assert_eq!(summary.chunks, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "short");
    }
}
