//! Boundary scanning — picking where to cut a filled chunk.
//!
//! ## Algorithm
//!
//! 1. Final (short) chunks are never scanned: the cut is the fill
//!    length and the whole remainder becomes one last utterance.
//! 2. Otherwise only the second half of the buffer is examined, walking
//!    from the last whole frame back to the midpoint in steps of one
//!    frame and computing per-frame RMS energy. The profile therefore
//!    lists the latest frame first.
//! 3. The top-3/bottom-3 RMS values seen feed a noise-floor threshold
//!    of 5 % of the typical peak energy.
//! 4. The longest contiguous run of frames at or below the threshold is
//!    the pause; the cut lands on its midpoint.
//! 5. If no frame is quiet enough the cut collapses to the buffer end —
//!    the chunk is simply not split. That fallback is the design's only
//!    resilience mechanism; it is not an error.
//!
//! Scanning only the back half biases the cut toward the most recent
//! plausible pause, which bounds both the carry-over size and the
//! utterance length to roughly half a buffer..one buffer.

pub mod extremes;

use tracing::debug;

use extremes::Extremes;

/// Energy-based boundary scanner. Pure: the cut offset is a function of
/// the buffer contents and length alone.
#[derive(Debug, Clone)]
pub struct BoundaryScanner {
    /// Frame width in samples — the unit of energy measurement.
    frame_size: usize,
    /// Sample rate, used only for the diagnostic split-position log.
    sample_rate: u32,
}

impl BoundaryScanner {
    pub fn new(frame_size: usize, sample_rate: u32) -> Self {
        Self {
            frame_size,
            sample_rate,
        }
    }

    /// Decide the cut offset for a filled buffer.
    ///
    /// Returns `samples.len()` unscanned when `is_final`, otherwise an
    /// offset in `[len/2, len]`. The remainder `[cut, len)` becomes the
    /// next chunk's carry-over.
    pub fn cut_offset(&self, samples: &[i16], is_final: bool) -> usize {
        let len = samples.len();
        if is_final || len < self.frame_size * 2 {
            return len;
        }

        let middle = len / 2;
        let frame_count = middle / self.frame_size + 1;

        // Reverse-chronological energy profile over the back half.
        let mut profile: Vec<f32> = Vec::with_capacity(frame_count);
        let mut extremes = Extremes::<3>::new();

        let mut pos = len - self.frame_size;
        while pos >= middle {
            let rms = frame_rms(&samples[pos..pos + self.frame_size]);
            if profile.len() < frame_count {
                profile.push(rms);
            }
            extremes.observe(rms);
            pos -= self.frame_size;
        }

        let threshold = noise_floor(&extremes);

        // Longest at-or-below-threshold run, in profile order.
        let mut run = 0usize;
        let mut longest = 0usize;
        let mut best_frame = 0usize;
        for (i, &rms) in profile.iter().enumerate() {
            if rms <= threshold {
                run += 1;
                if run > longest {
                    longest = run;
                    best_frame = i;
                }
            } else {
                run = 0;
            }
        }

        // Cut at the midpoint of the detected pause.
        best_frame -= longest / 2;

        debug!(
            threshold = format_args!("{threshold:.2}"),
            split_secs = format_args!(
                "{:.2}",
                (best_frame * self.frame_size) as f64 / self.sample_rate as f64
            ),
            run_frames = longest,
            "boundary selected"
        );

        // The profile is measured backward from the buffer end.
        len - best_frame * self.frame_size
    }
}

/// Root-mean-square energy of one frame, accumulated in f64 and
/// narrowed to the profile's f32.
fn frame_rms(frame: &[i16]) -> f32 {
    let mut sum_sq = 0f64;
    for &sample in frame {
        let v = sample as f64;
        sum_sq += v * v;
    }
    ((sum_sq / frame.len() as f64).sqrt()) as f32
}

/// Noise-floor threshold: 5 % of the average peak energy. The floor
/// average is subtracted and re-added rather than simplified away; the
/// two-step form is load-bearing for exact reproducibility of
/// historical cut positions, so keep it as is.
fn noise_floor(extremes: &Extremes<3>) -> f32 {
    let mut threshold = 0.05 * extremes.average_max() - extremes.average_min();
    threshold += extremes.average_min();
    threshold
}
