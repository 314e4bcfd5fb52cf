//! Fixed-capacity extreme-value tracker.
//!
//! Keeps the `K` largest and `K` smallest values seen so far in sorted
//! slot arrays. Insertion displaces a slot only on a strict comparison,
//! so ties keep the first-seen value in the higher-ranked slot.

/// Tracks the top-`K` and bottom-`K` values of a stream of RMS levels.
///
/// The maxima slots start at `0.0` and the minima slots at `999.0`; a
/// seed that is never displaced participates in the averages, which
/// matters when fewer than `K` frames are observed or when every frame
/// is louder than the minima seed.
#[derive(Debug, Clone)]
pub struct Extremes<const K: usize> {
    maxima: [f32; K],
    minima: [f32; K],
}

impl<const K: usize> Extremes<K> {
    pub fn new() -> Self {
        Self {
            maxima: [0.0; K],
            minima: [999.0; K],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(maxima: [f32; K], minima: [f32; K]) -> Self {
        Self { maxima, minima }
    }

    /// Offer one value to both slot arrays.
    pub fn observe(&mut self, value: f32) {
        for i in 0..K {
            if value > self.maxima[i] {
                self.maxima[i..].rotate_right(1);
                self.maxima[i] = value;
                break;
            }
        }
        for i in 0..K {
            if value < self.minima[i] {
                self.minima[i..].rotate_right(1);
                self.minima[i] = value;
                break;
            }
        }
    }

    /// Mean of the top-`K` slots, summed in slot order.
    pub fn average_max(&self) -> f32 {
        self.maxima.iter().sum::<f32>() / K as f32
    }

    /// Mean of the bottom-`K` slots, summed in slot order.
    pub fn average_min(&self) -> f32 {
        self.minima.iter().sum::<f32>() / K as f32
    }

    pub fn maxima(&self) -> &[f32; K] {
        &self.maxima
    }

    pub fn minima(&self) -> &[f32; K] {
        &self.minima
    }
}

impl<const K: usize> Default for Extremes<K> {
    fn default() -> Self {
        Self::new()
    }
}
