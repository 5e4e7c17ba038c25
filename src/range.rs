//! Inclusive frame range of a sequence

use serde::Serialize;
use std::fmt;

/// Inclusive `(min, max)` frame range; `min <= max` always holds.
///
/// Absence of a range is expressed as `Option<SequenceRange>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SequenceRange {
    min: i64,
    max: i64,
}

impl SequenceRange {
    /// Range between two frames in either order
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// One-frame range
    pub fn single(frame: i64) -> Self {
        Self {
            min: frame,
            max: frame,
        }
    }

    /// Min/max over a set of frames, `None` when the set is empty
    pub fn from_frames<I>(frames: I) -> Option<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        frames.into_iter().fold(None, |acc, f| match acc {
            None => Some(Self::single(f)),
            Some(r) => Some(Self {
                min: r.min.min(f),
                max: r.max.max(f),
            }),
        })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of frames the range spans, gaps included
    pub fn len(&self) -> u64 {
        self.max.abs_diff(self.min).saturating_add(1)
    }

    pub fn contains(&self, frame: i64) -> bool {
        (self.min..=self.max).contains(&frame)
    }
}

impl From<SequenceRange> for (i64, i64) {
    fn from(r: SequenceRange) -> Self {
        (r.min, r.max)
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frames() {
        let r = SequenceRange::from_frames([11, 15, 10]).unwrap();
        assert_eq!(<(i64, i64)>::from(r), (10, 15));
        assert_eq!(r.len(), 6);
        assert!(r.contains(12));
        assert!(!r.contains(16));
        assert!(SequenceRange::from_frames(Vec::new()).is_none());
    }

    #[test]
    fn test_new_orders_bounds() {
        assert_eq!(SequenceRange::new(20, 5), SequenceRange::new(5, 20));
        assert_eq!(SequenceRange::new(20, 5).min(), 5);
        assert_eq!(SequenceRange::single(7).len(), 1);
    }

    #[test]
    fn test_len_saturates() {
        assert_eq!(SequenceRange::new(i64::MIN, i64::MAX).len(), u64::MAX);
        assert_eq!(SequenceRange::new(-5, 5).len(), 11);
    }

    #[test]
    fn test_display_and_json() {
        let r = SequenceRange::new(1001, 1100);
        assert_eq!(r.to_string(), "1001-1100");
        assert_eq!(
            serde_json::to_value(r).unwrap(),
            serde_json::json!({"min": 1001, "max": 1100})
        );
    }
}
