//! The prize wheel: weighted segment selection, rotation planning, and the
//! spin controller that ties both to the animation window.

mod rotation;
mod selector;
mod spin;

pub use rotation::{plan_rotation, MIN_EXTRA_ROTATION_DEGREES};
pub use selector::select_segment;
pub use spin::{NoopSleeper, Sleeper, SpinController, TokioSleeper, DEFAULT_SPIN_DURATION_MS};

use crate::types::Segment;

/// Result type for wheel operations
pub type WheelResult<T> = Result<T, WheelError>;

/// Errors that make a wheel unspinnable or a spin attempt invalid
#[derive(Debug, thiserror::Error)]
pub enum WheelError {
    #[error("wheel has no segments")]
    EmptySegmentSet,

    #[error("segment '{0}' has a negative weight")]
    NegativeWeight(String),

    #[error("segment weights sum to zero")]
    ZeroTotalWeight,

    #[error("a spin is already in flight")]
    SpinInFlight,
}

/// A wheel's segments, sorted by their angular slot and validated to be
/// spinnable: non-empty, no negative weights, positive total weight.
///
/// Selection walks the segments in this order; a segment's position in the
/// sorted list is its angular index on the physical wheel.
#[derive(Debug, Clone)]
pub struct SegmentSet {
    segments: Vec<Segment>,
    total_weight: f64,
}

impl SegmentSet {
    pub fn new(mut segments: Vec<Segment>) -> WheelResult<Self> {
        if segments.is_empty() {
            return Err(WheelError::EmptySegmentSet);
        }
        for segment in &segments {
            if segment.weight < 0.0 {
                return Err(WheelError::NegativeWeight(segment.title.clone()));
            }
        }
        let total_weight: f64 = segments.iter().map(|s| s.weight).sum();
        if total_weight <= 0.0 {
            return Err(WheelError::ZeroTotalWeight);
        }
        segments.sort_by_key(|s| s.order);
        Ok(Self {
            segments,
            total_weight,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{Segment, SegmentKind};

    /// Build a segment with the given title, kind, weight and slot.
    pub fn segment(title: &str, kind: SegmentKind, weight: f64, order: u32) -> Segment {
        Segment {
            id: format!("seg-{order}"),
            establishment_id: "demo-restaurant".to_string(),
            title: title.to_string(),
            color: "#8b5cf6".to_string(),
            kind,
            weight,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::segment;
    use super::*;
    use crate::types::SegmentKind;

    #[test]
    fn test_empty_set_rejected() {
        let result = SegmentSet::new(vec![]);
        assert!(matches!(result, Err(WheelError::EmptySegmentSet)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = SegmentSet::new(vec![
            segment("Dessert", SegmentKind::Prize, 20.0, 0),
            segment("Merci !", SegmentKind::NoPrize, -1.0, 1),
        ]);
        assert!(matches!(result, Err(WheelError::NegativeWeight(_))));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let result = SegmentSet::new(vec![
            segment("Dessert", SegmentKind::Prize, 0.0, 0),
            segment("Merci !", SegmentKind::NoPrize, 0.0, 1),
        ]);
        assert!(matches!(result, Err(WheelError::ZeroTotalWeight)));
    }

    #[test]
    fn test_segments_sorted_by_order() {
        let set = SegmentSet::new(vec![
            segment("C", SegmentKind::NoPrize, 10.0, 2),
            segment("A", SegmentKind::Prize, 10.0, 0),
            segment("B", SegmentKind::NoPrize, 10.0, 1),
        ])
        .unwrap();

        let titles: Vec<&str> = set.segments().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(set.total_weight(), 30.0);
    }
}
