use super::SegmentSet;
use crate::types::Segment;

/// Pick one segment according to its probability weight.
///
/// `random_unit` must yield a value in `[0, 1)`; it is injected rather than
/// drawn from a global generator so selection is reproducible in tests. The
/// draw is scaled by the total weight and the segments are walked in order,
/// stopping at the first segment with positive weight whose running total
/// reaches or exceeds the draw. If floating-point drift leaves the draw just
/// past the final running total, the last segment is returned; this never
/// panics for a valid `SegmentSet`.
///
/// Returns the selected segment together with its angular index, which the
/// rotation planner needs.
pub fn select_segment<'a>(
    set: &'a SegmentSet,
    random_unit: impl FnOnce() -> f64,
) -> (usize, &'a Segment) {
    let r = random_unit() * set.total_weight();
    let mut cumulative = 0.0;

    for (index, segment) in set.segments().iter().enumerate() {
        cumulative += segment.weight;
        if segment.weight > 0.0 && r <= cumulative {
            return (index, segment);
        }
    }

    // Rounding drift: fall back to the last segment.
    let last = set.len() - 1;
    (last, &set.segments()[last])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::test_support::segment;
    use crate::types::SegmentKind;
    use rand::{Rng, SeedableRng};

    fn dessert_thanks() -> SegmentSet {
        SegmentSet::new(vec![
            segment("Dessert", SegmentKind::Prize, 20.0, 0),
            segment("Merci !", SegmentKind::NoPrize, 80.0, 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_low_draw_selects_first_segment() {
        let set = dessert_thanks();
        // r = 0.1 * 100 = 10 <= cumulative 20
        let (index, selected) = select_segment(&set, || 0.1);
        assert_eq!(index, 0);
        assert_eq!(selected.title, "Dessert");
    }

    #[test]
    fn test_mid_draw_selects_second_segment() {
        let set = dessert_thanks();
        // r = 0.5 * 100 = 50; 20 < 50 <= 100
        let (index, selected) = select_segment(&set, || 0.5);
        assert_eq!(index, 1);
        assert_eq!(selected.title, "Merci !");
    }

    #[test]
    fn test_zero_draw_selects_first_positive_weight() {
        let set = SegmentSet::new(vec![
            segment("Fantôme", SegmentKind::NoPrize, 0.0, 0),
            segment("Dessert", SegmentKind::Prize, 10.0, 1),
        ])
        .unwrap();

        let (index, selected) = select_segment(&set, || 0.0);
        assert_eq!(index, 1);
        assert_eq!(selected.title, "Dessert");
    }

    #[test]
    fn test_near_one_draw_selects_last_segment() {
        let set = dessert_thanks();
        let (index, _) = select_segment(&set, || 0.999999);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_drift_past_total_falls_back_to_last() {
        let set = dessert_thanks();
        // A unit value of exactly 1.0 is outside the contract but must not
        // panic; the last segment absorbs the drift.
        let (index, _) = select_segment(&set, || 1.0 + 1e-12);
        assert_eq!(index, 1);
    }

    #[test]
    fn test_single_segment_always_selected() {
        let set = SegmentSet::new(vec![segment("Seul", SegmentKind::Prize, 1.0, 0)]).unwrap();
        for unit in [0.0, 0.3, 0.999999] {
            let (index, _) = select_segment(&set, || unit);
            assert_eq!(index, 0);
        }
    }

    #[test]
    fn test_selection_frequency_tracks_weights() {
        let set = SegmentSet::new(vec![
            segment("Boisson", SegmentKind::Prize, 25.0, 0),
            segment("Merci !", SegmentKind::NoPrize, 60.0, 1),
            segment("Café", SegmentKind::Prize, 15.0, 2),
        ])
        .unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let samples = 100_000;
        let mut counts = [0u32; 3];
        for _ in 0..samples {
            let unit: f64 = rng.random();
            let (index, _) = select_segment(&set, || unit);
            counts[index] += 1;
        }

        // Expected frequencies 25%, 60%, 15%; allow a 1.5-point tolerance.
        let freq = |c: u32| c as f64 / samples as f64;
        assert!((freq(counts[0]) - 0.25).abs() < 0.015, "{counts:?}");
        assert!((freq(counts[1]) - 0.60).abs() < 0.015, "{counts:?}");
        assert!((freq(counts[2]) - 0.15).abs() < 0.015, "{counts:?}");
    }
}
