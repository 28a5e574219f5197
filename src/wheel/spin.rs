use std::time::Duration;

use async_trait::async_trait;

use super::{plan_rotation, select_segment, SegmentSet, WheelError, WheelResult};
use crate::types::SpinOutcome;

/// Reference animation duration; overridable via `SPIN_DURATION_MS`.
pub const DEFAULT_SPIN_DURATION_MS: u64 = 5000;

/// Injectable delay scheduler so tests never wait out the real animation.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Completes immediately. For tests.
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Orchestrates one spin of one wheel instance.
///
/// The winner is determined at spin start, not at animation end; the visual
/// animation is cosmetic and always converges on the pre-selected segment.
/// The cumulative rotation only ever moves forward, so consecutive spins on
/// the same wheel never snap backward. At most one spin may be in flight at
/// a time.
pub struct SpinController {
    duration: Duration,
    rotation: f64,
    spinning: bool,
}

impl SpinController {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            rotation: 0.0,
            spinning: false,
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    /// Cumulative rotation in degrees across all spins so far.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Select the outcome and enter the spinning state.
    ///
    /// Rejected with `SpinInFlight` while a previous spin has not completed.
    pub fn start_spin(
        &mut self,
        set: &SegmentSet,
        random_unit: impl FnOnce() -> f64,
    ) -> WheelResult<SpinOutcome> {
        if self.spinning {
            return Err(WheelError::SpinInFlight);
        }

        let (index, segment) = select_segment(set, random_unit);
        let final_rotation = plan_rotation(self.rotation, index, set.len());
        self.rotation = final_rotation;
        self.spinning = true;

        Ok(SpinOutcome::new(segment.clone(), final_rotation))
    }

    /// Leave the spinning state once the animation window has elapsed.
    pub fn complete_spin(&mut self) {
        self.spinning = false;
    }

    /// One full spin: pick the outcome, wait out the animation window, then
    /// yield it. Dropping the returned future cancels the pending completion;
    /// nothing fires on a torn-down flow.
    pub async fn spin(
        &mut self,
        set: &SegmentSet,
        random_unit: impl FnOnce() -> f64,
        sleeper: &dyn Sleeper,
    ) -> WheelResult<SpinOutcome> {
        let outcome = self.start_spin(set, random_unit)?;
        sleeper.sleep(self.duration).await;
        self.complete_spin();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SegmentKind;
    use crate::wheel::test_support::segment;
    use crate::wheel::MIN_EXTRA_ROTATION_DEGREES;

    fn demo_set() -> SegmentSet {
        SegmentSet::new(vec![
            segment("Dessert", SegmentKind::Prize, 20.0, 0),
            segment("Merci !", SegmentKind::NoPrize, 80.0, 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_second_start_while_spinning_rejected() {
        let mut controller = SpinController::new(Duration::from_millis(10));
        let set = demo_set();

        let first = controller.start_spin(&set, || 0.1).unwrap();
        let second = controller.start_spin(&set, || 0.9);
        assert!(matches!(second, Err(WheelError::SpinInFlight)));

        // The rejected call must not alter the scheduled outcome.
        assert_eq!(controller.rotation(), first.final_rotation_degrees);
    }

    #[tokio::test]
    async fn test_spin_yields_preselected_outcome() {
        let mut controller = SpinController::new(Duration::from_millis(1));
        let set = demo_set();

        let outcome = controller.spin(&set, || 0.1, &NoopSleeper).await.unwrap();
        assert_eq!(outcome.segment.title, "Dessert");
        assert!(outcome.is_winner);
        assert!(!controller.is_spinning());
    }

    #[tokio::test]
    async fn test_sequential_spins_rotate_forward() {
        let mut controller = SpinController::new(Duration::from_millis(1));
        let set = demo_set();

        let mut previous = 0.0;
        for unit in [0.1, 0.5, 0.999999, 0.0] {
            let outcome = controller.spin(&set, || unit, &NoopSleeper).await.unwrap();
            assert!(outcome.final_rotation_degrees > previous);
            assert!(outcome.final_rotation_degrees - previous >= MIN_EXTRA_ROTATION_DEGREES);
            previous = outcome.final_rotation_degrees;
        }
    }

    #[tokio::test]
    async fn test_spin_usable_again_after_completion() {
        let mut controller = SpinController::new(Duration::from_millis(1));
        let set = demo_set();

        controller.spin(&set, || 0.5, &NoopSleeper).await.unwrap();
        assert!(controller.spin(&set, || 0.5, &NoopSleeper).await.is_ok());
    }
}
