//! The game funnel: contact capture, review redirect, wheel 1, optional
//! Instagram bonus wheel, and the duplicate-participation gate.
//!
//! One `GameFlow` per participant session. Transitions are strictly
//! sequential; the caller serializes access (sessions live behind a mutex in
//! `AppState`). There is no shared mutable state between sessions, so the
//! check-then-create window in `submit_contact_info` is only racy against a
//! concurrent submission of the same email/phone from a second session; a
//! uniqueness constraint in the backing store is the place to close that,
//! not this flow.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::store::{ParticipantStore, StoreError, StoreResult};
use crate::types::{Establishment, GameStep, ParticipantEntry, SpinOutcome};
use crate::wheel::{SegmentSet, Sleeper, SpinController, TokioSleeper, WheelError};

/// Shared random source yielding values in `[0, 1)`.
pub type RandomUnit = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Animation timing and the entropy source behind both wheels.
#[derive(Clone)]
pub struct SpinSettings {
    pub duration: Duration,
    pub sleeper: Arc<dyn Sleeper>,
    pub random_unit: RandomUnit,
}

impl SpinSettings {
    /// Production settings: tokio timer, thread-local RNG, duration from
    /// `SPIN_DURATION_MS` (default 5000).
    pub fn from_env() -> Self {
        let millis = std::env::var("SPIN_DURATION_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(crate::wheel::DEFAULT_SPIN_DURATION_MS);
        Self {
            duration: Duration::from_millis(millis),
            sleeper: Arc::new(TokioSleeper),
            random_unit: Arc::new(|| rand::rng().random::<f64>()),
        }
    }

    /// Immediate completion and a fixed draw. For tests.
    pub fn fixed(unit: f64) -> Self {
        Self {
            duration: Duration::from_millis(0),
            sleeper: Arc::new(crate::wheel::NoopSleeper),
            random_unit: Arc::new(move || unit),
        }
    }
}

/// Errors surfaced by flow transitions
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("invalid step transition from {from:?} to {to:?}")]
    InvalidTransition { from: GameStep, to: GameStep },

    #[error(transparent)]
    Wheel(#[from] WheelError),
}

/// Check if a step transition is valid
pub fn is_valid_step_transition(from: GameStep, to: GameStep) -> bool {
    use GameStep::*;

    match (from, to) {
        // Normal forward flow
        (AwaitingContactInfo, AwaitingReviewConfirmation) => true,
        (AwaitingReviewConfirmation, SpinningWheel1) => true,
        (SpinningWheel1, ShowingResult1) => true,
        (ShowingResult1, AwaitingInstagramFollow) => true,
        (AwaitingInstagramFollow, SpinningWheel2) => true,
        (SpinningWheel2, ShowingResult2) => true,

        // Both result screens can end the session
        (ShowingResult1, Finished) => true,
        (ShowingResult2, Finished) => true,

        // The sole anti-abuse gate, only at submission time
        (AwaitingContactInfo, AlreadyParticipated) => true,

        // All other transitions are invalid
        _ => false,
    }
}

pub struct GameFlow {
    establishment: Establishment,
    segments: SegmentSet,
    participants: Arc<dyn ParticipantStore>,
    settings: SpinSettings,
    step: GameStep,
    entry: Option<ParticipantEntry>,
    wheel1: SpinController,
    wheel2: SpinController,
    winner1: bool,
}

impl GameFlow {
    /// Build a flow for one participant session. Fails up front with a
    /// `WheelError` when the establishment's segment configuration is not
    /// spinnable, before any state exists.
    pub fn new(
        establishment: Establishment,
        segments: Vec<crate::types::Segment>,
        participants: Arc<dyn ParticipantStore>,
        settings: SpinSettings,
    ) -> Result<Self, WheelError> {
        let segments = SegmentSet::new(segments)?;
        let duration = settings.duration;
        Ok(Self {
            establishment,
            segments,
            participants,
            settings,
            step: GameStep::AwaitingContactInfo,
            entry: None,
            wheel1: SpinController::new(duration),
            wheel2: SpinController::new(duration),
            winner1: false,
        })
    }

    pub fn step(&self) -> GameStep {
        self.step
    }

    pub fn establishment(&self) -> &Establishment {
        &self.establishment
    }

    pub fn segments(&self) -> &[crate::types::Segment] {
        self.segments.segments()
    }

    pub fn participant(&self) -> Option<&ParticipantEntry> {
        self.entry.as_ref()
    }

    fn transition(&mut self, to: GameStep) -> Result<(), FlowError> {
        if !is_valid_step_transition(self.step, to) {
            return Err(FlowError::InvalidTransition {
                from: self.step,
                to,
            });
        }
        self.step = to;
        Ok(())
    }

    fn require_step(&self, expected: GameStep) -> Result<(), FlowError> {
        if self.step != expected {
            return Err(FlowError::InvalidTransition {
                from: self.step,
                to: expected,
            });
        }
        Ok(())
    }

    /// Look up prior participation by email (case-insensitive) or phone
    /// (exact) and either block or admit the participant.
    ///
    /// A failed lookup is treated as "no prior entry": wrongly blocking a
    /// legitimate participant is the worse failure, so on store uncertainty
    /// participation is allowed and the incident logged.
    pub async fn submit_contact_info(
        &mut self,
        email: &str,
        phone: &str,
    ) -> Result<GameStep, FlowError> {
        self.require_step(GameStep::AwaitingContactInfo)?;

        let establishment_id = self.establishment.id.clone();
        let by_email = self
            .lookup(self.participants.find_by_email(&establishment_id, email).await, "email")
            .is_some();
        let by_phone = self
            .lookup(self.participants.find_by_phone(&establishment_id, phone).await, "phone")
            .is_some();

        if by_email || by_phone {
            self.transition(GameStep::AlreadyParticipated)?;
            tracing::info!(establishment = %self.establishment.slug, "Duplicate participation blocked");
            return Ok(self.step);
        }

        self.entry = Some(ParticipantEntry::new(
            establishment_id,
            email.to_string(),
            phone.to_string(),
        ));
        self.transition(GameStep::AwaitingReviewConfirmation)?;
        Ok(self.step)
    }

    fn lookup(
        &self,
        result: StoreResult<Option<ParticipantEntry>>,
        field: &str,
    ) -> Option<ParticipantEntry> {
        match result {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(field, error = %e, "Participant lookup failed, allowing participation");
                None
            }
        }
    }

    /// The review itself cannot be verified; this is a trust boundary.
    pub fn confirm_review(&mut self) -> Result<GameStep, FlowError> {
        self.transition(GameStep::SpinningWheel1)?;
        Ok(self.step)
    }

    /// Run wheel 1: outcome fixed at spin start, animation window awaited,
    /// partial entry persisted. A failed save is logged and does not roll
    /// back the step; the prize has already been shown.
    pub async fn spin_wheel1(&mut self) -> Result<SpinOutcome, FlowError> {
        self.require_step(GameStep::SpinningWheel1)?;

        let random_unit = self.settings.random_unit.clone();
        let outcome = self
            .wheel1
            .spin(&self.segments, || random_unit(), self.settings.sleeper.as_ref())
            .await?;

        if let Err(e) = self.complete_spin1(&outcome).await {
            tracing::warn!(error = %e, "Failed to persist spin 1, honoring prize anyway");
        }
        Ok(outcome)
    }

    /// Record the wheel-1 result and persist the partial entry. The caller
    /// has already verified the step, so the assignment cannot skip ahead.
    async fn complete_spin1(&mut self, outcome: &SpinOutcome) -> Result<(), StoreError> {
        self.winner1 = outcome.is_winner;
        self.step = GameStep::ShowingResult1;

        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };
        entry.wheel1_spun = true;
        entry.prize1 = Some(outcome.segment.title.clone());
        self.participants.save(entry.clone()).await
    }

    /// Policy: the bonus wheel is offered to wheel-1 winners only, and only
    /// when the establishment has it enabled.
    pub fn proceed_from_result1(&mut self) -> Result<GameStep, FlowError> {
        self.require_step(GameStep::ShowingResult1)?;

        if self.winner1 && self.establishment.bonus_wheel_enabled {
            self.transition(GameStep::AwaitingInstagramFollow)?;
        } else {
            self.transition(GameStep::Finished)?;
        }
        Ok(self.step)
    }

    /// Same trust boundary as the review step: the follow is not verified.
    pub fn confirm_instagram_follow(&mut self) -> Result<GameStep, FlowError> {
        self.transition(GameStep::SpinningWheel2)?;
        Ok(self.step)
    }

    /// Run the bonus wheel and update the persisted entry.
    pub async fn spin_wheel2(&mut self) -> Result<SpinOutcome, FlowError> {
        self.require_step(GameStep::SpinningWheel2)?;

        let random_unit = self.settings.random_unit.clone();
        let outcome = self
            .wheel2
            .spin(&self.segments, || random_unit(), self.settings.sleeper.as_ref())
            .await?;

        if let Err(e) = self.complete_spin2(&outcome).await {
            tracing::warn!(error = %e, "Failed to persist spin 2, honoring prize anyway");
        }
        Ok(outcome)
    }

    /// Record the wheel-2 result and update the persisted entry.
    async fn complete_spin2(&mut self, outcome: &SpinOutcome) -> Result<(), StoreError> {
        self.step = GameStep::ShowingResult2;

        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };
        entry.wheel2_spun = true;
        entry.prize2 = Some(outcome.segment.title.clone());
        self.participants.save(entry.clone()).await
    }

    /// End the session from either result screen.
    pub fn finish(&mut self) -> Result<GameStep, FlowError> {
        self.transition(GameStep::Finished)?;
        Ok(self.step)
    }
}
