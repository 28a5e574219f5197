use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type EstablishmentId = String;
pub type SegmentId = String;
pub type ParticipantId = String;
pub type SessionId = String;

/// The participant's position in the game funnel.
///
/// `AlreadyParticipated` and `Finished` are terminal; everything else has
/// one or two legal successors (see `flow::is_valid_step_transition`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStep {
    AwaitingContactInfo,
    AwaitingReviewConfirmation,
    SpinningWheel1,
    ShowingResult1,
    AwaitingInstagramFollow,
    SpinningWheel2,
    ShowingResult2,
    AlreadyParticipated,
    Finished,
}

/// Whether landing on a segment counts as a win.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    Prize,
    NoPrize,
}

/// One slice of the prize wheel.
///
/// `weight` is relative probability mass; weights need not sum to 100,
/// selection normalizes by the total. `order` is the angular slot on the
/// physical wheel. `color` is presentation-only and passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub establishment_id: EstablishmentId,
    pub title: String,
    pub color: String,
    pub kind: SegmentKind,
    pub weight: f64,
    pub order: u32,
}

/// The tenant owning a wheel configuration and its participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub id: EstablishmentId,
    pub name: String,
    pub slug: String,
    pub address: String,
    /// Where the review step sends the participant. Not interpreted here.
    pub review_url: String,
    pub instagram_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    /// Whether wheel-1 winners are offered the Instagram bonus wheel.
    pub bonus_wheel_enabled: bool,
    pub created_at: String,
}

/// One end-user's play-through, uniquely constrained by email/phone per
/// establishment. Created in memory after the duplicate check passes,
/// persisted after spin 1, updated after spin 2. Never deleted by the flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub id: ParticipantId,
    pub establishment_id: EstablishmentId,
    pub email: String,
    pub phone: String,
    pub wheel1_spun: bool,
    pub wheel2_spun: bool,
    pub prize1: Option<String>,
    pub prize2: Option<String>,
    pub created_at: String,
}

impl ParticipantEntry {
    pub fn new(establishment_id: EstablishmentId, email: String, phone: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            establishment_id,
            email,
            phone,
            wheel1_spun: false,
            wheel2_spun: false,
            prize1: None,
            prize2: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Result of one spin. The outcome is fixed at spin start; the rotation value
/// only exists so the presentation layer can animate toward it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub segment: Segment,
    pub final_rotation_degrees: f64,
    pub is_winner: bool,
}

impl SpinOutcome {
    pub fn new(segment: Segment, final_rotation_degrees: f64) -> Self {
        let is_winner = segment.kind == SegmentKind::Prize;
        Self {
            segment,
            final_rotation_degrees,
            is_winner,
        }
    }
}

/// Generate a URL-friendly slug from an establishment name.
/// Non-alphanumeric runs collapse to single hyphens; leading and trailing
/// hyphens are stripped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(kind: SegmentKind) -> Segment {
        Segment {
            id: "1".to_string(),
            establishment_id: "e1".to_string(),
            title: "Dessert offert".to_string(),
            color: "#f59e0b".to_string(),
            kind,
            weight: 20.0,
            order: 0,
        }
    }

    #[test]
    fn test_outcome_winner_derived_from_kind() {
        let outcome = SpinOutcome::new(segment(SegmentKind::Prize), 2430.0);
        assert!(outcome.is_winner);

        let outcome = SpinOutcome::new(segment(SegmentKind::NoPrize), 2430.0);
        assert!(!outcome.is_winner);
    }

    #[test]
    fn test_segment_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&SegmentKind::Prize).unwrap(),
            "\"prize\""
        );
        assert_eq!(
            serde_json::to_string(&SegmentKind::NoPrize).unwrap(),
            "\"no-prize\""
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Restaurant Demo"), "restaurant-demo");
        assert_eq!(slugify("  Chez   Marcel!  "), "chez-marcel");
        assert_eq!(slugify("---"), "");
    }
}
