//! Persistence contracts for establishments, wheel segments, and
//! participants.
//!
//! The game flow only ever talks to these traits; whether the backing store
//! is the bundled in-memory one or a remote database is invisible to it.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::types::{Establishment, ParticipantEntry, Segment};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{0} not found")]
    NotFound(String),
}

#[async_trait]
pub trait EstablishmentStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Establishment>>;
    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Establishment>>;
    async fn list(&self) -> StoreResult<Vec<Establishment>>;
    async fn save(&self, establishment: Establishment) -> StoreResult<()>;
    /// Deletes the establishment together with its segments and participants.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Segments for one establishment's wheel. Read-only from the game's
    /// perspective; validation into a spinnable set happens at the call site.
    async fn load_segments(&self, establishment_id: &str) -> StoreResult<Vec<Segment>>;
    async fn replace_segments(
        &self,
        establishment_id: &str,
        segments: Vec<Segment>,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Case-insensitive exact match on the email address.
    async fn find_by_email(
        &self,
        establishment_id: &str,
        email: &str,
    ) -> StoreResult<Option<ParticipantEntry>>;

    /// Exact match on the phone number.
    async fn find_by_phone(
        &self,
        establishment_id: &str,
        phone: &str,
    ) -> StoreResult<Option<ParticipantEntry>>;

    /// Insert or update by entry id.
    async fn save(&self, entry: ParticipantEntry) -> StoreResult<()>;

    async fn list(&self, establishment_id: &str) -> StoreResult<Vec<ParticipantEntry>>;
}
