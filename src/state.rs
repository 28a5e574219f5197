use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::flow::{GameFlow, SpinSettings};
use crate::store::{EstablishmentStore, MemoryStore, ParticipantStore, SegmentStore};
use crate::types::SessionId;
use crate::wheel::WheelError;

/// Shared application state
///
/// Each participant session owns one `GameFlow` behind its own mutex, so
/// transitions within a session are strictly sequential while different
/// sessions never contend with each other.
#[derive(Clone)]
pub struct AppState {
    pub establishments: Arc<dyn EstablishmentStore>,
    pub segments: Arc<dyn SegmentStore>,
    pub participants: Arc<dyn ParticipantStore>,
    pub sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<GameFlow>>>>>,
    pub spin_settings: SpinSettings,
}

/// Why a session could not be created
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("establishment not found")]
    EstablishmentNotFound,

    #[error(transparent)]
    Wheel(#[from] WheelError),

    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl AppState {
    /// In-memory stores and production spin settings.
    pub fn new() -> Self {
        Self::with_settings(SpinSettings::from_env())
    }

    pub fn with_settings(spin_settings: SpinSettings) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), spin_settings)
    }

    /// Build on top of an existing store, e.g. one that was seeded first.
    pub fn with_store(store: Arc<MemoryStore>, spin_settings: SpinSettings) -> Self {
        Self {
            establishments: store.clone(),
            segments: store.clone(),
            participants: store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            spin_settings,
        }
    }

    /// Start a new play-through for the establishment behind `slug`.
    ///
    /// Fails before any session exists when the establishment is unknown or
    /// its wheel configuration is unspinnable.
    pub async fn create_session(
        &self,
        slug: &str,
    ) -> Result<(SessionId, Arc<Mutex<GameFlow>>), SessionError> {
        let establishment = self
            .establishments
            .get_by_slug(slug)
            .await?
            .ok_or(SessionError::EstablishmentNotFound)?;

        let segments = self.segments.load_segments(&establishment.id).await?;
        let flow = GameFlow::new(
            establishment,
            segments,
            self.participants.clone(),
            self.spin_settings.clone(),
        )?;

        let session_id = ulid::Ulid::new().to_string();
        let flow = Arc::new(Mutex::new(flow));
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), flow.clone());

        tracing::debug!(session = %session_id, slug, "Session created");
        Ok((session_id, flow))
    }

    pub async fn session(&self, id: &str) -> Option<Arc<Mutex<GameFlow>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session once its play-through is over or abandoned.
    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
