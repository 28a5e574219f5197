use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EstablishmentStore, ParticipantStore, SegmentStore, StoreResult};
use crate::types::{Establishment, ParticipantEntry, Segment, SegmentKind};

/// In-memory store backing all three persistence contracts.
///
/// Good enough for single-instance deployments and tests; a database-backed
/// implementation plugs in behind the same traits.
#[derive(Default)]
pub struct MemoryStore {
    establishments: RwLock<HashMap<String, Establishment>>,
    segments: RwLock<Vec<Segment>>,
    participants: RwLock<Vec<ParticipantEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the demo restaurant with its six-segment wheel if the store is
    /// empty. Idempotent.
    pub async fn seed_demo_data(&self) {
        let mut establishments = self.establishments.write().await;
        if !establishments.is_empty() {
            return;
        }

        let demo = Establishment {
            id: "demo-restaurant".to_string(),
            name: "Restaurant Demo".to_string(),
            slug: "demo-restaurant".to_string(),
            address: "123 Rue de la Gastronomie, Paris".to_string(),
            review_url: "https://www.google.com/maps".to_string(),
            instagram_url: Some("https://www.instagram.com".to_string()),
            primary_color: "#8b5cf6".to_string(),
            secondary_color: "#d946ef".to_string(),
            bonus_wheel_enabled: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        let establishment_id = demo.id.clone();
        establishments.insert(demo.id.clone(), demo);
        drop(establishments);

        let demo_wheel: [(&str, &str, SegmentKind, f64); 6] = [
            ("Boisson maison offerte", "#8b5cf6", SegmentKind::Prize, 25.0),
            ("Merci !", "#ec4899", SegmentKind::NoPrize, 20.0),
            ("Dessert offert", "#f59e0b", SegmentKind::Prize, 20.0),
            ("Merci !", "#10b981", SegmentKind::NoPrize, 15.0),
            ("Café offert", "#3b82f6", SegmentKind::Prize, 15.0),
            ("Merci !", "#ef4444", SegmentKind::NoPrize, 5.0),
        ];

        let mut segments = self.segments.write().await;
        for (order, (title, color, kind, weight)) in demo_wheel.into_iter().enumerate() {
            segments.push(Segment {
                id: format!("demo-{}", order + 1),
                establishment_id: establishment_id.clone(),
                title: title.to_string(),
                color: color.to_string(),
                kind,
                weight,
                order: order as u32,
            });
        }

        tracing::info!(slug = "demo-restaurant", "Seeded demo establishment");
    }
}

#[async_trait]
impl EstablishmentStore for MemoryStore {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Establishment>> {
        Ok(self.establishments.read().await.get(id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Establishment>> {
        Ok(self
            .establishments
            .read()
            .await
            .values()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Establishment>> {
        let mut all: Vec<Establishment> =
            self.establishments.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn save(&self, establishment: Establishment) -> StoreResult<()> {
        self.establishments
            .write()
            .await
            .insert(establishment.id.clone(), establishment);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.establishments.write().await.remove(id);
        self.segments
            .write()
            .await
            .retain(|s| s.establishment_id != id);
        self.participants
            .write()
            .await
            .retain(|p| p.establishment_id != id);
        Ok(())
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn load_segments(&self, establishment_id: &str) -> StoreResult<Vec<Segment>> {
        Ok(self
            .segments
            .read()
            .await
            .iter()
            .filter(|s| s.establishment_id == establishment_id)
            .cloned()
            .collect())
    }

    async fn replace_segments(
        &self,
        establishment_id: &str,
        new_segments: Vec<Segment>,
    ) -> StoreResult<()> {
        let mut segments = self.segments.write().await;
        segments.retain(|s| s.establishment_id != establishment_id);
        segments.extend(new_segments);
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn find_by_email(
        &self,
        establishment_id: &str,
        email: &str,
    ) -> StoreResult<Option<ParticipantEntry>> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .find(|p| {
                p.establishment_id == establishment_id && p.email.eq_ignore_ascii_case(email)
            })
            .cloned())
    }

    async fn find_by_phone(
        &self,
        establishment_id: &str,
        phone: &str,
    ) -> StoreResult<Option<ParticipantEntry>> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .find(|p| p.establishment_id == establishment_id && p.phone == phone)
            .cloned())
    }

    async fn save(&self, entry: ParticipantEntry) -> StoreResult<()> {
        let mut participants = self.participants.write().await;
        match participants.iter_mut().find(|p| p.id == entry.id) {
            Some(existing) => *existing = entry,
            None => participants.push(entry),
        }
        Ok(())
    }

    async fn list(&self, establishment_id: &str) -> StoreResult<Vec<ParticipantEntry>> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .filter(|p| p.establishment_id == establishment_id)
            .cloned()
            .collect())
    }
}
