// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Incident Store (C5) repository implementations. Grounded directly on
// `infrastructure::repositories::InMemoryAgentRepository`: an
// `Arc<RwLock<HashMap<Id, Entity>>>` with one lock acquisition per
// operation, returning owned clones so callers never hold a live
// reference into the store.

use crate::domain::incident::{Incident, IncidentId};
use crate::domain::repository::{IncidentRepository, RepositoryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryIncidentRepository {
    incidents: Arc<RwLock<HashMap<IncidentId, Incident>>>,
}

impl InMemoryIncidentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IncidentRepository for InMemoryIncidentRepository {
    async fn create(&self, incident: Incident) -> Result<(), RepositoryError> {
        self.incidents.write().await.insert(incident.id, incident);
        Ok(())
    }

    async fn save(&self, incident: Incident) -> Result<(), RepositoryError> {
        self.incidents.write().await.insert(incident.id, incident);
        Ok(())
    }

    async fn find_by_id(&self, id: IncidentId) -> Result<Incident, RepositoryError> {
        self.incidents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn list_all(&self) -> Result<Vec<Incident>, RepositoryError> {
        Ok(self.incidents.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let repo = InMemoryIncidentRepository::new();
        let incident = Incident::new_pending("pod crashlooping".to_string());
        let id = incident.id;
        repo.create(incident).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap();
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn find_missing_returns_not_found() {
        let repo = InMemoryIncidentRepository::new();
        let err = repo.find_by_id(IncidentId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_all_returns_every_incident() {
        let repo = InMemoryIncidentRepository::new();
        repo.create(Incident::new_pending("a".to_string())).await.unwrap();
        repo.create(Incident::new_pending("b".to_string())).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn save_overwrites_existing_entry() {
        let repo = InMemoryIncidentRepository::new();
        let mut incident = Incident::new_pending("pod crashlooping".to_string());
        let id = incident.id;
        repo.create(incident.clone()).await.unwrap();

        incident.transition(crate::domain::incident::IncidentStatus::InProgress, None).unwrap();
        repo.save(incident).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap();
        assert_eq!(found.status, crate::domain::incident::IncidentStatus::InProgress);
    }
}
