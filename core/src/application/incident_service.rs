// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Read/write facade over the Incident Store (C5), independent of which
// repository backend is wired in. Grounded on the orchestrator lineage's
// thin application-layer services that sit directly in front of a
// repository trait object.

use crate::domain::incident::{Incident, IncidentId};
use crate::domain::repository::{IncidentRepository, RepositoryError};
use std::sync::Arc;

#[derive(Clone)]
pub struct IncidentService {
    repository: Arc<dyn IncidentRepository>,
}

impl IncidentService {
    pub fn new(repository: Arc<dyn IncidentRepository>) -> Self {
        Self { repository }
    }

    /// Creates and persists a new pending incident, returning its id.
    pub async fn submit(&self, description: String) -> Result<IncidentId, RepositoryError> {
        let incident = Incident::new_pending(description);
        let id = incident.id;
        self.repository.create(incident).await?;
        Ok(id)
    }

    pub async fn get(&self, id: IncidentId) -> Result<Incident, RepositoryError> {
        self.repository.find_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Incident>, RepositoryError> {
        self.repository.list_all().await
    }

    pub async fn save(&self, incident: Incident) -> Result<(), RepositoryError> {
        self.repository.save(incident).await
    }

    pub fn repository(&self) -> Arc<dyn IncidentRepository> {
        self.repository.clone()
    }
}
