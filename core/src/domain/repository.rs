// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Incident Store (C5) repository contract. Grounded on
// `domain::repository::AgentRepository` from the orchestrator lineage:
// one narrow async trait, one error enum shared by every backend.

use crate::domain::incident::{Incident, IncidentId};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("incident '{0}' not found")]
    NotFound(IncidentId),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn create(&self, incident: Incident) -> Result<(), RepositoryError>;
    async fn save(&self, incident: Incident) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: IncidentId) -> Result<Incident, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Incident>, RepositoryError>;
}
