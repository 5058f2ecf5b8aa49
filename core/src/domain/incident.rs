// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Incident Aggregate — Investigation Lifecycle (BC-1)
//
// The Incident is the central entity the whole system revolves around: a
// user-submitted production problem description, its investigation
// lifecycle, and whatever evidence/verdict the Agent Graph produced along
// the way. Modeled as a plain state machine in the style of
// `domain::execution::Execution` from the orchestrator lineage this crate
// descends from — append-only step log, explicit legal transitions,
// terminal states are a one-way door.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an incident, stable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub Uuid);

impl IncidentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an incident's investigation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl IncidentStatus {
    /// Whether this status is one of the two terminal states.
    pub fn is_terminal(self) -> bool {
        matches!(self, IncidentStatus::Completed | IncidentStatus::Failed)
    }

    /// Whether `self -> next` is a legal transition per the lifecycle in
    /// spec §4.5 (pending -> in_progress|completed|failed,
    /// in_progress -> completed|failed). Terminal states accept no further
    /// transitions.
    pub fn can_transition_to(self, next: IncidentStatus) -> bool {
        use IncidentStatus::*;
        match (self, next) {
            (Pending, InProgress) | (Pending, Completed) | (Pending, Failed) => true,
            (InProgress, Completed) | (InProgress, Failed) => true,
            _ => false,
        }
    }
}

/// Confidence level attached to a completed investigation's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// A single append-only entry in an incident's observability trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationStep {
    pub step_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: StepStatus,
    pub details: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
}

/// Record of a single tool call made during the investigation, independent
/// of whether it succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub args: Value,
    pub timestamp: DateTime<Utc>,
}

/// A piece of evidence collected from a tool response (or from the agent's
/// own analysis, `source = "agent_analysis"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedEvidence {
    pub source: String,
    pub args: Value,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The structured evidence bundle an investigation accumulates. Present in
/// partial form even on failed investigations (spec invariant: failed
/// investigations preserve whatever tool_calls/evidence were gathered
/// before the failure).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    pub tool_calls: Vec<ToolCallRecord>,
    pub collected_evidence: Vec<CollectedEvidence>,
    pub reasoning: Option<String>,
    pub recommendations: Vec<String>,
}

/// Entities the LLM lifted out of the free-text incident description
/// (pod name, namespace, etc). Open-ended — the LLM decides the keys.
pub type ExtractedEntities = serde_json::Map<String, Value>;

/// The Incident aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub description: String,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub evidence: Evidence,
    pub extracted_entities: Option<ExtractedEntities>,
    pub suggested_root_cause: Option<String>,
    pub confidence_score: Option<Confidence>,
    pub investigation_steps: Vec<InvestigationStep>,
    pub error_message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IncidentError {
    #[error("illegal status transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },
    #[error("failed status transition requires a non-empty error message")]
    MissingErrorMessage,
}

impl Incident {
    /// Creates a new pending incident with one `incident_created` step.
    /// Mirrors spec §4.5 `create_pending`.
    pub fn new_pending(description: String) -> Self {
        let now = Utc::now();
        let mut incident = Self {
            id: IncidentId::new(),
            description: description.clone(),
            status: IncidentStatus::Pending,
            created_at: now,
            completed_at: None,
            evidence: Evidence::default(),
            extracted_entities: None,
            suggested_root_cause: None,
            confidence_score: None,
            investigation_steps: Vec::new(),
            error_message: None,
        };
        incident.push_step(
            "incident_created",
            StepStatus::Completed,
            serde_json::json!({ "description": description }),
        );
        incident
    }

    /// Appends a step to the append-only observability trail. Existing
    /// entries are never mutated (invariant 4).
    pub fn push_step(&mut self, step_name: &str, status: StepStatus, details: Value) {
        self.investigation_steps.push(InvestigationStep {
            step_name: step_name.to_string(),
            timestamp: Utc::now(),
            status,
            details,
        });
    }

    /// Applies a status transition, enforcing legality (spec invariant 5),
    /// stamping `completed_at` on terminal transitions (invariant 2), and
    /// requiring an error message when transitioning to `failed`
    /// (invariant 3).
    pub fn transition(
        &mut self,
        next: IncidentStatus,
        error: Option<String>,
    ) -> Result<(), IncidentError> {
        if !self.status.can_transition_to(next) {
            return Err(IncidentError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        if next == IncidentStatus::Failed && error.as_deref().unwrap_or("").is_empty() {
            return Err(IncidentError::MissingErrorMessage);
        }

        let previous = self.status;
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        if next == IncidentStatus::Failed {
            self.error_message = error.clone();
        }

        self.push_step(
            "status_transition",
            StepStatus::Completed,
            serde_json::json!({ "from": format!("{:?}", previous), "to": format!("{:?}", next), "error": error }),
        );
        Ok(())
    }

    /// Applies the verdict produced by a completed investigation.
    pub fn apply_verdict(
        &mut self,
        root_cause: String,
        confidence: Confidence,
        evidence: Evidence,
        entities: Option<ExtractedEntities>,
    ) {
        self.suggested_root_cause = Some(root_cause);
        self.confidence_score = Some(confidence);
        self.evidence = evidence;
        self.extracted_entities = entities;
    }

    /// Preserves partial results gathered before a failure, without
    /// touching the terminal-state fields (those are set via `transition`).
    pub fn apply_partial_evidence(&mut self, evidence: Evidence, root_cause: Option<String>) {
        self.evidence = evidence;
        if root_cause.is_some() {
            self.suggested_root_cause = root_cause;
        }
    }
}
