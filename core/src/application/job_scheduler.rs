// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Job Scheduler (C6). Grounded directly on the orchestrator lineage's
// `StandardExecutionService::start_execution`: persist a pending record,
// return its id immediately, then drive the actual work in a spawned
// task that reports its outcome back onto the same record. A semaphore
// bounds how many investigations may run concurrently at once (SPEC_FULL
// §5 addition), matching the teacher's worker-pool posture without
// inheriting its container-runtime machinery.

use crate::application::incident_service::IncidentService;
use crate::application::investigation_runner::InvestigationRunner;
use crate::domain::incident::{IncidentId, IncidentStatus};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("submission rejected: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct JobScheduler {
    incidents: IncidentService,
    runner: Arc<InvestigationRunner>,
    concurrency: Arc<Semaphore>,
    tools_ready: bool,
    llm_key_present: bool,
}

impl JobScheduler {
    /// `max_concurrent` of `None` means effectively unbounded. `tools_ready`
    /// and `llm_key_present` reflect the readiness of the tool registry and
    /// LLM provider at construction time (SPEC_FULL §4.6(1)/§6): a scheduler
    /// built with either false will reject new submissions with
    /// `SchedulerError::Unavailable` instead of queuing work it cannot do.
    pub fn new(
        incidents: IncidentService,
        runner: Arc<InvestigationRunner>,
        max_concurrent: Option<usize>,
        tools_ready: bool,
        llm_key_present: bool,
    ) -> Self {
        Self {
            incidents,
            runner,
            concurrency: Arc::new(Semaphore::new(max_concurrent.unwrap_or(usize::MAX >> 1))),
            tools_ready,
            llm_key_present,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.tools_ready && self.llm_key_present
    }

    pub fn tools_ready(&self) -> bool {
        self.tools_ready
    }

    pub fn llm_key_present(&self) -> bool {
        self.llm_key_present
    }

    /// Submits a new incident for investigation: persists it as pending,
    /// returns its id, and spawns the background investigation. The
    /// caller observes progress only by polling `IncidentService::get`.
    /// Rejects the submission up front if the tool registry never
    /// connected or no LLM key was configured, rather than accepting work
    /// the scheduler already knows it cannot complete.
    pub async fn submit(&self, description: String) -> Result<IncidentId, SchedulerError> {
        if !self.tools_ready {
            return Err(SchedulerError::Unavailable(
                "tool registry is not initialized".to_string(),
            ));
        }
        if !self.llm_key_present {
            return Err(SchedulerError::Unavailable(
                "no llm api key is configured".to_string(),
            ));
        }

        let id = self
            .incidents
            .submit(description)
            .await
            .map_err(anyhow::Error::from)?;

        let incidents = self.incidents.clone();
        let runner = self.runner.clone();
        let concurrency = self.concurrency.clone();

        let span = tracing::info_span!("investigation", correlation_id = %id);
        tokio::spawn(
            async move {
                let _permit = match concurrency.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                let mut incident = match incidents.get(id).await {
                    Ok(incident) => incident,
                    Err(err) => {
                        tracing::error!(incident_id = %id, error = %err, "failed to load incident for investigation");
                        return;
                    }
                };

                if let Err(err) = incident.transition(IncidentStatus::InProgress, None) {
                    tracing::error!(incident_id = %id, error = %err, "could not mark incident in_progress");
                    return;
                }
                if let Err(err) = incidents.save(incident.clone()).await {
                    tracing::error!(incident_id = %id, error = %err, "failed to persist in_progress transition");
                    return;
                }

                match runner.run(&mut incident).await {
                    Ok(()) => {
                        tracing::info!(incident_id = %id, status = ?incident.status, "investigation finished");
                    }
                    Err(err) => {
                        tracing::warn!(incident_id = %id, error = %err, "investigation runner returned an error");
                        if incident
                            .transition(IncidentStatus::Failed, Some(err.to_string()))
                            .is_err()
                        {
                            tracing::error!(incident_id = %id, "incident already in a terminal state, dropping error transition");
                        }
                    }
                }

                if let Err(err) = incidents.save(incident).await {
                    tracing::error!(incident_id = %id, error = %err, "failed to persist final incident state");
                }
            }
            .instrument(span),
        );

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agent_graph::AgentGraph;
    use crate::domain::llm::{
        FinishReason, GenerationOptions, GenerationResponse, LlmError, LlmProvider, TokenUsage,
    };
    use crate::domain::mcp::{McpError, Tool, ToolPolicy, ToolRegistry};
    use crate::domain::message::Message;
    use crate::domain::retry::RetryPolicy;
    use crate::infrastructure::InMemoryIncidentRepository;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::sleep;

    struct StallingLlm;

    #[async_trait]
    impl LlmProvider for StallingLlm {
        async fn generate(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<GenerationResponse, LlmError> {
            sleep(Duration::from_secs(10)).await;
            Ok(GenerationResponse {
                content: "too slow to matter".to_string(),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: TokenUsage::default(),
                model: "test-model".to_string(),
            })
        }

        fn name(&self) -> &str {
            "stalling"
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolRegistry for NoTools {
        async fn list_tools(&self) -> Vec<Tool> {
            Vec::new()
        }

        async fn invoke(&self, name: &str, _arguments: serde_json::Value) -> Result<String, McpError> {
            Err(McpError::ToolNotFound {
                server: "none".to_string(),
                tool: name.to_string(),
            })
        }

        fn server_status(&self, _server: &str) -> Option<crate::domain::mcp::ToolServerStatus> {
            None
        }
    }

    fn stalling_runner() -> Arc<InvestigationRunner> {
        let graph = AgentGraph::new(
            Arc::new(StallingLlm),
            Arc::new(NoTools),
            ToolPolicy::default(),
            RetryPolicy::default(),
        );
        Arc::new(InvestigationRunner::new(graph, 5, Duration::from_millis(50)))
    }

    #[tokio::test]
    async fn rejects_submission_when_tools_not_ready() {
        let incidents = IncidentService::new(Arc::new(InMemoryIncidentRepository::new()));
        let scheduler = JobScheduler::new(incidents, stalling_runner(), None, false, true);
        let err = scheduler.submit("pod crashlooping".to_string()).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn rejects_submission_when_llm_key_absent() {
        let incidents = IncidentService::new(Arc::new(InMemoryIncidentRepository::new()));
        let scheduler = JobScheduler::new(incidents, stalling_runner(), None, true, false);
        let err = scheduler.submit("pod crashlooping".to_string()).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn timed_out_investigation_reports_a_recognizable_message() {
        let incidents = IncidentService::new(Arc::new(InMemoryIncidentRepository::new()));
        let scheduler = JobScheduler::new(incidents.clone(), stalling_runner(), None, true, true);

        let id = scheduler.submit("everything is slow".to_string()).await.unwrap();

        let incident = loop {
            let incident = incidents.get(id).await.unwrap();
            if incident.status == IncidentStatus::Failed {
                break incident;
            }
            sleep(Duration::from_millis(20)).await;
        };

        let message = incident.error_message.expect("failed incident carries a message");
        assert!(message.to_lowercase().contains("timeout"));
    }
}
