// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Investigation Runner (C4): wires one incident to one run of the Agent
// Graph, bounded by a deadline, and turns the outcome into the verdict
// and evidence recorded on the incident.

use crate::application::agent_graph::AgentGraph;
use crate::application::extraction::extract_verdict;
use crate::domain::graph::{GraphState, StopReason};
use crate::domain::incident::{Evidence, Incident, IncidentStatus};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an autonomous SRE investigating a production \
incident. Use the available tools to gather evidence, then close your final answer with:\n\
ROOT CAUSE: <one paragraph>\nCONFIDENCE: <high|medium|low>\nEVIDENCE: <summary>\n\
RECOMMENDATIONS:\n- <action>\n- <action>";

#[derive(Debug, thiserror::Error)]
pub enum InvestigationError {
    #[error("agent graph failed: {0}")]
    Graph(#[from] crate::application::agent_graph::AgentGraphError),
    #[error("investigation timeout: exceeded its deadline")]
    TimedOut,
}

pub struct InvestigationRunner {
    graph: AgentGraph,
    max_iterations: u32,
    deadline: Duration,
}

impl InvestigationRunner {
    pub fn new(graph: AgentGraph, max_iterations: u32, deadline: Duration) -> Self {
        Self {
            graph,
            max_iterations,
            deadline,
        }
    }

    /// Runs the full investigation for `incident`, mutating it in place
    /// with the resulting evidence and, on success, a verdict. Never
    /// returns `Err` for investigation-level failures (a failed tool call
    /// or iteration-limit stop is a valid, evidenced outcome) — `Err` is
    /// reserved for failures the caller must translate into
    /// `IncidentStatus::Failed` with an error message, per spec §4.4/§7.
    pub async fn run(&self, incident: &mut Incident) -> Result<(), InvestigationError> {
        let state = GraphState::new(
            DEFAULT_SYSTEM_PROMPT.to_string(),
            incident.description.clone(),
            self.max_iterations,
        );
        let cancel = CancellationToken::new();

        // Shared with the graph so that tool calls and collected evidence
        // gathered before a failure remain readable here even when the
        // graph's future is dropped outright by the timeout below, rather
        // than returning an `Err` it could carry evidence inside of.
        let evidence = Arc::new(Mutex::new(Evidence::default()));

        let outcome =
            match tokio::time::timeout(self.deadline, self.graph.run(state, &cancel, evidence.clone()))
                .await
            {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(graph_err)) => {
                    let partial = evidence.lock().unwrap().clone();
                    incident.apply_partial_evidence(partial, None);
                    return Err(InvestigationError::from(graph_err));
                }
                Err(_) => {
                    cancel.cancel();
                    let partial = evidence.lock().unwrap().clone();
                    incident.apply_partial_evidence(partial, None);
                    return Err(InvestigationError::TimedOut);
                }
            };

        let partial = evidence.lock().unwrap().clone();
        incident.apply_partial_evidence(partial.clone(), None);

        match (outcome.stop_reason, outcome.final_message) {
            (StopReason::FinalAnswer, Some(message)) => {
                let verdict = extract_verdict(message.text());
                let mut evidence = partial;
                evidence.reasoning = Some(message.text().to_string());
                evidence.recommendations = verdict.recommendations.clone();
                incident.apply_verdict(
                    verdict.root_cause,
                    verdict.confidence,
                    evidence,
                    None,
                );
                incident
                    .transition(IncidentStatus::Completed, None)
                    .expect("in_progress -> completed is always legal");
                Ok(())
            }
            (StopReason::IterationLimitReached, _) => {
                incident
                    .transition(
                        IncidentStatus::Failed,
                        Some("iteration limit reached without a final answer".to_string()),
                    )
                    .expect("in_progress -> failed is always legal");
                Ok(())
            }
            (StopReason::Cancelled, _) | (StopReason::TimedOut, _) => {
                Err(InvestigationError::TimedOut)
            }
            (StopReason::FinalAnswer, None) => unreachable!(
                "graph reports FinalAnswer only alongside the final message that produced it"
            ),
        }
    }
}
