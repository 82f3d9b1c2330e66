//! The background context: the only context with network access.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::generation::orchestrator::GenerationOrchestrator;
use crate::messaging::protocol::{BackgroundEndpoint, BackgroundReply, BackgroundRequest, ProposalReply};
use crate::messaging::transport::{listen, Handled, MessageHandler, INBOX_CAPACITY};
use crate::models::generation::GenerationResult;

pub struct BackgroundContext {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl BackgroundContext {
    /// Starts the background listener.
    pub fn spawn(orchestrator: Arc<GenerationOrchestrator>) -> BackgroundEndpoint {
        listen("background", Arc::new(Self { orchestrator }), INBOX_CAPACITY)
    }
}

#[async_trait]
impl MessageHandler for BackgroundContext {
    type Request = BackgroundRequest;
    type Reply = BackgroundReply;

    // Both requests make a provider call, so both answer later.
    async fn handle(&self, request: BackgroundRequest) -> Handled<BackgroundReply> {
        let orchestrator = Arc::clone(&self.orchestrator);
        match request {
            BackgroundRequest::GenerateProposal { job } => Handled::Later(
                async move {
                    match orchestrator.generate_proposal(&job).await {
                        GenerationResult::Success { text } => {
                            BackgroundReply::Proposal(ProposalReply::new(text, &job))
                        }
                        GenerationResult::Failure { kind, message } => {
                            BackgroundReply::Error { kind, message }
                        }
                    }
                }
                .boxed(),
            ),
            BackgroundRequest::GenerateClarifyingQuestions { description } => Handled::Later(
                async move {
                    match orchestrator.generate_clarifying_questions(&description).await {
                        GenerationResult::Success { text } => {
                            BackgroundReply::Questions { questions: text }
                        }
                        GenerationResult::Failure { kind, message } => {
                            BackgroundReply::Error { kind, message }
                        }
                    }
                }
                .boxed(),
            ),
        }
    }
}
