//! Message catalogue exchanged between the page, background and UI contexts.
//!
//! Requests are tagged by `action`, replies by `status`, matching the wire
//! shapes the UI surface renders. Every cross-context value is owned; a
//! message moves by value into the receiving context.

use serde::{Deserialize, Serialize};

use crate::messaging::transport::Endpoint;
use crate::models::bid::BidPayload;
use crate::models::generation::{ErrorKind, PipelineError};
use crate::models::job::{JobDetails, ProjectBudget};

pub type PageEndpoint = Endpoint<PageRequest, PageReply>;
pub type BackgroundEndpoint = Endpoint<BackgroundRequest, BackgroundReply>;

/// Requests handled by the page-injected context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    Ping,
    ExtractAndGenerate,
    ExtractOnly,
    #[serde(rename_all = "camelCase")]
    InsertBid {
        bid_payload: BidPayload,
    },
    InsertClarifyingQuestions {
        text: String,
    },
}

/// Requests handled by the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundRequest {
    /// The extracted job, spread into the message body.
    GenerateProposal {
        #[serde(flatten)]
        job: JobDetails,
    },
    GenerateClarifyingQuestions {
        description: String,
    },
}

/// A generated proposal together with the extracted values the UI pre-fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReply {
    pub proposal: String,
    pub bid_amount: Option<f64>,
    pub delivery_time: Option<u32>,
    pub extracted_project_budget: ProjectBudget,
}

impl ProposalReply {
    pub fn new(proposal: String, job: &JobDetails) -> Self {
        Self {
            proposal,
            bid_amount: job.bid_amount,
            delivery_time: job.delivery_time_days,
            extracted_project_budget: job.project_budget.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PageReply {
    Alive,
    #[serde(rename = "success")]
    Extracted(JobDetails),
    #[serde(rename = "success")]
    Proposal(ProposalReply),
    #[serde(rename = "success")]
    Done { message: String },
    Error { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BackgroundReply {
    #[serde(rename = "success")]
    Proposal(ProposalReply),
    #[serde(rename = "success")]
    Questions { questions: String },
    Error { kind: ErrorKind, message: String },
}

impl From<PipelineError> for PageReply {
    fn from(err: PipelineError) -> Self {
        PageReply::Error {
            kind: err.kind,
            message: err.message,
        }
    }
}

impl From<PipelineError> for BackgroundReply {
    fn from(err: PipelineError) -> Self {
        BackgroundReply::Error {
            kind: err.kind,
            message: err.message,
        }
    }
}

impl PageReply {
    /// Turns a reply that is not the one the caller asked for into an error.
    pub fn into_error(self) -> PipelineError {
        match self {
            PageReply::Error { kind, message } => PipelineError::new(kind, message),
            other => unexpected_reply("page", &other),
        }
    }
}

impl BackgroundReply {
    pub fn into_error(self) -> PipelineError {
        match self {
            BackgroundReply::Error { kind, message } => PipelineError::new(kind, message),
            other => unexpected_reply("background", &other),
        }
    }
}

fn unexpected_reply(context: &str, reply: &impl std::fmt::Debug) -> PipelineError {
    tracing::warn!("Unexpected reply from {context} context: {reply:?}");
    PipelineError::new(
        ErrorKind::Unknown,
        format!("Unexpected reply from the {context} context"),
    )
}
