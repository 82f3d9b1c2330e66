use serde::{Deserialize, Serialize};

use crate::models::generation::{ErrorKind, PipelineError};

/// Budget shown on the project page, with the range parsed out of the free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBudget {
    pub text: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Everything the page context could read about one job posting.
///
/// Built fresh per extraction and never mutated afterwards. Crosses context
/// boundaries by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub description: Option<String>,
    #[serde(default)]
    pub project_budget: ProjectBudget,
    pub bid_amount: Option<f64>,
    #[serde(rename = "deliveryTime")]
    pub delivery_time_days: Option<u32>,
}

impl JobDetails {
    /// Returns the description, or `ExtractionFailed` when the page yielded none.
    pub fn require_description(&self) -> Result<&str, PipelineError> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                PipelineError::new(
                    ErrorKind::ExtractionFailed,
                    "Could not find a job description on this page",
                )
            })
    }
}

/// A job whose description is known to be present.
///
/// The only input the prompt builders accept, so a record without a
/// description can never reach generation.
#[derive(Debug, Clone, Copy)]
pub struct ProposalContext<'a> {
    pub description: &'a str,
    pub job: &'a JobDetails,
}

impl<'a> ProposalContext<'a> {
    pub fn from_job(job: &'a JobDetails) -> Result<Self, PipelineError> {
        let description = job.require_description()?;
        Ok(Self { description, job })
    }
}
