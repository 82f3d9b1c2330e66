//! The UI context: one control session bound to one tab.
//!
//! Every request to the page is preceded by a liveness ping. At most one
//! generation runs per session; a second trigger while one is in flight is
//! rejected instead of queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::messaging::protocol::{
    BackgroundEndpoint, BackgroundReply, BackgroundRequest, PageEndpoint, PageReply, PageRequest,
    ProposalReply,
};
use crate::models::bid::BidPayload;
use crate::models::generation::{ErrorKind, PipelineError};
use crate::models::job::JobDetails;

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(1500);

pub struct UiSession {
    background: BackgroundEndpoint,
    ping_timeout: Duration,
    generating: AtomicBool,
}

/// Clears the in-flight flag when the generation (or its caller) finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl UiSession {
    pub fn new(background: BackgroundEndpoint, ping_timeout: Duration) -> Self {
        Self {
            background,
            ping_timeout,
            generating: AtomicBool::new(false),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    fn begin_generation(&self) -> Result<InFlight<'_>, PipelineError> {
        self.generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(&self.generating))
            .map_err(|_| PipelineError::of(ErrorKind::GenerationInProgress))
    }

    /// Pings the page. `None` means the content script was never injected.
    pub async fn ensure_alive<'p>(
        &self,
        page: Option<&'p PageEndpoint>,
    ) -> Result<&'p PageEndpoint, PipelineError> {
        let Some(page) = page else {
            warn!("No page listener registered");
            return Err(PipelineError::of(ErrorKind::TransportUnavailable));
        };
        match page.request(PageRequest::Ping, Some(self.ping_timeout)).await? {
            PageReply::Alive => Ok(page),
            other => {
                warn!("Ping answered with {other:?}");
                Err(PipelineError::of(ErrorKind::TransportUnavailable))
            }
        }
    }

    pub async fn extract_only(&self, page: Option<&PageEndpoint>) -> Result<JobDetails, PipelineError> {
        let page = self.ensure_alive(page).await?;
        match page.request(PageRequest::ExtractOnly, None).await? {
            PageReply::Extracted(job) => Ok(job),
            other => Err(other.into_error()),
        }
    }

    pub async fn extract_and_generate(
        &self,
        page: Option<&PageEndpoint>,
    ) -> Result<ProposalReply, PipelineError> {
        let _in_flight = self.begin_generation()?;
        let page = self.ensure_alive(page).await?;
        info!("Requesting proposal from page context");
        match page.request(PageRequest::ExtractAndGenerate, None).await? {
            PageReply::Proposal(proposal) => Ok(proposal),
            other => Err(other.into_error()),
        }
    }

    pub async fn insert_bid(
        &self,
        page: Option<&PageEndpoint>,
        bid_payload: BidPayload,
    ) -> Result<String, PipelineError> {
        let page = self.ensure_alive(page).await?;
        match page.request(PageRequest::InsertBid { bid_payload }, None).await? {
            PageReply::Done { message } => Ok(message),
            other => Err(other.into_error()),
        }
    }

    pub async fn insert_clarifying_questions(
        &self,
        page: Option<&PageEndpoint>,
        text: String,
    ) -> Result<String, PipelineError> {
        let page = self.ensure_alive(page).await?;
        match page
            .request(PageRequest::InsertClarifyingQuestions { text }, None)
            .await?
        {
            PageReply::Done { message } => Ok(message),
            other => Err(other.into_error()),
        }
    }

    /// Goes straight to the background; the page is not involved.
    pub async fn generate_clarifying_questions(
        &self,
        description: String,
    ) -> Result<String, PipelineError> {
        let _in_flight = self.begin_generation()?;
        match self
            .background
            .request(BackgroundRequest::GenerateClarifyingQuestions { description }, None)
            .await?
        {
            BackgroundReply::Questions { questions } => Ok(questions),
            other => Err(other.into_error()),
        }
    }
}
