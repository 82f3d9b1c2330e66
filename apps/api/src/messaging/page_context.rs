//! The page-injected context: owns one page load and answers page requests.
//!
//! A `PageContext` lives exactly as long as one page load. Re-injecting the
//! content script into the same load is a no-op after the first time; a reload
//! builds a new `PageContext` with its own guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::messaging::protocol::{
    BackgroundEndpoint, BackgroundReply, BackgroundRequest, PageEndpoint, PageReply, PageRequest,
};
use crate::messaging::transport::{listen, Handled, MessageHandler, INBOX_CAPACITY};
use crate::models::job::JobDetails;
use crate::page::document::{DomEvent, PageDocument};
use crate::page::extractor::extract_job_details;
use crate::page::form_writer::{append_to_proposal, snapshot_form, write_bid, FieldValue};
use crate::page::selectors::SelectorTable;

pub struct PageContext {
    url: String,
    loaded_at: DateTime<Utc>,
    document: Arc<Mutex<PageDocument>>,
    selectors: Arc<SelectorTable>,
    background: BackgroundEndpoint,
    listener_registered: AtomicBool,
    endpoint: OnceLock<PageEndpoint>,
}

impl PageContext {
    pub fn load(
        document: PageDocument,
        selectors: Arc<SelectorTable>,
        background: BackgroundEndpoint,
    ) -> Self {
        Self {
            url: document.url().to_string(),
            loaded_at: document.loaded_at(),
            document: Arc::new(Mutex::new(document)),
            selectors,
            background,
            listener_registered: AtomicBool::new(false),
            endpoint: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Runs the content script. Registers the message listener on the first
    /// call for this page load and returns whether it did.
    pub fn inject_content_script(&self) -> bool {
        if self.listener_registered.swap(true, Ordering::SeqCst) {
            debug!("Listener already registered for {}; skipping", self.url);
            return false;
        }

        let listener = PageListener {
            document: Arc::clone(&self.document),
            selectors: Arc::clone(&self.selectors),
            background: self.background.clone(),
        };
        let endpoint = listen("page", Arc::new(listener), INBOX_CAPACITY);
        if self.endpoint.set(endpoint).is_err() {
            warn!("Endpoint for {} was already set", self.url);
        }
        info!("Content script listener registered for {}", self.url);
        true
    }

    /// The page's message endpoint, if the content script has been injected.
    pub fn endpoint(&self) -> Option<PageEndpoint> {
        self.endpoint.get().cloned()
    }

    pub async fn source(&self) -> String {
        self.document.lock().await.source().to_string()
    }

    /// Writable field values and the notifications dispatched so far.
    pub async fn form_state(&self) -> (Vec<FieldValue>, Vec<DomEvent>) {
        let document = self.document.lock().await;
        (
            snapshot_form(&document, &self.selectors),
            document.events().to_vec(),
        )
    }
}

/// The registered message handler. Holds no reference back to `PageContext`,
/// so dropping the context on reload ends the listener task.
struct PageListener {
    document: Arc<Mutex<PageDocument>>,
    selectors: Arc<SelectorTable>,
    background: BackgroundEndpoint,
}

impl PageListener {
    async fn extract(&self) -> JobDetails {
        let document = self.document.lock().await;
        extract_job_details(&document, &self.selectors)
    }
}

#[async_trait]
impl MessageHandler for PageListener {
    type Request = PageRequest;
    type Reply = PageReply;

    async fn handle(&self, request: PageRequest) -> Handled<PageReply> {
        match request {
            PageRequest::Ping => Handled::Now(PageReply::Alive),

            PageRequest::ExtractOnly => {
                let job = self.extract().await;
                Handled::Now(match job.require_description() {
                    Ok(_) => PageReply::Extracted(job),
                    Err(e) => e.into(),
                })
            }

            PageRequest::ExtractAndGenerate => {
                let job = self.extract().await;
                if let Err(e) = job.require_description() {
                    warn!("Extraction failed; not forwarding to background: {e}");
                    return Handled::Now(e.into());
                }

                let background = self.background.clone();
                Handled::Later(
                    async move {
                        let request = BackgroundRequest::GenerateProposal { job };
                        match background.request(request, None).await {
                            Ok(BackgroundReply::Proposal(proposal)) => PageReply::Proposal(proposal),
                            Ok(other) => other.into_error().into(),
                            Err(e) => e.into(),
                        }
                    }
                    .boxed(),
                )
            }

            PageRequest::InsertBid { bid_payload } => {
                let mut document = self.document.lock().await;
                Handled::Now(match write_bid(&mut document, &self.selectors, bid_payload) {
                    Ok(report) => PageReply::Done {
                        message: report.summary(),
                    },
                    Err(e) => e.into(),
                })
            }

            PageRequest::InsertClarifyingQuestions { text } => {
                let mut document = self.document.lock().await;
                Handled::Now(match append_to_proposal(&mut document, &self.selectors, &text) {
                    Ok(_) => PageReply::Done {
                        message: "Questions inserted".to_string(),
                    },
                    Err(e) => e.into(),
                })
            }
        }
    }
}
