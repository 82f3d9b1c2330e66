//! Shared test fixtures for the messaging layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::messaging::protocol::{BackgroundEndpoint, BackgroundReply, BackgroundRequest};
use crate::messaging::transport::{listen, Handled, MessageHandler, INBOX_CAPACITY};

pub const PROJECT_PAGE: &str = r#"
    <html><body>
      <h1 class="ProjectViewDetails-title">Python scraper for product listings</h1>
      <div class="ProjectDescription">
        <p>Build a Python scraper using Selenium.</p>
        <p>Export results to CSV daily.</p>
      </div>
      <div class="ProjectViewDetailsSkills">
        <fl-tag>Python</fl-tag><fl-tag>Web Scraping</fl-tag>
      </div>
      <p class="ProjectViewDetails-budget">$250 - $750 USD</p>
      <form>
        <input id="bidAmountInput" value="400">
        <input id="periodInput" value="7">
        <textarea id="descriptionTextArea"></textarea>
      </form>
    </body></html>"#;

struct CannedBackground {
    reply: BackgroundReply,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MessageHandler for CannedBackground {
    type Request = BackgroundRequest;
    type Reply = BackgroundReply;

    async fn handle(&self, _request: BackgroundRequest) -> Handled<BackgroundReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Handled::Now(self.reply.clone())
    }
}

/// A background context that answers every request with `reply` and counts calls.
pub fn canned_background(reply: BackgroundReply, calls: Arc<AtomicUsize>) -> BackgroundEndpoint {
    listen(
        "background",
        Arc::new(CannedBackground { reply, calls }),
        INBOX_CAPACITY,
    )
}
