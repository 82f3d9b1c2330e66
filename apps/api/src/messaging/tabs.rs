//! Open tabs: each has a current page load and a UI session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::messaging::page_context::PageContext;
use crate::messaging::protocol::{BackgroundEndpoint, PageEndpoint};
use crate::messaging::ui::UiSession;
use crate::page::document::PageDocument;
use crate::page::selectors::SelectorTable;

pub struct Tab {
    pub id: Uuid,
    page: RwLock<Arc<PageContext>>,
    session: UiSession,
}

impl Tab {
    pub async fn page(&self) -> Arc<PageContext> {
        Arc::clone(&*self.page.read().await)
    }

    pub async fn page_endpoint(&self) -> Option<PageEndpoint> {
        self.page.read().await.endpoint()
    }

    pub fn session(&self) -> &UiSession {
        &self.session
    }
}

pub struct TabRegistry {
    tabs: RwLock<HashMap<Uuid, Arc<Tab>>>,
    background: BackgroundEndpoint,
    selectors: Arc<SelectorTable>,
    ping_timeout: Duration,
}

impl TabRegistry {
    pub fn new(
        background: BackgroundEndpoint,
        selectors: Arc<SelectorTable>,
        ping_timeout: Duration,
    ) -> Self {
        Self {
            tabs: RwLock::new(HashMap::new()),
            background,
            selectors,
            ping_timeout,
        }
    }

    fn load(&self, url: String, html: String, inject: bool) -> Arc<PageContext> {
        let ctx = PageContext::load(
            PageDocument::new(url, html),
            Arc::clone(&self.selectors),
            self.background.clone(),
        );
        if inject {
            ctx.inject_content_script();
        }
        Arc::new(ctx)
    }

    /// Opens a tab on `url`. With `inject`, the content script runs on load.
    pub async fn open(&self, url: String, html: String, inject: bool) -> Arc<Tab> {
        let tab = Arc::new(Tab {
            id: Uuid::new_v4(),
            page: RwLock::new(self.load(url, html, inject)),
            session: UiSession::new(self.background.clone(), self.ping_timeout),
        });
        info!("Opened tab {}", tab.id);
        self.tabs.write().await.insert(tab.id, Arc::clone(&tab));
        tab
    }

    /// Replaces the tab's page load. The previous load's listener stops once
    /// in-flight requests to it finish.
    pub async fn reload(&self, id: Uuid, html: Option<String>, inject: bool) -> Option<Arc<Tab>> {
        let tab = self.get(id).await?;
        let mut page = tab.page.write().await;
        let html = match html {
            Some(html) => html,
            None => page.source().await,
        };
        let url = page.url().to_string();
        *page = self.load(url, html, inject);
        info!("Reloaded tab {id}");
        drop(page);
        Some(tab)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Tab>> {
        self.tabs.read().await.get(&id).cloned()
    }

    pub async fn close(&self, id: Uuid) -> bool {
        let closed = self.tabs.write().await.remove(&id).is_some();
        if closed {
            info!("Closed tab {id}");
        }
        closed
    }

    pub async fn open_count(&self) -> usize {
        self.tabs.read().await.len()
    }
}
