//! In-process request/response transport between contexts.
//!
//! Each context is a tokio task reading its inbox sequentially. A request
//! carries a oneshot reply channel. A handler answers immediately
//! (`Handled::Now`) or hands back a future (`Handled::Later`) that the
//! listener spawns; the reply channel stays open until that future resolves.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::models::generation::{ErrorKind, PipelineError};

pub const INBOX_CAPACITY: usize = 32;

pub struct Envelope<Req, Rep> {
    pub request: Req,
    pub reply: oneshot::Sender<Rep>,
}

/// Sending half of a context's inbox.
pub struct Endpoint<Req, Rep> {
    name: &'static str,
    tx: mpsc::Sender<Envelope<Req, Rep>>,
}

// Derived Clone would require Req: Clone and Rep: Clone.
impl<Req, Rep> Clone for Endpoint<Req, Rep> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<Req, Rep> fmt::Debug for Endpoint<Req, Rep> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Creates an inbox without serving it. `listen` is the usual entry point.
pub fn channel<Req, Rep>(
    name: &'static str,
    capacity: usize,
) -> (Endpoint<Req, Rep>, mpsc::Receiver<Envelope<Req, Rep>>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Endpoint { name, tx }, rx)
}

impl<Req: Send + 'static, Rep: Send + 'static> Endpoint<Req, Rep> {
    /// Sends `request` and waits for the reply.
    ///
    /// Any transport failure (no listener, listener gone, reply dropped or
    /// `timeout` elapsed) resolves to `TransportUnavailable`.
    pub async fn request(&self, request: Req, timeout: Option<Duration>) -> Result<Rep, PipelineError> {
        let round_trip = async {
            let (reply_tx, reply_rx) = oneshot::channel();
            self.tx
                .send(Envelope {
                    request,
                    reply: reply_tx,
                })
                .await
                .map_err(|_| "no listener")?;
            reply_rx.await.map_err(|_| "request dropped without a reply")
        };

        let outcome = match timeout {
            Some(limit) => tokio::time::timeout(limit, round_trip)
                .await
                .unwrap_or(Err("timed out")),
            None => round_trip.await,
        };

        outcome.map_err(|reason| {
            debug!("{} context unavailable: {reason}", self.name);
            PipelineError::of(ErrorKind::TransportUnavailable)
        })
    }
}

pub enum Handled<Rep> {
    Now(Rep),
    /// Work continues after `handle` returns; the reply is sent when it resolves.
    Later(BoxFuture<'static, Rep>),
}

#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    type Request: Send + 'static;
    type Reply: Send + 'static;

    async fn handle(&self, request: Self::Request) -> Handled<Self::Reply>;
}

/// Spawns the listener task for `handler` and returns its endpoint.
///
/// The task ends once every clone of the endpoint has been dropped.
pub fn listen<H: MessageHandler>(
    name: &'static str,
    handler: Arc<H>,
    capacity: usize,
) -> Endpoint<H::Request, H::Reply> {
    let (endpoint, mut inbox) = channel(name, capacity);

    tokio::spawn(async move {
        while let Some(Envelope { request, reply }) = inbox.recv().await {
            match handler.handle(request).await {
                Handled::Now(response) => deliver(name, reply, response),
                Handled::Later(pending) => {
                    tokio::spawn(async move {
                        let response = pending.await;
                        deliver(name, reply, response);
                    });
                }
            }
        }
        info!("{name} listener stopped");
    });

    endpoint
}

fn deliver<Rep>(name: &str, reply: oneshot::Sender<Rep>, response: Rep) {
    if reply.send(response).is_err() {
        debug!("{name}: caller went away before the reply was ready; dropping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    struct Echo;

    #[async_trait]
    impl MessageHandler for Echo {
        type Request = (u64, &'static str);
        type Reply = String;

        async fn handle(&self, request: Self::Request) -> Handled<String> {
            let (delay_ms, text) = request;
            if delay_ms == 0 {
                Handled::Now(text.to_string())
            } else {
                Handled::Later(
                    async move {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        format!("later: {text}")
                    }
                    .boxed(),
                )
            }
        }
    }

    #[tokio::test]
    async fn test_now_and_later_replies() {
        let endpoint = listen("echo", Arc::new(Echo), INBOX_CAPACITY);
        assert_eq!(endpoint.request((0, "hi"), None).await.unwrap(), "hi");
        assert_eq!(endpoint.request((5, "hi"), None).await.unwrap(), "later: hi");
    }

    #[tokio::test]
    async fn test_later_work_does_not_block_the_inbox() {
        let endpoint = listen("echo", Arc::new(Echo), INBOX_CAPACITY);
        let slow = endpoint.clone();
        let slow = tokio::spawn(async move { slow.request((200, "slow"), None).await });
        tokio::task::yield_now().await;

        let fast = endpoint
            .request((0, "fast"), Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(fast, "fast");
        assert_eq!(slow.await.unwrap().unwrap(), "later: slow");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unserved_inbox_times_out_as_unavailable() {
        let (endpoint, _inbox) = channel::<(), ()>("page", 1);
        let err = endpoint
            .request((), Some(Duration::from_millis(1500)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportUnavailable);
    }

    #[tokio::test]
    async fn test_closed_inbox_is_unavailable() {
        let (endpoint, inbox) = channel::<(), ()>("page", 1);
        drop(inbox);
        let err = endpoint.request((), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportUnavailable);
    }

    #[tokio::test]
    async fn test_abandoned_request_does_not_disturb_listener() {
        let endpoint = listen("echo", Arc::new(Echo), INBOX_CAPACITY);
        let abandoned = endpoint.request((50, "gone"), Some(Duration::from_millis(1))).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(endpoint.request((0, "still here"), None).await.unwrap(), "still here");
    }
}
