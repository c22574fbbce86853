// Test doubles shared by the delivery, notification, and orchestration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::error::TransportError;
use crate::notify::{EventSink, NotificationEvent};
use crate::transport::{Transport, WireResponse};

/// One request as the mock transport saw it. `body` is `None` for GETs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub url: Url,
    pub body: Option<String>,
}

/// What the mock transport should do with the next exchanges.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScriptedReply {
    /// Respond with this status and body.
    Status(u16, &'static str),
    /// Fail below HTTP, as a refused connection would.
    ConnectionRefused,
}

/// Scripted transport: records every request and counts connection
/// open/close pairs so resource-safety tests can assert on them.
pub(crate) struct MockTransport {
    reply: Mutex<ScriptedReply>,
    requests: Mutex<Vec<RecordedRequest>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl MockTransport {
    pub fn new(reply: ScriptedReply) -> Self {
        Self {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
        }
    }

    /// Change the scripted reply for subsequent exchanges.
    pub fn script(&self, reply: ScriptedReply) {
        *self.reply.lock() = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn exchange(&self, request: RecordedRequest) -> Result<WireResponse, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        let result = match *self.reply.lock() {
            ScriptedReply::Status(status, body) => Ok(WireResponse {
                status,
                body: body.to_owned(),
            }),
            ScriptedReply::ConnectionRefused => {
                Err(TransportError::connect("connection refused"))
            }
        };
        // The real transport releases its connection on both paths.
        self.closed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_form(&self, url: &Url, body: String) -> Result<WireResponse, TransportError> {
        self.exchange(RecordedRequest {
            url: url.clone(),
            body: Some(body),
        })
    }

    async fn get(&self, url: &Url) -> Result<WireResponse, TransportError> {
        self.exchange(RecordedRequest {
            url: url.clone(),
            body: None,
        })
    }
}

/// Sink that captures every event it is asked to deliver.
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn trigger_event(&self, event: NotificationEvent) {
        self.events.lock().push(event);
    }
}
