// 🟢 GREEN Phase: Scripted transport harness for connection tests
// Drives the manager with synthetic lifecycle events, no real socket

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use auctionwatch_core::error::{RealtimeError, RealtimeResult};
use auctionwatch_core::transport::{Transport, TransportEvent, TransportLink};

enum ScriptedOutcome {
    Accept(MockLink),
    Refuse,
}

/// Transport whose connect attempts play back a script of outcomes
pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    opens: AtomicUsize,
}

/// Test-side handle to one scripted link
pub struct LinkHandle {
    /// Feed lifecycle events into the manager
    pub events: mpsc::UnboundedSender<TransportEvent>,
    /// Frames the manager transmitted over this link
    pub sent: Arc<Mutex<Vec<String>>>,
}

struct MockLink {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    loopback: mpsc::UnboundedSender<TransportEvent>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            opens: AtomicUsize::new(0),
        })
    }

    /// Script a successful connect attempt and return its handle
    pub fn queue_link(&self) -> LinkHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));

        let link = MockLink {
            events: rx,
            loopback: tx.clone(),
            sent: Arc::clone(&sent),
        };
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Accept(link));

        LinkHandle { events: tx, sent }
    }

    /// Script a refused connect attempt
    pub fn queue_refusal(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Refuse);
    }

    /// How many connect attempts the manager has made
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, _url: &str) -> RealtimeResult<Box<dyn TransportLink>> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedOutcome::Accept(link)) => Ok(Box::new(link)),
            Some(ScriptedOutcome::Refuse) | None => {
                Err(RealtimeError::connection_failed("connection refused"))
            }
        }
    }
}

#[async_trait]
impl TransportLink for MockLink {
    async fn transmit(&mut self, frame: String) -> RealtimeResult<()> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn next_event(&mut self) -> TransportEvent {
        self.events.recv().await.unwrap_or(TransportEvent::Closed)
    }

    async fn close(&mut self) {
        // an orderly close still surfaces as a Closed event
        let _ = self.loopback.send(TransportEvent::Closed);
    }
}

/// Poll until the condition holds. Works under paused time, where each
/// sleep auto-advances the clock.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..5000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
