// 🟢 GREEN Phase: Production-ready connection manager
// Owns the single live link, the reconnect timer and the observable state

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use super::state_machine::{ConnectionEvent, ConnectionState, ConnectionStateMachine, Directive};
use crate::config::RealtimeConfig;
use crate::protocol::{decode_frame, encode_frame};
use crate::transport::{Transport, TransportEvent, TransportLink, WebSocketTransport};

/// Commands posted from the public surface into the event loop
enum Command {
    Connect,
    Disconnect,
    Send(String),
}

/// Manages one logical realtime connection to the backend.
///
/// At most one transport link is live at a time. All lifecycle events,
/// commands and the reconnect timer are handled by a single event-loop
/// task, so no transition ever races another. `connect`, `disconnect`
/// and `send` return immediately and never raise; failures surface as
/// state transitions plus log diagnostics.
#[derive(Clone)]
pub struct ConnectionManager {
    command_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    message_rx: watch::Receiver<Option<Value>>,
}

impl ConnectionManager {
    /// Create a manager speaking WebSocket to the configured endpoint.
    ///
    /// Must be called from within a Tokio runtime; the event loop is
    /// spawned immediately, in the Disconnected state.
    pub fn new(config: RealtimeConfig) -> Self {
        let transport = WebSocketTransport::new(config.connect_timeout);
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a manager over an injected transport
    pub fn with_transport(config: RealtimeConfig, transport: Arc<dyn Transport>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (message_tx, message_rx) = watch::channel(None);

        let event_loop = EventLoop {
            config,
            transport,
            machine: ConnectionStateMachine::new(),
            link: None,
            retry_deadline: None,
            state_tx,
            message_tx,
        };
        tokio::spawn(event_loop.run(command_rx));

        Self {
            command_tx,
            state_rx,
            message_rx,
        }
    }

    /// Establish the connection. No-op while a link already exists.
    pub fn connect(&self) {
        let _ = self.command_tx.send(Command::Connect);
    }

    /// Request an orderly close. Suppresses the automatic reconnect.
    pub fn disconnect(&self) {
        let _ = self.command_tx.send(Command::Disconnect);
    }

    /// Send a payload if the connection is open.
    ///
    /// The payload is serialized here, at the boundary. While not
    /// connected the message is logged and dropped; delivery is never
    /// guaranteed to the caller.
    pub fn send<T: Serialize>(&self, payload: &T) {
        match encode_frame(payload) {
            Ok(frame) => {
                let _ = self.command_tx.send(Command::Send(frame));
            }
            Err(e) => warn!("Dropping outbound message: {}", e),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Most recently decoded inbound message, None before the first one.
    ///
    /// Overwrite-only: a consumer that polls too slowly misses
    /// intermediate messages.
    pub fn last_message(&self) -> Option<Value> {
        self.message_rx.borrow().clone()
    }

    /// Subscribe to connection state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Subscribe to inbound messages (latest value only)
    pub fn watch_messages(&self) -> watch::Receiver<Option<Value>> {
        self.message_rx.clone()
    }
}

static SHARED: OnceLock<ConnectionManager> = OnceLock::new();

/// Process-wide default manager, configured from the environment.
///
/// Convenience layer only; independent managers can always be built
/// through [`ConnectionManager::new`]. Must first be called from within
/// a Tokio runtime.
pub fn shared() -> &'static ConnectionManager {
    SHARED.get_or_init(|| ConnectionManager::new(RealtimeConfig::from_env()))
}

/// The single task that owns the link and drives the state machine
struct EventLoop {
    config: RealtimeConfig,
    transport: Arc<dyn Transport>,
    machine: ConnectionStateMachine,
    link: Option<Box<dyn TransportLink>>,
    retry_deadline: Option<Instant>,
    state_tx: watch::Sender<ConnectionState>,
    message_tx: watch::Sender<Option<Value>>,
}

impl EventLoop {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Connect) => {
                        self.dispatch(ConnectionEvent::ConnectRequested).await;
                    }
                    Some(Command::Disconnect) => {
                        self.dispatch(ConnectionEvent::DisconnectRequested).await;
                    }
                    Some(Command::Send(frame)) => self.handle_send(frame).await,
                    // every handle dropped, tear the loop down
                    None => break,
                },
                event = next_link_event(&mut self.link) => {
                    self.handle_transport_event(event).await;
                }
                _ = wait_for_deadline(self.retry_deadline) => {
                    self.retry_deadline = None;
                    debug!("Reconnect timer elapsed");
                    self.dispatch(ConnectionEvent::RetryElapsed).await;
                }
            }
        }

        if let Some(mut link) = self.link.take() {
            link.close().await;
        }
        debug!("Connection manager event loop stopped");
    }

    /// Apply an event to the state machine and execute its directives.
    ///
    /// Directives may feed follow-up events (a failed open behaves like
    /// an error followed by a close), so this drains a queue rather than
    /// recursing.
    async fn dispatch(&mut self, event: ConnectionEvent) {
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let directives = self.machine.apply(event);
            self.publish_state();

            for directive in directives {
                match directive {
                    Directive::OpenTransport => self.open_transport(&mut pending).await,
                    Directive::CloseTransport => {
                        if let Some(link) = self.link.as_mut() {
                            link.close().await;
                        }
                    }
                    Directive::ArmRetry => self.arm_retry(),
                    Directive::CancelRetry => self.retry_deadline = None,
                }
            }
        }

        self.publish_state();
    }

    async fn open_transport(&mut self, pending: &mut VecDeque<ConnectionEvent>) {
        match self.transport.open(&self.config.endpoint).await {
            Ok(link) => {
                self.link = Some(link);
                pending.push_back(ConnectionEvent::TransportOpened);
            }
            Err(e) => {
                error!("Transport connect failed: {}", e);
                // no link was created, synthesize the error/close pair
                pending.push_back(ConnectionEvent::TransportFailed(e.to_string()));
                pending.push_back(ConnectionEvent::TransportClosed);
            }
        }
    }

    fn arm_retry(&mut self) {
        match self.config.retry.delay_for(self.machine.failed_attempts()) {
            Some(delay) => {
                info!("Scheduling reconnect in {:?}", delay);
                self.retry_deadline = Some(Instant::now() + delay);
            }
            None => warn!("Reconnect attempts exhausted, staying disconnected"),
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(text) => self.handle_frame(&text),
            TransportEvent::Failed(reason) => {
                self.dispatch(ConnectionEvent::TransportFailed(reason)).await;
            }
            TransportEvent::Closed => {
                self.link = None;
                self.dispatch(ConnectionEvent::TransportClosed).await;
            }
        }
    }

    fn handle_frame(&mut self, raw: &str) {
        match decode_frame(raw) {
            Ok(value) => {
                debug!("Received frame: {} bytes", raw.len());
                let _ = self.message_tx.send(Some(value));
            }
            // malformed frames are dropped, the previous message stands
            Err(e) => warn!("Discarding inbound frame: {}", e),
        }
    }

    async fn handle_send(&mut self, frame: String) {
        if self.machine.state() != ConnectionState::Connected {
            warn!("Cannot send message, connection is not open");
            return;
        }

        let Some(link) = self.link.as_mut() else {
            warn!("Cannot send message, connection is not open");
            return;
        };

        if let Err(e) = link.transmit(frame).await {
            // the read side will surface the failure as a close
            warn!("Failed to transmit frame: {}", e);
        }
    }

    fn publish_state(&self) {
        let state = self.machine.state();
        if *self.state_tx.borrow() != state {
            let _ = self.state_tx.send(state);
        }
    }
}

/// Resolves to the next link event, or never when no link is live
async fn next_link_event(link: &mut Option<Box<dyn TransportLink>>) -> TransportEvent {
    match link.as_mut() {
        Some(link) => link.next_event().await,
        None => std::future::pending().await,
    }
}

/// Resolves at the deadline, or never when no timer is armed
async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
