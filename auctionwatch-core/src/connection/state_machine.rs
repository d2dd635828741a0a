// Connection state machine implementation
// Pure transition logic, driven by synthetic or real transport events

use tracing::{debug, info, warn};

/// Connection states
///
/// `Connected` holds exactly while the underlying link is open;
/// `Connecting` only covers the interval between a connect request and
/// the transport's open or error outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events that drive state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// `connect()` was called
    ConnectRequested,
    /// `disconnect()` was called
    DisconnectRequested,
    /// The transport finished its handshake
    TransportOpened,
    /// The transport reported an error; a close follows
    TransportFailed(String),
    /// The transport is gone, orderly or not
    TransportClosed,
    /// The reconnect timer fired
    RetryElapsed,
}

/// Side effects the manager must carry out after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Open a new transport link to the configured endpoint
    OpenTransport,
    /// Request an orderly close of the current link
    CloseTransport,
    /// Arm the reconnect timer
    ArmRetry,
    /// Disarm any pending reconnect timer
    CancelRetry,
}

/// Connection state machine
///
/// Owns the intentional-close flag: a close that was requested through
/// `disconnect()` never arms the reconnect timer, every other close does.
pub struct ConnectionStateMachine {
    state: ConnectionState,
    intentional_close: bool,
    failed_attempts: u32,
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            intentional_close: false,
            failed_attempts: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Connect attempts that have failed since the link was last open
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Whether the next close is user-requested
    pub fn closing_intentionally(&self) -> bool {
        self.intentional_close
    }

    /// Apply one event and return the side effects to carry out
    pub fn apply(&mut self, event: ConnectionEvent) -> Vec<Directive> {
        let from = self.state;

        let directives = match (self.state, &event) {
            (ConnectionState::Disconnected, ConnectionEvent::ConnectRequested) => {
                self.intentional_close = false;
                self.failed_attempts = 0;
                self.state = ConnectionState::Connecting;
                vec![Directive::CancelRetry, Directive::OpenTransport]
            }
            // connect() is idempotent while a link exists
            (_, ConnectionEvent::ConnectRequested) => {
                self.intentional_close = false;
                vec![]
            }

            (ConnectionState::Disconnected, ConnectionEvent::DisconnectRequested) => {
                self.intentional_close = true;
                vec![Directive::CancelRetry]
            }
            (_, ConnectionEvent::DisconnectRequested) => {
                self.intentional_close = true;
                vec![Directive::CloseTransport]
            }

            (ConnectionState::Connecting, ConnectionEvent::TransportOpened) => {
                self.failed_attempts = 0;
                self.state = ConnectionState::Connected;
                vec![Directive::CancelRetry]
            }
            (_, ConnectionEvent::TransportOpened) => {
                warn!("Transport opened outside of a connect attempt");
                vec![]
            }

            (ConnectionState::Connecting, ConnectionEvent::TransportFailed(reason)) => {
                warn!("Connect attempt failed: {}", reason);
                self.failed_attempts += 1;
                self.state = ConnectionState::Disconnected;
                vec![]
            }
            (ConnectionState::Connected, ConnectionEvent::TransportFailed(reason)) => {
                warn!("Transport error: {}", reason);
                self.state = ConnectionState::Disconnected;
                vec![]
            }
            (ConnectionState::Disconnected, ConnectionEvent::TransportFailed(reason)) => {
                debug!("Transport error after disconnect: {}", reason);
                vec![]
            }

            (ConnectionState::Connecting, ConnectionEvent::TransportClosed) => {
                self.failed_attempts += 1;
                self.state = ConnectionState::Disconnected;
                self.close_directives()
            }
            (ConnectionState::Connected, ConnectionEvent::TransportClosed) => {
                self.state = ConnectionState::Disconnected;
                self.close_directives()
            }
            (ConnectionState::Disconnected, ConnectionEvent::TransportClosed) => {
                self.close_directives()
            }

            (ConnectionState::Disconnected, ConnectionEvent::RetryElapsed) => {
                if self.intentional_close {
                    vec![]
                } else {
                    self.state = ConnectionState::Connecting;
                    vec![Directive::OpenTransport]
                }
            }
            // stale timer, the link recovered on its own
            (_, ConnectionEvent::RetryElapsed) => vec![],
        };

        if self.state != from {
            info!("Connection state: {:?} -> {:?}", from, self.state);
        }

        directives
    }

    /// One retry per close, suppressed when the close was user-requested
    fn close_directives(&mut self) -> Vec<Directive> {
        if self.intentional_close {
            self.intentional_close = false;
            debug!("Close was requested, not scheduling a reconnect");
            vec![]
        } else {
            vec![Directive::ArmRetry]
        }
    }
}
