// 🔴 RED Phase: Connection state machine tests
// Pure transition logic, driven entirely by synthetic events

use auctionwatch_core::connection::{
    ConnectionEvent, ConnectionState, ConnectionStateMachine, Directive,
};

#[test]
fn test_initial_state_is_disconnected() {
    let machine = ConnectionStateMachine::new();

    assert_eq!(machine.state(), ConnectionState::Disconnected);
    assert!(!machine.is_connected());
    assert_eq!(machine.failed_attempts(), 0);
}

#[test]
fn test_connect_then_open_reaches_connected() {
    let mut machine = ConnectionStateMachine::new();

    let directives = machine.apply(ConnectionEvent::ConnectRequested);
    assert!(directives.contains(&Directive::OpenTransport));
    assert_eq!(machine.state(), ConnectionState::Connecting);
    assert!(!machine.is_connected());

    machine.apply(ConnectionEvent::TransportOpened);
    assert_eq!(machine.state(), ConnectionState::Connected);
    assert!(machine.is_connected());
}

#[test]
fn test_connect_is_idempotent_while_link_exists() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);

    assert!(machine.apply(ConnectionEvent::ConnectRequested).is_empty());

    machine.apply(ConnectionEvent::TransportOpened);
    assert!(machine.apply(ConnectionEvent::ConnectRequested).is_empty());
    assert_eq!(machine.state(), ConnectionState::Connected);
}

#[test]
fn test_error_during_connect_counts_a_failed_attempt() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);

    let directives = machine.apply(ConnectionEvent::TransportFailed("refused".to_string()));
    assert_eq!(machine.state(), ConnectionState::Disconnected);
    assert_eq!(machine.failed_attempts(), 1);
    assert!(directives.is_empty(), "retry is armed by the close, not the error");

    // the transport reports the close right after the error
    let directives = machine.apply(ConnectionEvent::TransportClosed);
    assert_eq!(directives, vec![Directive::ArmRetry]);
}

#[test]
fn test_unplanned_close_arms_retry() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);

    let directives = machine.apply(ConnectionEvent::TransportClosed);
    assert_eq!(machine.state(), ConnectionState::Disconnected);
    assert!(!machine.is_connected());
    assert_eq!(directives, vec![Directive::ArmRetry]);
}

#[test]
fn test_retry_elapsed_opens_a_new_transport() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);
    machine.apply(ConnectionEvent::TransportClosed);

    let directives = machine.apply(ConnectionEvent::RetryElapsed);
    assert_eq!(machine.state(), ConnectionState::Connecting);
    assert_eq!(directives, vec![Directive::OpenTransport]);
}

#[test]
fn test_stale_retry_after_recovery_is_ignored() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);

    assert!(machine.apply(ConnectionEvent::RetryElapsed).is_empty());
    assert_eq!(machine.state(), ConnectionState::Connected);
}

#[test]
fn test_requested_close_suppresses_retry() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);

    let directives = machine.apply(ConnectionEvent::DisconnectRequested);
    assert_eq!(directives, vec![Directive::CloseTransport]);
    assert!(machine.closing_intentionally());
    // still connected until the transport confirms the close
    assert_eq!(machine.state(), ConnectionState::Connected);

    let directives = machine.apply(ConnectionEvent::TransportClosed);
    assert_eq!(machine.state(), ConnectionState::Disconnected);
    assert!(!directives.contains(&Directive::ArmRetry));
}

#[test]
fn test_disconnect_while_waiting_for_retry_cancels_it() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);
    machine.apply(ConnectionEvent::TransportClosed);

    let directives = machine.apply(ConnectionEvent::DisconnectRequested);
    assert_eq!(directives, vec![Directive::CancelRetry]);

    // a timer that fires anyway must not reconnect
    assert!(machine.apply(ConnectionEvent::RetryElapsed).is_empty());
    assert_eq!(machine.state(), ConnectionState::Disconnected);
}

#[test]
fn test_failed_attempts_reset_once_open() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportFailed("refused".to_string()));
    machine.apply(ConnectionEvent::TransportClosed);
    assert_eq!(machine.failed_attempts(), 1);

    machine.apply(ConnectionEvent::RetryElapsed);
    machine.apply(ConnectionEvent::TransportOpened);

    assert_eq!(machine.failed_attempts(), 0);
    assert!(machine.is_connected());
}

#[test]
fn test_connect_clears_intentional_close() {
    let mut machine = ConnectionStateMachine::new();
    machine.apply(ConnectionEvent::ConnectRequested);
    machine.apply(ConnectionEvent::TransportOpened);
    machine.apply(ConnectionEvent::DisconnectRequested);
    machine.apply(ConnectionEvent::TransportClosed);

    let directives = machine.apply(ConnectionEvent::ConnectRequested);
    assert!(directives.contains(&Directive::OpenTransport));
    assert!(!machine.closing_intentionally());

    machine.apply(ConnectionEvent::TransportOpened);

    // a later unplanned close schedules a reconnect again
    let directives = machine.apply(ConnectionEvent::TransportClosed);
    assert_eq!(directives, vec![Directive::ArmRetry]);
}
