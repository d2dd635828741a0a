// Connection management module

pub mod manager;
pub mod state_machine;

pub use manager::{shared, ConnectionManager};
pub use state_machine::{ConnectionEvent, ConnectionState, ConnectionStateMachine, Directive};
