// myplace-api: Async WebSocket command client for MyPlace climate-control hubs

pub mod client;
pub mod command;
pub mod error;
pub mod message;
pub mod transport;
mod websocket;

pub use client::HubClient;
pub use command::{CommandBatch, HubCommand, HubMode};
pub use error::Error;
pub use message::{Envelope, Reply};
pub use transport::{CommandTransport, TransportConfig};
