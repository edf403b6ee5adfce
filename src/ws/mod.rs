pub mod actor;
pub mod handler;
pub mod hub;
pub mod protocol;

use tokio::sync::mpsc;

/// Sender half of a connection's outbound channel. Anything holding a
/// clone can push messages to that client; the writer task drains the
/// receiver into the WebSocket sink, which is what gives each session
/// FIFO delivery.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;
