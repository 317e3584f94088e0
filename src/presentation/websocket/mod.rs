//! WebSocket Gateway
//!
//! Real-time group chat over WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod registry;
pub mod session;

pub use gateway::{ChatGateway, FrameError};
pub use handler::ws_handler;
pub use registry::{
    BroadcastReport, ConnectionHandle, ConnectionId, ConnectionRegistry, Registration,
    RegistryError,
};
pub use session::{ConnectionPhase, SessionState};
