// agentdash-api: Wire types and clients for the agent monitoring backend
// (live WebSocket feed + REST control endpoints).

pub mod control;
pub mod error;
pub mod feed;
pub mod transport;
pub mod types;

pub use control::ControlClient;
pub use error::Error;
pub use feed::{FeedEvent, FeedHandle, FeedState, ReconnectConfig};
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    AgentAction, AgentPayload, ControlRequest, FeedSnapshot, LogKind, LogPayload, MetricsPayload,
    QueueTaskPayload, SettingRequest,
};
