//! JSON-RPC style protocol over newline-delimited stdio.

mod envelope;
mod handler;
mod server;

pub use envelope::{
    ANNOUNCEMENT_ID, Inbound, PROTOCOL_VERSION, RpcError, RpcRequest, RpcResponse, announcement,
    capabilities,
};
pub use handler::{NotifyParams, ProtocolHandler, methods};
pub use server::StdioServer;
