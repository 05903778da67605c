//! JSON-RPC 2.0 surface.
//!
//! A single HTTP POST endpoint at `/rpc` dispatching `getAccount` and
//! `sendTransaction` onto the account view and the transaction pool.

mod handlers;
mod server;
mod types;

pub use handlers::{handle_rpc, RpcState};
pub use server::{RpcServer, RpcServerConfig, RpcServerError, RpcServerHandle};
pub use types::{RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
