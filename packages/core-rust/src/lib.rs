//! `LexGate` Core — request context, outer-error model, RPC envelope, and message schemas.

pub mod context;
pub mod entities;
pub mod error;
pub mod messages;
pub mod ops;
pub mod rpc;

pub use context::{RequestContext, TokenClaims};
pub use error::OuterError;
pub use ops::Operation;
pub use rpc::{CallMetadata, RpcCode, RpcError, RpcRequest, RpcResponse};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
