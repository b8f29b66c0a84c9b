//! Pooled RPC channels to downstream services.
//!
//! Each downstream service is reached through a [`ChannelPool`] of
//! length-delimited `MsgPack` channels. A lease is a RAII guard: dropping
//! it returns the channel to the idle set, unless the channel was marked
//! broken by a transport failure, in which case it is discarded and the
//! next lease dials a fresh connection.

mod channel;
mod pool;

pub use channel::{Endpoint, RpcChannel};
pub use pool::{ChannelFactory, ChannelLease, ChannelPool, PoolConfig, PoolError};
