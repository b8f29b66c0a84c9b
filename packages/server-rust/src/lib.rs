//! `LexGate` Server — HTTP edge gateway with admission control, pooled RPC
//! channels to downstream services, and multi-service orchestration.

pub mod admission;
pub mod clients;
pub mod config;
pub mod metrics;
pub mod network;
pub mod rpc;
pub mod service;

pub use config::Config;
pub use service::GatewayService;
