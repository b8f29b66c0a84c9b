//! Typed request/response pairs for every downstream contract plus the
//! JSON-facing gateway schemas.
//!
//! One module per downstream service, mirroring the capability split of
//! the upstream clients. Bodies travel as nested `MsgPack` inside the
//! [`crate::rpc`] envelope; the `gateway` module is the only JSON-facing
//! schema set.

pub mod action;
pub mod auth;
pub mod gateway;
pub mod language;
pub mod notification;
pub mod speaker;
pub mod translation;
pub mod user;
pub mod vocabulary;
