//! Notification contract: publish-only email dispatch.
//!
//! Published fire-and-forget to the notification queue; the gateway never
//! reads a response. Tracing metadata rides in the publish envelope
//! headers, not in the request body.

use serde::{Deserialize, Serialize};

/// Which email template the notification worker should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    EmailConfirmation,
    ResetPassword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    pub kind: EmailKind,
    /// Action handle embedded in the mailed link.
    pub action_uuid: String,
}
