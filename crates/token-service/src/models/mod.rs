//! Response models owned by the Token Service.
//!
//! The credential wire types live in `common::types` because the call
//! session deserializes them too.

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process answers.
    pub status: String,

    /// "configured" or "missing".
    pub credentials: String,
}
