//! Credential issuance handler.
//!
//! `GET /api/agora-token?channelName={channel}&uid={uid}`
//!
//! - 200 `{"token": "...", "appId": "..."}`
//! - 400 `{"error": "Channel name required" | "UID required"}`
//! - 500 `{"error": "..."}` for missing server credentials or signing failures

use crate::errors::{TokenServiceError, CHANNEL_REQUIRED, UID_REQUIRED};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::token_service;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use common::types::{ChannelName, CredentialResponse, ParticipantId};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Raw query parameters. Both are kept as strings so that validation can
/// tell "absent" apart from "present but malformed".
#[derive(Debug, Default)]
pub struct TokenQuery {
    pub channel_name: Option<String>,
    pub uid: Option<String>,
}

impl TokenQuery {
    /// Build from decoded `key=value` pairs. The first occurrence of a
    /// repeated key wins; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "channelName" => &mut query.channel_name,
                "uid" => &mut query.uid,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Handler for GET /api/agora-token
///
/// The query is extracted as plain pairs so that repeated keys never reach
/// the extractor's own rejection response.
#[instrument(skip_all, name = "token.issue")]
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<CredentialResponse>, TokenServiceError> {
    let result = parse_query(query)
        .and_then(|query| validate(&query))
        .and_then(|(channel, uid)| {
            let issued = token_service::issue_credential(&state.config, &channel, uid)?;

            info!(
                target: "token.handlers.token",
                channel = %channel,
                uid = %uid,
                expires_at = issued.expires_at,
                "Issued credential"
            );

            Ok(CredentialResponse {
                token: issued.token,
                app_id: issued.app_id,
            })
        });

    match result {
        Ok(response) => {
            metrics::record_token_issued();
            Ok(Json(response))
        }
        Err(e) => {
            metrics::record_token_rejected(e.reason());
            Err(e)
        }
    }
}

fn parse_query(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<TokenQuery, TokenServiceError> {
    match query {
        Ok(Query(pairs)) => Ok(TokenQuery::from_pairs(pairs)),
        Err(rejection) => {
            debug!(target: "token.handlers.token", error = %rejection, "Unreadable query string");
            Err(TokenServiceError::Validation(CHANNEL_REQUIRED))
        }
    }
}

/// Validate the query. The channel is checked before the uid.
pub fn validate(query: &TokenQuery) -> Result<(ChannelName, ParticipantId), TokenServiceError> {
    let channel = query
        .channel_name
        .clone()
        .and_then(|name| ChannelName::new(name).ok())
        .ok_or(TokenServiceError::Validation(CHANNEL_REQUIRED))?;

    let uid = query
        .uid
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(ParticipantId)
        .ok_or(TokenServiceError::Validation(UID_REQUIRED))?;

    Ok((channel, uid))
}
