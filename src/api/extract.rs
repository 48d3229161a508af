//! Request parsing helpers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`parse_body`] so malformed bodies get the same 400 shape as failed
//! validation.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};

/// Field-level validation of a request body.
pub trait Validate {
    /// Check the body, reporting the first failing field.
    fn validate(&self) -> ApiResult<()>;
}

/// Unwrap a JSON body and validate it.
pub fn parse_body<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(body) = payload.map_err(|rejection| {
        let message = rejection.body_text();
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&message).unwrap_or("body"),
            _ => "body",
        }
        .to_string();
        ApiError::bad_request(field, message)
    })?;
    body.validate()?;
    Ok(body)
}

/// Field a JSON data error points at.
///
/// axum prefixes the serde message with the path of the failing value
/// (`category: unknown variant ...`). Root-level errors carry no path, so a
/// missing field falls back to the name quoted in the message.
fn rejected_field(message: &str) -> Option<&str> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, rest)| rest);

    if let Some((path, _)) = detail.split_once(": ") {
        if !path.is_empty() && !path.contains(' ') {
            return Some(path);
        }
    }

    let start = detail.find("field `")? + "field `".len();
    let len = detail[start..].find('`')?;
    Some(&detail[start..start + len])
}

/// Parse a UUID path segment.
pub fn parse_id(raw: &str, field: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(field, format!("'{raw}' is not a valid id")))
}

/// `?userId=` attribution for mutations without a body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    pub user_id: Option<Uuid>,
}

pub fn parse_actor(query: Result<Query<ActorQuery>, QueryRejection>) -> ApiResult<Option<Uuid>> {
    query
        .map(|Query(actor)| actor.user_id)
        .map_err(|_| ApiError::bad_request("userId", "must be a valid id"))
}

/// Reject a blank string.
pub fn require_text(field: &str, value: &str, max_len: usize) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(field, "must not be empty"));
    }
    if value.chars().count() > max_len {
        return Err(ApiError::bad_request(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(())
}

/// Deserialize a field so that an explicit `null` is distinguishable from
/// an absent field: absent → `None`, `null` → `Some(None)`.
///
/// Use with `#[serde(default, deserialize_with = "double_option::deserialize")]`.
pub mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
