//! Response normalization.

use crate::transport::TransportResponse;
use crate::{Error, ErrorContext, Result};
use serde_json::Value;

/// Value of the top-level `error` field that means the session is gone.
pub const UNAUTHORIZED_SENTINEL: &str = "unauthorized";

/// Turns a received response into the call's data or a classified error.
///
/// Order matters: HTTP status first, then JSON shape, then the session
/// sentinel, then application-level failures.
pub(crate) fn normalize(
    action: &str,
    response: TransportResponse,
    context: ErrorContext,
) -> Result<Value> {
    if !response.is_success() {
        return Err(Error::Http {
            action: action.to_string(),
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
            context,
        });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Protocol {
            action: action.to_string(),
            message: format!("empty body with HTTP {}", response.status),
            context,
        });
    }

    let json: Value = serde_json::from_slice(&response.body).map_err(|e| Error::Protocol {
        action: action.to_string(),
        message: format!("body is not valid JSON: {e}"),
        context: context.clone(),
    })?;

    let Value::Object(mut obj) = json else {
        // Arrays and scalars carry no envelope; hand them through as data.
        return Ok(json);
    };

    match obj.get("error") {
        Some(Value::String(e)) if e == UNAUTHORIZED_SENTINEL => {
            return Err(Error::Unauthorized {
                action: action.to_string(),
                context,
            });
        }
        Some(Value::String(e)) => {
            return Err(Error::Remote {
                action: action.to_string(),
                message: e.clone(),
                context,
            });
        }
        _ => {}
    }

    if obj.get("status").and_then(Value::as_str) == Some("error") {
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("backend reported an error")
            .to_string();
        return Err(Error::Remote {
            action: action.to_string(),
            message,
            context,
        });
    }

    if let Some(data) = obj.remove("data") {
        return Ok(data);
    }
    if let Some(result) = obj.remove("result") {
        return Ok(result);
    }
    Ok(Value::Object(obj))
}
