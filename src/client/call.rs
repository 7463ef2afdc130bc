//! Call requests and their wire encoding.

use crate::config::CredentialPlacement;
use crate::session::Credential;
use crate::transport::{HttpMethod, TransportRequest};
use crate::{Error, ErrorContext, Result};
use serde_json::{Map, Value};
use url::Url;

/// Request-specific key/value data.
pub type Payload = Map<String, Value>;

/// Query/body keys the client owns; payloads may not use them for GET.
const RESERVED_QUERY_KEYS: &[&str] = &["action", "token"];

pub(crate) const REQUEST_ID_HEADER: &str = "x-studio-request-id";

/// One remote call: action name, payload, and an optional explicit method.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub action: String,
    pub payload: Payload,
    pub method: Option<HttpMethod>,
}

impl CallRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            payload: Payload::new(),
            method: None,
        }
    }

    /// Builds a request from a JSON payload. `null` means empty; anything
    /// other than an object is rejected.
    pub fn with_json(action: impl Into<String>, payload: Value) -> Result<Self> {
        let action = action.into();
        let payload = payload_from_value(&action, payload)?;
        Ok(Self {
            action,
            payload,
            method: None,
        })
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }
}

pub(crate) fn payload_from_value(action: &str, value: Value) -> Result<Payload> {
    match value {
        Value::Null => Ok(Payload::new()),
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_request(
            format!("payload must be a JSON object, got {}", json_type(&other)),
            ErrorContext::new()
                .with_action(action)
                .with_field_path("payload")
                .with_source("request_builder"),
        )),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn validate_action(action: &str) -> Result<()> {
    if action.trim().is_empty() {
        return Err(Error::invalid_request(
            "action must not be empty",
            ErrorContext::new()
                .with_field_path("action")
                .with_source("request_builder"),
        ));
    }
    Ok(())
}

/// Flattens `action` plus every payload entry into query pairs.
///
/// Values must be scalars; strings are used verbatim, numbers and booleans in
/// their JSON text form, `null` as an empty string.
pub fn encode_query(action: &str, payload: &Payload) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(payload.len() + 1);
    pairs.push(("action".to_string(), action.to_string()));

    for (key, value) in payload {
        let ctx = || {
            ErrorContext::new()
                .with_action(action)
                .with_field_path(format!("payload.{key}"))
                .with_source("request_builder")
        };
        if RESERVED_QUERY_KEYS.contains(&key.as_str()) {
            return Err(Error::invalid_request(
                format!("payload key '{key}' is reserved for GET requests"),
                ctx(),
            ));
        }
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::invalid_request(
                    format!("payload values must be scalars for GET, '{key}' is nested"),
                    ctx(),
                ))
            }
        };
        pairs.push((key.clone(), text));
    }
    Ok(pairs)
}

/// Builds the transport request for one attempt.
pub(crate) fn build_transport_request(
    endpoint: &Url,
    action: &str,
    payload: &Payload,
    method: HttpMethod,
    credential: Option<&Credential>,
    placement: CredentialPlacement,
    request_id: &str,
) -> Result<TransportRequest> {
    let mut url = endpoint.clone();
    let mut headers = vec![(REQUEST_ID_HEADER.to_string(), request_id.to_string())];

    if placement == CredentialPlacement::Header {
        if let Some(c) = credential {
            headers.push(("Authorization".to_string(), format!("Bearer {}", c.expose())));
        }
    }

    let body = match method {
        HttpMethod::Get => {
            let pairs = encode_query(action, payload)?;
            {
                let mut q = url.query_pairs_mut();
                for (k, v) in &pairs {
                    q.append_pair(k, v);
                }
                if placement == CredentialPlacement::Embedded {
                    if let Some(c) = credential {
                        q.append_pair("token", c.expose());
                    }
                }
            }
            None
        }
        HttpMethod::Post => {
            url.query_pairs_mut().append_pair("action", action);
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            Some(serde_json::json!({
                "action": action,
                "payload": payload,
                "token": credential.map(|c| c.expose()),
            }))
        }
    };

    Ok(TransportRequest {
        method,
        url,
        headers,
        body,
    })
}
