use serde_json::{Map, Value};

use super::{NormalizeOptions, RequestEncoding, model_or_default};
use crate::error::ProxyError;
use crate::types::{CanonicalRequest, Content, NormalizedRequest, UpstreamBody};

pub(super) fn normalize(body: &[u8], options: &NormalizeOptions) -> Result<NormalizedRequest, ProxyError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(ProxyError::InvalidBody("expected a JSON object".to_owned()));
    };

    let provider = object.get("provider").and_then(Value::as_str).map(str::to_owned);

    // A caller-built `messages` array is forwarded as-is, minus the routing key
    if object.get("messages").is_some_and(Value::is_array) {
        object.remove("provider");
        return Ok(NormalizedRequest {
            encoding: RequestEncoding::Json,
            provider,
            body: UpstreamBody::Passthrough(object),
        });
    }

    let text = first_text(&object, &["text", "prompt"]).ok_or(ProxyError::MissingContent("missing text or messages"))?;

    let request = CanonicalRequest::single_user(
        model_or_default(object.get("model").and_then(Value::as_str), options),
        object.get("stream") == Some(&Value::Bool(true)),
        Content::Text(text.to_owned()),
    );

    Ok(NormalizedRequest {
        encoding: RequestEncoding::Json,
        provider,
        body: UpstreamBody::Canonical(request),
    })
}

/// First non-empty string value among `keys`
fn first_text<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}
