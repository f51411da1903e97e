use std::collections::HashMap;

use url::form_urlencoded;

use super::{NormalizeOptions, RequestEncoding, model_or_default};
use crate::error::ProxyError;
use crate::types::{CanonicalRequest, Content, NormalizedRequest, UpstreamBody};

pub(super) fn normalize(body: &[u8], options: &NormalizeOptions) -> Result<NormalizedRequest, ProxyError> {
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(body) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let text = ["text", "prompt"]
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
        .ok_or(ProxyError::MissingContent("missing text input"))?;

    let request = CanonicalRequest::single_user(
        model_or_default(params.get("model").map(String::as_str), options),
        params.get("stream").is_some_and(|s| s == "true"),
        Content::Text(text),
    );

    Ok(NormalizedRequest {
        encoding: RequestEncoding::UrlEncoded,
        provider: params.remove("provider"),
        body: UpstreamBody::Canonical(request),
    })
}
