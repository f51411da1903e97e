use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};

use super::{NormalizeOptions, RequestEncoding, model_or_default};
use crate::error::ProxyError;
use crate::types::{CanonicalRequest, Content, NormalizedRequest, UpstreamBody};

/// Fields collected from a multipart form, first occurrence wins
#[derive(Debug, Default)]
struct FormFields {
    provider: Option<String>,
    text: Option<String>,
    model: Option<String>,
    stream: Option<String>,
    image: Option<Vec<u8>>,
}

pub(super) async fn normalize(
    mut form: Multipart,
    options: &NormalizeOptions,
) -> Result<NormalizedRequest, ProxyError> {
    let mut fields = FormFields::default();

    while let Some(field) = form.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_owned();

        let slot = match name.as_str() {
            // Only a file part counts as the image; a plain field of that name is ignored
            "image" => {
                if fields.image.is_none() && field.file_name().is_some() {
                    fields.image = Some(read_image(field, options.max_image_bytes).await?);
                }
                continue;
            }
            "provider" => &mut fields.provider,
            "text" => &mut fields.text,
            "model" => &mut fields.model,
            "stream" => &mut fields.stream,
            _ => continue,
        };

        if slot.is_none() {
            *slot = Some(field.text().await.map_err(invalid_form)?);
        }
    }

    let content = match fields.image {
        Some(image) if !image.is_empty() => Content::png_image(&image),
        _ => match fields.text.filter(|t| !t.is_empty()) {
            Some(text) => Content::Text(text),
            None => return Err(ProxyError::MissingContent("request must include text or file content")),
        },
    };

    let request = CanonicalRequest::single_user(
        model_or_default(fields.model.as_deref(), options),
        fields.stream.as_deref() == Some("true"),
        content,
    );

    Ok(NormalizedRequest {
        encoding: RequestEncoding::Multipart,
        provider: fields.provider,
        body: UpstreamBody::Canonical(request),
    })
}

/// Read an image field chunk by chunk, failing as soon as it passes `limit`
async fn read_image(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, ProxyError> {
    let mut image = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(invalid_form)? {
        if image.len() + chunk.len() > limit {
            tracing::debug!(limit, "multipart image exceeds size cap");
            return Err(ProxyError::PayloadTooLarge { limit });
        }
        image.extend_from_slice(&chunk);
    }

    Ok(image)
}

#[allow(clippy::needless_pass_by_value)]
fn invalid_form(error: MultipartError) -> ProxyError {
    ProxyError::InvalidBody(error.body_text())
}
