use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use crate::error::Error;

const MAX_ERROR_BODY_TEXT: usize = 2048;

/// Append ordered query pairs to an absolute URL, keeping any query the
/// URL already carries.
pub(crate) fn append_query_pairs(url: &str, query_pairs: &[(String, String)]) -> String {
    if query_pairs.is_empty() {
        return url.to_owned();
    }
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed
                .query_pairs_mut()
                .extend_pairs(query_pairs.iter().map(|(name, value)| (name, value)));
            parsed.to_string()
        }
        // An unparseable URL fails in the transport with full context.
        Err(_) => url.to_owned(),
    }
}

/// Merge `overrides` into `headers`; for each name present in the
/// overrides the overriding values replace the existing ones.
pub(crate) fn merge_headers(headers: &mut HeaderMap, overrides: &HeaderMap) {
    for name in overrides.keys() {
        let mut values = overrides.get_all(name).into_iter();
        if let Some(first) = values.next() {
            headers.insert(name.clone(), first.clone());
            for value in values {
                headers.append(name.clone(), value.clone());
            }
        }
    }
}

pub(crate) fn parse_header_name(name: &str) -> crate::Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|source| Error::InvalidHeaderName {
        name: name.to_owned(),
        source,
    })
}

pub(crate) fn parse_header_value(name: &str, value: &str) -> crate::Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| Error::InvalidHeaderValue {
        name: name.to_owned(),
        source,
    })
}

pub(crate) fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            let mime = value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
}

/// Bounded copy of a body for embedding in error messages.
pub(crate) fn truncate_text(text: &str) -> String {
    if text.len() <= MAX_ERROR_BODY_TEXT {
        return text.to_owned();
    }
    let boundary = (0..=MAX_ERROR_BODY_TEXT)
        .rev()
        .find(|index| text.is_char_boundary(*index))
        .unwrap_or(0);
    format!("{}...", &text[..boundary])
}
