use crate::context::{Body, Context};
use crate::error::Error;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::util::{is_json_content_type, truncate_text};

/// Middleware that decodes JSON response bodies into structured values
/// after the rest of the pipeline has run.
///
/// Only byte bodies under a JSON content type are touched; malformed JSON
/// rejects the call with [`Error::Decode`], which is never retried.
pub fn json_decode() -> JsonDecode {
    JsonDecode
}

pub struct JsonDecode;

impl Middleware for JsonDecode {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, crate::Result<()>> {
        Box::pin(async move {
            next.run(ctx).await?;
            let Some(res) = ctx.res.as_mut() else {
                return Ok(());
            };
            if !is_json_content_type(&res.headers) {
                return Ok(());
            }
            let Body::Bytes(bytes) = &res.body else {
                return Ok(());
            };
            let value = serde_json::from_slice(bytes).map_err(|source| Error::Decode {
                source,
                body: truncate_text(&String::from_utf8_lossy(bytes)),
            })?;
            res.body = Body::Json(value);
            Ok(())
        })
    }
}
