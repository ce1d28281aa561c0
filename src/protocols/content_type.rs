use http::HeaderMap;
use http::header::CONTENT_TYPE;
use mediatype::MediaType;
use mediatype::ReadParams;
use mediatype::names::MULTIPART;

use crate::error::FramingError;

pub(crate) const MULTIPART_DEFER_SPEC_PARAMETER: &str = "deferSpec";
pub(crate) const MULTIPART_DEFER_SPEC_VALUE: &str = "20220824";
pub(crate) const MULTIPART_SUBSCRIPTION_SPEC_PARAMETER: &str = "subscriptionSpec";
pub(crate) const MULTIPART_SUBSCRIPTION_SPEC_VALUE: &str = "1.0";

const BOUNDARY_PARAMETER: &str = "boundary";

/// The sub-protocol a multipart response was negotiated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubProtocol {
    /// `subscriptionSpec=1.0`: heartbeats and transport envelopes.
    Subscription,
    /// `deferSpec=20220824`: initial and incremental `@defer` payloads.
    Defer,
}

/// The negotiated framing parameters of a multipart response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartContentType {
    pub boundary: String,
    pub protocol: SubProtocol,
}

/// Inspect the response's `Content-Type` header.
///
/// Returns `Ok(None)` for non-multipart content types, which callers treat
/// as a single-shot response. A multipart content type without a boundary
/// or with an unrecognized `Spec=` directive is a framing error.
pub fn negotiate_content_type(
    headers: &HeaderMap,
) -> Result<Option<MultipartContentType>, FramingError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Err(FramingError::InvalidContentType);
    };
    let value = value
        .to_str()
        .map_err(|_| FramingError::InvalidContentType)?;
    let media = MediaType::parse(value).map_err(|_| FramingError::InvalidContentType)?;
    if media.ty != MULTIPART {
        return Ok(None);
    }

    let boundary = media
        .get_param(mediatype::Name::new(BOUNDARY_PARAMETER).expect("valid name"))
        .ok_or(FramingError::MissingBoundary)?
        .unquoted_str()
        .to_string();

    let subscription = media.get_param(
        mediatype::Name::new(MULTIPART_SUBSCRIPTION_SPEC_PARAMETER).expect("valid name"),
    ) == Some(mediatype::Value::new(MULTIPART_SUBSCRIPTION_SPEC_VALUE).expect("valid value"));
    let defer = media
        .get_param(mediatype::Name::new(MULTIPART_DEFER_SPEC_PARAMETER).expect("valid name"))
        == Some(mediatype::Value::new(MULTIPART_DEFER_SPEC_VALUE).expect("valid value"));

    let protocol = if subscription {
        SubProtocol::Subscription
    } else if defer {
        SubProtocol::Defer
    } else {
        return Err(FramingError::UnknownSubProtocol {
            protocol: value.to_string(),
        });
    };

    Ok(Some(MultipartContentType { boundary, protocol }))
}
