//! The multipart response protocols: content-type negotiation, byte-stream
//! framing, and per-chunk classification for the `subscriptionSpec=1.0` and
//! `deferSpec=20220824` sub-protocols.

mod content_type;
mod multipart;

pub use content_type::MultipartContentType;
pub use content_type::SubProtocol;
pub use content_type::negotiate_content_type;
pub use multipart::MultipartFramer;
pub use multipart::parse_chunk;
