//! Image input resolution
//!
//! An extraction request can carry its image four ways: base64 in a JSON
//! `content` field, a URL in a JSON `url` field, a raw `image/*` body, or a
//! multipart `file` upload spooled to disk. `ImageResolver` reduces whichever
//! one wins precedence to a single [`RawImage`](crate::engine::RawImage).

mod decode;
mod request;
mod resolver;

pub use decode::decode_lenient;
pub use request::{ImageRequest, ImageSource, JsonImageBody, UploadedFile};
pub use resolver::ImageResolver;
