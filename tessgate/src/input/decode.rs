use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Decode base64 without ever failing.
///
/// Decoding stops at the first `=`. Characters outside the alphabet are
/// skipped, the URL-safe `-` and `_` are accepted, and a dangling final
/// sextet that cannot form a byte is dropped. Malformed input therefore
/// decodes to different bytes rather than to an error.
pub fn decode_lenient(input: &str) -> Vec<u8> {
    let mut symbols: Vec<u8> = input
        .bytes()
        .take_while(|b| *b != b'=')
        .filter_map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => Some(b),
            b'-' => Some(b'+'),
            b'_' => Some(b'/'),
            _ => None,
        })
        .collect();

    if symbols.len() % 4 == 1 {
        symbols.pop();
    }

    LENIENT.decode(&symbols).unwrap_or_default()
}
