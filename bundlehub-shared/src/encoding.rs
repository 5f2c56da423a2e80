/// Upload payload decoding
///
/// Clients send the bundle bytes inside the JSON body as a string, declaring
/// the encoding in the request's `format` field. Base64 is the default;
/// hex and raw utf8 are also accepted.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Supported payload encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Standard base64 (the default when `format` is omitted)
    #[default]
    Base64,

    /// Lowercase or uppercase hex
    Hex,

    /// The string's UTF-8 bytes, unmodified
    Utf8,
}

/// Payload decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown payload format: {0}")]
    UnknownFormat(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl PayloadFormat {
    /// Parses the request's optional `format` field
    ///
    /// `None` selects base64, matching what upload clients send by default.
    pub fn parse(name: Option<&str>) -> Result<Self, DecodeError> {
        match name {
            None => Ok(PayloadFormat::Base64),
            Some("base64") => Ok(PayloadFormat::Base64),
            Some("hex") => Ok(PayloadFormat::Hex),
            Some("utf8") | Some("utf-8") => Ok(PayloadFormat::Utf8),
            Some(other) => Err(DecodeError::UnknownFormat(other.to_string())),
        }
    }

    /// Name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Base64 => "base64",
            PayloadFormat::Hex => "hex",
            PayloadFormat::Utf8 => "utf8",
        }
    }
}

/// Decodes a payload string into raw bundle bytes
pub fn decode_payload(data: &str, format: PayloadFormat) -> Result<Vec<u8>, DecodeError> {
    match format {
        PayloadFormat::Base64 => Ok(general_purpose::STANDARD.decode(data)?),
        PayloadFormat::Hex => Ok(hex::decode(data)?),
        PayloadFormat::Utf8 => Ok(data.as_bytes().to_vec()),
    }
}
