//! Application server (VAPID) key codec.
//!
//! Push services hand out the VAPID public key as unpadded URL-safe
//! base64 but the subscribe call wants the raw bytes.
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use super::error::DecodeError;

// Matches the platform decoder: padding must be canonical once we've
// added it, stray bits in the final symbol are ignored.
const PADDED_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// A key in URL-safe base64 form, exactly as it was configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedKey(String);

impl EncodedKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<KeyBytes, DecodeError> {
        decode(self.as_str())
    }
}

impl std::fmt::Display for EncodedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded key material, handed to the push service as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for KeyBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Decode a URL-safe, possibly unpadded base64 key into raw bytes.
pub fn decode(key: &str) -> Result<KeyBytes, DecodeError> {
    let padding = (4 - key.len() % 4) % 4;
    let mut standard = String::with_capacity(key.len() + padding);
    for c in key.chars() {
        standard.push(match c {
            '-' => '+',
            '_' => '/',
            c => c,
        });
    }
    standard.extend(std::iter::repeat_n('=', padding));

    let bytes = PADDED_STANDARD.decode(standard)?;
    Ok(KeyBytes(bytes))
}

/// Encode raw bytes as unpadded URL-safe base64.
pub fn encode(bytes: impl AsRef<[u8]>) -> EncodedKey {
    EncodedKey(URL_SAFE_NO_PAD.encode(bytes))
}
