//! Evaluation metadata stored on documents
//!
//! A [`ConditionEngineResult`] travels with its document as two metadata
//! fields:
//!
//! - `POLICY_EVAL_METADATA`: the result as JSON, gzip-compressed, Base64
//! - `POLICY_EVAL_METADATA_MARKER`: hex MD5 of the AES-256-GCM sealing of the
//!   same JSON under a PBKDF2 key derived from the configured password
//!
//! Reading is a soft check. Anything absent, duplicated, undecodable or not
//! matching its marker yields `None` and the document is evaluated again.

use crate::config::MetadataConfig;
use crate::error::{Result, SdkError};
use base64::{engine::general_purpose::STANDARD, Engine};
use docpolicy_core::{ConditionEngineResult, Document};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use md5::{Digest, Md5};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::pbkdf2;
use secrecy::ExposeSecret;
use std::io::{Read, Write};
use std::num::NonZeroU32;

/// Field holding the encoded result
pub const METADATA_FIELD: &str = "POLICY_EVAL_METADATA";

/// Field holding the security hash of the encoded result
pub const METADATA_MARKER_FIELD: &str = "POLICY_EVAL_METADATA_MARKER";

const SIGNATURE_SEPARATOR: char = '.';

/// Largest decompressed result accepted when reading metadata
pub const MAX_METADATA_BYTES: u64 = 8 * 1024 * 1024;

/// Encoder and validator of evaluation metadata
pub struct ConditionEngineMetadata {
    key: LessSafeKey,
}

impl ConditionEngineMetadata {
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let iterations = NonZeroU32::new(config.iterations).ok_or_else(|| {
            SdkError::ConfigError("metadata.iterations must be greater than zero".to_string())
        })?;

        let mut key_bytes = [0u8; 32];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            config.salt.as_bytes(),
            config.password.expose_secret().as_bytes(),
            &mut key_bytes,
        );

        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| SdkError::MetadataError("Failed to create metadata key".to_string()))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
        })
    }

    /// Encode a result into its blob and security hash
    pub fn encode(&self, result: &ConditionEngineResult) -> Result<(String, String)> {
        let json = serde_json::to_vec(result)
            .map_err(|e| SdkError::MetadataError(format!("Failed to serialize result: {}", e)))?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        let hash = self.hash(&json)?;
        Ok((STANDARD.encode(compressed), hash))
    }

    /// Decode a blob, checking it against its security hash
    pub fn decode(&self, blob: &str, hash: &str) -> Option<ConditionEngineResult> {
        let compressed = match STANDARD.decode(blob.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Evaluation metadata is not valid Base64: {}", e);
                return None;
            }
        };

        let mut json = Vec::new();
        let decoder = GzDecoder::new(compressed.as_slice());
        if let Err(e) = decoder.take(MAX_METADATA_BYTES + 1).read_to_end(&mut json) {
            tracing::warn!("Evaluation metadata could not be decompressed: {}", e);
            return None;
        }
        if json.len() as u64 > MAX_METADATA_BYTES {
            tracing::warn!(
                "Evaluation metadata exceeds {} bytes once decompressed",
                MAX_METADATA_BYTES
            );
            return None;
        }

        match self.hash(&json) {
            Ok(expected) if expected.eq_ignore_ascii_case(hash.trim()) => {}
            Ok(_) => {
                tracing::warn!("Evaluation metadata does not match its security hash");
                return None;
            }
            Err(e) => {
                tracing::warn!("Evaluation metadata could not be hashed: {}", e);
                return None;
            }
        }

        match serde_json::from_slice(&json) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Evaluation metadata could not be deserialized: {}", e);
                None
            }
        }
    }

    /// Take the evaluation metadata off a document.
    ///
    /// Both fields are always removed, whether or not they validate.
    pub fn read_from(&self, document: &mut Document) -> Option<ConditionEngineResult> {
        let blob = document.metadata.remove(METADATA_FIELD);
        let marker = document.metadata.remove(METADATA_MARKER_FIELD);

        let (blob, marker) = match (blob, marker) {
            (None, None) => return None,
            (Some(blob), Some(marker)) => (blob, marker),
            _ => {
                tracing::warn!(
                    "Document '{}' carries only one of the evaluation metadata fields",
                    document.reference
                );
                return None;
            }
        };

        match (blob.as_slice(), marker.as_slice()) {
            ([blob], [marker]) => self.decode(blob, marker),
            _ => {
                tracing::warn!(
                    "Document '{}' carries duplicate evaluation metadata values",
                    document.reference
                );
                None
            }
        }
    }

    /// Store a result on a document, replacing any previous metadata
    pub fn write_to(&self, document: &mut Document, result: &ConditionEngineResult) -> Result<()> {
        let (blob, hash) = self.encode(result)?;
        document.metadata.remove(METADATA_FIELD);
        document.metadata.remove(METADATA_MARKER_FIELD);
        document.metadata.add(METADATA_FIELD, blob);
        document.metadata.add(METADATA_MARKER_FIELD, hash);
        Ok(())
    }

    /// Blob and hash joined into one opaque string
    pub fn signature(&self, result: &ConditionEngineResult) -> Result<String> {
        let (blob, hash) = self.encode(result)?;
        Ok(format!("{}{}{}", blob, SIGNATURE_SEPARATOR, hash))
    }

    pub fn decode_signature(&self, signature: &str) -> Option<ConditionEngineResult> {
        let Some((blob, hash)) = signature.rsplit_once(SIGNATURE_SEPARATOR) else {
            tracing::warn!("Signature has no security hash");
            return None;
        };
        self.decode(blob, hash)
    }

    fn hash(&self, json: &[u8]) -> Result<String> {
        let mut sealed = json.to_vec();
        let nonce = Nonce::assume_unique_for_key([0u8; 12]);
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut sealed)
            .map_err(|_| SdkError::MetadataError("Failed to seal evaluation metadata".to_string()))?;
        Ok(format!("{:x}", Md5::digest(&sealed)))
    }
}

impl std::fmt::Debug for ConditionEngineMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEngineMetadata").finish_non_exhaustive()
    }
}
