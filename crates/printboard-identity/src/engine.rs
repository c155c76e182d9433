//! Fingerprint derivation

use crate::canonical::{canonical_encoding, Encoding};
use crate::display::{emoji_for, moniker_for};
use printboard_core::{now_millis, DerivationError, Details, Fingerprint, SignalSet};
use printboard_signals::{classify_browser, classify_os};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

/// Derives fingerprints under one namespace. Engines with different
/// namespaces never agree on an identifier.
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    namespace: Uuid,
    encoding: Encoding,
}

impl DerivationEngine {
    pub fn new(namespace: Uuid) -> Self {
        Self {
            namespace,
            encoding: Encoding::default(),
        }
    }

    pub fn from_namespace_str(namespace: &str) -> Result<Self, DerivationError> {
        Uuid::parse_str(namespace)
            .map(Self::new)
            .map_err(|e| DerivationError::InvalidNamespace(format!("{}: {}", namespace, e)))
    }

    pub fn namespace(&self) -> &Uuid {
        &self.namespace
    }

    /// Derive a fingerprint stamped with the current time. The timestamp
    /// plays no part in the identity.
    pub fn derive(&self, signals: &SignalSet) -> Result<Fingerprint, DerivationError> {
        self.derive_at(signals, now_millis())
    }

    pub fn derive_at(
        &self,
        signals: &SignalSet,
        timestamp: i64,
    ) -> Result<Fingerprint, DerivationError> {
        let canonical = canonical_encoding(signals, self.encoding)?;
        let id = Uuid::new_v5(&self.namespace, canonical.as_bytes());
        let id_str = id.hyphenated().to_string();
        let emoji = emoji_for(&id_str)?;
        let moniker = moniker_for(&id);
        debug!(id = %id_str, moniker = %moniker, "derived fingerprint");

        Ok(Fingerprint {
            id: id_str,
            moniker,
            emoji: emoji.to_string(),
            timestamp,
            details: project_details(signals),
        })
    }

    /// Recompute `(moniker, emoji)` from an identifier alone.
    pub fn display_for(id: &str) -> Result<(String, &'static str), DerivationError> {
        let uuid = Uuid::parse_str(id).map_err(|_| DerivationError::InvalidId(id.to_string()))?;
        Ok((moniker_for(&uuid), emoji_for(id)?))
    }
}

/// The subset of signals other viewers get to see. Raw canvas and audio
/// output is replaced by a digest.
pub fn project_details(signals: &SignalSet) -> Details {
    Details {
        browser: classify_browser(&signals.user_agent).to_string(),
        os: classify_os(&signals.user_agent).to_string(),
        screen_size: signals.screen_size(),
        color_depth: signals.color_depth_label(),
        timezone: signals.timezone.clone(),
        language: signals.language.clone(),
        canvas_hash: digest(&signals.canvas),
        webgl_vendor: signals.webgl_vendor.clone(),
        webgl_renderer: signals.webgl_renderer.clone(),
        audio_hash: digest(&signals.audio),
    }
}

/// Lowercase hex SHA-256.
pub fn digest(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_fixed_size() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(digest(&"x".repeat(100_000)).len(), 64);
    }

    #[test]
    fn bad_namespace() {
        assert!(matches!(
            DerivationEngine::from_namespace_str("nope"),
            Err(DerivationError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn display_for_rejects_non_uuid() {
        assert!(DerivationEngine::display_for("ab12").is_err());
    }
}
