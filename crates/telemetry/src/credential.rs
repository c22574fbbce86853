// Credential handling: an owned, rotatable API key that never renders in full.

use std::fmt;

use parking_lot::RwLock;

/// A rotatable API key shared between the rotate operation and in-flight
/// publishes.
///
/// `Debug` renders a redacted form so the key cannot leak through log lines.
pub struct Credential {
    key: RwLock<String>,
}

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: RwLock::new(key.into()),
        }
    }

    /// Replace the key. A request that already snapshotted the previous value
    /// keeps it; the next request picks up the new one.
    pub fn rotate(&self, key: impl Into<String>) {
        *self.key.write() = key.into();
    }

    /// Snapshot the current key for one outbound request.
    pub fn reveal(&self) -> String {
        self.key.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.key.read().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential")
            .field(&redact(&self.key.read()))
            .finish()
    }
}

/// Redact a key for log output: at most the first four characters survive.
pub fn redact(key: &str) -> String {
    if key.is_empty() {
        return "<empty>".to_owned();
    }
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_visible_to_the_next_snapshot() {
        let credential = Credential::new("OLDKEY");
        let before = credential.reveal();
        credential.rotate("NEWKEY");

        assert_eq!(before, "OLDKEY");
        assert_eq!(credential.reveal(), "NEWKEY");
    }

    #[test]
    fn debug_never_shows_the_full_key() {
        let credential = Credential::new("SECRETSECRET");
        let rendered = format!("{credential:?}");

        assert!(!rendered.contains("SECRETSECRET"));
        assert!(rendered.contains("SECR..."));
    }

    #[test]
    fn redact_handles_short_and_empty_keys() {
        assert_eq!(redact(""), "<empty>");
        assert_eq!(redact("ab"), "ab...");
    }
}
