//! Session-scoped credential cache.
//!
//! Lives exactly as long as the process. Holds at most one entry, the admin
//! key, in a buffer that is wiped on drop.

use teamtrack_types::admin::ADMIN_KEY_SLOT;
use tracing::debug;
use zeroize::Zeroizing;

#[derive(Default)]
pub struct SessionCache {
    admin_key: Option<Zeroizing<String>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache from an environment variable, as if a previous login
    /// in this session had stored it. Blank values are ignored.
    pub fn from_env(var: &str) -> Self {
        let mut cache = Self::new();
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                debug!(var, slot = ADMIN_KEY_SLOT, "Seeded session cache from environment");
                cache.set_admin_key(value.trim());
            }
        }
        cache
    }

    pub fn admin_key(&self) -> Option<&str> {
        self.admin_key.as_ref().map(|k| k.as_str())
    }

    pub fn has_admin_key(&self) -> bool {
        self.admin_key.is_some()
    }

    pub fn set_admin_key(&mut self, key: &str) {
        self.admin_key = Some(Zeroizing::new(key.to_string()));
    }

    pub fn clear_admin_key(&mut self) {
        if self.admin_key.take().is_some() {
            debug!(slot = ADMIN_KEY_SLOT, "Cleared session cache");
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field(ADMIN_KEY_SLOT, &self.admin_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let mut cache = SessionCache::new();
        assert!(cache.admin_key().is_none());
        cache.set_admin_key("secret1");
        assert_eq!(cache.admin_key(), Some("secret1"));
        cache.set_admin_key("secret2");
        assert_eq!(cache.admin_key(), Some("secret2"));
        cache.clear_admin_key();
        assert!(!cache.has_admin_key());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let mut cache = SessionCache::new();
        cache.set_admin_key("secret1");
        let dbg = format!("{cache:?}");
        assert!(dbg.contains("admin_key"));
        assert!(!dbg.contains("secret1"));
    }

    #[test]
    fn seeding_from_env() {
        std::env::set_var("TEAMTRACK_TEST_SEED_KEY", "  cached-key ");
        assert_eq!(
            SessionCache::from_env("TEAMTRACK_TEST_SEED_KEY").admin_key(),
            Some("cached-key")
        );
        std::env::set_var("TEAMTRACK_TEST_SEED_KEY", "   ");
        assert!(!SessionCache::from_env("TEAMTRACK_TEST_SEED_KEY").has_admin_key());
        std::env::remove_var("TEAMTRACK_TEST_SEED_KEY");
        assert!(!SessionCache::from_env("TEAMTRACK_TEST_SEED_KEY").has_admin_key());
    }
}
