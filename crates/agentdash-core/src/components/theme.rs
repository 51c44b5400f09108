// ── Theme preference ──
//
// Light/dark mode, persisted through a `PreferenceStore` so the core never
// decides where the flag lives on disk.

use std::io;

use tracing::{debug, warn};

use crate::model::ThemeMode;

/// Storage for one persisted string.
pub trait PreferenceStore: Send {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&mut self, value: &str) -> io::Result<()>;
}

/// Active display mode plus its backing store.
pub struct ThemePreference {
    mode: ThemeMode,
    store: Box<dyn PreferenceStore>,
}

impl ThemePreference {
    /// Read the persisted mode. Absent, unreadable or unknown values leave
    /// the default (light).
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let mode = match store.load() {
            Ok(Some(raw)) => ThemeMode::from_storage(&raw).unwrap_or_else(|| {
                debug!(value = %raw.trim(), "ignoring unknown persisted theme");
                ThemeMode::default()
            }),
            Ok(None) => ThemeMode::default(),
            Err(e) => {
                warn!(error = %e, "failed to read theme preference");
                ThemeMode::default()
            }
        };
        Self { mode, store }
    }

    /// Flip the mode and persist it. A write failure is logged, not returned.
    pub fn toggle(&mut self) -> ThemeMode {
        self.mode = self.mode.toggled();
        if let Err(e) = self.store.save(self.mode.storage_key()) {
            warn!(error = %e, mode = self.mode.storage_key(), "failed to persist theme");
        }
        self.mode
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn icon(&self) -> &'static str {
        self.mode.icon()
    }
}

impl std::fmt::Debug for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemePreference")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Non-persistent store, used when no data directory is available.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub value: Option<String>,
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn save(&mut self, value: &str) -> io::Result<()> {
        self.value = Some(value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Store whose contents the test can inspect after handing it over.
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Option<String>>>);

    impl PreferenceStore for Shared {
        fn load(&self) -> io::Result<Option<String>> {
            Ok(self.0.lock().map_err(|_| io::Error::other("poisoned"))?.clone())
        }

        fn save(&mut self, value: &str) -> io::Result<()> {
            *self.0.lock().map_err(|_| io::Error::other("poisoned"))? = Some(value.to_owned());
            Ok(())
        }
    }

    struct Broken;

    impl PreferenceStore for Broken {
        fn load(&self) -> io::Result<Option<String>> {
            Err(io::Error::other("disk gone"))
        }

        fn save(&mut self, _value: &str) -> io::Result<()> {
            Err(io::Error::other("disk gone"))
        }
    }

    fn persisted(store: &Shared) -> Option<String> {
        store.0.lock().ok().and_then(|v| v.clone())
    }

    #[test]
    fn absent_value_defaults_to_light() {
        let pref = ThemePreference::load(Box::new(MemoryStore::default()));
        assert_eq!(pref.mode(), ThemeMode::Light);
        assert_eq!(pref.label(), "Light Mode");
    }

    #[test]
    fn persisted_dark_is_applied() {
        let store = MemoryStore {
            value: Some("dark-mode".into()),
        };
        let pref = ThemePreference::load(Box::new(store));
        assert_eq!(pref.mode(), ThemeMode::Dark);
        assert_eq!(pref.icon(), "☾");
    }

    #[test]
    fn unknown_value_is_treated_as_absent() {
        let store = MemoryStore {
            value: Some("high-contrast".into()),
        };
        assert_eq!(ThemePreference::load(Box::new(store)).mode(), ThemeMode::Light);
    }

    #[test]
    fn two_toggles_restore_mode_and_persisted_value() {
        let store = Shared::default();
        *store.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some("dark-mode".into());
        let before = persisted(&store);

        let mut pref = ThemePreference::load(Box::new(store.clone()));
        let original = pref.mode();

        assert_eq!(pref.toggle(), ThemeMode::Light);
        assert_eq!(persisted(&store).as_deref(), Some("light-mode"));
        assert_eq!(pref.toggle(), original);
        assert_eq!(persisted(&store), before);
    }

    #[test]
    fn store_failures_are_not_fatal() {
        let mut pref = ThemePreference::load(Box::new(Broken));
        assert_eq!(pref.mode(), ThemeMode::Light);
        assert_eq!(pref.toggle(), ThemeMode::Dark);
    }
}
