//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::console::{LocalObjectStorage, MockBackend, Navigator, SessionState};
use crate::domain::{EventBus, RecordStore};
use crate::identity::IdentityProvider;

/// Top-level configuration.
///
/// Loaded once at startup via [`GalleryConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Master switch for the snapshot file. When off, state lives in
    /// memory only.
    pub persistence_enabled: bool,

    /// Path of the JSON snapshot.
    pub snapshot_path: PathBuf,

    /// Seed the demo records when no snapshot exists.
    pub seed_demo_data: bool,

    /// Directory uploaded files are written to and served from.
    pub storage_root: PathBuf,

    /// URL prefix under which `storage_root` is served.
    pub public_base_url: String,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// How long the authorization gates wait for the user record.
    pub session_wait: Duration,

    /// Artificial latency of the in-process mock backend.
    pub mock_latency: Duration,

    /// Lifetime of issued bearer tokens.
    pub token_ttl: Duration,

    /// Password of the seeded demo accounts.
    pub demo_password: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            persistence_enabled: true,
            snapshot_path: PathBuf::from("data/snapshot.json"),
            seed_demo_data: true,
            storage_root: PathBuf::from("data/uploads"),
            public_base_url: "http://localhost:3000/files".to_string(),
            event_bus_capacity: 10_000,
            session_wait: Duration::from_millis(2000),
            mock_latency: Duration::from_millis(500),
            token_ttl: Duration::from_secs(3600),
            demo_password: "password123".to_string(),
        }
    }
}

impl GalleryConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the [`Default`] values when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.listen_addr,
        };

        Ok(Self {
            listen_addr,
            persistence_enabled: parse_env_bool("PERSISTENCE_ENABLED", defaults.persistence_enabled),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            seed_demo_data: parse_env_bool("SEED_DEMO_DATA", defaults.seed_demo_data),
            storage_root: std::env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            session_wait: parse_env_with("SESSION_WAIT_MS", Duration::from_millis)
                .unwrap_or(defaults.session_wait),
            mock_latency: parse_env_with("MOCK_LATENCY_MS", Duration::from_millis)
                .unwrap_or(defaults.mock_latency),
            token_ttl: parse_env_with("TOKEN_TTL_SECS", Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
            demo_password: std::env::var("DEMO_PASSWORD").unwrap_or(defaults.demo_password),
        })
    }
}

impl GalleryConfig {
    /// Object storage rooted at `storage_root`, publishing under
    /// `public_base_url`.
    #[must_use]
    pub fn object_storage(&self) -> LocalObjectStorage {
        LocalObjectStorage::new(&self.storage_root, &self.public_base_url)
    }

    /// Navigator whose gates wait `session_wait` for the user record.
    #[must_use]
    pub fn navigator(&self, identity: Arc<dyn IdentityProvider>, session: SessionState) -> Navigator {
        Navigator::new(identity, session, self.session_wait)
    }

    /// In-process backend over `store` answering after `mock_latency`.
    #[must_use]
    pub fn mock_backend(
        &self,
        store: Arc<RecordStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> MockBackend {
        MockBackend::new(store, EventBus::new(self.event_bus_capacity), identity, self.mock_latency)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as an integer and maps it.
fn parse_env_with<T>(key: &str, map: impl FnOnce(u64) -> T) -> Option<T> {
    std::env::var(key).ok()?.parse().ok().map(map)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::console::{Backend, GateDecision, Redirect};
    use crate::identity::{AccountRegistry, LocalIdentityProvider};
    use crate::persistence::seed::demo_records;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = GalleryConfig::default();
        assert_eq!(cfg.listen_addr.port(), 3000);
        assert_eq!(cfg.session_wait, Duration::from_millis(2000));
        assert_eq!(cfg.mock_latency, Duration::from_millis(500));
        assert_eq!(cfg.event_bus_capacity, 10_000);
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(parse_env("GUESTLENS_TEST_UNSET_NUMBER", 7_u64), 7);
        assert!(parse_env_bool("GUESTLENS_TEST_UNSET_BOOL", true));
        assert_eq!(parse_env_with("GUESTLENS_TEST_UNSET_MS", Duration::from_millis), None);
    }

    #[test]
    fn object_storage_publishes_under_base_url() {
        let cfg = GalleryConfig {
            public_base_url: "http://cdn.local/files".to_string(),
            ..GalleryConfig::default()
        };
        let storage = cfg.object_storage();
        assert_eq!(
            storage.url_for("events/e/q/1_a.jpg"),
            "http://cdn.local/files/events/e/q/1_a.jpg"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn console_builders_use_configured_timings() {
        let cfg = GalleryConfig {
            session_wait: Duration::from_millis(300),
            mock_latency: Duration::from_millis(40),
            ..GalleryConfig::default()
        };
        let accounts = Arc::new(AccountRegistry::new(Duration::from_secs(60)));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(LocalIdentityProvider::new(accounts));

        let store = Arc::new(RecordStore::from_records(demo_records(), None));
        let backend = cfg.mock_backend(store, Arc::clone(&identity));
        let started = tokio::time::Instant::now();
        let Ok(plans) = backend.list_plans().await else {
            panic!("plans failed");
        };
        assert_eq!(plans.len(), 3);
        assert!(started.elapsed() >= cfg.mock_latency);

        let Ok(_) = identity.sign_up("late@guest.com", "secret1", None) else {
            panic!("sign-up failed");
        };
        let navigator = cfg.navigator(identity, SessionState::new());
        let started = tokio::time::Instant::now();
        let decision = navigator.navigate("/events").await;
        assert!(started.elapsed() >= cfg.session_wait);
        assert_eq!(decision, GateDecision::Redirect(Redirect::to_login("/events")));
    }
}
