//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for bookserver.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://bookserver.db?mode=rwc"`).
    /// Use `"sqlite::memory:"` for throwaway databases.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// HMAC secret used to sign and verify session tokens.
    /// `None` means a random secret is generated for this process only.
    pub jwt_secret: Option<String>,

    /// Lifetime of freshly issued session tokens, in seconds.
    pub token_ttl_secs: i64,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

/// Default request body limit (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        Self {
            bind_address: env.or("BOOK_BIND", "0.0.0.0:8080"),
            database_url: env.or("BOOK_DATABASE_URL", "sqlite://bookserver.db?mode=rwc"),
            log_level: env.or("BOOK_LOG", "info"),
            log_json: env.flag("BOOK_LOG_JSON", false),
            cors_allowed_origins: env.non_empty("BOOK_CORS_ORIGINS"),
            enable_swagger: env.flag("BOOK_ENABLE_SWAGGER", true),
            jwt_secret: env.non_empty("BOOK_JWT_SECRET"),
            token_ttl_secs: env.parse("BOOK_TOKEN_TTL_SECS", 86_400),
            max_body_bytes: env.parse("BOOK_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }
}

impl Default for Config {
    /// Defaults suitable for tests: in-memory database, no Swagger.
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: false,
            jwt_secret: None,
            token_ttl_secs: 3_600,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_owned())
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        (self.0)(key)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.0)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
