use std::env;
use std::path::PathBuf;

/// AppConfig
///
/// Holds the application's entire configuration state. The struct is immutable
/// once loaded and shared across all services (Repository, Storage, Auth Gate)
/// through the unified application state.
#[derive(Clone)]
pub struct AppConfig {
    // Connection string for the document store.
    pub mongo_uri: String,
    // Database name holding all business collections.
    pub db_name: String,
    // Secret used to sign and validate session tokens.
    pub jwt_secret: String,
    // Root of the publicly servable directory; uploaded media lands under
    // `<public_dir>/uploads` and `<public_dir>/uploadGallery`.
    pub public_dir: PathBuf,
    // Socket address the HTTP server binds.
    pub bind_addr: String,
    // Runtime environment marker. Controls log formatting and secret policy.
    pub env: Env,
}

/// Env
///
/// Runtime context switch between development conveniences (pretty logs,
/// fallback secrets) and production behavior (JSON logs, mandatory secrets).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking instance for test setup. Tests that never touch a
    /// live database can build application state without any environment
    /// variables being set.
    fn default() -> Self {
        Self {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            db_name: "decor_portal_test".to_string(),
            jwt_secret: "decor-portal-test-secret".to_string(),
            public_dir: PathBuf::from("public"),
            bind_addr: "0.0.0.0:3000".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// The canonical startup loader. Reads every parameter from environment
    /// variables and fails fast.
    ///
    /// # Panics
    /// Panics when `MONGODB_URI` is missing (in any environment), or when
    /// `JWT_SECRET` is missing in production. Starting without them would
    /// leave the service unable to persist data or unable to validate
    /// sessions.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The connection string is mandatory everywhere; there is no sensible
        // default pointing at somebody's database.
        let mongo_uri = env::var("MONGODB_URI").expect("FATAL: MONGODB_URI must be set");

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production")
            }
            _ => {
                env::var("JWT_SECRET").unwrap_or_else(|_| "decor-portal-local-secret".to_string())
            }
        };

        Self {
            mongo_uri,
            db_name: env::var("MONGODB_DB").unwrap_or_else(|_| "decor_portal".to_string()),
            jwt_secret,
            public_dir: PathBuf::from(
                env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            ),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            env,
        }
    }
}
