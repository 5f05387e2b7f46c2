use crate::error::Error;
use crate::solarviz_log;
use crate::Result;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_PORT: u16 = 5050;
pub const DEFAULT_FRONTEND_PORT: u16 = 5100;
pub const DEFAULT_API_URL: &str = "http://localhost:5050";
pub const PRODUCTION_ORIGIN: &str = "https://fp-p7.fwe24.ivia.ch";

pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/api/rest_v1";
pub const NASA_IMAGES_API_URL: &str = "https://images-api.nasa.gov";
pub const NASA_API_URL: &str = "https://api.nasa.gov";
pub const SYSTEME_SOLAIRE_API_URL: &str = "https://api.le-systeme-solaire.net/rest";

/// Base URLs of the third-party APIs, overridable so tests can point at a local fake.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub wikipedia: String,
    pub nasa_images: String,
    pub nasa: String,
    pub nasa_api_key: String,
    pub systeme_solaire: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            wikipedia: WIKIPEDIA_API_URL.to_string(),
            nasa_images: NASA_IMAGES_API_URL.to_string(),
            nasa: NASA_API_URL.to_string(),
            nasa_api_key: "DEMO_KEY".to_string(),
            systeme_solaire: SYSTEME_SOLAIRE_API_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub port: u16,
    pub frontend_port: u16,
    pub data_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub upstream: UpstreamConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_BACKEND_PORT,
            frontend_port: DEFAULT_FRONTEND_PORT,
            data_dir: PathBuf::from("assets"),
            allowed_origins: allowed_origins(DEFAULT_FRONTEND_PORT),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl BackendConfig {
    /// Reads every recognised variable from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(port) = parse_var("BACKEND_PORT")? {
            config.port = port;
        }
        if let Some(port) = parse_var("VITE_FRONTEND_PORT")? {
            config.frontend_port = port;
            config.allowed_origins = allowed_origins(port);
        }
        if let Ok(dir) = env::var("SOLARVIZ_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(key) = env::var("NASA_API_KEY") {
            config.upstream.nasa_api_key = key;
        }
        if let Ok(url) = env::var("WIKIPEDIA_API_URL") {
            config.upstream.wikipedia = url;
        }
        if let Ok(url) = env::var("NASA_IMAGES_API_URL") {
            config.upstream.nasa_images = url;
        }
        if let Ok(url) = env::var("NASA_API_URL") {
            config.upstream.nasa = url;
        }
        if let Ok(url) = env::var("SYSTEME_SOLAIRE_API_URL") {
            config.upstream.systeme_solaire = url;
        }
        Ok(config)
    }
}

pub fn allowed_origins(frontend_port: u16) -> Vec<String> {
    vec![
        format!("http://localhost:{}", frontend_port),
        PRODUCTION_ORIGIN.to_string(),
    ]
}

/// `.env.production` when `NODE_ENV` is `production`, `.env.development` otherwise.
pub fn env_file_name(node_env: Option<&str>) -> &'static str {
    match node_env {
        Some("production") => ".env.production",
        _ => ".env.development",
    }
}

/// Loads the environment-specific dotenv file from `dir`, if there is one.
///
/// Variables already present in the process environment win.
pub fn load_env_file(dir: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let node_env = env::var("NODE_ENV").ok();
            dir.join(env_file_name(node_env.as_deref()))
        }
    };
    if !path.exists() {
        solarviz_log!(debug, "config", "No env file at {}", path.display());
        return Ok(None);
    }
    dotenvy::from_path(&path).map_err(|err| Error::EnvFile(path.display().to_string(), err))?;
    solarviz_log!(info, "config", "Loaded {}", path.display());
    Ok(Some(path))
}

fn parse_var(name: &str) -> Result<Option<u16>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_err| Error::InvalidConfigValue(name.to_string(), value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_01_env_file_selection() {
        assert_eq!(".env.production", env_file_name(Some("production")));
        assert_eq!(".env.development", env_file_name(Some("development")));
        assert_eq!(".env.development", env_file_name(None));
    }

    #[test]
    fn case_02_allowed_origins_follow_frontend_port() {
        let origins = allowed_origins(5173);
        assert_eq!("http://localhost:5173", origins[0]);
        assert!(origins.contains(&PRODUCTION_ORIGIN.to_string()));
    }

    #[test]
    fn case_03_missing_env_file_is_not_an_error() -> anyhow::Result<()> {
        let dir = env::temp_dir().join(format!("solarviz_{}", uuid::Uuid::new_v4()));
        let loaded = load_env_file(&dir, Some(&dir.join(".env.missing")))?;
        assert!(loaded.is_none());
        Ok(())
    }
}
