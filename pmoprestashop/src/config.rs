//! Configuration du client PrestaShop
//!
//! La configuration est chargée depuis un fichier YAML, puis surchargée par
//! les variables d'environnement `PRESTASHOP_*`. L'application hôte décide
//! du cycle de vie (instance partagée ou non).

use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::info;

const ENV_URL: &str = "PRESTASHOP_URL";
const ENV_KEY: &str = "PRESTASHOP_KEY";
const ENV_DEBUG: &str = "PRESTASHOP_DEBUG";
const ENV_ENVIRONMENT: &str = "PRESTASHOP_ENV";
const ENV_TIMEOUT: &str = "PRESTASHOP_TIMEOUT";

/// Marqueur d'environnement qui désactive la vérification TLS
const LOCAL_ENVIRONMENT: &str = "local";

fn default_environment() -> String {
    "production".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Paramètres de connexion au webservice
#[derive(Debug, Clone, Deserialize)]
pub struct PrestashopConfig {
    /// URL racine de la boutique (ex: `https://mystore.example.com`)
    pub url: String,
    /// Clé d'authentification du webservice
    pub key: String,
    /// Active le canal de diagnostic
    #[serde(default)]
    pub debug: bool,
    /// Nom d'environnement; `local` désactive la vérification TLS
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Timeout global des requêtes, en secondes
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PrestashopConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        PrestashopConfig {
            url: url.into(),
            key: key.into(),
            debug: false,
            environment: default_environment(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Charge la configuration depuis un fichier YAML
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: PrestashopConfig = serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(config_file = %path.display(), "Loaded PrestaShop webservice config");
        Ok(config)
    }

    /// Construit la configuration depuis les seules variables d'environnement
    pub fn from_env() -> Result<Self> {
        let url =
            env::var(ENV_URL).map_err(|_| anyhow!("{} environment variable not set", ENV_URL))?;
        let key =
            env::var(ENV_KEY).map_err(|_| anyhow!("{} environment variable not set", ENV_KEY))?;
        let mut config = PrestashopConfig::new(url, key);
        config.apply_env_overrides();
        Ok(config)
    }

    /// Charge le fichier YAML puis applique les surcharges d'environnement
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_yaml_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(ENV_URL) {
            self.url = url;
        }
        if let Ok(key) = env::var(ENV_KEY) {
            self.key = key;
        }
        if let Ok(debug) = env::var(ENV_DEBUG) {
            self.debug = matches!(debug.as_str(), "1" | "true" | "yes");
        }
        if let Ok(environment) = env::var(ENV_ENVIRONMENT) {
            self.environment = environment;
        }
        if let Ok(timeout) = env::var(ENV_TIMEOUT)
            && let Ok(secs) = timeout.parse()
        {
            self.timeout_secs = secs;
        }
    }

    /// Vrai si l'environnement est `local` (vérification TLS désactivée)
    pub fn is_local(&self) -> bool {
        self.environment == LOCAL_ENVIRONMENT
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
