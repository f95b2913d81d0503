//! Couche de transport HTTP vers le webservice PrestaShop
//!
//! Ce module exécute les requêtes synchrones (authentification Basic,
//! politique TLS, timeout), interprète les codes de statut et négocie la
//! version du webservice exposée par l'en-tête `PSWS-Version`.

use std::cmp::Ordering;
use std::sync::RwLock;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use indexmap::IndexMap;
use tracing::{debug, warn};
use ureq::Agent;
use ureq::tls::TlsConfig;
use url::Url;

use crate::debug::{ConsoleSink, DebugSink};
use crate::errors::{PrestashopError, Result};
use crate::xml;

/// Versions de PrestaShop compatibles avec cette bibliothèque
pub const PS_COMPATIBLE_VERSION_MIN: &str = "1.4.0.0";
pub const PS_COMPATIBLE_VERSION_MAX: &str = "1.7.99.99";

/// En-tête de réponse portant la version du webservice
const VERSION_HEADER: &str = "psws-version";

const CONTENT_TYPE_XML: &str = r#"text/xml; charset="utf-8""#;

/// Timeout global par défaut des requêtes
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Verbe HTTP d'une opération du webservice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

/// Réponse brute d'une requête: statut, corps et en-têtes
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
    pub header_block: String,
    pub headers: IndexMap<String, String>,
}

/// Transport bas-niveau: un agent ureq configuré, la clé d'API et la
/// version négociée
pub(crate) struct Transport {
    agent: Agent,
    base_url: String,
    key: String,
    debug: bool,
    sink: Box<dyn DebugSink>,
    version: RwLock<Option<String>>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("agent", &self.agent)
            .field("base_url", &self.base_url)
            .field("key", &self.key)
            .field("debug", &self.debug)
            .field("version", &self.version)
            .finish()
    }
}

impl Transport {
    /// Construit le transport. Échoue immédiatement si l'URL de base est
    /// invalide ou si la clé est vide.
    pub(crate) fn new(
        base_url: &str,
        key: &str,
        debug: bool,
        local_environment: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| PrestashopError::Configuration(format!("Invalid shop URL: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(PrestashopError::Configuration(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }
        if key.is_empty() {
            return Err(PrestashopError::Configuration(
                "Empty webservice authentication key".to_string(),
            ));
        }

        // La vérification du certificat et de l'hôte reste active partout
        // sauf en environnement "local".
        let mut config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout));
        if local_environment {
            config = config.tls_config(TlsConfig::builder().disable_verification(true).build());
        }
        let agent: Agent = config.build().into();

        Ok(Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            debug,
            sink: Box::new(ConsoleSink),
            version: RwLock::new(None),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Remplace le sink de diagnostic (contexte terminal vs HTML embarqué)
    pub(crate) fn set_sink(&mut self, sink: Box<dyn DebugSink>) {
        self.sink = sink;
    }

    /// Dernière version du webservice annoncée par le serveur
    pub(crate) fn version(&self) -> Option<String> {
        self.version.read().unwrap().clone()
    }

    /// Exécute une requête et retourne la réponse brute.
    ///
    /// La version annoncée par `PSWS-Version` est validée avant tout
    /// traitement du corps; une version hors plage abandonne la requête
    /// sans mettre à jour la version mémorisée.
    pub(crate) fn execute(
        &self,
        verb: Verb,
        url: &str,
        body: Option<&str>,
    ) -> Result<RawResponse> {
        debug!("{} {}", verb.as_str(), url);

        let auth = format!("Basic {}", STANDARD.encode(format!("{}:", self.key)));
        let result = match verb {
            Verb::Get => self.agent.get(url).header("Authorization", &auth).call(),
            Verb::Head => self.agent.head(url).header("Authorization", &auth).call(),
            Verb::Delete => self.agent.delete(url).header("Authorization", &auth).call(),
            Verb::Post => self
                .agent
                .post(url)
                .header("Authorization", &auth)
                .header("Content-Type", CONTENT_TYPE_XML)
                .send(body.unwrap_or_default()),
            Verb::Put => self
                .agent
                .put(url)
                .header("Authorization", &auth)
                .header("Content-Type", CONTENT_TYPE_XML)
                .send(body.unwrap_or_default()),
        };

        let mut response = result.map_err(|e| {
            PrestashopError::Transport(format!("HTTP request failed for {url}: {e}"))
        })?;

        let status = response.status().as_u16();
        let mut header_block = format!("{:?} {}\r\n", response.version(), response.status());
        let mut headers = IndexMap::new();
        for (name, value) in response.headers() {
            let value = value.to_str().unwrap_or_default().to_string();
            header_block.push_str(&format!("{}: {}\r\n", name, value));
            headers.insert(name.as_str().to_string(), value);
        }

        if let Some(announced) = headers.get(VERSION_HEADER) {
            self.check_version_supported(announced)?;
            *self.version.write().unwrap() = Some(announced.clone());
        }

        let response_body = if verb == Verb::Head {
            String::new()
        } else {
            response.body_mut().read_to_string().map_err(|e| {
                PrestashopError::Transport(format!("Failed to read response body: {e}"))
            })?
        };

        if self.debug {
            self.sink
                .emit("HTTP REQUEST HEADER", &format!("{} {}", verb.as_str(), url));
            self.sink.emit("HTTP RESPONSE HEADER", &header_block);
            if matches!(verb, Verb::Post | Verb::Put) {
                self.sink.emit("XML SENT", body.unwrap_or_default());
            }
            if !matches!(verb, Verb::Delete | Verb::Head) {
                self.sink.emit("RETURN HTTP BODY", &response_body);
            }
        }

        Ok(RawResponse {
            status,
            body: response_body,
            header_block,
            headers,
        })
    }

    /// Valide le statut: seuls 200 et 201 passent, les statuts reconnus
    /// deviennent une erreur de requête structurée, le reste une erreur de
    /// transport générique.
    pub(crate) fn check_request(&self, response: &RawResponse) -> Result<()> {
        if response.status == 200 || response.status == 201 {
            return Ok(());
        }

        let reason = match response.status {
            204 => "No content",
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            other => {
                warn!("Unexpected HTTP status {} from webservice", other);
                return Err(PrestashopError::Transport(format!(
                    "This call to PrestaShop Web Services returned an unexpected HTTP status of: {other}"
                )));
            }
        };

        warn!("Webservice error {}: {}", response.status, reason);
        Err(PrestashopError::Request {
            status: response.status,
            reason: reason.to_string(),
            body: xml::parse_xml_suppressed(&response.body),
        })
    }

    fn check_version_supported(&self, version: &str) -> Result<()> {
        if is_version_supported(version) {
            Ok(())
        } else {
            Err(PrestashopError::UnsupportedVersion(version.to_string()))
        }
    }
}

/// Vérifie qu'une version de PrestaShop est dans la plage supportée
pub fn is_version_supported(version: &str) -> bool {
    compare_versions(version, PS_COMPATIBLE_VERSION_MIN) != Ordering::Less
        && compare_versions(version, PS_COMPATIBLE_VERSION_MAX) != Ordering::Greater
}

/// Comparaison numérique composant par composant (les composants absents
/// valent zéro: "1.4" == "1.4.0.0")
fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = version_components(a);
    let right = version_components(b);
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn version_components(version: &str) -> Vec<u32> {
    version
        .trim()
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}
