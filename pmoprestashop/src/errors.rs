//! Gestion des erreurs pour le client PrestaShop

use thiserror::Error;
use xmltree::Element;

use crate::xml;

/// Type Result personnalisé pour pmoprestashop
pub type Result<T> = std::result::Result<T, PrestashopError>;

/// Erreurs possibles lors de l'utilisation du webservice PrestaShop
#[derive(Error, Debug)]
pub enum PrestashopError {
    /// Erreur de configuration (URL invalide, clé vide, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Erreur de la source de configuration (anyhow)
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] anyhow::Error),

    /// Options de requête incomplètes pour l'opération demandée
    #[error("Bad parameters given: {0}")]
    BadParameters(String),

    /// Erreur de transport (connexion, statut inattendu, réponse vide)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Statut HTTP reconnu mais non-2xx, avec le corps d'erreur parsé si possible
    #[error(
        "This call to PrestaShop Web Services failed and returned an HTTP status of {status}. That means: {reason}."
    )]
    Request {
        status: u16,
        reason: String,
        body: Option<Element>,
    },

    /// Corps de réponse présent mais XML mal formé
    #[error("HTTP XML response is not parsable: {0}")]
    XmlParse(String),

    /// Erreur de parsing JSON (variantes output_format=JSON)
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Version PrestaShop hors de la plage supportée
    #[error(
        "This library is not compatible with this version of PrestaShop ({0}). Please upgrade/downgrade this library"
    )]
    UnsupportedVersion(String),

    /// Erreur de remplissage de schéma
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Erreurs du remplissage de schéma XML
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema document has no resource node under its root")]
    MissingResourceNode,

    #[error("Field '{0}' does not exist in the resource schema")]
    UnknownField(String),

    #[error("Field '{field}' has no translation for language {language} and no default (id 1) fallback")]
    MissingDefaultTranslation { field: String, language: u32 },

    #[error("Field '{0}' is not a multi-language field, translations cannot be applied")]
    NotTranslatable(String),

    #[error("List items under '{0}' must be mappings of element names")]
    UnnamedItem(String),
}

impl PrestashopError {
    /// Vérifie si l'erreur transporte un corps de réponse parsé
    pub fn has_response(&self) -> bool {
        matches!(self, PrestashopError::Request { body: Some(_), .. })
    }

    /// Retourne le corps XML parsé de l'erreur serveur, si disponible
    pub fn response(&self) -> Option<&Element> {
        match self {
            PrestashopError::Request { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Extrait le message d'erreur fourni par le serveur (errors/error/message)
    pub fn server_error_message(&self) -> Option<String> {
        let body = self.response()?;
        let errors = body.get_child("errors")?;
        let error = errors.get_child("error")?;
        let message = error.get_child("message")?;
        let text = xml::element_text(message);
        if text.is_empty() { None } else { Some(text) }
    }

    /// Extrait le code d'erreur fourni par le serveur (errors/error/code)
    pub fn server_error_code(&self) -> Option<u32> {
        let body = self.response()?;
        let code = body
            .get_child("errors")?
            .get_child("error")?
            .get_child("code")?;
        xml::element_text(code).trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_message_contains_status_and_reason() {
        let err = PrestashopError::Request {
            status: 404,
            reason: "Not Found".to_string(),
            body: None,
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not Found"));
        assert!(!err.has_response());
    }

    #[test]
    fn test_server_error_message_extraction() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop>
<errors>
<error>
<code><![CDATA[1]]></code>
<message><![CDATA[Invalid ID]]></message>
</error>
</errors>
</prestashop>"#;
        let element = Element::parse(body.as_bytes()).unwrap();
        let err = PrestashopError::Request {
            status: 404,
            reason: "Not Found".to_string(),
            body: Some(element),
        };
        assert!(err.has_response());
        assert_eq!(err.server_error_message().as_deref(), Some("Invalid ID"));
        assert_eq!(err.server_error_code(), Some(1));
    }
}
