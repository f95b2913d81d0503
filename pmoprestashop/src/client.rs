//! Client principal pour interagir avec le webservice PrestaShop
//!
//! Ce module fournit les opérations CRUD (`get`, `head`, `add`, `edit`,
//! `delete`), leurs variantes JSON et la récupération de schémas vierges.

use serde::de::DeserializeOwned;
use xmltree::Element;

use crate::config::PrestashopConfig;
use crate::debug::DebugSink;
use crate::errors::{PrestashopError, Result};
use crate::options::{
    GET_PARAM_FRAGMENTS, HEAD_PARAM_FRAGMENTS, RequestOptions, ResourceId, encode_query,
    percent_encode,
};
use crate::transport::{DEFAULT_TIMEOUT, RawResponse, Transport, Verb};
use crate::xml;

/// Type de schéma vierge (tous les champs vides)
pub const BLANK_SCHEMA: &str = "blank";

const JSON_FORMAT: &str = "JSON";

/// Client synchrone du webservice PrestaShop.
///
/// Une instance peut être partagée entre threads: le seul état mutable est
/// la version négociée, protégée par un verrou.
///
/// # Exemple
///
/// ```rust,no_run
/// use pmoprestashop::{PrestashopWebService, RequestOptions};
///
/// fn main() -> pmoprestashop::Result<()> {
///     let ws = PrestashopWebService::new(
///         "https://mystore.example.com",
///         "ZQ88PRJX5VWQHCWE4EE7SQ7HPNX00RAJ",
///         false,
///     )?;
///     let xml = ws.get(&RequestOptions::resource("orders").with_id(1))?;
///     println!("root: {}", xml.name);
///     Ok(())
/// }
/// ```
pub struct PrestashopWebService {
    transport: Transport,
}

impl PrestashopWebService {
    /// Crée un client pour la boutique donnée.
    ///
    /// Échoue immédiatement si l'URL est invalide ou la clé vide; aucune
    /// requête n'est émise à la construction.
    pub fn new(url: &str, key: &str, debug: bool) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(url, key, debug, false, DEFAULT_TIMEOUT)?,
        })
    }

    /// Crée un client depuis un objet de configuration
    pub fn from_config(config: &PrestashopConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(
                &config.url,
                &config.key,
                config.debug,
                config.is_local(),
                config.timeout(),
            )?,
        })
    }

    /// Remplace le sink de diagnostic (terminal par défaut)
    pub fn set_debug_sink(&mut self, sink: Box<dyn DebugSink>) {
        self.transport.set_sink(sink);
    }

    /// Dernière version du webservice annoncée par `PSWS-Version`
    pub fn version(&self) -> Option<String> {
        self.transport.version()
    }

    // ============ Lecture ============

    /// Récupère (GET) une ressource et retourne le document XML parsé
    pub fn get(&self, options: &RequestOptions) -> Result<Element> {
        let response = self.perform_get(options, None)?;
        xml::parse_xml(&response.body)
    }

    /// Variante JSON de `get` (`output_format=JSON`)
    pub fn get_json<T: DeserializeOwned>(&self, options: &RequestOptions) -> Result<T> {
        let response = self.perform_get(options, Some(JSON_FORMAT))?;
        parse_json(&response.body)
    }

    /// Requête HEAD; retourne le bloc d'en-têtes brut de la réponse
    pub fn head(&self, options: &RequestOptions) -> Result<String> {
        let response = self.perform_head(options, None)?;
        Ok(response.header_block)
    }

    /// Variante JSON de `head`
    pub fn head_json(&self, options: &RequestOptions) -> Result<String> {
        let response = self.perform_head(options, Some(JSON_FORMAT))?;
        Ok(response.header_block)
    }

    // ============ Écriture ============

    /// Crée (POST) une ressource depuis `post_xml`
    pub fn add(&self, options: &RequestOptions) -> Result<Element> {
        let response = self.perform_add(options, None)?;
        xml::parse_xml(&response.body)
    }

    /// Variante JSON de `add`
    pub fn add_json<T: DeserializeOwned>(&self, options: &RequestOptions) -> Result<T> {
        let response = self.perform_add(options, Some(JSON_FORMAT))?;
        parse_json(&response.body)
    }

    /// Modifie (PUT) une ressource depuis `put_xml`
    pub fn edit(&self, options: &RequestOptions) -> Result<Element> {
        let response = self.perform_edit(options, None)?;
        xml::parse_xml(&response.body)
    }

    /// Variante JSON de `edit`
    pub fn edit_json<T: DeserializeOwned>(&self, options: &RequestOptions) -> Result<T> {
        let response = self.perform_edit(options, Some(JSON_FORMAT))?;
        parse_json(&response.body)
    }

    /// Supprime (DELETE) une ou plusieurs ressources
    pub fn delete(&self, options: &RequestOptions) -> Result<()> {
        self.perform_delete(options, None).map(|_| ())
    }

    /// Variante JSON de `delete`
    pub fn delete_json(&self, options: &RequestOptions) -> Result<()> {
        self.perform_delete(options, Some(JSON_FORMAT)).map(|_| ())
    }

    // ============ Schémas ============

    /// Récupère le schéma d'une ressource (`schema=blank`, `schema=synopsis`, ...)
    pub fn get_schema(&self, resource: &str, schema_type: &str) -> Result<Element> {
        let url = format!(
            "{}/api/{}?schema={}",
            self.transport.base_url(),
            resource,
            percent_encode(schema_type)
        );
        self.get(&RequestOptions::url(url))
    }

    /// Récupère le schéma vierge d'une ressource, prêt à être rempli
    pub fn get_blank_schema(&self, resource: &str) -> Result<Element> {
        self.get_schema(resource, BLANK_SCHEMA)
    }

    // ============ Pipeline interne ============

    fn perform_get(
        &self,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) -> Result<RawResponse> {
        let url = self.build_read_url(options, GET_PARAM_FRAGMENTS, output_format)?;
        let response = self.transport.execute(Verb::Get, &url, None)?;
        self.transport.check_request(&response)?;
        Ok(response)
    }

    fn perform_head(
        &self,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) -> Result<RawResponse> {
        let url = self.build_read_url(options, HEAD_PARAM_FRAGMENTS, output_format)?;
        let response = self.transport.execute(Verb::Head, &url, None)?;
        self.transport.check_request(&response)?;
        Ok(response)
    }

    fn perform_add(
        &self,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) -> Result<RawResponse> {
        let body = options
            .post_xml
            .as_deref()
            .ok_or_else(|| bad_parameters("'post_xml' is required for add"))?;
        let mut url = match (&options.url, &options.resource) {
            (Some(url), _) => url.clone(),
            (None, Some(resource)) => {
                format!("{}/api/{}", self.transport.base_url(), resource)
            }
            (None, None) => return Err(bad_parameters("neither 'resource' nor 'url' given")),
        };
        self.append_extra_params(&mut url, options, output_format);

        let response = self.transport.execute(Verb::Post, &url, Some(body))?;
        self.transport.check_request(&response)?;
        Ok(response)
    }

    fn perform_edit(
        &self,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) -> Result<RawResponse> {
        let body = options
            .put_xml
            .as_deref()
            .ok_or_else(|| bad_parameters("'put_xml' is required for edit"))?;
        let mut url = match (&options.url, &options.resource) {
            (Some(url), _) => url.clone(),
            (None, Some(resource)) => {
                let id = match &options.id {
                    Some(ResourceId::Single(id)) => *id,
                    Some(ResourceId::Many(_)) => {
                        return Err(bad_parameters("'id' must be a single id for edit"));
                    }
                    None => return Err(bad_parameters("'id' is required for edit")),
                };
                format!("{}/api/{}/{}", self.transport.base_url(), resource, id)
            }
            (None, None) => return Err(bad_parameters("neither 'resource' nor 'url' given")),
        };
        self.append_extra_params(&mut url, options, output_format);

        let response = self.transport.execute(Verb::Put, &url, Some(body))?;
        self.transport.check_request(&response)?;
        Ok(response)
    }

    fn perform_delete(
        &self,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) -> Result<RawResponse> {
        let mut url = match (&options.url, &options.resource) {
            (Some(url), _) => url.clone(),
            (None, Some(resource)) => match &options.id {
                Some(ResourceId::Single(id)) => {
                    format!("{}/api/{}/{}", self.transport.base_url(), resource, id)
                }
                Some(ResourceId::Many(ids)) => {
                    let joined = ids
                        .iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join(",");
                    format!(
                        "{}/api/{}/?id=[{}]",
                        self.transport.base_url(),
                        resource,
                        joined
                    )
                }
                None => return Err(bad_parameters("'id' is required for delete")),
            },
            (None, None) => return Err(bad_parameters("neither 'resource' nor 'url' given")),
        };
        self.append_extra_params(&mut url, options, output_format);

        let response = self.transport.execute(Verb::Delete, &url, None)?;
        self.transport.check_request(&response)?;
        Ok(response)
    }

    /// URL des opérations de lecture: `url` verbatim, ou
    /// `{base}/api/{resource}[/{id}]?{params filtrés}`.
    fn build_read_url(
        &self,
        options: &RequestOptions,
        fragments: &[&str],
        output_format: Option<&str>,
    ) -> Result<String> {
        if let Some(url) = &options.url {
            let mut url = url.clone();
            if let Some(format) = output_format {
                append_query(&mut url, "output_format", format);
            }
            return Ok(url);
        }

        let resource = options
            .resource
            .as_ref()
            .ok_or_else(|| bad_parameters("neither 'resource' nor 'url' given"))?;
        let mut url = format!("{}/api/{}", self.transport.base_url(), resource);
        match &options.id {
            Some(ResourceId::Single(id)) => {
                url.push('/');
                url.push_str(&id.to_string());
            }
            Some(ResourceId::Many(_)) => {
                return Err(bad_parameters("a list of ids is only valid for delete"));
            }
            None => {}
        }

        let params = options.filtered_params(fragments);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&params));
        }
        if let Some(format) = output_format {
            append_query(&mut url, "output_format", format);
        }
        Ok(url)
    }

    /// Ajoute `id_shop`/`id_group_shop` et le format de sortie aux URLs des
    /// opérations d'écriture.
    fn append_extra_params(
        &self,
        url: &mut String,
        options: &RequestOptions,
        output_format: Option<&str>,
    ) {
        if let Some(id_shop) = options.id_shop {
            append_query(url, "id_shop", &id_shop.to_string());
        }
        if let Some(id_group_shop) = options.id_group_shop {
            append_query(url, "id_group_shop", &id_group_shop.to_string());
        }
        if let Some(format) = output_format {
            append_query(url, "output_format", format);
        }
    }
}

fn bad_parameters(detail: &str) -> PrestashopError {
    PrestashopError::BadParameters(detail.to_string())
}

fn append_query(url: &mut String, key: &str, value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(&percent_encode(key));
    url.push('=');
    url.push_str(&percent_encode(value));
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.is_empty() {
        return Err(PrestashopError::Transport(
            "HTTP response is empty".to_string(),
        ));
    }
    serde_json::from_str(body).map_err(PrestashopError::from)
}
