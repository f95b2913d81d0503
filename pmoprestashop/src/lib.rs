//! # pmoprestashop - Client pour le webservice PrestaShop
//!
//! Ce crate fournit un client synchrone pour l'API REST/XML de PrestaShop:
//! construction d'URLs depuis des options structurées, requêtes HTTP
//! authentifiées (Basic), interprétation des statuts, parsing XML et
//! remplissage récursif de schémas de ressources.
//!
//! ## Fonctionnalités
//!
//! - Opérations CRUD (`get`, `head`, `add`, `edit`, `delete`) et variantes JSON
//! - Récupération de schémas vierges (`schema=blank`) et remplissage depuis
//!   une structure de données associative, champs multi-langues compris
//! - Négociation de version via l'en-tête `PSWS-Version`
//! - Erreurs typées (statut, raison, corps d'erreur parsé)
//!
//! ## Example
//!
//! ```rust,no_run
//! use pmoprestashop::{PrestashopWebService, RequestOptions};
//!
//! fn main() -> pmoprestashop::Result<()> {
//!     let ws = PrestashopWebService::new(
//!         "https://mystore.example.com",
//!         "ZQ88PRJX5VWQHCWE4EE7SQ7HPNX00RAJ",
//!         false,
//!     )?;
//!
//!     let orders = ws.get(&RequestOptions::resource("orders").with_param("limit", "5"))?;
//!     for child in orders.children.iter().filter_map(|n| n.as_element()) {
//!         println!("{}", child.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod debug;
pub mod errors;
pub mod options;
pub mod schema;
pub mod transport;
pub mod xml;

pub use client::{BLANK_SCHEMA, PrestashopWebService};
pub use config::PrestashopConfig;
pub use debug::{ConsoleSink, DebugSink, HtmlSink};
pub use errors::{PrestashopError, Result, SchemaError};
pub use options::{GET_PARAM_FRAGMENTS, HEAD_PARAM_FRAGMENTS, RequestOptions, ResourceId};
pub use schema::{FillOptions, SchemaValue, fill_schema};
pub use transport::{
    DEFAULT_TIMEOUT, PS_COMPATIBLE_VERSION_MAX, PS_COMPATIBLE_VERSION_MIN, is_version_supported,
};
pub use xml::{element_text, to_xml_string};
