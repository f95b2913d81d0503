//! Per-call request options and query parameter filtering.

use indexmap::IndexMap;

/// Query parameter name fragments recognized by `get`.
///
/// A parameter is forwarded when its key *contains* one of these fragments
/// (substring containment, not exact match): a key like `limit_by_date`
/// matches both `limit` and `date` and is forwarded once.
pub const GET_PARAM_FRAGMENTS: &[&str] = &[
    "filter",
    "display",
    "sort",
    "limit",
    "id_shop",
    "id_group_shop",
    "date",
    "price",
];

/// Narrower fragment list recognized by `head`.
pub const HEAD_PARAM_FRAGMENTS: &[&str] = &["filter", "display", "sort", "limit"];

/// Identifier of a resource: a single id, or a list of ids for bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceId {
    Single(u64),
    Many(Vec<u64>),
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Single(id)
    }
}

impl From<Vec<u64>> for ResourceId {
    fn from(ids: Vec<u64>) -> Self {
        ResourceId::Many(ids)
    }
}

/// Options describing a single webservice call.
///
/// Exactly one of `resource`/`url` must be set; the operations reject the
/// options before any network I/O otherwise.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub resource: Option<String>,
    pub id: Option<ResourceId>,
    pub url: Option<String>,
    pub post_xml: Option<String>,
    pub put_xml: Option<String>,
    pub id_shop: Option<u64>,
    pub id_group_shop: Option<u64>,
    /// Free-form query parameters, filtered by the operation's fragment list.
    pub params: IndexMap<String, String>,
}

impl RequestOptions {
    /// Options targeting a named resource collection (e.g. `categories`).
    pub fn resource(name: impl Into<String>) -> Self {
        RequestOptions {
            resource: Some(name.into()),
            ..Default::default()
        }
    }

    /// Options carrying a full URL, used verbatim.
    pub fn url(url: impl Into<String>) -> Self {
        RequestOptions {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_post_xml(mut self, xml: impl Into<String>) -> Self {
        self.post_xml = Some(xml.into());
        self
    }

    pub fn with_put_xml(mut self, xml: impl Into<String>) -> Self {
        self.put_xml = Some(xml.into());
        self
    }

    pub fn with_id_shop(mut self, id: u64) -> Self {
        self.id_shop = Some(id);
        self
    }

    pub fn with_id_group_shop(mut self, id: u64) -> Self {
        self.id_group_shop = Some(id);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameters whose key contains one of the given fragments, in
    /// insertion order.
    pub(crate) fn filtered_params(&self, fragments: &[&str]) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|(key, _)| fragments.iter().any(|fragment| key.contains(fragment)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// RFC 3986 unreserved-set percent encoding for query keys and values.
pub(crate) fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Render filtered parameters as a query string fragment.
pub(crate) fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
