use serde::Deserialize;

/* --------- Minimal serde mapping for the full-text search JSON --------- */

#[derive(Deserialize)]
pub(crate) struct SearchEnvelope {
    pub(crate) hits: Option<HitsNode>,
}

#[derive(Deserialize)]
pub(crate) struct HitsNode {
    #[serde(default)]
    pub(crate) hits: Vec<Hit>,
    pub(crate) total: Option<Total>,
}

/// Elasticsearch reports the total either as `{"value": n, ...}` or as a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Total {
    Object { value: u64 },
    Bare(u64),
}

impl Total {
    pub(crate) fn value(&self) -> u64 {
        match self {
            Total::Object { value } | Total::Bare(value) => *value,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "_id")]
    pub(crate) id: Option<String>,
    #[serde(rename = "_source")]
    pub(crate) source: Option<HitSource>,
}

#[derive(Deserialize)]
pub(crate) struct HitSource {
    pub(crate) adsh: Option<String>,
    pub(crate) accession_no: Option<String>,
    #[serde(default)]
    pub(crate) ciks: Vec<String>,
    /// Seen both as a string and as a number.
    pub(crate) cik: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) display_names: Vec<String>,
    pub(crate) entity_name: Option<String>,
    pub(crate) file_date: Option<String>,
}
