//! Document types stored in and returned from the search index.

use serde::{Deserialize, Serialize};

/// A value that can be indexed under an engine-assigned or caller-chosen id.
///
/// The paging service uses this to stamp ids onto documents after a
/// bulk upsert and onto documents read back from the backend.
pub trait Document {
    /// The document id, if one has been assigned.
    fn id(&self) -> Option<&str>;

    /// Assign the document id.
    fn set_id(&mut self, id: String);
}

/// A catalogue product, the demonstration document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock_available: i64,
}

impl Product {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            price: 0.0,
            stock_available: 0,
        }
    }

    /// The `n`-th product of the sample catalogue used by `seed` and tests.
    ///
    /// Ids are `"0"`, `"1"`, ...; prices and stock grow with `n`.
    pub fn sample(n: usize) -> Self {
        Self {
            id: Some(n.to_string()),
            name: format!("Name of {} product", n),
            description: format!("Description of {} product", n),
            price: n as f64 * 1.2,
            stock_available: n as i64 * 10,
        }
    }
}

impl Document for Product {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
