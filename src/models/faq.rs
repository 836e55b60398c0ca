//! FAQ model.

use serde::{Deserialize, Serialize};

/// A frequently asked question from the catalog seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
}
