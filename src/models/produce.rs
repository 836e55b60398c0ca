//! Produce catalog models.

use serde::{Deserialize, Serialize};

/// A produce category as stored in the seed file, with its items nested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ProduceItem>,
}

/// A single produce item within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceItem {
    pub id: String,
    pub name: String,
    pub season: String,
}

/// A produce item merged with its owning category, as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceView {
    pub id: String,
    pub name: String,
    pub season: String,
    pub category_id: String,
    pub category_name: String,
}

impl ProduceView {
    pub fn new(item: &ProduceItem, category: &ProduceCategory) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            season: item.season.clone(),
            category_id: category.id.clone(),
            category_name: category.name.clone(),
        }
    }
}
