//! Catalog snapshot module.
//!
//! Produce categories, farms, and FAQs are read from JSON seed files once at
//! startup into an immutable snapshot shared across requests. All queries are
//! linear scans with case-insensitive substring matching.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Farm, Faq, ProduceCategory, ProduceView};

/// Minimum length of a search query, after trimming.
pub const MIN_QUERY_LEN: usize = 2;

/// Combined search results across produce and farms.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub produce: Vec<ProduceView>,
    pub farms: Vec<Farm>,
}

/// Immutable catalog loaded at process start.
pub struct Catalog {
    categories: Vec<ProduceCategory>,
    farms: Vec<Farm>,
    faqs: Vec<Faq>,
}

impl Catalog {
    /// Load the catalog from `produce.json`, `farms.json`, and `faqs.json`
    /// in the given directory.
    pub fn load(data_dir: &Path) -> Result<Self, AppError> {
        let categories: Vec<ProduceCategory> = read_seed(&data_dir.join("produce.json"))?;
        let farms: Vec<Farm> = read_seed(&data_dir.join("farms.json"))?;
        let faqs: Vec<Faq> = read_seed(&data_dir.join("faqs.json"))?;

        Ok(Self {
            categories,
            farms,
            faqs,
        })
    }

    /// All produce items merged with their owning category, optionally
    /// filtered by category id and season (case-insensitive substring).
    pub fn produce(&self, category: Option<&str>, season: Option<&str>) -> Vec<ProduceView> {
        self.categories
            .iter()
            .filter(|c| match category {
                Some(wanted) => contains_ci(&c.id, wanted),
                None => true,
            })
            .flat_map(|c| c.items.iter().map(|item| ProduceView::new(item, c)))
            .filter(|view| match season {
                Some(wanted) => contains_ci(&view.season, wanted),
                None => true,
            })
            .collect()
    }

    /// Look up a single produce item by id, merged with its category.
    pub fn produce_by_id(&self, id: &str) -> Option<ProduceView> {
        self.categories.iter().find_map(|c| {
            c.items
                .iter()
                .find(|item| item.id == id)
                .map(|item| ProduceView::new(item, c))
        })
    }

    /// Farms, optionally filtered by location (case-insensitive substring).
    pub fn farms(&self, location: Option<&str>) -> Vec<Farm> {
        self.farms
            .iter()
            .filter(|f| match location {
                Some(wanted) => contains_ci(&f.location, wanted),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// FAQs, optionally filtered by category (case-insensitive match).
    pub fn faqs(&self, category: Option<&str>) -> Vec<Faq> {
        self.faqs
            .iter()
            .filter(|f| match category {
                Some(wanted) => f.category.eq_ignore_ascii_case(wanted),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Search produce by name or category name, and farms by name, location,
    /// or any specialty. OR-combined, case-insensitive substring matching.
    pub fn search(&self, query: &str) -> SearchResults {
        let produce = self
            .categories
            .iter()
            .flat_map(|c| c.items.iter().map(|item| ProduceView::new(item, c)))
            .filter(|view| contains_ci(&view.name, query) || contains_ci(&view.category_name, query))
            .collect();

        let farms = self
            .farms
            .iter()
            .filter(|f| {
                contains_ci(&f.name, query)
                    || contains_ci(&f.location, query)
                    || f.specialties.iter().any(|s| contains_ci(s, query))
            })
            .cloned()
            .collect();

        SearchResults { produce, farms }
    }

    /// Total number of produce items across all categories.
    pub fn produce_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn farm_count(&self) -> usize {
        self.farms.len()
    }

    pub fn faq_count(&self) -> usize {
        self.faqs.len()
    }
}

fn read_seed<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Catalog(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Catalog(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Case-insensitive substring containment.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
