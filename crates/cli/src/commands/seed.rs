//! Seed the product catalog from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - id: medjool-dates
//!   title: Medjool Dates
//!   description: Soft, sweet dates from the Jordan valley.
//!   price: "120.00"
//!   stock: 40
//!   category_id: pantry
//!   image: /static/img/dates.jpg
//! ```
//!
//! Existing products with the same id are updated in place, keeping their
//! original `created_at`.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info};

use souq_core::catalog::Product;
use souq_core::{Price, ProductId};
use souq_storefront::db::ProductRepository;

use super::CommandError;

/// One product entry in the seed file.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    price: Price,
    #[serde(default)]
    stock: u32,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl SeedProduct {
    fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(self.id.trim()),
            title: self.title.trim().to_owned(),
            description: self.description,
            price: self.price,
            stock: self.stock,
            category_id: self.category_id.filter(|c| !c.trim().is_empty()),
            image: self.image,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

/// Check ids are present and unique and titles are non-empty.
fn validate(entries: &[SeedProduct]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, entry) in entries.iter().enumerate() {
        let id = entry.id.trim();
        if id.is_empty() {
            errors.push(format!("entry {}: id is empty", i + 1));
        } else if !seen.insert(id) {
            errors.push(format!("entry {}: duplicate id '{id}'", i + 1));
        }
        if entry.title.trim().is_empty() {
            errors.push(format!("entry {}: title is empty", i + 1));
        }
    }

    errors
}

fn parse(content: &str) -> Result<Vec<SeedProduct>, CommandError> {
    let entries: Vec<SeedProduct> = serde_yaml::from_str(content)?;

    let errors = validate(&entries);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::InvalidSeed(format!(
            "{} validation error(s) found",
            errors.len()
        )));
    }

    Ok(entries)
}

/// Insert or update every product in `file_path`.
pub async fn products(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");

    // Validate the whole file before touching the database
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let entries = parse(&content)?;
    info!(count = entries.len(), "Parsed seed file");

    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);
    let now = Utc::now();

    for entry in entries {
        let product = entry.into_product(now);
        repo.upsert(&product).await?;
        info!(id = %product.id, "Seeded product");
    }

    info!("Seeding complete!");
    Ok(())
}
