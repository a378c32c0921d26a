//! Product records and listing queries.
//!
//! The catalog is small enough to hold in memory, so listing pages are
//! produced by filtering, sorting and slicing the full product list rather
//! than by pushing the query down to the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::NewLineItem;
use crate::types::{Price, ProductId};

/// Products shown per listing page.
pub const PAGE_SIZE: usize = 8;

/// Results returned for the search box.
pub const SUGGESTION_LIMIT: usize = 5;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Units available as of the last catalog fetch.
    pub stock: u32,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether any units remain.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match against the title.
    #[must_use]
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.title.to_lowercase().contains(needle_lower)
    }

    /// Snapshot of this product for adding to a cart.
    #[must_use]
    pub fn to_line_item(&self) -> NewLineItem {
        NewLineItem {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            stock: self.stock,
            image: self.image.clone(),
        }
    }
}

/// Listing sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Newest first by default.
    #[default]
    CreatedAt,
    Price,
    Title,
}

impl SortField {
    /// Parse a sort key from a query string value. Unknown values fall back to
    /// the default.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price" => Self::Price,
            "title" => Self::Title,
            _ => Self::CreatedAt,
        }
    }

    /// Query string value for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Price => "price",
            Self::Title => "title",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a direction; anything other than `asc` means descending.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The other direction (for the sort toggle button).
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A product listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Free-text search over titles.
    pub text: String,
    /// Category filter; `None` or `"all"` shows every category.
    pub category: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
    /// 1-based page number.
    pub page: usize,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Page actually shown after clamping (1-based).
    pub page: usize,
    pub total_pages: usize,
    /// Number of products matching the filters across all pages.
    pub total_matches: usize,
}

impl ProductPage {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Filter, sort and paginate `products` according to `query`.
#[must_use]
pub fn list_products(products: &[Product], query: &ProductQuery) -> ProductPage {
    let needle = query.text.trim().to_lowercase();
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "all");

    let mut matches: Vec<&Product> = products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category_id.as_deref() == Some(c)))
        .filter(|p| p.matches_text(&needle))
        .collect();

    matches.sort_by(|a, b| {
        let ord = match query.sort {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total_matches = matches.len();
    let total_pages = total_matches.div_ceil(PAGE_SIZE).max(1);
    let page = query.page.clamp(1, total_pages);

    let products = matches
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    ProductPage {
        products,
        page,
        total_pages,
        total_matches,
    }
}

/// First few products whose title contains `text` (case-insensitive), in
/// catalog order. Blank input yields no suggestions.
#[must_use]
pub fn suggest(products: &[Product], text: &str) -> Vec<Product> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    products
        .iter()
        .filter(|p| p.matches_text(&needle))
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect()
}
