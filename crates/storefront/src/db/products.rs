//! Product catalog queries.
//!
//! The storefront only reads products; they are written by `souq-cli seed`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use souq_core::catalog::Product;
use souq_core::{Price, ProductId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    description: String,
    price: Price,
    stock: i32,
    category_id: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock {} for product {}",
                row.stock, row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            stock,
            category_id: row.category_id,
            image: row.image,
            created_at: row.created_at,
        })
    }
}

/// Repository for product reads and seeding.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row holds invalid data.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, stock, category_id, image, created_at
            FROM souq.products
            ORDER BY created_at DESC, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, stock, category_id, image, created_at
            FROM souq.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    /// Insert or replace a product. Used by the seeding command.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if stock does not fit the column.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let stock = i32::try_from(product.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("stock too large for {}", product.id))
        })?;

        sqlx::query(
            r"
            INSERT INTO souq.products
                (id, title, description, price, stock, category_id, image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                stock = EXCLUDED.stock,
                category_id = EXCLUDED.category_id,
                image = EXCLUDED.image
            ",
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(stock)
        .bind(&product.category_id)
        .bind(&product.image)
        .bind(product.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
