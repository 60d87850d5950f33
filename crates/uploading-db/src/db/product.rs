use async_trait::async_trait;
use sqlx::PgPool;
use uploading_core::models::Product;
use uploading_core::AppError;

use crate::traits::ProductLookup;

/// Read-only access to the host's `product_product` table
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductLookup for ProductRepository {
    async fn find_product(&self, product_id: i32) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, slug
            FROM product_product
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}
