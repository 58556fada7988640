//! PostgreSQL ledger store

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use shared::{
    MovementFilter, SellingPriceHistory, StockMovement, StockTarget, SupplierPrice,
    SupplierPriceHistory,
};

use super::rows::{
    into_movements, MovementRow, SellingPriceHistoryRow, SupplierPriceHistoryRow, SupplierPriceRow,
    MOVEMENT_COLUMNS, SUPPLIER_PRICE_COLUMNS,
};
use super::{CommitOutcome, LedgerCommit, LedgerStore, StockWrite, TargetState};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

/// A missing parent row on insert means the caller referenced an unknown id
fn foreign_key_as_not_found(err: sqlx::Error, resource: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound(resource.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

/// Compare-and-swap one stock quantity; false when the row moved on
async fn swap_quantity(tx: &mut Transaction<'_, Postgres>, write: &StockWrite) -> AppResult<bool> {
    let result = match &write.target.variant_id {
        None => {
            sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = $1, updated_at = NOW()
                WHERE id = $2 AND stock_quantity = $3 AND is_active
                "#,
            )
            .bind(write.new_quantity)
            .bind(&write.target.product_id)
            .bind(write.expected)
            .execute(&mut **tx)
            .await?
        }
        Some(variant_id) => {
            sqlx::query(
                r#"
                UPDATE product_variants v
                SET stock_quantity = $1, updated_at = NOW()
                FROM products p
                WHERE v.id = $2 AND v.product_id = $3 AND v.stock_quantity = $4
                  AND p.id = v.product_id AND p.is_active
                "#,
            )
            .bind(write.new_quantity)
            .bind(variant_id)
            .bind(&write.target.product_id)
            .bind(write.expected)
            .execute(&mut **tx)
            .await?
        }
    };

    Ok(result.rows_affected() == 1)
}

/// Append one ledger row inside an open transaction
pub(crate) async fn insert_movement(tx: &mut Transaction<'_, Postgres>, movement: &StockMovement) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, variant_id, type, quantity, stock_before, stock_after,
            unit_cost, reference, reason, supplier_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.variant_id)
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.stock_before)
    .bind(movement.stock_after)
    .bind(movement.unit_cost)
    .bind(&movement.reference)
    .bind(&movement.reason)
    .bind(&movement.supplier_id)
    .bind(movement.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| foreign_key_as_not_found(e, "Supplier"))?;

    Ok(())
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn load_target(&self, target: &StockTarget) -> AppResult<TargetState> {
        let (is_active, product_quantity, product_cost) =
            sqlx::query_as::<_, (bool, i64, Decimal)>(
                "SELECT is_active, stock_quantity, cost_price FROM products WHERE id = $1",
            )
            .bind(&target.product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let (stock_quantity, cost_price) = match &target.variant_id {
            None => (product_quantity, product_cost),
            Some(variant_id) => {
                let (owner, quantity, cost) = sqlx::query_as::<_, (String, i64, Decimal)>(
                    "SELECT product_id, stock_quantity, cost_price FROM product_variants WHERE id = $1",
                )
                .bind(variant_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Variant".to_string()))?;

                if owner != target.product_id {
                    return Err(AppError::validation(
                        "variant_id",
                        "Variant does not belong to product",
                    ));
                }
                (quantity, cost)
            }
        };

        Ok(TargetState {
            target: target.clone(),
            stock_quantity,
            cost_price,
            is_active,
        })
    }

    async fn commit(&self, commit: &LedgerCommit) -> AppResult<CommitOutcome> {
        let mut tx = self.db.begin().await?;

        for write in &commit.writes {
            if !swap_quantity(&mut tx, write).await? {
                tx.rollback().await?;
                return Ok(CommitOutcome::Stale);
            }
        }
        for movement in &commit.movements {
            insert_movement(&mut tx, movement).await?;
        }

        tx.commit().await?;
        Ok(CommitOutcome::Committed)
    }

    async fn get_movement(&self, id: &str) -> AppResult<StockMovement> {
        let row = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {} FROM stock_movements WHERE id = $1",
            MOVEMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

        StockMovement::try_from(row)
    }

    async fn list_movements(&self, filter: &MovementFilter) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::text IS NULL OR product_id = $1)
              AND ($1::text IS NULL OR $2 OR variant_id IS NOT DISTINCT FROM $3)
              AND ($4::text IS NULL OR type = $4)
              AND ($5::timestamptz IS NULL OR created_at >= $5)
              AND ($6::timestamptz IS NULL OR created_at <= $6)
            ORDER BY seq DESC
            LIMIT $7 OFFSET $8
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(&filter.product_id)
        .bind(filter.all_variants)
        .bind(&filter.variant_id)
        .bind(filter.movement_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }

    async fn target_history(&self, target: &StockTarget) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE product_id = $1 AND variant_id IS NOT DISTINCT FROM $2
            ORDER BY seq
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(&target.product_id)
        .bind(&target.variant_id)
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }

    async fn find_supplier_price(
        &self,
        product_id: &str,
        supplier_id: &str,
    ) -> AppResult<Option<SupplierPrice>> {
        let row = sqlx::query_as::<_, SupplierPriceRow>(&format!(
            "SELECT {} FROM supplier_prices WHERE product_id = $1 AND supplier_id = $2",
            SUPPLIER_PRICE_COLUMNS
        ))
        .bind(product_id)
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(SupplierPrice::from))
    }

    async fn update_selling_price(&self, target: &StockTarget, price: Decimal) -> AppResult<Decimal> {
        let mut tx = self.db.begin().await?;

        let old = match &target.variant_id {
            None => {
                let old = sqlx::query_scalar::<_, Decimal>(
                    "SELECT selling_price FROM products WHERE id = $1 FOR UPDATE",
                )
                .bind(&target.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

                sqlx::query("UPDATE products SET selling_price = $1, updated_at = NOW() WHERE id = $2")
                    .bind(price)
                    .bind(&target.product_id)
                    .execute(&mut *tx)
                    .await?;
                old
            }
            Some(variant_id) => {
                let (owner, old) = sqlx::query_as::<_, (String, Decimal)>(
                    "SELECT product_id, price FROM product_variants WHERE id = $1 FOR UPDATE",
                )
                .bind(variant_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Variant".to_string()))?;

                if owner != target.product_id {
                    return Err(AppError::validation(
                        "variant_id",
                        "Variant does not belong to product",
                    ));
                }

                sqlx::query("UPDATE product_variants SET price = $1, updated_at = NOW() WHERE id = $2")
                    .bind(price)
                    .bind(variant_id)
                    .execute(&mut *tx)
                    .await?;
                old
            }
        };

        tx.commit().await?;
        Ok(old)
    }

    async fn update_supplier_price(
        &self,
        supplier_price_id: &str,
        price: Decimal,
    ) -> AppResult<Decimal> {
        let mut tx = self.db.begin().await?;

        let old = sqlx::query_scalar::<_, Decimal>(
            "SELECT price FROM supplier_prices WHERE id = $1 FOR UPDATE",
        )
        .bind(supplier_price_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier price".to_string()))?;

        sqlx::query("UPDATE supplier_prices SET price = $1, updated_at = NOW() WHERE id = $2")
            .bind(price)
            .bind(supplier_price_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(old)
    }

    async fn insert_selling_price_history(&self, entry: &SellingPriceHistory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO selling_price_history (id, product_id, variant_id, price, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(&entry.variant_id)
        .bind(entry.price)
        .bind(entry.created_at)
        .bind(&entry.created_by)
        .execute(&self.db)
        .await
        .map_err(|e| foreign_key_as_not_found(e, "Product"))?;

        Ok(())
    }

    async fn insert_supplier_price_history(&self, entry: &SupplierPriceHistory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO supplier_price_history (id, supplier_price_id, price, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.supplier_price_id)
        .bind(entry.price)
        .bind(entry.created_at)
        .bind(&entry.created_by)
        .execute(&self.db)
        .await
        .map_err(|e| foreign_key_as_not_found(e, "Supplier price"))?;

        Ok(())
    }

    async fn selling_price_history(&self, target: &StockTarget) -> AppResult<Vec<SellingPriceHistory>> {
        let rows = sqlx::query_as::<_, SellingPriceHistoryRow>(
            r#"
            SELECT id, product_id, variant_id, price, created_at, created_by
            FROM selling_price_history
            WHERE product_id = $1 AND variant_id IS NOT DISTINCT FROM $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(&target.product_id)
        .bind(&target.variant_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SellingPriceHistory::from).collect())
    }

    async fn supplier_price_history(
        &self,
        supplier_price_id: &str,
    ) -> AppResult<Vec<SupplierPriceHistory>> {
        let rows = sqlx::query_as::<_, SupplierPriceHistoryRow>(
            r#"
            SELECT id, supplier_price_id, price, created_at, created_by
            FROM supplier_price_history
            WHERE supplier_price_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(supplier_price_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SupplierPriceHistory::from).collect())
    }
}
