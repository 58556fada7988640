//! Catalog service: products, variants, suppliers, taxes, categories and
//! supplier prices
//!
//! Descriptive fields are edited here directly. Stock quantities are not:
//! an opening stock is written as an adjustment in the same transaction that
//! creates the row, and everything after goes through the mutation engine.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use shared::ids::{
    generate_id, CATEGORY_PREFIX, EXCLUSION_PREFIX, PRODUCT_PREFIX, SUPPLIER_PREFIX,
    SUPPLIER_PRICE_PREFIX, TAX_PREFIX, VARIANT_PREFIX,
};
use shared::{
    price_from_margin, validate_hex_color, validate_margin_percent, validate_sku,
    validate_thresholds, Category, CreateCategoryInput, CreateProductInput,
    CreateSupplierInput, CreateSupplierPriceInput, CreateTaxInput, CreateVariantInput, Product,
    ProductVariant, ProductWithVariants, StockTarget, Supplier, SupplierPrice, Tax,
    UpdateProductInput, VariantSupplierExclusion, DEFAULT_CATEGORY_COLOR, DEFAULT_SUPPLIER_COUNTRY,
    DEFAULT_UNIT,
};

use crate::error::{check, AppError, AppResult};
use crate::services::price_history::{PriceChange, PriceHistoryRecorder};
use crate::services::settings::SettingsService;
use crate::store::postgres::insert_movement;
use crate::store::rows::{
    CategoryRow, ExclusionRow, ProductRow, SupplierPriceRow, SupplierRow, TaxRow, VariantRow,
    PRODUCT_COLUMNS, SUPPLIER_PRICE_COLUMNS, VARIANT_COLUMNS,
};
use crate::store::{opening_stock_movement, PgStore};

/// Product listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub include_inactive: bool,
    pub category_id: Option<String>,
    /// Matches name, sku or barcode
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
    prices: PriceHistoryRecorder<PgStore>,
}

impl CatalogService {
    pub fn new(store: Arc<PgStore>) -> Self {
        Self {
            db: store.pool().clone(),
            prices: PriceHistoryRecorder::new(store),
        }
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(&self, query: &ProductQuery) -> AppResult<Vec<Product>> {
        let pattern = query
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {}
            FROM products
            WHERE ($1 OR is_active)
              AND ($2::text IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR sku ILIKE $3 OR barcode ILIKE $3)
            ORDER BY name
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(query.include_inactive)
        .bind(&query.category_id)
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products with their variants, for dashboards and alerting
    pub async fn list_products_with_variants(&self, active_only: bool) -> AppResult<Vec<ProductWithVariants>> {
        let products = self
            .list_products(&ProductQuery {
                include_inactive: !active_only,
                ..Default::default()
            })
            .await?;
        let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();

        let variant_rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {} FROM product_variants WHERE product_id = ANY($1) ORDER BY name",
            VARIANT_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_product: HashMap<String, Vec<ProductVariant>> = HashMap::new();
        for variant in variant_rows.into_iter().map(ProductVariant::from) {
            by_product
                .entry(variant.product_id.clone())
                .or_default()
                .push(variant);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductWithVariants {
                variants: by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }

    async fn fetch_product(&self, id: &str) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Product::from)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn get_product(&self, id: &str) -> AppResult<ProductWithVariants> {
        let product = self.fetch_product(id).await?;
        let variants = self.list_variants(id).await?;
        Ok(ProductWithVariants { product, variants })
    }

    /// Create a product, writing its opening stock to the ledger
    pub async fn create_product(
        &self,
        input: CreateProductInput,
        actor_id: Option<&str>,
    ) -> AppResult<Product> {
        input.validate()?;
        if let Some(sku) = &input.sku {
            check("sku", validate_sku(sku))?;
        }
        let stock_min = input.stock_min.unwrap_or(0);
        check("stock_max", validate_thresholds(stock_min, input.stock_max))?;

        let margin = match input.margin_percent {
            Some(margin) => margin,
            None => SettingsService::new(self.db.clone())
                .get_settings()
                .await?
                .default_margin,
        };
        check("margin_percent", validate_margin_percent(margin))?;

        let cost_price = input.cost_price.unwrap_or(Decimal::ZERO);
        let selling_price = input
            .selling_price
            .unwrap_or_else(|| price_from_margin(cost_price, margin));
        let opening_stock = input.initial_stock.unwrap_or(0);
        let id = generate_id(Some(PRODUCT_PREFIX));

        let mut tx = self.db.begin().await?;
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, description, category_id, cost_price, selling_price,
                margin_percent, tax_id, stock_quantity, stock_min, stock_max, unit, supplier_id, options
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&id)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category_id)
        .bind(cost_price)
        .bind(selling_price)
        .bind(margin)
        .bind(&input.tax_id)
        .bind(opening_stock)
        .bind(stock_min)
        .bind(input.stock_max)
        .bind(input.unit.as_deref().unwrap_or(DEFAULT_UNIT))
        .bind(&input.supplier_id)
        .bind(&input.options)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write_error(e, "sku"))?;

        if opening_stock > 0 {
            let opening = opening_stock_movement(&StockTarget::product(&id), opening_stock, Some(cost_price));
            insert_movement(&mut tx, &opening).await?;
        }
        tx.commit().await?;

        let product = Product::from(row);
        tracing::info!(product_id = %product.id, opening_stock, "Product created");

        if selling_price > Decimal::ZERO {
            if let Err(e) = self
                .prices
                .record_selling_price_change(&StockTarget::product(&product.id), selling_price, actor_id)
                .await
            {
                tracing::warn!(product_id = %product.id, error = %e, "Failed to record initial selling price");
            }
        }

        Ok(product)
    }

    /// Edit descriptive fields; absent fields keep their value, `null` clears nullable ones
    pub async fn update_product(&self, id: &str, input: UpdateProductInput) -> AppResult<Product> {
        input.validate()?;
        if let Some(Some(sku)) = &input.sku {
            check("sku", validate_sku(sku))?;
        }
        if let Some(margin) = input.margin_percent {
            check("margin_percent", validate_margin_percent(margin))?;
        }

        let product = self.fetch_product(id).await?.apply(input);
        check("stock_max", validate_thresholds(product.stock_min, product.stock_max))?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $2, sku = $3, barcode = $4, description = $5, category_id = $6,
                cost_price = $7, margin_percent = $8, tax_id = $9, stock_min = $10,
                stock_max = $11, unit = $12, supplier_id = $13, options = $14, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.cost_price)
        .bind(product.margin_percent)
        .bind(&product.tax_id)
        .bind(product.stock_min)
        .bind(product.stock_max)
        .bind(&product.unit)
        .bind(&product.supplier_id)
        .bind(&product.options)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_write_error(e, "sku"))?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(Product::from(row))
    }

    /// Soft delete; the ledger is kept
    pub async fn deactivate_product(&self, id: &str) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        tracing::info!(product_id = %id, "Product deactivated");
        Ok(Product::from(row))
    }

    /// Hard delete, only for products that never had a movement
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM stock_movements WHERE product_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            self.fetch_product(id).await?;
            return Err(AppError::Conflict(
                "Product has stock movements and can only be deactivated".to_string(),
            ));
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Variants
    // ------------------------------------------------------------------

    pub async fn list_variants(&self, product_id: &str) -> AppResult<Vec<ProductVariant>> {
        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {} FROM product_variants WHERE product_id = $1 ORDER BY name",
            VARIANT_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ProductVariant::from).collect())
    }

    pub async fn create_variant(
        &self,
        product_id: &str,
        input: CreateVariantInput,
        actor_id: Option<&str>,
    ) -> AppResult<ProductVariant> {
        input.validate()?;
        let product = self.fetch_product(product_id).await?;
        let stock_min = input.stock_min.unwrap_or(0);
        check("stock_max", validate_thresholds(stock_min, input.stock_max))?;

        let margin = input.margin_percent.unwrap_or(product.margin_percent);
        check("margin_percent", validate_margin_percent(margin))?;
        let cost_price = input.cost_price.unwrap_or(product.cost_price);
        let price = input
            .price
            .unwrap_or_else(|| price_from_margin(cost_price, margin));
        let opening_stock = input.initial_stock.unwrap_or(0);
        let id = generate_id(Some(VARIANT_PREFIX));

        let mut tx = self.db.begin().await?;
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            r#"
            INSERT INTO product_variants (
                id, product_id, name, sku, barcode, cost_price, margin_percent, price, tax_id,
                stock_quantity, stock_min, stock_max, supplier_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            VARIANT_COLUMNS
        ))
        .bind(&id)
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(cost_price)
        .bind(margin)
        .bind(price)
        .bind(&input.tax_id)
        .bind(opening_stock)
        .bind(stock_min)
        .bind(input.stock_max)
        .bind(&input.supplier_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write_error(e, "sku"))?;

        if opening_stock > 0 {
            let target = StockTarget::variant(product_id, &id);
            insert_movement(&mut tx, &opening_stock_movement(&target, opening_stock, Some(cost_price)))
                .await?;
        }
        tx.commit().await?;

        let variant = ProductVariant::from(row);
        tracing::info!(product_id, variant_id = %variant.id, opening_stock, "Variant created");

        if price > Decimal::ZERO {
            let target = StockTarget::variant(product_id, &variant.id);
            if let Err(e) = self.prices.record_selling_price_change(&target, price, actor_id).await {
                tracing::warn!(variant_id = %variant.id, error = %e, "Failed to record initial selling price");
            }
        }

        Ok(variant)
    }

    pub async fn get_variant(&self, id: &str) -> AppResult<ProductVariant> {
        sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {} FROM product_variants WHERE id = $1",
            VARIANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(ProductVariant::from)
        .ok_or_else(|| AppError::NotFound("Variant".to_string()))
    }

    /// Hard delete, only for variants that never had a movement
    pub async fn delete_variant(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM product_variants
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM stock_movements WHERE variant_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            self.get_variant(id).await?;
            return Err(AppError::Conflict(
                "Variant has stock movements and cannot be deleted".to_string(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Suppliers, taxes, categories
    // ------------------------------------------------------------------

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, email, phone, address, city, postal_code, country, notes,
                   is_active, created_at, updated_at
            FROM suppliers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (id, name, email, phone, address, city, postal_code, country, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, email, phone, address, city, postal_code, country, notes,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(generate_id(Some(SUPPLIER_PREFIX)))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(input.country.as_deref().unwrap_or(DEFAULT_SUPPLIER_COUNTRY))
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(Supplier::from(row))
    }

    pub async fn list_taxes(&self) -> AppResult<Vec<Tax>> {
        let rows = sqlx::query_as::<_, TaxRow>(
            "SELECT id, name, rate, is_default, created_at, updated_at FROM taxes ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Tax::from).collect())
    }

    /// A new default tax replaces the previous default
    pub async fn create_tax(&self, input: CreateTaxInput) -> AppResult<Tax> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        if input.is_default {
            sqlx::query("UPDATE taxes SET is_default = FALSE, updated_at = NOW() WHERE is_default")
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query_as::<_, TaxRow>(
            r#"
            INSERT INTO taxes (id, name, rate, is_default)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, rate, is_default, created_at, updated_at
            "#,
        )
        .bind(generate_id(Some(TAX_PREFIX)))
        .bind(&input.name)
        .bind(input.rate)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Tax::from(row))
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, parent_id, color, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        input.validate()?;
        let color = input.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR);
        check("color", validate_hex_color(color))?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, name, description, parent_id, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, parent_id, color, created_at, updated_at
            "#,
        )
        .bind(generate_id(Some(CATEGORY_PREFIX)))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.parent_id)
        .bind(color)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_write_error(e, "name"))?;

        Ok(Category::from(row))
    }

    // ------------------------------------------------------------------
    // Price edits
    // ------------------------------------------------------------------

    /// Set the selling price of a product, or of a variant looked up by id
    pub async fn update_selling_price(
        &self,
        product_id: Option<&str>,
        variant_id: Option<&str>,
        price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<PriceChange> {
        let target = match (product_id, variant_id) {
            (_, Some(variant_id)) => {
                let variant = self.get_variant(variant_id).await?;
                if product_id.is_some_and(|p| p != variant.product_id) {
                    return Err(AppError::validation(
                        "variant_id",
                        "Variant does not belong to product",
                    ));
                }
                StockTarget::variant(variant.product_id, variant.id)
            }
            (Some(product_id), None) => StockTarget::product(product_id),
            (None, None) => return Err(AppError::validation("product_id", "A product or variant is required")),
        };

        let change = self.prices.change_selling_price(&target, price, actor_id).await?;
        tracing::info!(stock_target = %target, old = %change.old_price, new = %change.new_price, "Selling price updated");
        Ok(change)
    }

    pub async fn update_supplier_price(
        &self,
        supplier_price_id: &str,
        price: Decimal,
        actor_id: Option<&str>,
    ) -> AppResult<PriceChange> {
        let change = self
            .prices
            .change_supplier_price(supplier_price_id, price, actor_id)
            .await?;
        tracing::info!(supplier_price_id, old = %change.old_price, new = %change.new_price, "Supplier price updated");
        Ok(change)
    }

    // ------------------------------------------------------------------
    // Supplier prices
    // ------------------------------------------------------------------

    pub async fn list_supplier_prices(&self, product_id: &str) -> AppResult<Vec<SupplierPrice>> {
        let rows = sqlx::query_as::<_, SupplierPriceRow>(&format!(
            r#"
            SELECT {}
            FROM supplier_prices
            WHERE product_id = $1
            ORDER BY is_preferred DESC, price
            "#,
            SUPPLIER_PRICE_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SupplierPrice::from).collect())
    }

    pub async fn get_supplier_price(&self, id: &str) -> AppResult<SupplierPrice> {
        sqlx::query_as::<_, SupplierPriceRow>(&format!(
            "SELECT {} FROM supplier_prices WHERE id = $1",
            SUPPLIER_PRICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(SupplierPrice::from)
        .ok_or_else(|| AppError::NotFound("Supplier price".to_string()))
    }

    /// Quote a supplier price. A preferred quote clears the other preferred
    /// quotes of the product in the same transaction.
    pub async fn create_supplier_price(
        &self,
        product_id: &str,
        input: CreateSupplierPriceInput,
        actor_id: Option<&str>,
    ) -> AppResult<SupplierPrice> {
        input.validate()?;
        self.fetch_product(product_id).await?;

        let mut tx = self.db.begin().await?;
        if input.is_preferred {
            sqlx::query(
                "UPDATE supplier_prices SET is_preferred = FALSE, updated_at = NOW() WHERE product_id = $1 AND is_preferred",
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }
        let row = sqlx::query_as::<_, SupplierPriceRow>(&format!(
            r#"
            INSERT INTO supplier_prices (
                id, product_id, supplier_id, price, min_quantity, lead_time_days,
                supplier_sku, purchase_url, is_preferred
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SUPPLIER_PRICE_COLUMNS
        ))
        .bind(generate_id(Some(SUPPLIER_PRICE_PREFIX)))
        .bind(product_id)
        .bind(&input.supplier_id)
        .bind(input.price)
        .bind(input.min_quantity.unwrap_or(1))
        .bind(input.lead_time_days)
        .bind(&input.supplier_sku)
        .bind(&input.purchase_url)
        .bind(input.is_preferred)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write_error(e, "supplier_id"))?;
        tx.commit().await?;

        let supplier_price = SupplierPrice::from(row);
        if let Err(e) = self
            .prices
            .record_supplier_price_change(&supplier_price.id, supplier_price.price, actor_id)
            .await
        {
            tracing::warn!(supplier_price_id = %supplier_price.id, error = %e, "Failed to record initial supplier price");
        }

        Ok(supplier_price)
    }

    pub async fn delete_supplier_price(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM supplier_prices WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier price".to_string()));
        }
        Ok(())
    }

    pub async fn list_exclusions(&self, supplier_price_id: &str) -> AppResult<Vec<VariantSupplierExclusion>> {
        let rows = sqlx::query_as::<_, ExclusionRow>(
            r#"
            SELECT id, variant_id, supplier_price_id, created_at
            FROM variant_supplier_exclusions
            WHERE supplier_price_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(supplier_price_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(VariantSupplierExclusion::from).collect())
    }

    /// Exclude a variant from a supplier price; excluding twice is a no-op
    pub async fn exclude_variant(
        &self,
        supplier_price_id: &str,
        variant_id: &str,
    ) -> AppResult<VariantSupplierExclusion> {
        let supplier_price = self.get_supplier_price(supplier_price_id).await?;
        let variant = self.get_variant(variant_id).await?;
        if variant.product_id != supplier_price.product_id {
            return Err(AppError::validation(
                "variant_id",
                "Variant does not belong to the supplier price's product",
            ));
        }

        let row = sqlx::query_as::<_, ExclusionRow>(
            r#"
            INSERT INTO variant_supplier_exclusions (id, variant_id, supplier_price_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (variant_id, supplier_price_id)
            DO UPDATE SET variant_id = EXCLUDED.variant_id
            RETURNING id, variant_id, supplier_price_id, created_at
            "#,
        )
        .bind(generate_id(Some(EXCLUSION_PREFIX)))
        .bind(variant_id)
        .bind(supplier_price_id)
        .fetch_one(&self.db)
        .await?;

        Ok(VariantSupplierExclusion::from(row))
    }

    pub async fn include_variant(&self, supplier_price_id: &str, variant_id: &str) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM variant_supplier_exclusions WHERE supplier_price_id = $1 AND variant_id = $2",
        )
        .bind(supplier_price_id)
        .bind(variant_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Exclusion".to_string()));
        }
        Ok(())
    }
}
