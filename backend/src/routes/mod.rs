//! Route definitions for the stock ledger API

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/movements", movement_routes())
        .nest("/products", product_routes())
        .route("/variants/:id", delete(handlers::delete_variant))
        .route(
            "/variants/:id/selling-price",
            put(handlers::set_variant_selling_price),
        )
        .nest("/supplier-prices", supplier_price_routes())
        .route(
            "/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route("/taxes", get(handlers::list_taxes).post(handlers::create_tax))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .nest("/dashboard", dashboard_routes())
        .nest("/notifications", notification_routes())
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
}

/// Ledger writes and queries
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route("/batch", post(handlers::create_movement_batch))
        .route("/transfer", post(handlers::transfer_stock))
        .route("/:id", get(handlers::get_movement))
}

/// Product catalog, stock levels and selling prices
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:id/deactivate", post(handlers::deactivate_product))
        .route("/:id/stock-level", post(handlers::set_stock_level))
        .route("/:id/reconcile", get(handlers::reconcile_stock))
        .route(
            "/:id/selling-price",
            put(handlers::set_product_selling_price),
        )
        .route(
            "/:id/selling-price-history",
            get(handlers::get_selling_price_history),
        )
        .route(
            "/:id/variants",
            get(handlers::list_variants).post(handlers::create_variant),
        )
        .route(
            "/:id/supplier-prices",
            get(handlers::list_supplier_prices).post(handlers::create_supplier_price),
        )
}

fn supplier_price_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", delete(handlers::delete_supplier_price))
        .route("/:id/price", put(handlers::update_supplier_price))
        .route("/:id/history", get(handlers::get_supplier_price_history))
        .route("/:id/exclusions", get(handlers::list_exclusions))
        .route(
            "/:id/exclusions/:variant_id",
            post(handlers::exclude_variant).delete(handlers::include_variant),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::get_dashboard_stats))
        .route("/charts", get(handlers::get_dashboard_charts))
}

/// Stock alerts, acknowledged per session
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/read-all", post(handlers::mark_all_notifications_read))
        .route("/:id/read", post(handlers::mark_notification_read))
}
