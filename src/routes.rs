use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{admin, products, site};
use crate::middleware::{block_legacy_admin_paths, require_admin};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let enable_cors = state.config.security.enable_cors;

    let router = Router::new()
        // Public
        .route("/health", get(site::health))
        // Catalog API (writes behind the admin gate)
        .merge(product_routes(&state))
        // Admin session and page
        .merge(admin_routes(&state))
        // Storefront pages and static assets
        .merge(site_routes(&state))
        // Global middleware
        .layer(from_fn(block_legacy_admin_paths))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

fn product_routes(state: &AppState) -> Router<AppState> {
    let gate = from_fn_with_state(state.clone(), require_admin);
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_request_bytes());

    Router::new()
        // Collection
        .route(
            "/api/products",
            get(products::list).merge(
                post(products::create)
                    .route_layer(upload_limit)
                    .route_layer(gate.clone()),
            ),
        )
        // Single product
        .route(
            "/api/products/:id",
            get(products::get).merge(
                patch(products::update)
                    .delete(products::delete)
                    .route_layer(gate),
            ),
        )
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    let gate = from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route("/admin-login", get(admin::login_form).post(admin::login))
        .route("/admin-logout", get(admin::logout))
        .route(
            &state.config.admin_portal_path(),
            get(admin::portal).route_layer(gate),
        )
}

fn site_routes(state: &AppState) -> Router<AppState> {
    let public_dir = &state.config.server.public_dir;

    // Unmatched paths fall through to static files, then to the storefront page.
    let static_files = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .route_service("/product", ServeFile::new(public_dir.join("product.html")))
        .fallback_service(static_files)
}
