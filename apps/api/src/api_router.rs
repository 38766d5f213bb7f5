use agora_core::AppError;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let category_routes = Router::new()
        .route(
            "/api/categories",
            post(handlers::categories::create_category_handler)
                .put(handlers::categories::update_categories_handler),
        )
        .route(
            "/api/categories/{cid}",
            get(handlers::categories::get_category_handler)
                .delete(handlers::categories::delete_category_handler),
        )
        .route(
            "/api/categories/{cid}/privileges",
            get(handlers::privileges::get_privileges_handler)
                .put(handlers::privileges::set_privilege_handler),
        )
        .route(
            "/api/categories/{cid}/privileges/{privilege}",
            put(handlers::privileges::give_privilege_handler)
                .delete(handlers::privileges::rescind_privilege_handler),
        )
        .route(
            "/api/audit-log",
            get(handlers::audit::list_audit_log_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_caller,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(category_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
