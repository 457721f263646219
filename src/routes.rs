use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{elevated, protected, public};
use crate::middleware::{admin_only_middleware, jwt_auth_middleware};
use crate::state::AppState;

/// Headroom above the file size limit for multipart framing and text fields
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let body_limit = usize::try_from(state.uploads.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public_routes())
        // Authenticated
        .nest("/api/user", user_routes(state.clone()))
        // Authenticated + admin role
        .nest("/api/admin", admin_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/queries", post(public::create_query))
        .route("/api/auth/register", post(public::register))
        .route("/api/auth/login", post(public::login))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(protected::get_profile).put(protected::update_profile))
        .route("/dashboard", get(protected::dashboard))
        .route(
            "/applications",
            get(protected::list_applications).post(protected::create_application),
        )
        .route("/applications/stats", get(protected::application_stats))
        .route("/applications/:id", get(protected::get_application))
        .route(
            "/applications/:id/documents",
            get(protected::list_documents).post(protected::upload_document),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use elevated::{applications, queries, users};

    Router::new()
        // Query triage
        .route("/queries", get(queries::list_queries))
        .route("/queries/stats", get(queries::query_stats))
        .route(
            "/queries/:id",
            get(queries::get_query)
                .put(queries::update_query)
                .delete(queries::delete_query),
        )
        // User management
        .route("/users", get(users::list_users))
        .route("/users/stats", get(users::user_stats))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Application management
        .route("/applications", get(applications::list_applications))
        .route("/applications/stats", get(applications::application_stats))
        .route(
            "/applications/:id",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        // Role check runs after the token check
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
