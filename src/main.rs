use axum::{
    routing::{get, post},
    Router,
};
use exam_backend::{
    config::{get_config, init_config},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let app_state = AppState::new();

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let admin_api = Router::new()
        .route(
            "/api/admin/tests",
            get(routes::admin::list_tests).post(routes::admin::create_test),
        )
        .route(
            "/api/admin/tests/:id",
            get(routes::admin::get_test)
                .patch(routes::admin::update_test)
                .delete(routes::admin::delete_test),
        )
        .route(
            "/api/admin/tests/:id/questions",
            post(routes::admin::add_question),
        )
        .route(
            "/api/admin/tests/:id/questions/:question_id",
            axum::routing::patch(routes::admin::update_question)
                .delete(routes::admin::delete_question),
        )
        .route(
            "/api/admin/tests/:id/results",
            get(routes::admin::list_test_results),
        )
        .route(
            "/api/admin/attempts/:id",
            get(routes::admin::get_attempt),
        )
        .layer(axum::middleware::from_fn_with_state(
            exam_backend::middleware::rate_limit::new_rps_state(config.admin_rps),
            exam_backend::middleware::rate_limit::rps_middleware,
        ));

    let attempt_api = Router::new()
        .route("/api/attempts", post(routes::attempt::start_attempt))
        .route(
            "/api/attempts/user/:user_id",
            get(routes::attempt::attempts_for_user),
        )
        .route(
            "/api/attempts/test/:test_id",
            get(routes::attempt::attempts_for_test),
        )
        .route(
            "/api/attempts/:id/answers",
            post(routes::attempt::record_answer),
        )
        .route(
            "/api/attempts/:id/signals",
            post(routes::attempt::increment_signal),
        )
        .route(
            "/api/attempts/:id/submit",
            post(routes::attempt::submit_attempt),
        )
        .route(
            "/api/attempts/:id/result",
            get(routes::attempt::get_result),
        )
        .layer(axum::middleware::from_fn_with_state(
            exam_backend::middleware::rate_limit::new_rps_state(config.attempt_rps),
            exam_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(admin_api)
        .merge(attempt_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
