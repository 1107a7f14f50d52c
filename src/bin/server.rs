use axum::{routing::get, Router};
use sitewatch_server::{api, config::Config, seed::SeedData};

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    sitewatch_server::telemetry::init_telemetry("sitewatch-server");

    if let Err(e) = run().await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> sitewatch_server::Result<()> {
    let config = Config::from_env()?;

    let seed = match &config.seed_file {
        Some(path) => {
            tracing::info!("Loading seed data from {}", path.display());
            SeedData::from_file(path)?
        }
        None if config.seed_demo_data => SeedData::demo(),
        None => SeedData::default(),
    };

    let (state, ingest_task) = api::AppState::spawn(seed, &config.feed)?;
    sitewatch_server::metrics::init_metrics(&state.snapshot());

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let app = app(state, &config.cors_origin, prometheus_layer, metric_handle)?;

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingest_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down server"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}

fn app(
    state: api::AppState,
    cors_origin: &str,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> sitewatch_server::Result<Router> {
    let origin = cors_origin
        .parse::<axum::http::HeaderValue>()
        .map_err(|e| sitewatch_server::Error::Config(format!("CORS_ORIGIN: {}", e)))?;

    let router = api::router(state)
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Span name: "METHOD /path"
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(|response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                    span.record("status", tracing::field::display(response.status()));
                    span.record("latency", tracing::field::debug(latency));
                    tracing::info!("request completed");
                }),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }));

    Ok(router)
}
