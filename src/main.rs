use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

use nexo_algo::config::Settings;
use nexo_algo::core::Matcher;
use nexo_algo::models::ScoringWeights;
use nexo_algo::routes;
use nexo_algo::routes::matches::AppState;
use nexo_algo::services::{EmbeddingClient, ReasonEngine, VectorStoreClient};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging (RUST_LOG overrides the configured level)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Nexo Algo matching service...");
    info!("Configuration loaded successfully");

    // Initialize embedding client with its content-keyed cache
    let embedding_cache_size = settings.cache.embedding_cache_size.unwrap_or(10_000);
    let embedding_ttl = settings.cache.embedding_ttl_secs.unwrap_or(3_600);

    let embeddings = Arc::new(EmbeddingClient::new(
        settings.azure_openai.endpoint.clone(),
        settings.azure_openai.api_key.clone(),
        settings.azure_openai.api_version.clone(),
        settings.azure_openai.embedding_deployment.clone(),
        settings.azure_openai.embedding_dimension,
        embedding_cache_size,
        embedding_ttl,
    ));

    info!(
        "Embedding client initialized (deployment: {}, dimension: {}, cache: {} entries / {}s TTL)",
        settings.azure_openai.embedding_deployment,
        settings.azure_openai.embedding_dimension,
        embedding_cache_size,
        embedding_ttl
    );

    // Initialize vector store client
    let vectors = Arc::new(VectorStoreClient::new(
        settings.qdrant.url.clone(),
        settings.qdrant.api_key.clone(),
        settings.qdrant.collection.clone(),
        settings.azure_openai.embedding_dimension,
    ));

    // Make sure the collection exists before serving traffic
    match vectors.ensure_collection().await {
        Ok(true) => info!("Created vector collection '{}'", settings.qdrant.collection),
        Ok(false) => info!("Vector collection '{}' ready", settings.qdrant.collection),
        Err(e) => {
            error!("Failed to reach vector index at {}: {}", settings.qdrant.url, e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "Vector index connection required",
            ));
        }
    }

    // Initialize reason engine
    let reasons = Arc::new(ReasonEngine::new(
        settings.azure_openai.endpoint.clone(),
        settings.azure_openai.api_key.clone(),
        settings.azure_openai.api_version.clone(),
        settings.azure_openai.chat_deployment.clone(),
        settings.azure_openai.max_completion_tokens,
    ));

    info!(
        "Reason engine initialized (deployment: {})",
        settings.azure_openai.chat_deployment
    );

    // Initialize matcher with configured weights
    let weights = ScoringWeights {
        similarity: settings.scoring.weights.similarity,
        work_area: settings.scoring.weights.work_area,
        sub_area: settings.scoring.weights.sub_area,
        complementarity: settings.scoring.weights.complementarity,
        size_match: settings.scoring.weights.size_match,
        size_diversity: settings.scoring.weights.size_diversity,
    };

    let matcher = Matcher::new(embeddings.clone(), vectors.clone(), reasons, weights);

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        matcher,
        embeddings,
        vectors,
        default_limit: settings.matching.default_limit.unwrap_or(10),
        max_limit: settings.matching.max_limit.unwrap_or(50),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
