use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::request::{ErrorBody, HealthResponse, SentimentRequest, SentimentResponse};
use crate::scorer::Scorer;
use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{get, middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use log::{debug, error, warn};
use std::sync::Arc;

/// Paths the sentiment endpoint is reachable on
pub const SENTIMENT_ROUTES: [&str; 2] = ["/api/sentiment", "/analyze-sentiment"];

/// Score the `text` field of a JSON body
async fn analyze(
    scorer: web::Data<dyn Scorer>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    let body = body.map_err(|err| {
        let err = ApiError::from(err);
        warn!("Rejecting sentiment request body: {}", err);
        err
    })?;
    let request = SentimentRequest::from_body(&body).map_err(|err| {
        warn!("Rejecting sentiment request: {}", err);
        err
    })?;
    let sentiment = scorer.score(request.text()).map_err(|err| {
        error!("Error while scoring text: {}", err);
        err
    })?;
    debug!("Scored {} bytes of text as {}", request.text().len(), sentiment);
    Ok(HttpResponse::Ok().json(SentimentResponse { sentiment }))
}

/// Liveness check
#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse { status: "ok" })
}

/// 404 page
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND).json(ErrorBody {
        error: String::from("not_found"),
        message: format!("no route for {} {}", req.method(), req.path()),
    })
}

/// Registers every route of the service.
///
/// The scorer is expected as `web::Data<dyn Scorer>` app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        // non-POST methods fall through to the resource default, a 405
        web::resource(SENTIMENT_ROUTES).route(web::post().to(analyze)),
    );
}

pub fn run(config: ServerConfig, scorer: Arc<dyn Scorer>) -> std::io::Result<Server> {
    let scorer: web::Data<dyn Scorer> = web::Data::from(scorer);
    let payload_limit = config.max_body_bytes;
    let create_app = move || {
        App::new()
            .app_data(scorer.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(middleware::Logger::default())
            .configure(routes)
            .default_service(web::to(not_found))
    };

    HttpServer::new(create_app)
        .workers(config.workers)
        .bind(config.bind_address())
        .map(|server| server.run())
}
