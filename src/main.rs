use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use mentor_match::config::Settings;
use mentor_match::core::MatchMaker;
use mentor_match::logging::init_logging;
use mentor_match::routes::{self, AppState};
use tracing::{error, info, warn};
use validator::Validate;

fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);
    info!("Starting mentor matching service...");

    if let Err(e) = settings.validate() {
        error!("Invalid configuration: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }

    // The embedding client owns a blocking runtime and must be built outside the server runtime
    let matchmaker = MatchMaker::from_settings(&settings).map_err(|e| {
        error!("Failed to build matcher: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!(
        "Matcher initialized: {} weighted attributes, embedder '{}', max connections {}",
        matchmaker.schema().attributes().len(),
        matchmaker.embedder_name(),
        matchmaker.max_connections()
    );

    let app_state = AppState::new(matchmaker, &settings);
    if !app_state.auth.is_enabled() {
        warn!("auth.jwt_secret is not set, /matching/run is open to everyone");
    }

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let cors = Cors::permissive();

            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .app_data(routes::json_config())
                .wrap(cors)
                .wrap(middleware::Logger::default())
                .wrap(middleware::Compress::default())
                .configure(routes::configure_routes)
        })
        .workers(workers)
        .bind((host, port))?
        .run()
        .await
    })
}
