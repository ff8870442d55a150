use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use pets_service::{
    api::state::AppState,
    domain::pet::repository::PetRepository,
    infrastructure::{database::mongo_context::MongoContext, InMemoryPetRepository, MongoPetRepository},
    routes::public_routes,
    utils::{config::AppConfig, logging::init_logging},
};

#[tokio::main]
async fn main() -> std::io::Result<()> {

    let config = match AppConfig::global() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_filter) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let pets: Arc<dyn PetRepository> = match &config.database_url {
        Some(url) => match MongoContext::init(url, &config.database_name).await {
            Ok(context) => Arc::new(MongoPetRepository::new(&context)),
            Err(e) => {
                log::error!("Failed to connect to MongoDB: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::warn!("DATABASE_URL is not set, pets are kept in memory only");
            Arc::new(InMemoryPetRepository::new())
        }
    };

    let app_state = AppState::new(pets);

    log::info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(public_routes)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
