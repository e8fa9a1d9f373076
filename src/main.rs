use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;
use std::io;
use std::sync::Arc;

use taskledger::{
    auth::TokenService,
    config::Config,
    routes,
    services::{AccountService, TaskService},
    store::{postgres, MemoryStore, PgTaskStore, PgUserStore, TaskStore, UserStore},
    AppError,
};

fn startup_error(err: AppError) -> io::Error {
    log::error!("Startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let tokens = TokenService::with_ttl(&config.jwt_secret, Duration::hours(config.token_ttl_hours))
        .map_err(startup_error)?;

    let (users, tasks): (Arc<dyn UserStore>, Arc<dyn TaskStore>) = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url, config.database_max_connections)
                .await
                .map_err(startup_error)?;
            log::info!("Connected to database");
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
            (users, tasks)
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory and lost on restart");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            let tasks: Arc<dyn TaskStore> = store;
            (users, tasks)
        }
    };

    let accounts = web::Data::new(AccountService::new(users, tokens, config.bcrypt_cost));
    let task_service = web::Data::new(TaskService::new(tasks));

    log::info!("Starting TaskLedger server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(accounts.clone())
            .app_data(task_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
