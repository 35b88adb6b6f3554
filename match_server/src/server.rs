use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use match_engine::{
    events::{EventHandlers, EventProducers},
    InterestFlowApi,
    SqliteDatabase,
    StatsApi,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    notifier::notification_hooks,
    routes::{
        health,
        CancelInterestRoute,
        EligibilityRoute,
        MyInboxRoute,
        MyMatchesRoute,
        MyStatsRoute,
        SubmitInterestRoute,
        WithdrawInterestRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 256;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
        info!("🚀️ Database migrations are up to date");
    }
    let hooks = notification_hooks(config.notification_webhook_url.as_deref())?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    let _handler_tasks = handlers.start_handlers();
    match config.match_ttl {
        Some(ttl) => {
            let _worker =
                start_expiry_worker(db.clone(), producers.clone(), config.policy.clone(), ttl, config.expiry_interval);
        },
        None => info!("🚀️ Match expiry is disabled"),
    }
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let policy = config.policy.clone();
    let srv = HttpServer::new(move || {
        let interests_api = InterestFlowApi::new(db.clone(), producers.clone()).with_policy(policy.clone());
        let stats_api = StatsApi::new(db.clone());
        let json_config = web::JsonConfig::default()
            .error_handler(|e, _req| ServerError::InvalidRequestBody(e.to_string()).into());
        let query_config = web::QueryConfig::default()
            .error_handler(|e, _req| ServerError::InvalidRequestPath(e.to_string()).into());
        let api_scope = web::scope("/api")
            .service(SubmitInterestRoute::<SqliteDatabase>::new())
            .service(CancelInterestRoute::<SqliteDatabase>::new())
            .service(WithdrawInterestRoute::<SqliteDatabase>::new())
            .service(EligibilityRoute::<SqliteDatabase>::new())
            .service(MyStatsRoute::<SqliteDatabase>::new())
            .service(MyMatchesRoute::<SqliteDatabase>::new())
            .service(MyInboxRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mm::access_log"))
            .app_data(web::Data::new(interests_api))
            .app_data(web::Data::new(stats_api))
            .app_data(json_config)
            .app_data(query_config)
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
