use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use orientation_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::SessionService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let session_service = SessionService::new(&config.session.secret, config.session.expires_in);
    let auth_service = AuthService::new(config.admin.clone(), session_service.clone());

    let notifier = ChangeNotifier::new();
    let student_service = StudentService::new(pool.clone(), notifier.clone());
    let draw_item_service = DrawItemService::new(pool.clone(), notifier.clone());
    let draw_engine = DrawEngine::new(
        pool.clone(),
        student_service.clone(),
        draw_item_service.clone(),
        notifier.clone(),
    );
    let live_service = LiveService::new(pool.clone(), &config.live);

    // Prime the feed before serving; spectators polling a cold feed would see
    // an empty disabled state until the first change signal.
    if let Err(e) = live_service.refresh().await {
        log::error!("Initial live feed sync failed: {e:?}");
    }

    tasks::spawn_all(live_service.clone(), notifier.clone(), &config.live);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(session_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(student_service.clone()))
            .app_data(web::Data::new(draw_item_service.clone()))
            .app_data(web::Data::new(draw_engine.clone()))
            .app_data(web::Data::new(live_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::student_config)
                    .configure(handlers::draw_config)
                    .configure(handlers::live_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
