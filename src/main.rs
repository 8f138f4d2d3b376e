use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use supercasa_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{OpenAiClient, TwilioWhatsApp, WompiGateway},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
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

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.token_expires_in);

    // Clientes externos
    let wompi = WompiGateway::new(config.wompi.clone());
    let twilio = TwilioWhatsApp::new(config.twilio.clone());
    let openai = OpenAiClient::new(config.openai.clone());

    // Servicios de dominio
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let product_service = ProductService::new(pool.clone());
    let package_service = PackageService::new(pool.clone());
    let points_service = PointsService::new(pool.clone());
    let order_service = OrderService::new(pool.clone(), points_service.clone());
    let promo_service = PromoService::new(pool.clone());
    let chat_service = ChatService::new(pool.clone(), openai);
    let notification_service =
        NotificationService::new(pool.clone(), twilio, chat_service.clone());
    let payment_service = PaymentService::new(
        pool.clone(),
        wompi,
        order_service.clone(),
        notification_service.clone(),
    );
    let admin_service = AdminService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(package_service.clone()))
            .app_data(web::Data::new(points_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(promo_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(swagger_config)
            .configure(handlers::auth_config)
            .configure(handlers::product_config)
            .configure(handlers::package_config)
            .configure(handlers::order_config)
            .configure(handlers::points_config)
            .configure(handlers::promo_config)
            .configure(handlers::payment_config)
            .configure(handlers::webhook_config)
            .configure(handlers::chat_config)
            .configure(handlers::admin_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
