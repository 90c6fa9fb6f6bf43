// src/main.rs
mod config;
mod models;
mod handlers;
mod parser;
mod transport;
mod utils;

use actix_web::{ web, App, HttpServer, middleware };
use actix_web::body::MessageBody;
use actix_web::dev::{ Service, ServiceFactory, ServiceRequest, ServiceResponse };
use env_logger::Env;
use crate::config::{ Config, TransportConfig };
use crate::transport::RemoteExec;
use crate::utils::IpRateLimiter;
use log::info;

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    // journald stamps every line itself; $JOURNAL_STREAM is set by systemd v231+
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        builder.format_timestamp(None);
    }
    builder.init();
}

fn app(
    exec: web::Data<dyn RemoteExec>,
    status_rate_limiter: web::Data<IpRateLimiter>,
    config: web::Data<Config>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(exec)
        .app_data(status_rate_limiter)
        .app_data(config)
        .wrap(middleware::DefaultHeaders::new().add(("X-Robots-Tag", "noindex")))
        .wrap_fn(|req, srv| {
            utils::log_request(req.request());
            srv.call(req)
        })
        .route("/", web::get().to(handlers::index::index))
        .route("/robots.txt", web::get().to(handlers::index::robots))
        .route("/csgo", web::get().to(handlers::csgo::get_status))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::from_env();
    let bind = config.bind();

    match &config.transport {
        TransportConfig::Rcon { address, .. } => info!("Using RCON at {}", address),
        TransportConfig::ExecUrl(url) => info!("Using exec tunnel at {}", url),
    }

    let exec: web::Data<dyn RemoteExec> = match transport::from_config(&config) {
        Ok(exec) => web::Data::from(exec),
        Err(e) => {
            log::error!("Failed to set up game server transport: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let status_rate_limiter: web::Data<IpRateLimiter> =
        web::Data::new(IpRateLimiter::keyed(config.status_quota()));
    let config = web::Data::new(config);

    info!("Starting server on {}", bind);
    HttpServer::new(move || app(exec.clone(), status_rate_limiter.clone(), config.clone()))
        .client_request_timeout(std::time::Duration::from_secs(10))
        .client_disconnect_timeout(std::time::Duration::from_secs(10))
        .keep_alive(std::time::Duration::from_secs(10))
        .bind(&bind)?
        .run().await
}
