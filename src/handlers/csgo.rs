// src/handlers/csgo.rs
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::http::header;
use log::debug;
use crate::config::Config;
use crate::models::status::ServerStatus;
use crate::parser::parse_status;
use crate::transport::{RemoteExec, TransportError};
use crate::utils::{check_rate_limit, client_ip, IpRateLimiter, RequestError};

/// Dumps the `game_*` cvars and the status block in one round trip.
pub const STATUS_COMMAND: &str = "cvarlist game_; status";

pub async fn fetch_status(exec: &dyn RemoteExec) -> Result<ServerStatus, TransportError> {
    let raw = exec.exec(STATUS_COMMAND).await?;
    Ok(parse_status(&raw))
}

pub async fn get_status(
    req: HttpRequest,
    exec: web::Data<dyn RemoteExec>,
    rate_limiter: web::Data<IpRateLimiter>,
    config: web::Data<Config>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = client_ip(&req)?;
    check_rate_limit(&rate_limiter, peer_ip)?;

    let status = fetch_status(exec.get_ref()).await?;
    debug!(
        "{} on {} ({}), {} humans, {} bots",
        status.game_mode, status.map_name, peer_ip, status.player_count, status.bot_count
    );

    Ok(HttpResponse::Ok()
        .insert_header((
            header::CACHE_CONTROL,
            format!("public, max-age={}", config.status_cache_max_age),
        ))
        .json(status))
}
