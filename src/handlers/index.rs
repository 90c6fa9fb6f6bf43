// src/handlers/index.rs
use actix_web::HttpResponse;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("application/json").body("{\"status\": \"ok\"}")
}

pub async fn robots() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("User-Agent: *\nDisallow: /\n")
}
