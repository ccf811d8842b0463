// server/src/web/routes.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::web::handlers::{auth_handlers, dashboard_handlers, engagement_handlers, service_handlers};

/// Fallback for unmatched paths.
pub async fn not_found_handler(req: HttpRequest) -> HttpResponse {
  tracing::debug!(path = %req.path(), "No route matched.");
  HttpResponse::NotFound().json(json!({ "error": "Not Found", "path": req.path() }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(auth_handlers::home_handler))
    // Authentication Routes
    .service(
      web::resource("/login")
        .route(web::get().to(auth_handlers::login_page_handler))
        .route(web::post().to(auth_handlers::login_handler)),
    )
    .route("/logout", web::post().to(auth_handlers::logout_handler))
    .service(
      web::resource("/register")
        .route(web::get().to(auth_handlers::register_page_handler))
        .route(web::post().to(auth_handlers::register_handler)),
    )
    // Service Routes; literal segments before `{service_id}`
    .service(
      web::scope("/services")
        .service(
          web::resource("")
            .route(web::get().to(service_handlers::list_services_handler))
            .route(web::post().to(service_handlers::create_service_handler)),
        )
        .route("/new", web::get().to(service_handlers::new_service_page_handler))
        .route("/mine", web::get().to(service_handlers::my_services_handler))
        .route("/{service_id}", web::get().to(service_handlers::get_service_handler)),
    )
    // Engagement Routes
    .service(
      web::scope("/engagements")
        .service(
          web::resource("")
            .route(web::get().to(engagement_handlers::list_engagements_handler))
            .route(web::post().to(engagement_handlers::create_engagement_handler)),
        )
        .route(
          "/new/{service_id}",
          web::get().to(engagement_handlers::new_engagement_page_handler),
        )
        .route(
          "/milestones/{milestone_id}/complete",
          web::post().to(engagement_handlers::complete_milestone_handler),
        )
        .route(
          "/{engagement_id}/reviews",
          web::post().to(engagement_handlers::create_review_handler),
        )
        .route("/{engagement_id}", web::get().to(engagement_handlers::get_engagement_handler)),
    )
    .route("/dashboard", web::get().to(dashboard_handlers::dashboard_handler));
}
