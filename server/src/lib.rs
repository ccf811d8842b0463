// server/src/lib.rs

//! HTTP application for the services marketplace: configuration, sessions,
//! error mapping and the route handlers over `marketplace_core`.

pub mod config;
pub mod errors;
pub mod listener;
pub mod services;
pub mod state;
pub mod web;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web as actix_data, App, Error};

use crate::state::AppState;

/// The application with its state, every route and the JSON 404 fallback.
/// Middleware is left to the caller.
pub fn build_app(
  state: AppState,
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody>,
    Error = Error,
    InitError = (),
  >,
> {
  App::new()
    .app_data(actix_data::Data::new(state))
    .configure(web::configure_app_routes)
    .default_service(actix_data::to(web::routes::not_found_handler))
}
