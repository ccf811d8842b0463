// server/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod engagement_handlers;
pub mod service_handlers;

use actix_web::http::header;
use actix_web::{HttpResponse, HttpResponseBuilder};

/// 303 to `location`; form posts land on the page that shows their result.
pub(crate) fn see_other(location: &str) -> HttpResponseBuilder {
  let mut builder = HttpResponse::SeeOther();
  builder.insert_header((header::LOCATION, location.to_string()));
  builder
}
