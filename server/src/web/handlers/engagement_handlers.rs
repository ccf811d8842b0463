// server/src/web/handlers/engagement_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::engagements;
use marketplace_core::models::{MilestoneCompletion, MilestoneSpec, Role, MAX_MILESTONES_PER_ENGAGEMENT};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::see_other;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CurrentUser;

#[derive(Deserialize, Debug)]
pub struct ReviewForm {
  #[serde(default)]
  pub rating: String,
  pub comment: Option<String>,
}

/// Reads `serviceId` and the numbered `milestoneTitleN` / `milestoneAmountN`
/// rows. Rows with an empty title or an amount that is not a number are
/// skipped.
pub fn parse_engagement_form(form: &HashMap<String, String>) -> Result<(i64, Vec<MilestoneSpec>), AppError> {
  let service_id = form
    .get("serviceId")
    .and_then(|raw| raw.trim().parse::<i64>().ok())
    .ok_or_else(|| AppError::Validation("A valid service is required".to_string()))?;

  let mut milestones = Vec::new();
  for i in 1..=MAX_MILESTONES_PER_ENGAGEMENT {
    let title = form.get(&format!("milestoneTitle{}", i)).map(|t| t.trim()).unwrap_or("");
    let amount = form
      .get(&format!("milestoneAmount{}", i))
      .and_then(|a| a.trim().parse::<f64>().ok())
      .filter(|a| !a.is_nan());
    match amount {
      Some(amount) if !title.is_empty() => milestones.push(MilestoneSpec::new(title, amount)),
      _ => debug!(row = i, "Skipping incomplete milestone row."),
    }
  }
  Ok((service_id, milestones))
}

#[instrument(name = "handler::list_engagements", skip(app_state, user), fields(user_id = user.0.id), err(Display))]
pub async fn list_engagements_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
) -> Result<HttpResponse, AppError> {
  let user = user.0;
  let engagements = match user.role {
    Role::Provider => app_state.store.list_engagements_for_provider(user.id).await?,
    Role::Client => app_state.store.list_engagements_for_client(user.id).await?,
  };
  Ok(HttpResponse::Ok().json(json!({
      "role": user.role,
      "engagements": engagements,
  })))
}

#[instrument(name = "handler::new_engagement_page", skip(app_state, user, path), fields(user_id = user.0.id), err(Display))]
pub async fn new_engagement_page_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let service_id = path.into_inner();
  let service = app_state
    .store
    .get_service(service_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;
  Ok(HttpResponse::Ok().json(json!({
      "service": service,
      "maxMilestones": MAX_MILESTONES_PER_ENGAGEMENT,
  })))
}

#[instrument(name = "handler::create_engagement", skip(app_state, user, form), fields(user_id = user.0.id), err(Display))]
pub async fn create_engagement_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  form: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
  let (service_id, milestones) = parse_engagement_form(&form)?;
  let engagement_id = engagements::open_engagement(app_state.store.as_ref(), &user.0, service_id, milestones).await?;

  Ok(see_other(&format!("/engagements/{}", engagement_id)).json(json!({
      "message": "Engagement created",
      "engagementId": engagement_id,
  })))
}

#[instrument(name = "handler::get_engagement", skip(app_state, user, path), fields(engagement_id = %path.as_ref()), err(Display))]
pub async fn get_engagement_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let engagement_id = path.into_inner();
  let detail = app_state
    .store
    .get_engagement_with_milestones(engagement_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("engagement {} not found", engagement_id)))?;
  let reviews = app_state.store.list_reviews(engagement_id).await?;
  debug!(viewer_id = user.0.id, milestones = detail.milestones.len(), "Engagement loaded.");

  Ok(HttpResponse::Ok().json(json!({
      "engagement": detail.engagement,
      "milestones": detail.milestones,
      "reviews": reviews,
  })))
}

#[instrument(
    name = "handler::complete_milestone",
    skip(app_state, user, path),
    fields(milestone_id = %path.as_ref(), user_id = user.0.id),
    err(Display)
)]
pub async fn complete_milestone_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let milestone_id = path.into_inner();
  let outcome = engagements::complete_milestone(app_state.store.as_ref(), milestone_id).await?;

  let body = match outcome {
    MilestoneCompletion::Completed(payout) => {
      info!(payout_id = payout.id, "Milestone completed through HTTP.");
      json!({
          "message": "Milestone marked as completed and payout recorded",
          "completed": true,
          "payout": payout,
      })
    }
    MilestoneCompletion::AlreadyCompleted => json!({
        "message": "Milestone was already completed",
        "completed": false,
        "payout": null,
    }),
  };
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::create_review", skip(app_state, user, path, form), fields(engagement_id = %path.as_ref()), err(Display))]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  user: CurrentUser,
  path: web::Path<i64>,
  form: web::Form<ReviewForm>,
) -> Result<HttpResponse, AppError> {
  let engagement_id = path.into_inner();
  let form = form.into_inner();
  let rating = form
    .rating
    .trim()
    .parse::<i64>()
    .map_err(|_| AppError::Validation("Rating must be between 1 and 5".to_string()))?;

  let review_id = engagements::leave_review(app_state.store.as_ref(), engagement_id, rating, form.comment).await?;
  info!(review_id, reviewer_id = user.0.id, "Review recorded.");

  Ok(see_other(&format!("/engagements/{}", engagement_id)).json(json!({
      "message": "Review saved",
      "reviewId": review_id,
  })))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn numbered_rows_are_read_in_order() {
    let (service_id, milestones) = parse_engagement_form(&form(&[
      ("serviceId", "3"),
      ("milestoneTitle1", "Draft"),
      ("milestoneAmount1", "200"),
      ("milestoneTitle2", " Review "),
      ("milestoneAmount2", "300.5"),
    ]))
    .unwrap();
    assert_eq!(service_id, 3);
    assert_eq!(
      milestones,
      vec![MilestoneSpec::new("Draft", 200.0), MilestoneSpec::new("Review", 300.5)]
    );
  }

  #[test]
  fn incomplete_rows_are_skipped() {
    let (_, milestones) = parse_engagement_form(&form(&[
      ("serviceId", "1"),
      ("milestoneTitle1", ""),
      ("milestoneAmount1", "100"),
      ("milestoneTitle2", "Filing"),
      ("milestoneAmount2", "soon"),
      ("milestoneTitle4", "Sign-off"),
      ("milestoneAmount4", "50"),
      ("milestoneTitle6", "Ignored"),
      ("milestoneAmount6", "10"),
    ]))
    .unwrap();
    assert_eq!(milestones, vec![MilestoneSpec::new("Sign-off", 50.0)]);
  }

  #[test]
  fn service_id_is_required() {
    assert!(matches!(
      parse_engagement_form(&form(&[("milestoneTitle1", "Draft"), ("milestoneAmount1", "1")])),
      Err(AppError::Validation(_))
    ));
  }
}
