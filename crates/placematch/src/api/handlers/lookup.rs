use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{Query, WithRejection};
use libplacematch::prelude::*;
use tracing::instrument;

use crate::api::{AppState, dto::LookupResponse, errors::AppError, middlewares::json_rejection::TypedJson};

fn check_params(params: &LookupParams) -> Result<(), AppError> {
  if !(0.0..=1.0).contains(&params.threshold) || !(0.0..=1.0).contains(&params.cutoff) {
    return Err(AppError::BadRequest(Some("threshold and cutoff must be between 0 and 1".into())));
  }

  if params.cutoff > params.threshold {
    return Err(AppError::BadRequest(Some("cutoff cannot be greater than threshold".into())));
  }

  if params.candidates == 0 {
    return Err(AppError::BadRequest(Some("at least one candidate must be considered".into())));
  }

  Ok(())
}

#[instrument(skip_all)]
pub async fn lookup<P: PlacesProvider>(
  State(state): State<AppState<P>>,
  WithRejection(Query(mut params), _): WithRejection<Query<LookupParams>, AppError>,
  TypedJson(mut query): TypedJson<PlaceQuery>,
) -> Result<(StatusCode, impl IntoResponse), AppError> {
  check_params(&params)?;

  params.candidates = params.candidates.min(state.config.match_candidates);
  query.precompute();

  match state.placematch.lookup(&query, &params).await? {
    LookupOutcome::Found(matched) => {
      tracing::info!(place_id = matched.place.place_id, score = matched.score, strategy = matched.strategy.label(), "found matching place");

      Ok((StatusCode::OK, Json(LookupResponse::from(*matched))))
    }

    LookupOutcome::NotFound { best_score } => Err(AppError::NoMatch(best_score)),
  }
}
