use std::collections::HashMap;

use ahash::RandomState;
use libplacematch::prelude::*;
use serde::Serialize;

#[derive(Serialize)]
pub(super) struct LookupResponse {
  pub place: PlaceInfo,
  #[serde(rename = "match")]
  pub match_: MatchDetails,
}

#[derive(Serialize)]
pub(super) struct MatchDetails {
  pub score: f64,
  pub strategy: QueryStrategy,
  pub decided_by: DecidedBy,
  pub features: HashMap<&'static str, f64, RandomState>,
}

impl From<MatchedPlace> for LookupResponse {
  fn from(matched: MatchedPlace) -> Self {
    LookupResponse {
      place: matched.place,
      match_: MatchDetails {
        score: matched.score,
        strategy: matched.strategy,
        decided_by: matched.decided_by,
        features: matched.features.into_iter().collect(),
      },
    }
  }
}
