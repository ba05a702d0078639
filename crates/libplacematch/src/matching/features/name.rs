use bumpalo::{
  Bump,
  collections::{CollectIn, Vec},
};
use itertools::Itertools;
use libplacematch_macros::scoring_feature;
use strsim::jaro_winkler;

use crate::{
  matching::{Feature, comparers::token_overlap, extractors},
  model::{Place, PlaceQuery},
};

#[scoring_feature(NameTokenOverlap, name = "name_token_overlap")]
fn score_feature(&self, bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  if lhs.distinctive_tokens.is_empty() {
    return 0.0;
  }

  let rhs_tokens = extractors::name_tokens(&rhs.name);
  let rhs_tokens = extractors::distinctive_tokens(rhs_tokens.iter()).into_iter().collect_in::<Vec<_>>(bump);

  if rhs_tokens.is_empty() {
    return 0.0;
  }

  let overlap = token_overlap(&lhs.distinctive_tokens, &rhs_tokens);

  overlap as f64 / lhs.distinctive_tokens.len().min(rhs_tokens.len()) as f64
}

#[scoring_feature(NameJaroWinkler, name = "name_jaro_winkler")]
fn score_feature(&self, _bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  if lhs.distinctive_tokens.is_empty() {
    return 0.0;
  }

  let rhs_tokens = extractors::name_tokens(&rhs.name);

  if rhs_tokens.is_empty() {
    return 0.0;
  }

  let lhs_joined = lhs.distinctive_tokens.iter().sorted().join(" ");
  let rhs_joined = extractors::distinctive_tokens(rhs_tokens.iter()).iter().sorted().join(" ");

  jaro_winkler(&lhs_joined, &rhs_joined)
}

#[scoring_feature(NameContainment, name = "name_containment")]
fn score_feature(&self, _bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  let lhs_compact = extractors::normalize(&lhs.name).replace(' ', "");
  let rhs_compact = extractors::normalize(&rhs.name).replace(' ', "");

  let (shorter, longer) = match lhs_compact.len() <= rhs_compact.len() {
    true => (&lhs_compact, &rhs_compact),
    false => (&rhs_compact, &lhs_compact),
  };

  if shorter.len() < 4 {
    return 0.0;
  }

  match longer.contains(shorter.as_str()) {
    true => 1.0,
    false => 0.0,
  }
}
