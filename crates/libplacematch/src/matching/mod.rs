mod features;

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;

use crate::model::{Place, PlaceQuery};

pub(crate) mod comparers;
pub(crate) mod extractors;
pub(crate) mod heuristic;
pub(crate) mod name_only;
pub(crate) mod prefilter;
pub(crate) mod replacers;

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
  #[default]
  #[serde(rename = "heuristic")]
  Heuristic,
  #[serde(rename = "name-only")]
  NameOnly,
}

pub trait MatchingAlgorithm {
  fn name() -> &'static str;
  fn score(bump: &Bump, lhs: &PlaceQuery, rhs: &Place, cutoff: f64) -> (f64, Vec<(&'static str, f64)>);
}

trait Feature: Send + Sync {
  fn name(&self) -> &'static str;
  fn score_feature(&self, bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64;
}

/// Part of the query a feature needs to say anything meaningful.
#[derive(Clone, Copy, Debug)]
enum Requires {
  Name,
  Address,
  PostalCode,
}

impl Requires {
  fn is_met(self, query: &PlaceQuery) -> bool {
    match self {
      Requires::Name => !query.name_tokens.is_empty(),
      Requires::Address => query.has_address(),
      Requires::PostalCode => query.has_postal_code(),
    }
  }
}

/// Weighted average of the features the query can feed.
///
/// Features whose requirement is not met are left out of both the sum and
/// the total weight, so a query without an address is not penalized for it.
fn run_weighted_features(bump: &Bump, lhs: &PlaceQuery, rhs: &Place, features: &[(&dyn Feature, f64, Requires)], results: &mut Vec<(&'static str, f64)>) -> f64 {
  let mut total = 0.0f64;
  let mut score = 0.0f64;

  for (func, weight, requires) in features {
    if !requires.is_met(lhs) {
      continue;
    }

    let feature_score = func.score_feature(bump, lhs, rhs);

    results.push((func.name(), feature_score));

    tracing::debug!(feature = func.name(), score = feature_score, "computed feature score");

    total += weight;
    score += feature_score * weight;
  }

  match total > 0.0 {
    true => score / total,
    false => 0.0,
  }
}

fn run_features(bump: &Bump, lhs: &PlaceQuery, rhs: &Place, cutoff: f64, init: f64, features: &[(&dyn Feature, f64)], results: &mut Vec<(&'static str, f64)>) -> f64 {
  features.iter().fold(init, move |score, (func, weight)| {
    // We assume all modifiers (with negative weights) tail the models, so if we
    // are already below the cutoff, there is no way the score could go up
    // again, so we skip the rest.
    if score < cutoff && weight < &0.0 {
      return score;
    }

    let feature_score = func.score_feature(bump, lhs, rhs);

    results.push((func.name(), feature_score));

    tracing::debug!(feature = func.name(), score = feature_score, "computed feature score");

    score + (feature_score * weight)
  })
}

/// Outcome of comparing a score with the lookup thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
  Match,
  Inconclusive,
  Reject,
}

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
pub struct LookupParams {
  #[serde_inline_default(0.7)]
  pub threshold: f64,
  #[serde_inline_default(0.4)]
  pub cutoff: f64,
  #[serde_inline_default(5)]
  pub candidates: usize,
  #[serde_inline_default(Algorithm::Heuristic)]
  pub algorithm: Algorithm,
}

impl Default for LookupParams {
  fn default() -> Self {
    LookupParams {
      threshold: 0.7,
      cutoff: 0.4,
      candidates: 5,
      algorithm: Algorithm::Heuristic,
    }
  }
}

impl LookupParams {
  pub fn decide(&self, score: f64) -> Decision {
    if score >= self.threshold {
      Decision::Match
    } else if score >= self.cutoff {
      Decision::Inconclusive
    } else {
      Decision::Reject
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{Algorithm, Decision, LookupParams};

  #[test]
  fn decide() {
    let params = LookupParams::default();

    assert_eq!(params.decide(0.95), Decision::Match);
    assert_eq!(params.decide(0.7), Decision::Match);
    assert_eq!(params.decide(0.55), Decision::Inconclusive);
    assert_eq!(params.decide(0.4), Decision::Inconclusive);
    assert_eq!(params.decide(0.1), Decision::Reject);
  }

  #[test]
  fn params_defaults() {
    let params: LookupParams = serde_json::from_str("{}").unwrap();

    assert_eq!(params.threshold, 0.7);
    assert_eq!(params.cutoff, 0.4);
    assert_eq!(params.candidates, 5);
    assert_eq!(params.algorithm, Algorithm::Heuristic);

    let params: LookupParams = serde_json::from_str(r#"{"algorithm": "name-only", "candidates": 2}"#).unwrap();

    assert_eq!(params.algorithm, Algorithm::NameOnly);
    assert_eq!(params.candidates, 2);
  }
}
