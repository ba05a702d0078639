use bumpalo::Bump;
use tracing::instrument;

use crate::{
  matching::{
    Feature, MatchingAlgorithm, Requires,
    features::name::{NameContainment, NameJaroWinkler, NameTokenOverlap},
    run_weighted_features,
  },
  model::{Place, PlaceQuery},
};

/// Matching algorithm ignoring addresses, for callers whose addresses are
/// known to be unreliable.
pub struct NameOnly;

const FEATURES: &[(&dyn Feature, f64, Requires)] = &[
  (&NameTokenOverlap, 0.6, Requires::Name),
  (&NameJaroWinkler, 0.25, Requires::Name),
  (&NameContainment, 0.15, Requires::Name),
];

impl MatchingAlgorithm for NameOnly {
  fn name() -> &'static str {
    "name-only"
  }

  #[instrument(name = "score_place", skip_all, fields(place_id = rhs.place_id))]
  fn score(bump: &Bump, lhs: &PlaceQuery, rhs: &Place, _cutoff: f64) -> (f64, Vec<(&'static str, f64)>) {
    let mut results = Vec::with_capacity(FEATURES.len());
    let score = run_weighted_features(bump, lhs, rhs, FEATURES, &mut results);

    (score.clamp(0.0, 1.0), results)
  }
}

#[cfg(test)]
mod tests {
  use bumpalo::Bump;

  use crate::{
    matching::{MatchingAlgorithm, name_only::NameOnly},
    model::{Place, PlaceQuery},
  };

  #[test]
  fn name() {
    assert_eq!(NameOnly::name(), "name-only");
  }

  #[test]
  fn ignores_addresses() {
    let lhs = PlaceQuery::builder("Boulangerie Dupont").address("12 bd St-Michel").postal_code("75005").build();
    let rhs = Place::builder("p1", "Boulangerie Dupont").address("5 Rue Paradis, 13001 Marseille, France").build();

    let (score, features) = NameOnly::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert_eq!(score, 1.0);
    assert_eq!(features.len(), 3);
  }

  #[test]
  fn different_names() {
    let lhs = PlaceQuery::builder("Garage Moreau").build();
    let rhs = Place::builder("p1", "Garage Lefebvre").build();

    let (score, _) = NameOnly::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score < 0.4, "score was {score}");
  }
}
