use bumpalo::Bump;
use tracing::instrument;

use crate::{
  matching::{
    Feature, MatchingAlgorithm, Requires,
    features::{
      address::{AddressTokenOverlap, StreetNumberMismatch},
      name::{NameContainment, NameJaroWinkler, NameTokenOverlap},
      postal_code::{PostalCodeMatch, PostalCodeMismatch},
    },
    run_features, run_weighted_features,
  },
  model::{Place, PlaceQuery},
};

/// Default matching algorithm, using name, address and postal code.
pub struct Heuristic;

const FEATURES: &[(&dyn Feature, f64, Requires)] = &[
  (&NameTokenOverlap, 0.40, Requires::Name),
  (&NameJaroWinkler, 0.15, Requires::Name),
  (&NameContainment, 0.10, Requires::Name),
  (&AddressTokenOverlap, 0.20, Requires::Address),
  (&PostalCodeMatch, 0.15, Requires::PostalCode),
];

const QUALIFIERS: &[(&dyn Feature, f64)] = &[(&PostalCodeMismatch, -0.4), (&StreetNumberMismatch, -0.2)];

impl MatchingAlgorithm for Heuristic {
  fn name() -> &'static str {
    "heuristic"
  }

  #[instrument(name = "score_place", skip_all, fields(place_id = rhs.place_id))]
  fn score(bump: &Bump, lhs: &PlaceQuery, rhs: &Place, cutoff: f64) -> (f64, Vec<(&'static str, f64)>) {
    // An address alone cannot tell apart the businesses sharing it.
    if lhs.name_tokens.is_empty() {
      return (0.0, Vec::new());
    }

    let mut results = Vec::with_capacity(FEATURES.len() + QUALIFIERS.len());

    let score = run_weighted_features(bump, lhs, rhs, FEATURES, &mut results);
    let score = run_features(bump, lhs, rhs, cutoff, score, QUALIFIERS, &mut results);

    (score.clamp(0.0, 1.0), results)
  }
}

#[cfg(test)]
mod tests {
  use bumpalo::Bump;

  use crate::{
    matching::{Decision, LookupParams, MatchingAlgorithm, heuristic::Heuristic},
    model::{Place, PlaceQuery},
  };

  fn feature(features: &[(&'static str, f64)], name: &str) -> Option<f64> {
    features.iter().find(|(feature, _)| *feature == name).map(|(_, score)| *score)
  }

  #[test]
  fn name() {
    assert_eq!(Heuristic::name(), "heuristic");
  }

  #[test]
  fn exact_match() {
    let lhs = PlaceQuery::builder("Boulangerie Dupont").address("12 bd St-Michel").postal_code("75005").build();
    let rhs = Place::builder("p1", "Boulangerie Dupont").address("12 Boulevard Saint-Michel, 75005 Paris, France").postal_code("75005").build();

    let (score, features) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert_eq!(score, 1.0);
    assert_eq!(feature(&features, "postal_code_mismatch"), Some(0.0));
    assert_eq!(feature(&features, "street_number_mismatch"), Some(0.0));
  }

  #[test]
  fn same_name_elsewhere() {
    let lhs = PlaceQuery::builder("Boulangerie Dupont").address("12 bd St-Michel").postal_code("75005").build();
    let rhs = Place::builder("p1", "Boulangerie Dupont").address("5 Rue Paradis, 13001 Marseille, France").build();

    let (score, features) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score < 0.4);
    assert_eq!(feature(&features, "postal_code_mismatch"), Some(1.0));
  }

  #[test]
  fn name_only_query_is_not_penalized() {
    let lhs = PlaceQuery::builder("Fromagerie Lemarchand").build();
    let rhs = Place::builder("p1", "Fromagerie Lemarchand").address("3 Place du Marché, 35000 Rennes, France").build();

    let (score, features) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert_eq!(score, 1.0);
    assert_eq!(feature(&features, "address_token_overlap"), None);
    assert_eq!(feature(&features, "postal_code_match"), None);
  }

  #[test]
  fn generic_name_same_address() {
    let lhs = PlaceQuery::builder("Boulangerie du Centre").address("4 rue de la Gare").postal_code("35000").build();
    let rhs = Place::builder("p1", "Pharmacie du Centre").address("4 Rue de la Gare, 35000 Rennes, France").build();

    let (score, _) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score > 0.4 && score < 0.7, "score was {score}");
  }

  #[test]
  fn different_business() {
    let lhs = PlaceQuery::builder("Garage Moreau").address("8 avenue Jean Jaurès").postal_code("44000").build();
    let rhs = Place::builder("p1", "Le Petit Bistrot").address("27 Rue Crébillon, 44000 Nantes, France").build();

    let (score, _) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score < 0.4, "score was {score}");
  }

  #[test]
  fn close_family_names_do_not_match() {
    let lhs = PlaceQuery::builder("Garage Moreau").address("8 avenue Jean Jaurès").postal_code("44000").build();
    let rhs = Place::builder("p1", "Garage Moreno").address("8 Avenue Jean Jaurès, 44000 Nantes, France").build();

    let (score, features) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score < 0.7, "score was {score}");
    assert_eq!(feature(&features, "name_token_overlap"), Some(0.0));

    let lhs = PlaceQuery::builder("Boulangerie Martin").address("4 rue de la Gare").postal_code("35000").build();
    let rhs = Place::builder("p1", "Boulangerie Marin").address("4 Rue de la Gare, 35000 Rennes, France").build();

    let (score, _) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert!(score < 0.7, "score was {score}");
  }

  #[test]
  fn wordless_name_is_rejected() {
    let lhs = PlaceQuery::builder("...").address("4 rue de la Gare").postal_code("35000").build();
    let rhs = Place::builder("p1", "Pharmacie Dupuis").address("4 Rue de la Gare, 35000 Rennes, France").build();

    let (score, features) = Heuristic::score(&Bump::new(), &lhs, &rhs, 0.4);

    assert_eq!(score, 0.0);
    assert!(features.is_empty());
    assert_eq!(LookupParams::default().decide(score), Decision::Reject);
  }
}
