use bumpalo::{
  Bump,
  collections::{CollectIn, Vec},
};
use itertools::Itertools;
use libplacematch_macros::scoring_feature;

use crate::{
  matching::{
    Feature,
    comparers::{is_disjoint, levenshtein_similarity, tokens_match},
    extractors,
  },
  model::{Place, PlaceQuery},
};

#[scoring_feature(AddressTokenOverlap, name = "address_token_overlap")]
fn score_feature(&self, bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  if lhs.address_tokens.is_empty() {
    return 0.0;
  }

  let rhs_tokens = extractors::address_tokens(&rhs.formatted_address);

  if rhs_tokens.is_empty() {
    return 0.0;
  }

  let overlap = lhs.address_tokens.iter().filter(|l| rhs_tokens.iter().any(|r| tokens_match(l, r))).collect_in::<Vec<_>>(bump);

  // The formatted address carries the city and the country the caller
  // usually omits, so the query being fully contained is a full match.
  if overlap.len() == lhs.address_tokens.len() {
    return 1.0;
  }

  // Differing street numbers never count as a partial match.
  let lhs_remainder = lhs.address_tokens.iter().filter(|word| !overlap.contains(word) && !is_number(word)).sorted().collect_in::<Vec<_>>(bump);
  let rhs_remainder = rhs_tokens
    .iter()
    .filter(|word| !is_number(word) && !lhs.address_tokens.iter().any(|l| tokens_match(l, word)))
    .sorted()
    .collect_in::<Vec<_>>(bump);

  let lhs_remainder_str = lhs_remainder.iter().join(" ");
  let rhs_remainder_str = rhs_remainder.iter().take(lhs_remainder.len()).join(" ");
  let levenshtein_max_edits = lhs_remainder_str.len().max(rhs_remainder_str.len());

  let score = levenshtein_similarity(&lhs_remainder_str, &rhs_remainder_str, levenshtein_max_edits);

  (overlap.len() as f64 + (lhs_remainder.len() as f64 * score)) / lhs.address_tokens.len() as f64
}

#[inline(always)]
fn is_number(token: &str) -> bool {
  token.chars().all(|c| c.is_ascii_digit())
}

#[scoring_feature(StreetNumberMismatch, name = "street_number_mismatch")]
fn score_feature(&self, _bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  if lhs.street_numbers.is_empty() {
    return 0.0;
  }

  let normalized = extractors::normalize(&rhs.formatted_address);
  let rhs_numbers = extractors::street_numbers(&normalized).collect::<std::vec::Vec<_>>();

  if rhs_numbers.is_empty() {
    return 0.0;
  }

  match is_disjoint(&lhs.street_numbers.iter().map(String::as_str).collect::<std::vec::Vec<_>>(), &rhs_numbers) {
    true => 1.0,
    false => 0.0,
  }
}

#[cfg(test)]
mod tests {
  use bumpalo::Bump;
  use float_cmp::approx_eq;

  use crate::{
    matching::Feature,
    model::{Place, PlaceQuery},
  };

  #[test]
  fn address_token_overlap_contained() {
    let lhs = PlaceQuery::builder("Dupont").address("12 bd St-Michel").build();
    let rhs = Place::builder("p1", "Dupont").address("12 Boulevard Saint-Michel, 75005 Paris, France").build();

    assert_eq!(super::AddressTokenOverlap.score_feature(&Bump::new(), &lhs, &rhs), 1.0);
  }

  #[test]
  fn address_token_overlap_partial() {
    let lhs = PlaceQuery::builder("Dupont").address("12 rue des Lilas").build();
    let rhs = Place::builder("p1", "Dupont").address("14 Rue des Lilas, 69003 Lyon, France").build();

    let score = super::AddressTokenOverlap.score_feature(&Bump::new(), &lhs, &rhs);

    assert!(approx_eq!(f64, score, 0.667, epsilon = 0.01));
  }

  #[test]
  fn address_token_overlap_empty() {
    let lhs = PlaceQuery::builder("Dupont").build();
    let rhs = Place::builder("p1", "Dupont").address("14 Rue des Lilas, 69003 Lyon, France").build();

    assert_eq!(super::AddressTokenOverlap.score_feature(&Bump::new(), &lhs, &rhs), 0.0);
  }

  #[test]
  fn street_number_mismatch() {
    let lhs = PlaceQuery::builder("Dupont").address("12 rue des Lilas").build();
    let rhs = Place::builder("p1", "Dupont").address("14 Rue des Lilas, 69003 Lyon, France").build();

    assert_eq!(super::StreetNumberMismatch.score_feature(&Bump::new(), &lhs, &rhs), 1.0);

    let rhs = Place::builder("p1", "Dupont").address("12 Rue des Lilas, 69003 Lyon, France").build();

    assert_eq!(super::StreetNumberMismatch.score_feature(&Bump::new(), &lhs, &rhs), 0.0);

    let rhs = Place::builder("p1", "Dupont").address("Rue des Lilas, 69003 Lyon, France").build();

    assert_eq!(super::StreetNumberMismatch.score_feature(&Bump::new(), &lhs, &rhs), 0.0);
  }
}
