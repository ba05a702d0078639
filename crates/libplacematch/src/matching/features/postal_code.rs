use bumpalo::Bump;
use libplacematch_macros::scoring_feature;

use crate::{
  matching::Feature,
  model::{Described, Place, PlaceQuery},
};

#[scoring_feature(PostalCodeMatch, name = "postal_code_match")]
fn score_feature(&self, _bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  if !lhs.has_postal_code() {
    return 0.0;
  }

  match rhs.postal_codes().contains(&lhs.postal_code_clean) {
    true => 1.0,
    false => 0.0,
  }
}

/// Both sides carry a postal code and none agree.
///
/// Codes sharing their department prefix only count as half a mismatch, as
/// the places service sometimes reports the main post office of a commune.
#[scoring_feature(PostalCodeMismatch, name = "postal_code_mismatch")]
fn score_feature(&self, _bump: &Bump, lhs: &PlaceQuery, rhs: &Place) -> f64 {
  let lhs_codes = lhs.postal_codes();

  if lhs_codes.is_empty() {
    return 0.0;
  }

  let rhs_codes = rhs.postal_codes();

  if rhs_codes.is_empty() {
    return 0.0;
  }

  if lhs_codes.iter().any(|code| rhs_codes.contains(code)) {
    return 0.0;
  }

  let same_department = lhs_codes.iter().any(|lhs| rhs_codes.iter().any(|rhs| lhs.get(..2) == rhs.get(..2)));

  match same_department {
    true => 0.5,
    false => 1.0,
  }
}
