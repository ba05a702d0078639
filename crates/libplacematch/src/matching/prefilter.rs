use strsim::jaro_winkler;

use crate::{
  matching::{comparers::token_overlap, extractors},
  model::{Candidate, Described, PlaceQuery},
};

/// Cheap check on a search hit, deciding whether its details are worth
/// fetching.
///
/// A candidate is discarded only when nothing in its name relates to the
/// query and its postal code, when it has one, contradicts the query's.
pub(crate) fn is_plausible(query: &PlaceQuery, candidate: &Candidate) -> bool {
  let tokens = extractors::name_tokens(candidate.display_name());

  if tokens.is_empty() {
    return true;
  }

  let distinctive = extractors::distinctive_tokens(tokens.iter());

  if token_overlap(&query.distinctive_tokens, &distinctive) > 0 {
    return true;
  }

  let lhs_compact = query.name_tokens.concat();
  let rhs_compact = tokens.concat();

  if jaro_winkler(&lhs_compact, &rhs_compact) >= 0.85 {
    return true;
  }

  let lhs_codes = query.postal_codes();
  let rhs_codes = candidate.postal_codes();

  if lhs_codes.is_empty() || rhs_codes.is_empty() {
    return true;
  }

  lhs_codes.iter().any(|code| rhs_codes.contains(code))
}
