use itertools::Itertools;
use serde::Serialize;

use crate::model::PlaceQuery;

/// How a search string was built from the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
  Full,
  NamePostalCode,
  NameAddress,
  DistinctivePostalCode,
  NameOnly,
}

impl QueryStrategy {
  pub const ALL: [QueryStrategy; 5] = [
    QueryStrategy::Full,
    QueryStrategy::NamePostalCode,
    QueryStrategy::NameAddress,
    QueryStrategy::DistinctivePostalCode,
    QueryStrategy::NameOnly,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      QueryStrategy::Full => "full",
      QueryStrategy::NamePostalCode => "name_postal_code",
      QueryStrategy::NameAddress => "name_address",
      QueryStrategy::DistinctivePostalCode => "distinctive_postal_code",
      QueryStrategy::NameOnly => "name_only",
    }
  }

  fn is_applicable(&self, query: &PlaceQuery) -> bool {
    match self {
      QueryStrategy::NamePostalCode | QueryStrategy::DistinctivePostalCode => !query.postal_code.trim().is_empty(),
      QueryStrategy::NameAddress => !query.address.trim().is_empty(),
      QueryStrategy::Full | QueryStrategy::NameOnly => true,
    }
  }

  fn build(&self, query: &PlaceQuery) -> String {
    let distinctive = query.distinctive_tokens.join(" ");

    let parts = match self {
      QueryStrategy::Full => vec![query.name.as_str(), query.address.as_str(), query.postal_code.as_str()],
      QueryStrategy::NamePostalCode => vec![query.name.as_str(), query.postal_code.as_str()],
      QueryStrategy::NameAddress => vec![query.name.as_str(), query.address.as_str()],
      QueryStrategy::DistinctivePostalCode => vec![distinctive.as_str(), query.postal_code.as_str()],
      QueryStrategy::NameOnly => vec![query.name.as_str()],
    };

    parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).join(", ")
  }
}

/// Search strings to try, in order.
///
/// Strategies missing one of their parts, or whose string is identical to
/// an earlier one, are left out.
pub fn strategies(query: &PlaceQuery) -> Vec<(QueryStrategy, String)> {
  QueryStrategy::ALL
    .iter()
    .filter(|strategy| strategy.is_applicable(query))
    .map(|strategy| (*strategy, strategy.build(query)))
    .filter(|(_, search)| !search.is_empty())
    .unique_by(|(_, search)| search.to_lowercase())
    .collect()
}
