use ahash::{HashSet, HashSetExt};
use bon::bon;
use metrics::counter;
use serde::Serialize;
use tracing::instrument;

use crate::{
  classifier::{Classifier, NoClassifier},
  error::PlaceMatchError,
  matching::{Algorithm, Decision, LookupParams, heuristic::Heuristic, name_only::NameOnly, prefilter},
  model::{Place, PlaceInfo, PlaceQuery, features_to_map},
  provider::{DETAILS_FIELDS, PlacesProvider, SEARCH_FIELDS},
  queries::{self, QueryStrategy},
  scoring,
};

/// What settled a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecidedBy {
  Heuristics,
  Classifier,
}

impl DecidedBy {
  fn label(&self) -> &'static str {
    match self {
      DecidedBy::Heuristics => "heuristics",
      DecidedBy::Classifier => "classifier",
    }
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchedPlace {
  pub place: PlaceInfo,
  pub score: f64,
  #[serde(serialize_with = "features_to_map")]
  pub features: Vec<(&'static str, f64)>,
  pub strategy: QueryStrategy,
  pub decided_by: DecidedBy,
}

#[derive(Clone, Debug)]
pub enum LookupOutcome {
  Found(Box<MatchedPlace>),
  /// No place was accepted, `best_score` is the highest score seen, if any
  /// place was scored at all.
  NotFound { best_score: Option<f64> },
}

/// The main entrypoint for looking up places.
///
/// It requires a [`PlacesProvider`] to search for candidates and fetch their
/// details, and an optional [`Classifier`] used as a tie-breaker when the
/// heuristics are inconclusive.
///
/// # Examples
///
/// ```rust
/// # use libplacematch::prelude::*;
///
/// # tokio_test::block_on(async {
///   let provider = MockedPlaces::with_places(vec![
///     Place::builder("p1", "Boulangerie Dupont").address("12 Bd Saint-Michel, 75005 Paris, France").postal_code("75005").build(),
///   ]);
///
///   let placematch = PlaceMatch::new(provider).build();
///   let query = PlaceQuery::builder("Boulangerie Dupont").address("12 bd Saint-Michel").postal_code("75005").build();
///
///   match placematch.lookup(&query, &LookupParams::default()).await.unwrap() {
///     LookupOutcome::Found(matched) => println!("found {} ({})", matched.place.name, matched.score),
///     LookupOutcome::NotFound { .. } => println!("no match"),
///   }
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct PlaceMatch<P: PlacesProvider, C: Classifier = NoClassifier> {
  provider: P,
  classifier: C,
}

#[bon]
impl<P: PlacesProvider> PlaceMatch<P> {
  /// Create a new instance without a classifier.
  ///
  /// This initializes the dictionaries used for matching, which is only done
  /// once in the lifetime of the program.
  #[allow(clippy::new_ret_no_self)]
  #[builder(start_fn = new, finish_fn = build)]
  pub fn _new(#[builder(start_fn)] provider: P) -> PlaceMatch<P, NoClassifier> {
    crate::init();

    PlaceMatch { provider, classifier: NoClassifier }
  }

  #[builder(finish_fn = build)]
  pub fn with_classifier<C: Classifier>(#[builder(start_fn)] provider: P, classifier: C) -> PlaceMatch<P, C> {
    crate::init();

    PlaceMatch { provider, classifier }
  }
}

impl<P: PlacesProvider, C: Classifier> PlaceMatch<P, C> {
  /// Retrieve the places provider availability.
  pub async fn health(&self) -> Result<bool, PlaceMatchError> {
    self.provider.health().await
  }

  /// Look up the place described by the query.
  ///
  /// Search strategies are tried in order. Details are fetched for at most
  /// `params.candidates` distinct plausible candidates, and the first place
  /// scoring above the threshold is returned. When none does, inconclusive
  /// places are offered to the classifier, best score first.
  #[instrument(skip_all, fields(algorithm = ?params.algorithm))]
  pub async fn lookup(&self, query: &PlaceQuery, params: &LookupParams) -> Result<LookupOutcome, PlaceMatchError> {
    let outcome = self.run_lookup(query, params).await;

    let label = match &outcome {
      Ok(LookupOutcome::Found(matched)) => matched.decided_by.label(),
      Ok(LookupOutcome::NotFound { .. }) => "not_found",
      Err(_) => "error",
    };

    counter!("placematch_lookups_total", "outcome" => label).increment(1);

    outcome
  }

  async fn run_lookup(&self, query: &PlaceQuery, params: &LookupParams) -> Result<LookupOutcome, PlaceMatchError> {
    if query.name_tokens.is_empty() {
      tracing::debug!(name = query.name, "business name has no words, skipping search");

      return Ok(LookupOutcome::NotFound { best_score: None });
    }

    let mut seen = HashSet::new();
    let mut fetched = 0;
    let mut best_score: Option<f64> = None;
    let mut inconclusive = Vec::new();

    for (strategy, search) in queries::strategies(query) {
      if fetched >= params.candidates {
        break;
      }

      let candidates = self.provider.find_candidates(&search, SEARCH_FIELDS).await?;

      tracing::debug!(strategy = strategy.label(), candidates = candidates.len(), "searched places");

      let mut places = Vec::with_capacity(candidates.len());

      for candidate in candidates {
        if fetched >= params.candidates {
          break;
        }

        if !seen.insert(candidate.place_id.clone()) {
          continue;
        }

        if !prefilter::is_plausible(query, &candidate) {
          tracing::debug!(place_id = candidate.place_id, name = candidate.name, "discarded implausible candidate");
          continue;
        }

        fetched += 1;

        if let Some(place) = self.provider.place_details(&candidate.place_id, DETAILS_FIELDS).await? {
          places.push(place);
        }
      }

      let mut scores = match params.algorithm {
        Algorithm::Heuristic => scoring::score::<Heuristic>(query, places, params.cutoff),
        Algorithm::NameOnly => scoring::score::<NameOnly>(query, places, params.cutoff),
      };

      scores.sort_by(|(_, lhs), (_, rhs)| rhs.total_cmp(lhs));

      for (place, score) in scores {
        best_score = Some(best_score.map_or(score, |best| best.max(score)));

        match params.decide(score) {
          Decision::Match => return Ok(found(place, score, strategy, DecidedBy::Heuristics)),
          Decision::Inconclusive => inconclusive.push((place, score, strategy)),
          Decision::Reject => {}
        }
      }
    }

    inconclusive.sort_by(|(_, lhs, _), (_, rhs, _)| rhs.total_cmp(lhs));

    for (place, score, strategy) in inconclusive {
      match self.classifier.same_place(query, &place).await {
        Ok(Some(true)) => return Ok(found(place, score, strategy, DecidedBy::Classifier)),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = err.to_string(), place_id = place.place_id, "classifier failed, ignoring"),
      }
    }

    Ok(LookupOutcome::NotFound { best_score })
  }
}

fn found(place: Place, score: f64, strategy: QueryStrategy, decided_by: DecidedBy) -> LookupOutcome {
  tracing::debug!(place_id = place.place_id, score, strategy = strategy.label(), decided_by = decided_by.label(), "found matching place");

  LookupOutcome::Found(Box::new(MatchedPlace {
    place: PlaceInfo::from(&place),
    score,
    features: place.features,
    strategy,
    decided_by,
  }))
}
