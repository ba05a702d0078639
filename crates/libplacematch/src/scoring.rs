use bumpalo::Bump;
use metrics::histogram;
use opentelemetry::global;
use tokio::time::Instant;
use tracing::{Span, instrument};

use crate::{
  matching::MatchingAlgorithm,
  model::{Place, PlaceQuery},
};

/// Score every place against the query.
///
/// Features with a non-zero score are kept on the returned places.
#[instrument(name = "compute_scores", skip_all, fields(algorithm = A::name()))]
pub fn score<A: MatchingAlgorithm>(query: &PlaceQuery, places: Vec<Place>, cutoff: f64) -> Vec<(Place, f64)> {
  let span = Span::current();

  let mut bump = Bump::with_capacity(1024);
  let mut results = Vec::with_capacity(places.len());
  let then = Instant::now();

  let scores = places.into_iter().map(|mut place| {
    let _enter = span.enter();

    let (score, features) = A::score(&bump, query, &place, cutoff);

    place.features = features.into_iter().filter(|(_, score)| score > &0.0).collect::<Vec<(_, _)>>();

    tracing::debug!(place_id = place.place_id, score = score, "computed score");

    bump.reset();

    histogram!("placematch_scoring_scores").record(score);

    (place, score)
  });

  results.extend(scores);

  histogram!("placematch_scoring_latency_seconds").record(then.elapsed().as_secs_f64());

  global::meter("placematch").f64_histogram("scoring_latency").build().record(then.elapsed().as_secs_f64() * 1000.0, &[]);

  results
}

#[cfg(test)]
mod tests {
  use crate::{
    matching::{heuristic::Heuristic, name_only::NameOnly},
    model::{Place, PlaceQuery},
  };

  #[test]
  fn score_places() {
    let query = PlaceQuery::builder("Boulangerie Dupont").address("12 bd Saint-Michel").postal_code("75005").build();
    let places = vec![
      Place::builder("p1", "Boulangerie Dupont").address("12 Bd Saint-Michel, 75005 Paris, France").postal_code("75005").build(),
      Place::builder("p2", "Garage Moreau").address("3 Rue de Lyon, 13001 Marseille, France").postal_code("13001").build(),
    ];

    let scores = super::score::<Heuristic>(&query, places, 0.4);

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].0.place_id, "p1");
    assert!(scores[0].1 > 0.9);
    assert!(scores[0].0.features.iter().any(|(name, _)| *name == "postal_code_match"));
    assert!(scores[1].1 < 0.4);
    assert!(scores[1].0.features.iter().all(|(_, score)| *score > 0.0));
  }

  #[test]
  fn score_by_name_only() {
    let query = PlaceQuery::builder("Boulangerie Dupont").address("1 rue Monge").build();
    let places = vec![Place::builder("p1", "Dupont").address("3 Rue de Lyon, 13001 Marseille, France").build()];

    let scores = super::score::<NameOnly>(&query, places, 0.4);

    assert!(scores[0].1 > 0.9);
    assert!(scores[0].0.features.iter().all(|(name, _)| name.starts_with("name_")));
  }
}
