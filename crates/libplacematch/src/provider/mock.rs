use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use bon::Builder;

use crate::{
  error::PlaceMatchError,
  model::{Candidate, Place},
  provider::PlacesProvider,
};

/// In-memory places provider.
///
/// Without a configured `searches` map, every search returns all known
/// places as candidates. Otherwise, a search returns the candidates of the
/// places listed under the exact query string, or nothing.
#[derive(Builder, Clone)]
pub struct MockedPlaces {
  #[builder(default)]
  places: Vec<Place>,
  searches: Option<HashMap<String, Vec<String>>>,
  #[builder(default = true)]
  healthy: bool,
  /// Makes every search fail as if the upstream service was unavailable.
  #[builder(default)]
  failing: bool,
  #[builder(skip)]
  searched: Arc<Mutex<Vec<String>>>,
  #[builder(skip)]
  details_calls: Arc<AtomicUsize>,
}

impl MockedPlaces {
  pub fn with_places(places: Vec<Place>) -> MockedPlaces {
    MockedPlaces::builder().places(places).build()
  }

  /// Query strings received so far, in order.
  pub fn searched(&self) -> Vec<String> {
    self.searched.lock().map(|searched| searched.clone()).unwrap_or_default()
  }

  /// Number of details lookups performed so far.
  pub fn details_calls(&self) -> usize {
    self.details_calls.load(Ordering::Relaxed)
  }
}

impl PlacesProvider for MockedPlaces {
  async fn health(&self) -> Result<bool, PlaceMatchError> {
    Ok(self.healthy)
  }

  async fn find_candidates(&self, query: &str, _: &[&str]) -> Result<Vec<Candidate>, PlaceMatchError> {
    if let Ok(mut searched) = self.searched.lock() {
      searched.push(query.to_string());
    }

    if self.failing {
      return Err(PlaceMatchError::Upstream {
        status: "UNKNOWN_ERROR".to_string(),
        message: "mocked failure".to_string(),
      });
    }

    let candidates = match &self.searches {
      None => self.places.iter().map(Place::candidate).collect(),

      Some(searches) => searches
        .get(query)
        .map(|ids| ids.iter().filter_map(|id| self.places.iter().find(|place| &place.place_id == id)).map(Place::candidate).collect())
        .unwrap_or_default(),
    };

    Ok(candidates)
  }

  async fn place_details(&self, place_id: &str, _: &[&str]) -> Result<Option<Place>, PlaceMatchError> {
    self.details_calls.fetch_add(1, Ordering::Relaxed);

    Ok(self.places.iter().find(|place| place.place_id == place_id).cloned())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use crate::{
    model::Place,
    provider::{DETAILS_FIELDS, PlacesProvider, SEARCH_FIELDS},
  };

  use super::MockedPlaces;

  #[tokio::test]
  async fn scripted_searches() {
    let mut searches = HashMap::new();
    searches.insert("Dupont, 75005".to_string(), vec!["p2".to_string()]);

    let provider = MockedPlaces::builder()
      .places(vec![Place::builder("p1", "Dupont").build(), Place::builder("p2", "Dupont & Fils").build()])
      .searches(searches)
      .build();

    let candidates = provider.find_candidates("Dupont, 75005", SEARCH_FIELDS).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].place_id, "p2");
    assert!(provider.find_candidates("Dupont", SEARCH_FIELDS).await.unwrap().is_empty());
    assert_eq!(provider.searched(), ["Dupont, 75005", "Dupont"]);

    assert!(provider.place_details("p1", DETAILS_FIELDS).await.unwrap().is_some());
    assert!(provider.place_details("p3", DETAILS_FIELDS).await.unwrap().is_none());
    assert_eq!(provider.details_calls(), 2);
  }
}
