mod error;
mod matching;
mod model;
mod provider;

pub mod classifier;
pub mod lookup;
pub mod queries;
pub mod scoring;
pub mod vocabulary;

/// Force the initialization of the dictionaries used for matching.
///
/// They are otherwise loaded lazily, on the first lookup.
pub fn init() {
  let _ = *crate::matching::replacers::generic::STOPWORDS;
  let _ = *crate::matching::replacers::generic::GENERIC_WORDS;
  let _ = *crate::matching::replacers::addresses::ADDRESS_FORMS;
}

pub mod prelude {
  pub use crate::classifier::{Classifier, NoClassifier, OllamaClassifier};
  pub use crate::error::PlaceMatchError;
  pub use crate::lookup::{DecidedBy, LookupOutcome, MatchedPlace, PlaceMatch};
  pub use crate::matching::{Algorithm, Decision, LookupParams, MatchingAlgorithm, heuristic::Heuristic, name_only::NameOnly};
  pub use crate::model::{Candidate, Described, Place, PlaceInfo, PlaceQuery};
  pub use crate::provider::{
    DETAILS_FIELDS, PlacesProvider, SEARCH_FIELDS,
    google::{self, GooglePlacesConfig, GooglePlacesProvider},
  };
  pub use crate::queries::QueryStrategy;

  pub use crate::provider::mock::MockedPlaces;
}
