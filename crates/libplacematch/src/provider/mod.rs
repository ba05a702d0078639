pub mod google;
pub mod mock;

use crate::{
  error::PlaceMatchError,
  model::{Candidate, Place},
};

/// Fields requested on a search, enough to prefilter candidates.
pub const SEARCH_FIELDS: &[&str] = &["place_id", "name", "formatted_address"];

/// Fields requested on a details lookup.
pub const DETAILS_FIELDS: &[&str] = &[
  "place_id",
  "name",
  "formatted_address",
  "address_components",
  "formatted_phone_number",
  "international_phone_number",
  "website",
  "opening_hours",
  "rating",
  "user_ratings_total",
  "url",
  "business_status",
  "geometry",
];

#[allow(async_fn_in_trait)]
pub trait PlacesProvider: Clone + Send + Sync + 'static {
  fn health(&self) -> impl Future<Output = Result<bool, PlaceMatchError>> + Send;
  fn find_candidates(&self, query: &str, fields: &[&str]) -> impl Future<Output = Result<Vec<Candidate>, PlaceMatchError>> + Send;
  fn place_details(&self, place_id: &str, fields: &[&str]) -> impl Future<Output = Result<Option<Place>, PlaceMatchError>> + Send;
}
