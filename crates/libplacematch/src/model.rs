use bon::bon;
use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use validator::{Validate, ValidationError};

use crate::matching::extractors;

/// Read access to the fields compared by the matching features, shared by
/// the caller's description and the places returned by the provider.
pub trait Described {
  fn display_name(&self) -> &str;
  fn full_address(&self) -> &str;
  fn postal_codes(&self) -> Vec<String>;
}

/// The business a caller is looking for.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct PlaceQuery {
  #[validate(length(min = 1, max = 256, message = "a business name must be given"), custom(function = "has_words"))]
  pub name: String,
  #[serde(default)]
  #[validate(length(max = 512, message = "address is too long"))]
  pub address: String,
  #[serde(default)]
  #[validate(length(max = 16, message = "postal code is too long"), custom(function = "five_digits"))]
  pub postal_code: String,

  // Those attributes are precomputed when receiving the request to skip the computation for every candidate.
  #[serde(skip)]
  pub name_tokens: Vec<String>,
  #[serde(skip)]
  pub distinctive_tokens: Vec<String>,
  #[serde(skip)]
  pub address_tokens: Vec<String>,
  #[serde(skip)]
  pub street_numbers: Vec<String>,
  #[serde(skip)]
  pub postal_code_clean: String,
}

fn has_words(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank").with_message("a business name must be given".into()));
  }

  match extractors::name_tokens(value).is_empty() {
    true => Err(ValidationError::new("no_words").with_message("a business name must contain at least one word".into())),
    false => Ok(()),
  }
}

fn five_digits(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Ok(());
  }

  match extractors::is_postal_code(&extractors::clean_postal_code(value)) {
    true => Ok(()),
    false => Err(ValidationError::new("postal_code").with_message("a postal code must have five digits".into())),
  }
}

impl PlaceQuery {
  pub fn precompute(&mut self) {
    self.name_tokens = extractors::name_tokens(&self.name);
    self.distinctive_tokens = extractors::distinctive_tokens(self.name_tokens.iter());
    self.address_tokens = extractors::address_tokens(&self.address);
    self.street_numbers = extractors::street_numbers(&extractors::normalize(&self.address)).map(str::to_string).unique().collect();
    self.postal_code_clean = extractors::clean_postal_code(&self.postal_code);
  }

  pub fn has_address(&self) -> bool {
    !self.address_tokens.is_empty()
  }

  /// Whether the caller gave a full postal code. Partial codes are ignored.
  pub fn has_postal_code(&self) -> bool {
    extractors::is_postal_code(&self.postal_code_clean)
  }
}

impl Described for PlaceQuery {
  fn display_name(&self) -> &str {
    &self.name
  }

  fn full_address(&self) -> &str {
    &self.address
  }

  fn postal_codes(&self) -> Vec<String> {
    match self.has_postal_code() {
      true => vec![self.postal_code_clean.clone()],
      false => extractors::postal_codes(&self.address).map(str::to_string).collect(),
    }
  }
}

#[bon]
impl PlaceQuery {
  #[builder]
  pub fn builder(#[builder(start_fn)] name: &str, address: Option<&str>, postal_code: Option<&str>) -> PlaceQuery {
    let mut query = PlaceQuery {
      name: name.to_string(),
      address: address.unwrap_or_default().to_string(),
      postal_code: postal_code.unwrap_or_default().to_string(),
      ..Default::default()
    };

    query.precompute();
    query
  }
}

/// A search hit, before its details are fetched.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Candidate {
  pub place_id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub formatted_address: String,
}

impl Described for Candidate {
  fn display_name(&self) -> &str {
    &self.name
  }

  fn full_address(&self) -> &str {
    &self.formatted_address
  }

  fn postal_codes(&self) -> Vec<String> {
    extractors::postal_codes(&self.formatted_address).map(str::to_string).collect()
  }
}

/// The details record of a place, as returned by the places service.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Place {
  pub place_id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub formatted_address: String,
  #[serde(default)]
  pub address_components: Vec<AddressComponent>,
  pub formatted_phone_number: Option<String>,
  pub international_phone_number: Option<String>,
  pub website: Option<String>,
  pub opening_hours: Option<OpeningHours>,
  pub rating: Option<f64>,
  pub user_ratings_total: Option<u32>,
  pub url: Option<String>,
  pub business_status: Option<String>,
  pub geometry: Option<Geometry>,

  #[serde(skip)]
  pub features: Vec<(&'static str, f64)>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AddressComponent {
  pub long_name: String,
  #[serde(default)]
  pub short_name: String,
  #[serde(default)]
  pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OpeningHours {
  pub open_now: Option<bool>,
  #[serde(default)]
  pub weekday_text: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Geometry {
  pub location: LatLng,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct LatLng {
  pub lat: f64,
  pub lng: f64,
}

impl Described for Place {
  fn display_name(&self) -> &str {
    &self.name
  }

  fn full_address(&self) -> &str {
    &self.formatted_address
  }

  fn postal_codes(&self) -> Vec<String> {
    self
      .address_components
      .iter()
      .filter(|component| component.types.iter().any(|kind| kind == "postal_code"))
      .map(|component| extractors::clean_postal_code(&component.long_name))
      .chain(extractors::postal_codes(&self.formatted_address).map(str::to_string))
      .filter(|code| !code.is_empty())
      .unique()
      .collect()
  }
}

#[bon]
impl Place {
  #[builder]
  pub fn builder(
    #[builder(start_fn)] place_id: &str,
    #[builder(start_fn)] name: &str,
    address: Option<&str>,
    postal_code: Option<&str>,
    phone: Option<&str>,
    international_phone: Option<&str>,
    website: Option<&str>,
    #[builder(default)] hours: &[&str],
    rating: Option<f64>,
    reviews: Option<u32>,
    url: Option<&str>,
    status: Option<&str>,
    location: Option<(f64, f64)>,
  ) -> Place {
    Place {
      place_id: place_id.to_string(),
      name: name.to_string(),
      formatted_address: address.unwrap_or_default().to_string(),
      address_components: postal_code
        .map(|code| {
          vec![AddressComponent {
            long_name: code.to_string(),
            short_name: code.to_string(),
            types: vec!["postal_code".to_string()],
          }]
        })
        .unwrap_or_default(),
      formatted_phone_number: phone.map(ToOwned::to_owned),
      international_phone_number: international_phone.map(ToOwned::to_owned),
      website: website.map(ToOwned::to_owned),
      opening_hours: match hours.is_empty() {
        true => None,
        false => Some(OpeningHours {
          open_now: None,
          weekday_text: hours.iter().map(|s| s.to_string()).collect(),
        }),
      },
      rating,
      user_ratings_total: reviews,
      url: url.map(ToOwned::to_owned),
      business_status: status.map(ToOwned::to_owned),
      geometry: location.map(|(lat, lng)| Geometry { location: LatLng { lat, lng } }),
      features: Vec::new(),
    }
  }

  /// Summary of the place, as a search would return it.
  pub fn candidate(&self) -> Candidate {
    Candidate {
      place_id: self.place_id.clone(),
      name: self.name.clone(),
      formatted_address: self.formatted_address.clone(),
    }
  }
}

/// Normalized contact and location details of a matched place.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PlaceInfo {
  pub name: String,
  pub address: String,
  pub phone: Option<String>,
  pub website: Option<String>,
  pub opening_hours: Vec<String>,
  pub rating: Option<f64>,
  pub review_count: Option<u32>,
  pub maps_url: Option<String>,
  pub place_id: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub business_status: Option<String>,
}

impl From<&Place> for PlaceInfo {
  fn from(place: &Place) -> Self {
    let location = place.geometry.as_ref().map(|geometry| geometry.location);

    PlaceInfo {
      name: place.name.clone(),
      address: place.formatted_address.clone(),
      phone: place.formatted_phone_number.clone().or_else(|| place.international_phone_number.clone()),
      website: place.website.clone(),
      opening_hours: place.opening_hours.as_ref().map(|hours| hours.weekday_text.clone()).unwrap_or_default(),
      rating: place.rating,
      review_count: place.user_ratings_total,
      maps_url: place.url.clone(),
      place_id: place.place_id.clone(),
      latitude: location.map(|location| location.lat),
      longitude: location.map(|location| location.lng),
      business_status: place.business_status.clone(),
    }
  }
}

pub(crate) fn features_to_map<S: Serializer>(input: &[(&'static str, f64)], ser: S) -> Result<S::Ok, S::Error> {
  let mut map = ser.serialize_map(Some(input.len()))?;
  for (k, v) in input {
    map.serialize_entry(k, &v)?;
  }
  map.end()
}

#[cfg(test)]
mod tests {
  use validator::Validate;

  use crate::model::{Described, Place, PlaceInfo, PlaceQuery};

  #[test]
  fn query_validation() {
    assert!(PlaceQuery::builder("Boulangerie Dupont").postal_code("75 005").build().validate().is_ok());
    assert!(PlaceQuery::builder("Dupont").build().validate().is_ok());

    let errors = PlaceQuery::builder("...").build().validate().unwrap_err();

    assert!(errors.to_string().contains("a business name must contain at least one word"));
    assert!(PlaceQuery::builder("&").build().validate().is_err());
    assert!(PlaceQuery::builder("le la").build().validate().is_err());

    let errors = PlaceQuery::builder("Dupont").postal_code("12").build().validate().unwrap_err();

    assert!(errors.to_string().contains("a postal code must have five digits"));
    assert!(PlaceQuery::builder("Dupont").postal_code("750050").build().validate().is_err());
  }

  #[test]
  fn precompute_query() {
    let query = PlaceQuery::builder("Boulangerie Dupont").address("12 bd Saint-Michel").postal_code("75 005").build();

    assert_eq!(query.name_tokens, ["boulangerie", "dupont"]);
    assert_eq!(query.distinctive_tokens, ["dupont"]);
    assert_eq!(query.address_tokens, ["12", "boulevard", "saint", "michel"]);
    assert_eq!(query.street_numbers, ["12"]);
    assert_eq!(query.postal_code_clean, "75005");
    assert_eq!(query.postal_codes(), ["75005"]);
  }

  #[test]
  fn query_postal_code_from_address() {
    let query = PlaceQuery::builder("Dupont").address("12 bd Saint-Michel 75005 Paris").build();

    assert!(!query.has_postal_code());
    assert_eq!(query.postal_codes(), ["75005"]);
  }

  #[test]
  fn place_postal_codes() {
    let place = Place::builder("p1", "Dupont").address("12 Bd Saint-Michel, 75005 Paris, France").postal_code("75005").build();

    assert_eq!(place.postal_codes(), ["75005"]);

    let place = Place::builder("p1", "Dupont").address("12 Bd Saint-Michel, 75005 Paris, France").build();

    assert_eq!(place.postal_codes(), ["75005"]);
  }

  #[test]
  fn place_info() {
    let place = Place::builder("p1", "Dupont")
      .address("12 Bd Saint-Michel, 75005 Paris, France")
      .international_phone("+33 1 23 45 67 89")
      .hours(&["lundi: 08:00–19:00"])
      .rating(4.5)
      .reviews(120)
      .location((48.85, 2.34))
      .build();

    let info = PlaceInfo::from(&place);

    assert_eq!(info.phone.as_deref(), Some("+33 1 23 45 67 89"));
    assert_eq!(info.opening_hours, ["lundi: 08:00–19:00"]);
    assert_eq!(info.review_count, Some(120));
    assert_eq!(info.latitude, Some(48.85));
    assert_eq!(info.longitude, Some(2.34));
  }

  #[test]
  fn validate_query() {
    use validator::Validate;

    assert!(PlaceQuery::builder("Dupont").build().validate().is_ok());
    assert!(PlaceQuery::builder("").build().validate().is_err());
    assert!(PlaceQuery::builder("   ").build().validate().is_err());
  }
}
