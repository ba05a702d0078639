use libplacematch::prelude::*;

use crate::api::{AppState, config::Config};

mod api;
mod middlewares;

pub(super) fn places() -> Vec<Place> {
  vec![
    Place::builder("p1", "Boulangerie Dupont")
      .address("12 Bd Saint-Michel, 75005 Paris, France")
      .postal_code("75005")
      .phone("01 43 54 00 00")
      .international_phone("+33 1 43 54 00 00")
      .website("https://boulangerie-dupont.fr")
      .hours(&["lundi: 07:00–20:00", "mardi: 07:00–20:00"])
      .rating(4.5)
      .reviews(212)
      .url("https://maps.google.com/?cid=1")
      .status("OPERATIONAL")
      .location((48.8511, 2.3435))
      .build(),
    Place::builder("p2", "Garage Moreau").address("3 Rue de Lyon, 13001 Marseille, France").postal_code("13001").build(),
  ]
}

pub(super) fn state<P: PlacesProvider>(config: Config, provider: P) -> AppState<P> {
  AppState {
    config,
    prometheus: None,
    placematch: PlaceMatch::with_classifier(provider).classifier(None).build(),
  }
}
