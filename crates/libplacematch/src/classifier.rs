use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
  error::PlaceMatchError,
  matching::extractors,
  model::{Place, PlaceQuery},
};

/// Tie-breaker consulted when the heuristics cannot tell whether a place is
/// the one described by the query.
#[allow(async_fn_in_trait)]
pub trait Classifier: Clone + Send + Sync + 'static {
  /// Returns `None` when the classifier could not reach a decision.
  fn same_place(&self, query: &PlaceQuery, place: &Place) -> impl Future<Output = Result<Option<bool>, PlaceMatchError>> + Send;
}

/// Classifier that never decides.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClassifier;

impl Classifier for NoClassifier {
  async fn same_place(&self, _: &PlaceQuery, _: &Place) -> Result<Option<bool>, PlaceMatchError> {
    Ok(None)
  }
}

/// An optional classifier, undecided when absent.
impl<C: Classifier> Classifier for Option<C> {
  async fn same_place(&self, query: &PlaceQuery, place: &Place) -> Result<Option<bool>, PlaceMatchError> {
    match self {
      Some(classifier) => classifier.same_place(query, place).await,
      None => Ok(None),
    }
  }
}

/// Classifier asking a local Ollama model.
#[derive(Clone, Debug)]
pub struct OllamaClassifier {
  client: Client,
  url: String,
  model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'r> {
  model: &'r str,
  prompt: String,
  stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  response: String,
}

impl OllamaClassifier {
  pub fn new(url: &str, model: &str, timeout: Duration) -> Result<OllamaClassifier, PlaceMatchError> {
    Ok(OllamaClassifier {
      client: Client::builder().timeout(timeout).build()?,
      url: url.trim_end_matches('/').to_string(),
      model: model.to_string(),
    })
  }
}

fn prompt(query: &PlaceQuery, place: &Place) -> String {
  format!(
    "Ces deux descriptions désignent-elles le même établissement ? Réponds uniquement par oui ou par non.\n\n\
     Établissement recherché : {}, {} {}\n\
     Établissement trouvé : {}, {}",
    query.name.trim(),
    query.address.trim(),
    query.postal_code.trim(),
    place.name.trim(),
    place.formatted_address.trim(),
  )
}

fn parse_answer(answer: &str) -> Option<bool> {
  match extractors::tokenize(answer).first().map(String::as_str) {
    Some("oui" | "yes") => Some(true),
    Some("non" | "no") => Some(false),
    _ => None,
  }
}

impl Classifier for OllamaClassifier {
  #[instrument(skip_all, fields(model = self.model, place_id = place.place_id))]
  async fn same_place(&self, query: &PlaceQuery, place: &Place) -> Result<Option<bool>, PlaceMatchError> {
    let request = GenerateRequest {
      model: &self.model,
      prompt: prompt(query, place),
      stream: false,
    };

    let response = self.client.post(format!("{}/api/generate", self.url)).json(&request).send().await?.error_for_status()?;
    let answer = response.json::<GenerateResponse>().await?;
    let decision = parse_answer(&answer.response);

    tracing::debug!(answer = answer.response, decision = ?decision, "classifier answered");

    Ok(decision)
  }
}
