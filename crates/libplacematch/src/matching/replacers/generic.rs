use std::{collections::HashSet, sync::LazyLock};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::matching::{extractors::normalize, replacers::Dictionaries};

/// Short grammatical words, never meaningful in a name or an address.
pub(crate) static STOPWORDS: LazyLock<HashSet<String, RandomState>> = LazyLock::new(|| load().stopwords.iter().map(|word| normalize(word)).collect());

/// Every word considered generic when comparing business names: stopwords,
/// business activities, legal forms, qualifiers and place words.
pub(crate) static GENERIC_WORDS: LazyLock<HashSet<String, RandomState>> = LazyLock::new(|| {
  let dictionary = load();

  dictionary
    .stopwords
    .iter()
    .chain(dictionary.business.iter())
    .chain(dictionary.places.iter())
    .map(|word| normalize(word))
    .filter(|word| !word.is_empty())
    .collect()
});

fn load() -> GenericWordsDictionary {
  let file = Dictionaries::get("generic_words.yml").expect("could not read generic words dictionary");

  serde_yaml::from_slice::<GenericWordsDictionary>(&file.data).expect("could not unmarshal generic words dictionary")
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct GenericWordsDictionary {
  #[serde(default)]
  pub stopwords: Vec<String>,
  #[serde(default)]
  pub business: Vec<String>,
  #[serde(default)]
  pub places: Vec<String>,
}
