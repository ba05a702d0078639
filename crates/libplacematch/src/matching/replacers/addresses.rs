use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::Deserialize;

use crate::matching::{extractors::normalize, replacers::Dictionaries};

pub(crate) static ADDRESS_FORMS: LazyLock<(AhoCorasick, Vec<String>)> = LazyLock::new(|| {
  let file = Dictionaries::get("address_forms.yml").expect("could not read address forms dictionary");
  let dictionary = serde_yaml::from_slice::<AddressFormDictionary>(&file.data).expect("could not unmarshal address forms dictionary");

  let mut patterns = Vec::new();
  let mut replacements = Vec::new();

  for item in dictionary.forms {
    let main = normalize(&item.main);

    for form in item.forms {
      patterns.push(normalize(&form));
      replacements.push(main.clone());
    }
  }

  (
    AhoCorasickBuilder::new().match_kind(MatchKind::LeftmostLongest).ascii_case_insensitive(true).build(patterns).unwrap(),
    replacements,
  )
});

#[derive(Deserialize)]
struct AddressFormDictionary {
  forms: Vec<AddressFormEntry>,
}

#[derive(Deserialize)]
struct AddressFormEntry {
  main: String,
  forms: Vec<String>,
}

#[cfg(test)]
mod tests {
  use crate::matching::replacers;

  #[test]
  fn canonicalize_address_forms() {
    let (aho, replacements) = &*super::ADDRESS_FORMS;

    assert_eq!(replacers::replace(aho, replacements, "12 bd st michel"), "12 boulevard saint michel");
    assert_eq!(replacers::replace(aho, replacements, "4 r du gal leclerc"), "4 rue du general leclerc");
    assert_eq!(replacers::replace(aho, replacements, "rue de strasbourg"), "rue de strasbourg");
  }
}
