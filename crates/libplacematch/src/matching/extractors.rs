use std::{borrow::Borrow, sync::LazyLock};

use any_ascii::any_ascii;
use itertools::Itertools;
use regex::Regex;

use crate::matching::replacers::{
  self,
  addresses::ADDRESS_FORMS,
  generic::{GENERIC_WORDS, STOPWORDS},
};

static POSTAL_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{5}\b").unwrap());
static NUMBERS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Latinize, lowercase and replace every non-alphanumeric character with a
/// single space.
pub(crate) fn normalize(value: &str) -> String {
  let value = if value.is_ascii() { value.to_lowercase() } else { any_ascii(value).to_lowercase() };

  value
    .chars()
    .map(|c| match c {
      c if c.is_alphanumeric() => c,
      _ => ' ',
    })
    .collect::<String>()
    .split_whitespace()
    .join(" ")
}

#[inline(always)]
pub(crate) fn tokenize(value: &str) -> Vec<String> {
  normalize(value).split_whitespace().map(str::to_string).collect()
}

/// Unique name tokens, without stopwords.
pub(crate) fn name_tokens(name: &str) -> Vec<String> {
  tokenize(name).into_iter().filter(|token| !STOPWORDS.contains(token)).unique().collect()
}

/// Remove generic words from name tokens.
///
/// If nothing would be left (a business called "Boulangerie Pâtisserie", for
/// example), the tokens are returned as they were.
pub(crate) fn distinctive_tokens<'s, I, S>(tokens: I) -> Vec<String>
where
  S: Borrow<str> + 's,
  I: Iterator<Item = &'s S> + Clone,
{
  let distinctive = tokens
    .clone()
    .filter_map(|token| {
      let token: &str = token.borrow();

      (!GENERIC_WORDS.contains(token)).then(|| token.to_string())
    })
    .collect::<Vec<_>>();

  match distinctive.is_empty() {
    true => tokens
      .map(|token| {
        let token: &str = token.borrow();

        token.to_string()
      })
      .collect(),
    false => distinctive,
  }
}

/// Canonical address tokens: abbreviations expanded, stopwords and postal
/// codes removed.
pub(crate) fn address_tokens(address: &str) -> Vec<String> {
  let (aho, replacements) = &*ADDRESS_FORMS;

  replacers::replace(aho, replacements, &normalize(address))
    .split_whitespace()
    .filter(|token| !STOPWORDS.contains(*token))
    .filter(|token| !is_postal_code(token))
    .map(str::to_string)
    .unique()
    .collect()
}

/// Numbers short enough to be street numbers.
pub(crate) fn street_numbers<'s>(address: &'s str) -> impl Iterator<Item = &'s str> {
  NUMBERS_REGEX.find_iter(address).map(|number| number.as_str()).filter(|number| number.len() <= 4)
}

pub(crate) fn postal_codes<'s>(haystack: &'s str) -> impl Iterator<Item = &'s str> {
  POSTAL_CODE_REGEX.find_iter(haystack).map(|code| code.as_str())
}

/// Keep only the digits of a user-provided postal code ("75 002" → "75002").
pub(crate) fn clean_postal_code(value: &str) -> String {
  value.chars().filter(char::is_ascii_digit).collect()
}

#[inline(always)]
pub(crate) fn is_postal_code(token: &str) -> bool {
  token.len() == 5 && token.chars().all(|c| c.is_ascii_digit())
}
