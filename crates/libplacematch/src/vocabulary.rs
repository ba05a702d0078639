//! Tooling to build generic-word lists out of a corpus of business names.
//!
//! Words shared by many businesses (activities, legal forms, place words)
//! carry little information when telling two businesses apart. Counting word
//! occurrences over a large enough corpus of names surfaces them.

use std::{fs, io::BufReader, path::Path};

use ahash::{HashMap, HashMapExt, HashSet};
use anyhow::Context;
use itertools::Itertools;
use serde_json::Value;
use serde_jsonlines::JsonLinesReader;

use crate::{
  error::PlaceMatchError,
  matching::{extractors::normalize, replacers::generic::{GENERIC_WORDS, GenericWordsDictionary}},
};

/// Splits a name into words, dropping punctuation.
///
/// Letters, digits and underscores are kept, any other non-whitespace
/// character is removed without splitting the word it is part of.
fn words(value: &str, case_sensitive: bool) -> Vec<String> {
  let cleaned = value.chars().filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace()).collect::<String>();

  cleaned
    .split_whitespace()
    .map(|word| match case_sensitive {
      true => word.to_string(),
      false => word.to_lowercase(),
    })
    .collect()
}

/// Words appearing at least `threshold` times across all names.
///
/// Words are returned by decreasing number of occurrences, then
/// alphabetically.
pub fn frequent_words<S: AsRef<str>>(names: &[S], threshold: usize, case_sensitive: bool) -> Vec<(String, usize)> {
  let mut counts: HashMap<String, usize> = HashMap::new();

  for name in names {
    for word in words(name.as_ref(), case_sensitive) {
      *counts.entry(word).or_default() += 1;
    }
  }

  let mut frequent = counts.into_iter().filter(|(_, count)| *count >= threshold.max(1)).collect::<Vec<_>>();

  sort_words(&mut frequent, WordOrder::Count);
  frequent
}

/// How reported words are listed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WordOrder {
  /// Most frequent first, ties listed alphabetically.
  #[default]
  Count,
  Alphabetical,
}

pub fn sort_words(words: &mut [(String, usize)], order: WordOrder) {
  match order {
    WordOrder::Count => words.sort_by(|(lword, lcount), (rword, rcount)| rcount.cmp(lcount).then_with(|| lword.cmp(rword))),
    WordOrder::Alphabetical => words.sort_by(|(lword, _), (rword, _)| lword.cmp(rword)),
  }
}

/// Removes the given words from a name, keeping the case of the others.
pub fn strip_words<S: AsRef<str>>(name: &str, words_to_strip: &[S], case_sensitive: bool) -> String {
  let stripped = words_to_strip
    .iter()
    .map(|word| match case_sensitive {
      true => word.as_ref().to_string(),
      false => word.as_ref().to_lowercase(),
    })
    .collect::<HashSet<_>>();

  words(name, true)
    .into_iter()
    .filter(|word| {
      let key = match case_sensitive {
        true => word.clone(),
        false => word.to_lowercase(),
      };

      !stripped.contains(&key)
    })
    .join(" ")
}

/// Words not already part of the generic words dictionary.
pub fn unknown_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
  words
    .iter()
    .map(|word| word.as_ref().to_string())
    .filter(|word| {
      let normalized = normalize(word);

      !normalized.is_empty() && !GENERIC_WORDS.contains(&normalized)
    })
    .collect()
}

/// Pulls one string field out of every record.
///
/// Records that are not objects, or that miss the field, are skipped.
pub fn extract_names(records: &[Value], field: &str) -> Vec<String> {
  let mut skipped = 0;

  let names = records
    .iter()
    .filter_map(|record| match record.get(field).and_then(Value::as_str) {
      Some(name) => Some(name.to_string()),
      None => {
        skipped += 1;
        None
      }
    })
    .collect::<Vec<_>>();

  if skipped > 0 {
    tracing::warn!(field, skipped, "some records did not have the requested field");
  }

  names
}

/// Reads records from a file holding either a JSON array or JSON lines.
pub fn read_records(path: &Path) -> Result<Vec<Value>, PlaceMatchError> {
  let data = fs::read(path).with_context(|| format!("could not read {}", path.display()))?;

  let records = match data.iter().find(|byte| !byte.is_ascii_whitespace()) {
    None => Vec::new(),

    Some(b'[') => serde_json::from_slice::<Vec<Value>>(&data).context("invalid JSON array")?,

    Some(_) => JsonLinesReader::new(BufReader::new(data.as_slice()))
      .read_all::<Value>()
      .collect::<Result<Vec<_>, _>>()
      .context("invalid JSON lines")?,
  };

  Ok(records)
}

/// Layout of a delimited text file.
#[derive(Clone, Copy, Debug)]
pub struct CsvOptions {
  pub delimiter: u8,
  pub quote: u8,
  /// Whether the first row names the columns.
  pub has_headers: bool,
}

impl Default for CsvOptions {
  fn default() -> Self {
    CsvOptions {
      delimiter: b',',
      quote: b'"',
      has_headers: true,
    }
  }
}

fn csv_reader(path: &Path, options: &CsvOptions) -> Result<csv::Reader<fs::File>, PlaceMatchError> {
  let reader = csv::ReaderBuilder::new()
    .delimiter(options.delimiter)
    .quote(options.quote)
    .has_headers(options.has_headers)
    .flexible(true)
    .from_path(path)
    .with_context(|| format!("could not read {}", path.display()))?;

  Ok(reader)
}

/// Reads the rows of a CSV file as JSON objects.
///
/// Values are keyed by column name, or by column index (`"0"`, `"1"`...)
/// when the file has no header row or a row is longer than the header.
pub fn read_csv_records(path: &Path, options: &CsvOptions) -> Result<Vec<Value>, PlaceMatchError> {
  let mut reader = csv_reader(path, options)?;

  let headers = match options.has_headers {
    true => Some(reader.headers().context("could not read CSV header")?.clone()),
    false => None,
  };

  reader
    .records()
    .map(|record| -> Result<Value, PlaceMatchError> {
      let record = record.context("invalid CSV record")?;

      let object = record
        .iter()
        .enumerate()
        .map(|(idx, value)| {
          let key = headers.as_ref().and_then(|headers| headers.get(idx)).map(str::to_string).unwrap_or_else(|| idx.to_string());

          (key, Value::String(value.to_string()))
        })
        .collect::<serde_json::Map<_, _>>();

      Ok(Value::Object(object))
    })
    .collect()
}

/// Rewrites a CSV file with the given words removed from every field.
///
/// The header row, if any, is copied as is.
pub fn strip_csv<S: AsRef<str>>(path: &Path, options: &CsvOptions, words_to_strip: &[S], case_sensitive: bool) -> Result<String, PlaceMatchError> {
  let mut reader = csv_reader(path, options)?;
  let mut writer = csv::WriterBuilder::new().delimiter(options.delimiter).quote(options.quote).flexible(true).from_writer(Vec::new());

  if options.has_headers {
    let headers = reader.headers().context("could not read CSV header")?.clone();

    writer.write_record(&headers).context("could not write CSV header")?;
  }

  for record in reader.records() {
    let record = record.context("invalid CSV record")?;

    writer
      .write_record(record.iter().map(|field| strip_words(field, words_to_strip, case_sensitive)))
      .context("could not write CSV record")?;
  }

  let data = writer.into_inner().map_err(|err| anyhow::anyhow!("could not write CSV output: {}", err.error()))?;

  Ok(String::from_utf8(data).context("CSV output is not valid UTF-8")?)
}

/// Serializes words as a dictionary with the layout of `generic_words.yml`.
pub fn to_dictionary<S: AsRef<str>>(words: &[S]) -> Result<String, PlaceMatchError> {
  let dictionary = GenericWordsDictionary {
    business: words.iter().map(|word| word.as_ref().to_string()).collect(),
    ..Default::default()
  };

  Ok(serde_yaml::to_string(&dictionary).context("could not serialize dictionary")?)
}
