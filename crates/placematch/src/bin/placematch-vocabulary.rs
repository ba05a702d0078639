//! Builds generic-word lists from a corpus of business names.
//!
//! Reads JSON records (an array or JSON lines) or CSV rows, counts the words
//! of one of their fields and prints either the frequent words as a
//! dictionary in the layout of `generic_words.yml`, or the names with those
//! words removed. With CSV input, stripped output is the whole file rewritten
//! in the same layout.

use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use libplacematch::vocabulary::{self, CsvOptions, WordOrder};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
  /// Frequent words, as a YAML dictionary
  Dictionary,
  /// Frequent words with their number of occurrences
  Counts,
  /// Names with the frequent words removed, one per line
  Stripped,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
  /// CSV for `.csv` and `.tsv` files, JSON otherwise
  Auto,
  Json,
  Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Order {
  /// Most frequent words first
  Count,
  Alpha,
}

impl From<Order> for WordOrder {
  fn from(value: Order) -> Self {
    match value {
      Order::Count => WordOrder::Count,
      Order::Alpha => WordOrder::Alphabetical,
    }
  }
}

#[derive(Parser)]
#[command(name = "placematch-vocabulary")]
#[command(about = "Extract frequent words from a corpus of business names")]
struct Cli {
  /// JSON array, JSON lines or CSV file of records
  input: PathBuf,

  #[arg(long, value_enum, default_value_t = Format::Auto)]
  format: Format,

  /// Record field holding the business name, a column index for CSV files without header
  #[arg(long, default_value = "nom")]
  field: String,

  /// CSV field delimiter, a tab for `.tsv` files and a comma otherwise
  #[arg(long)]
  delimiter: Option<char>,

  /// CSV quote character
  #[arg(long, default_value_t = '"')]
  quote: char,

  /// The CSV file has no header row
  #[arg(long)]
  no_headers: bool,

  /// Minimum number of occurrences for a word to be reported
  #[arg(long, default_value_t = 3)]
  threshold: usize,

  /// Tell words apart by case
  #[arg(long)]
  case_sensitive: bool,

  /// Only report words missing from the built-in generic words
  #[arg(long)]
  only_new: bool,

  #[arg(long, value_enum, default_value_t = Output::Dictionary)]
  output: Output,

  /// How frequent words are listed
  #[arg(long, value_enum, default_value_t = Order::Count)]
  order: Order,

  /// Write to this file instead of the standard output
  #[arg(long, short)]
  out: Option<PathBuf>,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
  path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
}

fn ascii_byte(value: char, name: &str) -> anyhow::Result<u8> {
  match value.is_ascii() {
    true => Ok(value as u8),
    false => anyhow::bail!("the CSV {name} must be an ASCII character"),
  }
}

impl Cli {
  fn csv_options(&self) -> anyhow::Result<Option<CsvOptions>> {
    let is_csv = match self.format {
      Format::Csv => true,
      Format::Json => false,
      Format::Auto => has_extension(&self.input, &["csv", "tsv"]),
    };

    if !is_csv {
      return Ok(None);
    }

    let delimiter = self.delimiter.unwrap_or(if has_extension(&self.input, &["tsv"]) { '\t' } else { ',' });

    Ok(Some(CsvOptions {
      delimiter: ascii_byte(delimiter, "delimiter")?,
      quote: ascii_byte(self.quote, "quote")?,
      has_headers: !self.no_headers,
    }))
  }
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

  let cli = Cli::parse();

  let csv = cli.csv_options()?;

  let records = match &csv {
    Some(options) => vocabulary::read_csv_records(&cli.input, options)?,
    None => vocabulary::read_records(&cli.input)?,
  };
  let names = vocabulary::extract_names(&records, &cli.field);

  tracing::info!(records = records.len(), names = names.len(), "loaded corpus");

  let mut counts = vocabulary::frequent_words(&names, cli.threshold, cli.case_sensitive);

  if cli.only_new {
    let words = counts.iter().map(|(word, _)| word.as_str()).collect::<Vec<_>>();
    let unknown = vocabulary::unknown_words(&words);

    counts.retain(|(word, _)| unknown.contains(word));
  }

  vocabulary::sort_words(&mut counts, cli.order.into());

  tracing::info!(words = counts.len(), threshold = cli.threshold, "found frequent words");

  let words = counts.iter().map(|(word, _)| word.as_str()).collect::<Vec<_>>();

  let output = match cli.output {
    Output::Dictionary => vocabulary::to_dictionary(&words)?,
    Output::Counts => counts.iter().map(|(word, count)| format!("{count}\t{word}\n")).collect(),
    Output::Stripped => match &csv {
      Some(options) => vocabulary::strip_csv(&cli.input, options, &words, cli.case_sensitive)?,
      None => names
        .iter()
        .map(|name| vocabulary::strip_words(name, &words, cli.case_sensitive))
        .filter(|name| !name.is_empty())
        .map(|name| format!("{name}\n"))
        .collect(),
    },
  };

  match &cli.out {
    Some(path) => fs::write(path, output).with_context(|| format!("could not write {}", path.display()))?,
    None => io::stdout().lock().write_all(output.as_bytes()).context("could not write output")?,
  }

  Ok(())
}
