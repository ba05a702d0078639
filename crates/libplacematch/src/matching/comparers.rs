use std::borrow::Borrow;

use ahash::HashSet;
use strsim::levenshtein;

#[inline]
pub(crate) fn is_disjoint<S>(lhs: &[S], rhs: &[S]) -> bool
where
  S: Borrow<str>,
{
  let (bigger, smaller) = if lhs.len() > rhs.len() { (lhs, rhs) } else { (rhs, lhs) };

  if bigger.len() > 5 {
    let set = smaller.iter().map(|s| s.borrow()).collect::<HashSet<&str>>();

    return bigger.iter().all(|b| !set.contains(b.borrow()));
  }

  for a in lhs {
    for b in rhs {
      if a.borrow() == b.borrow() {
        return false;
      }
    }
  }

  true
}

pub(crate) fn levenshtein_similarity(lhs: &str, rhs: &str, max_edits: usize) -> f64 {
  if lhs.is_empty() || rhs.is_empty() {
    return 0.0;
  }
  if lhs == rhs {
    return 1.0;
  }

  let pct_edits = (lhs.len().min(rhs.len()) as f64 * 0.2).ceil();
  let max_edits = (max_edits as f64).min(pct_edits);

  if (lhs.len() as isize - rhs.len() as isize).abs() > max_edits as isize {
    return 0.0;
  }

  let distance = levenshtein(lhs, rhs) as f64;

  if distance > max_edits {
    return 0.0;
  }

  1.0 - (distance / lhs.len().max(rhs.len()) as f64)
}

/// Shortest token allowed to differ from its counterpart.
const TYPO_MIN_LENGTH: usize = 7;

/// Whether two normalized tokens designate the same word.
///
/// Only long tokens sharing their first letter may differ, by a single edit.
/// Family names a letter apart (Moreau and Moreno) stay different words.
#[inline]
pub(crate) fn tokens_match(lhs: &str, rhs: &str) -> bool {
  if lhs == rhs {
    return true;
  }

  if lhs.len() < TYPO_MIN_LENGTH || rhs.len() < TYPO_MIN_LENGTH || lhs.chars().any(|c| c.is_ascii_digit()) || rhs.chars().any(|c| c.is_ascii_digit()) {
    return false;
  }

  if lhs.chars().next() != rhs.chars().next() {
    return false;
  }

  levenshtein(lhs, rhs) <= 1
}

/// Number of `lhs` tokens having a matching token in `rhs`.
pub(crate) fn token_overlap<L, R>(lhs: &[L], rhs: &[R]) -> usize
where
  L: Borrow<str>,
  R: Borrow<str>,
{
  lhs.iter().filter(|l| rhs.iter().any(|r| tokens_match((*l).borrow(), r.borrow()))).count()
}
