//! Category → speed lookup tables and label reconciliation.
//!
//! # Category codes
//!
//! Landcover rasters carry integer class codes; road layers carry text tags
//! such as `"primary"` or `"Track"`.  Both are modelled by [`CategoryCode`],
//! a closed union with a single total order (all integers before all text),
//! so a [`SpeedMap`] can be sorted once and binary-searched thereafter.
//!
//! # Reconciliation
//!
//! Road vocabularies in real vector files rarely match the reference speed
//! table exactly (`"Primary Road"` vs `"primary"`).  [`SpeedMap::reconcile`]
//! rewrites a table's labels to the closest label present in the layer,
//! once, and the result is used as a plain lookup from then on.

use std::collections::HashMap;
use std::fmt;

use cpa_core::{CpaError, CpaResult};

/// Largest integer code for which a dense code → speed table is built.
const DENSE_CODE_LIMIT: i64 = 4096;

// ── CategoryCode ──────────────────────────────────────────────────────────────

/// A landcover class or road category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryCode {
    Int(i64),
    Text(String),
}

impl CategoryCode {
    /// Parse a table cell: integers (including `"10.0"`) become
    /// [`CategoryCode::Int`], anything else is kept as trimmed text.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return CategoryCode::Int(n);
        }
        if let Some(n) = s.parse::<f64>().ok().and_then(integral) {
            return CategoryCode::Int(n);
        }
        CategoryCode::Text(s.to_string())
    }

    /// Interpret a raster value as a code.  Non-integral and non-finite
    /// values have no code.
    #[inline]
    pub fn from_value(v: f64) -> Option<Self> {
        integral(v).map(CategoryCode::Int)
    }

    /// The code rendered as a label for string matching.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

#[inline]
fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

impl From<i64> for CategoryCode {
    fn from(n: i64) -> Self {
        CategoryCode::Int(n)
    }
}

impl From<&str> for CategoryCode {
    fn from(s: &str) -> Self {
        CategoryCode::Text(s.to_string())
    }
}

impl From<String> for CategoryCode {
    fn from(s: String) -> Self {
        CategoryCode::Text(s)
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryCode::Int(n)  => write!(f, "{n}"),
            CategoryCode::Text(s) => f.write_str(s),
        }
    }
}

// ── SpeedMap ──────────────────────────────────────────────────────────────────

/// Immutable, sorted `(category, speed km/h)` table.
#[derive(Clone, Debug)]
pub struct SpeedMap {
    entries: Vec<(CategoryCode, f64)>,
}

impl SpeedMap {
    /// Build from raw table rows.
    ///
    /// Rows with a missing or non-finite speed are dropped.  Fails with
    /// [`CpaError::Config`] if no rows remain or a category appears twice.
    pub fn build<I>(rows: I) -> CpaResult<Self>
    where
        I: IntoIterator<Item = (CategoryCode, Option<f64>)>,
    {
        let mut dropped = 0usize;
        let mut entries: Vec<(CategoryCode, f64)> = rows
            .into_iter()
            .filter_map(|(code, speed)| match speed.filter(|s| s.is_finite()) {
                Some(s) => Some((code, s)),
                None => {
                    dropped += 1;
                    None
                }
            })
            .collect();

        if dropped > 0 {
            log::debug!("speed table: dropped {dropped} rows without a speed");
        }
        if entries.is_empty() {
            return Err(CpaError::Config(
                "speed table has no usable rows".to_string(),
            ));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(w) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(CpaError::Config(format!(
                "speed table lists category {} more than once",
                w[0].0
            )));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending category order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryCode, f64)> + '_ {
        self.entries.iter().map(|(c, s)| (c, *s))
    }

    /// Speed for `code`, or `None` if the category is not in the table.
    #[inline]
    pub fn lookup(&self, code: &CategoryCode) -> Option<f64> {
        self.entries
            .binary_search_by(|(c, _)| c.cmp(code))
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Speed for a raster value interpreted as an integer code.
    #[inline]
    pub fn lookup_value(&self, v: f64) -> Option<f64> {
        CategoryCode::from_value(v).and_then(|c| self.lookup(&c))
    }

    /// Distinct speeds, fastest first.
    pub fn distinct_speeds_desc(&self) -> Vec<f64> {
        let mut speeds: Vec<f64> = self.entries.iter().map(|(_, s)| *s).collect();
        speeds.sort_by(|a, b| b.total_cmp(a));
        speeds.dedup();
        speeds
    }

    /// Dense `code → speed` table (NaN for absent codes) when every category
    /// is a small non-negative integer.
    pub(crate) fn dense_table(&self) -> Option<Vec<f64>> {
        let mut max = 0i64;
        for (code, _) in &self.entries {
            match code {
                CategoryCode::Int(n) if (0..DENSE_CODE_LIMIT).contains(n) => max = max.max(*n),
                _ => return None,
            }
        }
        let mut table = vec![f64::NAN; max as usize + 1];
        for (code, speed) in &self.entries {
            if let CategoryCode::Int(n) = code {
                table[*n as usize] = *speed;
            }
        }
        Some(table)
    }

    /// Rewrite every category to its closest label in `layer_labels`.
    ///
    /// Each table label is matched with [`best_match`]; ties go to the
    /// candidate that comes first in `layer_labels`.  When several table
    /// labels land on the same layer label the better-scoring one is kept
    /// (the earlier table entry on equal scores).
    ///
    /// Fails with [`CpaError::Config`] if `layer_labels` is empty.
    pub fn reconcile(&self, layer_labels: &[String]) -> CpaResult<SpeedMap> {
        if layer_labels.is_empty() {
            return Err(CpaError::Config(
                "cannot reconcile speed table against a layer with no categories".to_string(),
            ));
        }

        let mut chosen: HashMap<&str, (f64, f64)> = HashMap::with_capacity(self.entries.len());
        for (code, speed) in &self.entries {
            let label = code.label();
            let Some((matched, score)) = best_match(&label, layer_labels) else {
                continue;
            };
            log::debug!("using matched category {matched:?} for {label:?} (score {score:.2})");

            match chosen.get(matched) {
                Some(&(best, _)) if best >= score => {
                    log::debug!("category {matched:?} already matched with a better score; ignoring {label:?}");
                }
                _ => {
                    chosen.insert(matched, (score, *speed));
                }
            }
        }

        SpeedMap::build(
            chosen
                .into_iter()
                .map(|(label, (_, speed))| (CategoryCode::Text(label.to_string()), Some(speed))),
        )
    }
}

// ── String similarity ─────────────────────────────────────────────────────────

/// Closest candidate to `label` and its [`similarity`] score.
///
/// Scans `candidates` in order and keeps the first candidate with the highest
/// score, so the result is reproducible for a given candidate order.
pub fn best_match<'a>(label: &str, candidates: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for cand in candidates {
        let score = similarity(label, cand);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((cand.as_str(), score));
        }
    }
    best
}

/// Case-insensitive similarity in `[0, 1]`: one minus the Levenshtein edit
/// distance normalised by the longer string's length.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    // Single-row DP.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag
            } else {
                1 + diag.min(above).min(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}
