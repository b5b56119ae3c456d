//! Core type definitions for CrossAdmit.
//!
//! Defines raw submissions, the canonical pair key, and the derived
//! comparison structures produced by the aggregation engine. Field names
//! serialize in camelCase so existing presentation layers can consume them
//! unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Label used for a university whose major was not declared.
pub const UNSPECIFIED_MAJOR: &str = "미지정";

/// Separator used in the human-readable pair label.
pub const PAIR_SEPARATOR: &str = " vs ";

/// One student's record of admitted universities and final enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub admitted_universities: Vec<String>,
    pub registered_university: String,
    /// University name -> major admitted to.
    #[serde(default)]
    pub admitted_majors: BTreeMap<String, String>,
    /// Written as `""` when absent, so every record carries the key.
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        serialize_with = "none_as_blank"
    )]
    pub registered_major: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Whether `university` appears in the admitted list.
    pub fn admits(&self, university: &str) -> bool {
        self.admitted_universities.iter().any(|u| u == university)
    }

    /// Declared major at `university`, or [`UNSPECIFIED_MAJOR`].
    pub fn major_at(&self, university: &str) -> &str {
        self.declared_major(university).unwrap_or(UNSPECIFIED_MAJOR)
    }

    /// Declared major at `university`, ignoring blank entries.
    pub fn declared_major(&self, university: &str) -> Option<&str> {
        self.admitted_majors
            .get(university)
            .map(String::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Number of unordered pairs this submission induces.
    pub fn pair_count(&self) -> usize {
        let n = self.admitted_universities.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Payload accepted by the ingestion boundary, before `id` and `createdAt`
/// are assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[serde(default)]
    pub admitted_universities: Vec<String>,
    #[serde(default)]
    pub registered_university: String,
    #[serde(default)]
    pub admitted_majors: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub registered_major: Option<String>,
}

fn none_as_blank<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Order-independent key for a pair of university names.
///
/// The two names are stored in lexicographic order, so `PairKey::new(a, b)`
/// and `PairKey::new(b, a)` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// The lexicographically smaller name ("university1").
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger name ("university2").
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Display form, e.g. `"Korea University vs Yonsei University"`.
    pub fn label(&self) -> String {
        format!("{}{}{}", self.first, PAIR_SEPARATOR, self.second)
    }

    /// URL-safe identifier derived from [`PairKey::label`].
    pub fn slug(&self) -> String {
        slugify(&self.label())
    }

    pub(crate) fn as_refs(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.first, PAIR_SEPARATOR, self.second)
    }
}

/// Lowercase, collapse whitespace runs into `-`, and strip parentheses.
pub fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_space = false;
    for c in label.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if c == '(' || c == ')' {
            continue;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// 95% confidence interval on the percentage scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub min: f64,
    pub max: f64,
}

/// Aggregated choice statistics for one unordered pair of universities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub id: String,
    pub university1: String,
    pub university2: String,
    pub total_admitted: u32,
    pub chose_university1: u32,
    pub chose_university2: u32,
    pub percentage1: u32,
    pub percentage2: u32,
    pub confidence_interval1: ConfidenceInterval,
    pub confidence_interval2: ConfidenceInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_stats: Option<MajorBreakdown>,
}

impl Comparison {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.university1.clone(), self.university2.clone())
    }
}

/// Major-level breakdown nested under a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorBreakdown {
    /// Per-major stats for `university1`.
    pub university1: Vec<MajorStat>,
    /// Per-major stats for `university2`.
    pub university2: Vec<MajorStat>,
    pub major_matches: Vec<MajorMatch>,
}

/// Choice statistics for one (university, major) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorStat {
    pub major: String,
    pub total: u32,
    pub chose: u32,
    pub percentage: u32,
}

/// Choice statistics for one unordered pair of majors within a comparison.
///
/// `chose1` / `chose2` always count registrations at `university1` /
/// `university2` of the enclosing comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorMatch {
    pub major1: String,
    pub major2: String,
    pub total: u32,
    pub chose1: u32,
    pub chose2: u32,
    pub percentage1: u32,
    pub percentage2: u32,
}

/// Full listing payload: every comparison plus the snapshot size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub comparisons: Vec<Comparison>,
    pub total_submissions: usize,
}
