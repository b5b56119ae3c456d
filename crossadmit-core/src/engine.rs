//! Pairwise cross-admission aggregation engine.
//!
//! Every query is a pure function of a submission snapshot. Each submission
//! admitted to `N` universities is expanded into its `N*(N-1)/2` unordered
//! pairs; each pair is tallied under its canonical (sorted) key together
//! with a per-major breakdown. Nothing is cached between calls.
//!
//! Tallies keep first-seen order, and all output sorting is stable, so two
//! calls over the same snapshot produce identical output.

use std::collections::HashMap;
use std::hash::Hash;

use crate::stats;
use crate::types::{
    Comparison, ComparisonReport, MajorBreakdown, MajorMatch, MajorStat, PairKey, Submission,
};

/// Compute statistics for every pair of universities in the snapshot,
/// sorted by `totalAdmitted` descending.
pub fn compute_all_comparisons(submissions: &[Submission]) -> Vec<Comparison> {
    let mut aggregator = Aggregator::new();
    for submission in submissions {
        aggregator.add(submission);
    }
    let comparisons = aggregator.finish();
    tracing::debug!(
        submissions = submissions.len(),
        comparisons = comparisons.len(),
        "Computed cross-admit comparisons"
    );
    comparisons
}

/// Compute statistics for a single pair, in either argument order.
///
/// Returns `None` when no submission was admitted to both universities.
pub fn compute_comparison(
    submissions: &[Submission],
    university_a: &str,
    university_b: &str,
) -> Option<Comparison> {
    let key = PairKey::new(university_a, university_b);
    let mut aggregator = Aggregator::scoped(&key);
    for submission in submissions {
        aggregator.add(submission);
    }
    aggregator.finish().into_iter().next()
}

/// Major-level breakdown for a single pair.
///
/// `None` when the pair has no supporting submissions or when none of them
/// declared a major for either university.
pub fn compute_major_stats(
    submissions: &[Submission],
    university_a: &str,
    university_b: &str,
) -> Option<MajorBreakdown> {
    compute_comparison(submissions, university_a, university_b)
        .and_then(|comparison| comparison.major_stats)
}

/// Raw submissions admitted to both universities, most recent first.
pub fn list_submissions_for_pair(
    submissions: &[Submission],
    university_a: &str,
    university_b: &str,
) -> Vec<Submission> {
    let mut matching: Vec<Submission> = submissions
        .iter()
        .filter(|s| s.admits(university_a) && s.admits(university_b))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

/// Look a comparison up by its slug id.
///
/// If two pairs slugify to the same id, the one with more submissions wins.
pub fn find_comparison_by_id(submissions: &[Submission], id: &str) -> Option<Comparison> {
    compute_all_comparisons(submissions)
        .into_iter()
        .find(|comparison| comparison.id == id)
}

/// Every comparison plus the snapshot size.
pub fn build_report(submissions: &[Submission]) -> ComparisonReport {
    ComparisonReport {
        comparisons: compute_all_comparisons(submissions),
        total_submissions: submissions.len(),
    }
}

/// Order the two names the way [`PairKey`] does, without allocating.
fn canonical<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Insertion-ordered map used for every grouping in the engine.
#[derive(Debug)]
struct OrderedTally<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<V>,
}

impl<K: Eq + Hash, V> OrderedTally<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries.push(make());
                self.index.insert(key, slot);
                slot
            }
        };
        &mut self.entries[slot]
    }

    fn into_values(self) -> Vec<V> {
        self.entries
    }
}

struct Aggregator<'a> {
    scope: Option<(&'a str, &'a str)>,
    pairs: OrderedTally<(&'a str, &'a str), PairTally<'a>>,
}

impl<'a> Aggregator<'a> {
    fn new() -> Self {
        Self {
            scope: None,
            pairs: OrderedTally::new(),
        }
    }

    /// Only tally pairs matching `key`.
    fn scoped(key: &'a PairKey) -> Self {
        Self {
            scope: Some(key.as_refs()),
            pairs: OrderedTally::new(),
        }
    }

    fn add(&mut self, submission: &'a Submission) {
        let admitted = &submission.admitted_universities;
        for i in 0..admitted.len() {
            for j in (i + 1)..admitted.len() {
                let pair = canonical(&admitted[i], &admitted[j]);
                if self.scope.is_some_and(|scope| scope != pair) {
                    continue;
                }
                self.pairs
                    .entry_or_insert_with(pair, || PairTally::new(pair))
                    .record(submission);
            }
        }
    }

    fn finish(self) -> Vec<Comparison> {
        let mut comparisons: Vec<Comparison> = self
            .pairs
            .into_values()
            .into_iter()
            .filter_map(PairTally::into_comparison)
            .collect();
        comparisons.sort_by(|a, b| b.total_admitted.cmp(&a.total_admitted));
        comparisons
    }
}

/// Running counters for one canonical university pair.
struct PairTally<'a> {
    first: &'a str,
    second: &'a str,
    total1: u32,
    total2: u32,
    chose1: u32,
    chose2: u32,
    majors: MajorTally<'a>,
}

impl<'a> PairTally<'a> {
    fn new((first, second): (&'a str, &'a str)) -> Self {
        Self {
            first,
            second,
            total1: 0,
            total2: 0,
            chose1: 0,
            chose2: 0,
            majors: MajorTally::new(),
        }
    }

    fn record(&mut self, submission: &'a Submission) {
        let registered = submission.registered_university.as_str();

        if self.is_self_pair() {
            // Both sides are one counter: two admissions, at most one choice.
            self.total1 += 2;
            self.total2 = self.total1;
            if registered == self.first {
                self.chose1 += 1;
            }
            self.chose2 = self.chose1;
            self.majors.record(submission, self.first, self.second);
            return;
        }

        self.total1 += 1;
        self.total2 += 1;

        if registered == self.first {
            self.chose1 += 1;
        } else if registered == self.second {
            self.chose2 += 1;
        }

        self.majors.record(submission, self.first, self.second);
    }

    /// A pair produced by a university listed twice in one submission.
    fn is_self_pair(&self) -> bool {
        self.first == self.second
    }

    fn into_comparison(self) -> Option<Comparison> {
        // Both totals move together; max() tolerates a skew rather than failing.
        let total_admitted = self.total1.max(self.total2);
        if total_admitted == 0 {
            return None;
        }

        let percentage1 = stats::percentage(self.chose1, total_admitted);
        let percentage2 = stats::percentage(self.chose2, total_admitted);
        let key = PairKey::new(self.first, self.second);

        Some(Comparison {
            id: key.slug(),
            university1: self.first.to_string(),
            university2: self.second.to_string(),
            total_admitted,
            chose_university1: self.chose1,
            chose_university2: self.chose2,
            percentage1,
            percentage2,
            confidence_interval1: stats::confidence_interval(percentage1, total_admitted),
            confidence_interval2: stats::confidence_interval(percentage2, total_admitted),
            major_stats: self.majors.into_breakdown(),
        })
    }
}

#[derive(Default)]
struct StatCounter {
    total: u32,
    chose: u32,
}

struct MatchCounter<'a> {
    major1: &'a str,
    major2: &'a str,
    total: u32,
    chose1: u32,
    chose2: u32,
}

/// Major-level counters nested under one [`PairTally`].
struct MajorTally<'a> {
    /// Set once any submission declares a major on either side.
    declared: bool,
    side1: OrderedTally<&'a str, (&'a str, StatCounter)>,
    side2: OrderedTally<&'a str, (&'a str, StatCounter)>,
    matches: OrderedTally<(&'a str, &'a str), MatchCounter<'a>>,
}

impl<'a> MajorTally<'a> {
    fn new() -> Self {
        Self {
            declared: false,
            side1: OrderedTally::new(),
            side2: OrderedTally::new(),
            matches: OrderedTally::new(),
        }
    }

    fn record(&mut self, submission: &'a Submission, first: &str, second: &str) {
        if submission.declared_major(first).is_some() || submission.declared_major(second).is_some()
        {
            self.declared = true;
        }

        let major1 = submission.major_at(first);
        let major2 = submission.major_at(second);
        let registered = submission.registered_university.as_str();
        let chose_first = registered == first;
        let chose_second = registered == second;

        let (_, stat) = self
            .side1
            .entry_or_insert_with(major1, || (major1, StatCounter::default()));
        stat.total += 1;
        if chose_first {
            stat.chose += 1;
        }

        if first == second {
            // Same university on both sides: the second side lands on the
            // first side's (university, major) counter.
            stat.total += 1;
            if chose_second {
                stat.chose += 1;
            }
        } else {
            self.record_second_side(major2, chose_second);
        }

        // Unordered: (CS, Econ) and (Econ, CS) share one bucket.
        let match_key = canonical(major1, major2);
        let bucket = self.matches.entry_or_insert_with(match_key, || MatchCounter {
            major1,
            major2,
            total: 0,
            chose1: 0,
            chose2: 0,
        });
        bucket.total += 1;
        if chose_first {
            bucket.chose1 += 1;
        } else if chose_second {
            bucket.chose2 += 1;
        }
    }

    fn record_second_side(&mut self, major2: &'a str, chose_second: bool) {
        let (_, stat) = self
            .side2
            .entry_or_insert_with(major2, || (major2, StatCounter::default()));
        stat.total += 1;
        if chose_second {
            stat.chose += 1;
        }
    }

    fn into_breakdown(self) -> Option<MajorBreakdown> {
        if !self.declared {
            return None;
        }

        let mut major_matches: Vec<MajorMatch> = self
            .matches
            .into_values()
            .into_iter()
            .map(|m| MajorMatch {
                major1: m.major1.to_string(),
                major2: m.major2.to_string(),
                total: m.total,
                chose1: m.chose1,
                chose2: m.chose2,
                percentage1: stats::percentage(m.chose1, m.total),
                percentage2: stats::percentage(m.chose2, m.total),
            })
            .collect();
        major_matches.sort_by(|a, b| b.total.cmp(&a.total));

        Some(MajorBreakdown {
            university1: side_stats(self.side1),
            university2: side_stats(self.side2),
            major_matches,
        })
    }
}

fn side_stats(side: OrderedTally<&str, (&str, StatCounter)>) -> Vec<MajorStat> {
    let mut stats: Vec<MajorStat> = side
        .into_values()
        .into_iter()
        .map(|(major, counter)| MajorStat {
            major: major.to_string(),
            total: counter.total,
            chose: counter.chose,
            percentage: stats::percentage(counter.chose, counter.total),
        })
        .collect();
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}
