//! End-to-end engine scenarios over small hand-built snapshots.

use chrono::{Duration, TimeZone, Utc};
use crossadmit_core::{
    ConfidenceInterval, Submission, build_report, compute_all_comparisons, compute_comparison,
    compute_major_stats, list_submissions_for_pair,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn submission(id: &str, admitted: &[&str], registered: &str) -> Submission {
    Submission {
        id: id.into(),
        admitted_universities: admitted.iter().map(|s| s.to_string()).collect(),
        registered_university: registered.into(),
        admitted_majors: BTreeMap::new(),
        registered_major: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
    }
}

fn with_majors(mut s: Submission, majors: &[(&str, &str)]) -> Submission {
    s.admitted_majors = majors
        .iter()
        .map(|(u, m)| (u.to_string(), m.to_string()))
        .collect();
    s
}

#[test]
fn test_single_submission_full_choice() {
    let subs = vec![submission("1", &["A", "B"], "A")];
    let c = compute_comparison(&subs, "A", "B").unwrap();
    assert_eq!(c.total_admitted, 1);
    assert_eq!(c.chose_university1, 1);
    assert_eq!(c.chose_university2, 0);
    assert_eq!(c.percentage1, 100);
    assert_eq!(c.percentage2, 0);
    assert_eq!(c.confidence_interval1, ConfidenceInterval { min: 100.0, max: 100.0 });
    assert_eq!(c.confidence_interval2, ConfidenceInterval { min: 0.0, max: 0.0 });
}

#[test]
fn test_even_split_has_clamped_interval() {
    let subs = vec![
        submission("1", &["A", "B"], "A"),
        submission("2", &["B", "A"], "B"),
    ];
    let c = compute_comparison(&subs, "B", "A").unwrap();
    assert_eq!(c.total_admitted, 2);
    assert_eq!(c.percentage1, 50);
    assert_eq!(c.percentage2, 50);
    // margin = 69.3, so both bounds clamp.
    assert_eq!(c.confidence_interval1, ConfidenceInterval { min: 0.0, max: 100.0 });
    assert_eq!(c.confidence_interval2, ConfidenceInterval { min: 0.0, max: 100.0 });
}

#[test]
fn test_three_way_admission_contributes_to_every_pair() {
    let subs = vec![submission("1", &["A", "B", "C"], "C")];
    let all = compute_all_comparisons(&subs);
    assert_eq!(all.len(), 3);

    let ab = compute_comparison(&subs, "A", "B").unwrap();
    assert_eq!(ab.total_admitted, 1);
    assert_eq!(ab.chose_university1, 0);
    assert_eq!(ab.chose_university2, 0);

    let bc = compute_comparison(&subs, "C", "B").unwrap();
    assert_eq!(bc.chose_university2, 1);
    assert_eq!(bc.percentage2, 100);
}

#[test]
fn test_never_jointly_admitted_pair_is_absent() {
    let subs = vec![
        submission("1", &["A", "B"], "A"),
        submission("2", &["C", "D"], "D"),
    ];
    assert!(compute_comparison(&subs, "A", "C").is_none());
    assert!(
        compute_all_comparisons(&subs)
            .iter()
            .all(|c| c.id != "a-vs-c")
    );
    assert!(list_submissions_for_pair(&subs, "A", "C").is_empty());
}

#[test]
fn test_major_match_bucket_splits_choices() {
    let subs = vec![
        with_majors(
            submission("1", &["A", "B"], "A"),
            &[("A", "CS"), ("B", "Econ")],
        ),
        with_majors(
            submission("2", &["A", "B"], "B"),
            &[("A", "CS"), ("B", "Econ")],
        ),
    ];
    let majors = compute_major_stats(&subs, "A", "B").unwrap();
    assert_eq!(majors.major_matches.len(), 1);
    let m = &majors.major_matches[0];
    assert_eq!(m.major1, "CS");
    assert_eq!(m.major2, "Econ");
    assert_eq!(m.total, 2);
    assert_eq!(m.chose1, 1);
    assert_eq!(m.chose2, 1);
    assert_eq!(m.percentage1, 50);
    assert_eq!(m.percentage2, 50);

    let embedded = compute_comparison(&subs, "A", "B").unwrap().major_stats;
    assert_eq!(embedded, Some(majors));
}

#[test]
fn test_realistic_snapshot_report() {
    let base = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let mut subs = Vec::new();
    for i in 0..10 {
        let registered = if i < 7 { "Seoul National University" } else { "KAIST" };
        let mut s = submission(
            &format!("s{i}"),
            &["KAIST", "Seoul National University"],
            registered,
        );
        s.created_at = base + Duration::days(i);
        subs.push(s);
    }
    subs.push(submission(
        "s10",
        &["POSTECH", "KAIST", "Yonsei University"],
        "POSTECH",
    ));

    let report = build_report(&subs);
    assert_eq!(report.total_submissions, 11);
    assert_eq!(report.comparisons.len(), 4);

    let top = &report.comparisons[0];
    assert_eq!(top.id, "kaist-vs-seoul-national-university");
    assert_eq!(top.total_admitted, 10);
    assert_eq!(top.chose_university1, 3);
    assert_eq!(top.chose_university2, 7);
    assert_eq!(top.percentage1, 30);
    assert_eq!(top.percentage2, 70);
    // 1.96 * sqrt(30 * 70 / 10) = 28.40...
    assert_eq!(top.confidence_interval1, ConfidenceInterval { min: 1.6, max: 58.4 });
    assert_eq!(top.confidence_interval2, ConfidenceInterval { min: 41.6, max: 98.4 });

    let listed = list_submissions_for_pair(&subs, "Seoul National University", "KAIST");
    assert_eq!(listed.len(), 10);
    assert_eq!(listed[0].id, "s9");
    assert_eq!(listed[9].id, "s0");
}
