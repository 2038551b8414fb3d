//! Repo-level aggregates: overall means, depth buckets, long-tail buckets
//! and checker-consistency scores.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::eval::repo::RepoComparison;
use crate::meta::TypeMeta;

/// Depths at or above this value share the deepest reporting bucket.
pub const MAX_DEPTH_BUCKET: usize = 5;

/// Labels occurring fewer than this many times feed the first long-tail
/// figure; [`LONG_TAIL_WIDE`] feeds the second.
pub const LONG_TAIL_NARROW: usize = 5;
/// Wider rarity threshold, see [`LONG_TAIL_NARROW`].
pub const LONG_TAIL_WIDE: usize = 10;

/// Count and mean score of one depth bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBucket {
    /// Number of scored symbols in the bucket.
    pub symbols: usize,
    /// Mean score across those symbols.
    pub mean: f64,
}

/// Aggregates over one per-symbol score map.
///
/// Computed twice per repo: once over the similarity scores and once over
/// the exact-match indicators (as 0/1 values). Figures that would require
/// dividing by zero are `None`, never `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Number of scored symbols (missing ones included, at score 0).
    pub symbols: usize,
    /// Number of missing symbols among them.
    pub missing: usize,
    /// Mean score over all scored symbols; `None` when nothing was scored.
    pub overall: Option<f64>,
    /// [`ScoreSummary::overall`] rescaled to exclude the missing symbols'
    /// zero contributions: `overall · n/(n − missing)`. `Some(0.0)` when
    /// every symbol is missing, `None` when nothing was scored. Exact only
    /// because missing symbols score exactly 0 by construction.
    pub overall_excluding_missing: Option<f64>,
    /// Mean score per nesting-depth bucket (depth capped at
    /// [`MAX_DEPTH_BUCKET`]); only non-empty buckets appear.
    pub by_depth: BTreeMap<usize, DepthBucket>,
    /// Pooled mean score over symbols whose ground-truth label occurs fewer
    /// than [`LONG_TAIL_NARROW`] times; `None` when no label is that rare.
    pub long_tail_under_5: Option<f64>,
    /// Same pooling with the [`LONG_TAIL_WIDE`] threshold.
    pub long_tail_under_10: Option<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn pooled_long_tail(label_scores: &BTreeMap<&str, Vec<f64>>, threshold: usize) -> Option<f64> {
    let pool: Vec<f64> = label_scores
        .values()
        .filter(|scores| scores.len() < threshold)
        .flat_map(|scores| scores.iter().copied())
        .collect();
    if pool.is_empty() {
        None
    } else {
        Some(mean(&pool))
    }
}

impl ScoreSummary {
    /// Aggregate one score map, using `meta` for depth and label strata and
    /// `missing` for the rescaled overall.
    #[must_use]
    pub fn compute(
        scores: &BTreeMap<String, f64>,
        meta: &BTreeMap<String, TypeMeta>,
        missing: &BTreeSet<String>,
    ) -> Self {
        let symbols = scores.len();
        let overall = if symbols == 0 {
            None
        } else {
            Some(scores.values().sum::<f64>() / symbols as f64)
        };
        let overall_excluding_missing = overall.map(|overall| {
            if missing.len() < symbols {
                overall * symbols as f64 / (symbols - missing.len()) as f64
            } else {
                0.0
            }
        });

        let mut depth_scores: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut label_scores: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for (name, &score) in scores {
            let Some(symbol_meta) = meta.get(name) else {
                continue;
            };
            depth_scores
                .entry(symbol_meta.depth.min(MAX_DEPTH_BUCKET))
                .or_default()
                .push(score);
            label_scores
                .entry(symbol_meta.label.as_str())
                .or_default()
                .push(score);
        }

        let by_depth = depth_scores
            .into_iter()
            .map(|(depth, scores)| {
                (
                    depth,
                    DepthBucket {
                        symbols: scores.len(),
                        mean: mean(&scores),
                    },
                )
            })
            .collect();

        ScoreSummary {
            symbols,
            missing: missing.len(),
            overall,
            overall_excluding_missing,
            by_depth,
            long_tail_under_5: pooled_long_tail(&label_scores, LONG_TAIL_NARROW),
            long_tail_under_10: pooled_long_tail(&label_scores, LONG_TAIL_WIDE),
        }
    }
}

/// Consistency of a checked repo: `exp(−10·errors/scored_symbols)`.
///
/// Decays sharply: a handful of checker errors relative to the scored
/// symbol count already pulls the score well below 1. Requires
/// `scored_symbols > 0`; [`RepoReport::new`] guards this and reports `None`
/// instead when nothing was scored.
///
/// ```
/// use tysim::consistency_score;
///
/// assert_eq!(consistency_score(0, 50), 1.0);
/// assert!(consistency_score(5, 50) < consistency_score(1, 50));
/// ```
#[must_use]
pub fn consistency_score(errors: usize, scored_symbols: usize) -> f64 {
    debug_assert!(scored_symbols > 0, "consistency needs scored symbols");
    (-10.0 * errors as f64 / scored_symbols as f64).exp()
}

/// Full repo-level report: similarity and exact-match aggregates plus the
/// two checker-consistency figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoReport {
    /// Aggregates over the similarity scores.
    pub similarity: ScoreSummary,
    /// Aggregates over the exact-match indicators.
    pub exact: ScoreSummary,
    /// Missing symbols over scored symbols; `None` when nothing was scored.
    pub missing_ratio: Option<f64>,
    /// Consistency of the ground-truth checker run.
    pub ground_consistency: Option<f64>,
    /// Consistency of the prediction checker run.
    pub prediction_consistency: Option<f64>,
}

impl RepoReport {
    /// Build the report from a comparison and the two checker runs' filtered
    /// error counts.
    #[must_use]
    pub fn new(
        comparison: &RepoComparison,
        ground_errors: usize,
        prediction_errors: usize,
    ) -> Self {
        let similarity = ScoreSummary::compute(
            &comparison.scores,
            &comparison.ground_meta,
            &comparison.missing,
        );
        let exact_scores: BTreeMap<String, f64> = comparison
            .exact
            .iter()
            .map(|(name, &exact)| (name.clone(), if exact { 1.0 } else { 0.0 }))
            .collect();
        let exact = ScoreSummary::compute(&exact_scores, &comparison.ground_meta, &comparison.missing);

        let scored = comparison.scores.len();
        let missing_ratio = (scored > 0).then(|| comparison.missing.len() as f64 / scored as f64);
        let consistency = |errors| (scored > 0).then(|| consistency_score(errors, scored));

        RepoReport {
            similarity,
            exact,
            missing_ratio,
            ground_consistency: consistency(ground_errors),
            prediction_consistency: consistency(prediction_errors),
        }
    }

    /// Render the report as human-readable text; undefined figures show as
    /// `n/a`.
    #[must_use]
    pub fn render(&self) -> String {
        fn opt(value: Option<f64>) -> String {
            value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Scored symbols: {} ({} missing, ratio {})",
            self.similarity.symbols,
            self.similarity.missing,
            opt(self.missing_ratio),
        );
        for (title, summary) in [("Similarity", &self.similarity), ("Exact match", &self.exact)] {
            let _ = writeln!(
                out,
                "{title}: overall {}, excluding missing {}",
                opt(summary.overall),
                opt(summary.overall_excluding_missing),
            );
            for (depth, bucket) in &summary.by_depth {
                let _ = writeln!(
                    out,
                    "  depth {depth}: {} symbols, mean {:.4}",
                    bucket.symbols, bucket.mean
                );
            }
            let _ = writeln!(
                out,
                "  long tail: <{LONG_TAIL_NARROW} {}, <{LONG_TAIL_WIDE} {}",
                opt(summary.long_tail_under_5),
                opt(summary.long_tail_under_10),
            );
        }
        let _ = writeln!(
            out,
            "Consistency: ground {}, prediction {}",
            opt(self.ground_consistency),
            opt(self.prediction_consistency),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(depth: usize, label: &str) -> TypeMeta {
        TypeMeta {
            depth,
            count: depth,
            label: label.to_string(),
        }
    }

    fn fixture(
        entries: &[(&str, f64, usize, &str)],
        missing: &[&str],
    ) -> (
        BTreeMap<String, f64>,
        BTreeMap<String, TypeMeta>,
        BTreeSet<String>,
    ) {
        let scores = entries
            .iter()
            .map(|(name, score, _, _)| (name.to_string(), *score))
            .collect();
        let metas = entries
            .iter()
            .map(|(name, _, depth, label)| (name.to_string(), meta(*depth, label)))
            .collect();
        let missing = missing.iter().map(|name| name.to_string()).collect();
        (scores, metas, missing)
    }

    #[test]
    fn empty_score_map_yields_not_applicable() {
        let (scores, metas, missing) = fixture(&[], &[]);
        let summary = ScoreSummary::compute(&scores, &metas, &missing);
        assert_eq!(summary.overall, None);
        assert_eq!(summary.overall_excluding_missing, None);
        assert!(summary.by_depth.is_empty());
        assert_eq!(summary.long_tail_under_5, None);
    }

    #[test]
    fn excluding_missing_equals_overall_when_nothing_is_missing() {
        let (scores, metas, missing) =
            fixture(&[("a", 0.5, 1, "int"), ("b", 1.0, 1, "str")], &[]);
        let summary = ScoreSummary::compute(&scores, &metas, &missing);
        assert_eq!(summary.overall, summary.overall_excluding_missing);
    }

    #[test]
    fn excluding_missing_rescales_the_mean() {
        // Two real scores of 0.6 plus one missing zero: overall 0.4,
        // excluding missing 0.4 * 3/2 = 0.6.
        let (scores, metas, missing) = fixture(
            &[("a", 0.6, 1, "int"), ("b", 0.6, 1, "int"), ("c", 0.0, 1, "int")],
            &["c"],
        );
        let summary = ScoreSummary::compute(&scores, &metas, &missing);
        assert!((summary.overall.unwrap() - 0.4).abs() < 1e-9);
        assert!((summary.overall_excluding_missing.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn all_missing_reports_zero_not_nan() {
        let (scores, metas, missing) = fixture(&[("a", 0.0, 1, "int")], &["a"]);
        let summary = ScoreSummary::compute(&scores, &metas, &missing);
        assert_eq!(summary.overall_excluding_missing, Some(0.0));
    }

    #[test]
    fn depths_cap_at_the_deepest_bucket() {
        let (scores, metas, missing) = fixture(
            &[("a", 1.0, 7, "deep"), ("b", 0.0, 5, "deep"), ("c", 0.5, 2, "int")],
            &[],
        );
        let summary = ScoreSummary::compute(&scores, &metas, &missing);
        let deepest = &summary.by_depth[&MAX_DEPTH_BUCKET];
        assert_eq!(deepest.symbols, 2);
        assert!((deepest.mean - 0.5).abs() < 1e-9);
        assert_eq!(summary.by_depth[&2].symbols, 1);
        assert!(!summary.by_depth.contains_key(&1));
    }

    #[test]
    fn long_tail_pools_member_scores_across_rare_labels() {
        // "int" occurs 5 times (not rare under <5); "str" once and "bytes"
        // twice pool into (0.9 + 0.1 + 0.5) / 3. Under <10 every label is
        // rare, pooling all eight scores.
        let entries: Vec<(String, f64, &str)> = (0..5)
            .map(|i| (format!("i{i}"), 1.0, "int"))
            .chain([("s0".to_string(), 0.9, "str")])
            .chain([("b0".to_string(), 0.1, "bytes"), ("b1".to_string(), 0.5, "bytes")])
            .collect();
        let scores: BTreeMap<String, f64> = entries
            .iter()
            .map(|(name, score, _)| (name.clone(), *score))
            .collect();
        let metas: BTreeMap<String, TypeMeta> = entries
            .iter()
            .map(|(name, _, label)| (name.clone(), meta(1, label)))
            .collect();
        let summary = ScoreSummary::compute(&scores, &metas, &BTreeSet::new());
        assert!((summary.long_tail_under_5.unwrap() - 1.5 / 3.0).abs() < 1e-9);
        assert!((summary.long_tail_under_10.unwrap() - 6.5 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn long_tail_is_not_applicable_without_rare_labels() {
        let entries: Vec<(String, f64)> = (0..12).map(|i| (format!("i{i}"), 1.0)).collect();
        let scores: BTreeMap<String, f64> = entries.iter().cloned().collect();
        let metas: BTreeMap<String, TypeMeta> = entries
            .iter()
            .map(|(name, _)| (name.clone(), meta(1, "int")))
            .collect();
        let summary = ScoreSummary::compute(&scores, &metas, &BTreeSet::new());
        assert_eq!(summary.long_tail_under_5, None);
        assert_eq!(summary.long_tail_under_10, None);
    }

    #[test]
    fn consistency_is_one_without_errors_and_strictly_decreasing() {
        assert_eq!(consistency_score(0, 10), 1.0);
        let mut previous = 1.0;
        for errors in 1..5 {
            let score = consistency_score(errors, 10);
            assert!(score < previous);
            previous = score;
        }
    }

    #[test]
    fn report_on_empty_comparison_is_all_not_applicable() {
        let report = RepoReport::new(&RepoComparison::default(), 3, 7);
        assert_eq!(report.similarity.overall, None);
        assert_eq!(report.missing_ratio, None);
        assert_eq!(report.ground_consistency, None);
        assert!(report.render().contains("n/a"));
    }

    #[test]
    fn report_aggregates_both_score_maps() {
        let mut comparison = RepoComparison::default();
        for (name, score, exact) in [("a", 1.0, true), ("b", 0.5, false), ("c", 0.0, false)] {
            comparison.scores.insert(name.to_string(), score);
            comparison.exact.insert(name.to_string(), exact);
            comparison
                .ground_meta
                .insert(name.to_string(), meta(1, "int"));
        }
        comparison.missing.insert("c".to_string());

        let report = RepoReport::new(&comparison, 0, 3);
        assert!((report.similarity.overall.unwrap() - 0.5).abs() < 1e-9);
        assert!((report.similarity.overall_excluding_missing.unwrap() - 0.75).abs() < 1e-9);
        assert!((report.exact.overall.unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert!((report.missing_ratio.unwrap() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.ground_consistency, Some(1.0));
        assert!((report.prediction_consistency.unwrap() - (-10.0_f64).exp()).abs() < 1e-12);
        let rendered = report.render();
        assert!(rendered.contains("Similarity"));
        assert!(rendered.contains("depth 1"));
    }

    #[test]
    fn report_serializes_round_trip() {
        let mut comparison = RepoComparison::default();
        comparison.scores.insert("a".to_string(), 0.25);
        comparison.exact.insert("a".to_string(), false);
        comparison.ground_meta.insert("a".to_string(), meta(2, "list[int]"));
        let report = RepoReport::new(&comparison, 1, 1);

        let json = serde_json::to_string(&report).unwrap();
        let back: RepoReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
