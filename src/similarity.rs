//! Pairwise type similarity.
//!
//! The recursive comparator at the heart of the engine: given two validated
//! type trees, produce a score in [0.0, 1.0].
//!
//! # Algorithm
//!
//! 1. **Union unwrapping**: if either side is a union, compare the two member
//!    lists with optimal bipartite matching (a lone non-union side becomes a
//!    singleton list).
//! 2. **Exact textual match**: identical canonical renderings score 1.0.
//! 3. **Origin similarity**: otherwise compare the two origins' attribute
//!    surfaces, discounting the universal surface everything shares.
//! 4. **Generic-argument blending**: when both sides carry arguments, average
//!    the origin score with the positional argument score; when only one side
//!    does, halve the origin score.
//!
//! # Examples
//!
//! ```
//! use tysim::{type_similarity, TypeNode};
//!
//! // Reordered unions still score 1.0: matching is order-independent.
//! let a = TypeNode::Union(vec![TypeNode::Any, TypeNode::None]);
//! let b = TypeNode::Union(vec![TypeNode::None, TypeNode::Any]);
//! assert_eq!(type_similarity(&a, &b), 1.0);
//! ```

use crate::matching::max_assignment;
use crate::ty::{universal_attrs, TypeNode};

/// Compute the similarity of two type trees.
///
/// Returns a value in [0.0, 1.0]; 1.0 means the trees are equivalent (up to
/// union member order). Both trees must already be validated: unsupported
/// constructs never reach this function.
#[must_use]
pub fn type_similarity(a: &TypeNode, b: &TypeNode) -> f64 {
    match (a, b) {
        (TypeNode::Union(a_members), TypeNode::Union(b_members)) => {
            return compare_level(a_members, b_members, true);
        }
        (TypeNode::Union(a_members), _) => {
            return compare_level(a_members, std::slice::from_ref(b), true);
        }
        (_, TypeNode::Union(b_members)) => {
            return compare_level(std::slice::from_ref(a), b_members, true);
        }
        _ => {}
    }

    let score = if a.to_string() == b.to_string() {
        1.0
    } else {
        origin_similarity(a, b)
    };

    let a_args = a.children();
    let b_args = b.children();
    if !a_args.is_empty() && !b_args.is_empty() {
        (score + compare_level(a_args, b_args, false)) / 2.0
    } else if !a_args.is_empty() || !b_args.is_empty() {
        // Arity/shape mismatch: one side is generic, the other bare.
        score / 2.0
    } else {
        score
    }
}

/// Compare two sequences of types at one nesting level.
///
/// With `is_union` set, the sequences are union member lists: members are
/// paired by optimal assignment so declaration order never matters. Otherwise
/// the sequences are positional argument lists and are compared index by
/// index up to the shorter length.
///
/// Either way the summed pair similarity is divided by the *longer* side's
/// length, so unmatched members always dilute the score. Two empty sequences
/// score 0.0 (never produced by [`type_similarity`], which only reaches here
/// with at least one non-empty side).
#[must_use]
pub fn compare_level(a: &[TypeNode], b: &[TypeNode], is_union: bool) -> f64 {
    let longer = a.len().max(b.len());
    if longer == 0 {
        return 0.0;
    }

    let matched = if is_union {
        let weights: Vec<Vec<f64>> = b
            .iter()
            .map(|b_member| a.iter().map(|a_member| type_similarity(b_member, a_member)).collect())
            .collect();
        let mut matched = 0.0;
        for (i, j) in max_assignment(&weights) {
            log::trace!(
                "union member match: {} <-> {} scored {:.4}",
                b[i],
                a[j],
                weights[i][j]
            );
            matched += weights[i][j];
        }
        matched
    } else {
        a.iter()
            .zip(b.iter())
            .map(|(a_arg, b_arg)| type_similarity(a_arg, b_arg))
            .sum()
    };

    matched / longer as f64
}

/// Structural similarity of two origins, ignoring generic arguments.
///
/// With `AΔB` the symmetric difference of the two attribute surfaces and
/// `common` their intersection minus the universal surface, the score is
/// `1 − |AΔB| / (|common| + |AΔB|)`, or 1.0 when both quantities are empty.
/// Shared universal attributes never count: two types whose only overlap is
/// the surface everything has score 0.0.
fn origin_similarity(a: &TypeNode, b: &TypeNode) -> f64 {
    let a_attrs = a.origin_attrs();
    let b_attrs = b.origin_attrs();

    let sym_diff = a_attrs.symmetric_difference(&b_attrs).count();
    let universal = universal_attrs();
    let meaningful_common = a_attrs
        .intersection(&b_attrs)
        .filter(|attr| !universal.contains(*attr))
        .count();

    let denominator = meaningful_common + sym_diff;
    if denominator == 0 {
        1.0
    } else {
        1.0 - sym_diff as f64 / denominator as f64
    }
}
