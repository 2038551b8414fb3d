//! Repo comparator: per-symbol scoring across three symbol→type maps.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::meta::{type_meta, TypeMeta};
use crate::similarity::type_similarity;
use crate::ty::{RawType, TypeNode};

/// Mapping from qualified symbol name to its extracted type.
///
/// Qualified names take three forms: plain attribute (`module.Class.attr`),
/// function parameter (`module.func@param`) and function return
/// (`module.func::return`). The comparator treats them as opaque keys; an
/// ordered map keeps every downstream aggregate deterministic.
pub type SymbolTypeMap = BTreeMap<String, RawType>;

/// Per-symbol comparison of a predicted repo against its ground truth.
///
/// Immutable once computed; inputs are never mutated. The metadata maps can
/// be large; callers that persist results may clear them first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoComparison {
    /// Similarity score in [0, 1] per scored symbol.
    pub scores: BTreeMap<String, f64>,
    /// Whether the canonical renderings matched exactly, per scored symbol.
    pub exact: BTreeMap<String, bool>,
    /// Scored symbols with no usable prediction; these always score 0.
    pub missing: BTreeSet<String>,
    /// Ground-truth type metadata per scored symbol.
    pub ground_meta: BTreeMap<String, TypeMeta>,
    /// Prediction type metadata, for symbols whose prediction normalized.
    pub prediction_meta: BTreeMap<String, TypeMeta>,
}

/// Score every eligible ground-truth symbol against the prediction map.
///
/// Per symbol in `ground`:
///
/// - skipped entirely (absent from every output) when its ground-truth type
///   is `Any`, when the `baseline` knows it as anything other than `Any`
///   (the type was inferable without annotations), or when its ground-truth
///   type uses an unsupported construct;
/// - scored via [`type_similarity`] when the prediction has a usable type;
/// - otherwise scored 0 and recorded in `missing`, including when the
///   prediction exists but uses an unsupported construct.
///
/// A malformed tree on either side is an upstream bug and fails the call.
pub fn compare_repo_types(
    ground: &SymbolTypeMap,
    prediction: &SymbolTypeMap,
    baseline: &SymbolTypeMap,
) -> Result<RepoComparison> {
    let mut out = RepoComparison::default();
    let mut unscorable = 0_usize;
    let mut unsupported = 0_usize;

    for (name, ground_raw) in ground {
        if matches!(ground_raw, RawType::Any) {
            unscorable += 1;
            continue;
        }
        if let Some(baseline_raw) = baseline.get(name) {
            if !matches!(baseline_raw, RawType::Any) {
                unscorable += 1;
                continue;
            }
        }

        let ground_node = match TypeNode::normalize(ground_raw) {
            Ok(node) => node,
            Err(Error::UnsupportedType(kind)) => {
                log::trace!("skipping {name}: ground truth uses {kind}");
                unsupported += 1;
                continue;
            }
            Err(err) => return Err(err),
        };
        out.ground_meta.insert(name.clone(), type_meta(&ground_node));

        let prediction_node = match prediction.get(name) {
            Some(prediction_raw) => match TypeNode::normalize(prediction_raw) {
                Ok(node) => Some(node),
                Err(Error::UnsupportedType(kind)) => {
                    log::trace!("treating {name} as missing: prediction uses {kind}");
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };

        match prediction_node {
            Some(prediction_node) => {
                out.prediction_meta
                    .insert(name.clone(), type_meta(&prediction_node));
                out.scores
                    .insert(name.clone(), type_similarity(&ground_node, &prediction_node));
                out.exact.insert(
                    name.clone(),
                    ground_node.to_string() == prediction_node.to_string(),
                );
            }
            None => {
                out.scores.insert(name.clone(), 0.0);
                out.exact.insert(name.clone(), false);
                out.missing.insert(name.clone());
            }
        }
    }

    log::debug!(
        "compared {} symbols: {} scored, {} missing, {} unscorable, {} unsupported",
        ground.len(),
        out.scores.len(),
        out.missing.len(),
        unscorable,
        unsupported,
    );
    Ok(out)
}
