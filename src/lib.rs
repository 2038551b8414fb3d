//! # tysim
//!
//! Scoring core for type-annotation benchmarks.
//!
//! Given two independently type-checked versions of the same program (a
//! human-annotated ground truth and a tool-annotated prediction) plus a
//! stripped "no annotations" baseline, tysim decides which symbols are worth
//! scoring and how similar each predicted type is to its ground truth,
//! producing per-symbol scores in [0, 1] and repo-level aggregates.
//!
//! - **Type similarity**: recursive comparison of type trees with an exact
//!   textual short-circuit, attribute-surface origin comparison and
//!   generic-argument blending.
//! - **Optimal union matching**: union members are paired by exact bipartite
//!   assignment, so declaration order never costs score.
//! - **Repo comparison**: baseline filtering, unsupported-construct skipping
//!   and missing-symbol accounting across three symbol→type maps.
//! - **Aggregation**: overall means (with and without missing symbols),
//!   depth buckets, long-tail rarity buckets and checker-consistency scores.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tysim::{compare_repo_types, ClassDef, RawType, RepoReport, SymbolTypeMap};
//!
//! let int = Arc::new(ClassDef::new("builtins.int", ["__add__", "bit_length"]));
//! let string = Arc::new(ClassDef::new("builtins.str", ["__add__", "upper"]));
//!
//! let mut ground = SymbolTypeMap::new();
//! ground.insert("pkg.mod.f@x".into(), RawType::named(&int, vec![]));
//! ground.insert("pkg.mod.f::return".into(), RawType::named(&string, vec![]));
//!
//! let mut prediction = SymbolTypeMap::new();
//! prediction.insert("pkg.mod.f@x".into(), RawType::named(&int, vec![]));
//!
//! let baseline = SymbolTypeMap::new();
//!
//! let comparison = compare_repo_types(&ground, &prediction, &baseline)?;
//! assert_eq!(comparison.scores["pkg.mod.f@x"], 1.0);
//! assert!(comparison.missing.contains("pkg.mod.f::return"));
//!
//! let report = RepoReport::new(&comparison, 0, 0);
//! assert_eq!(report.similarity.overall, Some(0.5));
//! assert_eq!(report.similarity.overall_excluding_missing, Some(1.0));
//! # Ok::<(), tysim::Error>(())
//! ```
//!
//! ## Scope
//!
//! tysim never type-checks code, never resolves type aliases and never
//! approximates constructs outside its model (literals, callables, type
//! variables, ...): those are rejected per symbol, which is reported in the
//! missing/skip counts rather than failing a whole comparison. Extracting
//! symbol→type maps from source trees is the caller's concern.
//!
//! The engine is a pure, synchronous computation over in-memory inputs;
//! callers that want parallelism shard at repo granularity.

#![warn(missing_docs)]

mod error;
pub mod eval;
pub mod matching;
pub mod meta;
pub mod similarity;
pub mod ty;

pub use error::{Error, Result};
pub use eval::aggregate::{consistency_score, DepthBucket, RepoReport, ScoreSummary};
pub use eval::repo::{compare_repo_types, RepoComparison, SymbolTypeMap};
pub use meta::{type_meta, TypeMeta};
pub use similarity::{compare_level, type_similarity};
pub use ty::{ClassDef, RawType, TypeNode, UnsupportedKind};
