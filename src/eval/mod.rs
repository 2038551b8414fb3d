//! Repo-level evaluation: symbol filtering, scoring and aggregation.
//!
//! # Overview
//!
//! Scoring a repository takes three symbol→type maps produced by running a
//! type checker over three versions of the same program:
//!
//! - **ground truth**: the human-annotated original;
//! - **prediction**: the tool-annotated version under evaluation;
//! - **baseline**: the version with every annotation stripped, telling the
//!   comparator which types were inferable with no annotations at all.
//!
//! [`repo::compare_repo_types`] decides which symbols are worth scoring and
//! produces a per-symbol score/exact-match table plus the missing-symbol set;
//! [`aggregate::RepoReport`] condenses that into repo-level figures: overall
//! means, depth buckets, long-tail (rarity) buckets and checker-consistency
//! scores.
//!
//! ```
//! use tysim::{compare_repo_types, RawType, RepoReport, SymbolTypeMap};
//!
//! let mut ground = SymbolTypeMap::new();
//! ground.insert("pkg.mod.f@x".into(), RawType::None);
//! let prediction = ground.clone();
//! let baseline = SymbolTypeMap::new();
//!
//! let comparison = compare_repo_types(&ground, &prediction, &baseline)?;
//! let report = RepoReport::new(&comparison, 0, 0);
//! assert_eq!(report.similarity.overall, Some(1.0));
//! # Ok::<(), tysim::Error>(())
//! ```

pub mod aggregate;
pub mod repo;

pub use aggregate::{consistency_score, DepthBucket, RepoReport, ScoreSummary};
pub use repo::{compare_repo_types, RepoComparison, SymbolTypeMap};
