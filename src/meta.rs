//! Structural type metadata: nesting depth and node count.
//!
//! Used only for stratified reporting (depth buckets, rarity buckets), never
//! for scoring itself.

use serde::{Deserialize, Serialize};

use crate::ty::TypeNode;

/// Structural metadata derived from one type tree.
///
/// `depth` is the longest chain of union-or-generic containment (a union
/// member and a generic argument each count as one level); `count` is the
/// total number of nodes in the tree. `label` is the canonical rendering of
/// the tree the metadata was computed for, which is what the rarity buckets
/// group by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    /// Longest nesting chain; at least 1.
    pub depth: usize,
    /// Total nodes in the tree; at least 1.
    pub count: usize,
    /// Canonical rendering of the measured tree.
    pub label: String,
}

impl TypeMeta {
    fn leaf(label: String) -> Self {
        TypeMeta {
            depth: 1,
            count: 1,
            label,
        }
    }

    /// Fold one child's metadata into a parent's.
    ///
    /// A child sits one nesting level below its parent, so the parent depth
    /// is `max(parent, child + 1)`; counts add. The parent's label wins.
    /// Folding over all children from the leaf seed yields the node's
    /// metadata with the node itself already counted.
    #[must_use]
    pub fn merge(self, child: TypeMeta) -> TypeMeta {
        TypeMeta {
            depth: self.depth.max(child.depth + 1),
            count: self.count + child.count,
            label: self.label,
        }
    }
}

/// Compute [`TypeMeta`] for a type tree. Total over every valid [`TypeNode`].
///
/// ```
/// use tysim::{type_meta, TypeNode};
///
/// let leaf = TypeNode::Any;
/// assert_eq!(type_meta(&leaf).depth, 1);
///
/// let union = TypeNode::Union(vec![TypeNode::Any, TypeNode::None]);
/// let meta = type_meta(&union);
/// assert_eq!((meta.depth, meta.count), (2, 3));
/// ```
#[must_use]
pub fn type_meta(t: &TypeNode) -> TypeMeta {
    t.children()
        .iter()
        .map(type_meta)
        .fold(TypeMeta::leaf(t.to_string()), TypeMeta::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::ClassDef;
    use std::sync::Arc;

    fn named(name: &str, args: Vec<TypeNode>) -> TypeNode {
        TypeNode::named(&Arc::new(ClassDef::new(name, ["x"])), args)
    }

    #[test]
    fn leaf_meta() {
        let meta = type_meta(&named("int", vec![]));
        assert_eq!((meta.depth, meta.count), (1, 1));
        assert_eq!(meta.label, "int");
    }

    #[test]
    fn union_adds_one_level_over_deepest_member() {
        let union = TypeNode::Union(vec![named("int", vec![]), named("str", vec![])]);
        let meta = type_meta(&union);
        assert_eq!((meta.depth, meta.count), (2, 3));
    }

    #[test]
    fn generic_arguments_nest_like_union_members() {
        // dict[str, list[int]]: depth 3, five nodes.
        let tree = named(
            "dict",
            vec![
                named("str", vec![]),
                named("list", vec![named("int", vec![])]),
            ],
        );
        let meta = type_meta(&tree);
        assert_eq!((meta.depth, meta.count), (3, 5));
    }

    #[test]
    fn union_of_generics() {
        // Union[int, list[int]]: the generic member is two levels deep on its
        // own, three under the union.
        let tree = TypeNode::Union(vec![
            named("int", vec![]),
            named("list", vec![named("int", vec![])]),
        ]);
        let meta = type_meta(&tree);
        assert_eq!((meta.depth, meta.count), (3, 4));
    }

    #[test]
    fn tuple_items_count_as_children() {
        let tree = TypeNode::Tuple(vec![TypeNode::Any, TypeNode::None]);
        let meta = type_meta(&tree);
        assert_eq!((meta.depth, meta.count), (2, 3));
        assert_eq!(meta.label, "tuple[Any, None]");
    }

    #[test]
    fn merge_keeps_parent_label_and_adds_counts() {
        let parent = type_meta(&named("list", vec![]));
        let child = type_meta(&named("int", vec![]));
        let merged = parent.merge(child);
        assert_eq!((merged.depth, merged.count), (2, 2));
        assert_eq!(merged.label, "list");
    }
}
