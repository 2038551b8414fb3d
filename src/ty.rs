//! Type tree model: the normalized representation of a single static type.
//!
//! Two enums share the same shape. [`RawType`] is what the type-extraction
//! layer hands over and may contain constructs the engine refuses to score
//! ([`RawType::Unsupported`]). [`TypeNode`] is the validated tree every
//! scoring routine operates on; the only way to obtain one is
//! [`TypeNode::normalize`], which rejects unsupported constructs with a
//! recoverable error and malformed trees with a fatal one.
//!
//! Every `TypeNode` has a canonical string rendering (its [`Display`] impl)
//! used for the exact-equality short-circuit and for exact-match indicators.
//!
//! [`Display`]: std::fmt::Display

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

// =============================================================================
// Class definitions (nominal origins)
// =============================================================================

/// The nominal identity behind a [`TypeNode::Named`] node: a class name plus
/// its enumerable attribute surface.
///
/// The attribute set drives structural origin comparison: two classes that
/// share many meaningful members score close even when their names differ.
/// One `ClassDef` backs every instantiation of the class, so it is shared
/// behind an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Class name as reported by the checker, e.g. `builtins.list`.
    pub name: String,
    /// The class's own attribute names.
    pub attrs: BTreeSet<String>,
}

impl ClassDef {
    /// Create a class definition from a name and its attribute names.
    ///
    /// ```
    /// use tysim::ClassDef;
    ///
    /// let int = ClassDef::new("builtins.int", ["__add__", "bit_length"]);
    /// assert_eq!(int.name, "builtins.int");
    /// assert!(int.attrs.contains("bit_length"));
    /// ```
    pub fn new<I, S>(name: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClassDef {
            name: name.into(),
            attrs: attrs.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Builtin attribute surfaces
// =============================================================================

/// Attribute surface every type carries. This is also the surface of `Any`,
/// which is why shared attributes from this set never count as meaningful
/// overlap between two origins.
const UNIVERSAL_SURFACE: &[&str] = &[
    "__class__",
    "__delattr__",
    "__dir__",
    "__doc__",
    "__eq__",
    "__format__",
    "__ge__",
    "__getattribute__",
    "__gt__",
    "__hash__",
    "__init__",
    "__init_subclass__",
    "__le__",
    "__lt__",
    "__ne__",
    "__new__",
    "__reduce__",
    "__reduce_ex__",
    "__repr__",
    "__setattr__",
    "__sizeof__",
    "__str__",
    "__subclasshook__",
];

static ANY_ATTRS: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| UNIVERSAL_SURFACE.iter().copied().collect());

static NONE_ATTRS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    let mut attrs = ANY_ATTRS.clone();
    attrs.insert("__bool__");
    attrs
});

static TUPLE_ATTRS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    let mut attrs = ANY_ATTRS.clone();
    attrs.extend([
        "__add__",
        "__contains__",
        "__getitem__",
        "__getnewargs__",
        "__iter__",
        "__len__",
        "__mul__",
        "__rmul__",
        "count",
        "index",
    ]);
    attrs
});

/// The universal attribute surface (the surface of `Any`).
///
/// Origin comparison subtracts this set from the shared attributes so that
/// two types whose only common surface is the one everything has score zero.
pub(crate) fn universal_attrs() -> &'static BTreeSet<&'static str> {
    &ANY_ATTRS
}

// =============================================================================
// Raw (unvalidated) type trees
// =============================================================================

/// A type construct the engine does not represent and will not approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UnsupportedKind {
    /// Literal type, e.g. `Literal["r"]`.
    Literal,
    /// Callable / function type.
    Callable,
    /// Reference to a type alias (aliases are never resolved).
    Alias,
    /// Type variable.
    TypeVar,
    /// Overloaded function type.
    Overload,
    /// Uninhabited (bottom) type.
    Uninhabited,
    /// Unpack form.
    Unpack,
    /// Parameter specification variable.
    ParamSpec,
    /// Typed dictionary.
    TypedDict,
    /// Deleted / erased type.
    Deleted,
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnsupportedKind::Literal => "literal type",
            UnsupportedKind::Callable => "callable type",
            UnsupportedKind::Alias => "type alias reference",
            UnsupportedKind::TypeVar => "type variable",
            UnsupportedKind::Overload => "overloaded type",
            UnsupportedKind::Uninhabited => "uninhabited type",
            UnsupportedKind::Unpack => "unpack form",
            UnsupportedKind::ParamSpec => "parameter specification",
            UnsupportedKind::TypedDict => "typed dictionary",
            UnsupportedKind::Deleted => "deleted type",
        };
        f.write_str(name)
    }
}

/// A type tree as delivered by the type-extraction layer, before validation.
///
/// Shape mirrors [`TypeNode`] plus the [`RawType::Unsupported`] escape hatch
/// for everything the engine refuses to score.
#[derive(Debug, Clone, PartialEq)]
pub enum RawType {
    /// Fully unknown/unconstrained type.
    Any,
    /// The null/absence type.
    None,
    /// Fixed-arity product type.
    Tuple(Vec<RawType>),
    /// Nominal type, optionally generic.
    Named {
        /// The class behind this instantiation.
        origin: Arc<ClassDef>,
        /// Generic arguments, empty for a bare class.
        args: Vec<RawType>,
    },
    /// Sum of alternatives.
    Union(Vec<RawType>),
    /// A construct outside the model; normalization rejects it.
    Unsupported(UnsupportedKind),
}

impl RawType {
    /// Convenience constructor for a named type.
    pub fn named(origin: &Arc<ClassDef>, args: Vec<RawType>) -> Self {
        RawType::Named {
            origin: Arc::clone(origin),
            args,
        }
    }
}

// =============================================================================
// Validated type trees
// =============================================================================

/// The validated type tree every scoring routine operates on.
///
/// Invariants (upheld by [`TypeNode::normalize`], expected of hand-built
/// trees too): a `Union` has at least two members and none of them is itself
/// a `Union`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// Fully unknown/unconstrained type.
    Any,
    /// The null/absence type.
    None,
    /// Fixed-arity product type.
    Tuple(Vec<TypeNode>),
    /// Nominal type, optionally generic.
    Named {
        /// The class behind this instantiation.
        origin: Arc<ClassDef>,
        /// Generic arguments, empty for a bare class.
        args: Vec<TypeNode>,
    },
    /// Sum of alternatives.
    Union(Vec<TypeNode>),
}

impl TypeNode {
    /// Validate a raw tree into a scoreable one.
    ///
    /// Returns [`Error::UnsupportedType`] if any sub-node is an unsupported
    /// construct (the caller skips the symbol), and [`Error::MalformedInput`]
    /// for trees that violate construction invariants (a bug upstream, fatal).
    /// Nested unions are flattened and single-member unions collapse to the
    /// member.
    ///
    /// ```
    /// use tysim::{RawType, TypeNode, UnsupportedKind};
    ///
    /// let ok = TypeNode::normalize(&RawType::Tuple(vec![RawType::Any, RawType::None]));
    /// assert_eq!(ok.unwrap().to_string(), "tuple[Any, None]");
    ///
    /// let skipped = TypeNode::normalize(&RawType::Unsupported(UnsupportedKind::Callable));
    /// assert!(skipped.unwrap_err().is_unsupported());
    /// ```
    pub fn normalize(raw: &RawType) -> Result<Self> {
        match raw {
            RawType::Any => Ok(TypeNode::Any),
            RawType::None => Ok(TypeNode::None),
            RawType::Tuple(items) => {
                let items = items.iter().map(Self::normalize).collect::<Result<_>>()?;
                Ok(TypeNode::Tuple(items))
            }
            RawType::Named { origin, args } => {
                if origin.name.is_empty() {
                    return Err(Error::malformed("named type with an empty origin name"));
                }
                let args = args.iter().map(Self::normalize).collect::<Result<_>>()?;
                Ok(TypeNode::Named {
                    origin: Arc::clone(origin),
                    args,
                })
            }
            RawType::Union(members) => {
                if members.is_empty() {
                    return Err(Error::malformed("union with no members"));
                }
                let mut flat = Vec::with_capacity(members.len());
                for member in members {
                    match Self::normalize(member)? {
                        TypeNode::Union(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                if flat.len() == 1 {
                    Ok(flat.remove(0))
                } else {
                    Ok(TypeNode::Union(flat))
                }
            }
            RawType::Unsupported(kind) => Err(Error::UnsupportedType(*kind)),
        }
    }

    /// Convenience constructor for a named type.
    pub fn named(origin: &Arc<ClassDef>, args: Vec<TypeNode>) -> Self {
        TypeNode::Named {
            origin: Arc::clone(origin),
            args,
        }
    }

    /// The node's direct children: union members, generic arguments or tuple
    /// items. Leaves return an empty slice.
    #[must_use]
    pub fn children(&self) -> &[TypeNode] {
        match self {
            TypeNode::Any | TypeNode::None => &[],
            TypeNode::Tuple(items) => items,
            TypeNode::Named { args, .. } => args,
            TypeNode::Union(members) => members,
        }
    }

    /// The attribute surface of this node's origin, ignoring generic
    /// arguments. Union nodes have no origin; callers strip unions first.
    pub(crate) fn origin_attrs(&self) -> BTreeSet<&str> {
        match self {
            TypeNode::Any => ANY_ATTRS.iter().copied().collect(),
            TypeNode::None => NONE_ATTRS.iter().copied().collect(),
            TypeNode::Tuple(_) => TUPLE_ATTRS.iter().copied().collect(),
            TypeNode::Named { origin, .. } => origin.attrs.iter().map(String::as_str).collect(),
            TypeNode::Union(_) => unreachable!("unions are unwrapped before origin comparison"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeNode]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeNode {
    /// Canonical rendering, e.g. `Union[builtins.int, tuple[builtins.str]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Any => f.write_str("Any"),
            TypeNode::None => f.write_str("None"),
            TypeNode::Tuple(items) => {
                f.write_str("tuple[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            TypeNode::Named { origin, args } => {
                f.write_str(&origin.name)?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    write_list(f, args)?;
                    f.write_str("]")?;
                }
                Ok(())
            }
            TypeNode::Union(members) => {
                f.write_str("Union[")?;
                write_list(f, members)?;
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Arc<ClassDef> {
        Arc::new(ClassDef::new("int", ["__add__", "bit_length"]))
    }

    fn list(args: Vec<RawType>) -> RawType {
        let origin = Arc::new(ClassDef::new("list", ["__getitem__", "append"]));
        RawType::named(&origin, args)
    }

    #[test]
    fn renders_canonical_forms() {
        let node = TypeNode::normalize(&RawType::Union(vec![
            list(vec![RawType::named(&int(), vec![])]),
            RawType::None,
        ]))
        .unwrap();
        assert_eq!(node.to_string(), "Union[list[int], None]");
    }

    #[test]
    fn bare_named_renders_without_brackets() {
        let node = TypeNode::normalize(&RawType::named(&int(), vec![])).unwrap();
        assert_eq!(node.to_string(), "int");
    }

    #[test]
    fn unsupported_anywhere_rejects_the_tree() {
        let raw = list(vec![RawType::Unsupported(UnsupportedKind::Literal)]);
        let err = TypeNode::normalize(&raw).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn empty_union_is_malformed() {
        let err = TypeNode::normalize(&RawType::Union(vec![])).unwrap_err();
        assert!(!err.is_unsupported());
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn nested_unions_flatten() {
        let raw = RawType::Union(vec![
            RawType::Any,
            RawType::Union(vec![RawType::None, RawType::named(&int(), vec![])]),
        ]);
        let node = TypeNode::normalize(&raw).unwrap();
        match node {
            TypeNode::Union(members) => assert_eq!(members.len(), 3),
            other => panic!("expected a union, got {other}"),
        }
    }

    #[test]
    fn singleton_union_collapses() {
        let node = TypeNode::normalize(&RawType::Union(vec![RawType::None])).unwrap();
        assert_eq!(node, TypeNode::None);
    }

    #[test]
    fn origin_attrs_distinguish_builtin_forms() {
        let none_attrs = TypeNode::None.origin_attrs();
        let any_attrs = TypeNode::Any.origin_attrs();
        assert!(none_attrs.contains("__bool__"));
        assert!(!any_attrs.contains("__bool__"));
        assert!(TypeNode::Tuple(vec![]).origin_attrs().contains("count"));
    }
}
