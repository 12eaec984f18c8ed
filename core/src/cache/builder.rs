//! Representation selection
//!
//! Picks how a live value is cached and shown from its runtime type (or the
//! declared type when the value is null). Introspection failures never
//! escape; they select [`RepresentationKind::Unreadable`].

use crate::error::IntrospectError;
use crate::provider::{
    IterationCapability, LiveObjectProvider, LiveValue, TypeCategory, TypeRef,
};

/// Tagged choice of representation for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    Primitive,
    Enum,
    Struct,
    Container,
    FunctionRef,
    Unreadable,
}

impl RepresentationKind {
    /// Whether values of this kind own an expandable sub-list.
    pub fn is_expandable(self) -> bool {
        matches!(self, RepresentationKind::Struct | RepresentationKind::Container)
    }
}

/// Everything the builder learned about a value's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classified {
    /// Type the decision was made on (runtime type, or declared for null)
    pub ty: TypeRef,
    pub kind: RepresentationKind,
    /// Element type of a container; `object` when the provider has no hint
    pub element: TypeRef,
    pub capability: Option<IterationCapability>,
}

/// Choose the representation kind for `value`.
///
/// Pure: the same value and declared type always select the same kind.
pub fn select_kind(
    provider: &dyn LiveObjectProvider,
    value: &LiveValue,
    declared: &TypeRef,
) -> RepresentationKind {
    classify(provider, value, declared)
        .map(|c| c.kind)
        .unwrap_or(RepresentationKind::Unreadable)
}

pub(crate) fn classify(
    provider: &dyn LiveObjectProvider,
    value: &LiveValue,
    declared: &TypeRef,
) -> Result<Classified, IntrospectError> {
    let ty = if value.is_null() {
        declared.clone()
    } else {
        provider.runtime_type(value)?
    };
    let shape = provider.describe(&ty)?;

    let kind = if shape.iteration.is_some() {
        RepresentationKind::Container
    } else {
        match shape.category {
            TypeCategory::Object if !provider.members(&ty)?.is_empty() => {
                RepresentationKind::Struct
            }
            TypeCategory::Object | TypeCategory::Primitive | TypeCategory::String => {
                RepresentationKind::Primitive
            }
            TypeCategory::Enum => RepresentationKind::Enum,
            TypeCategory::Function => RepresentationKind::FunctionRef,
        }
    };

    Ok(Classified {
        ty,
        kind,
        element: shape.element.unwrap_or_else(TypeRef::object),
        capability: shape.iteration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FunctionRef, HeapProvider, MemberDesc};

    #[test]
    fn test_runtime_type_wins_over_declared() {
        let mut heap = HeapProvider::new();
        let list = heap.alloc_list("List<int>", "int", vec![LiveValue::Int(1)]);
        let player = heap.alloc_struct("Player", vec![("hp", LiveValue::Int(3))]);
        let object = TypeRef::object();

        assert_eq!(select_kind(&heap, &list, &object), RepresentationKind::Container);
        assert_eq!(select_kind(&heap, &player, &object), RepresentationKind::Struct);
        assert_eq!(
            select_kind(&heap, &LiveValue::Int(4), &TypeRef::new("List<int>")),
            RepresentationKind::Primitive
        );
    }

    #[test]
    fn test_null_uses_declared_type() {
        let mut heap = HeapProvider::new();
        heap.alloc_list("List<int>", "int", Vec::new());
        heap.alloc_struct("Player", vec![("hp", LiveValue::Int(3))]);

        let null = LiveValue::Null;
        assert_eq!(
            select_kind(&heap, &null, &TypeRef::new("List<int>")),
            RepresentationKind::Container
        );
        assert_eq!(
            select_kind(&heap, &null, &TypeRef::new("Player")),
            RepresentationKind::Struct
        );
        assert_eq!(
            select_kind(&heap, &null, &TypeRef::object()),
            RepresentationKind::Primitive
        );
    }

    #[test]
    fn test_category_fallbacks() {
        let mut heap = HeapProvider::new();
        let mode = heap.define_enum("Mode", &["Idle", "Run"]);
        let empty = heap.alloc_struct("Marker", Vec::new());
        let object = TypeRef::object();

        let variant = LiveValue::Enum {
            ty: mode,
            variant: "Run".into(),
        };
        assert_eq!(select_kind(&heap, &variant, &object), RepresentationKind::Enum);
        assert_eq!(
            select_kind(
                &heap,
                &LiveValue::Function(FunctionRef { name: "on_hit".into() }),
                &object
            ),
            RepresentationKind::FunctionRef
        );
        assert_eq!(
            select_kind(&heap, &LiveValue::Str("x".into()), &object),
            RepresentationKind::Primitive
        );
        assert_eq!(select_kind(&heap, &empty, &object), RepresentationKind::Primitive);

        heap.declare_member("Marker", MemberDesc::field("tag", "string"));
        assert_eq!(select_kind(&heap, &empty, &object), RepresentationKind::Struct);
    }

    #[test]
    fn test_introspection_failure_is_unreadable() {
        let mut heap = HeapProvider::new();
        let gone = heap.alloc_struct("Player", vec![("hp", LiveValue::Int(3))]);
        heap.free(&gone);

        assert_eq!(
            select_kind(&heap, &gone, &TypeRef::object()),
            RepresentationKind::Unreadable
        );
        assert_eq!(
            select_kind(&heap, &LiveValue::Null, &TypeRef::new("Nope")),
            RepresentationKind::Unreadable
        );
    }

    #[test]
    fn test_selection_is_stable() {
        let mut heap = HeapProvider::new();
        let list = heap.alloc_sequence("Queue<int>", "int", vec![LiveValue::Int(1)]);
        let object = TypeRef::object();
        let first = select_kind(&heap, &list, &object);
        for _ in 0..5 {
            assert_eq!(select_kind(&heap, &list, &object), first);
        }
    }
}
