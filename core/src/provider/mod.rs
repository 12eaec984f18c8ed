//! Live object provider abstraction
//!
//! The engine never touches host objects directly. Everything it knows about
//! a value (its runtime type, its members, whether and how it can be
//! iterated) comes through [`TypeIntrospector`] and [`LiveObjectProvider`],
//! implemented once per backend.
//!
//! Providers report per-member failures as `Err` for that member only; a
//! query about one member never fails the whole object.

pub mod heap;

use std::fmt;
use std::sync::Arc;

use crate::error::{IntrospectError, MemberError};

pub use heap::HeapProvider;

/// Name of a type as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    pub const BOOL: &'static str = "bool";
    pub const INT: &'static str = "int";
    pub const FLOAT: &'static str = "float";
    pub const STRING: &'static str = "string";
    pub const FUNCTION: &'static str = "function";
    pub const OBJECT: &'static str = "object";

    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The catch-all type used when nothing more specific is known.
    pub fn object() -> Self {
        Self::new(Self::OBJECT)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Reference to a callable (delegate, closure, function pointer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
}

/// A live value read from the host at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Enum { ty: TypeRef, variant: String },
    Object(ObjectId),
    Function(FunctionRef),
}

impl LiveValue {
    pub fn is_null(&self) -> bool {
        matches!(self, LiveValue::Null)
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            LiveValue::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Type carried by the value itself; `None` for null and host objects.
    pub fn intrinsic_type(&self) -> Option<TypeRef> {
        match self {
            LiveValue::Null | LiveValue::Object(_) => None,
            LiveValue::Bool(_) => Some(TypeRef::new(TypeRef::BOOL)),
            LiveValue::Int(_) => Some(TypeRef::new(TypeRef::INT)),
            LiveValue::Float(_) => Some(TypeRef::new(TypeRef::FLOAT)),
            LiveValue::Str(_) => Some(TypeRef::new(TypeRef::STRING)),
            LiveValue::Enum { ty, .. } => Some(ty.clone()),
            LiveValue::Function(_) => Some(TypeRef::new(TypeRef::FUNCTION)),
        }
    }
}

/// Broad category of a type, used when it can neither be iterated nor expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Primitive,
    String,
    Enum,
    Object,
    Function,
}

/// How the elements of a container can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationCapability {
    /// Random access with a cheap length (arrays, lists).
    Indexed,
    /// Forward-only iteration, length unknown until walked.
    Sequence,
    /// Enumerable, but the concrete protocol cannot be bound statically.
    /// Walks go through [`LiveObjectProvider::enumerate_unknown`].
    Unknown,
}

/// What the engine needs to know about a type to pick a representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub category: TypeCategory,
    /// Element type hint for containers (generic argument, array element).
    pub element: Option<TypeRef>,
    pub iteration: Option<IterationCapability>,
}

impl TypeShape {
    pub fn of(category: TypeCategory) -> Self {
        Self {
            category,
            element: None,
            iteration: None,
        }
    }

    pub fn container(element: Option<TypeRef>, iteration: IterationCapability) -> Self {
        Self {
            category: TypeCategory::Object,
            element,
            iteration: Some(iteration),
        }
    }
}

/// Shapes of the types every provider understands.
pub fn builtin_shape(ty: &TypeRef) -> Option<TypeShape> {
    let category = match ty.name() {
        TypeRef::BOOL | TypeRef::INT | TypeRef::FLOAT => TypeCategory::Primitive,
        TypeRef::STRING => TypeCategory::String,
        TypeRef::FUNCTION => TypeCategory::Function,
        TypeRef::OBJECT => TypeCategory::Object,
        _ => return None,
    };
    Some(TypeShape::of(category))
}

/// Kind of a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    /// Parameterless method; evaluated only on request.
    Method,
}

/// Read/write capability of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub read: bool,
    pub write: bool,
}

impl Access {
    pub const READ_WRITE: Access = Access {
        read: true,
        write: true,
    };
    pub const READ_ONLY: Access = Access {
        read: true,
        write: false,
    };
}

/// One declared member of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDesc {
    pub name: String,
    pub ty: TypeRef,
    pub kind: MemberKind,
    pub access: Access,
}

impl MemberDesc {
    pub fn field(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Field,
            access: Access::READ_WRITE,
        }
    }

    pub fn property(name: impl Into<String>, ty: impl Into<TypeRef>, write: bool) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Property,
            access: Access { read: true, write },
        }
    }

    pub fn method(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind: MemberKind::Method,
            access: Access::READ_ONLY,
        }
    }
}

/// Outcome of reading or invoking a member.
pub type EvaluationResult = Result<LiveValue, MemberError>;

/// Forward-only element iterator. Each item succeeds or fails on its own.
pub type ElementIter<'a> = Box<dyn Iterator<Item = EvaluationResult> + 'a>;

/// Type discovery for live values.
pub trait TypeIntrospector {
    /// Exact runtime type of a non-null value.
    fn runtime_type(&self, value: &LiveValue) -> Result<TypeRef, IntrospectError>;

    /// Category, element hint and iteration capability of a type.
    fn describe(&self, ty: &TypeRef) -> Result<TypeShape, IntrospectError>;

    /// Declared members of a type, in display order.
    fn members(&self, ty: &TypeRef) -> Result<Vec<MemberDesc>, IntrospectError>;
}

/// Access to the values behind live references.
pub trait LiveObjectProvider: TypeIntrospector {
    fn read_member(&self, target: &LiveValue, member: &MemberDesc) -> EvaluationResult;

    fn write_member(
        &mut self,
        target: &LiveValue,
        member: &MemberDesc,
        value: LiveValue,
    ) -> Result<(), MemberError>;

    /// Evaluate a parameterless method.
    fn invoke(&mut self, _target: &LiveValue, _member: &MemberDesc) -> EvaluationResult {
        Err(MemberError::NotInvocable)
    }

    /// Acquire the container's own forward iterator.
    fn iterate<'a>(&'a self, container: &LiveValue) -> Result<ElementIter<'a>, MemberError>;

    /// Generic enumeration shim for containers whose protocol cannot be bound.
    fn enumerate_unknown<'a>(
        &'a self,
        container: &LiveValue,
    ) -> Result<ElementIter<'a>, MemberError> {
        self.iterate(container)
    }

    /// Cheap element count, if the container is indexed.
    fn element_count(&self, _container: &LiveValue) -> Option<usize> {
        None
    }

    /// Counter that changes whenever elements are added to or removed from
    /// the container. `None` if the backend cannot tell.
    fn container_version(&self, _container: &LiveValue) -> Option<u64> {
        None
    }

    /// Random access read, if the container is indexed.
    fn element_at(&self, _container: &LiveValue, _index: usize) -> Option<EvaluationResult> {
        None
    }

    fn write_element(
        &mut self,
        _container: &LiveValue,
        _index: usize,
        _value: LiveValue,
    ) -> Result<(), MemberError> {
        Err(MemberError::ReadOnly)
    }

    /// Whether the host object behind a value still exists.
    fn is_alive(&self, _value: &LiveValue) -> bool {
        true
    }
}
