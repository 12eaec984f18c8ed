//! In-memory reference provider
//!
//! A small object heap that implements [`LiveObjectProvider`]. It backs the
//! CLI (loaded from JSON) and the test suites, and supports the things a real
//! host does to an inspector: mutating containers between ticks, freeing
//! objects, and failing individual member reads.

use hashbrown::HashMap;
use serde_json::Value as Json;

use super::{
    ElementIter, EvaluationResult, IterationCapability, LiveObjectProvider, LiveValue,
    MemberDesc, MemberKind, ObjectId, TypeCategory, TypeIntrospector, TypeRef, TypeShape,
    builtin_shape,
};
use crate::error::{IntrospectError, MemberError};

/// Type registered in the heap.
#[derive(Debug, Clone)]
enum TypeDef {
    Struct { members: Vec<MemberDesc> },
    Enum { variants: Vec<String> },
    Container {
        element: TypeRef,
        capability: IterationCapability,
    },
}

/// Storage of one heap object. A stored `Err` is an injected read fault.
#[derive(Debug, Clone)]
enum Body {
    Struct {
        fields: HashMap<String, EvaluationResult>,
        methods: HashMap<String, EvaluationResult>,
    },
    Container { items: Vec<EvaluationResult> },
}

#[derive(Debug, Clone)]
struct HeapObject {
    ty: TypeRef,
    body: Body,
    /// Bumped on every push and remove
    version: u64,
}

/// In-memory object heap.
#[derive(Debug, Default)]
pub struct HeapProvider {
    objects: HashMap<ObjectId, HeapObject>,
    types: HashMap<TypeRef, TypeDef>,
    next_id: u64,
}

impl HeapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a struct. The type's member list is extended with any field
    /// it has not seen yet.
    pub fn alloc_struct(&mut self, ty: &str, fields: Vec<(&str, LiveValue)>) -> LiveValue {
        let ty = TypeRef::new(ty);
        let declared: Vec<MemberDesc> = fields
            .iter()
            .map(|(name, value)| MemberDesc::field(*name, self.type_of(value)))
            .collect();

        let entry = self.types.entry(ty.clone()).or_insert(TypeDef::Struct {
            members: Vec::new(),
        });
        if let TypeDef::Struct { members } = entry {
            for desc in declared {
                if !members.iter().any(|m| m.name == desc.name) {
                    members.push(desc);
                }
            }
        }

        let fields = fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), Ok(value)))
            .collect();
        self.insert(
            ty,
            Body::Struct {
                fields,
                methods: HashMap::new(),
            },
        )
    }

    /// Allocate an indexed list.
    pub fn alloc_list(&mut self, ty: &str, element: &str, items: Vec<LiveValue>) -> LiveValue {
        self.alloc_container(ty, element, IterationCapability::Indexed, items)
    }

    /// Allocate a forward-only sequence with no cheap length.
    pub fn alloc_sequence(&mut self, ty: &str, element: &str, items: Vec<LiveValue>) -> LiveValue {
        self.alloc_container(ty, element, IterationCapability::Sequence, items)
    }

    /// Allocate an enumerable whose iteration protocol cannot be bound
    /// directly; only the generic enumeration shim can walk it.
    pub fn alloc_opaque(&mut self, ty: &str, element: &str, items: Vec<LiveValue>) -> LiveValue {
        self.alloc_container(ty, element, IterationCapability::Unknown, items)
    }

    fn alloc_container(
        &mut self,
        ty: &str,
        element: &str,
        capability: IterationCapability,
        items: Vec<LiveValue>,
    ) -> LiveValue {
        let ty = TypeRef::new(ty);
        self.types.entry(ty.clone()).or_insert(TypeDef::Container {
            element: TypeRef::new(element),
            capability,
        });
        let items = items.into_iter().map(Ok).collect();
        self.insert(ty, Body::Container { items })
    }

    fn insert(&mut self, ty: TypeRef, body: Body) -> LiveValue {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.insert(
            id,
            HeapObject {
                ty,
                body,
                version: 0,
            },
        );
        LiveValue::Object(id)
    }

    /// Register an enum type so values of it can be described.
    pub fn define_enum(&mut self, ty: &str, variants: &[&str]) -> TypeRef {
        let ty = TypeRef::new(ty);
        self.types.insert(
            ty.clone(),
            TypeDef::Enum {
                variants: variants.iter().map(|v| v.to_string()).collect(),
            },
        );
        ty
    }

    /// Variants of a registered enum.
    pub fn enum_variants(&self, ty: &TypeRef) -> Option<&[String]> {
        match self.types.get(ty) {
            Some(TypeDef::Enum { variants }) => Some(variants),
            _ => None,
        }
    }

    /// Declare a member on a struct type, replacing any existing one.
    pub fn declare_member(&mut self, ty: &str, desc: MemberDesc) {
        let entry = self
            .types
            .entry(TypeRef::new(ty))
            .or_insert(TypeDef::Struct {
                members: Vec::new(),
            });
        if let TypeDef::Struct { members } = entry {
            match members.iter_mut().find(|m| m.name == desc.name) {
                Some(existing) => *existing = desc,
                None => members.push(desc),
            }
        }
    }

    /// Attach a parameterless method to an object, returning `result` when invoked.
    pub fn add_method(&mut self, target: &LiveValue, name: &str, ty: &str, result: EvaluationResult) {
        let Some(object) = target.object_id().and_then(|id| self.objects.get_mut(&id)) else {
            return;
        };
        let type_name = object.ty.clone();
        if let Body::Struct { methods, .. } = &mut object.body {
            methods.insert(name.to_string(), result);
        }
        self.declare_member(type_name.name(), MemberDesc::method(name, ty));
    }

    // =========================================================================
    // Host-side mutation
    // =========================================================================

    /// Overwrite a struct field, as the host would between ticks.
    pub fn set_field(&mut self, target: &LiveValue, name: &str, value: LiveValue) {
        if let Some(Body::Struct { fields, .. }) = self.body_mut(target) {
            fields.insert(name.to_string(), Ok(value));
        }
    }

    /// Make reads of a struct field fail.
    pub fn fail_field(&mut self, target: &LiveValue, name: &str, cause: &str) {
        if let Some(Body::Struct { fields, .. }) = self.body_mut(target) {
            fields.insert(name.to_string(), Err(MemberError::Read(cause.to_string())));
        }
    }

    /// Append an element to a container.
    pub fn push(&mut self, target: &LiveValue, value: LiveValue) {
        if let Some(object) = self.object_mut(target)
            && let Body::Container { items } = &mut object.body
        {
            items.push(Ok(value));
            object.version += 1;
        }
    }

    /// Remove an element from a container.
    pub fn remove(&mut self, target: &LiveValue, index: usize) {
        if let Some(object) = self.object_mut(target)
            && let Body::Container { items } = &mut object.body
            && index < items.len()
        {
            items.remove(index);
            object.version += 1;
        }
    }

    /// Overwrite a container element.
    pub fn set_element(&mut self, target: &LiveValue, index: usize, value: LiveValue) {
        if let Some(Body::Container { items }) = self.body_mut(target)
            && let Some(slot) = items.get_mut(index)
        {
            *slot = Ok(value);
        }
    }

    /// Make one container element fail when iterated or read.
    pub fn fail_element(&mut self, target: &LiveValue, index: usize, cause: &str) {
        if let Some(Body::Container { items }) = self.body_mut(target)
            && let Some(slot) = items.get_mut(index)
        {
            *slot = Err(MemberError::Iterate(cause.to_string()));
        }
    }

    /// Destroy an object. Later reads report [`MemberError::Destroyed`].
    pub fn free(&mut self, target: &LiveValue) {
        if let Some(id) = target.object_id() {
            self.objects.remove(&id);
        }
    }

    // =========================================================================
    // JSON loading
    // =========================================================================

    /// Build a heap from a JSON document.
    ///
    /// The top-level object's keys become named roots. Objects become structs
    /// (type taken from a `"$type"` key, else derived from the field name),
    /// arrays become indexed lists, and scalars become primitive values.
    pub fn from_json(doc: &Json) -> (Self, Vec<(String, LiveValue)>) {
        let mut heap = Self::new();
        let roots = match doc {
            Json::Object(map) => map
                .iter()
                .map(|(name, value)| (name.clone(), heap.load_json(name, value)))
                .collect(),
            other => vec![("root".to_string(), heap.load_json("root", other))],
        };
        (heap, roots)
    }

    fn load_json(&mut self, name: &str, value: &Json) -> LiveValue {
        match value {
            Json::Null => LiveValue::Null,
            Json::Bool(b) => LiveValue::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => LiveValue::Int(i),
                None => LiveValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => LiveValue::Str(s.clone()),
            Json::Array(items) => {
                let items: Vec<LiveValue> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.load_json(&format!("{}_{}", name, i), item))
                    .collect();
                let element = self.common_type(&items);
                let ty = format!("List<{}>", element);
                self.alloc_list(&ty, element.name(), items)
            }
            Json::Object(map) => {
                let ty = map
                    .get("$type")
                    .and_then(Json::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| type_name_for(name));
                let fields: Vec<(String, LiveValue)> = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != "$type")
                    .map(|(key, value)| (key.clone(), self.load_json(key, value)))
                    .collect();
                let fields = fields
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.clone()))
                    .collect();
                self.alloc_struct(&ty, fields)
            }
        }
    }

    /// Most specific type shared by all items, or `object`.
    fn common_type(&self, items: &[LiveValue]) -> TypeRef {
        let mut types = items.iter().filter(|v| !v.is_null()).map(|v| self.type_of(v));
        let Some(first) = types.next() else {
            return TypeRef::object();
        };
        if types.all(|t| t == first) {
            first
        } else {
            TypeRef::object()
        }
    }

    fn type_of(&self, value: &LiveValue) -> TypeRef {
        self.runtime_type(value).unwrap_or_else(|_| TypeRef::object())
    }

    fn object(&self, target: &LiveValue) -> Result<&HeapObject, MemberError> {
        target
            .object_id()
            .and_then(|id| self.objects.get(&id))
            .ok_or(MemberError::Destroyed)
    }

    fn object_mut(&mut self, target: &LiveValue) -> Option<&mut HeapObject> {
        let id = target.object_id()?;
        self.objects.get_mut(&id)
    }

    fn body_mut(&mut self, target: &LiveValue) -> Option<&mut Body> {
        self.object_mut(target).map(|o| &mut o.body)
    }

    fn items<'a>(&'a self, container: &LiveValue) -> Result<ElementIter<'a>, MemberError> {
        match &self.object(container)?.body {
            Body::Container { items } => Ok(Box::new(items.iter().cloned())),
            Body::Struct { .. } => Err(MemberError::Iterate("not enumerable".to_string())),
        }
    }
}

/// `"player_stats"` -> `"PlayerStats"`
fn type_name_for(field: &str) -> String {
    field
        .split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

impl TypeIntrospector for HeapProvider {
    fn runtime_type(&self, value: &LiveValue) -> Result<TypeRef, IntrospectError> {
        if let Some(ty) = value.intrinsic_type() {
            return Ok(ty);
        }
        match value {
            LiveValue::Object(id) => self
                .objects
                .get(id)
                .map(|o| o.ty.clone())
                .ok_or(IntrospectError::UnknownObject(id.0)),
            _ => Ok(TypeRef::object()),
        }
    }

    fn describe(&self, ty: &TypeRef) -> Result<TypeShape, IntrospectError> {
        if let Some(shape) = builtin_shape(ty) {
            return Ok(shape);
        }
        match self.types.get(ty) {
            Some(TypeDef::Struct { .. }) => Ok(TypeShape::of(TypeCategory::Object)),
            Some(TypeDef::Enum { .. }) => Ok(TypeShape::of(TypeCategory::Enum)),
            Some(TypeDef::Container {
                element,
                capability,
            }) => Ok(TypeShape::container(Some(element.clone()), *capability)),
            None => Err(IntrospectError::UnknownType(ty.to_string())),
        }
    }

    fn members(&self, ty: &TypeRef) -> Result<Vec<MemberDesc>, IntrospectError> {
        if builtin_shape(ty).is_some() {
            return Ok(Vec::new());
        }
        match self.types.get(ty) {
            Some(TypeDef::Struct { members }) => Ok(members.clone()),
            Some(_) => Ok(Vec::new()),
            None => Err(IntrospectError::UnknownType(ty.to_string())),
        }
    }
}

impl LiveObjectProvider for HeapProvider {
    fn read_member(&self, target: &LiveValue, member: &MemberDesc) -> EvaluationResult {
        if !member.access.read {
            return Err(MemberError::Read(format!("'{}' is write-only", member.name)));
        }
        match &self.object(target)?.body {
            Body::Struct { fields, .. } => fields
                .get(&member.name)
                .cloned()
                .unwrap_or_else(|| Err(MemberError::Read(format!("no field '{}'", member.name)))),
            Body::Container { .. } => Err(MemberError::Read(format!(
                "containers have no member '{}'",
                member.name
            ))),
        }
    }

    fn write_member(
        &mut self,
        target: &LiveValue,
        member: &MemberDesc,
        value: LiveValue,
    ) -> Result<(), MemberError> {
        if !member.access.write || member.kind == MemberKind::Method {
            return Err(MemberError::ReadOnly);
        }
        match self.body_mut(target) {
            Some(Body::Struct { fields, .. }) => {
                fields.insert(member.name.clone(), Ok(value));
                Ok(())
            }
            Some(Body::Container { .. }) => {
                Err(MemberError::Write(format!("no field '{}'", member.name)))
            }
            None => Err(MemberError::Destroyed),
        }
    }

    fn invoke(&mut self, target: &LiveValue, member: &MemberDesc) -> EvaluationResult {
        if member.kind != MemberKind::Method {
            return Err(MemberError::NotInvocable);
        }
        match &self.object(target)?.body {
            Body::Struct { methods, .. } => methods
                .get(&member.name)
                .cloned()
                .unwrap_or(Err(MemberError::NotInvocable)),
            Body::Container { .. } => Err(MemberError::NotInvocable),
        }
    }

    fn iterate<'a>(&'a self, container: &LiveValue) -> Result<ElementIter<'a>, MemberError> {
        let object = self.object(container)?;
        if let Some(TypeDef::Container {
            capability: IterationCapability::Unknown,
            ..
        }) = self.types.get(&object.ty)
        {
            return Err(MemberError::Iterate(format!(
                "no bound iteration protocol for {}",
                object.ty
            )));
        }
        self.items(container)
    }

    fn enumerate_unknown<'a>(
        &'a self,
        container: &LiveValue,
    ) -> Result<ElementIter<'a>, MemberError> {
        self.items(container)
    }

    fn element_count(&self, container: &LiveValue) -> Option<usize> {
        let object = self.object(container).ok()?;
        match (self.types.get(&object.ty), &object.body) {
            (
                Some(TypeDef::Container {
                    capability: IterationCapability::Indexed,
                    ..
                }),
                Body::Container { items },
            ) => Some(items.len()),
            _ => None,
        }
    }

    fn container_version(&self, container: &LiveValue) -> Option<u64> {
        let object = self.object(container).ok()?;
        match object.body {
            Body::Container { .. } => Some(object.version),
            Body::Struct { .. } => None,
        }
    }

    fn element_at(&self, container: &LiveValue, index: usize) -> Option<EvaluationResult> {
        self.element_count(container)?;
        match &self.object(container).ok()?.body {
            Body::Container { items } => items.get(index).cloned(),
            Body::Struct { .. } => None,
        }
    }

    fn write_element(
        &mut self,
        container: &LiveValue,
        index: usize,
        value: LiveValue,
    ) -> Result<(), MemberError> {
        if self.element_count(container).is_none() {
            return Err(MemberError::ReadOnly);
        }
        match self.body_mut(container) {
            Some(Body::Container { items }) => match items.get_mut(index) {
                Some(slot) => {
                    *slot = Ok(value);
                    Ok(())
                }
                None => Err(MemberError::Write(format!("index {} out of range", index))),
            },
            Some(Body::Struct { .. }) => Err(MemberError::ReadOnly),
            None => Err(MemberError::Destroyed),
        }
    }

    fn is_alive(&self, value: &LiveValue) -> bool {
        match value {
            LiveValue::Object(id) => self.objects.contains_key(id),
            _ => true,
        }
    }
}
