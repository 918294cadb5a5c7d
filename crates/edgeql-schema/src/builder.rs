//! Schema construction.
//!
//! DDL lives outside the compiler, so schemas are assembled with
//! [`SchemaBuilder`]. Types are keyed by the hash of their qualified name,
//! which lets an object type link to a type registered after it; every
//! reference is checked once, in [`SchemaBuilder::build`].

use edgeql_core::{QualifiedName, SchemaError, TypeId, std_types};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::entries::{
    FunctionEntry, ObjectEntry, PointerEntry, PointerFlags, ScalarEntry, ScalarKind, TypeEntry,
};
use crate::schema::Schema;
use crate::std_lib;

/// A type name used before it was checked to exist.
#[derive(Debug, Clone)]
struct Reference {
    referrer: String,
    name: String,
    id: TypeId,
}

/// Mutable staging area for a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: FxHashMap<TypeId, TypeEntry>,
    type_names: FxHashMap<QualifiedName, TypeId>,
    functions: FxHashMap<QualifiedName, FunctionEntry>,
    modules: FxHashSet<String>,
    references: Vec<Reference>,
}

impl SchemaBuilder {
    /// An empty builder with no modules at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-populated with the `std` module.
    pub fn with_std() -> Self {
        let mut builder = Self::new();
        std_lib::register(&mut builder);
        builder
    }

    /// Declare a module that may hold no types yet.
    pub fn module(&mut self, name: &str) -> &mut Self {
        self.modules.insert(name.to_string());
        self
    }

    /// Register a scalar type extending an already registered scalar.
    pub fn scalar_type(&mut self, name: &str, base: &str) -> Result<TypeId, SchemaError> {
        let qualified = qualify(name)?;
        let base_name = qualify(base)?;
        let base_entry = self
            .type_names
            .get(&base_name)
            .and_then(|id| self.types.get(id))
            .ok_or_else(|| SchemaError::UnknownType {
                name: base.to_string(),
                referrer: name.to_string(),
            })?;
        let TypeEntry::Scalar(base_scalar) = base_entry else {
            return Err(SchemaError::InvalidBase {
                name: name.to_string(),
                base: base.to_string(),
            });
        };
        let kind = base_scalar.kind;
        let base_id = base_scalar.type_id;
        self.insert_scalar(qualified, kind, Some(base_id))
    }

    /// Start registering an object type; finish with
    /// [`ObjectTypeBuilder::register`].
    pub fn object_type(&mut self, name: &str) -> ObjectTypeBuilder<'_> {
        ObjectTypeBuilder {
            builder: self,
            name: name.to_string(),
            bases: Vec::new(),
            pointers: Vec::new(),
        }
    }

    pub fn function(&mut self, entry: FunctionEntry) -> Result<(), SchemaError> {
        if !entry.name.is_qualified() {
            return Err(SchemaError::Unqualified(entry.name.to_string()));
        }
        if self.functions.contains_key(&entry.name) {
            return Err(SchemaError::Duplicate(entry.name.to_string()));
        }
        if let Some(module) = entry.name.module() {
            self.modules.insert(module.to_string());
        }
        self.functions.insert(entry.name.clone(), entry);
        Ok(())
    }

    // ==========================================================================
    // Internal registration
    // ==========================================================================

    pub(crate) fn insert_scalar(
        &mut self,
        name: QualifiedName,
        kind: ScalarKind,
        base: Option<TypeId>,
    ) -> Result<TypeId, SchemaError> {
        let type_id = self.claim_name(&name)?;
        self.types.insert(
            type_id,
            TypeEntry::Scalar(ScalarEntry {
                name,
                type_id,
                kind,
                base,
            }),
        );
        Ok(type_id)
    }

    fn claim_name(&mut self, name: &QualifiedName) -> Result<TypeId, SchemaError> {
        if self.type_names.contains_key(name) {
            return Err(SchemaError::Duplicate(name.to_string()));
        }
        let type_id = TypeId::from_qualified(name);
        self.type_names.insert(name.clone(), type_id);
        if let Some(module) = name.module() {
            self.modules.insert(module.to_string());
        }
        Ok(type_id)
    }

    // ==========================================================================
    // Build
    // ==========================================================================

    /// Validate every reference and freeze the schema.
    pub fn build(self) -> Result<Schema, SchemaError> {
        for reference in &self.references {
            if !self.types.contains_key(&reference.id) {
                return Err(SchemaError::UnknownType {
                    name: reference.name.clone(),
                    referrer: reference.referrer.clone(),
                });
            }
        }

        for entry in self.types.values() {
            let TypeEntry::Object(object) = entry else {
                continue;
            };
            for base in &object.bases {
                if !self.types.get(base).is_some_and(TypeEntry::is_object) {
                    return Err(SchemaError::InvalidBase {
                        name: object.name.to_string(),
                        base: self.display_name(*base),
                    });
                }
            }
            for pointer in object.pointers.values() {
                let target_is_object = self.types.get(&pointer.target).is_some_and(TypeEntry::is_object);
                if target_is_object != pointer.is_link() {
                    return Err(SchemaError::InvalidPointerTarget {
                        owner: object.name.to_string(),
                        pointer: pointer.name.clone(),
                        target: self.display_name(pointer.target),
                    });
                }
            }
        }

        let schema = self.build_std();
        if let Err(cycle) = toposort(&schema.hierarchy, None) {
            let id = schema.hierarchy[cycle.node_id()];
            return Err(SchemaError::InheritanceCycle(schema.type_name(id)));
        }
        Ok(schema)
    }

    /// Freeze without validation. Only for builders whose contents are known
    /// to be consistent.
    pub(crate) fn build_std(self) -> Schema {
        let mut hierarchy = DiGraph::new();
        let mut nodes = FxHashMap::default();
        for id in self.types.keys() {
            nodes.insert(*id, hierarchy.add_node(*id));
        }
        for entry in self.types.values() {
            let from = nodes[&entry.type_id()];
            let bases: &[TypeId] = match entry {
                TypeEntry::Scalar(s) => s.base.as_slice(),
                TypeEntry::Object(o) => &o.bases,
            };
            for base in bases {
                if let Some(&to) = nodes.get(base) {
                    hierarchy.add_edge(from, to, ());
                }
            }
        }

        Schema {
            types: self.types,
            type_names: self.type_names,
            functions: self.functions,
            modules: self.modules,
            hierarchy,
            nodes,
        }
    }

    fn display_name(&self, id: TypeId) -> String {
        self.types
            .get(&id)
            .map(|t| t.name().to_string())
            .or_else(|| {
                self.references
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.name.clone())
            })
            .unwrap_or_else(|| format!("{:?}", id))
    }
}

/// Staged object type registration.
pub struct ObjectTypeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    bases: Vec<String>,
    pointers: Vec<(String, String, PointerFlags)>,
}

impl<'a> ObjectTypeBuilder<'a> {
    pub fn extending(mut self, base: &str) -> Self {
        self.bases.push(base.to_string());
        self
    }

    /// A property pointing at a scalar type.
    pub fn property(mut self, name: &str, target: &str, flags: PointerFlags) -> Self {
        self.pointers
            .push((name.to_string(), target.to_string(), flags - PointerFlags::LINK));
        self
    }

    /// A link pointing at an object type.
    pub fn link(mut self, name: &str, target: &str, flags: PointerFlags) -> Self {
        self.pointers
            .push((name.to_string(), target.to_string(), flags | PointerFlags::LINK));
        self
    }

    pub fn register(self) -> Result<TypeId, SchemaError> {
        let ObjectTypeBuilder {
            builder,
            name,
            bases,
            pointers,
        } = self;
        let qualified = qualify(&name)?;

        let mut pointer_map = FxHashMap::default();
        let mut references = Vec::new();
        for (pointer, target, flags) in pointers {
            let target_id = TypeId::from_qualified(&qualify(&target)?);
            references.push(Reference {
                referrer: format!("{}.{}", name, pointer),
                name: target,
                id: target_id,
            });
            let entry = PointerEntry {
                name: pointer.clone(),
                target: target_id,
                flags,
            };
            if pointer_map.insert(pointer.clone(), entry).is_some() {
                return Err(SchemaError::DuplicatePointer {
                    owner: name,
                    pointer,
                });
            }
        }

        let mut base_ids = Vec::with_capacity(bases.len().max(1));
        for base in bases {
            let base_id = TypeId::from_qualified(&qualify(&base)?);
            references.push(Reference {
                referrer: name.clone(),
                name: base,
                id: base_id,
            });
            base_ids.push(base_id);
        }

        let type_id = builder.claim_name(&qualified)?;
        if base_ids.is_empty()
            && type_id != std_types::OBJECT
            && builder.types.contains_key(&std_types::OBJECT)
        {
            base_ids.push(std_types::OBJECT);
        }

        builder.references.extend(references);
        builder.types.insert(
            type_id,
            TypeEntry::Object(ObjectEntry {
                name: qualified,
                type_id,
                bases: base_ids,
                pointers: pointer_map,
            }),
        );
        Ok(type_id)
    }
}

fn qualify(name: &str) -> Result<QualifiedName, SchemaError> {
    let qualified = QualifiedName::parse(name);
    if qualified.is_qualified() {
        Ok(qualified)
    } else {
        Err(SchemaError::Unqualified(name.to_string()))
    }
}
