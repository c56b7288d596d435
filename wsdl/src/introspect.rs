//! Field discovery for named types.
//!
//! Schema generation needs to know which fields a type has. Rust has no
//! runtime reflection over caller types, so the knowledge is injected through
//! [`TypeIntrospector`]; [`TypeRegistry`] is the in-memory implementation.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub ty: String,
    pub nillable: bool,
}

pub trait TypeIntrospector {
    /// The fields of `type_name` in declaration order, or `None` when the type
    /// is unknown.
    fn properties(&self, type_name: &str) -> Option<Vec<Property>>;
}

#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Vec<Property>>,
}

impl Property {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, ty: T) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            nillable: false,
        }
    }

    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: Into<String>>(&mut self, type_name: S, properties: Vec<Property>) -> &mut Self {
        self.types.insert(type_name.into(), properties);
        self
    }

    pub fn with_type<S: Into<String>>(mut self, type_name: S, properties: Vec<Property>) -> Self {
        self.register(type_name, properties);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }
}

impl TypeIntrospector for TypeRegistry {
    fn properties(&self, type_name: &str) -> Option<Vec<Property>> {
        self.types.get(type_name).cloned()
    }
}
