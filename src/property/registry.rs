//! Property metadata lookup
//!
//! The engine never discovers properties itself. A `PropertyProvider`
//! hands out the ordered property set of a named type; `PropertyRegistry`
//! is the in-memory provider most callers use.

use ahash::AHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::descriptor::PropertyDescriptor;
use crate::error::FilterError;

/// Separator between type name and property name in persisted references
pub const REFERENCE_SEPARATOR: &str = "||";

// ============================================================================
// Property Reference
// ============================================================================

/// Parsed `"<TypeName>||<PropertyName>"` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyReference {
    pub type_name: String,
    pub property_name: String,
}

impl PropertyReference {
    pub fn new(type_name: impl Into<String>, property_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            property_name: property_name.into(),
        }
    }

    /// Parse a persisted reference
    ///
    /// Empty pieces are dropped; anything other than exactly two remaining
    /// pieces is not a reference.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }

        let mut parts = value
            .split(REFERENCE_SEPARATOR)
            .filter(|part| !part.is_empty());
        let type_name = parts.next()?;
        let property_name = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(type_name, property_name))
    }

    /// Reference pointing at `descriptor`
    pub fn for_descriptor<T>(descriptor: &PropertyDescriptor<T>) -> Self {
        Self::new(descriptor.owner_type(), descriptor.name())
    }
}

impl FromStr for PropertyReference {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FilterError::InvalidPropertyReference(s.to_string()))
    }
}

impl fmt::Display for PropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.type_name, REFERENCE_SEPARATOR, self.property_name)
    }
}

// ============================================================================
// Property Collection
// ============================================================================

/// Ordered set of properties of one type, with lookup by name
pub struct PropertyCollection<T> {
    properties: Vec<PropertyDescriptor<T>>,
    by_name: AHashMap<String, usize>,
}

impl<T> PropertyCollection<T> {
    /// Build a collection. When two descriptors share a name the first one wins.
    pub fn new(properties: impl IntoIterator<Item = PropertyDescriptor<T>>) -> Self {
        let mut collection = Self {
            properties: Vec::new(),
            by_name: AHashMap::new(),
        };
        for property in properties {
            collection.push(property);
        }
        collection
    }

    /// Append a property unless one with the same name exists. Returns whether it was added.
    pub fn push(&mut self, property: PropertyDescriptor<T>) -> bool {
        if self.by_name.contains_key(property.name()) {
            return false;
        }
        self.by_name
            .insert(property.name().to_string(), self.properties.len());
        self.properties.push(property);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.by_name.get(name).map(|&i| &self.properties[i])
    }

    pub fn first(&self) -> Option<&PropertyDescriptor<T>> {
        self.properties.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor<T>> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T> Clone for PropertyCollection<T> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            by_name: self.by_name.clone(),
        }
    }
}

impl<T> fmt::Debug for PropertyCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.properties.iter().map(|p| p.name()))
            .finish()
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Source of property metadata for instances of `T`
pub trait PropertyProvider<T>: Send + Sync {
    /// Ordered properties of the named type, or `None` when the type is unknown
    fn instance_properties(&self, type_name: &str) -> Option<Arc<PropertyCollection<T>>>;
}

impl<T, F> PropertyProvider<T> for F
where
    F: Fn(&str) -> Option<Arc<PropertyCollection<T>>> + Send + Sync,
{
    fn instance_properties(&self, type_name: &str) -> Option<Arc<PropertyCollection<T>>> {
        self(type_name)
    }
}

/// In-memory provider keyed by type name
pub struct PropertyRegistry<T> {
    types: RwLock<AHashMap<String, Arc<PropertyCollection<T>>>>,
}

impl<T> PropertyRegistry<T> {
    pub fn new() -> Self {
        Self {
            types: RwLock::new(AHashMap::new()),
        }
    }

    /// Register (or replace) the properties of a type
    pub fn register(&self, type_name: impl Into<String>, properties: PropertyCollection<T>) {
        let mut types = self.types.write();
        types.insert(type_name.into(), Arc::new(properties));
    }

    /// Forget a type. Returns whether it was registered.
    pub fn unregister(&self, type_name: &str) -> bool {
        self.types.write().remove(type_name).is_some()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.read().contains_key(type_name)
    }
}

impl<T> Default for PropertyRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PropertyProvider<T> for PropertyRegistry<T> {
    fn instance_properties(&self, type_name: &str) -> Option<Arc<PropertyCollection<T>>> {
        self.types.read().get(type_name).cloned()
    }
}
