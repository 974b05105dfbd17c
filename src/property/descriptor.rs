//! Typed property handles with accessor functions

use std::fmt;
use std::sync::Arc;

use crate::condition::ValueKind;
use crate::error::{FilterError, Result};

use super::value::Value;

type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

/// Immutable handle to a named, typed property of `T`
///
/// Cloning is cheap: accessors are shared. Two descriptors are equal when
/// their names and value kinds match.
pub struct PropertyDescriptor<T> {
    owner_type: Arc<str>,
    name: Arc<str>,
    display_name: Option<Arc<str>>,
    kind: ValueKind,
    nullable: bool,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> PropertyDescriptor<T> {
    /// Create a read-only descriptor
    ///
    /// # Arguments
    /// * `owner_type` - Name of the type declaring the property, as persisted
    /// * `name` - Property name
    /// * `kind` - Value kind reported by the getter
    /// * `nullable` - Whether the declared type admits null
    /// * `getter` - Reads the property from an instance
    pub fn new<F>(
        owner_type: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        kind: ValueKind,
        nullable: bool,
        getter: F,
    ) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            owner_type: owner_type.into(),
            name: name.into(),
            display_name: None,
            kind,
            // Strings are reference values and always admit null
            nullable: nullable || kind == ValueKind::String,
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// Attach a setter
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Attach a human-readable name
    pub fn with_display_name(mut self, display_name: impl Into<Arc<str>>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn owner_type(&self) -> &str {
        &self.owner_type
    }

    /// Display name, falling back to the property name
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&*self.name)
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }

    /// Read the property value from `instance`
    #[inline]
    pub fn get_value(&self, instance: &T) -> Value {
        (self.getter)(instance)
    }

    /// Write `value` into `instance`
    ///
    /// Fails with `ReadOnlyProperty` when no setter is attached and with
    /// `InvalidValue` when the value does not fit the property's kind.
    pub fn set_value(&self, instance: &mut T, value: Value) -> Result<()> {
        let setter = self
            .setter
            .as_ref()
            .ok_or_else(|| FilterError::ReadOnlyProperty(self.name.to_string()))?;

        if !self.accepts(&value) {
            return Err(FilterError::invalid_value(
                &*self.name,
                format!("{} value, got {}", self.kind, value.type_name()),
            ));
        }

        setter(instance, value)
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (_, Value::Null) => self.nullable,
            (ValueKind::String, Value::String(_)) => true,
            (ValueKind::Boolean, Value::Boolean(_)) => true,
            (ValueKind::Numeric(t), Value::Number(n)) => t.accepts(n),
            (ValueKind::DateTime, Value::DateTime(_)) => true,
            _ => false,
        }
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            owner_type: Arc::clone(&self.owner_type),
            name: Arc::clone(&self.name),
            display_name: self.display_name.clone(),
            kind: self.kind,
            nullable: self.nullable,
            getter: Arc::clone(&self.getter),
            setter: self.setter.clone(),
        }
    }
}

impl<T> PartialEq for PropertyDescriptor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl<T> Eq for PropertyDescriptor<T> {}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("owner_type", &self.owner_type)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl<T> fmt::Display for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner_type, self.name)
    }
}
