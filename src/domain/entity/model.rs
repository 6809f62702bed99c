//! Entity traits and types

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Normalizer for the raw value of a relation field
pub type Normalizer = fn(Value) -> Result<Value, DomainError>;

/// Turns a raw server record into a typed entity
pub type ModelFactory<E> = fn(Value) -> Result<E, DomainError>;

/// A field that holds another entity
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub field: &'static str,
    pub normalize: Normalizer,
}

impl Relation {
    pub const fn of<E: Entity>(field: &'static str) -> Self {
        Self {
            field,
            normalize: super::normalize::<E>,
        }
    }
}

/// Trait for types exchanged with the REST backend.
///
/// Implementors describe their shape as data: `Default` supplies the field
/// defaults, and the associated constants name the date-typed fields and
/// the relation fields. Hydration itself is generic and lives in
/// [`super::hydrate`].
pub trait Entity:
    Default + Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Human-readable entity name, used in logs and errors
    const NAME: &'static str;

    /// Fields holding an optional timestamp
    const DATE_FIELDS: &'static [&'static str] = &["created", "updated"];

    /// Fields holding a nested entity
    const RELATIONS: &'static [Relation] = &[];

    /// Server-assigned identifier; 0 means not yet saved
    fn id(&self) -> u64;

    fn is_new(&self) -> bool {
        self.id() == 0
    }
}
