//! Domain layer - Entities, endpoint templates and grouping rules

pub mod endpoint;
pub mod entity;
pub mod error;
pub mod loading;
pub mod mapping;
pub mod merchant;

pub use endpoint::{EndpointSet, EndpointTemplate};
pub use entity::{hydrate, normalize, rehydrate, Entity, ModelFactory, Relation};
pub use error::DomainError;
pub use loading::{LoadingGuard, LoadingState};
pub use mapping::{
    group_by_field, BulkAck, BulkDeleteAck, FieldLabelMapping, LabelMapping, MerchantMapping,
};
pub use merchant::{Merchant, User};
