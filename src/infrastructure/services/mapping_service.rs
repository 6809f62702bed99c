//! Merchant mapping service: CRUD plus the grouped field view

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::endpoint::EndpointSet;
use crate::domain::loading::LoadingState;
use crate::domain::mapping::{
    group_by_field, validate_mapping, BulkAck, BulkDeleteAck, FieldLabelMapping,
    MerchantMapping,
};
use crate::domain::DomainError;
use crate::infrastructure::http::{HttpRequest, HttpTransport};

use super::entity_service::{EntityService, Page};

pub const MAPPING_BASE: &str = "/merchant-mappings";

/// Service for merchant field label mappings
#[derive(Debug)]
pub struct MerchantMappingService<T: HttpTransport> {
    entities: EntityService<MerchantMapping, T>,
}

impl<T: HttpTransport> MerchantMappingService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_endpoints(transport, EndpointSet::rest(MAPPING_BASE))
    }

    pub fn with_endpoints(transport: Arc<T>, endpoints: EndpointSet) -> Self {
        let entities = EntityService::new(transport, endpoints)
            .with_before_create(validate_mapping)
            .with_before_update(validate_mapping);

        Self { entities }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.entities = self.entities.with_page_size(page_size);
        self
    }

    /// Plain CRUD access to the mapping records
    pub fn entities(&self) -> &EntityService<MerchantMapping, T> {
        &self.entities
    }

    pub fn loading(&self) -> &LoadingState {
        self.entities.loading()
    }

    /// Fetch every mapping record and group them by field
    pub async fn load_all_mappings(&self) -> Result<Vec<FieldLabelMapping>, DomainError> {
        let _guard = self.entities.loading().acquire();

        let records = self
            .entities
            .get_all(&MerchantMapping::default(), &HashMap::new(), Page::All)
            .await?;
        let record_count = records.len();

        let groups = group_by_field(records);
        debug!(records = record_count, fields = groups.len(), "Grouped merchant mappings");

        Ok(groups)
    }

    /// Replace the mappings of every field in `groups` in one request
    pub async fn bulk_save_mappings(
        &self,
        groups: &[FieldLabelMapping],
    ) -> Result<BulkAck, DomainError> {
        info!(fields = groups.len(), "Bulk saving merchant mappings");

        let request = HttpRequest::post(self.entities.action_path("bulk_save")?)
            .with_json(json!({ "fieldMappings": groups }));

        decode_ack(self.entities.execute(request).await?)
    }

    /// Delete every mapping whose field is listed
    pub async fn bulk_delete_by_fields<I, S>(
        &self,
        fields: I,
    ) -> Result<BulkDeleteAck, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        info!(?fields, "Bulk deleting merchant mappings");

        let request = HttpRequest::delete(self.entities.action_path("bulk_delete")?)
            .with_json(json!({ "fields": fields }));

        decode_ack(self.entities.execute(request).await?)
    }
}

fn decode_ack<A: DeserializeOwned + Default>(raw: Value) -> Result<A, DomainError> {
    if raw.is_null() {
        return Ok(A::default());
    }

    serde_json::from_value(raw)
        .map_err(|e| DomainError::decode(format!("Invalid bulk acknowledgement: {}", e)))
}
