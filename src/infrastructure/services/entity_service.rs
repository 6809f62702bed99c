//! Generic CRUD client for one REST resource

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU32;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::domain::endpoint::{entity_params, EndpointSet, EndpointTemplate};
use crate::domain::entity::{hydrate, set_fields, Entity, ModelFactory};
use crate::domain::loading::LoadingState;
use crate::domain::DomainError;
use crate::infrastructure::http::{HttpRequest, HttpTransport, MultipartPart};

use super::import_file::ImportFile;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pre-create / pre-update hook. May transform the entity or reject it.
pub type EntityHook<E> = Arc<dyn Fn(E) -> Result<E, DomainError> + Send + Sync>;

/// Page selector for [`EntityService::get_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Fetch pages 1, 2, ... until a short page comes back
    All,
    /// Fetch exactly one page (1-based)
    Number(NonZeroU32),
}

impl Page {
    /// Single page selector; `None` for page 0
    pub fn number(number: u32) -> Option<Self> {
        NonZeroU32::new(number).map(Self::Number)
    }
}

/// CRUD, bulk and import operations for entity `E` over transport `T`.
///
/// Every operation holds a guard on [`Self::loading`] for its whole
/// duration, including hook execution.
pub struct EntityService<E: Entity, T: HttpTransport> {
    transport: Arc<T>,
    endpoints: EndpointSet,
    model: ModelFactory<E>,
    before_create: Option<EntityHook<E>>,
    before_update: Option<EntityHook<E>>,
    list_field: Option<String>,
    path_params: HashMap<String, String>,
    page_size: u32,
    loading: LoadingState,
}

impl<E: Entity, T: HttpTransport> std::fmt::Debug for EntityService<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("entity", &E::NAME)
            .field("endpoints", &self.endpoints)
            .field("list_field", &self.list_field)
            .field("path_params", &self.path_params)
            .field("page_size", &self.page_size)
            .field("loading", &self.loading.count())
            .finish_non_exhaustive()
    }
}

impl<E: Entity, T: HttpTransport> EntityService<E, T> {
    pub fn new(transport: Arc<T>, endpoints: EndpointSet) -> Self {
        Self {
            transport,
            endpoints,
            model: hydrate::<E>,
            before_create: None,
            before_update: None,
            list_field: None,
            path_params: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            loading: LoadingState::new(),
        }
    }

    /// Replace the model factory used to turn responses into entities
    pub fn with_model(mut self, model: ModelFactory<E>) -> Self {
        self.model = model;
        self
    }

    pub fn with_before_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(E) -> Result<E, DomainError> + Send + Sync + 'static,
    {
        self.before_create = Some(Arc::new(hook));
        self
    }

    pub fn with_before_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(E) -> Result<E, DomainError> + Send + Sync + 'static,
    {
        self.before_update = Some(Arc::new(hook));
        self
    }

    /// Name of the list inside envelope responses, e.g. `merchants`
    pub fn with_list_field(mut self, field: impl Into<String>) -> Self {
        self.list_field = Some(field.into());
        self
    }

    /// Fixed value for a path placeholder, e.g. the `owner` of
    /// `/owners/{owner}/merchants`. Per-call parameters take precedence.
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Build an entity from a raw record with this service's model factory
    pub fn model(&self, raw: Value) -> Result<E, DomainError> {
        (self.model)(raw)
    }

    pub async fn create(&self, entity: E) -> Result<E, DomainError> {
        let _guard = self.loading.acquire();

        let entity = apply_hook(self.before_create.as_ref(), entity)?;
        let path = self.resolve_path(&self.endpoints.create, entity_params(&entity)?)?;
        debug!(entity = E::NAME, %path, "Creating");

        let body = serde_json::to_value(&entity)?;
        let raw = self
            .transport
            .send(HttpRequest::post(path).with_json(body))
            .await?;

        self.model(raw)
    }

    /// List entities matching the set fields of `query` plus `params`
    pub async fn get_all(
        &self,
        query: &E,
        params: &HashMap<String, String>,
        page: Page,
    ) -> Result<Vec<E>, DomainError> {
        let _guard = self.loading.acquire();

        let mut filters = set_fields(query)?;
        filters.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        let path = self.resolve_path(&self.endpoints.get_all, filters.clone())?;
        let placeholders = self.endpoints.get_all.placeholders();
        let filters: BTreeMap<String, String> = filters
            .into_iter()
            .filter(|(name, _)| !placeholders.contains(name))
            .collect();

        match page {
            Page::Number(number) => self.fetch_page(&path, &filters, number.get()).await,
            Page::All => {
                let mut entities = Vec::new();

                for number in 1.. {
                    let batch = self.fetch_page(&path, &filters, number).await?;
                    let exhausted = batch.len() < self.page_size as usize;
                    entities.extend(batch);

                    if exhausted {
                        debug!(
                            entity = E::NAME,
                            pages = number,
                            total = entities.len(),
                            "Fetched all pages"
                        );
                        break;
                    }
                }

                Ok(entities)
            }
        }
    }

    async fn fetch_page(
        &self,
        path: &str,
        filters: &BTreeMap<String, String>,
        number: u32,
    ) -> Result<Vec<E>, DomainError> {
        debug!(entity = E::NAME, %path, page = number, "Listing");

        let request = HttpRequest::get(path)
            .with_query(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .with_query([
                ("page", number.to_string()),
                ("per_page", self.page_size.to_string()),
            ]);

        let raw = self.transport.send(request).await?;
        self.unwrap_list(raw)?
            .into_iter()
            .map(|item| self.model(item))
            .collect()
    }

    pub async fn get(&self, id: u64) -> Result<E, DomainError> {
        let _guard = self.loading.acquire();

        let path = self.resolve_path(&self.endpoints.get, id_params(id))?;
        debug!(entity = E::NAME, %path, "Fetching");

        let raw = self.transport.send(HttpRequest::get(path)).await?;
        self.model(raw)
    }

    pub async fn update(&self, entity: E) -> Result<E, DomainError> {
        let _guard = self.loading.acquire();

        let entity = apply_hook(self.before_update.as_ref(), entity)?;
        let path = self.resolve_path(&self.endpoints.update, entity_params(&entity)?)?;
        debug!(entity = E::NAME, %path, "Updating");

        let body = serde_json::to_value(&entity)?;
        let raw = self
            .transport
            .send(HttpRequest::put(path).with_json(body))
            .await?;

        self.model(raw)
    }

    /// Delete one entity; returns the server acknowledgement as-is
    pub async fn delete(&self, id: u64) -> Result<Value, DomainError> {
        let _guard = self.loading.acquire();

        let path = self.resolve_path(&self.endpoints.delete, id_params(id))?;
        debug!(entity = E::NAME, %path, "Deleting");

        self.transport.send(HttpRequest::delete(path)).await
    }

    /// Delete many entities in one request
    pub async fn bulk_delete(&self, ids: &[u64]) -> Result<Value, DomainError> {
        let _guard = self.loading.acquire();

        let path = self.action_path("bulk_delete")?;
        info!(entity = E::NAME, count = ids.len(), "Bulk deleting");

        self.transport
            .send(HttpRequest::post(path).with_json(json!({ "ids": ids })))
            .await
    }

    /// Upload a file for server-side import.
    ///
    /// `header_mapping` maps spreadsheet column headers to entity fields and
    /// is sent as a JSON text part next to the file.
    pub async fn import_from_file(
        &self,
        file: ImportFile,
        header_mapping: &HashMap<String, String>,
    ) -> Result<Vec<E>, DomainError> {
        let _guard = self.loading.acquire();

        let path = self.action_path("import")?;
        info!(entity = E::NAME, file = %file.file_name, size = file.content.len(), "Importing");

        let parts = vec![
            MultipartPart::File {
                name: "file".to_string(),
                file_name: file.file_name,
                mime: file.mime,
                content: file.content,
            },
            MultipartPart::Text {
                name: "headerMapping".to_string(),
                value: serde_json::to_string(header_mapping)?,
            },
        ];

        let raw = self
            .transport
            .send(HttpRequest::put(path).with_multipart(parts))
            .await?;

        let entities = self
            .unwrap_list(raw)?
            .into_iter()
            .map(|item| self.model(item))
            .collect::<Result<Vec<_>, _>>()?;

        info!(entity = E::NAME, imported = entities.len(), "Import finished");
        Ok(entities)
    }

    /// Resolved path of a collection sub-resource such as `bulk_save`
    pub fn action_path(&self, name: &str) -> Result<String, DomainError> {
        self.resolve_path(&self.endpoints.action(name), HashMap::new())
    }

    fn resolve_path(
        &self,
        template: &EndpointTemplate,
        params: HashMap<String, String>,
    ) -> Result<String, DomainError> {
        let mut merged = self.path_params.clone();
        merged.extend(params);

        template.resolve(&merged)
    }

    /// Send a resource-specific request under this service's loading guard
    pub async fn execute(&self, request: HttpRequest) -> Result<Value, DomainError> {
        let _guard = self.loading.acquire();
        debug!(entity = E::NAME, %request, "Executing");

        self.transport.send(request).await
    }

    /// Envelope `{..., <list_field>: [...]}` or bare list → list items
    fn unwrap_list(&self, raw: Value) -> Result<Vec<Value>, DomainError> {
        let raw = match (raw, self.list_field.as_deref()) {
            (Value::Object(mut envelope), Some(field)) if envelope.contains_key(field) => {
                envelope.remove(field).unwrap_or(Value::Null)
            }
            (raw, _) => raw,
        };

        match raw {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(DomainError::decode(format!(
                "Expected a list of {} records, got: {}",
                E::NAME,
                other
            ))),
        }
    }
}

fn apply_hook<E>(hook: Option<&EntityHook<E>>, entity: E) -> Result<E, DomainError> {
    match hook {
        Some(hook) => hook(entity),
        None => Ok(entity),
    }
}

fn id_params(id: u64) -> HashMap<String, String> {
    HashMap::from([("id".to_string(), id.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merchant::Merchant;
    use crate::infrastructure::http::mock::ScriptedTransport;
    use crate::infrastructure::http::{MockHttpTransport, RequestBody};
    use reqwest::Method;
    use tokio::sync::Semaphore;
    use tokio_test::{assert_err, assert_ok};

    fn service<T: HttpTransport>(transport: T) -> EntityService<Merchant, T> {
        EntityService::new(Arc::new(transport), EndpointSet::rest("/merchants"))
            .with_list_field("merchants")
            .with_page_size(2)
    }

    fn merchants(ids: &[u64]) -> Value {
        Value::Array(
            ids.iter()
                .map(|id| json!({ "id": id, "title": format!("m{id}") }))
                .collect(),
        )
    }

    fn ids(entities: &[Merchant]) -> Vec<u64> {
        entities.iter().map(|m| m.id).collect()
    }

    /// Holds every request until a permit is released
    struct GatedTransport {
        gate: Semaphore,
        inner: ScriptedTransport,
    }

    impl GatedTransport {
        fn new(inner: ScriptedTransport) -> Self {
            Self {
                gate: Semaphore::new(0),
                inner,
            }
        }

        fn release(&self) {
            self.gate.add_permits(1);
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for GatedTransport {
        async fn send(&self, request: HttpRequest) -> Result<Value, DomainError> {
            self.gate.acquire().await.unwrap().forget();
            self.inner.send(request).await
        }
    }

    #[tokio::test]
    async fn test_create_posts_entity_and_hydrates_response() {
        let transport = ScriptedTransport::new().with_reply(
            Method::POST,
            "/merchants",
            json!({ "id": 10, "title": "Bakery", "created": "2025-01-01T00:00:00Z" }),
        );
        let service = service(transport);

        let created = service.create(Merchant::new("Bakery")).await.unwrap();
        assert_eq!(created.id, 10);
        assert!(created.created().is_some());
        assert!(!service.is_loading());

        let requests = service.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].json_body().unwrap()["title"], "Bakery");
    }

    #[tokio::test]
    async fn test_create_applies_hook_before_sending() {
        let transport =
            ScriptedTransport::new().with_reply(Method::POST, "/merchants", json!({ "id": 1 }));
        let service = service(transport).with_before_create(|mut m: Merchant| {
            m.title = m.title.trim().to_string();
            Ok(m)
        });

        service.create(Merchant::new("  Shop  ")).await.unwrap();

        let requests = service.transport.requests();
        assert_eq!(requests[0].json_body().unwrap()["title"], "Shop");
    }

    #[tokio::test]
    async fn test_hook_rejection_skips_request_and_releases_guard() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);

        let service = service(transport)
            .with_before_create(|_| Err(DomainError::hook_rejected("title required")));

        let err = service.create(Merchant::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::HookRejected { .. }));
        assert_eq!(service.loading().count(), 0);
    }

    #[tokio::test]
    async fn test_get_all_single_page_sends_filters() {
        let transport =
            ScriptedTransport::new().with_reply(Method::GET, "/merchants", merchants(&[1, 2]));
        let service = service(transport);

        let mut query = Merchant::default();
        query.business_district = "North".into();
        let params = HashMap::from([("s".to_string(), "cafe".to_string())]);

        let page = Page::number(3).unwrap();
        let result = service.get_all(&query, &params, page).await.unwrap();
        assert_eq!(ids(&result), [1, 2]);

        let requests = service.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query_param("business_district"), Some("North"));
        assert_eq!(requests[0].query_param("s"), Some("cafe"));
        assert_eq!(requests[0].query_param("page"), Some("3"));
        assert_eq!(requests[0].query_param("per_page"), Some("2"));
        assert_eq!(requests[0].query_param("title"), None);
    }

    #[tokio::test]
    async fn test_get_all_fetches_until_short_page() {
        let transport = ScriptedTransport::new()
            .with_reply(Method::GET, "/merchants", merchants(&[1, 2]))
            .with_reply(Method::GET, "/merchants", merchants(&[3, 4]))
            .with_reply(Method::GET, "/merchants", merchants(&[5]));
        let service = service(transport);

        let result = service
            .get_all(&Merchant::default(), &HashMap::new(), Page::All)
            .await
            .unwrap();
        assert_eq!(ids(&result), [1, 2, 3, 4, 5]);

        let pages: Vec<_> = service
            .transport
            .requests()
            .iter()
            .map(|r| r.query_param("page").unwrap().to_string())
            .collect();
        assert_eq!(pages, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_get_all_stops_at_empty_page() {
        let transport = ScriptedTransport::new()
            .with_reply(Method::GET, "/merchants", merchants(&[1, 2]))
            .with_reply(Method::GET, "/merchants", json!([]));
        let service = service(transport);

        let result = service
            .get_all(&Merchant::default(), &HashMap::new(), Page::All)
            .await
            .unwrap();
        assert_eq!(ids(&result), [1, 2]);
        assert_eq!(service.transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_get_all_keeps_duplicates_across_pages() {
        let transport = ScriptedTransport::new()
            .with_reply(Method::GET, "/merchants", merchants(&[1, 2]))
            .with_reply(Method::GET, "/merchants", merchants(&[2]));
        let service = service(transport);

        let result = service
            .get_all(&Merchant::default(), &HashMap::new(), Page::All)
            .await
            .unwrap();
        assert_eq!(ids(&result), [1, 2, 2]);
    }

    #[tokio::test]
    async fn test_get_all_failure_mid_pagination_propagates() {
        let transport = ScriptedTransport::new()
            .with_reply(Method::GET, "/merchants", merchants(&[1, 2]))
            .with_status(Method::GET, "/merchants", 503);
        let service = service(transport);

        let err = service
            .get_all(&Merchant::default(), &HashMap::new(), Page::All)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_get_all_resolves_path_placeholders() {
        let transport =
            ScriptedTransport::new().with_reply(Method::GET, "/owners/4/merchants", json!([]));
        let endpoints = EndpointSet::new(
            "/merchants",
            "/owners/{owner}/merchants",
            "/merchants/{id}",
            "/merchants/{id}",
            "/merchants/{id}",
        );
        let service: EntityService<Merchant, _> =
            EntityService::new(Arc::new(transport), endpoints);

        let params = HashMap::from([("owner".to_string(), "4".to_string())]);
        let first = Page::number(1).unwrap();
        assert_ok!(service.get_all(&Merchant::default(), &params, first).await);

        let requests = service.transport.requests();
        assert_eq!(requests[0].path, "/owners/4/merchants");
        assert_eq!(requests[0].query_param("owner"), None);

        let missing = service
            .get_all(&Merchant::default(), &HashMap::new(), first)
            .await;
        assert!(matches!(missing, Err(DomainError::MissingParameter { .. })));
        assert_eq!(service.transport.requests().len(), 1);
    }

    fn owner_scoped_endpoints() -> EndpointSet {
        EndpointSet::new(
            "/owners/{owner}/merchants",
            "/owners/{owner}/merchants",
            "/owners/{owner}/merchants/{id}",
            "/owners/{owner}/merchants/{id}",
            "/owners/{owner}/merchants/{id}",
        )
    }

    #[tokio::test]
    async fn test_collection_actions_require_path_placeholders() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);
        let service: EntityService<Merchant, _> =
            EntityService::new(Arc::new(transport), owner_scoped_endpoints());

        let err = service.bulk_delete(&[1]).await.unwrap_err();
        assert!(matches!(err, DomainError::MissingParameter { ref name, .. } if name == "owner"));

        let file = ImportFile::new("shops.csv", "title\n");
        let err = service.import_from_file(file, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::MissingParameter { .. }));

        assert_err!(service.action_path("bulk_save"));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_path_params_resolve_actions_and_items() {
        let transport = ScriptedTransport::new()
            .with_reply(Method::POST, "/owners/4/merchants/bulk_delete", json!({}))
            .with_reply(Method::PUT, "/owners/4/merchants/import", json!([]))
            .with_reply(Method::GET, "/owners/4/merchants/9", json!({ "id": 9 }));
        let service: EntityService<Merchant, _> =
            EntityService::new(Arc::new(transport), owner_scoped_endpoints())
                .with_path_param("owner", "4");

        assert_ok!(service.bulk_delete(&[1]).await);
        let file = ImportFile::new("shops.csv", "title\n");
        assert_ok!(service.import_from_file(file, &HashMap::new()).await);
        assert_eq!(service.get(9).await.unwrap().id, 9);

        let paths: Vec<_> = service
            .transport
            .requests()
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(
            paths,
            [
                "/owners/4/merchants/bulk_delete",
                "/owners/4/merchants/import",
                "/owners/4/merchants/9"
            ]
        );
    }

    #[tokio::test]
    async fn test_get_all_path_params_yield_to_call_params() {
        let transport =
            ScriptedTransport::new().with_reply(Method::GET, "/owners/4/merchants", json!([]));
        let service: EntityService<Merchant, _> =
            EntityService::new(Arc::new(transport), owner_scoped_endpoints())
                .with_path_param("owner", "4");

        let params = HashMap::from([("owner".to_string(), "5".to_string())]);
        let first = Page::number(1).unwrap();
        assert_ok!(service.get_all(&Merchant::default(), &HashMap::new(), first).await);
        assert_err!(service.get_all(&Merchant::default(), &params, first).await);

        let requests = service.transport.requests();
        assert_eq!(requests[0].query_param("owner"), None);
        assert_eq!(requests[1].path, "/owners/5/merchants");
    }

    #[test]
    fn test_page_number_is_one_based() {
        assert_eq!(Page::number(0), None);
        assert_eq!(Page::number(2), Some(Page::Number(NonZeroU32::new(2).unwrap())));
    }

    #[tokio::test]
    async fn test_get_maps_not_found() {
        let transport = ScriptedTransport::new().with_status(Method::GET, "/merchants/9", 404);
        let service = service(transport);

        let err = service.get(9).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_get_hydrates_relation() {
        let transport = ScriptedTransport::new().with_reply(
            Method::GET,
            "/merchants/3",
            json!({ "id": 3, "owner": { "id": 8, "username": "ann" } }),
        );
        let service = service(transport);

        let merchant = service.get(3).await.unwrap();
        assert_eq!(merchant.owner.username, "ann");
    }

    #[tokio::test]
    async fn test_update_puts_to_entity_path() {
        let transport = ScriptedTransport::new().with_reply(
            Method::PUT,
            "/merchants/5",
            json!({ "id": 5, "title": "Renamed", "updated": "2025-02-02T00:00:00Z" }),
        );
        let service = service(transport).with_before_update(|mut m: Merchant| {
            m.custom_filters = "vip".into();
            Ok(m)
        });

        let mut merchant = Merchant::new("Renamed");
        merchant.id = 5;
        let updated = service.update(merchant).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.updated().is_some());

        let requests = service.transport.requests();
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].json_body().unwrap()["custom_filters"], "vip");
    }

    #[tokio::test]
    async fn test_update_missing_parameter_never_sends() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);

        let endpoints = EndpointSet::new(
            "/merchants",
            "/merchants",
            "/merchants/{id}",
            "/merchants/{merchant}",
            "/merchants/{id}",
        );
        let service: EntityService<Merchant, _> =
            EntityService::new(Arc::new(transport), endpoints);

        let err = service.update(Merchant::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::MissingParameter { ref name, .. } if name == "merchant"));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_delete_returns_acknowledgement() {
        let transport = ScriptedTransport::new().with_reply(
            Method::DELETE,
            "/merchants/4",
            json!({ "message": "Successfully deleted." }),
        );
        let service = service(transport);

        let ack = service.delete(4).await.unwrap();
        assert_eq!(ack["message"], "Successfully deleted.");
    }

    #[tokio::test]
    async fn test_bulk_delete_sends_all_ids() {
        let transport = ScriptedTransport::new().with_reply(
            Method::POST,
            "/merchants/bulk_delete",
            json!({ "count": 3 }),
        );
        let service = service(transport);

        let ack = service.bulk_delete(&[1, 2, 3]).await.unwrap();
        assert_eq!(ack["count"], 3);

        let requests = service.transport.requests();
        assert_eq!(requests[0].json_body(), Some(&json!({ "ids": [1, 2, 3] })));
    }

    #[tokio::test]
    async fn test_import_envelope_and_bare_list_are_equivalent() {
        let items = json!([
            { "id": 1, "title": "A", "owner": { "id": 2 } },
            { "id": 3, "title": "B", "created": "" },
        ]);
        let envelope = ScriptedTransport::new().with_reply(
            Method::PUT,
            "/merchants/import",
            json!({ "message": "Import completed successfully", "count": 2, "merchants": items }),
        );
        let bare = ScriptedTransport::new().with_reply(Method::PUT, "/merchants/import", items);

        let mapping = HashMap::from([("商户名称".to_string(), "title".to_string())]);
        let from_envelope = service(envelope)
            .import_from_file(ImportFile::new("shops.csv", "title\nA\nB\n"), &mapping)
            .await
            .unwrap();
        let from_bare = service(bare)
            .import_from_file(ImportFile::new("shops.csv", "title\nA\nB\n"), &mapping)
            .await
            .unwrap();

        assert_eq!(from_envelope, from_bare);
        assert_eq!(ids(&from_envelope), [1, 3]);
        assert_eq!(from_envelope[0].owner.id, 2);
    }

    #[tokio::test]
    async fn test_import_sends_file_and_header_mapping() {
        let transport = ScriptedTransport::new().with_reply(
            Method::PUT,
            "/merchants/import",
            json!({ "message": "ok", "count": 0, "merchants": null }),
        );
        let service = service(transport);

        let mapping = HashMap::from([("Name".to_string(), "title".to_string())]);
        let imported = service
            .import_from_file(ImportFile::new("shops.csv", "Name\nA\n"), &mapping)
            .await
            .unwrap();
        assert!(imported.is_empty());

        let requests = service.transport.requests();
        let RequestBody::Multipart(parts) = &requests[0].body else {
            panic!("expected multipart body");
        };
        assert!(matches!(
            &parts[0],
            MultipartPart::File { name, file_name, mime, .. }
                if name == "file" && file_name == "shops.csv" && mime == "text/csv"
        ));
        assert_eq!(
            parts[1],
            MultipartPart::Text {
                name: "headerMapping".into(),
                value: r#"{"Name":"title"}"#.into(),
            }
        );
    }

    #[tokio::test]
    async fn test_import_rejects_non_list_response() {
        let transport = ScriptedTransport::new().with_reply(
            Method::PUT,
            "/merchants/import",
            json!({ "error": "Invalid XLSX file" }),
        );
        let service = service(transport);

        let result = service
            .import_from_file(ImportFile::new("x.xlsx", Vec::<u8>::new()), &HashMap::new())
            .await;
        assert_err!(&result);
        assert!(matches!(result, Err(DomainError::Decode { .. })));
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_custom_model_factory_is_used() {
        fn shouting(raw: Value) -> Result<Merchant, DomainError> {
            let mut merchant: Merchant = hydrate(raw)?;
            merchant.title = merchant.title.to_uppercase();
            Ok(merchant)
        }

        let transport = ScriptedTransport::new()
            .with_reply(Method::GET, "/merchants/1", json!({ "id": 1, "title": "quiet" }));
        let service = service(transport).with_model(shouting);

        assert_eq!(service.get(1).await.unwrap().title, "QUIET");
    }

    #[tokio::test]
    async fn test_overlapping_operations_balance_counter() {
        let transport = GatedTransport::new(
            ScriptedTransport::new()
                .with_reply(Method::GET, "/merchants/1", json!({ "id": 1 }))
                .with_status(Method::DELETE, "/merchants/2", 500),
        );
        let service = service(transport);
        let mut watcher = service.loading().subscribe();

        let driver = async {
            let _ = watcher.wait_for(|count| *count == 2).await.unwrap();
            service.transport.release();

            let _ = watcher.wait_for(|count| *count == 1).await.unwrap();
            assert!(service.is_loading());
            service.transport.release();
        };

        let (fetched, deleted, ()) = tokio::join!(service.get(1), service.delete(2), driver);

        assert_eq!(fetched.unwrap().id, 1);
        assert_eq!(deleted.unwrap_err().status(), Some(500));
        assert_eq!(service.loading().count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_operation_releases_guard() {
        let transport = GatedTransport::new(ScriptedTransport::new());
        let service = service(transport);

        {
            let pending = service.get(1);
            futures::pin_mut!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert_eq!(service.loading().count(), 1);
        }

        assert_eq!(service.loading().count(), 0);
    }
}
