use std::sync::Arc;

use crate::domain::endpoint::EndpointSet;
use crate::domain::merchant::Merchant;
use crate::infrastructure::http::HttpTransport;

use super::entity_service::EntityService;

pub const MERCHANT_BASE: &str = "/merchants";

pub type MerchantService<T> = EntityService<Merchant, T>;

/// Merchant CRUD; list and import responses arrive as `{"merchants": [...]}`
pub fn merchant_service<T: HttpTransport>(transport: Arc<T>) -> MerchantService<T> {
    EntityService::new(transport, EndpointSet::rest(MERCHANT_BASE)).with_list_field("merchants")
}
