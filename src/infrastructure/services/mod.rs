mod entity_service;
mod import_file;
mod mapping_service;
mod merchant_service;

pub use entity_service::{EntityHook, EntityService, Page, DEFAULT_PAGE_SIZE};
pub use import_file::ImportFile;
pub use mapping_service::{MerchantMappingService, MAPPING_BASE};
pub use merchant_service::{merchant_service, MerchantService, MERCHANT_BASE};

use std::sync::Arc;

use crate::infrastructure::http::HttpTransport;

/// All resource services sharing one transport
#[derive(Debug)]
pub struct Services<T: HttpTransport> {
    pub merchants: MerchantService<T>,
    pub mappings: MerchantMappingService<T>,
}

impl<T: HttpTransport> Services<T> {
    pub fn new(transport: Arc<T>, page_size: u32) -> Self {
        Self {
            merchants: merchant_service(transport.clone()).with_page_size(page_size),
            mappings: MerchantMappingService::new(transport).with_page_size(page_size),
        }
    }
}
