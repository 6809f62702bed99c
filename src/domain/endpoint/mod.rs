//! REST endpoint definitions

mod template;

pub use template::{entity_params, resolve, EndpointTemplate};
pub(crate) use template::scalar_to_string;

/// Path templates for the five CRUD operations of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    pub create: EndpointTemplate,
    pub get_all: EndpointTemplate,
    pub get: EndpointTemplate,
    pub update: EndpointTemplate,
    pub delete: EndpointTemplate,
}

impl EndpointSet {
    pub fn new(
        create: &str,
        get_all: &str,
        get: &str,
        update: &str,
        delete: &str,
    ) -> Self {
        Self {
            create: EndpointTemplate::parse(create),
            get_all: EndpointTemplate::parse(get_all),
            get: EndpointTemplate::parse(get),
            update: EndpointTemplate::parse(update),
            delete: EndpointTemplate::parse(delete),
        }
    }

    /// Conventional layout: `{base}` for collection calls, `{base}/{id}` for items
    pub fn rest(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let item = format!("{}/{{id}}", base);

        Self::new(base, base, &item, &item, &item)
    }

    /// Template of a sub-resource of the collection, e.g. `bulk_delete`.
    ///
    /// Placeholders of the collection path carry over and must be resolved
    /// like any other endpoint.
    pub fn action(&self, name: &str) -> EndpointTemplate {
        let base = self.get_all.as_str().trim_end_matches('/');
        EndpointTemplate::parse(format!("{}/{}", base, name))
    }
}
