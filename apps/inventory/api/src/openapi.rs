//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "0.1.0",
        description = "Accepts inventory jobs and reports their outcome to registered webhooks",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:5232", description = "Local development server")
    ),
    nest(
        (path = "/api/inventory", api = domain_inventory::ApiDoc)
    ),
    tags(
        (name = "inventory", description = "Inventory jobs and webhook registration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_api_inventory() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/inventory/processInventory"));
        assert!(doc.paths.paths.contains_key("/api/inventory/registerWebhook"));
    }
}
