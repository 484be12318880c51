//! Service info endpoint
//!
//! Static service descriptor following the GA4GH service-info layout:
//! https://github.com/ga4gh-discovery/ga4gh-service-info

use axum::Json;
use serde_json::json;

/// GET /v2/service-info
///
/// Returns the same document on every call; only `version` varies, and only
/// between builds.
pub async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "id": "ca.c3g.katsu",
        "name": "Katsu Metadata Service",
        "type": "data service",
        "description": "Clinical metadata service implementation based on the MoH data model",
        "organization": {
            "name": "C3G",
            "url": "http://www.computationalgenomics.ca/"
        },
        "contactUrl": "mailto:info@distributedgenomics.ca",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
