//! API documentation endpoint
//!
//! Keeps a hand-maintained inventory of every registered route and renders
//! the first-party subset as a JSON document. Only `/v2/discovery` and
//! `/v2/authorized` endpoints are documented; operational routes (health,
//! ingest, the docs route itself) are filtered out.

use axum::Json;
use serde::Serialize;
use serde_json::json;

/// One registered route: path, HTTP method and the handler that serves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    pub path: &'static str,
    pub method: &'static str,
    pub handler: &'static str,
}

impl EndpointDescriptor {
    const fn new(path: &'static str, method: &'static str, handler: &'static str) -> Self {
        Self { path, method, handler }
    }
}

/// Path prefixes included in the generated documentation
const DOCUMENTED_PREFIXES: &[&str] = &["/v2/discovery", "/v2/authorized"];

/// Full route table, in registration order (kept in sync with
/// `build_router`)
pub fn api_endpoints() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::new("/health", "GET", "health_check"),
        EndpointDescriptor::new("/v2/service-info", "GET", "service_info"),
        EndpointDescriptor::new("/v2/docs", "GET", "api_docs"),
        EndpointDescriptor::new("/v2/authorized/programs/", "GET", "list_programs"),
        EndpointDescriptor::new("/v2/authorized/donors/", "GET", "list_donors"),
        EndpointDescriptor::new("/v2/authorized/primary_diagnoses/", "GET", "list_primary_diagnoses"),
        EndpointDescriptor::new("/v2/authorized/specimens/", "GET", "list_specimens"),
        EndpointDescriptor::new("/v2/authorized/sample_registrations/", "GET", "list_sample_registrations"),
        EndpointDescriptor::new("/v2/authorized/treatments/", "GET", "list_treatments"),
        EndpointDescriptor::new("/v2/authorized/chemotherapies/", "GET", "list_chemotherapies"),
        EndpointDescriptor::new("/v2/authorized/hormone_therapies/", "GET", "list_hormone_therapies"),
        EndpointDescriptor::new("/v2/authorized/immunotherapies/", "GET", "list_immunotherapies"),
        EndpointDescriptor::new("/v2/authorized/radiations/", "GET", "list_radiations"),
        EndpointDescriptor::new("/v2/authorized/surgeries/", "GET", "list_surgeries"),
        EndpointDescriptor::new("/v2/authorized/follow_ups/", "GET", "list_follow_ups"),
        EndpointDescriptor::new("/v2/authorized/biomarkers/", "GET", "list_biomarkers"),
        EndpointDescriptor::new("/v2/authorized/comorbidities/", "GET", "list_comorbidities"),
        EndpointDescriptor::new("/v2/authorized/exposures/", "GET", "list_exposures"),
        EndpointDescriptor::new("/v2/authorized/donor_with_clinical_data/", "GET", "list_donors_with_clinical_data"),
        EndpointDescriptor::new(
            "/v2/authorized/donor_with_clinical_data/program/:program_id/donor/:donor_id",
            "GET",
            "get_donor_with_clinical_data",
        ),
        EndpointDescriptor::new("/v2/authorized/program/:program_id/", "DELETE", "delete_program"),
        EndpointDescriptor::new("/v2/ingest/program/", "POST", "create_program"),
        EndpointDescriptor::new("/v2/ingest/donor/", "POST", "create_donor"),
        EndpointDescriptor::new("/v2/ingest/primary_diagnosis/", "POST", "create_primary_diagnosis"),
        EndpointDescriptor::new("/v2/ingest/specimen/", "POST", "create_specimen"),
        EndpointDescriptor::new("/v2/ingest/sample_registration/", "POST", "create_sample_registration"),
        EndpointDescriptor::new("/v2/ingest/treatment/", "POST", "create_treatment"),
        EndpointDescriptor::new("/v2/ingest/chemotherapy/", "POST", "create_chemotherapy"),
        EndpointDescriptor::new("/v2/ingest/hormone_therapy/", "POST", "create_hormone_therapy"),
        EndpointDescriptor::new("/v2/ingest/immunotherapy/", "POST", "create_immunotherapy"),
        EndpointDescriptor::new("/v2/ingest/radiation/", "POST", "create_radiation"),
        EndpointDescriptor::new("/v2/ingest/surgery/", "POST", "create_surgery"),
        EndpointDescriptor::new("/v2/ingest/follow_up/", "POST", "create_follow_up"),
        EndpointDescriptor::new("/v2/ingest/biomarker/", "POST", "create_biomarker"),
        EndpointDescriptor::new("/v2/ingest/comorbidity/", "POST", "create_comorbidity"),
        EndpointDescriptor::new("/v2/ingest/exposure/", "POST", "create_exposure"),
        EndpointDescriptor::new("/v2/discovery/programs/", "GET", "discover_programs"),
        EndpointDescriptor::new("/v2/discovery/donors/", "GET", "discover_donors"),
        EndpointDescriptor::new("/v2/discovery/specimen/", "GET", "discover_specimens"),
        EndpointDescriptor::new("/v2/discovery/sample_registrations/", "GET", "discover_sample_registrations"),
        EndpointDescriptor::new("/v2/discovery/primary_diagnoses/", "GET", "discover_primary_diagnoses"),
        EndpointDescriptor::new("/v2/discovery/treatments/", "GET", "discover_treatments"),
        EndpointDescriptor::new("/v2/discovery/chemotherapies/", "GET", "discover_chemotherapies"),
        EndpointDescriptor::new("/v2/discovery/hormone_therapies/", "GET", "discover_hormone_therapies"),
        EndpointDescriptor::new("/v2/discovery/immunotherapies/", "GET", "discover_immunotherapies"),
        EndpointDescriptor::new("/v2/discovery/radiations/", "GET", "discover_radiations"),
        EndpointDescriptor::new("/v2/discovery/surgeries/", "GET", "discover_surgeries"),
        EndpointDescriptor::new("/v2/discovery/follow_ups/", "GET", "discover_follow_ups"),
        EndpointDescriptor::new("/v2/discovery/biomarkers/", "GET", "discover_biomarkers"),
        EndpointDescriptor::new("/v2/discovery/comorbidities/", "GET", "discover_comorbidities"),
        EndpointDescriptor::new("/v2/discovery/exposures/", "GET", "discover_exposures"),
        EndpointDescriptor::new("/v2/discovery/sidebar_list/", "GET", "discover_sidebar_list"),
        EndpointDescriptor::new("/v2/discovery/overview/cohort_count/", "GET", "discover_cohort_count"),
        EndpointDescriptor::new("/v2/discovery/overview/individual_count/", "GET", "discover_individual_count"),
        EndpointDescriptor::new("/v2/discovery/overview/patients_per_cohort/", "GET", "discover_patients_per_cohort"),
        EndpointDescriptor::new("/v2/discovery/overview/gender_count/", "GET", "discover_gender_count"),
        EndpointDescriptor::new("/v2/discovery/overview/cancer_type_count/", "GET", "discover_cancer_type_count"),
        EndpointDescriptor::new("/v2/discovery/overview/treatment_type_count/", "GET", "discover_treatment_type_count"),
        EndpointDescriptor::new("/v2/discovery/overview/diagnosis_age_count/", "GET", "discover_diagnosis_age_count"),
    ]
}

/// Keep only endpoints under the documented prefixes, preserving order.
///
/// Inputs are not mutated; no matches yields an empty list.
pub fn filter_api_endpoints(endpoints: &[EndpointDescriptor]) -> Vec<EndpointDescriptor> {
    endpoints
        .iter()
        .filter(|e| DOCUMENTED_PREFIXES.iter().any(|p| e.path.starts_with(p)))
        .cloned()
        .collect()
}

/// GET /v2/docs
///
/// JSON description of the public API, generated from the filtered route
/// inventory.
pub async fn api_docs() -> Json<serde_json::Value> {
    let endpoints = filter_api_endpoints(&api_endpoints());

    Json(json!({
        "title": "Katsu Metadata Service API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_only_documented_prefixes() {
        let filtered = filter_api_endpoints(&api_endpoints());

        assert!(!filtered.is_empty());
        for e in &filtered {
            assert!(
                e.path.starts_with("/v2/discovery") || e.path.starts_with("/v2/authorized"),
                "unexpected path in docs: {}",
                e.path
            );
        }
        // Operational routes never appear
        assert!(filtered.iter().all(|e| e.path != "/health"));
        assert!(filtered.iter().all(|e| !e.path.starts_with("/v2/ingest")));
    }

    #[test]
    fn test_filter_preserves_relative_order() {
        let all = api_endpoints();
        let filtered = filter_api_endpoints(&all);

        let positions: Vec<usize> = filtered
            .iter()
            .map(|e| all.iter().position(|o| o == e).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_filter_empty_input_yields_empty_output() {
        assert!(filter_api_endpoints(&[]).is_empty());
    }

    #[test]
    fn test_filter_no_matches_yields_empty_output() {
        let endpoints = vec![
            EndpointDescriptor::new("/health", "GET", "health_check"),
            EndpointDescriptor::new("/v2/docs", "GET", "api_docs"),
        ];
        assert!(filter_api_endpoints(&endpoints).is_empty());
    }

    #[test]
    fn test_filter_all_matching_input_is_returned_unchanged() {
        let endpoints = vec![
            EndpointDescriptor::new("/v2/authorized/donors/", "GET", "list_donors"),
            EndpointDescriptor::new("/v2/discovery/programs/", "GET", "discover_programs"),
        ];
        assert_eq!(filter_api_endpoints(&endpoints), endpoints);
    }
}
