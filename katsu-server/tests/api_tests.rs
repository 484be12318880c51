//! Integration tests for the katsu-server API
//!
//! Drives the full router with tower's `oneshot` against a scratch SQLite
//! database: authentication and program scoping, ingest with extension
//! schema validation, nested donor assembly, discovery counts, pagination
//! and the allowed-hosts guard.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use katsu_common::config::{ServerConfig, TokenGrant};
use katsu_common::db::init_database;
use katsu_common::schema::{ExtensionSchema, SchemaType};
use katsu_server::{build_router, AppState};

const ADMIN_TOKEN: &str = "token_1";
const READER_TOKEN: &str = "token_2";

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8008,
        database_path: std::path::PathBuf::new(),
        allowed_hosts: vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
            "container-9".to_string(),
        ],
        grants: vec![
            TokenGrant {
                token: ADMIN_TOKEN.to_string(),
                datasets: vec!["SYNTHETIC-1".to_string()],
                is_admin: true,
            },
            TokenGrant {
                token: READER_TOKEN.to_string(),
                datasets: vec!["SYNTHETIC-1".to_string(), "SYNTHETIC-2".to_string()],
                is_admin: false,
            },
        ],
        extension_schemas: vec![ExtensionSchema {
            json_schema: json!({
                "type": "object",
                "properties": {
                    "age_group": { "type": "string" }
                },
                "required": ["age_group"]
            }),
            required: false,
            schema_type: SchemaType::Donor,
        }],
    }
}

/// Build an app over a fresh scratch database; the TempDir must outlive the
/// test so the database file is not removed early.
async fn setup_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("katsu.db")).await.unwrap();
    let state = AppState::new(pool, test_config());
    (build_router(state), dir)
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return (status, Value::Null);
    }
    let body = extract_json(response.into_body()).await;
    (status, body)
}

async fn seed(app: &Router, uri: &str, body: Value) {
    let (status, response) = send(app, post_json(uri, ADMIN_TOKEN, body)).await;
    assert_eq!(status, StatusCode::CREATED, "seed {} failed: {}", uri, response);
}

/// Two programs, one fully populated donor in SYNTHETIC-1 and a bare donor
/// in SYNTHETIC-2
async fn seed_clinical_data(app: &Router) {
    seed(app, "/v2/ingest/program/", json!({"program_id": "SYNTHETIC-1", "name": "Synthetic Program 1"})).await;
    seed(app, "/v2/ingest/program/", json!({"program_id": "SYNTHETIC-2", "name": "Synthetic Program 2"})).await;

    seed(app, "/v2/ingest/donor/", json!({
        "submitter_donor_id": "DONOR_1",
        "program_id": "SYNTHETIC-1",
        "gender": "Female",
        "sex_at_birth": "Female",
        "is_deceased": false,
        "date_of_birth": "1970-06",
        "primary_site": ["Breast"],
        "extra_properties": { "age_group": "50-59" }
    })).await;
    seed(app, "/v2/ingest/donor/", json!({
        "submitter_donor_id": "DONOR_2",
        "program_id": "SYNTHETIC-2",
        "gender": "Male",
        "date_of_birth": "1980-01"
    })).await;

    seed(app, "/v2/ingest/primary_diagnosis/", json!({
        "submitter_primary_diagnosis_id": "DIAG_1",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "date_of_diagnosis": "2010-06",
        "cancer_type_code": "C50.1",
        "basis_of_diagnosis": "Histology of a primary tumour"
    })).await;

    seed(app, "/v2/ingest/specimen/", json!({
        "submitter_specimen_id": "SPEC_1",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_primary_diagnosis_id": "DIAG_1",
        "specimen_storage": "Frozen in liquid nitrogen"
    })).await;

    seed(app, "/v2/ingest/sample_registration/", json!({
        "submitter_sample_id": "SAMPLE_1",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_specimen_id": "SPEC_1",
        "sample_type": "Total DNA"
    })).await;

    seed(app, "/v2/ingest/treatment/", json!({
        "submitter_treatment_id": "TREAT_1",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_primary_diagnosis_id": "DIAG_1",
        "treatment_type": ["Chemotherapy"]
    })).await;

    seed(app, "/v2/ingest/chemotherapy/", json!({
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_treatment_id": "TREAT_1",
        "drug_name": "Cisplatin"
    })).await;

    // Follow-ups at all three attachment levels
    seed(app, "/v2/ingest/follow_up/", json!({
        "submitter_follow_up_id": "FU_DONOR",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1"
    })).await;
    seed(app, "/v2/ingest/follow_up/", json!({
        "submitter_follow_up_id": "FU_DIAG",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_primary_diagnosis_id": "DIAG_1"
    })).await;
    seed(app, "/v2/ingest/follow_up/", json!({
        "submitter_follow_up_id": "FU_TREAT",
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "submitter_primary_diagnosis_id": "DIAG_1",
        "submitter_treatment_id": "TREAT_1"
    })).await;

    seed(app, "/v2/ingest/biomarker/", json!({
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "er_status": "Positive"
    })).await;
    seed(app, "/v2/ingest/comorbidity/", json!({
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "comorbidity_type_code": "E11"
    })).await;
    seed(app, "/v2/ingest/exposure/", json!({
        "program_id": "SYNTHETIC-1",
        "submitter_donor_id": "DONOR_1",
        "tobacco_smoking_status": "Lifelong non-smoker"
    })).await;
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "katsu-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_service_info_is_static() {
    let (app, _dir) = setup_app().await;

    let (status, first) = send(&app, get_request("/v2/service-info", None)).await;
    assert_eq!(status, StatusCode::OK);
    for field in ["id", "name", "type", "description", "contactUrl", "version"] {
        assert!(first[field].is_string(), "missing field {}", field);
    }
    assert!(first["organization"]["name"].is_string());
    assert!(first["organization"]["url"].is_string());

    let (_, second) = send(&app, get_request("/v2/service-info", None)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_docs_only_contain_discovery_and_authorized_routes() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, get_request("/v2/docs", None)).await;
    assert_eq!(status, StatusCode::OK);

    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(!endpoints.is_empty());
    for endpoint in endpoints {
        let path = endpoint["path"].as_str().unwrap();
        assert!(
            path.starts_with("/v2/discovery") || path.starts_with("/v2/authorized"),
            "unexpected path in docs: {}",
            path
        );
    }
    assert!(endpoints
        .iter()
        .any(|e| e["path"] == "/v2/authorized/donor_with_clinical_data/"));
}

// =============================================================================
// Authentication and authorization
// =============================================================================

#[tokio::test]
async fn test_authorized_routes_require_token() {
    let (app, _dir) = setup_app().await;

    let (status, body) = send(&app, get_request("/v2/authorized/donors/", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization required");

    let (status, _) = send(&app, get_request("/v2/authorized/donors/", Some("bogus"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_writes_require_admin_token() {
    let (app, _dir) = setup_app().await;

    let (status, _) = send(
        &app,
        post_json(
            "/v2/ingest/program/",
            READER_TOKEN,
            json!({"program_id": "P", "name": "n"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("DELETE")
        .uri("/v2/authorized/program/SYNTHETIC-1/")
        .header("Authorization", format!("Bearer {}", READER_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_program_scoping_limits_reads() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    // token_1 is granted SYNTHETIC-1 only
    let (status, body) = send(&app, get_request("/v2/authorized/donors/", Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["submitter_donor_id"], "DONOR_1");

    // token_2 sees both programs
    let (status, body) = send(&app, get_request("/v2/authorized/donors/", Some(READER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

// =============================================================================
// Clinical data reads
// =============================================================================

#[tokio::test]
async fn test_donor_filters() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    // A donor-id filter without a program is rejected
    let (status, body) = send(
        &app,
        get_request(
            "/v2/authorized/donors/?submitter_donor_id=DONOR_1",
            Some(READER_TOKEN),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "submitter_donor_id filter requires program_id");

    let (status, body) = send(
        &app,
        get_request(
            "/v2/authorized/donors/?submitter_donor_id=DONOR_1&program_id=SYNTHETIC-1",
            Some(READER_TOKEN),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    // Substring match on gender
    let (status, body) = send(
        &app,
        get_request("/v2/authorized/donors/?gender=fem", Some(READER_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["gender"], "Female");

    // Membership in the primary_site list
    let (status, body) = send(
        &app,
        get_request("/v2/authorized/donors/?primary_site=Breast", Some(READER_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["primary_site"][0], "Breast");
}

#[tokio::test]
async fn test_entity_list_endpoints_return_seeded_rows() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    for (uri, expected) in [
        ("/v2/authorized/programs/", 2),
        ("/v2/authorized/primary_diagnoses/", 1),
        ("/v2/authorized/specimens/", 1),
        ("/v2/authorized/sample_registrations/", 1),
        ("/v2/authorized/treatments/", 1),
        ("/v2/authorized/chemotherapies/", 1),
        ("/v2/authorized/follow_ups/", 3),
        ("/v2/authorized/biomarkers/", 1),
        ("/v2/authorized/comorbidities/", 1),
        ("/v2/authorized/exposures/", 1),
        ("/v2/authorized/hormone_therapies/", 0),
        ("/v2/authorized/immunotherapies/", 0),
        ("/v2/authorized/radiations/", 0),
        ("/v2/authorized/surgeries/", 0),
    ] {
        let (status, body) = send(&app, get_request(uri, Some(READER_TOKEN))).await;
        assert_eq!(status, StatusCode::OK, "{} failed", uri);
        assert_eq!(body["count"], expected, "{} count mismatch", uri);
    }

    // Filter by drug name
    let (status, body) = send(
        &app,
        get_request(
            "/v2/authorized/chemotherapies/?drug_name=Cisplatin",
            Some(READER_TOKEN),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_donor_with_clinical_data_nesting() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    let (status, donor) = send(
        &app,
        get_request(
            "/v2/authorized/donor_with_clinical_data/program/SYNTHETIC-1/donor/DONOR_1",
            Some(READER_TOKEN),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(donor["submitter_donor_id"], "DONOR_1");

    // Diagnosis carries its specimen (with sample) and treatment (with drug)
    let diagnosis = &donor["primary_diagnoses"][0];
    assert_eq!(diagnosis["submitter_primary_diagnosis_id"], "DIAG_1");
    assert_eq!(
        diagnosis["specimens"][0]["sample_registrations"][0]["submitter_sample_id"],
        "SAMPLE_1"
    );
    let treatment = &diagnosis["treatments"][0];
    assert_eq!(treatment["submitter_treatment_id"], "TREAT_1");
    assert_eq!(treatment["chemotherapies"][0]["drug_name"], "Cisplatin");

    // Follow-ups land at the right level
    assert_eq!(donor["followups"].as_array().unwrap().len(), 1);
    assert_eq!(donor["followups"][0]["submitter_follow_up_id"], "FU_DONOR");
    assert_eq!(diagnosis["followups"][0]["submitter_follow_up_id"], "FU_DIAG");
    assert_eq!(treatment["followups"][0]["submitter_follow_up_id"], "FU_TREAT");

    // Donor-level collections
    assert_eq!(donor["biomarkers"][0]["er_status"], "Positive");
    assert_eq!(donor["comorbidities"][0]["comorbidity_type_code"], "E11");
    assert_eq!(donor["exposures"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_donor_with_clinical_data_list_and_access() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    // The load-test target: paginated nested donors
    let (status, body) = send(
        &app,
        get_request("/v2/authorized/donor_with_clinical_data/", Some(READER_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    // token_1 cannot reach a SYNTHETIC-2 donor
    let (status, body) = send(
        &app,
        get_request(
            "/v2/authorized/donor_with_clinical_data/program/SYNTHETIC-2/donor/DONOR_2",
            Some(ADMIN_TOKEN),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Donor matching query does not exist or inaccessible");
}

// =============================================================================
// Ingest
// =============================================================================

#[tokio::test]
async fn test_ingest_rejects_invalid_extra_properties() {
    let (app, _dir) = setup_app().await;
    seed(&app, "/v2/ingest/program/", json!({"program_id": "SYNTHETIC-1", "name": "One"})).await;

    // age_group must be a string per the configured donor extension schema
    let (status, body) = send(
        &app,
        post_json(
            "/v2/ingest/donor/",
            ADMIN_TOKEN,
            json!({
                "submitter_donor_id": "DONOR_X",
                "program_id": "SYNTHETIC-1",
                "extra_properties": { "age_group": 42 }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Not valid JSON schema for this field.");

    // Nothing was written
    let (_, body) = send(&app, get_request("/v2/authorized/donors/", Some(READER_TOKEN))).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_ingest_rejects_duplicate_and_orphan_rows() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    // Duplicate primary key
    let (status, body) = send(
        &app,
        post_json(
            "/v2/ingest/program/",
            ADMIN_TOKEN,
            json!({"program_id": "SYNTHETIC-1", "name": "Duplicate"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    // Donor referencing a program that does not exist
    let (status, _) = send(
        &app,
        post_json(
            "/v2/ingest/donor/",
            ADMIN_TOKEN,
            json!({"submitter_donor_id": "DONOR_9", "program_id": "NO-SUCH-PROGRAM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_program_cascades() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/v2/authorized/program/SYNTHETIC-1/")
        .header("Authorization", format!("Bearer {}", ADMIN_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Everything under the program is gone; SYNTHETIC-2 is untouched
    let (_, body) = send(&app, get_request("/v2/authorized/donors/", Some(READER_TOKEN))).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["program_id"], "SYNTHETIC-2");
    let (_, body) = send(&app, get_request("/v2/authorized/treatments/", Some(READER_TOKEN))).await;
    assert_eq!(body["count"], 0);

    // Deleting it again is a 404
    let request = Request::builder()
        .method("DELETE")
        .uri("/v2/authorized/program/SYNTHETIC-1/")
        .header("Authorization", format!("Bearer {}", ADMIN_TOKEN))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Program matching query does not exist");
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_discovery_requires_no_token() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    let (status, body) = send(&app, get_request("/v2/discovery/programs/", None)).await;
    assert_eq!(status, StatusCode::OK);
    let cohorts = body["cohort_list"].as_array().unwrap();
    assert_eq!(cohorts.len(), 2);

    let (status, body) = send(&app, get_request("/v2/discovery/donors/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donors_by_cohort"]["SYNTHETIC-1"], 1);
    assert_eq!(body["donors_by_cohort"]["SYNTHETIC-2"], 1);

    // Entity-level counts are distinct-donor counts, not row counts
    let (_, body) = send(&app, get_request("/v2/discovery/follow_ups/", None)).await;
    assert_eq!(body["donors_by_cohort"]["SYNTHETIC-1"], 1);
}

#[tokio::test]
async fn test_overview_counts() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    let (_, body) = send(&app, get_request("/v2/discovery/overview/cohort_count/", None)).await;
    assert_eq!(body["cohort_count"], 2);

    let (_, body) = send(&app, get_request("/v2/discovery/overview/individual_count/", None)).await;
    assert_eq!(body["individual_count"], 2);

    let (_, body) = send(&app, get_request("/v2/discovery/overview/gender_count/", None)).await;
    assert_eq!(body["Female"], 1);
    assert_eq!(body["Male"], 1);

    let (_, body) = send(&app, get_request("/v2/discovery/overview/cancer_type_count/", None)).await;
    assert_eq!(body["Breast"], 1);
    // DONOR_2 has no primary_site list
    assert_eq!(body["null"], 1);

    let (_, body) = send(&app, get_request("/v2/discovery/overview/treatment_type_count/", None)).await;
    assert_eq!(body["Chemotherapy"], 1);

    // DONOR_1: born 1970-06, first diagnosis 2010-06 -> age 40
    let (_, body) = send(&app, get_request("/v2/discovery/overview/diagnosis_age_count/", None)).await;
    assert_eq!(body["40-49"], 1);

    let (_, body) = send(&app, get_request("/v2/discovery/overview/patients_per_cohort/", None)).await;
    assert_eq!(body["SYNTHETIC-1"], 1);
    assert_eq!(body["SYNTHETIC-2"], 1);
}

#[tokio::test]
async fn test_sidebar_list() {
    let (app, _dir) = setup_app().await;
    seed_clinical_data(&app).await;

    let (status, body) = send(&app, get_request("/v2/discovery/sidebar_list/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["treatment_types"]
        .as_array()
        .unwrap()
        .contains(&json!("Chemotherapy")));
    assert!(body["tumour_primary_sites"]
        .as_array()
        .unwrap()
        .contains(&json!("Breast")));
    assert_eq!(body["chemotherapy_drug_names"][0], "Cisplatin");
    assert!(body["immunotherapy_drug_names"].as_array().unwrap().is_empty());
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_pagination_bounds() {
    let (app, _dir) = setup_app().await;
    seed(&app, "/v2/ingest/program/", json!({"program_id": "SYNTHETIC-1", "name": "One"})).await;
    for i in 0..5 {
        seed(
            &app,
            "/v2/ingest/donor/",
            json!({
                "submitter_donor_id": format!("DONOR_{}", i),
                "program_id": "SYNTHETIC-1"
            }),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        get_request("/v2/authorized/donors/?page=2&page_size=2", Some(READER_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    // Out-of-bounds page clamps to the last page
    let (_, body) = send(
        &app,
        get_request("/v2/authorized/donors/?page=99&page_size=2", Some(READER_TOKEN)),
    )
    .await;
    assert_eq!(body["page"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Allowed hosts
// =============================================================================

#[tokio::test]
async fn test_host_guard() {
    let (app, _dir) = setup_app().await;

    // Unknown host is rejected
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("Host", "evil.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Host not allowed: evil.example.com");

    // Base host passes, port is ignored
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("Host", "localhost:8008")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    // Host added through the container-name overlay passes too
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("Host", "container-9")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}
