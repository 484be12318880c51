//! katsu-server library - clinical metadata HTTP API
//!
//! Routes are split in three groups, mirroring how tokens are checked:
//! - `/v2/authorized` - clinical data reads, bearer token required
//! - `/v2/ingest` - record creation, admin bearer token required
//! - `/v2/discovery` - aggregate counts only, no authentication
//!
//! `/health`, `/v2/service-info` and `/v2/docs` are public.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use katsu_common::config::ServerConfig;

pub mod api;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Immutable server configuration (grants, allowed hosts, schemas)
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: ServerConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};
    use tower_http::trace::TraceLayer;

    // Clinical data reads (bearer token)
    let authorized = Router::new()
        .route("/programs/", get(api::authorized::list_programs))
        .route("/donors/", get(api::authorized::list_donors))
        .route("/primary_diagnoses/", get(api::authorized::list_primary_diagnoses))
        .route("/specimens/", get(api::authorized::list_specimens))
        .route("/sample_registrations/", get(api::authorized::list_sample_registrations))
        .route("/treatments/", get(api::authorized::list_treatments))
        .route("/chemotherapies/", get(api::authorized::list_chemotherapies))
        .route("/hormone_therapies/", get(api::authorized::list_hormone_therapies))
        .route("/immunotherapies/", get(api::authorized::list_immunotherapies))
        .route("/radiations/", get(api::authorized::list_radiations))
        .route("/surgeries/", get(api::authorized::list_surgeries))
        .route("/follow_ups/", get(api::authorized::list_follow_ups))
        .route("/biomarkers/", get(api::authorized::list_biomarkers))
        .route("/comorbidities/", get(api::authorized::list_comorbidities))
        .route("/exposures/", get(api::authorized::list_exposures))
        .route(
            "/donor_with_clinical_data/",
            get(api::nested::list_donors_with_clinical_data),
        )
        .route(
            "/donor_with_clinical_data/program/:program_id/donor/:donor_id",
            get(api::nested::get_donor_with_clinical_data),
        )
        .route("/program/:program_id/", delete(api::authorized::delete_program))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    // Record creation (admin bearer token; the auth middleware rejects
    // non-admin tokens for unsafe methods)
    let ingest = Router::new()
        .route("/program/", post(api::ingest::create_program))
        .route("/donor/", post(api::ingest::create_donor))
        .route("/primary_diagnosis/", post(api::ingest::create_primary_diagnosis))
        .route("/specimen/", post(api::ingest::create_specimen))
        .route("/sample_registration/", post(api::ingest::create_sample_registration))
        .route("/treatment/", post(api::ingest::create_treatment))
        .route("/chemotherapy/", post(api::ingest::create_chemotherapy))
        .route("/hormone_therapy/", post(api::ingest::create_hormone_therapy))
        .route("/immunotherapy/", post(api::ingest::create_immunotherapy))
        .route("/radiation/", post(api::ingest::create_radiation))
        .route("/surgery/", post(api::ingest::create_surgery))
        .route("/follow_up/", post(api::ingest::create_follow_up))
        .route("/biomarker/", post(api::ingest::create_biomarker))
        .route("/comorbidity/", post(api::ingest::create_comorbidity))
        .route("/exposure/", post(api::ingest::create_exposure))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    // Aggregate counts only (no authentication)
    let discovery = Router::new()
        .route("/programs/", get(api::discovery::discover_programs))
        .route("/donors/", get(api::discovery::discover_donors))
        .route("/specimen/", get(api::discovery::discover_specimens))
        .route("/sample_registrations/", get(api::discovery::discover_sample_registrations))
        .route("/primary_diagnoses/", get(api::discovery::discover_primary_diagnoses))
        .route("/treatments/", get(api::discovery::discover_treatments))
        .route("/chemotherapies/", get(api::discovery::discover_chemotherapies))
        .route("/hormone_therapies/", get(api::discovery::discover_hormone_therapies))
        .route("/immunotherapies/", get(api::discovery::discover_immunotherapies))
        .route("/radiations/", get(api::discovery::discover_radiations))
        .route("/surgeries/", get(api::discovery::discover_surgeries))
        .route("/follow_ups/", get(api::discovery::discover_follow_ups))
        .route("/biomarkers/", get(api::discovery::discover_biomarkers))
        .route("/comorbidities/", get(api::discovery::discover_comorbidities))
        .route("/exposures/", get(api::discovery::discover_exposures))
        .route("/sidebar_list/", get(api::discovery::discover_sidebar_list))
        .route("/overview/cohort_count/", get(api::discovery::discover_cohort_count))
        .route("/overview/individual_count/", get(api::discovery::discover_individual_count))
        .route("/overview/patients_per_cohort/", get(api::discovery::discover_patients_per_cohort))
        .route("/overview/gender_count/", get(api::discovery::discover_gender_count))
        .route("/overview/cancer_type_count/", get(api::discovery::discover_cancer_type_count))
        .route("/overview/treatment_type_count/", get(api::discovery::discover_treatment_type_count))
        .route("/overview/diagnosis_age_count/", get(api::discovery::discover_diagnosis_age_count))
        ;

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/v2/service-info", get(api::service_info::service_info))
        .route("/v2/docs", get(api::docs::api_docs))
        .nest("/v2/authorized", authorized)
        .nest("/v2/ingest", ingest)
        .nest("/v2/discovery", discovery)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::host_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
