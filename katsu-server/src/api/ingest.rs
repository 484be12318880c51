//! Ingest endpoints for clinical records
//!
//! Admin-only creation of one record per request. Donor and specimen
//! payloads may carry an `extra_properties` object, validated here against
//! the configured extension schema before anything is written.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use katsu_common::db::models::{
    Biomarker, Chemotherapy, Comorbidity, Donor, Exposure, FollowUp, HormoneTherapy,
    Immunotherapy, PrimaryDiagnosis, Program, Radiation, SampleRegistration, Specimen, Surgery,
    Treatment,
};
use katsu_common::schema::{schema_for, SchemaType};

use crate::AppState;

/// Ingest error: constraint violations surface as 400 with a `detail`
/// message, mirroring the read side's `error` envelope
#[derive(Debug)]
pub enum IngestError {
    BadRequest(String),
    Internal(String),
}

impl IngestError {
    fn db(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => IngestError::BadRequest(db_err.to_string()),
            other => IngestError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            IngestError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            IngestError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

fn created(label: String) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::CREATED, Json(json!({ "created": label })))
}

/// Validate a payload's extra_properties against the configured schema for
/// its record kind, if one is configured
fn check_extension(
    state: &AppState,
    schema_type: SchemaType,
    extra: Option<&serde_json::Value>,
) -> Result<(), IngestError> {
    if let Some(schema) = schema_for(&state.config.extension_schemas, schema_type) {
        schema
            .check_extra_properties(extra)
            .map_err(|e| IngestError::BadRequest(e.to_string()))?;
    }
    Ok(())
}

/// POST /v2/ingest/program/
pub async fn create_program(
    State(state): State<AppState>,
    Json(payload): Json<Program>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO programs (program_id, name, created, updated) VALUES (?, ?, ?, ?)")
        .bind(&payload.program_id)
        .bind(&payload.name)
        .bind(&now)
        .bind(&now)
        .execute(&state.db)
        .await
        .map_err(IngestError::db)?;

    Ok(created(format!("Program ID: {}", payload.program_id)))
}

/// POST /v2/ingest/donor/
pub async fn create_donor(
    State(state): State<AppState>,
    Json(payload): Json<Donor>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    check_extension(
        &state,
        SchemaType::Donor,
        payload.extra_properties.as_ref().map(|j| &j.0),
    )?;

    sqlx::query(
        "INSERT INTO donors (submitter_donor_id, program_id, gender, sex_at_birth, \
         is_deceased, cause_of_death, date_of_birth, date_of_death, \
         lost_to_followup_after_clinical_event_identifier, lost_to_followup_reason, \
         date_alive_after_lost_to_followup, primary_site, extra_properties) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_donor_id)
    .bind(&payload.program_id)
    .bind(&payload.gender)
    .bind(&payload.sex_at_birth)
    .bind(payload.is_deceased)
    .bind(&payload.cause_of_death)
    .bind(&payload.date_of_birth)
    .bind(&payload.date_of_death)
    .bind(&payload.lost_to_followup_after_clinical_event_identifier)
    .bind(&payload.lost_to_followup_reason)
    .bind(&payload.date_alive_after_lost_to_followup)
    .bind(&payload.primary_site)
    .bind(&payload.extra_properties)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!("Donor ID: {}", payload.submitter_donor_id)))
}

/// POST /v2/ingest/primary_diagnosis/
pub async fn create_primary_diagnosis(
    State(state): State<AppState>,
    Json(payload): Json<PrimaryDiagnosis>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO primary_diagnoses (submitter_primary_diagnosis_id, program_id, \
         submitter_donor_id, date_of_diagnosis, cancer_type_code, basis_of_diagnosis, \
         laterality, lymph_nodes_examined_status, lymph_nodes_examined_method, \
         number_lymph_nodes_positive, clinical_tumour_staging_system, clinical_t_category, \
         clinical_n_category, clinical_m_category, clinical_stage_group) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_primary_diagnosis_id)
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.date_of_diagnosis)
    .bind(&payload.cancer_type_code)
    .bind(&payload.basis_of_diagnosis)
    .bind(&payload.laterality)
    .bind(&payload.lymph_nodes_examined_status)
    .bind(&payload.lymph_nodes_examined_method)
    .bind(payload.number_lymph_nodes_positive)
    .bind(&payload.clinical_tumour_staging_system)
    .bind(&payload.clinical_t_category)
    .bind(&payload.clinical_n_category)
    .bind(&payload.clinical_m_category)
    .bind(&payload.clinical_stage_group)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "PrimaryDiagnosis ID: {}",
        payload.submitter_primary_diagnosis_id
    )))
}

/// POST /v2/ingest/specimen/
pub async fn create_specimen(
    State(state): State<AppState>,
    Json(payload): Json<Specimen>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    check_extension(
        &state,
        SchemaType::Specimen,
        payload.extra_properties.as_ref().map(|j| &j.0),
    )?;

    sqlx::query(
        "INSERT INTO specimens (submitter_specimen_id, program_id, submitter_donor_id, \
         submitter_primary_diagnosis_id, pathological_tumour_staging_system, \
         pathological_t_category, pathological_n_category, pathological_m_category, \
         pathological_stage_group, specimen_collection_date, specimen_storage, \
         specimen_processing, tumour_histological_type, specimen_anatomic_location, \
         specimen_laterality, reference_pathology_confirmed_diagnosis, \
         reference_pathology_confirmed_tumour_presence, tumour_grading_system, tumour_grade, \
         percent_tumour_cells_range, percent_tumour_cells_measurement_method, extra_properties) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_specimen_id)
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_primary_diagnosis_id)
    .bind(&payload.pathological_tumour_staging_system)
    .bind(&payload.pathological_t_category)
    .bind(&payload.pathological_n_category)
    .bind(&payload.pathological_m_category)
    .bind(&payload.pathological_stage_group)
    .bind(&payload.specimen_collection_date)
    .bind(&payload.specimen_storage)
    .bind(&payload.specimen_processing)
    .bind(&payload.tumour_histological_type)
    .bind(&payload.specimen_anatomic_location)
    .bind(&payload.specimen_laterality)
    .bind(&payload.reference_pathology_confirmed_diagnosis)
    .bind(&payload.reference_pathology_confirmed_tumour_presence)
    .bind(&payload.tumour_grading_system)
    .bind(&payload.tumour_grade)
    .bind(&payload.percent_tumour_cells_range)
    .bind(&payload.percent_tumour_cells_measurement_method)
    .bind(&payload.extra_properties)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Specimen ID: {}",
        payload.submitter_specimen_id
    )))
}

/// POST /v2/ingest/sample_registration/
pub async fn create_sample_registration(
    State(state): State<AppState>,
    Json(payload): Json<SampleRegistration>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO sample_registrations (submitter_sample_id, program_id, \
         submitter_donor_id, submitter_specimen_id, specimen_tissue_source, \
         tumour_normal_designation, specimen_type, sample_type) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_sample_id)
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_specimen_id)
    .bind(&payload.specimen_tissue_source)
    .bind(&payload.tumour_normal_designation)
    .bind(&payload.specimen_type)
    .bind(&payload.sample_type)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "SampleRegistration ID: {}",
        payload.submitter_sample_id
    )))
}

/// POST /v2/ingest/treatment/
pub async fn create_treatment(
    State(state): State<AppState>,
    Json(payload): Json<Treatment>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO treatments (submitter_treatment_id, program_id, submitter_donor_id, \
         submitter_primary_diagnosis_id, treatment_type, is_primary_treatment, \
         line_of_treatment, treatment_start_date, treatment_end_date, treatment_setting, \
         treatment_intent, days_per_cycle, number_of_cycles, \
         response_to_treatment_criteria_method, response_to_treatment, status_of_treatment) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_primary_diagnosis_id)
    .bind(&payload.treatment_type)
    .bind(&payload.is_primary_treatment)
    .bind(payload.line_of_treatment)
    .bind(&payload.treatment_start_date)
    .bind(&payload.treatment_end_date)
    .bind(&payload.treatment_setting)
    .bind(&payload.treatment_intent)
    .bind(payload.days_per_cycle)
    .bind(payload.number_of_cycles)
    .bind(&payload.response_to_treatment_criteria_method)
    .bind(&payload.response_to_treatment)
    .bind(&payload.status_of_treatment)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Treatment ID: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/chemotherapy/
pub async fn create_chemotherapy(
    State(state): State<AppState>,
    Json(payload): Json<Chemotherapy>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO chemotherapies (uuid, program_id, submitter_donor_id, \
         submitter_treatment_id, drug_reference_database, drug_name, \
         drug_reference_identifier, chemotherapy_drug_dose_units, \
         prescribed_cumulative_drug_dose, actual_cumulative_drug_dose) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.drug_reference_database)
    .bind(&payload.drug_name)
    .bind(&payload.drug_reference_identifier)
    .bind(&payload.chemotherapy_drug_dose_units)
    .bind(payload.prescribed_cumulative_drug_dose)
    .bind(payload.actual_cumulative_drug_dose)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Chemotherapy for treatment: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/hormone_therapy/
pub async fn create_hormone_therapy(
    State(state): State<AppState>,
    Json(payload): Json<HormoneTherapy>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO hormone_therapies (uuid, program_id, submitter_donor_id, \
         submitter_treatment_id, drug_reference_database, drug_name, \
         drug_reference_identifier, hormone_drug_dose_units, \
         prescribed_cumulative_drug_dose, actual_cumulative_drug_dose) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.drug_reference_database)
    .bind(&payload.drug_name)
    .bind(&payload.drug_reference_identifier)
    .bind(&payload.hormone_drug_dose_units)
    .bind(payload.prescribed_cumulative_drug_dose)
    .bind(payload.actual_cumulative_drug_dose)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "HormoneTherapy for treatment: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/immunotherapy/
pub async fn create_immunotherapy(
    State(state): State<AppState>,
    Json(payload): Json<Immunotherapy>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO immunotherapies (uuid, program_id, submitter_donor_id, \
         submitter_treatment_id, immunotherapy_type, drug_reference_database, drug_name, \
         drug_reference_identifier, immunotherapy_drug_dose_units, \
         prescribed_cumulative_drug_dose, actual_cumulative_drug_dose) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.immunotherapy_type)
    .bind(&payload.drug_reference_database)
    .bind(&payload.drug_name)
    .bind(&payload.drug_reference_identifier)
    .bind(&payload.immunotherapy_drug_dose_units)
    .bind(payload.prescribed_cumulative_drug_dose)
    .bind(payload.actual_cumulative_drug_dose)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Immunotherapy for treatment: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/radiation/
pub async fn create_radiation(
    State(state): State<AppState>,
    Json(payload): Json<Radiation>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO radiations (uuid, program_id, submitter_donor_id, \
         submitter_treatment_id, radiation_therapy_modality, radiation_therapy_type, \
         radiation_therapy_fractions, radiation_therapy_dosage, anatomical_site_irradiated, \
         radiation_boost, reference_radiation_treatment_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.radiation_therapy_modality)
    .bind(&payload.radiation_therapy_type)
    .bind(payload.radiation_therapy_fractions)
    .bind(payload.radiation_therapy_dosage)
    .bind(&payload.anatomical_site_irradiated)
    .bind(payload.radiation_boost)
    .bind(&payload.reference_radiation_treatment_id)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Radiation for treatment: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/surgery/
pub async fn create_surgery(
    State(state): State<AppState>,
    Json(payload): Json<Surgery>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO surgeries (uuid, program_id, submitter_donor_id, \
         submitter_treatment_id, surgery_type, surgery_site, surgery_location, \
         tumour_length, tumour_width, greatest_dimension_tumour, tumour_focality, \
         residual_tumour_classification, margin_types_involved, margin_types_not_involved, \
         margin_types_not_assessed, lymphovascular_invasion, perineural_invasion) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.surgery_type)
    .bind(&payload.surgery_site)
    .bind(&payload.surgery_location)
    .bind(payload.tumour_length)
    .bind(payload.tumour_width)
    .bind(payload.greatest_dimension_tumour)
    .bind(&payload.tumour_focality)
    .bind(&payload.residual_tumour_classification)
    .bind(&payload.margin_types_involved)
    .bind(&payload.margin_types_not_involved)
    .bind(&payload.margin_types_not_assessed)
    .bind(&payload.lymphovascular_invasion)
    .bind(&payload.perineural_invasion)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Surgery for treatment: {}",
        payload.submitter_treatment_id
    )))
}

/// POST /v2/ingest/follow_up/
pub async fn create_follow_up(
    State(state): State<AppState>,
    Json(payload): Json<FollowUp>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO follow_ups (submitter_follow_up_id, program_id, submitter_donor_id, \
         submitter_primary_diagnosis_id, submitter_treatment_id, date_of_followup, \
         date_of_relapse, disease_status_at_followup, relapse_type, \
         method_of_progression_status, anatomic_site_progression_or_recurrence, \
         recurrence_tumour_staging_system, recurrence_t_category, recurrence_n_category, \
         recurrence_m_category, recurrence_stage_group) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.submitter_follow_up_id)
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_primary_diagnosis_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.date_of_followup)
    .bind(&payload.date_of_relapse)
    .bind(&payload.disease_status_at_followup)
    .bind(&payload.relapse_type)
    .bind(&payload.method_of_progression_status)
    .bind(&payload.anatomic_site_progression_or_recurrence)
    .bind(&payload.recurrence_tumour_staging_system)
    .bind(&payload.recurrence_t_category)
    .bind(&payload.recurrence_n_category)
    .bind(&payload.recurrence_m_category)
    .bind(&payload.recurrence_stage_group)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "FollowUp ID: {}",
        payload.submitter_follow_up_id
    )))
}

/// POST /v2/ingest/biomarker/
pub async fn create_biomarker(
    State(state): State<AppState>,
    Json(payload): Json<Biomarker>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO biomarkers (uuid, program_id, submitter_donor_id, \
         submitter_specimen_id, submitter_primary_diagnosis_id, submitter_treatment_id, \
         submitter_follow_up_id, test_date, psa_level, ca125, cea, er_status, pr_status, \
         her2_ihc_status, her2_ish_status, hpv_ihc_status, hpv_pcr_status, hpv_strain) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.submitter_specimen_id)
    .bind(&payload.submitter_primary_diagnosis_id)
    .bind(&payload.submitter_treatment_id)
    .bind(&payload.submitter_follow_up_id)
    .bind(&payload.test_date)
    .bind(payload.psa_level)
    .bind(payload.ca125)
    .bind(payload.cea)
    .bind(&payload.er_status)
    .bind(&payload.pr_status)
    .bind(&payload.her2_ihc_status)
    .bind(&payload.her2_ish_status)
    .bind(&payload.hpv_ihc_status)
    .bind(&payload.hpv_pcr_status)
    .bind(&payload.hpv_strain)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Biomarker for donor: {}",
        payload.submitter_donor_id
    )))
}

/// POST /v2/ingest/comorbidity/
pub async fn create_comorbidity(
    State(state): State<AppState>,
    Json(payload): Json<Comorbidity>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO comorbidities (uuid, program_id, submitter_donor_id, \
         prior_malignancy, laterality_of_prior_malignancy, age_at_comorbidity_diagnosis, \
         comorbidity_type_code, comorbidity_treatment_status, comorbidity_treatment) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.prior_malignancy)
    .bind(&payload.laterality_of_prior_malignancy)
    .bind(payload.age_at_comorbidity_diagnosis)
    .bind(&payload.comorbidity_type_code)
    .bind(&payload.comorbidity_treatment_status)
    .bind(&payload.comorbidity_treatment)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Comorbidity for donor: {}",
        payload.submitter_donor_id
    )))
}

/// POST /v2/ingest/exposure/
pub async fn create_exposure(
    State(state): State<AppState>,
    Json(payload): Json<Exposure>,
) -> Result<(StatusCode, Json<serde_json::Value>), IngestError> {
    sqlx::query(
        "INSERT INTO exposures (uuid, program_id, submitter_donor_id, \
         tobacco_smoking_status, tobacco_type, pack_years_smoked) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&payload.program_id)
    .bind(&payload.submitter_donor_id)
    .bind(&payload.tobacco_smoking_status)
    .bind(&payload.tobacco_type)
    .bind(payload.pack_years_smoked)
    .execute(&state.db)
    .await
    .map_err(IngestError::db)?;

    Ok(created(format!(
        "Exposure for donor: {}",
        payload.submitter_donor_id
    )))
}
