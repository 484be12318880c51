//! Authorized clinical data endpoints
//!
//! Every route here is scoped to the caller's authorized programs (attached
//! by the auth middleware) on top of any caller-supplied filters, so a token
//! can never read outside its grant. Results are paginated.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use katsu_common::db::models::{
    Biomarker, Chemotherapy, Comorbidity, Donor, Exposure, FollowUp, HormoneTherapy,
    Immunotherapy, PrimaryDiagnosis, Program, Radiation, SampleRegistration, Specimen, Surgery,
    Treatment,
};

use crate::api::auth::AuthContext;
use crate::api::ApiError;
use crate::pagination::{calculate_pagination, ListResponse, PageQuery};
use crate::AppState;

/// WHERE-clause builder for list queries.
///
/// Identifiers are compile-time constants; only values are bound, so the
/// generated SQL never embeds caller input.
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    binds: Vec<String>,
}

impl SqlFilter {
    /// Start from the program scope of the caller's grant. An empty grant
    /// matches nothing.
    pub(crate) fn scoped(programs: &[String]) -> Self {
        let mut filter = SqlFilter {
            clauses: Vec::new(),
            binds: Vec::new(),
        };
        if programs.is_empty() {
            filter.clauses.push("1 = 0".to_string());
        } else {
            let placeholders = vec!["?"; programs.len()].join(", ");
            filter
                .clauses
                .push(format!("program_id IN ({})", placeholders));
            filter.binds.extend(programs.iter().cloned());
        }
        filter
    }

    pub(crate) fn eq(&mut self, column: &'static str, value: &Option<String>) {
        if let Some(v) = value {
            self.clauses.push(format!("{} = ?", column));
            self.binds.push(v.clone());
        }
    }

    /// Case-insensitive substring match
    pub(crate) fn like(&mut self, column: &'static str, value: &Option<String>) {
        if let Some(v) = value {
            self.clauses.push(format!("{} LIKE ?", column));
            self.binds.push(format!("%{}%", v));
        }
    }

    /// Membership test against a JSON-array TEXT column
    pub(crate) fn json_contains(&mut self, column: &'static str, value: &Option<String>) {
        if let Some(v) = value {
            self.clauses.push(format!("{} LIKE ?", column));
            self.binds.push(format!("%{}%", serde_json::json!(v)));
        }
    }

    pub(crate) fn eq_i64(&mut self, column: &'static str, value: Option<i64>) {
        if let Some(v) = value {
            self.clauses.push(format!("{} = {}", column, v));
        }
    }

    pub(crate) fn eq_bool(&mut self, column: &'static str, value: Option<bool>) {
        if let Some(v) = value {
            self.clauses.push(format!("{} = {}", column, i64::from(v)));
        }
    }

    fn where_sql(&self) -> String {
        format!(" WHERE {}", self.clauses.join(" AND "))
    }
}

/// Count matching rows, then fetch one page of them
pub(crate) async fn fetch_page<T>(
    db: &SqlitePool,
    table: &'static str,
    filter: &SqlFilter,
    page: PageQuery,
) -> Result<ListResponse<T>, ApiError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let where_sql = filter.where_sql();

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", table, where_sql);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &filter.binds {
        count_query = count_query.bind(bind);
    }
    let count = count_query.fetch_one(db).await.map_err(ApiError::db)?;

    let p = calculate_pagination(count, page);
    let rows_sql = format!(
        "SELECT * FROM {}{} ORDER BY rowid LIMIT {} OFFSET {}",
        table, where_sql, p.page_size, p.offset
    );
    let mut rows_query = sqlx::query_as::<_, T>(&rows_sql);
    for bind in &filter.binds {
        rows_query = rows_query.bind(bind);
    }
    let items = rows_query.fetch_all(db).await.map_err(ApiError::db)?;

    Ok(ListResponse {
        count,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        items,
    })
}

/// A submitter_donor_id filter is ambiguous across programs; reject it
/// unless the program is pinned too.
fn require_donor_with_program(
    submitter_donor_id: &Option<String>,
    program_id: &Option<String>,
) -> Result<(), ApiError> {
    if submitter_donor_id.is_some() && program_id.is_none() {
        return Err(ApiError::BadRequest(
            "submitter_donor_id filter requires program_id".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProgramFilters {
    pub program_id: Option<String>,
}

pub async fn list_programs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ProgramFilters>,
) -> Result<Json<ListResponse<Program>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    Ok(Json(fetch_page(&state.db, "programs", &f, page).await?))
}

/// DELETE /v2/authorized/program/:program_id/
///
/// Admin only (enforced by the auth middleware for unsafe methods). Cascades
/// through every clinical table below the program.
pub async fn delete_program(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM programs WHERE program_id = ?")
        .bind(&program_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::db)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(
            "Program matching query does not exist".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DonorFilters {
    pub submitter_donor_id: Option<String>,
    pub program_id: Option<String>,
    pub gender: Option<String>,
    pub sex_at_birth: Option<String>,
    pub is_deceased: Option<bool>,
    pub cause_of_death: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub primary_site: Option<String>,
}

pub async fn list_donors(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<DonorFilters>,
) -> Result<Json<ListResponse<Donor>>, ApiError> {
    require_donor_with_program(&filters.submitter_donor_id, &filters.program_id)?;

    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.like("gender", &filters.gender);
    f.eq("sex_at_birth", &filters.sex_at_birth);
    f.eq_bool("is_deceased", filters.is_deceased);
    f.eq("cause_of_death", &filters.cause_of_death);
    f.eq("date_of_birth", &filters.date_of_birth);
    f.eq("date_of_death", &filters.date_of_death);
    f.json_contains("primary_site", &filters.primary_site);
    Ok(Json(fetch_page(&state.db, "donors", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Primary diagnoses
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PrimaryDiagnosisFilters {
    pub submitter_primary_diagnosis_id: Option<String>,
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub date_of_diagnosis: Option<String>,
    pub cancer_type_code: Option<String>,
    pub basis_of_diagnosis: Option<String>,
    pub laterality: Option<String>,
    pub clinical_tumour_staging_system: Option<String>,
    pub clinical_t_category: Option<String>,
    pub clinical_n_category: Option<String>,
    pub clinical_m_category: Option<String>,
    pub clinical_stage_group: Option<String>,
    pub number_lymph_nodes_positive: Option<i64>,
}

pub async fn list_primary_diagnoses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<PrimaryDiagnosisFilters>,
) -> Result<Json<ListResponse<PrimaryDiagnosis>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("submitter_primary_diagnosis_id", &filters.submitter_primary_diagnosis_id);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("date_of_diagnosis", &filters.date_of_diagnosis);
    f.eq("cancer_type_code", &filters.cancer_type_code);
    f.eq("basis_of_diagnosis", &filters.basis_of_diagnosis);
    f.eq("laterality", &filters.laterality);
    f.eq("clinical_tumour_staging_system", &filters.clinical_tumour_staging_system);
    f.eq("clinical_t_category", &filters.clinical_t_category);
    f.eq("clinical_n_category", &filters.clinical_n_category);
    f.eq("clinical_m_category", &filters.clinical_m_category);
    f.eq("clinical_stage_group", &filters.clinical_stage_group);
    f.eq_i64("number_lymph_nodes_positive", filters.number_lymph_nodes_positive);
    Ok(Json(fetch_page(&state.db, "primary_diagnoses", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Specimens
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SpecimenFilters {
    pub submitter_specimen_id: Option<String>,
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub specimen_collection_date: Option<String>,
    pub specimen_storage: Option<String>,
    pub specimen_processing: Option<String>,
    pub tumour_histological_type: Option<String>,
    pub specimen_laterality: Option<String>,
    pub tumour_grading_system: Option<String>,
    pub tumour_grade: Option<String>,
}

pub async fn list_specimens(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<SpecimenFilters>,
) -> Result<Json<ListResponse<Specimen>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("submitter_specimen_id", &filters.submitter_specimen_id);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_primary_diagnosis_id", &filters.submitter_primary_diagnosis_id);
    f.eq("specimen_collection_date", &filters.specimen_collection_date);
    f.eq("specimen_storage", &filters.specimen_storage);
    f.eq("specimen_processing", &filters.specimen_processing);
    f.eq("tumour_histological_type", &filters.tumour_histological_type);
    f.eq("specimen_laterality", &filters.specimen_laterality);
    f.eq("tumour_grading_system", &filters.tumour_grading_system);
    f.eq("tumour_grade", &filters.tumour_grade);
    Ok(Json(fetch_page(&state.db, "specimens", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Sample registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SampleRegistrationFilters {
    pub submitter_sample_id: Option<String>,
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_specimen_id: Option<String>,
    pub specimen_tissue_source: Option<String>,
    pub tumour_normal_designation: Option<String>,
    pub specimen_type: Option<String>,
    pub sample_type: Option<String>,
}

pub async fn list_sample_registrations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<SampleRegistrationFilters>,
) -> Result<Json<ListResponse<SampleRegistration>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("submitter_sample_id", &filters.submitter_sample_id);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_specimen_id", &filters.submitter_specimen_id);
    f.eq("specimen_tissue_source", &filters.specimen_tissue_source);
    f.eq("tumour_normal_designation", &filters.tumour_normal_designation);
    f.eq("specimen_type", &filters.specimen_type);
    f.eq("sample_type", &filters.sample_type);
    Ok(Json(fetch_page(&state.db, "sample_registrations", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Treatments
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct TreatmentFilters {
    pub submitter_treatment_id: Option<String>,
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub treatment_type: Option<String>,
    pub is_primary_treatment: Option<String>,
    pub line_of_treatment: Option<i64>,
    pub treatment_setting: Option<String>,
    pub treatment_intent: Option<String>,
    pub response_to_treatment: Option<String>,
    pub status_of_treatment: Option<String>,
}

pub async fn list_treatments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<TreatmentFilters>,
) -> Result<Json<ListResponse<Treatment>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_primary_diagnosis_id", &filters.submitter_primary_diagnosis_id);
    f.json_contains("treatment_type", &filters.treatment_type);
    f.eq("is_primary_treatment", &filters.is_primary_treatment);
    f.eq_i64("line_of_treatment", filters.line_of_treatment);
    f.eq("treatment_setting", &filters.treatment_setting);
    f.eq("treatment_intent", &filters.treatment_intent);
    f.eq("response_to_treatment", &filters.response_to_treatment);
    f.eq("status_of_treatment", &filters.status_of_treatment);
    Ok(Json(fetch_page(&state.db, "treatments", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Drug therapies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DrugTherapyFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub drug_reference_database: Option<String>,
    pub drug_name: Option<String>,
    pub drug_reference_identifier: Option<String>,
}

fn drug_filter(auth: &AuthContext, filters: &DrugTherapyFilters) -> SqlFilter {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("drug_reference_database", &filters.drug_reference_database);
    f.eq("drug_name", &filters.drug_name);
    f.eq("drug_reference_identifier", &filters.drug_reference_identifier);
    f
}

pub async fn list_chemotherapies(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<DrugTherapyFilters>,
) -> Result<Json<ListResponse<Chemotherapy>>, ApiError> {
    let f = drug_filter(&auth, &filters);
    Ok(Json(fetch_page(&state.db, "chemotherapies", &f, page).await?))
}

pub async fn list_hormone_therapies(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<DrugTherapyFilters>,
) -> Result<Json<ListResponse<HormoneTherapy>>, ApiError> {
    let f = drug_filter(&auth, &filters);
    Ok(Json(fetch_page(&state.db, "hormone_therapies", &f, page).await?))
}

pub async fn list_immunotherapies(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<DrugTherapyFilters>,
) -> Result<Json<ListResponse<Immunotherapy>>, ApiError> {
    let f = drug_filter(&auth, &filters);
    Ok(Json(fetch_page(&state.db, "immunotherapies", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Radiations
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RadiationFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub radiation_therapy_modality: Option<String>,
    pub radiation_therapy_type: Option<String>,
    pub anatomical_site_irradiated: Option<String>,
}

pub async fn list_radiations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<RadiationFilters>,
) -> Result<Json<ListResponse<Radiation>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("radiation_therapy_modality", &filters.radiation_therapy_modality);
    f.eq("radiation_therapy_type", &filters.radiation_therapy_type);
    f.eq("anatomical_site_irradiated", &filters.anatomical_site_irradiated);
    Ok(Json(fetch_page(&state.db, "radiations", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Surgeries
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SurgeryFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub surgery_type: Option<String>,
    pub surgery_site: Option<String>,
    pub surgery_location: Option<String>,
}

pub async fn list_surgeries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<SurgeryFilters>,
) -> Result<Json<ListResponse<Surgery>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("surgery_type", &filters.surgery_type);
    f.eq("surgery_site", &filters.surgery_site);
    f.eq("surgery_location", &filters.surgery_location);
    Ok(Json(fetch_page(&state.db, "surgeries", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Follow-ups
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct FollowUpFilters {
    pub submitter_follow_up_id: Option<String>,
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub date_of_followup: Option<String>,
    pub disease_status_at_followup: Option<String>,
    pub relapse_type: Option<String>,
}

pub async fn list_follow_ups(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<FollowUpFilters>,
) -> Result<Json<ListResponse<FollowUp>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("submitter_follow_up_id", &filters.submitter_follow_up_id);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_primary_diagnosis_id", &filters.submitter_primary_diagnosis_id);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("date_of_followup", &filters.date_of_followup);
    f.eq("disease_status_at_followup", &filters.disease_status_at_followup);
    f.eq("relapse_type", &filters.relapse_type);
    Ok(Json(fetch_page(&state.db, "follow_ups", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Biomarkers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct BiomarkerFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub submitter_specimen_id: Option<String>,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub submitter_follow_up_id: Option<String>,
    pub test_date: Option<String>,
    pub er_status: Option<String>,
    pub pr_status: Option<String>,
    pub hpv_strain: Option<String>,
}

pub async fn list_biomarkers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<BiomarkerFilters>,
) -> Result<Json<ListResponse<Biomarker>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("submitter_specimen_id", &filters.submitter_specimen_id);
    f.eq("submitter_primary_diagnosis_id", &filters.submitter_primary_diagnosis_id);
    f.eq("submitter_treatment_id", &filters.submitter_treatment_id);
    f.eq("submitter_follow_up_id", &filters.submitter_follow_up_id);
    f.eq("test_date", &filters.test_date);
    f.eq("er_status", &filters.er_status);
    f.eq("pr_status", &filters.pr_status);
    f.json_contains("hpv_strain", &filters.hpv_strain);
    Ok(Json(fetch_page(&state.db, "biomarkers", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Comorbidities
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ComorbidityFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub prior_malignancy: Option<String>,
    pub comorbidity_type_code: Option<String>,
    pub comorbidity_treatment_status: Option<String>,
    pub age_at_comorbidity_diagnosis: Option<i64>,
}

pub async fn list_comorbidities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ComorbidityFilters>,
) -> Result<Json<ListResponse<Comorbidity>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("prior_malignancy", &filters.prior_malignancy);
    f.eq("comorbidity_type_code", &filters.comorbidity_type_code);
    f.eq("comorbidity_treatment_status", &filters.comorbidity_treatment_status);
    f.eq_i64("age_at_comorbidity_diagnosis", filters.age_at_comorbidity_diagnosis);
    Ok(Json(fetch_page(&state.db, "comorbidities", &f, page).await?))
}

// ---------------------------------------------------------------------------
// Exposures
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ExposureFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
    pub tobacco_smoking_status: Option<String>,
    pub tobacco_type: Option<String>,
}

pub async fn list_exposures(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ExposureFilters>,
) -> Result<Json<ListResponse<Exposure>>, ApiError> {
    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);
    f.eq("tobacco_smoking_status", &filters.tobacco_smoking_status);
    f.json_contains("tobacco_type", &filters.tobacco_type);
    Ok(Json(fetch_page(&state.db, "exposures", &f, page).await?))
}
