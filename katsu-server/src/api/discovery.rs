//! Discovery and overview endpoints
//!
//! Public API surface: no authentication, and nothing row-level ever leaves
//! these handlers - only donor counts and value lists for the summary page.

use std::collections::{BTreeMap, HashMap};

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::api::ApiError;
use crate::AppState;

/// Treatment types queryable from the sidebar
const TREATMENT_TYPES: &[&str] = &[
    "Bone marrow transplant",
    "Chemotherapy",
    "Hormonal therapy",
    "Immunotherapy",
    "No treatment",
    "Other targeting molecular therapy",
    "Photodynamic therapy",
    "Radiation therapy",
    "Stem cell transplant",
    "Surgery",
];

/// Tumour primary sites queryable from the sidebar
const PRIMARY_SITES: &[&str] = &[
    "Accessory sinuses",
    "Adrenal gland",
    "Anus and anal canal",
    "Base of tongue",
    "Bladder",
    "Bones, joints and articular cartilage of limbs",
    "Brain",
    "Breast",
    "Bronchus and lung",
    "Cervix uteri",
    "Colon",
    "Corpus uteri",
    "Esophagus",
    "Eye and adnexa",
    "Floor of mouth",
    "Gallbladder",
    "Gum",
    "Heart, mediastinum, and pleura",
    "Hematopoietic and reticuloendothelial systems",
    "Hypopharynx",
    "Kidney",
    "Larynx",
    "Lip",
    "Liver and intrahepatic bile ducts",
    "Lymph nodes",
    "Meninges",
    "Nasal cavity and middle ear",
    "Nasopharynx",
    "Oropharynx",
    "Other and ill-defined sites",
    "Other and unspecified female genital organs",
    "Other and unspecified major salivary glands",
    "Other and unspecified male genital organs",
    "Other and unspecified parts of biliary tract",
    "Other and unspecified parts of mouth",
    "Other and unspecified parts of tongue",
    "Other and unspecified urinary organs",
    "Other endocrine glands and related structures",
    "Ovary",
    "Palate",
    "Pancreas",
    "Parotid gland",
    "Penis",
    "Peripheral nerves and autonomic nervous system",
    "Placenta",
    "Prostate gland",
    "Pyriform sinus",
    "Rectosigmoid junction",
    "Rectum",
    "Renal pelvis",
    "Retroperitoneum and peritoneum",
    "Skin",
    "Small intestine",
    "Spinal cord, cranial nerves, and other parts of central nervous system",
    "Stomach",
    "Testis",
    "Thymus",
    "Thyroid gland",
    "Tonsil",
    "Trachea",
    "Unknown primary site",
    "Ureter",
    "Uterus, NOS",
    "Vagina",
    "Vulva",
];

#[derive(Debug, Serialize)]
pub struct ProgramDiscoverySchema {
    pub cohort_list: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverySchema {
    pub donors_by_cohort: BTreeMap<String, i64>,
}

/// Distinct donor count per program for any donor-linked table
async fn count_donors_by_program(
    db: &SqlitePool,
    table: &'static str,
) -> Result<DiscoverySchema, ApiError> {
    let sql = format!(
        "SELECT program_id, COUNT(DISTINCT submitter_donor_id) FROM {} \
         GROUP BY program_id ORDER BY program_id",
        table
    );
    let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
        .fetch_all(db)
        .await
        .map_err(ApiError::db)?;

    Ok(DiscoverySchema {
        donors_by_cohort: rows.into_iter().collect(),
    })
}

/// Count occurrences of each value; missing values land in the "null" bucket
fn count_terms(values: Vec<Option<String>>) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for value in values {
        let term = value.unwrap_or_else(|| "null".to_string());
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Like [`count_terms`] for JSON-array columns: every element of every array
/// is counted; a missing array counts once under "null"
fn count_list_terms(values: Vec<Option<String>>) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for value in values {
        let terms: Vec<String> = match value.as_deref() {
            Some(raw) => serde_json::from_str(raw).unwrap_or_default(),
            None => vec![],
        };
        if terms.is_empty() {
            *counts.entry("null".to_string()).or_insert(0) += 1;
        } else {
            for term in terms {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
    }
    counts
}

async fn fetch_column(
    db: &SqlitePool,
    sql: &str,
) -> Result<Vec<Option<String>>, ApiError> {
    sqlx::query_scalar::<_, Option<String>>(sql)
        .fetch_all(db)
        .await
        .map_err(ApiError::db)
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// GET /v2/discovery/programs/
pub async fn discover_programs(
    State(state): State<AppState>,
) -> Result<Json<ProgramDiscoverySchema>, ApiError> {
    let cohort_list: Vec<String> =
        sqlx::query_scalar("SELECT program_id FROM programs ORDER BY program_id")
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::db)?;

    Ok(Json(ProgramDiscoverySchema { cohort_list }))
}

macro_rules! discover_counts {
    ($name:ident, $table:literal) => {
        pub async fn $name(
            State(state): State<AppState>,
        ) -> Result<Json<DiscoverySchema>, ApiError> {
            Ok(Json(count_donors_by_program(&state.db, $table).await?))
        }
    };
}

discover_counts!(discover_donors, "donors");
discover_counts!(discover_specimens, "specimens");
discover_counts!(discover_sample_registrations, "sample_registrations");
discover_counts!(discover_primary_diagnoses, "primary_diagnoses");
discover_counts!(discover_treatments, "treatments");
discover_counts!(discover_chemotherapies, "chemotherapies");
discover_counts!(discover_hormone_therapies, "hormone_therapies");
discover_counts!(discover_immunotherapies, "immunotherapies");
discover_counts!(discover_radiations, "radiations");
discover_counts!(discover_surgeries, "surgeries");
discover_counts!(discover_follow_ups, "follow_ups");
discover_counts!(discover_biomarkers, "biomarkers");
discover_counts!(discover_comorbidities, "comorbidities");
discover_counts!(discover_exposures, "exposures");

/// GET /v2/discovery/sidebar_list/
///
/// Available values for the query-building sidebar, including for programs
/// the caller is not authorized to view (counts only, no row data).
pub async fn discover_sidebar_list(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chemotherapy_drug_names: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT drug_name FROM chemotherapies \
         WHERE drug_name IS NOT NULL ORDER BY drug_name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let immunotherapy_drug_names: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT drug_name FROM immunotherapies \
         WHERE drug_name IS NOT NULL ORDER BY drug_name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let hormone_therapy_drug_names: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT drug_name FROM hormone_therapies \
         WHERE drug_name IS NOT NULL ORDER BY drug_name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(json!({
        "treatment_types": TREATMENT_TYPES,
        "tumour_primary_sites": PRIMARY_SITES,
        "chemotherapy_drug_names": chemotherapy_drug_names,
        "immunotherapy_drug_names": immunotherapy_drug_names,
        "hormone_therapy_drug_names": hormone_therapy_drug_names,
    })))
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// GET /v2/discovery/overview/cohort_count/
pub async fn discover_cohort_count(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programs")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::db)?;
    Ok(Json(json!({ "cohort_count": count })))
}

/// GET /v2/discovery/overview/individual_count/
pub async fn discover_individual_count(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donors")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::db)?;
    Ok(Json(json!({ "individual_count": count })))
}

/// GET /v2/discovery/overview/patients_per_cohort/
pub async fn discover_patients_per_cohort(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let cohorts = fetch_column(&state.db, "SELECT program_id FROM donors").await?;
    Ok(Json(count_terms(cohorts)))
}

/// GET /v2/discovery/overview/gender_count/
pub async fn discover_gender_count(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let genders = fetch_column(&state.db, "SELECT gender FROM donors").await?;
    Ok(Json(count_terms(genders)))
}

/// GET /v2/discovery/overview/cancer_type_count/
pub async fn discover_cancer_type_count(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let sites = fetch_column(&state.db, "SELECT primary_site FROM donors").await?;
    Ok(Json(count_list_terms(sites)))
}

/// GET /v2/discovery/overview/treatment_type_count/
pub async fn discover_treatment_type_count(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let types = fetch_column(&state.db, "SELECT treatment_type FROM treatments").await?;
    Ok(Json(count_list_terms(types)))
}

/// Dates are submitted as YYYY-MM strings
fn parse_year_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok()
}

fn age_bucket(age: f64) -> &'static str {
    match age as i64 {
        i64::MIN..=19 => "0-19",
        20..=29 => "20-29",
        30..=39 => "30-39",
        40..=49 => "40-49",
        50..=59 => "50-59",
        60..=69 => "60-69",
        70..=79 => "70-79",
        _ => "80+",
    }
}

/// GET /v2/discovery/overview/diagnosis_age_count/
///
/// Age at first diagnosis per donor, bucketed by decade. Donors with an
/// unparseable birth or diagnosis date land in the "null" bucket.
pub async fn discover_diagnosis_age_count(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    // Earliest diagnosis date per donor
    let diagnosis_rows: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT submitter_donor_id, date_of_diagnosis FROM primary_diagnoses",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::db)?;

    let mut min_dates: HashMap<String, Option<NaiveDate>> = HashMap::new();
    for (donor, date) in diagnosis_rows {
        let parsed = date.as_deref().and_then(parse_year_month);
        let entry = min_dates.entry(donor).or_insert(None);
        *entry = match (*entry, parsed) {
            (Some(current), Some(new)) => Some(current.min(new)),
            (current, new) => current.or(new),
        };
    }

    let birth_rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT submitter_donor_id, date_of_birth FROM donors")
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::db)?;
    let birth_dates: HashMap<String, Option<NaiveDate>> = birth_rows
        .into_iter()
        .map(|(donor, date)| (donor, date.as_deref().and_then(parse_year_month)))
        .collect();

    let mut age_counts: BTreeMap<String, i64> = BTreeMap::new();
    for (donor, diagnosis_date) in min_dates {
        let bucket = match (birth_dates.get(&donor).copied().flatten(), diagnosis_date) {
            (Some(birth), Some(diagnosis)) => {
                let age = (diagnosis - birth).num_days() as f64 / 365.25;
                age_bucket(age)
            }
            _ => "null",
        };
        *age_counts.entry(bucket.to_string()).or_insert(0) += 1;
    }

    Ok(Json(age_counts))
}
