//! Donor-with-clinical-data assembly
//!
//! Builds the fully nested donor document: primary diagnoses carry their
//! specimens (with sample registrations) and treatments (with therapy and
//! surgery rows), follow-ups attach at donor, diagnosis or treatment level
//! depending on which parent ids they reference.

use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use katsu_common::db::models::{
    Biomarker, Chemotherapy, Comorbidity, Donor, Exposure, FollowUp, HormoneTherapy,
    Immunotherapy, PrimaryDiagnosis, Radiation, SampleRegistration, Specimen, Surgery, Treatment,
};

use crate::api::auth::AuthContext;
use crate::api::authorized::{fetch_page, SqlFilter};
use crate::api::ApiError;
use crate::pagination::{ListResponse, PageQuery};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NestedTreatment {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub chemotherapies: Vec<Chemotherapy>,
    pub hormone_therapies: Vec<HormoneTherapy>,
    pub immunotherapies: Vec<Immunotherapy>,
    pub radiations: Vec<Radiation>,
    pub surgeries: Vec<Surgery>,
    pub followups: Vec<FollowUp>,
}

#[derive(Debug, Serialize)]
pub struct NestedSpecimen {
    #[serde(flatten)]
    pub specimen: Specimen,
    pub sample_registrations: Vec<SampleRegistration>,
}

#[derive(Debug, Serialize)]
pub struct NestedPrimaryDiagnosis {
    #[serde(flatten)]
    pub primary_diagnosis: PrimaryDiagnosis,
    pub specimens: Vec<NestedSpecimen>,
    pub treatments: Vec<NestedTreatment>,
    pub followups: Vec<FollowUp>,
}

#[derive(Debug, Serialize)]
pub struct DonorWithClinicalData {
    #[serde(flatten)]
    pub donor: Donor,
    pub primary_diagnoses: Vec<NestedPrimaryDiagnosis>,
    /// Follow-ups tied to neither a diagnosis nor a treatment
    pub followups: Vec<FollowUp>,
    pub biomarkers: Vec<Biomarker>,
    pub exposures: Vec<Exposure>,
    pub comorbidities: Vec<Comorbidity>,
}

/// Fetch every row of one table belonging to one donor
async fn fetch_for_donor<T>(
    db: &SqlitePool,
    table: &'static str,
    program_id: &str,
    donor_id: &str,
) -> Result<Vec<T>, ApiError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {} WHERE program_id = ? AND submitter_donor_id = ? ORDER BY rowid",
        table
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(program_id)
        .bind(donor_id)
        .fetch_all(db)
        .await
        .map_err(ApiError::db)
}

fn group_by<T, F>(items: Vec<T>, key: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> String,
{
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

/// Assemble the nested document for one donor row
async fn assemble_donor(db: &SqlitePool, donor: Donor) -> Result<DonorWithClinicalData, ApiError> {
    let program_id = donor.program_id.clone();
    let donor_id = donor.submitter_donor_id.clone();

    let diagnoses: Vec<PrimaryDiagnosis> =
        fetch_for_donor(db, "primary_diagnoses", &program_id, &donor_id).await?;
    let specimens: Vec<Specimen> = fetch_for_donor(db, "specimens", &program_id, &donor_id).await?;
    let samples: Vec<SampleRegistration> =
        fetch_for_donor(db, "sample_registrations", &program_id, &donor_id).await?;
    let treatments: Vec<Treatment> =
        fetch_for_donor(db, "treatments", &program_id, &donor_id).await?;
    let chemotherapies: Vec<Chemotherapy> =
        fetch_for_donor(db, "chemotherapies", &program_id, &donor_id).await?;
    let hormone_therapies: Vec<HormoneTherapy> =
        fetch_for_donor(db, "hormone_therapies", &program_id, &donor_id).await?;
    let immunotherapies: Vec<Immunotherapy> =
        fetch_for_donor(db, "immunotherapies", &program_id, &donor_id).await?;
    let radiations: Vec<Radiation> = fetch_for_donor(db, "radiations", &program_id, &donor_id).await?;
    let surgeries: Vec<Surgery> = fetch_for_donor(db, "surgeries", &program_id, &donor_id).await?;
    let follow_ups: Vec<FollowUp> = fetch_for_donor(db, "follow_ups", &program_id, &donor_id).await?;
    let biomarkers: Vec<Biomarker> = fetch_for_donor(db, "biomarkers", &program_id, &donor_id).await?;
    let exposures: Vec<Exposure> = fetch_for_donor(db, "exposures", &program_id, &donor_id).await?;
    let comorbidities: Vec<Comorbidity> =
        fetch_for_donor(db, "comorbidities", &program_id, &donor_id).await?;

    // Split follow-ups by attachment level
    let mut donor_followups = Vec::new();
    let mut diagnosis_followups: HashMap<String, Vec<FollowUp>> = HashMap::new();
    let mut treatment_followups: HashMap<String, Vec<FollowUp>> = HashMap::new();
    for fu in follow_ups {
        if let Some(treatment_id) = fu.submitter_treatment_id.clone() {
            treatment_followups.entry(treatment_id).or_default().push(fu);
        } else if let Some(diagnosis_id) = fu.submitter_primary_diagnosis_id.clone() {
            diagnosis_followups.entry(diagnosis_id).or_default().push(fu);
        } else {
            donor_followups.push(fu);
        }
    }

    let mut samples_by_specimen = group_by(samples, |s| s.submitter_specimen_id.clone());
    let mut chemo_by_treatment = group_by(chemotherapies, |c| c.submitter_treatment_id.clone());
    let mut hormone_by_treatment =
        group_by(hormone_therapies, |h| h.submitter_treatment_id.clone());
    let mut immuno_by_treatment =
        group_by(immunotherapies, |i| i.submitter_treatment_id.clone());
    let mut radiation_by_treatment = group_by(radiations, |r| r.submitter_treatment_id.clone());
    let mut surgery_by_treatment = group_by(surgeries, |s| s.submitter_treatment_id.clone());

    let mut specimens_by_diagnosis = group_by(specimens, |s| {
        s.submitter_primary_diagnosis_id.clone()
    });
    let mut treatments_by_diagnosis = group_by(treatments, |t| {
        t.submitter_primary_diagnosis_id.clone()
    });

    let primary_diagnoses = diagnoses
        .into_iter()
        .map(|pd| {
            let diagnosis_id = pd.submitter_primary_diagnosis_id.clone();

            let specimens = specimens_by_diagnosis
                .remove(&diagnosis_id)
                .unwrap_or_default()
                .into_iter()
                .map(|sp| {
                    let specimen_id = sp.submitter_specimen_id.clone();
                    NestedSpecimen {
                        specimen: sp,
                        sample_registrations: samples_by_specimen
                            .remove(&specimen_id)
                            .unwrap_or_default(),
                    }
                })
                .collect();

            let treatments = treatments_by_diagnosis
                .remove(&diagnosis_id)
                .unwrap_or_default()
                .into_iter()
                .map(|tr| {
                    let treatment_id = tr.submitter_treatment_id.clone();
                    NestedTreatment {
                        treatment: tr,
                        chemotherapies: chemo_by_treatment
                            .remove(&treatment_id)
                            .unwrap_or_default(),
                        hormone_therapies: hormone_by_treatment
                            .remove(&treatment_id)
                            .unwrap_or_default(),
                        immunotherapies: immuno_by_treatment
                            .remove(&treatment_id)
                            .unwrap_or_default(),
                        radiations: radiation_by_treatment
                            .remove(&treatment_id)
                            .unwrap_or_default(),
                        surgeries: surgery_by_treatment
                            .remove(&treatment_id)
                            .unwrap_or_default(),
                        followups: treatment_followups.remove(&treatment_id).unwrap_or_default(),
                    }
                })
                .collect();

            NestedPrimaryDiagnosis {
                specimens,
                treatments,
                followups: diagnosis_followups.remove(&diagnosis_id).unwrap_or_default(),
                primary_diagnosis: pd,
            }
        })
        .collect();

    Ok(DonorWithClinicalData {
        donor,
        primary_diagnoses,
        followups: donor_followups,
        biomarkers,
        exposures,
        comorbidities,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct NestedDonorFilters {
    pub program_id: Option<String>,
    pub submitter_donor_id: Option<String>,
}

/// GET /v2/authorized/donor_with_clinical_data/
///
/// Paginated nested donors across the caller's authorized programs.
pub async fn list_donors_with_clinical_data(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<NestedDonorFilters>,
) -> Result<Json<ListResponse<DonorWithClinicalData>>, ApiError> {
    if filters.submitter_donor_id.is_some() && filters.program_id.is_none() {
        return Err(ApiError::BadRequest(
            "submitter_donor_id filter requires program_id".to_string(),
        ));
    }

    let mut f = SqlFilter::scoped(&auth.authorized_programs);
    f.eq("program_id", &filters.program_id);
    f.eq("submitter_donor_id", &filters.submitter_donor_id);

    let donor_page = fetch_page::<Donor>(&state.db, "donors", &f, page).await?;

    let mut items = Vec::with_capacity(donor_page.items.len());
    for donor in donor_page.items {
        items.push(assemble_donor(&state.db, donor).await?);
    }

    Ok(Json(ListResponse {
        count: donor_page.count,
        page: donor_page.page,
        page_size: donor_page.page_size,
        total_pages: donor_page.total_pages,
        items,
    }))
}

/// GET /v2/authorized/donor_with_clinical_data/program/:program_id/donor/:donor_id
pub async fn get_donor_with_clinical_data(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((program_id, donor_id)): Path<(String, String)>,
) -> Result<Json<DonorWithClinicalData>, ApiError> {
    // A program outside the caller's grant is indistinguishable from a
    // missing donor.
    if !auth.authorized_programs.contains(&program_id) {
        return Err(ApiError::NotFound(
            "Donor matching query does not exist or inaccessible".to_string(),
        ));
    }

    let donor = sqlx::query_as::<_, Donor>(
        "SELECT * FROM donors WHERE program_id = ? AND submitter_donor_id = ?",
    )
    .bind(&program_id)
    .bind(&donor_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::db)?
    .ok_or_else(|| {
        ApiError::NotFound("Donor matching query does not exist or inaccessible".to_string())
    })?;

    Ok(Json(assemble_donor(&state.db, donor).await?))
}
