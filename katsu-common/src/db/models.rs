//! Database models for the MoH clinical data relations
//!
//! Records are keyed by their submitter-assigned identifiers plus the owning
//! `program_id`; deleting a program cascades through everything below it.
//! Multi-valued fields (`primary_site`, `treatment_type`, margin lists, ...)
//! are stored as JSON arrays in TEXT columns and surface as `Json<Vec<String>>`.
//! Dates are TEXT in `YYYY-MM` form, as submitted.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// Free-form JSON object attached to donors and specimens, validated against
/// a configured extension schema at ingest time
pub type ExtraProperties = Json<serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Program {
    pub program_id: String,
    pub name: String,
    #[serde(skip_deserializing)]
    pub created: Option<String>,
    #[serde(skip_deserializing)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donor {
    pub submitter_donor_id: String,
    pub program_id: String,
    pub gender: Option<String>,
    pub sex_at_birth: Option<String>,
    pub is_deceased: Option<bool>,
    pub cause_of_death: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub lost_to_followup_after_clinical_event_identifier: Option<String>,
    pub lost_to_followup_reason: Option<String>,
    pub date_alive_after_lost_to_followup: Option<String>,
    pub primary_site: Option<Json<Vec<String>>>,
    pub extra_properties: Option<ExtraProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrimaryDiagnosis {
    pub submitter_primary_diagnosis_id: String,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub date_of_diagnosis: Option<String>,
    pub cancer_type_code: Option<String>,
    pub basis_of_diagnosis: Option<String>,
    pub laterality: Option<String>,
    pub lymph_nodes_examined_status: Option<String>,
    pub lymph_nodes_examined_method: Option<String>,
    pub number_lymph_nodes_positive: Option<i64>,
    pub clinical_tumour_staging_system: Option<String>,
    pub clinical_t_category: Option<String>,
    pub clinical_n_category: Option<String>,
    pub clinical_m_category: Option<String>,
    pub clinical_stage_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Specimen {
    pub submitter_specimen_id: String,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_primary_diagnosis_id: String,
    pub pathological_tumour_staging_system: Option<String>,
    pub pathological_t_category: Option<String>,
    pub pathological_n_category: Option<String>,
    pub pathological_m_category: Option<String>,
    pub pathological_stage_group: Option<String>,
    pub specimen_collection_date: Option<String>,
    pub specimen_storage: Option<String>,
    pub specimen_processing: Option<String>,
    pub tumour_histological_type: Option<String>,
    pub specimen_anatomic_location: Option<String>,
    pub specimen_laterality: Option<String>,
    pub reference_pathology_confirmed_diagnosis: Option<String>,
    pub reference_pathology_confirmed_tumour_presence: Option<String>,
    pub tumour_grading_system: Option<String>,
    pub tumour_grade: Option<String>,
    pub percent_tumour_cells_range: Option<String>,
    pub percent_tumour_cells_measurement_method: Option<String>,
    pub extra_properties: Option<ExtraProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SampleRegistration {
    pub submitter_sample_id: String,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_specimen_id: String,
    pub specimen_tissue_source: Option<String>,
    pub tumour_normal_designation: Option<String>,
    pub specimen_type: Option<String>,
    pub sample_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Treatment {
    pub submitter_treatment_id: String,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_primary_diagnosis_id: String,
    pub treatment_type: Option<Json<Vec<String>>>,
    pub is_primary_treatment: Option<String>,
    pub line_of_treatment: Option<i64>,
    pub treatment_start_date: Option<String>,
    pub treatment_end_date: Option<String>,
    pub treatment_setting: Option<String>,
    pub treatment_intent: Option<String>,
    pub days_per_cycle: Option<i64>,
    pub number_of_cycles: Option<i64>,
    pub response_to_treatment_criteria_method: Option<String>,
    pub response_to_treatment: Option<String>,
    pub status_of_treatment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chemotherapy {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_treatment_id: String,
    pub drug_reference_database: Option<String>,
    pub drug_name: Option<String>,
    pub drug_reference_identifier: Option<String>,
    pub chemotherapy_drug_dose_units: Option<String>,
    pub prescribed_cumulative_drug_dose: Option<i64>,
    pub actual_cumulative_drug_dose: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HormoneTherapy {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_treatment_id: String,
    pub drug_reference_database: Option<String>,
    pub drug_name: Option<String>,
    pub drug_reference_identifier: Option<String>,
    pub hormone_drug_dose_units: Option<String>,
    pub prescribed_cumulative_drug_dose: Option<i64>,
    pub actual_cumulative_drug_dose: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Immunotherapy {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_treatment_id: String,
    pub immunotherapy_type: Option<String>,
    pub drug_reference_database: Option<String>,
    pub drug_name: Option<String>,
    pub drug_reference_identifier: Option<String>,
    pub immunotherapy_drug_dose_units: Option<String>,
    pub prescribed_cumulative_drug_dose: Option<i64>,
    pub actual_cumulative_drug_dose: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Radiation {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_treatment_id: String,
    pub radiation_therapy_modality: Option<String>,
    pub radiation_therapy_type: Option<String>,
    pub radiation_therapy_fractions: Option<i64>,
    pub radiation_therapy_dosage: Option<i64>,
    pub anatomical_site_irradiated: Option<String>,
    pub radiation_boost: Option<bool>,
    pub reference_radiation_treatment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Surgery {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_treatment_id: String,
    pub surgery_type: Option<String>,
    pub surgery_site: Option<String>,
    pub surgery_location: Option<String>,
    pub tumour_length: Option<i64>,
    pub tumour_width: Option<i64>,
    pub greatest_dimension_tumour: Option<i64>,
    pub tumour_focality: Option<String>,
    pub residual_tumour_classification: Option<String>,
    pub margin_types_involved: Option<Json<Vec<String>>>,
    pub margin_types_not_involved: Option<Json<Vec<String>>>,
    pub margin_types_not_assessed: Option<Json<Vec<String>>>,
    pub lymphovascular_invasion: Option<String>,
    pub perineural_invasion: Option<String>,
}

/// Follow-ups attach at donor, diagnosis or treatment level depending on
/// which of the optional parent ids are present.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowUp {
    pub submitter_follow_up_id: String,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub date_of_followup: Option<String>,
    pub date_of_relapse: Option<String>,
    pub disease_status_at_followup: Option<String>,
    pub relapse_type: Option<String>,
    pub method_of_progression_status: Option<Json<Vec<String>>>,
    pub anatomic_site_progression_or_recurrence: Option<Json<Vec<String>>>,
    pub recurrence_tumour_staging_system: Option<String>,
    pub recurrence_t_category: Option<String>,
    pub recurrence_n_category: Option<String>,
    pub recurrence_m_category: Option<String>,
    pub recurrence_stage_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Biomarker {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub submitter_specimen_id: Option<String>,
    pub submitter_primary_diagnosis_id: Option<String>,
    pub submitter_treatment_id: Option<String>,
    pub submitter_follow_up_id: Option<String>,
    pub test_date: Option<String>,
    pub psa_level: Option<i64>,
    pub ca125: Option<i64>,
    pub cea: Option<i64>,
    pub er_status: Option<String>,
    pub pr_status: Option<String>,
    pub her2_ihc_status: Option<String>,
    pub her2_ish_status: Option<String>,
    pub hpv_ihc_status: Option<String>,
    pub hpv_pcr_status: Option<String>,
    pub hpv_strain: Option<Json<Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comorbidity {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub prior_malignancy: Option<String>,
    pub laterality_of_prior_malignancy: Option<String>,
    pub age_at_comorbidity_diagnosis: Option<i64>,
    pub comorbidity_type_code: Option<String>,
    pub comorbidity_treatment_status: Option<String>,
    pub comorbidity_treatment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Exposure {
    #[serde(skip_deserializing)]
    pub uuid: Option<String>,
    pub program_id: String,
    pub submitter_donor_id: String,
    pub tobacco_smoking_status: Option<String>,
    pub tobacco_type: Option<Json<Vec<String>>>,
    pub pack_years_smoked: Option<f64>,
}
