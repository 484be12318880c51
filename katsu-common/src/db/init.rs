//! Database initialization
//!
//! Creates the SQLite schema on first run so a fresh checkout starts with no
//! manual setup. All statements are idempotent (`CREATE TABLE IF NOT EXISTS`)
//! and safe to re-run on every boot.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed.
///
/// Foreign keys drive program cascade deletes; WAL keeps readers unblocked
/// while ingest writes. Both are connection options so every pooled
/// connection gets them.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_programs_table(pool).await?;
    create_donors_table(pool).await?;
    create_primary_diagnoses_table(pool).await?;
    create_specimens_table(pool).await?;
    create_sample_registrations_table(pool).await?;
    create_treatments_table(pool).await?;
    create_chemotherapies_table(pool).await?;
    create_hormone_therapies_table(pool).await?;
    create_immunotherapies_table(pool).await?;
    create_radiations_table(pool).await?;
    create_surgeries_table(pool).await?;
    create_follow_ups_table(pool).await?;
    create_biomarkers_table(pool).await?;
    create_comorbidities_table(pool).await?;
    create_exposures_table(pool).await?;
    Ok(())
}

async fn create_programs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            program_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created TEXT,
            updated TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_donors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS donors (
            submitter_donor_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            gender TEXT,
            sex_at_birth TEXT,
            is_deceased INTEGER,
            cause_of_death TEXT,
            date_of_birth TEXT,
            date_of_death TEXT,
            lost_to_followup_after_clinical_event_identifier TEXT,
            lost_to_followup_reason TEXT,
            date_alive_after_lost_to_followup TEXT,
            primary_site TEXT,
            extra_properties TEXT,
            PRIMARY KEY (program_id, submitter_donor_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_primary_diagnoses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS primary_diagnoses (
            submitter_primary_diagnosis_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            date_of_diagnosis TEXT,
            cancer_type_code TEXT,
            basis_of_diagnosis TEXT,
            laterality TEXT,
            lymph_nodes_examined_status TEXT,
            lymph_nodes_examined_method TEXT,
            number_lymph_nodes_positive INTEGER,
            clinical_tumour_staging_system TEXT,
            clinical_t_category TEXT,
            clinical_n_category TEXT,
            clinical_m_category TEXT,
            clinical_stage_group TEXT,
            PRIMARY KEY (program_id, submitter_primary_diagnosis_id),
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_specimens_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS specimens (
            submitter_specimen_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_primary_diagnosis_id TEXT NOT NULL,
            pathological_tumour_staging_system TEXT,
            pathological_t_category TEXT,
            pathological_n_category TEXT,
            pathological_m_category TEXT,
            pathological_stage_group TEXT,
            specimen_collection_date TEXT,
            specimen_storage TEXT,
            specimen_processing TEXT,
            tumour_histological_type TEXT,
            specimen_anatomic_location TEXT,
            specimen_laterality TEXT,
            reference_pathology_confirmed_diagnosis TEXT,
            reference_pathology_confirmed_tumour_presence TEXT,
            tumour_grading_system TEXT,
            tumour_grade TEXT,
            percent_tumour_cells_range TEXT,
            percent_tumour_cells_measurement_method TEXT,
            extra_properties TEXT,
            PRIMARY KEY (program_id, submitter_specimen_id),
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE,
            FOREIGN KEY (program_id, submitter_primary_diagnosis_id)
                REFERENCES primary_diagnoses(program_id, submitter_primary_diagnosis_id)
                ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_sample_registrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sample_registrations (
            submitter_sample_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_specimen_id TEXT NOT NULL,
            specimen_tissue_source TEXT,
            tumour_normal_designation TEXT,
            specimen_type TEXT,
            sample_type TEXT,
            PRIMARY KEY (program_id, submitter_sample_id),
            FOREIGN KEY (program_id, submitter_specimen_id)
                REFERENCES specimens(program_id, submitter_specimen_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_treatments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS treatments (
            submitter_treatment_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_primary_diagnosis_id TEXT NOT NULL,
            treatment_type TEXT,
            is_primary_treatment TEXT,
            line_of_treatment INTEGER,
            treatment_start_date TEXT,
            treatment_end_date TEXT,
            treatment_setting TEXT,
            treatment_intent TEXT,
            days_per_cycle INTEGER,
            number_of_cycles INTEGER,
            response_to_treatment_criteria_method TEXT,
            response_to_treatment TEXT,
            status_of_treatment TEXT,
            PRIMARY KEY (program_id, submitter_treatment_id),
            FOREIGN KEY (program_id, submitter_primary_diagnosis_id)
                REFERENCES primary_diagnoses(program_id, submitter_primary_diagnosis_id)
                ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_chemotherapies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chemotherapies (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_treatment_id TEXT NOT NULL,
            drug_reference_database TEXT,
            drug_name TEXT,
            drug_reference_identifier TEXT,
            chemotherapy_drug_dose_units TEXT,
            prescribed_cumulative_drug_dose INTEGER,
            actual_cumulative_drug_dose INTEGER,
            FOREIGN KEY (program_id, submitter_treatment_id)
                REFERENCES treatments(program_id, submitter_treatment_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_hormone_therapies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hormone_therapies (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_treatment_id TEXT NOT NULL,
            drug_reference_database TEXT,
            drug_name TEXT,
            drug_reference_identifier TEXT,
            hormone_drug_dose_units TEXT,
            prescribed_cumulative_drug_dose INTEGER,
            actual_cumulative_drug_dose INTEGER,
            FOREIGN KEY (program_id, submitter_treatment_id)
                REFERENCES treatments(program_id, submitter_treatment_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_immunotherapies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS immunotherapies (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_treatment_id TEXT NOT NULL,
            immunotherapy_type TEXT,
            drug_reference_database TEXT,
            drug_name TEXT,
            drug_reference_identifier TEXT,
            immunotherapy_drug_dose_units TEXT,
            prescribed_cumulative_drug_dose INTEGER,
            actual_cumulative_drug_dose INTEGER,
            FOREIGN KEY (program_id, submitter_treatment_id)
                REFERENCES treatments(program_id, submitter_treatment_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_radiations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radiations (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_treatment_id TEXT NOT NULL,
            radiation_therapy_modality TEXT,
            radiation_therapy_type TEXT,
            radiation_therapy_fractions INTEGER,
            radiation_therapy_dosage INTEGER,
            anatomical_site_irradiated TEXT,
            radiation_boost INTEGER,
            reference_radiation_treatment_id TEXT,
            FOREIGN KEY (program_id, submitter_treatment_id)
                REFERENCES treatments(program_id, submitter_treatment_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_surgeries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS surgeries (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_treatment_id TEXT NOT NULL,
            surgery_type TEXT,
            surgery_site TEXT,
            surgery_location TEXT,
            tumour_length INTEGER,
            tumour_width INTEGER,
            greatest_dimension_tumour INTEGER,
            tumour_focality TEXT,
            residual_tumour_classification TEXT,
            margin_types_involved TEXT,
            margin_types_not_involved TEXT,
            margin_types_not_assessed TEXT,
            lymphovascular_invasion TEXT,
            perineural_invasion TEXT,
            FOREIGN KEY (program_id, submitter_treatment_id)
                REFERENCES treatments(program_id, submitter_treatment_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_follow_ups_table(pool: &SqlitePool) -> Result<()> {
    // submitter_primary_diagnosis_id / submitter_treatment_id stay NULL for
    // donor-level follow-ups; the nested donor assembly relies on that.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS follow_ups (
            submitter_follow_up_id TEXT NOT NULL,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_primary_diagnosis_id TEXT,
            submitter_treatment_id TEXT,
            date_of_followup TEXT,
            date_of_relapse TEXT,
            disease_status_at_followup TEXT,
            relapse_type TEXT,
            method_of_progression_status TEXT,
            anatomic_site_progression_or_recurrence TEXT,
            recurrence_tumour_staging_system TEXT,
            recurrence_t_category TEXT,
            recurrence_n_category TEXT,
            recurrence_m_category TEXT,
            recurrence_stage_group TEXT,
            PRIMARY KEY (program_id, submitter_follow_up_id),
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_biomarkers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS biomarkers (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            submitter_specimen_id TEXT,
            submitter_primary_diagnosis_id TEXT,
            submitter_treatment_id TEXT,
            submitter_follow_up_id TEXT,
            test_date TEXT,
            psa_level INTEGER,
            ca125 INTEGER,
            cea INTEGER,
            er_status TEXT,
            pr_status TEXT,
            her2_ihc_status TEXT,
            her2_ish_status TEXT,
            hpv_ihc_status TEXT,
            hpv_pcr_status TEXT,
            hpv_strain TEXT,
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_comorbidities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comorbidities (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            prior_malignancy TEXT,
            laterality_of_prior_malignancy TEXT,
            age_at_comorbidity_diagnosis INTEGER,
            comorbidity_type_code TEXT,
            comorbidity_treatment_status TEXT,
            comorbidity_treatment TEXT,
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_exposures_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exposures (
            uuid TEXT PRIMARY KEY,
            program_id TEXT NOT NULL
                REFERENCES programs(program_id) ON DELETE CASCADE,
            submitter_donor_id TEXT NOT NULL,
            tobacco_smoking_status TEXT,
            tobacco_type TEXT,
            pack_years_smoked REAL,
            FOREIGN KEY (program_id, submitter_donor_id)
                REFERENCES donors(program_id, submitter_donor_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_schema_and_enforces_cascade() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("katsu.db");
        let pool = init_database(&db_path).await.unwrap();

        sqlx::query("INSERT INTO programs (program_id, name) VALUES ('P1', 'Program One')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO donors (submitter_donor_id, program_id) VALUES ('DONOR_1', 'P1')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Deleting the program must take the donor with it
        sqlx::query("DELETE FROM programs WHERE program_id = 'P1'")
            .execute(&pool)
            .await
            .unwrap();
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donors")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("katsu.db");

        let pool = init_database(&db_path).await.unwrap();
        drop(pool);
        // Second open against the same file must succeed unchanged
        init_database(&db_path).await.unwrap();
    }
}
