use crate::domain::model::{Dataset, FetchFailure, LoadSummary};
use crate::domain::ports::{VacancySource, VacancyStore};
use crate::utils::error::{EtlError, Result};

/// What the setup phase produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    pub load: LoadSummary,
    pub failures: Vec<FetchFailure>,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Recreates the store, fetches employers and vacancies, and loads them.
pub struct EtlEngine<'a, F: ?Sized, S: ?Sized> {
    source: &'a F,
    store: &'a S,
}

impl<'a, F, S> EtlEngine<'a, F, S>
where
    F: VacancySource + ?Sized,
    S: VacancyStore + ?Sized,
{
    pub fn new(source: &'a F, store: &'a S) -> Self {
        Self { source, store }
    }

    pub async fn run(&self) -> Result<SetupReport> {
        tracing::info!("Starting ETL process...");

        self.store.recreate().await?;
        self.store.create_schema().await?;

        // Extract
        let mut failures = Vec::new();
        let employers = match self.source.list_employers().await {
            Ok(employers) => employers,
            Err(EtlError::Fetch(failure)) => {
                tracing::warn!("⚠️ Employer list unavailable: {}", failure);
                failures.push(failure);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let harvest = self.source.vacancies_for(&employers).await;
        tracing::info!(
            "Extracted {} employers and {} vacancies",
            employers.len(),
            harvest.vacancies.len()
        );
        failures.extend(harvest.failures);

        // Transform
        let dataset = Dataset::new(employers, harvest.vacancies);

        // Load
        let load = self.load(&dataset).await?;

        if !failures.is_empty() {
            tracing::warn!("⚠️ {} API requests failed; data set is incomplete", failures.len());
        }
        Ok(SetupReport { load, failures })
    }

    /// Employers first, so every vacancy's employer already exists.
    pub async fn load(&self, dataset: &Dataset) -> Result<LoadSummary> {
        let employers_inserted = self.store.insert_employers(&dataset.employers).await?;
        let vacancies_inserted = self.store.insert_vacancies(&dataset.vacancies).await?;

        tracing::info!(
            "Loaded {} employers and {} vacancies",
            employers_inserted,
            vacancies_inserted
        );
        Ok(LoadSummary {
            employers_inserted,
            vacancies_inserted,
        })
    }
}
