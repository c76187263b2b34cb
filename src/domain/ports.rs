use crate::domain::model::{CompanyVacancyCount, Employer, Harvest, Vacancy, VacancyListing};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote source of employers and their vacancies.
#[async_trait]
pub trait VacancySource: Send + Sync {
    async fn list_employers(&self) -> Result<Vec<Employer>>;

    /// Vacancies of every employer in `employers`, in employer order.
    async fn vacancies_for(&self, employers: &[Employer]) -> Harvest;

    async fn list_all_vacancies(&self) -> Result<Harvest> {
        let employers = self.list_employers().await?;
        Ok(self.vacancies_for(&employers).await)
    }
}

/// Lifecycle of one store instance.
#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Drops the instance if it exists and creates it empty.
    async fn recreate(&self) -> Result<()>;
    async fn create_schema(&self) -> Result<()>;
    async fn teardown(&self) -> Result<()>;
}

/// Bulk inserts; each call runs in its own transaction and returns the
/// number of rows actually inserted.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn insert_employers(&self, employers: &[Employer]) -> Result<u64>;
    /// Rows whose id already exists are skipped.
    async fn insert_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64>;
}

#[async_trait]
pub trait QueryService: Send + Sync {
    async fn companies_and_vacancies_count(&self) -> Result<Vec<CompanyVacancyCount>>;
    async fn all_vacancies(&self) -> Result<Vec<VacancyListing>>;
    /// `None` when no vacancy has both salary bounds set.
    async fn avg_salary(&self) -> Result<Option<f64>>;
    /// Compares `salary_from` against the mean of positive `salary_from`
    /// values, not against `avg_salary`.
    async fn vacancies_with_higher_salary(&self) -> Result<Vec<VacancyListing>>;
    async fn vacancies_with_keyword(&self, keyword: &str) -> Result<Vec<VacancyListing>>;
}

pub trait VacancyStore: SchemaManager + Loader + QueryService {}

impl<T: SchemaManager + Loader + QueryService> VacancyStore for T {}
