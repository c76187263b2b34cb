#![allow(dead_code)]

use async_trait::async_trait;
use hh_vacancy_etl::domain::model::{
    CompanyVacancyCount, Employer, FailureReason, FetchFailure, Harvest, Vacancy, VacancyListing,
};
use hh_vacancy_etl::domain::ports::{Loader, QueryService, SchemaManager, VacancySource};
use hh_vacancy_etl::{EtlError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn employer(id: i64, name: &str) -> Employer {
    Employer {
        id,
        name: name.to_string(),
    }
}

pub fn vacancy(id: i64, employer_id: i64, name: &str, salary_from: i64, salary_to: i64) -> Vacancy {
    Vacancy {
        id,
        name: name.to_string(),
        url: format!("https://hh.ru/vacancy/{}", id),
        salary_from,
        salary_to,
        employer_id,
        area: "Москва".to_string(),
    }
}

pub fn status_failure(endpoint: &str, page: Option<u32>, status: u16) -> FetchFailure {
    FetchFailure {
        endpoint: endpoint.to_string(),
        page,
        reason: FailureReason::Status(status),
    }
}

/// Source returning canned data.
pub struct StubSource {
    pub employers: std::result::Result<Vec<Employer>, FetchFailure>,
    pub vacancies: Vec<Vacancy>,
    pub failures: Vec<FetchFailure>,
}

impl StubSource {
    pub fn new(employers: Vec<Employer>, vacancies: Vec<Vacancy>) -> Self {
        Self {
            employers: Ok(employers),
            vacancies,
            failures: Vec::new(),
        }
    }
}

#[async_trait]
impl VacancySource for StubSource {
    async fn list_employers(&self) -> Result<Vec<Employer>> {
        self.employers.clone().map_err(EtlError::Fetch)
    }

    async fn vacancies_for(&self, employers: &[Employer]) -> Harvest {
        let ids: HashSet<i64> = employers.iter().map(|e| e.id).collect();
        Harvest {
            vacancies: self
                .vacancies
                .iter()
                .filter(|v| ids.contains(&v.employer_id))
                .cloned()
                .collect(),
            failures: self.failures.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    pub employers: Vec<Employer>,
    pub vacancies: Vec<Vacancy>,
}

#[derive(Debug, Default)]
pub struct MemoryState {
    /// `None` while the store instance does not exist.
    pub tables: Option<Tables>,
    pub schema_created: bool,
    pub events: Vec<String>,
    pub fail_queries: bool,
    pub fail_teardown: bool,
}

/// Store keeping its tables in memory, with the same query semantics as
/// the PostgreSQL store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_queries() -> Self {
        let store = Self::default();
        store.state.try_lock().unwrap().fail_queries = true;
        store
    }

    pub fn failing_teardown() -> Self {
        let store = Self::default();
        store.state.try_lock().unwrap().fail_teardown = true;
        store
    }

    pub async fn events(&self) -> Vec<String> {
        self.state.lock().await.events.clone()
    }

    pub async fn exists(&self) -> bool {
        self.state.lock().await.tables.is_some()
    }

    pub async fn vacancy_count(&self) -> usize {
        self.state
            .lock()
            .await
            .tables
            .as_ref()
            .map(|t| t.vacancies.len())
            .unwrap_or(0)
    }

    async fn with_tables<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T> {
        let state = self.state.lock().await;
        if state.fail_queries {
            return Err(EtlError::ValidationError {
                message: "query failed".to_string(),
            });
        }
        let tables = state.tables.as_ref().ok_or_else(missing_store)?;
        Ok(f(tables))
    }
}

fn missing_store() -> EtlError {
    EtlError::ValidationError {
        message: "store instance does not exist".to_string(),
    }
}

fn listings(tables: &Tables, keep: impl Fn(&Vacancy) -> bool) -> Vec<VacancyListing> {
    let mut rows: Vec<VacancyListing> = tables
        .vacancies
        .iter()
        .filter(|v| keep(v))
        .filter_map(|v| {
            tables
                .employers
                .iter()
                .find(|e| e.id == v.employer_id)
                .map(|e| VacancyListing {
                    company_name: e.name.clone(),
                    vacancy_name: v.name.clone(),
                    salary_from: v.salary_from,
                    salary_to: v.salary_to,
                    url: v.url.clone(),
                })
        })
        .collect();
    rows.sort_by(|a, b| a.vacancy_name.cmp(&b.vacancy_name));
    rows
}

#[async_trait]
impl SchemaManager for MemoryStore {
    async fn recreate(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tables = Some(Tables::default());
        state.schema_created = false;
        state.events.push("recreate".to_string());
        Ok(())
    }

    async fn create_schema(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.tables.is_none() {
            return Err(missing_store());
        }
        state.schema_created = true;
        state.events.push("create_schema".to_string());
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.events.push("teardown".to_string());
        if state.fail_teardown {
            return Err(EtlError::ValidationError {
                message: "database is being accessed by other users".to_string(),
            });
        }
        state.tables = None;
        state.schema_created = false;
        Ok(())
    }
}

#[async_trait]
impl Loader for MemoryStore {
    async fn insert_employers(&self, employers: &[Employer]) -> Result<u64> {
        let mut state = self.state.lock().await;
        state.events.push("insert_employers".to_string());
        let tables = state.tables.as_mut().ok_or_else(missing_store)?;

        let mut staged = tables.employers.clone();
        for employer in employers {
            if staged
                .iter()
                .any(|e| e.id == employer.id || e.name == employer.name)
            {
                return Err(EtlError::ValidationError {
                    message: format!("duplicate employer {}", employer.name),
                });
            }
            staged.push(employer.clone());
        }

        let inserted = (staged.len() - tables.employers.len()) as u64;
        tables.employers = staged;
        Ok(inserted)
    }

    async fn insert_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64> {
        let mut state = self.state.lock().await;
        state.events.push("insert_vacancies".to_string());
        let tables = state.tables.as_mut().ok_or_else(missing_store)?;

        let mut staged = tables.vacancies.clone();
        for vacancy in vacancies {
            if !tables.employers.iter().any(|e| e.id == vacancy.employer_id) {
                return Err(EtlError::ValidationError {
                    message: format!("unknown employer {}", vacancy.employer_id),
                });
            }
            if staged.iter().any(|v| v.id == vacancy.id) {
                continue;
            }
            staged.push(vacancy.clone());
        }

        let inserted = (staged.len() - tables.vacancies.len()) as u64;
        tables.vacancies = staged;
        Ok(inserted)
    }
}

#[async_trait]
impl QueryService for MemoryStore {
    async fn companies_and_vacancies_count(&self) -> Result<Vec<CompanyVacancyCount>> {
        self.with_tables(|tables| {
            let mut rows: Vec<CompanyVacancyCount> = tables
                .employers
                .iter()
                .map(|e| CompanyVacancyCount {
                    company_name: e.name.clone(),
                    vacancies_count: tables
                        .vacancies
                        .iter()
                        .filter(|v| v.employer_id == e.id)
                        .count() as i64,
                })
                .collect();
            rows.sort_by(|a, b| b.vacancies_count.cmp(&a.vacancies_count));
            rows
        })
        .await
    }

    async fn all_vacancies(&self) -> Result<Vec<VacancyListing>> {
        self.with_tables(|tables| listings(tables, |_| true)).await
    }

    async fn avg_salary(&self) -> Result<Option<f64>> {
        self.with_tables(|tables| {
            let mids: Vec<f64> = tables
                .vacancies
                .iter()
                .filter(|v| v.salary_from > 0 && v.salary_to > 0)
                .map(|v| (v.salary_from + v.salary_to) as f64 / 2.0)
                .collect();
            if mids.is_empty() {
                None
            } else {
                let avg = mids.iter().sum::<f64>() / mids.len() as f64;
                Some((avg * 100.0).round() / 100.0)
            }
        })
        .await
    }

    async fn vacancies_with_higher_salary(&self) -> Result<Vec<VacancyListing>> {
        self.with_tables(|tables| {
            let froms: Vec<f64> = tables
                .vacancies
                .iter()
                .filter(|v| v.salary_from > 0)
                .map(|v| v.salary_from as f64)
                .collect();
            if froms.is_empty() {
                return Vec::new();
            }
            let avg_from = froms.iter().sum::<f64>() / froms.len() as f64;
            listings(tables, |v| v.salary_from as f64 > avg_from)
        })
        .await
    }

    async fn vacancies_with_keyword(&self, keyword: &str) -> Result<Vec<VacancyListing>> {
        let needle = keyword.to_lowercase();
        self.with_tables(|tables| listings(tables, |v| v.name.to_lowercase().contains(&needle)))
            .await
    }
}
