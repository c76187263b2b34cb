use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_sql_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub salary_from: i64,
    pub salary_to: i64,
    pub employer_id: i64,
    pub area: String,
}

impl Vacancy {
    /// Missing, zero and negative bounds all become 0.
    pub fn normalize_salary(bound: Option<i64>) -> i64 {
        bound.filter(|value| *value > 0).unwrap_or(0)
    }
}

/// Employers and vacancies ready to be loaded, in insert order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub employers: Vec<Employer>,
    pub vacancies: Vec<Vacancy>,
}

impl Dataset {
    /// Builds a dataset whose vacancies all reference one of `employers`.
    /// Vacancies pointing elsewhere are dropped.
    pub fn new(employers: Vec<Employer>, vacancies: Vec<Vacancy>) -> Self {
        let known: HashSet<i64> = employers.iter().map(|e| e.id).collect();
        let (vacancies, orphans): (Vec<_>, Vec<_>) = vacancies
            .into_iter()
            .partition(|v| known.contains(&v.employer_id));

        if !orphans.is_empty() {
            tracing::warn!(
                "Dropping {} vacancies whose employer is not in the employer set",
                orphans.len()
            );
        }

        Self {
            employers,
            vacancies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.employers.is_empty() && self.vacancies.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub employers_inserted: u64,
    pub vacancies_inserted: u64,
}

/// Row of the "companies and vacancy counts" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyVacancyCount {
    pub company_name: String,
    pub vacancies_count: i64,
}

/// Row shared by the listing queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyListing {
    pub company_name: String,
    pub vacancy_name: String,
    pub salary_from: i64,
    pub salary_to: i64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Status(u16),
    Transport(String),
    Decode(String),
    /// `max_pages` pages were read and the last one was not empty.
    PageLimit(u32),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::Transport(message) => write!(f, "transport error: {}", message),
            FailureReason::Decode(message) => write!(f, "unreadable response: {}", message),
            FailureReason::PageLimit(limit) => {
                write!(f, "page limit of {} reached, more results not fetched", limit)
            }
        }
    }
}

/// A request to the listings API that produced no usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub endpoint: String,
    pub page: Option<u32>,
    pub reason: FailureReason,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "GET {} (page {}): {}", self.endpoint, page, self.reason),
            None => write!(f, "GET {}: {}", self.endpoint, self.reason),
        }
    }
}

impl std::error::Error for FetchFailure {}

impl From<FetchFailure> for EtlError {
    fn from(failure: FetchFailure) -> Self {
        EtlError::Fetch(failure)
    }
}

/// Pages collected for one employer, and the failure that cut paging short.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyPages<T> {
    pub items: Vec<T>,
    pub stopped_by: Option<FetchFailure>,
}

impl<T> VacancyPages<T> {
    pub fn is_complete(&self) -> bool {
        self.stopped_by.is_none()
    }
}

/// Normalized vacancies for a set of employers plus every failure met.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Harvest {
    pub vacancies: Vec<Vacancy>,
    pub failures: Vec<FetchFailure>,
}

impl Harvest {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Name of a disposable store instance.
///
/// A store instance is dropped and recreated at the start of every session
/// and dropped again at the end. Pointing that at a shared database would
/// destroy it, so every name lives under a sandbox prefix and must be a
/// plain lowercase identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreName(String);

/// Databases every PostgreSQL server ships with.
pub const RESERVED_DATABASES: [&str; 3] = ["postgres", "template0", "template1"];

impl StoreName {
    pub fn sandboxed(raw: &str, prefix: &str) -> Result<Self> {
        validate_sql_identifier("store.sandbox_prefix", prefix)?;

        let requested = raw.trim().to_lowercase();
        if requested.is_empty() {
            return Err(EtlError::ValidationError {
                message: "Store name cannot be empty".to_string(),
            });
        }

        let name = if requested.starts_with(prefix) {
            requested
        } else {
            format!("{}{}", prefix, requested)
        };
        validate_sql_identifier("database", &name)?;
        if RESERVED_DATABASES.contains(&name.as_str()) {
            return Err(EtlError::ValidationError {
                message: format!("'{}' is a system database and cannot be used as a store", name),
            });
        }

        Ok(Self(name))
    }

    /// Fails when the name is the database used for lifecycle statements.
    pub fn ensure_not(&self, maintenance_database: &str) -> Result<()> {
        if self.0 == maintenance_database.trim().to_lowercase() {
            return Err(EtlError::ValidationError {
                message: format!(
                    "'{}' is the maintenance database and cannot be used as a store",
                    self.0
                ),
            });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
