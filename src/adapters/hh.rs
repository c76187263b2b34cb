use crate::config::ApiConfig;
use crate::domain::model::{Employer, FailureReason, FetchFailure, Harvest, Vacancy, VacancyPages};
use crate::domain::ports::VacancySource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ItemsPage<T> {
    items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployerItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VacancyItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    pub alternate_url: String,
    pub salary: Option<SalaryItem>,
    pub area: AreaItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryItem {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AreaItem {
    pub name: String,
}

impl From<EmployerItem> for Employer {
    fn from(item: EmployerItem) -> Self {
        Employer {
            id: item.id,
            name: item.name,
        }
    }
}

impl VacancyItem {
    pub fn into_vacancy(self, employer_id: i64) -> Vacancy {
        let (from, to) = match &self.salary {
            Some(salary) => (salary.from, salary.to),
            None => (None, None),
        };

        Vacancy {
            id: self.id,
            name: self.name,
            url: self.alternate_url,
            salary_from: Vacancy::normalize_salary(from.map(|v| v.round() as i64)),
            salary_to: Vacancy::normalize_salary(to.map(|v| v.round() as i64)),
            employer_id,
            area: self.area.name,
        }
    }
}

// hh.ru sends ids as strings; accept plain numbers too.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id: {}", text))),
    }
}

/// Client for the hh.ru listings API.
pub struct HhClient {
    client: Client,
    config: ApiConfig,
}

impl HhClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_items<T: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: String,
        query: &[(&str, String)],
        page: Option<u32>,
    ) -> std::result::Result<Vec<T>, FetchFailure> {
        let failure = |reason: FailureReason| FetchFailure {
            endpoint: endpoint.clone(),
            page,
            reason,
        };

        tracing::debug!("Making API request to: {} {:?}", path, query);
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| failure(FailureReason::Transport(e.to_string())))?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(failure(FailureReason::Status(response.status().as_u16())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| failure(FailureReason::Transport(e.to_string())))?;
        let body: ItemsPage<T> = serde_json::from_str(&text)
            .map_err(|e| failure(FailureReason::Decode(e.to_string())))?;

        Ok(body.items)
    }

    /// Walks the pages of one employer until an empty page comes back.
    /// A failed request or hitting `max_pages` stops paging and is reported
    /// in `stopped_by`; pages gathered before that are kept.
    pub async fn list_vacancies(&self, employer_id: i64) -> VacancyPages<VacancyItem> {
        let endpoint = format!("/vacancies?employer_id={}", employer_id);
        let mut items = Vec::new();

        for page in 0..self.config.max_pages {
            let query = [
                ("employer_id", employer_id.to_string()),
                ("per_page", self.config.vacancies_per_page.to_string()),
                ("page", page.to_string()),
            ];

            match self
                .get_items::<VacancyItem>("/vacancies", endpoint.clone(), &query, Some(page))
                .await
            {
                Ok(batch) if batch.is_empty() => {
                    return VacancyPages {
                        items,
                        stopped_by: None,
                    };
                }
                Ok(batch) => items.extend(batch),
                Err(failure) => {
                    tracing::warn!("⚠️ Vacancy paging stopped early: {}", failure);
                    return VacancyPages {
                        items,
                        stopped_by: Some(failure),
                    };
                }
            }
        }

        let failure = FetchFailure {
            endpoint,
            page: Some(self.config.max_pages),
            reason: FailureReason::PageLimit(self.config.max_pages),
        };
        tracing::warn!("⚠️ Vacancy paging stopped early: {}", failure);
        VacancyPages {
            items,
            stopped_by: Some(failure),
        }
    }
}

#[async_trait]
impl VacancySource for HhClient {
    async fn list_employers(&self) -> Result<Vec<Employer>> {
        let query = [
            ("per_page", self.config.employers_per_page.to_string()),
            ("sort_by", self.config.sort_by.clone()),
        ];

        let items = self
            .get_items::<EmployerItem>("/employers", "/employers".to_string(), &query, None)
            .await?;

        tracing::info!("Fetched {} employers", items.len());
        Ok(items.into_iter().map(Employer::from).collect())
    }

    async fn vacancies_for(&self, employers: &[Employer]) -> Harvest {
        let mut harvest = Harvest::default();

        for employer in employers {
            let pages = self.list_vacancies(employer.id).await;
            tracing::info!(
                "Fetched {} vacancies for {} ({})",
                pages.items.len(),
                employer.name,
                employer.id
            );

            harvest.vacancies.extend(
                pages
                    .items
                    .into_iter()
                    .map(|item| item.into_vacancy(employer.id)),
            );
            if let Some(failure) = pages.stopped_by {
                harvest.failures.push(failure);
            }
        }

        harvest
    }
}
