use crate::config::StoreConfig;
use crate::domain::model::{CompanyVacancyCount, Employer, StoreName, Vacancy, VacancyListing};
use crate::domain::ports::{Loader, QueryService, SchemaManager};
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{Connection, Executor};

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");

const COMPANIES_AND_COUNTS_SQL: &str = r#"
    SELECT e.name AS company_name, COUNT(v.id) AS vacancies_count
    FROM employers e
    LEFT JOIN vacancies v ON v.employer_id = e.id
    GROUP BY e.id, e.name
    ORDER BY vacancies_count DESC
"#;

const ALL_VACANCIES_SQL: &str = r#"
    SELECT e.name AS company_name, v.name AS vacancy_name, v.salary_from, v.salary_to, v.url
    FROM vacancies v
    JOIN employers e ON e.id = v.employer_id
    ORDER BY v.name
"#;

const AVG_SALARY_SQL: &str = r#"
    SELECT ROUND(AVG((v.salary_from + v.salary_to) / 2.0)::numeric, 2)::float8 AS avg_salary
    FROM vacancies v
    WHERE v.salary_from > 0 AND v.salary_to > 0
"#;

const HIGHER_SALARY_SQL: &str = r#"
    SELECT e.name AS company_name, v.name AS vacancy_name, v.salary_from, v.salary_to, v.url
    FROM vacancies v
    JOIN employers e ON e.id = v.employer_id
    WHERE v.salary_from > (SELECT AVG(salary_from) FROM vacancies WHERE salary_from > 0)
    ORDER BY v.name
"#;

const KEYWORD_SQL: &str = r#"
    SELECT e.name AS company_name, v.name AS vacancy_name, v.salary_from, v.salary_to, v.url
    FROM vacancies v
    JOIN employers e ON e.id = v.employer_id
    WHERE v.name ILIKE $1
    ORDER BY v.name
"#;

type ListingRow = (String, String, i64, i64, String);

fn listing_from_row(row: ListingRow) -> VacancyListing {
    let (company_name, vacancy_name, salary_from, salary_to, url) = row;
    VacancyListing {
        company_name,
        vacancy_name,
        salary_from,
        salary_to,
        url,
    }
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// Names reaching here are validated identifiers, quoting only guards case.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

/// One PostgreSQL database used as a disposable store instance.
///
/// Every operation opens its own connection and closes it before
/// returning. Lifecycle statements run against the maintenance database.
pub struct PgStore {
    config: StoreConfig,
    name: StoreName,
}

impl PgStore {
    pub fn new(config: StoreConfig, name: StoreName) -> Result<Self> {
        name.ensure_not(&config.maintenance_database)?;
        Ok(Self { config, name })
    }

    pub fn name(&self) -> &StoreName {
        &self.name
    }

    /// Every field comes from `StoreConfig`; `PG*` variables and
    /// `.pgpass` are overridden or skipped.
    pub fn connect_options(&self, database: &str) -> Result<PgConnectOptions> {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.config.host)
            .port(self.config.port)
            .username(self.config.user()?)
            .password(self.config.password.as_deref().unwrap_or_default())
            .database(database)
            .ssl_mode(PgSslMode::Prefer)
            .application_name("hh-vacancy-etl");
        Ok(options)
    }

    async fn connect(&self, database: &str) -> Result<PgConnection> {
        tracing::debug!(
            "Connecting to {}:{}/{}",
            self.config.host,
            self.config.port,
            database
        );
        let conn = PgConnection::connect_with(&self.connect_options(database)?).await?;
        Ok(conn)
    }

    async fn connect_instance(&self) -> Result<PgConnection> {
        self.connect(self.name.as_str()).await
    }

    async fn connect_maintenance(&self) -> Result<PgConnection> {
        self.connect(&self.config.maintenance_database).await
    }

    async fn fetch_listings(&self, sql: &str, keyword: Option<&str>) -> Result<Vec<VacancyListing>> {
        let mut conn = self.connect_instance().await?;
        let mut query = sqlx::query_as::<_, ListingRow>(sql);
        if let Some(keyword) = keyword {
            query = query.bind(like_pattern(keyword));
        }
        let rows = query.fetch_all(&mut conn).await?;
        conn.close().await?;

        Ok(rows.into_iter().map(listing_from_row).collect())
    }
}

#[async_trait]
impl SchemaManager for PgStore {
    async fn recreate(&self) -> Result<()> {
        let quoted = quote_identifier(self.name.as_str());
        let mut conn = self.connect_maintenance().await?;

        tracing::info!("🗄️ Recreating store instance {}", self.name);
        let drop_sql = format!("DROP DATABASE IF EXISTS {}", quoted);
        conn.execute(sqlx::raw_sql(&drop_sql)).await?;
        let create_sql = format!("CREATE DATABASE {}", quoted);
        conn.execute(sqlx::raw_sql(&create_sql)).await?;

        conn.close().await?;
        Ok(())
    }

    async fn create_schema(&self) -> Result<()> {
        let mut conn = self.connect_instance().await?;
        let mut tx = conn.begin().await?;
        tx.execute(sqlx::raw_sql(SCHEMA_SQL)).await?;
        tx.commit().await?;
        conn.close().await?;

        tracing::debug!("Schema created in {}", self.name);
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        let mut conn = self.connect_maintenance().await?;
        let drop_sql = format!(
            "DROP DATABASE IF EXISTS {}",
            quote_identifier(self.name.as_str())
        );
        conn.execute(sqlx::raw_sql(&drop_sql)).await?;
        conn.close().await?;

        tracing::info!("🧹 Dropped store instance {}", self.name);
        Ok(())
    }
}

#[async_trait]
impl Loader for PgStore {
    async fn insert_employers(&self, employers: &[Employer]) -> Result<u64> {
        let mut conn = self.connect_instance().await?;
        let mut tx = conn.begin().await?;
        let mut inserted = 0;

        for employer in employers {
            inserted += sqlx::query("INSERT INTO employers (id, name) VALUES ($1, $2)")
                .bind(employer.id)
                .bind(&employer.name)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;
        Ok(inserted)
    }

    async fn insert_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64> {
        let mut conn = self.connect_instance().await?;
        let mut tx = conn.begin().await?;
        let mut inserted = 0;

        for vacancy in vacancies {
            inserted += sqlx::query(
                r#"
                INSERT INTO vacancies (id, name, url, salary_from, salary_to, employer_id, area)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(vacancy.id)
            .bind(&vacancy.name)
            .bind(&vacancy.url)
            .bind(vacancy.salary_from)
            .bind(vacancy.salary_to)
            .bind(vacancy.employer_id)
            .bind(&vacancy.area)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;
        Ok(inserted)
    }
}

#[async_trait]
impl QueryService for PgStore {
    async fn companies_and_vacancies_count(&self) -> Result<Vec<CompanyVacancyCount>> {
        let mut conn = self.connect_instance().await?;
        let rows = sqlx::query_as::<_, (String, i64)>(COMPANIES_AND_COUNTS_SQL)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        Ok(rows
            .into_iter()
            .map(|(company_name, vacancies_count)| CompanyVacancyCount {
                company_name,
                vacancies_count,
            })
            .collect())
    }

    async fn all_vacancies(&self) -> Result<Vec<VacancyListing>> {
        self.fetch_listings(ALL_VACANCIES_SQL, None).await
    }

    async fn avg_salary(&self) -> Result<Option<f64>> {
        let mut conn = self.connect_instance().await?;
        let avg = sqlx::query_scalar::<_, Option<f64>>(AVG_SALARY_SQL)
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(avg)
    }

    async fn vacancies_with_higher_salary(&self) -> Result<Vec<VacancyListing>> {
        self.fetch_listings(HIGHER_SALARY_SQL, None).await
    }

    async fn vacancies_with_keyword(&self, keyword: &str) -> Result<Vec<VacancyListing>> {
        self.fetch_listings(KEYWORD_SQL, Some(keyword)).await
    }
}
