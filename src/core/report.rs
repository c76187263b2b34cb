use crate::domain::model::{CompanyVacancyCount, VacancyListing};

pub const NO_AVERAGE_SALARY: &str = "No average salary data.";
pub const NO_VACANCIES: &str = "No vacancies found.";
pub const NO_COMPANIES: &str = "No companies found.";

pub fn company_count_line(row: &CompanyVacancyCount) -> String {
    format!("{}: {} vacancies", row.company_name, row.vacancies_count)
}

pub fn company_count_lines(rows: &[CompanyVacancyCount]) -> Vec<String> {
    if rows.is_empty() {
        return vec![NO_COMPANIES.to_string()];
    }
    rows.iter().map(company_count_line).collect()
}

pub fn listing_line(row: &VacancyListing) -> String {
    format!(
        "Company: {}, Vacancy: {}, Salary from: {}, Salary to: {}, Link: {}",
        row.company_name, row.vacancy_name, row.salary_from, row.salary_to, row.url
    )
}

pub fn average_salary_line(avg: Option<f64>) -> String {
    match avg {
        Some(avg) => format!("Average salary across vacancies: {:.2}", avg),
        None => NO_AVERAGE_SALARY.to_string(),
    }
}

pub fn listing_lines(rows: &[VacancyListing]) -> Vec<String> {
    if rows.is_empty() {
        return vec![NO_VACANCIES.to_string()];
    }
    rows.iter().map(listing_line).collect()
}
