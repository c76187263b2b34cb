pub mod etl;
pub mod menu;
pub mod report;
pub mod session;

pub use crate::domain::model::{Dataset, Employer, Vacancy};
pub use crate::domain::ports::{VacancySource, VacancyStore};
pub use crate::utils::error::Result;
