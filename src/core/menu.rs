use std::fmt;
use thiserror::Error;

/// Typed at the menu prompt to end the session.
pub const STOP_WORD: &str = "stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    CompaniesAndCounts,
    AllVacancies,
    AverageSalary,
    AboveAverageSalary,
    SearchByKeyword,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuInputError {
    #[error("Unknown query number {0}. Choose an existing query number or type 'stop' to finish.")]
    UnknownNumber(i64),

    #[error("Invalid input. Please enter a query number.")]
    NotANumber(String),
}

pub const QUERIES: [MenuCommand; 5] = [
    MenuCommand::CompaniesAndCounts,
    MenuCommand::AllVacancies,
    MenuCommand::AverageSalary,
    MenuCommand::AboveAverageSalary,
    MenuCommand::SearchByKeyword,
];

impl MenuCommand {
    pub fn parse(input: &str) -> Result<Self, MenuInputError> {
        let input = input.trim();
        if input.eq_ignore_ascii_case(STOP_WORD) {
            return Ok(MenuCommand::Stop);
        }

        let number: i64 = input
            .parse()
            .map_err(|_| MenuInputError::NotANumber(input.to_string()))?;

        QUERIES
            .iter()
            .copied()
            .find(|command| command.number() == Some(number))
            .ok_or(MenuInputError::UnknownNumber(number))
    }

    pub fn number(&self) -> Option<i64> {
        match self {
            MenuCommand::CompaniesAndCounts => Some(1),
            MenuCommand::AllVacancies => Some(2),
            MenuCommand::AverageSalary => Some(3),
            MenuCommand::AboveAverageSalary => Some(4),
            MenuCommand::SearchByKeyword => Some(5),
            MenuCommand::Stop => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuCommand::CompaniesAndCounts => "All companies and the number of vacancies at each",
            MenuCommand::AllVacancies => {
                "All vacancies with company name, vacancy name, salary and link"
            }
            MenuCommand::AverageSalary => "Average salary across vacancies",
            MenuCommand::AboveAverageSalary => "Vacancies with a salary above the average",
            MenuCommand::SearchByKeyword => "Vacancies whose name contains a keyword",
            MenuCommand::Stop => "Finish",
        }
    }
}

/// The numbered menu printed before every prompt.
pub struct Menu;

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Choose a query or type '{}':", STOP_WORD)?;
        for command in QUERIES {
            if let Some(number) = command.number() {
                writeln!(f, "{} - {}", number, command.description())?;
            }
        }
        Ok(())
    }
}
