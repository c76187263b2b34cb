use crate::core::etl::{EtlEngine, SetupReport};
use crate::core::menu::{Menu, MenuCommand};
use crate::core::report;
use crate::domain::model::{LoadSummary, StoreName};
use crate::domain::ports::{VacancySource, VacancyStore};
use crate::utils::error::{EtlError, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Store not yet created and loaded.
    Setup,
    /// Reading query selections.
    Menu,
    /// Store torn down; the session cannot be reused.
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub load: LoadSummary,
    pub fetch_failures: usize,
    pub queries_run: usize,
}

/// Console driver: loads a fresh store once, answers menu queries until the
/// stop word or end of input, then drops the store.
pub struct Session<F, S, R, W> {
    source: F,
    store: S,
    input: R,
    output: W,
    state: SessionState,
}

impl<F, S, R, W> Session<F, S, R, W>
where
    F: VacancySource,
    S: VacancyStore,
    R: BufRead,
    W: Write,
{
    pub fn new(source: F, store: S, input: R, output: W) -> Self {
        Self {
            source,
            store,
            input,
            output,
            state: SessionState::Setup,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<SessionSummary> {
        if self.state != SessionState::Setup {
            return Err(EtlError::ValidationError {
                message: "Session already ran".to_string(),
            });
        }

        let report = match self.setup().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("❌ Setup failed: {}", e);
                writeln!(self.output, "Setup failed: {}", e.user_friendly_message())?;
                if let Err(teardown) = self.close().await {
                    writeln!(
                        self.output,
                        "Could not drop the store instance: {}",
                        teardown.user_friendly_message()
                    )?;
                }
                return Err(e);
            }
        };

        self.state = SessionState::Menu;
        let outcome = self.menu_loop().await;
        let closed = self.close().await;

        if let (Err(_), Err(teardown)) = (&outcome, &closed) {
            writeln!(
                self.output,
                "Could not drop the store instance: {}",
                teardown.user_friendly_message()
            )?;
        }
        let queries_run = outcome?;
        closed?;
        writeln!(self.output, "Session finished.")?;

        Ok(SessionSummary {
            load: report.load,
            fetch_failures: report.failures.len(),
            queries_run,
        })
    }

    async fn setup(&mut self) -> Result<SetupReport> {
        writeln!(self.output, "Please wait, loading data...")?;
        self.output.flush()?;

        let report = EtlEngine::new(&self.source, &self.store).run().await?;

        writeln!(
            self.output,
            "Loaded {} employers and {} vacancies.",
            report.load.employers_inserted, report.load.vacancies_inserted
        )?;
        if !report.is_complete() {
            writeln!(
                self.output,
                "Warning: {} API requests failed, the data set is incomplete:",
                report.failures.len()
            )?;
            for failure in &report.failures {
                writeln!(self.output, "  - {}", failure)?;
            }
        }
        Ok(report)
    }

    async fn close(&mut self) -> Result<()> {
        self.state = SessionState::Closed;
        if let Err(e) = self.store.teardown().await {
            tracing::error!("❌ Failed to drop store instance: {}", e);
            return Err(e);
        }
        Ok(())
    }

    async fn menu_loop(&mut self) -> Result<usize> {
        let mut queries_run = 0;

        loop {
            write!(self.output, "\n{}Your choice: ", Menu)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                tracing::debug!("Input closed, leaving menu");
                break;
            };

            let command = match MenuCommand::parse(&line) {
                Ok(MenuCommand::Stop) => break,
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    continue;
                }
            };

            if !self.dispatch(command).await? {
                break;
            }
            queries_run += 1;
        }

        writeln!(self.output, "Work finished.")?;
        Ok(queries_run)
    }

    /// Runs one query and prints it. `false` when input ended mid-command.
    async fn dispatch(&mut self, command: MenuCommand) -> Result<bool> {
        tracing::debug!("Running query {:?}", command);

        let lines: Vec<String> = match command {
            MenuCommand::CompaniesAndCounts => {
                let rows = self.store.companies_and_vacancies_count().await?;
                writeln!(self.output, "\nAll companies and their vacancy counts:")?;
                report::company_count_lines(&rows)
            }
            MenuCommand::AllVacancies => {
                let rows = self.store.all_vacancies().await?;
                writeln!(self.output, "\nAll vacancies:")?;
                report::listing_lines(&rows)
            }
            MenuCommand::AverageSalary => {
                let avg = self.store.avg_salary().await?;
                vec![format!("\n{}", report::average_salary_line(avg))]
            }
            MenuCommand::AboveAverageSalary => {
                let rows = self.store.vacancies_with_higher_salary().await?;
                writeln!(self.output, "\nVacancies with a salary above the average:")?;
                report::listing_lines(&rows)
            }
            MenuCommand::SearchByKeyword => {
                write!(self.output, "Enter a keyword to search vacancies: ")?;
                self.output.flush()?;
                let Some(keyword) = self.read_line()? else {
                    return Ok(false);
                };
                let keyword = keyword.trim().to_string();

                let rows = self.store.vacancies_with_keyword(&keyword).await?;
                writeln!(self.output, "\nVacancies matching '{}':", keyword)?;
                report::listing_lines(&rows)
            }
            MenuCommand::Stop => return Ok(false),
        };

        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        Ok(true)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        read_line(&mut self.input)
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Asks for a store name until a valid one is given.
pub fn prompt_store_name<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    sandbox_prefix: &str,
) -> Result<StoreName> {
    loop {
        write!(output, "Enter a database name: ")?;
        output.flush()?;

        let Some(raw) = read_line(input)? else {
            return Err(EtlError::MissingConfigError {
                field: "database".to_string(),
            });
        };

        match StoreName::sandboxed(&raw, sandbox_prefix) {
            Ok(name) => {
                writeln!(output, "Using database '{}'.", name)?;
                return Ok(name);
            }
            Err(e) => writeln!(output, "{}", e.user_friendly_message())?,
        }
    }
}
