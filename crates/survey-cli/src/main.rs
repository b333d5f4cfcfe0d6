//! # survey
//!
//! Household survey client: enters residents into the spreadsheet gateway,
//! lists and filters the stored records, and exports them.

#![deny(unsafe_code)]

mod entry;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use survey_core::{Calendar, FilterCriteria, FormField, SurveyForm, TableView, age_on};
use survey_core::logging::{init_json_subscriber, init_subscriber};
use survey_gateway::HttpGateway;
use survey_runtime::{SurveySession, resolve_calendar};
use survey_settings::SurveySettings;

/// Household survey client.
#[derive(Parser, Debug)]
#[command(name = "survey", version, about = "Household survey client")]
struct Cli {
    /// Settings file (defaults to `~/.survey/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Gateway endpoint URL (overrides settings).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level (overrides settings; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the age for a date of birth; prints nothing for an unusable date.
    Age {
        /// Date of birth.
        dob: String,
        /// Evaluate on this date instead of today.
        #[arg(long)]
        on: Option<String>,
    },
    /// Submit one record.
    Submit {
        /// Field assignment, e.g. `--set Name=Asha`. Repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(FormField, String)>,
    },
    /// Enter residents interactively.
    Entry,
    /// Fetch and print the record table.
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Export the filtered records.
    Export {
        /// Output format.
        #[arg(value_enum)]
        format: ExportFormat,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output directory (overrides settings).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// The four table filters.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct FilterArgs {
    /// Name contains (case-insensitive).
    #[arg(long, default_value = "")]
    name: String,
    /// Age contains.
    #[arg(long, default_value = "")]
    age: String,
    /// House number contains (case-insensitive).
    #[arg(long, default_value = "")]
    house: String,
    /// Birth year equals.
    #[arg(long, default_value = "")]
    year: String,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        Self {
            name: args.name,
            age: args.age,
            house: args.house,
            year: args.year,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    /// `.xlsx` workbook.
    Spreadsheet,
    /// `.pdf` report.
    Document,
}

fn parse_assignment(raw: &str) -> Result<(FormField, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let field = key.parse::<FormField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

fn load_settings(cli: &Cli) -> Result<SurveySettings> {
    let mut settings = match &cli.settings {
        Some(path) => survey_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => survey_settings::load_settings().context("Failed to load settings")?,
    };
    if let Some(url) = &cli.endpoint {
        settings.gateway.endpoint_url.clone_from(url);
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn open_session(settings: &SurveySettings) -> Result<SurveySession<HttpGateway>> {
    let gateway = HttpGateway::new(&settings.gateway).context("Failed to create gateway")?;
    Ok(SurveySession::from_settings(gateway, settings)?)
}

fn print_table(view: &TableView) {
    print!("{}", view.render_text());
    if view.message().is_some() {
        println!();
    }
}

fn print_status(session: &SurveySession<HttpGateway>) {
    if let Some(notice) = session.status().current() {
        println!("{}", notice.message);
    }
}

fn age_command(settings: &SurveySettings, dob: &str, on: Option<&str>) -> Result<Option<u32>> {
    let calendar: Calendar = resolve_calendar(&settings.display)?;
    let today = match on {
        Some(raw) => match calendar.parse_date(raw) {
            Some(date) => date,
            None => bail!("Unrecognised date for --on: {raw}"),
        },
        None => calendar.today(),
    };
    Ok(age_on(dob, today, &calendar))
}

async fn run(command: Command, settings: SurveySettings) -> Result<()> {
    match command {
        Command::Age { dob, on } => {
            if let Some(age) = age_command(&settings, &dob, on.as_deref())? {
                println!("{age}");
            }
        }
        Command::Submit { set } => {
            let mut session = open_session(&settings)?;
            let mut form = SurveyForm::new();
            for (field, value) in set {
                if field == FormField::Dob {
                    form.set_birth_date(&value, session.calendar());
                } else {
                    form.set(field, value);
                }
            }
            let result = session.submit(&mut form).await;
            print_status(&session);
            result?;
        }
        Command::Entry => {
            let mut session = open_session(&settings)?;
            let stdin = std::io::stdin();
            let _ = entry::run_entry(&mut session, stdin.lock(), std::io::stdout()).await?;
        }
        Command::List { filter } => {
            let mut session = open_session(&settings)?;
            session.set_criteria(filter.into());
            let loaded = session.enter_details().await;
            print_table(&session.render());
            let _ = loaded?;
        }
        Command::Export {
            format,
            filter,
            out,
        } => {
            let mut session = open_session(&settings)?;
            if let Some(dir) = out {
                session.set_output_dir(dir.display().to_string());
            }
            session.set_criteria(filter.into());
            let _ = session.enter_details().await?;
            let written = match format {
                ExportFormat::Spreadsheet => session.export_spreadsheet(),
                ExportFormat::Document => session.export_document(),
            };
            print_status(&session);
            let path = written?;
            tracing::info!(path = %path.display(), "export complete");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    if settings.logging.json {
        init_json_subscriber(&settings.logging.level);
    } else {
        init_subscriber(&settings.logging.level);
    }
    tracing::debug!(endpoint = %settings.gateway.endpoint_url, "settings loaded");

    run(cli.command, settings).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_age_command() {
        let cli = Cli::parse_from(["survey", "age", "2000-06-15", "--on", "2024-06-14"]);
        match cli.command {
            Command::Age { dob, on } => {
                assert_eq!(dob, "2000-06-15");
                assert_eq!(on.as_deref(), Some("2024-06-14"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["survey", "list", "--endpoint", "https://example.test/exec"]);
        assert_eq!(cli.endpoint.as_deref(), Some("https://example.test/exec"));
        assert!(cli.settings.is_none());
    }

    #[test]
    fn cli_submit_assignments() {
        let cli = Cli::parse_from([
            "survey", "submit", "--set", "Name=Asha Devi", "--set", "dob=1990-05-11", "--set",
            "Diseases=a=b",
        ]);
        let Command::Submit { set } = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(
            set,
            vec![
                (FormField::Name, "Asha Devi".to_string()),
                (FormField::Dob, "1990-05-11".to_string()),
                (FormField::Diseases, "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn cli_rejects_unknown_field() {
        assert!(Cli::try_parse_from(["survey", "submit", "--set", "SNo=4"]).is_err());
        assert!(Cli::try_parse_from(["survey", "submit", "--set", "Name"]).is_err());
    }

    #[test]
    fn cli_export_with_filters() {
        let cli = Cli::parse_from([
            "survey", "export", "document", "--house", "12b", "--year", "1990", "--out", "/tmp/x",
        ]);
        let Command::Export { format, filter, out } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(format, ExportFormat::Document);
        assert_eq!(out, Some(PathBuf::from("/tmp/x")));
        let criteria = FilterCriteria::from(filter);
        assert_eq!(criteria.house, "12b");
        assert_eq!(criteria.year, "1990");
        assert!(criteria.name.is_empty());
    }

    #[test]
    fn list_filters_default_to_empty() {
        let cli = Cli::parse_from(["survey", "list"]);
        let Command::List { filter } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(filter, FilterArgs::default());
    }

    #[test]
    fn age_command_evaluates_on_date() {
        let mut settings = SurveySettings::default();
        settings.display.utc_offset = Some("+00:00".into());
        assert_eq!(age_command(&settings, "2000-06-15", Some("2024-06-14")).unwrap(), Some(23));
        assert_eq!(age_command(&settings, "2000-06-15", Some("2024-06-15")).unwrap(), Some(24));
        assert_eq!(age_command(&settings, "not a date", Some("2024-06-15")).unwrap(), None);
        assert!(age_command(&settings, "2000-06-15", Some("tomorrow")).is_err());
    }

    #[test]
    fn settings_file_and_flags_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"export": {"outputDir": "/srv/out"}}"#).unwrap();
        let cli = Cli::parse_from([
            "survey",
            "--settings",
            path.to_str().unwrap(),
            "--log-level",
            "debug",
            "list",
        ]);
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.export.output_dir, "/srv/out");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn invalid_endpoint_flag_is_rejected() {
        let cli = Cli::parse_from(["survey", "--endpoint", "not-a-url", "list"]);
        assert!(load_settings(&cli).is_err());
    }
}
