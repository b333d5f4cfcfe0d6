//! Interactive data entry.
//!
//! Walks the form one field at a time. An empty answer keeps the value in
//! brackets, `-` clears it. Street and house carry over between residents;
//! an empty name ends the session.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use survey_core::{FormField, SurveyForm, SurveyGateway};
use survey_runtime::SurveySession;

const CLEAR: &str = "-";

/// Run the prompt loop until an empty name or end of input. Returns the
/// number of residents saved.
pub async fn run_entry<G, R, W>(
    session: &mut SurveySession<G>,
    mut input: R,
    mut output: W,
) -> Result<usize>
where
    G: SurveyGateway,
    R: BufRead,
    W: Write,
{
    session.enter_entry();
    let mut form = SurveyForm::new();
    let mut saved = 0;

    'residents: loop {
        writeln!(output, "\n-- New resident (empty name to finish) --")?;
        for field in FormField::ALL {
            let Some(answer) = prompt(&mut input, &mut output, field, form.get(field))? else {
                break 'residents;
            };
            let value = match answer.as_str() {
                "" => form.get(field).to_string(),
                CLEAR => String::new(),
                other => other.to_string(),
            };
            if field == FormField::Name && value.trim().is_empty() {
                break 'residents;
            }
            if field == FormField::Dob {
                form.set_birth_date(&value, session.calendar());
            } else {
                form.set(field, value);
            }
        }

        match session.submit(&mut form).await {
            Ok(()) => saved += 1,
            Err(e) => tracing::debug!(error = %e, "entry not saved, form kept"),
        }
        if let Some(notice) = session.status().current() {
            writeln!(output, "{}", notice.message)?;
        }
    }

    writeln!(output, "{saved} resident(s) saved.")?;
    Ok(saved)
}

/// Ask for one field. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    field: FormField,
    current: &str,
) -> Result<Option<String>> {
    if current.is_empty() {
        write!(output, "{}: ", field.label())?;
    } else {
        write!(output, "{} [{current}]: ", field.label())?;
    }
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).trim().to_string()))
}
