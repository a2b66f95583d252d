//! CSV export of the whole directory.
//!
//! The document starts with a six-line title block (report name, blank line,
//! generation date, user count, blank line, column header) followed by one row per
//! user. Fields go through the `csv` writer, so commas, quotes and line breaks in
//! names or e-mails are quoted instead of corrupting the columns.

use crate::{
    config::ReportSettings,
    core::{
        directory::UserRecord,
        format::{format_date, iso_date, or_not_available},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Number of lines before the first user row.
pub const TITLE_BLOCK_LINES: usize = 6;

const COLUMNS: [&str; 8] = [
    "Nome",
    "E-mail",
    "Telefone",
    "Data Cadastro",
    "Último Acesso",
    "Renda Mensal",
    "Gastos Mensais",
    "Total Dívidas",
];

/// A generated CSV file ready to be downloaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested download name
    pub file_name: String,
    /// UTF-8 document body
    pub content: String,
}

/// Download name of the export: `<prefix>-<YYYY-MM-DD>.csv`.
#[must_use]
pub fn csv_file_name(prefix: &str, generated_at: &DateTime<Utc>) -> String {
    format!("{prefix}-{}.csv", iso_date(generated_at))
}

/// Renders the directory as CSV text.
///
/// Monetary columns hold raw numbers; users without a snapshot get `0`.
pub fn generate_users_csv(
    users: &[UserRecord],
    generated_at: &DateTime<Utc>,
    settings: &ReportSettings,
) -> Result<String> {
    let offset = settings.display_offset();
    let mut writer = new_writer(Vec::new());

    writer.write_record([format!("{} - Relatório de Usuários", settings.brand)])?;
    write_blank_line(&mut writer)?;
    let generated_on = format_date(generated_at, &offset);
    let user_count = users.len().to_string();
    writer.write_record(["Data de Geração", generated_on.as_str()])?;
    writer.write_record(["Total de Usuários", user_count.as_str()])?;
    write_blank_line(&mut writer)?;
    writer.write_record(COLUMNS)?;

    for user in users {
        let (income, expenses, debts) = user
            .financial_data
            .as_ref()
            .map_or((0.0, 0.0, 0.0), |f| {
                (f.monthly_income, f.monthly_expenses, f.total_debts())
            });

        let registered_on = format_date(&user.created_at, &offset);
        let last_access_on = format_date(&user.last_access_at, &offset);
        let (income, expenses, debts) = (
            income.to_string(),
            expenses.to_string(),
            debts.to_string(),
        );

        writer.write_record([
            or_not_available(user.name.as_deref()),
            or_not_available(user.email.as_deref()),
            or_not_available(user.phone.as_deref()),
            registered_on.as_str(),
            last_access_on.as_str(),
            income.as_str(),
            expenses.as_str(),
            debts.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Report {
        message: format!("Failed to flush CSV writer: {e}"),
    })?;
    debug!("Generated users CSV with {} rows", users.len());

    String::from_utf8(bytes).map_err(|e| Error::Report {
        message: format!("CSV output is not valid UTF-8: {e}"),
    })
}

fn new_writer(buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf)
}

/// Writes an empty line; the writer itself would emit `""` for a lone empty field.
fn write_blank_line(writer: &mut csv::Writer<Vec<u8>>) -> Result<()> {
    let mut buf = std::mem::replace(writer, new_writer(Vec::new()))
        .into_inner()
        .map_err(|e| Error::Report {
            message: format!("Failed to flush CSV writer: {e}"),
        })?;
    buf.push(b'\n');
    *writer = new_writer(buf);
    Ok(())
}

/// Renders the directory as CSV and names the file after the generation date.
pub fn export_users_csv(
    users: &[UserRecord],
    generated_at: &DateTime<Utc>,
    settings: &ReportSettings,
) -> Result<CsvExport> {
    Ok(CsvExport {
        file_name: csv_file_name(&settings.csv_prefix, generated_at),
        content: generate_users_csv(users, generated_at, settings)?,
    })
}
