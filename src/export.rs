//! CSV export of entry views.

use std::io;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Amount, Category, Entry};

/// Column names, in row order.
const HEADER: [&str; 5] = ["Type", "Description", "Category", "Amount", "Date"];

/// One exported line, serialized in [`HEADER`] order.
#[derive(Serialize)]
struct ExportRow<'entry> {
    /// `Income` or `Expense`.
    kind: &'static str,
    /// Entry source text.
    description: &'entry str,
    /// Category label.
    category: &'static str,
    /// Amount in major units.
    amount: Amount,
    /// Entry date.
    date: NaiveDate,
}

impl<'entry> ExportRow<'entry> {
    /// Borrows the exported fields of an entry.
    fn from_entry<C: Category>(entry: &'entry Entry<C>) -> Self {
        Self {
            kind: C::KIND.title(),
            description: &entry.source,
            category: entry.category.label(),
            amount: entry.amount,
            date: entry.date,
        }
    }
}

/// Writes income rows then expense rows under the header
/// `Type,Description,Category,Amount,Date`.
///
/// The header is written even when both views are empty. Fields containing
/// commas, quotes or newlines are quoted.
///
/// # Errors
///
/// Returns [`crate::error::TrackerError::Csv`] if a row cannot be written
/// or the writer cannot be flushed.
pub fn write_csv<'entry, W, I, E, TI, TE>(writer: W, income: TI, expenses: TE) -> Result<()>
where
    W: io::Write,
    I: Category,
    E: Category,
    TI: IntoIterator<Item = &'entry Entry<I>>,
    TE: IntoIterator<Item = &'entry Entry<E>>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADER)?;
    for entry in income {
        csv.serialize(ExportRow::from_entry(entry))?;
    }
    for entry in expenses {
        csv.serialize(ExportRow::from_entry(entry))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Suggested file name for an export made on `date`:
/// `financial-tracker-YYYY-MM-DD.csv`.
#[inline]
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("financial-tracker-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    use crate::models::{EntryId, ExpenseCategory, ExpenseEntry, IncomeCategory, IncomeEntry};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn render(income: &[IncomeEntry], expenses: &[ExpenseEntry]) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, income, expenses).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_export_is_just_the_header() {
        assert_eq!(render(&[], &[]), "Type,Description,Category,Amount,Date\n");
    }

    #[test]
    fn income_rows_come_before_expense_rows() {
        let created = DateTime::from_timestamp(0, 0).unwrap();
        let income = vec![IncomeEntry {
            id: EntryId::from("1"),
            source: "Monthly Salary".to_owned(),
            category: IncomeCategory::Salary,
            amount: Amount::from_major(80_000),
            date: date(2025, 1, 1),
            created_at: created,
        }];
        let expenses = vec![ExpenseEntry {
            id: EntryId::from("1"),
            source: "Coffee, beans".to_owned(),
            category: ExpenseCategory::Food,
            amount: Amount::new(1250),
            date: date(2025, 1, 10),
            created_at: created,
        }];

        let text = render(&income, &expenses);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Type,Description,Category,Amount,Date",
                "Income,Monthly Salary,Salary,80000,2025-01-01",
                "Expense,\"Coffee, beans\",Food,12.5,2025-01-10",
            ]
        );
    }

    #[test]
    fn file_name_uses_iso_date() {
        assert_eq!(
            export_file_name(date(2025, 3, 7)),
            "financial-tracker-2025-03-07.csv"
        );
    }
}
