//! Command-line front end for the personal finance tracker.

extern crate alloc;

use alloc::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use fintrack::error::TrackerError;
use fintrack::export::export_file_name;
use fintrack::filter::YearMonth;
use fintrack::models::{
    Amount, Category, Currency, Entry, EntryDraft, EntryId, EntryKind, ExpenseCategory,
    IncomeCategory, NaiveDate,
};
use fintrack::storage::{FileStorage, Storage};
use fintrack::summary::{Flow, Summary, category_share, ranked_categories};
use fintrack::tracker::Tracker;
use owo_colors::OwoColorize;

/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "FINTRACK_DATA_DIR";

/// Track income and expenses, and review monthly summaries.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Override the storage directory (default: $FINTRACK_DATA_DIR, then
    /// the XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Record a new income or expense entry.
    Add(AddArgs),
    /// Change fields of an existing entry.
    Edit(EditArgs),
    /// Delete an entry.
    Delete {
        /// `income` or `expense`.
        #[arg(value_parser = parse_kind)]
        kind: EntryKind,
        /// Entry id.
        id: String,
    },
    /// List entries, most recent first.
    List {
        /// `income` or `expense`.
        #[arg(value_parser = parse_kind)]
        kind: EntryKind,
        /// Only entries of this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// Show total income, expenses, net savings and savings rate.
    Summary {
        /// Only entries of this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// Show expenses per category.
    Breakdown {
        /// Only entries of this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// Show income and expenses per day.
    Daily {
        /// Only entries of this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// Show income and expenses per month over the whole history.
    Monthly,
    /// Show or change the display currency.
    Currency {
        /// New currency code (BDT, USD, EUR, GBP, INR, JPY).
        #[arg(value_parser = parse_currency)]
        code: Option<Currency>,
    },
    /// Export entries as CSV.
    Export {
        /// Only entries of this month (YYYY-MM).
        #[arg(long, value_parser = parse_month)]
        month: Option<YearMonth>,
        /// Output path (default: financial-tracker-<today>.csv).
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Replace all entries with a small sample data set.
    Sample,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// `income` or `expense`.
    #[arg(value_parser = parse_kind)]
    kind: EntryKind,
    /// Description, e.g. "Monthly Salary".
    #[arg(long)]
    source: String,
    /// Category label, e.g. "Salary" or "Food".
    #[arg(long)]
    category: String,
    /// Amount in major units, e.g. 12.50.
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    amount: Amount,
    /// Entry date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

/// Arguments for the `edit` subcommand.
#[derive(Debug, Args)]
struct EditArgs {
    /// `income` or `expense`.
    #[arg(value_parser = parse_kind)]
    kind: EntryKind,
    /// Entry id.
    id: String,
    /// New description.
    #[arg(long)]
    source: Option<String>,
    /// New category label.
    #[arg(long)]
    category: Option<String>,
    /// New amount.
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    amount: Option<Amount>,
    /// New date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses `YYYY-MM` for clap.
fn parse_month(s: &str) -> Result<YearMonth, String> {
    s.parse().map_err(|err: TrackerError| err.to_string())
}

/// Parses an entry kind for clap.
fn parse_kind(s: &str) -> Result<EntryKind, String> {
    s.parse().map_err(|err: TrackerError| err.to_string())
}

/// Parses a decimal amount for clap.
fn parse_amount(s: &str) -> Result<Amount, String> {
    s.parse().map_err(|err: TrackerError| err.to_string())
}

/// Parses a currency code for clap.
fn parse_currency(s: &str) -> Result<Currency, String> {
    s.parse().map_err(|err: TrackerError| err.to_string())
}

/// Picks the data directory: the flag, then the environment, then none
/// (meaning the platform default).
fn resolve_data_dir(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| {
        std::env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> fintrack::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Prints an error line and returns a failure exit code.
fn fail(what: &str, err: &dyn core::fmt::Display) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {what}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Asks a yes/no question on `output` and reads the answer from `input`.
///
/// Anything other than `y` or `yes` is a no, including end of input.
fn confirm_with<R: BufRead, W: io::Write>(
    mut input: R,
    mut output: W,
    question: &str,
) -> io::Result<bool> {
    write!(output, "{question} {} ", "[y/N]".dimmed())?;
    output.flush()?;
    let mut answer = String::new();
    let _read = input.read_line(&mut answer)?;
    let reply = answer.trim();
    Ok(reply.eq_ignore_ascii_case("y") || reply.eq_ignore_ascii_case("yes"))
}

/// Asks for confirmation on the terminal unless `yes` is set.
fn confirm(yes: bool, question: &str) -> io::Result<bool> {
    if yes {
        return Ok(true);
    }
    confirm_with(io::stdin().lock(), io::stderr().lock(), question)
}

/// Prints that an action was cancelled.
fn cancelled() -> io::Result<ExitCode> {
    writeln!(io::stdout().lock(), "{}", "Cancelled.".dimmed())?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let storage = match create_storage(resolve_data_dir(cli.data_dir)) {
        Ok(storage) => storage,
        Err(err) => return fail("failed to initialize storage", &err),
    };

    let mut tracker = match Tracker::builder().storage(storage).open() {
        Ok(tracker) => tracker,
        Err(err) => return fail("failed to open tracker", &err),
    };
    if tracker.recovered_from_corruption() {
        let backup = tracker.corrupt_backup().unwrap_or("nowhere");
        writeln!(
            io::stderr().lock(),
            "{} stored data could not be read and was moved to {backup}; starting with an empty tracker",
            "warning:".yellow().bold()
        )?;
    }

    dispatch(&mut tracker, cli.command, cli.yes)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: Storage>(
    tracker: &mut Tracker<S>,
    command: Command,
    yes: bool,
) -> io::Result<ExitCode> {
    match command {
        Command::Add(args) => cmd_add(tracker, args, yes),
        Command::Edit(args) => cmd_edit(tracker, args, yes),
        Command::Delete { kind, id } => cmd_delete(tracker, kind, &EntryId::from(id), yes),
        Command::List { kind, month } => cmd_list(tracker, kind, month),
        Command::Summary { month } => cmd_summary(tracker, month),
        Command::Breakdown { month } => cmd_breakdown(tracker, month),
        Command::Daily { month } => cmd_daily(tracker, month),
        Command::Monthly => cmd_monthly(tracker),
        Command::Currency { code } => cmd_currency(tracker, code),
        Command::Export { month, output } => cmd_export(tracker, month, output),
        Command::Sample => cmd_sample(tracker, yes),
    }
}

/// Builds a new-entry draft from `add` arguments.
fn new_draft<C: Category>(args: &AddArgs, today: NaiveDate) -> fintrack::error::Result<EntryDraft<C>> {
    let category: C = args.category.parse()?;
    Ok(EntryDraft::new(
        args.source.clone(),
        category,
        args.amount,
        args.date.unwrap_or(today),
    ))
}

/// Applies `edit` arguments on top of an existing entry.
fn edited_draft<C: Category>(
    entry: &Entry<C>,
    args: &EditArgs,
) -> fintrack::error::Result<EntryDraft<C>> {
    let mut draft = entry.to_draft();
    if let Some(source) = args.source.as_ref() {
        draft.source.clone_from(source);
    }
    if let Some(category) = args.category.as_deref() {
        draft.category = Some(category.parse()?);
    }
    if let Some(amount) = args.amount {
        draft.amount = Some(amount);
    }
    if let Some(date) = args.date {
        draft.date = Some(date);
    }
    Ok(draft)
}

/// Asks before saving a draft dated after today.
fn confirm_date<S: Storage, C>(
    tracker: &Tracker<S>,
    draft: &EntryDraft<C>,
    yes: bool,
) -> io::Result<bool> {
    match draft.date {
        Some(date) if tracker.is_future_date(date) => confirm(
            yes,
            &format!("{} is in the future. Save anyway?", format_date(date)),
        ),
        _ => Ok(true),
    }
}

/// Executes the `add` subcommand.
fn cmd_add<S: Storage>(tracker: &mut Tracker<S>, args: AddArgs, yes: bool) -> io::Result<ExitCode> {
    let today = tracker.today();
    match args.kind {
        EntryKind::Income => {
            let draft = match new_draft::<IncomeCategory>(&args, today) {
                Ok(draft) => draft,
                Err(err) => return fail("invalid income", &err),
            };
            if !confirm_date(tracker, &draft, yes)? {
                return cancelled();
            }
            match tracker.save_income(draft) {
                Ok(entry) => print_saved(&entry, tracker.currency(), "added"),
                Err(err) => fail("failed to add income", &err),
            }
        }
        EntryKind::Expense => {
            let draft = match new_draft::<ExpenseCategory>(&args, today) {
                Ok(draft) => draft,
                Err(err) => return fail("invalid expense", &err),
            };
            if !confirm_date(tracker, &draft, yes)? {
                return cancelled();
            }
            match tracker.save_expense(draft) {
                Ok(entry) => print_saved(&entry, tracker.currency(), "added"),
                Err(err) => fail("failed to add expense", &err),
            }
        }
    }
}

/// Executes the `edit` subcommand.
fn cmd_edit<S: Storage>(tracker: &mut Tracker<S>, args: EditArgs, yes: bool) -> io::Result<ExitCode> {
    let id = EntryId::from(args.id.as_str());
    match args.kind {
        EntryKind::Income => {
            let Some(existing) = tracker.find_income(&id) else {
                return fail("cannot edit", &TrackerError::NotFound { kind: args.kind, id });
            };
            let draft = match edited_draft(existing, &args) {
                Ok(draft) => draft,
                Err(err) => return fail("invalid income", &err),
            };
            if !confirm_date(tracker, &draft, yes)? {
                return cancelled();
            }
            match tracker.save_income(draft) {
                Ok(entry) => print_saved(&entry, tracker.currency(), "updated"),
                Err(err) => fail("failed to update income", &err),
            }
        }
        EntryKind::Expense => {
            let Some(existing) = tracker.find_expense(&id) else {
                return fail("cannot edit", &TrackerError::NotFound { kind: args.kind, id });
            };
            let draft = match edited_draft(existing, &args) {
                Ok(draft) => draft,
                Err(err) => return fail("invalid expense", &err),
            };
            if !confirm_date(tracker, &draft, yes)? {
                return cancelled();
            }
            match tracker.save_expense(draft) {
                Ok(entry) => print_saved(&entry, tracker.currency(), "updated"),
                Err(err) => fail("failed to update expense", &err),
            }
        }
    }
}

/// Executes the `delete` subcommand.
fn cmd_delete<S: Storage>(
    tracker: &mut Tracker<S>,
    kind: EntryKind,
    id: &EntryId,
    yes: bool,
) -> io::Result<ExitCode> {
    let exists = match kind {
        EntryKind::Income => tracker.find_income(id).is_some(),
        EntryKind::Expense => tracker.find_expense(id).is_some(),
    };
    if !exists {
        writeln!(
            io::stdout().lock(),
            "{}",
            format_args!("No {kind} entry with id {id}; nothing to delete.").dimmed()
        )?;
        return Ok(ExitCode::SUCCESS);
    }
    if !confirm(yes, &format!("Delete {kind} entry {id}?"))? {
        return cancelled();
    }

    let result = match kind {
        EntryKind::Income => tracker.delete_income(id).map(|removed| removed.is_some()),
        EntryKind::Expense => tracker.delete_expense(id).map(|removed| removed.is_some()),
    };
    match result {
        Ok(_) => {
            writeln!(
                io::stdout().lock(),
                "{} {kind} entry {id}",
                "Deleted".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to delete entry", &err),
    }
}

/// Executes the `list` subcommand.
fn cmd_list<S: Storage>(
    tracker: &Tracker<S>,
    kind: EntryKind,
    month: Option<YearMonth>,
) -> io::Result<ExitCode> {
    let currency = tracker.currency();
    match kind {
        EntryKind::Income => print_entries_table(&tracker.income(month), currency, month)?,
        EntryKind::Expense => print_entries_table(&tracker.expenses(month), currency, month)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: Storage>(tracker: &Tracker<S>, month: Option<YearMonth>) -> io::Result<ExitCode> {
    print_summary(&tracker.summary(month), tracker.currency(), month)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `breakdown` subcommand.
fn cmd_breakdown<S: Storage>(
    tracker: &Tracker<S>,
    month: Option<YearMonth>,
) -> io::Result<ExitCode> {
    print_breakdown(&tracker.expense_breakdown(month), tracker.currency(), month)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `daily` subcommand.
fn cmd_daily<S: Storage>(tracker: &Tracker<S>, month: Option<YearMonth>) -> io::Result<ExitCode> {
    let rows: Vec<(String, Flow)> = tracker
        .daily_series(month)
        .into_iter()
        .map(|(date, flow)| (format_date(date), flow))
        .collect();
    print_flow_table("Daily Income vs Expenses", "Date", rows, tracker.currency(), month)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `monthly` subcommand.
fn cmd_monthly<S: Storage>(tracker: &Tracker<S>) -> io::Result<ExitCode> {
    let rows: Vec<(String, Flow)> = tracker
        .monthly_history()
        .into_iter()
        .map(|(month, flow)| (month.label(), flow))
        .collect();
    print_flow_table("Monthly Comparison", "Month", rows, tracker.currency(), None)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `currency` subcommand.
fn cmd_currency<S: Storage>(
    tracker: &mut Tracker<S>,
    code: Option<Currency>,
) -> io::Result<ExitCode> {
    if let Some(currency) = code {
        if let Err(err) = tracker.set_currency(currency) {
            return fail("failed to change currency", &err);
        }
    }
    print_currencies(tracker.currency())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `export` subcommand.
fn cmd_export<S: Storage>(
    tracker: &Tracker<S>,
    month: Option<YearMonth>,
    output: Option<PathBuf>,
) -> io::Result<ExitCode> {
    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(tracker.today())));
    let file = match fs::File::create(&path) {
        Ok(file) => file,
        Err(err) => return fail(&format!("cannot create {}", path.display()), &err),
    };
    match tracker.export_csv(month, io::BufWriter::new(file)) {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Exported to".green().bold(),
                path.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("export failed", &err),
    }
}

/// Executes the `sample` subcommand.
fn cmd_sample<S: Storage>(tracker: &mut Tracker<S>, yes: bool) -> io::Result<ExitCode> {
    if !tracker.state().is_empty() && !confirm(yes, "This will replace existing data. Continue?")? {
        return cancelled();
    }
    match tracker.load_sample_data() {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{}",
                "Sample data loaded successfully".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to load sample data", &err),
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Formats a date as `Jan 5, 2025`.
fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Heading suffix naming the selected period.
fn period(month: Option<YearMonth>) -> String {
    month.map_or_else(|| "all time".to_owned(), YearMonth::label)
}

/// Table colour for amounts of a collection.
const fn kind_color(kind: EntryKind) -> Color {
    match kind {
        EntryKind::Income => Color::Green,
        EntryKind::Expense => Color::Red,
    }
}

/// Right-aligned money cell.
fn money_cell(currency: Currency, amount: Amount) -> Cell {
    Cell::new(currency.format(amount)).set_alignment(CellAlignment::Right)
}

/// Prints a confirmation for a saved entry.
fn print_saved<C: Category>(entry: &Entry<C>, currency: Currency, verb: &str) -> io::Result<ExitCode> {
    writeln!(
        io::stdout().lock(),
        "{} {} {} {} {}",
        format_args!("{} {verb}", C::KIND.title()).green().bold(),
        entry.id.bold(),
        entry.source,
        currency.format(entry.amount),
        format_args!("({}, {})", entry.category, format_date(entry.date)).dimmed()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Prints entries in a table.
fn print_entries_table<C: Category>(
    entries: &[&Entry<C>],
    currency: Currency,
    month: Option<YearMonth>,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let kind = C::KIND;
    if entries.is_empty() {
        writeln!(
            out,
            "{}",
            format_args!("No {kind} records found.").dimmed()
        )?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("ID").fg(Color::Cyan),
    ]);

    for entry in entries {
        _ = table.add_row(vec![
            Cell::new(format_date(entry.date)),
            Cell::new(&entry.source),
            Cell::new(entry.category),
            money_cell(currency, entry.amount).fg(kind_color(kind)),
            Cell::new(&entry.id).fg(Color::DarkGrey),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        kind.title().green().bold(),
        format_args!("({}, {})", entries.len(), period(month)).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the headline figures.
fn print_summary(summary: &Summary, currency: Currency, month: Option<YearMonth>) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Total Income").fg(Color::Cyan),
        Cell::new("Total Expenses").fg(Color::Cyan),
        Cell::new("Net Savings").fg(Color::Cyan),
        Cell::new("Savings Rate").fg(Color::Cyan),
    ]);

    let net_color = if summary.net_savings.is_negative() {
        Color::Red
    } else {
        Color::Green
    };
    _ = table.add_row(vec![
        money_cell(currency, summary.total_income).fg(Color::Green),
        money_cell(currency, summary.total_expenses).fg(Color::Red),
        money_cell(currency, summary.net_savings).fg(net_color),
        Cell::new(summary.savings_rate).set_alignment(CellAlignment::Right),
    ]);

    writeln!(
        out,
        "{} {}",
        "Summary".green().bold(),
        format_args!("({})", period(month)).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints expense totals per category, largest first.
fn print_breakdown(
    totals: &BTreeMap<ExpenseCategory, Amount>,
    currency: Currency,
    month: Option<YearMonth>,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if totals.is_empty() {
        writeln!(out, "{}", "No expense data.".dimmed())?;
        return Ok(());
    }

    let whole: Amount = totals.values().sum();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Share").fg(Color::Cyan),
    ]);

    for (category, amount) in ranked_categories(totals) {
        _ = table.add_row(vec![
            Cell::new(category),
            money_cell(currency, amount),
            Cell::new(category_share(amount, whole)).set_alignment(CellAlignment::Right),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Expense Breakdown".green().bold(),
        format_args!("({})", period(month)).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints labelled income/expense rows with their net.
fn print_flow_table(
    title: &str,
    label: &str,
    rows: Vec<(String, Flow)>,
    currency: Currency,
    month: Option<YearMonth>,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if rows.is_empty() {
        writeln!(out, "{}", "No data.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new(label).fg(Color::Cyan),
        Cell::new("Income").fg(Color::Cyan),
        Cell::new("Expenses").fg(Color::Cyan),
        Cell::new("Net").fg(Color::Cyan),
    ]);

    for (name, flow) in rows {
        let net = flow.net();
        let net_color = if net.is_negative() {
            Color::Red
        } else {
            Color::Green
        };
        _ = table.add_row(vec![
            Cell::new(name),
            money_cell(currency, flow.income).fg(Color::Green),
            money_cell(currency, flow.expenses).fg(Color::Red),
            money_cell(currency, net).fg(net_color),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", period(month)).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the currency table, marking the selected one.
fn print_currencies(selected: Currency) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Code").fg(Color::Cyan),
        Cell::new("Symbol").fg(Color::Cyan),
        Cell::new("").fg(Color::Cyan),
    ]);
    for currency in Currency::ALL {
        let marker = if currency == selected {
            Cell::new("selected").fg(Color::Green)
        } else {
            Cell::new("")
        };
        _ = table.add_row(vec![
            Cell::new(currency.code()),
            Cell::new(currency.symbol()),
            marker,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Currency".green().bold(),
        format_args!("({})", selected.code()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::DateTime;
    use fintrack::repository::{FixedClock, SequentialIds};
    use fintrack::storage::InMemoryStorage;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Creates a tracker over empty in-memory storage, "today" being
    /// 2025-01-15.
    fn mock_tracker() -> Tracker<InMemoryStorage> {
        Tracker::builder()
            .storage(InMemoryStorage::new())
            .ids(SequentialIds::starting_at(1))
            .clock(FixedClock(DateTime::from_timestamp(1_736_899_200, 0).unwrap()))
            .open()
            .unwrap()
    }

    fn add_args(kind: EntryKind, category: &str, on: Option<NaiveDate>) -> AddArgs {
        AddArgs {
            kind,
            source: "Test".to_owned(),
            category: category.to_owned(),
            amount: Amount::from_major(100),
            date: on,
        }
    }

    fn edit_args(kind: EntryKind, id: &str) -> EditArgs {
        EditArgs {
            kind,
            id: id.to_owned(),
            source: None,
            category: None,
            amount: None,
            date: None,
        }
    }

    // ── parser tests ──────────────────────────────────────────────────

    #[test]
    fn parse_date_valid() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("01-15-2024").is_err());
    }

    #[test]
    fn parse_month_and_kind() {
        assert_eq!(parse_month("2025-01").unwrap(), YearMonth::new(2025, 1).unwrap());
        assert!(parse_month("2025-13").is_err());
        assert_eq!(parse_kind("expense").unwrap(), EntryKind::Expense);
        assert!(parse_kind("transfer").is_err());
    }

    #[test]
    fn parse_amount_and_currency() {
        assert_eq!(parse_amount("12,50").unwrap(), Amount::new(1250));
        assert!(parse_amount("ten").is_err());
        assert_eq!(parse_currency("usd").unwrap(), Currency::Usd);
        assert!(parse_currency("XYZ").is_err());
    }

    #[test]
    fn cli_parses_add_command() {
        let cli = Cli::try_parse_from([
            "fintrack",
            "--yes",
            "add",
            "expense",
            "--source",
            "Groceries",
            "--category",
            "Food",
            "--amount",
            "12.50",
            "--date",
            "2025-01-10",
        ])
        .unwrap();
        assert!(cli.yes);
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.kind, EntryKind::Expense);
        assert_eq!(args.amount, Amount::new(1250));
        assert_eq!(args.date, Some(date(2025, 1, 10)));
    }

    #[test]
    fn cli_rejects_bad_month() {
        assert!(Cli::try_parse_from(["fintrack", "summary", "--month", "January"]).is_err());
    }

    // ── storage tests ─────────────────────────────────────────────────

    #[test]
    fn create_storage_with_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(Some(dir.path().to_path_buf()));
        assert!(storage.is_ok());
    }

    #[test]
    fn resolve_data_dir_prefers_flag() {
        let flag = PathBuf::from("/tmp/fintrack-flag");
        assert_eq!(resolve_data_dir(Some(flag.clone())), Some(flag));
    }

    // ── prompt tests ──────────────────────────────────────────────────

    #[test]
    fn confirm_accepts_yes_variants() {
        for answer in ["y\n", "YES\n", " yes \n"] {
            let mut shown = Vec::new();
            assert!(confirm_with(answer.as_bytes(), &mut shown, "Proceed?").unwrap());
            assert!(String::from_utf8(shown).unwrap().contains("Proceed?"));
        }
    }

    #[test]
    fn confirm_defaults_to_no() {
        for answer in ["\n", "n\n", "maybe\n", ""] {
            assert!(!confirm_with(answer.as_bytes(), io::sink(), "Proceed?").unwrap());
        }
    }

    #[test]
    fn confirm_skips_prompt_with_yes_flag() {
        assert!(confirm(true, "Proceed?").unwrap());
    }

    // ── draft building tests ──────────────────────────────────────────

    #[test]
    fn new_draft_defaults_date_to_today() {
        let draft = new_draft::<ExpenseCategory>(
            &add_args(EntryKind::Expense, "food", None),
            date(2025, 1, 15),
        )
        .unwrap();
        assert_eq!(draft.category, Some(ExpenseCategory::Food));
        assert_eq!(draft.date, Some(date(2025, 1, 15)));
        assert!(draft.id.is_none());
    }

    #[test]
    fn new_draft_rejects_category_of_other_kind() {
        let result = new_draft::<IncomeCategory>(
            &add_args(EntryKind::Income, "Housing", None),
            date(2025, 1, 15),
        );
        assert!(matches!(result, Err(TrackerError::InvalidValue { .. })));
    }

    #[test]
    fn edited_draft_overrides_only_given_fields() {
        let mut tracker = mock_tracker();
        tracker.load_sample_data().unwrap();
        let existing = tracker.find_expense(&EntryId::from("2")).unwrap();

        let mut args = edit_args(EntryKind::Expense, "2");
        args.amount = Some(Amount::from_major(13_000));
        let draft = edited_draft(existing, &args).unwrap();

        assert_eq!(draft.id, Some(EntryId::from("2")));
        assert_eq!(draft.source, "Grocery Shopping");
        assert_eq!(draft.category, Some(ExpenseCategory::Food));
        assert_eq!(draft.amount, Some(Amount::from_major(13_000)));
    }

    // ── command tests ─────────────────────────────────────────────────

    #[test]
    fn add_then_list_and_summary() {
        let mut tracker = mock_tracker();
        let code = cmd_add(
            &mut tracker,
            add_args(EntryKind::Income, "Salary", Some(date(2025, 1, 1))),
            false,
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(tracker.state().income.len(), 1);

        assert_eq!(
            cmd_list(&tracker, EntryKind::Income, YearMonth::new(2025, 1)).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(cmd_summary(&tracker, None).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn add_with_unknown_category_fails_without_saving() {
        let mut tracker = mock_tracker();
        let code = cmd_add(
            &mut tracker,
            add_args(EntryKind::Expense, "Spaceships", None),
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(tracker.state().is_empty());
    }

    #[test]
    fn add_future_date_with_yes_is_saved() {
        let mut tracker = mock_tracker();
        let code = cmd_add(
            &mut tracker,
            add_args(EntryKind::Expense, "Food", Some(date(2025, 6, 1))),
            true,
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(tracker.state().expenses[0].date, date(2025, 6, 1));
    }

    #[test]
    fn edit_unknown_id_fails() {
        let mut tracker = mock_tracker();
        let code = cmd_edit(&mut tracker, edit_args(EntryKind::Income, "404"), true).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn edit_updates_entry() {
        let mut tracker = mock_tracker();
        tracker.load_sample_data().unwrap();
        let mut args = edit_args(EntryKind::Income, "1");
        args.source = Some("Salary (January)".to_owned());
        assert_eq!(cmd_edit(&mut tracker, args, true).unwrap(), ExitCode::SUCCESS);
        assert_eq!(
            tracker.find_income(&EntryId::from("1")).unwrap().source,
            "Salary (January)"
        );
    }

    #[test]
    fn delete_with_yes_removes_entry() {
        let mut tracker = mock_tracker();
        tracker.load_sample_data().unwrap();
        let id = EntryId::from("3");
        let code = cmd_delete(&mut tracker, EntryKind::Expense, &id, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(tracker.find_expense(&id).is_none());
    }

    #[test]
    fn delete_missing_entry_is_not_an_error() {
        let mut tracker = mock_tracker();
        let code = cmd_delete(&mut tracker, EntryKind::Income, &EntryId::from("9"), true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn currency_command_persists_choice() {
        let mut tracker = mock_tracker();
        assert_eq!(
            cmd_currency(&mut tracker, Some(Currency::Gbp)).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(tracker.currency(), Currency::Gbp);
        assert_eq!(cmd_currency(&mut tracker, None).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn export_writes_file() {
        let mut tracker = mock_tracker();
        tracker.load_sample_data().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let code = cmd_export(&tracker, YearMonth::new(2025, 1), Some(path.clone())).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Type,Description,Category,Amount,Date\n"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn sample_on_empty_tracker_needs_no_prompt() {
        let mut tracker = mock_tracker();
        assert_eq!(cmd_sample(&mut tracker, false).unwrap(), ExitCode::SUCCESS);
        assert_eq!(tracker.state().income.len(), 2);
        assert_eq!(tracker.state().expenses.len(), 3);
    }

    // ── print function tests ─────────────────────────────────────────

    #[test]
    fn format_date_is_short_month_day_year() {
        assert_eq!(format_date(date(2025, 1, 5)), "Jan 5, 2025");
    }

    #[test]
    fn print_functions_handle_empty_data() {
        let tracker = mock_tracker();
        assert!(print_entries_table(&tracker.expenses(None), Currency::Bdt, None).is_ok());
        assert!(print_breakdown(&BTreeMap::new(), Currency::Bdt, None).is_ok());
        assert!(print_flow_table("Daily", "Date", Vec::new(), Currency::Bdt, None).is_ok());
        assert!(print_summary(&Summary::default(), Currency::Bdt, None).is_ok());
    }

    #[test]
    fn print_functions_with_data() {
        let mut tracker = mock_tracker();
        tracker.load_sample_data().unwrap();
        let january = YearMonth::new(2025, 1);
        assert_eq!(cmd_breakdown(&tracker, january).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_daily(&tracker, january).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_monthly(&tracker).unwrap(), ExitCode::SUCCESS);
        assert!(print_currencies(Currency::Inr).is_ok());
    }
}
