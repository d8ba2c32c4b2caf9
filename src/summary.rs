//! Derived totals and grouped series over entry views.
//!
//! Every function here is pure: it reads the entries it is given and
//! returns a fresh value. Inputs are usually the output of
//! [`crate::filter::filter_by_month`].

use alloc::collections::BTreeMap;

use chrono::NaiveDate;

use crate::filter::YearMonth;
use crate::models::{Amount, Entry, Percentage};

/// Sum of `amount` over the entries; zero for an empty input.
#[inline]
#[must_use]
pub fn total<'entry, C, T>(entries: T) -> Amount
where
    C: 'entry,
    T: IntoIterator<Item = &'entry Entry<C>>,
{
    entries.into_iter().map(|entry| entry.amount).sum()
}

/// Total income minus total expenses.
#[inline]
#[must_use]
pub fn net_savings<'entry, I, E, TI, TE>(income: TI, expenses: TE) -> Amount
where
    I: 'entry,
    E: 'entry,
    TI: IntoIterator<Item = &'entry Entry<I>>,
    TE: IntoIterator<Item = &'entry Entry<E>>,
{
    total(income) - total(expenses)
}

/// Net savings as a share of total income, to one decimal place.
///
/// Zero when there is no income, whatever the expenses.
#[inline]
#[must_use]
pub fn savings_rate<'entry, I, E, TI, TE>(income: TI, expenses: TE) -> Percentage
where
    I: 'entry,
    E: 'entry,
    TI: IntoIterator<Item = &'entry Entry<I>>,
    TE: IntoIterator<Item = &'entry Entry<E>>,
{
    Summary::compute(income, expenses).savings_rate
}

/// Share of `part` in `whole`, e.g. one category of the expense total.
#[inline]
#[must_use]
pub fn category_share(part: Amount, whole: Amount) -> Percentage {
    Percentage::ratio(part, whole)
}

/// The four headline figures of a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sum of income amounts.
    pub total_income: Amount,
    /// Sum of expense amounts.
    pub total_expenses: Amount,
    /// `total_income - total_expenses`.
    pub net_savings: Amount,
    /// `net_savings / total_income`, zero without income.
    pub savings_rate: Percentage,
}

impl Summary {
    /// Computes the summary of two entry views.
    #[must_use]
    pub fn compute<'entry, I, E, TI, TE>(income: TI, expenses: TE) -> Self
    where
        I: 'entry,
        E: 'entry,
        TI: IntoIterator<Item = &'entry Entry<I>>,
        TE: IntoIterator<Item = &'entry Entry<E>>,
    {
        let total_income = total(income);
        let total_expenses = total(expenses);
        let net_savings = total_income - total_expenses;
        Self {
            total_income,
            total_expenses,
            net_savings,
            savings_rate: Percentage::ratio(net_savings, total_income),
        }
    }
}

/// Income and expense totals for one bucket of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flow {
    /// Income in the bucket.
    pub income: Amount,
    /// Expenses in the bucket.
    pub expenses: Amount,
}

impl Flow {
    /// `income - expenses`.
    #[inline]
    #[must_use]
    pub fn net(self) -> Amount {
        self.income - self.expenses
    }
}

/// Sums amounts per date, ascending by date.
#[must_use]
pub fn group_by_date<'entry, C, T>(entries: T) -> BTreeMap<NaiveDate, Amount>
where
    C: 'entry,
    T: IntoIterator<Item = &'entry Entry<C>>,
{
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.date).or_insert(Amount::ZERO) += entry.amount;
    }
    totals
}

/// Aligned daily series: one key per date present in either view, with
/// zero for the side that has no entries on that date.
#[must_use]
pub fn daily_series<'entry, I, E, TI, TE>(income: TI, expenses: TE) -> BTreeMap<NaiveDate, Flow>
where
    I: 'entry,
    E: 'entry,
    TI: IntoIterator<Item = &'entry Entry<I>>,
    TE: IntoIterator<Item = &'entry Entry<E>>,
{
    let mut series: BTreeMap<NaiveDate, Flow> = BTreeMap::new();
    for (date, amount) in group_by_date(income) {
        series.entry(date).or_default().income = amount;
    }
    for (date, amount) in group_by_date(expenses) {
        series.entry(date).or_default().expenses = amount;
    }
    series
}

/// Sums amounts per category. Empty input gives an empty map.
#[must_use]
pub fn group_by_category<'entry, C, T>(entries: T) -> BTreeMap<C, Amount>
where
    C: Copy + Ord + 'entry,
    T: IntoIterator<Item = &'entry Entry<C>>,
{
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.category).or_insert(Amount::ZERO) += entry.amount;
    }
    totals
}

/// Category totals ordered largest first, ties in category order.
#[must_use]
pub fn ranked_categories<C: Copy + Ord>(totals: &BTreeMap<C, Amount>) -> Vec<(C, Amount)> {
    let mut ranked: Vec<(C, Amount)> = totals.iter().map(|(cat, amount)| (*cat, *amount)).collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1));
    ranked
}

/// Merges both full collections into per-month totals, ascending by month.
#[must_use]
pub fn group_by_month<I, E>(income: &[Entry<I>], expenses: &[Entry<E>]) -> BTreeMap<YearMonth, Flow> {
    let mut months: BTreeMap<YearMonth, Flow> = BTreeMap::new();
    for entry in income {
        months.entry(YearMonth::of(entry.date)).or_default().income += entry.amount;
    }
    for entry in expenses {
        months.entry(YearMonth::of(entry.date)).or_default().expenses += entry.amount;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    use crate::filter::filter_by_month;
    use crate::models::{EntryId, ExpenseCategory, ExpenseEntry, IncomeCategory, IncomeEntry};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn income(id: &str, major: i64, on: NaiveDate) -> IncomeEntry {
        IncomeEntry {
            id: EntryId::from(id),
            source: format!("income {id}"),
            category: IncomeCategory::Salary,
            amount: Amount::from_major(major),
            date: on,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    fn expense(id: &str, category: ExpenseCategory, major: i64, on: NaiveDate) -> ExpenseEntry {
        ExpenseEntry {
            id: EntryId::from(id),
            source: format!("expense {id}"),
            category,
            amount: Amount::from_major(major),
            date: on,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    fn january() -> (Vec<IncomeEntry>, Vec<ExpenseEntry>) {
        (
            vec![
                income("1", 80_000, date(2025, 1, 1)),
                income("2", 50_000, date(2025, 1, 15)),
            ],
            vec![
                expense("3", ExpenseCategory::Housing, 25_000, date(2025, 1, 5)),
                expense("4", ExpenseCategory::Food, 12_000, date(2025, 1, 10)),
                expense("5", ExpenseCategory::Transportation, 3_500, date(2025, 1, 12)),
            ],
        )
    }

    #[test]
    fn january_summary_matches_hand_computed_figures() {
        let (income, expenses) = january();
        let summary = Summary::compute(&income, &expenses);

        assert_eq!(summary.total_income, Amount::from_major(130_000));
        assert_eq!(summary.total_expenses, Amount::from_major(40_500));
        assert_eq!(summary.net_savings, Amount::from_major(89_500));
        assert_eq!(summary.savings_rate, Percentage::new(688));
        assert_eq!(summary.savings_rate.to_string(), "68.8%");
    }

    #[test]
    fn free_functions_agree_with_summary() {
        let (income, expenses) = january();
        assert_eq!(net_savings(&income, &expenses), Amount::from_major(89_500));
        assert_eq!(savings_rate(&income, &expenses), Percentage::new(688));
    }

    #[test]
    fn total_of_nothing_is_zero() {
        let none: Vec<IncomeEntry> = Vec::new();
        assert_eq!(total(&none), Amount::ZERO);
    }

    #[test]
    fn total_is_order_independent() {
        let (_, mut expenses) = january();
        let forward = total(&expenses);
        expenses.reverse();
        assert_eq!(total(&expenses), forward);
        expenses.swap(0, 1);
        assert_eq!(total(&expenses), forward);
    }

    #[test]
    fn total_has_no_float_drift() {
        let dimes: Vec<ExpenseEntry> = (0..10)
            .map(|n| ExpenseEntry {
                amount: Amount::new(10),
                ..expense(&n.to_string(), ExpenseCategory::Food, 0, date(2025, 1, 1))
            })
            .collect();
        assert_eq!(total(&dimes), Amount::new(100));
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let none: Vec<IncomeEntry> = Vec::new();
        let (_, expenses) = january();
        assert_eq!(savings_rate(&none, &expenses), Percentage::ZERO);
        let nothing: Vec<ExpenseEntry> = Vec::new();
        assert_eq!(savings_rate(&none, &nothing), Percentage::ZERO);
    }

    #[test]
    fn savings_rate_can_be_negative() {
        let income = vec![income("1", 100, date(2025, 1, 1))];
        let expenses = vec![expense("2", ExpenseCategory::Food, 150, date(2025, 1, 1))];
        assert_eq!(savings_rate(&income, &expenses), Percentage::new(-500));
    }

    #[test]
    fn same_day_entries_group_per_category_and_per_date() {
        let day = date(2025, 2, 3);
        let expenses = vec![
            expense("a", ExpenseCategory::Food, 300, day),
            expense("b", ExpenseCategory::Shopping, 700, day),
            expense("c", ExpenseCategory::Food, 200, date(2025, 3, 1)),
        ];
        let income = vec![income("i", 1_000, day)];

        let feb = filter_by_month(&expenses, YearMonth::new(2025, 2));
        let by_category = group_by_category(feb.iter().copied());
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[&ExpenseCategory::Food], Amount::from_major(300));
        assert_eq!(by_category[&ExpenseCategory::Shopping], Amount::from_major(700));

        let by_date = group_by_date(feb.iter().copied());
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[&day], Amount::from_major(1_000));

        let series = daily_series(&income, feb.iter().copied());
        assert_eq!(
            series[&day],
            Flow {
                income: Amount::from_major(1_000),
                expenses: Amount::from_major(1_000),
            }
        );
    }

    #[test]
    fn daily_series_zero_fills_the_missing_side() {
        let (income, expenses) = january();
        let series = daily_series(&income, &expenses);

        assert_eq!(series.len(), 5);
        let first = series[&date(2025, 1, 1)];
        assert_eq!(first.income, Amount::from_major(80_000));
        assert_eq!(first.expenses, Amount::ZERO);
        let rent_day = series[&date(2025, 1, 5)];
        assert_eq!(rent_day.income, Amount::ZERO);
        assert_eq!(rent_day.net(), Amount::from_major(-25_000));

        let keys: Vec<NaiveDate> = series.keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn empty_view_has_no_categories() {
        let none: Vec<ExpenseEntry> = Vec::new();
        assert!(group_by_category(&none).is_empty());
    }

    #[test]
    fn ranked_categories_largest_first() {
        let (_, expenses) = january();
        let ranked = ranked_categories(&group_by_category(&expenses));
        let order: Vec<ExpenseCategory> = ranked.iter().map(|(cat, _)| *cat).collect();
        assert_eq!(
            order,
            [
                ExpenseCategory::Housing,
                ExpenseCategory::Food,
                ExpenseCategory::Transportation
            ]
        );
        let share = category_share(ranked[0].1, total(&expenses));
        assert_eq!(share.to_string(), "61.7%");
    }

    #[test]
    fn group_by_month_merges_both_collections() {
        let income = vec![
            income("1", 100, date(2024, 12, 31)),
            income("2", 200, date(2025, 1, 1)),
        ];
        let expenses = vec![
            expense("3", ExpenseCategory::Food, 50, date(2025, 1, 20)),
            expense("4", ExpenseCategory::Food, 70, date(2025, 2, 2)),
        ];
        let months = group_by_month(&income, &expenses);
        let keys: Vec<String> = months.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["2024-12", "2025-01", "2025-02"]);

        let jan = months[&YearMonth::new(2025, 1).unwrap()];
        assert_eq!(jan.income, Amount::from_major(200));
        assert_eq!(jan.expenses, Amount::from_major(50));
        let feb = months[&YearMonth::new(2025, 2).unwrap()];
        assert_eq!(feb.income, Amount::ZERO);
        assert_eq!(feb.expenses, Amount::from_major(70));
    }
}
