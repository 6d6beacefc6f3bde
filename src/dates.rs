//! Maps integer day offsets to calendar dates for display.
use crate::error::EpiError;
use crate::table::{Column, Table};
use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate};

/// How `add_date_column` lays out its output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateOptions {
    /// Drop the integer `day` column, keeping only `date`.
    pub drop_day_column: bool,
    /// Emit dates as strings in this `strftime` format instead of as dates.
    pub date_format: Option<String>,
}

/// Returns a copy of `table` with a `date` column for `start + day` on each row.
///
/// The date columns come first (`day`, `date`, or just `date` when the day column is dropped),
/// followed by the remaining columns in their original order. Day values need not be contiguous.
///
/// # Errors
///
/// Returns `EpiError::ValidationError` if the table has no `day` column, if that column is not
/// integer-typed, if a day is negative or the resulting date is out of range, or if the date
/// format is not a valid `strftime` string.
pub fn add_date_column(
    table: &Table,
    start: NaiveDate,
    options: &DateOptions,
) -> Result<Table, EpiError> {
    let days = match table.column("day") {
        Some(Column::Integer(days)) => days,
        Some(other) => {
            return Err(EpiError::validation(format!(
                "column 'day' must be integer-typed to convert to dates, found {}",
                other.type_name()
            )))
        }
        None => {
            return Err(EpiError::validation(
                "table for converting dates has no 'day' column",
            ))
        }
    };

    let dates = days
        .iter()
        .map(|&day| {
            u64::try_from(day)
                .ok()
                .and_then(|offset| start.checked_add_days(Days::new(offset)))
                .ok_or_else(|| {
                    EpiError::validation(format!("day {day} cannot be converted to a date"))
                })
        })
        .collect::<Result<Vec<_>, EpiError>>()?;

    let date_column = match &options.date_format {
        Some(format) => {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(EpiError::validation(format!(
                    "invalid date format '{format}'"
                )));
            }
            Column::Text(
                dates
                    .iter()
                    .map(|date| date.format(format).to_string())
                    .collect(),
            )
        }
        None => Column::Date(dates),
    };

    let mut output = Table::new();
    if !options.drop_day_column {
        output.push_column("day", Column::Integer(days.clone()));
    }
    output.push_column("date", date_column);
    for (name, column) in table.columns() {
        if name != "day" && name != "date" {
            output.push_column(name, column.clone());
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn sample(days: Column) -> Table {
        let mut table = Table::new();
        table.push_column("hosp", Column::Float(vec![1.0, 2.0, 3.0]));
        table.push_column("day", days);
        table
    }

    #[test]
    fn maps_days_onto_dates() {
        let table = sample(Column::Integer(vec![0, 1, 2]));
        let dated = add_date_column(&table, march(1), &DateOptions::default()).unwrap();
        assert_eq!(dated.column_names(), vec!["day", "date", "hosp"]);
        assert_eq!(
            dated.column("date"),
            Some(&Column::Date(vec![march(1), march(2), march(3)]))
        );
        // The input is not modified.
        assert_eq!(table.column_names(), vec!["hosp", "day"]);
    }

    #[test]
    fn days_need_not_be_contiguous() {
        let table = sample(Column::Integer(vec![0, 5, 30]));
        let dated = add_date_column(&table, march(1), &DateOptions::default()).unwrap();
        assert_eq!(
            dated.column("date"),
            Some(&Column::Date(vec![
                march(1),
                march(6),
                NaiveDate::from_ymd_opt(2020, 3, 31).unwrap()
            ]))
        );
    }

    #[test]
    fn can_drop_day_and_format_strings() {
        let table = sample(Column::Integer(vec![0, 1, 2]));
        let options = DateOptions {
            drop_day_column: true,
            date_format: Some("%m/%d/%Y".to_string()),
        };
        let dated = add_date_column(&table, march(1), &options).unwrap();
        assert_eq!(dated.column_names(), vec!["date", "hosp"]);
        assert_eq!(
            dated.column("date"),
            Some(&Column::Text(vec![
                "03/01/2020".to_string(),
                "03/02/2020".to_string(),
                "03/03/2020".to_string()
            ]))
        );
    }

    #[test]
    fn float_day_column_is_a_validation_error() {
        let table = sample(Column::Float(vec![0.0, 1.0, 2.0]));
        let result = add_date_column(&table, march(1), &DateOptions::default());
        assert!(matches!(result, Err(EpiError::ValidationError(_))));
    }

    #[test]
    fn missing_day_column_is_a_validation_error() {
        let mut table = Table::new();
        table.push_column("hosp", Column::Float(vec![1.0]));
        let result = add_date_column(&table, march(1), &DateOptions::default());
        assert!(matches!(result, Err(EpiError::ValidationError(_))));
    }

    #[test]
    fn negative_days_and_bad_formats_are_rejected() {
        let table = sample(Column::Integer(vec![-1, 0, 1]));
        let result = add_date_column(&table, march(1), &DateOptions::default());
        assert!(matches!(result, Err(EpiError::ValidationError(_))));

        let table = sample(Column::Integer(vec![0, 1, 2]));
        let options = DateOptions {
            drop_day_column: false,
            date_format: Some("%Q".to_string()),
        };
        let result = add_date_column(&table, march(1), &options);
        assert!(matches!(result, Err(EpiError::ValidationError(_))));
    }
}
