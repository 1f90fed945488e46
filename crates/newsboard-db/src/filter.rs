//! Composable story filter.
//!
//! Each optional dimension of a story listing contributes at most one
//! predicate; the predicates are AND-ed into a single `WHERE` clause with
//! positional parameters. An empty filter selects every story.

use chrono::NaiveDate;
use rusqlite::types::Value;

use newsboard_types::models::STORY_DATE_FORMAT;

/// Columns a filter may constrain. Only these names ever reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Category,
    Region,
    Date,
}

impl Column {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Region => "region",
            Self::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(Column, String),
    OnOrAfter(Column, NaiveDate),
}

impl Predicate {
    fn render(&self, position: usize) -> (String, Value) {
        match self {
            Self::Equals(column, value) => {
                (format!("{} = ?{}", column.as_sql(), position), Value::Text(value.clone()))
            }
            Self::OnOrAfter(column, date) => (
                format!("{} >= ?{}", column.as_sql(), position),
                Value::Text(date.format(STORY_DATE_FORMAT).to_string()),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    predicates: Vec<Predicate>,
}

impl StoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(self, code: impl Into<String>) -> Self {
        self.with(Predicate::Equals(Column::Category, code.into()))
    }

    pub fn region(self, code: impl Into<String>) -> Self {
        self.with(Predicate::Equals(Column::Region, code.into()))
    }

    /// Stories dated on or after `date`.
    pub fn since(self, date: NaiveDate) -> Self {
        self.with(Predicate::OnOrAfter(Column::Date, date))
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render as a `WHERE` clause (empty when unfiltered) plus its parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        if self.predicates.is_empty() {
            return (String::new(), Vec::new());
        }

        let (clauses, params): (Vec<String>, Vec<Value>) = self
            .predicates
            .iter()
            .enumerate()
            .map(|(i, p)| p.render(i + 1))
            .unzip();

        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (sql, params) = StoryFilter::new().to_sql();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_are_and_ed_in_order() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (sql, params) = StoryFilter::new().category("tech").region("uk").since(date).to_sql();

        assert_eq!(sql, " WHERE category = ?1 AND region = ?2 AND date >= ?3");
        assert_eq!(
            params,
            vec![
                Value::Text("tech".into()),
                Value::Text("uk".into()),
                Value::Text("2024-01-01".into()),
            ]
        );
    }

    #[test]
    fn single_dimension_uses_first_placeholder() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let (sql, _) = StoryFilter::new().since(date).to_sql();
        assert_eq!(sql, " WHERE date >= ?1");
    }
}
