//! Keyword-triggered SQL templates.
//!
//! Templates are generated from the schema and tried in a fixed order,
//! most specific first; the first match wins:
//!
//! 1. aggregate of a column grouped by a dimension ("average tap temperature by furnace")
//! 2. aggregate of a column ("average tap temperature")
//! 3. record count grouped by a dimension ("castings by shift")
//! 4. recent records ("latest heats")
//! 5. record count ("how many inspections")
//! 6. bare table noun ("show heat treatments")

use chrono::{Duration, NaiveDate};
use sahayak_core::keywords::Words;
use sahayak_core::schema::{ColumnDescriptor, SchemaDescriptor, SemanticType, TableDescriptor};
use sahayak_core::{SqlCandidate, SqlParam};

/// Rows returned by "recent records" templates.
pub const RECENT_ROWS: u32 = 15;

const RECENT_WORDS: &[&str] = &["recent", "latest", "last", "newest"];
const COUNT_WORDS: &[&str] = &["how many", "count", "number of", "total number"];
/// Words ignored when deciding whether a query is just a table noun.
const FILLER_WORDS: &[&str] = &[
    "show", "me", "list", "all", "the", "display", "get", "give", "please", "records", "data",
    "of", "from",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Aggregate {
    Avg,
    Sum,
    Max,
    Min,
}

impl Aggregate {
    const ALL: [Aggregate; 4] = [Self::Avg, Self::Sum, Self::Max, Self::Min];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Avg => &["average", "avg", "mean"],
            Self::Sum => &["total", "sum"],
            Self::Max => &["maximum", "highest", "max", "peak"],
            Self::Min => &["minimum", "lowest", "min"],
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    fn expression(self, column: &str) -> String {
        match self {
            Self::Avg => format!("ROUND(AVG({column})::numeric,2)"),
            Self::Sum => format!("ROUND(SUM({column})::numeric,2)"),
            Self::Max => format!("MAX({column})"),
            Self::Min => format!("MIN({column})"),
        }
    }
}

#[derive(Debug, Clone)]
enum Trigger {
    /// Every group must contain at least one phrase present in the query.
    AllOf(Vec<Vec<String>>),
    /// The query, minus filler words, is exactly one of these nouns.
    BareNoun(Vec<String>),
}

/// One parametrized statement and the keywords that select it.
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    pub id: String,
    trigger: Trigger,
    table: String,
    select: String,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<u32>,
    date_column: Option<String>,
}

impl QueryTemplate {
    pub fn matches(&self, words: &Words) -> bool {
        match &self.trigger {
            Trigger::AllOf(groups) => groups
                .iter()
                .all(|group| group.iter().any(|p| words.contains_phrase(p))),
            Trigger::BareNoun(nouns) => {
                let rest: Vec<&str> = words
                    .tokens()
                    .iter()
                    .map(String::as_str)
                    .filter(|w| !FILLER_WORDS.contains(w))
                    .collect();
                let rest = rest.join(" ");
                !rest.is_empty() && nouns.iter().any(|n| Words::new(n).tokens().join(" ") == rest)
            }
        }
    }

    /// Render the statement, filtering on `date` when the table has a date column.
    pub fn render(&self, date: Option<NaiveDate>) -> (String, Vec<SqlParam>) {
        let mut sql = format!("SELECT {} FROM {}", self.select, self.table);
        let mut params = Vec::new();
        if let (Some(date), Some(column)) = (date, &self.date_column) {
            sql.push_str(&format!(" WHERE {column}::date = $1"));
            params.push(SqlParam::Date(date));
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {group_by}"));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        (sql, params)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn new(id: String, trigger: Trigger, table: &TableDescriptor, select: String) -> Self {
        Self {
            id,
            trigger,
            table: table.name.clone(),
            select,
            group_by: None,
            order_by: None,
            limit: None,
            date_column: table.date_column.clone(),
        }
    }
}

/// The ordered template list.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<QueryTemplate>,
}

impl TemplateSet {
    pub fn from_schema(schema: &SchemaDescriptor) -> Self {
        let mut templates = Vec::new();
        for table in &schema.tables {
            templates.extend(grouped_aggregates(table));
        }
        for table in &schema.tables {
            templates.extend(column_aggregates(table));
        }
        for table in &schema.tables {
            templates.extend(grouped_counts(table));
        }
        templates.extend(schema.tables.iter().filter_map(recent_records));
        templates.extend(schema.tables.iter().map(record_count));
        templates.extend(schema.tables.iter().map(bare_noun));
        Self { templates }
    }

    /// The first template whose trigger matches `input`.
    pub fn first_match(&self, input: &str) -> Option<&QueryTemplate> {
        let words = Words::new(input);
        self.templates.iter().find(|t| t.matches(&words))
    }

    /// Candidate for `input`, with dates resolved against `today`.
    pub fn candidate(&self, input: &str, today: NaiveDate) -> Option<SqlCandidate> {
        let template = self.first_match(input)?;
        let (statement, params) = template.render(extract_date(input, today));
        Some(SqlCandidate::template(template.id.clone(), statement, params))
    }

    pub fn get(&self, id: &str) -> Option<&QueryTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn dimensions(table: &TableDescriptor) -> impl Iterator<Item = &ColumnDescriptor> {
    table
        .columns
        .iter()
        .filter(|c| c.semantic == SemanticType::Categorical && !c.aliases.is_empty())
}

fn measures(table: &TableDescriptor) -> impl Iterator<Item = &ColumnDescriptor> {
    table
        .columns
        .iter()
        .filter(|c| c.is_numeric() && !c.aliases.is_empty())
}

fn by_phrases(dimension: &ColumnDescriptor) -> Vec<String> {
    dimension
        .aliases
        .iter()
        .flat_map(|a| [format!("by {a}"), format!("per {a}")])
        .collect()
}

fn grouped_aggregates(table: &TableDescriptor) -> Vec<QueryTemplate> {
    let mut out = Vec::new();
    for column in measures(table) {
        for agg in Aggregate::ALL {
            for dim in dimensions(table) {
                let trigger = Trigger::AllOf(vec![
                    phrases(agg.keywords()),
                    column.aliases.clone(),
                    by_phrases(dim),
                ]);
                let mut t = QueryTemplate::new(
                    format!("{}.{}_{}_by_{}", table.name, agg.prefix(), column.name, dim.name),
                    trigger,
                    table,
                    format!(
                        "{}, {} AS {}_{}",
                        dim.name,
                        agg.expression(&column.name),
                        agg.prefix(),
                        column.name
                    ),
                );
                t.group_by = Some(dim.name.clone());
                t.order_by = Some("2 DESC".into());
                out.push(t);
            }
        }
    }
    out
}

fn column_aggregates(table: &TableDescriptor) -> Vec<QueryTemplate> {
    let mut out = Vec::new();
    for column in measures(table) {
        for agg in Aggregate::ALL {
            let trigger = Trigger::AllOf(vec![phrases(agg.keywords()), column.aliases.clone()]);
            out.push(QueryTemplate::new(
                format!("{}.{}_{}", table.name, agg.prefix(), column.name),
                trigger,
                table,
                agg.expression(&column.name),
            ));
        }
    }
    out
}

fn grouped_counts(table: &TableDescriptor) -> Vec<QueryTemplate> {
    dimensions(table)
        .map(|dim| {
            let trigger = Trigger::AllOf(vec![table.nouns.clone(), by_phrases(dim)]);
            let mut t = QueryTemplate::new(
                format!("{}.count_by_{}", table.name, dim.name),
                trigger,
                table,
                format!("{}, COUNT(*) AS records", dim.name),
            );
            t.group_by = Some(dim.name.clone());
            t.order_by = Some("records DESC".into());
            t
        })
        .collect()
}

fn recent_records(table: &TableDescriptor) -> Option<QueryTemplate> {
    let date = table.date_column.clone()?;
    let trigger = Trigger::AllOf(vec![phrases(RECENT_WORDS), table.nouns.clone()]);
    let mut t = QueryTemplate::new(
        format!("{}.recent", table.name),
        trigger,
        table,
        "*".into(),
    );
    t.order_by = Some(format!("{date} DESC"));
    t.limit = Some(RECENT_ROWS);
    Some(t)
}

fn record_count(table: &TableDescriptor) -> QueryTemplate {
    let trigger = Trigger::AllOf(vec![phrases(COUNT_WORDS), table.nouns.clone()]);
    QueryTemplate::new(
        format!("{}.count", table.name),
        trigger,
        table,
        "COUNT(*) AS records".into(),
    )
}

fn bare_noun(table: &TableDescriptor) -> QueryTemplate {
    let mut t = QueryTemplate::new(
        format!("{}.list", table.name),
        Trigger::BareNoun(table.nouns.clone()),
        table,
        "*".into(),
    );
    t.order_by = table.date_column.as_ref().map(|d| format!("{d} DESC"));
    t.limit = Some(RECENT_ROWS);
    t
}

/// A calendar date mentioned in the input: `YYYY-MM-DD`, "today" or "yesterday".
pub fn extract_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    for raw in input.split_whitespace() {
        let token = raw.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
            return Some(date);
        }
    }
    let words = Words::new(input);
    if words.contains_phrase("today") {
        Some(today)
    } else if words.contains_phrase("yesterday") {
        Some(today - Duration::days(1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::foundry_schema;

    fn set() -> TemplateSet {
        TemplateSet::from_schema(&foundry_schema())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn statement(input: &str) -> String {
        set().candidate(input, day(2024, 6, 15)).unwrap().statement_text
    }

    #[test]
    fn average_tap_temperature_uses_rounded_avg() {
        let candidate = set()
            .candidate("What is the average tap temperature?", day(2024, 6, 15))
            .unwrap();
        assert_eq!(
            candidate.statement_text,
            "SELECT ROUND(AVG(tap_temperature_c)::numeric,2) FROM melting_heat_records"
        );
        assert_eq!(
            candidate.template_id.as_deref(),
            Some("melting_heat_records.avg_tap_temperature_c")
        );
        assert!(candidate.parameters.is_empty());
    }

    #[test]
    fn grouped_aggregate_wins_over_plain_aggregate() {
        assert_eq!(
            statement("average tap temperature by furnace"),
            "SELECT furnace_id, ROUND(AVG(tap_temperature_c)::numeric,2) AS avg_tap_temperature_c \
             FROM melting_heat_records GROUP BY furnace_id ORDER BY 2 DESC"
        );
    }

    #[test]
    fn grouped_count_by_dimension() {
        assert_eq!(
            statement("castings by shift"),
            "SELECT shift, COUNT(*) AS records FROM casting_records GROUP BY shift ORDER BY records DESC"
        );
    }

    #[test]
    fn recent_records_order_by_date_with_fifteen_rows() {
        assert_eq!(
            statement("show the latest heats"),
            "SELECT * FROM melting_heat_records ORDER BY melt_date DESC LIMIT 15"
        );
        assert_eq!(
            statement("recent maintenance orders"),
            "SELECT * FROM equipment_maintenance ORDER BY planned_start DESC LIMIT 15"
        );
    }

    #[test]
    fn counts_and_other_aggregates() {
        assert_eq!(
            statement("How many inspections were done?"),
            "SELECT COUNT(*) AS records FROM quality_inspections"
        );
        assert_eq!(
            statement("total downtime"),
            "SELECT ROUND(SUM(downtime_hours)::numeric,2) FROM equipment_maintenance"
        );
        assert_eq!(
            statement("highest hardness"),
            "SELECT MAX(post_ht_hardness_hb) FROM heat_treatments"
        );
    }

    #[test]
    fn bare_noun_lists_table() {
        assert_eq!(
            statement("Show me heat treatments"),
            "SELECT * FROM heat_treatments ORDER BY treatment_date DESC LIMIT 15"
        );
        assert!(set().first_match("which heat treatments failed hardness checks on furnace 2").is_none());
    }

    #[test]
    fn first_match_wins_in_list_order() {
        // "average" + "yield" and "count" + "castings" both apply
        let set = set();
        let template = set.first_match("average yield and count of castings").unwrap();
        assert_eq!(template.id, "casting_records.avg_yield_percentage");
    }

    #[test]
    fn unrelated_questions_do_not_match() {
        assert!(set().first_match("why did furnace 3 trip yesterday").is_none());
        assert!(set().first_match("").is_none());
    }

    #[test]
    fn dates_become_bound_parameters() {
        let candidate = set()
            .candidate("average tap temperature on 2024-03-01", day(2024, 6, 15))
            .unwrap();
        assert_eq!(
            candidate.statement_text,
            "SELECT ROUND(AVG(tap_temperature_c)::numeric,2) FROM melting_heat_records \
             WHERE melt_date::date = $1"
        );
        assert_eq!(candidate.parameters, vec![SqlParam::Date(day(2024, 3, 1))]);
        assert!(!candidate.statement_text.contains("2024"));
    }

    #[test]
    fn relative_dates_resolve_against_today() {
        let today = day(2024, 6, 15);
        assert_eq!(extract_date("castings by shift today", today), Some(today));
        assert_eq!(extract_date("heats yesterday", today), Some(day(2024, 6, 14)));
        assert_eq!(extract_date("heats on (2024-01-31).", today), Some(day(2024, 1, 31)));
        assert_eq!(extract_date("heats in 2024-13-40", today), None);
        assert_eq!(extract_date("all heats", today), None);
    }

    #[test]
    fn template_ids_are_unique() {
        let set = set();
        let mut ids: Vec<&str> = set.iter().map(|t| t.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(set.get("melting_heat_records.recent").is_some());
    }
}
