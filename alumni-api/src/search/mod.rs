//! Alumni query builder & matcher
//!
//! Builds two predicate sets (exact and fuzzy) from a flat filter
//! object, runs the exact set first, and re-queries with the fuzzy set
//! exactly once if the first pass matched nothing.

use alumni_common::db::models::AlumniRecord;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub mod fields;

use fields::{FieldPredicates, FieldRule, Param, Predicate, FIELD_TABLE};

/// Maximum rows returned per query
pub const RESULT_LIMIT: i64 = 150;

/// Both predicate sequences for one search request
#[derive(Debug, Clone, Default)]
pub struct PredicateSets {
    pub exact: Vec<Predicate>,
    pub fuzzy: Vec<Predicate>,
}

impl PredicateSets {
    fn push(&mut self, pair: FieldPredicates) {
        self.exact.push(pair.exact);
        self.fuzzy.push(pair.fuzzy);
    }
}

/// Coerce a JSON filter value to the raw string the handlers consume
///
/// Numbers arrive as numbers from some callers (year in particular).
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build both predicate sets from a filter object
///
/// Fields are visited in FIELD_TABLE order so the generated SQL is
/// deterministic. Blank values and unrecognized keys contribute
/// nothing. The department lookup hits the database once when a dept
/// filter is present; lookup errors degrade to a raw contains-match.
pub async fn build_predicate_sets(
    pool: &SqlitePool,
    filters: &Map<String, Value>,
) -> PredicateSets {
    let mut sets = PredicateSets::default();

    for (name, rule) in FIELD_TABLE {
        let Some(value) = filters.get(*name) else {
            continue;
        };
        let Some(raw) = value_to_string(value) else {
            continue;
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        match *rule {
            FieldRule::Phone => sets.push(fields::phone_predicates(raw)),
            FieldRule::Email => sets.push(fields::email_predicates(raw)),
            FieldRule::Year => {
                if let Some(pair) = fields::year_predicates(raw) {
                    sets.push(pair);
                }
            }
            FieldRule::Department => {
                let canonical = crate::db::departments::lookup_canonical(pool, raw).await;
                sets.push(fields::dept_predicates(raw, canonical.as_deref()));
            }
            FieldRule::Contains(column) => sets.push(fields::contains_predicates(column, raw)),
        }
    }

    sets
}

const SELECT_COLUMNS: &str =
    "SELECT roll, name, phone, email, dept, designation, year, address, company FROM alumni";

/// Assemble the full query for one phase
///
/// The exact phase orders by name only; the fuzzy phase adds a
/// multi-column tie-break for deterministic ordering.
pub fn build_query(predicates: &[Predicate], fuzzy: bool) -> String {
    let where_clause = if predicates.is_empty() {
        String::new()
    } else {
        let clauses: Vec<&str> = predicates.iter().map(|p| p.clause).collect();
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let order_by = if fuzzy {
        " ORDER BY name ASC, phone ASC, email ASC, company ASC, \
         dept ASC, designation ASC, year ASC, roll ASC"
    } else {
        " ORDER BY name ASC"
    };

    format!(
        "{}{}{} LIMIT {}",
        SELECT_COLUMNS, where_clause, order_by, RESULT_LIMIT
    )
}

fn record_from_row(row: &SqliteRow) -> AlumniRecord {
    AlumniRecord {
        roll: row.get(0),
        name: row.get(1),
        phone: row.get(2),
        email: row.get(3),
        dept: row.get(4),
        designation: row.get(5),
        year: row.get(6),
        address: row.get(7),
        company: row.get(8),
    }
}

async fn fetch(
    pool: &SqlitePool,
    predicates: &[Predicate],
    fuzzy: bool,
) -> Result<Vec<AlumniRecord>, sqlx::Error> {
    let sql = build_query(predicates, fuzzy);
    let mut query = sqlx::query(&sql);
    for predicate in predicates {
        query = match &predicate.param {
            Param::Text(s) => query.bind(s.clone()),
            Param::Int(i) => query.bind(*i),
            Param::Real(f) => query.bind(*f),
        };
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.iter().map(record_from_row).collect())
}

/// Run the two-phase search
///
/// Phase one uses the exact set; only when it returns zero rows is the
/// fuzzy set executed, exactly once. With no usable filters both sets
/// are empty and the first query is a plain match-all.
pub async fn run_search(
    pool: &SqlitePool,
    filters: &Map<String, Value>,
) -> Result<Vec<AlumniRecord>, sqlx::Error> {
    let sets = build_predicate_sets(pool, filters).await;

    let rows = fetch(pool, &sets.exact, false).await?;
    if !rows.is_empty() {
        return Ok(rows);
    }

    fetch(pool, &sets.fuzzy, true).await
}
