//! Per-field filter normalization
//!
//! Each recognized field maps to a pure handler producing an
//! exact/fuzzy predicate pair from the raw filter value. Handlers are
//! looked up through a fixed table, so user-supplied keys are never
//! interpolated into SQL — unrecognized keys are simply ignored.
//!
//! Contains-matches use SQLite `LIKE`, which is case-insensitive for
//! ASCII; case-insensitive equality goes through `LOWER()`.

/// Bound parameter value for one predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Int(i64),
    Real(f64),
}

/// One SQL fragment with exactly one `?` placeholder plus its value
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub clause: &'static str,
    pub param: Param,
}

impl Predicate {
    fn text(clause: &'static str, param: impl Into<String>) -> Self {
        Self {
            clause,
            param: Param::Text(param.into()),
        }
    }
}

/// The exact/fuzzy predicate pair produced for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicates {
    pub exact: Predicate,
    pub fuzzy: Predicate,
}

/// How a recognized field is turned into predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Phone,
    Year,
    Email,
    Department,
    /// Plain contains-match on the named column, same in both sets
    Contains(&'static str),
}

/// Recognized filter fields, in deterministic build order
///
/// The literal field `id` and anything not listed here is ignored.
pub const FIELD_TABLE: &[(&str, FieldRule)] = &[
    ("roll", FieldRule::Contains("roll")),
    ("name", FieldRule::Contains("name")),
    ("phone", FieldRule::Phone),
    ("email", FieldRule::Email),
    ("dept", FieldRule::Department),
    ("designation", FieldRule::Contains("designation")),
    ("year", FieldRule::Year),
    ("address", FieldRule::Contains("address")),
    ("company", FieldRule::Contains("company")),
];

/// Look up the rule for a field name, if recognized
pub fn rule_for(field: &str) -> Option<FieldRule> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, rule)| *rule)
}

fn contains(value: &str) -> String {
    format!("%{}%", value)
}

/// Phone: strip non-digits; equality only when exactly 10 digits remain
pub fn phone_predicates(raw: &str) -> FieldPredicates {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let exact = if digits.len() == 10 {
        Predicate::text("phone = ?", digits.clone())
    } else {
        Predicate::text("phone LIKE ?", contains(&digits))
    };

    FieldPredicates {
        exact,
        fuzzy: Predicate::text("phone LIKE ?", contains(&digits)),
    }
}

/// Email: equality only when the value contains `@`
pub fn email_predicates(raw: &str) -> FieldPredicates {
    let exact = if raw.contains('@') {
        Predicate::text("LOWER(email) = LOWER(?)", raw)
    } else {
        Predicate::text("LOWER(email) LIKE LOWER(?)", contains(raw))
    };

    FieldPredicates {
        exact,
        fuzzy: Predicate::text("LOWER(email) LIKE LOWER(?)", contains(raw)),
    }
}

/// Year: any finite number binds an equality predicate; non-numeric
/// input drops the field entirely
pub fn year_predicates(raw: &str) -> Option<FieldPredicates> {
    let param = match raw.parse::<i64>() {
        Ok(y) => Param::Int(y),
        Err(_) => match raw.parse::<f64>() {
            // Tolerate "2019.0" style values from spreadsheet exports
            Ok(f) if f.fract() == 0.0 && f.is_finite() => Param::Int(f as i64),
            // A non-integral year still binds; equality against the
            // integer column then matches no rows, rather than the
            // field silently vanishing into a match-all query.
            Ok(f) if f.is_finite() => Param::Real(f),
            _ => return None,
        },
    };

    let predicate = Predicate {
        clause: "year = ?",
        param,
    };
    Some(FieldPredicates {
        exact: predicate.clone(),
        fuzzy: predicate,
    })
}

/// Department: canonical equality when the lookup resolved a name,
/// raw contains-match in both sets otherwise
pub fn dept_predicates(raw: &str, canonical: Option<&str>) -> FieldPredicates {
    match canonical {
        Some(name) => FieldPredicates {
            exact: Predicate::text("dept = ?", name),
            fuzzy: Predicate::text("dept LIKE ?", contains(name)),
        },
        None => {
            let like = Predicate::text("dept LIKE ?", contains(raw));
            FieldPredicates {
                exact: like.clone(),
                fuzzy: like,
            }
        }
    }
}

/// Generic contains-match, identical in both sets
pub fn contains_predicates(rule_column: &'static str, raw: &str) -> FieldPredicates {
    let clause: &'static str = match rule_column {
        "roll" => "roll LIKE ?",
        "name" => "name LIKE ?",
        "designation" => "designation LIKE ?",
        "address" => "address LIKE ?",
        "company" => "company LIKE ?",
        // FIELD_TABLE only routes the five columns above here
        _ => unreachable!("unknown contains column"),
    };
    let like = Predicate::text(clause, contains(raw));
    FieldPredicates {
        exact: like.clone(),
        fuzzy: like,
    }
}
