//! Allow-listed stored routines and the statements that invoke them.
//!
//! Routine names are never taken from callers as free text: every procedure or
//! function the service may invoke is a variant here, and anything else fails
//! to parse.

use std::fmt;
use std::str::FromStr;

use super::manager::DatabaseError;

/// Stored procedures invoked for side effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    InsertCountry,
    InsertCurrency,
    InsertStockExchange,
    InsertInvestmentSegment,
    InsertInvestmentType,
}

/// Stored functions invoked for their result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    FetchCountries,
    FetchExchange,
    FetchInvestmentSegments,
    FetchInvestmentTypes,
}

impl Procedure {
    pub const ALL: [Procedure; 5] = [
        Procedure::InsertCountry,
        Procedure::InsertCurrency,
        Procedure::InsertStockExchange,
        Procedure::InsertInvestmentSegment,
        Procedure::InsertInvestmentType,
    ];

    /// Unquoted routine name as created in the schema
    pub fn name(&self) -> &'static str {
        match self {
            Procedure::InsertCountry => "InsertCountry",
            Procedure::InsertCurrency => "InsertCurrency",
            Procedure::InsertStockExchange => "InsertStockExchange",
            Procedure::InsertInvestmentSegment => "InsertInvestmentSegment",
            Procedure::InsertInvestmentType => "InsertInvestmentType",
        }
    }

    /// Number of positional parameters the procedure declares
    pub fn arity(&self) -> usize {
        match self {
            Procedure::InsertCountry => 5,
            Procedure::InsertCurrency => 4,
            Procedure::InsertStockExchange => 8,
            Procedure::InsertInvestmentSegment => 3,
            Procedure::InsertInvestmentType => 5,
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.name())
    }

    /// `CALL public."Name"($1, ..., $n)`
    pub fn call_sql(&self, param_count: usize) -> String {
        procedure_call_sql(&self.qualified_name(), param_count)
    }
}

impl Function {
    pub const ALL: [Function; 4] = [
        Function::FetchCountries,
        Function::FetchExchange,
        Function::FetchInvestmentSegments,
        Function::FetchInvestmentTypes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::FetchCountries => "FetchCountries",
            Function::FetchExchange => "FetchExchange",
            Function::FetchInvestmentSegments => "FetchInvestmentSegments",
            Function::FetchInvestmentTypes => "FetchInvestmentTypes",
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.name())
    }

    /// `SELECT * FROM public."Name"($1, ..., $n)`
    pub fn select_sql(&self, param_count: usize) -> String {
        function_select_sql(&self.qualified_name(), param_count)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

impl FromStr for Procedure {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = bare_name(s).ok_or_else(|| DatabaseError::UnknownRoutine(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|p| p.name() == bare)
            .ok_or_else(|| DatabaseError::UnknownRoutine(s.to_string()))
    }
}

impl FromStr for Function {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = bare_name(s).ok_or_else(|| DatabaseError::UnknownRoutine(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|f| f.name() == bare)
            .ok_or_else(|| DatabaseError::UnknownRoutine(s.to_string()))
    }
}

/// Render `$1, $2, ..., $n`
pub fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn procedure_call_sql(qualified_name: &str, param_count: usize) -> String {
    format!("CALL {}({})", qualified_name, placeholders(param_count))
}

pub fn function_select_sql(qualified_name: &str, param_count: usize) -> String {
    format!("SELECT * FROM {}({})", qualified_name, placeholders(param_count))
}

/// Routines live in `public` and are created with quoted mixed-case names.
fn qualify(name: &str) -> String {
    format!("public.{}", quote_identifier(name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Accepts `public."Name"`, `"Name"` or `Name`; returns `Name`.
fn bare_name(s: &str) -> Option<&str> {
    let s = s.trim();
    let s = s.strip_prefix("public.").unwrap_or(s);
    let s = match s.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"')?,
        None => s,
    };
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_positional_and_ordered() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "$1");
        assert_eq!(placeholders(5), "$1, $2, $3, $4, $5");
    }

    #[test]
    fn procedure_call_has_one_placeholder_per_param() {
        let sql = Procedure::InsertCountry.call_sql(5);
        assert_eq!(sql, r#"CALL public."InsertCountry"($1, $2, $3, $4, $5)"#);

        for n in 0..12 {
            let sql = Procedure::InsertStockExchange.call_sql(n);
            assert_eq!(sql.matches('$').count(), n);
            if n > 0 {
                assert!(sql.contains(&format!("${})", n)));
            }
        }
    }

    #[test]
    fn function_select_keeps_quoted_name() {
        assert_eq!(
            Function::FetchCountries.select_sql(0),
            r#"SELECT * FROM public."FetchCountries"()"#
        );
        assert_eq!(
            Function::FetchInvestmentTypes.select_sql(2),
            r#"SELECT * FROM public."FetchInvestmentTypes"($1, $2)"#
        );
    }

    #[test]
    fn parses_all_accepted_spellings() {
        assert_eq!(
            r#"public."InsertCountry""#.parse::<Procedure>().unwrap(),
            Procedure::InsertCountry
        );
        assert_eq!(
            r#""InsertCurrency""#.parse::<Procedure>().unwrap(),
            Procedure::InsertCurrency
        );
        assert_eq!(
            "FetchExchange".parse::<Function>().unwrap(),
            Function::FetchExchange
        );
    }

    #[test]
    fn rejects_names_outside_allow_list() {
        assert!("DropEverything".parse::<Procedure>().is_err());
        assert!("FetchCountries".parse::<Procedure>().is_err());
        assert!("InsertCountry".parse::<Function>().is_err());
        assert!(r#"public."FetchCountries"(); DROP TABLE x; --"#
            .parse::<Function>()
            .is_err());
        assert!(r#""FetchCountries"#.parse::<Function>().is_err());
        assert!("".parse::<Function>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for p in Procedure::ALL {
            assert_eq!(p.to_string().parse::<Procedure>().unwrap(), p);
        }
        for f in Function::ALL {
            assert_eq!(f.to_string().parse::<Function>().unwrap(), f);
        }
    }
}
