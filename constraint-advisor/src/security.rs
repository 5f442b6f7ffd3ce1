//! Identifier and input checks for rendered automation templates.
//!
//! Templates embed table and column names verbatim inside quoted SQL literals.
//! When strict identifiers are enabled, every name passes
//! [`SqlSecurity::validate_embedded_name`] before it reaches a template. The
//! metadata table is embedded unquoted and must pass the stricter
//! [`SqlSecurity::validate_identifier`]. Numeric rule properties are checked
//! with [`InputValidator`] when a rule configuration is loaded.

use crate::error::{AdvisorError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const MAX_IDENTIFIER_LENGTH: usize = 128;

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Hard-coded pattern, known to compile
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*)*$")
        .expect("Hard-coded regex pattern should be valid")
});

static DANGEROUS_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "union", "select", "insert", "update", "delete", "drop", "create", "alter", "truncate",
        "exec", "execute", "declare", "merge", "grant", "revoke",
    ]
    .into_iter()
    .collect()
});

const DANGEROUS_SEQUENCES: [&str; 6] = [";", "--", "/*", "*/", "'", "\""];

/// Sequences that end or escape a single-quoted literal, or start a new statement.
const LITERAL_BREAKOUT_SEQUENCES: [&str; 6] = ["'", "\\", ";", "--", "/*", "*/"];

/// SQL identifier validation.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates a table or column name before it is embedded in a template.
    ///
    /// Accepts plain and dot-qualified identifiers (`$` allowed after the first
    /// character). Statement keywords are rejected only as whole name parts,
    /// so `CREATED_AT` passes while `DROP` or `X_DROP_Y` do not.
    ///
    /// # Examples
    /// ```rust
    /// use constraint_advisor::security::SqlSecurity;
    ///
    /// assert!(SqlSecurity::validate_identifier("CUSTOMER_ID").is_ok());
    /// assert!(SqlSecurity::validate_identifier("DWH.DIM_CUSTOMER").is_ok());
    /// assert!(SqlSecurity::validate_identifier("id; DROP TABLE users--").is_err());
    /// ```
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(AdvisorError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(AdvisorError::SecurityError(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.contains('\0') {
            return Err(AdvisorError::SecurityError(
                "SQL identifier cannot contain null bytes".to_string(),
            ));
        }

        for sequence in DANGEROUS_SEQUENCES {
            if identifier.contains(sequence) {
                return Err(AdvisorError::SecurityError(format!(
                    "SQL identifier '{identifier}' contains dangerous sequence: '{sequence}'"
                )));
            }
        }

        if !IDENTIFIER_REGEX.is_match(identifier) {
            return Err(AdvisorError::SecurityError(format!(
                "Invalid SQL identifier format: '{identifier}'. Identifiers must start with a letter or underscore and contain only letters, numbers, underscores, dollar signs, and dots"
            )));
        }

        Self::check_dangerous_tokens(identifier)
    }

    /// Validates a table or column name embedded inside a quoted template literal.
    ///
    /// Only what can leave the literal is rejected: quotes, backslash escapes,
    /// statement separators, comment markers and control characters. Keywords,
    /// spaces and dashes are harmless there, so `CREATE_DATE` or `Order Date`
    /// pass.
    ///
    /// # Examples
    /// ```rust
    /// use constraint_advisor::security::SqlSecurity;
    ///
    /// assert!(SqlSecurity::validate_embedded_name("LAST_UPDATE_TS").is_ok());
    /// assert!(SqlSecurity::validate_embedded_name("customer-id").is_ok());
    /// assert!(SqlSecurity::validate_embedded_name("ID'); DROP TABLE users; --").is_err());
    /// ```
    pub fn validate_embedded_name(name: &str) -> Result<()> {
        if name.chars().any(char::is_control) {
            return Err(AdvisorError::SecurityError(format!(
                "Name {name:?} cannot contain control characters"
            )));
        }

        if let Some(sequence) = LITERAL_BREAKOUT_SEQUENCES
            .into_iter()
            .find(|sequence| name.contains(sequence))
        {
            return Err(AdvisorError::SecurityError(format!(
                "Name '{name}' contains dangerous sequence: '{sequence}'"
            )));
        }
        Ok(())
    }

    /// Validates a plain word used as a template literal (e.g. a rule level).
    pub fn validate_literal_word(value: &str, name: &str) -> Result<()> {
        let valid = !value.is_empty()
            && value.len() <= MAX_IDENTIFIER_LENGTH
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ',');
        if valid {
            Ok(())
        } else {
            Err(AdvisorError::SecurityError(format!(
                "Invalid {name} '{value}': only letters, digits, underscores and commas are allowed"
            )))
        }
    }

    fn check_dangerous_tokens(identifier: &str) -> Result<()> {
        let lower = identifier.to_lowercase();
        if let Some(token) = lower
            .split(['_', '.'])
            .find(|token| DANGEROUS_TOKENS.contains(token))
        {
            return Err(AdvisorError::SecurityError(format!(
                "SQL identifier '{identifier}' contains dangerous keyword: '{token}'"
            )));
        }
        Ok(())
    }
}

/// Validation of numeric rule properties.
pub struct InputValidator;

impl InputValidator {
    /// Validates that a threshold is a finite number.
    pub fn validate_threshold(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(AdvisorError::Configuration(format!(
                "Invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }

    /// Validates a share value (0.0 to 1.0).
    pub fn validate_percentage(value: f64, name: &str) -> Result<()> {
        Self::validate_threshold(value, name)?;

        if !(0.0..=1.0).contains(&value) {
            return Err(AdvisorError::Configuration(format!(
                "Invalid {name} value: must be between 0.0 and 1.0, got {value}"
            )));
        }
        Ok(())
    }

    /// Validates an inclusive integer range.
    pub fn validate_range(value: u64, min: u64, max: u64, name: &str) -> Result<()> {
        if !(min..=max).contains(&value) {
            return Err(AdvisorError::Configuration(format!(
                "Invalid {name} value: must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }
}
