//! Parse and validate search queries

use std::path::PathBuf;

use super::CliError;
use crate::ast::ParsedQuery;
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::parser::{ParseContext, try_parse};
use crate::registry::StaticFieldRegistry;

/// Options for the check and parse commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub query: String,
    /// Parser configuration file, defaults apply when absent
    pub config: Option<PathBuf>,
    /// Field registry file, the built-in registry applies when absent
    pub registry: Option<PathBuf>,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Parsed without invalid tokens
    Valid(ParsedQuery),
    /// Parsed, but a token carries an invalid reason
    Invalid {
        parsed: ParsedQuery,
        text: String,
        offset: usize,
        reason: String,
    },
    /// Not valid syntax
    SyntaxError(ParseError),
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckResult::Valid(_))
    }

    pub fn into_parse_result(self) -> Result<ParsedQuery, ParseError> {
        match self {
            CheckResult::Valid(parsed) | CheckResult::Invalid { parsed, .. } => Ok(parsed),
            CheckResult::SyntaxError(err) => Err(err),
        }
    }
}

pub(crate) fn load_context(
    config: Option<&PathBuf>,
    registry: Option<&PathBuf>,
) -> Result<(ParserConfig, StaticFieldRegistry), CliError> {
    let config = match config {
        Some(path) => ParserConfig::from_path(path)?,
        None => ParserConfig::default(),
    };
    let registry = match registry {
        Some(path) => StaticFieldRegistry::from_path(path)?,
        None => StaticFieldRegistry::builtin(),
    };
    Ok((config, registry))
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.query.trim().is_empty() {
        return Err(CliError::NoQuery);
    }
    let (config, registry) = load_context(options.config.as_ref(), options.registry.as_ref())?;
    let ctx = ParseContext::new(&config, &registry);

    let parsed = match try_parse(&options.query, &ctx) {
        Ok(parsed) => parsed,
        Err(err) => return Ok(CheckResult::SyntaxError(err)),
    };
    let invalid = parsed
        .first_invalid()
        .map(|(token, reason)| (token.text.clone(), token.start(), reason.reason.clone()));
    Ok(match invalid {
        Some((text, offset, reason)) => CheckResult::Invalid {
            parsed,
            text,
            offset,
            reason,
        },
        None => CheckResult::Valid(parsed),
    })
}
