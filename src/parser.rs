//! Parse the definitions table resource and dotted OID strings using PEST.

use pest::Parser;
use pest_derive::Parser as PestParser;

use crate::error::AfpError;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct AfpParser;

/// One definitions-table line, still unvalidated.
#[derive(Debug, Clone)]
pub(crate) struct RawDefinition {
    pub key: String,
    pub abbrev: String,
    pub description: String,
}

/// Parse table source into raw entries.
pub(crate) fn parse_definitions(source: &str) -> Result<Vec<RawDefinition>, AfpError> {
    let mut pairs = AfpParser::parse(Rule::table, source)
        .map_err(|e| AfpError::Registry(format!("definitions table parse error: {e}")))?;
    let table = pairs
        .next()
        .ok_or_else(|| AfpError::Registry("empty definitions table".to_string()))?;

    let mut out = Vec::new();
    for entry in table.into_inner() {
        if entry.as_rule() != Rule::entry {
            continue;
        }
        let mut key = String::new();
        let mut abbrev = String::new();
        let mut description = String::new();
        for part in entry.into_inner() {
            match part.as_rule() {
                Rule::key => key = part.as_str().to_string(),
                Rule::abbrev => abbrev = part.as_str().to_string(),
                Rule::desc => description = part.as_str().trim().to_string(),
                _ => {}
            }
        }
        out.push(RawDefinition {
            key,
            abbrev,
            description,
        });
    }
    Ok(out)
}

/// Parse a `{d(.d)*}` OID string into its integer components.
pub(crate) fn parse_oid(source: &str) -> Result<Vec<u64>, AfpError> {
    let mut pairs = AfpParser::parse(Rule::oid, source)
        .map_err(|_| AfpError::OidSyntax(format!("not a dotted OID string: {source}")))?;
    let oid = pairs
        .next()
        .ok_or_else(|| AfpError::OidSyntax(format!("not a dotted OID string: {source}")))?;

    let mut components = Vec::new();
    for part in oid.into_inner() {
        if part.as_rule() == Rule::uint {
            let n = part
                .as_str()
                .parse::<u64>()
                .map_err(|_| AfpError::OidSyntax(format!("component out of range in {source}")))?;
            components.push(n);
        }
    }
    Ok(components)
}
