//! The structured-field definitions registry: code to abbreviation and
//! description mappings, with derived begin/end group pairings.
//!
//! The table is baked into the crate as a text resource. Codes,
//! abbreviations and descriptions follow the IBM MO:DCA registry. An
//! entry whose description starts with "begin" is paired with the entry
//! whose abbreviation replaces the first letter with `E`/`e`; the load
//! fails when that entry is missing or when two begin codes would share
//! one end code.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use tracing::{trace, warn};

use crate::dump::hex_pad;
use crate::error::AfpError;
use crate::parser;

const DEFINITIONS_TABLE: &str = include_str!("definitions.txt");

static DEFINITIONS: OnceLock<Result<StructuredFieldDefinitions, String>> = OnceLock::new();

/// The process-wide definitions registry, loaded on first use. A load
/// failure is cached and re-raised to every caller.
pub fn definitions() -> Result<&'static StructuredFieldDefinitions, AfpError> {
    let loaded = DEFINITIONS.get_or_init(|| {
        StructuredFieldDefinitions::from_source(DEFINITIONS_TABLE).map_err(|e| e.to_string())
    });
    match loaded {
        Ok(defs) => Ok(defs),
        Err(msg) => Err(AfpError::Registry(msg.clone())),
    }
}

#[derive(Debug)]
pub struct StructuredFieldDefinitions {
    abbrev2code: HashMap<String, u32>,
    code2abbrev: BTreeMap<u32, String>,
    code2desc: HashMap<u32, String>,
    begin2end: HashMap<u32, u32>,
    end2begin: HashMap<u32, u32>,
}

impl StructuredFieldDefinitions {
    /// Build a registry from table source. Library users normally go
    /// through [`definitions`]; this is public so alternative tables can
    /// be loaded and exercised directly.
    pub fn from_source(source: &str) -> Result<Self, AfpError> {
        let raw = parser::parse_definitions(source)?;

        let mut defs = StructuredFieldDefinitions {
            abbrev2code: HashMap::new(),
            code2abbrev: BTreeMap::new(),
            code2desc: HashMap::new(),
            begin2end: HashMap::new(),
            end2begin: HashMap::new(),
        };

        // Codes from keys that fail the hexadecimal pattern stay usable
        // for plain lookup but are kept out of pairing derivation.
        let mut no_pairing: HashSet<u32> = HashSet::new();

        for entry in raw {
            let code = if is_hex_key(&entry.key) {
                u32::from_str_radix(&entry.key[2..], 16).map_err(|_| {
                    AfpError::Registry(format!("key '{}' out of range", entry.key))
                })?
            } else {
                warn!("malformed key '{}' in definitions table", entry.key);
                let code = entry.key.parse::<u32>().map_err(|_| {
                    AfpError::Registry(format!("unusable key '{}' in definitions table", entry.key))
                })?;
                no_pairing.insert(code);
                code
            };

            let abbrev = entry.abbrev.to_uppercase();
            if defs.code2abbrev.insert(code, abbrev.clone()).is_some() {
                return Err(AfpError::Registry(format!(
                    "code {} defined more than once",
                    hex_pad(code.into(), 6)
                )));
            }
            if defs.abbrev2code.insert(abbrev.clone(), code).is_some() {
                return Err(AfpError::Registry(format!(
                    "abbreviation '{abbrev}' defined more than once"
                )));
            }
            if !entry.description.is_empty() {
                defs.code2desc.insert(code, entry.description);
            }
        }

        for (&code_begin, abbrev) in &defs.code2abbrev {
            if no_pairing.contains(&code_begin) {
                continue;
            }
            let desc = match defs.code2desc.get(&code_begin) {
                Some(d) => d,
                None => continue,
            };
            if !desc.to_lowercase().starts_with("begin") {
                continue;
            }

            let abbrev_end = end_abbreviation(abbrev);
            let code_end = defs
                .abbrev2code
                .get(&abbrev_end)
                .copied()
                .filter(|c| !no_pairing.contains(c))
                .ok_or_else(|| {
                    AfpError::Registry(format!(
                        "no \"end\" abbreviation {abbrev_end} for \"begin\" abbreviation {abbrev} ({desc})"
                    ))
                })?;
            trace!(
                "derived group pairing {}/{}",
                hex_pad(code_begin.into(), 6),
                hex_pad(code_end.into(), 6)
            );

            if let Some(&other) = defs.end2begin.get(&code_end) {
                return Err(AfpError::Registry(format!(
                    "end code '{abbrev_end}'/{} matches multiple begin codes: {} and {}",
                    hex_pad(code_end.into(), 6),
                    hex_pad(other.into(), 6),
                    hex_pad(code_begin.into(), 6)
                )));
            }
            defs.begin2end.insert(code_begin, code_end);
            defs.end2begin.insert(code_end, code_begin);
        }

        Ok(defs)
    }

    /// The abbreviation for a code, if known.
    pub fn abbreviation(&self, code: u32) -> Option<&str> {
        self.code2abbrev.get(&code).map(String::as_str)
    }

    /// The description for a code, if known.
    pub fn description(&self, code: u32) -> Option<&str> {
        self.code2desc.get(&code).map(String::as_str)
    }

    /// The code for an abbreviation, case-insensitively.
    pub fn code(&self, abbrev: &str) -> Option<u32> {
        self.abbrev2code.get(&abbrev.to_uppercase()).copied()
    }

    /// All known codes, in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.code2abbrev.keys().copied()
    }

    /// All known abbreviations.
    pub fn abbreviations(&self) -> impl Iterator<Item = &str> + '_ {
        self.abbrev2code.keys().map(String::as_str)
    }

    pub fn is_group_begin(&self, code: u32) -> bool {
        self.begin2end.contains_key(&code)
    }

    pub fn is_group_end(&self, code: u32) -> bool {
        self.end2begin.contains_key(&code)
    }

    /// The matching end code for a begin-group code.
    pub fn group_end(&self, code: u32) -> Option<u32> {
        self.begin2end.get(&code).copied()
    }

    /// The matching begin code for an end-group code.
    pub fn group_begin(&self, code: u32) -> Option<u32> {
        self.end2begin.get(&code).copied()
    }
}

fn is_hex_key(key: &str) -> bool {
    let rest = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X"));
    match rest {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn end_abbreviation(abbrev: &str) -> String {
    let mut chars = abbrev.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => format!("E{}", chars.as_str()),
        Some(c) if c.is_ascii_lowercase() => format!("e{}", chars.as_str()),
        _ => abbrev.to_string(),
    }
}
