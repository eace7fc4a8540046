//! Office-name and finding-fragment gazetteers for one report.

use crate::error::{Result, TaggerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Canonical office names mapped to the other spellings reports use for them.
///
/// Loaded from YAML shaped like:
///
/// ```yaml
/// מערכת הבטחון:
///   - מערכת הביטחון
/// משרדי הממשלה:
///   - משרדי ממשלה
/// רשות המסים:
/// ```
///
/// A canonical name without variants is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlternateNames {
    names: BTreeMap<String, Vec<String>>,
}

impl AlternateNames {
    /// Parse the YAML alternate-name map
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: BTreeMap<String, Option<Vec<String>>> = serde_yaml::from_str(source)
            .map_err(|e| TaggerError::config(format!("invalid alternate office names: {e}")))?;

        Ok(Self {
            names: raw
                .into_iter()
                .map(|(canonical, variants)| (canonical, variants.unwrap_or_default()))
                .collect(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Canonical names followed by all of their variants
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .flat_map(|(canonical, variants)| {
                std::iter::once(canonical).chain(variants.iter())
            })
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Report metadata scraped from the report's web page.
///
/// Only the identifier and the two finding mappings are read; every other key
/// of the scraped preface is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPreface {
    #[serde(default)]
    pub id: Option<String>,

    /// Office name → titles of the findings it appears in
    #[serde(default)]
    pub offices_to_defects: BTreeMap<String, Vec<String>>,

    /// Keyword → titles of the findings it appears in
    #[serde(default)]
    pub keywords_to_defects: BTreeMap<String, Vec<String>>,
}

impl ReportPreface {
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|e| TaggerError::config(format!("invalid report preface: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Every finding title listed under an office or a keyword
    pub fn finding_texts(&self) -> impl Iterator<Item = &str> {
        self.offices_to_defects
            .values()
            .chain(self.keywords_to_defects.values())
            .flatten()
            .map(String::as_str)
    }
}

/// Resolved lookup sets, built once per report and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    office_names: HashSet<String>,
    finding_fragments: HashSet<String>,
}

fn normalized(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl Vocabulary {
    /// Merge alternate names with the report's own offices and findings
    pub fn resolve(alternates: &AlternateNames, preface: &ReportPreface) -> Self {
        let office_names: HashSet<String> = alternates
            .all_names()
            .chain(preface.offices_to_defects.keys().map(String::as_str))
            .filter_map(normalized)
            .collect();

        let finding_fragments: HashSet<String> =
            preface.finding_texts().filter_map(normalized).collect();

        log::debug!(
            "Resolved vocabulary: {} office names, {} finding fragments",
            office_names.len(),
            finding_fragments.len()
        );

        Self {
            office_names,
            finding_fragments,
        }
    }

    /// Exact office-name lookup after trimming
    #[must_use]
    pub fn is_office(&self, text: &str) -> bool {
        self.office_names.contains(text.trim())
    }

    /// Whether the trimmed text occurs inside some known finding title
    #[must_use]
    pub fn in_finding_fragment(&self, text: &str) -> bool {
        let text = text.trim();
        !text.is_empty()
            && self
                .finding_fragments
                .iter()
                .any(|fragment| fragment.contains(text))
    }

    #[must_use]
    pub const fn finding_fragments(&self) -> &HashSet<String> {
        &self.finding_fragments
    }
}
