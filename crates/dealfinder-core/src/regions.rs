//! Region resolver: maps a caller-supplied region code to the locale
//! parameters that bias the shopping provider toward that market.
//!
//! The table is built once at startup (built-in entries, optionally extended
//! by a YAML file) and is read-only afterwards. Lookups are total: any code
//! not in the table resolves to the `global` descriptor.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const GLOBAL_REGION: &str = "global";

/// A region code exactly as the caller supplied it.
///
/// Unrecognized codes are kept verbatim (they are echoed back in responses)
/// even though they resolve to the `global` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn global() -> Self {
        Self(GLOBAL_REGION.to_string())
    }

    /// Builds a code from an optional request parameter. Absent or blank
    /// values become `global`.
    #[must_use]
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(code) if !code.is_empty() => Self::new(code),
            _ => Self::global(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RegionCode {
    fn default() -> Self {
        Self::global()
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Search-locale parameters for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Search-engine domain, e.g. `google.co.uk`.
    pub search_domain: String,
    /// Interface language / locale, e.g. `en-GB`.
    pub locale: String,
}

impl RegionDescriptor {
    fn new(search_domain: &str, locale: &str) -> Self {
        Self {
            search_domain: search_domain.to_string(),
            locale: locale.to_string(),
        }
    }
}

/// Immutable region lookup table.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: BTreeMap<String, RegionDescriptor>,
    fallback: RegionDescriptor,
}

/// On-disk shape of the optional regions YAML file.
#[derive(Debug, Deserialize)]
pub struct RegionsFile {
    pub regions: BTreeMap<String, RegionDescriptor>,
}

impl RegionTable {
    /// The built-in markets: `US`, `UK`, `CA`, `AU`, and `global`.
    #[must_use]
    pub fn builtin() -> Self {
        let fallback = RegionDescriptor::new("google.com", "en");
        let mut regions = BTreeMap::new();
        regions.insert("US".to_string(), RegionDescriptor::new("google.com", "en-US"));
        regions.insert("UK".to_string(), RegionDescriptor::new("google.co.uk", "en-GB"));
        regions.insert("CA".to_string(), RegionDescriptor::new("google.ca", "en-CA"));
        regions.insert("AU".to_string(), RegionDescriptor::new("google.com.au", "en-AU"));
        regions.insert(GLOBAL_REGION.to_string(), fallback.clone());
        Self { regions, fallback }
    }

    /// Returns a copy of this table with `file`'s entries added or replacing
    /// existing ones. Overriding `global` also changes the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any entry has an empty code,
    /// domain, or locale.
    pub fn with_overrides(mut self, file: RegionsFile) -> Result<Self, ConfigError> {
        for (code, descriptor) in file.regions {
            if code.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "region code must be non-empty".to_string(),
                ));
            }
            if descriptor.search_domain.trim().is_empty() || descriptor.locale.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "region '{code}' must have a non-empty search_domain and locale"
                )));
            }
            if code == GLOBAL_REGION {
                self.fallback = descriptor.clone();
            }
            self.regions.insert(code, descriptor);
        }
        Ok(self)
    }

    /// Resolves a region code. Matching is exact (case-sensitive); anything
    /// not in the table, including the empty string, gets the `global`
    /// descriptor.
    #[must_use]
    pub fn resolve(&self, code: &str) -> &RegionDescriptor {
        self.regions.get(code).unwrap_or(&self.fallback)
    }

    /// Whether `code` has its own entry rather than falling back to `global`.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.regions.contains_key(code)
    }

    /// All configured entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionDescriptor)> {
        self.regions.iter().map(|(code, d)| (code.as_str(), d))
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builds the effective region table: the built-in entries, extended by the
/// YAML file at `path` when one is configured.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_region_table(path: Option<&Path>) -> Result<RegionTable, ConfigError> {
    let Some(path) = path else {
        return Ok(RegionTable::builtin());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: RegionsFile = serde_yaml::from_str(&content)?;

    RegionTable::builtin().with_overrides(file)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn resolves_builtin_regions() {
        let table = RegionTable::builtin();
        assert_eq!(table.resolve("UK").search_domain, "google.co.uk");
        assert_eq!(table.resolve("UK").locale, "en-GB");
        assert_eq!(table.resolve("CA").search_domain, "google.ca");
        assert_eq!(table.resolve("AU").locale, "en-AU");
        assert_eq!(table.resolve("US").locale, "en-US");
    }

    #[test]
    fn unknown_region_resolves_to_global() {
        let table = RegionTable::builtin();
        assert_eq!(table.resolve("xx"), table.resolve("global"));
        assert_eq!(table.resolve(""), table.resolve("global"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = RegionTable::builtin();
        assert_eq!(table.resolve("uk"), table.resolve("global"));
        assert!(!table.contains("uk"));
    }

    #[test]
    fn region_code_from_param_defaults_to_global() {
        assert_eq!(RegionCode::from_param(None), RegionCode::global());
        assert_eq!(RegionCode::from_param(Some("")), RegionCode::global());
        assert_eq!(RegionCode::from_param(Some("  ")), RegionCode::global());
        assert_eq!(RegionCode::from_param(Some("UK")).as_str(), "UK");
    }

    #[test]
    fn region_code_keeps_unknown_codes_verbatim() {
        assert_eq!(RegionCode::from_param(Some("xx")).as_str(), "xx");
    }

    #[test]
    fn overrides_add_and_replace_entries() {
        let mut regions = BTreeMap::new();
        regions.insert("DE".to_string(), RegionDescriptor::new("google.de", "de-DE"));
        regions.insert(
            GLOBAL_REGION.to_string(),
            RegionDescriptor::new("google.com", "en-US"),
        );
        let table = RegionTable::builtin()
            .with_overrides(RegionsFile { regions })
            .unwrap();

        assert_eq!(table.resolve("DE").search_domain, "google.de");
        assert_eq!(table.resolve("nowhere").locale, "en-US");
        assert_eq!(table.resolve("UK").locale, "en-GB");
    }

    #[test]
    fn overrides_reject_empty_locale() {
        let mut regions = BTreeMap::new();
        regions.insert("FR".to_string(), RegionDescriptor::new("google.fr", " "));
        let err = RegionTable::builtin()
            .with_overrides(RegionsFile { regions })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("FR")));
    }

    #[test]
    fn load_region_table_without_path_is_builtin() {
        let table = load_region_table(None).unwrap();
        assert_eq!(table.iter().count(), 5);
    }

    #[test]
    fn load_region_table_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "regions:\n  IE:\n    search_domain: google.ie\n    locale: en-IE\n"
        )
        .unwrap();

        let table = load_region_table(Some(file.path())).unwrap();
        assert_eq!(table.resolve("IE").search_domain, "google.ie");
        assert!(table.contains("US"));
    }

    #[test]
    fn load_region_table_reports_missing_file() {
        let err = load_region_table(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::RegionsFileIo { .. }));
    }

    #[test]
    fn load_region_table_reports_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "regions: [not, a, map]").unwrap();
        let err = load_region_table(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::RegionsFileParse(_)));
    }
}
