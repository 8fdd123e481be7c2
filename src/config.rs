//! Configuration for code analysis.
//!
//! Two layers exist:
//! - `Configuration`: what a user writes in a YAML file (and overrides on the
//!   command line).
//! - `AnalysisConfig`: the fully resolved value handed to the analyzer. It is
//!   passed explicitly and never mutated during an analysis.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)$").unwrap());

/// Keywords that need a newer dialect than the default target.
static DEFAULT_KEYWORDS: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![KeywordRule::new(
        DialectVersion::new(3, 10),
        &["match", "case"],
    )]
});

/// The process-wide, read-only keyword compatibility table.
pub fn default_keyword_table() -> &'static [KeywordRule] {
    &DEFAULT_KEYWORDS
}

/// A `(major, minor)` language dialect version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DialectVersion {
    pub major: u32,
    pub minor: u32,
}

impl DialectVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for DialectVersion {
    fn default() -> Self {
        Self::new(3, 8)
    }
}

impl fmt::Display for DialectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for DialectVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = VERSION_RE
            .captures(s)
            .ok_or_else(|| ConfigError::InvalidVersion(s.to_string()))?;
        let major = caps[1]
            .parse()
            .map_err(|_| ConfigError::InvalidVersion(s.to_string()))?;
        let minor = caps[2]
            .parse()
            .map_err(|_| ConfigError::InvalidVersion(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for DialectVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DialectVersion> for String {
    fn from(version: DialectVersion) -> Self {
        version.to_string()
    }
}

/// Keywords introduced in a given dialect version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub version: DialectVersion,
    #[serde(alias = "values")]
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(version: DialectVersion, keywords: &[&str]) -> Self {
        Self {
            version,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Fully resolved analysis settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Target dialect version for the keyword gate.
    pub python_version: DialectVersion,
    /// Allow-list of function names; empty means no restriction.
    pub functions_to_analyze: Vec<String>,
    /// Deny-list of function names.
    pub ignore: Vec<String>,
    pub keywords: Vec<KeywordRule>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            python_version: DialectVersion::default(),
            functions_to_analyze: Vec::new(),
            ignore: Vec::new(),
            keywords: default_keyword_table().to_vec(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_python_version(mut self, version: DialectVersion) -> Self {
        self.python_version = version;
        self
    }

    pub fn with_functions_to_analyze<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions_to_analyze = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<KeywordRule>) -> Self {
        self.keywords = keywords;
        self
    }
}

/// User-facing configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub python_version: DialectVersion,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Comma-separated string or list of function names to keep.
    #[serde(default, deserialize_with = "deserialize_name_list")]
    pub functions_to_analyze: Vec<String>,
    /// Comma-separated string or list of function names to drop.
    #[serde(default, deserialize_with = "deserialize_name_list")]
    pub ignore: Vec<String>,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<KeywordRule>,
    /// Glob patterns skipped when analyzing a directory.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_keywords() -> Vec<KeywordRule> {
    default_keyword_table().to_vec()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            python_version: DialectVersion::default(),
            encoding: default_encoding(),
            functions_to_analyze: Vec::new(),
            ignore: Vec::new(),
            keywords: default_keywords(),
            excluded_paths: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameList {
    Csv(String),
    List(Vec<String>),
}

fn deserialize_name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Option::<NameList>::deserialize(deserializer)?;
    Ok(match names {
        None => Vec::new(),
        Some(NameList::Csv(s)) => parse_name_list(&s),
        Some(NameList::List(list)) => list
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
    })
}

/// Split a comma-separated list of names, dropping blanks.
pub fn parse_name_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

impl Configuration {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        // An empty file means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let configuration: Configuration = serde_yaml::from_str(content)?;
        Ok(configuration)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_encoding()?;
        for pattern in &self.excluded_paths {
            globset::Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Produce the settings the analyzer runs with.
    pub fn resolve(&self) -> AnalysisConfig {
        AnalysisConfig {
            python_version: self.python_version,
            functions_to_analyze: self.functions_to_analyze.clone(),
            ignore: self.ignore.clone(),
            keywords: self.keywords.clone(),
        }
    }

    /// Decode raw file bytes with the configured encoding.
    ///
    /// A UTF-8 byte-order mark is stripped; malformed input is an error
    /// rather than being replaced.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, ConfigError> {
        let encoding = self.resolve_encoding()?;
        let bytes = if encoding == UTF_8 {
            bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
        } else {
            bytes
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                ConfigError::UnsupportedEncoding(format!("{} (invalid data)", self.encoding))
            })
    }

    /// Look up the configured encoding label (`utf-8`, `latin-1`, `cp1252`, ...).
    fn resolve_encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnsupportedEncoding(self.encoding.clone()))
    }

    /// Check if a path matches one of the `excluded_paths` patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Default configuration file written by `code-analyzr init`.
pub const DEFAULT_CONFIGURATION_YAML: &str = include_str!("templates/code-analyzr.yaml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let v: DialectVersion = "3.10".parse().unwrap();
        assert_eq!(v, DialectVersion::new(3, 10));
        assert_eq!(v.to_string(), "3.10");

        assert!("3".parse::<DialectVersion>().is_err());
        assert!("3.x".parse::<DialectVersion>().is_err());
        assert!("3.8.1".parse::<DialectVersion>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(DialectVersion::new(3, 10) > DialectVersion::new(3, 8));
        assert!(DialectVersion::new(4, 0) > DialectVersion::new(3, 12));
        assert!(DialectVersion::new(3, 8) == DialectVersion::default());
    }

    #[test]
    fn test_parse_configuration() {
        let yaml = r#"
python_version: "3.9"
functions_to_analyze: "predict, train"
ignore:
  - helper
keywords:
  - version: "3.10"
    values: ["match", "case"]
  - version: "3.12"
    keywords: ["type"]
excluded_paths:
  - "**/migrations/**"
"#;
        let cfg = Configuration::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.python_version, DialectVersion::new(3, 9));
        assert_eq!(cfg.encoding, "utf-8");
        assert_eq!(cfg.functions_to_analyze, vec!["predict", "train"]);
        assert_eq!(cfg.ignore, vec!["helper"]);
        assert_eq!(cfg.keywords.len(), 2);
        assert_eq!(cfg.keywords[1].version, DialectVersion::new(3, 12));
        assert!(cfg.validate().is_ok());

        let resolved = cfg.resolve();
        assert_eq!(resolved.functions_to_analyze, vec!["predict", "train"]);
        assert_eq!(resolved.keywords, cfg.keywords);
    }

    #[test]
    fn test_empty_configuration_uses_defaults() {
        let cfg = Configuration::from_yaml_str("").unwrap();
        assert_eq!(cfg, Configuration::default());
        assert_eq!(cfg.keywords, default_keyword_table().to_vec());
    }

    #[test]
    fn test_default_template_parses() {
        let cfg = Configuration::from_yaml_str(DEFAULT_CONFIGURATION_YAML).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.python_version, DialectVersion::new(3, 8));
    }

    #[test]
    fn test_invalid_version_in_yaml() {
        let yaml = "python_version: \"three\"\n";
        assert!(Configuration::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_validate_encoding() {
        let cfg = Configuration {
            encoding: "no-such-codec".to_string(),
            ..Configuration::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnsupportedEncoding("no-such-codec".to_string()))
        );
        assert!(cfg.decode(b"x = 1").is_err());

        let utf8 = Configuration {
            encoding: "UTF8".to_string(),
            ..Configuration::default()
        };
        assert!(utf8.validate().is_ok());
    }

    #[test]
    fn test_decode_latin1() {
        let cfg = Configuration {
            encoding: "latin-1".to_string(),
            ..Configuration::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(
            cfg.decode(b"# caf\xe9\ndef f(): pass\n").unwrap(),
            "# caf\u{e9}\ndef f(): pass\n"
        );
    }

    #[test]
    fn test_decode_strips_bom() {
        let cfg = Configuration::default();
        assert_eq!(cfg.decode(b"\xEF\xBB\xBFimport os").unwrap(), "import os");
        assert!(cfg.decode(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_excluded_paths() {
        let cfg = Configuration {
            excluded_paths: vec!["**/build/**".to_string()],
            ..Configuration::default()
        };
        assert!(cfg.is_path_excluded(Path::new("/repo/build/gen.py")));
        assert!(!cfg.is_path_excluded(Path::new("/repo/src/app.py")));
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list("a,b , ,c"), vec!["a", "b", "c"]);
        assert!(parse_name_list("").is_empty());
    }
}
