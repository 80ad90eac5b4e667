use crate::types::{CreatecError, CreatecResult, FileVersion};
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key/value metadata decoded from a Createc header block.
///
/// Keys are lower-cased and trimmed; a header line `A / B = v` is stored
/// under both `a` and `b`. Unknown keys are kept as-is so callers can look
/// up anything the instrument wrote.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataTable {
    file_version: String,
    entries: HashMap<String, String>,
    line_count: usize,
}

impl MetadataTable {
    /// Decode a header block. Never fails: every byte maps to a character
    /// and non-conforming lines are skipped.
    pub fn decode(header: &[u8]) -> Self {
        let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(header);
        if had_errors {
            log::debug!("Header contained undecodable bytes, replaced");
        }
        Self::from_text(&text)
    }

    /// Build the table from already decoded header text
    pub fn from_text(text: &str) -> Self {
        let file_version = text
            .split('\n')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>();

        let mut entries = HashMap::new();
        let mut line_count = 0;
        for line in text.split('\n') {
            line_count += 1;
            Self::insert_line(&mut entries, line);
        }

        Self {
            file_version,
            entries,
            line_count,
        }
    }

    fn insert_line(entries: &mut HashMap<String, String>, line: &str) {
        if line.matches('=').count() != 1 {
            return;
        }
        let Some((left, right)) = line.split_once('=') else {
            return;
        };

        let value = right.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        for alias in left.split('/') {
            let key = alias.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            entries.insert(key, value.to_string());
        }
    }

    /// Version token, i.e. the first header line with only alphanumerics kept
    pub fn file_version(&self) -> &str {
        &self.file_version
    }

    /// The version token as a known layout
    pub fn version(&self) -> CreatecResult<FileVersion> {
        self.file_version.parse()
    }

    /// Number of text lines in the header block
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Raw value for a key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.trim().to_lowercase())
            .map(String::as_str)
    }

    /// First alias present, as `(alias, raw value)`
    pub fn get_any<'a>(&'a self, aliases: &[&'a str]) -> Option<(&'a str, &'a str)> {
        aliases
            .iter()
            .find_map(|alias| self.get(alias).map(|value| (*alias, value)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Required key parsed as float
    pub fn get_f64(&self, key: &str) -> CreatecResult<f64> {
        let raw = self
            .get(key)
            .ok_or_else(|| CreatecError::MissingField(key.to_string()))?;
        parse_value(key, raw)
    }

    /// Required key parsed as integer
    pub fn get_i64(&self, key: &str) -> CreatecResult<i64> {
        let raw = self
            .get(key)
            .ok_or_else(|| CreatecError::MissingField(key.to_string()))?;
        parse_value(key, raw)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a trimmed raw header value, reporting the key on failure
pub(crate) fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> CreatecResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CreatecError::MalformedField {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
