//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Front-matter delimiter line
const DELIMITER: &str = "---";

/// Why a metadata block could not be read
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter opened with `---` but never closed")]
    Unterminated,

    #[error("invalid YAML in front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Any YAML scalar, kept as its textual form
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

/// Accept `title: 1984` as well as `title: "1984"`
fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Custom deserializer that handles a single scalar, a list of scalars, or null
fn scalar_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct ScalarOrSeq;

    impl<'de> Visitor<'de> for ScalarOrSeq {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<Scalar>()? {
                vec.push(item.into_string());
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(ScalarOrSeq)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "optional_scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub date: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub author: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub description: Option<String>,
    #[serde(deserialize_with = "scalar_or_seq")]
    pub tags: Vec<String>,
}

impl FrontMatter {
    /// Split a raw file into its metadata block and body.
    ///
    /// A file without an opening `---` line has no metadata; the whole file
    /// is the body. The body is returned verbatim, starting right after the
    /// closing delimiter line.
    pub fn parse(raw: &str) -> Result<(Self, &str), FrontMatterError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let Some(rest) = strip_delimiter_line(raw) else {
            return Ok((FrontMatter::default(), raw));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == DELIMITER {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];

                if is_blank_yaml(yaml) {
                    return Ok((FrontMatter::default(), body));
                }

                let fm: FrontMatter = serde_yaml::from_str(yaml)?;
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }

    /// Title, unless missing or blank
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Strip the opening `---` line, if the file starts with one
fn strip_delimiter_line(raw: &str) -> Option<&str> {
    let first_end = raw.find('\n').map(|i| i + 1).unwrap_or(raw.len());
    if raw[..first_end].trim_end() == DELIMITER {
        Some(&raw[first_end..])
    } else {
        None
    }
}

/// Only blank lines and comments
fn is_blank_yaml(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}

/// Parse a date string in the common ISO-8601 shapes.
///
/// Values without an offset are read as UTC so sorting does not depend on
/// the machine's timezone.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
author: Ada
description: First post
tags:
  - rust
  - mdx
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.author.as_deref(), Some("Ada"));
        assert_eq!(fm.description.as_deref(), Some("First post"));
        assert_eq!(fm.tags, vec!["rust", "mdx"]);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let (fm, body) = FrontMatter::parse("---\ntitle: Only\n---\nbody").unwrap();
        assert_eq!(fm.title(), Some("Only"));
        assert_eq!(fm.date, None);
        assert!(fm.tags.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_no_frontmatter_is_all_body() {
        let content = "# Just markdown\n\nNo metadata here.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::parse("---\n---\nText").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "Text");

        let (fm, _) = FrontMatter::parse("---\n# nothing yet\n---\n").unwrap();
        assert_eq!(fm, FrontMatter::default());
    }

    #[test]
    fn test_unterminated_block_is_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nNo closing line").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));

        let err = FrontMatter::parse("---\njust a sentence\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_single_string_and_scalar_tags() {
        let (fm, _) = FrontMatter::parse("---\ntags: notes\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["notes"]);

        let (fm, _) = FrontMatter::parse("---\ntags: [rust, 2024]\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["rust", "2024"]);

        let (fm, _) = FrontMatter::parse("---\ntags:\n---\n").unwrap();
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_numeric_title() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 1984\n---\n").unwrap();
        assert_eq!(fm.title(), Some("1984"));
    }

    #[test]
    fn test_blank_title_is_missing() {
        let (fm, _) = FrontMatter::parse("---\ntitle: \"  \"\n---\n").unwrap();
        assert_eq!(fm.title(), None);
    }

    #[test]
    fn test_bom_and_crlf() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_horizontal_rule_later_is_not_frontmatter() {
        let content = "Intro\n---\nMore";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_date() {
        let dt = parse_date_string("2024-01-15").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 00:00");

        let dt = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "08:30");

        let dt = parse_date_string("2024-01-15 10:30").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "10:30");

        assert!(parse_date_string("last tuesday").is_none());
    }
}
