//! Extraction of GAPIC settings from googleapis `BUILD.bazel` files.
//!
//! This is not a Starlark parser. It finds the language's GAPIC rule call
//! (`py_gapic_library(...)` or `go_gapic_library(...)`), cuts out the
//! balanced parenthesised argument list and reads individual attributes with
//! regular expressions. A file without the rule describes a proto-only API.

use crate::config::Language;
use crate::error::Result;
use regex::Regex;

/// GAPIC settings read from one `BUILD.bazel` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildLibrary {
    pub transport: Option<String>,
    pub opt_args: Vec<String>,
    pub grpc_service_config: Option<String>,
    pub rest_numeric_enums: Option<bool>,
    /// No GAPIC rule was found.
    pub is_proto_only: bool,
    /// Go `importpath`.
    pub import_path: Option<String>,
    /// Go `metadata`.
    pub metadata: bool,
    pub release_level: Option<String>,
}

/// Name of the GAPIC rule for `language`, if it uses googleapis BUILD files.
pub fn gapic_rule(language: Language) -> Option<&'static str> {
    match language {
        Language::Python => Some("py_gapic_library"),
        Language::Go => Some("go_gapic_library"),
        Language::Rust => None,
    }
}

/// Parses the GAPIC rule for `language` out of `content`.
pub fn parse_build_file(content: &str, language: Language) -> Result<BuildLibrary> {
    let Some(rule) = gapic_rule(language) else {
        return Ok(BuildLibrary::default());
    };
    let Some(section) = rule_section(content, rule) else {
        return Ok(BuildLibrary {
            is_proto_only: true,
            ..Default::default()
        });
    };

    Ok(BuildLibrary {
        transport: string_attr(section, "transport")?,
        opt_args: list_attr(section, "opt_args")?,
        grpc_service_config: string_attr(section, "grpc_service_config")?,
        rest_numeric_enums: bool_attr(section, "rest_numeric_enums")?,
        is_proto_only: false,
        import_path: string_attr(section, "importpath")?,
        metadata: bool_attr(section, "metadata")?.unwrap_or(false),
        release_level: string_attr(section, "release_level")?,
    })
}

/// The `rule(...)` call including its parentheses.
fn rule_section<'a>(content: &'a str, rule: &str) -> Option<&'a str> {
    let needle = format!("{}(", rule);
    let start = content.find(&needle)?;
    let text = &content[start..];
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    Some(text)
}

fn string_attr(section: &str, key: &str) -> Result<Option<String>> {
    let re = Regex::new(&format!(r#"\b{}\s*=\s*"([^"]*)""#, regex::escape(key)))?;
    Ok(re
        .captures(section)
        .map(|c| c[1].to_string())
        .filter(|v| !v.is_empty()))
}

fn bool_attr(section: &str, key: &str) -> Result<Option<bool>> {
    let re = Regex::new(&format!(r"\b{}\s*=\s*(True|False)", regex::escape(key)))?;
    Ok(re.captures(section).map(|c| &c[1] == "True"))
}

fn list_attr(section: &str, key: &str) -> Result<Vec<String>> {
    let re = Regex::new(&format!(r"(?s)\b{}\s*=\s*\[(.*?)\]", regex::escape(key)))?;
    let Some(caps) = re.captures(section) else {
        return Ok(Vec::new());
    };
    let item = Regex::new(r#""([^"]*)""#)?;
    Ok(item
        .captures_iter(&caps[1])
        .map(|c| c[1].to_string())
        .filter(|v| !v.is_empty())
        .collect())
}
