//! Reconciliation of raw detail-table values into typed output fields.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static CERTIFICATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<cert>.*?)\s*\(\s*(?P<start>.*?)\s*-\s*(?P<end>.*?)\s*\)")
        .expect("certificate regex")
});
static DATE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.\s]").expect("date separator regex"));
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").expect("case boundary regex"));
static EUR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*eur$").expect("eur suffix regex"));
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("leading number regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate: Option<String>,
    pub certificate_start_date: Option<String>,
    pub certificate_end_date: Option<String>,
}

/// Up to three levels of the science-and-technology taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOfScience {
    #[serde(rename = "activitySpec1")]
    pub level1: Option<String>,
    #[serde(rename = "activitySpec2")]
    pub level2: Option<String>,
    #[serde(rename = "activitySpec3")]
    pub level3: Option<String>,
}

pub fn lowercase(value: Option<&str>) -> Option<String> {
    value.map(str::to_lowercase)
}

/// Parses texts like `"2022/12986:2-D1230 ( 07.01 2022 - 06.01 2028 )"`.
///
/// Text without the parenthesised validity range is kept whole as the
/// certificate number.
pub fn parse_certificate(text: Option<&str>) -> Certificate {
    let text = text.unwrap_or_default();
    let Some(caps) = CERTIFICATE.captures(text) else {
        let trimmed = text.trim();
        return Certificate {
            certificate: (!trimmed.is_empty() && trimmed != "-").then(|| trimmed.to_string()),
            ..Certificate::default()
        };
    };
    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
    let certificate = group("cert");
    Certificate {
        certificate: (!certificate.is_empty()).then(|| certificate.to_string()),
        certificate_start_date: format_date(group("start")),
        certificate_end_date: format_date(group("end")),
    }
}

/// Normalises `DD.MM YYYY` style dates to `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
///
/// Components are read from the right, so a missing day still leaves a
/// year and month.
fn format_date(text: &str) -> Option<String> {
    let parts: Vec<&str> = DATE_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        [] => None,
        [year] => Some((*year).to_string()),
        [month, year] => Some(format!("{year}-{month}")),
        [.., day, month, year] => Some(format!("{year}-{month}-{day}")),
    }
}

pub fn split_field_of_science(text: Option<&str>) -> FieldOfScience {
    let mut levels = text
        .unwrap_or_default()
        .split('/')
        .map(|level| level.trim().to_lowercase())
        .map(|level| (!level.is_empty()).then_some(level));
    FieldOfScience {
        level1: levels.next().flatten(),
        level2: levels.next().flatten(),
        level3: levels.next().flatten(),
    }
}

/// Splits a keyword cell into lowercase tokens.
///
/// Cells without commas are sometimes run together (`"Cloud computingBiotech"`);
/// those are split where a lowercase letter meets an uppercase one.
pub fn split_keywords(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    if text.trim() == "-" {
        return Vec::new();
    }
    let separated = if text.contains(',') {
        text.to_string()
    } else {
        CASE_BOUNDARY.replace_all(text, "$1, $2").into_owned()
    };
    separated
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn split_emails(text: Option<&str>) -> Vec<String> {
    text.unwrap_or_default()
        .to_lowercase()
        .split(',')
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect()
}

/// Reads the leading number of an amount like `"125000.5 EUR"`.
pub fn parse_award_amount(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    let stripped = EUR_SUFFIX.replace(text, "");
    let number = LEADING_NUMBER.find(stripped.trim_start())?;
    number.as_str().parse().ok()
}

/// Splits a project duration `"01.01.2018 - 31.12.2020"` into start and end.
pub fn split_duration(text: Option<&str>) -> (Option<String>, Option<String>) {
    let mut parts = text
        .unwrap_or_default()
        .split('-')
        .map(str::trim)
        .map(|part| (!part.is_empty()).then(|| part.to_string()));
    (parts.next().flatten(), parts.next().flatten())
}
