//! Output records: detail fields plus linked-resource stubs.
use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use skcris_core::{Certificate, FieldOfScience};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
}

/// Reference to another registry entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedStub {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationStub {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub idpubl: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Organisation address. The server sends `""` for missing parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressStub {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub adr_line1: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub adr_line2: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub adr_line3: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub adr_line4: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub adr_line5: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub post_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub city_town: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cf_uri: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub township: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub address_type: Option<String>,
}

/// `java.util.Date` as the portal serialises it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyDate {
    pub date: i64,
    pub day: i64,
    pub hours: i64,
    pub minutes: i64,
    pub month: i64,
    pub nanos: i64,
    pub seconds: i64,
    pub time: i64,
    pub timezone_offset: i64,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStub {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<LegacyDate>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinkedEntry {
    Reference(LinkedStub),
    Address(AddressStub),
    Citation(CitationStub),
    Document(DocumentStub),
}

impl LinkedEntry {
    pub fn url(&self) -> Option<&str> {
        match self {
            LinkedEntry::Reference(stub) => stub.url.as_deref(),
            LinkedEntry::Citation(stub) => stub.url.as_deref(),
            LinkedEntry::Document(stub) => stub.url.as_deref(),
            LinkedEntry::Address(_) => None,
        }
    }
}

/// Relation key -> entries, in declaration order.
///
/// Serialises as a flat map with a derived `<key>Count` after every list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedResourceSet {
    relations: Vec<(String, Vec<LinkedEntry>)>,
}

impl LinkedResourceSet {
    pub fn insert(&mut self, key: impl Into<String>, entries: Vec<LinkedEntry>) {
        let key = key.into();
        match self.relations.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = entries,
            None => self.relations.push((key, entries)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[LinkedEntry]> {
        self.relations
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn count(&self, key: &str) -> Option<usize> {
        self.get(key).map(<[LinkedEntry]>::len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl Serialize for LinkedResourceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.relations.len() * 2))?;
        for (key, entries) in &self.relations {
            map.serialize_entry(key, entries)?;
            map.serialize_entry(&format!("{key}Count"), &entries.len())?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationDetail {
    pub name: Option<String>,
    pub acronym: Option<String>,
    #[serde(rename = "ičo")]
    pub ico: Option<String>,
    pub description: Option<String>,
    pub gov_dept: Option<String>,
    pub sk_nace: Option<String>,
    pub financing_type: Option<String>,
    pub org_type: Option<String>,
    pub activity_main: Option<String>,
    pub activity_spec: Option<String>,
    #[serde(flatten)]
    pub field_of_science: FieldOfScience,
    pub certificate_text: Option<String>,
    #[serde(flatten)]
    pub certificate: Certificate,
    pub email: Vec<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Table rows with labels the mapping does not know, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherDetail {
    pub full_name: Option<String>,
    pub datasource: Option<String>,
    pub industry: Option<String>,
    pub org_type: Option<String>,
    pub keywords: Vec<String>,
    pub annotation: Option<String>,
    pub website: Option<String>,
    pub email: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub name: Option<String>,
    pub project_code: Option<String>,
    #[serde(rename = "abstract")]
    pub summary: Option<String>,
    pub keywords: Vec<String>,
    pub grant_call_name: Option<String>,
    pub award_amount_eur: Option<f64>,
    pub activity_spec: Option<String>,
    #[serde(flatten)]
    pub field_of_science: FieldOfScience,
    pub research_type: Option<String>,
    pub programme_type: Option<String>,
    pub duration: Option<String>,
    pub duration_start: Option<String>,
    pub duration_end: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailFields {
    Organisation(OrganisationDetail),
    Researcher(ResearcherDetail),
    Project(ProjectDetail),
}

/// One scraped entity, emitted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRecord {
    pub guid: Option<String>,
    pub url: String,
    #[serde(flatten)]
    pub fields: DetailFields,
    #[serde(flatten)]
    pub linked: Option<LinkedResourceSet>,
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
