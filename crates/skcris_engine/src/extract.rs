use scrape_logging::scrape_debug;
use scraper::{ElementRef, Html, Selector};
use skcris_core::{
    lowercase, parse_award_amount, parse_certificate, split_duration, split_emails,
    split_field_of_science, split_keywords, ResourceType,
};
use url::Url;

use crate::record::{DetailFields, DetailRecord, OrganisationDetail, ProjectDetail, ResearcherDetail};

/// One `label | value` row of a detail table, whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: String,
    pub value: Option<String>,
}

pub trait RecordExtractor: Send + Sync {
    fn extract(&self, resource_type: ResourceType, url: &str, html: &str) -> DetailRecord;
}

/// Reads the `.detail` table every registry detail page renders.
#[derive(Debug, Default)]
pub struct DetailTableExtractor;

impl RecordExtractor for DetailTableExtractor {
    fn extract(&self, resource_type: ResourceType, url: &str, html: &str) -> DetailRecord {
        scrape_debug!("Extracting details from {} page. URL {}", resource_type, url);
        let rows = table_rows(html);
        scrape_debug!("Found {} rows. URL {}", rows.len(), url);

        let fields = match resource_type {
            ResourceType::Organisation => DetailFields::Organisation(organisation_fields(rows)),
            ResourceType::Researcher => DetailFields::Researcher(researcher_fields(rows)),
            ResourceType::Project => DetailFields::Project(project_fields(rows)),
        };
        DetailRecord {
            guid: guid_from_url(url),
            url: url.to_string(),
            fields,
            linked: None,
        }
    }
}

/// Data rows of the detail table. The heading row and the trailing
/// related-resources row are dropped, as are rows without text.
pub fn table_rows(html: &str) -> Vec<TableRow> {
    let document = Html::parse_document(html);
    // html5ever inserts the implicit tbody, hand-written fixtures may not have one.
    let Ok(row_sel) = Selector::parse(".detail > tr, .detail > tbody > tr") else {
        return Vec::new();
    };

    let rows: Vec<ElementRef> = document
        .select(&row_sel)
        .filter(|row| !collapse_text(*row).is_empty())
        .collect();
    if rows.len() < 2 {
        return Vec::new();
    }

    rows[1..rows.len() - 1]
        .iter()
        .filter_map(|row| {
            let mut cells = row
                .children()
                .filter_map(ElementRef::wrap)
                .map(collapse_text);
            let label = cells.next().filter(|label| !label.is_empty())?;
            let value = cells.next();
            Some(TableRow { label, value })
        })
        .collect()
}

fn collapse_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn guid_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "guid")
        .map(|(_, value)| value.into_owned())
}

fn organisation_fields(rows: Vec<TableRow>) -> OrganisationDetail {
    let mut detail = OrganisationDetail::default();
    for TableRow { label, value } in rows {
        let text = value.as_deref();
        match label.as_str() {
            "Názov" => detail.name = value,
            "Akronym" => detail.acronym = value,
            "IČO" => detail.ico = value,
            // Addresses come from the linked-resource endpoint.
            "Adresa" => {}
            "Zameranie" => detail.description = value,
            "Rezort" => detail.gov_dept = lowercase(text),
            "SK NACE" => detail.sk_nace = lowercase(text),
            "Forma hospodárenia" => detail.financing_type = lowercase(text),
            "Sektor" => detail.org_type = lowercase(text),
            "Prevažujúca činnosť" => detail.activity_main = lowercase(text),
            "Odbor vedy a techniky" => detail.activity_spec = lowercase(text),
            "Certifikát spôs. vykonávať VaV č." => detail.certificate_text = value,
            "E-mail" => detail.email = split_emails(text),
            "Telefón" => detail.phone = value,
            "www" => detail.website = lowercase(text),
            _ => {
                detail.extra.insert(label, value);
            }
        }
    }
    detail.certificate = parse_certificate(detail.certificate_text.as_deref());
    detail.field_of_science = split_field_of_science(detail.activity_spec.as_deref());
    detail
}

fn researcher_fields(rows: Vec<TableRow>) -> ResearcherDetail {
    let mut detail = ResearcherDetail::default();
    for TableRow { label, value } in rows {
        let text = value.as_deref();
        match label.as_str() {
            "Meno a priezvisko" => detail.full_name = value,
            "Zdroj dát" => detail.datasource = lowercase(text),
            "Odbor VaV" => detail.industry = lowercase(text),
            "Sektor VaV" => detail.org_type = lowercase(text),
            "Kľúčové slová" => detail.keywords = split_keywords(text),
            "Anotácia" => detail.annotation = lowercase(text),
            "www" => detail.website = lowercase(text),
            "e-mail" => detail.email = split_emails(text),
            "Chcete upraviť Vaše údaje ?" => {}
            _ => {
                detail.extra.insert(label, value);
            }
        }
    }
    detail
}

fn project_fields(rows: Vec<TableRow>) -> ProjectDetail {
    let mut detail = ProjectDetail::default();
    for TableRow { label, value } in rows {
        let text = value.as_deref();
        match label.as_str() {
            "Názov projektu" => detail.name = value,
            "Kód projektu" => detail.project_code = value,
            "Abstrakt" => detail.summary = value,
            "Kľúčové slová" => detail.keywords = split_keywords(text),
            "Názov výzvy" => detail.grant_call_name = value,
            "Pridelená suma" => detail.award_amount_eur = parse_award_amount(text),
            "Odbor vedy a techniky" => detail.activity_spec = lowercase(text),
            "Charakter VaV" => detail.research_type = lowercase(text),
            "Typ programu, finanč. zdroja" => detail.programme_type = lowercase(text),
            "Trvanie" => detail.duration = value,
            _ => {
                detail.extra.insert(label, value);
            }
        }
    }
    detail.field_of_science = split_field_of_science(detail.activity_spec.as_deref());
    let (start, end) = split_duration(detail.duration.as_deref());
    detail.duration_start = start;
    detail.duration_end = end;
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_is_read_from_query() {
        let url = "https://www.skcris.sk/portal/register-organizations?p_p_lifecycle=1&guid=cfOrg_4328";
        assert_eq!(guid_from_url(url).as_deref(), Some("cfOrg_4328"));
        assert_eq!(guid_from_url("https://www.skcris.sk/portal"), None);
        assert_eq!(guid_from_url("not a url"), None);
    }

    #[test]
    fn heading_and_trailing_rows_are_dropped() {
        let html = r#"<table class="detail">
            <tr><td colspan="2">Detail</td></tr>
            <tr><td></td><td> </td></tr>
            <tr><td>Názov</td><td>  Ústav
                 informatiky </td></tr>
            <tr><td>Súvisiace</td><td>...</td></tr>
        </table>"#;
        let rows = table_rows(html);
        assert_eq!(
            rows,
            vec![TableRow {
                label: "Názov".into(),
                value: Some("Ústav informatiky".into())
            }]
        );
    }

    #[test]
    fn single_row_table_has_no_data() {
        assert!(table_rows(r#"<table class="detail"><tr><td>x</td></tr></table>"#).is_empty());
        assert!(table_rows("<p>no table</p>").is_empty());
    }
}
