use pretty_assertions::assert_eq;
use skcris_core::ResourceType;
use skcris_engine::{DetailFields, DetailTableExtractor, RecordExtractor};

const ORG_URL: &str = "https://www.skcris.sk/portal/register-organizations?p_p_id=organisationSearchResult_WAR_cvtiappweb&p_p_lifecycle=1&p_p_state=normal&_organisationSearchResult_WAR_cvtiappweb_javax.portlet.action=godetail&guid=cfOrg_4328";

const ORG_PAGE: &str = r#"<html><body>
<table class="detail">
  <tr><th colspan="2">Detail organizácie</th></tr>
  <tr><td>Názov</td><td>Ústav informatiky SAV</td></tr>
  <tr><td>Akronym</td><td>UI SAV</td></tr>
  <tr><td>IČO</td><td>00166995</td></tr>
  <tr><td>Adresa</td><td>Dúbravská cesta 9, Bratislava</td></tr>
  <tr><td>Rezort</td><td>Slovenská Akadémia Vied</td></tr>
  <tr><td>Odbor vedy a techniky</td><td>Prírodné vedy / Informatické vedy / Informatika</td></tr>
  <tr><td>Certifikát spôs. vykonávať VaV č.</td><td>2022/12986:2-D1230 ( 07.01 2022 - 06.01 2028 )</td></tr>
  <tr><td>E-mail</td><td>Info@Savba.sk, sekretariat@savba.sk</td></tr>
  <tr><td>www</td><td>WWW.UI.SAVBA.SK</td></tr>
  <tr><td>Nový riadok</td><td>niečo</td></tr>
  <tr><td></td><td></td></tr>
  <tr><td colspan="2">Súvisiace projekty</td></tr>
</table>
</body></html>"#;

#[test]
fn organisation_table_maps_to_typed_fields() {
    let record = DetailTableExtractor.extract(ResourceType::Organisation, ORG_URL, ORG_PAGE);
    assert_eq!(record.guid.as_deref(), Some("cfOrg_4328"));
    assert_eq!(record.url, ORG_URL);
    assert!(record.linked.is_none());

    let DetailFields::Organisation(org) = record.fields else {
        panic!("expected organisation fields");
    };
    assert_eq!(org.name.as_deref(), Some("Ústav informatiky SAV"));
    assert_eq!(org.ico.as_deref(), Some("00166995"));
    assert_eq!(org.gov_dept.as_deref(), Some("slovenská akadémia vied"));
    assert_eq!(org.website.as_deref(), Some("www.ui.savba.sk"));
    assert_eq!(org.email, vec!["info@savba.sk", "sekretariat@savba.sk"]);
    assert_eq!(org.field_of_science.level2.as_deref(), Some("informatické vedy"));
    assert_eq!(org.certificate.certificate.as_deref(), Some("2022/12986:2-D1230"));
    assert_eq!(org.certificate.certificate_start_date.as_deref(), Some("2022-01-07"));
    assert_eq!(org.certificate.certificate_end_date.as_deref(), Some("2028-01-06"));
    assert_eq!(org.extra.get("Nový riadok"), Some(&Some("niečo".to_string())));
    assert!(!org.extra.contains_key("Adresa"));
}

#[test]
fn organisation_record_serialises_with_portal_keys() {
    let record = DetailTableExtractor.extract(ResourceType::Organisation, ORG_URL, ORG_PAGE);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["ičo"], "00166995");
    assert_eq!(value["activitySpec1"], "prírodné vedy");
    assert_eq!(value["certificateStartDate"], "2022-01-07");
    assert_eq!(value["guid"], "cfOrg_4328");
}

#[test]
fn project_duration_and_amount_are_split() {
    let page = r#"<table class="detail"><tbody>
      <tr><td colspan="2">Projekt</td></tr>
      <tr><td>Názov projektu</td><td>Kvantové
          počítanie</td></tr>
      <tr><td>Kľúčové slová</td><td>Cloud computingBiotech</td></tr>
      <tr><td>Pridelená suma</td><td>125000.5 EUR</td></tr>
      <tr><td>Trvanie</td><td>01.01.2018 - 31.12.2020</td></tr>
      <tr><td>Súvisiace</td><td></td></tr>
    </tbody></table>"#;
    let url = "https://www.skcris.sk/portal/register-projects?p_p_lifecycle=1&guid=cfProj_9";
    let record = DetailTableExtractor.extract(ResourceType::Project, url, page);

    let DetailFields::Project(project) = record.fields else {
        panic!("expected project fields");
    };
    assert_eq!(project.name.as_deref(), Some("Kvantové počítanie"));
    assert_eq!(project.keywords, vec!["cloud computing", "biotech"]);
    assert_eq!(project.award_amount_eur, Some(125000.5));
    assert_eq!(project.duration_start.as_deref(), Some("01.01.2018"));
    assert_eq!(project.duration_end.as_deref(), Some("31.12.2020"));
}

#[test]
fn researcher_edit_prompt_is_dropped() {
    let page = r#"<table class="detail">
      <tr><td colspan="2">Riešiteľ</td></tr>
      <tr><td>Meno a priezvisko</td><td>Jana Nováková</td></tr>
      <tr><td>Kľúčové slová</td><td>-</td></tr>
      <tr><td>Chcete upraviť Vaše údaje ?</td><td>Kliknite sem</td></tr>
      <tr><td>Súvisiace</td><td></td></tr>
    </table>"#;
    let url = "https://www.skcris.sk/portal/register-researchers?guid=cfPers_17002";
    let record = DetailTableExtractor.extract(ResourceType::Researcher, url, page);

    let DetailFields::Researcher(researcher) = record.fields else {
        panic!("expected researcher fields");
    };
    assert_eq!(researcher.full_name.as_deref(), Some("Jana Nováková"));
    assert!(researcher.keywords.is_empty());
    assert!(researcher.extra.is_empty());
}
