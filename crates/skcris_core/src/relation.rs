use crate::resource::ResourceType;

/// The one relation served by a single-shot endpoint without a count wrapper.
pub const ADDRESS_RELATION: &str = "goorgaddresses";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Innovation,
    Patent,
    Product,
    Publication,
    Citation,
}

impl OutputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Innovation => "innovation",
            OutputKind::Patent => "patent",
            OutputKind::Product => "product",
            OutputKind::Publication => "publication",
            OutputKind::Citation => "citation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfraKind {
    Service,
    Facility,
    Equipment,
}

/// Target of the canonical URL attached to a linked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLink {
    Organisation,
    Researcher,
    Project,
    Output(OutputKind),
    Infra(InfraKind),
    Document,
    /// Entries without a page of their own (addresses).
    None,
}

/// JSON shape of the entries a relation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubShape {
    Reference,
    Address,
    Citation,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec {
    pub id: &'static str,
    /// Output key the relation is merged under.
    pub key: &'static str,
    pub shape: StubShape,
    pub link: EntityLink,
}

impl RelationSpec {
    pub fn paginated(&self) -> bool {
        self.id != ADDRESS_RELATION
    }
}

const fn spec(id: &'static str, key: &'static str, shape: StubShape, link: EntityLink) -> RelationSpec {
    RelationSpec { id, key, shape, link }
}

use EntityLink as L;
use StubShape as S;

const ORGANISATION_RELATIONS: &[RelationSpec] = &[
    spec(ADDRESS_RELATION, "addresses", S::Address, L::None),
    spec("goorgresearcherlist", "researchers", S::Reference, L::Researcher),
    spec("goorgprojectlist", "projects", S::Reference, L::Project),
    spec("goorgorgparentlist", "parentOrgs", S::Reference, L::Organisation),
    spec("goorgorgchildlist", "childOrgs", S::Reference, L::Organisation),
    spec("goorgproductlist", "productOutputs", S::Reference, L::Output(OutputKind::Product)),
    spec("goorgpatentlist", "patentOutputs", S::Reference, L::Output(OutputKind::Patent)),
    spec("goorgpublicationlist", "publicationOutputs", S::Reference, L::Output(OutputKind::Publication)),
    spec("goorginnovationlist", "innovationOutputs", S::Reference, L::Output(OutputKind::Innovation)),
    spec("goorgequipmentlist", "equipmentInfra", S::Reference, L::Infra(InfraKind::Equipment)),
    spec("goorgfacilitylist", "facilityInfra", S::Reference, L::Infra(InfraKind::Facility)),
    spec("goorgservicelist", "serviceInfra", S::Reference, L::Infra(InfraKind::Service)),
];

const RESEARCHER_RELATIONS: &[RelationSpec] = &[
    spec("goresorganisationlist", "organisations", S::Reference, L::Organisation),
    spec("goresprojectlist", "projects", S::Reference, L::Project),
    spec("goresproductlist", "productOutputs", S::Reference, L::Output(OutputKind::Product)),
    spec("gorespatentlist", "patentOutputs", S::Reference, L::Output(OutputKind::Patent)),
    spec("gorespublicationlist", "publicationOutputs", S::Reference, L::Output(OutputKind::Publication)),
    spec("goresinnovationlist", "innovationOutputs", S::Reference, L::Output(OutputKind::Innovation)),
    spec("gorescitationlist", "citationOutputs", S::Citation, L::Output(OutputKind::Citation)),
];

const PROJECT_RELATIONS: &[RelationSpec] = &[
    spec("goprjresearcherlist", "researchers", S::Reference, L::Researcher),
    spec("goprjorganisationlist", "organisations", S::Reference, L::Organisation),
    spec("goprjproductlist", "productOutputs", S::Reference, L::Output(OutputKind::Product)),
    spec("goprjpatentlist", "patentOutputs", S::Reference, L::Output(OutputKind::Patent)),
    spec("goprjpublicationlist", "publicationOutputs", S::Reference, L::Output(OutputKind::Publication)),
    spec("goprjinnovationlist", "innovationOutputs", S::Reference, L::Output(OutputKind::Innovation)),
    spec("goprjequipmentlist", "equipmentInfra", S::Reference, L::Infra(InfraKind::Equipment)),
    spec("goprjfacilitylist", "facilityInfra", S::Reference, L::Infra(InfraKind::Facility)),
    spec("goprjservicelist", "serviceInfra", S::Reference, L::Infra(InfraKind::Service)),
    spec("goprjdocumentlist", "documents", S::Document, L::Document),
];

const ORGANISATION_IDS: &[&str] = &[
    ADDRESS_RELATION,
    "goorgresearcherlist",
    "goorgprojectlist",
    "goorgorgparentlist",
    "goorgorgchildlist",
    "goorgproductlist",
    "goorgpatentlist",
    "goorgpublicationlist",
    "goorginnovationlist",
    "goorgequipmentlist",
    "goorgfacilitylist",
    "goorgservicelist",
];

const RESEARCHER_IDS: &[&str] = &[
    "goresorganisationlist",
    "goresprojectlist",
    "goresproductlist",
    "gorespatentlist",
    "gorespublicationlist",
    "goresinnovationlist",
    "gorescitationlist",
];

const PROJECT_IDS: &[&str] = &[
    "goprjresearcherlist",
    "goprjorganisationlist",
    "goprjproductlist",
    "goprjpatentlist",
    "goprjpublicationlist",
    "goprjinnovationlist",
    "goprjequipmentlist",
    "goprjfacilitylist",
    "goprjservicelist",
    "goprjdocumentlist",
];

/// Relation ids fetched for every detail record of the given type.
pub fn declared_relations(resource_type: ResourceType) -> &'static [&'static str] {
    match resource_type {
        ResourceType::Organisation => ORGANISATION_IDS,
        ResourceType::Researcher => RESEARCHER_IDS,
        ResourceType::Project => PROJECT_IDS,
    }
}

pub fn relation_spec(resource_type: ResourceType, id: &str) -> Option<RelationSpec> {
    let table = match resource_type {
        ResourceType::Organisation => ORGANISATION_RELATIONS,
        ResourceType::Researcher => RESEARCHER_RELATIONS,
        ResourceType::Project => PROJECT_RELATIONS,
    };
    table.iter().find(|spec| spec.id == id).copied()
}
