use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry entity kind. Fixed for the lifetime of a crawl task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Organisation,
    Researcher,
    Project,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Organisation,
        ResourceType::Researcher,
        ResourceType::Project,
    ];

    /// Path segment after `/register-`.
    pub fn path_id(self) -> &'static str {
        match self {
            ResourceType::Organisation => "organizations",
            ResourceType::Researcher => "researchers",
            ResourceType::Project => "projects",
        }
    }

    /// Portlet component serving search results and linked resources.
    pub fn component_id(self) -> &'static str {
        match self {
            ResourceType::Organisation => "organisationSearchResult",
            ResourceType::Researcher => "researcherSearchResult",
            ResourceType::Project => "projectSearchResult",
        }
    }

    /// Portlet component owning the search form and its reset action.
    pub fn reset_component_id(self) -> &'static str {
        match self {
            ResourceType::Organisation => "verticalOrganisationSearch",
            ResourceType::Researcher => "verticalResearcherSearch",
            ResourceType::Project => "verticalProjectSearch",
        }
    }

    pub fn detail_action(self) -> &'static str {
        match self {
            ResourceType::Project => "projectgodetail",
            ResourceType::Organisation | ResourceType::Researcher => "godetail",
        }
    }

    pub fn register_path(self) -> String {
        format!("/register-{}", self.path_id())
    }

    pub fn short_code(self) -> &'static str {
        match self {
            ResourceType::Organisation => "org",
            ResourceType::Researcher => "res",
            ResourceType::Project => "prj",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_code())
    }
}

/// User-facing dataset selector from the actor input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Researchers,
    Projects,
    Organisations,
}

impl DatasetType {
    pub fn resource_type(self) -> ResourceType {
        match self {
            DatasetType::Researchers => ResourceType::Researcher,
            DatasetType::Projects => ResourceType::Project,
            DatasetType::Organisations => ResourceType::Organisation,
        }
    }
}

/// Slovak self-governing regions as offered by the listing's region facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Bratislava,
    Trnava,
    Trencin,
    Nitra,
    Zilina,
    Banskabystrica,
    Presov,
    Kosice,
    Zahranicie,
}

impl Region {
    /// Name under which the server lists the region option.
    pub fn display_name(self) -> &'static str {
        match self {
            Region::Bratislava => "Bratislavský kraj",
            Region::Trnava => "Trnavský kraj",
            Region::Trencin => "Trenčiansky kraj",
            Region::Nitra => "Nitriansky kraj",
            Region::Zilina => "Žilinský kraj",
            Region::Banskabystrica => "Banskobystrický kraj",
            Region::Presov => "Prešovský kraj",
            Region::Kosice => "Košický kraj",
            Region::Zahranicie => "Zahraničie",
        }
    }
}

/// Which handler a crawled URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Listing(ResourceType),
    Detail(ResourceType),
}

impl Route {
    /// Detail pages carry a `godetail` action; everything else under a
    /// register path is treated as its listing.
    pub fn classify(url: &str) -> Option<Route> {
        let resource_type = ResourceType::ALL
            .into_iter()
            .find(|rt| url.contains(&rt.register_path()))?;
        if url.contains("godetail") {
            Some(Route::Detail(resource_type))
        } else {
            Some(Route::Listing(resource_type))
        }
    }

    pub fn resource_type(self) -> ResourceType {
        match self {
            Route::Listing(rt) | Route::Detail(rt) => rt,
        }
    }
}
