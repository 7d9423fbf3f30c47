/// Where the listing traversal stands with respect to its filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPhase {
    /// Filters are off while names sorting before the alphabet are read.
    DrainingUnfiltered,
    FiltersActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageObservation {
    pub entries: usize,
    pub per_page: u32,
    pub has_non_alpha: bool,
}

impl PageObservation {
    pub fn is_last_page(&self) -> bool {
        self.entries < self.per_page as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    NextPage,
    /// Turn filters on and restart at page 1. `last_page` tells the driver
    /// whether the unfiltered listing still has pages in case no filter
    /// ends up engaged.
    EnableFilters { last_page: bool },
    /// The current filter state has been read to its end.
    FilterStateDone,
}

/// Decides what follows a fetched page.
pub fn next_step(phase: ListingPhase, page: PageObservation) -> (ListingPhase, PageDecision) {
    match phase {
        ListingPhase::DrainingUnfiltered if !page.has_non_alpha => (
            ListingPhase::FiltersActive,
            PageDecision::EnableFilters {
                last_page: page.is_last_page(),
            },
        ),
        ListingPhase::DrainingUnfiltered | ListingPhase::FiltersActive => {
            if page.is_last_page() {
                (phase, PageDecision::FilterStateDone)
            } else {
                (phase, PageDecision::NextPage)
            }
        }
    }
}
