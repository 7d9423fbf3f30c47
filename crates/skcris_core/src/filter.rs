use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Hard pagination ceiling of the registry listing endpoints.
pub const LISTING_RESULT_LIMIT: u64 = 10_000;

pub const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

static NON_ALPHA_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\p{L}\p{M}\p{Zs}.\-]+").expect("non-alpha prefix regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Region,
    Letter,
}

impl FilterKind {
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Region => "RegionFilter",
            FilterKind::Letter => "LetterFilter",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} has no more states")]
pub struct FilterExhausted {
    pub kind: FilterKind,
}

/// Position of a filter inside its option list.
///
/// `None` is the uninitialized state; the option list itself lives with the
/// strategy that owns the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCursor {
    kind: FilterKind,
    position: Option<usize>,
}

impl FilterCursor {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Claims the first option. Returns `false` when already initialized.
    pub fn init(&mut self) -> bool {
        if self.position.is_some() {
            return false;
        }
        self.position = Some(0);
        true
    }

    pub fn has_next(&self, len: usize) -> bool {
        match self.position {
            Some(pos) => pos + 1 < len,
            None => len > 0,
        }
    }

    pub fn advance(&mut self, len: usize) -> Result<usize, FilterExhausted> {
        if !self.has_next(len) {
            return Err(FilterExhausted { kind: self.kind });
        }
        let next = self.position.map_or(0, |pos| pos + 1);
        self.position = Some(next);
        Ok(next)
    }

    pub fn reset(&mut self) {
        self.position = None;
    }
}

/// Order in which the listing driver considers its filters.
///
/// A letter-only constraint moves the letter filter to the front so an
/// automatic region pass does not run ahead of the requested letter.
pub fn filter_order(region_pinned: bool, letter_pinned: bool) -> [FilterKind; 2] {
    if letter_pinned && !region_pinned {
        [FilterKind::Letter, FilterKind::Region]
    } else {
        [FilterKind::Region, FilterKind::Letter]
    }
}

/// Names that sort before `a` (digits, quotes, brackets) and so are never
/// reachable through the letter filter.
pub fn starts_with_non_alpha(name: &str) -> bool {
    NON_ALPHA_PREFIX.is_match(name)
}

pub fn has_non_alpha_entry<'a>(names: impl IntoIterator<Item = &'a str>) -> bool {
    names.into_iter().any(starts_with_non_alpha)
}
