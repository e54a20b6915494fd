//! CSS selectors for the scraped pages
//!
//! This module keeps every selector for the AtCoder contest listing and the
//! AtCoder/CodeChef profile pages in one place, so layout changes upstream
//! only touch this file.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // AtCoder contest listing
    pub static ref ATCODER_ACTIVE_ROWS: Selector =
        parse_selector!("#contest-table-action tbody tr");
    pub static ref ATCODER_UPCOMING_ROWS: Selector =
        parse_selector!("#contest-table-upcoming tbody tr");
    pub static ref CELL: Selector = parse_selector!("td");
    pub static ref LINK: Selector = parse_selector!("a");

    // AtCoder profile page
    pub static ref TABLE: Selector = parse_selector!("table");
    pub static ref TABLE_ROW: Selector = parse_selector!("tr");
    pub static ref HEADER_CELL: Selector = parse_selector!("th");

    // CodeChef profile page
    pub static ref CODECHEF_RATING_SECTION: Selector =
        parse_selector!(".rating-data-section");
    pub static ref CODECHEF_SECTION_TITLE: Selector = parse_selector!("h5");
    pub static ref CODECHEF_RATING_NUMBER: Selector = parse_selector!(".rating-number");
    pub static ref CODECHEF_PROBLEMS_SOLVED: Selector =
        parse_selector!(".problems-solved .header-text-value");
}

/// Which AtCoder contest table a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestTable {
    /// `#contest-table-action`: contests currently running
    Active,
    /// `#contest-table-upcoming`: contests not yet started
    Upcoming,
}

impl ContestTable {
    /// Row selector for this table
    pub fn rows(&self) -> &'static Selector {
        match self {
            Self::Active => &ATCODER_ACTIVE_ROWS,
            Self::Upcoming => &ATCODER_UPCOMING_ROWS,
        }
    }
}
