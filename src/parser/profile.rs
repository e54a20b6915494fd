//! Profile page parsers for solved-problem counts

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

use crate::parser::selectors::{
    CELL, CODECHEF_PROBLEMS_SOLVED, CODECHEF_RATING_NUMBER, CODECHEF_RATING_SECTION,
    CODECHEF_SECTION_TITLE, HEADER_CELL, TABLE, TABLE_ROW,
};

/// Solved count from an AtCoder user page
///
/// Looks for the statistics table (first header "Rated Point Sum") and reads
/// `M` out of its `Submissions` row, formatted `N (M solved)`.
pub fn parse_atcoder_solved(html: &str) -> Option<u64> {
    static SOLVED_RE: OnceLock<Regex> = OnceLock::new();
    let re = SOLVED_RE
        .get_or_init(|| Regex::new(r"(\d+)\s*\((\d+)\s*solved\)").expect("Invalid regex pattern"));

    let document = Html::parse_document(html);

    document
        .select(&TABLE)
        .filter(|table| {
            table
                .select(&HEADER_CELL)
                .next()
                .map(|th| th.text().collect::<String>().contains("Rated Point Sum"))
                .unwrap_or(false)
        })
        .flat_map(|table| table.select(&TABLE_ROW))
        .filter(|row| {
            row.select(&HEADER_CELL)
                .map(|th| th.text().collect::<String>())
                .collect::<String>()
                .trim()
                == "Submissions"
        })
        .find_map(|row| {
            let value: String = row.select(&CELL).flat_map(|td| td.text()).collect();
            re.captures(&value)
                .and_then(|caps| caps.get(2))
                .and_then(|m| m.as_str().parse().ok())
        })
}

/// Solved count from a CodeChef user page
///
/// Prefers the "Fully Solved" rating section and falls back to the largest
/// number among the problems-solved header values.
pub fn parse_codechef_solved(html: &str) -> u64 {
    let document = Html::parse_document(html);

    let fully_solved = document
        .select(&CODECHEF_RATING_SECTION)
        .filter(|section| {
            section
                .select(&CODECHEF_SECTION_TITLE)
                .any(|h5| h5.text().collect::<String>().contains("Fully Solved"))
        })
        .filter_map(|section| {
            let text: String = section
                .select(&CODECHEF_RATING_NUMBER)
                .flat_map(|n| n.text())
                .collect();
            leading_integer(&text)
        })
        .last()
        .unwrap_or(0);

    if fully_solved > 0 {
        return fully_solved;
    }

    document
        .select(&CODECHEF_PROBLEMS_SOLVED)
        .filter_map(|elem| leading_integer(&elem.text().collect::<String>()))
        .max()
        .unwrap_or(0)
}

/// Integer at the start of `text`, ignoring surrounding whitespace
fn leading_integer(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atcoder_solved() {
        let html = r#"
            <table class="dl-table">
              <tr><th>Rated Point Sum</th><td>12345</td></tr>
              <tr><th>Submissions</th><td>1203 (876 solved)</td></tr>
            </table>"#;
        assert_eq!(parse_atcoder_solved(html), Some(876));
    }

    #[test]
    fn test_atcoder_ignores_other_tables() {
        let html = r#"
            <table><tr><th>Rank</th><td>1</td></tr>
              <tr><th>Submissions</th><td>5 (5 solved)</td></tr></table>"#;
        assert_eq!(parse_atcoder_solved(html), None);
    }

    #[test]
    fn test_codechef_fully_solved() {
        let html = r#"
            <section class="rating-data-section">
              <h5>Fully Solved (312)</h5>
              <div class="rating-number">312</div>
            </section>"#;
        assert_eq!(parse_codechef_solved(html), 312);
    }

    #[test]
    fn test_codechef_fallback() {
        let html = r#"
            <section class="problems-solved">
              <h3 class="header-text-value">Total Problems Solved: 40</h3>
              <span class="header-text-value">27</span>
              <span class="header-text-value">55 </span>
            </section>"#;
        assert_eq!(parse_codechef_solved(html), 55);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer(" 42 problems"), Some(42));
        assert_eq!(leading_integer("none"), None);
    }
}
