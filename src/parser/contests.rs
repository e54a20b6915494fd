//! AtCoder contest listing parser
//!
//! Extracts the raw cells of the "currently running" and "upcoming" tables.
//! Time and duration strings are left untouched here; the AtCoder source
//! normalizes them.

use scraper::{ElementRef, Html};
use url::Url;

use crate::parser::selectors::{ContestTable, CELL, LINK};
use crate::utils::clean_title;
use crate::utils::error::ParseError;

/// One row of an AtCoder contest table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestRow {
    pub table: ContestTable,
    /// Link around the start time, carrying the compact JST time in `iso=`
    pub start_href: String,
    /// Contest title with decorative glyphs removed (may be empty)
    pub name: String,
    /// Site-relative contest link, e.g. `/contests/abc400`
    pub link: Option<String>,
    /// Duration cell text, `H:MM` or `HH:MM`
    pub duration: String,
}

impl ContestRow {
    /// Compact start time encoded in the time link's query string
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingQueryParam` when the link carries no value
    pub fn start_param(&self) -> Result<String, ParseError> {
        query_value(&self.start_href, "iso")
    }
}

/// Parse the active and upcoming tables, active rows first
///
/// Rows without a start-time link are skipped.
pub fn parse_contest_rows(html: &str) -> Vec<ContestRow> {
    let document = Html::parse_document(html);

    [ContestTable::Active, ContestTable::Upcoming]
        .into_iter()
        .flat_map(|table| {
            document
                .select(table.rows())
                .filter_map(move |row| parse_row(table, row))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn parse_row(table: ContestTable, row: ElementRef<'_>) -> Option<ContestRow> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();

    let start_href = cells
        .first()?
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))?
        .to_string();

    let name_cell = cells.get(1);
    let name = name_cell
        .map(|cell| clean_title(&cell.text().collect::<String>()))
        .unwrap_or_default();
    let link = name_cell
        .and_then(|cell| cell.select(&LINK).find_map(contest_link))
        .map(str::to_string);

    let duration = cells
        .get(2)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    Some(ContestRow {
        table,
        start_href,
        name,
        link,
        duration,
    })
}

/// First link in the name cell that points at a contest page
fn contest_link<'a>(a: ElementRef<'a>) -> Option<&'a str> {
    a.value()
        .attr("href")
        .filter(|href| href.starts_with("/contests/") || href.contains("://"))
}

/// Read a query parameter from an absolute or site-relative link
///
/// Falls back to the first `key=value` pair's value when `param` is absent,
/// matching links that only carry the time.
pub fn query_value(href: &str, param: &str) -> Result<String, ParseError> {
    let missing = || ParseError::MissingQueryParam {
        param: param.to_string(),
        href: href.to_string(),
    };

    let url = Url::parse(href)
        .or_else(|_| Url::parse("https://atcoder.jp/").and_then(|base| base.join(href)))
        .map_err(|_| missing())?;

    let mut pairs = url.query_pairs();
    let value = pairs
        .clone()
        .find(|(k, _)| k == param)
        .or_else(|| pairs.next())
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty());

    value.ok_or_else(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = r#"
        <div id="contest-table-upcoming"><table><tbody>
          <tr>
            <td class="text-center"><a href="http://www.timeanddate.com/worldclock/fixedtime.html?iso=20240106T2100&p1=248" target="blank"><time class="fixtime fixtime-full">2024-01-06 21:00:00+0900</time></a></td>
            <td><span aria-hidden="true" data-toggle="tooltip" title="Algorithm">Ⓐ</span> <span class="user-blue">◉</span>
              <a href="/contests/abc335">AtCoder Beginner Contest 335 (Sponsored by Mynavi)</a></td>
            <td class="text-center">01:40</td>
            <td class="text-center"> - 1999</td>
          </tr>
          <tr>
            <td>no link here</td>
            <td><a href="/contests/skipme">Skipped</a></td>
            <td>01:00</td>
          </tr>
        </tbody></table></div>"#;

    #[test]
    fn test_parse_upcoming_row() {
        let rows = parse_contest_rows(ROW);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.table, ContestTable::Upcoming);
        assert_eq!(row.name, "AtCoder Beginner Contest 335 (Sponsored by Mynavi)");
        assert_eq!(row.link.as_deref(), Some("/contests/abc335"));
        assert_eq!(row.duration, "01:40");
        assert_eq!(row.start_param().unwrap(), "20240106T2100");
    }

    #[test]
    fn test_query_value_relative_and_fallback() {
        assert_eq!(query_value("/time?iso=202401011200", "iso").unwrap(), "202401011200");
        assert_eq!(query_value("/time?t=202401011200&x=1", "iso").unwrap(), "202401011200");
        assert!(query_value("/time", "iso").is_err());
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_contest_rows("<html><body>maintenance</body></html>").is_empty());
    }
}
