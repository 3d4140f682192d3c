// src/services/parser.rs

//! Listing page parser.
//!
//! Turns raw listing markup into ordered `RawRow`s using the board's
//! layout. Selector candidates are tried in order because the same site
//! serves slightly different markup across menus and redesigns.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ListingLayout, RawRow, parse_selector};
use crate::utils::text::normalize_whitespace;

/// Compiled listing layout.
#[derive(Debug)]
pub struct ListParser {
    layout: CompiledLayout,
}

#[derive(Debug)]
enum CompiledLayout {
    Table {
        rows: Vec<(String, Selector)>,
        titles: Vec<Selector>,
        number: Option<Selector>,
    },
    Anchors {
        links: Selector,
        href_contains: String,
        limit: Option<usize>,
    },
}

impl ListParser {
    /// Compile a board's listing layout.
    pub fn new(layout: &ListingLayout) -> Result<Self> {
        let layout = match layout {
            ListingLayout::Table {
                row_selectors,
                title_selectors,
                number_selector,
            } => CompiledLayout::Table {
                rows: row_selectors
                    .iter()
                    .map(|s| Ok((s.clone(), parse_selector(s)?)))
                    .collect::<Result<_>>()?,
                titles: title_selectors
                    .iter()
                    .map(|s| parse_selector(s))
                    .collect::<Result<_>>()?,
                number: number_selector.as_deref().map(parse_selector).transpose()?,
            },
            ListingLayout::Anchors {
                href_contains,
                limit,
            } => CompiledLayout::Anchors {
                links: parse_selector("a[href]")?,
                href_contains: href_contains.clone(),
                limit: *limit,
            },
        };
        Ok(Self { layout })
    }

    /// Parse listing markup into rows in page order.
    ///
    /// Fails when the expected structure is absent, so a changed or
    /// error page never looks like an empty board.
    pub fn parse(&self, html: &str) -> Result<Vec<RawRow>> {
        let document = Html::parse_document(html);

        match &self.layout {
            CompiledLayout::Table {
                rows,
                titles,
                number,
            } => Self::parse_table(&document, rows, titles, number.as_ref()),
            CompiledLayout::Anchors {
                links,
                href_contains,
                limit,
            } => Self::parse_anchors(&document, links, href_contains, *limit),
        }
    }

    fn parse_table(
        document: &Html,
        row_sels: &[(String, Selector)],
        title_sels: &[Selector],
        number_sel: Option<&Selector>,
    ) -> Result<Vec<RawRow>> {
        let Some((matched, rows)) = row_sels.iter().find_map(|(source, sel)| {
            let rows: Vec<ElementRef> = document.select(sel).collect();
            (!rows.is_empty()).then_some((source, rows))
        }) else {
            return Err(AppError::crawl("listing", "no rows matched any row selector"));
        };

        log::debug!("{} rows matched '{}'", rows.len(), matched);

        let parsed: Vec<RawRow> = rows
            .iter()
            .enumerate()
            .filter_map(|(position, row)| {
                let title_elem = title_sels.iter().find_map(|sel| row.select(sel).next())?;
                let title = normalize_whitespace(&title_elem.text().collect::<String>());
                if title.is_empty() {
                    return None;
                }
                let href = title_elem.value().attr("href").unwrap_or("").trim().to_string();
                let ordinal = number_sel
                    .and_then(|sel| row.select(sel).next())
                    .map(|cell| normalize_whitespace(&cell.text().collect::<String>()));

                Some(RawRow {
                    position,
                    title,
                    href,
                    ordinal,
                })
            })
            .collect();

        if parsed.is_empty() {
            return Err(AppError::crawl(
                "listing",
                format!("{} rows matched '{}' but none had a title link", rows.len(), matched),
            ));
        }
        Ok(parsed)
    }

    fn parse_anchors(
        document: &Html,
        links: &Selector,
        href_contains: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RawRow>> {
        let rows: Vec<RawRow> = document
            .select(links)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                if !href.contains(href_contains) {
                    return None;
                }
                let title = normalize_whitespace(&a.text().collect::<String>());
                (!title.is_empty()).then(|| (title, href.to_string()))
            })
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(position, (title, href))| RawRow {
                position,
                title,
                href,
                ordinal: None,
            })
            .collect();

        if rows.is_empty() {
            return Err(AppError::crawl(
                "listing",
                format!("no links containing '{href_contains}'"),
            ));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
        <html><body>
        <table class="board_list">
          <thead><tr><th>번호</th><th>제목</th></tr></thead>
          <tbody>
            <tr><td class="num"><img alt="공지"></td>
                <td class="subject"><a href="view.action?btin_idx=1399999">[공지] 고정 게시물</a></td></tr>
            <tr><td class="num">1523</td>
                <td class="subject"><a href="view.action?btin_idx=1336485">  2025학년도
                   수강신청 안내 </a></td></tr>
            <tr><td class="num">1522</td>
                <td class="title"><a href="view.action?btin_idx=1336481">장학금 신청</a></td></tr>
            <tr><td class="num">1521</td><td class="subject"></td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_table_rows() {
        let parser = ListParser::new(&ListingLayout::default()).unwrap();
        let rows = parser.parse(TABLE).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_pinned());
        assert_eq!(rows[1].title, "2025학년도 수강신청 안내");
        assert_eq!(rows[1].ordinal.as_deref(), Some("1523"));
        assert_eq!(rows[2].href, "view.action?btin_idx=1336481");
        assert_eq!(rows[2].position, 2);
    }

    #[test]
    fn test_row_selector_fallback() {
        let layout = ListingLayout::Table {
            row_selectors: vec!["ul.missing li".into(), "tbody tr".into()],
            title_selectors: vec!["td.subject a".into()],
            number_selector: None,
        };
        let rows = ListParser::new(&layout).unwrap().parse(TABLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.ordinal.is_none()));
    }

    #[test]
    fn test_missing_structure_is_error() {
        let parser = ListParser::new(&ListingLayout::default()).unwrap();
        assert!(parser.parse("<html><title>점검 중</title></html>").is_err());
    }

    #[test]
    fn test_parse_anchors() {
        let html = r#"
            <a href="/menu?idx=1">학사</a>
            <a href="/bbs/stdViewBtin.action?btin_idx=10">첫 공지</a>
            <a href="/bbs/stdViewBtin.action?btin_idx=11"> </a>
            <a href="/bbs/stdViewBtin.action?btin_idx=12">둘째 공지</a>
            <a href="/bbs/stdViewBtin.action?btin_idx=13">셋째 공지</a>
        "#;
        let layout = ListingLayout::Anchors {
            href_contains: "stdViewBtin.action".into(),
            limit: Some(2),
        };
        let rows = ListParser::new(&layout).unwrap().parse(html).unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["첫 공지", "둘째 공지"]);
        assert_eq!(rows[1].position, 1);
    }
}
