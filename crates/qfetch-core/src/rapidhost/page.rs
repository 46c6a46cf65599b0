//! Account page scraping: HTML -> [`RawSnapshot`].

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::inventory::{RawFileRow, RawGroup, RawSnapshot};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Resolves a link against the page URL; unresolvable links are kept as-is.
fn absolute(base: &Url, href: &str) -> String {
    let href = href.trim();
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Third row, second cell of the login info box holds the available transfer.
fn quota_text(doc: &Html) -> Result<Option<String>> {
    let rows = selector("div.info.login-info-box table tr")?;
    let small = selector("small")?;
    Ok(doc
        .select(&rows)
        .nth(2)
        .and_then(|tr| child_elements(tr).nth(1))
        .and_then(|td| td.select(&small).next())
        .map(text_of))
}

fn file_row(tr: ElementRef<'_>, base: &Url) -> RawFileRow {
    let cells: Vec<ElementRef<'_>> = child_elements(tr).collect();
    let url = cells
        .first()
        .and_then(|cell| child_elements(*cell).next())
        .and_then(|link| link.value().attr("href"))
        .map(|href| absolute(base, href));
    let size_text = cells.get(3).map(|cell| text_of(*cell));
    RawFileRow { url, size_text }
}

/// Extracts quota and file groups from the account page.
///
/// Each `div.file-list` is one group: the identifier is the `value` of the
/// checkbox in its header, the name is the header button's text, and every
/// body row of `table.files-list` is one file (link in the first cell, size
/// text in the fourth).
pub fn parse_account_page(html: &str, base: &Url) -> Result<RawSnapshot> {
    let doc = Html::parse_document(html);
    let file_lists = selector("div.file-list")?;
    let id_input = selector("div > input")?;
    let name_button = selector("div > button")?;
    let body = selector("table.files-list > tbody")?;

    let groups = doc
        .select(&file_lists)
        .map(|list| {
            let id = list
                .select(&id_input)
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(|v| v.trim().to_string());
            let name = list.select(&name_button).next().map(text_of);
            let rows = list
                .select(&body)
                .next()
                .map(|tbody| child_elements(tbody).map(|tr| file_row(tr, base)).collect())
                .unwrap_or_default();
            RawGroup { id, name, rows }
        })
        .collect();

    Ok(RawSnapshot {
        quota_text: quota_text(&doc)?,
        groups,
    })
}
