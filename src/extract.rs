//! Extraction of recommendation blocks from listing and post HTML.
//!
//! Every field extractor returns an `Option` so that a malformed block only
//! loses the field that failed.

use chrono::{Datelike, NaiveDate};
use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};

use crate::model::Candidate;

const EM_DASH: char = '\u{2014}';

/// Post URLs found on the listing page, in document order.
pub fn listing_post_links(html: &str, anchor_class: &str) -> Vec<String> {
    let document = Document::from(html);
    document
        .find(Name("a").and(Class(anchor_class)))
        .filter_map(|a| a.attr("href"))
        .map(|href| href.trim().to_owned())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Publication date encoded in a post URL (`https://host/YYYY/MM/DD/slug`).
pub fn post_date_from_url(url: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = url.split('/').collect();
    let ymd = parts.get(3..6)?;
    NaiveDate::parse_from_str(&ymd.join(" "), "%Y %m %d").ok()
}

/// All recommendation blocks of a post, in document order.
pub fn extract_candidates(html: &str, post_date: Option<NaiveDate>) -> Vec<Candidate> {
    let document = Document::from(html);
    document
        .find(Name("p").and(Attr("id", ())))
        .filter(is_recommendation_block)
        .map(|block| Candidate {
            name: block_name(&block),
            address: block_address(&block),
            recommender: block_recommender(&block),
            date: post_date.and_then(|posted| block_date(&block, posted)),
        })
        .collect()
}

fn is_recommendation_block(block: &Node) -> bool {
    block.find(Name("strong")).next().is_some()
}

/// Second `<strong>` of the block.
pub fn block_name(block: &Node) -> Option<String> {
    let strong = block.find(Name("strong")).nth(1)?;
    non_empty(strong.text().trim())
}

/// Text of the last `<em>`, split once on the em-dash.
fn credit_parts(block: &Node) -> Option<(String, Option<String>)> {
    let em = block.find(Name("em")).last()?;
    let text = em.text();
    let mut parts = text.split(EM_DASH);
    let before = parts.next()?.to_owned();
    let after = parts.next().map(str::to_owned);
    Some((before, after))
}

/// Street address: first comma segment before the em-dash, periods removed.
pub fn block_address(block: &Node) -> Option<String> {
    let (before, _) = credit_parts(block)?;
    let street = before.split(',').next()?.replace('.', "");
    non_empty(street.trim())
}

/// Recommender: first comma segment after the em-dash.
pub fn block_recommender(block: &Node) -> Option<String> {
    let (_, after) = credit_parts(block)?;
    let after = after?;
    let who = after.split(',').next()?;
    non_empty(who.trim())
}

/// Walks back through preceding siblings to the nearest `<h2>`/`<h3>` and
/// reads its date. Stops at the first heading even if it does not parse.
pub fn block_date(block: &Node, posted: NaiveDate) -> Option<NaiveDate> {
    let mut sibling = block.prev();
    while let Some(node) = sibling {
        if matches!(node.name(), Some("h2") | Some("h3")) {
            return resolve_date(&node.text(), posted);
        }
        sibling = node.prev();
    }
    None
}

/// Parses a `"December 20, ..."` heading against the post's publication
/// date. Months earlier than the publication month belong to the next year.
pub fn resolve_date(heading: &str, posted: NaiveDate) -> Option<NaiveDate> {
    let mut tokens = heading.split_whitespace();
    let month = tokens.next()?;
    let day = tokens.next()?.replace(',', "");

    let in_year = |year: i32| {
        NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%B %d %Y").ok()
    };

    let date = in_year(posted.year())?;
    if date.month() < posted.month() {
        in_year(posted.year() + 1)
    } else {
        Some(date)
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}
