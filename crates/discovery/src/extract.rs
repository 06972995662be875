//! Candidate id extraction from rendered markup.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use normalize::WorkKind;

static ILLUST_MARKER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[id^="illust:"]"#).expect("illust marker selector"));
static NOVEL_MARKER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[id^="novel:"]"#).expect("novel marker selector"));
static WINNER_ILLUST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".winner .thumbnail-container a").expect("winner illust selector")
});
static WINNER_NOVEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".winner a.novel-title").expect("winner novel selector"));

/// A discovered, not yet admitted, work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: WorkKind,
    pub id: String,
}

/// Ids embedded in a page of entries as `id="<kind>:<digits>"`, in document
/// order. Markers of the other kind and malformed ids are ignored.
pub fn extract_candidates(kind: WorkKind, html: &str) -> Vec<Candidate> {
    let (selector, prefix) = match kind {
        WorkKind::Illust => (&*ILLUST_MARKER, "illust:"),
        WorkKind::Novel => (&*NOVEL_MARKER, "novel:"),
    };

    let document = Html::parse_fragment(html);
    document
        .select(selector)
        .filter_map(|element| element.value().id())
        .filter_map(|id| id.strip_prefix(prefix))
        .filter(|digits| is_numeric_id(digits))
        .map(|digits| Candidate {
            kind,
            id: digits.to_string(),
        })
        .collect()
}

/// Links of an already rendered winners section, each with the id it maps
/// to (if any).
pub(crate) fn winner_links(kind: WorkKind, html: &str) -> Vec<Option<String>> {
    let selector = match kind {
        WorkKind::Illust => &*WINNER_ILLUST,
        WorkKind::Novel => &*WINNER_NOVEL,
    };
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|element| winner_id(kind, element))
        .collect()
}

fn winner_id(kind: WorkKind, element: ElementRef<'_>) -> Option<String> {
    match kind {
        WorkKind::Illust => element
            .value()
            .attr("data-work-id")
            .map(str::trim)
            .filter(|id| is_numeric_id(id))
            .map(str::to_string),
        WorkKind::Novel => element.value().attr("href").and_then(novel_id_from_href),
    }
}

/// Novel id from `/novel/show.php?id=<digits>` or `/novel/<digits>` style
/// links, absolute or relative.
pub fn novel_id_from_href(href: &str) -> Option<String> {
    let href = href.split('#').next().unwrap_or(href);
    let (path, query) = match href.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (href, None),
    };

    if let Some(query) = query {
        let from_query = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "id")
            .map(|(_, value)| value)
            .filter(|value| is_numeric_id(value));
        if let Some(id) = from_query {
            return Some(id.to_string());
        }
    }

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| is_numeric_id(segment))
        .map(str::to_string)
}

fn is_numeric_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
