//! Heuristic locators for the promo page and the asset detail page.
//!
//! Everything here is pure: text or an already parsed tree goes in, an
//! `Option` comes out. Callers decide which sentinel replaces a `None`.
//! Fallback chains are plain ordered slices of rules; the first rule that
//! matches wins.
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Phrases that mark the text node carrying the promotion.
pub const PROMO_PHRASES: [&str; 2] = ["coupon code", "use code"];

const SALE_END_PREFIX: &str = "Sale and related free asset promotion end";

/// Tags treated as block containers when walking up from a text anchor.
const BLOCK_TAGS: [&str; 11] = [
    "div", "section", "article", "main", "aside", "header", "footer", "nav", "li", "td", "body",
];

/// Elements whose text is never rendered as page copy.
const HIDDEN_TEXT_TAGS: [&str; 4] = ["script", "style", "template", "noscript"];

static COUPON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i:coupon code)\s+([A-Z0-9]+)\b").expect("coupon regex"));
static PROMOTION_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Sale and related free asset promotion end\s+(.*?)(?:\.|$)")
        .expect("promotion end regex")
});
static SALE_ENDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Sale ends|Ends)[:\s]+(.*?)(?:\.|$|Terms)").expect("sale ends regex")
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));
static HEADINGS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h3", "h2", "h1"]
        .iter()
        .map(|tag| Selector::parse(tag).expect("heading selector"))
        .collect()
});

type DateRule = fn(&str) -> Option<String>;
type AnchorRule = for<'a> fn(ElementRef<'a>) -> bool;

const SALE_END_RULES: [DateRule; 2] = [promotion_end_phrase, sale_ends_phrase];
const ASSET_LINK_RULES: [AnchorRule; 3] = [is_gift_button, is_package_link, is_slug_link];
const PUBLISHER_LINK_RULES: [AnchorRule; 1] = [is_publisher_link];

/// First uppercase alphanumeric token following "coupon code".
pub fn locate_coupon_code(text: &str) -> Option<String> {
    COUPON_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Sale end sentence, e.g. `* Sale and related free asset promotion end June 1, 2025.`
pub fn locate_sale_end_date(text: &str) -> Option<String> {
    SALE_END_RULES
        .iter()
        .find_map(|rule| rule(text))
        .map(|raw| format!("* {SALE_END_PREFIX} {raw}."))
}

fn promotion_end_phrase(text: &str) -> Option<String> {
    first_capture(&PROMOTION_END_RE, text)
}

fn sale_ends_phrase(text: &str) -> Option<String> {
    first_capture(&SALE_ENDS_RE, text)
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    let raw = re.captures(text)?.get(1)?.as_str().trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Absolute URL of the asset detail page linked from `container`.
pub fn locate_asset_link(container: ElementRef<'_>, site_origin: &str) -> Option<String> {
    first_link(container, &ASSET_LINK_RULES, site_origin)
}

/// Absolute URL of the first publisher page linked from `container`.
pub fn locate_publisher_link(container: ElementRef<'_>, site_origin: &str) -> Option<String> {
    first_link(container, &PUBLISHER_LINK_RULES, site_origin)
}

fn first_link(container: ElementRef<'_>, rules: &[AnchorRule], site_origin: &str) -> Option<String> {
    rules.iter().find_map(|rule| {
        container
            .select(&ANCHOR)
            .find(|a| rule(*a))
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_href(site_origin, href))
    })
}

fn href(a: ElementRef<'_>) -> &str {
    a.value().attr("href").unwrap_or_default()
}

fn is_gift_button(a: ElementRef<'_>) -> bool {
    a.text().collect::<String>().contains("Get your gift")
}

fn is_package_link(a: ElementRef<'_>) -> bool {
    href(a).contains("/packages/")
}

fn is_slug_link(a: ElementRef<'_>) -> bool {
    href(a).contains("/slug/")
}

fn is_publisher_link(a: ElementRef<'_>) -> bool {
    href(a).contains("/publishers/")
}

/// Hrefs starting with `http` come back untouched; anything else gets
/// `site_origin` prefixed verbatim, without URL normalisation.
pub fn resolve_href(site_origin: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http") {
        return href.to_string();
    }
    let origin = site_origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

/// Element holding the first text node that mentions one of `PROMO_PHRASES`.
/// Later mentions are ignored; the page is expected to run one promotion.
pub fn find_promo_anchor(document: &Html) -> Option<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .find(|node| {
            node.value().as_text().is_some_and(|text| {
                let lower = text.to_lowercase();
                PROMO_PHRASES.iter().any(|p| lower.contains(p))
            })
        })
        .and_then(|node| node.parent())
        .and_then(ElementRef::wrap)
}

/// Nearest block-level element strictly above `start`, the element holding
/// the anchor text. Falls back to the outermost element reached when no block
/// tag encloses it.
pub fn nearest_block(start: ElementRef<'_>) -> ElementRef<'_> {
    let mut outermost = start;
    for el in start.ancestors().filter_map(ElementRef::wrap) {
        if BLOCK_TAGS.contains(&el.value().name()) {
            return el;
        }
        outermost = el;
    }
    outermost
}

/// First non-empty heading inside `container`, trying h3, then h2, then h1.
pub fn locate_title(container: ElementRef<'_>) -> Option<String> {
    HEADINGS.iter().find_map(|sel| {
        container
            .select(sel)
            .next()
            .map(flatten_text)
            .filter(|t| !t.is_empty())
    })
}

/// Visible text under `el`, each node trimmed, empty nodes dropped, joined by
/// a space. Script, style, template and noscript contents are skipped.
pub fn flatten_text(el: ElementRef<'_>) -> String {
    el.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| HIDDEN_TEXT_TAGS.contains(&parent.value().name()));
            (!hidden).then(|| text.trim())
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
