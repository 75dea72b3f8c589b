use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// How many hrefs / button labels are sampled into the structure summary
pub const SAMPLE_SIZE: usize = 5;

/// Button labels collected before sampling
const MAX_BUTTONS: usize = 10;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static CLICKABLE: LazyLock<Selector> = LazyLock::new(|| selector("button, a"));
static NAVIGATION: LazyLock<Selector> =
    LazyLock::new(|| selector("nav, .menu, header, #menu"));
static MAIN_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| selector("article, main, .content, #content"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| selector("article"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selectors are valid CSS")
}

/// Structural summary of a loaded page, as reported by the `analyze_page` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStructure {
    pub title: String,
    pub links_count: usize,
    pub sample_links: Vec<String>,
    pub sample_buttons: Vec<String>,
    pub has_navigation: bool,
    pub has_main_content: bool,
    pub page_type: String,
}

/// Analyzes HTML content and summarizes its structure
pub fn analyze_structure(html: &str) -> PageStructure {
    // Parse the HTML document
    let doc = Html::parse_document(html);

    // Extract title
    let title = doc
        .select(&TITLE)
        .next()
        .map(|title| element_text(&title))
        .unwrap_or_else(|| "No title found".to_string());

    // Extract links and clickable labels
    let links = parse_links(&doc);
    let sample_buttons = button_labels(&doc)
        .into_iter()
        .take(SAMPLE_SIZE)
        .collect();

    ::log::debug!("HTML analysis found {} links", links.len());

    PageStructure {
        title,
        links_count: links.len(),
        sample_links: links.into_iter().take(SAMPLE_SIZE).collect(),
        sample_buttons,
        has_navigation: doc.select(&NAVIGATION).next().is_some(),
        has_main_content: doc.select(&MAIN_CONTENT).next().is_some(),
        page_type: if doc.select(&ARTICLE).next().is_some() {
            "article".to_string()
        } else {
            "standard".to_string()
        },
    }
}

/// Every href on the page, in document order
fn parse_links(doc: &Html) -> Vec<String> {
    doc.select(&LINKS)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect()
}

/// Distinct non-empty labels of buttons and anchors
fn button_labels(doc: &Html) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for element in doc.select(&CLICKABLE) {
        let text = element_text(&element);
        if !text.is_empty() && !labels.contains(&text) {
            labels.push(text);
            if labels.len() >= MAX_BUTTONS {
                break;
            }
        }
    }
    labels
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_structure() {
        let html = r##"<html><head><title> Acme  Store </title></head><body>
            <nav><a href="/">Home</a><a href="/shop">Shop</a></nav>
            <main><button>Buy now</button><a href="/shop">Shop</a><a>no href</a></main>
            <a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>
        </body></html>"##;
        let structure = analyze_structure(html);

        assert_eq!(structure.title, "Acme Store");
        assert_eq!(structure.links_count, 6);
        assert_eq!(structure.sample_links, vec!["/", "/shop", "/shop", "/a", "/b"]);
        assert_eq!(
            structure.sample_buttons,
            vec!["Home", "Shop", "Buy now", "no href", "A"]
        );
        assert!(structure.has_navigation);
        assert!(structure.has_main_content);
        assert_eq!(structure.page_type, "standard");
    }

    #[test]
    fn test_analyze_bare_article() {
        let html = "<html><body><article><p>Story</p></article></body></html>";
        let structure = analyze_structure(html);

        assert_eq!(structure.title, "No title found");
        assert_eq!(structure.links_count, 0);
        assert!(structure.sample_links.is_empty());
        assert!(structure.sample_buttons.is_empty());
        assert!(!structure.has_navigation);
        assert!(structure.has_main_content);
        assert_eq!(structure.page_type, "article");
    }
}
