//! Reduces a fetched HTML page to cleaned HTML and markdown renderings,
//! following the crawl policy.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use crate::config::CrawlPolicy;
use crate::crawl::engine::MarkdownRendering;
use crate::crawl::pruning::PruningFilter;

/// Elements that never carry readable content.
const ALWAYS_REMOVED: &[&str] = &["script", "style", "noscript", "template"];

/// Content landmarks: these and their ancestors survive every removal rule.
const PROTECTED_SELECTOR: &str = "body, main, article, [role='main']";

const OVERLAY_SELECTORS: &[&str] = &[
    "[role='dialog']",
    "[aria-modal='true']",
    "[class*='modal']",
    "[class*='overlay']",
    "[class*='popup']",
    "[class*='cookie']",
    "[id*='cookie']",
    "[class*='consent']",
];

#[derive(Debug, Clone, Default)]
pub struct ProcessedPage {
    pub title: Option<String>,
    pub cleaned_html: String,
    pub markdown: MarkdownRendering,
    pub internal_links: Vec<String>,
}

/// Cleans `html` fetched from `page_url` and renders it to markdown.
pub fn process_html(html: &str, page_url: &Url, policy: &CrawlPolicy) -> ProcessedPage {
    let mut document = Html::parse_document(html);

    let title = extract_title(&document);
    let internal_links = extract_internal_links(&document, page_url);

    remove_excluded(&mut document, page_url, policy);
    remove_short_paragraphs(&mut document, policy.word_count_threshold);

    let cleaned_html = body_html(&document);
    let raw_markdown = html_to_markdown(&cleaned_html);

    let filter = PruningFilter::new(
        policy.pruning_threshold,
        policy.threshold_type,
        policy.min_word_threshold,
    );
    let fit_html = filter.filter(&document).join("\n");
    let fit_markdown = html_to_markdown(&fit_html);

    ProcessedPage {
        title,
        cleaned_html,
        markdown: MarkdownRendering {
            raw_markdown: Some(raw_markdown),
            fit_markdown: Some(fit_markdown),
        },
        internal_links,
    }
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = raw, error = ?e, "Skipping invalid selector");
            None
        }
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = parse_selector("title")?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Same-host http(s) links, resolved and de-duplicated in document order.
fn extract_internal_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Some(selector) = parse_selector("a[href]") else {
        return vec![];
    };

    let mut links: Vec<String> = Vec::new();
    for href in document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
    {
        let Ok(mut resolved) = page_url.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https")
            || resolved.host_str() != page_url.host_str()
        {
            continue;
        }
        resolved.set_fragment(None);
        let link = resolved.to_string();
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

fn remove_excluded(document: &mut Html, page_url: &Url, policy: &CrawlPolicy) {
    let mut selectors: Vec<String> = ALWAYS_REMOVED.iter().map(|s| s.to_string()).collect();
    selectors.extend(policy.excluded_tags.iter().cloned());
    if !policy.process_iframes {
        selectors.push("iframe".to_string());
    }
    if policy.remove_overlay_elements {
        selectors.extend(OVERLAY_SELECTORS.iter().map(|s| s.to_string()));
    }

    // The document skeleton and the path down to the main content are never
    // removed, whatever classes they carry (`<body class="modal-open">`).
    let mut protected: HashSet<_> = HashSet::new();
    protected.insert(document.root_element().id());
    if let Some(skeleton) = parse_selector(PROTECTED_SELECTOR) {
        for el in document.select(&skeleton) {
            protected.insert(el.id());
            protected.extend(el.ancestors().map(|a| a.id()));
        }
    }

    let mut doomed: Vec<_> = selectors
        .iter()
        .filter_map(|raw| parse_selector(raw))
        .flat_map(|selector| {
            document
                .select(&selector)
                .map(|el| el.id())
                .filter(|id| !protected.contains(id))
                .collect::<Vec<_>>()
        })
        .collect();

    if policy.exclude_external_links || policy.exclude_social_media_links {
        if let Some(anchor) = parse_selector("a[href]") {
            doomed.extend(
                document
                    .select(&anchor)
                    .filter(|a| is_excluded_link(a, page_url, policy))
                    .map(|a| a.id()),
            );
        }
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Drops paragraphs shorter than `min_words` words. Zero disables the rule.
fn remove_short_paragraphs(document: &mut Html, min_words: usize) {
    if min_words == 0 {
        return;
    }
    let Some(selector) = parse_selector("p") else {
        return;
    };

    let short: Vec<_> = document
        .select(&selector)
        .filter(|p| p.text().flat_map(str::split_whitespace).count() < min_words)
        .map(|p| p.id())
        .collect();

    for id in short {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_excluded_link(anchor: &ElementRef<'_>, page_url: &Url, policy: &CrawlPolicy) -> bool {
    let Some(target) = anchor
        .value()
        .attr("href")
        .and_then(|href| page_url.join(href).ok())
    else {
        return false;
    };
    let Some(host) = target.host_str() else {
        return false;
    };

    let is_social = policy
        .social_media_domains
        .iter()
        .any(|domain| host == domain.as_str() || host.ends_with(&format!(".{domain}")));
    let is_external = Some(host) != page_url.host_str();

    (policy.exclude_social_media_links && is_social)
        || (policy.exclude_external_links && is_external)
}

fn body_html(document: &Html) -> String {
    parse_selector("body")
        .and_then(|selector| document.select(&selector).next().map(|b| b.html()))
        .unwrap_or_else(|| document.root_element().html())
}

/// Converts HTML to markdown, falling back to plain text on converter failure.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    htmd::convert(html)
        .unwrap_or_else(|_| {
            let document = Html::parse_fragment(html);
            document.root_element().text().collect::<String>()
        })
        .trim()
        .to_string()
}
