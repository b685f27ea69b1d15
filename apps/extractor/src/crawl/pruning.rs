//! Pruning content filter: keeps the text-dense blocks of a page.
//!
//! Every leaf block (a block element with no block descendants) gets a
//! composite score from five metrics:
//!
//! | metric          | weight | value                                       |
//! |-----------------|--------|---------------------------------------------|
//! | text density    | 0.4    | text length / serialized html length        |
//! | link density    | 0.2    | 1 - link text length / text length          |
//! | tag weight      | 0.2    | per-tag table, 0.5 when unlisted            |
//! | class/id weight | 0.1    | 1.0, minus 0.5 per boilerplate class or id  |
//! | text length     | 0.1    | ln(len + 1) / ln(500), capped at 1.0        |
//!
//! A block survives when it has at least `min_words` words and its score
//! reaches the threshold. In dynamic mode the threshold is relaxed for
//! important tags and text-heavy blocks and tightened for link-heavy ones.

use std::str::FromStr;

use scraper::{ElementRef, Html};

const BLOCK_TAGS: &[&str] = &[
    "p",
    "li",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "pre",
    "blockquote",
    "td",
    "dd",
    "dt",
    "article",
    "section",
    "main",
    "div",
    "ul",
    "ol",
    "table",
];

const NEGATIVE_PATTERNS: &[&str] = &[
    "nav", "footer", "header", "sidebar", "menu", "banner", "ads", "advert", "comment", "social",
    "share", "related", "promo", "cookie",
];

const TEXT_DENSITY_WEIGHT: f64 = 0.4;
const LINK_DENSITY_WEIGHT: f64 = 0.2;
const TAG_WEIGHT_WEIGHT: f64 = 0.2;
const CLASS_ID_WEIGHT: f64 = 0.1;
const TEXT_LENGTH_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdType {
    Fixed,
    Dynamic,
}

impl FromStr for ThresholdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(ThresholdType::Fixed),
            "dynamic" => Ok(ThresholdType::Dynamic),
            other => Err(format!("unknown threshold type '{other}' (expected fixed|dynamic)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PruningFilter {
    pub threshold: f64,
    pub threshold_type: ThresholdType,
    pub min_words: usize,
}

/// Measurements taken from one block before scoring.
#[derive(Debug, Clone, PartialEq)]
struct BlockMetrics {
    tag: String,
    words: usize,
    text_len: usize,
    html_len: usize,
    link_text_len: usize,
    negative_markers: usize,
}

impl PruningFilter {
    pub fn new(threshold: f64, threshold_type: ThresholdType, min_words: usize) -> Self {
        Self {
            threshold,
            threshold_type,
            min_words,
        }
    }

    /// Returns the HTML of every kept block, in document order.
    pub fn filter(&self, document: &Html) -> Vec<String> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| is_leaf_block(el))
            .filter(|el| self.keep(&measure(el)))
            .map(|el| el.html())
            .collect()
    }

    fn keep(&self, metrics: &BlockMetrics) -> bool {
        if metrics.words < self.min_words || metrics.text_len == 0 {
            return false;
        }
        score(metrics) >= self.effective_threshold(metrics)
    }

    fn effective_threshold(&self, metrics: &BlockMetrics) -> f64 {
        if self.threshold_type == ThresholdType::Fixed {
            return self.threshold;
        }

        let mut threshold = self.threshold;
        if tag_importance(&metrics.tag) > 1.0 {
            threshold *= 0.8;
        }
        if ratio(metrics.text_len, metrics.html_len) > 0.4 {
            threshold *= 0.9;
        }
        if ratio(metrics.link_text_len, metrics.text_len) > 0.6 {
            threshold *= 1.2;
        }
        threshold
    }
}

fn is_leaf_block(el: &ElementRef<'_>) -> bool {
    BLOCK_TAGS.contains(&el.value().name())
        && !el
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|d| BLOCK_TAGS.contains(&d.value().name()))
}

fn measure(el: &ElementRef<'_>) -> BlockMetrics {
    let text = normalized_text(el);
    let link_text_len: usize = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|d| d.value().name() == "a")
        .map(|a| normalized_text(&a).chars().count())
        .sum();

    let marker_hits = |value: Option<&str>| {
        value
            .map(|v| v.to_ascii_lowercase())
            .filter(|v| NEGATIVE_PATTERNS.iter().any(|p| v.contains(p)))
            .map_or(0, |_| 1)
    };
    let class_attr = el.value().attr("class");
    let id_attr = el.value().id();

    BlockMetrics {
        tag: el.value().name().to_string(),
        words: text.split_whitespace().count(),
        text_len: text.chars().count(),
        html_len: el.html().chars().count(),
        link_text_len,
        negative_markers: marker_hits(class_attr) + marker_hits(id_attr),
    }
}

fn normalized_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn score(m: &BlockMetrics) -> f64 {
    let text_density = ratio(m.text_len, m.html_len);
    let link_density = 1.0 - ratio(m.link_text_len, m.text_len);
    let class_id = (1.0 - 0.5 * m.negative_markers as f64).max(0.0);
    let text_length = ((m.text_len as f64 + 1.0).ln() / 500f64.ln()).min(1.0);

    let total = TEXT_DENSITY_WEIGHT
        + LINK_DENSITY_WEIGHT
        + TAG_WEIGHT_WEIGHT
        + CLASS_ID_WEIGHT
        + TEXT_LENGTH_WEIGHT;

    (TEXT_DENSITY_WEIGHT * text_density
        + LINK_DENSITY_WEIGHT * link_density
        + TAG_WEIGHT_WEIGHT * tag_weight(&m.tag)
        + CLASS_ID_WEIGHT * class_id
        + TEXT_LENGTH_WEIGHT * text_length)
        / total
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).min(1.0)
    }
}

fn tag_weight(tag: &str) -> f64 {
    match tag {
        "article" => 1.5,
        "h1" => 1.2,
        "h2" => 1.1,
        "p" | "section" | "h3" | "pre" | "blockquote" => 1.0,
        "h4" => 0.9,
        "h5" => 0.8,
        "h6" => 0.7,
        "span" => 0.3,
        _ => 0.5,
    }
}

fn tag_importance(tag: &str) -> f64 {
    match tag {
        "article" => 1.5,
        "main" | "h1" => 1.4,
        "section" | "h2" => 1.3,
        "p" | "h3" => 1.2,
        "span" => 0.6,
        _ => 0.7,
    }
}
