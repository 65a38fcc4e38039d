//! Element selection over parsed documents.
//!
//! A [`Document`] is one parsed page. [`Document::select`] returns owned
//! [`Element`] snapshots matching a [`Predicate`], in document order. Selection
//! never fails: no match, or a predicate that does not compile to a selector,
//! yields an empty sequence.

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

/// An immutable parsed page.
pub struct Document {
    url: Option<Url>,
    html: Html,
}

impl Document {
    /// Parse a full HTML document. `url` is used to resolve relative links.
    pub fn parse(html: &str, url: Option<Url>) -> Self {
        Self {
            url,
            html: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Resolve `href` against the document URL. Returns `href` unchanged when
    /// there is no base URL or the join fails.
    pub fn resolve(&self, href: &str) -> String {
        self.url()
            .and_then(|base| base.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string())
    }

    /// All elements matching `predicate`, in document order.
    pub fn select(&self, predicate: &Predicate) -> Vec<Element> {
        let Some(selector) = predicate.compile() else {
            return Vec::new();
        };
        self.html.select(&selector).map(Element::snapshot).collect()
    }

    /// Like [`Document::select`], with `href` attributes resolved to absolute URLs.
    pub fn select_resolved(&self, predicate: &Predicate) -> Vec<Element> {
        let mut elements = self.select(predicate);
        for element in &mut elements {
            if let Some(href) = element.attrs.get_mut("href") {
                *href = self.resolve(href);
            }
        }
        elements
    }

    /// Elements matching `predicate` inside the first element matching `scope`.
    pub fn select_within(&self, scope: &Predicate, predicate: &Predicate) -> Vec<Element> {
        let (Some(scope_sel), Some(selector)) = (scope.compile(), predicate.compile()) else {
            return Vec::new();
        };
        match self.html.select(&scope_sel).next() {
            Some(root) => root.select(&selector).map(Element::snapshot).collect(),
            None => Vec::new(),
        }
    }
}

/// Read-only view of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Concatenated text of all descendants.
    pub text: String,
    /// Serialized outer markup, e.g. `<td>Chile</td>`.
    pub html: String,
}

impl Element {
    fn snapshot(el: ElementRef<'_>) -> Self {
        let value = el.value();
        Self {
            tag: value.name().to_string(),
            attrs: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: el.text().collect::<String>(),
            html: el.html(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// What to select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `<tag>`
    Tag(String),
    /// `<tag>` carrying attribute `attr`
    #[cfg(test)]
    TagWithAttr { tag: String, attr: String },
    /// Any element whose `attr` value contains `needle`
    #[cfg(test)]
    AttrContains { attr: String, needle: String },
    /// Any element with class token `class`
    Class(String),
    /// `<tag id="id">`
    TagWithId { tag: String, id: String },
    /// Raw CSS selector
    Css(String),
}

impl Predicate {
    pub fn tag(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }

    pub fn css(css: &str) -> Self {
        Self::Css(css.to_string())
    }

    /// CSS form of the predicate.
    pub fn to_css(&self) -> String {
        match self {
            Self::Tag(tag) => tag.clone(),
            #[cfg(test)]
            Self::TagWithAttr { tag, attr } => format!("{tag}[{attr}]"),
            #[cfg(test)]
            Self::AttrContains { attr, needle } => format!("[{attr}*=\"{}\"]", escape(needle)),
            Self::Class(class) => format!("[class~=\"{}\"]", escape(class)),
            Self::TagWithId { tag, id } => format!("{tag}[id=\"{}\"]", escape(id)),
            Self::Css(css) => css.clone(),
        }
    }

    fn compile(&self) -> Option<Selector> {
        let css = self.to_css();
        match Selector::parse(&css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(%css, error = %e, "Unparsable selector; treating as no match");
                None
            }
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h2><a href="/business/a" data-content-title="First">First</a></h2>
          <h2><a data-content-title="No link">No link</a></h2>
          <div class="DataContainer wide"><table><tr><td>Chile</td><td>2019</td></tr></table></div>
          <div class="DataContainer"><table><tr><td>Peru</td></tr></table></div>
          <span id="spanPageCountB">of 12</span>
        </body></html>
    "#;

    fn doc() -> Document {
        Document::parse(PAGE, Url::parse("https://www.thestar.com.my/business").ok())
    }

    #[test]
    fn test_select_by_tag_with_attr() {
        let links = doc().select(&Predicate::TagWithAttr {
            tag: "a".to_string(),
            attr: "href".to_string(),
        });
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].attr("data-content-title"), Some("First"));
        assert_eq!(links[0].text, "First");
    }

    #[test]
    fn test_select_by_class_token() {
        let divs = doc().select(&Predicate::Class("DataContainer".to_string()));
        assert_eq!(divs.len(), 2);
    }

    #[test]
    fn test_select_by_attr_contains() {
        let hits = doc().select(&Predicate::AttrContains {
            attr: "href".to_string(),
            needle: "business".to_string(),
        });
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tag, "a");
    }

    #[test]
    fn test_select_within_first_scope_only() {
        let cells = doc().select_within(&Predicate::Class("DataContainer".to_string()), &Predicate::tag("td"));
        let texts: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Chile", "2019"]);
        assert_eq!(cells[0].html, "<td>Chile</td>");
    }

    #[test]
    fn test_select_by_id() {
        let spans = doc().select(&Predicate::TagWithId {
            tag: "span".to_string(),
            id: "spanPageCountB".to_string(),
        });
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "of 12");
    }

    #[test]
    fn test_no_match_and_bad_selector_are_empty() {
        assert!(doc().select(&Predicate::tag("article")).is_empty());
        assert!(doc().select(&Predicate::css("h2 >>> [")).is_empty());
        assert!(doc()
            .select_within(&Predicate::tag("aside"), &Predicate::tag("td"))
            .is_empty());
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            doc().resolve("/business/a"),
            "https://www.thestar.com.my/business/a"
        );
        let bare = Document::parse("<p>x</p>", None);
        assert_eq!(bare.resolve("/business/a"), "/business/a");
    }
}
