use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use scraper::{Html, Selector};
use std::cell::RefCell;
use std::sync::Arc;

use crate::logging::Logger;

/// Elements that never carry article content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "iframe", "nav", "footer", "header", "aside",
];

/// Theme hooks for site chrome that is not wrapped in a semantic element.
const NOISE_CLASSES: &[&str] = &["site-header", "site-footer", "menu-toggle", "search-form"];

/// The selected subtree, kept together with the tree it was cut from.
///
/// `RcDom` tears its descendants down when the document node drops, so the
/// root handle is only usable while the dom is alive.
pub struct IsolatedContent {
    #[allow(dead_code)]
    dom: RcDom,
    root: Handle,
}

impl IsolatedContent {
    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn root_name(&self) -> Option<String> {
        element_name(&self.root)
    }
}

/// Picks the readable article subtree out of a page.
pub struct ContentIsolator {
    logger: Arc<dyn Logger>,
}

impl ContentIsolator {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    pub fn get_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// Strips noise, then returns the first `<article>`, else `<body>`, else the
    /// whole document.
    pub fn isolate(&self, html: &str) -> IsolatedContent {
        let dom = Self::get_dom(html);
        Self::strip_noise(&dom.document);

        let root = match Self::find_first(&dom.document, "article") {
            Some(article) => article,
            None => match Self::find_first(&dom.document, "body") {
                Some(body) => {
                    self.logger
                        .warn("no <article> element found, falling back to <body>");
                    body
                }
                None => {
                    self.logger
                        .warn("no <article> or <body> element found, using the whole document");
                    dom.document.clone()
                }
            },
        };
        IsolatedContent { dom, root }
    }

    /// Text of the page `<title>`, if it has a non-blank one.
    pub fn title(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn strip_noise(handle: &Handle) {
        handle
            .children
            .borrow_mut()
            .retain(|child| !Self::is_noise(child));
        for child in handle.children.borrow().iter() {
            Self::strip_noise(child);
        }
    }

    pub fn is_noise(handle: &Handle) -> bool {
        match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                NOISE_TAGS.contains(&&*name.local) || Self::has_noise_class(attrs)
            }
            _ => false,
        }
    }

    fn has_noise_class(attrs: &RefCell<Vec<Attribute>>) -> bool {
        attrs
            .borrow()
            .iter()
            .filter(|attr| &*attr.name.local == "class")
            .any(|attr| {
                attr.value
                    .split_whitespace()
                    .any(|class| NOISE_CLASSES.contains(&class))
            })
    }

    /// Depth-first, document order.
    pub fn find_first(handle: &Handle, tag: &str) -> Option<Handle> {
        if let NodeData::Element { name, .. } = &handle.data {
            if &*name.local == tag {
                return Some(handle.clone());
            }
        }
        handle
            .children
            .borrow()
            .iter()
            .find_map(|child| Self::find_first(child, tag))
    }
}

/// Name of the element behind `handle`, or `None` for text/document nodes.
pub fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}
