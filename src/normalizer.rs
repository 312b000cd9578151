use html2text::from_read;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::sync::Arc;

use crate::data_models::NormalizedDocument;
use crate::isolator::IsolatedContent;
use crate::logging::Logger;

static MULTI_NEWLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline pattern"));

static DEFAULT_BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    BoilerplateSpan::default()
        .to_regex()
        .expect("valid boilerplate pattern")
});

/// Leading site chrome that survives isolation: everything from `start` up to
/// and including `anchor` is replaced by `anchor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoilerplateSpan {
    pub start: String,
    pub anchor: String,
}

impl BoilerplateSpan {
    pub fn new(start: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            anchor: anchor.into(),
        }
    }

    fn to_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            "(?s){}.*?{}",
            regex::escape(&self.start),
            regex::escape(&self.anchor)
        ))
    }
}

impl Default for BoilerplateSpan {
    fn default() -> Self {
        Self::new("Skip to content", "Biz Evde Yokuz")
    }
}

pub struct MarkdownNormalizer {
    logger: Arc<dyn Logger>,
    boilerplate: BoilerplateSpan,
    boilerplate_re: Regex,
}

impl MarkdownNormalizer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            boilerplate: BoilerplateSpan::default(),
            boilerplate_re: DEFAULT_BOILERPLATE_RE.clone(),
        }
    }

    pub fn with_boilerplate(
        logger: Arc<dyn Logger>,
        boilerplate: BoilerplateSpan,
    ) -> Result<Self, regex::Error> {
        let boilerplate_re = boilerplate.to_regex()?;
        Ok(Self {
            logger,
            boilerplate,
            boilerplate_re,
        })
    }

    pub fn normalize(&self, content: &IsolatedContent) -> NormalizedDocument {
        let markdown = match render_markdown(content.root()) {
            Ok(markdown) => markdown,
            Err(e) => {
                self.logger
                    .error(&format!("failed to convert markup to markdown: {e}"));
                String::new()
            }
        };
        let document = NormalizedDocument::new(self.normalize_text(&markdown));
        self.logger.info(&format!(
            "converted markup to markdown ({} characters)",
            document.char_len()
        ));
        document
    }

    /// Blank-line collapse, boilerplate strip, trim. Idempotent.
    pub fn normalize_text(&self, text: &str) -> String {
        let text = MULTI_NEWLINE_RE.replace_all(text, "\n\n");
        let text = self
            .boilerplate_re
            .replace_all(&text, NoExpand(&self.boilerplate.anchor));
        text.trim().to_string()
    }
}

/// Line width handed to `html2text`. Wide enough that paragraphs stay on one
/// line and only the markup decides where lines break.
const RENDER_WIDTH: usize = 10_000;

/// Renders a subtree as markdown-flavoured text: ATX headings, `*` bullets
/// and numbered items, emphasis, and reference-style links.
pub fn render_markdown(handle: &Handle) -> anyhow::Result<String> {
    let scope = match handle.data {
        NodeData::Document => TraversalScope::ChildrenOnly(None),
        _ => TraversalScope::IncludeNode,
    };
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };

    let mut markup = Vec::new();
    serialize(&mut markup, &SerializableHandle::from(handle.clone()), opts)?;
    let markdown = from_read(markup.as_slice(), RENDER_WIDTH)?;
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolator::ContentIsolator;
    use crate::logging::NoopLogger;

    fn render(html: &str) -> String {
        let dom = ContentIsolator::get_dom(html);
        render_markdown(&dom.document).unwrap()
    }

    fn normalizer() -> MarkdownNormalizer {
        MarkdownNormalizer::new(Arc::new(NoopLogger))
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_headings_are_atx() {
        let md = render("<h1>Title</h1><h3>  Sub \n title </h3><p>Text</p>");
        assert_eq!(md.trim(), "# Title\n\n### Sub title\n\nText");
    }

    #[test]
    fn test_inline_whitespace_collapses() {
        let md = render("<p>Cacio   e\n\n   pepe</p>");
        assert_eq!(md.trim(), "Cacio e pepe");
    }

    #[test]
    fn test_lists() {
        let md = render("<ul><li>Supplì</li><li>Pizza bianca</li></ul><ol><li>First</li><li>Second</li></ol>");
        let lines = lines(&md);
        for expected in ["* Supplì", "* Pizza bianca", "1. First", "2. Second"] {
            assert!(lines.contains(&expected), "missing {expected:?} in {md:?}");
        }
    }

    #[test]
    fn test_paragraph_inside_list_item_keeps_bullet() {
        let md = render("<ul><li><p>Supplizio</p></li><li><div>I Supplì</div></li></ul>");
        let lines = lines(&md);
        assert!(lines.contains(&"* Supplizio"), "{md:?}");
        assert!(lines.contains(&"* I Supplì"), "{md:?}");
        assert!(!lines.iter().any(|line| line.trim() == "*"), "{md:?}");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let md = render("<ul><li>Roman<ul><li>Carbonara</li></ul></li></ul>");
        let lines = lines(&md);
        assert!(lines.contains(&"* Roman"), "{md:?}");
        let nested = lines
            .iter()
            .find(|line| line.contains("Carbonara"))
            .expect("nested item rendered");
        assert!(nested.starts_with(' '), "nested item not indented: {md:?}");
        assert_eq!(nested.trim_start(), "* Carbonara");
    }

    #[test]
    fn test_preformatted_whitespace_is_kept() {
        let md = render("<pre>line1\n  line2</pre>");
        assert!(md.contains("line1\n  line2"), "{md:?}");
    }

    #[test]
    fn test_emphasis_and_links() {
        let md = render(r#"<p>Try <strong>carbonara</strong> at <a href="https://roscioli.it">Roscioli</a>.</p>"#);
        assert!(md.contains("**carbonara**"), "{md:?}");
        assert!(md.contains("Roscioli"), "{md:?}");
        assert!(md.contains("https://roscioli.it"), "{md:?}");
    }

    #[test]
    fn test_line_breaks() {
        let md = render("<p>Via del Moro 43<br>Trastevere</p>");
        assert_eq!(md.trim(), "Via del Moro 43\nTrastevere");
    }

    #[test]
    fn test_renders_isolated_subtree_only() {
        let isolator = ContentIsolator::new(Arc::new(NoopLogger));
        let content = isolator.isolate("<body><p>outside</p><article><p>inside</p></article></body>");
        let md = render_markdown(content.root()).unwrap();
        assert_eq!(md.trim(), "inside");
    }

    #[test]
    fn test_collapses_blank_runs() {
        let text = normalizer().normalize_text("a\n\n\n\nb\n\n\nc\n\nd");
        assert_eq!(text, "a\n\nb\n\nc\n\nd");
    }

    #[test]
    fn test_strips_boilerplate_span() {
        let text = "Skip to content\n\nMenu\n\nHome\n\nBiz Evde Yokuz\n\n# Roma'da Ne Nerede Yenir";
        assert_eq!(
            normalizer().normalize_text(text),
            "Biz Evde Yokuz\n\n# Roma'da Ne Nerede Yenir"
        );
    }

    #[test]
    fn test_boilerplate_without_anchor_is_kept() {
        let text = "Skip to content\n\nNo anchor here";
        assert_eq!(normalizer().normalize_text(text), text);
    }

    #[test]
    fn test_custom_boilerplate_span() {
        let normalizer = MarkdownNormalizer::with_boilerplate(
            Arc::new(NoopLogger),
            BoilerplateSpan::new("Jump to recipe", "$Guide (1)"),
        )
        .unwrap();
        assert_eq!(
            normalizer.normalize_text("Jump to recipe ... $Guide (1) body"),
            "$Guide (1) body"
        );
    }

    #[test]
    fn test_normalize_text_trims() {
        assert_eq!(normalizer().normalize_text("\n\n  text \n\n"), "text");
    }
}
