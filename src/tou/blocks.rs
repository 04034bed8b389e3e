//! Turns the raw text of a TOU section into display blocks.
//!
//! Each line is classified on its own, blank lines are dropped, and runs of
//! consecutive bullet items are folded into a single list. Nothing here knows
//! about egui; the modal and the plain-text renderer both consume the output.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Section, TouDocument};

pub const DEFAULT_BULLET: char = '•';

/// `•` after a UTF-8 -> Windows-1252 round trip. Some stored documents carry it.
const MISENCODED_BULLET: &str = "â€¢";

const STRONG_OPEN: &str = "<strong>";
const ANCHOR_MARKER: &str = "<a ";

static STRONG_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?strong>").expect("valid strong tag regex"));
static CONTACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"contact:\s*(?:<a\b[^>]*>\s*)?([^\s<>"']+@[^\s<>"']+\.[^\s<>"']+)"#)
        .expect("valid contact regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    Paragraph(String),
    BoldParagraph(String),
    /// Holds the bare address, without the `mailto:` scheme.
    MailLink(String),
    BulletList(Vec<String>),
}

/// Classification of one source line, before bullet runs are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Bullet(String),
    Bold(String),
    MailLink(String),
    Plain(String),
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub title: String,
    pub blocks: Vec<DisplayBlock>,
}

#[derive(Debug, Clone, Copy)]
pub struct BlockRules {
    bullet: char,
}

impl Default for BlockRules {
    fn default() -> Self {
        Self::new(DEFAULT_BULLET)
    }
}

impl BlockRules {
    pub fn new(bullet: char) -> Self {
        Self { bullet }
    }

    pub fn bullet(&self) -> char {
        self.bullet
    }

    /// Returns the bullet text when `trimmed` starts with the marker.
    fn strip_bullet<'a>(&self, trimmed: &'a str) -> Option<&'a str> {
        if let Some(rest) = trimmed.strip_prefix(self.bullet) {
            return Some(rest.trim());
        }
        if self.bullet == DEFAULT_BULLET {
            if let Some(rest) = trimmed.strip_prefix(MISENCODED_BULLET) {
                return Some(rest.trim());
            }
        }
        None
    }

    pub fn classify_line(&self, line: &str) -> LineKind {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim();

        if let Some(item) = self.strip_bullet(trimmed) {
            return LineKind::Bullet(item.to_string());
        }
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed.contains(STRONG_OPEN) {
            let text = STRONG_TAG_RE.replace_all(trimmed, "");
            return LineKind::Bold(text.trim().to_string());
        }
        if line.contains(ANCHOR_MARKER) {
            if let Some(address) = contact_address(line) {
                return LineKind::MailLink(address);
            }
        }
        LineKind::Plain(line.to_string())
    }

    pub fn classify_lines<'a, I>(&self, lines: I) -> Vec<DisplayBlock>
    where
        I: IntoIterator<Item = &'a str>,
    {
        merge_bullets(lines.into_iter().map(|line| self.classify_line(line)))
    }

    pub fn render_content(&self, content: &str) -> Vec<DisplayBlock> {
        self.classify_lines(content.split('\n'))
    }

    pub fn render_section(&self, section: &Section) -> RenderedSection {
        RenderedSection {
            title: section.title.clone(),
            blocks: self.render_content(&section.content),
        }
    }

    pub fn render_document(&self, doc: &TouDocument) -> Vec<RenderedSection> {
        doc.sections.iter().map(|s| self.render_section(s)).collect()
    }
}

fn contact_address(line: &str) -> Option<String> {
    let caps = CONTACT_RE.captures(line)?;
    let address = caps
        .get(1)?
        .as_str()
        .trim_end_matches(&['.', ',', ';', ':', ')'][..]);
    Some(address.to_string())
}

/// Folds every maximal run of bullet items into one `BulletList`.
/// Blank lines never produce a block, so bullets separated only by blank
/// lines still end up in the same list.
pub fn merge_bullets<I>(kinds: I) -> Vec<DisplayBlock>
where
    I: IntoIterator<Item = LineKind>,
{
    let mut blocks = Vec::new();
    let mut run: Vec<String> = Vec::new();

    for kind in kinds {
        let block = match kind {
            LineKind::Bullet(item) => {
                run.push(item);
                continue;
            }
            LineKind::Blank => continue,
            LineKind::Bold(text) => DisplayBlock::BoldParagraph(text),
            LineKind::MailLink(address) => DisplayBlock::MailLink(address),
            LineKind::Plain(text) => DisplayBlock::Paragraph(text),
        };
        if !run.is_empty() {
            blocks.push(DisplayBlock::BulletList(std::mem::take(&mut run)));
        }
        blocks.push(block);
    }
    if !run.is_empty() {
        blocks.push(DisplayBlock::BulletList(run));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(content: &str) -> Vec<DisplayBlock> {
        BlockRules::default().render_content(content)
    }

    #[test]
    fn test_bullet_runs_split_by_paragraph() {
        assert_eq!(
            render("• a\n• b\nplain\n• c"),
            vec![
                DisplayBlock::BulletList(vec!["a".into(), "b".into()]),
                DisplayBlock::Paragraph("plain".into()),
                DisplayBlock::BulletList(vec!["c".into()]),
            ]
        );
    }

    #[test]
    fn test_strong_line() {
        assert_eq!(
            render("<strong>Important</strong>"),
            vec![DisplayBlock::BoldParagraph("Important".into())]
        );
        assert_eq!(
            render("Note: <strong>read this</strong> first"),
            vec![DisplayBlock::BoldParagraph("Note: read this first".into())]
        );
    }

    #[test]
    fn test_contact_line_and_blank_separator() {
        let blocks = render("Text\n\ncontact: a@b.com text with <a >");
        assert_eq!(
            blocks,
            vec![
                DisplayBlock::Paragraph("Text".into()),
                DisplayBlock::MailLink("a@b.com".into()),
            ]
        );
    }

    #[test]
    fn test_contact_inside_anchor_tag() {
        let line = r#"For questions, contact: <a href="mailto:legal@example.org">legal@example.org</a>."#;
        assert_eq!(
            BlockRules::default().classify_line(line),
            LineKind::MailLink("legal@example.org".into())
        );
    }

    #[test]
    fn test_anchor_without_contact_is_plain() {
        let line = r#"See <a href="/faq">the FAQ</a>"#;
        assert_eq!(
            BlockRules::default().classify_line(line),
            LineKind::Plain(line.into())
        );
    }

    #[test]
    fn test_contact_without_anchor_is_plain() {
        assert_eq!(
            render("contact: a@b.com"),
            vec![DisplayBlock::Paragraph("contact: a@b.com".into())]
        );
    }

    #[test]
    fn test_bullet_beats_strong() {
        assert_eq!(
            BlockRules::default().classify_line("  •   <strong>x</strong> "),
            LineKind::Bullet("<strong>x</strong>".into())
        );
    }

    #[test]
    fn test_blank_and_whitespace_lines_dropped() {
        assert!(render("").is_empty());
        assert!(render("\n   \n\t\n\r\n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            render("first\r\n• one\r\n• two\r\n"),
            vec![
                DisplayBlock::Paragraph("first".into()),
                DisplayBlock::BulletList(vec!["one".into(), "two".into()]),
            ]
        );
    }

    #[test]
    fn test_bullets_across_blank_line_share_a_list() {
        assert_eq!(
            render("• a\n\n• b"),
            vec![DisplayBlock::BulletList(vec!["a".into(), "b".into()])]
        );
    }

    #[test]
    fn test_misencoded_default_marker() {
        assert_eq!(
            render("â€¢ first\n• second"),
            vec![DisplayBlock::BulletList(vec!["first".into(), "second".into()])]
        );
        // The alias only applies to the default marker.
        let dash = BlockRules::new('-');
        assert_eq!(dash.classify_line("â€¢ x"), LineKind::Plain("â€¢ x".into()));
    }

    #[test]
    fn test_custom_marker() {
        let rules = BlockRules::new('*');
        assert_eq!(
            rules.render_content("* one\n*two\n• not a bullet"),
            vec![
                DisplayBlock::BulletList(vec!["one".into(), "two".into()]),
                DisplayBlock::Paragraph("• not a bullet".into()),
            ]
        );
    }

    #[test]
    fn test_render_document_keeps_section_order() {
        let doc = TouDocument {
            sections: vec![
                Section { title: "One".into(), content: "a".into() },
                Section { title: "Two".into(), content: "• b".into() },
            ],
            agreement_text: None,
        };
        let rendered = BlockRules::default().render_document(&doc);
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].title, "One");
        assert_eq!(rendered[1].blocks, vec![DisplayBlock::BulletList(vec!["b".into()])]);
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(|s| format!("• {}", s)),
            "[a-z]{1,8}",
            "[a-z]{1,8}".prop_map(|s| format!("<strong>{}</strong>", s)),
            Just(String::new()),
            Just("   ".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_no_bullets_no_lists(lines in proptest::collection::vec("[a-z ]{0,12}", 0..20)) {
            let blocks = render(&lines.join("\n"));
            prop_assert!(!blocks.iter().any(|b| matches!(b, DisplayBlock::BulletList(_))));
        }

        #[test]
        fn prop_blank_lines_never_render(lines in proptest::collection::vec(line_strategy(), 0..20)) {
            let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
            let blocks = render(&lines.join("\n"));
            let rendered: usize = blocks
                .iter()
                .map(|b| match b {
                    DisplayBlock::BulletList(items) => items.len(),
                    _ => 1,
                })
                .sum();
            prop_assert_eq!(rendered, non_blank);
        }

        #[test]
        fn prop_bullet_run_becomes_one_list(items in proptest::collection::vec("[a-z]{1,8}", 1..12)) {
            let content = format!(
                "intro\n{}\noutro",
                items.iter().map(|i| format!("• {}", i)).collect::<Vec<_>>().join("\n")
            );
            let blocks = render(&content);
            prop_assert_eq!(blocks.len(), 3);
            prop_assert_eq!(&blocks[1], &DisplayBlock::BulletList(items.clone()));
        }
    }
}
