//! Plain-text rendering of the gate, used by `--print` and `test_tou`.

use std::fmt::Write;

use crate::tou::{DisplayBlock, GateState, RenderedSection};

pub const HEADING: &str = "Terms of Use";
pub const LOADING_TEXT: &str = "Loading Terms of Use...";
pub const MAIL_LEAD: &str = "For questions about these terms, contact:";

pub fn render_blocks(out: &mut String, blocks: &[DisplayBlock], bullet: char) {
    for block in blocks {
        match block {
            DisplayBlock::Paragraph(text) => {
                let _ = writeln!(out, "{}", text);
            }
            DisplayBlock::BoldParagraph(text) => {
                let _ = writeln!(out, "**{}**", text);
            }
            DisplayBlock::MailLink(address) => {
                let _ = writeln!(out, "{} <mailto:{}>", MAIL_LEAD, address);
            }
            DisplayBlock::BulletList(items) => {
                for item in items {
                    let _ = writeln!(out, "  {} {}", bullet, item);
                }
            }
        }
    }
}

pub fn render_sections(sections: &[RenderedSection], bullet: char) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "## {}", section.title);
        render_blocks(&mut out, &section.blocks, bullet);
    }
    out
}

pub fn render_state(state: &GateState, agreed: bool, bullet: char) -> String {
    let mut out = format!("# {}\n\n", HEADING);
    match state {
        GateState::Loading => {
            let _ = writeln!(out, "{}", LOADING_TEXT);
        }
        GateState::Failed(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        GateState::Loaded(loaded) => {
            out.push_str(&render_sections(&loaded.sections, bullet));
            let mark = if agreed { 'x' } else { ' ' };
            let _ = writeln!(out, "\n[{}] {}", mark, loaded.agreement_text);
        }
    }
    out
}
