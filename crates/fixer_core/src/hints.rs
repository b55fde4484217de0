//! Download-link hints pulled out of free-text widgets (notes, markdown cells).
//!
//! The text is parsed as CommonMark. Each line of a block is a segment:
//! headings, fully emphasized segments and segments ending in a colon set
//! the current category, and every `[label](http...)` link is filed under
//! it.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use url::Url;

use crate::wire::LinkHints;

/// Category used until the first header line.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Header token -> model folder name. Anything else passes through.
const CATEGORY_REWRITES: &[(&str, &str)] = &[
    ("checkpoint", "checkpoints"),
    ("ckpt", "checkpoints"),
    ("lora", "loras"),
    ("text_encoder", "text_encoders"),
    ("diffusion_model", "diffusion_models"),
    ("control_net", "controlnet"),
    ("controlnets", "controlnet"),
    ("style_model", "style_models"),
    ("upscale_model", "upscale_models"),
    ("upscaler", "upscale_models"),
    ("embedding", "embeddings"),
    ("vaes", "vae"),
    ("unets", "unet"),
];

/// Whether a widget value is worth parsing for links.
pub fn looks_like_free_text(value: &str) -> bool {
    value.contains("http://") || value.contains("https://")
}

/// Scans one free-text value and merges its links into `hints`.
pub fn extract_link_hints(text: &str, hints: &mut LinkHints) {
    let mut category = UNCATEGORIZED.to_string();
    let mut segment = Segment::default();
    let mut link: Option<OpenLink> = None;
    let mut emphasis = 0usize;

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                link = Some(OpenLink {
                    url: dest_url.trim().to_string(),
                    label: String::new(),
                });
            }
            Event::End(TagEnd::Link) => {
                segment.has_link = true;
                if let Some(done) = link.take() {
                    let label = done.label.trim();
                    if !label.is_empty() && is_http_url(&done.url) {
                        hints
                            .entry(category.clone())
                            .or_default()
                            .insert(label.to_string(), done.url);
                    }
                }
            }
            Event::Start(Tag::Strong | Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Strong | TagEnd::Emphasis) => {
                emphasis = emphasis.saturating_sub(1);
            }
            Event::Text(fragment) | Event::Code(fragment) => {
                if let Some(open) = link.as_mut() {
                    open.label.push_str(&fragment);
                }
                segment.push_text(&fragment, emphasis > 0);
            }
            Event::Start(Tag::Heading { .. }) => {
                segment.finish(&mut category);
                segment.heading = true;
            }
            Event::SoftBreak | Event::HardBreak | Event::Start(_) | Event::End(_) => {
                segment.finish(&mut category);
            }
            _ => {}
        }
    }
    segment.finish(&mut category);
}

struct OpenLink {
    url: String,
    label: String,
}

/// One line of a block, or a whole heading.
#[derive(Default)]
struct Segment {
    text: String,
    heading: bool,
    emphasized_text: bool,
    plain_text: bool,
    has_link: bool,
}

impl Segment {
    fn push_text(&mut self, fragment: &str, emphasized: bool) {
        if !fragment.trim().is_empty() {
            if emphasized {
                self.emphasized_text = true;
            } else {
                self.plain_text = true;
            }
        }
        self.text.push_str(fragment);
    }

    /// The category named by this segment, if it reads as a header.
    fn header(&self) -> Option<String> {
        // A link or a bare URL makes the line content, not a header.
        if self.has_link || self.text.contains("://") {
            return None;
        }
        let text = self.text.trim();
        let colon = text.ends_with([':', '：']);
        let emphasized = self.emphasized_text && !self.plain_text;
        if !(self.heading || emphasized || colon) {
            return None;
        }
        let text = text.trim_end_matches([':', '：']).trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn finish(&mut self, category: &mut String) {
        if let Some(header) = self.header() {
            *category = canonical_category(&header);
        }
        *self = Segment::default();
    }
}

/// Lower-cases, joins whitespace with `_` and applies the rewrite table.
pub fn canonical_category(raw: &str) -> String {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    CATEGORY_REWRITES
        .iter()
        .find(|(from, _)| *from == normalized)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(normalized)
}

fn is_http_url(target: &str) -> bool {
    Url::parse(target)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
