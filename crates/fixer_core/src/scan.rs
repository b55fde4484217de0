use std::time::{Duration, Instant};

use crate::graph::Graph;
use crate::hints::{extract_link_hints, looks_like_free_text};
use crate::wire::{LinkHints, Query};

pub const DEFAULT_SCAN_BUDGET: Duration = Duration::from_secs(3);

/// Widget names that always reference a model file.
const MODEL_WIDGETS: &[&str] = &[
    "ckpt_name",
    "vae_name",
    "lora_name",
    "clip_name",
    "clip_name1",
    "clip_name2",
    "clip_name3",
    "unet_name",
    "diffusion_model_name",
    "text_encoder_name",
    "text_encoder",
    "control_net_name",
    "style_model_name",
    "clip_vision_name",
    "upscale_model_name",
    "embedding_name",
    "audio_checkpoint_name",
    "audio_model_name",
    "latent_upscale_model_name",
];

/// Numbered or suffixed variants, e.g. `lora_name_2`, `clip_name4`.
const MODEL_WIDGET_PREFIXES: &[&str] = &["clip_name", "lora_name"];

/// Tokens that make a `*_name` widget a model reference.
const MODEL_NAME_TOKENS: &[&str] = &[
    "ckpt",
    "checkpoint",
    "lora",
    "vae",
    "unet",
    "diffusion",
    "text_encoder",
    "controlnet",
    "control_net",
    "upscale",
    "embedding",
    "model",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Wall-clock budget for the link-hint pass.
    pub budget: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            budget: DEFAULT_SCAN_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub queries: Vec<Query>,
    pub link_hints: LinkHints,
    /// The hint pass ran out of budget before visiting every node.
    pub truncated: bool,
}

impl ScanOutput {
    /// Nothing to send to the matcher.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphScanner {
    settings: ScanSettings,
}

impl GraphScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    /// Builds one query per model-reference widget and collects link hints.
    ///
    /// The budget bounds only the hint pass, which stops at the first node
    /// boundary past it and keeps what it has. The query pass is never cut
    /// short; a node it skipped would be a broken path left unreported.
    pub fn scan(&self, graph: &Graph) -> ScanOutput {
        let started = Instant::now();
        let budget = self.settings.budget;
        self.scan_with(graph, || started.elapsed() >= budget)
    }

    fn scan_with(&self, graph: &Graph, mut expired: impl FnMut() -> bool) -> ScanOutput {
        let mut output = ScanOutput::default();

        for node in &graph.nodes {
            let Some(widgets) = node.widgets.as_ref() else {
                continue;
            };
            for widget in widgets {
                if !is_model_widget(&widget.name) {
                    continue;
                }
                if let Some(value) = widget.text() {
                    output.queries.push(Query {
                        node_id: node.id,
                        widget_name: widget.name.clone(),
                        current_value: value.to_string(),
                        kind: widget.name.clone(),
                    });
                }
            }
        }

        for node in &graph.nodes {
            if expired() {
                output.truncated = true;
                break;
            }
            let Some(widgets) = node.widgets.as_ref() else {
                continue;
            };
            for value in widgets.iter().filter_map(|w| w.text()) {
                if looks_like_free_text(value) {
                    extract_link_hints(value, &mut output.link_hints);
                }
            }
        }

        output
    }
}

/// Exact names, numbered prefixes, then `*_name` widgets carrying a model token.
pub fn is_model_widget(name: &str) -> bool {
    if MODEL_WIDGETS.contains(&name) {
        return true;
    }
    let numbered = MODEL_WIDGET_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix).is_some_and(|rest| {
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '_')
        })
    });
    if numbered {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    lower.ends_with("_name") && MODEL_NAME_TOKENS.iter().any(|token| lower.contains(token))
}
