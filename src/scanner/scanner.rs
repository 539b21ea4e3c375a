use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::browser::driver::PageDriver;
use crate::error::ProbeError;
use crate::scanner::classifier::classify;
use crate::scanner::locator::synthesize;
use crate::scanner::model::{
    Bounds, ElementDescriptor, RawNode, RawSnapshot, ScanOutput, Viewport,
};
use crate::scanner::rules::{COLLECTED_ATTRIBUTES, NATIVE_SELECTORS, is_outermost_pointer};

/// In-page collector, invoked with the argument built by [`collector_args`].
pub const COLLECT_SCRIPT: &str = include_str!("collect.js");

/// Longest value kept for any descriptor string attribute.
const MAX_ATTR_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Raw candidates the collector may return
    #[serde(default = "default_max_raw")]
    pub max_raw: usize,

    /// Descriptors kept after filtering and dedup
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,

    /// Include non-native elements styled with `cursor: pointer`
    #[serde(default = "default_true")]
    pub pointer_sweep: bool,

    /// Elements inspected by the pointer sweep, per document
    #[serde(default = "default_max_sweep")]
    pub max_sweep: usize,

    /// Drop elements starting more than this many viewport heights down
    #[serde(default = "default_below_factor")]
    pub below_viewport_factor: f64,

    /// Drop elements starting more than this many viewport widths right
    #[serde(default = "default_right_factor")]
    pub right_viewport_factor: f64,

    #[serde(default = "default_max_text")]
    pub max_text_chars: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_raw: default_max_raw(),
            max_elements: default_max_elements(),
            pointer_sweep: true,
            max_sweep: default_max_sweep(),
            below_viewport_factor: default_below_factor(),
            right_viewport_factor: default_right_factor(),
            max_text_chars: default_max_text(),
        }
    }
}

fn default_max_raw() -> usize { 100 }
fn default_max_elements() -> usize { 80 }
fn default_true() -> bool { true }
fn default_max_sweep() -> usize { 3000 }
fn default_below_factor() -> f64 { 3.0 }
fn default_right_factor() -> f64 { 2.0 }
fn default_max_text() -> usize { 5000 }

/// Argument object handed to [`COLLECT_SCRIPT`].
pub fn collector_args(config: &ScanConfig) -> Value {
    json!({
        "selectors": NATIVE_SELECTORS,
        "attributes": COLLECTED_ATTRIBUTES,
        "maxRaw": config.max_raw,
        "pointerSweep": config.pointer_sweep,
        "maxSweep": config.max_sweep,
        "maxPathDepth": 8,
        "maxTextChars": MAX_ATTR_CHARS * 2,
        "maxPageText": config.max_text_chars,
    })
}

/// Collect, filter and describe the interactive elements of the current page.
pub fn scan(driver: &mut dyn PageDriver, config: &ScanConfig) -> Result<ScanOutput, ProbeError> {
    let raw = driver.evaluate(COLLECT_SCRIPT, collector_args(config))?;
    let snapshot: RawSnapshot = serde_json::from_value(raw).map_err(|e| ProbeError::JsonParse {
        context: "element collector output".into(),
        source: e,
    })?;

    debug!(raw = snapshot.nodes.len(), url = %snapshot.url, "collector returned");
    let output = process_snapshot(snapshot, config);
    info!(elements = output.elements.len(), url = %output.url, "scan complete");
    Ok(output)
}

/// Turn a raw snapshot into descriptors: pointer-descendant and visibility
/// filters, classification, locator synthesis, dedup on locator + text,
/// truncation, id assignment.
pub fn process_snapshot(snapshot: RawSnapshot, config: &ScanConfig) -> ScanOutput {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut elements = Vec::new();

    for node in snapshot
        .nodes
        .iter()
        .take(config.max_raw)
        .filter(|n| is_outermost_pointer(n))
        .filter(|n| is_visible(n, &snapshot.viewport, config))
    {
        if elements.len() >= config.max_elements {
            break;
        }

        let locator = synthesize(node);
        if locator.is_empty() {
            continue;
        }
        let text = truncate(&node.clean_text(), MAX_ATTR_CHARS);
        if !seen.insert((locator.clone(), text.clone())) {
            continue;
        }

        elements.push(describe(node, elements.len(), locator, text));
    }

    ScanOutput {
        url: snapshot.url,
        title: snapshot.title,
        elements,
        visible_text: truncate(snapshot.text.trim(), config.max_text_chars),
    }
}

/// Rendered, non-transparent, non-empty and within the scan window.
pub fn is_visible(node: &RawNode, viewport: &Viewport, config: &ScanConfig) -> bool {
    let rect = &node.rect;
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    if node.style.display == "none" || node.style.visibility == "hidden" {
        return false;
    }
    let opacity = node.style.opacity.trim().parse::<f64>().unwrap_or(1.0);
    if opacity <= 0.0 {
        return false;
    }
    if rect.y > viewport.height * config.below_viewport_factor {
        return false;
    }
    if rect.x > viewport.width * config.right_viewport_factor {
        return false;
    }
    true
}

fn describe(node: &RawNode, ordinal: usize, locator: String, text: String) -> ElementDescriptor {
    let attr = |name: &str| node.attr(name).map(|v| truncate(v, MAX_ATTR_CHARS));
    ElementDescriptor {
        id: format!("e{}", ordinal),
        locator,
        tag: node.tag.clone(),
        input_type: node.input_type(),
        role: classify(node),
        visible_text: text,
        placeholder: attr("placeholder"),
        aria_label: attr("aria-label"),
        name: attr("name"),
        title: attr("title"),
        href: attr("href"),
        bounds: Bounds {
            x: node.rect.x.round() as i64,
            y: node.rect.y.round() as i64,
            width: node.rect.width.ceil() as i64,
            height: node.rect.height.ceil() as i64,
        },
        origin_zone: node.origin_zone(),
    }
}

/// Char-boundary-safe truncation.
pub fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
