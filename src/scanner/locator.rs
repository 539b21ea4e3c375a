use url::Url;

use crate::scanner::model::{RawNode, ScopeKind};
use crate::scanner::rules::{
    NAMED_FORM_TAGS, SEMANTIC_INPUT_TYPES, STANDALONE_ROLES, TEST_ATTRIBUTES,
    is_auto_generated_id, is_meaningful_class, is_plain_ident,
};

/// Longest aria-label or title still used verbatim.
const MAX_LABEL_CHARS: usize = 60;

/// Longest visible text still used as a text locator.
const MAX_TEXT_CHARS: usize = 40;

/// Deepest structural path emitted by the fallback rule.
const MAX_PATH_DEPTH: usize = 5;

type LocatorRule = (&'static str, fn(&RawNode) -> Option<String>);

/// Locator priority ladder, most durable first. The last rule always matches.
pub const LOCATOR_RULES: &[LocatorRule] = &[
    ("test-attribute", by_test_attribute),
    ("id", by_id),
    ("aria-label", by_aria_label),
    ("name", by_name),
    ("input", by_input),
    ("title", by_title),
    ("text", by_text),
    ("role-text", by_role_and_text),
    ("role", by_standalone_role),
    ("class", by_class),
    ("href", by_href),
    ("structural-path", by_structural_path),
];

const FRAME_RULES: &[LocatorRule] = &[
    ("test-attribute", by_test_attribute),
    ("frame-id", frame_by_id),
    ("frame-name", frame_by_name),
    ("title", by_title),
    ("frame-src", frame_by_src),
    ("structural-path", by_structural_path),
];

/// Synthesize a durable locator for a raw node, qualified for any shadow or
/// frame boundaries it sits behind.
pub fn synthesize(node: &RawNode) -> String {
    synthesize_with_rule(node).1
}

/// Same as [`synthesize`], also naming the ladder rule that produced the
/// innermost part.
pub fn synthesize_with_rule(node: &RawNode) -> (&'static str, String) {
    let (rule, inner) = first_match(LOCATOR_RULES, node);

    let mut qualified = String::new();
    for hop in &node.scope {
        match hop.kind {
            ScopeKind::Shadow => {
                qualified.push_str(&first_match(LOCATOR_RULES, &hop.host).1);
                qualified.push_str(" >> ");
            }
            ScopeKind::Frame => {
                qualified.push_str(&first_match(FRAME_RULES, &hop.host).1);
                qualified.push_str(" >> internal:control=enter-frame >> ");
            }
        }
    }
    qualified.push_str(&inner);

    (rule, qualified)
}

fn first_match(rules: &[LocatorRule], node: &RawNode) -> (&'static str, String) {
    rules
        .iter()
        .find_map(|(name, rule)| rule(node).map(|loc| (*name, loc)))
        .unwrap_or_else(|| ("tag", node.tag.clone()))
}

/// Double-quoted selector string with backslashes and quotes escaped.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

fn attr_locator(name: &str, value: &str) -> String {
    format!("[{}={}]", name, quote(value))
}

fn short(value: &str, limit: usize) -> Option<&str> {
    (value.chars().count() < limit).then_some(value)
}

// ============================================================================
// Ladder rules
// ============================================================================

fn by_test_attribute(node: &RawNode) -> Option<String> {
    TEST_ATTRIBUTES
        .iter()
        .find_map(|attr| node.attr(attr).map(|v| attr_locator(attr, v)))
}

fn by_id(node: &RawNode) -> Option<String> {
    let id = node.attr("id")?;
    if is_auto_generated_id(id) {
        return None;
    }
    if is_plain_ident(id) {
        Some(format!("#{}", id))
    } else {
        Some(attr_locator("id", id))
    }
}

fn by_aria_label(node: &RawNode) -> Option<String> {
    let label = short(node.attr("aria-label")?, MAX_LABEL_CHARS)?;
    Some(attr_locator("aria-label", label))
}

fn by_name(node: &RawNode) -> Option<String> {
    if !NAMED_FORM_TAGS.contains(&node.tag.as_str()) {
        return None;
    }
    let name = node.attr("name")?;
    Some(format!("{}{}", node.tag, attr_locator("name", name)))
}

fn by_input(node: &RawNode) -> Option<String> {
    let input_type = node.input_type()?;
    if SEMANTIC_INPUT_TYPES.contains(&input_type.as_str()) {
        return Some(format!("input{}", attr_locator("type", &input_type)));
    }
    let placeholder = node.attr("placeholder")?;
    Some(format!("input{}", attr_locator("placeholder", placeholder)))
}

fn by_title(node: &RawNode) -> Option<String> {
    let title = short(node.attr("title")?, MAX_LABEL_CHARS)?;
    Some(attr_locator("title", title))
}

/// Whole-text match, so "Sign in" never resolves to "Sign in with Google".
fn by_text(node: &RawNode) -> Option<String> {
    let text = node.clean_text();
    if text.is_empty() || short(&text, MAX_TEXT_CHARS).is_none() {
        return None;
    }
    let scope = match (node.tag.as_str(), node.aria_role().as_deref()) {
        ("button", _) => "button".to_string(),
        ("a", _) => "a".to_string(),
        (_, Some(role @ ("button" | "link"))) => attr_locator("role", role),
        _ => return None,
    };
    Some(format!("{}:text-is({})", scope, quote(&text)))
}

fn by_role_and_text(node: &RawNode) -> Option<String> {
    let role = node.aria_role()?;
    let text = node.clean_text();
    if text.is_empty() || short(&text, MAX_TEXT_CHARS).is_none() {
        return None;
    }
    // `s` makes the name match exact and case-sensitive
    Some(format!("role={}[name={}s]", role, quote(&text)))
}

fn by_standalone_role(node: &RawNode) -> Option<String> {
    let role = node.aria_role()?;
    STANDALONE_ROLES
        .contains(&role.as_str())
        .then(|| attr_locator("role", &role))
}

fn by_class(node: &RawNode) -> Option<String> {
    let classes = node.attr("class")?;
    classes
        .split_whitespace()
        .find(|token| is_meaningful_class(token))
        .map(|token| format!("{}.{}", node.tag, token))
}

fn by_href(node: &RawNode) -> Option<String> {
    if node.tag != "a" {
        return None;
    }
    let path = href_path(node.attr("href")?)?;
    Some(format!("a[href*={}]", quote(&path)))
}

fn by_structural_path(node: &RawNode) -> Option<String> {
    if node.path.is_empty() {
        return Some(node.tag.clone());
    }
    let start = node.path.len().saturating_sub(MAX_PATH_DEPTH);
    let chain = node.path[start..]
        .iter()
        .map(|seg| match seg.nth {
            Some(n) => format!("{}:nth-of-type({})", seg.tag, n),
            None => seg.tag.clone(),
        })
        .collect::<Vec<_>>()
        .join(" > ");
    Some(chain)
}

/// Path component of a link, with query and fragment dropped. Links that do
/// not leave the current document yield nothing.
pub fn href_path(href: &str) -> Option<String> {
    let base = Url::parse("http://localhost/").ok()?;
    let parsed = base.join(href).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let path = parsed.path();
    if path.is_empty() || path == "/" {
        return None;
    }
    Some(path.to_string())
}

// ============================================================================
// Frame host rules
// ============================================================================

fn frame_by_id(node: &RawNode) -> Option<String> {
    let id = node.attr("id")?;
    if is_auto_generated_id(id) {
        return None;
    }
    Some(format!("{}{}", node.tag, attr_locator("id", id)))
}

fn frame_by_name(node: &RawNode) -> Option<String> {
    node.attr("name")
        .map(|name| format!("{}{}", node.tag, attr_locator("name", name)))
}

fn frame_by_src(node: &RawNode) -> Option<String> {
    let path = href_path(node.attr("src")?)?;
    Some(format!("{}[src*={}]", node.tag, quote(&path)))
}
