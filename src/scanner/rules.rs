//! Pattern tables behind discovery. Adding a heuristic means adding a row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scanner::model::RawNode;

/// Natively interactive candidates, queried in every document and shadow root.
pub const NATIVE_SELECTORS: &[&str] = &[
    "a[href]",
    "button",
    "input:not([type=\"hidden\"])",
    "select",
    "textarea",
    "summary",
    "[contenteditable=\"true\"]",
    "[role=\"button\"]",
    "[role=\"link\"]",
    "[role=\"checkbox\"]",
    "[role=\"radio\"]",
    "[role=\"switch\"]",
    "[role=\"tab\"]",
    "[role=\"menuitem\"]",
    "[role=\"combobox\"]",
    "[role=\"textbox\"]",
    "[role=\"searchbox\"]",
    "[aria-expanded]",
    "[onclick]",
    "[tabindex]:not([tabindex=\"-1\"])",
];

/// Attributes the collector copies onto each raw node.
pub const COLLECTED_ATTRIBUTES: &[&str] = &[
    "id",
    "name",
    "type",
    "role",
    "aria-label",
    "aria-expanded",
    "placeholder",
    "title",
    "href",
    "src",
    "class",
    "contenteditable",
    "data-testid",
    "data-cy",
    "data-test",
    "data-qa",
];

/// Test-automation attributes, in preference order.
pub const TEST_ATTRIBUTES: &[&str] = &["data-testid", "data-cy", "data-test", "data-qa"];

/// Tags whose `name` attribute identifies a form control.
pub const NAMED_FORM_TAGS: &[&str] = &["input", "select", "textarea"];

/// Input types distinctive enough to target by type alone.
pub const SEMANTIC_INPUT_TYPES: &[&str] = &[
    "email", "password", "tel", "search", "submit", "file", "date", "number",
];

/// Roles that are meaningful without an accessible name.
pub const STANDALONE_ROLES: &[&str] = &["searchbox", "textbox", "combobox"];

/// Class vocabulary worth targeting by.
pub const CLASS_VOCABULARY: &[&str] = &[
    "btn", "button", "form", "nav", "menu", "submit", "search", "login", "signin", "signup",
    "register", "primary", "secondary", "cta", "checkout", "cart", "close", "toggle", "tab",
    "link", "input", "field", "dropdown", "modal",
];

/// Ids that look framework- or build-generated and will not survive a re-render.
pub static AUTO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[0-9]+$",
        r"^[0-9a-f]{8,}$",
        r"^[0-9a-f]{8}-[0-9a-f]{4}-",
        r"^:r[0-9a-z]*:$",
        r"^(ember|react-|radix-|mui-|headlessui-|ng-|el-|rc_|downshift-|__next)",
        r"[_-][0-9a-f]{6,}$",
        r"[0-9]{4,}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Class tokens that look minified or emitted by CSS-in-JS tooling.
pub static GENERATED_CLASS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(css|sc|jsx|emotion|styled|jss|makestyles|tw)-",
        r"___",
        r"[0-9][a-z]|[a-z][0-9]",
    ]
    .iter()
    .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
    .collect()
});

/// CSS identifier safe to emit without escaping.
pub fn is_plain_ident(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn is_auto_generated_id(id: &str) -> bool {
    let lower = id.to_ascii_lowercase();
    AUTO_ID_PATTERNS.iter().any(|re| re.is_match(&lower))
}

/// A class token is meaningful when it is plain, not generated, and names a
/// vocabulary word.
pub fn is_meaningful_class(token: &str) -> bool {
    if !is_plain_ident(token) {
        return false;
    }
    if GENERATED_CLASS_PATTERNS.iter().any(|re| re.is_match(token)) {
        return false;
    }
    let lower = token.to_ascii_lowercase();
    CLASS_VOCABULARY.iter().any(|word| lower.contains(word))
}

/// Pointer-sweep hits are kept only at the outermost `cursor: pointer`
/// element. `cursor` is inherited, so every icon and label inside a clickable
/// card reports it too.
pub fn is_outermost_pointer(node: &RawNode) -> bool {
    !node.pointer_only || node.style.parent_cursor != "pointer"
}
