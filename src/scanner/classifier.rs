use crate::scanner::model::{ElementRole, RawNode};

type RoleRule = (fn(&RawNode) -> bool, ElementRole);

/// Ordered role classification; first matching predicate wins.
pub const ROLE_RULES: &[RoleRule] = &[
    (is_toggle, ElementRole::Toggle),
    (is_checkbox, ElementRole::Checkbox),
    (is_radio, ElementRole::Radio),
    (is_password, ElementRole::PasswordInput),
    (is_email, ElementRole::EmailInput),
    (is_dropdown, ElementRole::Dropdown),
    (is_textarea, ElementRole::Textarea),
    (is_button_input, ElementRole::Button),
    (is_text_input, ElementRole::TextInput),
    (is_menu_item, ElementRole::MenuItem),
    (is_tab, ElementRole::Tab),
    (is_expandable, ElementRole::Expandable),
    (is_button, ElementRole::Button),
    (is_link, ElementRole::Link),
];

pub fn classify(node: &RawNode) -> ElementRole {
    ROLE_RULES
        .iter()
        .find(|(matches, _)| matches(node))
        .map(|(_, role)| *role)
        .unwrap_or(ElementRole::InteractiveGeneric)
}

fn has_role(node: &RawNode, roles: &[&str]) -> bool {
    node.aria_role()
        .map(|r| roles.contains(&r.as_str()))
        .unwrap_or(false)
}

fn input_type_is(node: &RawNode, types: &[&str]) -> bool {
    node.input_type()
        .map(|t| types.contains(&t.as_str()))
        .unwrap_or(false)
}

fn is_toggle(node: &RawNode) -> bool {
    has_role(node, &["switch"])
}

fn is_checkbox(node: &RawNode) -> bool {
    input_type_is(node, &["checkbox"]) || has_role(node, &["checkbox"])
}

fn is_radio(node: &RawNode) -> bool {
    input_type_is(node, &["radio"]) || has_role(node, &["radio"])
}

fn is_password(node: &RawNode) -> bool {
    input_type_is(node, &["password"])
}

fn is_email(node: &RawNode) -> bool {
    input_type_is(node, &["email"])
}

fn is_dropdown(node: &RawNode) -> bool {
    node.tag == "select" || has_role(node, &["combobox", "listbox"])
}

fn is_textarea(node: &RawNode) -> bool {
    node.tag == "textarea"
}

fn is_button_input(node: &RawNode) -> bool {
    input_type_is(node, &["submit", "button", "reset", "image"])
}

fn is_text_input(node: &RawNode) -> bool {
    node.tag == "input"
        || has_role(node, &["textbox", "searchbox"])
        || node
            .attr("contenteditable")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
}

fn is_menu_item(node: &RawNode) -> bool {
    has_role(node, &["menuitem", "menuitemcheckbox", "menuitemradio"])
}

fn is_tab(node: &RawNode) -> bool {
    has_role(node, &["tab"])
}

fn is_expandable(node: &RawNode) -> bool {
    node.tag == "summary" || node.attr("aria-expanded").is_some()
}

fn is_button(node: &RawNode) -> bool {
    node.tag == "button" || has_role(node, &["button"])
}

fn is_link(node: &RawNode) -> bool {
    (node.tag == "a" && node.attr("href").is_some()) || has_role(node, &["link"])
}
