use element_discovery::exec::index::ElementIndex;
use element_discovery::scanner::model::{Bounds, ElementDescriptor, ElementRole, OriginZone};

fn descriptor(id: &str, role: ElementRole, locator: &str) -> ElementDescriptor {
    ElementDescriptor {
        id: id.to_string(),
        locator: locator.to_string(),
        tag: "input".to_string(),
        input_type: None,
        role,
        visible_text: String::new(),
        placeholder: None,
        aria_label: None,
        name: None,
        title: None,
        href: None,
        bounds: Bounds::default(),
        origin_zone: OriginZone::MainDocument,
    }
}

fn sample_index() -> ElementIndex {
    ElementIndex::from_descriptors(&[
        descriptor("e0", ElementRole::EmailInput, r#"input[type="email"]"#),
        descriptor("e1", ElementRole::Button, r#"button:text-is("Back")"#),
        descriptor("e2", ElementRole::Button, r#"button:text-is("Next")"#),
    ])
}

#[test]
fn known_id_resolves_to_its_locator() {
    let index = sample_index();
    assert_eq!(index.resolve("e0"), r#"input[type="email"]"#);
    assert_eq!(index.locator_for_id("e1"), Some(r#"button:text-is("Back")"#));
}

#[test]
fn role_token_resolves() {
    let index = sample_index();
    assert_eq!(index.resolve("email_input"), r#"input[type="email"]"#);
}

#[test]
fn shared_role_goes_to_the_last_descriptor() {
    let index = sample_index();
    assert_eq!(index.locator_for_role("button"), Some(r#"button:text-is("Next")"#));
}

#[test]
fn unknown_target_is_returned_unchanged() {
    let index = sample_index();
    assert_eq!(index.resolve("e99"), "e99");
    assert_eq!(index.resolve("#checkout .pay"), "#checkout .pay");
    assert_eq!(index.resolve(""), "");
}

#[test]
fn ids_win_over_role_tokens() {
    // A descriptor whose id collides with a role token
    let index = ElementIndex::from_descriptors(&[
        descriptor("link", ElementRole::Button, "#by-id"),
        descriptor("e1", ElementRole::Link, "#by-role"),
    ]);
    assert_eq!(index.resolve("link"), "#by-id");
}

#[test]
fn empty_index() {
    let index = ElementIndex::from_descriptors(&[]);
    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert_eq!(index.resolve("button"), "button");
    assert_eq!(sample_index().len(), 3);
}
