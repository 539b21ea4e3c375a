use serde_json::json;

/// Evidence that a client-side framework has mounted.
#[derive(Debug, Clone, Copy)]
pub struct FrameworkMarker {
    pub framework: &'static str,
    /// `window` properties the framework defines once booted
    pub globals: &'static [&'static str],
    /// Selectors that only match after the framework rendered
    pub dom: &'static [&'static str],
}

pub const FRAMEWORK_MARKERS: &[FrameworkMarker] = &[
    FrameworkMarker {
        framework: "react",
        globals: &[],
        dom: &["[data-reactroot]", "#root > *"],
    },
    FrameworkMarker {
        framework: "next",
        globals: &["__NEXT_DATA__"],
        dom: &["#__next > *"],
    },
    FrameworkMarker {
        framework: "vue",
        globals: &["__VUE__"],
        dom: &["[data-v-app]", "#app > *"],
    },
    FrameworkMarker {
        framework: "nuxt",
        globals: &["__NUXT__"],
        dom: &["#__nuxt > *"],
    },
    FrameworkMarker {
        framework: "angular",
        globals: &["ng", "getAllAngularRootElements"],
        dom: &["[ng-version]"],
    },
    FrameworkMarker {
        framework: "svelte",
        globals: &[],
        dom: &["[class*=\"svelte-\"]"],
    },
    FrameworkMarker {
        framework: "ember",
        globals: &["Ember"],
        dom: &[".ember-application"],
    },
    FrameworkMarker {
        framework: "gatsby",
        globals: &[],
        dom: &["#___gatsby > *"],
    },
];

/// Placeholders that mean content is still on its way.
pub const LOADING_INDICATORS: &[&str] = &[
    "[aria-busy=\"true\"]",
    "[role=\"progressbar\"]",
    "[class*=\"spinner\"]",
    "[class*=\"skeleton\"]",
    "[class*=\"loading\"]",
    "[class*=\"loader\"]",
    "[class*=\"shimmer\"]",
];

/// Build the content-readiness predicate polled by the second readiness layer.
///
/// Truthy as soon as any one of these holds: a framework global exists, a
/// framework DOM marker matches, no loading indicator is visible, or the body
/// markup exceeds `min_body_bytes`.
pub fn content_ready_expression(min_body_bytes: usize) -> String {
    let globals: Vec<&str> = FRAMEWORK_MARKERS
        .iter()
        .flat_map(|m| m.globals.iter().copied())
        .collect();
    let dom: Vec<&str> = FRAMEWORK_MARKERS
        .iter()
        .flat_map(|m| m.dom.iter().copied())
        .collect();

    format!(
        r#"(() => {{
  const globals = {globals};
  const dom = {dom};
  const loaders = {loaders};
  const minBytes = {min_bytes};
  if (globals.some((g) => typeof window[g] !== 'undefined')) return true;
  if (dom.some((s) => {{ try {{ return !!document.querySelector(s); }} catch (e) {{ return false; }} }})) return true;
  const visible = (el) => {{
    const r = el.getBoundingClientRect();
    const cs = getComputedStyle(el);
    return r.width > 0 && r.height > 0 && cs.display !== 'none' && cs.visibility !== 'hidden' && cs.opacity !== '0';
  }};
  const busy = loaders.some((s) => Array.from(document.querySelectorAll(s)).some(visible));
  if (!busy && document.body) return true;
  return !!document.body && document.body.innerHTML.length > minBytes;
}})()"#,
        globals = json!(globals),
        dom = json!(dom),
        loaders = json!(LOADING_INDICATORS),
        min_bytes = min_body_bytes,
    )
}

/// Style sheet that stops in-flight animations and transitions.
pub const FREEZE_ANIMATIONS_CSS: &str = "*, *::before, *::after { \
animation-duration: 0s !important; animation-delay: 0s !important; \
transition-duration: 0s !important; transition-delay: 0s !important; \
scroll-behavior: auto !important; }";
