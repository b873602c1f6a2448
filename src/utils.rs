/// Elements that never have content, and therefore never get an end tag.
///
/// See <https://html.spec.whatwg.org/#void-elements>
pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text content is not escaped when serialized.
pub(crate) fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

// having this be a macro keeps the format!() call and its allocation out of release builds
// entirely.
macro_rules! trace_log {
    ($($tt:tt)*) => {{
        #[cfg(debug_assertions)]
        crate::testutils::trace_log(&format!($($tt)*));
    }};
}

pub(crate) use trace_log;
