//! Element categories used for implicit tag names and layout.

/// Elements laid out inline with their siblings.
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "applet", "b", "basefont", "bdi", "bdo", "big", "br", "button",
    "cite", "code", "data", "del", "dfn", "em", "font", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "map", "mark", "meter", "object", "output", "q", "s", "samp", "select",
    "small", "span", "strike", "strong", "sub", "sup", "textarea", "time", "tt", "u", "var",
    "wbr",
];

/// Elements that never have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

pub fn is_inline(name: &str) -> bool {
    INLINE_ELEMENTS
        .iter()
        .any(|inline| inline.eq_ignore_ascii_case(name))
}

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// Tag used for a nameless element (`.item`) under `parent`.
pub fn implicit_name(parent: Option<&str>) -> &'static str {
    let Some(parent) = parent else {
        return "div";
    };
    match parent.to_ascii_lowercase().as_str() {
        "ul" | "ol" => "li",
        "table" | "tbody" | "thead" | "tfoot" => "tr",
        "tr" => "td",
        "select" | "optgroup" => "option",
        "audio" | "video" | "picture" => "source",
        "map" => "area",
        p if is_inline(p) => "span",
        _ => "div",
    }
}
