use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use super::RenderContext;
use crate::snippets::SnippetTable;

/// Properties whose bare numbers take no unit.
const UNITLESS: &[&str] = &[
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "widows",
    "z-index",
    "zoom",
];

const KEYWORDS: &[(&str, &str)] = &[
    ("a", "auto"),
    ("b", "block"),
    ("bb", "border-box"),
    ("c", "center"),
    ("d", "dashed"),
    ("dt", "dotted"),
    ("f", "flex"),
    ("h", "hidden"),
    ("i", "inline"),
    ("ib", "inline-block"),
    ("l", "left"),
    ("n", "none"),
    ("p", "pointer"),
    ("r", "right"),
    ("s", "solid"),
    ("t", "top"),
    ("u", "uppercase"),
    ("v", "visible"),
];

fn property_regex() -> &'static Regex {
    static PROPERTY_REGEX: OnceLock<Regex> = OnceLock::new();
    PROPERTY_REGEX.get_or_init(|| {
        Regex::new(r"^(?P<name>[a-zA-Z]+(?:-[a-zA-Z]+)*)(?P<value>.*)$")
            .expect("Invalid property regex")
    })
}

fn value_regex() -> &'static Regex {
    static VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
    VALUE_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<num>-?(?:\d+(?:\.\d*)?|\.\d+))(?P<unit>[a-zA-Z%]*)|#(?P<hex>[0-9a-fA-F]{1,6})|(?P<word>[a-zA-Z]+))",
        )
        .expect("Invalid value regex")
    })
}

/// Expand a `+`-separated list of property abbreviations into declarations.
///
/// Parts that cannot be read as a property are emitted unchanged.
pub fn render_stylesheet(abbreviation: &str, snippets: &SnippetTable, ctx: &RenderContext) -> String {
    let separator = if ctx.inline || ctx.profile.single_line {
        " ".to_string()
    } else {
        format!("\n{}", ctx.base_indent)
    };

    abbreviation
        .split('+')
        .filter(|part| !part.is_empty())
        .map(|part| expand_property(part, snippets))
        .collect::<Vec<_>>()
        .join(&separator)
}

fn expand_property(part: &str, snippets: &SnippetTable) -> String {
    let (body, important) = match part.strip_suffix('!') {
        Some(body) => (body, true),
        None => (part, false),
    };

    if let Some(template) = exact_snippet(body, snippets) {
        let (property, value) = template.split_once(':').unwrap_or((template, ""));
        return declaration(property, value, important);
    }

    let Some(captures) = property_regex().captures(body) else {
        return part.to_string();
    };
    let property = resolve_property(&captures["name"], snippets);
    let rest = &captures["value"];

    let value = match rest.strip_prefix(':') {
        Some(keyword) => expand_keyword(keyword).to_string(),
        None => match parse_values(rest, &property) {
            Some(value) => value,
            None => return part.to_string(),
        },
    };

    declaration(&property, &value, important)
}

fn declaration(property: &str, value: &str, important: bool) -> String {
    let important = if important { " !important" } else { "" };
    format!("{property}: {value}{important};")
}

/// `d:n` by key, or `dn` as `d:n` with the colon left out.
fn exact_snippet<'a>(body: &str, snippets: &'a SnippetTable) -> Option<&'a str> {
    if let Some(template) = snippets.get(body) {
        return Some(template);
    }
    if body.contains(':') || body.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    snippets
        .iter()
        .find(|(key, _)| key.contains(':') && key.replace(':', "") == body)
        .map(|(_, template)| template)
}

fn resolve_property(name: &str, snippets: &SnippetTable) -> String {
    if let Some(template) = snippets.get(name) {
        let property = template.split_once(':').map_or(template, |(p, _)| p);
        return property.to_string();
    }

    let properties: BTreeSet<&str> = snippets
        .iter()
        .map(|(_, template)| template.split_once(':').map_or(template, |(p, _)| p))
        .collect();
    if properties.contains(name) {
        return name.to_string();
    }

    properties
        .iter()
        .filter_map(|candidate| fuzzy_score(name, candidate).map(|score| (score, *candidate)))
        .max_by_key(|(score, _)| *score)
        .map_or_else(|| name.to_string(), |(_, property)| property.to_string())
}

/// Score how well `abbr` abbreviates `candidate`: every character must
/// appear in order, starting with the first. Word starts score highest,
/// consecutive runs next; shorter candidates win ties.
fn fuzzy_score(abbr: &str, candidate: &str) -> Option<i64> {
    let target: Vec<char> = candidate.chars().collect();
    let mut chars = abbr.chars();
    if chars.next()? != *target.first()? {
        return None;
    }

    let mut score: i64 = 10;
    let mut prev = 0;
    for ch in chars {
        let found = (prev + 1..target.len()).find(|&i| target[i] == ch)?;
        score += if target[found - 1] == '-' {
            10
        } else if found == prev + 1 {
            5
        } else {
            1
        };
        prev = found;
    }

    Some(score * 100 - target.len() as i64)
}

fn expand_keyword(keyword: &str) -> &str {
    KEYWORDS
        .iter()
        .find(|(short, _)| *short == keyword)
        .map_or(keyword, |(_, full)| full)
}

/// Dash-separated values: `10-20`, `-10`, `10--20`, `1-s#000`.
fn parse_values(values: &str, property: &str) -> Option<String> {
    let mut out = Vec::new();
    let mut rest = values;
    let mut first = true;

    while !rest.is_empty() {
        if !first && let Some(stripped) = rest.strip_prefix('-') {
            rest = stripped;
        }
        first = false;

        let captures = value_regex().captures(rest)?;
        let matched = captures.get(0)?;
        if matched.as_str().is_empty() {
            return None;
        }

        if let Some(number) = captures.name("num") {
            let unit = captures.name("unit").map_or("", |m| m.as_str());
            out.push(number_value(number.as_str(), unit, property));
        } else if let Some(hex) = captures.name("hex") {
            out.push(hex_color(hex.as_str()));
        } else if let Some(word) = captures.name("word") {
            out.push(expand_keyword(word.as_str()).to_string());
        }

        rest = &rest[matched.end()..];
    }

    Some(out.join(" "))
}

fn number_value(number: &str, unit: &str, property: &str) -> String {
    let number = number.strip_suffix('.').unwrap_or(number);
    let unit = match unit {
        "" if UNITLESS.contains(&property) => "",
        "" if number.parse::<f64>().is_ok_and(|n| n == 0.0) => "",
        "" if number.contains('.') => "em",
        "" => "px",
        "p" => "%",
        "e" => "em",
        "r" => "rem",
        "x" => "ex",
        other => other,
    };
    format!("{number}{unit}")
}

fn hex_color(hex: &str) -> String {
    let hex = hex.to_ascii_lowercase();
    match hex.len() {
        1 => format!("#{}", hex.repeat(3)),
        2 => format!("#{}", hex.repeat(3)),
        _ => format!("#{hex}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::SnippetRegistry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(input: &str) -> String {
        let registry = SnippetRegistry::default();
        render_stylesheet(input, registry.stylesheet("css"), &RenderContext::default())
    }

    #[rstest]
    #[case("m10", "margin: 10px;")]
    #[case("m10-20", "margin: 10px 20px;")]
    #[case("m-10", "margin: -10px;")]
    #[case("m10--20", "margin: 10px -20px;")]
    #[case("m0", "margin: 0;")]
    #[case("m1.5", "margin: 1.5em;")]
    #[case("w100p", "width: 100%;")]
    #[case("fz2r", "font-size: 2rem;")]
    #[case("p2e", "padding: 2em;")]
    #[case("h3x", "height: 3ex;")]
    #[case("h50vh", "height: 50vh;")]
    #[case("lh1.5", "line-height: 1.5;")]
    #[case("z10", "z-index: 10;")]
    #[case("op0.5", "opacity: 0.5;")]
    #[case("dn", "display: none;")]
    #[case("d:n", "display: none;")]
    #[case("d:xyz", "display: xyz;")]
    #[case("pos:a", "position: absolute;")]
    #[case("c#f", "color: #fff;")]
    #[case("c#FC0", "color: #fc0;")]
    #[case("bgc#ab", "background-color: #ababab;")]
    #[case("bd1-s#000", "border: 1px solid #000;")]
    #[case("m:a", "margin: auto;")]
    #[case("m10-a", "margin: 10px auto;")]
    #[case("m10!", "margin: 10px !important;")]
    #[case("m", "margin: ;")]
    #[case("margin5", "margin: 5px;")]
    #[case("bdrs4", "border-radius: 4px;")]
    fn properties(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(render(input), expected);
    }

    #[test]
    fn fuzzy_property_names() {
        assert_eq!(render("brad5"), "border-radius: 5px;");
        assert_eq!(render("marg5"), "margin: 5px;");
    }

    #[test]
    fn unknown_property_is_kept() {
        assert_eq!(render("qq3"), "qq: 3px;");
    }

    #[test]
    fn unreadable_part_is_unchanged() {
        assert_eq!(render(".boo"), ".boo");
        assert_eq!(render("m10_x"), "m10_x");
    }

    #[test]
    fn multiple_properties_follow_base_indent() {
        let registry = SnippetRegistry::default();
        let ctx = RenderContext {
            base_indent: "\t\t".to_string(),
            ..RenderContext::default()
        };
        assert_eq!(
            render_stylesheet("p10+m5+dn", registry.stylesheet("css"), &ctx),
            "padding: 10px;\n\t\tmargin: 5px;\n\t\tdisplay: none;"
        );
    }

    #[test]
    fn inline_properties_share_a_line() {
        let registry = SnippetRegistry::default();
        let ctx = RenderContext {
            inline: true,
            ..RenderContext::default()
        };
        assert_eq!(
            render_stylesheet("m10+p5", registry.stylesheet("css"), &ctx),
            "margin: 10px; padding: 5px;"
        );
    }

    #[test]
    fn fuzzy_prefers_word_starts() {
        let by_word_start = fuzzy_score("fxd", "flex-direction").unwrap();
        let scattered = fuzzy_score("fxd", "fixed").unwrap();
        assert!(by_word_start > scattered);
        assert_eq!(fuzzy_score("x", "margin"), None);
    }
}
