//! Where in a document an abbreviation is being expanded, and what it is.
//!
//! Markup documents embed other syntaxes: `<style>` bodies and `style="…"`
//! attributes are stylesheets, `<script>` bodies are markup only for
//! template types. The region at the cursor is found by scanning the tags
//! that precede it.

use std::ops::Range;
use std::sync::OnceLock;

use abbrev_config::Config;
use log::debug;
use regex::Regex;

const MARKUP_LANGUAGES: &[&str] = &[
    "html",
    "xml",
    "xsl",
    "xhtml",
    "vue",
    "svelte",
    "php",
    "handlebars",
    "jsx",
    "tsx",
];

const STYLESHEET_LANGUAGES: &[&str] = &["css", "scss", "less", "sass", "stylus"];

/// `<script type="…">` values whose body is markup.
const TEMPLATE_SCRIPT_TYPES: &[&str] = &[
    "text/html",
    "text/x-template",
    "text/ng-template",
    "text/x-handlebars-template",
    "text/x-jquery-tmpl",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Markup,
    Stylesheet,
}

impl Syntax {
    pub fn of(language: &str) -> Option<Self> {
        if MARKUP_LANGUAGES.contains(&language) {
            Some(Self::Markup)
        } else if STYLESHEET_LANGUAGES.contains(&language) {
            Some(Self::Stylesheet)
        } else {
            None
        }
    }
}

/// The syntax in effect at a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContext {
    pub syntax: Syntax,
    /// Language whose snippets and profile apply: the document's (mapped)
    /// language, or `html`/`css` inside an embedded region.
    pub language: String,
    /// Inside a `style="…"` attribute.
    pub inline: bool,
}

impl EditorContext {
    fn markup(language: &str) -> Self {
        Self {
            syntax: Syntax::Markup,
            language: language.to_string(),
            inline: false,
        }
    }

    fn stylesheet(language: &str, inline: bool) -> Self {
        Self {
            syntax: Syntax::Stylesheet,
            language: language.to_string(),
            inline,
        }
    }
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)(>?)"#)
            .expect("Invalid tag regex")
    })
}

fn style_attribute_regex() -> &'static Regex {
    static STYLE_ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    STYLE_ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\sstyle\s*=\s*(?:"[^"]*|'[^']*)$"#).expect("Invalid style attribute regex")
    })
}

fn type_attribute_regex() -> &'static Regex {
    static TYPE_ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    TYPE_ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\stype\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("Invalid type attribute regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Markup,
    Style,
    Script,
    TemplateScript,
}

/// Decide how text typed at byte `offset` of `text` expands.
///
/// Returns `None` for excluded or unsupported languages and for places
/// where nothing expands: inside an open tag (outside its `style`
/// attribute) and inside script bodies.
pub fn detect_context(
    text: &str,
    offset: usize,
    language: &str,
    config: &Config,
) -> Option<EditorContext> {
    if config.is_excluded(language) {
        debug!("Language {language} is excluded");
        return None;
    }

    let syntax = config.syntax_for(language);
    match Syntax::of(syntax) {
        Some(Syntax::Stylesheet) => Some(EditorContext::stylesheet(syntax, false)),
        Some(Syntax::Markup) => markup_context(text, offset, syntax),
        None => {
            debug!("No abbreviation syntax for language {language}");
            None
        }
    }
}

fn markup_context(text: &str, offset: usize, language: &str) -> Option<EditorContext> {
    let prefix = text.get(..offset)?;
    let lower = prefix.to_ascii_lowercase();

    let mut region = Region::Markup;
    let mut pos = 0;
    while pos < prefix.len() {
        if let Some(closing) = match region {
            Region::Style => Some("</style"),
            Region::Script => Some("</script"),
            Region::Markup | Region::TemplateScript => None,
        } {
            // Raw text: only the closing tag ends the region
            let Some(found) = lower[pos..].find(closing) else {
                break;
            };
            pos += found + closing.len();
            match prefix[pos..].find('>') {
                Some(end) => {
                    pos += end + 1;
                    region = Region::Markup;
                }
                None => {
                    debug!("Cursor is inside a closing tag");
                    return None;
                }
            }
            continue;
        }

        let Some(captures) = tag_regex().captures_at(prefix, pos) else {
            break;
        };
        let Some(tag) = captures.get(0) else {
            break;
        };
        let is_closing = !captures[1].is_empty();
        let name = captures[2].to_ascii_lowercase();

        if captures[4].is_empty() {
            // The tag is still open at the cursor
            let tag_text = &prefix[tag.start()..];
            if !is_closing && style_attribute_regex().is_match(tag_text) {
                return Some(EditorContext::stylesheet("css", true));
            }
            debug!("Cursor is inside an open tag");
            return None;
        }
        pos = tag.end();

        let attributes = &captures[3];
        let self_closing = attributes.trim_end().ends_with('/');
        region = match (is_closing, name.as_str(), region) {
            (false, "style", _) if !self_closing => Region::Style,
            (false, "script", _) if !self_closing => {
                if is_template_script(attributes) {
                    Region::TemplateScript
                } else {
                    Region::Script
                }
            }
            (true, "script", Region::TemplateScript) => Region::Markup,
            (_, _, current) => current,
        };
    }

    match region {
        Region::Markup => Some(EditorContext::markup(language)),
        Region::TemplateScript => Some(EditorContext::markup("html")),
        Region::Style => Some(EditorContext::stylesheet("css", false)),
        Region::Script => {
            debug!("Cursor is inside a script body");
            None
        }
    }
}

fn is_template_script(attributes: &str) -> bool {
    type_attribute_regex()
        .captures(attributes)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .is_some_and(|value| {
            let value = value.as_str().trim();
            TEMPLATE_SCRIPT_TYPES
                .iter()
                .any(|t| t.eq_ignore_ascii_case(value))
        })
}

/// Find the abbreviation that ends at byte `column` of `line`.
///
/// Scans backwards while characters can belong to an abbreviation. Text
/// inside `[…]` and `{…}` is taken as is. The scan stops at whitespace and,
/// in markup, at a `>` that closes an HTML tag. A trailing `>` or `^` means
/// the abbreviation is unfinished. A trailing `+` is kept since snippet
/// keys such as `ul+` end with it.
///
/// Returns the byte range of the abbreviation in `line` and its text.
pub fn extract_abbreviation(
    line: &str,
    column: usize,
    syntax: Syntax,
) -> Option<(Range<usize>, String)> {
    let prefix = line.get(..column)?;

    let mut start = prefix.len();
    let mut brackets = 0usize;
    let mut braces = 0usize;
    let mut parens = 0usize;
    let mut quote: Option<char> = None;

    for (i, ch) in prefix.char_indices().rev() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            start = i;
            continue;
        }

        match ch {
            ']' if syntax == Syntax::Markup && braces == 0 => brackets += 1,
            '[' if brackets > 0 && braces == 0 => brackets -= 1,
            '}' if syntax == Syntax::Markup && brackets == 0 => braces += 1,
            '{' if braces > 0 => braces -= 1,
            '"' | '\'' if brackets > 0 => quote = Some(ch),
            _ if brackets > 0 || braces > 0 => {}
            ')' if syntax == Syntax::Markup => parens += 1,
            '(' if parens > 0 => parens -= 1,
            '>' if closes_tag(&prefix[..i]) => break,
            _ if is_abbreviation_char(ch, syntax) => {}
            _ => break,
        }
        start = i;
    }

    let text = &prefix[start..];
    if text.is_empty() || brackets > 0 || braces > 0 {
        return None;
    }
    if syntax == Syntax::Markup && text.ends_with(['>', '^']) {
        return None;
    }
    Some((start..column, text.to_string()))
}

/// Whether a `>` preceded by `before` ends an HTML tag.
fn closes_tag(before: &str) -> bool {
    before
        .rfind(['<', '>'])
        .is_some_and(|i| before.as_bytes()[i] == b'<')
}

fn is_abbreviation_char(ch: char, syntax: Syntax) -> bool {
    if ch.is_alphanumeric() {
        return true;
    }
    match syntax {
        Syntax::Markup => "#.*$@!:-_+^>/|=%\\".contains(ch),
        Syntax::Stylesheet => "-:!#.%+@$".contains(ch),
    }
}
