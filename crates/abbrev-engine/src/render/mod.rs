//! Serialisation of resolved trees (markup) and property lists (stylesheets).
//!
//! Output never starts with indentation: the first line continues wherever
//! the abbreviation started, and every following line is prefixed with
//! [`RenderContext::base_indent`].

mod markup;
mod stylesheet;

pub use markup::render_markup;
pub use stylesheet::render_stylesheet;

use abbrev_config::{AttributeQuotes, SelfClosingStyle, SyntaxProfile};

use crate::html;

/// Per-syntax formatting rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputProfile {
    pub self_closing_style: SelfClosingStyle,
    pub attribute_quotes: AttributeQuotes,
    /// Elements kept on the line of their siblings.
    pub inline_elements: &'static [&'static str],
    /// Inline siblings from which each one goes on its own line; 0 disables.
    pub inline_break: usize,
    pub single_line: bool,
}

impl Default for OutputProfile {
    fn default() -> Self {
        Self::from(&SyntaxProfile::default())
    }
}

impl From<&SyntaxProfile> for OutputProfile {
    fn from(profile: &SyntaxProfile) -> Self {
        Self {
            self_closing_style: profile.self_closing_style,
            attribute_quotes: profile.attribute_quotes,
            inline_elements: html::INLINE_ELEMENTS,
            inline_break: profile.inline_break,
            single_line: false,
        }
    }
}

impl OutputProfile {
    /// Profile for `language`, where XML dialects treat every element as block.
    pub fn for_language(language: &str, profile: &SyntaxProfile) -> Self {
        let mut output = Self::from(profile);
        if matches!(language, "xml" | "xsl") {
            output.inline_elements = &[];
        }
        output
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.inline_elements
            .iter()
            .any(|inline| inline.eq_ignore_ascii_case(name))
    }

    pub fn quote(&self) -> char {
        match self.attribute_quotes {
            AttributeQuotes::Double => '"',
            AttributeQuotes::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Indentation of the line the output is inserted on.
    pub base_indent: String,
    pub indent_unit: String,
    pub profile: OutputProfile,
    /// Stylesheet output for a `style="…"` attribute.
    pub inline: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            base_indent: String::new(),
            indent_unit: "\t".to_string(),
            profile: OutputProfile::default(),
            inline: false,
        }
    }
}
