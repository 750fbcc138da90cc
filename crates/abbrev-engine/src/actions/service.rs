use std::ops::Range;

use abbrev_config::Config;
use abbrev_syntax::Abbreviation;
use log::{debug, warn};

use super::{AbbreviationPrompt, EditorHost, ExpandArgs, WrapArgs};
use crate::context::{EditorContext, Syntax, detect_context, extract_abbreviation};
use crate::editing::TextEdit;
use crate::filters::{FilterPipeline, FilterRegistry};
use crate::render::{OutputProfile, RenderContext, render_markup, render_stylesheet};
use crate::resolve::{ResolveOptions, resolve};
use crate::snippets::{SnippetRegistry, SnippetTable};

const WRAP_PROMPT: &str = "Enter Abbreviation";

/// Expands abbreviations with one configuration and snippet set.
///
/// Snippets are loaded when the service is built and again on
/// [`AbbreviationService::update_config`]; a broken snippets file leaves
/// the built-in tables in place.
pub struct AbbreviationService {
    config: Config,
    snippets: SnippetRegistry,
    filters: FilterPipeline,
}

impl Default for AbbreviationService {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AbbreviationService {
    pub fn new(config: Config) -> Self {
        Self::with_filters(config, FilterRegistry::default())
    }

    pub fn with_filters(config: Config, filters: FilterRegistry) -> Self {
        let snippets = load_snippets(&config);
        Self {
            config,
            snippets,
            filters: FilterPipeline::new(filters),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snippets(&self) -> &SnippetRegistry {
        &self.snippets
    }

    pub fn update_config(&mut self, config: Config) {
        self.snippets = load_snippets(&config);
        self.config = config;
    }

    /// Expand one abbreviation.
    ///
    /// `base_indent` prefixes every output line after the first. `wrapped`
    /// holds dedented lines to put inside the result.
    pub fn expand(
        &self,
        abbreviation: &str,
        context: &EditorContext,
        base_indent: &str,
        indent_unit: &str,
        wrapped: Option<&[String]>,
    ) -> String {
        let syntax_profile = self.config.profile_for(&context.language);
        let mut ctx = RenderContext {
            base_indent: base_indent.to_string(),
            indent_unit: indent_unit.to_string(),
            profile: OutputProfile::for_language(&context.language, &syntax_profile),
            inline: context.inline,
        };

        match context.syntax {
            Syntax::Stylesheet => {
                let snippets = self.snippets.stylesheet(&context.language);
                render_stylesheet(abbreviation, snippets, &ctx)
            }
            Syntax::Markup => {
                let snippets = self.snippets.markup(&context.language);
                let abbr = parse_markup(abbreviation, snippets);
                let mut tree = resolve(&abbr, snippets, &ResolveOptions { wrapped });

                let filters: Vec<String> = syntax_profile
                    .filters
                    .iter()
                    .chain(&abbr.filters)
                    .cloned()
                    .collect();
                self.filters.apply(&mut tree, &filters, &mut ctx.profile);

                render_markup(&tree, &ctx)
            }
        }
    }

    /// Expand the abbreviation at every selection.
    ///
    /// An empty selection expands the abbreviation ending at the cursor, a
    /// non-empty one expands its text. Returns `None` when no selection is
    /// in an expandable context, `Some(false)` when nothing changed, and
    /// otherwise whether the host applied the edits.
    pub fn expand_abbreviation<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        args: &ExpandArgs,
    ) -> Option<bool> {
        let text = host.text();
        let language = args.language.clone().unwrap_or_else(|| host.language_id());
        let indent_unit = host.indent_unit();

        let mut in_context = false;
        let mut edits = Vec::new();
        for selection in host.selections() {
            let Some(context) = detect_context(&text, selection.start, &language, &self.config)
            else {
                continue;
            };
            in_context = true;

            let Some((range, source)) = abbreviation_at(&text, &selection, context.syntax) else {
                debug!("No abbreviation at {selection:?}");
                continue;
            };
            let line = line_bounds(&text, range.start);
            let base_indent = leading_whitespace(&text[line]);

            let expanded = self.expand(&source, &context, base_indent, &indent_unit, None);
            if expanded == source {
                debug!("Expansion of {source:?} is unchanged");
                continue;
            }
            edits.push(TextEdit::new(range, expanded));
        }

        if !in_context {
            debug!("No expandable context for language {language}");
            return None;
        }
        if edits.is_empty() {
            return Some(false);
        }
        Some(host.apply_edits(drop_overlapping(edits)))
    }

    /// Wrap every selection with an abbreviation.
    ///
    /// An empty selection wraps its whole line without indentation. The
    /// wrapped text is dedented to its first line, placed inside the
    /// result, and the result re-indented to the first line's indentation.
    pub fn wrap_with_abbreviation<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        args: &WrapArgs,
        prompt: &dyn AbbreviationPrompt,
    ) -> bool {
        let language = host.language_id();
        if self.config.is_excluded(&language) {
            debug!("Language {language} is excluded");
            return false;
        }

        let answer = match &args.abbreviation {
            Some(abbreviation) => Some(abbreviation.clone()),
            None => prompt.ask(WRAP_PROMPT),
        };
        let Some(answer) = answer else {
            debug!("Wrap cancelled");
            return false;
        };
        let abbreviation = answer.trim();
        if abbreviation.is_empty() {
            return false;
        }

        let context = wrap_context(self.config.syntax_for(&language));
        let snippets = self.snippets.markup(&context.language);
        if let Err(error) = Abbreviation::parse(abbreviation)
            && snippets.get(abbreviation).is_none()
        {
            debug!("Cannot wrap with {abbreviation:?}: {error}");
            return false;
        }

        let text = host.text();
        let indent_unit = host.indent_unit();
        let mut edits = Vec::new();
        for selection in host.selections() {
            let Some(range) = wrap_range(&text, &selection) else {
                continue;
            };
            let line = line_bounds(&text, range.start);
            let base_indent = leading_whitespace(&text[line]);
            let lines = dedent(&text[range.clone()], base_indent);

            let expanded =
                self.expand(abbreviation, &context, base_indent, &indent_unit, Some(&lines));
            edits.push(TextEdit::new(range, expanded));
        }

        if edits.is_empty() {
            return false;
        }
        host.apply_edits(drop_overlapping(edits))
    }
}

fn load_snippets(config: &Config) -> SnippetRegistry {
    match config.load_snippets() {
        Ok(Some(overrides)) => SnippetRegistry::with_overrides(&overrides, &config.variables),
        Ok(None) => SnippetRegistry::builtin(&config.variables),
        Err(e) => {
            warn!("Falling back to built-in snippets: {e}");
            SnippetRegistry::builtin(&config.variables)
        }
    }
}

/// Keep one edit per region when selections share an abbreviation or a
/// line. Of edits starting together the longest wins.
fn drop_overlapping(mut edits: Vec<TextEdit>) -> Vec<TextEdit> {
    edits.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });

    let mut kept: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if let Some(last) = kept.last()
            && (edit.range.start < last.range.end || edit.range == last.range)
        {
            debug!("Dropping edit {:?} inside {:?}", edit.range, last.range);
            continue;
        }
        kept.push(edit);
    }
    kept
}

/// Parse markup, trying whole snippet keys such as `ul+` and falling back
/// to a literal tag.
fn parse_markup(abbreviation: &str, snippets: &SnippetTable) -> Abbreviation {
    let error = match Abbreviation::parse(abbreviation) {
        Ok(abbr) => return abbr,
        Err(error) => error,
    };

    if let Some(abbr) = snippets
        .get(abbreviation)
        .and_then(|template| Abbreviation::parse(template).ok())
    {
        return abbr;
    }
    debug!("Expanding {abbreviation:?} as a literal tag: {error}");
    Abbreviation::literal(abbreviation)
}

/// Wrapping always produces markup, as `html` unless the language is a
/// markup language itself.
fn wrap_context(language: &str) -> EditorContext {
    let language = match Syntax::of(language) {
        Some(Syntax::Markup) => language,
        _ => "html",
    };
    EditorContext {
        syntax: Syntax::Markup,
        language: language.to_string(),
        inline: false,
    }
}

/// The abbreviation for a selection and the range it replaces.
fn abbreviation_at(
    text: &str,
    selection: &Range<usize>,
    syntax: Syntax,
) -> Option<(Range<usize>, String)> {
    if !selection.is_empty() {
        let source = text.get(selection.clone())?;
        return Some((selection.clone(), source.to_string()));
    }

    let cursor = selection.start;
    text.get(..cursor)?;
    let line = line_bounds(text, cursor);
    let (range, source) = extract_abbreviation(&text[line.start..cursor], cursor - line.start, syntax)?;
    Some((line.start + range.start..line.start + range.end, source))
}

/// The selection without surrounding whitespace, or the current line's
/// content for a cursor.
fn wrap_range(text: &str, selection: &Range<usize>) -> Option<Range<usize>> {
    text.get(selection.clone())?;
    let range = if selection.is_empty() {
        line_bounds(text, selection.start)
    } else {
        selection.clone()
    };

    let content = &text[range.clone()];
    let start = range.start + (content.len() - content.trim_start().len());
    let end = range.start + content.trim_end().len();
    (start < end).then_some(start..end)
}

fn dedent(content: &str, indent: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.strip_prefix(indent)
                .unwrap_or_else(|| line.trim_start())
                .to_string()
        })
        .collect()
}

/// Byte range of the line containing `offset`, without its line break.
fn line_bounds(text: &str, offset: usize) -> Range<usize> {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

fn leading_whitespace(line: &str) -> &str {
    let rest = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - rest.len()]
}
