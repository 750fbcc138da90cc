use abbrev_config::Config;
use abbrev_engine::{AbbreviationService, Document, ExpandArgs, WrapArgs};
use pretty_assertions::assert_eq;

fn sample() -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/sample.html",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// Offset just after `needle`, which must be unique in `text`.
fn after(text: &str, needle: &str) -> usize {
    let start = text.find(needle).unwrap();
    assert_eq!(text.matches(needle).count(), 1, "{needle:?} is not unique");
    start + needle.len()
}

/// `sample.html` with a cursor after each needle. A trailing newline in a
/// needle only disambiguates; the cursor goes before it.
fn sample_doc(cursors: &[&str]) -> Document {
    let text = sample();
    let mut doc = Document::from_bytes(text.as_bytes(), "html").unwrap();
    doc.set_selections(
        cursors
            .iter()
            .map(|needle| {
                let offset = after(&text, needle) - (needle.len() - needle.trim_end().len());
                offset..offset
            })
            .collect(),
    );
    doc
}

fn expand(doc: &mut Document) -> Option<bool> {
    AbbreviationService::default().expand_abbreviation(doc, &ExpandArgs::default())
}

/// Expand `sample.html` at the end of `needle` and check that `from`
/// became `to`.
fn assert_expands(needle: &str, from: &str, to: &str) {
    let mut doc = sample_doc(&[needle]);
    assert_eq!(expand(&mut doc), Some(true));
    assert_eq!(doc.text(), sample().replacen(from, to, 1));
}

/// Expand `abbreviation` on an indented line of its own.
fn expand_line(abbreviation: &str) -> String {
    let text = format!("<body>\n\t\t{abbreviation}\n</body>");
    let mut doc = Document::from_bytes(text.as_bytes(), "html").unwrap();
    doc.set_cursor(after(&text, abbreviation));
    assert_eq!(expand(&mut doc), Some(true));

    let out = doc.text();
    out.strip_prefix("<body>\n\t\t")
        .and_then(|s| s.strip_suffix("\n</body>"))
        .unwrap()
        .to_string()
}

// ============ Expand: sample document ============

#[test]
fn expand_snippet_inside_element() {
    assert_expands(
        "\"item1\">img",
        "<li class=\"item1\">img</li>",
        "<li class=\"item1\"><img src=\"\" alt=\"\"></li>",
    );
}

#[test]
fn expand_unknown_name_as_tag() {
    assert_expands(
        ">hithere",
        "<li class=\"item2\">hithere</li>",
        "<li class=\"item2\"><hithere></hithere></li>",
    );
}

#[test]
fn expand_child() {
    assert_expands(
        "ul>li\n",
        "\t\tul>li\n",
        "\t\t<ul>\n\t\t\t<li></li>\n\t\t</ul>\n",
    );
}

#[test]
fn expand_multiplication() {
    assert_expands(
        "ul>li*2",
        "\t\tul>li*2\n",
        "\t\t<ul>\n\t\t\t<li></li>\n\t\t\t<li></li>\n\t\t</ul>\n",
    );
}

#[test]
fn expand_numbering() {
    assert_expands(
        "ul>li.item$*2",
        "ul>li.item$*2",
        "<ul>\n\t\t\t<li class=\"item1\"></li>\n\t\t\t<li class=\"item2\"></li>\n\t\t</ul>",
    );
}

#[test]
fn expand_numbering_with_offset() {
    assert_expands(
        "ul>li.item$@44*2",
        "ul>li.item$@44*2",
        "<ul>\n\t\t\t<li class=\"item44\"></li>\n\t\t\t<li class=\"item45\"></li>\n\t\t</ul>",
    );
}

#[test]
fn expand_in_style_block() {
    assert_expands("\t\t\tm10", "\t\t\tm10\n", "\t\t\tmargin: 10px;\n");
}

#[test]
fn expand_in_style_attribute() {
    assert_expands(
        "style=\"m10",
        "style=\"m10\"",
        "style=\"margin: 10px;\"",
    );
}

#[test]
fn expand_in_template_script() {
    assert_expands(
        "span.hello",
        "\t\tspan.hello\n",
        "\t\t<span class=\"hello\"></span>\n",
    );
}

#[test]
fn no_expansion_in_javascript() {
    let mut doc = sample_doc(&["span.bye"]);
    assert_eq!(expand(&mut doc), None);
    assert_eq!(doc.text(), sample());
}

#[test]
fn no_expansion_in_open_tag() {
    let mut doc = sample_doc(&["<div i"]);
    assert_eq!(expand(&mut doc), None);
    assert_eq!(doc.text(), sample());
    assert_eq!(doc.version(), 0);
}

#[test]
fn excluded_language_is_restored_after_config_change() {
    let mut service = AbbreviationService::new(Config {
        exclude_languages: vec!["html".to_string()],
        ..Config::default()
    });
    let mut doc = sample_doc(&["ul>li\n"]);
    assert_eq!(service.expand_abbreviation(&mut doc, &ExpandArgs::default()), None);
    assert_eq!(doc.text(), sample());

    service.update_config(Config::default());
    assert_eq!(
        service.expand_abbreviation(&mut doc, &ExpandArgs::default()),
        Some(true)
    );
    assert_ne!(doc.text(), sample());
}

// ============ Expand: multiple cursors ============

#[test]
fn multiple_cursors_expand_in_one_batch() {
    let mut doc = sample_doc(&[">hithere", "ul>li\n", "\t\t\tm10"]);
    assert_eq!(expand(&mut doc), Some(true));
    assert_eq!(doc.version(), 1);

    let expected = sample()
        .replacen("<li class=\"item2\">hithere</li>", "<li class=\"item2\"><hithere></hithere></li>", 1)
        .replacen("\t\tul>li\n", "\t\t<ul>\n\t\t\t<li></li>\n\t\t</ul>\n", 1)
        .replacen("\t\t\tm10\n", "\t\t\tmargin: 10px;\n", 1);
    assert_eq!(doc.text(), expected);
}

#[test]
fn cursors_without_context_are_skipped() {
    let mut doc = sample_doc(&["span.bye", "span.hello"]);
    assert_eq!(expand(&mut doc), Some(true));
    assert_eq!(
        doc.text(),
        sample().replacen("\t\tspan.hello\n", "\t\t<span class=\"hello\"></span>\n", 1)
    );
}

#[test]
fn selections_move_past_expansions() {
    let mut doc = sample_doc(&["\"item1\">img", ">hithere"]);
    expand(&mut doc);

    let text = doc.text();
    let first = after(&text, "<img src=\"\" alt=\"\">");
    let second = after(&text, "<hithere></hithere>");
    assert_eq!(doc.selections(), &[first..first, second..second]);
}

// ============ Expand: grammar on a line ============

#[test]
fn expand_group_multiplication() {
    assert_eq!(
        expand_line("(ul>li.item$)*2"),
        "<ul>\n\t\t\t<li class=\"item1\"></li>\n\t\t</ul>\n\t\t<ul>\n\t\t\t<li class=\"item2\"></li>\n\t\t</ul>"
    );
}

#[test]
fn expand_group_multiplication_with_sibling() {
    insta::assert_snapshot!(expand_line("(ul>li.item$)*2+span"), @r#"
    <ul>
    			<li class="item1"></li>
    		</ul>
    		<ul>
    			<li class="item2"></li>
    		</ul>
    		<span></span>
    "#);
}

#[test]
fn expand_nested_groups() {
    assert_eq!(
        expand_line("(div>dl>(dt+dd)*2)"),
        "<div>\n\t\t\t<dl>\n\t\t\t\t<dt></dt>\n\t\t\t\t<dd></dd>\n\t\t\t\t<dt></dt>\n\t\t\t\t<dd></dd>\n\t\t\t</dl>\n\t\t</div>"
    );
}

#[test]
fn expand_with_bem_filter() {
    insta::assert_snapshot!(
        expand_line("ul.search-form._wide>li.-querystring+li.-btn_large|bem"),
        @r#"
    <ul class="search-form search-form_wide">
    			<li class="search-form__querystring"></li>
    			<li class="search-form__btn search-form__btn_large"></li>
    		</ul>
    "#
    );
}

#[test]
fn expand_climb_up() {
    assert_eq!(
        expand_line("div>p>span^em"),
        "<div>\n\t\t\t<p><span></span></p>\n\t\t\t<em></em>\n\t\t</div>"
    );
}

// ============ Wrap ============

fn wrap(doc: &mut Document, abbreviation: &str) -> bool {
    let args = WrapArgs {
        abbreviation: Some(abbreviation.to_string()),
    };
    AbbreviationService::default().wrap_with_abbreviation(doc, &args, &None::<String>)
}

#[test]
fn wrap_each_cursor_line_with_block_element() {
    let mut doc = sample_doc(&["img</li>", "hithere</li>"]);
    assert!(wrap(&mut doc, "div"));

    let expected = sample()
        .replacen(
            "\t\t<li class=\"item1\">img</li>\n",
            "\t\t<div>\n\t\t\t<li class=\"item1\">img</li>\n\t\t</div>\n",
            1,
        )
        .replacen(
            "\t\t<li class=\"item2\">hithere</li>\n",
            "\t\t<div>\n\t\t\t<li class=\"item2\">hithere</li>\n\t\t</div>\n",
            1,
        );
    assert_eq!(doc.text(), expected);
}

#[test]
fn wrap_with_inline_element() {
    let mut doc = sample_doc(&["ul>li\n"]);
    assert!(wrap(&mut doc, "span"));
    assert_eq!(
        doc.text(),
        sample().replacen("\t\tul>li\n", "\t\t<span>ul>li</span>\n", 1)
    );
}

#[test]
fn wrap_selected_lines_with_implicit_repeat() {
    let text = sample();
    let start = text.find("<li class=\"item1\">").unwrap();
    let end = after(&text, "hithere</li>");
    let mut doc = Document::from_bytes(text.as_bytes(), "html").unwrap();
    doc.set_selections(vec![start..end]);

    assert!(wrap(&mut doc, "ul>li.hello$*"));
    assert_eq!(
        doc.text(),
        text.replacen(
            "<li class=\"item1\">img</li>\n\t\t<li class=\"item2\">hithere</li>",
            "<ul>\n\t\t\t<li class=\"hello1\"><li class=\"item1\">img</li></li>\n\t\t\t<li class=\"hello2\"><li class=\"item2\">hithere</li></li>\n\t\t</ul>",
            1,
        )
    );
}

#[test]
fn wrap_selection_keeps_relative_indentation() {
    let text = "<body>\n\t<p>\n\t\tone\n\t</p>\n</body>";
    let mut doc = Document::from_bytes(text.as_bytes(), "html").unwrap();
    doc.set_selections(vec![text.find("<p>").unwrap()..after(text, "</p>")]);

    assert!(wrap(&mut doc, "section"));
    assert_eq!(
        doc.text(),
        "<body>\n\t<section>\n\t\t<p>\n\t\t\tone\n\t\t</p>\n\t</section>\n</body>"
    );
}

#[test]
fn wrap_asks_the_prompt() {
    let service = AbbreviationService::default();
    let mut doc = sample_doc(&["ul>li\n"]);
    let answer = Some("p.note".to_string());

    assert!(service.wrap_with_abbreviation(&mut doc, &WrapArgs::default(), &answer));
    assert_eq!(
        doc.text(),
        sample().replacen(
            "\t\tul>li\n",
            "\t\t<p class=\"note\">\n\t\t\tul>li\n\t\t</p>\n",
            1
        )
    );
}

#[test]
fn wrap_rejects_empty_and_invalid_abbreviations() {
    let mut doc = sample_doc(&["ul>li\n"]);
    assert!(!wrap(&mut doc, "   "));
    assert!(!wrap(&mut doc, "div)"));
    assert_eq!(doc.text(), sample());
}

#[test]
fn wrap_is_disabled_for_excluded_languages() {
    let text = "- item";
    let mut doc = Document::from_bytes(text.as_bytes(), "markdown").unwrap();
    assert!(!wrap(&mut doc, "div"));
    assert_eq!(doc.text(), text);
}
