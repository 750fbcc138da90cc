// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2

/// Abbreviations covering the markup grammar, from trivial to nested.
#[allow(dead_code)]
pub const MARKUP_ABBREVIATIONS: &[&str] = &[
    "div",
    "ul>li.item$*5",
    "(div>dl>(dt+dd)*3)+footer>p",
    "table>tr*10>td.cell$$@-*4",
    "ul.search-form._wide>li.-querystring+li.-btn_large|bem",
    "a[href=\"https://example.com\" title='Link']{Click here}",
];

#[allow(dead_code)]
pub const STYLESHEET_ABBREVIATIONS: &[&str] = &["m10", "p10-20", "bd1-s#f", "pos:a", "fxd", "w100p!"];

/// An HTML page with `lines` cursor lines, each holding an abbreviation.
/// Returns the text and the offset at the end of every abbreviation.
#[allow(dead_code)]
pub fn generate_page(lines: usize) -> (String, Vec<usize>) {
    let mut content = String::from("<html>\n<body>\n");
    let mut cursors = Vec::with_capacity(lines);

    for i in 0..lines {
        let abbreviation = MARKUP_ABBREVIATIONS[i % MARKUP_ABBREVIATIONS.len()];
        content.push_str("\t<section>\n\t\t");
        content.push_str(abbreviation);
        cursors.push(content.len());
        content.push_str("\n\t</section>\n");
    }

    content.push_str("</body>\n</html>\n");
    (content, cursors)
}

/// An HTML page with a long `<style>` block before the cursor, to measure
/// context detection over a large prefix.
#[allow(dead_code)]
pub fn generate_styled_page(rules: usize) -> (String, usize) {
    let mut content = String::from("<html>\n<head>\n<style>\n");
    for i in 0..rules {
        content.push_str(&format!(".rule{i} {{\n\tmargin: {i}px;\n}}\n"));
    }
    content.push_str(".last {\n\tm10");
    let cursor = content.len();
    content.push_str("\n}\n</style>\n</head>\n</html>\n");
    (content, cursor)
}
