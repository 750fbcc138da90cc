//! Turns a parsed [`Abbreviation`] into a concrete [`ResolvedTree`].
//!
//! Resolution runs in two passes:
//!
//! 1. **Snippet substitution** rewrites every element whose name is a
//!    snippet key into the parsed template. The element's attributes merge
//!    into the template's first element and its text and children move to
//!    the template's deepest last element. A template root is never looked
//!    up again under its own key, so `img → img[src alt]/` terminates.
//! 2. **Expansion** assigns implicit tag names, multiplies repeated nodes
//!    and replaces `$` placeholders with the index of the nearest repeated
//!    ancestor-or-self.
//!
//! ```
//! use abbrev_engine::resolve::{resolve, ResolveOptions};
//! use abbrev_engine::snippets::SnippetTable;
//! use abbrev_syntax::Abbreviation;
//!
//! let abbr = Abbreviation::parse("li.item$@3*2").unwrap();
//! let tree = resolve(&abbr, &SnippetTable::default(), &ResolveOptions::default());
//! let classes: Vec<_> = tree.nodes.iter().map(|n| n.classes()).collect();
//! assert_eq!(classes, vec![vec!["item3"], vec!["item4"]]);
//! ```

use abbrev_syntax::{Abbreviation, Attribute, Element, Group, Node, Repeat};
use log::debug;

use crate::html;
use crate::snippets::SnippetTable;

/// Nesting limit for snippets whose templates use other snippets.
const MAX_SNIPPET_DEPTH: usize = 16;

/// Upper bound on copies made by one `*N`.
const MAX_REPEAT: usize = 1000;

/// An element or text node with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedNode {
    /// `None` for a text node.
    pub name: Option<String>,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<ResolvedNode>,
    pub self_closing: bool,
    /// The text is content being wrapped rather than part of the abbreviation.
    pub wrapped: bool,
}

impl ResolvedNode {
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_element(&self) -> bool {
        self.name.is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .and_then(|a| a.value.as_deref())
            .map(|v| v.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Replace the class list, keeping the attribute's position.
    pub fn set_classes(&mut self, classes: &[String]) {
        let value = classes.join(" ");
        match self.attributes.iter_mut().find(|a| a.name == "class") {
            Some(attr) => attr.value = Some(value),
            None if !classes.is_empty() => {
                self.attributes.push(Attribute::new("class", Some(value)));
            }
            None => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedTree {
    pub nodes: Vec<ResolvedNode>,
}

impl ResolvedTree {
    /// Visit every node, parents before children.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut ResolvedNode)) {
        fn walk(nodes: &mut [ResolvedNode], f: &mut impl FnMut(&mut ResolvedNode)) {
            for node in nodes {
                f(node);
                walk(&mut node.children, f);
            }
        }
        walk(&mut self.nodes, f);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Dedented lines being wrapped, `None` when expanding.
    pub wrapped: Option<&'a [String]>,
}

pub fn resolve(
    abbreviation: &Abbreviation,
    snippets: &SnippetTable,
    options: &ResolveOptions<'_>,
) -> ResolvedTree {
    let nodes = substitute(abbreviation.nodes.clone(), snippets, 0, None);

    let mut resolver = Resolver {
        lines: options.wrapped,
        implicit_taken: false,
    };
    let mut out = Vec::new();
    resolver.nodes(&nodes, None, None, &mut out);

    if let Some(lines) = options.wrapped
        && !resolver.implicit_taken
    {
        insert_content(&mut out, lines.join("\n"), true);
    }

    ResolvedTree { nodes: out }
}

fn substitute(
    nodes: Vec<Node>,
    snippets: &SnippetTable,
    depth: usize,
    skip: Option<&str>,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Node::Group(mut group) => {
                group.children = substitute(group.children, snippets, depth, None);
                out.push(Node::Group(group));
            }
            Node::Element(mut element) => {
                let children = std::mem::take(&mut element.children);
                element.children = substitute(children, snippets, depth, None);
                match template_for(&element, snippets, depth, skip) {
                    Some(template) => out.push(apply_template(element, template)),
                    None => out.push(Node::Element(element)),
                }
            }
        }
    }

    out
}

fn template_for(
    element: &Element,
    snippets: &SnippetTable,
    depth: usize,
    skip: Option<&str>,
) -> Option<Vec<Node>> {
    let name = element.name.as_deref()?;
    if skip == Some(name) {
        return None;
    }
    let template = snippets.get(name)?;
    if depth >= MAX_SNIPPET_DEPTH {
        debug!("snippet {name:?} nested too deeply, keeping it as a tag");
        return None;
    }

    match Abbreviation::parse(template) {
        Ok(parsed) if !parsed.nodes.is_empty() => Some(substitute(
            parsed.nodes,
            snippets,
            depth + 1,
            Some(name),
        )),
        Ok(_) => None,
        Err(err) => {
            debug!("snippet {name:?} has an invalid template {template:?}: {err}");
            None
        }
    }
}

fn apply_template(element: Element, mut template: Vec<Node>) -> Node {
    let Element {
        attributes,
        text,
        children,
        repeat,
        self_closing,
        ..
    } = element;

    if let Some(first) = first_element_mut(&mut template) {
        for attribute in attributes {
            merge_attribute(first, attribute);
        }
        first.self_closing |= self_closing;
    }

    if (text.is_some() || !children.is_empty())
        && let Some(last) = deepest_last_element_mut(&mut template)
    {
        if text.is_some() {
            last.text = text;
        }
        last.children.extend(children);
    }

    let mut node = match template.len() {
        1 => template.remove(0),
        _ => Node::Group(Group {
            children: template,
            repeat: None,
        }),
    };
    if repeat.is_some() {
        node.set_repeat(repeat);
    }
    node
}

/// Classes accumulate; a valued attribute replaces the template's, an empty
/// one only fills a gap.
fn merge_attribute(target: &mut Element, attribute: Attribute) {
    if attribute.name == "class" {
        for class in attribute.value.as_deref().unwrap_or_default().split_whitespace() {
            if !target.classes().contains(&class) {
                target.add_class(class);
            }
        }
        return;
    }

    let keeps_template = attribute.value.is_none()
        && !attribute.boolean
        && target.attribute(&attribute.name).is_some();
    if !keeps_template {
        target.set_attribute(attribute);
    }
}

fn first_element_mut(nodes: &mut [Node]) -> Option<&mut Element> {
    match nodes.first_mut()? {
        Node::Element(element) => Some(element),
        Node::Group(group) => first_element_mut(&mut group.children),
    }
}

fn deepest_last_element_mut(nodes: &mut [Node]) -> Option<&mut Element> {
    match nodes.last_mut()? {
        Node::Element(element) => {
            if element.children.is_empty() {
                return Some(element);
            }
            deepest_last_element_mut(&mut element.children)
        }
        Node::Group(group) => deepest_last_element_mut(&mut group.children),
    }
}

/// Index within the nearest repeated ancestor-or-self.
#[derive(Debug, Clone, Copy)]
struct Counter {
    index: usize,
    count: usize,
}

struct Resolver<'a> {
    lines: Option<&'a [String]>,
    /// The first implicit repeater consumes the wrapped lines.
    implicit_taken: bool,
}

impl<'a> Resolver<'a> {
    fn nodes(
        &mut self,
        nodes: &[Node],
        parent: Option<&str>,
        counter: Option<Counter>,
        out: &mut Vec<ResolvedNode>,
    ) {
        for node in nodes {
            let repeat = node.repeat();
            let lines = self.take_lines(repeat);
            let count = match (repeat, lines) {
                (_, Some(lines)) => lines.len().max(1),
                (Some(Repeat { count: Some(n) }), _) if n > MAX_REPEAT => {
                    debug!("Repeat count {n} capped at {MAX_REPEAT}");
                    MAX_REPEAT
                }
                (Some(Repeat { count: Some(n) }), _) => n,
                _ => 1,
            };

            for index in 0..count {
                let counter = match repeat {
                    Some(_) => Some(Counter { index, count }),
                    None => counter,
                };

                let mut copy = Vec::new();
                match node {
                    Node::Group(group) => self.nodes(&group.children, parent, counter, &mut copy),
                    Node::Element(element) => copy.push(self.element(element, parent, counter)),
                }
                if let Some(line) = lines.and_then(|lines| lines.get(index)) {
                    insert_content(&mut copy, line.clone(), false);
                }
                out.extend(copy);
            }
        }
    }

    fn take_lines(&mut self, repeat: Option<Repeat>) -> Option<&'a [String]> {
        if self.implicit_taken || !matches!(repeat, Some(Repeat { count: None })) {
            return None;
        }
        let lines = self.lines?;
        self.implicit_taken = true;
        Some(lines)
    }

    fn element(
        &mut self,
        element: &Element,
        parent: Option<&str>,
        counter: Option<Counter>,
    ) -> ResolvedNode {
        let text = element.text.as_deref().map(|t| number(t, counter));
        let attributes: Vec<Attribute> = element
            .attributes
            .iter()
            .map(|a| Attribute {
                name: number(&a.name, counter),
                value: a.value.as_deref().map(|v| number(v, counter)),
                boolean: a.boolean,
            })
            .collect();

        let name = match &element.name {
            Some(name) => Some(number(name, counter)),
            None if text.is_some() && attributes.is_empty() && element.children.is_empty() => {
                None
            }
            None => Some(html::implicit_name(parent).to_string()),
        };

        let mut children = Vec::new();
        self.nodes(
            &element.children,
            name.as_deref().or(parent),
            counter,
            &mut children,
        );

        let self_closing = element.self_closing || name.as_deref().is_some_and(html::is_void);

        ResolvedNode {
            name,
            attributes,
            text,
            children,
            self_closing,
            wrapped: false,
        }
    }
}

/// Put `content` into the deepest last element, or add it as a text node
/// when there is no element.
fn insert_content(nodes: &mut Vec<ResolvedNode>, content: String, wrapped: bool) {
    match deepest_last(nodes) {
        Some(node) => {
            node.text = Some(match node.text.take() {
                Some(text) => text + &content,
                None => content,
            });
            node.wrapped = wrapped;
        }
        None => nodes.push(ResolvedNode {
            wrapped,
            ..ResolvedNode::text(content)
        }),
    }
}

fn deepest_last(nodes: &mut [ResolvedNode]) -> Option<&mut ResolvedNode> {
    let node = nodes.iter_mut().rev().find(|n| n.is_element())?;
    if node.children.iter().any(ResolvedNode::is_element) {
        deepest_last(&mut node.children)
    } else {
        Some(node)
    }
}

/// Replace `$` runs with the counter value, zero-padded to the run length.
///
/// A run may be followed by `@N` (start at N), `@-` (count down) or `@-N`.
/// `\$` is a literal dollar.
fn number(text: &str, counter: Option<Counter>) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    let Counter { index, count } = counter.unwrap_or(Counter { index: 0, count: 1 });

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if chars.get(i + 1) == Some(&'$') => {
                out.push('$');
                i += 2;
            }
            '$' => {
                let start = i;
                while chars.get(i) == Some(&'$') {
                    i += 1;
                }
                let width = i - start;
                let (reverse, offset, consumed) = numbering_modifier(&chars[i..]);
                i += consumed;

                let value = if reverse {
                    offset.saturating_add(count - 1 - index)
                } else {
                    offset.saturating_add(index)
                };
                out.push_str(&format!("{value:0width$}"));
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Returns `(reverse, offset, chars consumed)`.
fn numbering_modifier(rest: &[char]) -> (bool, usize, usize) {
    if rest.first() != Some(&'@') {
        return (false, 1, 0);
    }

    let mut i = 1;
    let reverse = rest.get(i) == Some(&'-');
    if reverse {
        i += 1;
    }
    let digits: String = rest[i..].iter().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() && !reverse {
        return (false, 1, 0);
    }
    i += digits.len();

    (reverse, digits.parse().unwrap_or(1), i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::SnippetRegistry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn resolve_str(input: &str) -> ResolvedTree {
        let registry = SnippetRegistry::default();
        let abbr = Abbreviation::parse(input).unwrap();
        resolve(&abbr, registry.markup("html"), &ResolveOptions::default())
    }

    fn names(nodes: &[ResolvedNode]) -> Vec<&str> {
        nodes
            .iter()
            .map(|n| n.name.as_deref().unwrap_or("#text"))
            .collect()
    }

    fn all_classes(nodes: &[ResolvedNode]) -> Vec<String> {
        nodes.iter().map(|n| n.classes().join(" ")).collect()
    }

    #[rstest]
    #[case("item$", 0, 1, "item1")]
    #[case("item$$$", 1, 3, "item002")]
    #[case("item$@44", 1, 2, "item45")]
    #[case("item$@-", 0, 3, "item3")]
    #[case("item$@-10", 0, 3, "item12")]
    #[case("item$@0", 0, 2, "item0")]
    #[case(r"cost\$$", 0, 1, "cost$1")]
    #[case("a$b$", 1, 2, "a2b2")]
    #[case("mail@x", 0, 1, "mail@x")]
    #[case("$@x", 0, 1, "1@x")]
    fn numbering(
        #[case] text: &str,
        #[case] index: usize,
        #[case] count: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(number(text, Some(Counter { index, count })), expected);
    }

    #[test]
    fn huge_offset_saturates() {
        let max = usize::MAX;
        assert_eq!(
            number(&format!("a$@{max}"), Some(Counter { index: 1, count: 2 })),
            format!("a{max}")
        );
        assert_eq!(
            number(&format!("a$@-{max}"), Some(Counter { index: 0, count: 2 })),
            format!("a{max}")
        );
    }

    #[test]
    fn numbering_without_repeat_uses_offset() {
        assert_eq!(number("h$", None), "h1");
        assert_eq!(number("h$@5", None), "h5");
    }

    #[test]
    fn repeat_with_offset() {
        let tree = resolve_str("ul>li.item$@44*2");
        let ul = &tree.nodes[0];
        assert_eq!(all_classes(&ul.children), vec!["item44", "item45"]);
    }

    #[test]
    fn reverse_numbering() {
        let tree = resolve_str("li.n$@-*3");
        assert_eq!(all_classes(&tree.nodes), vec!["n3", "n2", "n1"]);
    }

    #[test]
    fn group_repeat_numbers_descendants() {
        let tree = resolve_str("(ul>li.item$)*2+span");
        assert_eq!(names(&tree.nodes), vec!["ul", "ul", "span"]);
        assert_eq!(all_classes(&tree.nodes[0].children), vec!["item1"]);
        assert_eq!(all_classes(&tree.nodes[1].children), vec!["item2"]);
    }

    #[test]
    fn nearest_repeat_wins() {
        let tree = resolve_str("(div.g$>p.p$*2)*2");
        assert_eq!(all_classes(&tree.nodes), vec!["g1", "g2"]);
        assert_eq!(all_classes(&tree.nodes[1].children), vec!["p1", "p2"]);
    }

    #[test]
    fn huge_repeat_is_capped() {
        let tree = resolve_str("i*99999");
        assert_eq!(tree.nodes.len(), MAX_REPEAT);
    }

    #[test]
    fn nested_groups_copy_subtrees() {
        let tree = resolve_str("(div>dl>(dt+dd)*2)");
        let dl = &tree.nodes[0].children[0];
        assert_eq!(names(&dl.children), vec!["dt", "dd", "dt", "dd"]);
    }

    #[test]
    fn implicit_names_follow_parent() {
        let tree = resolve_str("ul>.a+table>.row>.cell^^em>.x");
        let ul = &tree.nodes[0];
        assert_eq!(names(&ul.children), vec!["li", "table", "em"]);
        let table = &ul.children[1];
        assert_eq!(names(&table.children), vec!["tr"]);
        assert_eq!(names(&table.children[0].children), vec!["td"]);
        assert_eq!(names(&ul.children[2].children), vec!["span"]);
    }

    #[test]
    fn text_only_element_is_text_node() {
        let tree = resolve_str("p>{Click }+a+{ here}");
        let p = &tree.nodes[0];
        assert_eq!(names(&p.children), vec!["#text", "a", "#text"]);
        assert_eq!(p.children[0].text.as_deref(), Some("Click "));
    }

    #[test]
    fn snippet_gets_default_attributes_and_void_flag() {
        let tree = resolve_str("img");
        let img = &tree.nodes[0];
        assert_eq!(names(&tree.nodes), vec!["img"]);
        assert_eq!(
            img.attributes,
            vec![Attribute::new("src", None), Attribute::new("alt", None)]
        );
        assert!(img.self_closing);
    }

    #[test]
    fn snippet_merges_attributes() {
        let tree = resolve_str("img.photo[src=a.png title=x]");
        assert_eq!(
            tree.nodes[0].attributes,
            vec![
                Attribute::new("src", Some("a.png".into())),
                Attribute::new("alt", None),
                Attribute::new("class", Some("photo".into())),
                Attribute::new("title", Some("x".into())),
            ]
        );
    }

    #[test]
    fn snippet_keeps_template_value_for_empty_attribute() {
        let tree = resolve_str("a:link[href]{home}");
        let a = &tree.nodes[0];
        assert_eq!(a.attributes, vec![Attribute::new("href", Some("http://".into()))]);
        assert_eq!(a.text.as_deref(), Some("home"));
    }

    #[test]
    fn snippet_repeat_and_children() {
        let mut table = SnippetTable::default();
        table.insert("card", "div.card>h2+p");
        let abbr = Abbreviation::parse("card.wide*2>{body}").unwrap();
        let tree = resolve(&abbr, &table, &ResolveOptions::default());

        assert_eq!(names(&tree.nodes), vec!["div", "div"]);
        assert_eq!(all_classes(&tree.nodes), vec!["card wide", "card wide"]);
        let p = &tree.nodes[0].children[1];
        assert_eq!(p.text, None);
        assert_eq!(names(&p.children), vec!["#text"]);
    }

    #[test]
    fn multi_root_snippet_repeats_as_group() {
        let mut table = SnippetTable::default();
        table.insert("pair", "dt+dd");
        let abbr = Abbreviation::parse("dl>pair*2").unwrap();
        let tree = resolve(&abbr, &table, &ResolveOptions::default());
        assert_eq!(names(&tree.nodes[0].children), vec!["dt", "dd", "dt", "dd"]);
    }

    #[test]
    fn nested_snippets_resolve_inside_templates() {
        let tree = resolve_str("!");
        assert_eq!(names(&tree.nodes), vec!["#text", "html"]);
        let head = &tree.nodes[1].children[0];
        assert_eq!(names(&head.children), vec!["meta", "meta", "title"]);
        assert_eq!(
            head.children[1].attribute("name"),
            Some(&Attribute::new("name", Some("viewport".into())))
        );
    }

    #[test]
    fn self_referencing_snippet_terminates() {
        let mut table = SnippetTable::default();
        table.insert("x", "x>x");
        let abbr = Abbreviation::parse("x").unwrap();
        let tree = resolve(&abbr, &table, &ResolveOptions::default());
        assert_eq!(names(&tree.nodes), vec!["x"]);
    }

    #[test]
    fn unknown_names_pass_through() {
        let tree = resolve_str("hithere");
        assert_eq!(tree.nodes, vec![ResolvedNode::element("hithere")]);
    }

    #[test]
    fn wrapped_content_goes_to_deepest_last_element() {
        let abbr = Abbreviation::parse("div>p+section>span").unwrap();
        let lines = vec!["one".to_string(), "two".to_string()];
        let tree = resolve(
            &abbr,
            &SnippetTable::default(),
            &ResolveOptions {
                wrapped: Some(&lines),
            },
        );
        let span = &tree.nodes[0].children[1].children[0];
        assert_eq!(span.text.as_deref(), Some("one\ntwo"));
        assert!(span.wrapped);
    }

    #[test]
    fn implicit_repeat_takes_one_line_per_copy() {
        let abbr = Abbreviation::parse("ul>li.hello$*").unwrap();
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let tree = resolve(
            &abbr,
            &SnippetTable::default(),
            &ResolveOptions {
                wrapped: Some(&lines),
            },
        );
        let items = &tree.nodes[0].children;
        assert_eq!(all_classes(items), vec!["hello1", "hello2", "hello3"]);
        let texts: Vec<_> = items.iter().map(|li| li.text.as_deref()).collect();
        assert_eq!(texts, vec![Some("a"), Some("b"), Some("c")]);
        assert!(items.iter().all(|li| !li.wrapped));
    }

    #[test]
    fn implicit_repeat_when_expanding_counts_once() {
        let tree = resolve_str("ul>li*");
        assert_eq!(names(&tree.nodes[0].children), vec!["li"]);
    }

    #[test]
    fn set_classes_keeps_position() {
        let mut node = resolve_str("a#x.b[title=t]").nodes.remove(0);
        node.set_classes(&["c".to_string(), "d".to_string()]);
        let attrs: Vec<_> = node.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["href", "id", "class", "title"]);
        assert_eq!(node.classes(), vec!["c", "d"]);
    }
}
