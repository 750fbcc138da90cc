//! Typed abbreviation tree lowered from the CST.
//!
//! The CST keeps operator sequences flat; lowering turns them into real
//! parent/child structure. The sequence is walked left to right with a stack
//! of levels:
//!
//! - `>` opens a new level whose nodes become children of the last node
//! - `+` keeps adding to the current level
//! - `^` closes one level per caret; climbing past the root is clamped
//!
//! Groups lower their inner sequence independently, so `^` inside a group
//! never escapes it.
//!
//! ```
//! use abbrev_syntax::Abbreviation;
//!
//! let abbr = Abbreviation::parse("ul>li*2").unwrap();
//! let ul = abbr.nodes[0].as_element().unwrap();
//! assert_eq!(ul.name.as_deref(), Some("ul"));
//! assert_eq!(ul.children.len(), 1);
//! ```

use rowan::NodeOrToken;

use crate::error::ParseError;
use crate::parser::parse;
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A parsed abbreviation: top-level nodes plus trailing filters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Abbreviation {
    pub nodes: Vec<Node>,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Group(Group),
}

/// One element or text unit.
///
/// `name` is `None` for implicit tags (`.item`) and bare text (`{hello}`);
/// the resolver decides which.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: Option<String>,
    /// Declaration order; all classes live in one `class` attribute.
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<Node>,
    pub repeat: Option<Repeat>,
    pub self_closing: bool,
}

/// Parenthesised sequence sharing one repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub children: Vec<Node>,
    pub repeat: Option<Repeat>,
}

/// `*N`, or the implicit `*` when `count` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat {
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// `None` when written without `=`; renders as an empty value.
    pub value: Option<String>,
    /// Written as `name.`; renders without a value.
    pub boolean: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            boolean: false,
        }
    }
}

impl Abbreviation {
    /// Parse and lower an abbreviation, failing on the first grammar error.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let parse = parse(source);
        if let Some(error) = parse.errors().first() {
            return Err(error.clone());
        }
        Ok(Self::from_syntax(&parse.syntax()))
    }

    /// Lower an error-free CST.
    pub fn from_syntax(root: &SyntaxNode) -> Self {
        let filters = root
            .children()
            .filter(|n| n.kind() == SyntaxKind::FILTERS)
            .flat_map(|n| n.children())
            .filter(|n| n.kind() == SyntaxKind::FILTER)
            .map(|n| n.text().to_string())
            .collect();

        Self {
            nodes: lower_sequence(root),
            filters,
        }
    }

    /// The whole input as one element of that name.
    ///
    /// Used when the input is not a valid abbreviation, so that e.g.
    /// `hithere` still expands to `<hithere></hithere>`.
    pub fn literal(source: &str) -> Self {
        Self {
            nodes: vec![Node::Element(Element::named(source))],
            filters: Vec::new(),
        }
    }

    /// Implicit repeaters (`*` without a count) anywhere in the tree.
    pub fn has_implicit_repeat(&self) -> bool {
        fn walk(nodes: &[Node]) -> bool {
            nodes.iter().any(|node| {
                matches!(node.repeat(), Some(Repeat { count: None })) || walk(node.children())
            })
        }
        walk(&self.nodes)
    }
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Group(group) => &group.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Node::Element(element) => &mut element.children,
            Node::Group(group) => &mut group.children,
        }
    }

    pub fn repeat(&self) -> Option<Repeat> {
        match self {
            Node::Element(element) => element.repeat,
            Node::Group(group) => group.repeat,
        }
    }

    pub fn set_repeat(&mut self, repeat: Option<Repeat>) {
        match self {
            Node::Element(element) => element.repeat = repeat,
            Node::Group(group) => group.repeat = repeat,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Group(_) => None,
        }
    }
}

impl Element {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Append a class, creating the `class` attribute at this position if needed.
    pub fn add_class(&mut self, class: &str) {
        match self.attributes.iter_mut().find(|a| a.name == "class") {
            Some(attr) => {
                let value = attr.value.get_or_insert_with(String::new);
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(class);
            }
            None => self
                .attributes
                .push(Attribute::new("class", Some(class.to_string()))),
        }
    }

    /// Replace the value of an existing attribute or append a new one.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .and_then(|a| a.value.as_deref())
            .map(|v| v.split_whitespace().collect())
            .unwrap_or_default()
    }
}

fn lower_sequence(parent: &SyntaxNode) -> Vec<Node> {
    let mut levels: Vec<Vec<Node>> = vec![Vec::new()];

    for child in parent.children_with_tokens() {
        match child {
            NodeOrToken::Node(node) => {
                let lowered = match node.kind() {
                    SyntaxKind::ELEMENT => Node::Element(lower_element(&node)),
                    SyntaxKind::GROUP => Node::Group(lower_group(&node)),
                    _ => continue,
                };
                if let Some(level) = levels.last_mut() {
                    level.push(lowered);
                }
            }
            NodeOrToken::Token(token) => match token.kind() {
                SyntaxKind::GT => levels.push(Vec::new()),
                SyntaxKind::CARET if levels.len() > 1 => close_level(&mut levels),
                _ => {}
            },
        }
    }

    while levels.len() > 1 {
        close_level(&mut levels);
    }
    levels.pop().unwrap_or_default()
}

fn close_level(levels: &mut Vec<Vec<Node>>) {
    if let Some(children) = levels.pop()
        && let Some(parent) = levels.last_mut().and_then(|level| level.last_mut())
    {
        parent.children_mut().extend(children);
    }
}

fn lower_group(node: &SyntaxNode) -> Group {
    Group {
        children: lower_sequence(node),
        repeat: node
            .children()
            .find(|n| n.kind() == SyntaxKind::REPEAT)
            .map(|n| lower_repeat(&n)),
    }
}

fn lower_repeat(node: &SyntaxNode) -> Repeat {
    Repeat {
        count: word(node).and_then(|w| w.text().parse().ok()),
    }
}

fn lower_element(node: &SyntaxNode) -> Element {
    let mut element = Element::default();

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => match n.kind() {
                SyntaxKind::TAG_NAME => element.name = Some(unescape(&n.text().to_string())),
                SyntaxKind::CLASS => {
                    if let Some(w) = word(&n) {
                        element.add_class(&unescape(w.text()));
                    }
                }
                SyntaxKind::ID => {
                    if let Some(w) = word(&n) {
                        element.set_attribute(Attribute::new("id", Some(unescape(w.text()))));
                    }
                }
                SyntaxKind::ATTR_LIST => {
                    for attr in n.children().filter(|a| a.kind() == SyntaxKind::ATTRIBUTE) {
                        element.set_attribute(lower_attribute(&attr));
                    }
                }
                SyntaxKind::TEXT => {
                    let raw = n.text().to_string();
                    element.text = Some(unescape(strip_delimiters(&raw)));
                }
                SyntaxKind::REPEAT => element.repeat = Some(lower_repeat(&n)),
                _ => {}
            },
            NodeOrToken::Token(t) => {
                if t.kind() == SyntaxKind::SLASH {
                    element.self_closing = true;
                }
            }
        }
    }

    element
}

fn lower_attribute(node: &SyntaxNode) -> Attribute {
    let mut name = String::new();
    let mut value = None;

    for child in node.children() {
        match child.kind() {
            SyntaxKind::ATTR_NAME => name = unescape(&child.text().to_string()),
            SyntaxKind::ATTR_VALUE => {
                let raw = child.text().to_string();
                value = Some(unescape(strip_delimiters(&raw)));
            }
            _ => {}
        }
    }

    let boolean = name.len() > 1 && name.ends_with('.');
    if boolean {
        name.pop();
    }

    Attribute {
        name,
        value,
        boolean,
    }
}

fn word(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == SyntaxKind::WORD)
}

/// Strip one pair of `{}`, `""` or `''`.
fn strip_delimiters(raw: &str) -> &str {
    let pairs = [('{', '}'), ('"', '"'), ('\'', '\'')];
    for (open, close) in pairs {
        if raw.len() >= 2 && raw.starts_with(open) && raw.ends_with(close) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Drop escaping backslashes. `\$` is kept for the numbering pass.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('$') => out.push_str("\\$"),
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
