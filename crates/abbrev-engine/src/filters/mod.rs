//! Named transforms applied to a resolved tree before rendering.
//!
//! Filters come from the abbreviation's `|name` suffixes and from the
//! syntax profile. They run in order, each at most once.

mod bem;

pub use bem::BemFilter;

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::render::OutputProfile;
use crate::resolve::{ResolvedNode, ResolvedTree};

/// A transform over a resolved tree.
///
/// Filters may also adjust the output profile, e.g. to render on one line.
pub trait Filter {
    /// The name used after `|` in an abbreviation.
    fn name(&self) -> &'static str;

    fn apply(&self, tree: &mut ResolvedTree, profile: &mut OutputProfile);
}

/// Filters available by name.
pub struct FilterRegistry {
    filters: Vec<Box<dyn Filter>>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.add(Box::new(BemFilter));
        registry.add(Box::new(CommentFilter));
        registry.add(Box::new(EscapeFilter));
        registry.add(Box::new(TrimFilter));
        registry.add(Box::new(SingleLineFilter));
        registry
    }
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Register a filter; a later filter with the same name wins.
    pub fn add(&mut self, filter: Box<dyn Filter>) {
        debug!("Registering filter: {}", filter.name());
        self.filters.retain(|f| f.name() != filter.name());
        self.filters.push(filter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Default)]
pub struct FilterPipeline {
    registry: FilterRegistry,
}

impl FilterPipeline {
    pub fn new(registry: FilterRegistry) -> Self {
        Self { registry }
    }

    /// Run the named filters in order. Unknown names are skipped.
    pub fn apply(&self, tree: &mut ResolvedTree, names: &[String], profile: &mut OutputProfile) {
        let mut seen: Vec<&str> = Vec::new();
        for name in names {
            if seen.contains(&name.as_str()) {
                continue;
            }
            seen.push(name);

            match self.registry.get(name) {
                Some(filter) => {
                    debug!("Running filter: {name}");
                    filter.apply(tree, profile);
                }
                None => debug!("Unknown filter: {name}"),
            }
        }
    }
}

/// `c`: a `<!-- /#id.class -->` comment after elements with an id or class.
pub struct CommentFilter;

impl Filter for CommentFilter {
    fn name(&self) -> &'static str {
        "c"
    }

    fn apply(&self, tree: &mut ResolvedTree, _profile: &mut OutputProfile) {
        comment_nodes(&mut tree.nodes);
    }
}

fn comment_nodes(nodes: &mut Vec<ResolvedNode>) {
    let mut i = 0;
    while i < nodes.len() {
        comment_nodes(&mut nodes[i].children);
        if let Some(label) = comment_label(&nodes[i]) {
            nodes.insert(i + 1, ResolvedNode::text(format!("<!-- /{label} -->")));
            i += 1;
        }
        i += 1;
    }
}

fn comment_label(node: &ResolvedNode) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    let mut label = String::new();
    if let Some(id) = node.attribute("id").and_then(|a| a.value.as_deref())
        && !id.is_empty()
    {
        label.push('#');
        label.push_str(id);
    }
    for class in node.classes() {
        label.push('.');
        label.push_str(class);
    }
    (!label.is_empty()).then_some(label)
}

/// `e`: escape `<`, `>` and `&` in text.
pub struct EscapeFilter;

impl Filter for EscapeFilter {
    fn name(&self) -> &'static str {
        "e"
    }

    fn apply(&self, tree: &mut ResolvedTree, _profile: &mut OutputProfile) {
        tree.walk_mut(&mut |node| {
            if let Some(text) = &mut node.text {
                *text = html_escape::encode_text(text).into_owned();
            }
        });
    }
}

fn list_marker_regex() -> &'static Regex {
    static LIST_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    LIST_MARKER_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:[*\-+•]|\d+[.)])[ \t]+").expect("Invalid list marker regex")
    })
}

/// `t`: strip list markers (`* `, `- `, `1. `) from the start of text lines.
pub struct TrimFilter;

impl Filter for TrimFilter {
    fn name(&self) -> &'static str {
        "t"
    }

    fn apply(&self, tree: &mut ResolvedTree, _profile: &mut OutputProfile) {
        tree.walk_mut(&mut |node| {
            if let Some(text) = &mut node.text {
                *text = list_marker_regex().replace_all(text, "").into_owned();
            }
        });
    }
}

/// `s`: render everything on one line.
pub struct SingleLineFilter;

impl Filter for SingleLineFilter {
    fn name(&self) -> &'static str {
        "s"
    }

    fn apply(&self, _tree: &mut ResolvedTree, profile: &mut OutputProfile) {
        profile.single_line = true;
    }
}
