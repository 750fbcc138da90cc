use abbrev_config::SelfClosingStyle;

use super::RenderContext;
use crate::resolve::{ResolvedNode, ResolvedTree};

/// Render a resolved tree as markup.
///
/// Siblings share a line unless one of them needs its own: block elements,
/// elements whose content is laid out over several lines, and multi-line
/// text. Once `inline_break` inline elements sit in one sibling list, every
/// sibling gets its own line.
pub fn render_markup(tree: &ResolvedTree, ctx: &RenderContext) -> String {
    let mut writer = Writer {
        out: String::new(),
        ctx,
    };
    let items: Vec<Item<'_>> = tree.nodes.iter().map(Item::Node).collect();
    writer.siblings(&items, 0, None);
    writer.out
}

#[derive(Clone, Copy)]
enum Item<'a> {
    /// An element's own text, written before its children.
    Text(&'a str),
    Node(&'a ResolvedNode),
}

fn content_items(node: &ResolvedNode) -> Vec<Item<'_>> {
    node.text
        .as_deref()
        .map(Item::Text)
        .into_iter()
        .chain(node.children.iter().map(Item::Node))
        .collect()
}

struct Writer<'a> {
    out: String,
    ctx: &'a RenderContext,
}

impl Writer<'_> {
    fn newline(&mut self, depth: usize) {
        if self.ctx.profile.single_line {
            return;
        }
        self.out.push('\n');
        self.out.push_str(&self.ctx.base_indent);
        for _ in 0..depth {
            self.out.push_str(&self.ctx.indent_unit);
        }
    }

    fn is_inline_element(&self, item: Item<'_>) -> bool {
        match item {
            Item::Node(ResolvedNode {
                name: Some(name), ..
            }) => self.ctx.profile.is_inline(name),
            _ => false,
        }
    }

    fn own_line(&self, item: Item<'_>) -> bool {
        match item {
            Item::Text(text) => text.contains('\n'),
            Item::Node(node) => match &node.name {
                None => node.text.as_deref().is_some_and(|t| t.contains('\n')),
                Some(name) => !self.ctx.profile.is_inline(name) || self.content_breaks(node),
            },
        }
    }

    fn forced(&self, items: &[Item<'_>]) -> bool {
        let inline_break = self.ctx.profile.inline_break;
        inline_break > 0
            && items
                .iter()
                .filter(|item| self.is_inline_element(**item))
                .count()
                >= inline_break
    }

    /// Whether an element's text and children go on lines of their own.
    fn content_breaks(&self, node: &ResolvedNode) -> bool {
        let block = node
            .name
            .as_deref()
            .is_some_and(|name| !self.ctx.profile.is_inline(name));
        if block && node.wrapped && node.text.is_some() {
            return true;
        }
        let items = content_items(node);
        self.forced(&items) || items.iter().any(|item| self.own_line(*item))
    }

    /// Write a sibling list. With `close`, the first item starts a new line
    /// and a newline at that depth ends the list.
    fn siblings(&mut self, items: &[Item<'_>], depth: usize, close: Option<usize>) {
        let forced = self.forced(items);
        for (i, item) in items.iter().enumerate() {
            let starts_line = if i == 0 {
                close.is_some()
            } else {
                forced || self.own_line(items[i - 1]) || self.own_line(*item)
            };
            if starts_line {
                self.newline(depth);
            }
            self.item(*item, depth);
        }
        if let Some(close) = close
            && !items.is_empty()
        {
            self.newline(close);
        }
    }

    fn item(&mut self, item: Item<'_>, depth: usize) {
        match item {
            Item::Text(text) => self.text(text, depth),
            Item::Node(node) => match &node.name {
                Some(name) => self.element(node, name, depth),
                None => self.text(node.text.as_deref().unwrap_or_default(), depth),
            },
        }
    }

    fn text(&mut self, text: &str, depth: usize) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline(depth);
            }
            self.out.push_str(line);
        }
    }

    fn element(&mut self, node: &ResolvedNode, name: &str, depth: usize) {
        let empty = node.text.is_none() && node.children.is_empty();
        self.open_tag(node, name, node.self_closing && empty);
        if node.self_closing && empty {
            return;
        }

        // `head` and `body` stay level with `html`
        let child_depth = if name.eq_ignore_ascii_case("html") {
            depth
        } else {
            depth + 1
        };
        let items = content_items(node);
        let close = self.content_breaks(node).then_some(depth);
        self.siblings(&items, child_depth, close);

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn open_tag(&mut self, node: &ResolvedNode, name: &str, self_closing: bool) {
        let profile = &self.ctx.profile;
        let quote = profile.quote();

        self.out.push('<');
        self.out.push_str(name);
        for attribute in &node.attributes {
            self.out.push(' ');
            self.out.push_str(&attribute.name);
            if attribute.boolean {
                if profile.self_closing_style != SelfClosingStyle::Html {
                    self.out.push('=');
                    self.out.push(quote);
                    self.out.push_str(&attribute.name);
                    self.out.push(quote);
                }
                continue;
            }
            self.out.push('=');
            self.out.push(quote);
            self.out.push_str(attribute.value.as_deref().unwrap_or_default());
            self.out.push(quote);
        }

        if self_closing {
            self.out.push_str(match profile.self_closing_style {
                SelfClosingStyle::Html => ">",
                SelfClosingStyle::Xhtml => " />",
                SelfClosingStyle::Xml => "/>",
            });
        } else {
            self.out.push('>');
        }
    }
}
