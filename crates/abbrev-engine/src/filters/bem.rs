use super::Filter;
use crate::render::OutputProfile;
use crate::resolve::{ResolvedNode, ResolvedTree};

const ELEMENT_SEPARATOR: &str = "__";
const MODIFIER_SEPARATOR: &str = "_";

/// `bem`: Block-Element-Modifier class names.
///
/// - `_mod` modifies the last plain class on the same element:
///   `.block._wide` → `block block_wide`.
/// - `-elem` is an element of the nearest ancestor block:
///   `.block>.-item` → `block__item`. Each extra `-` climbs one more block.
/// - `-elem_mod` adds the modified element as well:
///   `block__elem block__elem_mod`.
///
/// A plain class is a block for the element's descendants.
pub struct BemFilter;

impl Filter for BemFilter {
    fn name(&self) -> &'static str {
        "bem"
    }

    fn apply(&self, tree: &mut ResolvedTree, _profile: &mut OutputProfile) {
        let mut blocks = Vec::new();
        transform(&mut tree.nodes, &mut blocks);
    }
}

fn transform(nodes: &mut [ResolvedNode], blocks: &mut Vec<String>) {
    for node in nodes {
        let block = rewrite_classes(node, blocks);
        match block {
            Some(block) => {
                blocks.push(block);
                transform(&mut node.children, blocks);
                blocks.pop();
            }
            None => transform(&mut node.children, blocks),
        }
    }
}

/// Rewrite one element's classes. Returns the block it opens, if any.
fn rewrite_classes(node: &mut ResolvedNode, blocks: &[String]) -> Option<String> {
    let classes: Vec<String> = node.classes().into_iter().map(String::from).collect();
    if classes.is_empty() {
        return None;
    }

    let mut out: Vec<String> = Vec::new();
    let mut base: Option<String> = None;
    let mut own_block: Option<String> = None;

    for class in classes {
        if let Some(element) = class.strip_prefix('-') {
            let climb = element.chars().take_while(|c| *c == '-').count();
            let element = &element[climb..];
            let Some(block) = ancestor_block(blocks, climb) else {
                out.push(class.clone());
                continue;
            };

            let (name, modifier) = match element.split_once(MODIFIER_SEPARATOR) {
                Some((name, modifier)) => (name, Some(modifier)),
                None => (element, None),
            };
            let full = format!("{block}{ELEMENT_SEPARATOR}{name}");
            out.push(full.clone());
            if let Some(modifier) = modifier {
                out.push(format!("{full}{MODIFIER_SEPARATOR}{modifier}"));
            }
            base = Some(full);
        } else if let Some(modifier) = class.strip_prefix(MODIFIER_SEPARATOR) {
            match base.as_deref().or(blocks.last().map(String::as_str)) {
                Some(base) => out.push(format!("{base}{MODIFIER_SEPARATOR}{modifier}")),
                None => out.push(class.clone()),
            }
        } else {
            if own_block.is_none() {
                own_block = Some(class.clone());
            }
            base = Some(class.clone());
            out.push(class);
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(out.len());
    for class in out {
        if !unique.contains(&class) {
            unique.push(class);
        }
    }
    node.set_classes(&unique);
    own_block
}

/// The block `climb` levels above the nearest one, clamped to the outermost.
fn ancestor_block(blocks: &[String], climb: usize) -> Option<&str> {
    let last = blocks.len().checked_sub(1)?;
    blocks
        .get(last.saturating_sub(climb))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderContext, render_markup};
    use crate::resolve::{ResolveOptions, resolve};
    use crate::snippets::SnippetTable;
    use abbrev_syntax::Abbreviation;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn bem(input: &str) -> ResolvedTree {
        let abbr = Abbreviation::parse(input).unwrap();
        let mut tree = resolve(&abbr, &SnippetTable::default(), &ResolveOptions::default());
        BemFilter.apply(&mut tree, &mut OutputProfile::default());
        tree
    }

    fn classes(node: &ResolvedNode) -> String {
        node.classes().join(" ")
    }

    #[test]
    fn block_element_modifier() {
        let tree = bem("ul.search-form._wide>li.-querystring+li.-btn_large");
        insta::assert_snapshot!(render_markup(&tree, &RenderContext::default()), @r#"
        <ul class="search-form search-form_wide">
        	<li class="search-form__querystring"></li>
        	<li class="search-form__btn search-form__btn_large"></li>
        </ul>
        "#);
    }

    #[rstest]
    #[case("div.b>div.-e", "b__e")]
    #[case("div.b>div.c>div.-e", "c__e")]
    #[case("div.b>div.c>div.--e", "b__e")]
    #[case("div.b>div.c>div.----e", "b__e")]
    #[case("div.b>div>div.-e", "b__e")]
    #[case("div.b>div.-e._m", "b__e b__e_m")]
    #[case("div.b>div._m", "b_m")]
    #[case("div.b>div.-e.-e", "b__e")]
    fn nested(#[case] input: &str, #[case] expected: &str) {
        let tree = bem(input);
        let mut node = &tree.nodes[0];
        while let Some(child) = node.children.first() {
            node = child;
        }
        assert_eq!(classes(node), expected);
    }

    #[test]
    fn prefixed_classes_without_a_block_are_kept() {
        let tree = bem("div.-e._m");
        assert_eq!(classes(&tree.nodes[0]), "-e _m");
    }

    #[test]
    fn only_classes_change() {
        let tree = bem("a#top.b[title=x]>span.-e");
        let a = &tree.nodes[0];
        assert_eq!(a.name.as_deref(), Some("a"));
        assert_eq!(a.attribute("id").and_then(|a| a.value.as_deref()), Some("top"));
        assert_eq!(a.attribute("title").and_then(|a| a.value.as_deref()), Some("x"));
        assert_eq!(classes(&a.children[0]), "b__e");
    }
}
