//! Built-in snippet tables and per-language overrides.
//!
//! Markup templates are themselves abbreviations (`img` → `img[src alt]/`).
//! Stylesheet templates are `property` or `property:value` pairs.

use std::collections::{BTreeMap, HashMap};

use abbrev_config::{SnippetOverrides, Variables};

use crate::context::Syntax;

const MARKUP_SNIPPETS: &[(&str, &str)] = &[
    (
        "!",
        "{<!DOCTYPE html>}+html[lang=${lang}]>(head>meta[charset=${charset}]+meta:vp+title{Document})+body",
    ),
    ("a", "a[href]"),
    ("a:link", "a[href=http://]"),
    ("a:mail", "a[href=mailto:]"),
    ("abbr", "abbr[title]"),
    ("area", "area[shape coords href alt]/"),
    ("base", "base[href]/"),
    ("bq", "blockquote"),
    ("br", "br/"),
    ("btn", "button"),
    ("btn:b", "button[type=button]"),
    ("btn:r", "button[type=reset]"),
    ("btn:s", "button[type=submit]"),
    ("col", "col/"),
    ("dl+", "dl>dt+dd"),
    ("embed", "embed[src type]/"),
    ("fst", "fieldset"),
    ("form", "form[action]"),
    ("form:get", "form[action method=get]"),
    ("form:post", "form[action method=post]"),
    ("hr", "hr/"),
    ("iframe", "iframe[src frameborder=0]"),
    ("img", "img[src alt]/"),
    ("input", "input[type=text]/"),
    ("input:c", "input[type=checkbox]/"),
    ("input:h", "input[type=hidden name]/"),
    ("input:p", "input[type=password name id]/"),
    ("input:r", "input[type=radio name id]/"),
    ("input:s", "input[type=submit value]/"),
    ("input:t", "input[type=text name id]/"),
    ("label", "label[for]"),
    ("link", "link[rel=stylesheet href]/"),
    ("link:css", "link[rel=stylesheet href=style.css]/"),
    ("meta", "meta/"),
    ("meta:utf", "meta[http-equiv=Content-Type content=\"text/html;charset=UTF-8\"]/"),
    (
        "meta:vp",
        "meta[name=viewport content=\"width=device-width, initial-scale=1.0\"]/",
    ),
    ("ol+", "ol>li"),
    ("opt", "option[value]"),
    ("option", "option[value]"),
    ("param", "param[name value]/"),
    ("pic", "picture"),
    ("script:src", "script[src]"),
    ("select", "select[name id]"),
    ("source", "source/"),
    ("src", "source/"),
    ("str", "strong"),
    ("table+", "table>tr>td"),
    ("textarea", "textarea[name id cols=30 rows=10]"),
    ("tr+", "tr>td"),
    ("ul+", "ul>li"),
];

const STYLESHEET_SNIPPETS: &[(&str, &str)] = &[
    ("ai", "align-items"),
    ("ai:c", "align-items:center"),
    ("ai:fe", "align-items:flex-end"),
    ("ai:fs", "align-items:flex-start"),
    ("b", "bottom"),
    ("bd", "border"),
    ("bd:n", "border:none"),
    ("bdb", "border-bottom"),
    ("bdc", "border-color"),
    ("bdl", "border-left"),
    ("bdr", "border-right"),
    ("bdrs", "border-radius"),
    ("bdt", "border-top"),
    ("bg", "background"),
    ("bgc", "background-color"),
    ("bgi", "background-image"),
    ("bs", "box-shadow"),
    ("bxz", "box-sizing"),
    ("bxz:bb", "box-sizing:border-box"),
    ("c", "color"),
    ("cl", "clear"),
    ("cl:b", "clear:both"),
    ("ct", "content"),
    ("cur", "cursor"),
    ("cur:p", "cursor:pointer"),
    ("d", "display"),
    ("d:b", "display:block"),
    ("d:f", "display:flex"),
    ("d:g", "display:grid"),
    ("d:i", "display:inline"),
    ("d:ib", "display:inline-block"),
    ("d:if", "display:inline-flex"),
    ("d:n", "display:none"),
    ("d:t", "display:table"),
    ("ff", "font-family"),
    ("fl", "float"),
    ("fl:l", "float:left"),
    ("fl:n", "float:none"),
    ("fl:r", "float:right"),
    ("fs", "font-style"),
    ("fs:i", "font-style:italic"),
    ("fw", "font-weight"),
    ("fw:b", "font-weight:bold"),
    ("fx", "flex"),
    ("fxd", "flex-direction"),
    ("fxd:c", "flex-direction:column"),
    ("fxd:r", "flex-direction:row"),
    ("fxw", "flex-wrap"),
    ("fxw:w", "flex-wrap:wrap"),
    ("fz", "font-size"),
    ("gap", "gap"),
    ("h", "height"),
    ("jc", "justify-content"),
    ("jc:c", "justify-content:center"),
    ("jc:sa", "justify-content:space-around"),
    ("jc:sb", "justify-content:space-between"),
    ("l", "left"),
    ("lh", "line-height"),
    ("lts", "letter-spacing"),
    ("m", "margin"),
    ("m:a", "margin:auto"),
    ("mah", "max-height"),
    ("maw", "max-width"),
    ("mb", "margin-bottom"),
    ("mih", "min-height"),
    ("miw", "min-width"),
    ("ml", "margin-left"),
    ("mr", "margin-right"),
    ("mt", "margin-top"),
    ("ol", "outline"),
    ("ol:n", "outline:none"),
    ("op", "opacity"),
    ("ov", "overflow"),
    ("ov:a", "overflow:auto"),
    ("ov:h", "overflow:hidden"),
    ("ov:s", "overflow:scroll"),
    ("ov:v", "overflow:visible"),
    ("p", "padding"),
    ("pb", "padding-bottom"),
    ("pl", "padding-left"),
    ("pos", "position"),
    ("pos:a", "position:absolute"),
    ("pos:f", "position:fixed"),
    ("pos:r", "position:relative"),
    ("pos:s", "position:static"),
    ("pr", "padding-right"),
    ("pt", "padding-top"),
    ("r", "right"),
    ("t", "top"),
    ("ta", "text-align"),
    ("ta:c", "text-align:center"),
    ("ta:l", "text-align:left"),
    ("ta:r", "text-align:right"),
    ("td", "text-decoration"),
    ("td:n", "text-decoration:none"),
    ("td:u", "text-decoration:underline"),
    ("ti", "text-indent"),
    ("trf", "transform"),
    ("trs", "transition"),
    ("tt", "text-transform"),
    ("tt:u", "text-transform:uppercase"),
    ("us", "user-select"),
    ("v", "visibility"),
    ("v:h", "visibility:hidden"),
    ("v:v", "visibility:visible"),
    ("va", "vertical-align"),
    ("va:m", "vertical-align:middle"),
    ("w", "width"),
    ("whs", "white-space"),
    ("whs:nw", "white-space:nowrap"),
    ("z", "z-index"),
    ("zm", "zoom"),
];

/// Ordered `name → template` mapping for one syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetTable {
    entries: BTreeMap<String, String>,
}

impl SnippetTable {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(name.into(), template.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { entries }
    }

    fn extend(&mut self, overrides: &BTreeMap<String, String>, syntax: Syntax) {
        for (name, template) in overrides {
            let template = match syntax {
                // `|` marks the caret position in stylesheet snippets
                Syntax::Stylesheet => template.replace('|', ""),
                Syntax::Markup => template.clone(),
            };
            self.insert(name.clone(), template);
        }
    }

    fn substitute_variables(&mut self, variables: &Variables) {
        for template in self.entries.values_mut() {
            if template.contains("${") {
                *template = template
                    .replace("${lang}", &variables.lang)
                    .replace("${charset}", &variables.charset);
            }
        }
    }
}

/// Markup and stylesheet tables with language-specific layers on top.
///
/// Overrides under `html` extend every markup language and overrides
/// under `css` extend every stylesheet language; any other key produces a
/// table for that language only.
#[derive(Debug, Clone)]
pub struct SnippetRegistry {
    markup: SnippetTable,
    stylesheet: SnippetTable,
    languages: HashMap<String, SnippetTable>,
}

impl Default for SnippetRegistry {
    fn default() -> Self {
        Self::builtin(&Variables::default())
    }
}

impl SnippetRegistry {
    pub fn builtin(variables: &Variables) -> Self {
        Self::with_overrides(&SnippetOverrides::new(), variables)
    }

    pub fn with_overrides(overrides: &SnippetOverrides, variables: &Variables) -> Self {
        let mut markup = SnippetTable::from_pairs(MARKUP_SNIPPETS);
        let mut stylesheet = SnippetTable::from_pairs(STYLESHEET_SNIPPETS);
        if let Some(html) = overrides.get("html") {
            markup.extend(html, Syntax::Markup);
        }
        if let Some(css) = overrides.get("css") {
            stylesheet.extend(css, Syntax::Stylesheet);
        }

        let mut languages = HashMap::new();
        for (language, table) in overrides {
            if language == "html" || language == "css" {
                continue;
            }
            let syntax = Syntax::of(language).unwrap_or(Syntax::Markup);
            let mut layered = match syntax {
                Syntax::Stylesheet => stylesheet.clone(),
                Syntax::Markup => markup.clone(),
            };
            layered.extend(table, syntax);
            layered.substitute_variables(variables);
            languages.insert(language.clone(), layered);
        }

        markup.substitute_variables(variables);
        stylesheet.substitute_variables(variables);

        Self {
            markup,
            stylesheet,
            languages,
        }
    }

    pub fn markup(&self, language: &str) -> &SnippetTable {
        self.languages.get(language).unwrap_or(&self.markup)
    }

    pub fn stylesheet(&self, language: &str) -> &SnippetTable {
        self.languages.get(language).unwrap_or(&self.stylesheet)
    }
}
