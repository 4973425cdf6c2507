//! Caller-supplied components for JSX-style tags in post bodies
//!
//! A body may reference components by capitalized tag name, either
//! self-closing (`<Chart src="a.csv" />`) or wrapping content
//! (`<Note kind="tip">...</Note>`). Each name resolves through a
//! [`ComponentMap`]; the set of names is whatever the caller registers.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::math::MathComponent;
use super::node::Node;

lazy_static! {
    static ref OPEN_TAG: Regex =
        Regex::new(r"^<([A-Z][A-Za-z0-9_.]*)((?:\s+[^<>]*?)?)\s*(/?)>$").unwrap();
    static ref CLOSE_TAG: Regex = Regex::new(r"^</([A-Z][A-Za-z0-9_.]*)\s*>$").unwrap();
    static ref ANY_TAG: Regex =
        Regex::new(r"<(/?)([A-Z][A-Za-z0-9_.]*)((?:\s+[^<>]*?)?)\s*(/?)>").unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}))?"#
    )
    .unwrap();
}

/// Inputs handed to a component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    /// Attribute values; bare attributes are `"true"`, `{expr}` keeps `expr`
    pub attributes: BTreeMap<String, String>,
    /// Rendered content between the opening and closing tag
    pub children: Vec<Node>,
    /// Unrendered source between the opening and closing tag
    pub raw: String,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Plain text of the children
    pub fn text(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

/// Something that renders a custom tag
pub trait Component: Send + Sync {
    fn render(&self, props: &Props) -> Node;
}

impl<F> Component for F
where
    F: Fn(&Props) -> Node + Send + Sync,
{
    fn render(&self, props: &Props) -> Node {
        self(props)
    }
}

/// Tag name to component
#[derive(Default)]
pub struct ComponentMap {
    components: HashMap<String, Box<dyn Component>>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with the built-in `Math` component registered
    pub fn with_defaults() -> Self {
        Self::new().with("Math", MathComponent)
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        component: impl Component + 'static,
    ) -> &mut Self {
        self.components.insert(name.into(), Box::new(component));
        self
    }

    pub fn with(mut self, name: impl Into<String>, component: impl Component + 'static) -> Self {
        self.register(name, component);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Component> {
        self.components.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMap")
            .field("components", &self.names())
            .finish()
    }
}

/// A parsed opening tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenTag {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub self_closing: bool,
}

pub(crate) fn parse_open_tag(html: &str) -> Option<OpenTag> {
    let caps = OPEN_TAG.captures(html.trim())?;
    Some(OpenTag {
        name: caps[1].to_string(),
        attributes: parse_attributes(caps.get(2).map_or("", |m| m.as_str())),
        self_closing: !caps[3].is_empty(),
    })
}

pub(crate) fn parse_close_tag(html: &str) -> Option<String> {
    CLOSE_TAG
        .captures(html.trim())
        .map(|caps| caps[1].to_string())
}

/// One complete top-level component element in a block of markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedElement {
    pub tag: OpenTag,
    /// Source between the opening and the balancing closing tag
    pub inner: String,
    /// The whole element as written
    pub raw: String,
}

/// Split markup made only of complete component elements, such as
/// `<Note>a</Note>\n<Note>b</Note>`, into those elements.
///
/// Each opening tag is closed by the closing tag that balances it, so
/// nested elements of the same name stay inside their parent. `None` when
/// anything other than whitespace sits between elements, or a tag is left
/// open.
pub(crate) fn split_elements(html: &str) -> Option<Vec<ParsedElement>> {
    let mut elements = Vec::new();
    let mut rest = html.trim();

    while !rest.is_empty() {
        let open = ANY_TAG.captures(rest)?;
        let whole = open.get(0)?;
        if whole.start() != 0 || !open[1].is_empty() {
            return None;
        }
        let name = &open[2];
        let tag = OpenTag {
            name: name.to_string(),
            attributes: parse_attributes(open.get(3).map_or("", |m| m.as_str())),
            self_closing: !open[4].is_empty(),
        };

        if tag.self_closing {
            elements.push(ParsedElement {
                tag,
                inner: String::new(),
                raw: whole.as_str().to_string(),
            });
            rest = rest[whole.end()..].trim_start();
            continue;
        }

        let mut depth = 1usize;
        let mut close = None;
        for caps in ANY_TAG.captures_iter(&rest[whole.end()..]) {
            if &caps[2] != name || !caps[4].is_empty() {
                continue;
            }
            if caps[1].is_empty() {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    close = caps.get(0);
                    break;
                }
            }
        }
        let close = close?;
        let inner_end = whole.end() + close.start();
        let end = whole.end() + close.end();

        elements.push(ParsedElement {
            tag,
            inner: rest[whole.end()..inner_end].to_string(),
            raw: rest[..end].to_string(),
        });
        rest = rest[end..].trim_start();
    }

    (!elements.is_empty()).then_some(elements)
}

fn parse_attributes(source: &str) -> BTreeMap<String, String> {
    ATTRIBUTE
        .captures_iter(source)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("true", |m| m.as_str());
            (caps[1].to_string(), value.trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::Element;

    #[test]
    fn test_parse_open_tag() {
        let tag = parse_open_tag(r#"<Chart src="a.csv" height={300} wide />"#).unwrap();
        assert_eq!(tag.name, "Chart");
        assert!(tag.self_closing);
        assert_eq!(tag.attributes["src"], "a.csv");
        assert_eq!(tag.attributes["height"], "300");
        assert_eq!(tag.attributes["wide"], "true");

        let tag = parse_open_tag("<Note kind='tip'>").unwrap();
        assert_eq!(tag.name, "Note");
        assert!(!tag.self_closing);
        assert_eq!(tag.attributes["kind"], "tip");

        let tag = parse_open_tag("<Math>").unwrap();
        assert!(tag.attributes.is_empty());
    }

    #[test]
    fn test_lowercase_tags_are_not_components() {
        assert!(parse_open_tag("<div>").is_none());
        assert!(parse_open_tag("<br />").is_none());
        assert!(parse_close_tag("</span>").is_none());
    }

    #[test]
    fn test_parse_close_tag() {
        assert_eq!(parse_close_tag("</Note>").as_deref(), Some("Note"));
        assert_eq!(parse_close_tag("</Note >\n").as_deref(), Some("Note"));
    }

    #[test]
    fn test_split_single_element() {
        let elements = split_elements("<Math display>\\sum_i x_i</Math>\n").unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].tag.name, "Math");
        assert_eq!(elements[0].tag.attributes["display"], "true");
        assert_eq!(elements[0].inner, "\\sum_i x_i");
        assert_eq!(elements[0].raw, "<Math display>\\sum_i x_i</Math>");
    }

    #[test]
    fn test_split_sibling_elements() {
        let elements =
            split_elements("<Note>\none\n</Note>\n<Note kind=\"tip\">\ntwo\n</Note>\n<Chart />").unwrap();
        let names: Vec<_> = elements.iter().map(|e| e.tag.name.as_str()).collect();
        assert_eq!(names, vec!["Note", "Note", "Chart"]);
        assert_eq!(elements[0].inner, "\none\n");
        assert_eq!(elements[1].inner, "\ntwo\n");
        assert_eq!(elements[1].tag.attributes["kind"], "tip");
        assert!(elements[2].tag.self_closing);
    }

    #[test]
    fn test_split_balances_nested_elements() {
        let elements = split_elements("<Note>a<Note>b</Note>c</Note>").unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].inner, "a<Note>b</Note>c");
    }

    #[test]
    fn test_split_rejects_partial_markup() {
        assert!(split_elements("<Note>text</Other>").is_none());
        assert!(split_elements("<Note>\nnever closed").is_none());
        assert!(split_elements("</Note>").is_none());
        assert!(split_elements("<Note>a</Note> trailing").is_none());
        assert!(split_elements("<div>a</div>").is_none());
    }

    #[test]
    fn test_component_map() {
        let mut map = ComponentMap::with_defaults();
        map.register("Badge", |props: &Props| {
            Node::from(
                Element::new("span")
                    .with_attr("class", "badge")
                    .with_children(vec![Node::text(props.get("label").unwrap_or("?"))]),
            )
        });

        assert_eq!(map.names(), vec!["Badge", "Math"]);
        assert!(map.contains("Math"));
        assert!(!map.contains("Chart"));

        let mut props = Props::default();
        props.attributes.insert("label".into(), "new".into());
        let node = map.get("Badge").unwrap().render(&props);
        assert_eq!(node.text_content(), "new");
    }
}
