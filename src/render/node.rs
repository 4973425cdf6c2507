//! Rendered document tree

use serde::Serialize;

use crate::helpers::html_escape;

/// Elements that get a trailing newline in HTML output
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "hr", "table",
    "thead", "tbody", "tr", "div", "aside", "figure", "section",
];

/// Elements without a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// A node of a rendered document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(String),
    /// Markup passed through untouched
    Html(String),
    Math(Math),
    /// A fragment that could not be rendered, shown in place
    MathFallback(MathFallback),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MathDisplay {
    Inline,
    Display,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Math {
    pub display: MathDisplay,
    /// TeX source without delimiters
    pub tex: String,
    /// Typeset markup, once the typesetting pass has run
    pub markup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathFallback {
    /// Offending source text
    pub source: String,
    pub reason: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push_str(&format!(r#" {}="{}""#, key, html_escape(value)));
        }

        if VOID_ELEMENTS.contains(&self.name.as_str()) {
            out.push_str(" />");
        } else {
            out.push('>');
            for child in &self.children {
                child.write_html(out);
            }
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }

        if BLOCK_ELEMENTS.contains(&self.name.as_str()) {
            out.push('\n');
        }
    }
}

impl Math {
    pub fn new(display: MathDisplay, tex: impl Into<String>) -> Self {
        Self {
            display,
            tex: tex.into(),
            markup: None,
        }
    }

    /// Source form including delimiters
    pub fn delimited(&self) -> String {
        match self.display {
            MathDisplay::Inline => format!("${}$", self.tex),
            MathDisplay::Display => format!("$${}$$", self.tex),
        }
    }

    fn write_html(&self, out: &mut String) {
        let (tag, class) = match self.display {
            MathDisplay::Inline => ("span", "math math-inline"),
            MathDisplay::Display => ("div", "math math-display"),
        };
        out.push_str(&format!(r#"<{} class="{}">"#, tag, class));
        match (&self.markup, self.display) {
            (Some(markup), _) => out.push_str(markup),
            // Left for a client-side renderer
            (None, MathDisplay::Inline) => {
                out.push_str(&format!(r"\({}\)", html_escape(&self.tex)))
            }
            (None, MathDisplay::Display) => {
                out.push_str(&format!(r"\[{}\]", html_escape(&self.tex)))
            }
        }
        out.push_str(&format!("</{}>", tag));
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            _ => &[],
        }
    }

    /// Concatenated text of this node and its descendants, math excluded
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Node::Html(_) | Node::Math(_) | Node::MathFallback(_) => {}
        }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) => out.push_str(&html_escape(text)),
            Node::Html(html) => out.push_str(html),
            Node::Math(math) => math.write_html(out),
            Node::MathFallback(fallback) => out.push_str(&format!(
                r#"<span class="math-error" title="{}"><code>{}</code></span>"#,
                html_escape(&fallback.reason),
                html_escape(&fallback.source)
            )),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Output of one render call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub children: Vec<Node>,
}

impl RenderedDocument {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_html(&mut out);
        }
        out
    }

    /// Every node, depth first, parents before children
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }

    /// Elements with the given tag name
    pub fn elements(&self, name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(element) if element.name == name => Some(element),
                _ => None,
            })
            .collect()
    }

    pub fn math(&self) -> Vec<&Math> {
        self.descendants()
            .into_iter()
            .filter_map(|node| match node {
                Node::Math(math) => Some(math),
                _ => None,
            })
            .collect()
    }

    pub fn fallbacks(&self) -> Vec<&MathFallback> {
        self.descendants()
            .into_iter()
            .filter_map(|node| match node {
                Node::MathFallback(fallback) => Some(fallback),
                _ => None,
            })
            .collect()
    }

    /// Plain text of the whole document, math excluded
    pub fn text(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RenderedDocument {
        RenderedDocument {
            children: vec![
                Element::new("p")
                    .with_children(vec![
                        Node::text("a < b "),
                        Element::new("strong")
                            .with_children(vec![Node::text("bold")])
                            .into(),
                        Node::Math(Math::new(MathDisplay::Inline, "x^2")),
                    ])
                    .into(),
                Element::new("hr").into(),
            ],
        }
    }

    #[test]
    fn test_to_html() {
        let html = sample().to_html();
        assert_eq!(
            html,
            "<p>a &lt; b <strong>bold</strong><span class=\"math math-inline\">\\(x^2\\)</span></p>\n<hr />\n"
        );
    }

    #[test]
    fn test_descendants_order() {
        let doc = sample();
        let names: Vec<_> = doc
            .descendants()
            .into_iter()
            .map(|n| match n {
                Node::Element(e) => e.name.clone(),
                Node::Text(_) => "#text".to_string(),
                Node::Math(_) => "#math".to_string(),
                _ => "#other".to_string(),
            })
            .collect();
        assert_eq!(names, vec!["p", "#text", "strong", "#text", "#math", "hr"]);
    }

    #[test]
    fn test_text_excludes_math() {
        assert_eq!(sample().text(), "a < b bold");
    }

    #[test]
    fn test_fallback_html() {
        let node = Node::MathFallback(MathFallback {
            source: "$x".to_string(),
            reason: "unterminated".to_string(),
        });
        let mut out = String::new();
        node.write_html(&mut out);
        assert_eq!(
            out,
            r#"<span class="math-error" title="unterminated"><code>$x</code></span>"#
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert_eq!(json["children"][0]["type"], "element");
        assert_eq!(json["children"][0]["value"]["name"], "p");
        assert_eq!(json["children"][0]["value"]["children"][2]["type"], "math");
    }
}
