//! Math typesetting

use thiserror::Error;

use super::components::{Component, Props};
use super::node::{Math, MathDisplay, MathFallback, Node};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TypesetError(pub String);

/// Turns TeX source into displayable markup
pub trait Typesetter: Send + Sync {
    fn typeset(&self, tex: &str, display: MathDisplay) -> Result<String, TypesetError>;
}

/// TeX to MathML, rendered natively by browsers
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlTypesetter;

impl Typesetter for MathMlTypesetter {
    fn typeset(&self, tex: &str, display: MathDisplay) -> Result<String, TypesetError> {
        let style = match display {
            MathDisplay::Inline => latex2mathml::DisplayStyle::Inline,
            MathDisplay::Display => latex2mathml::DisplayStyle::Block,
        };
        latex2mathml::latex_to_mathml(tex, style).map_err(|e| TypesetError(e.to_string()))
    }
}

/// Typeset every math node in place. A node that fails becomes a fallback.
pub(crate) fn typeset_all(nodes: &mut [Node], typesetter: &dyn Typesetter) {
    for node in nodes.iter_mut() {
        match node {
            Node::Math(math) => {
                if let Err(e) = typeset_one(math, typesetter) {
                    tracing::debug!("Math fallback for {:?}: {}", math.tex, e);
                    let source = math.delimited();
                    *node = Node::MathFallback(MathFallback {
                        source,
                        reason: e.to_string(),
                    });
                }
            }
            Node::Element(element) => typeset_all(&mut element.children, typesetter),
            Node::Text(_) | Node::Html(_) | Node::MathFallback(_) => {}
        }
    }
}

fn typeset_one(math: &mut Math, typesetter: &dyn Typesetter) -> Result<(), TypesetError> {
    if math.tex.trim().is_empty() {
        return Err(TypesetError("empty math expression".to_string()));
    }
    math.markup = Some(typesetter.typeset(&math.tex, math.display)?);
    Ok(())
}

/// `<Math>x^2</Math>`, or `<Math display>...</Math>` for a block
#[derive(Debug, Clone, Copy, Default)]
pub struct MathComponent;

impl Component for MathComponent {
    fn render(&self, props: &Props) -> Node {
        let tex = if props.raw.trim().is_empty() {
            props.text()
        } else {
            props.raw.trim().to_string()
        };
        let display = match props.get("display") {
            Some("false") | None => MathDisplay::Inline,
            Some(_) => MathDisplay::Display,
        };
        Node::Math(Math::new(display, tex))
    }
}
