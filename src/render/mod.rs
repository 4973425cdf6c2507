//! Rendering pipeline - turns a post body into a document tree
//!
//! Three passes run in a fixed order, each switchable through
//! [`RenderConfig`]:
//!
//! 1. extended syntax: tables, strikethrough, task lists, footnotes
//! 2. math extraction: `$...$` and `$$...$$` become math nodes, an
//!    unmatched `$` is flagged in place
//! 3. math rendering: math nodes are typeset; a failure is flagged in place
//!
//! Rendering never fails. Anything that cannot be rendered shows up as a
//! [`Node::MathFallback`] and the rest of the body renders normally.

mod builder;
pub mod components;
mod highlight;
pub mod math;
mod node;

use pulldown_cmark::Options;

use crate::config::RenderConfig;
use builder::TreeBuilder;
use highlight::{plain_code_block, CodeHighlighter};

pub use components::{Component, ComponentMap, Props};
pub use math::{MathComponent, MathMlTypesetter, TypesetError, Typesetter};
pub use node::{Element, Math, MathDisplay, MathFallback, Node, RenderedDocument};

/// Markdown + components + math renderer
pub struct RenderPipeline {
    config: RenderConfig,
    typesetter: Box<dyn Typesetter>,
    highlighter: Option<CodeHighlighter>,
}

impl RenderPipeline {
    pub fn new(config: RenderConfig) -> Self {
        let highlighter = config
            .highlight
            .enable
            .then(|| CodeHighlighter::new(&config.highlight));
        Self {
            config,
            typesetter: Box::new(MathMlTypesetter),
            highlighter,
        }
    }

    /// Replace the math typesetter
    pub fn with_typesetter(mut self, typesetter: impl Typesetter + 'static) -> Self {
        self.typesetter = Box::new(typesetter);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a post body
    pub fn render(&self, body: &str, components: &ComponentMap) -> RenderedDocument {
        let mut children = self.build(body, components);

        if self.config.math_rendering {
            math::typeset_all(&mut children, self.typesetter.as_ref());
        }

        RenderedDocument { children }
    }

    /// Passes 1 and 2, plus component resolution
    fn build(&self, body: &str, components: &ComponentMap) -> Vec<Node> {
        TreeBuilder::new(self, components, body).build()
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.config.extended_syntax {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES;
        }
        if self.config.math_extraction {
            options |= Options::ENABLE_MATH;
        }
        options
    }

    fn flags_unbalanced_math(&self) -> bool {
        self.config.math_extraction && self.config.flag_unbalanced_math
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        match &self.highlighter {
            Some(highlighter) => highlighter.highlight(code, lang),
            None => plain_code_block(code, lang),
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
