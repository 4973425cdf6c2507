//! Builds a node tree from the markdown event stream

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Parser, Tag};
use std::ops::Range;

use super::components::{
    parse_close_tag, parse_open_tag, split_elements, ComponentMap, OpenTag, Props,
};
use super::node::{Element, Math, MathDisplay, MathFallback, Node};
use super::RenderPipeline;

const UNTERMINATED_MATH: &str = "unterminated math delimiter";

enum FrameKind {
    Element,
    Image,
    TableHead,
    Table,
    CodeBlock { lang: Option<String>, code: String },
    HtmlBlock { raw: String, range: Range<usize> },
    Component { tag: OpenTag, open_html: String, raw_start: usize },
}

struct Frame {
    kind: FrameKind,
    element: Element,
}

impl Frame {
    fn element(name: &str) -> Self {
        Self::new(FrameKind::Element, Element::new(name))
    }

    fn new(kind: FrameKind, element: Element) -> Self {
        Self { kind, element }
    }
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

pub(crate) struct TreeBuilder<'a> {
    pipeline: &'a RenderPipeline,
    components: &'a ComponentMap,
    source: &'a str,
    stack: Vec<Frame>,
    root: Vec<Node>,
    table: TableState,
    /// Adjacent text events, merged before inspection
    pending: Option<(String, Range<usize>)>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(pipeline: &'a RenderPipeline, components: &'a ComponentMap, source: &'a str) -> Self {
        Self {
            pipeline,
            components,
            source,
            stack: Vec::new(),
            root: Vec::new(),
            table: TableState::default(),
            pending: None,
        }
    }

    pub fn build(mut self) -> Vec<Node> {
        let parser = Parser::new_ext(self.source, self.pipeline.parser_options());

        for (event, range) in parser.into_offset_iter() {
            if let Event::Text(text) = &event {
                if !self.in_code_block() {
                    self.buffer_text(text, range);
                    continue;
                }
            }
            self.flush_text();

            match event {
                Event::Start(tag) => self.start(tag, range),
                Event::End(_) => self.end(),
                Event::Text(text) => self.code_text(&text),
                Event::Code(code) => self.push(
                    Element::new("code")
                        .with_children(vec![Node::text(code.to_string())])
                        .into(),
                ),
                Event::InlineMath(tex) => {
                    self.push(Node::Math(Math::new(MathDisplay::Inline, tex.to_string())))
                }
                Event::DisplayMath(tex) => {
                    self.push(Node::Math(Math::new(MathDisplay::Display, tex.to_string())))
                }
                Event::Html(html) => match self.stack.last_mut() {
                    Some(Frame {
                        kind: FrameKind::HtmlBlock { raw, .. },
                        ..
                    }) => raw.push_str(&html),
                    _ => self.inline_html(&html, range),
                },
                Event::InlineHtml(html) => self.inline_html(&html, range),
                Event::FootnoteReference(label) => {
                    let link = Element::new("a")
                        .with_attr("href", format!("#{}", label))
                        .with_children(vec![Node::text(label.to_string())]);
                    self.push(
                        Element::new("sup")
                            .with_attr("class", "footnote-reference")
                            .with_children(vec![link.into()])
                            .into(),
                    );
                }
                Event::SoftBreak => self.push(Node::text("\n")),
                Event::HardBreak => self.push(Element::new("br").into()),
                Event::Rule => self.push(Element::new("hr").into()),
                Event::TaskListMarker(checked) => {
                    let mut input = Element::new("input")
                        .with_attr("type", "checkbox")
                        .with_attr("disabled", "");
                    if checked {
                        input = input.with_attr("checked", "");
                    }
                    self.push(input.into());
                }
            }
        }

        self.flush_text();

        // Unclosed components at the end of the body stay as written
        while !self.stack.is_empty() {
            self.unwind_top();
        }

        self.root
    }

    fn start(&mut self, tag: Tag, range: Range<usize>) {
        let frame = match tag {
            Tag::Paragraph => Frame::element("p"),
            Tag::Heading { level, id, .. } => {
                let mut element = Element::new(level.to_string());
                if let Some(id) = id {
                    element = element.with_attr("id", id.to_string());
                }
                Frame::new(FrameKind::Element, element)
            }
            Tag::BlockQuote(_) => Frame::element("blockquote"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                Frame::new(
                    FrameKind::CodeBlock {
                        lang,
                        code: String::new(),
                    },
                    Element::new("pre"),
                )
            }
            Tag::HtmlBlock => Frame::new(
                FrameKind::HtmlBlock {
                    raw: String::new(),
                    range,
                },
                Element::new("div"),
            ),
            Tag::List(Some(1)) => Frame::element("ol"),
            Tag::List(Some(start)) => Frame::new(
                FrameKind::Element,
                Element::new("ol").with_attr("start", start.to_string()),
            ),
            Tag::List(None) => Frame::element("ul"),
            Tag::Item => Frame::element("li"),
            Tag::FootnoteDefinition(label) => Frame::new(
                FrameKind::Element,
                Element::new("div")
                    .with_attr("class", "footnote-definition")
                    .with_attr("id", label.to_string()),
            ),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..Default::default()
                };
                Frame::new(FrameKind::Table, Element::new("table"))
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.cell = 0;
                Frame::new(FrameKind::TableHead, Element::new("tr"))
            }
            Tag::TableRow => {
                self.table.cell = 0;
                Frame::element("tr")
            }
            Tag::TableCell => {
                let name = if self.table.in_head { "th" } else { "td" };
                let mut element = Element::new(name);
                let align = match self.table.alignments.get(self.table.cell) {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    Some(Alignment::None) | None => None,
                };
                if let Some(align) = align {
                    element = element.with_attr("style", format!("text-align: {}", align));
                }
                self.table.cell += 1;
                Frame::new(FrameKind::Element, element)
            }
            Tag::Emphasis => Frame::element("em"),
            Tag::Strong => Frame::element("strong"),
            Tag::Strikethrough => Frame::element("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut element = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    element = element.with_attr("title", title.to_string());
                }
                Frame::new(FrameKind::Element, element)
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut element = Element::new("img").with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    element = element.with_attr("title", title.to_string());
                }
                Frame::new(FrameKind::Image, element)
            }
            _ => Frame::element("div"),
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        // Inline components left open inside the closing element
        while matches!(
            self.stack.last(),
            Some(Frame {
                kind: FrameKind::Component { .. },
                ..
            })
        ) {
            self.unwind_top();
        }

        let Some(Frame { kind, mut element }) = self.stack.pop() else {
            return;
        };

        match kind {
            FrameKind::Element => self.push(element.into()),
            FrameKind::Image => {
                let alt: String = element.children.iter().map(Node::text_content).collect();
                element.children.clear();
                self.push(element.with_attr("alt", alt).into());
            }
            FrameKind::TableHead => {
                self.table.in_head = false;
                let head = Element::new("thead").with_children(vec![element.into()]);
                self.push(head.into());
            }
            FrameKind::Table => {
                let mut children = std::mem::take(&mut element.children).into_iter();
                let mut rebuilt: Vec<Node> = children.next().into_iter().collect();
                let rows: Vec<Node> = children.collect();
                if !rows.is_empty() {
                    rebuilt.push(Element::new("tbody").with_children(rows).into());
                }
                self.table = TableState::default();
                self.push(element.with_children(rebuilt).into());
            }
            FrameKind::CodeBlock { lang, code } => {
                let html = self.pipeline.code_block(&code, lang.as_deref());
                self.push(Node::Html(html));
            }
            FrameKind::HtmlBlock { raw, range } => self.html_block(raw, range),
            FrameKind::Component { open_html, .. } => self.spill(open_html, element.children),
        }
    }

    /// Turn an unclosed component frame back into the markup it came from
    fn unwind_top(&mut self) {
        let Some(Frame { kind, element }) = self.stack.pop() else {
            return;
        };
        match kind {
            FrameKind::Component { open_html, tag, .. } => {
                tracing::debug!("Component <{}> was never closed", tag.name);
                self.spill(open_html, element.children);
            }
            _ => self.push(element.into()),
        }
    }

    /// Put an unmatched opening tag and what followed it back in place
    fn spill(&mut self, open_html: String, children: Vec<Node>) {
        self.push(Node::Html(open_html));
        for child in children {
            self.push(child);
        }
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.element.children.push(node),
            None => self.root.push(node),
        }
    }

    fn in_code_block(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame {
                kind: FrameKind::CodeBlock { .. },
                ..
            })
        )
    }

    fn code_text(&mut self, text: &str) {
        if let Some(Frame {
            kind: FrameKind::CodeBlock { code, .. },
            ..
        }) = self.stack.last_mut()
        {
            code.push_str(text);
        }
    }

    fn buffer_text(&mut self, text: &str, range: Range<usize>) {
        match &mut self.pending {
            Some((buffer, buffered)) if buffered.end == range.start => {
                buffer.push_str(text);
                buffered.end = range.end;
            }
            _ => {
                self.flush_text();
                self.pending = Some((text.to_string(), range));
            }
        }
    }

    fn flush_text(&mut self) {
        if let Some((text, range)) = self.pending.take() {
            self.text(&text, range);
        }
    }

    fn text(&mut self, text: &str, range: Range<usize>) {
        if !self.pipeline.flags_unbalanced_math() {
            self.push(Node::text(text));
            return;
        }

        match self.stray_delimiter(text, range) {
            Some(pos) => {
                if pos > 0 {
                    self.push(Node::text(&text[..pos]));
                }
                self.push(Node::MathFallback(MathFallback {
                    source: text[pos..].to_string(),
                    reason: UNTERMINATED_MATH.to_string(),
                }));
            }
            None => self.push(Node::text(text)),
        }
    }

    /// Byte offset in `text` of a `$` the math pass left unmatched.
    ///
    /// Escapes are judged in the source: a `$` after an odd run of
    /// backslashes is literal. Text and source hold the same `$` characters
    /// in the same order, so the n-th source `$` is the n-th text `$`.
    fn stray_delimiter(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let source = self.source.get(range.clone())?;
        let bytes = self.source.as_bytes();

        let (nth, _) = source.match_indices('$').enumerate().find(|(_, (i, _))| {
            let at = range.start + i;
            let backslashes = bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count();
            backslashes % 2 == 0
        })?;

        text.match_indices('$').nth(nth).map(|(i, _)| i)
    }

    fn inline_html(&mut self, html: &str, range: Range<usize>) {
        if let Some(tag) = parse_open_tag(html) {
            if self.components.contains(&tag.name) {
                if tag.self_closing {
                    let node = self.render_component(&tag, Vec::new(), String::new());
                    self.push(node);
                } else {
                    self.stack.push(Frame::new(
                        FrameKind::Component {
                            tag,
                            open_html: html.to_string(),
                            raw_start: range.end,
                        },
                        Element::new("div"),
                    ));
                }
                return;
            }
            tracing::debug!("No component registered for <{}>", tag.name);
        } else if let Some(name) = parse_close_tag(html) {
            if self.close_component(&name, range.start) {
                return;
            }
        }
        self.push(Node::Html(html.to_string()));
    }

    fn html_block(&mut self, raw: String, range: Range<usize>) {
        let trimmed = raw.trim();

        if let Some(elements) = split_elements(trimmed) {
            if elements.iter().any(|e| self.components.contains(&e.tag.name)) {
                for element in elements {
                    if !self.components.contains(&element.tag.name) {
                        tracing::debug!("No component registered for <{}>", element.tag.name);
                        self.push(Node::Html(element.raw));
                        continue;
                    }
                    let children = if element.tag.self_closing {
                        Vec::new()
                    } else {
                        self.pipeline.build(&element.inner, self.components)
                    };
                    let node = self.render_component(&element.tag, children, element.inner);
                    self.push(node);
                }
                return;
            }
        }

        if let Some(tag) = parse_open_tag(trimmed) {
            if self.components.contains(&tag.name) {
                if tag.self_closing {
                    let node = self.render_component(&tag, Vec::new(), String::new());
                    self.push(node);
                } else {
                    self.stack.push(Frame::new(
                        FrameKind::Component {
                            tag,
                            open_html: raw,
                            raw_start: range.end,
                        },
                        Element::new("div"),
                    ));
                }
                return;
            }
            tracing::debug!("No component registered for <{}>", tag.name);
        } else if let Some(name) = parse_close_tag(trimmed) {
            if self.close_component(&name, range.start) {
                return;
            }
        }

        self.push(Node::Html(raw));
    }

    /// Close the component on top of the stack if it has this name
    fn close_component(&mut self, name: &str, raw_end: usize) -> bool {
        let is_open = matches!(
            self.stack.last(),
            Some(Frame { kind: FrameKind::Component { tag, .. }, .. }) if tag.name == name
        );
        if !is_open {
            return false;
        }

        let Some(Frame {
            kind: FrameKind::Component { tag, raw_start, .. },
            element,
        }) = self.stack.pop()
        else {
            return false;
        };

        let raw = self
            .source
            .get(raw_start..raw_end)
            .unwrap_or_default()
            .to_string();
        let node = self.render_component(&tag, element.children, raw);
        self.push(node);
        true
    }

    fn render_component(&self, tag: &OpenTag, children: Vec<Node>, raw: String) -> Node {
        let props = Props {
            attributes: tag.attributes.clone(),
            children,
            raw,
        };
        match self.components.get(&tag.name) {
            Some(component) => component.render(&props),
            None => Node::Html(String::new()),
        }
    }
}
