//! Markdown AST to document tree conversion.
//!
//! Output follows the shape common markdown-to-HTML tooling produces:
//! fenced code becomes `pre > code.language-X`, tight list items unwrap their
//! paragraphs, and block siblings are separated by newline text nodes.

use crate::document::{AttrKey, Attributes, DataAttr, Document, NodeId};
use blogmark_core::slugify;
use markdown::mdast::{self, AlignKind, Node};
use std::collections::HashMap;

/// Builds a document tree from a parsed markdown root.
pub fn mdast_to_document(root: &Node) -> Document {
    let mut converter = Converter::new(root);
    let mut top = Vec::new();
    if let Some(children) = root.children() {
        converter.convert_blocks(children, &mut top);
    } else {
        converter.convert(root, &mut top);
    }
    let mut top = converter.wrap(top, false);
    if let Some(section) = converter.footnote_section() {
        top.push(converter.doc.text("\n"));
        top.push(section);
    }
    let root_id = converter.doc.root();
    if let Some(node) = converter.doc.node_mut(root_id) {
        node.children = top;
    }
    converter.doc
}

struct LinkDefinition<'a> {
    url: &'a str,
    title: Option<&'a str>,
}

struct Converter<'a> {
    doc: Document,
    definitions: HashMap<&'a str, LinkDefinition<'a>>,
    footnote_definitions: HashMap<&'a str, &'a [Node]>,
    footnote_order: Vec<&'a str>,
    footnote_refs: HashMap<&'a str, usize>,
    tight: Vec<bool>,
}

impl<'a> Converter<'a> {
    fn new(root: &'a Node) -> Self {
        let mut converter = Self {
            doc: Document::new(),
            definitions: HashMap::new(),
            footnote_definitions: HashMap::new(),
            footnote_order: Vec::new(),
            footnote_refs: HashMap::new(),
            tight: Vec::new(),
        };
        converter.collect_definitions(root);
        converter
    }

    fn collect_definitions(&mut self, node: &'a Node) {
        match node {
            // First definition wins, as in CommonMark.
            Node::Definition(def) => {
                self.definitions
                    .entry(def.identifier.as_str())
                    .or_insert(LinkDefinition {
                        url: &def.url,
                        title: def.title.as_deref(),
                    });
            }
            Node::FootnoteDefinition(def) => {
                self.footnote_definitions
                    .entry(def.identifier.as_str())
                    .or_insert(def.children.as_slice());
            }
            _ => {}
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    fn resolve(&self, identifier: &str) -> Option<(&'a str, Option<&'a str>)> {
        self.definitions
            .get(identifier)
            .map(|def| (def.url, def.title))
    }

    fn element(&mut self, tag: &str, attrs: Attributes, children: Vec<NodeId>) -> NodeId {
        let id = self.doc.element(tag, attrs);
        if let Some(node) = self.doc.node_mut(id) {
            node.children = children;
        }
        id
    }

    fn convert_children(&mut self, children: &'a [Node]) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in children {
            self.convert(child, &mut out);
        }
        out
    }

    fn convert_blocks(&mut self, children: &'a [Node], out: &mut Vec<NodeId>) {
        for child in children {
            self.convert(child, out);
        }
    }

    /// Joins block siblings with newline text; loose wrapping also pads both ends.
    fn wrap(&mut self, nodes: Vec<NodeId>, loose: bool) -> Vec<NodeId> {
        let mut wrapped = Vec::with_capacity(nodes.len() * 2 + 1);
        if loose {
            wrapped.push(self.doc.text("\n"));
        }
        for (index, node) in nodes.into_iter().enumerate() {
            if index > 0 {
                wrapped.push(self.doc.text("\n"));
            }
            wrapped.push(node);
        }
        if loose && wrapped.len() > 1 {
            wrapped.push(self.doc.text("\n"));
        }
        wrapped
    }

    fn convert(&mut self, node: &'a Node, out: &mut Vec<NodeId>) {
        match node {
            Node::Root(root) => self.convert_blocks(&root.children, out),
            Node::Text(text) => out.push(self.doc.text(text.value.as_str())),
            Node::Html(html) => out.push(self.doc.raw(html.value.as_str())),
            Node::Paragraph(para) => {
                let children = self.convert_children(&para.children);
                out.push(self.element("p", Attributes::new(), children));
            }
            Node::Heading(heading) => {
                let tag = format!("h{}", heading.depth.clamp(1, 6));
                let children = self.convert_children(&heading.children);
                out.push(self.element(&tag, Attributes::new(), children));
            }
            Node::Strong(strong) => {
                let children = self.convert_children(&strong.children);
                out.push(self.element("strong", Attributes::new(), children));
            }
            Node::Emphasis(emphasis) => {
                let children = self.convert_children(&emphasis.children);
                out.push(self.element("em", Attributes::new(), children));
            }
            Node::Delete(delete) => {
                let children = self.convert_children(&delete.children);
                out.push(self.element("del", Attributes::new(), children));
            }
            Node::InlineCode(code) => {
                let text = self.doc.text(code.value.as_str());
                out.push(self.element("code", Attributes::new(), vec![text]));
            }
            Node::Break(_) => {
                out.push(self.element("br", Attributes::new(), Vec::new()));
                out.push(self.doc.text("\n"));
            }
            Node::ThematicBreak(_) => out.push(self.element("hr", Attributes::new(), Vec::new())),
            Node::Blockquote(quote) => {
                let mut blocks = Vec::new();
                self.convert_blocks(&quote.children, &mut blocks);
                let children = self.wrap(blocks, true);
                out.push(self.element("blockquote", Attributes::new(), children));
            }
            Node::Code(code) => out.push(self.convert_code(code)),
            Node::Math(math) => {
                let text = self.doc.text(math.value.as_str());
                let code = self.element(
                    "code",
                    Attributes::new().with(AttrKey::Class, "language-math math-display"),
                    vec![text],
                );
                out.push(self.element("pre", Attributes::new(), vec![code]));
            }
            Node::InlineMath(math) => {
                let text = self.doc.text(math.value.as_str());
                out.push(self.element(
                    "code",
                    Attributes::new().with(AttrKey::Class, "language-math math-inline"),
                    vec![text],
                ));
            }
            Node::Link(link) => {
                let attrs = link_attrs(&link.url, link.title.as_deref());
                let children = self.convert_children(&link.children);
                out.push(self.element("a", attrs, children));
            }
            Node::Image(image) => {
                let attrs = image_attrs(&image.url, &image.alt, image.title.as_deref());
                out.push(self.element("img", attrs, Vec::new()));
            }
            Node::LinkReference(reference) => self.convert_link_reference(reference, out),
            Node::ImageReference(reference) => {
                match self.resolve(&reference.identifier) {
                    Some((url, title)) => {
                        let attrs = image_attrs(url, &reference.alt, title);
                        out.push(self.element("img", attrs, Vec::new()));
                    }
                    None => {
                        let literal = format!("![{}]", reference.alt);
                        out.push(self.doc.text(literal));
                    }
                }
            }
            Node::List(list) => out.push(self.convert_list(list)),
            Node::ListItem(item) => out.push(self.convert_list_item(item)),
            Node::Table(table) => out.push(self.convert_table(table)),
            Node::FootnoteReference(reference) => self.convert_footnote_reference(reference, out),
            Node::MdxJsxFlowElement(element) => {
                log::debug!(
                    "Rendering children of JSX element {:?} transparently",
                    element.name
                );
                self.convert_blocks(&element.children, out);
            }
            Node::MdxJsxTextElement(element) => {
                log::debug!(
                    "Rendering children of JSX element {:?} transparently",
                    element.name
                );
                self.convert_blocks(&element.children, out);
            }
            // Definitions are resolved at their use sites; metadata blocks never render.
            Node::Definition(_)
            | Node::FootnoteDefinition(_)
            | Node::Yaml(_)
            | Node::Toml(_)
            | Node::MdxjsEsm(_)
            | Node::MdxFlowExpression(_)
            | Node::MdxTextExpression(_) => {}
            Node::TableRow(_) | Node::TableCell(_) => {
                log::warn!("Table row or cell outside of a table, skipping");
            }
        }
    }

    fn convert_code(&mut self, code: &'a mdast::Code) -> NodeId {
        let mut attrs = Attributes::new();
        if let Some(lang) = code.lang.as_deref().filter(|l| !l.is_empty()) {
            attrs.set(AttrKey::Class, format!("language-{}", lang));
        }
        let children = if code.value.is_empty() {
            Vec::new()
        } else {
            vec![self.doc.text(code.value.as_str())]
        };
        let code_el = self.element("code", attrs, children);
        self.element("pre", Attributes::new(), vec![code_el])
    }

    fn convert_link_reference(&mut self, reference: &'a mdast::LinkReference, out: &mut Vec<NodeId>) {
        let children = self.convert_children(&reference.children);
        match self.resolve(&reference.identifier) {
            Some((url, title)) => {
                let attrs = link_attrs(url, title);
                out.push(self.element("a", attrs, children));
            }
            None => {
                out.push(self.doc.text("["));
                out.extend(children);
                out.push(self.doc.text("]"));
            }
        }
    }

    fn convert_list(&mut self, list: &'a mdast::List) -> NodeId {
        let loose = list.spread
            || list
                .children
                .iter()
                .any(|child| matches!(child, Node::ListItem(item) if item.spread));
        let has_tasks = list
            .children
            .iter()
            .any(|child| matches!(child, Node::ListItem(item) if item.checked.is_some()));

        let mut attrs = Attributes::new();
        let tag = if list.ordered { "ol" } else { "ul" };
        if let Some(start) = list.start.filter(|s| list.ordered && *s != 1) {
            attrs.set(AttrKey::Start, start.to_string());
        }
        if has_tasks {
            attrs.set(AttrKey::Class, "contains-task-list");
        }

        self.tight.push(!loose);
        let mut items = Vec::new();
        self.convert_blocks(&list.children, &mut items);
        self.tight.pop();

        let children = self.wrap(items, true);
        self.element(tag, attrs, children)
    }

    fn convert_list_item(&mut self, item: &'a mdast::ListItem) -> NodeId {
        let loose = !self.tight.last().copied().unwrap_or(false) || item.spread;
        let mut results = Vec::new();
        self.convert_blocks(&item.children, &mut results);

        let mut attrs = Attributes::new();
        let mut checkbox = Vec::new();
        if let Some(checked) = item.checked {
            attrs.set(AttrKey::Class, "task-list-item");
            let mut input_attrs = Attributes::new()
                .with(AttrKey::Type, "checkbox")
                .with(AttrKey::Disabled, "");
            if checked {
                input_attrs.set(AttrKey::Checked, "");
            }
            checkbox.push(self.element("input", input_attrs, Vec::new()));
            checkbox.push(self.doc.text(" "));
        }

        let mut children = Vec::new();
        let count = results.len();
        for (index, child) in results.into_iter().enumerate() {
            let is_paragraph = self.doc.as_element(child).is_some_and(|e| e.tag == "p");
            if loose || index != 0 || !is_paragraph {
                children.push(self.doc.text("\n"));
            }
            if index == 0 && !checkbox.is_empty() {
                if is_paragraph {
                    if let Some(node) = self.doc.node_mut(child) {
                        let mut inner = std::mem::take(&mut checkbox);
                        inner.append(&mut node.children);
                        node.children = inner;
                    }
                } else {
                    children.append(&mut checkbox);
                }
            }
            if is_paragraph && !loose {
                children.extend_from_slice(self.doc.children(child));
            } else {
                children.push(child);
            }
            if index + 1 == count && (loose || !is_paragraph) {
                children.push(self.doc.text("\n"));
            }
        }
        // Empty task item: the checkbox is all there is.
        children.append(&mut checkbox);

        self.element("li", attrs, children)
    }

    fn convert_table(&mut self, table: &'a mdast::Table) -> NodeId {
        let mut sections = Vec::new();
        let mut rows = table.children.iter().filter_map(|child| match child {
            Node::TableRow(row) => Some(row),
            _ => None,
        });

        if let Some(head) = rows.next() {
            let row = self.convert_table_row(head, "th", &table.align);
            let children = self.wrap(vec![row], true);
            sections.push(self.element("thead", Attributes::new(), children));
        }

        let body: Vec<_> = rows.collect();
        if !body.is_empty() {
            let mut body_rows = Vec::with_capacity(body.len());
            for row in body {
                body_rows.push(self.convert_table_row(row, "td", &table.align));
            }
            let children = self.wrap(body_rows, true);
            sections.push(self.element("tbody", Attributes::new(), children));
        }

        let children = self.wrap(sections, true);
        self.element("table", Attributes::new(), children)
    }

    fn convert_table_row(
        &mut self,
        row: &'a mdast::TableRow,
        cell_tag: &str,
        aligns: &[AlignKind],
    ) -> NodeId {
        let mut cells = Vec::with_capacity(row.children.len());
        for (index, cell) in row.children.iter().enumerate() {
            let Node::TableCell(cell) = cell else {
                continue;
            };
            let mut attrs = Attributes::new();
            let align = match aligns.get(index) {
                Some(AlignKind::Left) => Some("left"),
                Some(AlignKind::Right) => Some("right"),
                Some(AlignKind::Center) => Some("center"),
                Some(AlignKind::None) | None => None,
            };
            if let Some(align) = align {
                attrs.set(AttrKey::Align, align);
            }
            let children = self.convert_children(&cell.children);
            cells.push(self.element(cell_tag, attrs, children));
        }
        let children = self.wrap(cells, true);
        self.element("tr", Attributes::new(), children)
    }

    fn convert_footnote_reference(
        &mut self,
        reference: &'a mdast::FootnoteReference,
        out: &mut Vec<NodeId>,
    ) {
        let identifier = reference.identifier.as_str();
        if !self.footnote_definitions.contains_key(identifier) {
            out.push(self.doc.text(format!("[^{}]", reference.identifier)));
            return;
        }

        let ordinal = match self.footnote_order.iter().position(|id| *id == identifier) {
            Some(position) => position + 1,
            None => {
                self.footnote_order.push(identifier);
                self.footnote_order.len()
            }
        };
        let count = self.footnote_refs.entry(identifier).or_insert(0);
        *count += 1;
        let suffix = if *count == 1 {
            String::new()
        } else {
            format!("-{}", count)
        };

        let anchor = footnote_anchor(identifier, ordinal);
        let attrs = Attributes::new()
            .with(AttrKey::Href, format!("#user-content-fn-{}", anchor))
            .with(AttrKey::Id, format!("user-content-fnref-{}{}", anchor, suffix))
            .with(AttrKey::Data(DataAttr::FootnoteRef), "");
        let label = self.doc.text(ordinal.to_string());
        let link = self.element("a", attrs, vec![label]);
        out.push(self.element("sup", Attributes::new(), vec![link]));
    }

    /// Builds `section.footnotes` for every referenced definition, in reference order.
    fn footnote_section(&mut self) -> Option<NodeId> {
        if self.footnote_order.is_empty() {
            return None;
        }

        let mut items = Vec::new();
        // Definitions may reference further footnotes, growing the order as we go.
        let mut index = 0;
        while let Some(identifier) = self.footnote_order.get(index).copied() {
            index += 1;
            let Some(children) = self.footnote_definitions.get(identifier).copied() else {
                continue;
            };
            let anchor = footnote_anchor(identifier, index);

            let mut blocks = Vec::new();
            self.convert_blocks(children, &mut blocks);

            let backref = self.element(
                "a",
                Attributes::new()
                    .with(AttrKey::Href, format!("#user-content-fnref-{}", anchor))
                    .with(AttrKey::Data(DataAttr::FootnoteBackref), "")
                    .with(
                        AttrKey::Other("aria-label".to_string()),
                        format!("Back to reference {}", index),
                    )
                    .with(AttrKey::Class, "data-footnote-backref"),
                Vec::new(),
            );
            let arrow = self.doc.text("\u{21a9}");
            if let Some(node) = self.doc.node_mut(backref) {
                node.children.push(arrow);
            }

            let last_paragraph = blocks
                .last()
                .copied()
                .filter(|id| self.doc.as_element(*id).is_some_and(|e| e.tag == "p"));
            match last_paragraph {
                Some(paragraph) => {
                    let space = self.doc.text(" ");
                    if let Some(node) = self.doc.node_mut(paragraph) {
                        node.children.push(space);
                        node.children.push(backref);
                    }
                }
                None => blocks.push(backref),
            }

            let children = self.wrap(blocks, true);
            let item = self.element(
                "li",
                Attributes::new().with(AttrKey::Id, format!("user-content-fn-{}", anchor)),
                children,
            );
            items.push(item);
        }

        let list_children = self.wrap(items, true);
        let list = self.element("ol", Attributes::new(), list_children);
        let section_children = self.wrap(vec![list], true);
        Some(self.element(
            "section",
            Attributes::new()
                .with(AttrKey::Data(DataAttr::Footnotes), "")
                .with(AttrKey::Class, "footnotes"),
            section_children,
        ))
    }
}

fn link_attrs(url: &str, title: Option<&str>) -> Attributes {
    let mut attrs = Attributes::new().with(AttrKey::Href, url);
    if let Some(title) = title {
        attrs.set(AttrKey::Title, title);
    }
    attrs
}

fn image_attrs(url: &str, alt: &str, title: Option<&str>) -> Attributes {
    let mut attrs = Attributes::new()
        .with(AttrKey::Src, url)
        .with(AttrKey::Alt, alt);
    if let Some(title) = title {
        attrs.set(AttrKey::Title, title);
    }
    attrs
}

fn footnote_anchor(identifier: &str, ordinal: usize) -> String {
    let slug = slugify(identifier);
    if slug.is_empty() {
        ordinal.to_string()
    } else {
        slug
    }
}
