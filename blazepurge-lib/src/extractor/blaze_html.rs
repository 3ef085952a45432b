//! Markup-aware extraction built on html5ever.
//!
//! Instead of materializing a DOM, the tree sink records selector candidates as
//! the parser creates elements: tag names (including the implied `html`, `head`
//! and `body`), attribute names, `id` values, each class of `class` and the
//! whitespace-separated words of every other attribute value.

use super::TokenExtractor;
use crate::tokens::TokenSet;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, LocalName, Namespace, QualName,
};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl TokenExtractor for HtmlExtractor {
    fn name(&self) -> &str {
        "html"
    }

    fn extract(&self, content: &str) -> Vec<String> {
        extract_html_tokens(content).into_iter().collect()
    }
}

/// Parse `html_content` and return every selector candidate it contains.
pub fn extract_html_tokens(html_content: &str) -> TokenSet {
    let sink = HtmlTokenSink::new();
    html5ever::parse_document(sink, Default::default()).one(html_content)
}

/// What the sink keeps per node: the element name, if the node is an element.
#[derive(Debug)]
pub struct SinkNode {
    name: Option<QualName>,
}

pub type SinkHandle = Rc<SinkNode>;

/// A TreeSink that only records tokens; tree mutations are accepted and dropped.
pub struct HtmlTokenSink {
    document: SinkHandle,
    tokens: RefCell<TokenSet>,
}

impl HtmlTokenSink {
    pub fn new() -> Self {
        Self {
            document: Rc::new(SinkNode { name: None }),
            tokens: RefCell::new(TokenSet::new()),
        }
    }

    fn record_attrs(&self, attrs: &[Attribute]) {
        let mut tokens = self.tokens.borrow_mut();
        for attr in attrs {
            let key = attr.name.local.to_string();
            let value: &str = &attr.value;
            match key.as_str() {
                "id" => {
                    let id = value.trim();
                    if !id.is_empty() {
                        tokens.insert(id);
                    }
                }
                _ => tokens.extend(value.split_whitespace()),
            }
            tokens.insert(key);
        }
    }
}

impl Default for HtmlTokenSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned element name handed back to the tree builder.
#[derive(Debug)]
pub struct SinkElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for SinkElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for HtmlTokenSink {
    type Handle = SinkHandle;
    type Output = TokenSet;
    type ElemName<'a>
        = SinkElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.tokens.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        Rc::clone(&self.document)
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        // The tree builder only asks for names of element handles; anything else
        // gets an empty name, which matches no HTML element.
        match &target.name {
            Some(name) => SinkElemName {
                ns: name.ns.clone(),
                local: name.local.clone(),
            },
            None => SinkElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        self.tokens.borrow_mut().insert(name.local.to_string());
        self.record_attrs(&attrs);
        Rc::new(SinkNode { name: Some(name) })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Rc::new(SinkNode { name: None })
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Rc::new(SinkNode { name: None })
    }

    fn append(&self, _parent: &Self::Handle, _child: NodeOrText<Self::Handle>) {}

    fn append_based_on_parent_node(
        &self,
        _element: &Self::Handle,
        _prev_element: &Self::Handle,
        _child: NodeOrText<Self::Handle>,
    ) {
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        Rc::clone(target)
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, _sibling: &Self::Handle, _child: NodeOrText<Self::Handle>) {}

    /// `<html>`/`<body>` repeated later in the document merge their attributes here.
    fn add_attrs_if_missing(&self, _target: &Self::Handle, attrs: Vec<Attribute>) {
        self.record_attrs(&attrs);
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {}

    fn reparent_children(&self, _node: &Self::Handle, _new_parent: &Self::Handle) {}
}
