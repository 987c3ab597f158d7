use crate::selector::Selector;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document, serialize};
use markup5ever_rcdom::{NodeData, RcDom, SerializableHandle};
use std::cell::RefCell;
use std::rc::Rc;

pub use markup5ever_rcdom::Handle;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parses a full HTML page into an rcdom tree.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Serializes a document (or any subtree) back to HTML.
pub fn serialize_node(node: &Handle) -> anyhow::Result<String> {
    let handle: SerializableHandle = node.clone().into();
    let mut bytes = Vec::new();
    serialize(&mut bytes, &handle, Default::default())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

pub fn get_attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

pub fn set_attr(node: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| attr.name.local.as_ref() == name) {
            Some(attr) => attr.value = StrTendril::from(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from(value),
            }),
        }
    }
}

fn class_list(node: &Handle) -> Vec<String> {
    get_attr(node, "class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    get_attr(node, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

pub fn add_class(node: &Handle, class: &str) {
    let mut classes = class_list(node);
    if !classes.iter().any(|c| c == class) {
        classes.push(class.to_string());
        set_attr(node, "class", &classes.join(" "));
    }
}

pub fn remove_class(node: &Handle, class: &str) {
    let mut classes = class_list(node);
    let before = classes.len();
    classes.retain(|c| c != class);
    if classes.len() != before {
        set_attr(node, "class", &classes.join(" "));
    }
}

/// Flips `class` on the element and returns whether it is now present.
pub fn toggle_class(node: &Handle, class: &str) -> bool {
    if has_class(node, class) {
        remove_class(node, class);
        false
    } else {
        add_class(node, class);
        true
    }
}

/// Sets a single inline style declaration, replacing an existing one with the same property.
pub fn set_style_property(node: &Handle, property: &str, value: &str) {
    let style = get_attr(node, "style").unwrap_or_default();
    let mut declarations: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            decl.split(':')
                .next()
                .is_none_or(|prop| !prop.trim().eq_ignore_ascii_case(property))
        })
        .map(str::to_string)
        .collect();
    declarations.push(format!("{property}: {value}"));
    set_attr(node, "style", &format!("{};", declarations.join("; ")));
}

pub fn style_property(node: &Handle, property: &str) -> Option<String> {
    get_attr(node, "style")?.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        prop.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim().to_string())
    })
}

/// Concatenated text of every descendant text node, like `Node.textContent`.
pub fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    collect_text(node, &mut output);
    output
}

fn collect_text(node: &Handle, output: &mut String) {
    match &node.data {
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, output);
            }
        }
    }
}

pub fn text_of(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// All nodes below `root` in document order, `root` excluded.
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut nodes = Vec::new();
    collect_descendants(root, &mut nodes);
    nodes
}

fn collect_descendants(node: &Handle, nodes: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        nodes.push(child.clone());
        collect_descendants(child, nodes);
    }
}

pub fn descendant_elements(root: &Handle) -> Vec<Handle> {
    descendants(root)
        .into_iter()
        .filter(|node| matches!(node.data, NodeData::Element { .. }))
        .collect()
}

pub fn query_selector_all(root: &Handle, selector: &Selector) -> Vec<Handle> {
    descendant_elements(root)
        .into_iter()
        .filter(|node| selector.matches(node))
        .collect()
}

pub fn query_selector(root: &Handle, selector: &Selector) -> Option<Handle> {
    descendant_elements(root)
        .into_iter()
        .find(|node| selector.matches(node))
}

/// First element whose class list contains `class`.
pub fn find_by_class(root: &Handle, class: &str) -> Option<Handle> {
    descendant_elements(root)
        .into_iter()
        .find(|node| has_class(node, class))
}

pub fn find_all_by_class(root: &Handle, class: &str) -> Vec<Handle> {
    descendant_elements(root)
        .into_iter()
        .filter(|node| has_class(node, class))
        .collect()
}

pub fn find_by_id(root: &Handle, id: &str) -> Option<Handle> {
    descendant_elements(root)
        .into_iter()
        .find(|node| get_attr(node, "id").as_deref() == Some(id))
}

/// Elements with one of the given tag names, in document order.
pub fn find_by_tags(root: &Handle, tags: &[&str]) -> Vec<Handle> {
    descendant_elements(root)
        .into_iter()
        .filter(|node| tags.iter().any(|tag| is_element(node, tag)))
        .collect()
}

pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
            value: StrTendril::from(*value),
        })
        .collect();
    markup5ever_rcdom::Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn create_text(text: &str) -> Handle {
    markup5ever_rcdom::Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn clear_children(parent: &Handle) {
    for child in parent.children.borrow_mut().drain(..) {
        child.parent.set(None);
    }
}
