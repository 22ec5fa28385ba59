//! Reading existing host content back into virtual trees, e.g. to adopt server-rendered markup.

use crate::{
	host::Host,
	modules::is_boolean_attribute,
	vnode::{ClassMap, Props, StyleMap, VElement, VNode, VText, Value},
};
use tracing::trace_span;

/// Builds a virtual tree that describes and owns `node` and its descendants as they are right now.
///
/// Event listeners can't be read back and are not included.
pub fn load_node<H: Host>(host: &H, node: &H::Node) -> VNode<H::Node> {
	match host.tag_name(node) {
		Some(_) => VNode::Element(load_element(host, node)),
		None => VNode::Text(VText {
			text: host.text(node).unwrap_or_default(),
			host: Some(node.clone()),
		}),
	}
}

pub fn load_child_nodes<H: Host>(host: &H, node: &H::Node) -> Vec<VNode<H::Node>> {
	host.child_nodes(node).iter().map(|child| load_node(host, child)).collect()
}

pub fn load_element<H: Host>(host: &H, element: &H::Node) -> VElement<H::Node> {
	let tag = host.tag_name(element).unwrap_or_default();
	let span = trace_span!("Loading element", tag = %tag);
	let _enter = span.enter();

	let mut props = load_attributes(host, element);
	let classes: ClassMap = host.classes(element).into_iter().map(|class| (class, true)).collect();
	if !classes.is_empty() {
		props.insert("class", classes);
	}
	let styles: StyleMap = host.styles(element).into_iter().collect();
	if !styles.is_empty() {
		props.insert("style", styles);
	}

	let mut loaded = VElement::new(tag, props, load_child_nodes(host, element));
	loaded.namespace = host.namespace(element);
	loaded.host = Some(element.clone());
	loaded
}

pub fn load_attributes<H: Host>(host: &H, element: &H::Node) -> Props {
	host.attributes(element)
		.into_iter()
		.map(|(name, value)| {
			// Present boolean attributes are on, whatever their text.
			let value = if is_boolean_attribute(&name) { Value::Bool(true) } else { Value::Str(value) };
			(name, value)
		})
		.collect()
}
