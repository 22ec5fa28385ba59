//! A [`Host`] without a browser: an arena of nodes that behaves like a small DOM.
//!
//! Useful natively, for server-side rendering via [`MemoryHost::to_html`], and to observe what the engine does in tests.

use super::{Host, Namespace};
use crate::{error::HostError, vnode::Handler};
use core::any::Any;
use tracing::{trace, warn};

/// Handle of a node in its [`MemoryHost`].
///
/// Slots are reused after [`MemoryHost::free`], so handles carry a generation that makes stale ones fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	index: usize,
	generation: u32,
}

/// Running totals of host operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
	pub elements_created: usize,
	pub texts_created: usize,
	/// Only counts nodes that were actually detached from a parent.
	pub nodes_removed: usize,
	pub listeners_added: usize,
	pub listeners_removed: usize,
}

#[derive(Debug)]
struct Attribute {
	namespace: Option<String>,
	name: String,
	value: String,
}

#[derive(Debug)]
struct Element {
	namespace: Namespace,
	tag: String,
	attributes: Vec<Attribute>,
	classes: Vec<String>,
	styles: Vec<(String, String)>,
	listeners: Vec<(String, Handler)>,
}

#[derive(Debug)]
enum Data {
	Element(Element),
	Text(String),
}

#[derive(Debug)]
struct Slot {
	generation: u32,
	data: Data,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

/// Removed nodes keep their slot until their subtree is released with [`MemoryHost::free`].
/// A long-lived host should free what it unmounts, since the arena otherwise only grows.
#[derive(Debug, Default)]
pub struct MemoryHost {
	nodes: Vec<Slot>,
	free_list: Vec<usize>,
	stats: HostStats,
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn stats(&self) -> HostStats {
		self.stats
	}

	/// Creates a detached HTML element to mount trees into.
	pub fn create_container(&mut self, tag: &str) -> Result<NodeId, HostError> {
		self.create_element(Namespace::Html, tag)
	}

	/// Releases the detached subtree rooted at `node`, so that its slots can be reused.
	///
	/// Handles into the subtree stop resolving. Returns how many nodes were freed.
	///
	/// # Errors
	///
	/// If `node` is unknown or still has a parent.
	pub fn free(&mut self, node: NodeId) -> Result<usize, HostError> {
		if self.slot(node)?.parent.is_some() {
			return Err(HostError::new("free", format!("{:?} is still attached", node)));
		}
		let mut pending = vec![node.index];
		let mut freed = 0;
		while let Some(index) = pending.pop() {
			let slot = &mut self.nodes[index];
			slot.generation = slot.generation.wrapping_add(1);
			slot.data = Data::Text(String::new());
			slot.parent = None;
			pending.extend(slot.children.drain(..).map(|child| child.index));
			self.free_list.push(index);
			freed += 1;
		}
		trace!(?node, freed, "Freed subtree.");
		Ok(freed)
	}

	/// How many slots the arena holds, including free ones.
	#[must_use]
	pub fn slot_count(&self) -> usize {
		self.nodes.len()
	}

	/// Calls every listener for `event` on `node` with `payload`, in the order they were added.
	///
	/// Returns how many listeners were called.
	pub fn dispatch(&self, node: NodeId, event: &str, payload: &dyn Any) -> usize {
		let handlers: Vec<Handler> = match self.slot(node).map(|slot| &slot.data) {
			Ok(Data::Element(element)) => element.listeners.iter().filter(|(name, _)| name == event).map(|(_, handler)| handler.clone()).collect(),
			_ => return 0,
		};
		for handler in &handlers {
			handler.call(payload);
		}
		handlers.len()
	}

	#[must_use]
	pub fn listener_count(&self, node: NodeId) -> usize {
		match self.slot(node).map(|slot| &slot.data) {
			Ok(Data::Element(element)) => element.listeners.len(),
			_ => 0,
		}
	}

	/// Serializes `node` and its descendants.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		let slot = match self.slot(node) {
			Ok(slot) => slot,
			Err(_) => return,
		};
		match &slot.data {
			Data::Text(text) => html.push_str(&escape(text, false)),
			Data::Element(element) => {
				html.push('<');
				html.push_str(&element.tag);
				for Attribute { name, value, .. } in &element.attributes {
					html.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
				}
				if !element.classes.is_empty() {
					html.push_str(&format!(" class=\"{}\"", escape(&element.classes.join(" "), true)));
				}
				if !element.styles.is_empty() {
					let style = element.styles.iter().map(|(property, value)| format!("{}: {};", property, value)).collect::<Vec<_>>().join(" ");
					html.push_str(&format!(" style=\"{}\"", escape(&style, true)));
				}
				html.push('>');
				for &child in &slot.children {
					self.write_html(child, html);
				}
				html.push_str("</");
				html.push_str(&element.tag);
				html.push('>');
			}
		}
	}

	fn live(&self, node: NodeId) -> Option<&Slot> {
		self.nodes.get(node.index).filter(|slot| slot.generation == node.generation)
	}

	fn slot(&self, node: NodeId) -> Result<&Slot, HostError> {
		self.live(node).ok_or_else(|| HostError::new("lookup", format!("Unknown node {:?}", node)))
	}

	fn slot_mut(&mut self, node: NodeId) -> Result<&mut Slot, HostError> {
		self.nodes
			.get_mut(node.index)
			.filter(|slot| slot.generation == node.generation)
			.ok_or_else(|| HostError::new("lookup", format!("Unknown node {:?}", node)))
	}

	fn element(&self, node: NodeId) -> Option<&Element> {
		match self.live(node).map(|slot| &slot.data) {
			Some(Data::Element(element)) => Some(element),
			_ => None,
		}
	}

	fn element_mut(&mut self, node: NodeId, operation: &'static str) -> Result<&mut Element, HostError> {
		match &mut self.slot_mut(node)?.data {
			Data::Element(element) => Ok(element),
			Data::Text(_) => Err(HostError::new(operation, format!("{:?} is not an element", node))),
		}
	}

	fn allocate(&mut self, data: Data) -> NodeId {
		if let Some(index) = self.free_list.pop() {
			let slot = &mut self.nodes[index];
			slot.data = data;
			return NodeId { index, generation: slot.generation };
		}
		let index = self.nodes.len();
		self.nodes.push(Slot {
			generation: 0,
			data,
			parent: None,
			children: Vec::new(),
		});
		NodeId { index, generation: 0 }
	}

	fn detach(&mut self, node: NodeId) -> Result<bool, HostError> {
		let parent = match self.slot_mut(node)?.parent.take() {
			Some(parent) => parent,
			None => return Ok(false),
		};
		let siblings = &mut self.slot_mut(parent)?.children;
		siblings.retain(|&child| child != node);
		Ok(true)
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.live(node).and_then(|slot| slot.parent) {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}
}

fn escape(text: &str, attribute: bool) -> String {
	let mut escaped = String::with_capacity(text.len());
	for char in text.chars() {
		match char {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' if attribute => escaped.push_str("&quot;"),
			char => escaped.push(char),
		}
	}
	escaped
}

fn find_attribute(attributes: &[Attribute], namespace: Option<&str>, name: &str) -> Option<usize> {
	attributes.iter().position(|attribute| attribute.name == name && (namespace.is_none() || attribute.namespace.as_deref() == namespace))
}

impl Host for MemoryHost {
	type Node = NodeId;

	fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<NodeId, HostError> {
		if tag.is_empty() || tag.chars().any(|char| char.is_whitespace() || matches!(char, '<' | '>' | '/' | '"' | '\'' | '=')) {
			return Err(HostError::new("create_element", format!("Invalid tag name {:?}", tag)));
		}
		self.stats.elements_created += 1;
		let id = self.allocate(Data::Element(Element {
			namespace,
			tag: tag.to_owned(),
			attributes: Vec::new(),
			classes: Vec::new(),
			styles: Vec::new(),
			listeners: Vec::new(),
		}));
		trace!(?id, ?namespace, tag, "Created element.");
		Ok(id)
	}

	fn create_text(&mut self, text: &str) -> Result<NodeId, HostError> {
		self.stats.texts_created += 1;
		let id = self.allocate(Data::Text(text.to_owned()));
		trace!(?id, "Created text node.");
		Ok(id)
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) -> Result<(), HostError> {
		let (parent, node) = (*parent, *node);
		if !matches!(self.slot(parent)?.data, Data::Element(_)) {
			return Err(HostError::new("insert_before", format!("Parent {:?} is not an element", parent)));
		}
		self.slot(node)?;
		if self.is_inclusive_ancestor(node, parent) {
			return Err(HostError::new("insert_before", format!("Inserting {:?} into {:?} would create a cycle", node, parent)));
		}

		let reference = match reference {
			Some(&reference) if reference == node => self.next_sibling(&node),
			reference => reference.copied(),
		};
		if let Some(reference) = reference {
			if self.slot(reference)?.parent != Some(parent) {
				return Err(HostError::new("insert_before", format!("{:?} is not a child of {:?}", reference, parent)));
			}
		}

		self.detach(node)?;
		let children = &mut self.slot_mut(parent)?.children;
		let index = match reference {
			Some(reference) => children.iter().position(|&child| child == reference).unwrap_or(children.len()),
			None => children.len(),
		};
		children.insert(index, node);
		self.slot_mut(node)?.parent = Some(parent);
		trace!(?parent, ?node, ?reference, "Inserted node.");
		Ok(())
	}

	fn remove(&mut self, node: &NodeId) -> Result<(), HostError> {
		if self.detach(*node)? {
			self.stats.nodes_removed += 1;
			trace!(?node, "Removed node.");
		} else {
			warn!(?node, "Removed node that had no parent.");
		}
		Ok(())
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.live(*node).and_then(|slot| slot.parent)
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		let parent = self.parent(node)?;
		let siblings = &self.live(parent)?.children;
		let index = siblings.iter().position(|child| child == node)?;
		siblings.get(index + 1).copied()
	}

	fn text(&self, node: &NodeId) -> Option<String> {
		match &self.live(*node)?.data {
			Data::Text(text) => Some(text.clone()),
			Data::Element(_) => None,
		}
	}

	fn set_text(&mut self, node: &NodeId, text: &str) -> Result<(), HostError> {
		match &mut self.slot_mut(*node)?.data {
			Data::Text(data) => {
				*data = text.to_owned();
				Ok(())
			}
			Data::Element(_) => Err(HostError::new("set_text", format!("{:?} is not a text node", node))),
		}
	}

	fn tag_name(&self, node: &NodeId) -> Option<String> {
		self.element(*node).map(|element| element.tag.clone())
	}

	fn namespace(&self, node: &NodeId) -> Namespace {
		self.element(*node).map_or(Namespace::Html, |element| element.namespace)
	}

	fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
		self.live(*node).map(|slot| slot.children.clone()).unwrap_or_default()
	}

	fn get_attribute(&self, element: &NodeId, namespace: Option<&str>, name: &str) -> Option<String> {
		let element = self.element(*element)?;
		find_attribute(&element.attributes, namespace, name).map(|index| element.attributes[index].value.clone())
	}

	fn set_attribute(&mut self, element: &NodeId, namespace: Option<&str>, name: &str, value: &str) -> Result<(), HostError> {
		if name.is_empty() || name.chars().any(char::is_whitespace) {
			return Err(HostError::new("set_attribute", format!("Invalid attribute name {:?}", name)));
		}
		let attributes = &mut self.element_mut(*element, "set_attribute")?.attributes;
		match find_attribute(attributes, namespace, name) {
			Some(index) => attributes[index].value = value.to_owned(),
			None => attributes.push(Attribute {
				namespace: namespace.map(ToOwned::to_owned),
				name: name.to_owned(),
				value: value.to_owned(),
			}),
		}
		Ok(())
	}

	fn remove_attribute(&mut self, element: &NodeId, namespace: Option<&str>, name: &str) -> Result<(), HostError> {
		let attributes = &mut self.element_mut(*element, "remove_attribute")?.attributes;
		if let Some(index) = find_attribute(attributes, namespace, name) {
			attributes.remove(index);
		}
		Ok(())
	}

	fn attributes(&self, element: &NodeId) -> Vec<(String, String)> {
		self.element(*element)
			.map(|element| element.attributes.iter().map(|attribute| (attribute.name.clone(), attribute.value.clone())).collect())
			.unwrap_or_default()
	}

	fn add_class(&mut self, element: &NodeId, class: &str) -> Result<(), HostError> {
		let classes = &mut self.element_mut(*element, "add_class")?.classes;
		if !classes.iter().any(|existing| existing == class) {
			classes.push(class.to_owned());
		}
		Ok(())
	}

	fn remove_class(&mut self, element: &NodeId, class: &str) -> Result<(), HostError> {
		self.element_mut(*element, "remove_class")?.classes.retain(|existing| existing != class);
		Ok(())
	}

	fn classes(&self, element: &NodeId) -> Vec<String> {
		self.element(*element).map(|element| element.classes.clone()).unwrap_or_default()
	}

	fn set_style(&mut self, element: &NodeId, property: &str, value: &str) -> Result<(), HostError> {
		let styles = &mut self.element_mut(*element, "set_style")?.styles;
		match styles.iter_mut().find(|(existing, _)| existing == property) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => styles.push((property.to_owned(), value.to_owned())),
		}
		Ok(())
	}

	fn remove_style(&mut self, element: &NodeId, property: &str) -> Result<(), HostError> {
		self.element_mut(*element, "remove_style")?.styles.retain(|(existing, _)| existing != property);
		Ok(())
	}

	fn styles(&self, element: &NodeId) -> Vec<(String, String)> {
		self.element(*element).map(|element| element.styles.clone()).unwrap_or_default()
	}

	fn add_listener(&mut self, element: &NodeId, event: &str, handler: &Handler) -> Result<(), HostError> {
		self.element_mut(*element, "add_listener")?.listeners.push((event.to_owned(), handler.clone()));
		self.stats.listeners_added += 1;
		Ok(())
	}

	fn remove_listener(&mut self, element: &NodeId, event: &str, handler: &Handler) -> Result<(), HostError> {
		let listeners = &mut self.element_mut(*element, "remove_listener")?.listeners;
		match listeners.iter().position(|(name, existing)| name == event && existing.ptr_eq(handler)) {
			Some(index) => {
				listeners.remove(index);
				self.stats.listeners_removed += 1;
				Ok(())
			}
			None => Err(HostError::new("remove_listener", format!("No {:?} listener {:?} on {:?}", event, handler, element))),
		}
	}
}
