//! A [`Host`] backed by a browser [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).

use super::{Host, Namespace};
use crate::{
	error::HostError,
	ref_counts::{CountSaturatedError, RefCounts},
	vnode::Handler,
};
use core::fmt::{self, Debug, Formatter};
use js_sys::Function;
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, warn, Level};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// Drives a [`web_sys::Document`].
///
/// Each distinct [`Handler`] is wrapped in a single [***JavaScript***](https://developer.mozilla.org/en-US/docs/Web/JavaScript) function,
/// which is shared by all elements it's bound to and reference-counted per [`WebHost`].
/// Functions that are no longer bound anywhere are released at the end of each render pass.
///
/// Listeners that are still attached start throwing errors into JavaScript if this instance is dropped.
pub struct WebHost {
	document: web_sys::Document,
	listeners: RefCounts<usize, Closure<dyn Fn(web_sys::Event)>>,
}

impl Debug for WebHost {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebHost")
			.field("document", &self.document)
			.field("listeners.len()", &self.listeners.len())
			.finish()
	}
}

impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			listeners: RefCounts::new(),
		}
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	fn element<'a>(node: &'a web_sys::Node, operation: &'static str) -> Result<&'a web_sys::Element, HostError> {
		node.dyn_ref::<web_sys::Element>().ok_or_else(|| HostError::new(operation, format!("Expected `web_sys::Element` but found {:?}", node)))
	}

	fn style(node: &web_sys::Node, operation: &'static str) -> Result<web_sys::CssStyleDeclaration, HostError> {
		if let Some(html_element) = node.dyn_ref::<web_sys::HtmlElement>() {
			Ok(html_element.style())
		} else if let Some(svg_element) = node.dyn_ref::<web_sys::SvgElement>() {
			Ok(svg_element.style())
		} else {
			Err(HostError::new(operation, format!("{:?} has no inline style", node)))
		}
	}
}

fn js_error(operation: &'static str) -> impl FnOnce(JsValue) -> HostError {
	move |error| HostError::new(operation, format!("{:?}", error))
}

impl Host for WebHost {
	type Node = web_sys::Node;

	#[instrument(skip(self))]
	fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<web_sys::Node, HostError> {
		let element = match namespace {
			Namespace::Html => self.document.create_element(tag),
			namespace => self.document.create_element_ns(Some(namespace.uri()), tag),
		}
		.map_err(js_error("create_element"))?;
		Ok(element.into())
	}

	fn create_text(&mut self, text: &str) -> Result<web_sys::Node, HostError> {
		Ok(self.document.create_text_node(text).into())
	}

	fn insert_before(&mut self, parent: &web_sys::Node, node: &web_sys::Node, reference: Option<&web_sys::Node>) -> Result<(), HostError> {
		parent.insert_before(node, reference).map(drop).map_err(js_error("insert_before"))
	}

	fn remove(&mut self, node: &web_sys::Node) -> Result<(), HostError> {
		match node.parent_node() {
			Some(parent) => parent.remove_child(node).map(drop).map_err(js_error("remove")),
			None => {
				warn!("Could not find parent node of node to remove. Ignoring.");
				Ok(())
			}
		}
	}

	fn parent(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.parent_node()
	}

	fn next_sibling(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.next_sibling()
	}

	fn text(&self, node: &web_sys::Node) -> Option<String> {
		node.dyn_ref::<web_sys::Text>().map(|text| text.data())
	}

	fn set_text(&mut self, node: &web_sys::Node, text: &str) -> Result<(), HostError> {
		match node.dyn_ref::<web_sys::CharacterData>() {
			Some(character_data) => {
				character_data.set_data(text);
				Ok(())
			}
			None => Err(HostError::new("set_text", format!("Expected `web_sys::CharacterData` but found {:?}", node))),
		}
	}

	fn tag_name(&self, node: &web_sys::Node) -> Option<String> {
		node.dyn_ref::<web_sys::Element>().map(web_sys::Element::local_name)
	}

	fn namespace(&self, node: &web_sys::Node) -> Namespace {
		node.dyn_ref::<web_sys::Element>().map_or(Namespace::Html, |element| Namespace::from_uri(element.namespace_uri().as_deref()))
	}

	fn child_nodes(&self, node: &web_sys::Node) -> Vec<web_sys::Node> {
		let child_nodes = node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn get_attribute(&self, element: &web_sys::Node, namespace: Option<&str>, name: &str) -> Option<String> {
		let element = element.dyn_ref::<web_sys::Element>()?;
		match namespace {
			None => element.get_attribute(name),
			Some(namespace) => element.get_attribute_ns(Some(namespace), name),
		}
	}

	fn set_attribute(&mut self, element: &web_sys::Node, namespace: Option<&str>, name: &str, value: &str) -> Result<(), HostError> {
		let element = Self::element(element, "set_attribute")?;
		match namespace {
			None => element.set_attribute(name, value),
			Some(namespace) => element.set_attribute_ns(Some(namespace), name, value),
		}
		.map_err(js_error("set_attribute"))
	}

	fn remove_attribute(&mut self, element: &web_sys::Node, namespace: Option<&str>, name: &str) -> Result<(), HostError> {
		let element = Self::element(element, "remove_attribute")?;
		match namespace {
			None => element.remove_attribute(name),
			Some(namespace) => element.remove_attribute_ns(Some(namespace), name),
		}
		.map_err(js_error("remove_attribute"))
	}

	fn attributes(&self, element: &web_sys::Node) -> Vec<(String, String)> {
		let attributes = match element.dyn_ref::<web_sys::Element>() {
			Some(element) => element.attributes(),
			None => return Vec::new(),
		};
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| (attribute.name(), attribute.value()))
			.filter(|(name, _)| name != "class" && name != "style")
			.collect()
	}

	fn add_class(&mut self, element: &web_sys::Node, class: &str) -> Result<(), HostError> {
		Self::element(element, "add_class")?.class_list().add_1(class).map_err(js_error("add_class"))
	}

	fn remove_class(&mut self, element: &web_sys::Node, class: &str) -> Result<(), HostError> {
		Self::element(element, "remove_class")?.class_list().remove_1(class).map_err(js_error("remove_class"))
	}

	fn classes(&self, element: &web_sys::Node) -> Vec<String> {
		let class_list = match element.dyn_ref::<web_sys::Element>() {
			Some(element) => element.class_list(),
			None => return Vec::new(),
		};
		(0..class_list.length()).filter_map(|i| class_list.item(i)).collect()
	}

	fn set_style(&mut self, element: &web_sys::Node, property: &str, value: &str) -> Result<(), HostError> {
		Self::style(element, "set_style")?.set_property(property, value).map_err(js_error("set_style"))
	}

	fn remove_style(&mut self, element: &web_sys::Node, property: &str) -> Result<(), HostError> {
		Self::style(element, "remove_style")?.remove_property(property).map(drop).map_err(js_error("remove_style"))
	}

	fn styles(&self, element: &web_sys::Node) -> Vec<(String, String)> {
		let style = match Self::style(element, "styles") {
			Ok(style) => style,
			Err(_) => return Vec::new(),
		};
		(0..style.length())
			.map(|i| style.item(i))
			.filter_map(|property| style.get_property_value(&property).ok().map(|value| (property, value)))
			.collect()
	}

	#[instrument(skip(self))]
	fn add_listener(&mut self, element: &web_sys::Node, event: &str, handler: &Handler) -> Result<(), HostError> {
		let closure = self
			.listeners
			.acquire(handler.id(), || {
				trace!("Created Closure.");
				let handler = handler.clone();
				Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&event)) as Box<dyn Fn(web_sys::Event)>)
			})
			.map_err(|CountSaturatedError| HostError::new("add_listener", "Too many (more than 65k) active references to the same handler"))?;
		let function: &Function = closure.as_ref().unchecked_ref();
		if let Err(error) = element.add_event_listener_with_callback(event, function) {
			// Undo the increment. The closure is released at the end of the pass if it's now unused.
			if let Err(CountSaturatedError) = self.listeners.release(&handler.id()) {
				error!("Listener count underflowed while undoing a failed `add_listener`.");
			}
			return Err(js_error("add_listener")(error));
		}
		Ok(())
	}

	#[instrument(skip(self))]
	fn remove_listener(&mut self, element: &web_sys::Node, event: &str, handler: &Handler) -> Result<(), HostError> {
		let closure = match self.listeners.release(&handler.id()) {
			Ok(Some(closure)) => closure,
			Ok(None) => return Err(HostError::new("remove_listener", "Tried to remove a listener that was never added")),
			Err(CountSaturatedError) => return Err(HostError::new("remove_listener", "Tried to remove a listener more often than it was added")),
		};
		let function: &Function = closure.as_ref().unchecked_ref();
		element.remove_event_listener_with_callback(event, function).map_err(js_error("remove_listener"))
	}

	fn finish_pass(&mut self) {
		let freed = self.listeners.sweep();
		trace!("Freed {} event listener closure(s).", freed);
		info!("Event listener closure count/cached capacity: {}/{}", self.listeners.len(), self.listeners.capacity());
		if STATIC_MAX_LEVEL >= Level::WARN && self.listeners.capacity() >= 1000 && self.listeners.len() < self.listeners.capacity() / 4 {
			warn!(
				"The event listener closure map is sparse ({}/{}).\n\
				This may point to many short-lived handlers.",
				self.listeners.len(),
				self.listeners.capacity()
			)
		}
	}
}
