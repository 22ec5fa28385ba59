//! The boundary between the engine and a live document.
//!
//! The engine never touches host nodes except through [`Host`].

use crate::{error::HostError, vnode::Handler};
use core::fmt::Debug;

pub mod memory;
pub mod web;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// The element namespaces the engine creates elements in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
	Html,
	Svg,
	MathMl,
}

impl Namespace {
	#[must_use]
	pub fn uri(self) -> &'static str {
		match self {
			Namespace::Html => HTML_NAMESPACE,
			Namespace::Svg => SVG_NAMESPACE,
			Namespace::MathMl => MATHML_NAMESPACE,
		}
	}

	/// Unknown URIs (and none at all) map to [`Namespace::Html`].
	#[must_use]
	pub fn from_uri(uri: Option<&str>) -> Self {
		match uri {
			Some(SVG_NAMESPACE) => Namespace::Svg,
			Some(MATHML_NAMESPACE) => Namespace::MathMl,
			_ => Namespace::Html,
		}
	}
}

impl Default for Namespace {
	fn default() -> Self {
		Namespace::Html
	}
}

/// A live, stateful document the engine can mutate.
///
/// `Self::Node` is a cheap handle to one node in it. Handles compare equal iff they refer to the same node.
///
/// Attribute operations take an optional namespace URI.
/// Without one, they act on the attribute whose qualified name is `name`, regardless of its namespace (like the DOM's `getAttribute`).
pub trait Host {
	type Node: Clone + PartialEq + Debug;

	fn create_element(&mut self, namespace: Namespace, tag: &str) -> Result<Self::Node, HostError>;
	fn create_text(&mut self, text: &str) -> Result<Self::Node, HostError>;

	/// Inserts `node` into `parent` before `reference`, or appends it if `reference` is [`None`].
	///
	/// `node` is detached from its current parent first, if any.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), HostError>;

	/// Detaches `node` from its parent.
	fn remove(&mut self, node: &Self::Node) -> Result<(), HostError>;

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// [`None`] for elements.
	fn text(&self, node: &Self::Node) -> Option<String>;
	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), HostError>;

	/// [`None`] for text nodes.
	fn tag_name(&self, node: &Self::Node) -> Option<String>;

	/// The namespace of an element. Text nodes report [`Namespace::Html`].
	fn namespace(&self, node: &Self::Node) -> Namespace;

	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

	fn get_attribute(&self, element: &Self::Node, namespace: Option<&str>, name: &str) -> Option<String>;
	fn set_attribute(&mut self, element: &Self::Node, namespace: Option<&str>, name: &str, value: &str) -> Result<(), HostError>;
	fn remove_attribute(&mut self, element: &Self::Node, namespace: Option<&str>, name: &str) -> Result<(), HostError>;

	/// `(qualified name, value)` of every attribute except `class` and `style`.
	fn attributes(&self, element: &Self::Node) -> Vec<(String, String)>;

	fn add_class(&mut self, element: &Self::Node, class: &str) -> Result<(), HostError>;
	fn remove_class(&mut self, element: &Self::Node, class: &str) -> Result<(), HostError>;
	fn classes(&self, element: &Self::Node) -> Vec<String>;

	fn set_style(&mut self, element: &Self::Node, property: &str, value: &str) -> Result<(), HostError>;
	fn remove_style(&mut self, element: &Self::Node, property: &str) -> Result<(), HostError>;
	fn styles(&self, element: &Self::Node) -> Vec<(String, String)>;

	fn add_listener(&mut self, element: &Self::Node, event: &str, handler: &Handler) -> Result<(), HostError>;
	fn remove_listener(&mut self, element: &Self::Node, event: &str, handler: &Handler) -> Result<(), HostError>;

	/// Called once at the end of each render pass.
	fn finish_pass(&mut self) {}

	/// The namespace an element named `tag` is created in, given the namespace it would inherit.
	fn element_namespace(&self, inherited: Namespace, tag: &str) -> Namespace {
		match tag {
			"svg" => Namespace::Svg,
			"math" => Namespace::MathMl,
			_ => inherited,
		}
	}

	/// The namespace the children of an element named `tag` in `namespace` inherit.
	fn child_namespace(&self, namespace: Namespace, tag: &str) -> Namespace {
		match (namespace, tag) {
			(Namespace::Svg, "foreignObject") | (Namespace::MathMl, "annotation-xml") => Namespace::Html,
			_ => namespace,
		}
	}
}
