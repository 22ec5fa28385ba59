//! Hyperscript-style construction of virtual trees.
//!
//! ```
//! use xylem_dom::{
//! 	build::{h, Child},
//! 	host::memory::NodeId,
//! 	vnode::{Props, VNode},
//! };
//!
//! # fn main() -> Result<(), xylem_dom::BuildError> {
//! let show_footer = false;
//! let items: Vec<VNode<NodeId>> = ["one", "two"]
//! 	.iter()
//! 	.map(|&item| h("li", Some(Props::new().key(item)), vec![Child::from(item)]))
//! 	.collect::<Result<_, _>>()?;
//! let list: VNode<NodeId> = h(
//! 	"ul.list",
//! 	Some(Props::new().set("role", "list")),
//! 	vec![Child::from(items), Child::from(show_footer.then(|| "footer"))],
//! )?;
//! assert_eq!(list.children().len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::{
	error::BuildError,
	vnode::{Props, VElement, VNode, VText, Value},
};

/// A child argument to [`h`].
///
/// Lists are spliced into the parent's children, but only one level deep.
#[derive(Debug)]
pub enum Child<N> {
	/// Filtered out. Used for conditional rendering.
	Empty,
	Text(String),
	Node(VNode<N>),
	List(Vec<Child<N>>),
}

impl<N> From<&str> for Child<N> {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}
impl<N> From<String> for Child<N> {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl<N> From<i32> for Child<N> {
	fn from(number: i32) -> Self {
		Self::Text(number.to_string())
	}
}
impl<N> From<i64> for Child<N> {
	fn from(number: i64) -> Self {
		Self::Text(number.to_string())
	}
}
impl<N> From<u32> for Child<N> {
	fn from(number: u32) -> Self {
		Self::Text(number.to_string())
	}
}
impl<N> From<f64> for Child<N> {
	fn from(number: f64) -> Self {
		Self::Text(number.to_string())
	}
}
impl<N> From<VNode<N>> for Child<N> {
	fn from(node: VNode<N>) -> Self {
		Self::Node(node)
	}
}
impl<N, C: Into<Child<N>>> From<Option<C>> for Child<N> {
	fn from(option: Option<C>) -> Self {
		option.map_or(Self::Empty, Into::into)
	}
}
impl<N, C: Into<Child<N>>> From<Vec<C>> for Child<N> {
	fn from(children: Vec<C>) -> Self {
		Self::List(children.into_iter().map(Into::into).collect())
	}
}

/// A bare text node.
#[must_use]
pub fn text<N>(text: impl Into<String>) -> VNode<N> {
	VNode::Text(VText::new(text))
}

/// Builds an element from a selector of the form `tag[#id][.class]*`, optional properties and children.
///
/// Selector classes are always on. A selector `#id` is only used if `props` doesn't set `id` itself.
/// Duplicate keys among `children` are not detected here, but when the tree is patched.
///
/// # Errors
///
/// [`BuildError::EmptySelector`] if there's no tag,
/// [`BuildError::InvalidClass`] if `props` has a `class` that isn't a class map,
/// [`BuildError::NestedChildren`] if a list child contains another list.
pub fn h<N>(selector: &str, props: Option<Props>, children: impl IntoIterator<Item = Child<N>>) -> Result<VNode<N>, BuildError> {
	let (tag_and_id, classes) = match selector.find('.') {
		Some(dot) => (&selector[..dot], &selector[dot + 1..]),
		None => (selector, ""),
	};
	let (tag, id) = match tag_and_id.find('#') {
		Some(hash) => (&tag_and_id[..hash], Some(&tag_and_id[hash + 1..])),
		None => (tag_and_id, None),
	};
	if tag.is_empty() {
		return Err(BuildError::EmptySelector);
	}

	let mut props = props.unwrap_or_default();
	if !matches!(props.get("class"), None | Some(Value::Classes(_))) {
		return Err(BuildError::InvalidClass { selector: selector.to_owned() });
	}
	if let Some(id) = id.filter(|id| !id.is_empty()) {
		if props.get("id").is_none() {
			props.insert("id", Value::from(id));
		}
	}
	if !classes.is_empty() {
		let class_map = props.classes_mut();
		for class in classes.split('.').filter(|class| !class.is_empty()) {
			class_map.insert(class.to_owned(), true);
		}
	}

	let mut flattened = Vec::new();
	for child in children {
		match child {
			Child::Empty => (),
			Child::Text(text) => flattened.push(VNode::Text(VText::new(text))),
			Child::Node(node) => flattened.push(node),
			Child::List(list) => {
				for child in list {
					match child {
						Child::Empty => (),
						Child::Text(text) => flattened.push(VNode::Text(VText::new(text))),
						Child::Node(node) => flattened.push(node),
						Child::List(_) => return Err(BuildError::NestedChildren { selector: selector.to_owned() }),
					}
				}
			}
		}
	}

	Ok(VNode::Element(VElement::new(tag, props, flattened)))
}
