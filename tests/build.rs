use xylem_dom::{
	build::{h, text, Child},
	host::memory::NodeId,
	vnode::{Key, Props, VNode, Value},
	BuildError,
};

type Node = VNode<NodeId>;

#[test]
fn selector_parts() -> Result<(), BuildError> {
	let node: Node = h("section#main.wide.dark", None, Vec::new())?;
	let element = node.as_element().unwrap();

	assert_eq!(element.tag, "section");
	assert_eq!(element.props.get("id"), Some(&Value::from("main")));
	let classes = element.props.classes().unwrap();
	assert_eq!(classes.len(), 2);
	assert_eq!(classes.get("wide"), Some(&true));
	assert_eq!(classes.get("dark"), Some(&true));
	assert!(element.key.is_none());
	assert!(element.children.is_empty());
	Ok(())
}

#[test]
fn explicit_id_wins() -> Result<(), BuildError> {
	let node: Node = h("div#from-selector", Some(Props::new().set("id", "explicit")), Vec::new())?;
	assert_eq!(node.as_element().unwrap().props.get("id"), Some(&Value::from("explicit")));
	Ok(())
}

#[test]
fn selector_classes_merge_into_class_map() -> Result<(), BuildError> {
	let props = Props::new().class("b", true).class("a", false);
	let node: Node = h("p.a", Some(props), Vec::new())?;
	let classes = node.as_element().unwrap().props.classes().unwrap();
	assert_eq!(classes.get("a"), Some(&true));
	assert_eq!(classes.get("b"), Some(&true));
	Ok(())
}

#[test]
fn keys_come_from_props() -> Result<(), BuildError> {
	let named: Node = h("li", Some(Props::new().key("x")), Vec::new())?;
	assert_eq!(named.key(), Some(&Key::from("x")));

	let numbered: Node = h("li", Some(Props::new().key(3)), Vec::new())?;
	assert_eq!(numbered.key(), Some(&Key::Num(3)));

	let plain: Node = h("li", Some(Props::new().set("title", "x")), Vec::new())?;
	assert_eq!(plain.key(), None);
	Ok(())
}

#[test]
fn children_are_flattened_once() -> Result<(), BuildError> {
	let inner: Node = h("b", None, vec![Child::from("bold")])?;
	let node: Node = h(
		"p",
		None,
		vec![
			Child::from("a"),
			Child::from(None::<&str>),
			Child::from(vec![Child::from(1), Child::Empty, Child::from(inner)]),
			Child::from(Some("z")),
		],
	)?;

	let children = node.children();
	assert_eq!(children.len(), 4);
	assert_eq!(children[0].as_text(), Some("a"));
	assert_eq!(children[1].as_text(), Some("1"));
	assert_eq!(children[2].as_element().map(|element| element.tag.as_str()), Some("b"));
	assert_eq!(children[2].children()[0].as_text(), Some("bold"));
	assert_eq!(children[3].as_text(), Some("z"));
	Ok(())
}

#[test]
fn nested_lists_are_rejected() {
	let result: Result<Node, _> = h("ul", None, vec![Child::List(vec![Child::List(vec![Child::from("deep")])])]);
	assert_eq!(result.unwrap_err(), BuildError::NestedChildren { selector: "ul".to_owned() });
}

#[test]
fn empty_selectors_are_rejected() {
	for selector in ["", ".only-class", "#only-id"] {
		let result: Result<Node, _> = h(selector, None, Vec::new());
		assert_eq!(result.unwrap_err(), BuildError::EmptySelector, "{:?}", selector);
	}
}

#[test]
fn bare_text() {
	let node: Node = text("hello");
	assert_eq!(node.as_text(), Some("hello"));
	assert!(node.host().is_none());
	assert!(node.key().is_none());
}

#[test]
fn class_string_becomes_toggles() -> Result<(), BuildError> {
	let node: Node = h("p.x", Some(Props::new().set("class", " a  b ")), Vec::new())?;
	let classes = node.as_element().unwrap().props.classes().unwrap();
	assert_eq!(classes.iter().map(|(name, &on)| (name.as_str(), on)).collect::<Vec<_>>(), [("a", true), ("b", true), ("x", true)]);
	Ok(())
}

#[test]
fn other_class_values_are_rejected() {
	for value in [Value::Null, Value::Bool(true), Value::Number(1.0)] {
		let result: Result<Node, _> = h("p", Some(Props::new().set("class", value.clone())), Vec::new());
		assert_eq!(result.unwrap_err(), BuildError::InvalidClass { selector: "p".to_owned() }, "{:?}", value);
	}
}
