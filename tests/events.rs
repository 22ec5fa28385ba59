use std::{cell::Cell, rc::Rc};
use xylem_dom::{
	build::{h, Child},
	host::memory::{MemoryHost, NodeId},
	modules::default_modules,
	vnode::{Handler, Props, VNode},
	Error, Patcher, Prior,
};

type Node = VNode<NodeId>;

fn counter() -> (Handler, Rc<Cell<usize>>) {
	let count = Rc::new(Cell::new(0));
	let handler = Handler::new({
		let count = Rc::clone(&count);
		move |_| count.set(count.get() + 1)
	});
	(handler, count)
}

fn button(handler: Option<&Handler>) -> Result<Node, Error> {
	let props = match handler {
		Some(handler) => Props::new().on("click", handler.clone()),
		None => Props::new(),
	};
	Ok(h("button", Some(props), vec![Child::from("Click me")])?)
}

fn setup() -> Result<(Patcher<MemoryHost>, NodeId), Error> {
	let mut host = MemoryHost::new();
	let container = host.create_container("div")?;
	Ok((Patcher::new(host, default_modules()), container))
}

#[test]
fn click() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (handler, count) = counter();

	let tree = patcher.patch(Prior::Container(container), button(Some(&handler))?)?;
	let node = *tree.host().unwrap();
	assert_eq!(count.get(), 0);

	assert_eq!(patcher.host().dispatch(node, "click", &()), 1);
	assert_eq!(count.get(), 1);
	assert_eq!(patcher.host().dispatch(node, "keydown", &()), 0);
	assert_eq!(count.get(), 1);

	patcher.unmount(tree)?;
	assert_eq!(patcher.host().listener_count(node), 0);
	assert_eq!(patcher.host().dispatch(node, "click", &()), 0);
	assert_eq!(count.get(), 1);
	Ok(())
}

#[test]
fn same_handler_stays_attached() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (handler, count) = counter();

	let mut tree = patcher.patch(Prior::Container(container), button(Some(&handler))?)?;
	for _ in 0..3 {
		tree = patcher.patch(Prior::Tree(tree), button(Some(&handler))?)?;
	}

	let stats = patcher.host().stats();
	assert_eq!((stats.listeners_added, stats.listeners_removed), (1, 0));
	patcher.host().dispatch(*tree.host().unwrap(), "click", &());
	assert_eq!(count.get(), 1);
	Ok(())
}

#[test]
fn new_handler_replaces_old() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (first, first_count) = counter();
	let (second, second_count) = counter();

	let tree = patcher.patch(Prior::Container(container), button(Some(&first))?)?;
	let tree = patcher.patch(Prior::Tree(tree), button(Some(&second))?)?;
	let node = *tree.host().unwrap();

	assert_eq!(patcher.host().listener_count(node), 1);
	patcher.host().dispatch(node, "click", &());
	assert_eq!((first_count.get(), second_count.get()), (0, 1));

	let tree = patcher.patch(Prior::Tree(tree), button(None)?)?;
	assert_eq!(patcher.host().listener_count(node), 0);
	assert_eq!(tree.host(), Some(&node));
	Ok(())
}

#[test]
fn shared_handler_on_many_elements() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (handler, count) = counter();

	let items = (0..3)
		.map(|i| h("li", Some(Props::new().key(i).on("click", handler.clone())), Vec::new()))
		.collect::<Result<Vec<Node>, _>>()?;
	let tree = patcher.patch(Prior::Container(container), h("ul", None, vec![Child::from(items)])?)?;

	for child in tree.children() {
		patcher.host().dispatch(*child.host().unwrap(), "click", &());
	}
	assert_eq!(count.get(), 3);

	// Dropping one item detaches only its own listener.
	let removed = *tree.children()[1].host().unwrap();
	let items = [0, 2]
		.iter()
		.map(|&i| h("li", Some(Props::new().key(i).on("click", handler.clone())), Vec::new()))
		.collect::<Result<Vec<Node>, _>>()?;
	let tree = patcher.patch(Prior::Tree(tree), h("ul", None, vec![Child::from(items)])?)?;

	assert_eq!(patcher.host().listener_count(removed), 0);
	for child in tree.children() {
		assert_eq!(patcher.host().listener_count(*child.host().unwrap()), 1);
	}
	Ok(())
}

#[test]
fn replacing_a_subtree_detaches_its_listeners() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (handler, count) = counter();

	let tree = patcher.patch(
		Prior::Container(container),
		h("form", None, vec![Child::from(h("fieldset", None, vec![Child::from(button(Some(&handler))?)])?)])?,
	)?;
	let inner = *tree.children()[0].children()[0].host().unwrap();

	patcher.patch(Prior::Tree(tree), h("form", None, vec![Child::from(h("p", None, vec![Child::from("gone")])?)])?)?;

	assert_eq!(patcher.host().listener_count(inner), 0);
	assert_eq!(patcher.host().dispatch(inner, "click", &()), 0);
	assert_eq!(count.get(), 0);
	assert_eq!(patcher.host().stats().listeners_removed, 1);
	Ok(())
}

#[test]
fn payload_reaches_the_handler() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let seen = Rc::new(Cell::new(0_i32));
	let handler = Handler::new({
		let seen = Rc::clone(&seen);
		move |event| {
			if let Some(&value) = event.downcast_ref::<i32>() {
				seen.set(value);
			}
		}
	});

	let tree = patcher.patch(Prior::Container(container), h("input", Some(Props::new().on("input", handler)), Vec::new())?)?;
	patcher.host().dispatch(*tree.host().unwrap(), "input", &42_i32);

	assert_eq!(seen.get(), 42);
	Ok(())
}

#[test]
fn multi_word_event_names() -> Result<(), Error> {
	let (mut patcher, container) = setup()?;
	let (handler, count) = counter();

	let tree = patcher.patch(Prior::Container(container), h("div", Some(Props::new().set("onIonChange", handler)), Vec::new())?)?;

	assert_eq!(patcher.host().dispatch(*tree.host().unwrap(), "ionChange", &()), 1);
	assert_eq!(count.get(), 1);
	Ok(())
}
