use xylem_dom::{
	build::{h, Child},
	host::{
		memory::{HostStats, MemoryHost, NodeId},
		Host as _,
	},
	modules::default_modules,
	vnode::{Props, VNode},
	Error, Patcher, Prior,
};

type Node = VNode<NodeId>;

fn list(keys: &[&str]) -> Result<Node, Error> {
	let items = keys
		.iter()
		.map(|&key| h("li", Some(Props::new().key(key)), vec![Child::from(key)]))
		.collect::<Result<Vec<Node>, _>>()?;
	Ok(h("ul", None, vec![Child::from(items)])?)
}

/// Mounts `from`, then patches to `to` and returns the resulting markup and the change in stats.
///
/// Panics if a retained key didn't keep its host node.
fn reorder(from: &[&str], to: &[&str]) -> Result<(String, HostStats), Error> {
	let mut host = MemoryHost::new();
	let container = host.create_container("div")?;
	let mut patcher = Patcher::new(host, default_modules());

	let tree = patcher.patch(Prior::Container(container), list(from)?)?;
	let before: Vec<(String, NodeId)> = tree.children().iter().map(|child| (child.children()[0].as_text().unwrap().to_owned(), *child.host().unwrap())).collect();
	let stats = patcher.host().stats();

	let tree = patcher.patch(Prior::Tree(tree), list(to)?)?;

	for child in tree.children() {
		let label = child.children()[0].as_text().unwrap();
		let node = *child.host().unwrap();
		if let Some((_, old_node)) = before.iter().find(|(old_label, _)| old_label == label) {
			assert_eq!(node, *old_node, "{:?} was recreated", label);
		}
		assert_eq!(patcher.host().child_nodes(&node).first(), child.children()[0].host());
	}

	let after = patcher.host().stats();
	let delta = HostStats {
		elements_created: after.elements_created - stats.elements_created,
		texts_created: after.texts_created - stats.texts_created,
		nodes_removed: after.nodes_removed - stats.nodes_removed,
		listeners_added: after.listeners_added - stats.listeners_added,
		listeners_removed: after.listeners_removed - stats.listeners_removed,
	};

	let html = patcher.host().to_html(*tree.host().unwrap());
	Ok((html, delta))
}

fn markup(keys: &[&str]) -> String {
	let items: String = keys.iter().map(|key| format!("<li>{}</li>", key)).collect();
	format!("<ul>{}</ul>", items)
}

#[test]
fn rotate_right() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c"], &["c", "a", "b"])?;
	assert_eq!(html, markup(&["c", "a", "b"]));
	assert_eq!(delta, HostStats::default());
	Ok(())
}

#[test]
fn rotate_left() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c"], &["b", "c", "a"])?;
	assert_eq!(html, markup(&["b", "c", "a"]));
	assert_eq!(delta, HostStats::default());
	Ok(())
}

#[test]
fn reverse() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"])?;
	assert_eq!(html, markup(&["e", "d", "c", "b", "a"]));
	assert_eq!(delta, HostStats::default());
	Ok(())
}

#[test]
fn swap_middle() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c", "d"], &["a", "c", "b", "d"])?;
	assert_eq!(html, markup(&["a", "c", "b", "d"]));
	assert_eq!(delta, HostStats::default());
	Ok(())
}

#[test]
fn shuffle_with_lookup() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c", "d", "e", "f"], &["d", "f", "a", "e", "b", "c"])?;
	assert_eq!(html, markup(&["d", "f", "a", "e", "b", "c"]));
	assert_eq!(delta, HostStats::default());
	Ok(())
}

#[test]
fn insert_move_and_remove() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c", "d", "e"], &["b", "e", "x", "a"])?;
	assert_eq!(html, markup(&["b", "e", "x", "a"]));
	assert_eq!(delta.elements_created, 1);
	assert_eq!(delta.texts_created, 1);
	assert_eq!(delta.nodes_removed, 2);
	Ok(())
}

#[test]
fn prepend_and_append() -> Result<(), Error> {
	let (html, delta) = reorder(&["b", "c"], &["a", "b", "c", "d"])?;
	assert_eq!(html, markup(&["a", "b", "c", "d"]));
	assert_eq!(delta.elements_created, 2);
	assert_eq!(delta.nodes_removed, 0);
	Ok(())
}

#[test]
fn insert_in_the_middle() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "d"], &["a", "b", "c", "d"])?;
	assert_eq!(html, markup(&["a", "b", "c", "d"]));
	assert_eq!(delta.elements_created, 2);
	Ok(())
}

#[test]
fn remove_from_both_ends() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b", "c", "d"], &["b", "c"])?;
	assert_eq!(html, markup(&["b", "c"]));
	assert_eq!(delta.elements_created, 0);
	assert_eq!(delta.nodes_removed, 2);
	Ok(())
}

#[test]
fn replace_everything() -> Result<(), Error> {
	let (html, delta) = reorder(&["a", "b"], &["x", "y", "z"])?;
	assert_eq!(html, markup(&["x", "y", "z"]));
	assert_eq!(delta.elements_created, 3);
	assert_eq!(delta.nodes_removed, 2);
	Ok(())
}

#[test]
fn same_key_different_tag_is_recreated() -> Result<(), Error> {
	let mut host = MemoryHost::new();
	let container = host.create_container("div")?;
	let mut patcher = Patcher::new(host, default_modules());

	let item = |tag: &str, key: &str| h(tag, Some(Props::new().key(key)), vec![Child::from(tag)]);
	let tree: Node = h("div", None, vec![Child::from(item("p", "first")?), Child::from(item("em", "second")?)])?;
	let tree = patcher.patch(Prior::Container(container), tree)?;
	let created = patcher.host().stats().elements_created;
	let first = tree.children()[0].host().copied();

	let tree = patcher.patch(Prior::Tree(tree), h("div", None, vec![Child::from(item("span", "first")?), Child::from(item("em", "second")?)])?)?;

	assert_eq!(patcher.host().to_html(container), "<div><div><span>span</span><em>em</em></div></div>");
	assert_ne!(tree.children()[0].host().copied(), first);
	assert_eq!(patcher.host().stats().elements_created, created + 1);
	Ok(())
}

#[test]
fn reorder_and_back() -> Result<(), Error> {
	let original = ["a", "b", "c", "d", "e"];
	let mut host = MemoryHost::new();
	let container = host.create_container("div")?;
	let mut patcher = Patcher::new(host, default_modules());

	let tree = patcher.patch(Prior::Container(container), list(&original)?)?;
	let nodes = |tree: &Node| tree.children().iter().map(|child| *child.host().unwrap()).collect::<Vec<_>>();
	let before = nodes(&tree);
	let stats = patcher.host().stats();

	let tree = patcher.patch(Prior::Tree(tree), list(&["d", "a", "e", "c", "b"])?)?;
	let tree = patcher.patch(Prior::Tree(tree), list(&original)?)?;

	assert_eq!(nodes(&tree), before);
	assert_eq!(patcher.host().child_nodes(tree.host().unwrap()), before);
	assert_eq!(patcher.host().stats(), stats);
	assert_eq!(patcher.host().to_html(*tree.host().unwrap()), markup(&original));
	Ok(())
}
