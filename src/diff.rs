use crate::{
	config::Config,
	error::{BuildError, Error},
	host::{Host, Namespace},
	loggable,
	modules::Module,
	temp_set::DuplicateKeys,
	vnode::{Key, VElement, VNode},
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// What a render pass starts from.
#[derive(Debug)]
pub enum Prior<N> {
	/// First render: The new tree is created from scratch and appended to this host node.
	Container(N),
	/// The tree returned by the previous pass.
	Tree(VNode<N>),
}

impl<N> From<VNode<N>> for Prior<N> {
	fn from(tree: VNode<N>) -> Self {
		Self::Tree(tree)
	}
}

/// Reconciles virtual trees into a [`Host`], delegating element properties to an ordered list of [`Module`]s.
///
/// # Correct Use
///
/// Each [`patch`](`Patcher::patch`) consumes the previous tree and returns the new one, now bound to host nodes.
/// Keep that tree around as [`Prior::Tree`] for the next pass, and don't modify the mounted host nodes' children in between.
///
/// Keys must be unique among siblings and stable for the entity they stand for.
/// [`Handler`](`crate::vnode::Handler`)s must be reused across renders to keep their listeners attached.
pub struct Patcher<H: Host> {
	host: H,
	modules: Vec<Box<dyn Module<H>>>,
	config: Config,
	duplicate_keys: DuplicateKeys,
}

impl<H: Host + Debug> Debug for Patcher<H> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Patcher")
			.field("host", &self.host)
			.field("modules", &self.modules.iter().map(|module| module.name()).collect::<Vec<_>>())
			.field("config", &self.config)
			.finish()
	}
}

impl<H: Host> Patcher<H> {
	#[must_use]
	pub fn new(host: H, modules: Vec<Box<dyn Module<H>>>) -> Self {
		Self::with_config(host, modules, Config::default())
	}

	#[must_use]
	pub fn with_config(host: H, modules: Vec<Box<dyn Module<H>>>, config: Config) -> Self {
		Self {
			host,
			modules,
			config,
			duplicate_keys: DuplicateKeys::new(),
		}
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	/// Mutating host nodes that are bound to a tree between passes is unsupported, except for what no [`Module`] owns.
	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	#[must_use]
	pub fn into_host(self) -> H {
		self.host
	}

	#[must_use]
	pub fn config(&self) -> Config {
		self.config
	}

	/// Makes the host match `new` and returns it, bound to its host nodes.
	///
	/// # Errors
	///
	/// Duplicate sibling keys are reported before anything is changed.
	/// Other errors abort the pass where they happen, leaving untouched siblings as they were.
	#[instrument(skip_all)]
	pub fn patch(&mut self, prior: Prior<H::Node>, mut new: VNode<H::Node>) -> Result<VNode<H::Node>, Error> {
		if self.config.validate_keys {
			self.validate(&new, 0)?;
		}

		let result = match prior {
			Prior::Container(container) => self.mount(&container, &mut new),
			Prior::Tree(old) => {
				if old.is_same_as(&new) {
					self.patch_vnode(old, &mut new, 0)
				} else {
					self.replace(old, &mut new, 0)
				}
			}
		};

		self.host.finish_pass();
		info!("Key check heap capacity: {}", self.duplicate_keys.capacity());
		result.map(|()| new)
	}

	/// Removes a mounted tree from the host, detaching all of its listeners.
	///
	/// # Errors
	///
	/// Iff a [`Module`] or the host fails while tearing down.
	#[instrument(skip_all)]
	pub fn unmount(&mut self, old: VNode<H::Node>) -> Result<(), Error> {
		let result = self.remove_vnode(old, 0);
		self.host.finish_pass();
		result
	}

	fn check_depth(&self, depth: usize) -> Result<(), Error> {
		if depth > self.config.depth_limit {
			error!("Depth limit reached");
			return Err(Error::DepthLimit { limit: self.config.depth_limit });
		}
		Ok(())
	}

	fn inherited_namespace(&self, parent: &H::Node) -> Namespace {
		match self.host.tag_name(parent) {
			Some(tag) => self.host.child_namespace(self.host.namespace(parent), &tag),
			None => Namespace::Html,
		}
	}

	fn validate(&mut self, vnode: &VNode<H::Node>, depth: usize) -> Result<(), Error> {
		self.check_depth(depth)?;
		if let VNode::Element(element) = vnode {
			if let Some(key) = self.duplicate_keys.first(element.children.iter().filter_map(VNode::key)) {
				error!(parent = %element.tag, %key, "Duplicate key");
				return Err(BuildError::DuplicateKey {
					parent: element.tag.clone(),
					key: key.clone(),
				}
				.into());
			}
			for child in &element.children {
				self.validate(child, depth + 1)?;
			}
		}
		Ok(())
	}

	fn mount(&mut self, container: &H::Node, new: &mut VNode<H::Node>) -> Result<(), Error> {
		let span = trace_span!("Mounting", ?container);
		let _enter = span.enter();
		let namespace = self.inherited_namespace(container);
		let node = self.create(new, namespace, 0)?;
		self.insert_created(container, new, &node, None, 0)
	}

	/// Creates `new` next to `old`, then removes `old`.
	fn replace(&mut self, old: VNode<H::Node>, new: &mut VNode<H::Node>, depth: usize) -> Result<(), Error> {
		let span = trace_span!("Replacing mismatching", old_key = ?old.key(), new_key = ?new.key());
		let _enter = span.enter();

		let old_node = old.host().cloned().ok_or(Error::Unmounted)?;
		let parent = self.host.parent(&old_node);
		let namespace = parent.as_ref().map_or(Namespace::Html, |parent| self.inherited_namespace(parent));
		let node = self.create(new, namespace, depth)?;
		match &parent {
			Some(parent) => self.insert_created(parent, new, &node, Some(&old_node), depth)?,
			None => warn!("Replacing a node without parent. The replacement stays detached."),
		}
		self.remove_vnode(old, depth)
	}

	/// Creates the host subtree for `vnode` without inserting it.
	///
	/// On failure, whatever was created is torn down again and `vnode` stays unbound.
	fn create(&mut self, vnode: &mut VNode<H::Node>, inherited: Namespace, depth: usize) -> Result<H::Node, Error> {
		self.check_depth(depth)?;
		match vnode {
			VNode::Text(text) => {
				let span = trace_span!("Creating text node", text = loggable(&text.text));
				let _enter = span.enter();
				let node = self.host.create_text(&text.text)?;
				text.host = Some(node.clone());
				Ok(node)
			}

			VNode::Element(element) => {
				let span = trace_span!("Creating element", tag = %element.tag, key = ?element.key);
				let _enter = span.enter();
				let namespace = self.host.element_namespace(inherited, &element.tag);
				let node = self.host.create_element(namespace, &element.tag)?;
				element.namespace = namespace;
				element.host = Some(node.clone());

				let mut hooked = 0;
				if let Err(error) = self.create_contents(element, &node, depth, &mut hooked) {
					if let Err(cleanup_error) = self.destroy_hooked(element, hooked, depth) {
						error!("Failed to tear down partially created element: {}", cleanup_error);
					}
					element.host = None;
					return Err(error);
				}
				Ok(node)
			}
		}
	}

	/// Counts the modules whose `create` succeeded in `hooked`. Children are only created once all of them did.
	fn create_contents(&mut self, element: &mut VElement<H::Node>, node: &H::Node, depth: usize, hooked: &mut usize) -> Result<(), Error> {
		for module in &self.modules {
			module.create(&mut self.host, node, element)?;
			*hooked += 1;
		}
		let namespace = self.host.child_namespace(element.namespace, &element.tag);
		for child in &mut element.children {
			let child_node = self.create(child, namespace, depth + 1)?;
			self.host.insert_before(node, &child_node, None)?;
		}
		Ok(())
	}

	fn insert_created(&mut self, parent: &H::Node, vnode: &mut VNode<H::Node>, node: &H::Node, reference: Option<&H::Node>, depth: usize) -> Result<(), Error> {
		if let Err(error) = self.host.insert_before(parent, node, reference) {
			if let Err(cleanup_error) = self.destroy(vnode, depth) {
				error!("Failed to tear down element that couldn't be inserted: {}", cleanup_error);
			}
			*vnode.host_mut() = None;
			return Err(error.into());
		}
		Ok(())
	}

	fn add_vnodes(&mut self, parent: &H::Node, reference: Option<&H::Node>, new: &mut [VNode<H::Node>], namespace: Namespace, depth: usize) -> Result<(), Error> {
		for vnode in new {
			let node = self.create(vnode, namespace, depth)?;
			self.insert_created(parent, vnode, &node, reference, depth)?;
		}
		Ok(())
	}

	/// Fires [`Module::destroy`] for every bound element in `vnode`, children first.
	fn destroy(&mut self, vnode: &VNode<H::Node>, depth: usize) -> Result<(), Error> {
		match vnode {
			VNode::Text(_) => Ok(()),
			VNode::Element(element) => self.destroy_element(element, depth),
		}
	}

	fn destroy_element(&mut self, element: &VElement<H::Node>, depth: usize) -> Result<(), Error> {
		self.destroy_hooked(element, self.modules.len(), depth)
	}

	/// Like [`destroy_element`](`Patcher::destroy_element`), but only the first `hooked` modules see `element` itself.
	fn destroy_hooked(&mut self, element: &VElement<H::Node>, hooked: usize, depth: usize) -> Result<(), Error> {
		self.check_depth(depth)?;
		let node = match &element.host {
			Some(node) => node,
			None => return Ok(()),
		};
		for child in &element.children {
			self.destroy(child, depth + 1)?;
		}
		for module in self.modules[..hooked].iter().rev() {
			module.destroy(&mut self.host, node, element)?;
		}
		Ok(())
	}

	fn remove_vnode(&mut self, old: VNode<H::Node>, depth: usize) -> Result<(), Error> {
		let span = trace_span!("Removing", key = ?old.key(), text = old.as_text().map(loggable));
		let _enter = span.enter();

		self.destroy(&old, depth)?;
		if let VNode::Element(element) = &old {
			if let Some(node) = &element.host {
				for module in self.modules.iter().rev() {
					module.remove(&mut self.host, node, element)?;
				}
			}
		}
		match old.host() {
			Some(node) => self.host.remove(node)?,
			None => warn!("Tried to remove a node that was never mounted. Ignoring."),
		}
		Ok(())
	}

	fn remove_vnodes(&mut self, old: impl IntoIterator<Item = VNode<H::Node>>, depth: usize) -> Result<(), Error> {
		for vnode in old {
			self.remove_vnode(vnode, depth)?;
		}
		Ok(())
	}

	fn move_before(&mut self, parent: &H::Node, vnode: &VNode<H::Node>, reference: Option<&H::Node>) -> Result<(), Error> {
		let node = vnode.host().ok_or(Error::Unmounted)?;
		self.host.insert_before(parent, node, reference)?;
		Ok(())
	}

	/// Moves the host node of `old` to `new` and updates it in place.
	///
	/// `old` and `new` must be [the same](`VNode::is_same_as`).
	fn patch_vnode(&mut self, old: VNode<H::Node>, new: &mut VNode<H::Node>, depth: usize) -> Result<(), Error> {
		self.check_depth(depth)?;
		match (old, new) {
			(VNode::Text(old), VNode::Text(new)) => {
				let span = trace_span!("Diffing text node", t_1 = loggable(&old.text), t_2 = loggable(&new.text));
				let _enter = span.enter();
				let node = old.host.ok_or(Error::Unmounted)?;
				if STATIC_MAX_LEVEL >= Level::ERROR && cfg!(debug_assertions) {
					if let Some(data) = self.host.text(&node) {
						if data != old.text {
							error!("Unexpected text data: Expected {:?} but found {:?}. Overwriting.", loggable(&old.text), loggable(&data));
						}
					}
				}
				if old.text != new.text {
					self.host.set_text(&node, &new.text)?;
				}
				new.host = Some(node);
				Ok(())
			}

			(VNode::Element(old), VNode::Element(new)) => {
				let span = trace_span!("Diffing element", tag = %new.tag, key = ?new.key);
				let _enter = span.enter();
				debug_assert!(old.tag == new.tag && old.key == new.key);

				let node = old.host.clone().ok_or(Error::Unmounted)?;
				new.host = Some(node.clone());
				new.namespace = old.namespace;

				if !(old.props.is_empty() && new.props.is_empty()) {
					for module in &self.modules {
						module.update(&mut self.host, &node, &old, new)?;
					}
				}

				let namespace = self.host.child_namespace(new.namespace, &new.tag);
				self.patch_children(&node, namespace, old.children, &mut new.children, depth + 1)
			}

			(old, new) => {
				warn!("Patching mismatching nodes. Replacing instead.");
				self.replace(old, new, depth)
			}
		}
	}

	fn patch_children(&mut self, parent: &H::Node, namespace: Namespace, old: Vec<VNode<H::Node>>, new: &mut [VNode<H::Node>], depth: usize) -> Result<(), Error> {
		match (old.is_empty(), new.is_empty()) {
			(true, true) => Ok(()),
			(true, false) => self.add_vnodes(parent, None, new, namespace, depth),
			(false, true) => self.remove_vnodes(old, depth),
			(false, false) => self.update_children(parent, namespace, old, new, depth),
		}
	}

	/// The four-cursor children diff.
	///
	/// Matches the ends of both ranges against each other first (in place, then moved right or left),
	/// falls back to a key lookup in the remaining old range, and creates what's left unmatched.
	/// Moved nodes keep their host nodes.
	#[allow(clippy::too_many_lines)]
	fn update_children(&mut self, parent: &H::Node, namespace: Namespace, old: Vec<VNode<H::Node>>, new: &mut [VNode<H::Node>], depth: usize) -> Result<(), Error> {
		let span = trace_span!("Diffing children", "old.len()" = old.len(), "new.len()" = new.len());
		let _enter = span.enter();

		// Taken slots are `None`.
		let mut old: Vec<Option<VNode<H::Node>>> = old.into_iter().map(Some).collect();
		// Both ends are exclusive.
		let (mut old_start, mut old_end) = (0, old.len());
		let (mut new_start, mut new_end) = (0, new.len());
		let mut old_keys: Option<HashMap<Key, usize>> = None;

		while old_start < old_end && new_start < new_end {
			let start = match &old[old_start] {
				Some(start) => start,
				None => {
					old_start += 1;
					continue;
				}
			};
			let end = match &old[old_end - 1] {
				Some(end) => end,
				None => {
					old_end -= 1;
					continue;
				}
			};

			if start.is_same_as(&new[new_start]) {
				trace!("Start matches start.");
				if let Some(start) = old[old_start].take() {
					self.patch_vnode(start, &mut new[new_start], depth)?;
				}
				old_start += 1;
				new_start += 1;
			} else if end.is_same_as(&new[new_end - 1]) {
				trace!("End matches end.");
				if let Some(end) = old[old_end - 1].take() {
					self.patch_vnode(end, &mut new[new_end - 1], depth)?;
				}
				old_end -= 1;
				new_end -= 1;
			} else if start.is_same_as(&new[new_end - 1]) {
				trace!("Start moved to the end.");
				let reference = end.host().and_then(|end| self.host.next_sibling(end));
				if let Some(start) = old[old_start].take() {
					self.patch_vnode(start, &mut new[new_end - 1], depth)?;
				}
				self.move_before(parent, &new[new_end - 1], reference.as_ref())?;
				old_start += 1;
				new_end -= 1;
			} else if end.is_same_as(&new[new_start]) {
				trace!("End moved to the start.");
				let reference = start.host().cloned();
				if let Some(end) = old[old_end - 1].take() {
					self.patch_vnode(end, &mut new[new_start], depth)?;
				}
				self.move_before(parent, &new[new_start], reference.as_ref())?;
				old_end -= 1;
				new_start += 1;
			} else {
				let reference = start.host().cloned();
				let old_keys = old_keys.get_or_insert_with(|| {
					trace!("Indexing remaining old keys.");
					old[old_start..old_end]
						.iter()
						.enumerate()
						.filter_map(|(i, slot)| Some((slot.as_ref()?.key()?.clone(), old_start + i)))
						.collect()
				});

				let matched = new[new_start]
					.key()
					.and_then(|key| old_keys.get(key))
					.copied()
					.filter(|&i| old[i].as_ref().map_or(false, |candidate| candidate.is_same_as(&new[new_start])));
				match matched {
					Some(i) => {
						trace!(i, "Found by key.");
						if let Some(moved) = old[i].take() {
							self.patch_vnode(moved, &mut new[new_start], depth)?;
						}
						self.move_before(parent, &new[new_start], reference.as_ref())?;
					}
					None => {
						trace!("Creating unmatched.");
						let node = self.create(&mut new[new_start], namespace, depth)?;
						self.insert_created(parent, &mut new[new_start], &node, reference.as_ref(), depth)?;
					}
				}
				new_start += 1;
			}
		}

		if old_start >= old_end {
			if new_start < new_end {
				let reference = new.get(new_end).and_then(VNode::host).cloned();
				self.add_vnodes(parent, reference.as_ref(), &mut new[new_start..new_end], namespace, depth)?;
			}
		} else if new_start >= new_end {
			self.remove_vnodes(old.drain(old_start..old_end).flatten(), depth)?;
		}

		if STATIC_MAX_LEVEL >= Level::WARN && old.iter().any(Option::is_some) {
			warn!("{} old node(s) were left over after diffing children.", old.iter().filter(|slot| slot.is_some()).count());
		}
		Ok(())
	}
}
