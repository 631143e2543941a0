//! Reference-counted shared stylesheets.
//!
//! Several swarms on one page share the same keyframes. Each surface holds a
//! [`StyleLease`]; the first lease installs the node and the last one to drop
//! removes it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::error::SurfaceError;

/// A style node that can be taken out of the document.
pub trait StyleNode {
	/// Remove the node from its document.
	fn detach(&self);
}

struct Entry<N> {
	node: N,
	leases: usize,
}

type Entries<N> = RefCell<HashMap<&'static str, Entry<N>>>;

/// Registry of installed style nodes keyed by id.
pub struct StyleRegistry<N> {
	entries: Rc<Entries<N>>,
}

impl<N> Clone for StyleRegistry<N> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

impl<N> Default for StyleRegistry<N> {
	fn default() -> Self {
		Self {
			entries: Rc::new(RefCell::new(HashMap::new())),
		}
	}
}

impl<N: StyleNode> StyleRegistry<N> {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes a lease on `id`, calling `install` only if no lease is held yet.
	pub fn acquire<F>(&self, id: &'static str, install: F) -> Result<StyleLease<N>, SurfaceError>
	where
		F: FnOnce() -> Result<N, SurfaceError>,
	{
		let mut entries = self.entries.borrow_mut();
		match entries.get_mut(id) {
			Some(entry) => entry.leases += 1,
			None => {
				let node = install()?;
				entries.insert(id, Entry { node, leases: 1 });
			}
		}
		Ok(StyleLease {
			id,
			entries: Rc::downgrade(&self.entries),
		})
	}

	/// Live leases on `id`.
	pub fn leases(&self, id: &str) -> usize {
		self.entries.borrow().get(id).map_or(0, |e| e.leases)
	}
}

/// Keeps a shared style node installed while alive.
pub struct StyleLease<N: StyleNode> {
	id: &'static str,
	entries: Weak<Entries<N>>,
}

impl<N: StyleNode> Drop for StyleLease<N> {
	fn drop(&mut self) {
		let Some(entries) = self.entries.upgrade() else {
			return;
		};
		let released = {
			let mut entries = entries.borrow_mut();
			match entries.get_mut(self.id) {
				Some(entry) if entry.leases > 1 => {
					entry.leases -= 1;
					None
				}
				Some(_) => entries.remove(self.id),
				None => None,
			}
		};
		if let Some(entry) = released {
			entry.node.detach();
		}
	}
}
