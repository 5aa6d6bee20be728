//! Registry of live anchors
//!
//! Keeps every mounted anchor of one page in registration order so a click
//! can broadcast "everyone else, deactivate". The registry is owned by the
//! page context; there is no process-wide list.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Something the registry can force inactive
pub trait RegistryMember {
    /// Transition to inactive, firing blur callbacks if the member was active
    ///
    /// Returns true if the member actually changed state.
    fn deactivate(&self) -> bool;
}

/// Identity of a registered member
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u64);

impl MemberId {
    /// Raw value, for logging
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Ordered set of live members
#[derive(Default)]
pub struct Registry {
    members: RefCell<IndexMap<MemberId, Weak<dyn RegistryMember>>>,
    next_id: Cell<u64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member
    ///
    /// Adding the same member twice returns its existing id.
    pub fn add(&self, member: Weak<dyn RegistryMember>) -> MemberId {
        let mut members = self.members.borrow_mut();
        if let Some((&id, _)) = members.iter().find(|(_, m)| m.ptr_eq(&member)) {
            return id;
        }

        let id = MemberId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        members.insert(id, member);
        tracing::trace!("Registry: added member {}", id.0);
        id
    }

    /// Remove a member, keeping the order of the others
    pub fn remove(&self, id: MemberId) -> bool {
        let removed = self.members.borrow_mut().shift_remove(&id).is_some();
        if removed {
            tracing::trace!("Registry: removed member {}", id.0);
        }
        removed
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.members.borrow().contains_key(&id)
    }

    /// Member ids in registration order
    pub fn ids(&self) -> Vec<MemberId> {
        self.members.borrow().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Deactivate every member except `keep`, in registration order
    ///
    /// Runs to completion before returning. Returns how many members
    /// changed state.
    pub fn deactivate_all_except(&self, keep: MemberId) -> usize {
        let others: SmallVec<[Rc<dyn RegistryMember>; 8]> = self
            .members
            .borrow()
            .iter()
            .filter(|(id, _)| **id != keep)
            .filter_map(|(_, member)| member.upgrade())
            .collect();

        let changed = others.iter().filter(|member| member.deactivate()).count();
        tracing::debug!(
            "Registry: deactivated {} of {} other member(s)",
            changed,
            others.len()
        );
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Toggle {
        active: Cell<bool>,
        blurs: Cell<u32>,
    }

    impl Toggle {
        fn new(active: bool) -> Rc<Self> {
            Rc::new(Self {
                active: Cell::new(active),
                blurs: Cell::new(0),
            })
        }
    }

    impl RegistryMember for Toggle {
        fn deactivate(&self) -> bool {
            if !self.active.get() {
                return false;
            }
            self.active.set(false);
            self.blurs.set(self.blurs.get() + 1);
            true
        }
    }

    fn weak(toggle: &Rc<Toggle>) -> Weak<dyn RegistryMember> {
        Rc::downgrade(toggle) as Weak<dyn RegistryMember>
    }

    #[test]
    fn test_registration_order_and_removal() {
        let registry = Registry::new();
        let (a, b, c) = (Toggle::new(false), Toggle::new(false), Toggle::new(false));
        let ia = registry.add(weak(&a));
        let ib = registry.add(weak(&b));
        let ic = registry.add(weak(&c));
        assert_eq!(registry.ids(), vec![ia, ib, ic]);

        assert!(registry.remove(ib));
        assert!(!registry.remove(ib));
        assert_eq!(registry.ids(), vec![ia, ic]);
        assert!(!registry.contains(ib));
    }

    #[test]
    fn test_no_duplicates() {
        let registry = Registry::new();
        let a = Toggle::new(false);
        let first = registry.add(weak(&a));
        let second = registry.add(weak(&a));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deactivate_all_except() {
        let registry = Registry::new();
        let (a, b, c) = (Toggle::new(true), Toggle::new(true), Toggle::new(false));
        let ia = registry.add(weak(&a));
        registry.add(weak(&b));
        registry.add(weak(&c));

        assert_eq!(registry.deactivate_all_except(ia), 1);
        assert!(a.active.get());
        assert!(!b.active.get());
        assert_eq!(b.blurs.get(), 1);
        // Already inactive: no blur
        assert_eq!(c.blurs.get(), 0);

        // Second broadcast is a no-op
        assert_eq!(registry.deactivate_all_except(ia), 0);
        assert_eq!(b.blurs.get(), 1);
    }

    #[test]
    fn test_removed_member_is_not_touched() {
        let registry = Registry::new();
        let (a, b) = (Toggle::new(true), Toggle::new(true));
        let ia = registry.add(weak(&a));
        let ib = registry.add(weak(&b));
        registry.remove(ib);

        registry.deactivate_all_except(ia);
        assert!(b.active.get());
        assert_eq!(b.blurs.get(), 0);
    }
}
