//! Registry of live lifecycle records and the container → members index.
//!
//! Both maps live behind the detector's single lock. Operations on missing
//! keys are no-ops.

use std::collections::{HashMap, HashSet};

use gobj_types::{ContainerSnapshot, InstanceId, LifecycleRecord};

#[derive(Default)]
pub(crate) struct Registry {
    records: HashMap<InstanceId, LifecycleRecord>,
}

impl Registry {
    pub(crate) fn put(&mut self, record: LifecycleRecord) {
        self.records.insert(record.id, record);
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&LifecycleRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut LifecycleRecord> {
        self.records.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: InstanceId) -> Option<LifecycleRecord> {
        self.records.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &LifecycleRecord> {
        self.records.values()
    }
}

#[derive(Default)]
pub(crate) struct ContainmentIndex {
    members: HashMap<InstanceId, HashSet<InstanceId>>,
}

impl ContainmentIndex {
    pub(crate) fn attach(&mut self, container: InstanceId, member: InstanceId) {
        self.members.entry(container).or_default().insert(member);
    }

    pub(crate) fn detach(&mut self, container: InstanceId, member: InstanceId) {
        if let Some(members) = self.members.get_mut(&container) {
            members.remove(&member);
            if members.is_empty() {
                self.members.remove(&container);
            }
        }
    }

    pub(crate) fn members_of(
        &self,
        container: InstanceId,
    ) -> impl Iterator<Item = InstanceId> + '_ {
        self.members
            .get(&container)
            .into_iter()
            .flat_map(|members| members.iter().copied())
    }

    /// Removes the container's entry, returning the members it had.
    pub(crate) fn drop_container(&mut self, container: InstanceId) -> HashSet<InstanceId> {
        self.members.remove(&container).unwrap_or_default()
    }

    pub(crate) fn snapshot(&self) -> Vec<ContainerSnapshot> {
        let mut out: Vec<ContainerSnapshot> = self
            .members
            .iter()
            .map(|(container, members)| {
                let mut members: Vec<InstanceId> = members.iter().copied().collect();
                members.sort();
                ContainerSnapshot {
                    container: *container,
                    members,
                }
            })
            .collect();
        out.sort_by_key(|entry| entry.container);
        out
    }
}

/// Registry and containment index, mutated together so they stay consistent.
#[derive(Default)]
pub(crate) struct LeakDb {
    pub(crate) registry: Registry,
    pub(crate) containment: ContainmentIndex,
}

impl LeakDb {
    /// Removes a record and its own attachment. Returns the removed record.
    pub(crate) fn unlink(&mut self, id: InstanceId) -> Option<LifecycleRecord> {
        let record = self.registry.remove(id)?;
        if let Some(container) = record.container {
            self.containment.detach(container, id);
        }
        Some(record)
    }

    /// Moves `member` from its current container to `container`.
    pub(crate) fn reattach(
        &mut self,
        member: InstanceId,
        container: Option<InstanceId>,
        container_visible: bool,
    ) {
        let Some(record) = self.registry.get_mut(member) else {
            return;
        };
        let previous = record.container.take();
        record.container = container;
        record.visibility.container_visible = container_visible;

        if let Some(previous) = previous {
            self.containment.detach(previous, member);
        }
        if let Some(container) = container {
            self.containment.attach(container, member);
        }
    }

    /// Forgets a container that is gone: drops its index entry and clears the
    /// back-reference on every member that still points at it.
    pub(crate) fn orphan_members(&mut self, container: InstanceId) -> HashSet<InstanceId> {
        let members = self.containment.drop_container(container);
        for member in &members {
            if let Some(record) = self.registry.get_mut(*member)
                && record.container == Some(container)
            {
                record.container = None;
            }
        }
        members
    }
}
