//! Ownership of every live stack.

use std::collections::HashMap;

use crate::error::StackError;

use super::{CreatureId, EntityKind, EntityStack, SpawnCause, StackId};

/// Non-owning reference to a stack.
///
/// Holders re-resolve it against the registry on every use. A reference whose
/// stack is gone resolves to `None` and its holder treats itself as closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackRef(StackId);

impl StackRef {
    pub fn new(id: StackId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> StackId {
        self.0
    }

    pub fn resolve<'a>(&self, registry: &'a StackRegistry) -> Option<&'a EntityStack> {
        registry.get(self.0)
    }

    pub fn resolve_mut<'a>(&self, registry: &'a mut StackRegistry) -> Option<&'a mut EntityStack> {
        registry.get_mut(self.0)
    }
}

impl From<StackId> for StackRef {
    fn from(id: StackId) -> Self {
        Self(id)
    }
}

/// Stacks keyed by id, indexed by their representative creature.
#[derive(Debug, Default)]
pub struct StackRegistry {
    stacks: HashMap<StackId, EntityStack>,
    by_creature: HashMap<CreatureId, StackId>,
    next_id: u64,
}

impl StackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new stack represented by `representative`.
    pub fn insert(
        &mut self,
        kind: EntityKind,
        representative: CreatureId,
        amount: u32,
        health: f64,
        spawn_cause: SpawnCause,
    ) -> Result<StackId, StackError> {
        if amount == 0 {
            return Err(StackError::InvalidAmount { amount });
        }
        if health.is_nan() || health <= 0.0 {
            return Err(StackError::InvalidHealth { health });
        }
        if let Some(existing) = self.by_creature.get(&representative) {
            return Err(StackError::AlreadyStacked {
                creature: representative,
                stack: *existing,
            });
        }

        self.next_id += 1;
        let id = StackId(self.next_id);
        let stack = EntityStack::new(id, kind, representative, amount, health, spawn_cause);
        self.stacks.insert(id, stack);
        self.by_creature.insert(representative, id);
        Ok(id)
    }

    pub fn get(&self, id: StackId) -> Option<&EntityStack> {
        self.stacks.get(&id)
    }

    pub fn get_mut(&mut self, id: StackId) -> Option<&mut EntityStack> {
        self.stacks.get_mut(&id)
    }

    /// Finds the stack currently represented by `creature`.
    pub fn by_creature(&self, creature: CreatureId) -> Option<StackId> {
        self.by_creature.get(&creature).copied()
    }

    /// Points the stack at a new representative creature.
    pub fn relink(&mut self, id: StackId, creature: CreatureId) -> Result<(), StackError> {
        let stack = self
            .stacks
            .get_mut(&id)
            .ok_or(StackError::UnknownStack(id))?;
        self.by_creature.remove(&stack.representative());
        stack.set_representative(creature);
        self.by_creature.insert(creature, id);
        Ok(())
    }

    /// Drops the stack and its creature index entry.
    pub fn remove(&mut self, id: StackId) -> Option<EntityStack> {
        let stack = self.stacks.remove(&id)?;
        if self.by_creature.get(&stack.representative()) == Some(&id) {
            self.by_creature.remove(&stack.representative());
        }
        Some(stack)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityStack> + '_ {
        self.stacks.values()
    }
}
