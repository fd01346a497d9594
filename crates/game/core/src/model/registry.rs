//! Explicit owner of every combatant taking part in resolution.

use super::{Combatant, CombatantId};
use crate::error::CombatError;

/// Combatants keyed by [`CombatantId`].
///
/// The engine borrows attacker and defender out of the registry for the
/// duration of one resolution; there is no ambient global state.
#[derive(Clone, Debug, Default)]
pub struct CombatantRegistry {
    combatants: Vec<Combatant>,
}

impl CombatantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a combatant, returning its id.
    pub fn insert(&mut self, combatant: Combatant) -> CombatantId {
        let id = combatant.id;
        match self.position(id) {
            Some(index) => self.combatants[index] = combatant,
            None => self.combatants.push(combatant),
        }
        id
    }

    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        let index = self.position(id)?;
        Some(self.combatants.remove(index))
    }

    /// Next unused id, for spawning monsters.
    pub fn next_id(&self) -> CombatantId {
        let max = self.combatants.iter().map(|c| c.id.0).max();
        CombatantId(max.map_or(0, |m| m + 1))
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Borrows two distinct combatants mutably at once.
    pub fn pair_mut(
        &mut self,
        a: CombatantId,
        b: CombatantId,
    ) -> Result<(&mut Combatant, &mut Combatant), CombatError> {
        if a == b {
            return Err(CombatError::SelfTarget(a));
        }
        let ia = self.position(a).ok_or(CombatError::CombatantNotFound(a))?;
        let ib = self.position(b).ok_or(CombatError::CombatantNotFound(b))?;

        if ia < ib {
            let (left, right) = self.combatants.split_at_mut(ib);
            Ok((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.combatants.split_at_mut(ia);
            Ok((&mut right[0], &mut left[ib]))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    fn position(&self, id: CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeciesId;

    fn registry() -> CombatantRegistry {
        let mut reg = CombatantRegistry::new();
        reg.insert(Combatant::player("you", 20));
        reg.insert(Combatant::monster(CombatantId(1), SpeciesId::from("rat"), "rat", 5));
        reg
    }

    #[test]
    fn pair_mut_borrows_in_either_order() {
        let mut reg = registry();
        {
            let (rat, you) = reg.pair_mut(CombatantId(1), CombatantId::PLAYER).unwrap();
            rat.hp -= 1;
            you.hp -= 2;
        }
        assert_eq!(reg.get(CombatantId(1)).unwrap().hp, 4);
        assert_eq!(reg.get(CombatantId::PLAYER).unwrap().hp, 18);
    }

    #[test]
    fn pair_mut_rejects_self_and_missing() {
        let mut reg = registry();
        assert_eq!(
            reg.pair_mut(CombatantId(1), CombatantId(1)).unwrap_err(),
            CombatError::SelfTarget(CombatantId(1))
        );
        assert_eq!(
            reg.pair_mut(CombatantId(1), CombatantId(5)).unwrap_err(),
            CombatError::CombatantNotFound(CombatantId(5))
        );
    }

    #[test]
    fn next_id_skips_existing() {
        assert_eq!(registry().next_id(), CombatantId(2));
    }
}
