//! Head severing against multi-headed defenders.

use tracing::debug;

use crate::config::BrandConfig;
use crate::env::{EffectSink, RngOracle};
use crate::model::{Combatant, DamageType, Element};

use super::apply::apply_effect;
use super::brand::BrandEffect;
use super::outcome::{AppliedEffect, Fatality};

/// A severing blow. The slot's brand is skipped when this happens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Severance {
    pub effects: Vec<AppliedEffect>,
    pub fatality: Option<Fatality>,
}

/// Cuts a head off `defender` when the blow qualifies.
///
/// Edged blows that dealt damage sever on 4+ damage, a vorpal edge or a coin
/// flip. Monster attackers also need a `1-in-monster_sever_one_in` roll.
/// A fiery edge cauterises the stump; otherwise two heads regrow, never past
/// `max_heads`.
pub fn try_sever(
    attacker: &Combatant,
    defender: &mut Combatant,
    damage_type: DamageType,
    brand: BrandEffect,
    dealt: i32,
    config: &BrandConfig,
    sink: &mut impl EffectSink,
    rng: &mut impl RngOracle,
) -> Option<Severance> {
    let heads = defender.parts.filter(|&n| n > 0)?;

    if !damage_type.severs() || dealt <= 0 {
        return None;
    }
    if !attacker.is_player() && !rng.one_in(config.monster_sever_one_in) {
        return None;
    }
    if dealt < 4 && brand != BrandEffect::Vorpal && !rng.coin_flip() {
        return None;
    }

    let target = defender.id;
    let remaining = heads - 1;
    let mut severance = Severance::default();

    severance.effects.push(apply_effect(
        AppliedEffect::HeadSevered { target, remaining },
        defender,
        sink,
    ));

    if remaining == 0 {
        severance.fatality = Some(Fatality::Decapitated);
    } else if brand == BrandEffect::Elemental(Element::Fire) {
        severance
            .effects
            .push(apply_effect(AppliedEffect::Cauterised { target }, defender, sink));
    } else if remaining < config.max_heads {
        let healed = 8 + rng.roll_uniform(8);
        severance.effects.push(apply_effect(
            AppliedEffect::HeadsRegrown {
                target,
                heads: remaining.saturating_add(2).min(config.max_heads),
                healed,
            },
            defender,
            sink,
        ));
    }

    debug!(heads, remaining, fatal = severance.fatality.is_some(), "sever");
    Some(severance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{RecordingEffects, ScriptedRng};
    use crate::model::{CombatantId, SpeciesId};

    fn hydra(heads: u8) -> Combatant {
        let mut hydra = Combatant::monster(CombatantId(5), SpeciesId::from("hydra"), "hydra", 40);
        hydra.parts = Some(heads);
        hydra.hp = 20;
        hydra
    }

    fn sever(
        attacker: &Combatant,
        target: &mut Combatant,
        kind: DamageType,
        brand: BrandEffect,
        dealt: i32,
        rng: &mut ScriptedRng,
    ) -> Option<Severance> {
        try_sever(
            attacker,
            target,
            kind,
            brand,
            dealt,
            &BrandConfig::default(),
            &mut RecordingEffects::new(),
            rng,
        )
    }

    #[test]
    fn heavy_slice_regrows_two() {
        let you = Combatant::player("you", 20);
        let mut target = hydra(3);
        let mut rng = ScriptedRng::always_max();

        let cut = sever(&you, &mut target, DamageType::Slicing, BrandEffect::Inert, 6, &mut rng);

        assert!(cut.is_some_and(|c| c.fatality.is_none()));
        assert_eq!(target.parts, Some(4));
        assert_eq!(target.hp, 35);
    }

    #[test]
    fn last_head_decapitates() {
        let you = Combatant::player("you", 20);
        let mut target = hydra(1);
        let mut rng = ScriptedRng::always_max();

        let cut = sever(&you, &mut target, DamageType::Chopping, BrandEffect::Inert, 6, &mut rng);

        assert_eq!(cut.and_then(|c| c.fatality), Some(Fatality::Decapitated));
        assert_eq!(target.hp, -1);
    }

    #[test]
    fn flame_cauterises() {
        let you = Combatant::player("you", 20);
        let mut target = hydra(3);
        let mut rng = ScriptedRng::always_max();

        sever(
            &you,
            &mut target,
            DamageType::Slicing,
            BrandEffect::Elemental(Element::Fire),
            6,
            &mut rng,
        );

        assert_eq!(target.parts, Some(2));
        assert_eq!(target.hp, 20);
    }

    #[test]
    fn blunt_or_light_blows_keep_heads() {
        let you = Combatant::player("you", 20);
        let mut target = hydra(3);

        let mut rng = ScriptedRng::always_min();
        assert!(sever(&you, &mut target, DamageType::Crushing, BrandEffect::Inert, 9, &mut rng).is_none());

        // Coin flip lost on 1.
        let mut rng = ScriptedRng::always_max();
        assert!(sever(&you, &mut target, DamageType::Slicing, BrandEffect::Inert, 2, &mut rng).is_none());

        let mut rng = ScriptedRng::always_max();
        assert!(sever(&you, &mut target, DamageType::Slicing, BrandEffect::Vorpal, 2, &mut rng).is_some());
    }

    #[test]
    fn monsters_rarely_sever() {
        let ogre = Combatant::monster(CombatantId(9), SpeciesId::from("ogre"), "ogre", 30);
        let mut target = hydra(3);
        let mut rng = ScriptedRng::always_max();
        assert!(sever(&ogre, &mut target, DamageType::Chopping, BrandEffect::Inert, 9, &mut rng).is_none());

        // Blunt blows are rejected before the monster's roll is drawn.
        let mut rng = ScriptedRng::always_max();
        assert!(sever(&ogre, &mut target, DamageType::Crushing, BrandEffect::Inert, 9, &mut rng).is_none());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn regrowth_stops_at_the_cap() {
        let you = Combatant::player("you", 20);
        let config = BrandConfig {
            max_heads: u8::MAX,
            ..BrandConfig::default()
        };
        let mut target = hydra(u8::MAX);
        let mut rng = ScriptedRng::always_max();

        try_sever(
            &you,
            &mut target,
            DamageType::Slicing,
            BrandEffect::Inert,
            6,
            &config,
            &mut RecordingEffects::new(),
            &mut rng,
        );

        // 255 - 1 = 254 is below the cap, so heads regrow but saturate at 255.
        assert_eq!(target.parts, Some(u8::MAX));
    }
}
