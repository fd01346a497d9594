//! End-to-end properties of the resolution pipeline over seeded streams.

use combat_core::env::{PcgRng, RecordingEffects, ScriptedRng};
use combat_core::model::{Behaviour, Brand, SkillId, Stats};
use combat_core::{
    AppliedEffect, AttackReport, AttackRequest, CombatEngine, Combatant, CombatantId,
    Environment, Fatality, SpeciesId, Termination, Weapon,
};
use proptest::prelude::*;

const ORC: CombatantId = CombatantId(1);

fn orc(hp: i32, ac: i32) -> Combatant {
    Combatant::monster(ORC, SpeciesId::from("orc"), "orc", hp)
        .with_defences(ac, 10)
        .with_foe(CombatantId::PLAYER)
        .with_behaviour(Behaviour::Hunting)
}

fn mace() -> Weapon {
    Weapon::new("mace", SkillId::MacesFlails, 8, 14)
}

fn strike(
    engine: &CombatEngine,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    request: AttackRequest,
    seed: u64,
) -> AttackReport {
    engine
        .resolve_pair(
            attacker,
            defender,
            &request,
            Environment::default(),
            &mut RecordingEffects::new(),
            &mut PcgRng::seeded(seed),
        )
        .expect("valid request")
}

fn mean_damage(you: &Combatant, ac: i32, samples: u64) -> f64 {
    let engine = CombatEngine::standard();
    let request = AttackRequest::melee(CombatantId::PLAYER, ORC).without_auxiliary();
    let total: i64 = (0..samples)
        .map(|seed| {
            let mut you = you.clone();
            let mut target = orc(10_000, ac);
            let report = strike(&engine, &mut you, &mut target, request, seed);
            i64::from(report.total_damage())
        })
        .sum();
    total as f64 / samples as f64
}

#[test]
fn maximum_rolls_on_a_d8_deal_eight() {
    let mut you = Combatant::player("you", 20).with_weapon(mace());
    let mut target = orc(30, 0);

    let report = CombatEngine::standard()
        .resolve_pair(
            &mut you,
            &mut target,
            &AttackRequest::melee(CombatantId::PLAYER, ORC).without_auxiliary(),
            Environment::default(),
            &mut RecordingEffects::new(),
            &mut ScriptedRng::always_max(),
        )
        .unwrap();

    let outcome = &report.outcomes[0];
    assert!(outcome.hit);
    assert_eq!(outcome.damage.rolled, 8);
    assert_eq!(outcome.damage.final_damage, 8);
    assert_eq!(target.hp, 22);
}

#[test]
fn stronger_attackers_hit_harder_on_average() {
    let weak = Combatant::player("you", 20).with_weapon(mace());
    let strong = weak.clone().with_stats(Stats::new(18, 11, 11));
    assert!(mean_damage(&strong, 0, 2_000) > mean_damage(&weak, 0, 2_000));

    let skilled = weak
        .clone()
        .with_skill(SkillId::MacesFlails, 20)
        .with_skill(SkillId::Fighting, 20);
    assert!(mean_damage(&skilled, 0, 2_000) > mean_damage(&weak, 0, 2_000));
}

#[test]
fn armour_lowers_average_damage() {
    let you = Combatant::player("you", 20).with_weapon(mace());
    assert!(mean_damage(&you, 0, 2_000) > mean_damage(&you, 10, 2_000));
}

#[test]
fn vampiric_blade_heals_within_the_wound() {
    let engine = CombatEngine::standard();
    let request = AttackRequest::melee(CombatantId::PLAYER, ORC).without_auxiliary();
    let mut healed = 0;

    for seed in 0..500 {
        let mut you = Combatant::player("you", 20)
            .with_weapon(Weapon::new("vampiric sword", SkillId::LongSwords, 12, 14).with_brand(Brand::Vampiric));
        you.hp = 5;
        let mut target = orc(10_000, 0);

        let report = strike(&engine, &mut you, &mut target, request, seed);
        assert!(you.hp <= you.max_hp);

        for outcome in &report.outcomes {
            for effect in &outcome.effects {
                if let AppliedEffect::Healed { amount, .. } = effect {
                    assert!((1..=outcome.damage.final_damage).contains(amount));
                    healed += 1;
                }
            }
        }
    }

    assert!(healed > 0, "no seed ever triggered the brand");
}

#[test]
fn hydra_bites_stop_after_the_kill() {
    let engine = CombatEngine::standard();

    for seed in 0..300 {
        let mut hydra = Combatant::monster(CombatantId(9), SpeciesId::from("hydra"), "hydra", 60)
            .with_foe(CombatantId::PLAYER)
            .with_behaviour(Behaviour::Hunting);
        hydra.parts = Some(7);
        hydra.attacks = combat_core::model::NaturalAttack::new([12, 0, 0, 0]);
        let mut you = Combatant::player("you", 15);

        let report = strike(
            &engine,
            &mut hydra,
            &mut you,
            AttackRequest::melee(CombatantId(9), CombatantId::PLAYER),
            seed,
        );

        if let Some(index) = report.outcomes.iter().position(|o| o.fatality.is_some()) {
            assert_eq!(index, report.outcomes.len() - 1);
            assert_eq!(report.termination, Termination::DefenderDied);
            assert_eq!(report.outcomes[index].fatality, Some(Fatality::Slain));
            assert!(you.hp < 1);
        } else {
            assert_eq!(report.outcomes.len(), 7);
            assert!(you.is_alive());
        }
    }
}

proptest! {
    #[test]
    fn final_damage_is_never_negative(
        seed in any::<u64>(),
        strength in 1i32..30,
        dexterity in 1i32..30,
        skill in 0u8..=27,
        die in 1i32..30,
        plus in -5i32..=5,
        ac in 0i32..40,
    ) {
        let engine = CombatEngine::standard();
        let weapon = Weapon::new("blade", SkillId::LongSwords, die, 14).with_enchantment(0, plus);
        let mut you = Combatant::player("you", 20)
            .with_weapon(weapon)
            .with_stats(Stats::new(strength, dexterity, 11))
            .with_skill(SkillId::LongSwords, skill);
        let mut target = orc(10_000, ac);

        let report = strike(
            &engine,
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, ORC),
            seed,
        );

        for outcome in &report.outcomes {
            prop_assert!(outcome.damage.final_damage >= 0);
            prop_assert!(outcome.total_damage >= 0);
        }
    }

    #[test]
    fn same_seed_same_report(seed in any::<u64>(), hp in 1i32..60) {
        let engine = CombatEngine::standard();
        let you = Combatant::player("you", 20)
            .with_weapon(Weapon::new("flaming sword", SkillId::LongSwords, 10, 14).with_brand(Brand::Flaming));
        let target = orc(hp, 3);
        let request = AttackRequest::melee(CombatantId::PLAYER, ORC);

        let (mut you_a, mut target_a) = (you.clone(), target.clone());
        let (mut you_b, mut target_b) = (you, target);
        let first = strike(&engine, &mut you_a, &mut target_a, request, seed);
        let second = strike(&engine, &mut you_b, &mut target_b, request, seed);

        prop_assert_eq!(first, second);
        prop_assert_eq!(target_a, target_b);
        prop_assert_eq!(you_a, you_b);
    }

    #[test]
    fn vampiric_healing_never_exceeds_max(seed in any::<u64>(), hp in 1i32..=20) {
        let engine = CombatEngine::standard();
        let mut you = Combatant::player("you", 20)
            .with_weapon(Weapon::new("vampiric sword", SkillId::LongSwords, 12, 14).with_brand(Brand::Vampiric));
        you.hp = hp;
        let mut target = orc(10_000, 0);

        strike(
            &engine,
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, ORC),
            seed,
        );

        prop_assert!(you.hp <= you.max_hp);
    }
}
