//! Attack sequencing.
//!
//! One [`AttackRequest`] runs every eligible slot of the attacker in a fixed
//! order: the main weapon or natural attacks first, then the player's
//! auxiliary body attacks. Each landed slot runs damage, severing, brand and
//! reactive stages before the next slot starts, and the sequence stops the
//! moment the defender dies.

use tracing::debug;

use crate::config::CombatConfig;
use crate::env::{EffectSink, RngOracle};
use crate::error::CombatError;
use crate::model::{
    Behaviour, Brand, Combatant, CombatantFlags, CombatantId, CombatantRegistry, DamageType,
    Hands, SkillId, SkillSet, Transformation, UNARMED_STR_WEIGHT, Weapon,
};

use super::apply::apply_effect;
use super::brand::{BrandContext, BrandTable, resolve_brand};
use super::damage::{DamageInputs, roll_monster_damage, roll_player_damage};
use super::hit::{
    AccuracyInputs, AccuracySource, check_hit, fights_well_unarmed, heavy_armour_penalty,
    player_str_weight,
};
use super::outcome::{
    AppliedEffect, AttackOutcome, AttackReport, DamageRoll, Fatality, HitCheck, HitVerdict,
    Termination,
};
use super::sever::try_sever;
use super::special::{ReactiveContext, SpecialAttackTable, resolve_reactive};
use super::speed::{SpeedAdjustment, monster_weapon_energy, player_speed};
use super::stab::{StabTier, detect_stab, stagger_amount};

// ============================================================================
// Requests
// ============================================================================

/// Terrain facts the caller knows about the two combatants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Environment {
    pub attacker_in_shallow_water: bool,
    pub defender_in_shallow_water: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackMode {
    #[default]
    Melee,
    /// One shot from the wielded launcher with the quivered ammunition.
    Missile,
}

/// An already-decided attack between two registered combatants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequest {
    pub attacker: CombatantId,
    pub defender: CombatantId,
    pub mode: AttackMode,
    /// Let a player follow up with kicks, headbutts and the like.
    pub auxiliary: bool,
    /// Resolve only this slot instead of the whole sequence.
    pub slot: Option<usize>,
}

impl AttackRequest {
    pub fn melee(attacker: CombatantId, defender: CombatantId) -> Self {
        Self {
            attacker,
            defender,
            mode: AttackMode::Melee,
            auxiliary: true,
            slot: None,
        }
    }

    pub fn missile(attacker: CombatantId, defender: CombatantId) -> Self {
        Self {
            mode: AttackMode::Missile,
            auxiliary: false,
            ..Self::melee(attacker, defender)
        }
    }

    #[must_use]
    pub fn without_auxiliary(mut self) -> Self {
        self.auxiliary = false;
        self
    }

    #[must_use]
    pub fn only_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// Player body attacks tried after the main blow, in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AuxAttack {
    Kick,
    Headbutt,
    TailSlap,
    Punch,
}

impl AuxAttack {
    pub const ORDER: [Self; 4] = [Self::Kick, Self::Headbutt, Self::TailSlap, Self::Punch];
}

// ============================================================================
// Engine
// ============================================================================

/// Configured combat pipeline.
///
/// Holds only immutable tables; all per-attack state lives in the borrowed
/// combatants and the report.
#[derive(Clone, Debug, Default)]
pub struct CombatEngine {
    config: CombatConfig,
    brands: BrandTable,
    specials: SpecialAttackTable,
}

impl CombatEngine {
    pub fn new(config: CombatConfig, brands: BrandTable, specials: SpecialAttackTable) -> Self {
        Self {
            config,
            brands,
            specials,
        }
    }

    /// Default config with the built-in brand and species tables.
    pub fn standard() -> Self {
        Self::new(
            CombatConfig::default(),
            BrandTable::standard(),
            SpecialAttackTable::standard(),
        )
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn brands(&self) -> &BrandTable {
        &self.brands
    }

    pub fn specials(&self) -> &SpecialAttackTable {
        &self.specials
    }

    /// Resolves `request` between two combatants owned by `registry`.
    pub fn resolve(
        &self,
        registry: &mut CombatantRegistry,
        request: &AttackRequest,
        env: Environment,
        sink: &mut impl EffectSink,
        rng: &mut impl RngOracle,
    ) -> Result<AttackReport, CombatError> {
        let (attacker, defender) = registry.pair_mut(request.attacker, request.defender)?;
        self.resolve_pair(attacker, defender, request, env, sink, rng)
    }

    /// Resolves `request` against combatants the caller already borrowed.
    pub fn resolve_pair(
        &self,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        request: &AttackRequest,
        env: Environment,
        sink: &mut impl EffectSink,
        rng: &mut impl RngOracle,
    ) -> Result<AttackReport, CombatError> {
        if attacker.id != request.attacker {
            return Err(CombatError::CombatantNotFound(request.attacker));
        }
        if defender.id != request.defender {
            return Err(CombatError::CombatantNotFound(request.defender));
        }
        if attacker.id == defender.id {
            return Err(CombatError::SelfTarget(attacker.id));
        }
        if !defender.is_alive() {
            return Err(CombatError::DefenderAlreadyDead(defender.id));
        }

        let mut pass = Pass {
            engine: self,
            attacker,
            defender,
            sink,
            rng,
            outcomes: Vec::new(),
            exercised: SkillSet::empty(),
            termination: Termination::SlotsExhausted,
        };

        let speed = match request.mode {
            AttackMode::Melee if pass.attacker.is_player() => pass.player_melee(request, env)?,
            AttackMode::Melee => pass.monster_melee(request, env)?,
            AttackMode::Missile => pass.missile(request)?,
        };

        debug!(
            attacker = %request.attacker,
            defender = %request.defender,
            slots = pass.outcomes.len(),
            termination = ?pass.termination,
            "attack resolved"
        );

        Ok(AttackReport {
            attacker: request.attacker,
            defender: request.defender,
            outcomes: pass.outcomes,
            exercised: pass.exercised,
            speed,
            termination: pass.termination,
        })
    }
}

// ============================================================================
// Slot helpers
// ============================================================================

/// Per-slot facts the shared landing stages need.
struct Strike {
    slot: usize,
    /// Natural-attack index for reactive rows; hydra heads all use 0.
    data_slot: usize,
    name: String,
    damage_type: DamageType,
    brand: Brand,
    weapon_skill: i32,
    stab: StabTier,
    /// Skills exercised when the slot deals damage.
    trains: &'static [SkillId],
    /// Skill of the weapon or body part, trained alongside `trains`.
    skill: Option<SkillId>,
}

/// Neither slips nor splashes in shallow water.
fn wades(combatant: &Combatant) -> bool {
    combatant.has_flag(CombatantFlags::FLIES) || combatant.has_flag(CombatantFlags::AMPHIBIOUS)
}

fn unarmed_name(attacker: &Combatant) -> String {
    match attacker.transformation {
        Transformation::None | Transformation::Lich if attacker.body.claws > 0 => "claws".into(),
        Transformation::None | Transformation::Lich => "fists".into(),
        Transformation::BladeHands => "blade hands".into(),
        form => form.to_string().replace('_', " "),
    }
}

fn unarmed_damage_type(attacker: &Combatant) -> DamageType {
    if attacker.transformation == Transformation::BladeHands || attacker.body.claws > 0 {
        DamageType::Slicing
    } else {
        DamageType::Crushing
    }
}

/// Wakes a monster defender and points it at the attacker.
fn alert(defender: &mut Combatant, attacker: CombatantId) {
    if defender.is_player() {
        return;
    }
    if defender.behaviour == Behaviour::Sleeping || defender.behaviour == Behaviour::Idle {
        defender.behaviour = Behaviour::Hunting;
    }
    if defender.foe.is_none() {
        defender.foe = Some(attacker);
    }
}

// ============================================================================
// One resolution
// ============================================================================

struct Pass<'a, S, R> {
    engine: &'a CombatEngine,
    attacker: &'a mut Combatant,
    defender: &'a mut Combatant,
    sink: &'a mut S,
    rng: &'a mut R,
    outcomes: Vec<AttackOutcome>,
    exercised: SkillSet,
    termination: Termination,
}

impl<S: EffectSink, R: RngOracle> Pass<'_, S, R> {
    fn water_attack(&self, env: Environment) -> bool {
        self.attacker.has_flag(CombatantFlags::AMPHIBIOUS)
            && env.defender_in_shallow_water
            && !self.defender.has_flag(CombatantFlags::FLIES)
    }

    fn fumble(&mut self, attack_name: String) {
        debug!(attacker = %self.attacker.id, "fumbled in shallow water");
        self.outcomes.push(AttackOutcome {
            attack_name,
            check: HitCheck::fumbled(),
            ..AttackOutcome::default()
        });
    }

    fn single_slot(&self, request: &AttackRequest, available: usize) -> Result<(), CombatError> {
        match request.slot {
            Some(slot) if slot >= available => Err(CombatError::SlotOutOfRange {
                attacker: self.attacker.id,
                slot,
                available,
            }),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Player melee
    // ------------------------------------------------------------------------

    fn player_melee(
        &mut self,
        request: &AttackRequest,
        env: Environment,
    ) -> Result<SpeedAdjustment, CombatError> {
        self.single_slot(request, 1)?;
        let engine = self.engine;
        let config = &engine.config;

        // Launchers make poor clubs; they fight as bare hands.
        let weapon = self.attacker.weapon.clone().filter(|w| !w.is_launcher());
        let name = weapon
            .as_ref()
            .map_or_else(|| unarmed_name(self.attacker), |w| w.name.clone());

        if env.attacker_in_shallow_water
            && !wades(self.attacker)
            && (self.rng.roll_uniform(self.attacker.stats.dexterity) < 4 || self.rng.one_in(5))
        {
            self.fumble(name);
            return Ok(SpeedAdjustment::NORMAL);
        }

        let heavy = heavy_armour_penalty(self.attacker, self.rng);
        let unarmed_ok = fights_well_unarmed(self.attacker, heavy, self.rng);
        let hand_half = request.auxiliary
            && !unarmed_ok
            && self.attacker.shield.is_none()
            && weapon.as_ref().is_some_and(|w| w.hands == Hands::HandAndAHalf);
        let water_attack = self.water_attack(env);

        let stab = if self.defender.is_player() {
            StabTier::None
        } else {
            detect_stab(self.attacker, self.defender, &config.stab, self.rng)
        };

        let mut accuracy = AccuracyInputs::new(AccuracySource::Player, weapon.as_ref());
        accuracy.water_attack = water_attack;
        accuracy.hand_half = hand_half;
        accuracy.heavy_armour = heavy;
        let check = check_hit(self.attacker, self.defender, &accuracy, &config.hit, self.rng);

        let damage = if check.landed() {
            let str_weight = player_str_weight(self.attacker, weapon.as_ref());
            let mut inputs =
                DamageInputs::main_hand(self.attacker, weapon.as_ref(), str_weight, config.damage.main);
            inputs.water_attack = water_attack;
            inputs.hand_half = hand_half;
            inputs.stab = stab;
            roll_player_damage(self.attacker, self.defender, &inputs, &config.damage, self.rng)
        } else {
            DamageRoll::default()
        };

        let skill = weapon.as_ref().map_or(SkillId::UnarmedCombat, |w| w.skill);
        let strike = Strike {
            slot: 0,
            data_slot: 0,
            name,
            damage_type: weapon
                .as_ref()
                .map_or_else(|| unarmed_damage_type(self.attacker), |w| w.damage_type),
            brand: weapon.as_ref().map_or(Brand::None, |w| w.brand),
            weapon_skill: self.attacker.skill(skill),
            stab,
            trains: &[SkillId::Fighting],
            skill: Some(skill),
        };

        if self.land(strike, check, damage) && request.auxiliary && request.slot.is_none() {
            self.auxiliary(weapon.as_ref(), unarmed_ok);
        }

        let hasted = weapon.as_ref().is_some_and(|w| engine.brands.hastes(w.brand));
        Ok(player_speed(
            self.attacker,
            weapon.as_ref(),
            hand_half,
            hasted,
            heavy,
            &config.speed,
            self.rng,
        ))
    }

    /// Picks the body attack the player leads with when fighting well
    /// bare-handed. Later picks override earlier ones.
    fn lead_attack(&mut self) -> AuxAttack {
        let body = self.attacker.body;
        let mut lead = if self.rng.coin_flip() {
            AuxAttack::Headbutt
        } else {
            AuxAttack::Kick
        };
        let tailed = body.tail
            || body.stinger > 0
            || self.attacker.transformation == Transformation::Dragon;
        if tailed && self.rng.one_in(3) {
            lead = AuxAttack::TailSlap;
        }
        if self.rng.coin_flip() {
            lead = AuxAttack::Punch;
        }
        lead
    }

    /// Eligibility and base damage of one body attack.
    ///
    /// Attacks other than the lead still happen now and then for bodies
    /// built for them (hooves, horns, a tail).
    fn aux_strike(
        &mut self,
        aux: AuxAttack,
        lead: Option<AuxAttack>,
        two_handed: bool,
    ) -> Option<(String, i32, Brand)> {
        let body = self.attacker.body;
        let form = self.attacker.transformation;
        let leads = lead == Some(aux);

        match aux {
            AuxAttack::Kick => {
                if !leads && (!body.hooves || self.rng.coin_flip()) {
                    return None;
                }
                if form.blocks_limb_attacks() {
                    return None;
                }
                Some(("kick".into(), if body.hooves { 10 } else { 5 }, Brand::None))
            }
            AuxAttack::Headbutt => {
                if !leads && ((body.horns == 0 && !body.beak) || !self.rng.one_in(3)) {
                    return None;
                }
                if form.blocks_limb_attacks() {
                    return None;
                }
                let name = if body.beak { "peck" } else { "headbutt" };
                Some((name.into(), 5 + i32::from(body.horns) * 3, Brand::None))
            }
            AuxAttack::TailSlap => {
                if !leads && ((!body.tail && body.stinger == 0) || !self.rng.one_in(4)) {
                    return None;
                }
                if matches!(form, Transformation::Spider | Transformation::IceBeast) {
                    return None;
                }
                if body.stinger > 0 {
                    let base = 6 + i32::from(body.stinger) * 2 - 1;
                    Some(("tail-slap".into(), base, Brand::Venom))
                } else {
                    Some(("tail-slap".into(), 6, Brand::None))
                }
            }
            AuxAttack::Punch => {
                if !leads || form.blocks_limb_attacks() {
                    return None;
                }
                if self.attacker.shield.is_some() || self.rng.coin_flip() || two_handed {
                    return None;
                }
                let base = 5 + self.attacker.skill(SkillId::UnarmedCombat) / 3;
                if form == Transformation::BladeHands {
                    Some(("slash".into(), base + 6, Brand::None))
                } else {
                    Some(("punch".into(), base, Brand::None))
                }
            }
        }
    }

    /// Runs the auxiliary slots until one ends the sequence.
    fn auxiliary(&mut self, weapon: Option<&Weapon>, unarmed_ok: bool) {
        let engine = self.engine;
        let config = &engine.config;
        let lead = unarmed_ok.then(|| self.lead_attack());
        let two_handed = weapon.is_some_and(|w| w.hands == Hands::Two);

        for (index, aux) in AuxAttack::ORDER.into_iter().enumerate() {
            let Some((name, base, brand)) = self.aux_strike(aux, lead, two_handed) else {
                continue;
            };

            let accuracy = AccuracyInputs::new(AccuracySource::Auxiliary, None);
            let check = check_hit(self.attacker, self.defender, &accuracy, &config.hit, self.rng);
            let damage = if check.landed() {
                let inputs =
                    DamageInputs::auxiliary(base, UNARMED_STR_WEIGHT, config.damage.auxiliary);
                roll_player_damage(self.attacker, self.defender, &inputs, &config.damage, self.rng)
            } else {
                DamageRoll::default()
            };

            let strike = Strike {
                slot: index + 1,
                data_slot: index + 1,
                name,
                damage_type: DamageType::Crushing,
                brand,
                weapon_skill: 0,
                stab: StabTier::None,
                trains: &[SkillId::Fighting],
                skill: Some(SkillId::UnarmedCombat),
            };
            if !self.land(strike, check, damage) {
                return;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Monster melee
    // ------------------------------------------------------------------------

    fn monster_melee(
        &mut self,
        request: &AttackRequest,
        env: Environment,
    ) -> Result<SpeedAdjustment, CombatError> {
        let engine = self.engine;
        let config = &engine.config;

        // Hydras bite once per head with their first attack.
        let slots: Vec<(usize, i32)> = match self.attacker.parts {
            Some(heads) => match self.attacker.attacks.get(0) {
                Some(bite) => (0..usize::from(heads)).map(|_| (0, bite)).collect(),
                None => Vec::new(),
            },
            None => self.attacker.attacks.iter().enumerate().collect(),
        };
        self.single_slot(request, slots.len())?;
        let headed = self.attacker.parts.is_some();

        if env.attacker_in_shallow_water && !wades(self.attacker) && self.rng.one_in(4) {
            self.fumble(String::from("splash"));
            return Ok(SpeedAdjustment::NORMAL);
        }

        let water_attack = self.water_attack(env);
        let mut stab = if self.defender.is_player() {
            StabTier::None
        } else {
            detect_stab(self.attacker, self.defender, &config.stab, self.rng)
        };

        let mut energy = 0;
        let mut weapon_blows = 0;

        for (index, (data_slot, natural)) in slots.into_iter().enumerate() {
            if request.slot.is_some_and(|only| only != index) {
                continue;
            }

            let weapon = if headed {
                None
            } else {
                self.attacker
                    .weapon_for_slot(data_slot)
                    .filter(|w| !w.is_launcher())
                    .cloned()
            };

            let mut accuracy = AccuracyInputs::new(AccuracySource::Monster, weapon.as_ref());
            accuracy.water_attack = water_attack;
            let check = check_hit(self.attacker, self.defender, &accuracy, &config.hit, self.rng);

            let damage = if check.landed() {
                roll_monster_damage(
                    self.attacker,
                    self.defender,
                    natural,
                    weapon.as_ref(),
                    water_attack,
                    stab,
                    &config.damage,
                    self.rng,
                )
            } else {
                DamageRoll::default()
            };

            if let Some(weapon) = &weapon {
                let hasted = engine.brands.hastes(weapon.brand);
                energy += monster_weapon_energy(weapon, hasted, weapon_blows);
                weapon_blows += 1;
            }

            let name = match &weapon {
                Some(weapon) => weapon.name.clone(),
                None if headed => String::from("bite"),
                None => String::from("hit"),
            };
            let strike = Strike {
                slot: index,
                data_slot,
                name,
                damage_type: weapon.as_ref().map_or(DamageType::Crushing, |w| w.damage_type),
                brand: weapon.as_ref().map_or(Brand::None, |w| w.brand),
                weapon_skill: 0,
                stab: if check.landed() { stab } else { StabTier::None },
                trains: &[],
                skill: None,
            };
            // Only the opening blow can catch the defender off guard.
            if check.landed() {
                stab = StabTier::None;
            }

            if !self.land(strike, check, damage) {
                break;
            }
        }

        Ok(SpeedAdjustment {
            energy_delta: energy,
            ..SpeedAdjustment::NORMAL
        })
    }

    // ------------------------------------------------------------------------
    // Missiles
    // ------------------------------------------------------------------------

    fn missile(&mut self, request: &AttackRequest) -> Result<SpeedAdjustment, CombatError> {
        let engine = self.engine;
        let config = &engine.config;
        let id = self.attacker.id;

        let launcher = self
            .attacker
            .weapon
            .clone()
            .filter(Weapon::is_launcher)
            .ok_or(CombatError::MissingWeapon(id, "missile"))?;
        let ammo = self
            .attacker
            .ammo
            .clone()
            .ok_or(CombatError::MissingWeapon(id, "missile"))?;
        self.single_slot(request, 1)?;

        // The shot hits with the ammunition's die and the launcher's skill.
        let mut shot = launcher.clone();
        shot.damage = ammo.damage;
        shot.to_dam += ammo.to_dam;
        shot.damage_type = ammo.damage_type;
        let brand = if ammo.brand == Brand::None {
            launcher.brand
        } else {
            ammo.brand
        };

        let player = self.attacker.is_player();
        let heavy = if player {
            heavy_armour_penalty(self.attacker, self.rng)
        } else {
            0
        };

        let source = if player {
            AccuracySource::Player
        } else {
            AccuracySource::Monster
        };
        let mut accuracy = AccuracyInputs::new(source, Some(&launcher));
        accuracy.bonus = ammo.to_hit + ammo.accuracy;
        accuracy.heavy_armour = heavy;
        let check = check_hit(self.attacker, self.defender, &accuracy, &config.hit, self.rng);

        let damage = match (check.landed(), player) {
            (false, _) => DamageRoll::default(),
            (true, true) => {
                let str_weight = player_str_weight(self.attacker, Some(&launcher));
                let inputs =
                    DamageInputs::main_hand(self.attacker, Some(&shot), str_weight, config.damage.main);
                roll_player_damage(self.attacker, self.defender, &inputs, &config.damage, self.rng)
            }
            (true, false) => roll_monster_damage(
                self.attacker,
                self.defender,
                shot.damage + shot.to_dam.max(0),
                None,
                false,
                StabTier::None,
                &config.damage,
                self.rng,
            ),
        };

        let strike = Strike {
            slot: 0,
            data_slot: 0,
            name: ammo.name.clone(),
            damage_type: shot.damage_type,
            brand,
            weapon_skill: self.attacker.skill(launcher.skill),
            stab: StabTier::None,
            trains: &[],
            skill: player.then_some(launcher.skill),
        };
        self.land(strike, check, damage);

        if !player {
            return Ok(SpeedAdjustment::NORMAL);
        }
        let hasted = engine.brands.hastes(launcher.brand);
        Ok(player_speed(
            self.attacker,
            Some(&launcher),
            false,
            hasted,
            heavy,
            &config.speed,
            self.rng,
        ))
    }

    // ------------------------------------------------------------------------
    // Landing
    // ------------------------------------------------------------------------

    /// Applies one checked slot and records its outcome.
    ///
    /// Returns false when the sequence must stop: the defender died or was
    /// removed, or the attacker destroyed itself.
    fn land(&mut self, strike: Strike, check: HitCheck, damage: DamageRoll) -> bool {
        let engine = self.engine;
        let config = &engine.config;

        let mut outcome = AttackOutcome {
            slot: strike.slot,
            cause: format!("{}'s {}", self.attacker.name, strike.name),
            attack_name: strike.name,
            hit: check.landed(),
            check,
            ..AttackOutcome::default()
        };

        if check.verdict == HitVerdict::Blocked {
            self.defender.shield_blocks += 1;
        }
        alert(self.defender, self.attacker.id);

        if !check.landed() {
            debug!(slot = outcome.slot, verdict = ?check.verdict, "slot missed");
            self.outcomes.push(outcome);
            return true;
        }

        let dealt = damage.final_damage;
        outcome.stab = strike.stab;
        outcome.damage = damage;
        self.defender.hp -= dealt;

        if strike.stab == StabTier::Sleeping
            && let Some(energy) = stagger_amount(self.attacker, &config.stab, self.rng)
        {
            let target = self.defender.id;
            outcome.effects.push(apply_effect(
                AppliedEffect::Staggered { target, energy },
                self.defender,
                self.sink,
            ));
        }

        let brand_effect = engine.brands.effect(strike.brand);

        let mut fatality = if let Some(cut) = try_sever(
            self.attacker,
            self.defender,
            strike.damage_type,
            brand_effect,
            dealt,
            &config.brand,
            self.sink,
            self.rng,
        ) {
            outcome.effects.extend(cut.effects);
            cut.fatality
        } else {
            let ctx = BrandContext {
                brand: strike.brand,
                dealt,
                weapon_skill: strike.weapon_skill,
            };
            let branded = resolve_brand(
                &ctx,
                &engine.brands,
                self.attacker,
                self.defender,
                &config.brand,
                self.sink,
                self.rng,
            );
            self.defender.hp -= branded.bonus_damage;
            outcome.brand_damage = branded.bonus_damage;
            outcome.effects.extend(branded.effects);
            branded.fatality
        };

        if fatality != Some(Fatality::InstantDefeat)
            && let Some(species) = self.attacker.species()
        {
            let ctx = ReactiveContext {
                species,
                slot: strike.data_slot,
                dealt,
            };
            let reactive = resolve_reactive(
                &ctx,
                &engine.specials,
                self.attacker,
                self.defender,
                &config.brand,
                self.sink,
                self.rng,
            );
            self.defender.hp -= reactive.bonus_damage;
            outcome.special_damage = reactive.bonus_damage;
            outcome.effects.extend(reactive.effects);
        }

        outcome.total_damage = dealt + outcome.brand_damage + outcome.special_damage;
        if fatality.is_none() && !self.defender.is_alive() {
            fatality = Some(Fatality::Slain);
        }
        outcome.fatality = fatality;

        if dealt > 0 {
            strike.trains.iter().for_each(|&s| self.exercised.insert(s));
            if let Some(skill) = strike.skill {
                self.exercised.insert(skill);
            }
            if strike.stab.is_stab() {
                self.exercised.insert(SkillId::Stabbing);
            }
        }

        debug!(
            slot = outcome.slot,
            dealt,
            brand = outcome.brand_damage,
            special = outcome.special_damage,
            hp = self.defender.hp,
            "slot landed"
        );
        self.outcomes.push(outcome);

        match fatality {
            Some(Fatality::InstantDefeat) => {
                self.termination = Termination::InstantDefeat;
                false
            }
            Some(_) => {
                self.termination = Termination::DefenderDied;
                false
            }
            None => self.attacker.is_alive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{RecordingEffects, ScriptedRng};
    use crate::model::{BodyTraits, NaturalAttack, Shield, SpeciesId};

    fn orc(hp: i32) -> Combatant {
        Combatant::monster(CombatantId(1), SpeciesId::from("orc"), "orc", hp)
            .with_foe(CombatantId::PLAYER)
            .with_behaviour(Behaviour::Hunting)
    }

    fn sword() -> Weapon {
        Weapon::new("long sword", SkillId::LongSwords, 10, 14)
    }

    fn run(
        attacker: &mut Combatant,
        defender: &mut Combatant,
        request: AttackRequest,
        env: Environment,
        rng: &mut ScriptedRng,
    ) -> Result<AttackReport, CombatError> {
        CombatEngine::standard().resolve_pair(
            attacker,
            defender,
            &request,
            env,
            &mut RecordingEffects::new(),
            rng,
        )
    }

    #[test]
    fn killing_blow_skips_auxiliary_slots() {
        let mut you = Combatant::player("you", 20)
            .with_weapon(sword())
            .with_flags(CombatantFlags::UNENCUMBERED)
            .with_skill(SkillId::UnarmedCombat, 27);
        you.body.hooves = true;
        let mut target = orc(1);

        let report = run(
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, CombatantId(1)),
            Environment::default(),
            &mut ScriptedRng::always_max(),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.termination, Termination::DefenderDied);
        assert_eq!(report.outcomes[0].fatality, Some(Fatality::Slain));
        assert!(report.exercised.contains(SkillId::LongSwords));
        assert!(report.exercised.contains(SkillId::Fighting));
    }

    #[test]
    fn hooved_brawler_follows_up_with_a_kick() {
        let mut you = Combatant::player("you", 20)
            .with_flags(CombatantFlags::UNENCUMBERED)
            .with_skill(SkillId::UnarmedCombat, 20);
        you.body = BodyTraits {
            hooves: true,
            ..BodyTraits::default()
        };
        let mut target = orc(1000);

        let report = run(
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, CombatantId(1)),
            Environment::default(),
            &mut ScriptedRng::always_max(),
        )
        .unwrap();

        let names: Vec<_> = report.outcomes.iter().map(|o| o.attack_name.as_str()).collect();
        assert_eq!(names, ["fists", "kick"]);
        assert_eq!(report.outcomes[1].slot, 1);
        assert!(report.any_hit());
        assert_eq!(target.hp, 1000 - report.total_damage());
        assert!(report.exercised.contains(SkillId::UnarmedCombat));
    }

    #[test]
    fn hydra_stops_biting_a_dead_player() {
        let mut hydra = Combatant::monster(CombatantId(7), SpeciesId::from("hydra"), "hydra", 40);
        hydra.parts = Some(3);
        hydra.attacks = NaturalAttack::new([10, 0, 0, 0]);
        let mut you = Combatant::player("you", 5);

        let report = run(
            &mut hydra,
            &mut you,
            AttackRequest::melee(CombatantId(7), CombatantId::PLAYER),
            Environment::default(),
            &mut ScriptedRng::always_max(),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].attack_name, "bite");
        assert_eq!(report.outcomes[0].total_damage, 10);
        assert!(report.defender_died());
        assert_eq!(you.hp, -5);
    }

    #[test]
    fn unsteady_footing_fumbles_the_attack() {
        let mut you = Combatant::player("you", 20).with_weapon(sword());
        let mut target = orc(10);
        let env = Environment {
            attacker_in_shallow_water: true,
            ..Environment::default()
        };

        let report = run(
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, CombatantId(1)),
            env,
            &mut ScriptedRng::always_min(),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].check.verdict, HitVerdict::Fumbled);
        assert_eq!(target.hp, 10);
    }

    #[test]
    fn block_counts_against_the_next_one() {
        let mut ogre = Combatant::monster(CombatantId(4), SpeciesId::from("ogre"), "ogre", 30);
        ogre.attacks = NaturalAttack::new([12, 0, 0, 0]);
        let mut you = Combatant::player("you", 20);
        you.shield = Some(Shield::Large);

        // Block roll 0 against 6 + 10 / 4 - 1.
        let report = run(
            &mut ogre,
            &mut you,
            AttackRequest::melee(CombatantId(4), CombatantId::PLAYER),
            Environment::default(),
            &mut ScriptedRng::new([0, 6, 10]),
        )
        .unwrap();

        assert_eq!(report.outcomes[0].check.verdict, HitVerdict::Blocked);
        assert!(!report.any_hit());
        assert_eq!(you.shield_blocks, 1);
        assert_eq!(you.hp, 20);
    }

    #[test]
    fn only_first_weapon_blow_counts_fully() {
        let mut ettin = Combatant::monster(CombatantId(3), SpeciesId::from("ettin"), "ettin", 60)
            .with_weapon(Weapon::new("club", SkillId::MacesFlails, 5, 12))
            .with_flags(CombatantFlags::TWO_WEAPONS);
        ettin.offhand = Some(Weapon::new("flail", SkillId::MacesFlails, 9, 14));
        ettin.attacks = NaturalAttack::new([12, 12, 0, 0]);
        let mut you = Combatant::player("you", 1000);

        let report = run(
            &mut ettin,
            &mut you,
            AttackRequest::melee(CombatantId(3), CombatantId::PLAYER),
            Environment::default(),
            &mut ScriptedRng::always_min(),
        )
        .unwrap();

        let names: Vec<_> = report.outcomes.iter().map(|o| o.attack_name.as_str()).collect();
        assert_eq!(names, ["club", "flail"]);
        assert_eq!(report.speed.energy_delta, -1);
        assert_eq!(report.speed.recovery_tenths, 10);
    }

    #[test]
    fn contract_breaches_are_errors() {
        let mut you = Combatant::player("you", 20).with_weapon(sword());
        let mut target = orc(10);
        let mut rng = ScriptedRng::always_min();

        let err = run(
            &mut you,
            &mut target,
            AttackRequest::missile(CombatantId::PLAYER, CombatantId(1)),
            Environment::default(),
            &mut rng,
        );
        assert_eq!(err, Err(CombatError::MissingWeapon(CombatantId::PLAYER, "missile")));

        let err = run(
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, CombatantId(1)).only_slot(2),
            Environment::default(),
            &mut rng,
        );
        assert!(matches!(err, Err(CombatError::SlotOutOfRange { slot: 2, .. })));

        target.hp = 0;
        let err = run(
            &mut you,
            &mut target,
            AttackRequest::melee(CombatantId::PLAYER, CombatantId(1)),
            Environment::default(),
            &mut rng,
        );
        assert_eq!(err, Err(CombatError::DefenderAlreadyDead(CombatantId(1))));
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn registry_rejects_self_attack() {
        let mut registry = CombatantRegistry::new();
        registry.insert(Combatant::player("you", 20));

        let err = CombatEngine::standard().resolve(
            &mut registry,
            &AttackRequest::melee(CombatantId::PLAYER, CombatantId::PLAYER),
            Environment::default(),
            &mut RecordingEffects::new(),
            &mut ScriptedRng::always_min(),
        );
        assert_eq!(err, Err(CombatError::SelfTarget(CombatantId::PLAYER)));
    }

    #[test]
    fn missile_uses_ammo_brand() {
        let mut you = Combatant::player("you", 20)
            .with_weapon(
                Weapon::new("bow", SkillId::Bows, 2, 12).with_traits(crate::model::WeaponTraits::LAUNCHER),
            );
        you.ammo = Some(
            Weapon::new("arrow", SkillId::Bows, 6, 0)
                .with_brand(Brand::Flaming)
                .with_damage_type(DamageType::Piercing),
        );
        let mut target = orc(500);

        let report = run(
            &mut you,
            &mut target,
            AttackRequest::missile(CombatantId::PLAYER, CombatantId(1)),
            Environment::default(),
            &mut ScriptedRng::always_max(),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        let shot = &report.outcomes[0];
        assert_eq!(shot.attack_name, "arrow");
        assert!(shot.hit);
        assert!(shot.brand_damage > 0);
        assert!(report.exercised.contains(SkillId::Bows));
        assert!(!report.exercised.contains(SkillId::Fighting));
    }
}
