//! Round-by-round duel between the player and one monster.

use std::fmt;

use anyhow::{Context, Result};
use combat_content::ContentFactory;
use combat_core::env::{PcgRng, RecordingEffects, compute_seed};
use combat_core::model::{Behaviour, SkillSet, Stats};
use combat_core::{
    AttackReport, AttackRequest, CombatEngine, Combatant, CombatantFlags, CombatantId,
    CombatantRegistry, Environment, Names, Termination, narrate,
};
use tracing::{debug, info};

use crate::config::{DuelArgs, DuelConfig};
use crate::messages::TracingMessages;

const MONSTER: CombatantId = CombatantId(1);

/// Running totals for one side.
#[derive(Clone, Debug, Default)]
struct Tally {
    actions: u32,
    hits: u32,
    damage: i32,
    /// Sum of recovery tenths over the player's actions.
    recovery: i32,
    exercised: SkillSet,
}

impl Tally {
    fn record(&mut self, report: &AttackReport) {
        self.actions += 1;
        self.hits += report.outcomes.iter().filter(|o| o.hit).count() as u32;
        self.damage += report.total_damage();
        self.recovery += report.speed.recovery_tenths;
        for skill in report.exercised.iter() {
            self.exercised.insert(skill);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Victor {
    Player,
    Monster,
    Nobody,
}

/// What happened over the whole duel.
#[derive(Debug)]
pub struct Summary {
    seed: u64,
    monster: String,
    rounds: u32,
    victor: Victor,
    player: Tally,
    opponent: Tally,
    player_hp: i32,
    monster_hp: i32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.victor {
            Victor::Player => format!("you defeated the {}", self.monster),
            Victor::Monster => format!("the {} defeated you", self.monster),
            Victor::Nobody => String::from("nobody fell"),
        };
        writeln!(f, "seed {}: {} after {} rounds", self.seed, outcome, self.rounds)?;
        writeln!(
            f,
            "  you:   {} hits in {} actions, {} damage, {} hp left",
            self.player.hits, self.player.actions, self.player.damage, self.player_hp
        )?;
        writeln!(
            f,
            "  {}: {} hits in {} actions, {} damage, {} hp left",
            self.monster, self.opponent.hits, self.opponent.actions, self.opponent.damage, self.monster_hp
        )?;
        if self.player.actions > 0 {
            let average = self.player.recovery as f64 / f64::from(self.player.actions) / 10.0;
            writeln!(f, "  average recovery: {average:.1} turns")?;
        }
        let skills: Vec<String> = self.player.exercised.iter().map(|s| s.to_string()).collect();
        if !skills.is_empty() {
            write!(f, "  exercised: {}", skills.join(", "))?;
        }
        Ok(())
    }
}

/// A prepared duel.
pub struct Duel {
    engine: CombatEngine,
    registry: CombatantRegistry,
    environment: Environment,
    seed: u64,
    max_rounds: u32,
    monster: String,
    json: bool,
}

impl Duel {
    pub fn prepare(factory: &ContentFactory, args: &DuelArgs, config: &DuelConfig) -> Result<Self> {
        let catalog = factory.load_species()?;
        let engine = factory.build_engine(&catalog)?;

        let mut monster = catalog
            .spawn(&args.monster, MONSTER)
            .with_context(|| format!("unknown species '{}'", args.monster))?;
        monster.foe = Some(CombatantId::PLAYER);
        if args.sleeping {
            monster.behaviour = Behaviour::Sleeping;
        }

        let mut player = Combatant::player("you", args.hp)
            .with_stats(Stats::new(args.strength, args.dexterity, args.intelligence))
            .with_defences(args.ac, args.ev)
            .with_flags(CombatantFlags::UNENCUMBERED)
            .with_foe(MONSTER);
        for &(skill, level) in &args.skills {
            player = player.with_skill(skill, level);
        }
        if let Some(name) = &args.weapon {
            let weapons = factory.load_weapons()?;
            let mut weapon = weapons
                .find(name)
                .cloned()
                .with_context(|| format!("unknown weapon '{name}'"))?;
            if let Some(brand) = args.brand {
                weapon.brand = brand;
            }
            player = player.with_weapon(weapon);
        }

        let mut registry = CombatantRegistry::new();
        registry.insert(player);
        let monster_name = monster.name.clone();
        registry.insert(monster);

        Ok(Self {
            engine,
            registry,
            environment: Environment {
                attacker_in_shallow_water: args.water,
                defender_in_shallow_water: args.water,
            },
            seed: config.seed.unwrap_or_else(rand::random),
            max_rounds: config.max_rounds,
            monster: monster_name,
            json: args.json,
        })
    }

    /// Both sides start a round rested: blocks are forgotten and energy
    /// spent on the previous round is restored.
    fn begin_round(&mut self) {
        for id in [CombatantId::PLAYER, MONSTER] {
            if let Some(combatant) = self.registry.get_mut(id) {
                combatant.shield_blocks = 0;
                combatant.energy = Combatant::DEFAULT_ENERGY;
            }
        }
    }

    fn strike(&mut self, round: u32, attacker: CombatantId, defender: CombatantId) -> Result<AttackReport> {
        let mut rng = PcgRng::seeded(compute_seed(self.seed, u64::from(round), attacker.0, 0));
        let report = self.engine.resolve(
            &mut self.registry,
            &AttackRequest::melee(attacker, defender),
            self.environment,
            &mut RecordingEffects::new(),
            &mut rng,
        )?;

        if let (Some(a), Some(d)) = (self.registry.get(attacker), self.registry.get(defender)) {
            narrate(&report, &Names::of(a, d), &mut TracingMessages::default());
        }
        if let Some(monster) = self.registry.get_mut(attacker)
            && !monster.is_player()
        {
            monster.energy += report.speed.energy_delta;
        }

        if self.json {
            println!("{}", serde_json::to_string(&report)?);
        }
        debug!(round, %attacker, damage = report.total_damage(), "action finished");
        Ok(report)
    }

    fn alive(&self, id: CombatantId) -> bool {
        self.registry.get(id).is_some_and(Combatant::is_alive)
    }

    /// Who won, once somebody has. An instant defeat removes the defender
    /// with hit points to spare.
    fn decided(&self, report: &AttackReport) -> Option<Victor> {
        let side = |id: CombatantId| {
            if id == CombatantId::PLAYER { Victor::Player } else { Victor::Monster }
        };
        if report.termination == Termination::InstantDefeat {
            return Some(side(report.attacker));
        }
        match (self.alive(CombatantId::PLAYER), self.alive(MONSTER)) {
            (true, true) => None,
            (true, false) => Some(Victor::Player),
            (false, true) => Some(Victor::Monster),
            (false, false) => Some(Victor::Nobody),
        }
    }

    pub fn run(mut self) -> Result<Summary> {
        info!(seed = self.seed, monster = %self.monster, "duel begins");

        let mut player = Tally::default();
        let mut opponent = Tally::default();
        let mut rounds = 0;
        let mut victor = None;

        while rounds < self.max_rounds && victor.is_none() {
            rounds += 1;
            self.begin_round();

            let report = self.strike(rounds, CombatantId::PLAYER, MONSTER)?;
            player.record(&report);
            victor = self.decided(&report);
            if victor.is_some() {
                break;
            }

            let report = self.strike(rounds, MONSTER, CombatantId::PLAYER)?;
            opponent.record(&report);
            victor = self.decided(&report);
        }

        let hp = |id| self.registry.get(id).map_or(0, |c: &Combatant| c.hp);
        let victor = victor.unwrap_or(Victor::Nobody);

        Ok(Summary {
            seed: self.seed,
            monster: self.monster.clone(),
            rounds,
            victor,
            player,
            opponent,
            player_hp: hp(CombatantId::PLAYER),
            monster_hp: hp(MONSTER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use combat_core::StabTier;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        duel: DuelArgs,
    }

    fn duel(argv: &[&str]) -> Summary {
        let args = Harness::parse_from(std::iter::once("duel").chain(argv.iter().copied())).duel;
        let config = DuelConfig::default().with_args(&args);
        let factory = ContentFactory::new(&config.data_dir);
        Duel::prepare(&factory, &args, &config).unwrap().run().unwrap()
    }

    #[test]
    fn fixed_seed_replays_identically() {
        let argv = ["--monster", "goblin", "--weapon", "long sword", "--seed", "42"];
        assert_eq!(duel(&argv).to_string(), duel(&argv).to_string());
    }

    #[test]
    fn duel_ends_within_the_round_limit() {
        let summary = duel(&["--monster", "rat", "--seed", "3", "--rounds", "5", "--hp", "200"]);
        assert!(summary.rounds <= 5);
        assert!(summary.player.actions >= summary.opponent.actions);
        assert!(summary.player_hp <= 200);
    }

    fn prepared(argv: &[&str]) -> Duel {
        let args = Harness::parse_from(std::iter::once("duel").chain(argv.iter().copied())).duel;
        let config = DuelConfig::default().with_args(&args);
        let factory = ContentFactory::new(&config.data_dir);
        Duel::prepare(&factory, &args, &config).unwrap()
    }

    #[test]
    fn monster_energy_is_restored_each_round() {
        let mut duel = prepared(&["--monster", "orc_warrior", "--seed", "11", "--hp", "100000", "--ac", "50"]);

        for round in 1..=12 {
            duel.registry.get_mut(CombatantId::PLAYER).unwrap().shield_blocks = 3;
            duel.begin_round();
            assert_eq!(duel.registry.get(CombatantId::PLAYER).unwrap().shield_blocks, 0);

            let report = duel.strike(round, MONSTER, CombatantId::PLAYER).unwrap();
            let monster = duel.registry.get(MONSTER).unwrap();
            assert_eq!(monster.energy, Combatant::DEFAULT_ENERGY + report.speed.energy_delta);
        }
    }

    #[test]
    fn sleeping_monster_takes_a_sleeping_stab() {
        let mut landed = 0;
        for seed in 0..20 {
            let seed = seed.to_string();
            let mut duel = prepared(&["--monster", "goblin", "--sleeping", "--seed", seed.as_str()]);
            duel.begin_round();
            let report = duel.strike(1, CombatantId::PLAYER, MONSTER).unwrap();

            let opening = &report.outcomes[0];
            if opening.hit {
                assert_eq!(opening.stab, StabTier::Sleeping);
                landed += 1;
            }
        }
        assert!(landed > 0);
    }

    #[test]
    fn unknown_species_is_an_error() {
        let args = Harness::parse_from(["duel", "--monster", "dragon_king"]).duel;
        let config = DuelConfig::default().with_args(&args);
        let factory = ContentFactory::new(&config.data_dir);
        let err = Duel::prepare(&factory, &args, &config).err().unwrap();
        assert!(err.to_string().contains("dragon_king"));
    }
}
