use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("population_size must be at least 1")]
    EmptyPopulation,
    #[error("generation_duration must be positive and finite, got {0}")]
    InvalidDuration(f32),
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("max_health must be positive and finite, got {0}")]
    InvalidMaxHealth(f32),
    #[error("world must be at least 3 cells wide on every axis, got {width}x{height}x{depth}")]
    WorldTooSmall {
        width: usize,
        height: usize,
        depth: usize,
    },
}

/// Settings for the generational hill-climber
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Genomes per generation; index 0 drives the queen.
    pub population_size: usize,
    /// Length of one generation in simulated seconds.
    pub generation_duration: f32,
    /// Per-weight mutation probability when deriving children.
    pub mutation_rate: f32,
    /// Bound of the uniform perturbation applied to a mutated weight.
    pub mutation_strength: f32,
    /// Seed for the simulation RNG. `None` lets the driver pick one.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generation_duration: 60.0,
            mutation_rate: 0.1,
            mutation_strength: 0.5,
            seed: None,
        }
    }
}

/// Per-ant behaviour constants
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AntConfig {
    pub max_health: f32,
    /// Health lost per simulated second; doubled on acidic ground.
    pub health_decay_rate: f32,
    /// Seconds between two decisions of the same ant.
    pub action_interval: f32,
    /// Probability of replacing the network's choice with a random action.
    pub exploration_rate: f32,
    /// Health restored by eating one mulch block.
    pub mulch_health: f32,
    /// Upper bound on health handed over by a single share.
    pub share_amount: f32,
    /// A worker only shares while its health is above this.
    pub share_threshold: f32,
    /// Highest step up (in cells) a move may climb.
    pub climb_limit: i32,
    /// Ticks between the queen's periodic nest attempts. 0 disables them.
    pub queen_build_interval: u64,
    /// Random columns tried before giving up on spawning an ant.
    pub spawn_attempts: u32,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            health_decay_rate: 1.0,
            action_interval: 0.15,
            exploration_rate: 0.2,
            mulch_health: 30.0,
            share_amount: 10.0,
            share_threshold: 10.0,
            climb_limit: 2,
            queen_build_interval: 30,
            spawn_attempts: 100,
        }
    }
}

/// Shape of the flat demo world built by the server
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    /// Number of solid layers at the bottom of the world.
    pub ground_height: usize,
    /// Fraction of surface cells turned into mulch (e.g., 0.05 = 5%)
    pub mulch_density: f64,
    /// Fraction of surface cells turned acidic
    pub acidic_density: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 16,
            depth: 32,
            ground_height: 6,
            mulch_density: 0.08,
            acidic_density: 0.04,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub evolution: EvolutionConfig,
    pub ant: AntConfig,
    pub world: WorldConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let evo = &self.evolution;
        if evo.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(evo.generation_duration.is_finite() && evo.generation_duration > 0.0) {
            return Err(ConfigError::InvalidDuration(evo.generation_duration));
        }
        check_rate("mutation_rate", evo.mutation_rate)?;
        check_non_negative("mutation_strength", evo.mutation_strength)?;

        let ant = &self.ant;
        if !(ant.max_health.is_finite() && ant.max_health > 0.0) {
            return Err(ConfigError::InvalidMaxHealth(ant.max_health));
        }
        check_rate("exploration_rate", ant.exploration_rate)?;
        check_non_negative("health_decay_rate", ant.health_decay_rate)?;
        check_non_negative("action_interval", ant.action_interval)?;
        check_non_negative("mulch_health", ant.mulch_health)?;
        check_non_negative("share_amount", ant.share_amount)?;
        check_non_negative("share_threshold", ant.share_threshold)?;
        check_non_negative("climb_limit", ant.climb_limit as f32)?;

        let world = &self.world;
        if world.width < 3 || world.height < 3 || world.depth < 3 {
            return Err(ConfigError::WorldTooSmall {
                width: world.width,
                height: world.height,
                depth: world.depth,
            });
        }
        check_rate("mulch_density", world.mulch_density as f32)?;
        check_rate("acidic_density", world.acidic_density as f32)?;

        Ok(())
    }
}

fn check_rate(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_population() {
        let mut config = SimConfig::default();
        config.evolution.population_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));
    }

    #[test]
    fn test_rejects_bad_duration() {
        let mut config = SimConfig::default();
        config.evolution.generation_duration = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_rejects_mutation_rate_above_one() {
        let mut config = SimConfig::default();
        config.evolution.mutation_rate = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RateOutOfRange {
                name: "mutation_rate",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "evolution": { "population_size": 4, "seed": 9 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.evolution.population_size, 4);
        assert_eq!(config.evolution.seed, Some(9));
        assert_eq!(config.evolution.mutation_rate, 0.1);
        assert_eq!(config.ant, AntConfig::default());
    }
}
