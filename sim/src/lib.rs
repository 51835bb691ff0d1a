pub mod ant;
pub mod colony;
pub mod evolution;
pub mod occupancy;
pub mod world;

pub use ant::{Ant, AntId, Facing};
pub use colony::{Action, Colony};
pub use evolution::EvolutionLoop;
pub use occupancy::OccupancyIndex;
pub use world::{Axis, Block, BlockGrid, Cell, VoxelGrid};

use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{ConfigError, GenerationReport, SimConfig, WorldConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("world {width}x{height}x{depth} has no inner columns to stand on")]
    WorldTooSmall { width: i32, height: i32, depth: i32 },
}

/// Build the flat demo world described by `config`
pub fn build_world(config: &WorldConfig, seed: u64) -> BlockGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = BlockGrid::flat(
        config.width,
        config.height,
        config.depth,
        config.ground_height,
    );
    world.scatter_blocks(&mut rng, config.mulch_density, config.acidic_density);
    world
}

/// Run `generations` complete generations headless with a fixed timestep
pub fn run_generations(
    config: &SimConfig,
    generations: u32,
    dt: f32,
) -> Result<Vec<GenerationReport>, SimError> {
    let seed = config.evolution.seed.unwrap_or_default();
    let world = build_world(&config.world, seed);
    let mut evolution = EvolutionLoop::new(config, world)?;

    let mut reports = Vec::with_capacity(generations as usize);
    while reports.len() < generations as usize {
        if let Some(report) = evolution.step(dt) {
            reports.push(report);
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_runs() {
        let mut config = SimConfig::default();
        config.evolution.population_size = 8;
        config.evolution.generation_duration = 5.0;
        config.evolution.seed = Some(17);

        let reports = run_generations(&config, 3, 0.5).unwrap();

        assert_eq!(reports.len(), 3);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.generation, i as u32 + 1);
            assert_eq!(report.ants_spawned, 8);
        }
        assert!(reports.windows(2).all(|w| w[1].best_fitness >= w[0].best_fitness));
    }

    #[test]
    fn test_build_world_is_seeded() {
        let config = WorldConfig::default();
        let a = build_world(&config, 4);
        let b = build_world(&config, 4);

        for x in 0..config.width as i32 {
            for z in 0..config.depth as i32 {
                let y = config.ground_height as i32 - 1;
                assert_eq!(a.block(x, y, z), b.block(x, y, z));
            }
        }
    }

    #[test]
    fn test_run_rejects_bad_config() {
        let mut config = SimConfig::default();
        config.evolution.mutation_strength = -1.0;
        assert!(matches!(
            run_generations(&config, 1, 1.0),
            Err(SimError::Config(ConfigError::Negative { .. }))
        ));
    }
}
