use crate::ant::Facing;
use crate::colony::Colony;
use crate::world::{Axis, Block, Cell, VoxelGrid};
use crate::SimError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{BestGenome, Caste, EvolutionConfig, GenerationReport, Genome, SimConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generational hill-climber driving a colony on a voxel world.
///
/// Each generation spawns one ant per genome (index 0 is the queen), runs for
/// `generation_duration` simulated seconds, then scores the world by its nest
/// count. The best genome seen so far is kept unmutated at index 0 of the next
/// population and every other slot is a mutated copy of it.
pub struct EvolutionLoop<G: VoxelGrid> {
    config: EvolutionConfig,
    world: G,
    colony: Colony,
    population: Vec<Arc<Genome>>,
    best: Option<BestGenome>,
    generation: u32,
    time_remaining: f32,
    ants_spawned: usize,
    last_report: Option<GenerationReport>,
    rng: StdRng,
}

impl<G: VoxelGrid> EvolutionLoop<G> {
    /// Seed a random population and spawn the first generation
    pub fn new(config: &SimConfig, world: G) -> Result<Self, SimError> {
        config.validate()?;

        let (width, height, depth) = (
            world.dimension(Axis::X),
            world.dimension(Axis::Y),
            world.dimension(Axis::Z),
        );
        if width < 3 || height < 3 || depth < 3 {
            return Err(SimError::WorldTooSmall {
                width,
                height,
                depth,
            });
        }

        let mut rng = match config.evolution.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = (0..config.evolution.population_size)
            .map(|_| Arc::new(Genome::random(&mut rng)))
            .collect();

        let mut evolution = Self {
            config: config.evolution.clone(),
            world,
            colony: Colony::new(config.ant.clone()),
            population,
            best: None,
            generation: 1,
            time_remaining: config.evolution.generation_duration,
            ants_spawned: 0,
            last_report: None,
            rng,
        };
        evolution.start_generation();

        Ok(evolution)
    }

    /// Advance the colony by `dt` simulated seconds. Returns the report of the
    /// generation that ended during this step, if any.
    pub fn step(&mut self, dt: f32) -> Option<GenerationReport> {
        self.colony.tick(&mut self.world, dt, &mut self.rng);

        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            Some(self.end_generation())
        } else {
            None
        }
    }

    /// Score the running generation and start the next one
    pub fn end_generation(&mut self) -> GenerationReport {
        let fitness = self.world.nest_block_count();
        let improved = self.best.as_ref().map_or(true, |best| fitness > best.fitness);

        if improved {
            if let Some(first) = self.population.first() {
                self.best = Some(BestGenome {
                    fitness,
                    genome: Genome::clone(first),
                });
            }
        }

        let report = GenerationReport {
            generation: self.generation,
            fitness,
            best_fitness: self.best.as_ref().map_or(fitness, |best| best.fitness),
            improved,
            ants_spawned: self.ants_spawned,
            ants_alive: self.colony.live_count(),
            mulch_consumed: self.colony.mulch_consumed(),
        };
        info!(
            "Generation {} ended. Fitness: {} (best {}{}), {}/{} ants alive, {} mulch eaten",
            report.generation,
            report.fitness,
            report.best_fitness,
            if improved { ", improved" } else { "" },
            report.ants_alive,
            report.ants_spawned,
            report.mulch_consumed
        );

        self.population = self.next_population();

        self.colony.clear();
        self.world.reset();
        self.generation += 1;
        self.start_generation();

        self.last_report = Some(report.clone());
        report
    }

    /// Best genome unmutated, followed by mutated copies of it
    fn next_population(&mut self) -> Vec<Arc<Genome>> {
        let parent = match &self.best {
            Some(best) => best.genome.clone(),
            None => {
                warn!("No best genome recorded, seeding next generation from a random genome");
                Genome::random(&mut self.rng)
            }
        };

        let size = self.config.population_size;
        let mut population = Vec::with_capacity(size);
        population.push(Arc::new(parent.clone()));
        while population.len() < size {
            let child = parent.mutated(
                self.config.mutation_rate,
                self.config.mutation_strength,
                &mut self.rng,
            );
            population.push(Arc::new(child));
        }
        population
    }

    fn start_generation(&mut self) {
        self.time_remaining = self.config.generation_duration;
        self.ants_spawned = 0;

        let genomes = self.population.clone();
        for (index, genome) in genomes.into_iter().enumerate() {
            let caste = if index == 0 {
                Caste::Queen
            } else {
                Caste::Worker
            };

            match self.find_spawn_cell() {
                Some(cell) => {
                    let facing = Facing::from_index(self.rng.gen_range(0..4));
                    self.colony.spawn(caste, cell, facing, genome);
                    self.ants_spawned += 1;
                }
                None => warn!(
                    "Generation {}: no spawn position for {:?} {} after {} attempts",
                    self.generation,
                    caste,
                    index,
                    self.colony.config().spawn_attempts
                ),
            }
        }

        debug!(
            "Generation {} started with {}/{} ants",
            self.generation,
            self.ants_spawned,
            self.population.len()
        );
    }

    /// Random inner column with a standable surface; the ant takes the air cell above it
    fn find_spawn_cell(&mut self) -> Option<Cell> {
        let width = self.world.dimension(Axis::X);
        let height = self.world.dimension(Axis::Y);
        let depth = self.world.dimension(Axis::Z);
        if width < 3 || depth < 3 {
            return None;
        }

        for _ in 0..self.colony.config().spawn_attempts {
            let x = self.rng.gen_range(1..width - 1);
            let z = self.rng.gen_range(1..depth - 1);

            let surface = (0..=height - 2).rev().find(|&y| {
                let block = self.world.block(x, y, z);
                !block.is_air() && block != Block::Container
            });
            if let Some(y) = surface {
                return Some(Cell::new(x, y + 1, z));
            }
        }
        None
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn population(&self) -> &[Arc<Genome>] {
        &self.population
    }

    pub fn best(&self) -> Option<&BestGenome> {
        self.best.as_ref()
    }

    pub fn best_fitness(&self) -> Option<u32> {
        self.best.as_ref().map(|best| best.fitness)
    }

    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn world(&self) -> &G {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut G {
        &mut self.world
    }

    pub fn nest_blocks(&self) -> u32 {
        self.world.nest_block_count()
    }

    pub fn ants_on_acid(&self) -> usize {
        self.colony.ants_on_acid(&self.world)
    }
}
