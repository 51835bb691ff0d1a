use shared::{AntSnapshot, BestGenome, ColonyStats, GenerationReport, SimConfig};
use sim::{BlockGrid, EvolutionLoop, SimError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared handle to the running colony simulation
#[derive(Clone)]
pub struct ColonyHandle {
    inner: Arc<RwLock<ColonyInner>>,
}

struct ColonyInner {
    evolution: EvolutionLoop<BlockGrid>,

    /// Identifies this run in published stats
    run_id: Uuid,

    /// Server start time
    start_time: Instant,
}

impl ColonyHandle {
    /// Build the demo world and seed the first generation.
    /// A config without a seed gets a random one, logged so the run can be replayed.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let mut config = config.clone();
        let seed = *config.evolution.seed.get_or_insert_with(rand::random);
        tracing::info!("Simulation seed: {}", seed);

        let world = sim::build_world(&config.world, seed);
        let evolution = EvolutionLoop::new(&config, world)?;

        Ok(Self {
            inner: Arc::new(RwLock::new(ColonyInner {
                evolution,
                run_id: Uuid::new_v4(),
                start_time: Instant::now(),
            })),
        })
    }

    /// Advance the simulation by `dt` seconds
    pub async fn step(&self, dt: f32) -> Option<GenerationReport> {
        let mut inner = self.inner.write().await;
        inner.evolution.step(dt)
    }

    /// Current colony counters
    pub async fn stats(&self) -> ColonyStats {
        let inner = self.inner.read().await;
        let evolution = &inner.evolution;

        ColonyStats {
            run_id: inner.run_id,
            generation: evolution.generation(),
            time_remaining: evolution.time_remaining().max(0.0),
            live_ants: evolution.colony().live_count(),
            mulch_consumed: evolution.colony().mulch_consumed(),
            ants_on_acid: evolution.ants_on_acid(),
            nest_blocks: evolution.nest_blocks(),
            best_fitness: evolution.best_fitness(),
            last_report: evolution.last_report().cloned(),
            uptime_seconds: inner.start_time.elapsed().as_secs(),
        }
    }

    pub async fn ants(&self) -> Vec<AntSnapshot> {
        let inner = self.inner.read().await;
        inner.evolution.colony().snapshots()
    }

    pub async fn best(&self) -> Option<BestGenome> {
        let inner = self.inner.read().await;
        inner.evolution.best().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.evolution.population_size = 5;
        config.evolution.generation_duration = 2.0;
        config.evolution.seed = Some(12);
        config
    }

    #[tokio::test]
    async fn test_handle_creation() {
        let handle = ColonyHandle::new(&small_config()).unwrap();
        let stats = handle.stats().await;

        assert_eq!(stats.generation, 1);
        assert_eq!(stats.live_ants, 5);
        assert_eq!(stats.best_fitness, None);
        assert!(stats.last_report.is_none());
        assert_eq!(handle.ants().await.len(), 5);
    }

    #[tokio::test]
    async fn test_step_rolls_generation() {
        let handle = ColonyHandle::new(&small_config()).unwrap();

        assert!(handle.step(1.0).await.is_none());
        let report = handle.step(1.0).await.expect("generation should end");
        assert_eq!(report.generation, 1);

        let stats = handle.stats().await;
        assert_eq!(stats.generation, 2);
        assert_eq!(stats.best_fitness, Some(report.best_fitness));
        assert_eq!(stats.last_report, Some(report));
        assert!(handle.best().await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.ant.exploration_rate = 2.0;
        assert!(ColonyHandle::new(&config).is_err());
    }
}
