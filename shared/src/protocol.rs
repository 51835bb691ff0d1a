use crate::Genome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Behavioural role of an ant; decides what its special action does
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Caste {
    /// Shares health with a hungry ant on the same cell
    Worker,
    /// Converts the ground beneath her into nest
    Queen,
}

/// Read-only view of one ant for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AntSnapshot {
    pub id: u32,
    pub position: [i32; 3],
    /// 0 = +X, 1 = +Z, 2 = -X, 3 = -Z
    pub facing: u8,
    pub caste: Caste,
    pub health: f32,
    pub max_health: f32,
}

/// Outcome of one scored generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationReport {
    pub generation: u32,
    /// Nest blocks present when the generation ended
    pub fitness: u32,
    /// Best fitness seen so far, including this generation
    pub best_fitness: u32,
    /// Whether this generation replaced the recorded best genome
    pub improved: bool,
    pub ants_spawned: usize,
    pub ants_alive: usize,
    pub mulch_consumed: u32,
}

/// Live colony counters, derived on demand and never stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColonyStats {
    /// Identifies the simulation run serving these stats
    pub run_id: Uuid,
    pub generation: u32,
    pub time_remaining: f32,
    pub live_ants: usize,
    pub mulch_consumed: u32,
    pub ants_on_acid: usize,
    pub nest_blocks: u32,
    pub best_fitness: Option<u32>,
    pub last_report: Option<GenerationReport>,
    pub uptime_seconds: u64,
}

/// The best genome recorded so far together with the fitness that earned it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestGenome {
    pub fitness: u32,
    pub genome: Genome,
}
