use crate::ant::{Ant, AntId, Facing};
use crate::occupancy::OccupancyIndex;
use crate::world::{Axis, Block, Cell, VoxelGrid};
use rand::Rng;
use shared::{AntConfig, AntSnapshot, Caste, Genome, INPUT_COUNT, OUTPUT_COUNT};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// What an ant does with a decision; indices match the network's outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveForward,
    TurnLeft,
    TurnRight,
    Dig,
    /// Worker: share health. Queen: build a nest.
    Special,
    Idle,
}

impl Action {
    pub const ALL: [Action; OUTPUT_COUNT] = [
        Action::MoveForward,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Dig,
        Action::Special,
        Action::Idle,
    ];

    pub fn from_output(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(Action::Idle)
    }

    /// Map a uniform roll in [0, 1) onto the exploration table, which favours
    /// moving and turning
    pub fn from_roll(roll: f32) -> Self {
        match roll {
            r if r < 0.45 => Action::MoveForward,
            r if r < 0.65 => Action::TurnLeft,
            r if r < 0.85 => Action::TurnRight,
            r if r < 0.92 => Action::Dig,
            r if r < 0.97 => Action::Special,
            _ => Action::Idle,
        }
    }
}

/// Index of the strongest output; the lowest index wins ties
pub fn strongest_output(outputs: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in outputs.iter().enumerate().skip(1) {
        if *value > outputs[best] {
            best = i;
        }
    }
    best
}

/// All live ants of a generation plus the occupancy index that locates them
pub struct Colony {
    config: AntConfig,
    ants: BTreeMap<AntId, Ant>,
    occupancy: OccupancyIndex,
    mulch_consumed: u32,
    ticks: u64,
    next_id: u32,
}

impl Colony {
    pub fn new(config: AntConfig) -> Self {
        Self {
            config,
            ants: BTreeMap::new(),
            occupancy: OccupancyIndex::new(),
            mulch_consumed: 0,
            ticks: 0,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &AntConfig {
        &self.config
    }

    /// Place a new ant at full health and register it with the index
    pub fn spawn(
        &mut self,
        caste: Caste,
        position: Cell,
        facing: Facing,
        genome: Arc<Genome>,
    ) -> AntId {
        let id = AntId(self.next_id);
        self.next_id += 1;

        let ant = Ant::new(id, caste, position, facing, genome, self.config.max_health);
        self.occupancy.register(&ant);
        self.ants.insert(id, ant);
        id
    }

    pub fn get(&self, id: AntId) -> Option<&Ant> {
        self.ants.get(&id)
    }

    pub fn get_mut(&mut self, id: AntId) -> Option<&mut Ant> {
        self.ants.get_mut(&id)
    }

    pub fn ants(&self) -> impl Iterator<Item = &Ant> {
        self.ants.values()
    }

    pub fn len(&self) -> usize {
        self.ants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ants.is_empty()
    }

    /// Ants with health left; a drained ant stays stored until its next update
    pub fn live_count(&self) -> usize {
        self.ants.values().filter(|ant| !ant.is_dead()).count()
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    pub fn mulch_consumed(&self) -> u32 {
        self.mulch_consumed
    }

    pub fn ants_on_acid<G: VoxelGrid>(&self, grid: &G) -> usize {
        self.ants
            .values()
            .filter(|ant| grid.block_at(ant.ground()) == Block::Acidic)
            .count()
    }

    pub fn snapshots(&self) -> Vec<AntSnapshot> {
        self.ants.values().map(Ant::snapshot).collect()
    }

    /// Drop every ant and reset the per-generation counters
    pub fn clear(&mut self) {
        self.ants.clear();
        self.occupancy.clear();
        self.mulch_consumed = 0;
        self.ticks = 0;
    }

    /// Advance every ant once. `dt` is the simulated time since the last tick.
    pub fn tick<G: VoxelGrid, R: Rng + ?Sized>(&mut self, grid: &mut G, dt: f32, rng: &mut R) {
        // Visit a snapshot of ids, newest first, so deaths never skip anyone
        let ids: Vec<AntId> = self.ants.keys().copied().collect();

        for id in ids.into_iter().rev() {
            // The ant is held outside the map while it acts; everyone else
            // stays reachable for health sharing.
            let Some(mut ant) = self.ants.remove(&id) else {
                continue;
            };
            if self.update_ant(&mut ant, grid, dt, rng) {
                self.ants.insert(id, ant);
            }
        }

        self.ticks += 1;
    }

    /// Run one ant's state machine. Returns false if the ant died.
    fn update_ant<G: VoxelGrid, R: Rng + ?Sized>(
        &mut self,
        ant: &mut Ant,
        grid: &mut G,
        dt: f32,
        rng: &mut R,
    ) -> bool {
        if ant.is_dead() {
            self.occupancy.unregister(ant);
            debug!("Ant {} died at {:?}", ant.id.0, ant.position());
            return false;
        }

        // Sensed once per tick; the decision below sees this reading
        let ground = grid.block_at(ant.ground());

        let decay_mult = if ground == Block::Acidic { 2.0 } else { 1.0 };
        ant.drain(self.config.health_decay_rate * decay_mult * dt);

        // Only a lone ant may eat; a shared cell feeds nobody
        if ground == Block::Mulch && self.occupancy.agents_at(ant.position()).len() <= 1 {
            self.consume_mulch(ant, grid);
        }

        ant.cooldown -= dt;
        if ant.cooldown <= 0.0 {
            ant.cooldown = self.config.action_interval;
            let action = self.decide(ant, ground, rng);
            self.execute(ant, action, grid);
        }

        let interval = self.config.queen_build_interval;
        if ant.is_queen() && interval > 0 && self.ticks % interval == 0 {
            self.build_nest(ant, grid);
        }

        true
    }

    fn decide<R: Rng + ?Sized>(&self, ant: &Ant, ground: Block, rng: &mut R) -> Action {
        if rng.gen::<f32>() < self.config.exploration_rate {
            return Action::from_roll(rng.gen());
        }

        let inputs: [f32; INPUT_COUNT] = [
            1.0,
            ant.health_ratio(),
            flag(!ground.is_air()),
            flag(ground == Block::Mulch),
            flag(ground == Block::Acidic),
            rng.gen(),
        ];
        let outputs = ant.genome.evaluate(&inputs);
        Action::from_output(strongest_output(&outputs))
    }

    fn execute<G: VoxelGrid>(&mut self, ant: &mut Ant, action: Action, grid: &mut G) {
        match action {
            Action::MoveForward => self.move_forward(ant, grid),
            Action::TurnLeft => ant.facing = ant.facing.turned_left(),
            Action::TurnRight => ant.facing = ant.facing.turned_right(),
            Action::Dig => self.dig(ant, grid),
            Action::Special => match ant.caste {
                Caste::Worker => self.share_health(ant),
                Caste::Queen => self.build_nest(ant, grid),
            },
            Action::Idle => {}
        }
    }

    fn move_forward<G: VoxelGrid>(&mut self, ant: &mut Ant, grid: &G) {
        let (dx, dz) = ant.facing.delta();
        let pos = ant.position();
        let (x, z) = (pos.x + dx, pos.z + dz);

        // Keep a one-cell margin from the world edge
        if x < 1 || x >= grid.dimension(Axis::X) - 1 || z < 1 || z >= grid.dimension(Axis::Z) - 1
        {
            return;
        }

        // A column still solid at the highest reachable cell is too tall to climb
        let start = (pos.y + self.config.climb_limit + 1).min(grid.dimension(Axis::Y) - 1);
        if !grid.block(x, start, z).is_air() {
            return;
        }
        let Some(ground_y) = (0..start).rev().find(|&y| !grid.block(x, y, z).is_air()) else {
            return;
        };
        if !grid.block(x, ground_y + 1, z).is_air() {
            return;
        }

        // Climbing is limited, falling is not
        if ground_y - pos.below().y > self.config.climb_limit {
            return;
        }

        self.occupancy.move_to(ant, Cell::new(x, ground_y + 1, z));
    }

    fn dig<G: VoxelGrid>(&mut self, ant: &mut Ant, grid: &mut G) {
        let target = ant.ground();
        if target.y < 0 || grid.block_at(target).is_indestructible() {
            return;
        }

        grid.set_block_at(target, Block::Air);
        self.fall(ant, grid);
    }

    fn consume_mulch<G: VoxelGrid>(&mut self, ant: &mut Ant, grid: &mut G) {
        let ground = ant.ground();
        if ground.y < 0 || grid.block_at(ground) != Block::Mulch {
            return;
        }

        ant.receive_health(self.config.mulch_health);
        grid.set_block_at(ground, Block::Air);
        self.mulch_consumed += 1;
        self.fall(ant, grid);
    }

    /// Drop the ant onto the first non-air block beneath it
    fn fall<G: VoxelGrid>(&mut self, ant: &mut Ant, grid: &G) {
        let pos = ant.position();
        let mut y = pos.y - 1;
        while y >= 0 && grid.block(pos.x, y, pos.z).is_air() {
            y -= 1;
        }
        self.occupancy.move_to(ant, Cell::new(pos.x, y + 1, pos.z));
    }

    /// Give health to the first hungry ant sharing this cell
    fn share_health(&mut self, ant: &mut Ant) {
        if ant.health <= self.config.share_threshold {
            return;
        }
        let amount = self.config.share_amount.min(ant.health - 1.0);

        for other_id in self.occupancy.agents_at(ant.position()) {
            if *other_id == ant.id {
                continue;
            }
            if let Some(other) = self.ants.get_mut(other_id) {
                if other.health < other.max_health {
                    ant.drain(amount);
                    other.receive_health(amount);
                    return;
                }
            }
        }
    }

    /// Turn the ground under a queen into nest for a third of her max health
    fn build_nest<G: VoxelGrid>(&mut self, ant: &mut Ant, grid: &mut G) {
        let cost = ant.max_health / 3.0;
        if ant.health < cost {
            return;
        }

        let ground = ant.ground();
        if ground.y < 0 || grid.block_at(ground).is_indestructible() {
            return;
        }

        ant.drain(cost);
        grid.set_block_at(ground, Block::Nest);
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}
