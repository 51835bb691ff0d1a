use crate::world::Cell;
use shared::{AntSnapshot, Caste, Genome};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AntId(pub u32);

/// One of the four horizontal directions an ant can face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    PosX,
    PosZ,
    NegX,
    NegZ,
}

impl Facing {
    const ALL: [Facing; 4] = [Facing::PosX, Facing::PosZ, Facing::NegX, Facing::NegZ];

    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index % 4)]
    }

    pub fn index(self) -> u8 {
        match self {
            Facing::PosX => 0,
            Facing::PosZ => 1,
            Facing::NegX => 2,
            Facing::NegZ => 3,
        }
    }

    pub fn turned_left(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    pub fn turned_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Column offset (dx, dz) of one step forward
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::PosX => (1, 0),
            Facing::PosZ => (0, 1),
            Facing::NegX => (-1, 0),
            Facing::NegZ => (0, -1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ant {
    pub id: AntId,
    pub caste: Caste,
    pub facing: Facing,
    pub health: f32,
    pub max_health: f32,
    /// Seconds until the next decision
    pub cooldown: f32,
    pub genome: Arc<Genome>,
    // Only the occupancy index moves an ant, so index and position never disagree.
    position: Cell,
}

impl Ant {
    /// Create an ant with full health; it still has to be registered with the index
    pub fn new(
        id: AntId,
        caste: Caste,
        position: Cell,
        facing: Facing,
        genome: Arc<Genome>,
        max_health: f32,
    ) -> Self {
        Self {
            id,
            caste,
            facing,
            health: max_health,
            max_health,
            cooldown: 0.0,
            genome,
            position,
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Cell) {
        self.position = position;
    }

    /// The cell holding the ground this ant stands on
    pub fn ground(&self) -> Cell {
        self.position.below()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_queen(&self) -> bool {
        self.caste == Caste::Queen
    }

    pub fn health_ratio(&self) -> f32 {
        self.health / self.max_health
    }

    /// Lose health, never dropping below zero
    pub fn drain(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    /// Gain health, capped at max health
    pub fn receive_health(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn snapshot(&self) -> AntSnapshot {
        AntSnapshot {
            id: self.id.0,
            position: self.position.to_array(),
            facing: self.facing.index(),
            caste: self.caste,
            health: self.health,
            max_health: self.max_health,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ant(health: f32) -> Ant {
        let genome = Arc::new(Genome::from_weights(vec![0.0; shared::WEIGHT_COUNT]).unwrap());
        let mut ant = Ant::new(
            AntId(1),
            Caste::Worker,
            Cell::new(2, 3, 4),
            Facing::PosX,
            genome,
            100.0,
        );
        ant.health = health;
        ant
    }

    #[test]
    fn test_ant_creation() {
        let ant = ant(100.0);
        assert_eq!(ant.health, ant.max_health);
        assert_eq!(ant.ground(), Cell::new(2, 2, 4));
        assert!(!ant.is_queen());
    }

    #[test]
    fn test_turns_wrap_around() {
        assert_eq!(Facing::PosX.turned_left(), Facing::NegZ);
        assert_eq!(Facing::NegZ.turned_right(), Facing::PosX);

        let mut facing = Facing::PosZ;
        for _ in 0..4 {
            facing = facing.turned_right();
        }
        assert_eq!(facing, Facing::PosZ);
        assert_eq!(Facing::PosZ.turned_left().turned_right(), Facing::PosZ);
    }

    #[test]
    fn test_receive_health_is_capped() {
        let mut ant = ant(95.0);
        ant.receive_health(30.0);
        assert_eq!(ant.health, 100.0);
    }

    #[test]
    fn test_drain_floors_at_zero() {
        let mut ant = ant(0.5);
        ant.drain(2.0);
        assert_eq!(ant.health, 0.0);
        assert!(ant.is_dead());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let ant = ant(42.0);
        let snap = ant.snapshot();
        assert_eq!(snap.id, 1);
        assert_eq!(snap.position, [2, 3, 4]);
        assert_eq!(snap.facing, 0);
        assert_eq!(snap.caste, Caste::Worker);
        assert_eq!(snap.health, 42.0);
    }
}
