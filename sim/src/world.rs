use rand::Rng;

/// Types of blocks in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Air,
    Stone,
    Grass,
    /// Edible: restores health and disappears when eaten
    Mulch,
    /// Doubles health decay for an ant standing on it
    Acidic,
    /// World boundary material; cannot be dug
    Container,
    /// Built by the queen; counted for fitness, cannot be dug
    Nest,
}

impl Block {
    pub fn is_air(self) -> bool {
        self == Block::Air
    }

    /// Digging and nest building leave these blocks alone
    pub fn is_indestructible(self) -> bool {
        matches!(self, Block::Air | Block::Container | Block::Nest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell directly below; for an ant this is the ground it stands on
    pub fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

/// The voxel world as seen by the colony.
///
/// Reads outside the world return `Block::Air`; writes outside it are ignored.
pub trait VoxelGrid {
    fn block(&self, x: i32, y: i32, z: i32) -> Block;

    fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block);

    fn dimension(&self, axis: Axis) -> i32;

    /// Restore the world to the state it was in before the first generation
    fn reset(&mut self);

    /// Total nest blocks in the world
    fn nest_block_count(&self) -> u32 {
        let (dx, dy, dz) = (
            self.dimension(Axis::X),
            self.dimension(Axis::Y),
            self.dimension(Axis::Z),
        );
        let mut count = 0;
        for x in 0..dx {
            for y in 0..dy {
                for z in 0..dz {
                    if self.block(x, y, z) == Block::Nest {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    fn block_at(&self, cell: Cell) -> Block {
        self.block(cell.x, cell.y, cell.z)
    }

    fn set_block_at(&mut self, cell: Cell, block: Block) {
        self.set_block(cell.x, cell.y, cell.z, block)
    }
}

/// Dense in-memory voxel grid that remembers its initial layout
#[derive(Debug, Clone)]
pub struct BlockGrid {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    blocks: Vec<Block>,
    initial: Vec<Block>,
    nest_count: u32,
}

impl BlockGrid {
    /// Create a world filled with air
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        let blocks = vec![Block::Air; width * height * depth];
        Self {
            width,
            height,
            depth,
            initial: blocks.clone(),
            blocks,
            nest_count: 0,
        }
    }

    /// Create a world whose bottom `ground_height` layers are stone topped with grass
    pub fn flat(width: usize, height: usize, depth: usize, ground_height: usize) -> Self {
        let mut grid = Self::new(width, height, depth);
        let ground_height = ground_height.min(height);
        for y in 0..ground_height {
            let block = if y + 1 == ground_height {
                Block::Grass
            } else {
                Block::Stone
            };
            for x in 0..width {
                for z in 0..depth {
                    grid.put(x, y, z, block);
                }
            }
        }
        grid.commit();
        grid
    }

    /// Replace surface blocks with mulch and acidic patches
    /// mulch_density: fraction of columns whose top block becomes mulch (e.g., 0.05 = 5%)
    /// acidic_density: fraction of columns whose top block becomes acidic
    pub fn scatter_blocks<R: Rng>(&mut self, rng: &mut R, mulch_density: f64, acidic_density: f64) {
        let columns = self.width * self.depth;
        let num_mulch = (columns as f64 * mulch_density) as usize;
        let num_acidic = (columns as f64 * acidic_density) as usize;

        for (count, block) in [(num_mulch, Block::Mulch), (num_acidic, Block::Acidic)] {
            for _ in 0..count {
                let x = rng.gen_range(0..self.width);
                let z = rng.gen_range(0..self.depth);
                if let Some(y) = self.surface(x, z) {
                    self.put(x, y, z, block);
                }
            }
        }
        self.commit();
    }

    /// Take the current layout as the state `reset` returns to
    pub fn commit(&mut self) {
        self.initial = self.blocks.clone();
    }

    fn surface(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.height)
            .rev()
            .find(|&y| !self.blocks[self.index(x, y, z)].is_air())
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.height + y) * self.depth + z
    }

    fn checked_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let (x, y, z) = (
            usize::try_from(x).ok()?,
            usize::try_from(y).ok()?,
            usize::try_from(z).ok()?,
        );
        if x < self.width && y < self.height && z < self.depth {
            Some(self.index(x, y, z))
        } else {
            None
        }
    }

    fn put(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let idx = self.index(x, y, z);
        self.replace(idx, block);
    }

    fn replace(&mut self, idx: usize, block: Block) {
        let old = std::mem::replace(&mut self.blocks[idx], block);
        if old == Block::Nest {
            self.nest_count -= 1;
        }
        if block == Block::Nest {
            self.nest_count += 1;
        }
    }
}

impl VoxelGrid for BlockGrid {
    fn block(&self, x: i32, y: i32, z: i32) -> Block {
        self.checked_index(x, y, z)
            .map(|idx| self.blocks[idx])
            .unwrap_or(Block::Air)
    }

    fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if let Some(idx) = self.checked_index(x, y, z) {
            self.replace(idx, block);
        }
    }

    fn dimension(&self, axis: Axis) -> i32 {
        let len = match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        };
        len as i32
    }

    fn reset(&mut self) {
        self.blocks.clone_from(&self.initial);
        self.nest_count = self
            .blocks
            .iter()
            .filter(|b| **b == Block::Nest)
            .count() as u32;
    }

    fn nest_block_count(&self) -> u32 {
        self.nest_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_flat_world_layers() {
        let grid = BlockGrid::flat(4, 5, 6, 2);
        assert_eq!(grid.dimension(Axis::X), 4);
        assert_eq!(grid.dimension(Axis::Y), 5);
        assert_eq!(grid.dimension(Axis::Z), 6);

        assert_eq!(grid.block(1, 0, 1), Block::Stone);
        assert_eq!(grid.block(1, 1, 1), Block::Grass);
        assert_eq!(grid.block(1, 2, 1), Block::Air);
    }

    #[test]
    fn test_out_of_bounds_reads_air_and_ignores_writes() {
        let mut grid = BlockGrid::flat(3, 3, 3, 1);
        assert_eq!(grid.block(-1, 0, 0), Block::Air);
        assert_eq!(grid.block(0, 3, 0), Block::Air);

        grid.set_block(5, 0, 0, Block::Nest);
        assert_eq!(grid.nest_block_count(), 0);
    }

    #[test]
    fn test_nest_count_tracks_writes() {
        let mut grid = BlockGrid::flat(4, 4, 4, 1);
        grid.set_block(1, 0, 1, Block::Nest);
        grid.set_block(2, 0, 2, Block::Nest);
        assert_eq!(grid.nest_block_count(), 2);

        grid.set_block(1, 0, 1, Block::Air);
        assert_eq!(grid.nest_block_count(), 1);
    }

    #[test]
    fn test_default_nest_scan_matches_cached_count() {
        struct Scan<'a>(&'a BlockGrid);
        impl VoxelGrid for Scan<'_> {
            fn block(&self, x: i32, y: i32, z: i32) -> Block {
                self.0.block(x, y, z)
            }
            fn set_block(&mut self, _: i32, _: i32, _: i32, _: Block) {}
            fn dimension(&self, axis: Axis) -> i32 {
                self.0.dimension(axis)
            }
            fn reset(&mut self) {}
        }

        let mut grid = BlockGrid::flat(5, 3, 5, 2);
        grid.set_block(2, 1, 2, Block::Nest);
        grid.set_block(3, 1, 1, Block::Nest);
        assert_eq!(Scan(&grid).nest_block_count(), grid.nest_block_count());
    }

    #[test]
    fn test_reset_restores_initial_layout() {
        let mut grid = BlockGrid::flat(4, 4, 4, 2);
        grid.set_block(1, 1, 1, Block::Air);
        grid.set_block(2, 1, 2, Block::Nest);

        grid.reset();

        assert_eq!(grid.block(1, 1, 1), Block::Grass);
        assert_eq!(grid.block(2, 1, 2), Block::Grass);
        assert_eq!(grid.nest_block_count(), 0);
    }

    #[test]
    fn test_scatter_places_blocks_on_surface() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = BlockGrid::flat(20, 6, 20, 3);
        grid.scatter_blocks(&mut rng, 0.2, 0.1);

        let mut mulch = 0;
        let mut acidic = 0;
        for x in 0..20 {
            for z in 0..20 {
                match grid.block(x, 2, z) {
                    Block::Mulch => mulch += 1,
                    Block::Acidic => acidic += 1,
                    _ => {}
                }
                // Nothing lands below the surface
                assert_eq!(grid.block(x, 1, z), Block::Stone);
            }
        }
        assert!(mulch > 0);
        assert!(acidic > 0);

        // Scattered blocks survive a reset
        grid.set_block(0, 2, 0, Block::Air);
        grid.reset();
        assert!(!grid.block(0, 2, 0).is_air());
    }
}
