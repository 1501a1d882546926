//! Grid world model
//!
//! The map is an axis-aligned integer grid of cell codes. Zero is empty,
//! anything else identifies a wall type (which selects the wall texture).
//! The grid is read-only for the duration of a frame.

/// Map width/height of the built-in arena
pub const MAP_SIZE: usize = 24;

/// Safe respawn cells shared by client and server
pub const SAFE_SPAWNS: [(f32, f32); 5] = [
    (2.5, 2.5),
    (21.5, 2.5),
    (2.5, 21.5),
    (21.5, 21.5),
    (12.0, 12.0),
];

/// 2D occupancy grid of wall-type codes
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    pub fn new(width: usize, height: usize, cells: Vec<u8>) -> Self {
        assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell code at (x, y). Out-of-bounds reads are solid: a ray escaping
    /// the map must terminate rather than index past the buffer.
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 1;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) != 0
    }

    /// Solid check for a continuous position (movement validation)
    pub fn blocks(&self, x: f32, y: f32) -> bool {
        self.is_solid(x.floor() as i32, y.floor() as i32)
    }

    /// The built-in arena: solid border, pillar field in the middle,
    /// all five safe-spawn cells guaranteed open.
    pub fn arena() -> Self {
        let mut cells = vec![0u8; MAP_SIZE * MAP_SIZE];

        for y in 0..MAP_SIZE {
            for x in 0..MAP_SIZE {
                let border = x == 0 || y == 0 || x == MAP_SIZE - 1 || y == MAP_SIZE - 1;
                if border {
                    cells[y * MAP_SIZE + x] = 1;
                } else if x % 6 == 3 && y % 6 == 3 {
                    // pillar grid
                    cells[y * MAP_SIZE + x] = 2;
                } else if (x == 8 || x == 15) && (6..=17).contains(&y) && y % 4 != 0 {
                    // broken corridor walls
                    cells[y * MAP_SIZE + x] = 3;
                }
            }
        }

        for &(sx, sy) in &SAFE_SPAWNS {
            cells[sy.floor() as usize * MAP_SIZE + sx.floor() as usize] = 0;
        }

        let grid = Self::new(MAP_SIZE, MAP_SIZE, cells);
        for &(sx, sy) in &SAFE_SPAWNS {
            debug_assert!(!grid.blocks(sx, sy), "spawn cell ({sx},{sy}) is blocked");
        }
        grid
    }
}
