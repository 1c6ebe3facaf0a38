//! Entity Store: the authoritative cube list of the loaded model.
//!
//! Cubes keep their original grid coordinates. The rest position of cube
//! `i` is those coordinates lifted by a per-load ground offset so the
//! lowest cube center sits exactly on the ground.

use voxtoy_shared::{Color, Cube, Vec3};

/// Loaded cubes and their rest positions.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    cubes: Vec<Cube>,
    targets: Vec<Vec3>,
    ground_offset: f32,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every cube and recomputes the ground offset.
    ///
    /// `offset = ground_y - min(y)`, applied uniformly. Models whose
    /// lowest layer sits above y = 0 are lowered too, so every model
    /// rests on the ground rather than floating at its authored height.
    pub fn load(&mut self, cubes: Vec<Cube>, ground_y: f32) {
        self.ground_offset = cubes
            .iter()
            .map(|c| c.y)
            .min()
            .map_or(0.0, |min_y| ground_y - min_y as f32);

        let offset = self.ground_offset;
        self.targets.clear();
        self.targets.extend(
            cubes
                .iter()
                .map(|c| Vec3::new(c.x as f32, c.y as f32 + offset, c.z as f32)),
        );
        self.cubes = cubes;
    }

    /// Cube `index` with its original coordinates.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Cube> {
        self.cubes.get(index).copied()
    }

    /// Number of cubes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cubes.len()
    }

    /// True when no model (or an empty one) is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// All cubes in index order.
    #[must_use]
    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Rest positions in index order.
    #[must_use]
    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Vertical lift applied at load.
    #[must_use]
    pub const fn ground_offset(&self) -> f32 {
        self.ground_offset
    }

    /// Stored color of cube `index`.
    #[must_use]
    pub fn color(&self, index: usize) -> Option<Color> {
        self.cubes.get(index).map(|c| c.color)
    }

    /// Recolors cube `index`. Returns false when out of range.
    pub fn set_color(&mut self, index: usize, color: Color) -> bool {
        match self.cubes.get_mut(index) {
            Some(cube) => {
                cube.color = color;
                true
            }
            None => false,
        }
    }
}
