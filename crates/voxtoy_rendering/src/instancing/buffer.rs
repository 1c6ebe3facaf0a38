//! Staging buffers for instanced rendering.
//!
//! Sized once per model load. Writes only touch the CPU copy and raise a
//! single dirty flag; [`InstanceBuffer::flush`] turns the flag into a new
//! generation number that uploaders compare against.

use bytemuck::Pod;

/// Fixed-size staging buffer of instance records.
#[derive(Debug, Clone)]
pub struct InstanceBuffer<T: Pod + Default> {
    /// CPU-side staging copy.
    staging: Vec<T>,
    /// Written since the last flush.
    dirty: bool,
    /// Flush counter; advances only when the buffer was dirty.
    generation: u64,
}

impl<T: Pod + Default> InstanceBuffer<T> {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { staging: Vec::new(), dirty: false, generation: 0 }
    }

    /// Resizes to exactly `count` default records.
    ///
    /// Reuses the existing allocation when it is large enough.
    pub fn allocate(&mut self, count: usize) {
        self.staging.clear();
        self.staging.resize(count, T::default());
        self.dirty = true;
    }

    /// Overwrites slot `index`. Returns false when out of range.
    #[inline]
    pub fn write(&mut self, index: usize, value: T) -> bool {
        match self.staging.get_mut(index) {
            Some(slot) => {
                *slot = value;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Reads slot `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.staging.get(index)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.staging.len()
    }

    /// True when no slots are allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    /// Written since the last flush.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Publishes pending writes. Returns whether the generation advanced.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// All records.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.staging
    }

    /// Records as bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.staging)
    }
}

impl<T: Pod + Default> Default for InstanceBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancing::InstanceColor;

    #[test]
    fn test_flush_bumps_generation_once() {
        let mut buffer = InstanceBuffer::<InstanceColor>::new();
        buffer.allocate(4);
        assert!(buffer.is_dirty());

        buffer.write(0, InstanceColor::default());
        buffer.write(1, InstanceColor::default());
        assert!(buffer.flush());
        assert_eq!(buffer.generation(), 1);

        // Nothing written: no new generation
        assert!(!buffer.flush());
        assert_eq!(buffer.generation(), 1);
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let mut buffer = InstanceBuffer::<InstanceColor>::new();
        buffer.allocate(2);
        buffer.flush();

        assert!(!buffer.write(2, InstanceColor::default()));
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_allocate_resets_contents() {
        let mut buffer = InstanceBuffer::<InstanceColor>::new();
        buffer.allocate(3);
        buffer.write(0, InstanceColor { rgba: [0.0; 4] });
        buffer.allocate(5);

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.get(0), Some(&InstanceColor::default()));
        assert_eq!(buffer.as_bytes().len(), 5 * InstanceColor::SIZE);
    }
}
