use crate::error::ConfigurationError;
use crate::item::{Item, VirtualItem};

#[derive(Debug, Clone)]
pub struct TrackModel {
    items: Vec<Item>,
    virtual_items: Vec<VirtualItem>,
    cycles: usize,
    current: isize,
}

impl TrackModel {
    pub fn initialize(items: Vec<Item>, cycles: usize) -> Result<Self, ConfigurationError> {
        if items.is_empty() {
            return Err(ConfigurationError::NoItems);
        }
        if cycles == 0 {
            return Err(ConfigurationError::InvalidCycles(cycles));
        }

        let n = items.len();
        let virtual_items = (0..n * cycles)
            .map(|virtual_index| VirtualItem {
                virtual_index,
                original_index: virtual_index % n,
            })
            .collect();

        let mut track = Self {
            items,
            virtual_items,
            cycles,
            current: 0,
        };
        track.current = track.cycle_offset();
        Ok(track)
    }

    /// Number of logical items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// First virtual index of the middle cycle.
    pub fn cycle_offset(&self) -> isize {
        ((self.cycles / 2) * self.len()) as isize
    }

    pub fn current_virtual_index(&self) -> isize {
        self.current
    }

    pub fn active_original_index(&self) -> usize {
        self.current.rem_euclid(self.len() as isize) as usize
    }

    pub fn active_item(&self) -> &Item {
        &self.items[self.active_original_index()]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn virtual_items(&self) -> &[VirtualItem] {
        &self.virtual_items
    }

    pub fn virtual_item(&self, virtual_index: isize) -> Option<&VirtualItem> {
        usize::try_from(virtual_index)
            .ok()
            .and_then(|i| self.virtual_items.get(i))
    }

    /// Moves by `delta` without clamping. A single item has nowhere to go.
    pub fn step(&mut self, delta: isize) {
        if self.len() == 1 {
            return;
        }
        self.current += delta;
    }

    pub fn jump_to(&mut self, virtual_index: isize) {
        self.current = virtual_index;
    }

    /// Jumps to the middle-cycle copy of a logical item.
    pub fn jump_to_original(&mut self, original_index: usize) {
        let original = original_index.min(self.len() - 1) as isize;
        self.current = self.cycle_offset() + original;
    }

    /// Shifts the position by whole cycles back into the middle cycle.
    /// Returns true when the position moved.
    pub fn normalize(&mut self) -> bool {
        let n = self.len() as isize;
        let start = self.cycle_offset();
        let normalized = start + (self.current - start).rem_euclid(n);
        let changed = normalized != self.current;
        self.current = normalized;
        changed
    }

    pub fn in_middle_cycle(&self) -> bool {
        let start = self.cycle_offset();
        (start..start + self.len() as isize).contains(&self.current)
    }
}
