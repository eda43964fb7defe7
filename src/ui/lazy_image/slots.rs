// SPDX-License-Identifier: MPL-2.0
//! Dual-slot image buffer.
//!
//! Two cells hold the outgoing and incoming images. New sources always go
//! into the *waiting* cell while the other keeps showing whatever was
//! there, so a swap never shows an empty frame.

use iced::widget::image::Handle;

use super::source::ImageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotIndex {
    #[default]
    First,
    Second,
}

impl SlotIndex {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            SlotIndex::First => SlotIndex::Second,
            SlotIndex::Second => SlotIndex::First,
        }
    }

    fn index(self) -> usize {
        match self {
            SlotIndex::First => 0,
            SlotIndex::Second => 1,
        }
    }
}

/// One buffer cell: what is being shown and, once decoded, its pixels.
#[derive(Debug, Clone)]
pub struct Slot {
    pub source: ImageSource,
    pub handle: Option<Handle>,
}

impl Slot {
    fn new(source: ImageSource) -> Self {
        Self {
            source,
            handle: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotBuffer {
    cells: [Option<Slot>; 2],
    waiting: SlotIndex,
}

impl SlotBuffer {
    /// Empty buffer, with `placeholder` seeded opposite the waiting slot.
    #[must_use]
    pub fn new(placeholder: Option<ImageSource>) -> Self {
        let mut buffer = Self::default();
        if let Some(source) = placeholder {
            let loaded = buffer.waiting.other();
            buffer.cells[loaded.index()] = Some(Slot::new(source));
        }
        buffer
    }

    #[must_use]
    pub fn waiting(&self) -> SlotIndex {
        self.waiting
    }

    #[must_use]
    pub fn get(&self, index: SlotIndex) -> Option<&Slot> {
        self.cells[index.index()].as_ref()
    }

    /// Occupied cells in drawing order (first cell at the bottom).
    pub fn occupied(&self) -> impl Iterator<Item = (SlotIndex, &Slot)> {
        [SlotIndex::First, SlotIndex::Second]
            .into_iter()
            .filter_map(|index| self.get(index).map(|slot| (index, slot)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Writes `source` into the waiting cell, dropping whatever was there.
    pub fn put_waiting(&mut self, source: ImageSource) {
        self.cells[self.waiting.index()] = Some(Slot::new(source));
    }

    /// Swaps roles after a successful load.
    ///
    /// The freshly loaded cell becomes the displayed one; the other cell
    /// becomes the new waiting cell and is emptied. Returns the index of the
    /// displayed cell.
    pub fn promote(&mut self) -> SlotIndex {
        let loaded = self.waiting;
        self.waiting = loaded.other();
        self.cells[self.waiting.index()] = None;
        loaded
    }

    /// Empties both cells. The waiting flag is kept.
    pub fn clear(&mut self) {
        self.cells = [None, None];
    }

    /// Stores decoded pixels on `index` if it still shows `source`.
    ///
    /// Returns `false` when the cell was emptied or replaced meanwhile.
    pub fn attach_decoded(&mut self, index: SlotIndex, source: &ImageSource, handle: Handle) -> bool {
        match self.cells[index.index()].as_mut() {
            Some(slot) if &slot.source == source => {
                slot.handle = Some(handle);
                true
            }
            _ => false,
        }
    }
}
