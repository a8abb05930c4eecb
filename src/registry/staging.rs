//! Staging buffer for in-progress catalog edits.
//!
//! Rows are addressed by a [`RowKey`] holding a slot index and a generation.
//! Removing a row bumps the generation of its slot, so a key held by an
//! editor after the row was removed (or the slot reused) no longer resolves.
//! Nothing is persisted until [`ModelRowArena::materialize`] turns the rows
//! into a [`Catalog`].

use super::model::{Capabilities, Catalog, ModelEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RowKey {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ModelRow {
    pub model_id: String,
    pub capabilities: Capabilities,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    row: Option<ModelRow>,
}

#[derive(Debug, Default)]
pub(crate) struct ModelRowArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    /// Live slot indices in display order.
    order: Vec<usize>,
}

impl ModelRowArena {
    pub(crate) fn new() -> ModelRowArena {
        ModelRowArena::default()
    }

    /// Stages every model of an existing catalog.
    pub(crate) fn from_catalog(catalog: Option<&Catalog>) -> ModelRowArena {
        let mut arena = ModelRowArena::new();

        for entry in catalog.iter().flat_map(|c| c.models.iter()) {
            arena.push(ModelRow {
                model_id: entry.vendor_model_id.clone(),
                capabilities: entry.capabilities,
            });
        }

        arena
    }

    pub(crate) fn push(&mut self, row: ModelRow) -> RowKey {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].row = Some(row);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    row: Some(row),
                });
                self.slots.len() - 1
            }
        };

        self.order.push(index);

        RowKey {
            index,
            generation: self.slots[index].generation,
        }
    }

    pub(crate) fn get_mut(&mut self, key: RowKey) -> Option<&mut ModelRow> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.row.as_mut())
    }

    pub(crate) fn remove(&mut self, key: RowKey) -> Option<ModelRow> {
        let slot = self
            .slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)?;

        let row = slot.row.take()?;
        slot.generation += 1;

        self.order.retain(|&i| i != key.index);
        self.free.push(key.index);

        Some(row)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live rows in display order.
    pub(crate) fn rows(&self) -> impl Iterator<Item = (RowKey, &ModelRow)> {
        self.order.iter().filter_map(|&index| {
            let slot = &self.slots[index];

            slot.row.as_ref().map(|row| {
                (
                    RowKey {
                        index,
                        generation: slot.generation,
                    },
                    row,
                )
            })
        })
    }

    /// Builds the catalog to persist: ids are trimmed, empty rows and
    /// duplicate ids are dropped.
    pub(crate) fn materialize(&self) -> Catalog {
        let mut catalog = Catalog {
            models: self
                .rows()
                .map(|(_, row)| ModelEntry {
                    capabilities: row.capabilities,
                    ..ModelEntry::new(row.model_id.trim())
                })
                .collect(),
        };

        catalog.dedup();

        catalog
    }
}
