//! Activation frame read by local-variable nodes.

use crate::value::Value;

/// Slot-indexed local variables of one activation. Slot indices are assigned
/// by the tree builder, which also guarantees they are in bounds.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    slots: Vec<Value>,
}

impl Frame {
    pub fn new(slots: Vec<Value>) -> Self {
        Self { slots }
    }

    /// Frame with `slot_count` slots, all zero.
    pub fn with_slots(slot_count: usize) -> Self {
        Self {
            slots: vec![Value::SmallInt(0); slot_count],
        }
    }

    #[inline]
    pub fn read(&self, slot: usize) -> &Value {
        &self.slots[slot]
    }

    #[inline]
    pub fn write(&mut self, slot: usize, value: Value) {
        self.slots[slot] = value;
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
