use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{AnalogSensor, DigitalOutput, Level};

/// Sensor returning a settable raw value
///
/// Clones share the value, so a test can keep one and hand the other to
/// the controller.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    raw: Rc<Cell<u16>>,
    reads: Rc<Cell<usize>>,
}

impl SimulatedSensor {
    pub fn new(raw: u16) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
            reads: Rc::new(Cell::new(0)),
        }
    }

    #[cfg(test)]
    pub fn set_raw(&self, raw: u16) {
        self.raw.set(raw);
    }

    /// Total number of reads taken so far
    #[cfg(test)]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl AnalogSensor for SimulatedSensor {
    fn read_raw(&mut self) -> u16 {
        self.reads.set(self.reads.get() + 1);
        self.raw.get()
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Output line that records every level written to it
#[derive(Debug, Clone)]
pub struct SimulatedOutput {
    name: String,
    levels: Rc<RefCell<Vec<Level>>>,
}

impl SimulatedOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            levels: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Every level written, oldest first
    #[cfg(test)]
    pub fn levels(&self) -> Vec<Level> {
        self.levels.borrow().clone()
    }

    #[cfg(test)]
    pub fn last_level(&self) -> Option<Level> {
        self.levels.borrow().last().copied()
    }

    /// Number of times the written level actually changed
    #[cfg(test)]
    pub fn transitions(&self) -> usize {
        self.levels
            .borrow()
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count()
    }
}

impl DigitalOutput for SimulatedOutput {
    fn write_level(&mut self, level: Level) {
        tracing::trace!("{} <- {}", self.name, level.as_u8());
        self.levels.borrow_mut().push(level);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
