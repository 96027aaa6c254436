//! Cascading toggle groups behind the sparkle branches.
//!
//! Lighting a cell also lights every cell past it in the group's cascade
//! direction; unlighting clears it and every lit cell past it. A group
//! reports its new lit count once per toggle, which becomes the level of the
//! track it drives.

use crate::error::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cascade {
    /// Spreads toward higher indices.
    Ascending,
    /// Spreads toward index 0.
    Descending,
}

impl Cascade {
    /// Odd-numbered tracks cascade up, even-numbered ones down.
    pub fn for_track(number: u8) -> Self {
        if number % 2 == 1 {
            Cascade::Ascending
        } else {
            Cascade::Descending
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToggleGroup {
    cells: Vec<bool>,
    cascade: Cascade,
}

impl ToggleGroup {
    pub fn new(len: usize, cascade: Cascade) -> CoreResult<Self> {
        if len == 0 {
            return Err(CoreError::invalid("len", "a toggle group needs cells"));
        }
        Ok(Self {
            cells: vec![false; len],
            cascade,
        })
    }

    pub fn cascade(&self) -> Cascade {
        self.cascade
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn is_lit(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn all_lit(&self) -> bool {
        self.cells.iter().all(|c| *c)
    }

    /// Flip cell `index` and cascade. Returns the new lit count.
    pub fn toggle(&mut self, index: usize) -> CoreResult<usize> {
        let len = self.cells.len();
        if index >= len {
            return Err(CoreError::invalid(
                "cell",
                format!("index {index} out of range for {len} cells"),
            ));
        }
        let light = !self.cells[index];
        let beyond = match self.cascade {
            Cascade::Ascending => index + 1..len,
            Cascade::Descending => 0..index,
        };
        self.cells[index] = light;
        for cell in &mut self.cells[beyond] {
            *cell = light;
        }
        Ok(self.lit_count())
    }

    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }
}
