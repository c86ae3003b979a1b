//! A fixed window of consecutive tick slots.

use crate::error::CoreError;
use crate::state::tick::Tick;

/// Number of tick slots housed by one array.
pub const TICKS_PER_ARRAY: i32 = 88;
pub const TICKS_PER_ARRAY_USIZE: usize = 88;

#[derive(Clone, Debug)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICKS_PER_ARRAY_USIZE],
}

impl TickArray {
    pub fn new(start_tick_index: i32, tick_spacing: u16) -> Result<Self, CoreError> {
        if start_tick_index % (TICKS_PER_ARRAY * tick_spacing as i32) != 0 {
            return Err(CoreError::TickNotSpaced);
        }
        let mut ticks = [Tick::default(); TICKS_PER_ARRAY_USIZE];
        for (i, t) in ticks.iter_mut().enumerate() {
            t.tick = start_tick_index + (i as i32) * tick_spacing as i32;
        }
        Ok(TickArray { start_tick_index, ticks })
    }

    /// The start index of the array that houses `tick_index`.
    pub fn start_index_containing(tick_index: i32, tick_spacing: u16) -> i32 {
        let span = tick_spacing as i32 * TICKS_PER_ARRAY;
        let mut start = tick_index / span;
        if tick_index < 0 && tick_index % span != 0 {
            start -= 1;
        }
        start * span
    }

    fn offset_of(&self, tick_index: i32, tick_spacing: u16) -> Result<usize, CoreError> {
        if tick_index % tick_spacing as i32 != 0 {
            return Err(CoreError::TickNotSpaced);
        }
        if TickArray::start_index_containing(tick_index, tick_spacing) != self.start_tick_index {
            return Err(CoreError::TickNotFound);
        }
        Ok(((tick_index - self.start_tick_index) / tick_spacing as i32) as usize)
    }

    pub fn get_tick(&self, tick_index: i32, tick_spacing: u16) -> Result<&Tick, CoreError> {
        let offset = self.offset_of(tick_index, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    pub fn get_tick_mut(&mut self, tick_index: i32, tick_spacing: u16) -> Result<&mut Tick, CoreError> {
        let offset = self.offset_of(tick_index, tick_spacing)?;
        Ok(&mut self.ticks[offset])
    }

    /// The first initialized tick in this array, scanning from one end.
    /// `a_to_b` scans from the high end downward (price decreasing).
    pub fn first_initialized_tick(&self, a_to_b: bool) -> Option<&Tick> {
        if a_to_b {
            self.ticks.iter().rev().find(|t| t.is_initialized())
        } else {
            self.ticks.iter().find(|t| t.is_initialized())
        }
    }

    /// Finds the next initialized tick strictly in the swap direction from
    /// `current_tick_index`, within this array only.
    pub fn next_initialized_tick(
        &self,
        current_tick_index: i32,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Result<Option<&Tick>, CoreError> {
        let array_start = TickArray::start_index_containing(current_tick_index, tick_spacing);
        if array_start != self.start_tick_index {
            return Ok(self.first_initialized_tick(a_to_b));
        }
        let is_start = array_start == current_tick_index;
        let mut offset = (current_tick_index - self.start_tick_index) / tick_spacing as i32;

        if a_to_b {
            if is_start {
                offset -= 1;
            }
            while offset >= 0 {
                let t = &self.ticks[offset as usize];
                if t.is_initialized() {
                    return Ok(Some(t));
                }
                offset -= 1;
            }
        } else {
            if is_start {
                offset += 1;
            }
            while offset < TICKS_PER_ARRAY {
                let t = &self.ticks[offset as usize];
                if t.is_initialized() {
                    return Ok(Some(t));
                }
                offset += 1;
            }
        }
        Ok(None)
    }

    /// The start index of the neighboring array in the swap direction.
    pub fn next_array_start_index(&self, tick_spacing: u16, a_to_b: bool) -> i32 {
        let span = tick_spacing as i32 * TICKS_PER_ARRAY;
        if a_to_b {
            self.start_tick_index - span
        } else {
            self.start_tick_index + span
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_index_aligns_to_spacing_times_array_size() {
        assert_eq!(TickArray::start_index_containing(100, 64), 0);
        assert_eq!(TickArray::start_index_containing(-1, 64), -64 * TICKS_PER_ARRAY);
        assert_eq!(TickArray::start_index_containing(64 * TICKS_PER_ARRAY, 64), 64 * TICKS_PER_ARRAY);
    }

    #[test]
    fn get_arrary_start_index_test() {
        // mirrors the teacher's own boundary checks for negative, zero-remainder ticks
        assert_eq!(TickArray::start_index_containing(0, 1), 0);
        assert_eq!(TickArray::start_index_containing(-88, 1), -88);
        assert_eq!(TickArray::start_index_containing(-89, 1), -176);
    }

    #[test]
    fn first_initialized_tick_test() {
        let mut arr = TickArray::new(0, 1).unwrap();
        arr.ticks[10].liquidity_gross = 5;
        arr.ticks[70].liquidity_gross = 7;
        assert_eq!(arr.first_initialized_tick(false).unwrap().tick, 10);
        assert_eq!(arr.first_initialized_tick(true).unwrap().tick, 70);
    }

    #[test]
    fn next_initialized_tick_scans_forward_and_backward() {
        let mut arr = TickArray::new(0, 1).unwrap();
        arr.ticks[10].liquidity_gross = 5;
        arr.ticks[70].liquidity_gross = 7;
        let next = arr.next_initialized_tick(0, 1, false).unwrap().unwrap();
        assert_eq!(next.tick, 10);
        let prev = arr.next_initialized_tick(87, 1, true).unwrap().unwrap();
        assert_eq!(prev.tick, 70);
    }

    #[test]
    fn offset_of_rejects_mismatched_array() {
        let arr = TickArray::new(0, 1).unwrap();
        assert_eq!(arr.get_tick(200, 1).unwrap_err(), CoreError::TickNotFound);
    }
}
