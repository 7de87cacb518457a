//! Stroke counting against par.

use crate::LoadedCourse;
use std::ops::RangeInclusive;

pub const HOLES: u32 = 18;

/// Strokes per hole, 1 through 18. Zero means not yet played.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scorecard {
    strokes: [u32; HOLES as usize],
}

/// Strokes over a run of holes and, when every scored hole has a par,
/// the score relative to par.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub strokes: u32,
    pub to_par: Option<i64>,
}

impl Tally {
    /// Blank until something has been scored.
    pub fn to_par_label(&self) -> String {
        match (self.strokes, self.to_par) {
            (0, _) | (_, None) => String::new(),
            (_, Some(to_par)) => format_to_par(to_par),
        }
    }
}

impl Scorecard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self, hole: u32) -> Option<u32> {
        index(hole).map(|i| self.strokes[i])
    }

    /// Sets a hole's strokes.
    pub fn set(&mut self, hole: u32, strokes: u32) -> Option<u32> {
        let i = index(hole)?;
        self.strokes[i] = strokes;
        Some(strokes)
    }

    /// Adds `delta` strokes to `hole`, never going below zero. Returns
    /// the new count, or `None` for a hole not on the card.
    pub fn adjust(&mut self, hole: u32, delta: i64) -> Option<u32> {
        let i = index(hole)?;
        let updated = (i64::from(self.strokes[i]) + delta).max(0);
        self.strokes[i] = u32::try_from(updated).unwrap_or(u32::MAX);
        Some(self.strokes[i])
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Holes 1 to 9.
    pub fn out(&self, course: &LoadedCourse) -> Tally {
        self.tally(1..=9, course)
    }

    /// Holes 10 to 18.
    pub fn inn(&self, course: &LoadedCourse) -> Tally {
        self.tally(10..=18, course)
    }

    pub fn total(&self, course: &LoadedCourse) -> Tally {
        self.tally(1..=HOLES, course)
    }

    fn tally(&self, holes: RangeInclusive<u32>, course: &LoadedCourse) -> Tally {
        let mut strokes = 0;
        let mut to_par = Some(0_i64);
        for hole in holes {
            let played = self.strokes(hole).unwrap_or(0);
            strokes += played;
            if played > 0 {
                to_par = match (to_par, course.par(hole)) {
                    (Some(sum), Some(par)) => Some(sum + i64::from(played) - i64::from(par)),
                    _ => None,
                };
            }
        }
        Tally { strokes, to_par }
    }
}

fn index(hole: u32) -> Option<usize> {
    (1..=HOLES).contains(&hole).then(|| (hole - 1) as usize)
}

/// `E` for even, otherwise a signed count.
pub fn format_to_par(to_par: i64) -> String {
    match to_par {
        0 => "E".to_owned(),
        n if n > 0 => format!("+{n}"),
        n => n.to_string(),
    }
}
