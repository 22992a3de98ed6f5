//! Display-only rotation dial. Has no effect on access or portal state.

use std::fmt;

pub const ROTATION_STEP_DEGREES: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationEvent {
    RotatedLeft,
    RotatedRight,
    SnappedNorth,
}

impl fmt::Display for OrientationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RotatedLeft => f.write_str("Rotated gate left"),
            Self::RotatedRight => f.write_str("Rotated gate right"),
            Self::SnappedNorth => f.write_str("Snapped to True North"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Orientation {
    raw_degrees: i32,
}

impl Orientation {
    pub fn rotate_left(&mut self) -> OrientationEvent {
        self.raw_degrees = self.raw_degrees.saturating_sub(ROTATION_STEP_DEGREES);
        OrientationEvent::RotatedLeft
    }

    pub fn rotate_right(&mut self) -> OrientationEvent {
        self.raw_degrees = self.raw_degrees.saturating_add(ROTATION_STEP_DEGREES);
        OrientationEvent::RotatedRight
    }

    pub fn snap_north(&mut self) -> OrientationEvent {
        self.raw_degrees = 0;
        OrientationEvent::SnappedNorth
    }

    /// Accumulated rotation, unbounded in either direction.
    #[must_use]
    pub fn raw_degrees(self) -> i32 {
        self.raw_degrees
    }

    /// Rotation normalized into `0..360`.
    #[must_use]
    pub fn degrees(self) -> u16 {
        self.raw_degrees.rem_euclid(360) as u16
    }
}
