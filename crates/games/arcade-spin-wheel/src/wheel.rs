//! Wheel layout and landing geometry.

/// Angle of the pointer, in wheel degrees (12 o'clock).
pub const POINTER_ANGLE: f32 = 270.0;

/// Whole turns every spin covers before settling.
pub const MIN_TURNS: f32 = 5.0;

/// How far short of the landing angle the fast phase stops.
pub const UNDERSHOOT: f32 = 30.0;

/// Landing jitter as a fraction of the segment width, centred on the segment.
pub const JITTER_SPAN: f32 = 0.8;

/// What a wheel segment pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    Chocolate,
    Dare,
    Jackpot,
    TryAgain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub label: &'static str,
    pub payout: Payout,
}

pub const SEGMENTS: [Segment; 6] = [
    Segment {
        label: "CHOCOLATE",
        payout: Payout::Chocolate,
    },
    Segment {
        label: "DARE 1",
        payout: Payout::Dare,
    },
    Segment {
        label: "DARE 2",
        payout: Payout::Dare,
    },
    Segment {
        label: "JACKPOT",
        payout: Payout::Jackpot,
    },
    Segment {
        label: "DARE 3",
        payout: Payout::Dare,
    },
    Segment {
        label: "TRY AGAIN",
        payout: Payout::TryAgain,
    },
];

pub fn segment_angle() -> f32 {
    360.0 / SEGMENTS.len() as f32
}

/// Absolute rotation that puts segment `index` under the pointer.
///
/// `jitter` is in `[-0.5, 0.5]` and shifts the landing within the segment.
/// The result is always at least [`MIN_TURNS`] full turns past `last`.
pub fn landing_rotation(last: f32, index: usize, jitter: f32) -> f32 {
    let width = segment_angle();
    let centre = index as f32 * width + width / 2.0;
    let target = (POINTER_ANGLE - centre + jitter.clamp(-0.5, 0.5) * width * JITTER_SPAN)
        .rem_euclid(360.0);
    let base = last + 360.0 * MIN_TURNS;
    let diff = (target - base.rem_euclid(360.0)).rem_euclid(360.0);
    base + diff
}

/// Index of the segment sitting under the pointer at `rotation`.
pub fn segment_under_pointer(rotation: f32) -> usize {
    let angle = (POINTER_ANGLE - rotation).rem_euclid(360.0);
    ((angle / segment_angle()) as usize).min(SEGMENTS.len() - 1)
}
