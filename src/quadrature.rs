//! Table-driven quadrature decoding.
//!
//! A rotary encoder drives two pins, A and B, a quarter period apart. Every
//! edge on either pin produces a new 2-bit sample `(A << 1) | B`. The decoder
//! keeps the previous sample next to the current one in a 4-bit history
//! register and looks the history up in a 16-entry table of direction
//! increments.
//!
//! ```text
//! history = (previous << 2) | current
//!
//! forward:  00 -> 01 -> 11 -> 10 -> 00
//! reverse:  00 -> 10 -> 11 -> 01 -> 00
//! ```
//!
//! Identity codes (`0000`, `0101`, `1010`, `1111`) and the four double-step
//! skips (`0011`, `0110`, `1001`, `1100`) always decode to zero. A glitch that
//! swallows an intermediate code is therefore under-counted, never guessed.
//!
//! # Resolution
//!
//! [`StepResolution::PerDetent`] counts one tick per full cycle, on the step
//! that returns the encoder to rest at `00`. [`StepResolution::PerEdge`]
//! counts every legal single step, four ticks per cycle.
//!
//! # Example
//!
//! ```
//! use wled_knobs::quadrature::{EncoderSample, QuadratureDecoder};
//!
//! let mut decoder = QuadratureDecoder::new();
//! let forward = [0b01, 0b11, 0b10, 0b00];
//!
//! let total: i32 = forward
//!     .iter()
//!     .map(|&code| decoder.step(EncoderSample::from_code(code)) as i32)
//!     .sum();
//! assert_eq!(total, 1);
//! ```

/// One tick per detent: only the steps that come back to rest count.
///
/// `10 -> 00` closes a forward cycle, `01 -> 00` closes a reverse cycle.
#[rustfmt::skip]
pub const DETENT_TABLE: [i8; 16] = [
    // prev=00: 00, 01, 10, 11
    0, 0, 0, 0,
    // prev=01: 00, 01, 10, 11
    -1, 0, 0, 0,
    // prev=10: 00, 01, 10, 11
    1, 0, 0, 0,
    // prev=11: 00, 01, 10, 11
    0, 0, 0, 0,
];

/// One tick per legal single step.
#[rustfmt::skip]
pub const EDGE_TABLE: [i8; 16] = [
    // prev=00: 00, 01, 10, 11
    0, 1, -1, 0,
    // prev=01: 00, 01, 10, 11
    -1, 0, 0, 1,
    // prev=10: 00, 01, 10, 11
    1, 0, 0, -1,
    // prev=11: 00, 01, 10, 11
    0, -1, 1, 0,
];

/// Sampled level of both encoder pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EncoderSample {
    /// Level of pin A.
    pub a: bool,
    /// Level of pin B.
    pub b: bool,
}

impl EncoderSample {
    /// Creates a sample from pin levels.
    #[inline]
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// Creates a sample from a 2-bit code `(A << 1) | B`.
    ///
    /// Bits above the lowest two are ignored.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        Self {
            a: code & 0b10 != 0,
            b: code & 0b01 != 0,
        }
    }

    /// Returns the 2-bit code `(A << 1) | B`.
    #[inline]
    pub const fn code(self) -> u8 {
        ((self.a as u8) << 1) | self.b as u8
    }
}

/// Which physical rotation counts as positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Polarity {
    /// `00 -> 01 -> 11 -> 10 -> 00` is positive.
    #[default]
    Normal,
    /// `00 -> 10 -> 11 -> 01 -> 00` is positive.
    Inverted,
}

impl Polarity {
    #[inline]
    const fn apply(self, step: i8) -> i8 {
        match self {
            Polarity::Normal => step,
            Polarity::Inverted => -step,
        }
    }
}

/// How many ticks one detent cycle produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StepResolution {
    /// One tick per full cycle ([`DETENT_TABLE`]).
    #[default]
    PerDetent,
    /// One tick per legal edge ([`EDGE_TABLE`]).
    PerEdge,
}

impl StepResolution {
    /// The transition table for this resolution.
    #[inline]
    pub const fn table(self) -> &'static [i8; 16] {
        match self {
            StepResolution::PerDetent => &DETENT_TABLE,
            StepResolution::PerEdge => &EDGE_TABLE,
        }
    }
}

/// Per-channel quadrature state machine.
///
/// Holds nothing but the 4-bit history register plus its fixed configuration,
/// so it is `Copy` and fits in a `critical_section::Mutex<Cell<_>>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadratureDecoder {
    history: u8,
    polarity: Polarity,
    resolution: StepResolution,
}

impl QuadratureDecoder {
    /// Decoder at rest (`00`) with normal polarity and detent resolution.
    pub const fn new() -> Self {
        Self::with_config(Polarity::Normal, StepResolution::PerDetent)
    }

    /// Decoder at rest with the given wiring convention and resolution.
    pub const fn with_config(polarity: Polarity, resolution: StepResolution) -> Self {
        Self {
            history: 0,
            polarity,
            resolution,
        }
    }

    /// Shifts a new sample into the history register and returns the
    /// direction increment for the resulting transition.
    ///
    /// Constant time, no branches on history contents; safe to call from an
    /// interrupt handler.
    #[inline]
    pub fn step(&mut self, sample: EncoderSample) -> i8 {
        self.history = ((self.history << 2) | sample.code()) & 0x0F;
        self.polarity.apply(self.resolution.table()[self.history as usize])
    }

    /// Current 4-bit history (previous sample high, current sample low).
    #[inline]
    pub const fn history(&self) -> u8 {
        self.history
    }

    /// Most recent sample.
    #[inline]
    pub const fn last_sample(&self) -> EncoderSample {
        EncoderSample::from_code(self.history & 0b11)
    }

    /// Configured wiring convention.
    #[inline]
    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Configured resolution.
    #[inline]
    pub const fn resolution(&self) -> StepResolution {
        self.resolution
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: [usize; 4] = [0b0000, 0b0101, 0b1010, 0b1111];
    const SKIPS: [usize; 4] = [0b0011, 0b0110, 0b1001, 0b1100];

    fn run(decoder: &mut QuadratureDecoder, codes: &[u8]) -> i32 {
        codes
            .iter()
            .map(|&c| decoder.step(EncoderSample::from_code(c)) as i32)
            .sum()
    }

    // =========================================================================
    // Table shape
    // =========================================================================

    #[test]
    fn detent_table_has_exactly_two_nonzero_entries() {
        let nonzero: usize = DETENT_TABLE.iter().filter(|v| **v != 0).count();
        assert_eq!(nonzero, 2);
        assert_eq!(DETENT_TABLE[0b1000], 1);
        assert_eq!(DETENT_TABLE[0b0100], -1);
    }

    #[test]
    fn identity_and_skip_codes_are_zero_in_both_tables() {
        for table in [&DETENT_TABLE, &EDGE_TABLE] {
            for idx in IDENTITY.iter().chain(SKIPS.iter()) {
                assert_eq!(table[*idx], 0, "history {idx:04b}");
            }
        }
    }

    #[test]
    fn edge_table_is_antisymmetric() {
        // Reversing a legal step flips its sign.
        for prev in 0..4usize {
            for cur in 0..4usize {
                let fwd = EDGE_TABLE[(prev << 2) | cur];
                let back = EDGE_TABLE[(cur << 2) | prev];
                assert_eq!(fwd, -back);
            }
        }
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    #[test]
    fn forward_cycle_per_detent() {
        let mut decoder = QuadratureDecoder::new();
        assert_eq!(run(&mut decoder, &[0b01, 0b11, 0b10, 0b00]), 1);
    }

    #[test]
    fn reverse_cycle_per_detent() {
        let mut decoder = QuadratureDecoder::new();
        assert_eq!(run(&mut decoder, &[0b10, 0b11, 0b01, 0b00]), -1);
    }

    #[test]
    fn forward_cycle_per_edge() {
        let mut decoder = QuadratureDecoder::with_config(Polarity::Normal, StepResolution::PerEdge);
        assert_eq!(run(&mut decoder, &[0b01, 0b11, 0b10, 0b00]), 4);
    }

    #[test]
    fn inverted_polarity_flips_sign() {
        let mut decoder =
            QuadratureDecoder::with_config(Polarity::Inverted, StepResolution::PerDetent);
        assert_eq!(run(&mut decoder, &[0b01, 0b11, 0b10, 0b00]), -1);
    }

    #[test]
    fn repeated_code_is_idempotent() {
        let mut decoder = QuadratureDecoder::new();
        run(&mut decoder, &[0b01, 0b11, 0b10, 0b00]);
        assert_eq!(run(&mut decoder, &[0b00, 0b00, 0b00]), 0);
        assert_eq!(decoder.history(), 0b0000);
    }

    #[test]
    fn skipped_intermediate_code_contributes_zero() {
        let mut decoder = QuadratureDecoder::with_config(Polarity::Normal, StepResolution::PerEdge);
        // 00 -> 11 skips 01
        assert_eq!(decoder.step(EncoderSample::from_code(0b11)), 0);
    }

    #[test]
    fn history_register_keeps_four_bits() {
        let mut decoder = QuadratureDecoder::new();
        decoder.step(EncoderSample::from_code(0b01));
        decoder.step(EncoderSample::from_code(0b11));
        assert_eq!(decoder.history(), 0b0111);
        decoder.step(EncoderSample::from_code(0b10));
        assert_eq!(decoder.history(), 0b1110);
        assert_eq!(decoder.last_sample(), EncoderSample::new(true, false));
    }

    #[test]
    fn sample_code_round_trip() {
        for code in 0..4u8 {
            assert_eq!(EncoderSample::from_code(code).code(), code);
        }
        assert_eq!(EncoderSample::from_code(0b111).code(), 0b11);
    }
}
