//! Gamma correction lookup.
//!
//! LED brightness is far from linear in the drive duty cycle as perceived by
//! the eye, so 8-bit source intensities are mapped through
//! `out = floor((in / in_max)^gamma * out_max)` into a wider intensity that
//! the bit-planes then display. The table is built once and only read
//! afterwards.

/// Number of entries for an 8-bit source.
pub const GAMMA_ENTRIES: usize = 256;

/// Precomputed gamma lookup table.
#[derive(Clone, PartialEq, Eq)]
pub struct GammaTable {
    entries: [u16; GAMMA_ENTRIES],
    src_bits: u8,
    dst_bits: u8,
}

impl GammaTable {
    /// Build a table mapping `src_bits` wide intensities to `dst_bits` wide
    /// ones.
    ///
    /// # Panics
    /// If `src_bits` is not in `1..=8` or `dst_bits` is not in `1..=16`.
    pub fn new(gamma: f64, src_bits: u8, dst_bits: u8) -> Self {
        assert!((1..=8).contains(&src_bits));
        assert!((1..=16).contains(&dst_bits));

        let src_max = ((1u32 << src_bits) - 1) as f64;
        let dst_max = ((1u32 << dst_bits) - 1) as f64;
        let mut entries = [0u16; GAMMA_ENTRIES];
        for (i, entry) in entries.iter_mut().take(1 << src_bits).enumerate() {
            let linear = i as f64 / src_max;
            // truncation of a non-negative value is floor
            *entry = (libm::pow(linear, gamma) * dst_max) as u16;
            trace!("gamma {} -> {}", i, *entry);
        }

        Self {
            entries,
            src_bits,
            dst_bits,
        }
    }

    /// 8-bit in, 12-bit out, gamma 5.
    pub fn reference() -> Self {
        Self::new(5.0, 8, 12)
    }

    /// Gamma corrected intensity. Values wider than `src_bits` map to 0.
    #[inline]
    pub fn lookup(&self, value: u8) -> u16 {
        self.entries[value as usize]
    }

    /// Bit `plane` of the corrected intensity.
    #[inline]
    pub fn bit(&self, value: u8, plane: u8) -> bool {
        u32::from(self.lookup(value))
            .checked_shr(u32::from(plane))
            .is_some_and(|v| v & 1 != 0)
    }

    pub fn entries(&self) -> &[u16] {
        &self.entries[..1 << self.src_bits]
    }

    pub fn src_bits(&self) -> u8 {
        self.src_bits
    }

    pub fn dst_bits(&self) -> u8 {
        self.dst_bits
    }
}

impl core::fmt::Debug for GammaTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GammaTable")
            .field("src_bits", &self.src_bits)
            .field("dst_bits", &self.dst_bits)
            .field("max", &self.entries().last())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GammaTable {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "GammaTable<{}, {}> max: {}",
            self.src_bits,
            self.dst_bits,
            self.entries().last()
        );
    }
}
