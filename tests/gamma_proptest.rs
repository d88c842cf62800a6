//! Property-based tests for the gamma table.
//! Every entry must equal the exact `floor((i / 255)^gamma * (2^dst - 1))`.

use hub75_bcm::GammaTable;

/// Exact table entry for an integer exponent, in integer arithmetic.
fn exact(i: u8, gamma: u32, dst_bits: u8) -> u16 {
    let dst_max = (1u128 << dst_bits) - 1;
    let num = u128::from(i).pow(gamma) * dst_max;
    let den = 255u128.pow(gamma);
    (num / den) as u16
}

proptest::proptest! {
    /// Float evaluation agrees with exact integer floor for every entry.
    #[test]
    fn matches_exact_floor(
        gamma in proptest::sample::select(vec![1u32, 3, 4, 5]),
        dst_bits in 1u8..=16u8,
    ) {
        let table = GammaTable::new(f64::from(gamma), 8, dst_bits);
        for i in 0..=255u8 {
            assert_eq!(
                table.lookup(i),
                exact(i, gamma, dst_bits),
                "gamma {} dst {} entry {}", gamma, dst_bits, i
            );
        }
    }

    /// Entries never decrease and span the full output range.
    #[test]
    fn monotone_with_fixed_endpoints(gamma in 0.1f64..8.0, dst_bits in 1u8..=16u8) {
        let table = GammaTable::new(gamma, 8, dst_bits);
        let entries = table.entries();
        assert_eq!(entries[0], 0);
        assert_eq!(entries[255], ((1u32 << dst_bits) - 1) as u16);
        for pair in entries.windows(2) {
            assert!(pair[0] <= pair[1], "gamma {} dst {}: {:?}", gamma, dst_bits, pair);
        }
    }

    /// No entry uses bits above the output width.
    #[test]
    fn bits_above_width_are_clear(
        gamma in 0.5f64..6.0,
        dst_bits in 1u8..=15u8,
        value in 0u8..=255u8,
    ) {
        let table = GammaTable::new(gamma, 8, dst_bits);
        assert!(table.lookup(value) < (1u16 << dst_bits));
        for plane in dst_bits..=16 {
            assert!(!table.bit(value, plane));
        }
    }
}

#[test]
fn reference_table() {
    let table = GammaTable::reference();
    assert_eq!(table.src_bits(), 8);
    assert_eq!(table.dst_bits(), 12);
    for i in 0..=255u8 {
        assert_eq!(table.lookup(i), exact(i, 5, 12));
    }
}
