//! RNG seed derivation for deterministic dealing.

/// Derive the shuffle seed for one hand from the table's base seed.
///
/// Same table seed and hand number always give the same deck, which makes a
/// hand reproducible bit-for-bit from stored state.
pub fn derive_hand_seed(table_seed: i64, hand_no: i32) -> u64 {
    // Sign is irrelevant for seeding.
    let base = table_seed as u64;
    base.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((hand_no as u64).wrapping_mul(1_000_003))
        .wrapping_add(2)
}
