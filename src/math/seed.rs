//! Stable seed derivation.
//!
//! Derived seeds are fixed functions of their inputs, identical on every
//! platform and toolchain. FNV-1a folds names into 64 bits; SplitMix64
//! finalizes the combined value so nearby inputs give unrelated seeds.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the UTF-8 bytes of `name`.
pub fn fnv1a(name: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// One SplitMix64 step applied to `x`.
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed for the sub-stream `salt` of `seed`.
pub fn derive_seed(seed: u64, salt: u64) -> u64 {
    splitmix64(splitmix64(seed) ^ salt)
}
