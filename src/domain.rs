//! Variable domains: either a single fixed value count `P` shared by every
//! variable, or a per-variable vector of domain sizes (mixed-domain MDDs).

/// The set of values a variable's sons array may be indexed by.
///
/// `spec.md` §3 calls this `D : {0..n-1} -> N>=2`, constant `P` in fixed
/// mode. We keep both representations explicit instead of always paying for
/// a `Vec<u32>` lookup, mirroring the source's compile-time `degree`
/// parameter (`SPEC_FULL.md` §F, `domain`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Every variable has the same domain size `P`.
    Fixed(u32),
    /// Variable `i` has domain size `sizes[i]`.
    Mixed(Vec<u32>),
}

impl Domain {
    /// Domain size of variable `i`.
    pub fn size(&self, index: u32) -> u32 {
        match self {
            Domain::Fixed(p) => *p,
            Domain::Mixed(sizes) => sizes[index as usize],
        }
    }

    /// The largest domain size across all variables, used to size the
    /// terminal value space in mixed mode (`spec.md` §3: terminals carry a
    /// value in `{0..P-1}` fixed, or `{0..max(Di)-1}` mixed).
    pub fn max_size(&self) -> u32 {
        match self {
            Domain::Fixed(p) => *p,
            Domain::Mixed(sizes) => sizes.iter().copied().max().unwrap_or(0),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Domain::Fixed(2))
    }
}
