use rand::Rng;

/// Minimum block length for the stationary block bootstrap.
const MIN_BLOCK_SIZE: usize = 3;

/// Correlated single-index bootstrap: for each simulated year, draw one
/// historical year index shared across every asset, so the per-year
/// cross-asset relationship in the historical data is preserved exactly.
/// `history_len` is `min_i L_i` across the portfolio's assets.
pub fn simple_bootstrap_indices<R: Rng + ?Sized>(
    rng: &mut R,
    history_len: usize,
    horizon_years: usize,
) -> Vec<usize> {
    (0..horizon_years)
        .map(|_| rng.gen_range(0..history_len))
        .collect()
}

/// Resolves the block length for the stationary block bootstrap: the
/// configured value (floored at `MIN_BLOCK_SIZE`) if present, otherwise
/// `clamp(round(L^(1/3)), 3, floor(L/4))`.
pub fn resolve_block_size(history_len: usize, configured: Option<usize>) -> usize {
    if let Some(b) = configured {
        return b.max(MIN_BLOCK_SIZE);
    }
    let auto = (history_len as f64).cbrt().round() as usize;
    let upper = (history_len / 4).max(MIN_BLOCK_SIZE);
    auto.clamp(MIN_BLOCK_SIZE, upper)
}

/// Correlated block (stationary) bootstrap: repeatedly draws a starting
/// index and emits the shared block `[s, s+b)` across all assets, until
/// `horizon_years` indices have been produced. The final block is
/// truncated to the remaining length.
pub fn block_bootstrap_indices<R: Rng + ?Sized>(
    rng: &mut R,
    history_len: usize,
    horizon_years: usize,
    block_size: usize,
) -> Vec<usize> {
    let b = block_size.min(history_len).max(1);
    let mut out = Vec::with_capacity(horizon_years);
    while out.len() < horizon_years {
        let max_start = history_len.saturating_sub(b);
        let start = if max_start == 0 { 0 } else { rng.gen_range(0..=max_start) };
        let remaining = horizon_years - out.len();
        let take = b.min(remaining);
        out.extend(start..start + take);
    }
    out
}
