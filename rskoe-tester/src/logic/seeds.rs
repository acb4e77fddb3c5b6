use anyhow::{Context, Result, bail};

/// Parse CLI seed tokens: decimal or `0x`-prefixed hex.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    if tokens.is_empty() {
        bail!("at least one seed is required");
    }
    tokens
        .iter()
        .map(|token| {
            let token = token.trim();
            let parsed = match token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => token.parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}
