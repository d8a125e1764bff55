use std::fmt;
use std::str::FromStr;

/// Chains the service can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedChain {
    Arbitrum,
    ArbitrumSepolia,
}

impl SupportedChain {
    pub const ALL: [SupportedChain; 2] = [Self::Arbitrum, Self::ArbitrumSepolia];

    pub fn id(&self) -> u64 {
        match self {
            Self::Arbitrum => 42161,
            Self::ArbitrumSepolia => 421614,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Arbitrum => "arbitrum",
            Self::ArbitrumSepolia => "arbitrum-sepolia",
        }
    }

    /// Public endpoint used when no RPC URL is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Arbitrum => "https://arb1.arbitrum.io/rpc",
            Self::ArbitrumSepolia => "https://sepolia-rollup.arbitrum.io/rpc",
        }
    }
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

impl FromStr for SupportedChain {
    type Err = String;

    /// Accepts a chain name or its numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s) || c.id().to_string() == s)
            .ok_or_else(|| format!("unsupported chain '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_ids() {
        assert_eq!("arbitrum".parse(), Ok(SupportedChain::Arbitrum));
        assert_eq!("42161".parse(), Ok(SupportedChain::Arbitrum));
        assert_eq!(" Arbitrum-Sepolia ".parse(), Ok(SupportedChain::ArbitrumSepolia));
        assert_eq!("421614".parse(), Ok(SupportedChain::ArbitrumSepolia));
        assert!("mainnet".parse::<SupportedChain>().is_err());
    }
}
