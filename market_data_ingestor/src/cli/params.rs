use crate::models::pair::{PairError, TradingPair, default_pairs};

/// The requested pairs, or the default list when none were given.
/// Duplicates are dropped, first occurrence wins.
pub fn resolve_pairs(requested: Vec<TradingPair>) -> Result<Vec<TradingPair>, PairError> {
    let pairs = if requested.is_empty() {
        default_pairs()?
    } else {
        requested
    };
    let mut unique: Vec<TradingPair> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        if !unique.contains(&pair) {
            unique.push(pair);
        }
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_requested() {
        let pairs = resolve_pairs(vec![]).unwrap();
        assert_eq!(pairs.len(), 9);
        assert_eq!(pairs[0].to_string(), "BTC/USDT");
        assert_eq!(pairs[8].to_string(), "MATIC/USDT");
    }

    #[test]
    fn requested_pairs_are_deduplicated() {
        let requested = vec![
            "eth/usdt".parse().unwrap(),
            "BTC/USDT".parse().unwrap(),
            "ETH/USDT".parse().unwrap(),
        ];
        let pairs = resolve_pairs(requested).unwrap();
        let names: Vec<String> = pairs.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["ETH/USDT", "BTC/USDT"]);
    }
}
