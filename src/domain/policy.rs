use serde::Deserialize;

/// What a read does when the refresh it triggered fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Serve the last good values and emit `refreshError`, unless the cache
    /// was never populated
    #[default]
    FailSoft,
    /// Always return the refresh error to the reader
    FailHard,
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackPolicy::FailSoft => write!(f, "fail_soft"),
            FallbackPolicy::FailHard => write!(f, "fail_hard"),
        }
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = crate::domain::CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail_soft" | "failsoft" | "soft" => Ok(FallbackPolicy::FailSoft),
            "fail_hard" | "failhard" | "hard" => Ok(FallbackPolicy::FailHard),
            _ => Err(crate::domain::CacheError::invalid_argument(format!(
                "Unknown fallback policy: {}. Valid policies: fail_soft, fail_hard",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fail_soft() {
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::FailSoft);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("fail_hard".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::FailHard);
        assert_eq!("Soft".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::FailSoft);
        assert!("retry".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn test_deserialize_policy() {
        let policy: FallbackPolicy = serde_json::from_str("\"fail_hard\"").unwrap();
        assert_eq!(policy, FallbackPolicy::FailHard);
    }
}
