use std::fmt;
use std::str::FromStr;

/// How a multi-item aggregate is written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Best-effort batched write. Not atomic across items: a failure can leave
    /// some records written. Leftover items are reported as a partial write.
    #[default]
    Batch,
    /// All-or-nothing transactional write, bounded by the store's item limit.
    Transactional,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Transactional => "transactional",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "transactional" | "transaction" => Ok(Self::Transactional),
            other => Err(format!("Unknown write mode: {other}")),
        }
    }
}

/// What a partition read does with a record it cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedItemPolicy {
    /// Abort the read with `InvalidData`.
    #[default]
    Fail,
    /// Drop the record, log it and keep going.
    SkipAndLog,
}

impl MalformedItemPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::SkipAndLog => "skip",
        }
    }
}

impl fmt::Display for MalformedItemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MalformedItemPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" | "skip_and_log" => Ok(Self::SkipAndLog),
            other => Err(format!("Unknown malformed item policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_mode_parse() {
        assert_eq!("batch".parse::<WriteMode>(), Ok(WriteMode::Batch));
        assert_eq!(
            " Transactional ".parse::<WriteMode>(),
            Ok(WriteMode::Transactional)
        );
        assert!("atomic".parse::<WriteMode>().is_err());
        assert_eq!(WriteMode::default(), WriteMode::Batch);
    }

    #[test]
    fn test_malformed_item_policy_parse() {
        assert_eq!("fail".parse::<MalformedItemPolicy>(), Ok(MalformedItemPolicy::Fail));
        assert_eq!(
            "SKIP".parse::<MalformedItemPolicy>(),
            Ok(MalformedItemPolicy::SkipAndLog)
        );
        assert!("ignore".parse::<MalformedItemPolicy>().is_err());
        assert_eq!(MalformedItemPolicy::default(), MalformedItemPolicy::Fail);
    }

    #[test]
    fn test_display_matches_parse() {
        for mode in [WriteMode::Batch, WriteMode::Transactional] {
            assert_eq!(mode.to_string().parse::<WriteMode>(), Ok(mode));
        }
        for policy in [MalformedItemPolicy::Fail, MalformedItemPolicy::SkipAndLog] {
            assert_eq!(policy.to_string().parse::<MalformedItemPolicy>(), Ok(policy));
        }
    }
}
