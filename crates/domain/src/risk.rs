/// Risk band derived from `score` by the fixed bands in §4.6.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
    Extreme,
}

impl RiskLevel {
    /// Bands are contractual (§8, P5): `>=80 Low, >=60 Medium, >=40 High,
    /// >=20 VeryHigh, else Extreme`.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=100 => Self::Low,
            60..=79 => Self::Medium,
            40..=59 => Self::High,
            20..=39 => Self::VeryHigh,
            _ => Self::Extreme,
        }
    }
}

/// One contribution to a [`RiskVerdict`]'s score, kept for explainability.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub impact: i32,
    pub passed: bool,
    pub description: String,
}

/// `score` is guaranteed in `[0, 100]` and `level` is always the band
/// `RiskLevel::from_score(score)` would produce (P5), except for the
/// honeypot override which is asserted separately.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskVerdict {
    pub score: u8,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl RiskVerdict {
    pub fn is_honeypot_override(&self) -> bool {
        self.score == 0 && self.level == RiskLevel::Extreme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, RiskLevel::Low)]
    #[case(80, RiskLevel::Low)]
    #[case(79, RiskLevel::Medium)]
    #[case(60, RiskLevel::Medium)]
    #[case(59, RiskLevel::High)]
    #[case(40, RiskLevel::High)]
    #[case(39, RiskLevel::VeryHigh)]
    #[case(20, RiskLevel::VeryHigh)]
    #[case(19, RiskLevel::Extreme)]
    #[case(0, RiskLevel::Extreme)]
    fn bands_match_spec(#[case] score: u8, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_score(score), expected);
    }
}
