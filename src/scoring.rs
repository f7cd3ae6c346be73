//! Severity bands for the three screening instruments and the composite risk.
//!
//! Every function here is total over `i32`. A score outside an instrument's
//! range still lands in a band: anything above the last threshold is the most
//! severe band, anything at or below zero is `Minimal` / `Low Risk`.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

macro_rules! labelled {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StoreError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(StoreError::UnknownLabel(other.to_string())),
                }
            }
        }
    };
}

labelled!(PhqCategory {
    Minimal => "Minimal",
    Mild => "Mild",
    Moderate => "Moderate",
    ModeratelySevere => "Moderately Severe",
    Severe => "Severe",
});

labelled!(GadCategory {
    Minimal => "Minimal",
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

labelled!(GhqCategory {
    Minimal => "Minimal",
    Mild => "Mild",
    Moderate => "Moderate",
});

labelled!(RiskLevel {
    Low => "Low Risk",
    Moderate => "Moderate Risk",
    High => "High Risk",
});

/// PHQ-9, 0..=27
pub fn phq_category(score: i32) -> PhqCategory {
    match score {
        s if s <= 4 => PhqCategory::Minimal,
        s if s <= 9 => PhqCategory::Mild,
        s if s <= 14 => PhqCategory::Moderate,
        s if s <= 19 => PhqCategory::ModeratelySevere,
        _ => PhqCategory::Severe,
    }
}

/// GAD-7, 0..=21
pub fn gad_category(score: i32) -> GadCategory {
    match score {
        s if s <= 4 => GadCategory::Minimal,
        s if s <= 9 => GadCategory::Mild,
        s if s <= 14 => GadCategory::Moderate,
        _ => GadCategory::Severe,
    }
}

/// GHQ (four selected items), 0..=12
pub fn ghq_category(score: i32) -> GhqCategory {
    match score {
        s if s <= 4 => GhqCategory::Minimal,
        s if s <= 8 => GhqCategory::Mild,
        _ => GhqCategory::Moderate,
    }
}

/// Bucket for the plain sum of the three sub-scores.
///
/// The instruments have different maxima (27, 21, 12) and are not
/// normalised before summing.
pub fn composite_risk(total: i32) -> RiskLevel {
    match total {
        t if t < 20 => RiskLevel::Low,
        t if t <= 40 => RiskLevel::Moderate,
        _ => RiskLevel::High,
    }
}

/// Sub-scores of one completed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores {
    pub phq: i32,
    pub gad: i32,
    pub ghq: i32,
}

impl Scores {
    pub fn composite(&self) -> i32 {
        self.phq + self.gad + self.ghq
    }

    pub fn phq_category(&self) -> PhqCategory {
        phq_category(self.phq)
    }

    pub fn gad_category(&self) -> GadCategory {
        gad_category(self.gad)
    }

    pub fn ghq_category(&self) -> GhqCategory {
        ghq_category(self.ghq)
    }

    pub fn risk(&self) -> RiskLevel {
        composite_risk(self.composite())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_phq_boundaries() {
        assert_eq!(phq_category(0), PhqCategory::Minimal);
        assert_eq!(phq_category(4), PhqCategory::Minimal);
        assert_eq!(phq_category(5), PhqCategory::Mild);
        assert_eq!(phq_category(9), PhqCategory::Mild);
        assert_eq!(phq_category(10), PhqCategory::Moderate);
        assert_eq!(phq_category(14), PhqCategory::Moderate);
        assert_eq!(phq_category(15), PhqCategory::ModeratelySevere);
        assert_eq!(phq_category(19), PhqCategory::ModeratelySevere);
        assert_eq!(phq_category(20), PhqCategory::Severe);
        assert_eq!(phq_category(27), PhqCategory::Severe);
    }

    #[test]
    fn test_phq_is_monotonic() {
        let bands = (-5..=40).map(phq_category).collect::<Vec<_>>();
        assert!(bands.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_gad_boundaries() {
        assert_eq!(gad_category(0), GadCategory::Minimal);
        assert_eq!(gad_category(4), GadCategory::Minimal);
        assert_eq!(gad_category(5), GadCategory::Mild);
        assert_eq!(gad_category(9), GadCategory::Mild);
        assert_eq!(gad_category(10), GadCategory::Moderate);
        assert_eq!(gad_category(14), GadCategory::Moderate);
        assert_eq!(gad_category(15), GadCategory::Severe);
        assert_eq!(gad_category(21), GadCategory::Severe);
    }

    #[test]
    fn test_ghq_boundaries() {
        assert_eq!(ghq_category(4), GhqCategory::Minimal);
        assert_eq!(ghq_category(5), GhqCategory::Mild);
        assert_eq!(ghq_category(8), GhqCategory::Mild);
        assert_eq!(ghq_category(9), GhqCategory::Moderate);
    }

    #[test]
    fn test_composite_risk() {
        assert_eq!(composite_risk(0), RiskLevel::Low);
        assert_eq!(composite_risk(19), RiskLevel::Low);
        assert_eq!(composite_risk(20), RiskLevel::Moderate);
        assert_eq!(composite_risk(40), RiskLevel::Moderate);
        assert_eq!(composite_risk(41), RiskLevel::High);
        assert_eq!(composite_risk(60), RiskLevel::High);
    }

    #[test]
    fn test_out_of_range_scores_still_band() {
        assert_eq!(phq_category(-3), PhqCategory::Minimal);
        assert_eq!(phq_category(100), PhqCategory::Severe);
        assert_eq!(gad_category(22), GadCategory::Severe);
        assert_eq!(ghq_category(13), GhqCategory::Moderate);
        assert_eq!(composite_risk(-1), RiskLevel::Low);
    }

    #[test]
    fn test_labels() {
        assert_eq!(PhqCategory::ModeratelySevere.to_string(), "Moderately Severe");
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
        assert_eq!("Moderate Risk".parse::<RiskLevel>().ok(), Some(RiskLevel::Moderate));
        assert_eq!("Severe".parse::<GadCategory>().ok(), Some(GadCategory::Severe));
        assert!("Severe".parse::<GhqCategory>().is_err());
    }

    #[test]
    fn test_scores() {
        let scores = Scores { phq: 12, gad: 9, ghq: 5 };
        assert_eq!(scores.composite(), 26);
        assert_eq!(scores.phq_category(), PhqCategory::Moderate);
        assert_eq!(scores.gad_category(), GadCategory::Mild);
        assert_eq!(scores.ghq_category(), GhqCategory::Mild);
        assert_eq!(scores.risk(), RiskLevel::Moderate);
    }
}
