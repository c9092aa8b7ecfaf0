//! Static advice keyed by (condition, risk band).
//!
//! Every band shares the condition's two general items. The band's lead
//! item goes in front of them and any follow-ups go after.

use crate::models::{Condition, RiskCategory};

struct BandAdvice {
    lead: &'static str,
    follow_ups: &'static [&'static str],
}

struct ConditionAdvice {
    general: [&'static str; 2],
    low: BandAdvice,
    moderate: BandAdvice,
    high: BandAdvice,
}

const DIABETES: ConditionAdvice = ConditionAdvice {
    general: [
        "Maintain a balanced diet low in refined carbohydrates and sugars.",
        "Aim for at least 150 minutes of moderate exercise weekly.",
    ],
    low: BandAdvice {
        lead: "Your risk is low, but continue monitoring your health with regular check-ups.",
        follow_ups: &[],
    },
    moderate: BandAdvice {
        lead: "Consider scheduling an appointment with your primary care provider for a comprehensive evaluation.",
        follow_ups: &[],
    },
    high: BandAdvice {
        lead: "Consider scheduling a consultation with an endocrinologist for a comprehensive evaluation.",
        follow_ups: &["More frequent blood glucose monitoring is recommended."],
    },
};

const HEART_DISEASE: ConditionAdvice = ConditionAdvice {
    general: [
        "Follow a heart-healthy diet rich in fruits, vegetables, whole grains, and lean proteins.",
        "Engage in regular cardiovascular exercise as recommended by your healthcare provider.",
    ],
    low: BandAdvice {
        lead: "Your risk is low, but continue healthy lifestyle habits and regular check-ups.",
        follow_ups: &[],
    },
    moderate: BandAdvice {
        lead: "Consider consulting with a cardiologist for a comprehensive heart health evaluation.",
        follow_ups: &["Monitor your blood pressure and cholesterol levels regularly."],
    },
    high: BandAdvice {
        lead: "Schedule a consultation with a cardiologist as soon as possible.",
        follow_ups: &[
            "Discuss stress management techniques with your healthcare provider.",
            "Consider more frequent cardiac monitoring if recommended by your doctor.",
        ],
    },
};

const KIDNEY_DISEASE: ConditionAdvice = ConditionAdvice {
    general: [
        "Maintain adequate hydration with water (consult your doctor about exact fluid intake).",
        "Follow a kidney-friendly diet as recommended by healthcare professionals.",
    ],
    low: BandAdvice {
        lead: "Your risk appears low, but regular kidney function monitoring is still recommended.",
        follow_ups: &[],
    },
    moderate: BandAdvice {
        lead: "Consider consulting with a nephrologist for a comprehensive kidney health evaluation.",
        follow_ups: &["Monitor your blood pressure regularly and keep it controlled."],
    },
    high: BandAdvice {
        lead: "Schedule a consultation with a nephrologist as soon as possible.",
        follow_ups: &[
            "Discuss medication management and appropriate diet restrictions with your specialist.",
            "More frequent kidney function monitoring may be necessary.",
        ],
    },
};

const LIVER_DISEASE: ConditionAdvice = ConditionAdvice {
    general: [
        "Limit alcohol consumption or avoid it completely if recommended by your doctor.",
        "Maintain a balanced diet rich in fruits, vegetables, and whole grains.",
    ],
    low: BandAdvice {
        lead: "Your liver function appears normal, but continue with regular health check-ups.",
        follow_ups: &[],
    },
    moderate: BandAdvice {
        lead: "Consider consulting with a hepatologist for a comprehensive liver health evaluation.",
        follow_ups: &["Avoid medications that may stress the liver without doctor supervision."],
    },
    high: BandAdvice {
        lead: "Schedule a consultation with a hepatologist as soon as possible.",
        follow_ups: &[
            "Follow strict dietary guidelines as recommended by your healthcare provider.",
            "More frequent liver function monitoring may be necessary.",
        ],
    },
};

fn advice(condition: Condition) -> &'static ConditionAdvice {
    match condition {
        Condition::Diabetes => &DIABETES,
        Condition::HeartDisease => &HEART_DISEASE,
        Condition::KidneyDisease => &KIDNEY_DISEASE,
        Condition::LiverDisease => &LIVER_DISEASE,
    }
}

/// Ordered advice for a condition at a given risk band.
pub fn recommendations_for(condition: Condition, category: RiskCategory) -> Vec<&'static str> {
    let table = advice(condition);
    let band = match category {
        RiskCategory::Low => &table.low,
        RiskCategory::Moderate => &table.moderate,
        RiskCategory::High => &table.high,
    };

    let mut items = Vec::with_capacity(1 + table.general.len() + band.follow_ups.len());
    items.push(band.lead);
    items.extend_from_slice(&table.general);
    items.extend_from_slice(band.follow_ups);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_band_leads_with_reassurance() {
        let items = recommendations_for(Condition::Diabetes, RiskCategory::Low);
        assert_eq!(items.len(), 3);
        assert!(items[0].starts_with("Your risk is low"));
        assert_eq!(
            items[1],
            "Maintain a balanced diet low in refined carbohydrates and sugars."
        );
    }

    #[test]
    fn high_band_appends_follow_ups_last() {
        let items = recommendations_for(Condition::HeartDisease, RiskCategory::High);
        assert_eq!(items.len(), 5);
        assert_eq!(
            items[0],
            "Schedule a consultation with a cardiologist as soon as possible."
        );
        assert_eq!(
            items[4],
            "Consider more frequent cardiac monitoring if recommended by your doctor."
        );
    }

    #[test]
    fn diabetes_moderate_has_no_follow_ups() {
        let items = recommendations_for(Condition::Diabetes, RiskCategory::Moderate);
        assert_eq!(items.len(), 3);
        assert!(items[0].contains("primary care provider"));
    }

    #[test]
    fn every_band_of_every_condition_has_advice() {
        for condition in Condition::ALL {
            for category in [RiskCategory::Low, RiskCategory::Moderate, RiskCategory::High] {
                let items = recommendations_for(condition, category);
                assert!(items.len() >= 3, "{condition} {category}");
                assert!(items.iter().all(|s| !s.is_empty()));
            }
        }
    }

    #[test]
    fn specialist_matches_condition() {
        let specialist = [
            (Condition::KidneyDisease, "nephrologist"),
            (Condition::LiverDisease, "hepatologist"),
            (Condition::HeartDisease, "cardiologist"),
            (Condition::Diabetes, "endocrinologist"),
        ];
        for (condition, name) in specialist {
            let items = recommendations_for(condition, RiskCategory::High);
            assert!(items[0].contains(name), "{condition}: {}", items[0]);
        }
    }
}
