//! Plan recommendation.
//!
//! A fixed decision tree over the intake form: seniors first, then
//! families, then individuals, each mapping to one pre-authored plan plus
//! the same two alternatives with budget-derived premiums. Pure and
//! deterministic; the coefficients are business literals carried in
//! [`PlanTuning`], not a formula.

use serde::{Deserialize, Serialize};

use crate::config::PlanTuning;

/// Intake form fields driving the recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    /// Kept as a string: the form sends "1", "2", "3+", etc., and the
    /// branch test is literal inequality with "1".
    pub family_size: String,
    #[serde(default)]
    pub has_pre_existing_conditions: bool,
    pub budget: u32,
    /// Sum insured in lakhs. Alternative-plan arithmetic on this value is
    /// deliberately unbounded; tiny inputs can display nonsensical coverage.
    pub coverage_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationalTopic {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub name: String,
    pub provider: String,
    pub premium: String,
    pub coverage: String,
    pub suitability_score: u8,
    pub key_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub why_recommended: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub educational_content: Vec<EducationalTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub primary: PlanRecord,
    pub alternatives: [PlanRecord; 2],
}

/// The three primary branches, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Senior,
    Family,
    Individual,
}

fn branch_for(profile: &UserProfile) -> Branch {
    if profile.age >= 60 {
        Branch::Senior
    } else if profile.family_size != "1" {
        Branch::Family
    } else {
        Branch::Individual
    }
}

/// Display formatting for rupee amounts: comma-grouped with a /year suffix.
fn premium_display(amount: u32) -> String {
    format!("₹{}/year", group_thousands(amount))
}

fn coverage_display(lakhs: i64) -> String {
    format!("₹{lakhs} Lakhs")
}

fn group_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Map an intake profile to a primary plan plus two alternatives.
pub fn recommend(profile: &UserProfile, tuning: &PlanTuning) -> Recommendation {
    let primary = match branch_for(profile) {
        Branch::Senior => senior_plan(profile, tuning),
        Branch::Family => family_plan(profile, tuning),
        Branch::Individual => individual_plan(profile, tuning),
    };

    Recommendation {
        primary,
        alternatives: [value_plan(profile, tuning), premium_plan(profile, tuning)],
    }
}

fn senior_plan(profile: &UserProfile, tuning: &PlanTuning) -> PlanRecord {
    PlanRecord {
        name: "Senior Care Plus".into(),
        provider: "ABC Health Insurance".into(),
        premium: premium_display(profile.budget.min(tuning.senior_premium_ceiling)),
        coverage: coverage_display(profile.coverage_amount),
        suitability_score: 95,
        key_features: vec![
            "Specialized coverage for senior citizens".into(),
            "No medical check-up required up to age 65".into(),
            "Coverage for pre-existing diseases after 1 year".into(),
            "Covers 30+ critical illnesses".into(),
            "Free health check-up every year".into(),
        ],
        why_recommended: vec![
            "Tailored for seniors with comprehensive coverage".into(),
            "Includes coverage for age-related conditions".into(),
            "Affordable premium within your budget".into(),
            "Cashless treatment at 5000+ network hospitals".into(),
        ],
        educational_content: vec![
            EducationalTopic {
                title: "What is Senior Care Insurance?".into(),
                content: "Senior Care insurance is specifically designed for individuals aged 60 and above. It provides coverage for hospitalization expenses, pre and post hospitalization care, and often includes benefits like domiciliary treatment and regular health check-ups.".into(),
            },
            EducationalTopic {
                title: "Pre-Existing Conditions Coverage".into(),
                content: "Most senior care policies cover pre-existing conditions after a waiting period of 1-2 years. This means conditions you already have will be covered after this initial waiting period.".into(),
            },
            EducationalTopic {
                title: "Co-Payment Clause".into(),
                content: "Many senior citizen health policies have a co-payment clause, which means you pay a percentage of the claim amount (usually 10-20%). This helps keep the premium affordable.".into(),
            },
        ],
    }
}

fn family_plan(profile: &UserProfile, tuning: &PlanTuning) -> PlanRecord {
    PlanRecord {
        name: "Family Floater Gold".into(),
        provider: "XYZ Insurance".into(),
        premium: premium_display(profile.budget.min(tuning.family_premium_ceiling)),
        coverage: coverage_display(profile.coverage_amount),
        suitability_score: 92,
        key_features: vec![
            "Coverage for entire family under single sum insured".into(),
            "Maternity benefits included".into(),
            "Coverage for 30+ critical illnesses".into(),
            "Free health check-up every year".into(),
            "No claim bonus up to 50%".into(),
        ],
        why_recommended: vec![
            "Perfect for families with comprehensive coverage".into(),
            "Includes child care benefits".into(),
            "Maternity coverage with newborn baby expenses".into(),
            "Cashless treatment at 6000+ network hospitals".into(),
        ],
        educational_content: vec![
            EducationalTopic {
                title: "What is a Family Floater Policy?".into(),
                content: "A family floater health insurance policy covers your entire family under a single sum insured. The premium is based on the age of the oldest member. This is usually more cost-effective than individual policies for each family member.".into(),
            },
            EducationalTopic {
                title: "How Sum Insured Works in Family Floater".into(),
                content: "The sum insured is shared among all family members. For example, if you have a ₹10 lakh policy, any family member can claim up to ₹10 lakhs, but the total claims by all members cannot exceed ₹10 lakhs in a policy year.".into(),
            },
            EducationalTopic {
                title: "No Claim Bonus Benefit".into(),
                content: "If no claims are made during a policy year, you receive a No Claim Bonus, which increases your sum insured for the next year (typically by 5-50%) without any increase in premium.".into(),
            },
        ],
    }
}

fn individual_plan(profile: &UserProfile, tuning: &PlanTuning) -> PlanRecord {
    PlanRecord {
        name: "Individual Health Shield".into(),
        provider: "PQR General Insurance".into(),
        premium: premium_display(profile.budget.min(tuning.individual_premium_ceiling)),
        coverage: coverage_display(profile.coverage_amount),
        suitability_score: 90,
        key_features: vec![
            "Comprehensive individual coverage".into(),
            "Day care procedures covered".into(),
            "Coverage for pre and post hospitalization expenses".into(),
            "Free annual health check-up".into(),
            "No claim bonus up to 50%".into(),
        ],
        why_recommended: vec![
            "Tailored for individual needs with comprehensive coverage".into(),
            "Affordable premium within your budget".into(),
            "Excellent for young professionals".into(),
            "Cashless treatment at 4500+ network hospitals".into(),
        ],
        educational_content: vec![
            EducationalTopic {
                title: "What is Individual Health Insurance?".into(),
                content: "Individual health insurance provides coverage for a single person. The premium is based on your age, health condition, and the sum insured you choose. It's ideal for single individuals or those who want personalized coverage.".into(),
            },
            EducationalTopic {
                title: "Waiting Period Explained".into(),
                content: "Most health insurance policies have waiting periods for specific conditions. Typically, there's a 30-day initial waiting period for all illnesses except accidents, and a 2-4 year waiting period for pre-existing conditions.".into(),
            },
            EducationalTopic {
                title: "Claim Process Simplified".into(),
                content: "For cashless claims, you need to get admitted to a network hospital and inform the insurance company. For reimbursement claims, you pay the hospital bills first and then submit the documents to the insurer for reimbursement.".into(),
            },
        ],
    }
}

fn value_plan(profile: &UserProfile, tuning: &PlanTuning) -> PlanRecord {
    let premium = profile
        .budget
        .saturating_sub(tuning.value_discount)
        .max(tuning.value_premium_floor);
    PlanRecord {
        name: "Value Health Plan".into(),
        provider: "LMN Insurance".into(),
        premium: premium_display(premium),
        // No lower bound on the delta: a 1-lakh input displays as -1 lakh.
        coverage: coverage_display(profile.coverage_amount + tuning.value_coverage_delta),
        suitability_score: 85,
        key_features: vec![
            "Basic hospitalization coverage".into(),
            "Day care procedures covered".into(),
            "Ambulance charges covered".into(),
            "Tax benefits under Section 80D".into(),
        ],
        why_recommended: Vec::new(),
        educational_content: Vec::new(),
    }
}

fn premium_plan(profile: &UserProfile, tuning: &PlanTuning) -> PlanRecord {
    let premium = profile
        .budget
        .saturating_add(tuning.premium_uplift)
        .min(tuning.premium_ceiling);
    PlanRecord {
        name: "Premium Health Max".into(),
        provider: "DEF Health Insurance".into(),
        premium: premium_display(premium),
        coverage: coverage_display(profile.coverage_amount + tuning.premium_coverage_delta),
        suitability_score: 88,
        key_features: vec![
            "Enhanced coverage with premium benefits".into(),
            "International emergency coverage".into(),
            "Alternative treatments covered (Ayurveda, Homeopathy)".into(),
            "Restoration of sum insured benefit".into(),
        ],
        why_recommended: Vec::new(),
        educational_content: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(age: u32, family_size: &str, budget: u32, coverage: i64) -> UserProfile {
        UserProfile {
            age,
            family_size: family_size.into(),
            has_pre_existing_conditions: false,
            budget,
            coverage_amount: coverage,
        }
    }

    fn tuning() -> PlanTuning {
        PlanTuning::default()
    }

    #[test]
    fn age_sixty_selects_the_senior_branch() {
        let rec = recommend(&profile(60, "1", 10000, 10), &tuning());
        assert_eq!(rec.primary.name, "Senior Care Plus");
        let rec = recommend(&profile(59, "1", 10000, 10), &tuning());
        assert_eq!(rec.primary.name, "Individual Health Shield");
    }

    #[test]
    fn family_size_one_is_individual_anything_else_family() {
        let rec = recommend(&profile(30, "1", 10000, 10), &tuning());
        assert_eq!(rec.primary.name, "Individual Health Shield");
        for size in ["2", "3+", "four", "0"] {
            let rec = recommend(&profile(30, size, 10000, 10), &tuning());
            assert_eq!(rec.primary.name, "Family Floater Gold", "size {size}");
        }
    }

    #[test]
    fn senior_outranks_family() {
        let rec = recommend(&profile(65, "4", 10000, 10), &tuning());
        assert_eq!(rec.primary.name, "Senior Care Plus");
    }

    #[test]
    fn reference_numeric_example() {
        let rec = recommend(&profile(65, "1", 20000, 10), &tuning());
        // min(20000, 12000)
        assert_eq!(rec.primary.premium, "₹12,000/year");
        assert_eq!(rec.primary.coverage, "₹10 Lakhs");
        assert_eq!(rec.primary.suitability_score, 95);
        // max(20000-3000, 5000) and coverage 10-2
        assert_eq!(rec.alternatives[0].premium, "₹17,000/year");
        assert_eq!(rec.alternatives[0].coverage, "₹8 Lakhs");
        assert_eq!(rec.alternatives[0].suitability_score, 85);
        // min(20000+5000, 50000) and coverage 10+5
        assert_eq!(rec.alternatives[1].premium, "₹25,000/year");
        assert_eq!(rec.alternatives[1].coverage, "₹15 Lakhs");
        assert_eq!(rec.alternatives[1].suitability_score, 88);
    }

    #[test]
    fn value_premium_floor_applies() {
        let rec = recommend(&profile(30, "2", 6000, 10), &tuning());
        // max(6000-3000, 5000) = 5000
        assert_eq!(rec.alternatives[0].premium, "₹5,000/year");
    }

    #[test]
    fn premium_uplift_is_capped() {
        let rec = recommend(&profile(30, "2", 48000, 10), &tuning());
        // min(48000+5000, 50000) = 50000
        assert_eq!(rec.alternatives[1].premium, "₹50,000/year");
    }

    #[test]
    fn premium_uplift_saturates_on_huge_budgets() {
        // The uplift must not overflow before the ceiling applies.
        let rec = recommend(&profile(30, "2", u32::MAX, 10), &tuning());
        assert_eq!(rec.alternatives[1].premium, "₹50,000/year");
    }

    #[test]
    fn tiny_coverage_goes_negative_by_design() {
        let rec = recommend(&profile(30, "1", 10000, 1), &tuning());
        assert_eq!(rec.alternatives[0].coverage, "₹-1 Lakhs");
        assert_eq!(rec.alternatives[1].coverage, "₹6 Lakhs");
    }

    #[test]
    fn recommendation_is_deterministic() {
        let p = profile(42, "3", 13500, 7);
        let a = recommend(&p, &tuning());
        let b = recommend(&p, &tuning());
        assert_eq!(a, b);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(8000), "8,000");
        assert_eq!(group_thousands(50000), "50,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
