use std::fmt;

use strum::EnumMessage;

use crate::score::ScoreMap;

#[derive(Clone, Copy, Debug, PartialEq, strum::Display, strum::EnumIter, strum::EnumMessage)]
pub enum Recommendation {
    #[strum(message = "Strong investment candidate")]
    Strong,

    #[strum(message = "Promising, but needs further due diligence")]
    Promising,

    #[strum(message = "High risk, not recommended at this stage")]
    HighRisk,
}

impl Recommendation {
    /// `>= 8` strong, `>= 5` promising, anything else high risk.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Recommendation::Strong
        } else if score >= 5.0 {
            Recommendation::Promising
        } else {
            Recommendation::HighRisk
        }
    }

    pub fn description(&self) -> &'static str {
        self.get_message().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct Report {
    pub company_name: String,
    pub overall_score: f64,
    pub scores: ScoreMap,
    pub recommendation: Recommendation,
}

impl Report {
    pub fn new(company_name: &str, overall_score: f64, scores: ScoreMap) -> Self {
        Self {
            company_name: company_name.to_string(),
            overall_score,
            scores,
            recommendation: Recommendation::from_score(overall_score),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Investment Evaluation Report ---")?;
        writeln!(f, "Company: {}", self.company_name)?;
        writeln!(f, "Investment Score: {:.1}/10", self.overall_score)?;
        for (category, score) in self.scores.iter() {
            writeln!(f, "- {}: {score}/10", category.label())?;
        }
        writeln!(f)?;
        write!(f, "Recommendation: {}", self.recommendation.description())
    }
}
