use strum::{EnumMessage, IntoEnumIterator};

/// Evaluation dimensions, in report order.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::EnumMessage,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(
        message = "Market Opportunity",
        detailed_message = "Describe market size, growth rate, and industry trends.",
        serialize = "market"
    )]
    MarketOpportunity,

    #[strum(
        message = "Problem & Solution Fit",
        detailed_message = "Explain what problem this startup solves and how it compares to existing solutions.",
        serialize = "fit"
    )]
    ProblemSolutionFit,

    #[strum(
        message = "Competitive Advantage",
        detailed_message = "What makes this company unique? Does it have a defensible moat?",
        serialize = "moat"
    )]
    CompetitiveAdvantage,

    #[strum(
        message = "Team Strength",
        detailed_message = "Who are the founders and their expertise? Is this a strong team?",
        serialize = "team"
    )]
    TeamStrength,

    #[strum(
        message = "Exit Potential",
        detailed_message = "What are the potential exit strategies (acquisition, IPO, etc.)?",
        serialize = "exit"
    )]
    ExitPotential,

    #[strum(
        message = "Revenue Growth",
        detailed_message = "How fast is revenue growing and how predictable is it?",
        serialize = "revenue"
    )]
    RevenueGrowth,

    #[strum(
        message = "Burn Rate & Runway",
        detailed_message = "How much cash does it burn and how long will the runway last?",
        serialize = "runway"
    )]
    BurnRateRunway,

    #[strum(
        message = "Funding History",
        detailed_message = "Which rounds has it raised, how much, and from which investors?",
        serialize = "funding"
    )]
    FundingHistory,

    #[strum(
        message = "Customer Adoption",
        detailed_message = "How many customers use the product and how quickly is adoption growing?",
        serialize = "adoption"
    )]
    CustomerAdoption,

    #[strum(
        message = "Valuation & Cap Table",
        detailed_message = "What is the latest valuation and how healthy is the cap table?",
        serialize = "valuation"
    )]
    ValuationCapTable,
}

impl Category {
    /// Label used in prompts, in the model's reply and in the report.
    pub fn label(&self) -> &'static str {
        self.get_message().unwrap_or_default()
    }

    pub fn question(&self) -> &'static str {
        self.get_detailed_message().unwrap_or_default()
    }

    /// Case-insensitive match against the full label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Category::iter().find(|category| category.label().eq_ignore_ascii_case(label))
    }
}
