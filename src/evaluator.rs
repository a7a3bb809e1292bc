use log::{debug, info, warn};
use strum::IntoEnumIterator;

use crate::{
    category::Category,
    error::StartvalResult,
    llm::{ChatCompletionOptions, ChatMessage, provider::ChatProvider},
    record::{EvaluationRecord, ResponseFormat},
    report::Report,
    score::{self, FallbackRange, ScoreMap},
    search::SnippetSource,
};

#[derive(Clone, Debug, Default)]
pub struct EvaluateOptions {
    pub fallback: FallbackRange,
    pub format: ResponseFormat,
    pub manual: bool,
    pub skip_search: bool,
}

#[derive(Debug)]
pub struct Evaluation {
    pub snippets: Option<Vec<String>>,
    pub record: EvaluationRecord,
    pub report: Report,
}

pub struct Evaluator<S, P> {
    search: S,
    provider: P,
    options: EvaluateOptions,
}

impl<S: SnippetSource, P: ChatProvider> Evaluator<S, P> {
    pub fn new(search: S, provider: P, options: EvaluateOptions) -> Self {
        Self {
            search,
            provider,
            options,
        }
    }

    /// fetch, analyze, (manual input), evaluate, report; one after the other.
    pub async fn run(&self, company_name: &str) -> StartvalResult<Evaluation> {
        let snippets = if self.options.skip_search {
            None
        } else {
            self.fetch_company_info(company_name).await
        };

        let mut record = EvaluationRecord::default();
        self.analyze(company_name, &mut record).await;

        if self.options.manual {
            manual_input(company_name, &mut record)?;
        }

        let (overall_score, scores) = self.evaluate(&record);
        let report = Report::new(company_name, overall_score, scores);
        info!(
            "[Evaluate] {company_name}: {:.1} ({})",
            report.overall_score, report.recommendation
        );

        Ok(Evaluation {
            snippets,
            record,
            report,
        })
    }

    pub async fn fetch_company_info(&self, company_name: &str) -> Option<Vec<String>> {
        match self.search.fetch_snippets(company_name).await {
            Ok(snippets) => {
                debug!("[Search] {snippets:?}");
                Some(snippets)
            }
            Err(err) => {
                warn!("Could not fetch search results for '{company_name}': {err}");
                None
            }
        }
    }

    pub async fn ask_model(&self, prompt: &str) -> Option<String> {
        let messages = vec![ChatMessage::user(prompt)];

        match self
            .provider
            .chat_completion(&messages, &ChatCompletionOptions::default())
            .await
        {
            Ok(bot_message) => {
                debug!("[LLM] {bot_message:?}");
                Some(bot_message.content)
            }
            Err(err) => {
                warn!("Error fetching completion from LLM: {err}");
                None
            }
        }
    }

    pub async fn analyze(&self, company_name: &str, record: &mut EvaluationRecord) {
        let prompt = build_prompt(company_name, self.options.format);
        debug!("[Prompt] {prompt}");

        if let Some(response) = self.ask_model(&prompt).await {
            record.apply_response(&response, self.options.format);
        }
        debug!("[Record] {record:?}");
    }

    pub fn evaluate(&self, record: &EvaluationRecord) -> (f64, ScoreMap) {
        let scores = score::score_record(record, self.options.fallback, &mut rand::thread_rng());
        debug!("[Scores] {scores:?}");

        (scores.overall(), scores)
    }
}

/// Ask on the terminal for every category the model left out. Blank answers
/// keep the category absent.
pub fn manual_input(company_name: &str, record: &mut EvaluationRecord) -> StartvalResult<()> {
    for category in record.missing() {
        let answer: String = dialoguer::Input::new()
            .with_prompt(format!("Enter {} for {company_name}", category.label()))
            .allow_empty(true)
            .interact_text()?;

        let answer = answer.trim();
        if !answer.is_empty() {
            record.set(category, Some(answer.to_string()));
        }
    }

    Ok(())
}

pub fn build_prompt(company_name: &str, format: ResponseFormat) -> String {
    let criteria = Category::iter()
        .map(|category| format!("- {}: {}", category.label(), category.question()))
        .collect::<Vec<_>>()
        .join("\n");

    let instruction = match format {
        ResponseFormat::Lines => LINES_FORMAT_PROMPT.to_string(),
        ResponseFormat::Json => {
            let keys = Category::iter()
                .map(|category| format!("    \"{}\": \"...\"", category.label()))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{JSON_FORMAT_PROMPT}\n```\n{{\n{keys}\n}}\n```")
        }
    };

    format!(
        r#"Please analyze the startup "{company_name}" based on these criteria:
{criteria}

{instruction}"#
    )
}

static LINES_FORMAT_PROMPT: &str = r#"Answer every criterion on exactly one line in the form `Criterion: answer`, using the criterion names above verbatim.
Do not add headings, numbering or blank lines between the answers."#;

static JSON_FORMAT_PROMPT: &str = r#"Return a single JSON object whose keys are exactly the criterion names above and whose values are your answers as strings.
Do not include any text outside the JSON object. Example:"#;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        error::StartvalError,
        llm::{ChatCompletionStream, Role},
        report::Recommendation,
    };

    struct FakeSearch {
        result: Result<Vec<String>, &'static str>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn ok(snippets: &[&str]) -> Self {
            Self {
                result: Ok(snippets.iter().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn timing_out() -> Self {
            Self {
                result: Err("operation timed out"),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SnippetSource for FakeSearch {
        async fn fetch_snippets(&self, _company_name: &str) -> StartvalResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(|err| StartvalError::HttpStatusError(err.to_string()))
        }
    }

    struct FakeModel {
        response: Option<String>,
    }

    impl ChatProvider for FakeModel {
        async fn chat_completion(
            &self,
            messages: &[ChatMessage],
            _options: &ChatCompletionOptions,
        ) -> StartvalResult<ChatMessage> {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, Role::User);

            match &self.response {
                Some(content) => Ok(ChatMessage {
                    role: Role::Bot,
                    content: content.clone(),
                    reasoning: None,
                }),
                None => Err(StartvalError::HttpStatusError(
                    "401 Unauthorized".to_string(),
                )),
            }
        }

        async fn chat_completion_stream(
            &self,
            _messages: &[ChatMessage],
            _options: &ChatCompletionOptions,
        ) -> StartvalResult<ChatCompletionStream> {
            unimplemented!()
        }
    }

    // Answer lengths 24, 10, 16, 20, 18, 18, 9, 17, 24, 22
    static FULL_RESPONSE: &str = "Market Opportunity: Large and growing market
Problem & Solution Fit: Clear need
Competitive Advantage: Proprietary data
Team Strength: Experienced founders
Exit Potential: Likely acquisition
Revenue Growth: 80% year over year
Burn Rate & Runway: 18 months
Funding History: Seed and Series A
Customer Adoption: 200 enterprise customers
Valuation & Cap Table: $50M post-money, clean";

    fn evaluator(
        search: FakeSearch,
        response: Option<&str>,
        options: EvaluateOptions,
    ) -> Evaluator<FakeSearch, FakeModel> {
        Evaluator::new(
            search,
            FakeModel {
                response: response.map(|s| s.to_string()),
            },
            options,
        )
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("Acme", ResponseFormat::Lines);
        assert!(prompt.starts_with(r#"Please analyze the startup "Acme""#));
        for category in Category::iter() {
            assert!(prompt.contains(&format!("- {}: ", category.label())));
        }

        let prompt = build_prompt("Acme", ResponseFormat::Json);
        assert!(prompt.contains(r#""Valuation & Cap Table": "...""#));
    }

    #[tokio::test]
    async fn test_run_with_full_response() {
        let evaluator = evaluator(
            FakeSearch::ok(&["Acme raises $20M"]),
            Some(FULL_RESPONSE),
            EvaluateOptions::default(),
        );

        let evaluation = evaluator.run("Acme").await.unwrap();
        let scores = &evaluation.report.scores;

        assert!(evaluation.record.missing().is_empty());
        assert_eq!(
            evaluation.snippets,
            Some(vec!["Acme raises $20M".to_string()])
        );

        let expected = [4, 1, 6, 1, 8, 8, 9, 7, 4, 2];
        for (category, expected) in Category::iter().zip(expected) {
            assert_eq!(scores.get(category), Some(expected), "{category:?}");
        }
        assert!((evaluation.report.overall_score - 5.0).abs() < 1e-9);
        assert_eq!(evaluation.report.recommendation, Recommendation::Promising);
    }

    #[tokio::test]
    async fn test_run_when_model_fails() {
        let evaluator = evaluator(FakeSearch::ok(&[]), None, EvaluateOptions::default());

        let evaluation = evaluator.run("Acme").await.unwrap();
        let report = &evaluation.report;

        assert_eq!(evaluation.record.missing().len(), 10);
        assert_eq!(report.scores.len(), 10);
        assert!(report.scores.iter().all(|(_, s)| (1..=5).contains(&s)));
        assert_eq!(report.overall_score, report.scores.overall());
        assert_eq!(
            report.recommendation,
            Recommendation::from_score(report.overall_score)
        );
        assert!(report.render().contains("Company: Acme"));
    }

    #[tokio::test]
    async fn test_run_when_search_times_out() {
        let evaluator = evaluator(
            FakeSearch::timing_out(),
            Some(FULL_RESPONSE),
            EvaluateOptions::default(),
        );

        let evaluation = evaluator.run("Acme").await.unwrap();

        assert_eq!(evaluator.search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(evaluation.snippets, None);
        assert!(evaluation.record.missing().is_empty());
        assert!((evaluation.report.overall_score - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_skip_search() {
        let evaluator = evaluator(
            FakeSearch::ok(&["unused"]),
            Some(FULL_RESPONSE),
            EvaluateOptions {
                skip_search: true,
                ..Default::default()
            },
        );

        let evaluation = evaluator.run("Acme").await.unwrap();

        assert_eq!(evaluator.search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(evaluation.snippets, None);
    }

    #[tokio::test]
    async fn test_run_json_format_full_fallback() {
        let response = r#"```json
{"Market Opportunity": "Large and growing market", "Funding History": null}
```"#;
        let evaluator = evaluator(
            FakeSearch::ok(&[]),
            Some(response),
            EvaluateOptions {
                fallback: FallbackRange::Full,
                format: ResponseFormat::Json,
                ..Default::default()
            },
        );

        let evaluation = evaluator.run("Acme").await.unwrap();
        let scores = &evaluation.report.scores;

        assert_eq!(evaluation.record.missing().len(), 9);
        assert_eq!(scores.get(Category::MarketOpportunity), Some(4));
        assert!(scores.iter().all(|(_, s)| (1..=10).contains(&s)));
    }
}
