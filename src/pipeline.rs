// Request handling: acquisition → annotation → comparison → report, plus speech and refinement
use crate::analyzer::{self, RakeExtractor, SentimentScorer, TopicExtractor, VaderScorer};
use crate::config::{AppConfig, MAX_PAGE_SIZE};
use crate::model::{AnalysisRequest, CapabilityError, FinalReport, PipelineError};
use crate::narrator::{GoogleTts, NarrativeRefiner, OpenAiRefiner, SpeechSynthesizer};
use crate::normalizer::{HtmlNormalizer, TextNormalizer};
use crate::report::{self, ReducedReport};
use crate::scraper::{ArticleSource, NewsApiSource};
use crate::utils::{join_topics, truncate_for_log};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_topics: usize,
    pub speech_language: String,
    pub default_page_size: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_topics: analyzer::annotate::DEFAULT_MAX_TOPICS,
            speech_language: "hi".to_string(),
            default_page_size: 10,
        }
    }
}

pub struct NewsPipeline {
    source: Box<dyn ArticleSource>,
    normalizer: Box<dyn TextNormalizer>,
    scorer: Box<dyn SentimentScorer>,
    extractor: Box<dyn TopicExtractor>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    refiner: Option<Box<dyn NarrativeRefiner>>,
    settings: PipelineSettings,
}

impl NewsPipeline {
    pub fn new(
        source: Box<dyn ArticleSource>,
        normalizer: Box<dyn TextNormalizer>,
        scorer: Box<dyn SentimentScorer>,
        extractor: Box<dyn TopicExtractor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            normalizer,
            scorer,
            extractor,
            synthesizer: None,
            refiner: None,
            settings,
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_refiner(mut self, refiner: Box<dyn NarrativeRefiner>) -> Self {
        self.refiner = Some(refiner);
        self
    }

    /// Wires the production adapters. Keys come only from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, CapabilityError> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);

        let source = NewsApiSource::new(config.newsapi_key.clone(), &config.user_agent, timeout)?;
        let settings = PipelineSettings {
            max_topics: config.max_topics,
            speech_language: config.speech_language.clone(),
            default_page_size: config.page_size,
        };
        let mut pipeline = Self::new(
            Box::new(source),
            Box::new(HtmlNormalizer::new()?),
            Box::new(VaderScorer::new()),
            Box::new(RakeExtractor::new()?),
            settings,
        );

        if config.speech_enabled {
            pipeline = pipeline.with_synthesizer(Box::new(GoogleTts::new(&config.user_agent, timeout)?));
        } else {
            info!("Speech synthesis disabled in config");
        }

        match config.refiner_key() {
            Some(key) => {
                pipeline = pipeline.with_refiner(Box::new(OpenAiRefiner::new(
                    key,
                    config.openai_model.clone(),
                    timeout,
                )?));
            }
            None => info!("No OpenAI key configured, refined analysis disabled"),
        }

        Ok(pipeline)
    }

    /// Checks the raw request parameters before any capability is invoked.
    pub fn request(&self, query: Option<&str>, page_size: Option<u32>) -> Result<AnalysisRequest, PipelineError> {
        let query = query.map(str::trim).unwrap_or("");
        if query.is_empty() {
            return Err(PipelineError::Input("Query is required.".to_string()));
        }

        let page_size = page_size.unwrap_or(self.settings.default_page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PipelineError::Input(format!(
                "Page size must be between 1 and {}.",
                MAX_PAGE_SIZE
            )));
        }

        Ok(AnalysisRequest {
            query: query.to_string(),
            page_size,
        })
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<FinalReport, PipelineError> {
        info!("Processing query: {}", request.query);

        info!("Fetching articles...");
        let search = format!("{} news", request.query);
        let articles = self
            .source
            .fetch_articles(&search, request.page_size)
            .await
            .map_err(CapabilityError::from)?;
        if articles.is_empty() {
            return Err(PipelineError::Acquisition(
                "No articles found or error during scraping.".to_string(),
            ));
        }
        info!("Fetched {} articles", articles.len());

        info!("Annotating articles...");
        let annotated = analyzer::annotate(
            &articles,
            self.normalizer.as_ref(),
            self.scorer.as_ref(),
            self.extractor.as_ref(),
            self.settings.max_topics,
        )?;

        info!("Comparing articles...");
        let analysis = analyzer::analyze(&annotated);
        info!(
            "Contrasts: {} | Common topics: {} | Unique topics: {} | Verdict: {:?}",
            analysis.pairwise_contrasts.len(),
            join_topics(analysis.topic_overlap.common()),
            analysis.report.unique_topics.len(),
            analysis.verdict
        );

        let report = report::compose(&request.query, annotated, analysis);

        let audio = self.speak(&report.final_sentiment_summary).await;
        let refined = self.refine(&report).await;

        info!("Finished processing query: {}", request.query);
        Ok(report.with_audio(audio).with_refined_narrative(refined))
    }

    async fn speak(&self, text: &str) -> Option<Vec<u8>> {
        let synthesizer = self.synthesizer.as_ref()?;
        match synthesizer.synthesize(text, &self.settings.speech_language).await {
            Ok(audio) => {
                info!("Synthesized {} bytes of audio", audio.len());
                Some(audio)
            }
            Err(e) => {
                warn!("Speech synthesis failed, continuing without audio: {}", e);
                None
            }
        }
    }

    async fn refine(&self, report: &FinalReport) -> Option<String> {
        let refiner = self.refiner.as_ref()?;
        let payload = match ReducedReport::from_report(report).to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("Cannot serialize reduced report: {}", e);
                return None;
            }
        };
        match refiner.refine(&payload).await {
            Ok(narrative) => {
                info!("Refined analysis: {}", truncate_for_log(&narrative, 80));
                Some(narrative)
            }
            Err(e) => {
                warn!("Narrative refinement failed, continuing without it: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::annotate::fakes::{HashtagExtractor, KeywordScorer, PassThrough};
    use crate::model::{Article, ScraperError, Sentiment, TopicOverlap};
    use crate::report::Verdict;
    use std::sync::{Arc, Mutex};

    struct FakeSource {
        articles: Vec<Article>,
        seen_query: Arc<Mutex<Option<(String, u32)>>>,
    }

    #[async_trait::async_trait]
    impl ArticleSource for FakeSource {
        async fn fetch_articles(&self, query: &str, page_size: u32) -> Result<Vec<Article>, ScraperError> {
            *self.seen_query.lock().unwrap() = Some((query.to_string(), page_size));
            Ok(self.articles.clone())
        }
    }

    struct DownSource;

    #[async_trait::async_trait]
    impl ArticleSource for DownSource {
        async fn fetch_articles(&self, _: &str, _: u32) -> Result<Vec<Article>, ScraperError> {
            Err(ScraperError::Timeout)
        }
    }

    struct FixedSpeech(Result<Vec<u8>, ()>);

    #[async_trait::async_trait]
    impl SpeechSynthesizer for FixedSpeech {
        async fn synthesize(&self, _: &str, language: &str) -> Result<Vec<u8>, CapabilityError> {
            assert_eq!(language, "hi");
            self.0
                .clone()
                .map_err(|_| CapabilityError::request("speech synthesizer", "unavailable"))
        }
    }

    struct RecordingRefiner {
        payload: Arc<Mutex<Option<String>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl NarrativeRefiner for RecordingRefiner {
        async fn refine(&self, reduced: &str) -> Result<String, CapabilityError> {
            *self.payload.lock().unwrap() = Some(reduced.to_string());
            if self.fail {
                Err(CapabilityError::malformed("narrative refiner", "no content"))
            } else {
                Ok("Expansion looks promising.".to_string())
            }
        }
    }

    fn ev_articles() -> Vec<Article> {
        vec![
            Article::new("EV sales good", "#ev #battery", "https://a/1"),
            Article::new("Battery recall bad", "#recall #battery", "https://a/2"),
            Article::new("China expansion good", "#ev #china", "https://a/3"),
        ]
    }

    fn pipeline_with(source: Box<dyn ArticleSource>) -> NewsPipeline {
        NewsPipeline::new(
            source,
            Box::new(PassThrough),
            Box::new(KeywordScorer),
            Box::new(HashtagExtractor),
            PipelineSettings::default(),
        )
    }

    fn fake_source(articles: Vec<Article>) -> (Box<dyn ArticleSource>, Arc<Mutex<Option<(String, u32)>>>) {
        let seen = Arc::new(Mutex::new(None));
        let source = FakeSource {
            articles,
            seen_query: seen.clone(),
        };
        (Box::new(source), seen)
    }

    #[test]
    fn request_requires_query() {
        let (source, _) = fake_source(vec![]);
        let pipeline = pipeline_with(source);
        assert!(matches!(pipeline.request(None, None), Err(PipelineError::Input(_))));
        assert!(matches!(pipeline.request(Some("   "), None), Err(PipelineError::Input(_))));
    }

    #[test]
    fn request_checks_page_size_and_applies_default() {
        let (source, _) = fake_source(vec![]);
        let pipeline = pipeline_with(source);
        assert!(matches!(pipeline.request(Some("Tesla"), Some(0)), Err(PipelineError::Input(_))));
        assert!(matches!(pipeline.request(Some("Tesla"), Some(21)), Err(PipelineError::Input(_))));

        let req = pipeline.request(Some(" Tesla "), None).unwrap();
        assert_eq!(req.query, "Tesla");
        assert_eq!(req.page_size, 10);
    }

    #[tokio::test]
    async fn end_to_end_report() {
        let (source, seen) = fake_source(ev_articles());
        let payload = Arc::new(Mutex::new(None));
        let pipeline = pipeline_with(source)
            .with_synthesizer(Box::new(FixedSpeech(Ok(vec![0xFF, 0xFB]))))
            .with_refiner(Box::new(RecordingRefiner {
                payload: payload.clone(),
                fail: false,
            }));

        let request = pipeline.request(Some("Tesla"), Some(3)).unwrap();
        let report = pipeline.run(&request).await.unwrap();

        assert_eq!(
            seen.lock().unwrap().clone(),
            Some(("Tesla news".to_string(), 3))
        );
        assert_eq!(report.company, "Tesla");
        assert_eq!(report.articles.len(), 3);
        assert_eq!(report.articles[1].sentiment, Sentiment::Negative);

        let score = &report.comparative_sentiment_score;
        assert_eq!(score.sentiment_distribution.count(Sentiment::Positive), 2);
        assert_eq!(score.pairwise_contrasts.len(), 2);
        assert!(matches!(score.topic_overlap, TopicOverlap::Batch { .. }));
        assert_eq!(report.final_sentiment_summary, Verdict::Positive.message());
        assert_eq!(report.audio, Some(vec![0xFF, 0xFB]));
        assert_eq!(report.refined_narrative.as_deref(), Some("Expansion looks promising."));

        let sent: serde_json::Value =
            serde_json::from_str(payload.lock().unwrap().as_deref().unwrap()).unwrap();
        let keys: Vec<&String> = sent.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(sent["Company"], "Tesla");
        assert!(sent.get("Articles").is_none());
    }

    #[tokio::test]
    async fn empty_acquisition_is_an_error() {
        let (source, _) = fake_source(vec![]);
        let pipeline = pipeline_with(source);
        let request = pipeline.request(Some("Nobody"), None).unwrap();
        let err = pipeline.run(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(_)));
    }

    #[tokio::test]
    async fn source_failure_is_capability_error() {
        let pipeline = pipeline_with(Box::new(DownSource));
        let request = pipeline.request(Some("Tesla"), None).unwrap();
        let err = pipeline.run(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Capability(_)));
    }

    #[tokio::test]
    async fn annotation_failure_aborts_request() {
        let mut articles = ev_articles();
        articles.push(Article::new("Plant explode", "", "https://a/4"));
        let (source, _) = fake_source(articles);
        let pipeline = pipeline_with(source);
        let request = pipeline.request(Some("Tesla"), None).unwrap();
        match pipeline.run(&request).await {
            Err(PipelineError::Annotation(e)) => assert_eq!(e.index, 3),
            other => panic!("expected annotation error, got {:?}", other.map(|r| r.company)),
        }
    }

    #[tokio::test]
    async fn speech_and_refiner_failures_degrade_gracefully() {
        let (source, _) = fake_source(ev_articles());
        let pipeline = pipeline_with(source)
            .with_synthesizer(Box::new(FixedSpeech(Err(()))))
            .with_refiner(Box::new(RecordingRefiner {
                payload: Arc::new(Mutex::new(None)),
                fail: true,
            }));
        let request = pipeline.request(Some("Tesla"), None).unwrap();
        let report = pipeline.run(&request).await.unwrap();
        assert!(report.audio.is_none());
        assert!(report.refined_narrative.is_none());
        assert_eq!(report.articles.len(), 3);
    }

    #[tokio::test]
    async fn two_articles_report_exact_overlap() {
        let (source, _) = fake_source(ev_articles().into_iter().take(2).collect());
        let pipeline = pipeline_with(source);
        let request = pipeline.request(Some("Tesla"), None).unwrap();
        let report = pipeline.run(&request).await.unwrap();
        match &report.comparative_sentiment_score.topic_overlap {
            TopicOverlap::Pair {
                common,
                unique_to_first,
                unique_to_second,
            } => {
                assert_eq!(common, &vec!["battery".to_string()]);
                assert_eq!(unique_to_first, &vec!["ev".to_string()]);
                assert_eq!(unique_to_second, &vec!["recall".to_string()]);
            }
            other => panic!("expected pair overlap, got {:?}", other),
        }
    }

    #[test]
    fn builds_from_config_without_refiner_key() {
        let config = crate::config::parse_config(r#"{"newsapi_key": "k", "speech_enabled": false}"#).unwrap();
        let pipeline = NewsPipeline::from_config(&config).unwrap();
        assert!(pipeline.synthesizer.is_none());
        assert!(pipeline.refiner.is_none());
        assert_eq!(pipeline.settings.max_topics, 3);
    }
}
