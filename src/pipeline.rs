use std::sync::Arc;

use crate::config::Config;
use crate::data_models::{ExtractionResult, NormalizedDocument, PipelineResult};
use crate::fetcher::{FetchError, FetchOptions, Fetcher};
use crate::isolator::ContentIsolator;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::logging::Logger;
use crate::normalizer::MarkdownNormalizer;
use crate::parser::ResponseParser;
use crate::prompt::ExtractionPromptBuilder;

pub const FETCH_FAILED_MESSAGE: &str = "fetch returned no content";

/// fetch → isolate → normalize → prompt → complete → parse, for one URL.
pub struct Pipeline<C: CompletionClient> {
    fetcher: Fetcher,
    isolator: ContentIsolator,
    normalizer: MarkdownNormalizer,
    prompt_builder: ExtractionPromptBuilder,
    parser: ResponseParser,
    client: C,
    model: String,
    max_tokens: u32,
    max_input_chars: usize,
    title: Option<String>,
    logger: Arc<dyn Logger>,
}

impl<C: CompletionClient> Pipeline<C> {
    pub fn new(config: &Config, client: C, logger: Arc<dyn Logger>) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&FetchOptions::from(config), logger.scoped("fetcher"))?;
        Ok(Self {
            fetcher,
            isolator: ContentIsolator::new(logger.scoped("isolator")),
            normalizer: MarkdownNormalizer::new(logger.scoped("normalizer")),
            prompt_builder: ExtractionPromptBuilder::new(
                config.city.clone(),
                logger.scoped("prompt"),
            ),
            parser: ResponseParser::new(logger.scoped("parser")),
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_input_chars: config.max_input_chars,
            title: config.title.clone(),
            logger: logger.scoped("pipeline"),
        })
    }

    /// Swaps the normalizer, e.g. for a site with a different boilerplate span.
    /// The caller picks the normalizer's logger.
    pub fn with_normalizer(mut self, normalizer: MarkdownNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Always produces a result; failures are carried in `extraction`.
    pub async fn run(&self, url: &str) -> PipelineResult {
        self.logger.info(&format!("processing food guide: {url}"));

        let fetched = self.fetcher.fetch(url).await;
        if fetched.is_empty() {
            self.logger
                .error(&format!("content could not be fetched: {url}"));
            return PipelineResult::unprocessed(
                url.to_string(),
                self.title_for(url, None),
                FETCH_FAILED_MESSAGE,
            );
        }

        let title = self.title_for(url, ContentIsolator::title(&fetched.html));
        let document = self.to_document(&fetched.html);
        let request = self.prompt_builder.build(document, self.max_input_chars);

        let completion_request = CompletionRequest::new(
            self.prompt_builder.system_message(),
            request.prompt(),
            self.model.as_str(),
            self.max_tokens,
        );

        self.logger.info(&format!(
            "sending {} characters to {}",
            completion_request.user_message.chars().count(),
            self.model
        ));
        let extraction = match self.client.complete(&completion_request).await {
            Ok(completion) => self.parser.parse(&completion.text),
            Err(e) => {
                self.logger.error(&format!("completion failed: {e}"));
                ExtractionResult::failed(e.to_string())
            }
        };

        self.logger.info(&format!("food guide processed: {url}"));
        PipelineResult::new(url.to_string(), title, extraction)
    }

    // The dom is Rc-based, so it is built and dropped here, never held across an await.
    fn to_document(&self, html: &str) -> NormalizedDocument {
        let content = self.isolator.isolate(html);
        self.normalizer.normalize(&content)
    }

    fn title_for(&self, url: &str, page_title: Option<String>) -> String {
        self.title
            .clone()
            .or(page_title)
            .unwrap_or_else(|| url.to_string())
    }
}
