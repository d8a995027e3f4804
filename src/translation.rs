use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::language::Language;
use crate::llm::Llm;

/// Unofficial Google web translation endpoint.
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// A Translator translates texts.
pub trait Translator {
    /// Translate text into a target language.
    async fn translate(&self, text: &str, target_language: Language) -> Result<String>;
}

/// Which translator the application uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
    #[default]
    Google,
    Model,
}

/// Translates through the Google web endpoint. No retry and no timeout.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    http: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl ToString) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("listing-scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    fn request_url(&self, text: &str, target_language: Language) -> String {
        format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.endpoint,
            target_language.code(),
            urlencoding::encode(text)
        )
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: Language) -> Result<String> {
        let url = self.request_url(text, target_language);
        debug!("Requesting translation into {}", target_language);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Translation request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("Translation service returned {}", response.status()));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse translation response")?;
        parse_google_response(&body)
    }
}

/// Join the translated segments of a response shaped like
/// `[[["translated", "original", ...], ...], ...]`.
fn parse_google_response(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid response format from translation service"))?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect())
}

/// Translates by asking the loaded language model.
pub struct ModelTranslator<L: Llm> {
    llm: L,
}

impl<L: Llm> ModelTranslator<L> {
    pub fn new(llm: L) -> Self {
        Self { llm }
    }

    fn translation_guidelines(target_language: Language) -> String {
        format!(
            r#"You are a translator for product listings. Follow these examples exactly:

Example 1:
Input: "Blackberry Jam"
Output: Confiture de mûres

Example 2:
Input: "Please store in a cold environment."
Output: Veuillez conserver dans un endroit frais.

Now translate to {target_language}. Respond with ONLY the translation:"#,
            target_language = target_language.english_name()
        )
    }
}

impl<L: Llm> Translator for ModelTranslator<L> {
    async fn translate(&self, text: &str, target_language: Language) -> Result<String> {
        let guidelines = Self::translation_guidelines(target_language);
        let translation = self.llm.run_task(guidelines, text).await?;

        Ok(translation.trim().to_string())
    }
}

/// The translator selected in the config file.
pub enum AppTranslator {
    Google(GoogleTranslator),
    Model(ModelTranslator<kalosm::language::Llama>),
}

impl Translator for AppTranslator {
    async fn translate(&self, text: &str, target_language: Language) -> Result<String> {
        match self {
            AppTranslator::Google(translator) => translator.translate(text, target_language).await,
            AppTranslator::Model(translator) => translator.translate(text, target_language).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_parse_joins_segments() {
        let body = json!([
            [
                ["Gül reçeli. ", "Rosehip marmalade. ", null, null, 10],
                ["Soğuk saklayın.", "Keep it cold.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_google_response(&body).unwrap(), "Gül reçeli. Soğuk saklayın.");
    }

    #[test]
    fn test_parse_skips_non_text_segments() {
        let body = json!([[["Hallo", "Hello"], [null, null, "Halo"]], null, "en"]);
        assert_eq!(parse_google_response(&body).unwrap(), "Hallo");
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_google_response(&json!({"error": "quota"})).is_err());
        assert!(parse_google_response(&json!([])).is_err());
        assert!(parse_google_response(&json!(["text"])).is_err());
    }

    #[test]
    fn test_request_url_encodes_text() {
        let translator = GoogleTranslator::new("http://localhost:9/translate").unwrap();
        let url = translator.request_url("Jam & honey?", Language::Tr);
        assert_eq!(
            url,
            "http://localhost:9/translate?client=gtx&sl=auto&tl=tr&dt=t&q=Jam%20%26%20honey%3F"
        );
    }

    struct RecordingLlm {
        calls: RefCell<Vec<(String, String)>>,
        reply: &'static str,
    }

    impl Llm for RecordingLlm {
        async fn run_task(&self, guidelines: impl ToString, input: impl ToString) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((guidelines.to_string(), input.to_string()));
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_model_translator_names_language_and_trims() {
        let translator = ModelTranslator::new(RecordingLlm {
            calls: RefCell::new(Vec::new()),
            reply: "  Böğürtlen Reçeli \n",
        });

        let translation = translator.translate("Blackberry Jam", Language::Tr).await.unwrap();
        assert_eq!(translation, "Böğürtlen Reçeli");

        let calls = translator.llm.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("Now translate to Turkish."));
        assert_eq!(calls[0].1, "Blackberry Jam");
    }

    #[test]
    fn test_translator_kind_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            translator: TranslatorKind,
        }

        let parsed: Wrapper = toml::from_str(r#"translator = "model""#).unwrap();
        assert_eq!(parsed.translator, TranslatorKind::Model);
        assert!(toml::from_str::<Wrapper>(r#"translator = "deepl""#).is_err());
    }
}
