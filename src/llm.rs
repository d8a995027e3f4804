use anyhow::Result;
use kalosm::language::*;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Hugging Face repository holding the fine-tuned e-commerce weights.
pub const MODEL_REPO: &str = "ahmeterdempmk/Gemma2-2b-E-Commerce-Tuned";
pub const MODEL_REVISION: &str = "main";
/// 4-bit quantized export of the weights.
pub const MODEL_FILE: &str = "unsloth.Q4_K_M.gguf";
pub const TOKENIZER_REPO: &str = "unsloth/gemma-2-2b-it";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
/// Context length the weights were tuned with.
pub const MAX_SEQUENCE_LENGTH: u32 = 2048;
pub const MAX_NEW_TOKENS: u32 = 128;

static MODEL: OnceCell<Llama> = OnceCell::const_new();

/// ModelProvider continues a prompt.
pub trait ModelProvider {
    /// Generate a continuation of `prompt`. The returned text starts with the
    /// prompt itself, followed by the generated tokens.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Llm completes instruction-style tasks.
pub trait Llm {
    async fn run_task(
        &self,
        task_description: impl ToString,
        task_input_text: impl ToString,
    ) -> Result<String>;
}

impl ModelProvider for Llama {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let continuation = self
            .complete(prompt)
            .with_sampler(GenerationParameters::default().with_max_length(MAX_NEW_TOKENS))
            .await
            .map_err(anyhow::Error::from)?;
        debug!("Generated {} bytes", continuation.len());

        Ok(format!("{prompt}{continuation}"))
    }
}

impl Llm for Llama {
    async fn run_task(&self, guidelines: impl ToString, input: impl ToString) -> Result<String> {
        self.task(guidelines)
            .run(input)
            .await
            .map_err(anyhow::Error::from)
    }
}

fn model_source() -> LlamaSource {
    LlamaSource::new(FileSource::huggingface(MODEL_REPO, MODEL_REVISION, MODEL_FILE))
        .with_tokenizer(FileSource::huggingface(TOKENIZER_REPO, "main", TOKENIZER_FILE))
}

/// Ensure that the model weights are downloaded.
#[instrument]
pub async fn ensure_model_present() -> Result<()> {
    if Llama::builder().with_source(model_source()).requires_download() {
        debug!("Downloading {}", MODEL_REPO);
        let _ = get_model().await?;
    }
    debug!("Model files are present");

    Ok(())
}

/// Warm the model so the first request responds quickly.
#[instrument]
pub async fn warm_model() -> Result<()> {
    let model = get_model().await?;

    debug!("Warming model");
    model
        .complete("Product Information: Green tea")
        .with_sampler(GenerationParameters::default().with_max_length(1))
        .await?;
    debug!("Warmed model");

    Ok(())
}

/// Get the lazily initialized model. Loaded once per process, never torn down.
pub async fn get_model() -> Result<&'static Llama> {
    MODEL
        .get_or_try_init(|| async {
            debug!(
                repo = MODEL_REPO,
                file = MODEL_FILE,
                max_sequence_length = MAX_SEQUENCE_LENGTH,
                "Loading model"
            );
            Llama::builder().with_source(model_source()).build().await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize model: {}", e))
}
