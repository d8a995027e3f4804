use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::llm::ModelProvider;
use crate::pipeline::{Pipeline, PipelineError, PipelineOutput, ProductQuery};
use crate::translation::Translator;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub request_id: u64,
    pub query: ProductQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    Finished {
        request_id: u64,
        output: PipelineOutput,
    },
    /// Nothing was generated because the input was empty.
    Rejected { request_id: u64, message: String },
    /// Generation or translation failed.
    Failed { request_id: u64, message: String },
}

impl GenerationResponse {
    pub fn request_id(&self) -> u64 {
        match self {
            GenerationResponse::Finished { request_id, .. }
            | GenerationResponse::Rejected { request_id, .. }
            | GenerationResponse::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Runs pipeline requests one at a time on a dedicated worker thread.
pub struct GenerationService {
    request_tx: mpsc::UnboundedSender<GenerationRequest>,
    response_rx: mpsc::UnboundedReceiver<GenerationResponse>,
    next_request_id: u64,
}

impl GenerationService {
    pub fn new<M, T>(pipeline: Pipeline<M, T>) -> Result<Self>
    where
        M: ModelProvider + Send + 'static,
        T: Translator + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<GenerationRequest>();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<GenerationResponse>();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build generation runtime")?;

        // Spawn background generation worker
        std::thread::Builder::new()
            .name("generation-worker".to_string())
            .spawn(move || runtime.block_on(generation_worker(pipeline, request_rx, response_tx)))
            .context("Failed to spawn generation worker")?;

        Ok(Self {
            request_tx,
            response_rx,
            next_request_id: 0,
        })
    }

    /// Queue a query and return the id its response will carry.
    pub fn request_generation(&mut self, query: ProductQuery) -> Result<u64> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        self.request_tx
            .send(GenerationRequest { request_id, query })
            .map_err(|e| anyhow::anyhow!("Failed to send generation request: {}", e))?;

        Ok(request_id)
    }

    pub fn try_recv_response(&mut self) -> Option<GenerationResponse> {
        self.response_rx.try_recv().ok()
    }
}

async fn generation_worker<M: ModelProvider, T: Translator>(
    pipeline: Pipeline<M, T>,
    mut request_rx: mpsc::UnboundedReceiver<GenerationRequest>,
    response_tx: mpsc::UnboundedSender<GenerationResponse>,
) {
    debug!("Generation worker started");

    while let Some(GenerationRequest { request_id, query }) = request_rx.recv().await {
        debug!("Processing generation request {}", request_id);

        let response = match pipeline.run(&query).await {
            Ok(output) => GenerationResponse::Finished { request_id, output },
            Err(e @ PipelineError::EmptyInput) => GenerationResponse::Rejected {
                request_id,
                message: e.to_string(),
            },
            Err(e) => {
                warn!("Generation request {} failed: {}", request_id, e);
                GenerationResponse::Failed {
                    request_id,
                    message: e.to_string(),
                }
            }
        };

        if let Err(e) = response_tx.send(response) {
            error!("Failed to send generation response: {}", e);
            break;
        }
    }

    debug!("Generation worker stopped");
}
