use crate::ai::ContentProvider;
use crate::models::{GenerationRequest, GenerationResponse};
use std::sync::Arc;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Runs generation requests one after another until either channel closes.
pub fn spawn_generation_worker(
    provider: Arc<dyn ContentProvider>,
    mut requests: Receiver<GenerationRequest>,
    responses: Sender<GenerationResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(GenerationRequest { request_id, config }) = requests.recv().await {
            info!(request_id, "Worker received generation request");

            let result = provider.generate(&config).await;
            match &result {
                Ok(content) => info!(request_id, items = content.len(), "Generation succeeded"),
                Err(e) => warn!(request_id, "Generation failed: {}", e),
            }

            if responses
                .send(GenerationResponse { request_id, result })
                .await
                .is_err()
            {
                warn!("Response channel closed, dropping result");
                break;
            }
        }
        info!("Generation worker channel disconnected, exiting");
    })
}
