//! Word Embedding Pipeline - Entry Point
//!
//! Minimal entry point that delegates to the pipeline module.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    zerg_words::run().await
}
