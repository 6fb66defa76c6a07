use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    holiya_chat::cli::run_cli().await
}
