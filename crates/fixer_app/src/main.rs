mod cli;
mod platform;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
