use adaptive_source::cli;
use adaptive_source::streams::ConnectorVariant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    cli::run(ConnectorVariant::MappingOrder).await
}
