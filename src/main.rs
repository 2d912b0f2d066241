#[tokio::main]
async fn main() -> std::io::Result<()> {
    gsi_radar::run_with_config().await
}
