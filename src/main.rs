#[tokio::main]
async fn main() -> anyhow::Result<()> {
    netspeed_lib::run().await
}
