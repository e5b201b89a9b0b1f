#[tokio::main]
async fn main() -> anyhow::Result<()> {
    teampulse_lib::run().await
}
