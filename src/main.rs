#[tokio::main]
async fn main() -> anyhow::Result<()> {
    thoughts::start_server().await
}
