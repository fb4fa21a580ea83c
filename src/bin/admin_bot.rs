//! Ambassador Card admin bot
//!
//! Main entry point of the request review bot

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ac_signup::app::run_admin_bot().await
}
