//! Ambassador Card signup bot
//!
//! Main entry point of the applicant-facing bot

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ac_signup::app::run_signup_bot().await
}
