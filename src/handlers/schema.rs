//! Update routing for the two bots

use std::error::Error;
use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::PreCheckoutQuery;
use tracing::{error, info};
use super::engine::{Engine, Flow, Input};
use super::registration::UserFlow;
use super::review::AdminFlow;

pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Routing of the signup bot: private messages and payment confirmations
pub fn signup_schema() -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(Update::filter_pre_checkout_query().endpoint(handle_pre_checkout))
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.chat.is_private())
                .endpoint(handle_message::<UserFlow>),
        )
}

/// Routing of the admin bot: private messages only
pub fn admin_schema() -> UpdateHandler<HandlerError> {
    dptree::entry().branch(
        Update::filter_message()
            .filter(|msg: Message| msg.chat.is_private())
            .endpoint(handle_message::<AdminFlow>),
    )
}

async fn handle_message<F: Flow>(msg: Message, engine: Arc<Engine<F>>) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    if let Err(e) = engine.handle(chat_id, Input::from_message(&msg)).await {
        error!(
            bot = engine.flow().name(),
            chat_id = chat_id,
            error = %e,
            "Error handling message"
        );
    }
    Ok(())
}

/// Pre-checkout queries are always accepted
async fn handle_pre_checkout(bot: Bot, query: PreCheckoutQuery) -> HandlerResult {
    info!(
        query_id = ?query.id,
        payload = %query.invoice_payload,
        "Received pre-checkout query"
    );

    if let Err(e) = bot.answer_pre_checkout_query(query.id.clone(), true).await {
        error!(query_id = ?query.id, error = %e, "Failed to answer pre-checkout query");
    }
    Ok(())
}
