//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};

use super::types::{submitter_from_user, HandlerDeps, HandlerError};
use crate::conversation::types::{Input, Reply};
use crate::telegram::bot::{is_private_chat, Command};
use crate::telegram::keyboards::CallbackAction;
use crate::telegram::texts::{render, CopyContext};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same tree runs in production and in the integration tests. Only
/// private chats reach the conversation; group messages (including the
/// moderation chat) fall through every branch.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(message_handler(deps.clone()))
        .branch(callback_handler(deps))
}

/// Handler for bot commands (/start)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_private_chat(&msg))
        .branch(dptree::entry().filter_command::<Command>().endpoint(
            move |bot: Bot, msg: Message, cmd: Command| {
                let deps = deps.clone();
                async move {
                    log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                    let Some(user) = msg.from.as_ref() else {
                        return Ok(());
                    };
                    let input = match cmd {
                        Command::Start => Input::Restart,
                    };
                    let reply = deps.conversation.handle(&submitter_from_user(user), input).await;
                    deliver(&bot, msg.chat.id, reply, &deps.copy).await;
                    Ok(())
                }
            },
        ))
}

/// Handler for text and non-text messages in private chats
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_private_chat(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let input = match msg.text() {
                    Some(text) => Input::Text(text.to_string()),
                    None => Input::NonText,
                };

                let reply = deps.conversation.handle(&submitter_from_user(user), input).await;
                deliver(&bot, msg.chat.id, reply, &deps.copy).await;
                Ok(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
///
/// Every query is answered, even ignored ones, so the client stops its
/// loading indicator.
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query {:?}: {}", q.id, e);
            }

            let Some(message) = q.message.as_ref() else {
                return Ok(());
            };
            let chat = message.chat();
            if !chat.is_private() {
                return Ok(());
            }

            let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
                log::debug!("Ignoring unknown callback data {:?} from user {}", q.data, q.from.id);
                return Ok(());
            };

            let reply = deps
                .conversation
                .handle(&submitter_from_user(&q.from), action.into_input())
                .await;
            deliver(&bot, chat.id, reply, &deps.copy).await;
            Ok(())
        }
    })
}

/// Sends the rendered reply, if any. Send failures are logged.
async fn deliver(bot: &Bot, chat_id: ChatId, reply: Option<Reply>, copy: &CopyContext) {
    let Some(reply) = reply else {
        return;
    };
    if let Err(e) = send_reply(bot, chat_id, &reply, copy).await {
        log::error!("Failed to send {:?} to chat {}: {}", reply, chat_id, e);
    }
}

pub async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply: &Reply,
    copy: &CopyContext,
) -> Result<(), teloxide::RequestError> {
    let rendered = render(reply, copy);
    let request = bot.send_message(chat_id, rendered.text).parse_mode(ParseMode::Html);
    match rendered.keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}
