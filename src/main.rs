use std::sync::Arc;

use async_trait::async_trait;
use dotenv::dotenv;
use eco_grove_bot::{
    config::Config,
    games::{
        choices::{default_scenarios, ChoiceOutcome, ScenarioSession},
        questions::QuestionBank,
        tree::TreeProgress,
        trivia::{AnswerOutcome, QuizSession},
        SessionPhase,
    },
    notify::{Notification, Notifier, Severity},
    progress::{ProgressService, UserStats},
    store::SqliteStore,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type GameDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Menu,
    Trivia {
        session: QuizSession,
    },
    Choices {
        session: ScenarioSession,
    },
}

type DialogueStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting eco grove bot...");

    let config = Config::from_env()?;
    let bot = Bot::from_env();

    log::info!("Opening dialogue storage at {}", config.dialogue_db_path);
    let storage: DialogueStorage = SqliteStorage::open(&config.dialogue_db_path, Json)
        .await?
        .erase();

    log::info!("Opening progress database at {}", config.db_path.display());
    let store = SqliteStore::open(&config.db_path)?;
    let service = Arc::new(ProgressService::new(Arc::new(store)));

    // Trivia shows as unavailable rather than failing startup
    let questions = match QuestionBank::open(&config.trivia_path) {
        Ok(bank) => {
            log::info!("Loaded {} trivia questions", bank.len());
            bank
        }
        Err(err) => {
            log::error!(
                "Failed to load trivia questions from {}: {}",
                config.trivia_path.display(),
                err
            );
            QuestionBank::default()
        }
    };
    let questions = Arc::new(questions);
    let config = Arc::new(config);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Menu].endpoint(menu))
            .branch(dptree::case![State::Trivia { session }].endpoint(trivia_answer))
            .branch(dptree::case![State::Choices { session }].endpoint(choices_answer)),
    )
    .dependencies(dptree::deps![storage, service, questions, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

/// Sends notifications as chat messages to one user.
struct ChatNotifier {
    bot: Bot,
    chat_id: ChatId,
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn notify(&self, notification: Notification) {
        let icon = match notification.severity {
            Severity::Info => "ℹ️",
            Severity::Success => "✨",
            Severity::Error => "⚠️",
        };
        let text = format!(
            "{} {}\n{}",
            icon, notification.title, notification.description
        );
        // Nothing waits on a notification, a lost one is only logged
        if let Err(err) = self.bot.send_message(self.chat_id, text).await {
            log::warn!("Failed to deliver notification to {}: {}", self.chat_id.0, err);
        }
    }
}

fn user_id(msg: &Message) -> String {
    msg.chat.id.0.to_string()
}

const GREETING_TEXT: &str = "Hi! Welcome to the Eco Grove 🌍 Grow your own virtual tree, test your eco knowledge and earn badges along the way!";

const WATER_TREE: &str = "💧 Water tree";
const MY_TREE: &str = "🌳 My tree";
const TRIVIA_GAME: &str = "📚 Eco trivia";
const CHOICES_GAME: &str = "♻️ Sustainable choices";
const DASHBOARD: &str = "🏆 Dashboard";

fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(WATER_TREE), KeyboardButton::new(MY_TREE)],
        vec![
            KeyboardButton::new(TRIVIA_GAME),
            KeyboardButton::new(CHOICES_GAME),
        ],
        vec![KeyboardButton::new(DASHBOARD)],
    ])
}

fn options_keyboard<'a>(options: impl Iterator<Item = &'a str>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        options
            .map(|o| vec![KeyboardButton::new(o)])
            .collect::<Vec<_>>(),
    )
}

async fn start(bot: Bot, dialogue: GameDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(menu_keyboard())
        .await?;

    dialogue.update(State::Menu).await?;
    Ok(())
}

async fn menu(
    bot: Bot,
    dialogue: GameDialogue,
    msg: Message,
    service: Arc<ProgressService>,
    questions: Arc<QuestionBank>,
    config: Arc<Config>,
) -> HandlerResult {
    let notifier = ChatNotifier {
        bot: bot.clone(),
        chat_id: msg.chat.id,
    };
    let user_id = user_id(&msg);

    match msg.text() {
        Some(WATER_TREE) => {
            // Failures were already reported through the notifier
            if let Ok(watering) = service.water(&user_id, &notifier).await {
                bot.send_message(msg.chat.id, render_tree(&watering.progress))
                    .reply_markup(menu_keyboard())
                    .await?;
            }
        }
        Some(MY_TREE) => {
            let tree = service.tree(&user_id, &notifier).await;
            bot.send_message(msg.chat.id, render_tree(&tree))
                .reply_markup(menu_keyboard())
                .await?;
        }
        Some(DASHBOARD) => {
            let stats = service.dashboard(&user_id, &notifier).await;
            bot.send_message(msg.chat.id, render_dashboard(&stats))
                .reply_markup(menu_keyboard())
                .await?;
        }
        Some(TRIVIA_GAME) => {
            let session = match QuizSession::new(questions.draw(config.question_limit)) {
                Ok(session) => session,
                Err(_) => {
                    bot.send_message(
                        msg.chat.id,
                        "Trivia questions are unavailable right now. Please try again later.",
                    )
                    .reply_markup(menu_keyboard())
                    .await?;
                    return Ok(());
                }
            };
            send_trivia_question(&bot, msg.chat.id, &session).await?;
            dialogue.update(State::Trivia { session }).await?;
        }
        Some(CHOICES_GAME) => {
            let session = ScenarioSession::new(default_scenarios())?;
            send_scenario(&bot, msg.chat.id, &session).await?;
            dialogue.update(State::Choices { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the options below")
                .reply_markup(menu_keyboard())
                .await?;
        }
    }
    Ok(())
}

fn render_tree(tree: &TreeProgress) -> String {
    format!(
        "{}\nLevel {}\n{} / {} waters",
        tree.stage().emoji(),
        tree.level,
        tree.water_count,
        tree.threshold()
    )
}

fn render_dashboard(stats: &UserStats) -> String {
    let mut text = format!(
        "🌳 Tree level: {}\n💧 Water count: {}\n🎯 Quizzes taken: {}\n🏆 Average score: {}%",
        stats.tree_level, stats.water_count, stats.total_quizzes, stats.average_score
    );

    if !stats.badges.is_empty() {
        text.push_str("\n\nYour achievements:");
        for badge in &stats.badges {
            text.push_str(&format!("\n{} {}", badge.icon(), badge.name()));
        }
    }

    if !stats.challenges.is_empty() {
        text.push_str("\n\nNext challenge:");
        for challenge in &stats.challenges {
            text.push_str(&format!(
                "\n{} {} ({} badge): {}/{} ({}%)",
                challenge.badge.icon(),
                challenge.description(),
                challenge.badge.name(),
                challenge.current,
                challenge.target,
                challenge.progress_percent()
            ));
        }
    }
    text
}

async fn send_trivia_question(bot: &Bot, chat_id: ChatId, session: &QuizSession) -> HandlerResult {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let text = format!(
        "Question {} of {} · Score: {}\n\n{}",
        session.question_number(),
        session.len(),
        session.score(),
        question.text
    );
    bot.send_message(chat_id, text)
        .reply_markup(options_keyboard(question.options()))
        .await?;
    Ok(())
}

async fn trivia_answer(
    bot: Bot,
    dialogue: GameDialogue,
    session: QuizSession,
    msg: Message,
    service: Arc<ProgressService>,
    config: Arc<Config>,
) -> HandlerResult {
    let mut session = session;
    let is_option = match (msg.text(), session.current_question()) {
        (Some(text), Some(question)) => question.has_option(text),
        _ => false,
    };
    if !is_option {
        bot.send_message(msg.chat.id, "Please choose one of the answers below")
            .await?;
        send_trivia_question(&bot, msg.chat.id, &session).await?;
        return Ok(());
    }

    match session.answer(msg.text().unwrap_or_default()) {
        AnswerOutcome::Answered {
            correct: true,
            ..
        } => {
            bot.send_message(msg.chat.id, "✅ Correct!").await?;
        }
        AnswerOutcome::Answered { correct_answer, .. } => {
            bot.send_message(
                msg.chat.id,
                format!("❌ Not quite. The answer is: {}", correct_answer),
            )
            .await?;
        }
        AnswerOutcome::Ignored => return Ok(()),
    }

    // Updates for this chat queue up behind the pause
    tokio::time::sleep(config.trivia_delay).await;

    if session.advance() != SessionPhase::Complete {
        send_trivia_question(&bot, msg.chat.id, &session).await?;
        dialogue.update(State::Trivia { session }).await?;
        return Ok(());
    }

    let notifier = ChatNotifier {
        bot: bot.clone(),
        chat_id: msg.chat.id,
    };
    match session.result(&user_id(&msg)) {
        Some(Ok(result)) => {
            // The user already saw the failure through the notifier
            if let Err(err) = service.record_quiz(result, &notifier).await {
                log::debug!("Quiz result for chat {} was not saved: {}", msg.chat.id.0, err);
            }
        }
        Some(Err(err)) => log::error!("Completed quiz produced an invalid result: {}", err),
        None => {}
    }

    let summary = format!(
        "Quiz Complete! You scored {} out of {}\n{}%\n{}",
        session.score(),
        session.len(),
        session.percent(),
        session.closing_remark()
    );
    bot.send_message(msg.chat.id, summary)
        .reply_markup(menu_keyboard())
        .await?;

    dialogue.update(State::Menu).await?;
    Ok(())
}

async fn send_scenario(bot: &Bot, chat_id: ChatId, session: &ScenarioSession) -> HandlerResult {
    let Some(scenario) = session.current_scenario() else {
        return Ok(());
    };
    let text = format!(
        "Scenario {} of {} · Impact score: {}\n\n{}",
        session.scenario_number(),
        session.len(),
        session.impact_score(),
        scenario.prompt
    );
    bot.send_message(chat_id, text)
        .reply_markup(options_keyboard(
            scenario.options.iter().map(|o| o.text.as_str()),
        ))
        .await?;
    Ok(())
}

async fn choices_answer(
    bot: Bot,
    dialogue: GameDialogue,
    session: ScenarioSession,
    msg: Message,
    config: Arc<Config>,
) -> HandlerResult {
    let mut session = session;
    let Some(option_index) = msg.text().and_then(|text| session.option_index(text)) else {
        bot.send_message(msg.chat.id, "Please choose one of the options below")
            .await?;
        send_scenario(&bot, msg.chat.id, &session).await?;
        return Ok(());
    };

    match session.choose(option_index) {
        ChoiceOutcome::Chosen { tone, feedback, .. } => {
            bot.send_message(msg.chat.id, format!("{}\n{}", tone.heading(), feedback))
                .await?;
        }
        ChoiceOutcome::Ignored => return Ok(()),
    }

    tokio::time::sleep(config.choices_delay).await;

    if session.advance() != SessionPhase::Complete {
        send_scenario(&bot, msg.chat.id, &session).await?;
        dialogue.update(State::Choices { session }).await?;
        return Ok(());
    }

    let tier = session.tier();
    let summary = format!(
        "Choices Complete!\n{} {}\nYour sustainability score: {}%",
        tier.emoji(),
        tier.title(),
        session.percent().round()
    );
    bot.send_message(msg.chat.id, summary)
        .reply_markup(menu_keyboard())
        .await?;

    dialogue.update(State::Menu).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_grove_bot::games::achievements::{evaluate, next_challenges};

    #[test]
    fn dashboard_shows_badges_and_challenge_progress() {
        let stats = UserStats {
            tree_level: 2,
            water_count: 3,
            total_quizzes: 1,
            average_score: 60,
            badges: evaluate(2, 1, 60),
            challenges: next_challenges(2, 1, 60),
        };
        let text = render_dashboard(&stats);

        assert!(text.contains("🌱 Seedling"));
        assert!(text.contains("📚 Quiz Starter"));
        assert!(text.contains("Reach Tree Level 5 (Sapling badge): 2/5 (40%)"));
        assert!(text.contains("Achieve 80% Average Score (Eco Expert badge): 60/80 (75%)"));
    }
}
