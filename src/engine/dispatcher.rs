use std::thread::JoinHandle;

use log::{debug, warn};
use serde::Serialize;

use crate::engine::chat_log::ChatLog;
use crate::engine::command::Command;
use crate::engine::query_agent::{QueryAgent, ERROR_MARKER};
use crate::model::message::ChatMessage;
use crate::model::profile::Profile;
use crate::model::recipe::RecipeBook;

pub const HELP_TEXT: &str = "Commandes : /profile, /recipes, /recipe <nom>, /needs <nom>";
pub const LOCAL_FALLBACK: &str =
    "Je suis en mode local. Fournis une clé OpenAI pour des réponses enrichies.\nCommandes : /help";
pub const NO_KEY: &str = "Aucune clé fournie. L'assistant fonctionnera en local sans accès API.";
pub const NO_CLIENT: &str =
    "Le client HTTP n'a pas pu être initialisé. L'API ne pourra pas être contactée.";

/// Whether free text may leave the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchConfig {
    pub api_key: String,
    /// Resolved once at startup: could the HTTP client be built at all.
    pub external_client_available: bool,
}

impl DispatchConfig {
    pub fn external_enabled(&self) -> bool {
        self.external_client_available && !self.api_key.trim().is_empty()
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    /// Blank input, nothing logged.
    Ignored,
    /// Fully answered before returning.
    Answered,
    /// An external query is running; its answer arrives through the log's
    /// channel.
    Scheduled(JoinHandle<()>),
}

/// Routes one chat input to a local answer or an external query.
///
/// Borrows the stores owned by the application for the duration of a call.
pub struct Dispatcher<'a> {
    profile: &'a Profile,
    recipes: &'a RecipeBook,
    config: &'a DispatchConfig,
    agent: Option<&'a QueryAgent>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        profile: &'a Profile,
        recipes: &'a RecipeBook,
        config: &'a DispatchConfig,
        agent: Option<&'a QueryAgent>,
    ) -> Self {
        Self {
            profile,
            recipes,
            config,
            agent,
        }
    }

    /// Log the trimmed input as a user message, then answer it.
    ///
    /// Local answers are in the log when this returns. For free text sent to
    /// the API, the bot message follows later, after the user message.
    pub fn dispatch(&self, raw: &str, log: &mut ChatLog) -> DispatchOutcome {
        let command = Command::parse(raw);
        if command == Command::Empty {
            return DispatchOutcome::Ignored;
        }

        log.push(ChatMessage::user(raw.trim()));
        debug!("dispatching {command:?}");

        let reply = match command {
            Command::Empty => return DispatchOutcome::Ignored,
            Command::Profile => pretty(self.profile),
            Command::Recipes => pretty(self.recipes),
            Command::Help => HELP_TEXT.to_string(),
            Command::Recipe(name) => match self.recipes.get(name) {
                Some(recipe) => pretty(recipe),
                None => not_found(name),
            },
            Command::Needs(name) => match self.recipes.get(name) {
                Some(recipe) => {
                    let lines = recipe.needs_lines();
                    if lines.is_empty() {
                        "Calcul des besoins :\nAucun ingrédient.".to_string()
                    } else {
                        format!("Calcul des besoins :\n{}", lines.join("\n"))
                    }
                }
                None => not_found(name),
            },
            Command::MissingArgument(keyword) => format!("Usage : {keyword} <nom>"),
            Command::FreeText(text) => return self.ask_external(text, log),
        };

        log.push(ChatMessage::bot(reply));
        DispatchOutcome::Answered
    }

    /// Check the configured key in the background ("Tester clé").
    pub fn check_key(&self, log: &mut ChatLog) -> DispatchOutcome {
        let key = self.config.api_key.trim();
        if key.is_empty() {
            log.push(ChatMessage::bot(NO_KEY));
            return DispatchOutcome::Answered;
        }

        let agent = match self.agent {
            Some(agent) if self.config.external_client_available => agent,
            _ => {
                log.push(ChatMessage::bot(NO_CLIENT));
                return DispatchOutcome::Answered;
            }
        };

        match agent.spawn_key_check(key.to_string(), log.sender()) {
            Ok(handle) => DispatchOutcome::Scheduled(handle),
            Err(e) => {
                warn!("could not start key check thread: {e}");
                log.push(ChatMessage::bot(format!("Erreur clé: {e}")));
                DispatchOutcome::Answered
            }
        }
    }

    fn ask_external(&self, text: &str, log: &mut ChatLog) -> DispatchOutcome {
        let agent = match self.agent {
            Some(agent) if self.config.external_enabled() => agent,
            _ => {
                log.push(ChatMessage::bot(LOCAL_FALLBACK));
                return DispatchOutcome::Answered;
            }
        };

        let key = self.config.api_key.trim().to_string();
        match agent.spawn(key, text.to_string(), log.sender()) {
            Ok(handle) => DispatchOutcome::Scheduled(handle),
            Err(e) => {
                warn!("could not start external query thread: {e}");
                log.push(ChatMessage::bot(format!("{ERROR_MARKER}{e}")));
                DispatchOutcome::Answered
            }
        }
    }
}

fn not_found(name: &str) -> String {
    format!("Recette '{name}' introuvable.")
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Erreur de formatage: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::query_agent::tests::{FakeBackend, HeldBackend};
    use crate::model::message::Speaker;
    use crate::model::recipe::{default_recipes, Recipe};

    fn scenario_book() -> RecipeBook {
        let mut book = RecipeBook::new();
        book.insert(
            "Anneau Agile".into(),
            Recipe::new(10, [("Cuir de Bouftou", 2), ("Bois de Châtaigner", 3)]),
        );
        book
    }

    fn local_config() -> DispatchConfig {
        DispatchConfig {
            api_key: String::new(),
            external_client_available: true,
        }
    }

    fn online_config() -> DispatchConfig {
        DispatchConfig {
            api_key: "  sk-test  ".into(),
            external_client_available: true,
        }
    }

    fn run(input: &str, recipes: &RecipeBook) -> Vec<ChatMessage> {
        let profile = Profile::default();
        let config = local_config();
        let mut log = ChatLog::new();

        Dispatcher::new(&profile, recipes, &config, None).dispatch(input, &mut log);
        log.entries().to_vec()
    }

    fn wait(outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Scheduled(handle) => handle.join().unwrap(),
            other => panic!("expected a scheduled query, got {other:?}"),
        }
    }

    #[test]
    fn blank_input_logs_nothing() {
        assert!(run("", &scenario_book()).is_empty());
        assert!(run("   ", &scenario_book()).is_empty());
    }

    #[test]
    fn user_message_comes_first_and_is_trimmed() {
        let log = run("  /help  ", &scenario_book());

        assert_eq!(log[0], ChatMessage::user("/help"));
        assert_eq!(log[1], ChatMessage::bot(HELP_TEXT));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn needs_lists_ingredients_in_order() {
        let log = run("/needs Anneau Agile", &scenario_book());

        assert_eq!(log[1].speaker, Speaker::Bot);
        assert_eq!(
            log[1].text,
            "Calcul des besoins :\nCuir de Bouftou: 2\nBois de Châtaigner: 3"
        );
    }

    #[test]
    fn recipe_dumps_only_the_matching_record() {
        let book = default_recipes();
        let log = run("/recipe Anneau Chanceux", &book);

        let shown: Recipe = serde_json::from_str(&log[1].text).unwrap();
        assert_eq!(&shown, &book["Anneau Chanceux"]);
        assert!(!log[1].text.contains("Bouftou"));
    }

    #[test]
    fn every_known_recipe_resolves_to_itself() {
        let book = default_recipes();
        for (name, recipe) in &book {
            let log = run(&format!("/needs {name}"), &book);
            for line in recipe.needs_lines() {
                assert!(log[1].text.contains(&line));
            }
            for (other, other_recipe) in &book {
                if other != name {
                    for ingredient in other_recipe.ingredients.keys() {
                        assert!(!log[1].text.contains(ingredient.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn missing_recipe_echoes_trimmed_name() {
        let empty = RecipeBook::new();

        let log = run("/recipe   Foo  ", &empty);
        assert_eq!(log[1], ChatMessage::bot("Recette 'Foo' introuvable."));

        let log = run("/needs Foo", &empty);
        assert_eq!(log[1], ChatMessage::bot("Recette 'Foo' introuvable."));
        assert!(empty.is_empty());
    }

    #[test]
    fn lookup_is_exact() {
        let log = run("/recipe anneau agile", &scenario_book());

        assert_eq!(log[1], ChatMessage::bot("Recette 'anneau agile' introuvable."));
    }

    #[test]
    fn bare_lookup_keyword_gets_usage_hint() {
        assert_eq!(run("/recipe", &scenario_book())[1], ChatMessage::bot("Usage : /recipe <nom>"));
        assert_eq!(run("/needs ", &scenario_book())[1], ChatMessage::bot("Usage : /needs <nom>"));
    }

    #[test]
    fn profile_and_recipes_dump_json() {
        let log = run("/profile", &scenario_book());
        let profile: Profile = serde_json::from_str(&log[1].text).unwrap();
        assert_eq!(profile, Profile::default());

        let log = run("/recipes", &scenario_book());
        let book: RecipeBook = serde_json::from_str(&log[1].text).unwrap();
        assert_eq!(book, scenario_book());
    }

    #[test]
    fn free_text_without_key_falls_back() {
        let log = run("où trouver du bois ?", &scenario_book());

        assert_eq!(log[1], ChatMessage::bot(LOCAL_FALLBACK));
    }

    #[test]
    fn free_text_without_client_falls_back() {
        let profile = Profile::default();
        let book = scenario_book();
        let config = DispatchConfig {
            external_client_available: false,
            ..online_config()
        };
        let agent = QueryAgent::new(FakeBackend::answering("jamais"), 600);
        let mut log = ChatLog::new();

        let outcome = Dispatcher::new(&profile, &book, &config, Some(&agent)).dispatch("salut", &mut log);

        assert!(matches!(outcome, DispatchOutcome::Answered));
        assert_eq!(log.entries()[1], ChatMessage::bot(LOCAL_FALLBACK));
    }

    #[test]
    fn free_text_goes_to_agent_and_answer_follows_request() {
        let profile = Profile::default();
        let book = scenario_book();
        let config = online_config();
        let backend = FakeBackend::answering("Va à Astrub.");
        let agent = QueryAgent::new(backend.clone(), 600);
        let mut log = ChatLog::new();
        let dispatcher = Dispatcher::new(&profile, &book, &config, Some(&agent));

        let outcome = dispatcher.dispatch("où farmer ?", &mut log);
        assert_eq!(log.entries(), &[ChatMessage::user("où farmer ?")]);

        dispatcher.dispatch("/help", &mut log);
        wait(outcome);
        log.drain_pending();

        let texts: Vec<&str> = log.entries().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["où farmer ?", "/help", HELP_TEXT, "Va à Astrub."]);
        assert_eq!(backend.seen.lock().unwrap()[0].0, "sk-test");
    }

    #[test]
    fn local_commands_answer_while_a_query_is_held() {
        let profile = Profile::default();
        let book = scenario_book();
        let config = online_config();
        let (backend, release) = HeldBackend::answering("Va à Astrub.");
        let agent = QueryAgent::new(backend, 600);
        let mut log = ChatLog::new();
        let dispatcher = Dispatcher::new(&profile, &book, &config, Some(&agent));

        let outcome = dispatcher.dispatch("où farmer ?", &mut log);
        assert!(matches!(outcome, DispatchOutcome::Scheduled(_)));

        let help = dispatcher.dispatch("/help", &mut log);
        assert!(matches!(help, DispatchOutcome::Answered));
        assert_eq!(log.entries().last(), Some(&ChatMessage::bot(HELP_TEXT)));
        assert_eq!(log.drain_pending(), 0);

        release.send(()).unwrap();
        wait(outcome);
        assert_eq!(log.drain_pending(), 1);

        let texts: Vec<&str> = log.entries().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["où farmer ?", "/help", HELP_TEXT, "Va à Astrub."]);
    }

    #[test]
    fn concurrent_queries_each_answer_after_their_request() {
        let profile = Profile::default();
        let book = scenario_book();
        let config = online_config();
        let agent = QueryAgent::new(FakeBackend::answering("ok"), 600);
        let mut log = ChatLog::new();
        let dispatcher = Dispatcher::new(&profile, &book, &config, Some(&agent));

        let outcomes: Vec<_> = (0..5)
            .map(|i| dispatcher.dispatch(&format!("question {i}"), &mut log))
            .collect();
        for outcome in outcomes {
            wait(outcome);
        }
        log.drain_pending();

        let entries = log.entries();
        assert_eq!(entries.len(), 10);
        let first_bot = entries.iter().position(|m| m.speaker == Speaker::Bot).unwrap();
        assert_eq!(first_bot, 5);
        assert!(entries[5..].iter().all(|m| m == &ChatMessage::bot("ok")));
    }

    #[test]
    fn failed_query_yields_one_marked_bot_message() {
        let profile = Profile::default();
        let book = scenario_book();
        let config = online_config();
        let agent = QueryAgent::new(FakeBackend::failing("timeout"), 600);
        let mut log = ChatLog::new();

        wait(Dispatcher::new(&profile, &book, &config, Some(&agent)).dispatch("salut", &mut log));
        log.drain_pending();

        let bots: Vec<_> = log.entries().iter().filter(|m| m.speaker == Speaker::Bot).collect();
        assert_eq!(bots.len(), 1);
        assert!(bots[0].text.starts_with(ERROR_MARKER));
    }

    #[test]
    fn key_check_paths() {
        let profile = Profile::default();
        let book = scenario_book();
        let agent = QueryAgent::new(FakeBackend::answering("x"), 600);

        let mut log = ChatLog::new();
        Dispatcher::new(&profile, &book, &local_config(), Some(&agent)).check_key(&mut log);
        assert_eq!(log.entries(), &[ChatMessage::bot(NO_KEY)]);

        let mut log = ChatLog::new();
        let offline = DispatchConfig {
            external_client_available: false,
            ..online_config()
        };
        Dispatcher::new(&profile, &book, &offline, Some(&agent)).check_key(&mut log);
        assert_eq!(log.entries(), &[ChatMessage::bot(NO_CLIENT)]);

        let mut log = ChatLog::new();
        let online = online_config();
        wait(Dispatcher::new(&profile, &book, &online, Some(&agent)).check_key(&mut log));
        log.drain_pending();
        assert_eq!(
            log.entries(),
            &[ChatMessage::bot("Clé valide et API accessible (3 modèles).")]
        );
    }
}
