/// What a line typed into the chat box asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Profile,
    Recipes,
    Help,
    Recipe(&'a str),
    Needs(&'a str),
    /// `/recipe` or `/needs` typed without a name.
    MissingArgument(&'static str),
    FreeText(&'a str),
}

pub const RECIPE: &str = "/recipe";
pub const NEEDS: &str = "/needs";

impl<'a> Command<'a> {
    /// Classify one input line.
    ///
    /// Keywords match case-insensitively as prefixes of the trimmed line, in
    /// this order: `/profile`, `/recipes`, `/help`, `/recipe <name>`,
    /// `/needs <name>`. The two lookup forms need a space between keyword
    /// and name; the name itself is trimmed.
    pub fn parse(input: &'a str) -> Self {
        let text = input.trim();

        if text.is_empty() {
            return Command::Empty;
        }
        if has_prefix(text, "/profile") {
            return Command::Profile;
        }
        if has_prefix(text, "/recipes") {
            return Command::Recipes;
        }
        if has_prefix(text, "/help") {
            return Command::Help;
        }
        if let Some(name) = strip_keyword(text, RECIPE) {
            return Command::Recipe(name);
        }
        if let Some(name) = strip_keyword(text, NEEDS) {
            return Command::Needs(name);
        }
        if text.eq_ignore_ascii_case(RECIPE) {
            return Command::MissingArgument(RECIPE);
        }
        if text.eq_ignore_ascii_case(NEEDS) {
            return Command::MissingArgument(NEEDS);
        }

        Command::FreeText(text)
    }
}

fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// `"/recipe  Anneau "` → `Some("Anneau")` for keyword `/recipe`.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.get(keyword.len()..)?;
    if !has_prefix(text, keyword) || !rest.starts_with(' ') {
        return None;
    }
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}
