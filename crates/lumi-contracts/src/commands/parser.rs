use super::command_registry::{find_kind, CommandKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Noop,
    /// Free text typed without a leading slash.
    Say(String),
    Help,
    Quit,
    Tab(String),
    Category(String),
    Open(String),
    Color(String),
    /// Without an id, the open product sheet; with one, a product Lumi suggested.
    AddToBag(Option<String>),
    Dismiss,
    FitCheck(Option<String>),
    BuyNow,
    CloseFitCheck,
    Quantity { product_id: String, delta: i64 },
    Remove(String),
    Mode(String),
    Size(String),
    Attach(String),
    Photo(String),
    Theme,
    Occasion(String),
    Invalid { command: String, message: String },
    Unknown { command: String, arg: String },
}

fn split_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn single_path_arg(arg: &str) -> String {
    let parts = split_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

fn required(command: &str, arg: &str, build: impl FnOnce(String) -> ShellCommand) -> ShellCommand {
    if arg.is_empty() {
        return ShellCommand::Invalid {
            command: command.to_string(),
            message: format!("/{command} requires an argument"),
        };
    }
    build(arg.to_string())
}

fn parse_quantity(command: &str, arg: &str) -> ShellCommand {
    let parts = split_args(arg);
    let invalid = |message: String| ShellCommand::Invalid {
        command: command.to_string(),
        message,
    };
    let [product_id, delta] = parts.as_slice() else {
        return invalid(format!("/{command} takes <product-id> <delta>"));
    };
    match delta.trim_start_matches('+').parse::<i64>() {
        Ok(delta) => ShellCommand::Quantity {
            product_id: product_id.clone(),
            delta,
        },
        Err(_) => invalid(format!("'{delta}' is not a whole number")),
    }
}

pub fn parse_command(text: &str) -> ShellCommand {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return ShellCommand::Noop;
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return ShellCommand::Say(raw_trimmed.to_string());
    };
    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return ShellCommand::Say(raw_trimmed.to_string());
    }
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    let Some(kind) = find_kind(&command) else {
        return ShellCommand::Unknown {
            command,
            arg: arg.to_string(),
        };
    };

    match kind {
        CommandKind::Help => ShellCommand::Help,
        CommandKind::Quit => ShellCommand::Quit,
        CommandKind::AddToBag => ShellCommand::AddToBag((!arg.is_empty()).then(|| arg.to_string())),
        CommandKind::Dismiss => ShellCommand::Dismiss,
        CommandKind::BuyNow => ShellCommand::BuyNow,
        CommandKind::CloseFitCheck => ShellCommand::CloseFitCheck,
        CommandKind::Theme => ShellCommand::Theme,
        CommandKind::Orders => ShellCommand::Tab("orders".to_string()),
        CommandKind::FitCheck => {
            if arg.is_empty() {
                ShellCommand::FitCheck(None)
            } else {
                ShellCommand::FitCheck(Some(arg.to_string()))
            }
        }
        CommandKind::Tab => required(&command, arg, ShellCommand::Tab),
        CommandKind::Category => required(&command, arg, ShellCommand::Category),
        CommandKind::Open => required(&command, arg, ShellCommand::Open),
        CommandKind::Color => required(&command, arg, ShellCommand::Color),
        CommandKind::Remove => required(&command, arg, ShellCommand::Remove),
        CommandKind::Mode => required(&command, arg, ShellCommand::Mode),
        CommandKind::Size => required(&command, arg, ShellCommand::Size),
        CommandKind::Occasion => required(&command, arg, ShellCommand::Occasion),
        CommandKind::Attach => required(&command, &single_path_arg(arg), ShellCommand::Attach),
        CommandKind::Photo => required(&command, &single_path_arg(arg), ShellCommand::Photo),
        CommandKind::Quantity => parse_quantity(&command, arg),
    }
}
