#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommandKind {
    Help,
    Quit,
    Tab,
    Orders,
    Category,
    Open,
    Color,
    AddToBag,
    Dismiss,
    FitCheck,
    BuyNow,
    CloseFitCheck,
    Quantity,
    Remove,
    Mode,
    Size,
    Attach,
    Photo,
    Theme,
    Occasion,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub kind: CommandKind,
    pub usage: &'static str,
}

pub(crate) const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        kind: CommandKind::Help,
        usage: "/help",
    },
    CommandSpec {
        command: "tab",
        kind: CommandKind::Tab,
        usage: "/tab <explore|ai|orders|cart|account>",
    },
    CommandSpec {
        command: "orders",
        kind: CommandKind::Orders,
        usage: "/orders",
    },
    CommandSpec {
        command: "category",
        kind: CommandKind::Category,
        usage: "/category <all|shirt|t-shirt|...>",
    },
    CommandSpec {
        command: "open",
        kind: CommandKind::Open,
        usage: "/open <product-id>",
    },
    CommandSpec {
        command: "color",
        kind: CommandKind::Color,
        usage: "/color <hex>",
    },
    CommandSpec {
        command: "add",
        kind: CommandKind::AddToBag,
        usage: "/add [product-id]",
    },
    CommandSpec {
        command: "dismiss",
        kind: CommandKind::Dismiss,
        usage: "/dismiss",
    },
    CommandSpec {
        command: "fitcheck",
        kind: CommandKind::FitCheck,
        usage: "/fitcheck [front|left|right|back]",
    },
    CommandSpec {
        command: "pose",
        kind: CommandKind::FitCheck,
        usage: "/pose <front|left|right|back>",
    },
    CommandSpec {
        command: "buy",
        kind: CommandKind::BuyNow,
        usage: "/buy",
    },
    CommandSpec {
        command: "close",
        kind: CommandKind::CloseFitCheck,
        usage: "/close",
    },
    CommandSpec {
        command: "qty",
        kind: CommandKind::Quantity,
        usage: "/qty <product-id> <delta>",
    },
    CommandSpec {
        command: "remove",
        kind: CommandKind::Remove,
        usage: "/remove <product-id>",
    },
    CommandSpec {
        command: "mode",
        kind: CommandKind::Mode,
        usage: "/mode <chat|search|studio|analyze>",
    },
    CommandSpec {
        command: "size",
        kind: CommandKind::Size,
        usage: "/size <1K|2K|4K>",
    },
    CommandSpec {
        command: "attach",
        kind: CommandKind::Attach,
        usage: "/attach <image-path>",
    },
    CommandSpec {
        command: "photo",
        kind: CommandKind::Photo,
        usage: "/photo <image-path>",
    },
    CommandSpec {
        command: "theme",
        kind: CommandKind::Theme,
        usage: "/theme",
    },
    CommandSpec {
        command: "occasion",
        kind: CommandKind::Occasion,
        usage: "/occasion <name>",
    },
    CommandSpec {
        command: "quit",
        kind: CommandKind::Quit,
        usage: "/quit",
    },
    CommandSpec {
        command: "exit",
        kind: CommandKind::Quit,
        usage: "/exit",
    },
];

pub(crate) fn find_kind(command: &str) -> Option<CommandKind> {
    COMMANDS
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.kind)
}

pub fn help_lines() -> Vec<&'static str> {
    COMMANDS.iter().map(|spec| spec.usage).collect()
}
