use std::fs;
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lumi_contracts::catalog::Catalog;
use lumi_contracts::commands::{help_lines, parse_command, ShellCommand};
use lumi_contracts::conversation::Role;
use lumi_contracts::media::InlineImage;
use lumi_engine::screens::ai::STUDIO_FAILED;
use lumi_engine::screens::{
    AiMode, AiView, CartView, CategoryFilter, ExploreView, FitCheckState, OccasionView, OrdersView,
};
use lumi_engine::shell::{Screen, Storefront, Tab};
use lumi_engine::{
    ApiKeySlot, DryrunTransport, EventSink, Gateway, GatewayConfig, ImageSize, KeySelector,
    Outcome, Pose,
};

#[derive(Debug, Parser)]
#[command(name = "lumi", version, about = "Lumi storefront with an AI stylist")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive storefront shell.
    Shell(ShellArgs),
    /// One-line styling note for an occasion.
    Advice(AdviceArgs),
    /// Search-grounded trend report.
    Trends(TrendsArgs),
    /// Critique of a garment or outfit photo.
    Analyze(AnalyzeArgs),
    /// Studio product shot from a text concept.
    Studio(StudioArgs),
}

#[derive(Debug, Args)]
struct GatewayArgs {
    #[arg(long)]
    events: Option<PathBuf>,
    /// Answer locally with deterministic placeholders instead of calling Gemini.
    #[arg(long)]
    dryrun: bool,
}

#[derive(Debug, Parser)]
struct ShellArgs {
    #[arg(long, default_value = "lumi-out")]
    out: PathBuf,
    #[command(flatten)]
    gateway: GatewayArgs,
}

#[derive(Debug, Parser)]
struct AdviceArgs {
    #[arg(long)]
    occasion: String,
    #[command(flatten)]
    gateway: GatewayArgs,
}

#[derive(Debug, Parser)]
struct TrendsArgs {
    #[arg(long)]
    query: String,
    #[command(flatten)]
    gateway: GatewayArgs,
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    #[arg(long)]
    image: PathBuf,
    #[command(flatten)]
    gateway: GatewayArgs,
}

#[derive(Debug, Parser)]
struct StudioArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long, default_value_t = ImageSize::OneK)]
    size: ImageSize,
    #[arg(long)]
    out: PathBuf,
    #[command(flatten)]
    gateway: GatewayArgs,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("lumi error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Shell(args) => {
            run_shell(args)?;
            Ok(0)
        }
        Command::Advice(args) => run_advice(args),
        Command::Trends(args) => run_trends(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Studio(args) => run_studio(args),
    }
}

/// Asks for a Gemini key on stdin when the studio model needs one.
struct PromptKeySelector {
    slot: ApiKeySlot,
    required: bool,
}

impl KeySelector for PromptKeySelector {
    fn has_selected_key(&self) -> bool {
        !self.required || self.slot.is_set()
    }

    fn open_select_key(&mut self) -> Result<()> {
        print!("Studio renders need a paid Gemini API key. Paste it (blank to skip): ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed reading API key")?;
        self.slot.set(line.trim());
        if !self.slot.is_set() {
            bail!("no API key entered");
        }
        Ok(())
    }
}

fn build_gateway(args: &GatewayArgs) -> Result<(Gateway, PromptKeySelector)> {
    let config = GatewayConfig::from_env();
    let catalog = Arc::new(Catalog::mock());
    let gateway = if args.dryrun {
        Gateway::new(Arc::new(DryrunTransport::new()), catalog)
            .with_model_overrides(config.model_overrides.clone())
    } else {
        Gateway::from_config(&config, catalog)?
    };
    let events = match args.events.as_ref() {
        Some(path) => EventSink::to_file(path),
        None => EventSink::disabled(),
    };
    let keys = PromptKeySelector {
        slot: config.api_key.clone(),
        required: !args.dryrun,
    };
    Ok((gateway.with_events(events), keys))
}

fn report_fallback<T>(outcome: &Outcome<T>) {
    if let Some(reason) = outcome.reason() {
        eprintln!("(fallback: {reason})");
    }
}

fn report_event_failure(events: &EventSink) {
    if let Some(failure) = events.take_failure() {
        eprintln!("warning: {failure}");
    }
}

fn run_advice(args: AdviceArgs) -> Result<i32> {
    let (gateway, _) = build_gateway(&args.gateway)?;
    let outcome = gateway.fashion_advice(&args.occasion);
    report_fallback(&outcome);
    println!("{}", outcome.value());
    report_event_failure(gateway.events());
    Ok(0)
}

fn run_trends(args: TrendsArgs) -> Result<i32> {
    let (gateway, _) = build_gateway(&args.gateway)?;
    let outcome = gateway.grounded_advice(&args.query);
    report_fallback(&outcome);
    let advice = outcome.value();
    println!("{}", advice.text);
    for link in &advice.links {
        println!("  - {} <{}>", link.label(), link.uri);
    }
    report_event_failure(gateway.events());
    Ok(0)
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let image = InlineImage::from_path(&args.image)?;
    let (gateway, _) = build_gateway(&args.gateway)?;
    let outcome = gateway.analyze(&image);
    report_fallback(&outcome);
    println!("{}", outcome.value());
    report_event_failure(gateway.events());
    Ok(0)
}

fn run_studio(args: StudioArgs) -> Result<i32> {
    let (gateway, mut keys) = build_gateway(&args.gateway)?;
    if !keys.has_selected_key() {
        keys.open_select_key()?;
    }
    let outcome = gateway.studio_image(&args.prompt, args.size);
    report_fallback(&outcome);
    report_event_failure(gateway.events());
    match outcome.into_value() {
        Some(image) => {
            let path = image.write_to(&args.out, &format!("studio-{}", args.size))?;
            println!("Studio concept saved to {}", path.display());
            Ok(0)
        }
        None => {
            println!("{STUDIO_FAILED}");
            Ok(1)
        }
    }
}

struct ShellState {
    out: PathBuf,
    keys: PromptKeySelector,
    /// Transcript entries of the mounted AI screen already printed.
    ai_seen: usize,
    saved: usize,
}

impl ShellState {
    fn save(&mut self, image: &InlineImage, label: &str) -> Result<PathBuf> {
        self.saved += 1;
        image.write_to(&self.out, &format!("{:03}-{label}", self.saved))
    }
}

fn run_shell(args: ShellArgs) -> Result<()> {
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed creating {}", args.out.display()))?;
    let (gateway, keys) = build_gateway(&args.gateway)?;
    let mut shell = Storefront::new(gateway);
    let mut state = ShellState {
        out: args.out.clone(),
        keys,
        ai_seen: 0,
        saved: 0,
    };

    println!("Lumi started. Type /help for commands.");
    render(&shell, &mut state)?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}> ", shell.tab().label().to_ascii_lowercase());
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let command = parse_command(line.trim_end_matches(['\n', '\r']));
        match command {
            ShellCommand::Noop => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                println!("Commands:");
                for usage in help_lines() {
                    println!("  {usage}");
                }
                println!("Plain text talks to Lumi on the AI tab.");
                continue;
            }
            other => {
                let before = shell.tab();
                if let Err(err) = dispatch(&mut shell, &mut state, other) {
                    println!("{err:#}");
                    continue;
                }
                if shell.tab() != before {
                    state.ai_seen = 0;
                }
            }
        }
        render(&shell, &mut state)?;
        report_event_failure(shell.events());
    }
    Ok(())
}

fn dispatch(shell: &mut Storefront, state: &mut ShellState, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Say(text) => {
            let Some(ai) = shell.ai() else {
                bail!("Switch to the AI tab (/tab ai) to talk to Lumi.");
            };
            ai.set_input(text);
            if !shell.submit_ai(&mut state.keys)? {
                println!("Lumi is still composing a reply.");
            }
        }
        ShellCommand::Tab(name) => {
            let tab = name.parse::<Tab>().map_err(anyhow::Error::msg)?;
            shell.switch_tab(tab);
            state.ai_seen = 0;
        }
        ShellCommand::Category(name) => {
            let filter = CategoryFilter::parse(&name).map_err(anyhow::Error::msg)?;
            shell.select_category(filter)?;
        }
        ShellCommand::Open(id) => explore(shell)?.open_product(&id)?,
        ShellCommand::Color(color) => explore(shell)?.select_color(&color)?,
        ShellCommand::Dismiss => explore(shell)?.dismiss(),
        ShellCommand::AddToBag(None) => shell.add_selected()?,
        ShellCommand::AddToBag(Some(product_id)) => shell.add_suggested(&product_id)?,
        ShellCommand::FitCheck(pose) => {
            let pose = match pose {
                Some(raw) => raw.parse::<Pose>().map_err(anyhow::Error::msg)?,
                None => Pose::Front,
            };
            shell.fit_check(pose)?;
            if let Some(FitCheckState::Ready { pose, image }) =
                shell.explore().map(|screen| screen.fit_check().clone())
            {
                let path = state.save(&image, &format!("fitcheck-{}", pose.as_str().to_ascii_lowercase()))?;
                println!("Fit check saved to {}", path.display());
            }
        }
        ShellCommand::BuyNow => shell.buy_now()?,
        ShellCommand::CloseFitCheck => explore(shell)?.close_fit_check(),
        ShellCommand::Quantity { product_id, delta } => shell.update_quantity(&product_id, delta),
        ShellCommand::Remove(product_id) => shell.remove_from_cart(&product_id),
        ShellCommand::Mode(name) => {
            let mode = name.parse::<AiMode>().map_err(anyhow::Error::msg)?;
            ai(shell)?.set_mode(mode);
        }
        ShellCommand::Size(raw) => {
            let size = raw.parse::<ImageSize>().map_err(anyhow::Error::msg)?;
            ai(shell)?.set_image_size(size);
        }
        ShellCommand::Attach(path) => {
            let image = InlineImage::from_path(Path::new(&path))?;
            ai(shell)?.attach_image(image);
        }
        ShellCommand::Photo(path) => {
            shell.upload_photo(InlineImage::from_path(Path::new(&path))?);
        }
        ShellCommand::Theme => {
            let theme = shell.toggle_theme();
            println!("Theme: {}", theme.as_str());
        }
        ShellCommand::Occasion(name) => {
            shell.ask_occasion(&name);
            print_occasion(&shell.occasions().view());
        }
        ShellCommand::Invalid { message, .. } => bail!(message),
        ShellCommand::Unknown { command, .. } => {
            bail!("Unknown command /{command}. Type /help.")
        }
        ShellCommand::Noop | ShellCommand::Help | ShellCommand::Quit => {}
    }
    Ok(())
}

fn explore(shell: &mut Storefront) -> Result<&mut lumi_engine::screens::ExploreScreen> {
    match shell.explore() {
        Some(screen) => Ok(screen),
        None => bail!("That only works on the Explore tab (/tab explore)."),
    }
}

fn ai(shell: &mut Storefront) -> Result<&mut lumi_engine::screens::AiScreen> {
    match shell.ai() {
        Some(screen) => Ok(screen),
        None => bail!("That only works on the AI tab (/tab ai)."),
    }
}

fn render(shell: &Storefront, state: &mut ShellState) -> Result<()> {
    let nav = shell
        .nav()
        .into_iter()
        .map(|item| {
            let label = match item.badge {
                Some(units) => format!("{} ({units})", item.label),
                None => item.label.to_string(),
            };
            if item.active {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("{nav}");

    let has_photo = shell.photo().is_some();
    match shell.screen() {
        Screen::Explore(screen) => print_explore(&screen.view(has_photo)),
        Screen::Ai(screen) => {
            let view = screen.view();
            print_ai(&view, state)?;
        }
        Screen::Orders => print_orders(&shell.orders_view()),
        Screen::Cart => print_cart(&shell.cart_view()),
        Screen::Account => {
            let view = shell.account_view();
            println!("{} <{}>  Orders {}  Status {}", view.name, view.email, view.order_count, view.status);
            println!("My AI Model Photo: {}", view.photo_status);
            println!("Dark Mode: {}", if view.dark_mode { "on" } else { "off" });
            for item in &view.menu {
                match item.value {
                    Some(value) => println!("  {}  {value}", item.label),
                    None => println!("  {}", item.label),
                }
            }
        }
    }
    Ok(())
}

fn print_explore(view: &ExploreView) {
    let chips = view
        .chips
        .iter()
        .map(|chip| {
            if chip.active {
                format!("[{}]", chip.label)
            } else {
                chip.label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    println!("Explore / Lumiere Collection{}", if view.stylist_active { "  (AI Stylist Active)" } else { "" });
    println!("{chips}");
    if let Some(note) = view.curating.as_deref() {
        println!("Tailoring your gallery. {note}");
        return;
    }
    if view.personalized {
        println!("Personalized for you:");
    }
    for card in &view.products {
        println!("  {:<4} {:<32} {:<20} {}", card.id, card.name, card.category, card.price);
    }
    if let Some(detail) = view.detail.as_ref() {
        println!("-- {} ({}) {}", detail.product.name, detail.product.category, detail.product.price);
        println!("   {}", detail.description);
        let colors = detail
            .colors
            .iter()
            .map(|color| {
                if detail.selected_color.as_deref() == Some(color.as_str()) {
                    format!("[{color}]")
                } else {
                    color.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("   Colors: {colors}   /add  /fitcheck  /dismiss");
    }
    match &view.fit_check {
        FitCheckState::Closed => {}
        FitCheckState::Loading { pose } => println!("Fit check: generating {pose} profile..."),
        FitCheckState::Ready { pose, .. } => println!("Fit check ({pose}) ready.  /buy  /pose <side>  /close"),
        FitCheckState::Failed { pose } => println!("Fit check ({pose}): Generation Failed.  /pose <side>  /close"),
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "lumi",
    }
}

fn print_ai(view: &AiView, state: &mut ShellState) -> Result<()> {
    let new_messages: Vec<_> = view.messages.iter().skip(state.ai_seen).collect();
    if state.ai_seen == 0 {
        println!("Lumi / Intelligent Stylist  mode: {}", view.mode);
    }
    for entry in new_messages {
        if entry.text.is_empty() && entry.image.is_some() {
            println!("{}: [image]", speaker(entry.role));
        } else {
            println!("{}: {}", speaker(entry.role), entry.text);
        }
        if entry.role == Role::Assistant {
            if let Some(image) = entry.image.as_ref() {
                let path = state.save(image, "studio")?;
                println!("      image saved to {}", path.display());
            }
        }
        for link in &entry.links {
            println!("      - {} <{}>", link.label(), link.uri);
        }
        for card in &entry.products {
            println!("      * {} {} {}  (/add {})", card.id, card.name, card.price, card.id);
        }
    }
    state.ai_seen = view.messages.len();
    let size = view
        .image_size
        .map(|size| format!("  resolution: {size}"))
        .unwrap_or_default();
    let attached = view
        .attachment
        .as_deref()
        .map(|mime| format!("  attached: {mime}"))
        .unwrap_or_default();
    println!("[{}] {}{size}{attached}", view.mode, view.placeholder);
    Ok(())
}

fn print_cart(view: &CartView) {
    println!("Shopping Bag");
    if view.is_empty() {
        println!("  Your bag is empty. Items you add to your bag will show up here.");
    }
    for line in &view.lines {
        let color = line.color.as_deref().unwrap_or("-");
        println!(
            "  {:<4} {:<32} size {}  {color}  {} x{} = {}",
            line.product_id, line.name, line.size, line.unit_price, line.quantity, line.line_total
        );
    }
    println!("  Subtotal {}", view.subtotal);
    println!("  Shipping {}", view.shipping_label);
    println!("  Total    {}", view.total);
}

fn print_orders(view: &OrdersView) {
    println!("Your Orders");
    for row in &view.rows {
        println!("  {}  {}  {}  {}", row.id, row.date, row.status, row.total);
        if let Some(item) = row.lead_item.as_deref() {
            println!(
                "     {item} (size {}), {} item(s)",
                row.lead_size.as_deref().unwrap_or("-"),
                row.item_count
            );
        }
    }
}

fn print_occasion(view: &OccasionView) {
    println!("Popular Occasions: {}", view.occasions.join(" | "));
    if view.thinking {
        println!("Stylist is thinking...");
    }
    if let Some(note) = view.note.as_deref() {
        println!("Stylist Note: {note}");
    }
    if !view.suggestions.is_empty() {
        println!("Suggested for you:");
        for card in &view.suggestions {
            println!("  {:<4} {:<32} {}", card.id, card.name, card.price);
        }
    }
}
