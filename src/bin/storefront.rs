//! CLI binary for driving the storefront simulation.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use secrecy::SecretString;
use storefront_sim::assistant::{Assistant, GeminiClient, Headline, OfflineAssistant};
use storefront_sim::cart::CheckoutQuote;
use storefront_sim::filter::{ANY_REGION, DEFAULT_MAX_PRICE, ProductFilter, SortOrder};
use storefront_sim::messaging::{Correspondent, Sender};
use storefront_sim::models::{Category, CoinSide, OrderStatus, Product, ProductId, TierId, Vendor, VendorRank};
use storefront_sim::payment::PaymentMethod;
use storefront_sim::raffle::{RaffleEntry, time_to_draw};
use storefront_sim::store::Catalog;
use storefront_sim::{
    CheckoutOptions, DisplayCurrency, Storefront, StorefrontBuilder, StorefrontConfig,
    StorefrontEvent,
};

/// Environment variable name for the assistant API key.
const API_KEY_ENV: &str = "STOREFRONT_API_KEY";

/// Storefront simulation CLI: browse listings, check out and play.
#[derive(Debug, Parser)]
#[command(name = "storefront", version, about)]
struct Cli {
    /// TOML configuration file (defaults are used if omitted).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// JSON catalog file replacing the built-in listings.
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List products, optionally filtered and sorted.
    Listings(ListingArgs),
    /// List vendors derived from the catalog.
    Vendors {
        /// Show verified vendors only.
        #[arg(long)]
        verified: bool,
        /// Show the N vendors with the highest revenue.
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },
    /// Show the vendor rank ladder.
    Ranks,
    /// Buy a product tier and follow the order until it ships.
    Checkout(CheckoutArgs),
    /// Stake part of the wallet on a coinflip.
    Flip {
        /// Amount to stake.
        #[arg(long, value_parser = parse_amount)]
        wager: Decimal,
        /// Side to call.
        #[arg(long, value_enum, default_value_t = SideArg::Heads)]
        side: SideArg,
    },
    /// Enter the daily raffle.
    Raffle {
        /// Number of entries; the first is free.
        #[arg(long, default_value_t = 1)]
        entries: u32,
    },
    /// Ask the assistant a question.
    Ask {
        /// Question text.
        prompt: String,
    },
    /// Show market headlines from the assistant.
    News,
    /// Message a vendor, or support if no vendor is named, and wait for
    /// the reply.
    Message {
        /// Vendor display name.
        #[arg(long)]
        vendor: Option<String>,
        /// Message text.
        text: String,
    },
}

/// Arguments for the `listings` subcommand.
#[derive(Debug, Args)]
struct ListingArgs {
    /// Case-insensitive text matched against name and description.
    #[arg(long)]
    search: Option<String>,
    /// Restrict to a category; may be repeated.
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<Category>,
    /// Origin region.
    #[arg(long)]
    origin: Option<String>,
    /// Destination region; worldwide listings always match.
    #[arg(long)]
    ships_to: Option<String>,
    /// Lowest acceptable tier price.
    #[arg(long, default_value_t = 0)]
    min_price: u64,
    /// Highest acceptable tier price.
    #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
    max_price: u64,
    /// Ordering of the results.
    #[arg(long, value_enum, default_value_t = SortArg::Catalog)]
    sort: SortArg,
    /// Currency prices are shown in; the configured one if omitted.
    #[arg(long, value_enum)]
    currency: Option<CurrencyArg>,
}

/// Arguments for the `checkout` subcommand.
#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Product identifier.
    #[arg(long)]
    product: String,
    /// Tier identifier.
    #[arg(long)]
    tier: String,
    /// Number of units.
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    /// Add the mixing fee.
    #[arg(long)]
    mixing: bool,
    /// Pay from the simulated wallet instead of an external transfer.
    #[arg(long)]
    wallet: bool,
}

/// Listing order accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    /// Catalog order.
    Catalog,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best-rated vendor first.
    Rating,
    /// Most popular first.
    Popularity,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Catalog => Self::Catalog,
            SortArg::PriceAsc => Self::PriceLowToHigh,
            SortArg::PriceDesc => Self::PriceHighToLow,
            SortArg::Rating => Self::VendorRating,
            SortArg::Popularity => Self::Popularity,
        }
    }
}

/// Display currency accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CurrencyArg {
    /// Australian dollars.
    Aud,
    /// Bitcoin.
    Btc,
    /// Monero.
    Xmr,
}

impl From<CurrencyArg> for DisplayCurrency {
    fn from(arg: CurrencyArg) -> Self {
        match arg {
            CurrencyArg::Aud => Self::Aud,
            CurrencyArg::Btc => Self::Btc,
            CurrencyArg::Xmr => Self::Xmr,
        }
    }
}

/// Coin side accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    /// Heads.
    Heads,
    /// Tails.
    Tails,
}

impl From<SideArg> for CoinSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Heads => Self::Heads,
            SideArg::Tails => Self::Tails,
        }
    }
}

/// Parses a positive decimal amount for clap.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    let amount: Decimal = s.parse().map_err(|err| format!("{err}"))?;
    if amount <= Decimal::ZERO {
        return Err(format!("amount must be positive, got {amount}"));
    }
    Ok(amount)
}

/// Builds the listing filter from CLI arguments.
fn build_filter(args: &ListingArgs) -> ProductFilter {
    let mut filter = ProductFilter::new()
        .origin(args.origin.as_deref().unwrap_or(ANY_REGION))
        .ships_to(args.ships_to.as_deref().unwrap_or(ANY_REGION))
        .price_range(args.min_price, args.max_price);
    if let Some(text) = args.search.as_deref() {
        filter = filter.search(text);
    }
    if !args.categories.is_empty() {
        filter = filter.only_categories(args.categories.iter().copied());
    }
    filter
}

/// Writes an error line to stderr.
fn report(context: &str, err: &dyn core::fmt::Display) -> io::Result<()> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )
}

/// Loads configuration and catalog, then builds the storefront.
fn build_storefront(cli: &Cli) -> storefront_sim::Result<Storefront> {
    let config = match cli.config.as_deref() {
        Some(path) => StorefrontConfig::load(path)?,
        None => StorefrontConfig::default(),
    };
    let mut builder = StorefrontBuilder::new().config(config);
    if let Some(path) = cli.catalog.as_deref() {
        builder = builder.catalog(Catalog::load(path)?.products().to_vec());
    }
    Ok(builder.build())
}

/// Runs the CLI, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut store = match build_storefront(&cli) {
        Ok(store) => store,
        Err(err) => {
            report("failed to start storefront", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    match cli.command {
        Command::Listings(args) => cmd_listings(&store, &args),
        Command::Vendors { verified, top } => cmd_vendors(&store, verified, top),
        Command::Ranks => cmd_ranks(),
        Command::Checkout(args) => cmd_checkout(&mut store, &args).await,
        Command::Flip { wager, side } => cmd_flip(&mut store, wager, side.into()).await,
        Command::Raffle { entries } => cmd_raffle(&mut store, entries),
        Command::Message { vendor, text } => {
            let with = vendor.map_or(Correspondent::Support, Correspondent::Vendor);
            cmd_message(&mut store, with, &text).await
        }
        command @ (Command::Ask { .. } | Command::News) => {
            dispatch_assistant(store.config(), command).await
        }
    }
}

/// Runs an assistant command against Gemini, or offline without a key.
async fn dispatch_assistant(config: &StorefrontConfig, command: Command) -> io::Result<ExitCode> {
    let key = std::env::var(API_KEY_ENV).ok().filter(|val| !val.is_empty());
    let Some(key) = key else {
        writeln!(
            io::stderr().lock(),
            "{} {} is not set, using the offline assistant",
            "note:".cyan(),
            API_KEY_ENV.bold()
        )?;
        return cmd_assistant(&OfflineAssistant, command).await;
    };
    match GeminiClient::builder()
        .config(config.assistant.clone())
        .api_key(SecretString::from(key))
        .build()
    {
        Ok(client) => cmd_assistant(&client, command).await,
        Err(err) => {
            report("failed to build assistant", &err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `listings` subcommand.
fn cmd_listings(store: &Storefront, args: &ListingArgs) -> io::Result<ExitCode> {
    let products = store.listings(&build_filter(args), args.sort.into());
    let currency = args
        .currency
        .map_or_else(|| store.display_currency(), DisplayCurrency::from);
    print_listings_table(&products, currency)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `vendors` subcommand.
fn cmd_vendors(store: &Storefront, verified: bool, top: Option<usize>) -> io::Result<ExitCode> {
    let catalog = store.catalog();
    let vendors = match (top, verified) {
        (Some(limit), _) => catalog.top_vendors(limit),
        (None, true) => catalog.verified_vendors(),
        (None, false) => catalog.vendors(),
    };
    print_vendors_table(&vendors)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `ranks` subcommand.
fn cmd_ranks() -> io::Result<ExitCode> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Rank").fg(Color::Cyan),
        Cell::new("Requirement").fg(Color::Cyan),
        Cell::new("Perks").fg(Color::Cyan),
    ]);
    for rank in VendorRank::LADDER {
        _ = table.add_row(vec![
            Cell::new(rank),
            Cell::new(rank.requirement()),
            Cell::new(rank.perks().join(", ")),
        ]);
    }
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Vendor Ranks".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `checkout` subcommand: pays for one cart line and follows
/// the order until no timers remain.
async fn cmd_checkout(store: &mut Storefront, args: &CheckoutArgs) -> io::Result<ExitCode> {
    let product = ProductId::from(args.product.as_str());
    let tier = TierId::from(args.tier.as_str());
    let line = match store.add_to_cart(&product, &tier) {
        Ok(line) => line,
        Err(err) => {
            report("cannot add to cart", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    if !store.set_cart_quantity(&line, args.quantity) || store.cart().is_empty() {
        report("cannot check out", &"quantity must be at least 1")?;
        return Ok(ExitCode::FAILURE);
    }

    let options = CheckoutOptions {
        method: if args.wallet {
            PaymentMethod::Wallet
        } else {
            PaymentMethod::External
        },
        mixing: args.mixing,
    };
    match store.begin_checkout(options) {
        Ok(session) => print_quote(&session.quote, &session.tx_ref)?,
        Err(err) => {
            report("checkout rejected", &err)?;
            return Ok(ExitCode::FAILURE);
        }
    }
    if let Err(err) = store.confirm_payment_sent() {
        report("payment rejected", &err)?;
        return Ok(ExitCode::FAILURE);
    }

    let spinner = make_spinner("Detecting payment...");
    let mut placed = None;
    while let Some(event) = store.next_event().await {
        match event {
            StorefrontEvent::PaymentPhaseChanged { phase, .. } => {
                spinner.set_message(format!("Payment {phase}, settling..."));
            }
            StorefrontEvent::OrderPlaced { order, total } => {
                spinner.set_message(format!("Order {order} placed for {total:.2}, awaiting vendor..."));
                placed = Some(order);
            }
            StorefrontEvent::OrderStatusChanged { status, .. } => {
                spinner.set_message(format!("Order {status}..."));
            }
            StorefrontEvent::CheckoutFailed { reason, .. } => {
                spinner.finish_and_clear();
                report("checkout failed", &reason)?;
                return Ok(ExitCode::FAILURE);
            }
            StorefrontEvent::FlipResolved(_)
            | StorefrontEvent::DepositFound(_)
            | StorefrontEvent::WithdrawalCompleted(_)
            | StorefrontEvent::ReplyReceived { .. } => {}
        }
    }
    spinner.finish_and_clear();

    let Some(order) = placed.and_then(|id| store.orders().get(&id)) else {
        report("checkout failed", &"payment window expired")?;
        return Ok(ExitCode::FAILURE);
    };
    let mut out = io::stdout().lock();
    let status = if order.status == OrderStatus::Shipped {
        order.status.green().bold().to_string()
    } else {
        order.status.yellow().to_string()
    };
    writeln!(out, "{} {} {status}", "Order".bold(), order.id)?;
    writeln!(out, "  {} {} units", "Items:".bold(), order.unit_count())?;
    writeln!(out, "  {} {:.2}", "Charged:".bold(), order.total)?;
    writeln!(out, "  {} {:.2}", "Wallet:".bold(), store.wallet().balance())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `flip` subcommand.
async fn cmd_flip(store: &mut Storefront, wager: Decimal, side: CoinSide) -> io::Result<ExitCode> {
    if let Err(err) = store.flip(wager, side) {
        report("wager rejected", &err)?;
        return Ok(ExitCode::FAILURE);
    }
    let spinner = make_spinner("Flipping...");
    let event = store.next_event().await;
    spinner.finish_and_clear();

    let Some(StorefrontEvent::FlipResolved(result)) = event else {
        report("coinflip failed", &"the coin never landed")?;
        return Ok(ExitCode::FAILURE);
    };
    let mut out = io::stdout().lock();
    if result.won() {
        writeln!(
            out,
            "{} landed {}, paid {:.2}",
            "WIN".green().bold(),
            result.outcome,
            result.payout
        )?;
    } else {
        writeln!(
            out,
            "{} landed {}, lost {:.2}",
            "LOSS".red().bold(),
            result.outcome,
            result.wager
        )?;
    }
    writeln!(out, "  {} {:.2}", "Balance:".bold(), result.balance)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `raffle` subcommand.
fn cmd_raffle(store: &mut Storefront, entries: u32) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    for _ in 0..entries {
        let _others = store.simulate_raffle_activity();
        match store.enter_raffle() {
            Ok(RaffleEntry::Free) => writeln!(out, "{}", "Free ticket claimed".green())?,
            Ok(RaffleEntry::Paid(price)) => writeln!(out, "Ticket bought for {price:.2}")?,
            Err(err) => {
                report("raffle entry rejected", &err)?;
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    let raffle = store.raffle();
    let remaining = time_to_draw(chrono::Utc::now());
    writeln!(out)?;
    writeln!(out, "  {} {:.2}", "Pot:".bold(), raffle.pot())?;
    writeln!(out, "  {} {}", "Tickets sold:".bold(), raffle.tickets_sold())?;
    writeln!(
        out,
        "  {} {:02}:{:02}:{:02}",
        "Draw in:".bold(),
        remaining.num_hours(),
        remaining.num_minutes() % 60,
        remaining.num_seconds() % 60
    )?;
    writeln!(out, "  {} {:.2}", "Wallet:".bold(), store.wallet().balance())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `message` subcommand.
async fn cmd_message(
    store: &mut Storefront,
    with: Correspondent,
    text: &str,
) -> io::Result<ExitCode> {
    if let Err(err) = store.send_message(with.clone(), text) {
        report("message rejected", &err)?;
        return Ok(ExitCode::FAILURE);
    }
    let spinner = make_spinner("Waiting for a reply...");
    let event = store.next_event().await;
    spinner.finish_and_clear();
    if !matches!(event, Some(StorefrontEvent::ReplyReceived { .. })) {
        report("message failed", &"no reply arrived")?;
        return Ok(ExitCode::FAILURE);
    }

    let Some(thread) = store.thread(&with) else {
        return Ok(ExitCode::FAILURE);
    };
    let mut out = io::stdout().lock();
    for message in thread.messages() {
        let author = match message.sender {
            Sender::Buyer => "you".cyan().bold().to_string(),
            Sender::Correspondent => "them".magenta().bold().to_string(),
        };
        writeln!(
            out,
            "{} {author}: {}",
            message.sent_at.format("%H:%M").dimmed(),
            message.text
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `ask` and `news` subcommands.
async fn cmd_assistant<A: Assistant>(assistant: &A, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Ask { prompt } => {
            let spinner = make_spinner("Consulting the oracle...");
            let answer = assistant.complete_text(&prompt).await;
            spinner.finish_and_clear();
            writeln!(io::stdout().lock(), "{answer}")?;
        }
        Command::News => {
            let spinner = make_spinner("Fetching headlines...");
            let headlines = assistant.fetch_news_headlines().await;
            spinner.finish_and_clear();
            print_headlines(&headlines)?;
        }
        Command::Listings(_)
        | Command::Vendors { .. }
        | Command::Ranks
        | Command::Checkout(_)
        | Command::Flip { .. }
        | Command::Raffle { .. }
        | Command::Message { .. } => return Ok(ExitCode::FAILURE),
    }
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints products in a table.
fn print_listings_table(products: &[&Product], currency: DisplayCurrency) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "{}", "No listings match.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Vendor").fg(Color::Cyan),
        Cell::new("Price").fg(Color::Cyan),
        Cell::new("Ships to").fg(Color::Cyan),
    ]);

    for product in products {
        let price = product.price_range().map_or_else(
            || "\u{2014}".to_owned(),
            |(low, high)| {
                if low == high {
                    currency.format_price(low)
                } else {
                    format!(
                        "{} - {}",
                        currency.format_price(low),
                        currency.format_price(high)
                    )
                }
            },
        );
        let vendor = if product.vendor.verified {
            Cell::new(&product.vendor.name).fg(Color::Green)
        } else {
            Cell::new(&product.vendor.name)
        };
        _ = table.add_row(vec![
            Cell::new(&product.id),
            Cell::new(&product.name),
            Cell::new(product.category),
            vendor,
            Cell::new(price),
            Cell::new(&product.ships_to),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Listings".green().bold(),
        format_args!("({})", products.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints vendors in a table.
fn print_vendors_table(vendors: &[&Vendor]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if vendors.is_empty() {
        writeln!(out, "{}", "No vendors found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Vendor").fg(Color::Cyan),
        Cell::new("Rank").fg(Color::Cyan),
        Cell::new("Sales").fg(Color::Cyan),
        Cell::new("Revenue").fg(Color::Cyan),
        Cell::new("Rating").fg(Color::Cyan),
        Cell::new("Verified").fg(Color::Cyan),
    ]);

    for vendor in vendors {
        let verified = if vendor.verified {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(&vendor.name),
            Cell::new(vendor.rank),
            Cell::new(vendor.sales),
            Cell::new(vendor.total_revenue),
            Cell::new(format!("{:.1}", vendor.rating)),
            verified,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Vendors".green().bold(),
        format_args!("({})", vendors.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the frozen checkout breakdown.
fn print_quote(quote: &CheckoutQuote, tx_ref: &str) -> io::Result<()> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Line").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);
    _ = table.add_row(vec![Cell::new("Subtotal"), Cell::new(quote.subtotal)]);
    _ = table.add_row(vec![
        Cell::new("With service fee"),
        Cell::new(format!("{:.2}", quote.base_total)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Mixing fee"),
        Cell::new(format!("{:.2}", quote.mixing_fee)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Network fee"),
        Cell::new(format!("{:.2}", quote.network_fee)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Total").fg(Color::Green),
        Cell::new(format!("{:.2}", quote.grand_total())).fg(Color::Green),
    ]);

    let mut out = io::stdout().lock();
    writeln!(out, "{} {}", "Checkout".green().bold(), tx_ref.dimmed())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints headlines as a list.
fn print_headlines(headlines: &[Headline]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Market News".green().bold())?;
    writeln!(out)?;
    for headline in headlines {
        writeln!(out, "  {} {}", headline.title, format_args!("({})", headline.source).dimmed())?;
    }
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // stderr itself failed; nothing else to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
