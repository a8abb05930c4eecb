mod cli;
mod color;
mod config;
mod logging;
mod probe;
mod registry;
mod selection;
mod settings;
mod sync;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{edit, list, test, ColorMode};
use registry::{Consumer, ProviderClass, WireApi};

#[derive(
    Parser, Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

/// Output formats
#[derive(
    Parser, ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(
    about = "Manage AI providers for coding CLIs and diagnose their endpoints",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, global = true, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Use this registry document instead of the configured one
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
    /// Output the result with the specified format
    #[arg(short, long, global = true, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured providers
    Providers,
    /// Show one provider in full
    Show(ProviderArgs),
    /// List bundled provider templates
    Templates,
    /// Show the provider and model bound to each consumer
    Bindings,
    /// Add a provider, blank or from a template
    Add(AddArgs),
    /// Remove a provider and everything bound to it
    Remove(ProviderArgs),
    /// Configure how a consumer reaches a provider
    Connector(ConnectorArgs),
    /// Edit the model catalog of a provider
    Catalog(CatalogArgs),
    /// Bind a provider and model to a consumer
    Bind(BindArgs),
    /// List the models a consumer can select from a provider
    Models(ModelsArgs),
    /// Restrict the models a consumer is offered
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Diagnose the endpoints of a provider
    Test(TestArgs),
}

#[derive(Parser)]
pub(crate) struct ProviderArgs {
    /// Provider id
    pub id: String,
}

#[derive(Parser)]
pub(crate) struct AddArgs {
    /// Provider id, derived from the name or template when omitted
    pub id: Option<String>,
    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Seed the provider from a bundled template
    #[arg(short, long)]
    pub template: Option<String>,
    /// Protocol family of a blank provider
    #[arg(short, long, default_value_t = ProviderClass::default())]
    pub class: ProviderClass,
    /// Environment variable name or token shared by every connector
    #[arg(short, long)]
    pub key: Option<String>,
}

#[derive(Parser)]
pub(crate) struct ConnectorArgs {
    /// Provider id
    pub provider: String,
    /// Consumer the connector serves
    pub consumer: Consumer,
    /// Base URL of the endpoint
    #[arg(short, long)]
    pub base_url: Option<String>,
    /// Wire API spoken by the endpoint
    #[arg(short, long)]
    pub wire_api: Option<WireApi>,
    /// Environment variable name or token for this connector only
    #[arg(short, long)]
    pub key: Option<String>,
    /// Map a model id to the id the endpoint expects, as FROM=TO
    #[arg(short, long = "alias")]
    pub aliases: Vec<String>,
    /// Remove the connector
    #[arg(long, conflicts_with_all = ["base_url", "wire_api", "key", "aliases"])]
    pub remove: bool,
}

#[derive(Parser)]
pub(crate) struct CatalogArgs {
    /// Provider id
    pub provider: String,
    /// Append a model
    #[arg(short, long)]
    pub add: Vec<String>,
    /// Remove a model
    #[arg(short, long)]
    pub remove: Vec<String>,
    /// Rename a model, as FROM=TO
    #[arg(long)]
    pub rename: Vec<String>,
    /// Set what a model supports, as MODEL=reasoning,tool-use,vision,long-context
    #[arg(long = "capabilities")]
    pub capabilities: Vec<String>,
}

#[derive(Parser)]
pub(crate) struct BindArgs {
    /// Consumer to bind
    pub consumer: Consumer,
    /// Provider id; omit to unbind
    pub provider: Option<String>,
    /// Model id, the provider's default when omitted
    #[arg(short, long)]
    pub model: Option<String>,
}

#[derive(Parser)]
pub(crate) struct ModelsArgs {
    /// Consumer the models are offered to
    pub consumer: Consumer,
    /// Provider id, the bound provider when omitted
    pub provider: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum OverrideAction {
    /// Replace the catalog-derived model list
    Set {
        consumer: Consumer,
        provider: String,
        #[arg(required = true)]
        models: Vec<String>,
    },
    /// Go back to the catalog-derived model list
    Clear { consumer: Consumer, provider: String },
}

#[derive(Parser)]
pub(crate) struct TestArgs {
    /// Provider id
    pub provider: String,
    /// Only test the connector of this consumer
    #[arg(short, long)]
    pub consumer: Option<Consumer>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = ColorMode::resolve_auto(cli.color);
    color::configure_color(color);

    let config = match config::read_config(cli.config.clone()) {
        Ok(config) => config,
        Err(err) => die!("{}", err),
    };

    logging::init(config.log_filter.as_deref(), color);

    let registry_path = match cli.registry.clone().or_else(|| config.registry_path()) {
        Some(path) => path,
        None => die!("cannot locate the registry, set HOME or pass --registry"),
    };

    let mut settings = cli::open_settings(&registry_path);
    let format = cli.format;

    match &cli.command {
        Commands::Providers => list::providers_cmd(&settings, format),
        Commands::Show(args) => list::show_cmd(&settings, args),
        Commands::Templates => list::templates_cmd(format),
        Commands::Bindings => list::bindings_cmd(&settings, format),
        Commands::Models(args) => list::models_cmd(&settings, args, format),
        Commands::Add(args) => edit::add_cmd(&mut settings, args),
        Commands::Remove(args) => edit::remove_cmd(&mut settings, args),
        Commands::Connector(args) => edit::connector_cmd(&mut settings, args),
        Commands::Catalog(args) => edit::catalog_cmd(&mut settings, args),
        Commands::Bind(args) => edit::bind_cmd(&mut settings, args),
        Commands::Override { action } => edit::override_cmd(&mut settings, action),
        Commands::Test(args) => test::test_cmd(&settings, args, config.probe_options(), format).await,
    }
}
