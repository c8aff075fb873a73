use std::{
    path::{
        Path,
        PathBuf,
    },
    process::ExitCode,
    sync::Arc,
};

use anki_card_translator::{
    anki::{
        api::DEFAULT_ANKI_URL,
        AnkiConnectStore,
        JsonCollection,
        NoteId,
        NoteStore,
    },
    core::{
        BlockingTransport,
        EnvCredentials,
        Result,
        RuntimeTransport,
        Transport,
        TranslatorConfig,
    },
    persistence,
    providers::{
        adapter_for,
        ProviderAdapter,
    },
    translate::{
        run_batch,
        translate_single,
        BatchOutcome,
        SingleOutcome,
    },
};
use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};

mod host;

use host::TerminalHost;

#[derive(Parser)]
#[command(name = "anki-card-translator", version, about = "Translate Anki note fields with an LLM")]
pub struct Cli {
    /// Settings file (defaults to the app data directory)
    #[arg(long, global = true, env = "ANKI_TRANSLATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Work on a JSON collection file instead of a running Anki
    #[arg(long, global = true)]
    pub collection: Option<PathBuf>,

    #[arg(long, global = true, env = "ANKI_CONNECT_URL", default_value = DEFAULT_ANKI_URL)]
    pub anki_url: String,

    #[arg(long, global = true, value_enum, default_value_t = TransportKind::Blocking)]
    pub transport: TransportKind,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    Blocking,
    Runtime,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate every note matching a search query
    Batch(BatchArgs),
    /// Translate a single note
    Note(NoteArgs),
    /// Show or edit settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct BatchArgs {
    /// Search query, e.g. "deck:Renal tag:en" (defaults to batch_query_default)
    #[arg(long, short)]
    pub query: Option<String>,

    /// Do not ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct NoteArgs {
    pub id: NoteId,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Remove the settings file so the defaults apply
    Reset,
    /// Change one setting
    Set { key: String, value: String },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(persistence::default_config_path);

    match &cli.command {
        Commands::Config(command) => {
            run_config(command, &config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch(args) => {
            let config = TranslatorConfig::load(&config_path)?;
            let adapter = build_adapter(&cli, &config)?;
            let query = args.query.clone().unwrap_or_else(|| config.batch_query_default.clone());
            let mut host = TerminalHost::new(args.yes);

            let outcome = match &cli.collection {
                Some(path) => {
                    let store = JsonCollection::open(path.clone())?;
                    run_batch(&store, &query, &config, adapter.as_ref(), &mut host)?
                }
                None => {
                    let store = AnkiConnectStore::connect(&cli.anki_url)?;
                    run_batch(&store, &query, &config, adapter.as_ref(), &mut host)?
                }
            };
            if outcome == BatchOutcome::EmptyQuery {
                println!("Search query is empty, nothing to do.");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Note(args) => {
            let config = TranslatorConfig::load(&config_path)?;
            let adapter = build_adapter(&cli, &config)?;
            let translated = match &cli.collection {
                Some(path) => {
                    let store = JsonCollection::open(path.clone())?;
                    let translated = translate_one(&store, args.id, &config, adapter.as_ref());
                    store.save()?;
                    translated
                }
                None => {
                    let store = AnkiConnectStore::connect(&cli.anki_url)?;
                    translate_one(&store, args.id, &config, adapter.as_ref())
                }
            };
            Ok(if translated { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

fn build_adapter(cli: &Cli, config: &TranslatorConfig) -> Result<Box<dyn ProviderAdapter>> {
    let transport: Arc<dyn Transport> = match cli.transport {
        TransportKind::Blocking => Arc::new(BlockingTransport::new()?),
        TransportKind::Runtime => Arc::new(RuntimeTransport::new()?),
    };
    Ok(adapter_for(config.provider, transport, Arc::new(EnvCredentials)))
}

/// Shows the raw error message for a failed note; false on failure.
fn translate_one<S: NoteStore>(
    store: &S,
    id: NoteId,
    config: &TranslatorConfig,
    adapter: &dyn ProviderAdapter,
) -> bool {
    match translate_single(store, id, config, adapter) {
        Ok(outcome) => {
            println!("{}", outcome.message());
            outcome != SingleOutcome::NoteNotFound
        }
        Err(e) => {
            eprintln!("Error while translating current note:\n\n{e}");
            false
        }
    }
}

fn run_config(command: &ConfigCommand, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = TranslatorConfig::load(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Reset => {
            if TranslatorConfig::reset(path)? {
                println!("Settings reset to defaults.");
            } else {
                println!("No saved settings; defaults are already in effect.");
            }
        }
        ConfigCommand::Set { key, value } => {
            let config = TranslatorConfig::load(path)?.with_setting(key, value)?;
            config.save(path)?;
            println!("Settings saved.");
        }
    }
    Ok(())
}
