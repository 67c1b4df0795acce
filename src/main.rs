//! # MediStruct CLI (`medistruct`)
//!
//! ```bash
//! medistruct serve                              # start the HTTP server
//! medistruct documents                          # list stored records
//! medistruct ask "which files are reports?"     # one-off question
//! medistruct --config ./config/medistruct.toml serve
//! ```
//!
//! Without `--config` the built-in defaults are used (Neo4j on
//! `bolt://localhost:7687`, Ollama `phi3.5`, uploads under `./uploads`).
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use medistruct::config::load_config;
use medistruct::llm::OllamaChat;
use medistruct::{answer_question, server, store};

/// MediStruct: document intake and question answering over a document graph.
#[derive(Parser)]
#[command(name = "medistruct", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Connects to the document store first; the process exits with an
    /// error if the store is unreachable.
    Serve,

    /// Print every stored document record as `name<TAB>path`.
    Documents,

    /// Answer one question against the stored records and print the reply.
    Ask {
        /// The question text.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&config).await?;
        }
        Commands::Documents => {
            let store = store::connect(&config.store).await?;
            for record in store.list_documents().await? {
                println!("{}\t{}", record.name, record.path);
            }
        }
        Commands::Ask { question } => {
            let store = store::connect(&config.store).await?;
            let model = OllamaChat::new(&config.llm);
            let answer = answer_question(store.as_ref(), &model, &question).await?;
            println!("{}", answer.into_text());
        }
    }

    Ok(())
}
