mod seed;

use clap::{Parser, Subcommand};
use godown_core::chat::ChatReply;
use godown_core::config::GodownConfig;
use godown_server::state::AppState;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "godown",
    about = "Conversational inventory assistant — manage warehouses and crop lots over chat",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root holding .godown/config.yaml (default: current directory)
    #[arg(long, global = true, env = "GODOWN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(long, default_value_t = 3172)]
        port: u16,
    },

    /// Send one message through the decision pipeline and print the reply
    Chat {
        /// User identity the message belongs to
        #[arg(long, default_value = "local")]
        user: String,

        /// Seed fixture (YAML) loaded into the in-memory store first
        #[arg(long)]
        seed: Option<PathBuf>,

        message: String,
    },

    /// Interactive chat session against an in-memory store
    Repl {
        #[arg(long, default_value = "local")]
        user: String,

        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// List the crop vocabulary with shelf life and storage ceilings
    Crops,
}

fn load_config(root: &Option<PathBuf>) -> GodownConfig {
    let root = root.clone().unwrap_or_else(|| PathBuf::from("."));
    GodownConfig::load_or_default(&root)
}

fn print_reply(reply: &ChatReply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }
    if let Some(context) = &reply.context {
        println!("{context}");
    } else if let Some(text) = &reply.reply {
        println!("{text}");
    } else {
        println!("({} / {})", reply.intent, reply.confidence);
    }
    Ok(())
}

async fn seeded_state(config: GodownConfig, seed: &Option<PathBuf>) -> anyhow::Result<AppState> {
    let state = AppState::new(config);
    if let Some(path) = seed {
        let fixture = seed::SeedFixture::load(path)?;
        fixture.apply(&state.store).await?;
    }
    Ok(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("godown=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.root);

    match cli.command {
        Commands::Serve { port } => {
            godown_server::serve(config, port).await?;
        }
        Commands::Chat {
            user,
            seed,
            message,
        } => {
            let state = seeded_state(config, &seed).await?;
            let reply = state.pipeline.handle(&message, &user).await;
            print_reply(&reply, cli.json)?;
        }
        Commands::Repl { user, seed } => {
            let state = seeded_state(config, &seed).await?;
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            eprintln!("godown repl — type a message, or 'exit' to quit");
            loop {
                write!(stdout, "> ")?;
                stdout.flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let reply = state.pipeline.handle(line, &user).await;
                print_reply(&reply, cli.json)?;
            }
        }
        Commands::Crops => {
            if cli.json {
                let list: Vec<serde_json::Value> = godown_core::crops::CROPS
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "name": c.name,
                            "shelf_life_days": c.shelf_life_days,
                            "max_temp_c": c.max_temp_c,
                            "max_humidity_pct": c.max_humidity_pct,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                println!("{:<12} {:>10} {:>12} {:>12}", "crop", "shelf(d)", "max temp", "max RH");
                for c in godown_core::crops::CROPS {
                    println!(
                        "{:<12} {:>10} {:>11}C {:>11}%",
                        c.name, c.shelf_life_days, c.max_temp_c, c.max_humidity_pct
                    );
                }
            }
        }
    }
    Ok(())
}
