use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reputation_explorer::config::load_or_default;
use reputation_explorer::store::{CredentialSlot, CredentialStore, KvStore};

#[derive(Parser)]
#[command(name = "explorer-admin")]
#[command(about = "Manage API credentials for the reputation explorer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a credential (dune, talent or farcaster)
    Set { slot: CredentialSlot, secret: String },
    /// Show which credentials are stored
    Show,
    /// Remove a stored credential
    Clear { slot: CredentialSlot },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    let store = CredentialStore::new(KvStore::open(&config.store.path)?);

    match cli.command {
        Commands::Set { slot, secret } => {
            let secret = secret.trim();
            if secret.is_empty() {
                return Err("secret must not be empty".into());
            }
            store.set_slot(slot, secret)?;
            println!("Saved {} key: {}", slot, mask(secret));
        }
        Commands::Show => {
            for slot in CredentialSlot::ALL {
                match store.get_slot(slot) {
                    Some(secret) => println!("{:<10} {}", slot, mask(&secret)),
                    None => println!("{:<10} (not set)", slot),
                }
            }
            if let Some((subject, _)) = store.last_subject() {
                println!("{:<10} {}", "last", subject);
            }
        }
        Commands::Clear { slot } => {
            if store.clear_slot(slot)? {
                println!("Cleared {} key", slot);
            } else {
                println!("No {} key stored", slot);
            }
        }
    }

    Ok(())
}

fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
