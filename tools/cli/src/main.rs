//! cftool CLI - compile CloudFormation templates and manage the secret vault.
//!
//! `cftool process` resolves a YAML template's directives and prints the
//! result as JSON. `cftool vault` generates keys and encrypts or inspects
//! the vault file that `!vault` directives read from.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

use cftool_crypto::VaultKey;
use cftool_format::to_json;
use cftool_template::{SourceLayout, Template};
use cftool_vault::{VaultConfig, VaultStore};

#[derive(Parser)]
#[command(name = "cftool")]
#[command(about = "cftool - A helpful CloudFormation wrapper")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file with "template" and "vault" sections.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base directory holding imports/ and files/.
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Vault key file (default: .vaultkey).
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Encrypted vault file (default: vault).
    #[arg(long, global = true)]
    vault_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template and print it as JSON.
    Process {
        /// Template file to compile.
        template: PathBuf,
    },

    /// Manage the encrypted vault.
    Vault {
        #[command(subcommand)]
        command: VaultCommands,
    },
}

#[derive(Subcommand)]
enum VaultCommands {
    /// Generate a new vault key and print it as base64.
    Keygen {
        /// Write the key to the key file instead of printing it.
        #[arg(short, long)]
        write: bool,

        /// Overwrite an existing key file.
        #[arg(short, long, requires = "write")]
        force: bool,
    },

    /// Encrypt a plaintext YAML document into the vault file.
    Encrypt {
        /// Plaintext source document.
        source: PathBuf,
    },

    /// Print the decrypted vault.
    Decrypt,

    /// Print one vault value as JSON.
    Get {
        /// Selector path, e.g. Database.Password.
        path: String,
    },
}

/// Template settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct TemplateConfig {
    /// Directory holding imports/ and files/.
    base_dir: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

/// Settings shared by all commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ToolConfig {
    template: TemplateConfig,
    vault: VaultConfig,
}

impl ToolConfig {
    /// Load settings from an optional JSON file, then apply flag overrides.
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(dir) = &cli.dir {
            config.template.base_dir = dir.clone();
        }
        if let Some(key_file) = &cli.key_file {
            config.vault.key_path = key_file.clone();
        }
        if let Some(vault_file) = &cli.vault_file {
            config.vault.vault_path = vault_file.clone();
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Invalid config {}", path.display()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG overrides the level, stdout is reserved for output
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ToolConfig::resolve(&cli)?;
    let store = VaultStore::new(config.vault.clone());

    match cli.command {
        Commands::Process { template } => cmd_process(config.template, &store, &template),

        Commands::Vault { command } => match command {
            VaultCommands::Keygen { write, force } => cmd_keygen(&store, write, force),
            VaultCommands::Encrypt { source } => cmd_encrypt(&store, &source),
            VaultCommands::Decrypt => cmd_decrypt(&store),
            VaultCommands::Get { path } => cmd_get(&store, &path),
        },
    }
}

/// Compile a template and print it.
fn cmd_process(config: TemplateConfig, store: &VaultStore, path: &Path) -> Result<()> {
    let mut template = Template::new(SourceLayout::new(config.base_dir), store.load());
    template
        .load(path)
        .with_context(|| format!("Failed to process template {}", path.display()))?;

    println!("{}", template.to_json()?);
    Ok(())
}

/// Generate a vault key.
fn cmd_keygen(store: &VaultStore, write: bool, force: bool) -> Result<()> {
    let key = VaultKey::generate();

    if !write {
        println!("{}", key.encode());
        return Ok(());
    }

    let path = &store.config().key_path;
    if path.exists() && !force {
        anyhow::bail!(
            "Key file {} already exists; pass --force to replace it",
            path.display()
        );
    }

    key.save(path).context("Failed to write key file")?;
    info!("Vault key written to {}", path.display());
    Ok(())
}

/// Encrypt a plaintext document into the vault file.
fn cmd_encrypt(store: &VaultStore, source: &Path) -> Result<()> {
    let key = store.load_key().context("Failed to load vault key")?;
    let plaintext = Zeroizing::new(
        std::fs::read(source)
            .with_context(|| format!("Failed to read {}", source.display()))?,
    );

    store
        .write(&key, &plaintext)
        .context("Failed to write vault")?;

    println!(
        "Vault written: {} ({} bytes of plaintext)",
        store.config().vault_path.display(),
        plaintext.len()
    );
    Ok(())
}

/// Print the decrypted vault.
fn cmd_decrypt(store: &VaultStore) -> Result<()> {
    let key = store.load_key().context("Failed to load vault key")?;
    let plaintext = Zeroizing::new(
        store
            .read_plaintext(&key)
            .context("Failed to decrypt vault")?,
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}

/// Print a single vault value.
fn cmd_get(store: &VaultStore, path: &str) -> Result<()> {
    let vault = store
        .try_load()
        .context("Failed to load vault")?
        .context("No vault available: key file or vault file is missing")?;

    let node = vault
        .select(path)
        .with_context(|| format!("Vault path not found: {}", path))?;

    println!("{}", to_json(node)?);
    Ok(())
}
