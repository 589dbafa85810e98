use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use listing_cms::logging::init_tracing;
use listing_cms::server::AppServer;
use listing_cms::settings::Settings;
use listing_cms::site::parse_module;

#[derive(Parser)]
#[command(name = "listing-cms")]
#[command(about = "Content server for a single-property listing site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Settings file (default: ~/.config/listing-cms/config.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Address to listen on, overrides server.bind_addr
        #[arg(long)]
        bind: Option<String>,

        /// Site configuration module, overrides store.module_path
        #[arg(long)]
        module: Option<PathBuf>,
    },
    /// Parse the site configuration module and list its sections
    Check {
        /// Settings file (default: ~/.config/listing-cms/config.toml)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Site configuration module, overrides store.module_path
        #[arg(long)]
        module: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            settings,
            bind,
            module,
        } => {
            init_tracing();
            let mut settings = load_settings(settings.as_deref())?;
            if let Some(bind) = bind {
                settings.server.bind_addr = bind;
            }
            if let Some(module) = module {
                settings.store.module_path = module;
            }
            settings.validate()?;
            serve(settings).await
        }
        Commands::Check { settings, module } => {
            let settings = load_settings(settings.as_deref())?;
            let path = module.unwrap_or(settings.store.module_path);
            check(&path)
        }
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::settings_path);
    Settings::load_from(&path).with_context(|| format!("loading settings from {}", path.display()))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let mut server = AppServer::new(&settings)?;
    server.bind().await?;
    server.run().await?;
    Ok(())
}

fn check(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let document = parse_module(&text).with_context(|| format!("parsing {}", path.display()))?;

    println!("{}: {} section(s)", path.display(), document.len());
    for (name, value) in &document {
        println!("  {:<24} {}", name, describe(value));
    }
    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(fields) => format!("object ({} fields)", fields.len()),
        Value::Array(items) => format!("array ({} items)", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}
