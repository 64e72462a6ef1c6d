use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use prd_rails_lib::commands::{self, ServiceContext};
use prd_rails_lib::config::{self, ConfigLoader, PartialConfig};
use prd_rails_lib::server::{self, ServerAppState};
use prd_rails_lib::shutdown::{register_signal_handlers, ShutdownState};
use std::path::PathBuf;

/// PRD Rails - turn a project questionnaire into a refined PRD and AI coding tool context
#[derive(Parser, Debug)]
#[command(name = "prd-rails")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the global config.toml)
    #[arg(long, global = true, env = "PRD_RAILS_CONFIG")]
    config: Option<PathBuf>,

    /// Root directory of the project store
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Print the effective configuration
    CheckConfig,
    /// Write the effective configuration to the config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List known export targets
    Targets,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to bind the server to
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Allowed CORS origin (repeatable; default allows any)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Directory with `{name}.tera` prompt overrides
    #[arg(long)]
    prompts_dir: Option<String>,

    /// Directory holding generate.md and workflow.md rule templates
    #[arg(long)]
    rule_templates_dir: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut overrides = PartialConfig {
        data_dir: cli.data_dir.clone(),
        ..PartialConfig::default()
    };
    if let Command::Serve(args) = &cli.command {
        overrides.port = args.port;
        overrides.bind = args.bind.clone();
        overrides.prompts_dir = args.prompts_dir.clone();
        overrides.rule_templates_dir = args.rule_templates_dir.clone();
        if !args.cors_origins.is_empty() {
            overrides.cors_origins = Some(args.cors_origins.clone());
        }
    }

    let config = config::load_config(cli.config.as_deref(), overrides)?;
    let loader = match cli.config.as_deref() {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };

    match cli.command {
        Command::Serve(_) => run_server_mode(config),
        Command::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::InitConfig { force } => {
            let path = loader
                .config_path()
                .ok_or_else(|| anyhow!("Could not determine the config file location"))?;
            if path.exists() && !force {
                return Err(anyhow!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                ));
            }
            loader.save_to_path(path, &config)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::Targets => {
            for target in commands::list_targets() {
                let status = if target.available { "available" } else { "coming soon" };
                println!("{:<12} {:<12} {}", target.id.as_str(), status, target.doc_files.join(", "));
            }
            Ok(())
        }
    }
}

fn run_server_mode(config: config::PrdRailsConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

    runtime.block_on(async {
        let shutdown_state = ShutdownState::new();
        if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let ctx = ServiceContext::from_config(&config)?;
        let state = ServerAppState::new(ctx, shutdown_state);

        server::run_server(&config.server, state)
            .await
            .map_err(|e| anyhow!(e))
    })
}
