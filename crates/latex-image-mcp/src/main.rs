//! latex-image MCP server entry point.

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use latex_image::NoElicitation;
use latex_image_mcp::config::ServerConfig;
use latex_image_mcp::session::LatexSession;
use latex_image_mcp::tools::latex_render::failure_text;
use latex_image_mcp::tools::ToolRegistry;
use latex_image_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "latex-image-mcp",
    about = "MCP server that renders LaTeX formulas as inline markdown images",
    version
)]
struct Cli {
    /// Path to the preferences file.
    #[arg(short, long)]
    config: Option<String>,

    /// Rendering endpoint; the LaTeX source is sent as its query string.
    #[arg(long)]
    endpoint: Option<String>,

    /// Largest PNG accepted from the renderer, in bytes.
    #[arg(long)]
    max_image_bytes: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Render one formula with the stored preferences and print the markdown.
    Render {
        /// LaTeX formula, without delimiters.
        formula: String,
    },

    /// Print the effective preferences as JSON.
    Prefs,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   latex-image-mcp completions bash > ~/.local/share/bash-completion/completions/latex-image-mcp
    ///   latex-image-mcp completions zsh > ~/.zfunc/_latex-image-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::resolve(
        cli.config.as_deref(),
        cli.endpoint.as_deref(),
        cli.max_image_bytes,
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("latex-image MCP server v{}", env!("CARGO_PKG_VERSION"));
            let session = Arc::new(LatexSession::open(&config)?);
            let transport = StdioTransport::new(session);
            transport.run().await?;
        }

        Commands::Render { formula } => {
            let session = LatexSession::open(&config)?;
            match session.render(&formula, &NoElicitation).await {
                Ok(image) => println!("{}", image.to_markdown()),
                Err(e) => {
                    eprintln!("{}", failure_text(&formula, &e.to_string()));
                    std::process::exit(1);
                }
            }
        }

        Commands::Prefs => {
            let session = LatexSession::open(&config)?;
            let preferences = session.preferences().await;
            println!("{}", serde_json::to_string_pretty(&preferences)?);
        }

        Commands::Info => {
            let capabilities = latex_image_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "endpoint": config.endpoint,
                "config_path": config.config_path,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "latex-image-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
