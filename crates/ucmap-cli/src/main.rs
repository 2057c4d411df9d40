mod control;
mod render;
mod session;
mod surface;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use ucmap_client::BackendClient;
use ucmap_core::shell::{navigate, TokenStore};
use ucmap_core::{AppConfig, Palette, SortMode, ViewSynchronizer};

use crate::control::Input;
use crate::render::OutputFormat;
use crate::session::{Control, SessionController, SessionState, STATUS_LOAD_FAILED};
use crate::surface::SnapshotSurface;

#[derive(Debug, Parser)]
#[command(name = "ucmap-cli")]
#[command(about = "Retail unit map viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the unit map, apply filters and print the resulting view
    View(ViewArgs),
    /// List the known networks with their marker colors
    Networks,
    /// Load the unit map and read filter controls from stdin, one per line
    Interactive {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Resolve a platform route through the login guard
    Route {
        /// Path to resolve, e.g. /plataforma/uc
        path: String,
    },
    /// Store a user token, marking the platform session as authenticated
    Login { token: String },
    /// Remove the stored user token
    Logout,
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Only show these networks (repeatable); defaults to every network
    #[arg(long = "network")]
    networks: Vec<String>,
    /// State (UF) to filter by, e.g. BA
    #[arg(long)]
    state: Option<String>,
    /// Tax ID substring (case-sensitive)
    #[arg(long)]
    cnpj: Option<String>,
    /// Name substring (case-insensitive)
    #[arg(long)]
    name: Option<String>,
    /// Sort order: nome_az, nome_za, rede_az or rede_za
    #[arg(long, default_value_t = SortMode::NameAsc)]
    sort: SortMode,
    /// Render markers individually instead of clustered
    #[arg(long)]
    no_clusters: bool,
    /// Skip fetching the state boundary overlay
    #[arg(long)]
    no_overlay: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl ViewArgs {
    /// Translates the flags into the controls a user would have clicked.
    fn controls(&self, known_networks: &[String]) -> Vec<Control> {
        let mut controls = Vec::new();
        if !self.networks.is_empty() {
            controls.extend(
                known_networks
                    .iter()
                    .filter(|n| !self.networks.contains(*n))
                    .map(|n| Control::SetNetwork {
                        name: n.clone(),
                        checked: false,
                    }),
            );
            controls.extend(self.networks.iter().map(|n| Control::SetNetwork {
                name: n.clone(),
                checked: true,
            }));
        }
        if let Some(state) = &self.state {
            controls.push(Control::SetState(state.clone()));
        }
        if let Some(cnpj) = &self.cnpj {
            controls.push(Control::SetTaxId(cnpj.clone()));
        }
        if let Some(name) = &self.name {
            controls.push(Control::SetName(name.clone()));
        }
        if self.sort != SortMode::default() {
            controls.push(Control::SetSort(self.sort));
        }
        if self.no_clusters {
            controls.push(Control::SetClustering(false));
        }
        controls
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = ucmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Some(Commands::View(args)) => run_view(&config, &args).await,
        Some(Commands::Networks) => run_networks(&config).await,
        Some(Commands::Interactive { format }) => run_interactive(&config, format).await,
        Some(Commands::Route { path }) => run_route(&config, &path),
        Some(Commands::Login { token }) => run_login(&config, &token),
        Some(Commands::Logout) => run_logout(&config),
        None => {
            println!("ucmap-cli: use --help to list commands");
            Ok(())
        }
    }
}

fn load_palette(config: &AppConfig) -> anyhow::Result<Palette> {
    match &config.palette_path {
        Some(path) => {
            let palette = ucmap_core::load_palette(path)?;
            tracing::debug!(path = %path.display(), "palette override loaded");
            Ok(palette)
        }
        None => Ok(Palette::default()),
    }
}

async fn load_session(
    config: &AppConfig,
    with_overlay: bool,
) -> anyhow::Result<SessionController<SnapshotSurface>> {
    let client = BackendClient::new(config)?;
    let mut session = SessionController::new(
        ViewSynchronizer::new(load_palette(config)?),
        SnapshotSurface::default(),
    );
    let overlay_url = with_overlay.then_some(config.overlay_url.as_str());
    session.load(&client, overlay_url).await;
    Ok(session)
}

async fn run_view(config: &AppConfig, args: &ViewArgs) -> anyhow::Result<()> {
    let mut session = load_session(config, !args.no_overlay).await?;
    if session.state() != SessionState::Ready {
        anyhow::bail!("{}", session.status().unwrap_or(STATUS_LOAD_FAILED));
    }

    for control in args.controls(session.registry().names()) {
        session.apply(control);
    }
    println!("{}", render::render(&session, args.format)?);
    Ok(())
}

async fn run_networks(config: &AppConfig) -> anyhow::Result<()> {
    let client = BackendClient::new(config)?;
    let registry = client.fetch_networks().await?;
    let palette = load_palette(config)?;

    if registry.is_empty() {
        println!("no networks returned by {}", config.api_base_url);
        return Ok(());
    }
    println!("{:<24}COLOR", "NETWORK");
    for entry in render::legend(&palette, &registry) {
        println!("{:<24}{}", entry.network, entry.color);
    }
    Ok(())
}

async fn run_interactive(config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session(config, true).await?;
    println!("{}", render::render(&session, format)?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match control::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Input::Quit)) => break,
            Ok(Some(Input::Show)) => println!("{}", render::render(&session, format)?),
            Ok(Some(Input::Control(control))) => {
                if let Some(report) = session.apply(control) {
                    println!("{}", render::summary_line(report));
                } else {
                    eprintln!("ignored: session not ready");
                }
            }
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

fn run_route(config: &AppConfig, path: &str) -> anyhow::Result<()> {
    let store = TokenStore::new(&config.token_path);
    let authenticated = store.is_authenticated()?;
    let nav = navigate(path, authenticated);
    tracing::debug!(path, authenticated, hops = nav.hops.len(), "route resolved");

    println!("{}", nav.hops.join(" -> "));
    println!(
        "view: {:?} ({}){}",
        nav.route,
        nav.path,
        if nav.route.uses_layout() {
            " [platform layout]"
        } else {
            ""
        }
    );
    Ok(())
}

fn run_login(config: &AppConfig, token: &str) -> anyhow::Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("token must not be empty");
    }
    let store = TokenStore::new(&config.token_path);
    store.save(token)?;
    tracing::info!(path = %store.path().display(), "user token stored");
    println!("logged in");
    Ok(())
}

fn run_logout(config: &AppConfig) -> anyhow::Result<()> {
    let store = TokenStore::new(&config.token_path);
    store.clear()?;
    println!("logged out");
    Ok(())
}
