use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbscaffold::codegen::format::GoFmt;
use dbscaffold::{config, rules, scaffold, workspace, GenerateError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate application code from a database and apply the rules
    #[command(alias = "g")]
    Generate {
        /// Run only one stage; both run when omitted
        target: Option<Target>,
        /// Database URL; defaults to DATABASE_URL, then a local test database
        #[arg(long, short = 'c')]
        conn: Option<String>,
        /// Application directory inside GOPATH
        #[arg(long, default_value = ".")]
        app_dir: PathBuf,
        /// Extra native type mappings under [db_types]
        #[arg(long, default_value = config::DEFAULT_TYPE_MAP)]
        type_map: PathBuf,
    },
    /// Create the skeleton of a new API application
    New {
        /// Directory of the application, created inside the current directory
        name: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    /// Models, controllers and routers
    Code,
    /// Rule splicing and the route manifest
    Rule,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn generate_code(conn: &str, app_dir: &Path, type_map: &Path, formatter: &GoFmt) -> Result<()> {
    let pkg_path = workspace::package_path(app_dir)?;
    let type_map = config::load_type_map(type_map)?;
    info!(conn, package = %pkg_path, "Using database connection");
    let snapshot = dbscaffold::introspect_database(conn).await?;
    dbscaffold::generate_code(&snapshot, &type_map, app_dir, &pkg_path, formatter)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            target,
            conn,
            app_dir,
            type_map,
        } => {
            let formatter = GoFmt::locate();
            let conn = config::resolve_conn(conn);
            if !matches!(target, Some(Target::Rule)) {
                generate_code(&conn, &app_dir, &type_map, &formatter).await?;
            }
            let rule_file = app_dir.join(rules::RULE_FILE);
            if target.is_none() && !rule_file.exists() {
                warn!(file = %rule_file.display(), "no rule document, skipping rules");
            } else if !matches!(target, Some(Target::Code)) {
                rules::apply_rules(&app_dir, &formatter)?;
            }
            info!("successfully generated!");
        }
        Commands::New { name } => {
            let cwd = std::env::current_dir().context("could not read the working directory")?;
            let dir = cwd.join(&name);
            let cwd_pkg = match workspace::package_path(&cwd) {
                Ok(pkg) => pkg,
                Err(GenerateError::AtWorkspaceRoot(_)) => String::new(),
                Err(e) => return Err(e.into()),
            };
            let app = name.to_string_lossy().replace('\\', "/");
            let pkg_path = if cwd_pkg.is_empty() {
                app
            } else {
                format!("{}/{}", cwd_pkg, app)
            };
            scaffold::new_app(&dir, &pkg_path)?;
        }
    }
    Ok(())
}
