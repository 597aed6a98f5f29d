use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use syllabus::api::{HttpBackend, SyllabusBackend};
use syllabus::app::App;
use syllabus::config::Config;
use syllabus::logging;
use syllabus::review::ReviewDecision;
use syllabus::sections::SectionKind;
use syllabus::wizard::{LocationStore, SessionFile, SyllabusIdentity};

#[derive(Parser)]
#[command(name = "syllabus")]
#[command(about = "Terminal wizard for drafting and reviewing course syllabi")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Course code of the syllabus to draft
    #[arg(long)]
    codigo: Option<String>,

    /// Existing syllabus to continue editing
    #[arg(long)]
    syllabus_id: Option<u64>,

    /// Resume from a location string; without a value, from the last session
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    resume: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the effective configuration to the user config file
    Init {
        /// Backend base URL to store
        #[arg(long)]
        base_url: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print every section of a syllabus as JSON
    Show {
        /// Syllabus id
        id: u64,
    },

    /// Coordinator review of submitted syllabi
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List syllabi waiting for review
    List,

    /// Approve a syllabus
    Approve {
        id: u64,

        /// Optional note for the teacher
        #[arg(long)]
        comment: Option<String>,
    },

    /// Send a syllabus back with observations
    Reject {
        id: u64,

        /// Reason for the rejection (required)
        #[arg(long)]
        comment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none();

    // Initialize logging (file-based for TUI, stderr for CLI)
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Init { base_url, force }) => cmd_init(config, base_url, force)?,
        Some(Commands::Show { id }) => cmd_show(connect(&config)?.as_ref(), id).await?,
        Some(Commands::Review { action }) => {
            cmd_review(connect(&config)?.as_ref(), action).await?;
        }
        None => {
            let backend = connect(&config)?;
            let session = SessionFile::new(config.session_path());
            let identity = resolve_identity(&cli.codigo, cli.syllabus_id, &cli.resume, &session)?;
            run_tui(
                config,
                backend,
                identity,
                Arc::new(session),
                logging_handle.log_file_path,
            )
            .await?;
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<Arc<dyn SyllabusBackend>> {
    let backend =
        HttpBackend::from_config(&config.backend).context("Failed to create backend client")?;
    Ok(Arc::new(backend))
}

/// Write the loaded configuration, with an optional base URL, to the user config file
fn cmd_init(mut config: Config, base_url: Option<String>, force: bool) -> Result<()> {
    let path = Config::user_config_path().context("No config directory on this platform")?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(url) = base_url {
        config.backend.base_url = url;
    }
    config.save()?;
    println!("Configuración guardada en {}", path.display());
    Ok(())
}

/// Pick the identity to open the wizard with: resume location, flags or a new syllabus
fn resolve_identity(
    codigo: &Option<String>,
    syllabus_id: Option<u64>,
    resume: &Option<String>,
    session: &SessionFile,
) -> Result<SyllabusIdentity> {
    if let Some(location) = resume {
        let location = if location.trim().is_empty() {
            match session.load().context("Failed to read last session")? {
                Some(stored) => stored,
                None => bail!("No previous session in {}", session.path().display()),
            }
        } else {
            location.clone()
        };
        return SyllabusIdentity::from_location(&location).context("Invalid resume location");
    }

    Ok(match syllabus_id {
        Some(id) => SyllabusIdentity::existing(id, codigo.clone()),
        None => SyllabusIdentity::new(codigo.clone()),
    })
}

async fn run_tui(
    config: Config,
    backend: Arc<dyn SyllabusBackend>,
    identity: SyllabusIdentity,
    location: Arc<dyn LocationStore>,
    log_file_path: Option<PathBuf>,
) -> Result<()> {
    let mut app = App::new(config, backend, identity, location);
    let result = app.run().await;

    if let Some(id) = app.screen().identity().syllabus_id() {
        eprintln!("Sílabo #{} (continúa con: syllabus --resume)", id);
    }

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

async fn cmd_show(backend: &dyn SyllabusBackend, id: u64) -> Result<()> {
    let mut sections = serde_json::Map::new();
    for kind in SectionKind::all() {
        let value = backend
            .fetch_section(id, *kind)
            .await
            .with_context(|| format!("Failed to fetch {}", kind.key()))?;
        sections.insert(
            kind.key().to_string(),
            value.unwrap_or(serde_json::Value::Null),
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(sections))?
    );
    Ok(())
}

async fn cmd_review(backend: &dyn SyllabusBackend, action: ReviewAction) -> Result<()> {
    match action {
        ReviewAction::List => {
            let items = backend
                .list_for_review()
                .await
                .context("Failed to list syllabi for review")?;

            if items.is_empty() {
                println!("No hay sílabos pendientes de revisión");
                return Ok(());
            }

            println!("Sílabos en revisión ({})", items.len());
            println!("{}", "─".repeat(60));
            for item in items {
                println!(
                    "#{:<6} {:<10} {:<30} {:<20} {}",
                    item.id,
                    item.course_code,
                    item.course_name,
                    item.teacher,
                    item.status.label()
                );
            }
        }
        ReviewAction::Approve { id, comment } => {
            let decision = ReviewDecision::approve(comment);
            backend
                .record_review(id, &decision)
                .await
                .with_context(|| format!("Failed to approve syllabus {}", id))?;
            println!("Sílabo #{} aprobado", id);
        }
        ReviewAction::Reject { id, comment } => {
            let decision = ReviewDecision::reject(&comment)?;
            backend
                .record_review(id, &decision)
                .await
                .with_context(|| format!("Failed to reject syllabus {}", id))?;
            println!("Sílabo #{} observado", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_review_reject() {
        let cli = Cli::try_parse_from([
            "syllabus",
            "review",
            "reject",
            "12",
            "--comment",
            "Falta bibliografía",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Review {
                action: ReviewAction::Reject { id, comment },
            }) => {
                assert_eq!(id, 12);
                assert_eq!(comment, "Falta bibliografía");
            }
            _ => panic!("expected review reject"),
        }
    }

    #[test]
    fn test_cli_parses_init() {
        let cli = Cli::try_parse_from([
            "syllabus",
            "init",
            "--base-url",
            "https://silabos.example.edu/api",
            "--force",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Init { base_url, force }) => {
                assert_eq!(base_url.as_deref(), Some("https://silabos.example.edu/api"));
                assert!(force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_cli_reject_requires_comment() {
        assert!(Cli::try_parse_from(["syllabus", "review", "reject", "12"]).is_err());
    }

    #[test]
    fn test_resume_without_value_reads_session() {
        let dir = TempDir::new().expect("tempdir");
        let session = SessionFile::new(dir.path().join("session.json"));
        session
            .replace("syllabus://wizard?codigo=MAT101&syllabusId=7")
            .expect("write session");

        let cli = Cli::try_parse_from(["syllabus", "--resume"]).expect("parse");
        let identity = resolve_identity(&cli.codigo, cli.syllabus_id, &cli.resume, &session)
            .expect("identity");
        assert_eq!(identity.syllabus_id(), Some(7));
        assert_eq!(identity.course_code(), Some("MAT101"));
    }

    #[test]
    fn test_flags_build_identity() {
        let dir = TempDir::new().expect("tempdir");
        let session = SessionFile::new(dir.path().join("session.json"));
        let cli = Cli::try_parse_from(["syllabus", "--codigo", "FIS100"]).expect("parse");
        let identity = resolve_identity(&cli.codigo, cli.syllabus_id, &cli.resume, &session)
            .expect("identity");
        assert_eq!(identity.syllabus_id(), None);
        assert_eq!(identity.course_code(), Some("FIS100"));

        let cli = Cli::try_parse_from(["syllabus", "--resume"]).expect("parse");
        assert!(resolve_identity(&cli.codigo, cli.syllabus_id, &cli.resume, &session).is_err());
    }
}
