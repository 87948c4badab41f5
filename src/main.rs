use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::broadcast;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use stitchboard::canvas::{elements, AutoSaver, CanvasElement, Point, SaveStatus};
use stitchboard::config::AppConfig;
use stitchboard::database::{establish_connection, get_database_url, seed_data, setup_database};
use stitchboard::errors::CoreResult;
use stitchboard::notifications::{Notifier, Toast, ToastLevel};
use stitchboard::preferences::FilePreferenceStore;
use stitchboard::rows::{MakeModeStatus, RowType, ViewMode};
use stitchboard::services::{RowEngine, StatusChange};
use stitchboard::store::{CanvasStore, DbStore, RowStore};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// TOML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured database path
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    Project {
        #[clap(subcommand)]
        command: ProjectCommands,
    },
    Plan {
        #[clap(subcommand)]
        command: PlanCommands,
    },
    Rows {
        #[clap(subcommand)]
        command: RowsCommands,
    },
    Canvas {
        #[clap(subcommand)]
        command: CanvasCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    /// Creates a sample project with rows and a plan
    Seed,
}

#[derive(Subcommand, Debug)]
enum ProjectCommands {
    Create {
        #[clap(long)]
        name: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum PlanCommands {
    Create {
        #[clap(long)]
        name: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RowKind {
    Row,
    Note,
    Divider,
}

impl From<RowKind> for RowType {
    fn from(kind: RowKind) -> Self {
        match kind {
            RowKind::Row => RowType::Row,
            RowKind::Note => RowType::Note,
            RowKind::Divider => RowType::Divider,
        }
    }
}

#[derive(Subcommand, Debug)]
enum RowsCommands {
    List {
        #[clap(long)]
        project: i32,
        /// Show the make mode view
        #[clap(long)]
        make: bool,
        /// Sets and remembers the hide-completed preference
        #[clap(long)]
        hide_completed: Option<bool>,
    },
    Add {
        #[clap(long)]
        project: i32,
        /// Insert after this position instead of appending
        #[clap(long)]
        after: Option<i32>,
        #[clap(long, value_enum, default_value = "row")]
        kind: RowKind,
    },
    Complete {
        #[clap(long)]
        id: String,
    },
    Uncomplete {
        #[clap(long)]
        id: String,
        /// Confirm resetting progress on the rows after it
        #[clap(long)]
        yes: bool,
    },
    Reorder {
        #[clap(long)]
        project: i32,
        #[clap(long)]
        from: usize,
        #[clap(long)]
        to: usize,
    },
}

#[derive(Subcommand, Debug)]
enum CanvasCommands {
    Show {
        #[clap(long)]
        plan: i32,
    },
    Add {
        #[clap(long)]
        plan: i32,
        #[clap(long = "type", default_value = "text")]
        element_type: String,
        #[clap(long)]
        content: String,
        #[clap(long, default_value = "0")]
        x: f64,
        #[clap(long, default_value = "0")]
        y: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.database.path = database;
    }

    let store = open_store(&config).await?;

    match args.command {
        Commands::Db { command } => match command {
            DbCommands::Init => {
                info!("Database ready: {}", config.database.path);
            }
            DbCommands::Seed => {
                seed_data::create_sample_project(&store).await?;
            }
        },
        Commands::Project { command } => match command {
            ProjectCommands::Create { name } => {
                let project = store.create_project(&name).await?;
                println!("{}\t{}", project.id, project.name);
            }
            ProjectCommands::List => {
                for project in store.list_projects().await? {
                    println!("{}\t{}", project.id, project.name);
                }
            }
        },
        Commands::Plan { command } => match command {
            PlanCommands::Create { name } => {
                let plan = store.create_plan(&name).await?;
                println!("{}\t{}", plan.id, plan.name);
            }
        },
        Commands::Rows { command } => run_rows_command(&store, &config, command).await?,
        Commands::Canvas { command } => run_canvas_command(&store, &config, command).await?,
    }

    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<DbStore> {
    let database_url = get_database_url(Some(&config.database.path));
    let db = establish_connection(&database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    setup_database(&db).await.context("Failed to run migrations")?;
    Ok(DbStore::new(db))
}

fn open_engine(store: &DbStore, config: &AppConfig, notifier: &Notifier, project_id: i32) -> RowEngine {
    RowEngine::new(
        Arc::new(store.clone()),
        Arc::new(FilePreferenceStore::new(&config.preferences.path)),
        notifier.clone(),
        project_id,
    )
}

fn print_toasts(toasts: &mut broadcast::Receiver<Toast>) {
    while let Ok(toast) = toasts.try_recv() {
        match toast.level {
            ToastLevel::Error => eprintln!("error: {}", toast.message),
            _ => println!("{}", toast.message),
        }
    }
}

async fn run_rows_command(store: &DbStore, config: &AppConfig, command: RowsCommands) -> Result<()> {
    let notifier = Notifier::default();
    let mut toasts = notifier.subscribe();

    let succeeded = match command {
        RowsCommands::List {
            project,
            make,
            hide_completed,
        } => {
            let mut engine = open_engine(store, config, &notifier, project);
            if let Some(hide_completed) = hide_completed {
                engine.set_hide_completed(hide_completed);
            }
            if make {
                engine.set_mode(ViewMode::Make);
            }

            let loaded = engine.load().await;
            if loaded {
                print_view(&engine);
            }
            loaded
        }
        RowsCommands::Add {
            project,
            after,
            kind,
        } => {
            let mut engine = open_engine(store, config, &notifier, project);
            match engine.add_row_of(after, kind.into()).await {
                Some(id) => {
                    println!("{}", id);
                    true
                }
                None => false,
            }
        }
        RowsCommands::Complete { id } => {
            let mut engine = engine_for_row(store, config, &notifier, &id).await?;
            engine.load().await;
            engine
                .update_make_mode_status(&id, MakeModeStatus::Complete)
                .await
                == StatusChange::Applied
        }
        RowsCommands::Uncomplete { id, yes } => {
            let mut engine = engine_for_row(store, config, &notifier, &id).await?;
            engine.load().await;
            match engine
                .update_make_mode_status(&id, MakeModeStatus::InProgress)
                .await
            {
                StatusChange::Applied => true,
                StatusChange::Failed => false,
                StatusChange::AwaitingConfirmation if yes => engine.confirm().await,
                StatusChange::AwaitingConfirmation => {
                    if let Some(action) = engine.confirm_dialog().action {
                        eprintln!("{}", action.message());
                    }
                    print_toasts(&mut toasts);
                    bail!("Re-run with --yes to confirm");
                }
            }
        }
        RowsCommands::Reorder { project, from, to } => {
            let mut engine = open_engine(store, config, &notifier, project);
            engine.load().await && engine.reorder_rows(from, to).await
        }
    };

    print_toasts(&mut toasts);
    if !succeeded {
        bail!("Row operation failed");
    }
    Ok(())
}

async fn engine_for_row(
    store: &DbStore,
    config: &AppConfig,
    notifier: &Notifier,
    id: &str,
) -> CoreResult<RowEngine> {
    let row = store.get_row(id).await?;
    Ok(open_engine(store, config, notifier, row.project_id))
}

async fn load_board(store: &DbStore, plan_id: i32) -> CoreResult<Vec<CanvasElement>> {
    Ok(store.load_canvas(plan_id).await?)
}

fn print_view(engine: &RowEngine) {
    let view = engine.view();
    for (index, row) in view.rows.iter().enumerate() {
        let marker = if view.in_progress_index == Some(index) {
            ">"
        } else {
            " "
        };
        println!(
            "{} {:>3}  {:<8} {:<12} {:<16} {:<32} {}",
            marker,
            row.position,
            row.row_type.as_str(),
            row.make_mode_status.as_str(),
            row.label,
            row.instructions,
            row.id
        );
    }
    if view.hidden_count > 0 {
        println!("({} completed rows hidden)", view.hidden_count);
    }
}

async fn run_canvas_command(store: &DbStore, config: &AppConfig, command: CanvasCommands) -> Result<()> {
    match command {
        CanvasCommands::Show { plan } => {
            let elements = load_board(store, plan).await?;
            println!("{}", serde_json::to_string_pretty(&elements)?);
        }
        CanvasCommands::Add {
            plan,
            element_type,
            content,
            x,
            y,
        } => {
            let baseline = load_board(store, plan).await?;
            let mut current = baseline.clone();
            let id = elements::add_element(&mut current, &element_type, &content, Point::new(x, y));

            let saver = AutoSaver::spawn(
                Arc::new(store.clone()),
                plan,
                &baseline,
                config.autosave_config(),
            );
            let mut state_rx = saver.subscribe();
            saver.observe(&current).await;

            let outcome = loop {
                if state_rx.changed().await.is_err() {
                    break Err(anyhow!("Auto-saver stopped before saving"));
                }
                let state = state_rx.borrow_and_update().clone();
                match state.status {
                    SaveStatus::Saved => break Ok(()),
                    SaveStatus::Error => {
                        break Err(anyhow!(state.error.unwrap_or_else(|| "Save failed".to_string())))
                    }
                    SaveStatus::Idle | SaveStatus::Saving => {}
                }
            };
            saver.shutdown().await;
            outcome?;

            println!("{}", id);
        }
    }
    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "sqlx=warn,sea_orm_migration=warn,{}",
            log_level
        )))
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
