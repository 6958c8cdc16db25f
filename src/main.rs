//! School Supervisor - local reporting desk for school supervisors.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use eframe::egui;
use school_supervisor as app;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use app::config::AppConfig;
use app::export::{self, ExportFormat, ExportOptions, ExportScope};
use app::models::Document;
use app::store::{DocumentStore, FileStorage};
use app::transfer::{self, ImportMode};
use app::ui::App;

/// Local reporting desk for school supervisors.
#[derive(Parser)]
#[command(name = "school-supervisor", version)]
struct Cli {
    /// Use config.toml and data/ from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Data directory, overriding the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Export data without opening the window
    Export {
        /// `full`, `teacher:<name>` or a record key such as `violations`
        #[arg(long, default_value = "full")]
        scope: String,
        /// json, xlsx, text or chat
        #[arg(long, default_value = "json")]
        format: String,
        /// Output file; defaults to a timestamped name in the export folder
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a JSON export
    Import {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ModeArg::Merge)]
        mode: ModeArg,
    },
    /// List backups, newest first
    Backups,
    /// Restore a backup by id
    Restore { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Merge,
    Overwrite,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Merge => ImportMode::Merge,
            ModeArg::Overwrite => ImportMode::Overwrite,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = AppConfig::default_path(cli.dev);
    let (config, config_status) = AppConfig::load_or_default(&config_path);
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir(cli.dev));

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&data_dir.join("logs"))?;

    tracing::info!("School Supervisor starting...");
    tracing::info!("Config path: {:?}", config_path);
    config_status.log(&config_path);
    tracing::info!("Data directory: {:?}", data_dir);

    let storage = FileStorage::open(&data_dir).with_context(|| format!("opening {}", data_dir.display()))?;
    let mut store = DocumentStore::new(storage);
    let document = store.load().context("loading document")?;

    match cli.command {
        None => run_gui(store, document, config, config_path),
        Some(Command::Export { scope, format, out }) => run_export(&document, &config, &scope, &format, out),
        Some(Command::Import { file, mode }) => {
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let outcome = transfer::import(&mut store, &document, &bytes, mode.into())?;
            println!("{}", outcome.summary());
            println!("Previous data saved as backup '{}'", outcome.backup.label);
            Ok(())
        }
        Some(Command::Backups) => {
            let ring = transfer::list_backups(&store)?;
            if ring.is_empty() {
                println!("No backups");
            }
            for record in ring.records() {
                println!("{}  {}  ({:.1} KB)", record.id, record.label, record.size_kb());
            }
            Ok(())
        }
        Some(Command::Restore { id }) => {
            let restored = transfer::restore_backup(&mut store, &document, &id)?;
            let records: usize = app::models::EntityKind::ALL.iter().map(|k| restored.count(*k)).sum();
            println!("Restored backup {id} ({records} records)");
            Ok(())
        }
    }
}

/// Log to stdout and to a daily rolling file under `log_dir`.
fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir).with_context(|| format!("creating {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "school-supervisor.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

fn run_export(
    document: &Document,
    config: &AppConfig,
    scope: &str,
    format: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let scope: ExportScope = scope.parse()?;
    let format: ExportFormat = format.parse()?;
    let path = out.unwrap_or_else(|| {
        config
            .export_dir()
            .join(export::generate_export_filename(&scope.file_prefix(), format.extension()))
    });

    let options = ExportOptions {
        language: config.ui.language,
        chat_max_rows: config.export.chat_max_rows,
    };
    let output = export::export_to(document, &scope, format, options, &path)?;
    println!("Exported to {}", output.path.display());
    if let Some(link) = output.share_link {
        println!("{link}");
    }
    Ok(())
}

/// Run the main application window.
fn run_gui(
    store: DocumentStore<FileStorage>,
    document: Document,
    config: AppConfig,
    config_path: PathBuf,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("School Supervisor")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;

    eframe::run_native(
        "School Supervisor",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(App::new(store, document, config, config_path, rt)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}
