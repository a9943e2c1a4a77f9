use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use Snapkeep::consts::{DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_CONFIG_DIR};

/// CLI для snapkeep (tiered btrfs snapshot manager)
#[derive(Parser, Debug)]
#[command(name = "snapkeep", version, about = "Tiered btrfs snapshot manager")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Переопределения retention-счётчиков. Незаданные берутся из
/// snapkeep-default.toml (или встроенных дефолтов).
#[derive(Args, Debug)]
pub struct KeepArgs {
    /// How many hourly snapshots to keep
    #[arg(long)]
    pub keep_hourly: Option<u32>,
    /// How many daily snapshots to keep
    #[arg(long)]
    pub keep_daily: Option<u32>,
    /// How many weekly snapshots to keep
    #[arg(long)]
    pub keep_weekly: Option<u32>,
    /// How many monthly snapshots to keep
    #[arg(long)]
    pub keep_monthly: Option<u32>,
    /// How many yearly snapshots to keep
    #[arg(long)]
    pub keep_yearly: Option<u32>,
}

impl KeepArgs {
    pub fn is_empty(&self) -> bool {
        self.keep_hourly.is_none()
            && self.keep_daily.is_none()
            && self.keep_weekly.is_none()
            && self.keep_monthly.is_none()
            && self.keep_yearly.is_none()
    }
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Start tracking a subvolume (takes the initial snapshot)
    ///
    /// Имя берётся из последнего компонента пути:
    ///   snapkeep init --path /mnt/data/home
    /// регистрирует сабволюм "home" и сразу берёт init-снапшот.
    Init {
        /// Path to the btrfs subvolume
        #[arg(long)]
        path: PathBuf,
        #[command(flatten)]
        keep: KeepArgs,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        /// Timeout for a single btrfs command, seconds
        #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Print btrfs commands instead of executing; state is not saved
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// List tracked subvolumes
    List {
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        /// JSON output (array of objects)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show one subvolume: path, retention, per-tier totals
    Show {
        /// Subvolume name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
    },
    /// Change retention counts for a subvolume
    ///
    /// Пример:
    ///   snapkeep set-keep --name home --keep-hourly 24 --keep-daily 7
    SetKeep {
        /// Subvolume name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        keep: KeepArgs,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
    },
    /// List snapshots of one subvolume (or of all subvolumes)
    Snapshots {
        /// Subvolume name. If omitted, lists all.
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        /// JSON output (array of objects)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete a single snapshot by name or by positional index
    ///
    /// Индекс — из вывода `snapkeep snapshots`:
    ///   snapkeep delete-snapshot --name home --snapshot 0
    ///   snapkeep delete-snapshot --name home --snapshot home-2026-01-01T00:00:00
    DeleteSnapshot {
        /// Subvolume name
        #[arg(long)]
        name: String,
        /// Snapshot name, or its index in the sorted listing
        #[arg(long)]
        snapshot: String,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS)]
        timeout_secs: u64,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Stop tracking a subvolume
    Remove {
        /// Subvolume name
        #[arg(long)]
        name: String,
        /// Also delete all its snapshots from disk
        #[arg(long, default_value_t = false)]
        delete_snapshots: bool,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS)]
        timeout_secs: u64,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Rotation pass over all subvolumes: take due snapshots, prune old ones
    ///
    /// Предназначен для cron/systemd-timer. Примеры:
    ///   snapkeep rotate
    ///   snapkeep rotate --dry-run
    ///   snapkeep rotate --json
    Rotate {
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Print btrfs commands instead of executing; state is not saved
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// JSON output (pass report object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Stream a snapshot (btrfs send) to a file
    ///
    /// Без --parent шлётся полный стрим, с --parent — инкрементальный.
    /// Имя выходного файла по умолчанию: <tmp>/<parent|init>::<snapshot>.
    Send {
        /// Subvolume name
        #[arg(long)]
        name: String,
        /// Snapshot name, or its index in the sorted listing
        #[arg(long)]
        snapshot: String,
        /// Parent snapshot for an incremental stream (name or index)
        #[arg(long)]
        parent: Option<String>,
        /// Output file. Defaults to a file in the system temp dir.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
    },
    /// Print config paths, registry summary and process metrics
    Status {
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Cmd {
    /// Все команды работают в пределах одного config-dir; лок берётся по нему.
    pub fn config_dir(&self) -> &Path {
        match self {
            Cmd::Init { config_dir, .. }
            | Cmd::List { config_dir, .. }
            | Cmd::Show { config_dir, .. }
            | Cmd::SetKeep { config_dir, .. }
            | Cmd::Snapshots { config_dir, .. }
            | Cmd::DeleteSnapshot { config_dir, .. }
            | Cmd::Remove { config_dir, .. }
            | Cmd::Rotate { config_dir, .. }
            | Cmd::Send { config_dir, .. }
            | Cmd::Status { config_dir, .. } => config_dir,
        }
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Cli as Parser>::parse()
    }
}
