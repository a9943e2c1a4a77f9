use anyhow::{Context, Result};
use env_logger::{Builder, Env};

use Snapkeep::lock;

mod cli;
mod util;
mod cmd_init;
mod cmd_list;
mod cmd_show;
mod cmd_set_keep;
mod cmd_snapshots;
mod cmd_delete_snapshot;
mod cmd_remove;
mod cmd_rotate;
mod cmd_send;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug snapkeep rotate
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();

    // Один экземпляр на config-dir: state-файл и снапшоты общие.
    let _lock = lock::try_acquire_exclusive(cli.cmd.config_dir())
        .context("another snapkeep instance appears to be running")?;

    match cli.cmd {
        cli::Cmd::Init { path, keep, config_dir, timeout_secs, dry_run } =>
            cmd_init::exec(path, keep, config_dir, timeout_secs, dry_run),

        cli::Cmd::List { config_dir, json } =>
            cmd_list::exec(config_dir, json),

        cli::Cmd::Show { name, config_dir } =>
            cmd_show::exec(name, config_dir),

        cli::Cmd::SetKeep { name, keep, config_dir } =>
            cmd_set_keep::exec(name, keep, config_dir),

        cli::Cmd::Snapshots { name, config_dir, json } =>
            cmd_snapshots::exec(name, config_dir, json),

        cli::Cmd::DeleteSnapshot { name, snapshot, config_dir, timeout_secs, dry_run } =>
            cmd_delete_snapshot::exec(name, snapshot, config_dir, timeout_secs, dry_run),

        cli::Cmd::Remove { name, delete_snapshots, config_dir, timeout_secs, dry_run } =>
            cmd_remove::exec(name, delete_snapshots, config_dir, timeout_secs, dry_run),

        cli::Cmd::Rotate { config_dir, timeout_secs, dry_run, json } =>
            cmd_rotate::exec(config_dir, timeout_secs, dry_run, json),

        cli::Cmd::Send { name, snapshot, parent, out, config_dir } =>
            cmd_send::exec(name, snapshot, parent, out, config_dir),

        cli::Cmd::Status { config_dir, json } =>
            cmd_status::exec(config_dir, json),
    }
}
