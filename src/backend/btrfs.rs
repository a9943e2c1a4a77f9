//! btrfs-бэкенд: обёртка над `btrfs subvolume ...` и `btrfs send`.
//!
//! Короткие команды ждутся poll'ом try_wait с дедлайном: зависший btrfs
//! убивается, а не подвешивает весь проход. Потоковый send идёт без
//! дедлайна, размер диффа заранее неизвестен.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::backend::SubvolumeBackend;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct BtrfsBackend {
    timeout: Duration,
}

struct CmdOut {
    success: bool,
    stdout: String,
    stderr: String,
}

impl BtrfsBackend {
    pub fn new(timeout: Duration) -> Self {
        BtrfsBackend { timeout }
    }

    /// Запуск короткой команды с дедлайном. Вывод читается после выхода:
    /// у `btrfs subvolume ...` он помещается в пайп-буфер.
    fn run_cmd(&self, op: &'static str, target: &Path, cmd: &mut Command) -> Result<CmdOut> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::backend(op, target, format!("spawn btrfs: {}", e)))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child
                .try_wait()
                .map_err(|e| Error::backend(op, target, format!("wait: {}", e)))?
            {
                Some(status) => break status,
                None => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(Error::backend(
                            op,
                            target,
                            format!("timed out after {:?}", self.timeout),
                        ));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        if let Some(mut s) = child.stdout.take() {
            let _ = s.read_to_string(&mut stdout);
        }
        if let Some(mut s) = child.stderr.take() {
            let _ = s.read_to_string(&mut stderr);
        }
        Ok(CmdOut {
            success: status.success(),
            stdout,
            stderr,
        })
    }
}

impl SubvolumeBackend for BtrfsBackend {
    fn exists(&self, path: &Path) -> Result<bool> {
        let out = self.run_cmd(
            "show",
            path,
            Command::new("btrfs").arg("subvolume").arg("show").arg(path),
        )?;
        if !out.success {
            // Ненулевой выход — «не сабволюм» (или нет такого пути), не ошибка.
            debug!("subvolume show {}: {}", path.display(), out.stderr.trim());
        }
        Ok(out.success)
    }

    fn create(&self, path: &Path) -> Result<()> {
        let out = self.run_cmd(
            "create",
            path,
            Command::new("btrfs")
                .arg("subvolume")
                .arg("create")
                .arg(path),
        )?;
        if !out.success {
            return Err(Error::backend("create", path, out.stderr.trim().to_string()));
        }
        debug!("created subvolume {}", path.display());
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let out = self.run_cmd(
            "delete",
            path,
            Command::new("btrfs")
                .arg("subvolume")
                .arg("delete")
                .arg(path),
        )?;
        if !out.success {
            return Err(Error::backend("delete", path, out.stderr.trim().to_string()));
        }
        debug!("deleted subvolume {}: {}", path.display(), out.stdout.trim());
        Ok(())
    }

    fn snapshot(&self, source: &Path, dest: &Path, read_only: bool) -> Result<()> {
        let mut cmd = Command::new("btrfs");
        cmd.arg("subvolume").arg("snapshot");
        if read_only {
            cmd.arg("-r");
        }
        cmd.arg(source).arg(dest);
        let out = self.run_cmd("snapshot", dest, &mut cmd)?;
        if !out.success {
            return Err(Error::backend(
                "snapshot",
                dest,
                out.stderr.trim().to_string(),
            ));
        }
        debug!(
            "snapshotted {} -> {} (ro={})",
            source.display(),
            dest.display(),
            read_only
        );
        Ok(())
    }

    fn send_diff(&self, old: &Path, new: Option<&Path>, sink: &mut dyn Write) -> Result<u64> {
        let target = new.unwrap_or(old);
        let mut cmd = Command::new("btrfs");
        cmd.arg("send");
        if new.is_some() {
            cmd.arg("-p").arg(old);
        }
        cmd.arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child: Child = cmd
            .spawn()
            .map_err(|e| Error::backend("send", target, format!("spawn btrfs: {}", e)))?;
        let mut stream = match child.stdout.take() {
            Some(s) => s,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::backend("send", target, "no stdout pipe".to_string()));
            }
        };

        let copied = match io::copy(&mut stream, sink) {
            Ok(n) => n,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::backend("send", target, format!("stream copy: {}", e)));
            }
        };
        drop(stream);

        // stderr у send маленький (диагностика), читается после стрима.
        let mut stderr = String::new();
        if let Some(mut s) = child.stderr.take() {
            let _ = s.read_to_string(&mut stderr);
        }
        let status = child
            .wait()
            .map_err(|e| Error::backend("send", target, format!("wait: {}", e)))?;
        if !status.success() {
            return Err(Error::backend("send", target, stderr.trim().to_string()));
        }
        debug!("send {}: {} bytes", target.display(), copied);
        Ok(copied)
    }
}
