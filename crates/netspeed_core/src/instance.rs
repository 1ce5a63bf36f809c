//! Trava de instância única baseada em arquivo com o PID.
//!
//! 1. O arquivo é aberto (criado se preciso) e recebe uma trava exclusiva do
//!    SO (`fs2`), mantida enquanto o [`InstanceLock`] existir.
//! 2. Se outro processo detém a trava, recusa. O SO solta a trava de um
//!    processo morto, então arquivo ausente, ilegível ou com PID morto é
//!    órfão e é sobrescrito com o PID atual.
//! 3. No encerramento limpo o arquivo é removido (`Drop`).

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Nome padrão do arquivo de trava.
pub const LOCK_FILE_NAME: &str = "netspeed-overlay.lock";

/// Tentativas quando o arquivo é removido entre abrir e travar.
const MAX_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// PID 0 quando o arquivo do dono não pôde ser lido.
    #[error("Outra instância já está em execução (PID {0})")]
    AlreadyRunning(u32),

    #[error("Falha ao gravar arquivo de trava {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trava adquirida. Remove o arquivo ao sair de escopo.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    /// Handle aberto (mantém a trava do SO)
    file: Option<File>,
}

impl InstanceLock {
    /// Caminho padrão (diretório temporário do SO).
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(LOCK_FILE_NAME)
    }

    /// Adquire a trava ou falha se outro processo a detém.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, InstanceError> {
        let path = path.into();
        let io_err = |source| InstanceError::Io {
            path: path.clone(),
            source,
        };

        for _ in 0..MAX_ATTEMPTS {
            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .map_err(io_err)?;

            if file.try_lock_exclusive().is_err() {
                return Err(InstanceError::AlreadyRunning(read_pid(&path).unwrap_or(0)));
            }

            // O dono anterior pode ter removido o arquivo entre o open e a trava
            if !still_linked(&file, &path) {
                debug!(path = %path.display(), "Arquivo de trava substituído, tentando de novo");
                continue;
            }

            if let Some(old) = read_pid_from(&mut file) {
                debug!(pid = old, path = %path.display(), "Arquivo de trava órfão (processo morto)");
            }

            let pid = std::process::id();
            write_pid(&mut file, pid).map_err(io_err)?;
            info!("Trava de instância adquirida ({}, PID {pid})", path.display());

            return Ok(Self {
                path,
                pid,
                file: Some(file),
            });
        }

        Err(io_err(std::io::Error::other(
            "arquivo de trava removido repetidamente",
        )))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Remove o arquivo e solta a trava (idempotente).
    pub fn release(&mut self) {
        let Some(mut file) = self.file.take() else {
            return;
        };

        // Só remove se o arquivo ainda for nosso
        if still_linked(&file, &self.path) && read_pid_from(&mut file) == Some(self.pid) {
            match fs::remove_file(&self.path) {
                Ok(()) => debug!(path = %self.path.display(), "Trava removida"),
                Err(e) => warn!("Não foi possível remover {}: {e}", self.path.display()),
            }
        }
        // Fechar o handle solta a trava do SO
        drop(file);
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}

fn write_pid(file: &mut File, pid: u32) -> std::io::Result<()> {
    let content = pid.to_string();
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content.as_bytes())?;
    file.set_len(content.len() as u64)?;
    file.sync_all()
}

fn parse_pid(content: &str) -> Option<u32> {
    content.trim().parse::<u32>().ok().filter(|&pid| pid > 0)
}

fn read_pid_from(file: &mut File) -> Option<u32> {
    let mut content = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut content).ok()?;
    parse_pid(&content)
}

fn read_pid(path: &Path) -> Option<u32> {
    parse_pid(&fs::read_to_string(path).ok()?)
}

/// O handle aberto ainda é o arquivo apontado por `path`.
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (file.metadata(), fs::metadata(path)) {
        (Ok(open), Ok(on_disk)) => open.dev() == on_disk.dev() && open.ino() == on_disk.ino(),
        _ => false,
    }
}

/// No Windows um arquivo aberto não some do diretório.
#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> bool {
    path.exists()
}
