//! Registro para iniciar junto com o login do usuário.
//!
//! - Windows: valor em `HKCU\Software\Microsoft\Windows\CurrentVersion\Run`
//! - Linux: entrada XDG em `~/.config/autostart/`
//! - macOS: LaunchAgent em `~/Library/LaunchAgents/`

use std::path::{Path, PathBuf};
use tracing::info;

/// Nome do valor/entrada registrado.
pub const APP_ID: &str = "NetSpeedOverlay";

#[derive(Debug, thiserror::Error)]
pub enum AutoStartError {
    #[error("Autostart não suportado nesta plataforma")]
    Unsupported,

    #[error("Caminho do executável indisponível: {0}")]
    ExePath(std::io::Error),

    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Erro no registro do Windows: {0}")]
    Registry(String),
}

/// Ativa ou desativa o autostart para o executável atual.
pub fn set_enabled(enabled: bool) -> Result<(), AutoStartError> {
    let exe = std::env::current_exe().map_err(AutoStartError::ExePath)?;
    platform::set_enabled(&exe, enabled)?;
    info!(
        "Autostart {}",
        if enabled { "ativado" } else { "desativado" }
    );
    Ok(())
}

/// Indica se o autostart está registrado.
pub fn is_enabled() -> bool {
    platform::is_enabled()
}

/// Entrada de autostart baseada em arquivo (XDG / LaunchAgent).
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub contents: String,
}

impl FileEntry {
    pub fn enable(&self) -> Result<(), AutoStartError> {
        let io_err = |source| AutoStartError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&self.path, &self.contents).map_err(io_err)
    }

    pub fn disable(&self) -> Result<(), AutoStartError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AutoStartError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_file()
    }
}

/// Conteúdo do `.desktop` XDG.
pub fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=NetSpeed Overlay\n\
         Comment=Upload/download speed overlay\n\
         Exec=\"{}\"\n\
         X-GNOME-Autostart-enabled=true\n\
         Terminal=false\n",
        exe.display()
    )
}

/// Conteúdo do plist do LaunchAgent.
pub fn launch_agent_plist(exe: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.nyefall.{APP_ID}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        exe.display()
    )
}

#[cfg(target_os = "linux")]
mod platform {
    use super::*;

    fn entry_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("autostart").join("netspeed-overlay.desktop"))
    }

    fn entry(exe: &Path) -> Option<FileEntry> {
        Some(FileEntry {
            path: entry_path()?,
            contents: desktop_entry(exe),
        })
    }

    pub fn set_enabled(exe: &Path, enabled: bool) -> Result<(), AutoStartError> {
        let entry = entry(exe).ok_or(AutoStartError::Unsupported)?;
        if enabled { entry.enable() } else { entry.disable() }
    }

    pub fn is_enabled() -> bool {
        entry_path().is_some_and(|p| p.is_file())
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;

    fn entry_path() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join("Library").join("LaunchAgents");
        Some(dir.join(format!("com.nyefall.{APP_ID}.plist")))
    }

    fn entry(exe: &Path) -> Option<FileEntry> {
        Some(FileEntry {
            path: entry_path()?,
            contents: launch_agent_plist(exe),
        })
    }

    pub fn set_enabled(exe: &Path, enabled: bool) -> Result<(), AutoStartError> {
        let entry = entry(exe).ok_or(AutoStartError::Unsupported)?;
        if enabled { entry.enable() } else { entry.disable() }
    }

    pub fn is_enabled() -> bool {
        entry_path().is_some_and(|p| p.is_file())
    }
}

#[cfg(windows)]
mod platform {
    use super::*;
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
    use windows::Win32::System::Registry::{
        HKEY_CURRENT_USER, REG_SZ, RRF_RT_REG_SZ, RegDeleteKeyValueW, RegGetValueW,
        RegSetKeyValueW,
    };
    use windows::core::PCWSTR;

    const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

    fn wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    pub fn set_enabled(exe: &Path, enabled: bool) -> Result<(), AutoStartError> {
        let key = wide(OsStr::new(RUN_KEY));
        let name = wide(OsStr::new(APP_ID));

        let status = if enabled {
            let quoted = format!("\"{}\"", exe.display());
            let data = wide(OsStr::new(&quoted));
            unsafe {
                RegSetKeyValueW(
                    HKEY_CURRENT_USER,
                    PCWSTR(key.as_ptr()),
                    PCWSTR(name.as_ptr()),
                    REG_SZ.0,
                    Some(data.as_ptr() as *const _),
                    (data.len() * std::mem::size_of::<u16>()) as u32,
                )
            }
        } else {
            let status = unsafe {
                RegDeleteKeyValueW(HKEY_CURRENT_USER, PCWSTR(key.as_ptr()), PCWSTR(name.as_ptr()))
            };
            if status == ERROR_FILE_NOT_FOUND { ERROR_SUCCESS } else { status }
        };

        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(AutoStartError::Registry(format!("código {}", status.0)))
        }
    }

    pub fn is_enabled() -> bool {
        let key = wide(OsStr::new(RUN_KEY));
        let name = wide(OsStr::new(APP_ID));
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                PCWSTR(key.as_ptr()),
                PCWSTR(name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                None,
            )
        };
        status == ERROR_SUCCESS
    }
}

#[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
mod platform {
    use super::*;

    pub fn set_enabled(_exe: &Path, _enabled: bool) -> Result<(), AutoStartError> {
        Err(AutoStartError::Unsupported)
    }

    pub fn is_enabled() -> bool {
        false
    }
}
