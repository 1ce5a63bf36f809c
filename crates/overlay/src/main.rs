//! # NetSpeed Overlay
//!
//! Janela sem bordas, sempre no topo, que mostra a velocidade de upload e
//! download da máquina. Renderizada via eframe/egui.
//!
//! ## Uso
//! - Botão direito: menu (tema, posição, configurações, autostart, sair)
//! - Modo livre: arraste com o botão esquerdo para mover
//!
//! Configuração em `config.toml` ao lado do executável; `RUST_LOG`
//! controla o nível de log.

// Release sem janela de console no Windows
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

mod menu;
mod overlay;
mod sampler_thread;
mod theme_egui;
mod topmost;

use netspeed_core::instance::{InstanceError, InstanceLock};
use netspeed_core::{ConfigStore, OverlayConfig, autostart, crash, placement};
use overlay::NetSpeedOverlay;
use std::process::ExitCode;
use tracing::{error, info, warn};

const APP_NAME: &str = "NetSpeed Overlay";

/// Erros que impedem a inicialização.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error("Falha na interface gráfica: {0}")]
    Gui(#[from] eframe::Error),
}

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    install_crash_hook();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(StartupError::Instance(InstanceError::AlreadyRunning(pid))) => {
            error!("Outra instância já está em execução (PID {pid})");
            show_message(&format!("{APP_NAME} já está em execução (PID {pid})."));
            ExitCode::from(1)
        }
        Err(e) => {
            error!("Erro fatal na inicialização: {e}");
            if let Err(log_err) = crash::append(&crash::default_path(), &e.to_string()) {
                warn!("Não foi possível gravar crash log: {log_err}");
            }
            // Depois de uma falha do eframe não dá para abrir outra janela
            if matches!(e, StartupError::Gui(_)) {
                eprintln!("{APP_NAME}: {e}");
            } else {
                show_message(&format!("Erro fatal: {e}"));
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), StartupError> {
    // ── Instância única (removida no Drop) ──
    let _lock = InstanceLock::acquire(InstanceLock::default_path())?;

    // ── Config ──
    let config_path = OverlayConfig::default_path();
    let store = ConfigStore::load(&config_path);
    if !config_path.exists() {
        store.persist();
    }

    sync_autostart(store.get());

    // ── Janela eframe ──
    let size = placement::overlay_size(&store.theme());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([size.width, size.height])
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_always_on_top()
            .with_taskbar(false),
        ..Default::default()
    };

    info!("Iniciando overlay (tema {})", store.get().theme);
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(NetSpeedOverlay::new(cc, store)))),
    )?;
    Ok(())
}

/// Alinha o registro de autostart do SO com o config.
fn sync_autostart(config: &OverlayConfig) {
    if autostart::is_enabled() == config.auto_start {
        return;
    }
    if let Err(e) = autostart::set_enabled(config.auto_start) {
        warn!("Não foi possível sincronizar autostart: {e}");
    }
}

/// Panics também vão para o crash log.
fn install_crash_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crash::append(&crash::default_path(), &format!("panic: {info}"));
        default_hook(info);
    }));
}

/// Janela simples com uma mensagem e botão OK.
struct MessageWindow {
    message: String,
}

impl eframe::App for MessageWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            ui.add_space(8.0);
            ui.label(&self.message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
    }
}

fn show_message(message: &str) {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([360.0, 120.0])
            .with_resizable(false)
            .with_always_on_top(),
        ..Default::default()
    };
    let window = MessageWindow {
        message: message.to_string(),
    };
    if let Err(e) = eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(window))),
    ) {
        warn!("Falha ao exibir mensagem: {e}");
        eprintln!("{APP_NAME}: {message}");
    }
}
