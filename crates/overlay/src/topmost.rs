//! Thread que reafirma o "always on top" periodicamente.
//!
//! Alguns gerenciadores de janela (e apps em tela cheia) tiram o overlay do
//! topo; o nível é reenviado a cada [`REFRESH_PERIOD`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

pub const REFRESH_PERIOD: Duration = Duration::from_millis(500);

/// Inicia a thread. `raise` é chamado a cada período até `running` virar false.
pub fn spawn_topmost_thread<F>(running: Arc<AtomicBool>, period: Duration, raise: F)
where
    F: Fn() + Send + 'static,
{
    std::thread::Builder::new()
        .name("topmost".into())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                raise();
                std::thread::sleep(period);
            }
            debug!("Thread topmost finalizada");
        })
        .expect("Falha ao criar thread topmost");
}

/// Reenvia `WindowLevel::AlwaysOnTop` para a janela principal.
pub fn raise_overlay(ctx: &egui::Context) {
    ctx.send_viewport_cmd_to(
        egui::ViewportId::ROOT,
        egui::ViewportCommand::WindowLevel(egui::WindowLevel::AlwaysOnTop),
    );
    ctx.request_repaint();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn raises_until_stopped() {
        let running = Arc::new(AtomicBool::new(true));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        spawn_topmost_thread(Arc::clone(&running), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        std::thread::sleep(Duration::from_millis(100));
        running.store(false, Ordering::Relaxed);
        std::thread::sleep(Duration::from_millis(50));
        let after_stop = calls.load(Ordering::Relaxed);
        assert!(after_stop >= 2, "chamadas: {after_stop}");

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::Relaxed), after_stop);
    }
}
