//! Thread de amostragem que lê os contadores e envia taxas para a UI via channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use netspeed_core::sampler::{self, CounterSource, Sampler, Throughput};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controle da thread de amostragem.
pub struct SamplerHandle {
    pub rx: Receiver<Throughput>,
    interval_ms: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
}

impl SamplerHandle {
    /// Novo intervalo vale a partir do próximo ciclo.
    pub fn set_interval_ms(&self, ms: u64) {
        self.interval_ms
            .store(sampler::clamp_interval_ms(ms), Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Pede para a thread parar (checado a cada ciclo).
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Inicia a thread de amostragem. `notify` é chamado após cada envio
/// (na UI: `request_repaint`).
pub fn spawn_sampler_thread<S, N>(source: S, interval_ms: u64, notify: N) -> SamplerHandle
where
    S: CounterSource + Send + 'static,
    N: Fn() + Send + 'static,
{
    let (tx, rx) = bounded::<Throughput>(16);
    let interval = Arc::new(AtomicU64::new(sampler::clamp_interval_ms(interval_ms)));
    let running = Arc::new(AtomicBool::new(true));

    let thread_interval = Arc::clone(&interval);
    let thread_running = Arc::clone(&running);
    std::thread::Builder::new()
        .name("sampler".into())
        .spawn(move || {
            sampler_loop(source, &tx, &thread_interval, &thread_running, notify);
        })
        .expect("Falha ao criar thread de amostragem");

    SamplerHandle {
        rx,
        interval_ms: interval,
        running,
    }
}

fn sampler_loop<S: CounterSource, N: Fn()>(
    source: S,
    tx: &Sender<Throughput>,
    interval_ms: &AtomicU64,
    running: &AtomicBool,
    notify: N,
) {
    let mut sampler = match Sampler::new(source) {
        Ok(s) => s,
        Err(e) => {
            warn!("Amostragem desativada: {e}");
            return;
        }
    };
    info!("Amostragem iniciada ({} ms)", interval_ms.load(Ordering::Relaxed));

    while running.load(Ordering::Relaxed) {
        let interval = Duration::from_millis(interval_ms.load(Ordering::Relaxed));
        std::thread::sleep(interval);
        if !running.load(Ordering::Relaxed) {
            break;
        }

        match sampler.sample(interval) {
            Ok(rate) => {
                // Non-blocking send: se a UI está lenta, descarta amostras
                if tx.try_send(rate).is_err() {
                    debug!("Channel cheio, descartando amostra");
                }
                notify();
            }
            Err(e) => {
                warn!("Falha na leitura dos contadores, amostragem encerrada: {e}");
                break;
            }
        }
    }

    debug!("Thread de amostragem finalizada");
}
