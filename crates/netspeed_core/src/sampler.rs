//! Amostragem dos contadores cumulativos de rede.
//!
//! O cálculo de taxa é puro ([`Throughput::compute`]); a leitura dos
//! contadores fica atrás do trait [`CounterSource`], com a implementação
//! real em [`SystemCounters`] (sysinfo).

use std::time::{Duration, Instant};
use sysinfo::Networks;
use tracing::debug;

/// Limites do intervalo de amostragem (ms).
pub const MIN_INTERVAL_MS: u64 = 250;
pub const MAX_INTERVAL_MS: u64 = 10_000;

/// Totais cumulativos de bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Taxa de transferência em bytes/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Throughput {
    pub up_bytes_per_sec: f64,
    pub down_bytes_per_sec: f64,
}

impl Throughput {
    /// Calcula `(atual - anterior) / elapsed`.
    ///
    /// Se o contador do SO voltar (reset/reboot) a taxa daquele ciclo é 0.
    pub fn compute(prev: Counters, current: Counters, elapsed: Duration) -> Self {
        let dt = elapsed.as_secs_f64();
        if dt <= 0.0 {
            return Self::default();
        }
        let sent = current.bytes_sent.saturating_sub(prev.bytes_sent) as f64;
        let recv = current.bytes_recv.saturating_sub(prev.bytes_recv) as f64;
        Self {
            up_bytes_per_sec: sent / dt,
            down_bytes_per_sec: recv / dt,
        }
    }
}

/// Erros de leitura dos contadores.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Nenhuma interface de rede disponível")]
    NoInterfaces,

    #[error("Falha ao ler contadores: {0}")]
    Read(String),
}

/// Fonte de contadores cumulativos.
pub trait CounterSource {
    fn read(&mut self) -> Result<Counters, SampleError>;
}

/// Contadores do sistema via `sysinfo::Networks`, somando todas as
/// interfaces (loopback só se pedido).
pub struct SystemCounters {
    networks: Networks,
    include_loopback: bool,
}

impl SystemCounters {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            include_loopback: false,
        }
    }

    /// Inclui o tráfego de loopback no total.
    pub fn include_loopback(mut self, include: bool) -> Self {
        self.include_loopback = include;
        self
    }
}

impl Default for SystemCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SystemCounters {
    fn read(&mut self) -> Result<Counters, SampleError> {
        // `true` remove interfaces que sumiram (adaptadores desconectados)
        self.networks.refresh(true);

        if self.networks.is_empty() {
            return Err(SampleError::NoInterfaces);
        }

        let mut counters = Counters::default();
        for (name, data) in self.networks.iter() {
            if !counts_toward_total(name, self.include_loopback) {
                continue;
            }
            counters.bytes_sent = counters.bytes_sent.saturating_add(data.total_transmitted());
            counters.bytes_recv = counters.bytes_recv.saturating_add(data.total_received());
        }
        Ok(counters)
    }
}

fn counts_toward_total(name: &str, include_loopback: bool) -> bool {
    include_loopback || !is_loopback(name)
}

fn is_loopback(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == "lo" || lower.starts_with("lo0") || lower.contains("loopback")
}

/// Mantém o último par de contadores e calcula a taxa a cada amostra.
pub struct Sampler<S: CounterSource> {
    source: S,
    previous: Counters,
    last_read: Instant,
}

impl<S: CounterSource> Sampler<S> {
    /// Cria o sampler já com a primeira leitura como referência.
    pub fn new(mut source: S) -> Result<Self, SampleError> {
        let previous = source.read()?;
        debug!(
            "Contadores iniciais: enviados={} recebidos={}",
            previous.bytes_sent, previous.bytes_recv
        );
        Ok(Self {
            source,
            previous,
            last_read: Instant::now(),
        })
    }

    /// Lê os contadores atuais e retorna a taxa desde a leitura anterior.
    ///
    /// `nominal` é usado quando o tempo medido é zero.
    pub fn sample(&mut self, nominal: Duration) -> Result<Throughput, SampleError> {
        let current = self.source.read()?;
        let now = Instant::now();
        let measured = now.duration_since(self.last_read);
        let elapsed = if measured.is_zero() { nominal } else { measured };

        let rate = Throughput::compute(self.previous, current, elapsed);
        self.previous = current;
        self.last_read = now;
        Ok(rate)
    }

    pub fn previous(&self) -> Counters {
        self.previous
    }
}

/// Limita o intervalo configurado ao intervalo suportado.
pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}
