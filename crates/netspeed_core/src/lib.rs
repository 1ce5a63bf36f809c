//! # NetSpeed Core
//!
//! Lógica sem GUI do NetSpeed Overlay: amostragem dos contadores de rede,
//! formatação de taxas, configuração TOML, temas, posicionamento da janela
//! e trava de instância única.
//!
//! ## Módulos
//! - [`sampler`] – Contadores cumulativos e cálculo de taxa
//! - [`format`] – B/s, KB/s, MB/s, GB/s
//! - [`config`] – Configuração plana via TOML
//! - [`theme`] – Presets (dark, light, classic, neon) e tema customizável
//! - [`placement`] – Modos de ancoragem e clamp na tela
//! - [`instance`] – Trava de instância única
//! - [`autostart`] – Iniciar com o login
//! - [`crash`] – Log de falhas fatais

pub mod sampler;
pub mod format;
pub mod config;
pub mod theme;
pub mod placement;
pub mod instance;
pub mod autostart;
pub mod crash;

// Re-exports convenientes
pub use config::{ConfigError, ConfigStore, OverlayConfig};
pub use format::{format_overlay_text, format_speed};
pub use instance::{InstanceError, InstanceLock};
pub use placement::{PositionMode, place};
pub use sampler::{CounterSource, Sampler, SystemCounters, Throughput};
pub use theme::Theme;
