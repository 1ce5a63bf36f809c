//! Configuração persistida em um único `config.toml` plano.
//!
//! O arquivo é lido uma vez no início (mesclado sobre os padrões via
//! `#[serde(default)]`) e reescrito por inteiro a cada alteração.

use crate::placement::PositionMode;
use crate::sampler::{self, MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::theme::{self, BorderStyle, FontFamily, Theme, CUSTOM_THEME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MIN_OPACITY: f32 = 0.1;
pub const MAX_OPACITY: f32 = 1.0;
pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 72.0;
pub const MAX_BORDER_WIDTH: f32 = 10.0;

/// Erros de configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Opção desconhecida: {0}")]
    UnknownKey(String),

    #[error("Valor inválido para {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao serializar TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Erro ao parsear TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Todas as opções do overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Tema: "dark", "light", "classic", "neon" ou "custom"
    pub theme: String,
    /// Modo de posicionamento
    pub position_mode: PositionMode,
    /// Posição salva no modo livre
    pub x: f32,
    pub y: f32,
    /// Intervalo de amostragem em ms (250–10000)
    pub update_interval_ms: u64,
    /// Somar também o tráfego de loopback (lido na inicialização)
    pub include_loopback: bool,
    // Campos do tema customizável
    pub bg_color: String,
    pub fg_color: String,
    pub border_color: String,
    pub font_family: FontFamily,
    pub font_size: f32,
    pub font_bold: bool,
    pub upload_icon: String,
    pub download_icon: String,
    pub opacity: f32,
    pub border_width: f32,
    pub border_style: BorderStyle,
    /// Fundo renderizado transparente (herdado de um preset com cor-chave)
    pub transparent_bg: bool,
    /// Iniciar junto com o login do usuário
    pub auto_start: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
            position_mode: PositionMode::BottomLeft,
            x: 0.0,
            y: 0.0,
            update_interval_ms: 1000,
            include_loopback: false,
            bg_color: "#1a1a1a".into(),
            fg_color: "#ffffff".into(),
            border_color: "#333333".into(),
            font_family: FontFamily::Proportional,
            font_size: 12.0,
            font_bold: false,
            upload_icon: "▲".into(),
            download_icon: "▼".into(),
            opacity: 0.85,
            border_width: 1.0,
            border_style: BorderStyle::Rounded,
            transparent_bg: false,
            auto_start: false,
        }
    }
}

impl OverlayConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<OverlayConfig>(&content) {
                    Ok(mut config) => {
                        config.sanitize();
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        OverlayConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        exe_dir().join("config.toml")
    }

    /// Corrige valores fora da faixa suportada.
    pub fn sanitize(&mut self) {
        let defaults = OverlayConfig::default();

        self.update_interval_ms = sampler::clamp_interval_ms(self.update_interval_ms);
        self.opacity = clamp_or(self.opacity, MIN_OPACITY, MAX_OPACITY, defaults.opacity);
        self.font_size = clamp_or(self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE, defaults.font_size);
        self.border_width = clamp_or(self.border_width, 0.0, MAX_BORDER_WIDTH, defaults.border_width);

        if !self.x.is_finite() {
            self.x = 0.0;
        }
        if !self.y.is_finite() {
            self.y = 0.0;
        }

        for (color, fallback) in [
            (&mut self.bg_color, defaults.bg_color),
            (&mut self.fg_color, defaults.fg_color),
            (&mut self.border_color, defaults.border_color),
        ] {
            if theme::parse_hex(color).is_none() {
                *color = fallback;
            }
        }

        if !theme::theme_names().contains(&self.theme.to_lowercase().as_str()) {
            self.theme = defaults.theme;
        }
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.update_interval_ms) {
            errors.push(format!(
                "Intervalo inválido: {} ms ({MIN_INTERVAL_MS}–{MAX_INTERVAL_MS})",
                self.update_interval_ms
            ));
        }
        if !(MIN_OPACITY..=MAX_OPACITY).contains(&self.opacity) {
            errors.push(format!("Opacidade inválida: {} ({MIN_OPACITY}–{MAX_OPACITY})", self.opacity));
        }
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            errors.push(format!("Tamanho de fonte inválido: {}", self.font_size));
        }
        if !(0.0..=MAX_BORDER_WIDTH).contains(&self.border_width) {
            errors.push(format!("Largura de borda inválida: {}", self.border_width));
        }
        for (name, color) in [
            ("bg_color", &self.bg_color),
            ("fg_color", &self.fg_color),
            ("border_color", &self.border_color),
        ] {
            if theme::parse_hex(color).is_none() {
                errors.push(format!("Cor inválida em {name}: {color}"));
            }
        }
        if !theme::theme_names().contains(&self.theme.to_lowercase().as_str()) {
            errors.push(format!("Tema desconhecido: {}", self.theme));
        }

        errors
    }

    /// Copia os campos de um tema para o config (base do tema customizável).
    pub fn absorb_theme(&mut self, theme: &Theme) {
        self.bg_color = theme.bg.clone();
        self.fg_color = theme.fg.clone();
        self.border_color = theme.border_color.clone();
        self.font_family = theme.font.family;
        self.font_size = theme.font.size;
        self.font_bold = theme.font.bold;
        self.upload_icon = theme.upload_icon.clone();
        self.download_icon = theme.download_icon.clone();
        self.opacity = theme.opacity;
        self.border_width = theme.border_width;
        self.border_style = theme.border_style;
        self.transparent_bg = theme.transparency_key.as_deref() == Some(theme.bg.as_str());
    }
}

fn clamp_or(v: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if v.is_finite() { v.clamp(min, max) } else { fallback }
}

/// Diretório do executável (fallback: diretório atual).
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Config em memória + caminho de persistência.
///
/// Toda alteração passa por [`OverlayConfig::sanitize`] e é gravada em disco
/// na hora; falhas de escrita só geram log.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: OverlayConfig,
}

impl ConfigStore {
    /// Carrega do disco mesclando sobre os padrões.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = OverlayConfig::load(&path);
        Self { path, config }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> &OverlayConfig {
        &self.config
    }

    /// Lê uma opção pelo nome, formatada como string.
    pub fn get_value(&self, key: &str) -> Option<String> {
        let table = toml::Value::try_from(&self.config).ok()?;
        match table.get(key)? {
            toml::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Altera o config, corrige faixas e persiste.
    pub fn set(&mut self, f: impl FnOnce(&mut OverlayConfig)) {
        f(&mut self.config);
        self.config.sanitize();
        self.persist();
    }

    /// Altera campos do tema customizável.
    ///
    /// Se o tema ativo for um preset, seus valores viram a base do `custom`
    /// antes da alteração.
    pub fn customize(&mut self, f: impl FnOnce(&mut OverlayConfig)) {
        self.set(|config| {
            if !config.theme.eq_ignore_ascii_case(CUSTOM_THEME) {
                let preset = theme::get_theme(&config.theme, config);
                config.absorb_theme(&preset);
                config.theme = CUSTOM_THEME.into();
            }
            f(config);
        });
    }

    /// Define uma opção pelo nome a partir de uma string.
    ///
    /// O tipo esperado vem do valor atual da opção.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut table = toml::Value::try_from(&self.config)?;
        let slot = table
            .get_mut(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        let trimmed = value.trim();
        *slot = match slot {
            toml::Value::String(_) => toml::Value::String(value.to_string()),
            toml::Value::Integer(_) => toml::Value::Integer(
                trimmed.parse::<i64>().map_err(|e| invalid(e.to_string()))?,
            ),
            toml::Value::Float(_) => {
                toml::Value::Float(trimmed.parse::<f64>().map_err(|e| invalid(e.to_string()))?)
            }
            toml::Value::Boolean(_) => toml::Value::Boolean(
                trimmed.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            other => return Err(invalid(format!("tipo não suportado: {}", other.type_str()))),
        };

        let config: OverlayConfig = table.try_into().map_err(|e: toml::de::Error| invalid(e.to_string()))?;
        self.config = config;
        self.config.sanitize();
        self.persist();
        Ok(())
    }

    /// Grava o config inteiro. Falhas só geram log.
    pub fn persist(&self) {
        if let Err(e) = self.config.save(&self.path) {
            warn!("Não foi possível salvar {}: {e}", self.path.display());
        }
    }

    /// Tema ativo. `custom` é recalculado a partir do config.
    pub fn theme(&self) -> Theme {
        theme::get_theme(&self.config.theme, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.toml"));
        (dir, store)
    }

    #[test]
    fn default_config_is_valid() {
        let config = OverlayConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
theme = "neon"
update_interval_ms = 2000
position_mode = "top_right"
"#;
        let config: OverlayConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.theme, "neon");
        assert_eq!(config.update_interval_ms, 2000);
        assert_eq!(config.position_mode, PositionMode::TopRight);
        // Outros campos devem ter valor padrão
        let defaults = OverlayConfig::default();
        assert_eq!(config.opacity, defaults.opacity);
        assert_eq!(config.upload_icon, defaults.upload_icon);
        assert_eq!(config.auto_start, defaults.auto_start);
    }

    #[test]
    fn load_merges_partial_file_and_persist_writes_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "font_size = 16.0\nauto_start = true\n").unwrap();

        let store = ConfigStore::load(&path);
        assert_eq!(store.get().font_size, 16.0);
        assert!(store.get().auto_start);
        assert_eq!(store.get().theme, "dark");

        store.persist();
        let written: toml::Table = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let defaults = toml::Value::try_from(OverlayConfig::default()).unwrap();
        for key in defaults.as_table().unwrap().keys() {
            assert!(written.contains_key(key), "faltando {key}");
        }
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "isso não é toml = = =").unwrap();
        let store = ConfigStore::load(&path);
        assert_eq!(store.get(), &OverlayConfig::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config: OverlayConfig = toml::from_str(
            "update_interval_ms = 5\nopacity = 7.0\nfont_size = 1.0\nbg_color = \"red\"\ntheme = \"???\"",
        )
        .unwrap();
        config.sanitize();
        assert_eq!(config.update_interval_ms, MIN_INTERVAL_MS);
        assert_eq!(config.opacity, MAX_OPACITY);
        assert_eq!(config.font_size, MIN_FONT_SIZE);
        assert_eq!(config.bg_color, OverlayConfig::default().bg_color);
        assert_eq!(config.theme, "dark");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn set_persists_every_mutation() {
        let (_dir, mut store) = temp_store();
        store.set(|c| c.update_interval_ms = 3000);

        let reloaded = ConfigStore::load(store.path());
        assert_eq!(reloaded.get().update_interval_ms, 3000);
    }

    #[test]
    fn set_value_by_name() {
        let (_dir, mut store) = temp_store();
        store.set_value("opacity", "0.5").unwrap();
        store.set_value("font_bold", "true").unwrap();
        store.set_value("update_interval_ms", "1500").unwrap();
        store.set_value("position_mode", "center").unwrap();
        store.set_value("upload_icon", "UP").unwrap();
        store.set_value("include_loopback", "true").unwrap();

        assert_eq!(store.get().opacity, 0.5);
        assert!(store.get().font_bold);
        assert_eq!(store.get().update_interval_ms, 1500);
        assert_eq!(store.get().position_mode, PositionMode::Center);
        assert_eq!(store.get_value("upload_icon").as_deref(), Some("UP"));
        assert_eq!(store.get_value("position_mode").as_deref(), Some("center"));
        assert_eq!(store.get_value("update_interval_ms").as_deref(), Some("1500"));
        assert!(store.get().include_loopback);

        let reloaded = ConfigStore::load(store.path());
        assert_eq!(reloaded.get().position_mode, PositionMode::Center);
    }

    #[test]
    fn set_value_rejects_bad_input() {
        let (_dir, mut store) = temp_store();
        assert!(matches!(
            store.set_value("no_such_option", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            store.set_value("opacity", "muito"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            store.set_value("border_style", "zigzag"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(store.get(), &OverlayConfig::default());
        assert_eq!(store.get_value("no_such_option"), None);
    }

    #[test]
    fn customize_switches_to_custom_from_preset() {
        let (_dir, mut store) = temp_store();
        store.set(|c| c.theme = "neon".into());
        let neon = store.theme();

        store.customize(|c| c.fg_color = "#ff0000".into());

        let t = store.theme();
        assert_eq!(t.name, CUSTOM_THEME);
        assert_eq!(t.fg, "#ff0000");
        // O restante vem do preset anterior
        assert_eq!(t.bg, neon.bg);
        assert_eq!(t.border_style, neon.border_style);
        assert_eq!(t.transparency_key, None);
    }

    #[test]
    fn customize_from_classic_keeps_background_transparent() {
        let (_dir, mut store) = temp_store();
        store.set(|c| c.theme = "classic".into());

        store.customize(|c| c.font_size = 14.0);

        let t = store.theme();
        assert_eq!(t.name, CUSTOM_THEME);
        assert_eq!(t.transparency_key.as_deref(), Some(t.bg.as_str()));
        assert!(ConfigStore::load(store.path()).get().transparent_bg);
    }

    #[test]
    fn custom_theme_is_recomputed_on_access() {
        let (_dir, mut store) = temp_store();
        store.set_value("theme", "custom").unwrap();
        store.set_value("bg_color", "#010203").unwrap();
        assert_eq!(store.theme().bg, "#010203");
        store.set_value("bg_color", "#0a0b0c").unwrap();
        assert_eq!(store.theme().bg, "#0a0b0c");
    }

    #[test]
    fn persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // Caminho dentro de um diretório inexistente
        let mut store = ConfigStore::load(dir.path().join("nope").join("config.toml"));
        store.set(|c| c.font_size = 14.0);
        assert_eq!(store.get().font_size, 14.0);
    }
}
