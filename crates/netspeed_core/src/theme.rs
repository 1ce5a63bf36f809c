//! Definição de temas visuais do overlay.
//!
//! Cada tema é um preset fixo, exceto `custom`, que é recalculado a partir
//! do [`OverlayConfig`] a cada acesso.

use crate::config::OverlayConfig;
use serde::{Deserialize, Serialize};

/// Nome do tema customizável.
pub const CUSTOM_THEME: &str = "custom";

/// Cor em formato hex string (ex: "#00ff88") para serialização.
/// A conversão para `egui::Color32` é feita no overlay.
pub type ColorHex = String;

/// Família da fonte do texto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Proportional,
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 2] = [FontFamily::Proportional, FontFamily::Monospace];

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Proportional => "Proporcional",
            FontFamily::Monospace => "Monoespaçada",
        }
    }
}

/// Descritor de fonte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
}

/// Estilo da borda da janela.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Rounded,
    Double,
}

impl BorderStyle {
    pub const ALL: [BorderStyle; 4] = [
        BorderStyle::None,
        BorderStyle::Solid,
        BorderStyle::Rounded,
        BorderStyle::Double,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BorderStyle::None => "Sem borda",
            BorderStyle::Solid => "Sólida",
            BorderStyle::Rounded => "Arredondada",
            BorderStyle::Double => "Dupla",
        }
    }
}

/// Definição completa de um tema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub bg: ColorHex,
    pub fg: ColorHex,
    pub border_color: ColorHex,
    pub font: FontSpec,
    pub border_width: f32,
    pub border_style: BorderStyle,
    /// Opacidade da janela (0.0–1.0)
    pub opacity: f32,
    /// Pixels desta cor são renderizados transparentes.
    pub transparency_key: Option<ColorHex>,
    pub upload_icon: String,
    pub download_icon: String,
}

/// Converte uma string hex "#RRGGBB" para tupla (r, g, b).
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    parse_hex(hex).unwrap_or((255, 255, 255)) // fallback branco
}

/// Versão estrita de [`hex_to_rgb`]: `None` se a string for inválida.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Converte (r, g, b) para "#rrggbb".
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn default_font() -> FontSpec {
    FontSpec {
        family: FontFamily::Proportional,
        size: 12.0,
        bold: false,
    }
}

/// Tema Escuro (padrão).
pub fn dark_theme() -> Theme {
    Theme {
        name: "dark".into(),
        bg: "#1a1a1a".into(),
        fg: "#ffffff".into(),
        border_color: "#333333".into(),
        font: default_font(),
        border_width: 1.0,
        border_style: BorderStyle::Rounded,
        opacity: 0.85,
        transparency_key: None,
        upload_icon: "▲".into(),
        download_icon: "▼".into(),
    }
}

/// Tema Claro.
pub fn light_theme() -> Theme {
    Theme {
        name: "light".into(),
        bg: "#f5f5f5".into(),
        fg: "#333333".into(),
        border_color: "#cccccc".into(),
        font: default_font(),
        border_width: 1.0,
        border_style: BorderStyle::Solid,
        opacity: 0.9,
        transparency_key: None,
        upload_icon: "▲".into(),
        download_icon: "▼".into(),
    }
}

/// Tema Clássico: fundo preto como cor-chave, só o texto aparece.
pub fn classic_theme() -> Theme {
    Theme {
        name: "classic".into(),
        bg: "#000000".into(),
        fg: "#ffffff".into(),
        border_color: "#000000".into(),
        font: FontSpec {
            family: FontFamily::Proportional,
            size: 12.0,
            bold: false,
        },
        border_width: 0.0,
        border_style: BorderStyle::None,
        opacity: 1.0,
        transparency_key: Some("#000000".into()),
        upload_icon: "Up:".into(),
        download_icon: "Dn:".into(),
    }
}

/// Tema Neon.
pub fn neon_theme() -> Theme {
    Theme {
        name: "neon".into(),
        bg: "#0a0a1a".into(),
        fg: "#00ffff".into(),
        border_color: "#ff00ff".into(),
        font: FontSpec {
            family: FontFamily::Monospace,
            size: 13.0,
            bold: true,
        },
        border_width: 2.0,
        border_style: BorderStyle::Double,
        opacity: 0.9,
        transparency_key: None,
        upload_icon: "↑".into(),
        download_icon: "↓".into(),
    }
}

/// Tema customizável, derivado dos campos do config.
pub fn custom_theme(config: &OverlayConfig) -> Theme {
    Theme {
        name: CUSTOM_THEME.into(),
        bg: config.bg_color.clone(),
        fg: config.fg_color.clone(),
        border_color: config.border_color.clone(),
        font: FontSpec {
            family: config.font_family,
            size: config.font_size,
            bold: config.font_bold,
        },
        border_width: config.border_width,
        border_style: config.border_style,
        opacity: config.opacity,
        transparency_key: config.transparent_bg.then(|| config.bg_color.clone()),
        upload_icon: config.upload_icon.clone(),
        download_icon: config.download_icon.clone(),
    }
}

/// Retorna tema pelo nome. `custom` lê os campos atuais do config.
pub fn get_theme(name: &str, config: &OverlayConfig) -> Theme {
    match name.to_lowercase().as_str() {
        "light" => light_theme(),
        "classic" => classic_theme(),
        "neon" => neon_theme(),
        CUSTOM_THEME => custom_theme(config),
        _ => dark_theme(),
    }
}

/// Nomes de temas disponíveis.
pub fn theme_names() -> Vec<&'static str> {
    vec!["dark", "light", "classic", "neon", CUSTOM_THEME]
}
