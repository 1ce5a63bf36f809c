//! Conversão de temas para tipos egui.

use egui::{Color32, FontId};
use netspeed_core::theme::{self, BorderStyle, FontFamily, Theme};

/// Tema convertido para tipos egui, com a opacidade já aplicada.
#[derive(Clone, Debug)]
pub struct EguiTheme {
    pub bg: Color32,
    pub fg: Color32,
    pub border: Color32,
    pub font: FontId,
    pub bold: bool,
    pub border_width: f32,
    pub border_style: BorderStyle,
    pub upload_icon: String,
    pub download_icon: String,
}

impl EguiTheme {
    /// Converte um [`Theme`] do core para [`EguiTheme`].
    ///
    /// Cores iguais à cor-chave viram transparentes.
    pub fn from_core(t: &Theme) -> Self {
        let key = t.transparency_key.as_deref().and_then(theme::parse_hex);
        let alpha = (t.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;

        let color = |hex: &str| {
            let rgb = theme::hex_to_rgb(hex);
            if key == Some(rgb) {
                Color32::TRANSPARENT
            } else {
                Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, alpha)
            }
        };

        let family = match t.font.family {
            FontFamily::Proportional => egui::FontFamily::Proportional,
            FontFamily::Monospace => egui::FontFamily::Monospace,
        };

        let border_width = if t.border_style == BorderStyle::None {
            0.0
        } else {
            t.border_width
        };

        Self {
            bg: color(&t.bg),
            fg: color(&t.fg),
            border: color(&t.border_color),
            font: FontId::new(t.font.size, family),
            bold: t.font.bold,
            border_width,
            border_style: t.border_style,
            upload_icon: t.upload_icon.clone(),
            download_icon: t.download_icon.clone(),
        }
    }

    /// Raio dos cantos conforme o estilo de borda.
    pub fn corner_radius(&self) -> f32 {
        match self.border_style {
            BorderStyle::Rounded => 6.0,
            _ => 0.0,
        }
    }

    pub fn stroke(&self) -> egui::Stroke {
        egui::Stroke::new(self.border_width, self.border)
    }
}
