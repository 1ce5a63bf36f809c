//! Cálculo de posição do overlay na tela.

use crate::theme::{BorderStyle, Theme};
use serde::{Deserialize, Serialize};

/// Modo de ancoragem da janela.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    /// Posição livre, arrastável com o mouse.
    Free,
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    Center,
}

impl PositionMode {
    pub const ALL: [PositionMode; 8] = [
        PositionMode::Free,
        PositionMode::TopLeft,
        PositionMode::TopRight,
        PositionMode::BottomLeft,
        PositionMode::BottomRight,
        PositionMode::TopCenter,
        PositionMode::BottomCenter,
        PositionMode::Center,
    ];

    /// Nome persistido no config.
    pub fn key(self) -> &'static str {
        match self {
            PositionMode::Free => "free",
            PositionMode::TopLeft => "top_left",
            PositionMode::TopRight => "top_right",
            PositionMode::BottomLeft => "bottom_left",
            PositionMode::BottomRight => "bottom_right",
            PositionMode::TopCenter => "top_center",
            PositionMode::BottomCenter => "bottom_center",
            PositionMode::Center => "center",
        }
    }

    /// Rótulo exibido no menu.
    pub fn label(self) -> &'static str {
        match self {
            PositionMode::Free => "Livre (arrastar)",
            PositionMode::TopLeft => "Canto superior esquerdo",
            PositionMode::TopRight => "Canto superior direito",
            PositionMode::BottomLeft => "Canto inferior esquerdo",
            PositionMode::BottomRight => "Canto inferior direito",
            PositionMode::TopCenter => "Centro superior",
            PositionMode::BottomCenter => "Centro inferior",
            PositionMode::Center => "Centro da tela",
        }
    }

    pub fn is_free(self) -> bool {
        self == PositionMode::Free
    }
}

/// Dimensões em pixels lógicos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Canto superior esquerdo da janela.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Calcula a posição da janela para o modo dado.
///
/// O resultado fica sempre em `[0, tela - janela]` nos dois eixos
/// (0 quando a janela é maior que a tela).
pub fn place(mode: PositionMode, screen: Size, window: Size, free_pos: Position) -> Position {
    let max_x = (screen.width - window.width).max(0.0);
    let max_y = (screen.height - window.height).max(0.0);

    let (x, y) = match mode {
        PositionMode::Free => (free_pos.x, free_pos.y),
        PositionMode::TopLeft => (0.0, 0.0),
        PositionMode::TopRight => (max_x, 0.0),
        PositionMode::BottomLeft => (0.0, max_y),
        PositionMode::BottomRight => (max_x, max_y),
        PositionMode::TopCenter => (max_x / 2.0, 0.0),
        PositionMode::BottomCenter => (max_x / 2.0, max_y),
        PositionMode::Center => (max_x / 2.0, max_y / 2.0),
    };

    Position::new(clamp_axis(x, max_x), clamp_axis(y, max_y))
}

fn clamp_axis(v: f32, max: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, max) } else { 0.0 }
}

/// Margem interna do quadro externo.
pub const FRAME_PADDING: f32 = 6.0;
/// Margem entre as duas linhas da borda dupla.
pub const DOUBLE_BORDER_GAP: f32 = 2.0;

/// Texto de taxa mais largo possível ("1023.9 KB/s").
const WIDEST_RATE_CHARS: usize = 11;
/// Largura média de um caractere, em fração do tamanho da fonte.
const CHAR_WIDTH: f32 = 0.65;
const LINE_HEIGHT: f32 = 1.35;
/// Folga para o negrito sintético e arredondamentos.
const SLACK: f32 = 2.0;

/// Tamanho do overlay (duas linhas de texto) para o tema dado.
///
/// A largura cobre o ícone mais longo seguido da taxa mais larga, mais
/// margens e bordas (duas no estilo duplo).
pub fn overlay_size(theme: &Theme) -> Size {
    let border = match theme.border_style {
        BorderStyle::None => 0.0,
        _ => theme.border_width.max(0.0),
    };
    let frame_side = match theme.border_style {
        BorderStyle::Double => FRAME_PADDING + 2.0 * border + DOUBLE_BORDER_GAP,
        _ => FRAME_PADDING + border,
    };
    let frame = 2.0 * frame_side + SLACK;

    let longest = [&theme.upload_icon, &theme.download_icon]
        .iter()
        .map(|icon| match icon.chars().count() {
            0 => WIDEST_RATE_CHARS,
            n => n + 1 + WIDEST_RATE_CHARS,
        })
        .max()
        .unwrap_or(WIDEST_RATE_CHARS);

    let font_size = theme.font.size;
    Size::new(
        (font_size * CHAR_WIDTH * longest as f32 + frame).ceil(),
        (font_size * LINE_HEIGHT * 2.0 + frame).ceil(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Size = Size { width: 1920.0, height: 1080.0 };
    const WINDOW: Size = Size { width: 200.0, height: 40.0 };

    fn in_bounds(p: Position, screen: Size, window: Size) -> bool {
        let max_x = (screen.width - window.width).max(0.0);
        let max_y = (screen.height - window.height).max(0.0);
        (0.0..=max_x).contains(&p.x) && (0.0..=max_y).contains(&p.y)
    }

    #[test]
    fn anchors_land_where_expected() {
        let free = Position::new(0.0, 0.0);
        assert_eq!(place(PositionMode::TopLeft, SCREEN, WINDOW, free), Position::new(0.0, 0.0));
        assert_eq!(place(PositionMode::TopRight, SCREEN, WINDOW, free), Position::new(1720.0, 0.0));
        assert_eq!(place(PositionMode::BottomLeft, SCREEN, WINDOW, free), Position::new(0.0, 1040.0));
        assert_eq!(place(PositionMode::BottomRight, SCREEN, WINDOW, free), Position::new(1720.0, 1040.0));
        assert_eq!(place(PositionMode::TopCenter, SCREEN, WINDOW, free), Position::new(860.0, 0.0));
        assert_eq!(place(PositionMode::BottomCenter, SCREEN, WINDOW, free), Position::new(860.0, 1040.0));
        assert_eq!(place(PositionMode::Center, SCREEN, WINDOW, free), Position::new(860.0, 520.0));
    }

    #[test]
    fn every_mode_is_clamped() {
        let wild = [
            Position::new(-500.0, -500.0),
            Position::new(5000.0, 5000.0),
            Position::new(1900.0, 10.0),
            Position::new(f32::NAN, 300.0),
        ];
        for mode in PositionMode::ALL {
            for free in wild {
                let p = place(mode, SCREEN, WINDOW, free);
                assert!(in_bounds(p, SCREEN, WINDOW), "{mode:?} {free:?} -> {p:?}");
            }
        }
    }

    #[test]
    fn free_mode_keeps_valid_position() {
        let p = place(PositionMode::Free, SCREEN, WINDOW, Position::new(300.0, 400.0));
        assert_eq!(p, Position::new(300.0, 400.0));
    }

    #[test]
    fn window_larger_than_screen_pins_to_origin() {
        let tiny = Size::new(100.0, 30.0);
        for mode in PositionMode::ALL {
            let p = place(mode, tiny, WINDOW, Position::new(50.0, 50.0));
            assert_eq!(p, Position::new(0.0, 0.0), "{mode:?}");
        }
    }

    #[test]
    fn overlay_grows_with_font() {
        let mut small = crate::theme::dark_theme();
        small.font.size = 10.0;
        let mut large = small.clone();
        large.font.size = 20.0;

        let (small, large) = (overlay_size(&small), overlay_size(&large));
        assert!(large.width > small.width);
        assert!(large.height > small.height);
    }

    #[test]
    fn overlay_fits_longest_icon() {
        let dark = crate::theme::dark_theme();
        let classic = crate::theme::classic_theme();
        let mut long = dark.clone();
        long.upload_icon = "Upload:".into();

        // "Up: 1023.9 KB/s" tem 15 caracteres
        let classic_size = overlay_size(&classic);
        assert!(classic_size.width >= classic.font.size * 0.6 * 15.0);
        assert!(overlay_size(&long).width > overlay_size(&dark).width);
    }

    #[test]
    fn double_border_adds_both_rings() {
        let mut solid = crate::theme::dark_theme();
        solid.border_style = BorderStyle::Solid;
        solid.border_width = 3.0;
        let mut double = solid.clone();
        double.border_style = BorderStyle::Double;
        let mut none = solid.clone();
        none.border_style = BorderStyle::None;

        let extra = overlay_size(&double).width - overlay_size(&solid).width;
        assert_eq!(extra, 2.0 * (3.0 + DOUBLE_BORDER_GAP));
        assert!(overlay_size(&none).width < overlay_size(&solid).width);
    }

    #[test]
    fn mode_keys_are_unique() {
        let mut keys: Vec<_> = PositionMode::ALL.iter().map(|m| m.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), PositionMode::ALL.len());
    }
}
