//! Menu de contexto (botão direito) com troca de tema, posição e diálogos
//! de configuração.
//!
//! Roda numa viewport própria: o overlay é pequeno demais para conter o menu.

use egui::{RichText, Ui};
use netspeed_core::config::{MAX_BORDER_WIDTH, MAX_FONT_SIZE, MAX_OPACITY, MIN_FONT_SIZE, MIN_OPACITY};
use netspeed_core::placement::PositionMode;
use netspeed_core::sampler::{MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use netspeed_core::theme::{self, BorderStyle, FontFamily, Theme};
use netspeed_core::OverlayConfig;

pub const MENU_SIZE: [f32; 2] = [300.0, 460.0];

/// Ação escolhida no menu, aplicada pelo overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Theme(String),
    Position(PositionMode),
    Interval(u64),
    Opacity(f32),
    Colors {
        bg: String,
        fg: String,
        border: String,
    },
    Icons {
        upload: String,
        download: String,
    },
    Font {
        family: FontFamily,
        size: f32,
        bold: bool,
    },
    Border {
        style: BorderStyle,
        width: f32,
    },
    AutoStart(bool),
    Close,
    Quit,
}

/// Valores em edição nos diálogos.
#[derive(Debug, Clone)]
struct Draft {
    interval_ms: u64,
    opacity: f32,
    bg: [u8; 3],
    fg: [u8; 3],
    border: [u8; 3],
    upload_icon: String,
    download_icon: String,
    font_family: FontFamily,
    font_size: f32,
    font_bold: bool,
    border_style: BorderStyle,
    border_width: f32,
    auto_start: bool,
}

impl Draft {
    /// Captura os valores efetivos (tema ativo + config).
    fn capture(config: &OverlayConfig, active: &Theme) -> Self {
        Self {
            interval_ms: config.update_interval_ms,
            opacity: active.opacity,
            bg: rgb(&active.bg),
            fg: rgb(&active.fg),
            border: rgb(&active.border_color),
            upload_icon: active.upload_icon.clone(),
            download_icon: active.download_icon.clone(),
            font_family: active.font.family,
            font_size: active.font.size,
            font_bold: active.font.bold,
            border_style: active.border_style,
            border_width: active.border_width,
            auto_start: config.auto_start,
        }
    }
}

fn rgb(hex: &str) -> [u8; 3] {
    let (r, g, b) = theme::hex_to_rgb(hex);
    [r, g, b]
}

fn hex(c: [u8; 3]) -> String {
    theme::rgb_to_hex(c[0], c[1], c[2])
}

/// Slider/campo terminou a edição (soltou o mouse ou alterou pelo teclado).
fn committed(r: &egui::Response) -> bool {
    r.drag_stopped() || (r.changed() && !r.dragged())
}

/// Estado do menu entre frames.
pub struct MenuState {
    pub open: bool,
    /// Posição da janela do menu na tela
    pub position: egui::Pos2,
    draft: Option<Draft>,
    /// Mensagem exibida em modal (ex.: falha no autostart)
    pub error: Option<String>,
}

impl MenuState {
    pub fn new() -> Self {
        Self {
            open: false,
            position: egui::Pos2::ZERO,
            draft: None,
            error: None,
        }
    }

    pub fn open_at(&mut self, position: egui::Pos2, config: &OverlayConfig, active: &Theme) {
        self.open = true;
        self.position = position;
        self.draft = Some(Draft::capture(config, active));
    }

    /// Recarrega os valores após uma mudança aplicada.
    pub fn refresh(&mut self, config: &OverlayConfig, active: &Theme) {
        if self.open {
            self.draft = Some(Draft::capture(config, active));
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.draft = None;
    }

    /// Desenha o conteúdo do menu e retorna as ações escolhidas.
    pub fn show(&mut self, ctx: &egui::Context, config: &OverlayConfig) -> Vec<MenuAction> {
        let mut actions = Vec::new();

        if ctx.input(|i| i.viewport().close_requested() || i.key_pressed(egui::Key::Escape)) {
            actions.push(MenuAction::Close);
        }

        let draft = self
            .draft
            .get_or_insert_with(|| Draft::capture(config, &theme::get_theme(&config.theme, config)));

        egui::CentralPanel::default().show(ctx, |ui: &mut Ui| {
            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                ui.label(RichText::new("NetSpeed Overlay").strong().size(15.0));
                ui.separator();

                theme_section(ui, config, &mut actions);
                position_section(ui, config, &mut actions);

                ui.separator();
                ui.label(RichText::new("Configurações").strong());
                interval_dialog(ui, draft, &mut actions);
                opacity_dialog(ui, draft, &mut actions);
                colors_dialog(ui, draft, &mut actions);
                icons_dialog(ui, draft, &mut actions);
                font_dialog(ui, draft, &mut actions);
                border_dialog(ui, draft, &mut actions);

                ui.separator();
                if ui.checkbox(&mut draft.auto_start, "Iniciar com o sistema").changed() {
                    actions.push(MenuAction::AutoStart(draft.auto_start));
                }

                ui.separator();
                ui.horizontal(|ui: &mut Ui| {
                    if ui.button("Fechar menu").clicked() {
                        actions.push(MenuAction::Close);
                    }
                    if ui.button("Sair").clicked() {
                        actions.push(MenuAction::Quit);
                    }
                });
            });
        });

        if let Some(message) = self.error.clone() {
            let modal = egui::Modal::new(egui::Id::new("menu_error")).show(ctx, |ui: &mut Ui| {
                ui.label(RichText::new("Erro").strong());
                ui.label(&message);
                ui.add_space(6.0);
                ui.button("OK").clicked()
            });
            if modal.inner || modal.should_close() {
                self.error = None;
            }
        }

        actions
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────
// Seções
// ──────────────────────────────────────────

fn theme_section(ui: &mut Ui, config: &OverlayConfig, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Tema")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for name in theme::theme_names() {
                let selected = config.theme.eq_ignore_ascii_case(name);
                if ui.radio(selected, name).clicked() && !selected {
                    actions.push(MenuAction::Theme(name.to_string()));
                }
            }
        });
}

fn position_section(ui: &mut Ui, config: &OverlayConfig, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Posição").show(ui, |ui: &mut Ui| {
        for mode in PositionMode::ALL {
            let selected = config.position_mode == mode;
            if ui.radio(selected, mode.label()).clicked() && !selected {
                actions.push(MenuAction::Position(mode));
            }
        }
    });
}

fn interval_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Intervalo de atualização").show(ui, |ui: &mut Ui| {
        let r = ui.add(
            egui::Slider::new(&mut draft.interval_ms, MIN_INTERVAL_MS..=MAX_INTERVAL_MS)
                .suffix(" ms")
                .step_by(50.0),
        );
        if committed(&r) {
            actions.push(MenuAction::Interval(draft.interval_ms));
        }
    });
}

fn opacity_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Opacidade").show(ui, |ui: &mut Ui| {
        let r = ui.add(egui::Slider::new(&mut draft.opacity, MIN_OPACITY..=MAX_OPACITY).step_by(0.05));
        if committed(&r) {
            actions.push(MenuAction::Opacity(draft.opacity));
        }
    });
}

fn colors_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Cores").show(ui, |ui: &mut Ui| {
        let mut changed = false;
        egui::Grid::new("colors_grid").num_columns(2).show(ui, |ui: &mut Ui| {
            for (label, color) in [
                ("Fundo", &mut draft.bg),
                ("Texto", &mut draft.fg),
                ("Borda", &mut draft.border),
            ] {
                ui.label(label);
                changed |= egui::color_picker::color_edit_button_srgb(ui, color).changed();
                ui.end_row();
            }
        });
        if changed {
            actions.push(MenuAction::Colors {
                bg: hex(draft.bg),
                fg: hex(draft.fg),
                border: hex(draft.border),
            });
        }
    });
}

fn icons_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Ícones").show(ui, |ui: &mut Ui| {
        egui::Grid::new("icons_grid").num_columns(2).show(ui, |ui: &mut Ui| {
            ui.label("Upload");
            ui.add(egui::TextEdit::singleline(&mut draft.upload_icon).desired_width(80.0));
            ui.end_row();
            ui.label("Download");
            ui.add(egui::TextEdit::singleline(&mut draft.download_icon).desired_width(80.0));
            ui.end_row();
        });
        if ui.button("Aplicar").clicked() {
            actions.push(MenuAction::Icons {
                upload: draft.upload_icon.clone(),
                download: draft.download_icon.clone(),
            });
        }
    });
}

fn font_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Fonte").show(ui, |ui: &mut Ui| {
        let before = draft.font_family;
        egui::ComboBox::from_id_salt("font_family")
            .selected_text(draft.font_family.label())
            .show_ui(ui, |ui: &mut Ui| {
                for family in FontFamily::ALL {
                    ui.selectable_value(&mut draft.font_family, family, family.label());
                }
            });
        let size = ui.add(egui::Slider::new(&mut draft.font_size, MIN_FONT_SIZE..=MAX_FONT_SIZE).text("Tamanho"));
        let bold = ui.checkbox(&mut draft.font_bold, "Negrito");

        if before != draft.font_family || committed(&size) || bold.changed() {
            actions.push(MenuAction::Font {
                family: draft.font_family,
                size: draft.font_size,
                bold: draft.font_bold,
            });
        }
    });
}

fn border_dialog(ui: &mut Ui, draft: &mut Draft, actions: &mut Vec<MenuAction>) {
    egui::CollapsingHeader::new("Borda").show(ui, |ui: &mut Ui| {
        let before = draft.border_style;
        egui::ComboBox::from_id_salt("border_style")
            .selected_text(draft.border_style.label())
            .show_ui(ui, |ui: &mut Ui| {
                for style in BorderStyle::ALL {
                    ui.selectable_value(&mut draft.border_style, style, style.label());
                }
            });
        let width = ui.add(egui::Slider::new(&mut draft.border_width, 0.0..=MAX_BORDER_WIDTH).text("Largura"));

        if before != draft.border_style || committed(&width) {
            actions.push(MenuAction::Border {
                style: draft.border_style,
                width: draft.border_width,
            });
        }
    });
}
