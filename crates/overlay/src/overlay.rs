//! Overlay principal – App eframe/egui.

use crate::menu::{MENU_SIZE, MenuAction, MenuState};
use crate::sampler_thread::{self, SamplerHandle};
use crate::theme_egui::EguiTheme;
use crate::topmost;
use egui::{Align2, Sense, Vec2};
use netspeed_core::autostart::{self, AutoStartError};
use netspeed_core::placement::{self, Position, PositionMode, Size};
use netspeed_core::sampler::{SystemCounters, Throughput};
use netspeed_core::{ConfigStore, OverlayConfig, format_overlay_text};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Usado enquanto a viewport ainda não informou o tamanho do monitor.
const FALLBACK_SCREEN: Size = Size {
    width: 1920.0,
    height: 1080.0,
};

/// Efeito de uma ação do menu sobre a janela.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Tema/tamanho/posição mudaram: reconstruir a janela.
    Rebuild,
    Interval(u64),
    CloseMenu,
    Quit,
    Error(String),
}

type AutoStartFn = fn(bool) -> Result<(), AutoStartError>;

/// Estado do overlay independente do egui (config, tema e texto).
pub struct OverlayState {
    store: ConfigStore,
    theme: EguiTheme,
    rate: Throughput,
    autostart: AutoStartFn,
}

impl OverlayState {
    pub fn new(store: ConfigStore) -> Self {
        let theme = EguiTheme::from_core(&store.theme());
        Self {
            store,
            theme,
            rate: Throughput::default(),
            autostart: autostart::set_enabled,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        self.store.get()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn theme(&self) -> &EguiTheme {
        &self.theme
    }

    pub fn push_rate(&mut self, rate: Throughput) {
        self.rate = rate;
    }

    /// Texto atual: upload e download em duas linhas.
    pub fn text(&self) -> String {
        format_overlay_text(&self.theme.upload_icon, &self.theme.download_icon, &self.rate)
    }

    pub fn window_size(&self) -> Size {
        placement::overlay_size(&self.store.theme())
    }

    /// Posição alvo da janela para a tela dada.
    pub fn target_position(&self, screen: Size) -> Position {
        let config = self.config();
        placement::place(
            config.position_mode,
            screen,
            self.window_size(),
            Position::new(config.x, config.y),
        )
    }

    /// Salva a posição após arrastar (só no modo livre).
    pub fn remember_free_position(&mut self, pos: Position) {
        if !self.config().position_mode.is_free() {
            return;
        }
        self.store.set(|c| {
            c.x = pos.x;
            c.y = pos.y;
        });
        info!("Posição salva: ({:.0}, {:.0})", pos.x, pos.y);
    }

    fn reload_theme(&mut self) {
        self.theme = EguiTheme::from_core(&self.store.theme());
    }

    /// Aplica uma ação do menu ao config.
    pub fn apply(&mut self, action: &MenuAction) -> Effect {
        match action {
            MenuAction::Theme(name) => {
                let name = name.clone();
                self.store.set(|c| c.theme = name);
                info!("Tema: {}", self.config().theme);
            }
            MenuAction::Position(mode) => {
                let mode = *mode;
                self.store.set(|c| c.position_mode = mode);
                info!("Posição: {}", mode.key());
            }
            MenuAction::Interval(ms) => {
                let ms = *ms;
                self.store.set(|c| c.update_interval_ms = ms);
                return Effect::Interval(self.config().update_interval_ms);
            }
            MenuAction::Opacity(opacity) => {
                let opacity = *opacity;
                self.store.customize(|c| c.opacity = opacity);
            }
            MenuAction::Colors { bg, fg, border } => {
                self.store.customize(|c| {
                    // Nova cor de fundo deixa de ser cor-chave
                    if !c.bg_color.eq_ignore_ascii_case(bg) {
                        c.transparent_bg = false;
                    }
                    c.bg_color = bg.clone();
                    c.fg_color = fg.clone();
                    c.border_color = border.clone();
                });
            }
            MenuAction::Icons { upload, download } => {
                self.store.customize(|c| {
                    c.upload_icon = upload.clone();
                    c.download_icon = download.clone();
                });
            }
            MenuAction::Font { family, size, bold } => {
                let (family, size, bold) = (*family, *size, *bold);
                self.store.customize(|c| {
                    c.font_family = family;
                    c.font_size = size;
                    c.font_bold = bold;
                });
            }
            MenuAction::Border { style, width } => {
                let (style, width) = (*style, *width);
                self.store.customize(|c| {
                    c.border_style = style;
                    c.border_width = width;
                });
            }
            MenuAction::AutoStart(enabled) => {
                let enabled = *enabled;
                return match (self.autostart)(enabled) {
                    Ok(()) => {
                        self.store.set(|c| c.auto_start = enabled);
                        Effect::None
                    }
                    Err(e) => {
                        warn!("Falha ao alterar autostart: {e}");
                        Effect::Error(format!("Não foi possível alterar o autostart: {e}"))
                    }
                };
            }
            MenuAction::Close => return Effect::CloseMenu,
            MenuAction::Quit => return Effect::Quit,
        }

        self.reload_theme();
        Effect::Rebuild
    }
}

/// App eframe do overlay.
pub struct NetSpeedOverlay {
    state: OverlayState,
    sampler: SamplerHandle,
    topmost_running: Arc<AtomicBool>,
    menu: MenuState,
    /// Arrasto em andamento (StartDrag enviado ao SO)
    dragging: bool,
    /// Tela usada na última disposição; `None` força reconstrução
    laid_out_for: Option<Vec2>,
}

impl NetSpeedOverlay {
    pub fn new(cc: &eframe::CreationContext<'_>, store: ConfigStore) -> Self {
        let state = OverlayState::new(store);

        // Inicia thread de amostragem
        let repaint_ctx = cc.egui_ctx.clone();
        let sampler = sampler_thread::spawn_sampler_thread(
            SystemCounters::new().include_loopback(state.config().include_loopback),
            state.config().update_interval_ms,
            move || repaint_ctx.request_repaint(),
        );

        // Inicia thread topmost
        let topmost_running = Arc::new(AtomicBool::new(true));
        let topmost_ctx = cc.egui_ctx.clone();
        topmost::spawn_topmost_thread(
            Arc::clone(&topmost_running),
            topmost::REFRESH_PERIOD,
            move || topmost::raise_overlay(&topmost_ctx),
        );

        Self {
            state,
            sampler,
            topmost_running,
            menu: MenuState::new(),
            dragging: false,
            laid_out_for: None,
        }
    }

    /// Processa amostras pendentes; fica com a mais recente.
    fn poll_sampler(&mut self) {
        while let Ok(rate) = self.sampler.rx.try_recv() {
            self.state.push_rate(rate);
        }
    }

    /// Redimensiona e reposiciona a janela conforme config e tela atual.
    fn layout_window(&mut self, ctx: &egui::Context) {
        if self.dragging {
            return;
        }
        let screen_vec = ctx
            .input(|i| i.viewport().monitor_size)
            .unwrap_or(Vec2::new(FALLBACK_SCREEN.width, FALLBACK_SCREEN.height));
        if self.laid_out_for == Some(screen_vec) {
            return;
        }

        let screen = Size::new(screen_vec.x, screen_vec.y);
        let size = self.state.window_size();
        let pos = self.state.target_position(screen);
        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(Vec2::new(size.width, size.height)));
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(pos.x, pos.y)));

        self.laid_out_for = Some(screen_vec);
    }

    fn rebuild(&mut self) {
        self.laid_out_for = None;
        let config = self.state.config().clone();
        let active = self.state.store().theme();
        self.menu.refresh(&config, &active);
    }

    /// Finaliza o arrasto quando o botão é solto e salva a posição.
    fn track_drag(&mut self, ctx: &egui::Context) {
        if !self.dragging {
            return;
        }
        let (released, outer) = ctx.input(|i| (!i.pointer.primary_down(), i.viewport().outer_rect));
        if released {
            self.dragging = false;
            if let Some(rect) = outer {
                self.state
                    .remember_free_position(Position::new(rect.min.x, rect.min.y));
            }
        } else {
            ctx.request_repaint();
        }
    }

    fn render_overlay(&mut self, ctx: &egui::Context) {
        let theme = self.state.theme().clone();
        let text = self.state.text();

        let outer = egui::Frame::new()
            .fill(theme.bg)
            .stroke(theme.stroke())
            .corner_radius(theme.corner_radius())
            .inner_margin(placement::FRAME_PADDING);

        let response = egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui: &mut egui::Ui| {
                outer
                    .show(ui, |ui: &mut egui::Ui| {
                        if theme.border_style == netspeed_core::theme::BorderStyle::Double {
                            egui::Frame::new()
                                .stroke(theme.stroke())
                                .inner_margin(placement::DOUBLE_BORDER_GAP)
                                .show(ui, |ui: &mut egui::Ui| draw_text(ui, &theme, &text))
                                .inner
                        } else {
                            draw_text(ui, &theme, &text)
                        }
                    })
                    .inner
            })
            .inner;

        // Arrastar só no modo livre
        if self.state.config().position_mode == PositionMode::Free
            && response.drag_started_by(egui::PointerButton::Primary)
        {
            self.dragging = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
        }

        if response.secondary_clicked() {
            let outer_min = ctx
                .input(|i| i.viewport().outer_rect)
                .map(|r| r.min)
                .unwrap_or(egui::Pos2::ZERO);
            let pointer = response.interact_pointer_pos().unwrap_or(egui::Pos2::ZERO);
            let screen = ctx
                .input(|i| i.viewport().monitor_size)
                .map(|v| Size::new(v.x, v.y))
                .unwrap_or(FALLBACK_SCREEN);
            let wanted = outer_min + pointer.to_vec2();
            let pos = placement::place(
                PositionMode::Free,
                screen,
                Size::new(MENU_SIZE[0], MENU_SIZE[1]),
                Position::new(wanted.x, wanted.y),
            );
            let config = self.state.config().clone();
            let active = self.state.store().theme();
            self.menu.open_at(egui::pos2(pos.x, pos.y), &config, &active);
        }
    }

    fn render_menu(&mut self, ctx: &egui::Context) {
        if !self.menu.open {
            return;
        }

        let config = self.state.config().clone();
        let menu = &mut self.menu;
        let actions = ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("overlay_menu"),
            egui::ViewportBuilder::default()
                .with_title("NetSpeed Overlay")
                .with_inner_size(MENU_SIZE)
                .with_position(menu.position)
                .with_resizable(false)
                .with_always_on_top(),
            |ctx, _class| menu.show(ctx, &config),
        );

        for action in actions {
            match self.state.apply(&action) {
                Effect::None => {}
                Effect::Rebuild => self.rebuild(),
                Effect::Interval(ms) => {
                    self.sampler.set_interval_ms(ms);
                    self.rebuild();
                }
                Effect::CloseMenu => self.menu.close(),
                Effect::Quit => {
                    self.menu.close();
                    ctx.send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Close);
                }
                Effect::Error(message) => {
                    self.menu.error = Some(message);
                    self.rebuild();
                }
            }
        }
    }
}

fn draw_text(ui: &mut egui::Ui, theme: &EguiTheme, text: &str) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter();
    let center = rect.center();
    painter.text(center, Align2::CENTER_CENTER, text, theme.font.clone(), theme.fg);
    if theme.bold {
        // Negrito sintético: segunda passada deslocada meio pixel
        painter.text(
            center + Vec2::new(0.6, 0.0),
            Align2::CENTER_CENTER,
            text,
            theme.font.clone(),
            theme.fg,
        );
    }
    response
}

impl eframe::App for NetSpeedOverlay {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Poll amostras ──
        self.poll_sampler();

        // ── Janela ──
        self.layout_window(ctx);
        self.track_drag(ctx);

        // ── Overlay + menu ──
        self.render_overlay(ctx);
        self.render_menu(ctx);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Fundo transparente: o frame pinta a cor do tema
        [0.0, 0.0, 0.0, 0.0]
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.sampler.stop();
        self.topmost_running.store(false, Ordering::Relaxed);
        info!("Overlay encerrado");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netspeed_core::theme::{BorderStyle, CUSTOM_THEME, FontFamily};

    fn state_in(dir: &tempfile::TempDir) -> OverlayState {
        OverlayState::new(ConfigStore::load(dir.path().join("config.toml")))
    }

    #[test]
    fn theme_switch_rebuilds_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        assert_eq!(state.apply(&MenuAction::Theme("neon".into())), Effect::Rebuild);
        assert_eq!(state.store().theme().name, "neon");

        let reloaded = ConfigStore::load(dir.path().join("config.toml"));
        assert_eq!(reloaded.get().theme, "neon");
    }

    #[test]
    fn settings_dialogs_switch_to_custom() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        state.apply(&MenuAction::Border {
            style: BorderStyle::Double,
            width: 3.0,
        });
        assert_eq!(state.config().theme, CUSTOM_THEME);
        assert_eq!(state.theme().border_style, BorderStyle::Double);
        assert_eq!(state.theme().border_width, 3.0);

        state.apply(&MenuAction::Icons {
            upload: "U".into(),
            download: "D".into(),
        });
        assert_eq!(state.text(), "U 0.0 B/s\nD 0.0 B/s");
    }

    #[test]
    fn classic_stays_transparent_after_font_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        state.apply(&MenuAction::Theme("classic".into()));
        assert_eq!(state.theme().bg, egui::Color32::TRANSPARENT);

        state.apply(&MenuAction::Font {
            family: FontFamily::Proportional,
            size: 14.0,
            bold: true,
        });
        assert_eq!(state.config().theme, CUSTOM_THEME);
        assert_eq!(state.theme().bg, egui::Color32::TRANSPARENT);
        assert_eq!(state.theme().upload_icon, "Up:");
    }

    #[test]
    fn new_background_color_drops_transparency() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.apply(&MenuAction::Theme("classic".into()));

        state.apply(&MenuAction::Colors {
            bg: "#202020".into(),
            fg: "#ffffff".into(),
            border: "#000000".into(),
        });
        assert!(!state.config().transparent_bg);
        assert_eq!(
            state.theme().bg,
            egui::Color32::from_rgba_unmultiplied(0x20, 0x20, 0x20, 255)
        );
    }

    #[test]
    fn interval_is_clamped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        assert_eq!(state.apply(&MenuAction::Interval(1)), Effect::Interval(250));
        assert_eq!(state.config().update_interval_ms, 250);
    }

    #[test]
    fn text_follows_latest_rate() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.push_rate(Throughput {
            up_bytes_per_sec: 1536.0,
            down_bytes_per_sec: 1_048_576.0,
        });
        assert_eq!(state.text(), "▲ 1.5 KB/s\n▼ 1.0 MB/s");
    }

    #[test]
    fn free_position_only_saved_in_free_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        state.remember_free_position(Position::new(40.0, 50.0));
        assert_eq!((state.config().x, state.config().y), (0.0, 0.0));

        state.apply(&MenuAction::Position(PositionMode::Free));
        state.remember_free_position(Position::new(40.0, 50.0));
        assert_eq!((state.config().x, state.config().y), (40.0, 50.0));

        let screen = Size::new(800.0, 600.0);
        assert_eq!(state.target_position(screen), Position::new(40.0, 50.0));
    }

    #[test]
    fn target_position_is_on_screen() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.apply(&MenuAction::Position(PositionMode::BottomRight));

        let screen = Size::new(1280.0, 720.0);
        let size = state.window_size();
        let pos = state.target_position(screen);
        assert_eq!(pos, Position::new(1280.0 - size.width, 720.0 - size.height));
    }

    #[test]
    fn autostart_failure_is_reported_and_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        state.autostart = |_| Err(AutoStartError::Unsupported);

        match state.apply(&MenuAction::AutoStart(true)) {
            Effect::Error(msg) => assert!(msg.contains("autostart")),
            other => panic!("esperava erro, veio {other:?}"),
        }
        assert!(!state.config().auto_start);

        state.autostart = |_| Ok(());
        assert_eq!(state.apply(&MenuAction::AutoStart(true)), Effect::None);
        assert!(state.config().auto_start);
    }

    #[test]
    fn close_and_quit_do_not_touch_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        let before = state.config().clone();
        assert_eq!(state.apply(&MenuAction::Close), Effect::CloseMenu);
        assert_eq!(state.apply(&MenuAction::Quit), Effect::Quit);
        assert_eq!(state.config(), &before);
    }
}
