//! The eframe application driving every window once per frame.

use super::input::{self, InputConverter, NativeInput};
use super::viewport::SharedViewport;
use super::{ManagedWindow, Platform};
use crate::editor::FontFamilyKind;
use crate::event::MouseEventType;
use crate::menu::{self, Indicator, Menu, MenuEntry, MenuItemRef, MenuRef};
use crate::window::Cursor;
use eframe::egui::{self, Id, Order, Pos2, Rect, ViewportCommand, ViewportId};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

const SCROLLBAR_WIDTH: f32 = 16.0;
#[cfg(unix)]
const SPACE_MOUSE_POLL: std::time::Duration = std::time::Duration::from_millis(20);

#[derive(Clone)]
struct PopupAnchor {
    menu: MenuRef,
    viewport: ViewportId,
    pos: Pos2,
}

pub(crate) struct PlatformApp {
    platform: Platform,
    #[cfg(unix)]
    spnav: Option<crate::spnav::SpnavSource>,
    converters: HashMap<ViewportId, InputConverter>,
    popup: Option<PopupAnchor>,
}

impl PlatformApp {
    pub(crate) fn new(platform: Platform) -> Self {
        #[cfg(unix)]
        let spnav = {
            let socket = platform.config().spnav_socket.clone();
            match crate::spnav::SpnavSource::connect(&socket) {
                Ok(source) => Some(source),
                Err(err) => {
                    tracing::debug!(?err, "space mouse unavailable");
                    None
                }
            }
        };
        Self {
            platform,
            #[cfg(unix)]
            spnav,
            converters: HashMap::new(),
            popup: None,
        }
    }

    fn fire_timers(&self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(deadline) = self.platform.timers().fire_due(now) {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    #[cfg(unix)]
    fn poll_space_mouse(&mut self, ctx: &egui::Context) {
        let Some(source) = self.spnav.as_mut() else {
            return;
        };
        let packets = source.poll();
        if source.is_connected() {
            ctx.request_repaint_after(SPACE_MOUSE_POLL);
        } else {
            self.spnav = None;
        }
        if packets.is_empty() {
            return;
        }

        let Some(target) = self.platform.focused_window() else {
            return;
        };
        let state = input::modifier_mask(ctx.input(|i| i.modifiers));
        for payload in packets {
            target.window.handle_six_dof(&payload, state);
        }
    }

    #[cfg(not(unix))]
    fn poll_space_mouse(&mut self, _ctx: &egui::Context) {}

    fn draw_window(&mut self, ctx: &egui::Context, managed: &ManagedWindow) {
        let id = managed.viewport.borrow().id;
        self.mirror_viewport(ctx, managed, id);

        if let Some(bar) = managed.window.menu_bar() {
            let chosen = egui::TopBottomPanel::top(Id::new(("menu_bar", id)))
                .show(ctx, |ui| {
                    egui::menu::bar(ui, |ui| {
                        let mut chosen = None;
                        for (label, menu) in bar.menus() {
                            let opened =
                                ui.menu_button(label.text.as_str(), |ui| draw_menu(ui, &menu));
                            chosen = chosen.or(opened.inner.flatten());
                        }
                        chosen
                    })
                    .inner
                })
                .inner;
            if let Some(item) = chosen {
                item.native_activate();
            }
        }

        let scrollbar = managed.window.scrollbar();
        if scrollbar.is_visible() {
            let moved = egui::SidePanel::right(Id::new(("scrollbar", id)))
                .resizable(false)
                .exact_width(SCROLLBAR_WIDTH)
                .show(ctx, |ui| {
                    let mut value = scrollbar.value();
                    ui.spacing_mut().slider_width = ui.available_height();
                    // Top of the slider is the minimum, like a scrollbar.
                    let range = scrollbar.upper_value()..=scrollbar.min();
                    let slider = egui::Slider::new(&mut value, range)
                        .vertical()
                        .show_value(false);
                    ui.add(slider).changed().then_some(value)
                })
                .inner;
            if let Some(value) = moved {
                managed.window.handle_scrollbar_changed(value);
            }
        }

        let surface = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| draw_surface(ui, managed))
            .inner;

        self.draw_editor(ctx, managed, id, surface.min);
        self.draw_popup(ctx, id);
        self.dispatch_input(ctx, managed, id, surface);
    }

    fn mirror_viewport(&mut self, ctx: &egui::Context, managed: &ManagedWindow, id: ViewportId) {
        let info = ctx.input(|i| i.viewport().clone());
        let close_requested = info.close_requested();
        let full_screen = info.fullscreen;
        managed.viewport.borrow_mut().info = info;

        if let Some(full_screen) = full_screen {
            managed.window.handle_window_state(full_screen);
        }
        if !close_requested || self.platform.is_exiting() {
            return;
        }
        if managed.window.handle_close_request() {
            tracing::debug!(?id, "close request handled by the application");
            ctx.send_viewport_cmd(ViewportCommand::CancelClose);
        } else if id != ViewportId::ROOT {
            managed.viewport.borrow_mut().visible = false;
        }
    }

    fn draw_editor(
        &self,
        ctx: &egui::Context,
        managed: &ManagedWindow,
        id: ViewportId,
        origin: Pos2,
    ) {
        let Some(geometry) = managed.window.editor_mut().geometry() else {
            return;
        };
        let family = match geometry.font.family {
            FontFamilyKind::Proportional => egui::FontFamily::Proportional,
            FontFamilyKind::Monospace => egui::FontFamily::Monospace,
        };
        let pos = origin + egui::vec2(geometry.left as f32, geometry.top as f32);

        let activated = egui::Area::new(Id::new(("editor", id)))
            .order(Order::Foreground)
            .fixed_pos(pos)
            .show(ctx, |ui| {
                let mut editor = managed.window.editor_mut();
                let padding = editor.style().padding;
                let Some(text) = editor.text_mut() else {
                    return false;
                };
                let width = geometry.width - padding.left - padding.right;
                let response = ui.add(
                    egui::TextEdit::singleline(text)
                        .font(egui::FontId::new(geometry.font.size as f32, family))
                        .desired_width(width as f32),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    return true;
                }
                if !response.has_focus() {
                    response.request_focus();
                }
                false
            })
            .inner;

        if activated {
            managed.window.editor_activated();
        }
    }

    fn draw_popup(&mut self, ctx: &egui::Context, id: ViewportId) {
        let Some(menu) = menu::active_popup() else {
            self.popup = None;
            return;
        };
        let anchor = match &self.popup {
            Some(anchor) if Rc::ptr_eq(&anchor.menu, &menu) => anchor.clone(),
            _ => {
                let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) else {
                    return;
                };
                let anchor = PopupAnchor {
                    menu,
                    viewport: id,
                    pos,
                };
                self.popup = Some(anchor.clone());
                anchor
            }
        };
        if anchor.viewport != id {
            return;
        }

        let area = egui::Area::new(Id::new(("popup", id)))
            .order(Order::Foreground)
            .fixed_pos(anchor.pos)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .show(ui, |ui| draw_menu(ui, &anchor.menu))
                    .inner
            });

        // Submenus live on their own layers outside the popup rectangle.
        let pressed_at = ctx.input(|i| {
            i.pointer
                .any_pressed()
                .then(|| i.pointer.interact_pos())
                .flatten()
        });
        let outside_press = pressed_at.is_some_and(|pos| {
            !area.response.rect.contains(pos) && !ctx.is_pointer_over_area()
        });
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if let Some(item) = area.inner {
            menu::choose_from_pop_up(&item);
        } else if outside_press || escape {
            menu::dismiss_pop_up();
        }
    }

    fn dispatch_input(
        &mut self,
        ctx: &egui::Context,
        managed: &ManagedWindow,
        id: ViewportId,
        surface: Rect,
    ) {
        let (events, modifiers, held, time, scroll, hover) = ctx.input(|i| {
            (
                i.events.clone(),
                i.modifiers,
                input::held_buttons(&i.pointer),
                i.time,
                i.raw_scroll_delta,
                i.pointer.hover_pos(),
            )
        });
        let window = &managed.window;
        let popup_open = menu::popup_active();
        let over_overlay = ctx.is_pointer_over_area();
        let keys_to_surface = window.is_editor_visible() || !ctx.wants_keyboard_input();
        let converter = self.converters.entry(id).or_default();

        for event in &events {
            for native in converter.convert(event, surface.min, modifiers, held, time) {
                match native {
                    NativeInput::Pointer(kind, payload) => {
                        let pos = surface.min + egui::vec2(payload.x as f32, payload.y as f32);
                        let inside = surface.contains(pos);
                        let wanted = match kind {
                            MouseEventType::Release | MouseEventType::Leave => true,
                            _ => !popup_open && !over_overlay && (inside || !held.is_empty()),
                        };
                        if wanted {
                            window.handle_pointer(kind, &payload);
                        }
                    }
                    NativeInput::Press(press, payload) => {
                        let pos = surface.min + egui::vec2(payload.x as f32, payload.y as f32);
                        if !popup_open && !over_overlay && surface.contains(pos) {
                            window.handle_button_press(press, &payload);
                        }
                    }
                    NativeInput::Key(kind, payload) => {
                        if keys_to_surface && !popup_open {
                            window.handle_key(kind, &payload);
                        }
                    }
                }
            }
        }

        let hovered = hover.filter(|pos| surface.contains(*pos) && !over_overlay && !popup_open);
        if let Some(pos) = hovered {
            let local = pos - surface.min.to_vec2();
            let state = input::modifier_mask(modifiers) | held;
            if let Some(payload) = input::scroll_payload(local, scroll, state) {
                window.handle_scroll(&payload);
            }
        }
    }
}

/// Draw the entries of `menu`; returns the item the user picked.
fn draw_menu(ui: &mut egui::Ui, menu: &Menu) -> Option<MenuItemRef> {
    let mut chosen = None;
    for entry in menu.entries() {
        let item = match entry {
            MenuEntry::Separator => {
                ui.separator();
                continue;
            }
            MenuEntry::Item(item) => item,
        };
        let text = item.label().text.clone();
        if let Some(submenu) = item.submenu() {
            let submenu = Rc::clone(submenu);
            let opened = ui.menu_button(text, |ui| draw_menu(ui, &submenu));
            chosen = chosen.or(opened.inner.flatten());
            continue;
        }

        let enabled = item.is_enabled();
        let clicked = match item.indicator() {
            Indicator::None => {
                let mut button = egui::Button::new(text);
                if let Some(shortcut) = item.accelerator_label() {
                    button = button.shortcut_text(shortcut);
                }
                ui.add_enabled(enabled, button).clicked()
            }
            Indicator::CheckMark => {
                let mut checked = item.is_active();
                ui.add_enabled(enabled, egui::Checkbox::new(&mut checked, text))
                    .clicked()
            }
            Indicator::RadioMark => ui
                .add_enabled(enabled, egui::RadioButton::new(item.is_active(), text))
                .clicked(),
        };
        if clicked {
            ui.close_menu();
            chosen = Some(item);
        }
    }
    chosen
}

/// Allocate the drawing surface, render into it if invalidated and replay
/// the recorded scene. Returns the surface rectangle.
fn draw_surface(ui: &mut egui::Ui, managed: &ManagedWindow) -> Rect {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let (resized, cursor, tooltip) = {
        let mut state = managed.viewport.borrow_mut();
        let resized = state.surface.size() != rect.size();
        state.surface = rect;
        (resized, state.cursor, state.tooltip.clone())
    };
    if resized {
        managed.window.invalidate();
    }

    let response = match tooltip {
        Some(text) => response.on_hover_text(text),
        None => response,
    };
    if response.hovered() {
        let icon = match cursor {
            Cursor::Pointer => egui::CursorIcon::Default,
            Cursor::Hand => egui::CursorIcon::PointingHand,
        };
        ui.output_mut(|o| o.cursor_icon = icon);
    }

    if managed.window.take_render_request() {
        managed.window.render();
    }
    replay_scene(ui, &managed.viewport, rect);
    rect
}

fn replay_scene(ui: &egui::Ui, viewport: &SharedViewport, rect: Rect) {
    let offset = rect.min.to_vec2();
    let shapes: Vec<egui::Shape> = viewport
        .borrow()
        .scene
        .iter()
        .cloned()
        .map(|mut shape| {
            shape.translate(offset);
            shape
        })
        .collect();
    ui.painter_at(rect).extend(shapes);
}

impl eframe::App for PlatformApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.fire_timers(ctx);
        self.poll_space_mouse(ctx);

        for managed in self.platform.windows() {
            let (id, visible, title, size) = {
                let state = managed.viewport.borrow();
                (state.id, state.visible, state.title.clone(), state.initial_size)
            };
            if id == ViewportId::ROOT {
                self.draw_window(ctx, &managed);
                continue;
            }
            if !visible {
                continue;
            }
            let builder = egui::ViewportBuilder::default()
                .with_title(title)
                .with_inner_size(size);
            ctx.show_viewport_immediate(id, builder, |ctx, _class| {
                self.draw_window(ctx, &managed);
            });
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::info!("event loop finished");
        if let Err(err) = self.platform.settings().flush() {
            tracing::warn!(?err, "cannot save settings on exit");
        }
    }
}
