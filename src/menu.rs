//! Menus, menu bars and menu items.
//!
//! The tree is plain data owned through `Rc`; the backend renders it every
//! frame and reports user activation back through [`MenuItem::native_activate`].

use crate::event::KeyboardEvent;
use crate::handler::Handler;
use crate::native::{keysym_for_accelerator, keysym_to_lower, KeyPayload, ModifierMask};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type MenuItemRef = Rc<MenuItem>;
pub type MenuRef = Rc<Menu>;
pub type MenuBarRef = Rc<MenuBar>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    #[default]
    None,
    CheckMark,
    RadioMark,
}

/// Display text of a menu entry with its mnemonic extracted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Label {
    pub text: String,
    pub mnemonic: Option<char>,
}

/// Strip `&` mnemonic markup. The first `&x` makes `x` the mnemonic and
/// `&&` stands for a literal ampersand.
pub fn prepare_mnemonics(label: &str) -> Label {
    let mut text = String::with_capacity(label.len());
    let mut mnemonic = None;
    let mut chars = label.chars();
    while let Some(chr) = chars.next() {
        if chr != '&' {
            text.push(chr);
            continue;
        }
        match chars.next() {
            Some('&') => text.push('&'),
            Some(next) => {
                mnemonic.get_or_insert(next);
                text.push(next);
            }
            None => {}
        }
    }
    Label { text, mnemonic }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MirrorState {
    Idle,
    ApplyingExternal,
}

struct MirrorGuard<'a>(&'a Cell<MirrorState>);

impl<'a> MirrorGuard<'a> {
    fn raise(state: &'a Cell<MirrorState>) -> Self {
        state.set(MirrorState::ApplyingExternal);
        Self(state)
    }
}

impl Drop for MirrorGuard<'_> {
    fn drop(&mut self) {
        self.0.set(MirrorState::Idle);
    }
}

pub struct MenuItem {
    label: Label,
    accelerator: Cell<Option<KeyboardEvent>>,
    indicator: Cell<Indicator>,
    active: Cell<bool>,
    enabled: Cell<bool>,
    mirror: Cell<MirrorState>,
    submenu: Option<MenuRef>,
    pub on_trigger: Handler<dyn FnMut()>,
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label.text)
            .field("indicator", &self.indicator.get())
            .field("active", &self.active.get())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

impl MenuItem {
    fn new(label: &str, submenu: Option<MenuRef>) -> Self {
        Self {
            label: prepare_mnemonics(label),
            accelerator: Cell::new(None),
            indicator: Cell::new(Indicator::None),
            active: Cell::new(false),
            enabled: Cell::new(true),
            mirror: Cell::new(MirrorState::Idle),
            submenu,
            on_trigger: Handler::default(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn submenu(&self) -> Option<&MenuRef> {
        self.submenu.as_ref()
    }

    pub fn set_accelerator(&self, accel: KeyboardEvent) {
        self.accelerator.set(Some(accel));
    }

    pub fn accelerator(&self) -> Option<KeyboardEvent> {
        self.accelerator.get()
    }

    /// Shortcut text shown next to the label, e.g. `Ctrl+S`.
    pub fn accelerator_label(&self) -> Option<String> {
        self.accelerator.get().map(|accel| accel.to_string())
    }

    pub fn set_indicator(&self, indicator: Indicator) {
        self.indicator.set(indicator);
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator.get()
    }

    /// Reflect application state in the indicator.
    ///
    /// The change is applied the same way a user click would be, but the
    /// trigger callback is suppressed for the duration, so mirroring state
    /// never feeds back into the application.
    ///
    /// # Panics
    ///
    /// Panics if the item has no indicator.
    pub fn set_active(&self, active: bool) {
        assert!(
            self.indicator.get() != Indicator::None,
            "cannot change state of a menu item without indicator"
        );
        if self.active.get() == active {
            return;
        }

        let _guard = MirrorGuard::raise(&self.mirror);
        self.apply_activation(Some(active));
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Activation coming from the toolkit: a click, a keyboard selection or
    /// an accelerator. Check marks toggle and radio marks switch on.
    pub fn native_activate(&self) {
        if !self.enabled.get() {
            tracing::debug!(label = %self.label.text, "ignoring activation of disabled menu item");
            return;
        }
        self.apply_activation(None);
    }

    fn apply_activation(&self, requested: Option<bool>) {
        match self.indicator.get() {
            Indicator::None => {}
            Indicator::CheckMark => {
                self.active.set(requested.unwrap_or(!self.active.get()));
            }
            Indicator::RadioMark => self.active.set(requested.unwrap_or(true)),
        }

        if self.mirror.get() == MirrorState::ApplyingExternal {
            tracing::trace!(label = %self.label.text, "synthetic menu state change");
            return;
        }
        tracing::debug!(label = %self.label.text, "menu item triggered");
        self.on_trigger.with(|trigger| trigger());
    }

    fn matches_key(&self, payload: &KeyPayload) -> bool {
        let Some(accel) = self.accelerator.get() else {
            return false;
        };
        let ignored = ModifierMask::LOCK
            | ModifierMask::MOD2
            | ModifierMask::BUTTON1
            | ModifierMask::BUTTON2
            | ModifierMask::BUTTON3
            | ModifierMask::BUTTON4
            | ModifierMask::BUTTON5;
        let state = payload.state.difference(ignored);
        let mut wanted = ModifierMask::NONE;
        if accel.shift_down {
            wanted |= ModifierMask::SHIFT;
        }
        if accel.control_down {
            wanted |= ModifierMask::CONTROL;
        }
        state == wanted
            && keysym_to_lower(keysym_for_accelerator(&accel)) == keysym_to_lower(payload.keysym)
    }
}

#[derive(Debug, Clone)]
pub enum MenuEntry {
    Item(MenuItemRef),
    Separator,
}

#[derive(Debug, Default)]
pub struct Menu {
    entries: RefCell<Vec<MenuEntry>>,
}

pub fn create_menu() -> MenuRef {
    Rc::new(Menu::default())
}

impl Menu {
    pub fn add_item(&self, label: &str, on_trigger: Option<Box<dyn FnMut()>>) -> MenuItemRef {
        let item = Rc::new(MenuItem::new(label, None));
        if let Some(on_trigger) = on_trigger {
            item.on_trigger.set(on_trigger);
        }
        self.entries.borrow_mut().push(MenuEntry::Item(Rc::clone(&item)));
        item
    }

    pub fn add_sub_menu(&self, label: &str) -> MenuRef {
        let submenu = create_menu();
        let item = Rc::new(MenuItem::new(label, Some(Rc::clone(&submenu))));
        self.entries.borrow_mut().push(MenuEntry::Item(item));
        submenu
    }

    pub fn add_separator(&self) {
        self.entries.borrow_mut().push(MenuEntry::Separator);
    }

    /// Snapshot of the entries in insertion order. Triggers may rebuild the
    /// menu, so callers iterate the snapshot rather than the live list.
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.entries.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Show this menu as a context menu at the pointer.
    ///
    /// The menu becomes the event loop's active popup and stays open until
    /// an item is chosen or the user dismisses it. `on_dismissed` is where
    /// the caller resumes: it runs once, after the chosen item's trigger.
    ///
    /// # Panics
    ///
    /// Panics if another popup is already active.
    pub fn pop_up(self: &Rc<Self>, on_dismissed: impl FnOnce() + 'static) {
        ACTIVE_POPUP.with(|slot| {
            let mut slot = slot.borrow_mut();
            assert!(slot.is_none(), "a popup menu is already active");
            *slot = Some(ActivePopup {
                menu: Rc::clone(self),
                on_dismissed: Box::new(on_dismissed),
            });
        });
        tracing::debug!("popup menu shown");
    }

    pub fn clear(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for entry in &entries {
            if let MenuEntry::Item(item) = entry {
                if let Some(submenu) = item.submenu() {
                    submenu.clear();
                }
            }
        }
        let this: *const Menu = self;
        let popup = ACTIVE_POPUP.with(|slot| {
            let mut slot = slot.borrow_mut();
            let shown = slot
                .as_ref()
                .is_some_and(|popup| std::ptr::eq(Rc::as_ptr(&popup.menu), this));
            if shown {
                slot.take()
            } else {
                None
            }
        });
        if let Some(popup) = popup {
            tracing::debug!("popup menu cleared while shown");
            (popup.on_dismissed)();
        }
    }

    /// The enabled item, here or in a submenu, whose accelerator matches a
    /// native key press.
    pub fn find_accelerator(&self, payload: &KeyPayload) -> Option<MenuItemRef> {
        for entry in self.entries() {
            let MenuEntry::Item(item) = entry else {
                continue;
            };
            if let Some(submenu) = item.submenu() {
                if let Some(found) = submenu.find_accelerator(payload) {
                    return Some(found);
                }
            } else if item.is_enabled() && item.matches_key(payload) {
                return Some(item);
            }
        }
        None
    }
}

struct ActivePopup {
    menu: MenuRef,
    on_dismissed: Box<dyn FnOnce()>,
}

thread_local! {
    static ACTIVE_POPUP: RefCell<Option<ActivePopup>> = const { RefCell::new(None) };
}

fn take_active_popup() -> Option<ActivePopup> {
    ACTIVE_POPUP.with(|slot| slot.borrow_mut().take())
}

pub fn popup_active() -> bool {
    ACTIVE_POPUP.with(|slot| slot.borrow().is_some())
}

pub fn active_popup() -> Option<MenuRef> {
    ACTIVE_POPUP.with(|slot| slot.borrow().as_ref().map(|popup| Rc::clone(&popup.menu)))
}

/// Close the active popup without a choice, if any, and resume its caller.
pub fn dismiss_pop_up() {
    if let Some(popup) = take_active_popup() {
        tracing::debug!("popup menu dismissed");
        (popup.on_dismissed)();
    }
}

/// The user picked `item` from the active popup: close the popup, run the
/// item's trigger, then resume the caller.
pub fn choose_from_pop_up(item: &MenuItemRef) {
    let popup = take_active_popup();
    item.native_activate();
    if let Some(popup) = popup {
        tracing::debug!("popup menu item chosen");
        (popup.on_dismissed)();
    }
}

#[derive(Debug, Default)]
pub struct MenuBar {
    menus: RefCell<Vec<(Label, MenuRef)>>,
}

/// There is no system-wide menu bar here, so every window gets its own and
/// the returned flag is always `false`.
pub fn get_or_create_main_menu() -> (MenuBarRef, bool) {
    (Rc::new(MenuBar::default()), false)
}

impl MenuBar {
    pub fn add_sub_menu(&self, label: &str) -> MenuRef {
        let menu = create_menu();
        self.menus
            .borrow_mut()
            .push((prepare_mnemonics(label), Rc::clone(&menu)));
        menu
    }

    pub fn menus(&self) -> Vec<(Label, MenuRef)> {
        self.menus.borrow().clone()
    }

    pub fn clear(&self) {
        let menus = std::mem::take(&mut *self.menus.borrow_mut());
        for (_, menu) in menus {
            menu.clear();
        }
    }

    pub fn find_accelerator(&self, payload: &KeyPayload) -> Option<MenuItemRef> {
        self.menus()
            .iter()
            .find_map(|(_, menu)| menu.find_accelerator(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::keysym;

    fn counting_item(menu: &Menu, label: &str) -> (MenuItemRef, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let item = menu.add_item(label, Some(Box::new(move || counter.set(counter.get() + 1))));
        (item, count)
    }

    #[test]
    fn mnemonics_are_extracted() {
        let label = prepare_mnemonics("&File");
        assert_eq!(label.text, "File");
        assert_eq!(label.mnemonic, Some('F'));

        let label = prepare_mnemonics("Save && &Quit");
        assert_eq!(label.text, "Save & Quit");
        assert_eq!(label.mnemonic, Some('Q'));

        assert_eq!(prepare_mnemonics("Plain").mnemonic, None);
    }

    #[test]
    fn set_active_never_triggers() {
        let menu = create_menu();
        let (item, count) = counting_item(&menu, "&Grid");
        item.set_indicator(Indicator::CheckMark);

        item.set_active(true);
        item.set_active(true);
        assert!(item.is_active());
        item.set_active(false);
        assert!(!item.is_active());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn user_activation_triggers_and_toggles() {
        let menu = create_menu();
        let (item, count) = counting_item(&menu, "Grid");
        item.set_indicator(Indicator::CheckMark);

        item.native_activate();
        assert!(item.is_active());
        item.native_activate();
        assert!(!item.is_active());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn radio_activation_switches_on() {
        let menu = create_menu();
        let (item, count) = counting_item(&menu, "Inches");
        item.set_indicator(Indicator::RadioMark);
        item.native_activate();
        item.native_activate();
        assert!(item.is_active());
        assert_eq!(count.get(), 2);
    }

    #[test]
    #[should_panic(expected = "without indicator")]
    fn set_active_requires_indicator() {
        let menu = create_menu();
        let item = menu.add_item("Plain", None);
        item.set_active(true);
    }

    #[test]
    fn disabled_items_ignore_activation() {
        let menu = create_menu();
        let (item, count) = counting_item(&menu, "Undo");
        item.set_enabled(false);
        item.native_activate();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn trigger_may_rebuild_its_menu() {
        let menu = create_menu();
        let inner = Rc::clone(&menu);
        let item = menu.add_item(
            "Recent",
            Some(Box::new(move || {
                inner.clear();
                inner.add_item("Fresh", None);
            })),
        );
        item.native_activate();
        assert_eq!(menu.entries().len(), 1);
    }

    #[test]
    fn accelerators_are_found_in_submenus() {
        let (bar, unique) = get_or_create_main_menu();
        assert!(!unique);
        let file = bar.add_sub_menu("&File");
        let export = file.add_sub_menu("&Export");
        file.add_separator();
        let item = export.add_item("Export &PNG", None);
        item.set_accelerator(KeyboardEvent::character('e').with_control().with_shift());

        let press = KeyPayload {
            keysym: 'E' as u32,
            state: ModifierMask::CONTROL | ModifierMask::SHIFT | ModifierMask::MOD2,
        };
        let found = bar.find_accelerator(&press).expect("accelerator");
        assert!(Rc::ptr_eq(&found, &item));

        let without_shift = KeyPayload {
            keysym: 'e' as u32,
            state: ModifierMask::CONTROL,
        };
        assert!(bar.find_accelerator(&without_shift).is_none());

        item.set_enabled(false);
        assert!(bar.find_accelerator(&press).is_none());
    }

    #[test]
    fn function_key_accelerators() {
        let (bar, _) = get_or_create_main_menu();
        let view = bar.add_sub_menu("&View");
        let item = view.add_item("Zoom to &Fit", None);
        item.set_accelerator(KeyboardEvent::function(2));
        assert_eq!(item.accelerator_label().as_deref(), Some("F2"));
        let press = KeyPayload {
            keysym: keysym::F1 + 1,
            state: ModifierMask::NONE,
        };
        assert!(bar.find_accelerator(&press).is_some());
    }

    #[test]
    fn popup_is_registered_until_dismissed() {
        let menu = create_menu();
        menu.add_item("Delete", None);
        assert!(!popup_active());
        let resumed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&resumed);
        menu.pop_up(move || counter.set(counter.get() + 1));
        assert!(popup_active());
        assert!(Rc::ptr_eq(&active_popup().expect("popup"), &menu));
        assert_eq!(resumed.get(), 0);
        dismiss_pop_up();
        dismiss_pop_up();
        assert!(!popup_active());
        assert_eq!(resumed.get(), 1);
    }

    #[test]
    fn caller_resumes_after_the_chosen_trigger() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let menu = create_menu();
        let log = Rc::clone(&order);
        let item = menu.add_item(
            "Delete",
            Some(Box::new(move || log.borrow_mut().push("trigger"))),
        );
        let log = Rc::clone(&order);
        menu.pop_up(move || {
            assert!(!popup_active());
            log.borrow_mut().push("resumed");
        });

        choose_from_pop_up(&item);
        assert_eq!(*order.borrow(), vec!["trigger", "resumed"]);
        assert!(!popup_active());

        choose_from_pop_up(&item);
        assert_eq!(*order.borrow(), vec!["trigger", "resumed", "trigger"]);
    }

    #[test]
    fn trigger_may_open_the_next_popup() {
        let next = create_menu();
        next.add_item("Paste", None);
        let menu = create_menu();
        let opener = Rc::clone(&next);
        let item = menu.add_item("More", Some(Box::new(move || opener.pop_up(|| {}))));
        menu.pop_up(|| {});

        choose_from_pop_up(&item);
        assert!(Rc::ptr_eq(&active_popup().expect("popup"), &next));
        dismiss_pop_up();
    }

    #[test]
    #[should_panic(expected = "already active")]
    fn nested_popup_panics() {
        let first = create_menu();
        let second = create_menu();
        first.pop_up(|| {});
        second.pop_up(|| {});
    }

    #[test]
    fn clearing_a_popup_dismisses_it() {
        let menu = create_menu();
        menu.add_item("Cut", None);
        let resumed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&resumed);
        menu.pop_up(move || flag.set(true));
        menu.clear();
        menu.clear();
        assert!(menu.is_empty());
        assert!(!popup_active());
        assert!(resumed.get());
    }
}
