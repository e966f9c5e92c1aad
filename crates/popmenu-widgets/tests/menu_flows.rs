//! End-to-end menu flows: opening, submenu chains, close cascades, focus
//! restoration and lazy content.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::MenuHarness;
use popmenu_core::{
    AnimationState, Direction, FocusOrigin, Key, MenuDefaultOptions, MenuError, OverlayRef,
    XPosition, DEFAULT_BACKDROP_CLASS,
};
use popmenu_widgets::{LazyMenuContent, MenuItem, MenuTrigger};
use serde_json::{json, Value};

// =========================================================================
// Cascading Scenario
// =========================================================================

#[test]
fn test_hover_then_click_closes_both_levels() {
    let h = MenuHarness::new(&["A", "B"]);
    let sub = h.submenu(&h.root, "B", &["C", "D"]);
    let b = h.item("B");
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger().assert_open(&h.trigger);
    h.hover(&b).tick().assert_open(&b_trigger);

    assert_eq!(h.root.elevation_depth(), 0);
    assert_eq!(sub.elevation_depth(), 1);
    assert!(sub.has_class("menu-elevation-z9"));
    let labels: Vec<String> = sub.items().iter().map(|i| i.get_label()).collect();
    assert_eq!(labels, vec!["C", "D"]);

    let d = MenuHarness::item_in(&sub, "D");
    let activated = Rc::new(Cell::new(false));
    let a = Rc::clone(&activated);
    let _sub = d.activated().subscribe(move |_| a.set(true));

    h.services.focus.clear_history();
    h.click(&d);

    assert!(activated.get());
    h.assert_closed(&b_trigger).assert_closed(&h.trigger);
    h.assert_focused(h.anchor);
    h.assert_last_origin(Some(FocusOrigin::Mouse));
    assert_eq!(h.services.focus.focus_count(b.host()), 0);
    assert_eq!(h.root.animation_state(), AnimationState::Void);
    assert_eq!(sub.animation_state(), AnimationState::Void);
}

#[test]
fn test_tab_in_submenu_closes_whole_chain() {
    let h = MenuHarness::new(&["A", "B"]);
    let sub = h.submenu(&h.root, "B", &["C", "D"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger().hover(&h.item("B")).tick();
    h.press(&sub, Key::Tab);

    h.assert_closed(&b_trigger).assert_closed(&h.trigger);
}

#[test]
fn test_escape_in_submenu_closes_one_level() {
    let h = MenuHarness::new(&["A", "B"]);
    let sub = h.submenu(&h.root, "B", &["C", "D"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger().hover(&h.item("B")).tick();
    h.press(&sub, Key::Escape);

    h.assert_closed(&b_trigger).assert_open(&h.trigger);
    h.assert_focused(h.item("B").host());
    h.assert_last_origin(Some(FocusOrigin::Mouse));
}

#[test]
fn test_three_levels_stack_elevation() {
    let h = MenuHarness::new(&["File"]);
    let recent = h.submenu(&h.root, "File", &["Recent"]);
    let projects = h.submenu(&recent, "Recent", &["popmenu", "scratch"]);

    h.click_trigger();
    MenuHarness::trigger_in(&h.root, "File").open_menu();
    MenuHarness::trigger_in(&recent, "Recent").open_menu();

    assert_eq!(recent.elevation_depth(), 1);
    assert_eq!(projects.elevation_depth(), 2);
    assert!(projects.has_class("menu-elevation-z10"));

    h.click(&MenuHarness::item_in(&projects, "popmenu"));
    assert_eq!(h.services.overlays.overlays().iter().filter(|o| o.portal().is_some()).count(), 0);
}

// =========================================================================
// Keyboard Flow
// =========================================================================

#[test]
fn test_keyboard_walks_into_and_out_of_submenu() {
    let h = MenuHarness::new(&["A", "B"]);
    let sub = h.submenu(&h.root, "B", &["C", "D"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.press_trigger(Key::Enter).settle();
    h.assert_focused(h.item("A").host())
        .assert_last_origin(Some(FocusOrigin::Keyboard));

    h.press(&h.root, Key::Down);
    h.assert_focused(h.item("B").host());

    h.press(&h.root, Key::Right).settle();
    h.assert_open(&b_trigger)
        .assert_focused(MenuHarness::item_in(&sub, "C").host())
        .assert_last_origin(Some(FocusOrigin::Keyboard));

    h.press(&sub, Key::Left);
    h.assert_closed(&b_trigger)
        .assert_open(&h.trigger)
        .assert_focused(h.item("B").host());

    h.press(&h.root, Key::Escape);
    h.assert_closed(&h.trigger).assert_focused(h.anchor);
}

#[test]
fn test_rtl_swaps_submenu_arrows() {
    let h = MenuHarness::with_env(&["A", "B"], |env| env.with_direction(Direction::Rtl));
    let sub = h.submenu(&h.root, "B", &["C"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.press_trigger(Key::Enter).settle();
    h.press(&h.root, Key::Down);
    h.press(&h.root, Key::Right);
    h.assert_closed(&b_trigger);

    h.press(&h.root, Key::Left);
    h.assert_open(&b_trigger);
    assert_eq!(sub.direction(), Direction::Rtl);

    h.press(&sub, Key::Left);
    h.assert_open(&b_trigger);
    h.press(&sub, Key::Right);
    h.assert_closed(&b_trigger).assert_open(&h.trigger);
}

#[test]
fn test_type_ahead_and_wrap() {
    let h = MenuHarness::new(&["Copy", "Cut", "Paste"]);
    h.press_trigger(Key::Space).settle();

    h.press(&h.root, Key::P);
    h.assert_focused(h.item("Paste").host());
    h.tick();
    h.press(&h.root, Key::C);
    h.assert_focused(h.item("Copy").host());

    h.press(&h.root, Key::Up);
    h.assert_focused(h.item("Paste").host());
    h.press(&h.root, Key::Down);
    h.assert_focused(h.item("Copy").host());
}

#[test]
fn test_disabled_items_are_skipped() {
    let h = MenuHarness::new(&["A", "B", "C"]);
    h.item("A").set_disabled(true);
    h.item("B").set_disabled(true);

    h.press_trigger(Key::Enter).settle();
    h.assert_focused(h.item("C").host());
    h.press(&h.root, Key::Down);
    h.assert_focused(h.item("C").host());

    h.settle();
    assert_eq!(h.item("A").tab_index(), -1);
    assert_eq!(h.item("C").tab_index(), 0);
}

// =========================================================================
// Closing Signals
// =========================================================================

#[test]
fn test_first_close_signal_wins() {
    let h = MenuHarness::new(&["A"]);
    let closed = Rc::new(Cell::new(0));
    let c = Rc::clone(&closed);
    let _sub = h.trigger.menu_closed().subscribe(move |()| c.set(c.get() + 1));

    h.click_trigger();
    let overlay = h.overlay_of(&h.trigger);
    overlay.click_backdrop();
    overlay.click_backdrop();
    h.trigger.close_menu();

    assert_eq!(closed.get(), 1);
    assert_eq!(overlay.detach_count(), 1);
}

#[test]
fn test_hovering_sibling_closes_submenu_only() {
    let h = MenuHarness::new(&["A", "B"]);
    h.submenu(&h.root, "B", &["C"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger().hover(&h.item("B")).tick();
    h.assert_open(&b_trigger);
    h.hover(&h.item("A"));
    h.assert_closed(&b_trigger).assert_open(&h.trigger);
}

#[test]
fn test_quick_hover_across_launcher_does_not_open() {
    let h = MenuHarness::new(&["A", "B", "C"]);
    h.submenu(&h.root, "B", &["D"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger();
    h.hover(&h.item("A")).hover(&h.item("B")).hover(&h.item("C")).settle();
    h.assert_closed(&b_trigger);
    assert!(!h.item("B").is_highlighted());
}

#[test]
fn test_escape_with_modifier_keeps_menu_open() {
    let h = MenuHarness::new(&["A"]);
    h.click_trigger();
    let overlay = h.overlay_of(&h.trigger);
    overlay.press_key(popmenu_core::KeyboardEvent::with_modifiers(
        Key::Escape,
        popmenu_core::Modifiers::SHIFT,
    ));
    h.assert_open(&h.trigger);
}

// =========================================================================
// Overlay Configuration
// =========================================================================

#[test]
fn test_overlay_created_once_per_trigger() {
    let h = MenuHarness::new(&["A"]);
    for _ in 0..4 {
        h.click_trigger();
        h.overlay_of(&h.trigger).click_backdrop();
    }
    assert_eq!(h.services.overlays.created_count(), 1);

    h.trigger.destroy();
    assert!(h.overlay_of(&h.trigger).is_disposed());
}

#[test]
fn test_backdrop_defaults() {
    let h = MenuHarness::new(&["A", "B"]);
    h.submenu(&h.root, "B", &["C"]);
    let b_trigger = MenuHarness::trigger_in(&h.root, "B");

    h.click_trigger();
    b_trigger.open_menu();

    let root_config = h.overlay_of(&h.trigger).config();
    assert!(root_config.has_backdrop);
    assert_eq!(root_config.backdrop_class, DEFAULT_BACKDROP_CLASS);
    assert!(!h.overlay_of(&b_trigger).config().has_backdrop);
}

#[test]
fn test_options_flow_into_panels() {
    let options = MenuDefaultOptions::from_json(
        r#"{"x_position": "before", "overlap_trigger": true, "has_backdrop": false, "overlay_panel_class": ["wide"]}"#,
    )
    .unwrap();
    let h = MenuHarness::with_options(&["A"], options);

    assert_eq!(h.root.x_position(), XPosition::Before);
    assert!(h.root.has_class("menu-before"));

    h.click_trigger();
    let config = h.overlay_of(&h.trigger).config();
    assert!(!config.has_backdrop);
    assert_eq!(config.panel_class, vec!["wide".to_string()]);

    let strategy = config.position_strategy.unwrap();
    let primary = strategy.positions()[0];
    assert_eq!(primary.origin_y, primary.overlay_y);
}

#[test]
fn test_invalid_options_are_rejected() {
    let err = MenuDefaultOptions::from_json(r#"{"x_position": "left"}"#).unwrap_err();
    assert!(matches!(err, MenuError::InvalidXPosition(_)));
    let err = MenuDefaultOptions::from_json(r#"{"y_position": "middle"}"#).unwrap_err();
    assert!(matches!(err, MenuError::InvalidYPosition(_)));
}

// =========================================================================
// Lazy Content
// =========================================================================

fn lazy_harness() -> (MenuHarness, Rc<LazyMenuContent>, Rc<RefCell<Vec<Value>>>) {
    let h = MenuHarness::new(&[]);
    let contexts = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&contexts);
    let content = LazyMenuContent::new(&h.env, move |env, context| {
        seen.borrow_mut().push(context.clone());
        vec![MenuItem::new(env, "Rename"), MenuItem::new(env, "Delete")]
    });
    h.root.set_lazy_content(Some(Rc::clone(&content)));
    (h, content, contexts)
}

#[test]
fn test_lazy_content_renders_on_open_with_data() {
    let (h, content, contexts) = lazy_harness();
    assert_eq!(h.root.item_count(), 0);

    h.trigger.set_menu_data(Some(json!({"row": 7})));
    h.click_trigger().settle();

    assert!(content.is_attached());
    assert_eq!(h.root.item_count(), 2);
    assert_eq!(*contexts.borrow(), vec![json!({"row": 7})]);
    h.assert_focused(h.item("Rename").host());
}

#[test]
fn test_lazy_content_detaches_after_exit_animation() {
    let (h, content, _) = lazy_harness();
    h.click_trigger();
    h.finish_enter(&h.root);
    h.trigger.close_menu();

    assert!(content.is_attached());
    assert_eq!(h.root.item_count(), 2);

    h.finish_enter(&h.root);
    assert!(content.is_attached());

    h.finish_exit(&h.root);
    assert!(!content.is_attached());
    assert_eq!(h.root.item_count(), 0);
}

#[test]
fn test_reopen_before_exit_keeps_new_content() {
    let (h, content, contexts) = lazy_harness();
    h.click_trigger();
    h.trigger.close_menu();
    h.click_trigger();
    h.finish_exit(&h.root);

    assert!(content.is_attached());
    assert_eq!(h.root.item_count(), 2);
    assert_eq!(contexts.borrow().len(), 2);
    assert_eq!(content.instantiations(), 2);
    assert!(content.host().is_some());
}

#[test]
fn test_destroying_trigger_detaches_lazy_content() {
    let (h, content, _) = lazy_harness();
    h.click_trigger();
    h.trigger.destroy();
    assert!(!content.is_attached());
    assert_eq!(h.root.animation_state(), AnimationState::Void);
}

// =========================================================================
// Shared Panels and Swaps
// =========================================================================

#[test]
fn test_panel_shared_by_two_triggers() {
    let h = MenuHarness::new(&["A"]);
    let second = MenuTrigger::new(&h.env, h.services.element());
    second.set_menu(Some(Rc::clone(&h.root))).unwrap();

    h.click_trigger();
    second.open_menu();
    h.assert_open(&h.trigger).assert_open(&second);

    h.overlay_of(&second).click_backdrop();
    h.assert_closed(&h.trigger).assert_closed(&second);
}

#[test]
fn test_swapping_menu_while_open() {
    let h = MenuHarness::new(&["A"]);
    let other = h.panel(&["X", "Y"]);

    h.click_trigger();
    h.trigger.set_menu(Some(Rc::clone(&other))).unwrap();
    h.assert_closed(&h.trigger);
    assert_eq!(h.root.closed().listener_count(), 0);

    h.click_trigger().settle();
    h.assert_open(&h.trigger)
        .assert_focused(MenuHarness::item_in(&other, "X").host());
    assert_eq!(h.services.overlays.created_count(), 1);
}

#[test]
fn test_recursive_submenu_is_rejected() {
    let h = MenuHarness::new(&["A", "B"]);
    let sub = h.submenu(&h.root, "B", &["C"]);
    let err = MenuHarness::item_in(&sub, "C")
        .set_submenu(Some(Rc::clone(&h.root)))
        .unwrap_err();
    assert_eq!(
        err,
        MenuError::RecursiveMenu {
            panel: h.root.id().to_string()
        }
    );
}
