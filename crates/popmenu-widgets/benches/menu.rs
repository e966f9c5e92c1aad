//! Benchmarks for menu operations.

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use popmenu_core::{Key, KeyboardEvent, XPosition, YPosition};
use popmenu_test::TestServices;
use popmenu_widgets::{
    menu_positions, MenuEnvironment, MenuItem, MenuPanel, MenuTrigger, Placement,
};

fn env(services: &TestServices) -> MenuEnvironment {
    MenuEnvironment::new(services.overlays.clone(), services.focus.clone())
        .with_scheduler(services.scheduler.clone())
        .with_ids(services.ids.clone())
}

fn panel_with(env: &MenuEnvironment, count: usize) -> Rc<MenuPanel> {
    let items = (0..count)
        .map(|i| MenuItem::new(env, format!("item_{i}")))
        .collect();
    MenuPanel::with_items(env, items).unwrap()
}

fn bench_menu_positions(c: &mut Criterion) {
    c.bench_function("menu_positions_submenu", |b| {
        b.iter(|| {
            menu_positions(
                black_box(XPosition::Before),
                black_box(YPosition::Above),
                Placement::Submenu { padding: 8.0 },
            )
        })
    });
}

fn bench_panel_creation(c: &mut Criterion) {
    let services = TestServices::new();
    let env = env(&services);

    c.bench_function("panel_with_100_items", |b| {
        b.iter(|| panel_with(&env, black_box(100)))
    });
}

fn bench_arrow_navigation(c: &mut Criterion) {
    let services = TestServices::new();
    let env = env(&services);
    let panel = panel_with(&env, 100);
    let down = KeyboardEvent::new(Key::Down);

    c.bench_function("panel_arrow_down_100_items", |b| {
        b.iter(|| panel.handle_keydown(black_box(&down)))
    });
}

fn bench_type_ahead(c: &mut Criterion) {
    let services = TestServices::new();
    let env = env(&services);
    let panel = panel_with(&env, 100);
    let key = KeyboardEvent::new(Key::I);

    c.bench_function("panel_type_ahead_100_items", |b| {
        b.iter(|| {
            panel.handle_keydown(black_box(&key));
            services.tick();
        })
    });
}

fn bench_open_close_cycle(c: &mut Criterion) {
    let services = TestServices::new();
    let env = env(&services);
    let panel = panel_with(&env, 10);
    let trigger = MenuTrigger::new(&env, services.element());
    trigger.set_menu(Some(panel)).unwrap();

    c.bench_function("trigger_open_close", |b| {
        b.iter(|| {
            trigger.open_menu();
            services.settle();
            trigger.close_menu();
        })
    });
}

fn bench_submenu_cascade(c: &mut Criterion) {
    let services = TestServices::new();
    let env = env(&services);
    let root = panel_with(&env, 5);
    let sub = panel_with(&env, 5);
    root.items()[4].set_submenu(Some(Rc::clone(&sub))).unwrap();
    let trigger = MenuTrigger::new(&env, services.element());
    trigger.set_menu(Some(Rc::clone(&root))).unwrap();
    let launcher = root.items()[4].submenu_trigger().unwrap();

    c.bench_function("submenu_open_click_cascade", |b| {
        b.iter(|| {
            trigger.open_menu();
            launcher.open_menu();
            sub.items()[0].handle_click();
            services.settle();
        })
    });
}

criterion_group!(
    benches,
    bench_menu_positions,
    bench_panel_creation,
    bench_arrow_navigation,
    bench_type_ahead,
    bench_open_close_cycle,
    bench_submenu_cascade,
);
criterion_main!(benches);
