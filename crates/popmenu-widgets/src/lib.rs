//! Cascading popup menus for popmenu.
//!
//! - [`MenuPanel`]: the popup surface, its items and keyboard navigation
//! - [`MenuTrigger`]: opens a panel in an overlay next to an anchor
//! - [`MenuItem`]: a selectable row, optionally opening a submenu
//! - [`LazyMenuContent`]: items rendered only while the menu is open
//!
//! Widgets are single-threaded and share a [`MenuEnvironment`] holding the
//! host's overlay and focus services.
//!
//! ```
//! use std::rc::Rc;
//! use popmenu_widgets::{MenuEnvironment, MenuItem, MenuPanel, MenuTrigger};
//! use popmenu_test::TestServices;
//!
//! let services = TestServices::new();
//! let env = MenuEnvironment::new(services.overlays.clone(), services.focus.clone())
//!     .with_scheduler(services.scheduler.clone())
//!     .with_ids(services.ids.clone());
//!
//! let panel = MenuPanel::with_items(&env, vec![
//!     MenuItem::new(&env, "Undo"),
//!     MenuItem::new(&env, "Redo"),
//! ]).unwrap();
//! let trigger = MenuTrigger::new(&env, services.element());
//! trigger.set_menu(Some(Rc::clone(&panel))).unwrap();
//!
//! trigger.open_menu();
//! services.stabilize();
//! assert_eq!(services.focused(), Some(panel.items()[0].host()));
//! ```

pub mod content;
pub mod env;
pub mod item;
pub mod panel;
pub mod positions;
pub mod trigger;

pub use content::{LazyMenuContent, MenuTemplate};
pub use env::MenuEnvironment;
pub use item::{LabelSegment, MenuItem, MenuItemBuilder, MenuItemRole};
pub use panel::{MenuPanel, ELEVATION_PREFIX};
pub use positions::{menu_positions, position_classes, Placement};
pub use trigger::{MenuTrigger, MAX_MENU_DEPTH};
