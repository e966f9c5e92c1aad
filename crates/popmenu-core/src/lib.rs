//! Core types and collaborator traits for the popmenu engine.
//!
//! This crate provides the foundation the menu widgets are built on:
//! - Signalling: [`Emitter`], [`Subscription`], [`SubscriptionBag`]
//! - Cooperative deferral: [`Scheduler`]
//! - Identity: [`ElementId`], [`IdAllocator`]
//! - Input: [`Key`], [`KeyboardEvent`], [`FocusKeyManager`]
//! - Host contracts: [`OverlayService`], [`OverlayRef`], [`FocusService`],
//!   [`ConnectedPositionStrategy`]
//! - Configuration: [`MenuDefaultOptions`] and [`MenuError`]

pub mod animation;
pub mod config;
pub mod direction;
pub mod emitter;
pub mod error;
pub mod event;
pub mod focus;
pub mod id;
pub mod key_manager;
pub mod overlay;
pub mod position;
pub mod scheduler;

pub use animation::{AnimationEvent, AnimationPhase, AnimationState};
pub use config::{MenuDefaultOptions, XPosition, YPosition, MAX_ELEVATION};
pub use direction::Direction;
pub use emitter::{Emitter, ListenerId, Subscription, SubscriptionBag};
pub use error::MenuError;
pub use event::{CloseReason, EventStatus, Key, KeyboardEvent, Modifiers, MouseButton};
pub use focus::{FocusOptions, FocusOrigin, FocusService};
pub use id::{ElementId, IdAllocator};
pub use key_manager::{FocusKeyManager, KeyManagerAction, ListKeyItem};
pub use overlay::{
    OverlayConfig, OverlayRef, OverlayService, Portal, ScrollStrategy, DEFAULT_BACKDROP_CLASS,
};
pub use position::{
    ConnectedOverlayPositionChange, ConnectedPosition, ConnectedPositionStrategy,
    HorizontalConnectionPos, VerticalConnectionPos,
};
pub use scheduler::{Scheduler, TaskId, TaskQueue, MAX_TASKS_PER_FLUSH};
