//! Headless front-end: view store, role router and roster feed lifecycle.

pub mod app;
pub mod dialogs;
pub mod router;
pub mod subscription;
pub mod view;

pub use app::RosterApp;
pub use dialogs::{Dialogs, ScriptedDialogs};
pub use subscription::Subscription;
pub use view::ViewState;
