// Components module - reusable UI building blocks
//
// Each component renders one region from plain data plus a `Palette`:
// - Sidebar: session list with the drag handle
// - Chat: message history and composer
// - Settings panel: config rows and the deferred About block
// - Status bar: latest warning or key hints
// - Register form: modal account registration
// - Toast: transient notices
// - Fallback: pre-hydration placeholder and faulted-subtree stand-in

pub mod chat;
pub mod fallback;
pub mod register_form;
pub mod settings_panel;
pub mod sidebar;
pub mod status_bar;
pub mod toast;

pub use register_form::{FormField, RegisterForm};
pub use settings_panel::{SettingsInfo, SettingsPanel, SettingsRow};
pub use toast::{Toast, ToastKind};
