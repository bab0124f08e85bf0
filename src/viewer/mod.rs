//! Interactive viewing: input tools, the redraw controller, the session
//! context and the desktop window.

pub mod app;
pub mod controller;
pub mod session;
pub mod tool;

pub use app::{run, ViewerApp};
pub use controller::Controller;
pub use session::Session;
pub use tool::{InputEvent, InputHandler, MouseButton, NavState, NavTool};
