//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status line showing model name and status
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: Single-line text input with focus/blur
//! - `Viewport`: Scrollable window over the conversation text
//!
//! Components receive external data as "props" (struct fields or function
//! parameters), never by reaching into global state. The controller owns the
//! stateful ones and pushes sizes down on resize.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status line)
//! ├── viewport.rs      (Scrollable conversation view)
//! └── input_box/       (Single-line text input)
//! ```

pub mod input_box;
pub mod title_bar;
pub mod viewport;

pub use input_box::{INPUT_HEIGHT, InputBox, InputEvent};
pub use title_bar::TitleBar;
pub use viewport::Viewport;
