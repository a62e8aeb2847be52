//! # Core Application Logic
//!
//! Settings and the vocabulary of the UI state machine.
//! Nothing here touches the terminal or the network.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ChatConfig           │
//!                    │  • Action (events)      │
//!                    │  • Effect (I/O to run)  │
//!                    └───────────┬─────────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!          ┌────────────┐                ┌────────────┐
//!          │    TUI     │   Dispatch →   │ Transport  │
//!          │ Controller │  ← Reply/Fail  │  (reqwest) │
//!          │ (ratatui)  │                │            │
//!          └────────────┘                └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `ChatConfig` and its loading/resolution
//! - [`action`]: `Action` and `Effect`, the controller's inputs and outputs

pub mod action;
pub mod config;
