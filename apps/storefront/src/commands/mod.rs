//! # Screen Commands
//!
//! Everything the screens can ask the shell to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart screen, stepper, header badge, checkout
//! ├── wishlist.rs  ◄─── Wishlist screen, heart toggles
//! └── catalog.rs   ◄─── Product list, product detail, categories
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Command Flow                                    │
//! │                                                                         │
//! │  Screen                                                                 │
//! │    │  add_to_cart(&app.store, product)                                  │
//! │    ▼                                                                    │
//! │  Command ── state commands are synchronous and infallible               │
//! │    │        catalog commands are async and return Result<_, ApiError>   │
//! │    ▼                                                                    │
//! │  Serializable response (camelCase JSON) back to the screen              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handles are passed in explicitly; there is no global app instance.

pub mod cart;
pub mod catalog;
pub mod wishlist;
