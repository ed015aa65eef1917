//! # dishdash-checkout: Checkout Orchestration for DishDash
//!
//! The stateful shell around [`dishdash_core`]: it owns deployment
//! configuration, logging, the wall clock and the per-customer caches, and
//! calls into the pure pricing core.
//!
//! ## Crate Structure
//! ```text
//! dishdash-checkout/
//! ├── config.rs     ← checkout.toml + DISHDASH_* overrides
//! ├── session.rs    ← CheckoutSession (cart, promo codes, totals)
//! ├── telemetry.rs  ← tracing subscriber setup
//! └── error.rs      ← CheckoutError
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dishdash_checkout::{CheckoutConfig, CheckoutSession};
//! use dishdash_core::{CurrentSelection, MenuItem, Money};
//!
//! let menu = vec![MenuItem::new("duo", "Duo pack", Money::from_cents(65_000))];
//! let current = CurrentSelection {
//!     menu_item_id: "duo".to_string(),
//!     quantity: 2,
//!     ..CurrentSelection::default()
//! };
//!
//! let mut session = CheckoutSession::new(CheckoutConfig::default());
//! session.set_delivery_fee(Money::from_cents(20_000));
//!
//! let entries = session.proceed_to_cart(&menu, &[], &current).unwrap();
//! let totals = session.quote(&entries, None);
//! assert_eq!(totals.total.cents(), 150_000);
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;

pub use config::CheckoutConfig;
pub use error::{CheckoutError, CheckoutResult};
pub use session::CheckoutSession;
pub use telemetry::init_tracing;
