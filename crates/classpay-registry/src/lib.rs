//! # classpay-registry
//!
//! **Class Registry**: the source of truth for class definitions, whether a
//! class is open, who its instructor and venue are, and who registered.
//!
//! Other stores never mutate registry state. They read class status through
//! the [`classpay_types::ClassStatusQuery`] implementation on
//! [`ClassRegistry`].
//!
//! ## Class Flow
//!
//! ```text
//! create_class → register_for_class* → update_class* → complete_class (terminal)
//! ```

pub mod registry;

pub use registry::ClassRegistry;
