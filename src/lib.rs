//! Bookmart application library: the storefront modules mounted by the
//! server binary.

pub mod modules;
