//! Domain services over the document store.

pub mod account;
pub mod blog;

pub use account::AccountService;
pub use blog::BlogService;
