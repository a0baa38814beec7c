pub mod catalog;
pub mod dialog;
pub mod error;
pub mod ledger;
pub mod session;
pub mod targets;
pub mod user;
