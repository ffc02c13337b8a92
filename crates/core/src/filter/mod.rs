//! Filter criteria and the controller that settles them
//!
//! Completion and priority changes settle immediately; search text settles
//! once typing has paused for the debounce window.

mod controller;
mod criteria;

pub use controller::{FilterController, FilterUpdates, DEFAULT_SEARCH_DEBOUNCE};
pub use criteria::FilterCriteria;
