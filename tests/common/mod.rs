#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::*;
pub use strategies::*;
