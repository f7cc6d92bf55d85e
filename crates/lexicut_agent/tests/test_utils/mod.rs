//! Test utilities for agent tests.
//!
//! Scripted reasoning driver and a small session fixture.

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockDriver, MockResponse, fixture_session, text_turn, tool_turn};
