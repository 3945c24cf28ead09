//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem end-to-end
//! against mock adapters. All tests run on the host with no real timer
//! thread required — ticks are fired by hand.

mod attr_surface_tests;
mod mock_hw;
