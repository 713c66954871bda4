//! Test suite.

mod collision;
mod counts;
mod iter;
mod util;
