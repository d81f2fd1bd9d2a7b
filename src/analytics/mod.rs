//! Analytics module for schedule statistics
//!
//! Provides the aggregation engine behind the analytics endpoint and the
//! dashboard summary.
//!
//! ## Architecture
//!
//! - **Report**: status breakdown, progress and engagement tallies, monthly
//!   and daily histograms, per-month available days
//! - **Dashboard**: status x period x mode table, weekly load, per-month day
//!   tables, free dates
//!
//! Every computation is a pure function of the schedule snapshot, the
//! reference instant and the requested year/month.

mod types;


pub use types::*;

/// Calculator module for report and dashboard computation
pub mod calculator;
