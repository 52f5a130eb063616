// SPDX-License-Identifier: MIT
//! Analytics — aggregation over habit completions and mood entries for the
//! dashboard and analytics views.

pub mod aggregator;
pub mod model;
