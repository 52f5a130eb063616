// SPDX-License-Identifier: MIT

pub mod analytics;
pub mod habits;
pub mod health;
pub mod mood;
