//! # Integration Scenarios

pub mod end_to_end;
pub mod settlement_flow;
