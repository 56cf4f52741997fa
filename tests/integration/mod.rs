//! Integration tests for the vfstub virtual filesystem

mod cli_parse;
mod live_sync;
mod path_properties;
mod persistence_round_trip;
mod stub_scenarios;
