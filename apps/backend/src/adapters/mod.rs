//! Adapters for the persistence gateway. Functions return `DbErr`; repos map it.

pub mod actions_sea;
pub mod events_sea;
pub mod hands_sea;
pub mod pots_sea;
pub mod seats_sea;
pub mod showdown_sea;
pub mod tables_sea;
