pub mod app_settings;
pub mod app_state;
pub mod bet;
pub mod messages;
pub mod network;
pub mod predictions;
pub mod refresher;
pub mod search;
pub mod storage;
pub mod tiers;
