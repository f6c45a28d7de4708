// Settlement of the monitored account into the destination account
pub mod builder;

pub use builder::SettlementBuilder;
