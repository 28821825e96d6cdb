//! Background download pipeline.
//!
//! [`Downloader`] is the entry point: it records each target's desired URL in
//! a [`RequestTable`], hands tasks to a single [`DownloadWorker`], and posts
//! results through a delivery context.

pub mod delivery;
pub mod facade;
pub mod request_table;
pub mod worker;

pub use delivery::{ChannelDelivery, DeliveryQueue, channel};
pub use facade::Downloader;
pub use request_table::RequestTable;
pub use worker::{DownloadWorker, Listener};
