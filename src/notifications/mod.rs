pub mod senders;
pub mod sink;
