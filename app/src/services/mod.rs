pub mod frame_store;
pub mod pipeline;
pub mod uploads;
