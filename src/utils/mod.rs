pub mod async_task;
pub mod bytes;
pub mod every_n;
