pub mod s3_event;
pub mod split_table;
pub mod chart;
