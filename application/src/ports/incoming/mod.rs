pub mod framing;
pub mod records;
pub mod storage;
