pub mod convert;
pub mod protonate;
pub mod report;
pub mod validate;
