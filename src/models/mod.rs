// Domain models: one CSV reading, the batch summary, and the persisted history record

mod reading;
mod summary;

pub use reading::EquipmentReading;
pub use summary::{Distribution, HistoryRecord, Summary};
