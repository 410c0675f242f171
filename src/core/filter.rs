use crate::core::directory::DoctorDirectory;
use crate::domain::model::{DoctorRecord, Specialty};
use std::collections::BTreeSet;

/// 依專科篩選醫師，保留名冊原始順序。
/// 專科集合為空時回傳空結果，而不是整份名冊。
pub fn filter_doctors(
    directory: &DoctorDirectory,
    specialties: &BTreeSet<Specialty>,
) -> Vec<DoctorRecord> {
    if specialties.is_empty() {
        return Vec::new();
    }

    directory
        .records()
        .iter()
        .filter(|record| specialties.contains(&record.specialty))
        .cloned()
        .collect()
}
