use crate::core::catalog::SpecialtyCatalog;
use crate::domain::model::{DoctorRecord, Specialty};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, TriageError};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;

pub const REQUIRED_COLUMNS: [&str; 5] = ["Name", "Specialty", "Distance", "lat", "lng"];

#[derive(Debug, Deserialize)]
struct DoctorRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Specialty")]
    specialty: String,
    #[serde(rename = "Distance")]
    distance: String,
    #[serde(rename = "lat")]
    latitude: String,
    #[serde(rename = "lng")]
    longitude: String,
}

/// 記憶體內的醫師名冊，載入後唯讀
#[derive(Debug, Clone, Default)]
pub struct DoctorDirectory {
    records: Vec<DoctorRecord>,
}

impl DoctorDirectory {
    pub fn new(records: Vec<DoctorRecord>) -> Self {
        Self { records }
    }

    /// 透過 Storage 讀取 CSV 並解析
    pub async fn load<S: Storage>(
        storage: &S,
        path: &str,
        catalog: &SpecialtyCatalog,
    ) -> Result<Self> {
        tracing::info!("📋 Loading doctor directory from: {}", path);

        let data = storage
            .read_file(path)
            .await
            .map_err(|e| TriageError::data_load(path, e.to_string()))?;

        let directory = Self::parse(path, data.as_slice(), catalog)?;
        tracing::info!("✅ Loaded {} doctors", directory.len());
        Ok(directory)
    }

    pub fn from_reader<R: Read>(reader: R, catalog: &SpecialtyCatalog) -> Result<Self> {
        Self::parse("input", reader, catalog)
    }

    /// 整批載入：任何一列格式錯誤即整份失敗
    /// 姓名保留原文，只有專科與數值欄位會去除空白
    fn parse<R: Read>(origin: &str, reader: R, catalog: &SpecialtyCatalog) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| TriageError::data_load(origin, format!("unreadable header: {}", e)))?
            .clone();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(TriageError::data_load(
                origin,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<DoctorRow>().enumerate() {
            let row_number = index + 1;
            let row = row
                .map_err(|e| TriageError::data_load(origin, format!("row {}: {}", row_number, e)))?;
            let record = Self::validate_row(row, catalog)
                .map_err(|message| {
                    TriageError::data_load(origin, format!("row {}: {}", row_number, message))
                })?;
            records.push(record);
        }

        tracing::debug!("Parsed {} doctor rows from {}", records.len(), origin);
        Ok(Self { records })
    }

    fn validate_row(
        row: DoctorRow,
        catalog: &SpecialtyCatalog,
    ) -> std::result::Result<DoctorRecord, String> {
        if row.name.trim().is_empty() {
            return Err("doctor name is blank".to_string());
        }
        let specialty = catalog
            .lookup(&row.specialty)
            .ok_or_else(|| format!("unknown specialty '{}'", row.specialty.trim()))?;

        let distance = parse_number("Distance", &row.distance)?;
        if distance < 0.0 {
            return Err(format!("invalid distance {}", distance));
        }
        let latitude = parse_number("lat", &row.latitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} out of range", latitude));
        }
        let longitude = parse_number("lng", &row.longitude)?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {} out of range", longitude));
        }

        Ok(DoctorRecord {
            name: row.name,
            specialty,
            distance,
            latitude,
            longitude,
        })
    }

    pub fn records(&self) -> &[DoctorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 名冊中實際出現的專科
    pub fn specialties(&self) -> BTreeSet<Specialty> {
        self.records.iter().map(|r| r.specialty.clone()).collect()
    }
}

fn parse_number(column: &str, raw: &str) -> std::result::Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("{} '{}' is not a number", column, raw.trim()))?;
    if !value.is_finite() {
        return Err(format!("{} '{}' is not a finite number", column, raw.trim()));
    }
    Ok(value)
}
