use crate::domain::model::{KeywordRule, Specialty};
use crate::utils::error::{Result, TriageError};

const BUILTIN_SPECIALTIES: &[&str] = &[
    "Cardiologist",
    "Neurologist",
    "Dermatologist",
    "Pediatrician",
    "General Physician",
    "Orthopedic",
    "ENT Specialist",
    "Gastroenterologist",
    "Psychiatrist",
    "Ophthalmologist",
    "Preventive Medicine",
    "Nutritionist",
    "Physiotherapist",
    "Family Physician",
];

const BUILTIN_KEYWORDS: &[(&str, &str)] = &[
    ("heart", "Cardiologist"),
    ("brain", "Neurologist"),
    ("skin", "Dermatologist"),
    ("child", "Pediatrician"),
    ("general", "General Physician"),
    ("bone", "Orthopedic"),
    ("ear nose throat", "ENT Specialist"),
    ("stomach", "Gastroenterologist"),
    ("mental", "Psychiatrist"),
    ("eye", "Ophthalmologist"),
    ("preventive", "Preventive Medicine"),
    ("nutrition", "Nutritionist"),
    ("physio", "Physiotherapist"),
    ("family", "Family Physician"),
];

/// 專科目錄：標準專科標籤與關鍵字對照表，建立後唯讀
#[derive(Debug, Clone, Default)]
pub struct SpecialtyCatalog {
    specialties: Vec<Specialty>,
    keywords: Vec<KeywordRule>,
}

impl SpecialtyCatalog {
    /// 從設定建立目錄；關鍵字必須對應到已列出的專科
    pub fn new<L, K>(labels: L, keywords: K) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        K: IntoIterator<Item = (String, String)>,
    {
        let mut catalog = Self::default();

        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                return Err(TriageError::ConfigValidationError {
                    field: "catalog.specialties".to_string(),
                    message: "Specialty labels cannot be blank".to_string(),
                });
            }
            if catalog.lookup(label).is_none() {
                catalog.specialties.push(Specialty::new(label));
            }
        }

        for (keyword, label) in keywords {
            let keyword = keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(TriageError::ConfigValidationError {
                    field: "catalog.keywords".to_string(),
                    message: format!("Blank keyword mapped to '{}'", label),
                });
            }
            let specialty = catalog.lookup(&label).ok_or_else(|| {
                TriageError::ConfigValidationError {
                    field: "catalog.keywords".to_string(),
                    message: format!(
                        "Keyword '{}' maps to unknown specialty '{}'",
                        keyword, label
                    ),
                }
            })?;
            catalog.keywords.push(KeywordRule { keyword, specialty });
        }

        tracing::debug!(
            "Specialty catalog ready: {} specialties, {} keyword rules",
            catalog.specialties.len(),
            catalog.keywords.len()
        );
        Ok(catalog)
    }

    pub fn builtin() -> Self {
        let specialties = BUILTIN_SPECIALTIES
            .iter()
            .map(|label| Specialty::new(*label))
            .collect();
        let keywords = BUILTIN_KEYWORDS
            .iter()
            .map(|(keyword, label)| KeywordRule {
                keyword: keyword.to_string(),
                specialty: Specialty::new(*label),
            })
            .collect();

        Self {
            specialties,
            keywords,
        }
    }

    pub fn specialties(&self) -> &[Specialty] {
        &self.specialties
    }

    pub fn keywords(&self) -> &[KeywordRule] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.specialties.is_empty()
    }

    /// 取得標準拼寫的專科（忽略大小寫與前後空白）
    pub fn lookup(&self, label: &str) -> Option<Specialty> {
        let label = label.trim();
        self.specialties
            .iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(label))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = SpecialtyCatalog::builtin();
        assert_eq!(catalog.specialties().len(), 14);
        assert_eq!(catalog.keywords().len(), 14);

        for rule in catalog.keywords() {
            assert!(catalog.specialties().contains(&rule.specialty));
            assert_eq!(rule.keyword, rule.keyword.to_lowercase());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = SpecialtyCatalog::builtin();
        assert_eq!(
            catalog.lookup("  ent specialist ").unwrap().as_str(),
            "ENT Specialist"
        );
        assert!(catalog.lookup("Astrologer").is_none());
    }

    #[test]
    fn test_new_rejects_unknown_keyword_target() {
        let result = SpecialtyCatalog::new(
            ["Cardiologist"],
            vec![("lungs".to_string(), "Pulmonologist".to_string())],
        );
        assert!(matches!(
            result,
            Err(TriageError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_new_normalizes_keywords_and_dedupes_labels() {
        let catalog = SpecialtyCatalog::new(
            ["Cardiologist", "cardiologist", "Neurologist"],
            vec![("HEART".to_string(), "cardiologist".to_string())],
        )
        .unwrap();

        assert_eq!(catalog.specialties().len(), 2);
        assert_eq!(catalog.keywords()[0].keyword, "heart");
        assert_eq!(catalog.keywords()[0].specialty.as_str(), "Cardiologist");
    }

    #[test]
    fn test_new_rejects_blank_label() {
        assert!(SpecialtyCatalog::new(["  "], Vec::<(String, String)>::new()).is_err());
    }
}
