pub const SYMPTOM_PLACEHOLDER: &str = "{symptoms}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are a medical assistant. Based on the symptoms provided, do the following:

SYMPTOMS:
{symptoms}

TASKS:
1. Suggest relevant doctor specialties for these symptoms.
2. Recommend preventive or safety measures the user can take (e.g., lifestyle, diet, exercises, routine check-ups).
3. Give practical advice on maintaining general health.
4. Keep all advice simple and beginner-friendly.

IMPORTANT:
- Do NOT provide any medical prescriptions or diagnosis.
- Focus only on specialties and guidance.
- If the user shows signs of common health risks, suggest preventive measures.
";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 套用症狀文字；模板沒有佔位符時附加在最後
    pub fn render(&self, symptoms: &str) -> String {
        let symptoms = symptoms.trim();
        if self.template.contains(SYMPTOM_PLACEHOLDER) {
            self.template.replace(SYMPTOM_PLACEHOLDER, symptoms)
        } else {
            format!("{}\n\nSYMPTOMS:\n{}\n", self.template.trim_end(), symptoms)
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TEMPLATE)
    }
}
