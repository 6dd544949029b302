/// One row of the HSN/SAC reference sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffCode {
    pub code: String,
    pub description: String,
}

impl TariffCode {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}
