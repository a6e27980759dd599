use serde::{Deserialize, Serialize};

/// Value used for fields a listing does not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// A business listing extracted from one result page
///
/// Field names serialize to the CSV column titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(rename = "NAME")]
    pub name: String,

    #[serde(rename = "PHONE")]
    pub phone: String,

    #[serde(rename = "STREET")]
    pub street: String,

    #[serde(rename = "LOCALITY")]
    pub locality: String,

    #[serde(rename = "BUSINESS CATEGORIES")]
    pub business_categories: String,

    #[serde(rename = "WEBSITE")]
    pub website: String,

    #[serde(rename = "CATEGORY")]
    pub category: String,

    #[serde(rename = "SUB CATEGORY")]
    pub sub_category: String,
}

/// Returns true if two pages carry the same records in the same order
pub fn same_page(current: &[BusinessRecord], previous: &[BusinessRecord]) -> bool {
    current.len() == previous.len() && current.iter().zip(previous).all(|(a, b)| a == b)
}
