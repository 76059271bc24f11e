//! Customer records loaded from a CSV export.
//!
//! Only the name and city columns are mandatory; the purchase-history columns
//! are carried as free text because they are only ever interpolated into
//! prompts, never computed on.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Customer name")]
    pub name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Gender", default)]
    pub gender: String,
    #[serde(rename = "Last month purchase amount", default)]
    pub last_month: String,
    #[serde(rename = "Last quarter", default)]
    pub last_quarter: String,
    #[serde(rename = "Last year", default)]
    pub last_year: String,
    #[serde(rename = "products bought list of items", default)]
    pub products: String,
}

impl CustomerRecord {
    /// Previously bought products, split on commas with blanks removed.
    pub fn product_list(&self) -> Vec<&str> {
        self.products
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// First listed product, if any.
    pub fn first_product(&self) -> Option<&str> {
        self.product_list().first().copied()
    }
}

/// Read all customer records from a CSV file.
///
/// Rows are read once and are immutable afterwards. Short rows are accepted;
/// missing optional columns deserialize to empty strings.
pub fn load_customers(path: &Path) -> Result<Vec<CustomerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open customer file {}", path.display()))?;

    let mut customers = Vec::new();
    for record in reader.deserialize() {
        let record: CustomerRecord =
            record.with_context(|| format!("Malformed row in {}", path.display()))?;
        customers.push(record);
    }

    tracing::info!("Loaded {} customer records from {}", customers.len(), path.display());
    Ok(customers)
}

#[cfg(test)]
pub(crate) fn test_record(name: &str, city: &str, products: &str) -> CustomerRecord {
    CustomerRecord {
        name: name.to_string(),
        city: city.to_string(),
        gender: String::new(),
        last_month: String::new(),
        last_quarter: String::new(),
        last_year: String::new(),
        products: products.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "mailgen_customers_{}_{:?}.csv",
            std::process::id(),
            std::thread::current().id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_full_columns() {
        let path = write_temp_csv(
            "Customer name,City,Gender,Last month purchase amount,Last quarter,Last year,products bought list of items\n\
             Ana Perez,Lima,F,120,300,900,\"Shoes, Hat\"\n\
             Ben Cole,Leeds,M,80,150,600,Socks\n",
        );

        let customers = load_customers(&path).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Ana Perez");
        assert_eq!(customers[0].city, "Lima");
        assert_eq!(customers[0].product_list(), vec!["Shoes", "Hat"]);
        assert_eq!(customers[1].first_product(), Some("Socks"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_minimal_columns() {
        let path = write_temp_csv("Customer name,City\nAna,Lima\n");

        let customers = load_customers(&path).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Ana");
        assert_eq!(customers[0].gender, "");
        assert_eq!(customers[0].products, "");
        assert_eq!(customers[0].first_product(), None);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_product_list_ignores_blanks() {
        let record = test_record("Ana", "Lima", " Shoes ,, Hat , ");
        assert_eq!(record.product_list(), vec!["Shoes", "Hat"]);
    }
}
