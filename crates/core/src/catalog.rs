//! Fixed catalog of sample services used to populate a fresh installation.

use crate::models::service::{Category, ServiceFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleService {
    pub name: &'static str,
    pub category: Category,
    pub duration_days: i32,
}

impl SampleService {
    const fn new(name: &'static str, category: Category, duration_days: i32) -> Self {
        Self {
            name,
            category,
            duration_days,
        }
    }

    pub fn fields(&self) -> ServiceFields {
        ServiceFields {
            name: self.name.to_string(),
            category: self.category,
            duration_days: self.duration_days,
        }
    }
}

pub const SAMPLE_SERVICES: [SampleService; 24] = [
    SampleService::new("International passport", Category::Documents, 30),
    SampleService::new("Birth certificate", Category::Documents, 7),
    SampleService::new("Certificate of no criminal record", Category::Documents, 10),
    SampleService::new("Driving license", Category::Transport, 15),
    SampleService::new("Vehicle registration", Category::Transport, 5),
    SampleService::new("International driving permit", Category::Transport, 20),
    SampleService::new("Pension certificate", Category::Social, 7),
    SampleService::new("Social card", Category::Social, 21),
    SampleService::new("Unemployment benefit", Category::Social, 10),
    SampleService::new("Certificate of ownership", Category::Property, 30),
    SampleService::new("Apartment deed of gift", Category::Property, 45),
    SampleService::new("Mortgage registration", Category::Property, 20),
    SampleService::new("Sole proprietor registration", Category::Business, 5),
    SampleService::new("Opening a settlement account", Category::Business, 3),
    SampleService::new("Trade license", Category::Business, 30),
    SampleService::new("Medical certificate", Category::Health, 1),
    SampleService::new("Sick leave certificate", Category::Health, 3),
    SampleService::new("Swimming pool certificate", Category::Health, 2),
    SampleService::new("Secondary school diploma", Category::Education, 30),
    SampleService::new("Academic transcript", Category::Education, 15),
    SampleService::new("Certificate of enrollment", Category::Education, 5),
    SampleService::new("Legal consultation", Category::Other, 1),
    SampleService::new("Notarial certification", Category::Other, 1),
    SampleService::new("Document translation", Category::Other, 3),
];

/// Parses a comma-separated list of category codes. Unknown codes are returned
/// separately so callers can report them.
pub fn parse_categories(raw: &str) -> (Vec<Category>, Vec<String>) {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match Category::from_code(code) {
            Some(category) if !known.contains(&category) => known.push(category),
            Some(_) => {}
            None => unknown.push(code.to_string()),
        }
    }
    (known, unknown)
}

/// Samples in the given categories, in catalog order, truncated to `count`.
pub fn select(categories: &[Category], count: usize) -> Vec<SampleService> {
    SAMPLE_SERVICES
        .iter()
        .filter(|sample| categories.contains(&sample.category))
        .take(count)
        .copied()
        .collect()
}

/// Number of samples available across the given categories.
pub fn available(categories: &[Category]) -> usize {
    SAMPLE_SERVICES
        .iter()
        .filter(|sample| categories.contains(&sample.category))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_category_has_three_samples() {
        for category in Category::ALL {
            assert_eq!(available(&[category]), 3, "{category}");
        }
    }

    #[test]
    fn selection_keeps_catalog_order_and_count() {
        let picked = select(&[Category::Social, Category::Documents], 4);
        let names: Vec<_> = picked.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "International passport",
                "Birth certificate",
                "Certificate of no criminal record",
                "Pension certificate",
            ]
        );
    }

    #[test]
    fn unknown_codes_are_reported() {
        let (known, unknown) = parse_categories("DOC, XYZ,,DOC,HLTH");
        assert_eq!(known, vec![Category::Documents, Category::Health]);
        assert_eq!(unknown, vec!["XYZ".to_string()]);
    }
}
