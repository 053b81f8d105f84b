use std::collections::HashSet;

/// Distinct category tags seen across quote rows.
///
/// Each raw category string is split on commas; pieces are trimmed and
/// lower-cased before being deduplicated. NULL and empty strings contribute
/// nothing.
#[derive(Debug, Default)]
pub struct CategorySet(HashSet<String>);

impl CategorySet {
    pub fn insert_raw(&mut self, raw: Option<&str>) {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return;
        };

        for tag in raw.split(',') {
            self.0.insert(tag.trim().to_lowercase());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
