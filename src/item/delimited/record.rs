use std::ops::Deref;

/// One logical row of delimited fields.
///
/// Fields keep their input order. The record dereferences to a slice of
/// fields, so the usual slice methods (`len`, `iter`, indexing) apply.
/// Equality compares fields only.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<String>,
    line: u64,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Physical line (1-based) on which the record started. `0` when the
    /// record was built in memory.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn push_field(&mut self, field: &str) {
        self.fields.push(field.to_owned());
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    /// Refills the record from decoder scratch space, reusing the existing
    /// `String` allocations where there are any.
    pub(crate) fn fill(&mut self, line: u64, buffer: &str, ends: &[usize]) {
        self.line = line;
        self.fields.truncate(ends.len());
        let mut start = 0;
        for (index, &end) in ends.iter().enumerate() {
            let value = &buffer[start..end];
            match self.fields.get_mut(index) {
                Some(field) => {
                    field.clear();
                    field.push_str(value);
                }
                None => self.fields.push(value.to_owned()),
            }
            start = end;
        }
    }
}

impl Deref for Record {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl<S: Into<String>> From<Vec<S>> for Record {
    fn from(fields: Vec<S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            line: 0,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
            line: 0,
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Record {}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.fields.len() == other.len()
            && self
                .fields
                .iter()
                .zip(other)
                .all(|(field, expected)| field == expected.as_ref())
    }
}
