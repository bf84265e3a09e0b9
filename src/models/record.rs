/// A stored document: the store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: String,
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self { id: id.into(), data }
    }
}

pub fn find_by_id<'a, T>(records: &'a [Record<T>], id: &str) -> Option<&'a Record<T>> {
    records.iter().find(|r| r.id == id)
}
