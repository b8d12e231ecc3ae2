use uuid::Uuid;

use crate::domain::error::DomainError;

pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Returns the record only if `caller` owns it.
///
/// A record owned by someone else is reported with the same error as a
/// missing one, so callers never learn that another user's data exists.
pub fn ensure_owner<T, F>(caller: Uuid, record: Option<T>, not_found: F) -> Result<T, DomainError>
where
    T: Owned,
    F: FnOnce() -> DomainError,
{
    match record {
        Some(record) if record.owner_id() == caller => Ok(record),
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::Label;

    fn tag(owner: Uuid) -> Label {
        Label {
            id: 7,
            user_id: owner,
            name: "Vegan".into(),
        }
    }

    #[test]
    fn owner_gets_the_record() {
        let owner = Uuid::new_v4();
        let record = ensure_owner(owner, Some(tag(owner)), || DomainError::TagNotFound(7)).unwrap();
        assert_eq!(record.name, "Vegan");
    }

    #[test]
    fn foreign_and_missing_records_look_the_same() {
        let caller = Uuid::new_v4();
        let foreign = ensure_owner(caller, Some(tag(Uuid::new_v4())), || DomainError::TagNotFound(7));
        let missing = ensure_owner::<Label, _>(caller, None, || DomainError::TagNotFound(7));
        assert_eq!(foreign.unwrap_err().to_string(), missing.unwrap_err().to_string());
    }
}
