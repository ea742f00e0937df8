use std::path::PathBuf;

use taskstash::error::{exit_codes, CategoryError, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let category: Error = CategoryError::EmptyName.into();
    assert_eq!(category.exit_code(), exit_codes::USER_ERROR);

    let op = Error::LockFailed(PathBuf::from("/tmp/stash/.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn category_errors_display_transparently() {
    let err: Error = CategoryError::DuplicateName("Work".to_string()).into();
    assert_eq!(err.to_string(), "Category already exists: Work");
    assert_eq!(
        err.details(),
        Some(serde_json::json!({ "category_error": "duplicate_name" }))
    );
}

#[test]
fn ambiguous_ids_carry_details() {
    let err = Error::AmbiguousTaskId {
        input: "01H".to_string(),
        matches: 3,
    };
    assert!(err.to_string().contains("ambiguous"));
    assert_eq!(
        err.details(),
        Some(serde_json::json!({ "input": "01H", "matches": 3 }))
    );
    assert!(Error::TaskNotFound("x".to_string()).details().is_none());
}
