//! Listing query builder tests
//!
//! Covers normalization of raw request parameters into a validated query

use campus_gateway::models::query::{
    total_pages, ListUsersParams, SortDirection, SortField, UserListQuery,
};
use campus_gateway::models::user::Role;

const MAX_PAGE_SIZE: u32 = 100;

fn build(params: ListUsersParams) -> UserListQuery {
    UserListQuery::from_params(params, MAX_PAGE_SIZE)
}

#[test]
fn test_absent_parameters_yield_defaults() {
    let query = build(ListUsersParams::default());

    assert_eq!(query.page, 1);
    assert_eq!(query.page_size, 10);
    assert_eq!(query.sort_field, SortField::CreatedAt);
    assert_eq!(query.sort_direction, SortDirection::Ascending);
    assert_eq!(query.role, None);
    assert_eq!(query.username, None);
    assert_eq!(query.search, None);
    assert_eq!(query.offset(), 0);
}

#[test]
fn test_page_zero_normalizes_to_one() {
    let query = build(ListUsersParams {
        page: Some("0".to_string()),
        ..Default::default()
    });
    assert_eq!(query.page, 1);
}

#[test]
fn test_non_numeric_page_normalizes_to_one() {
    for raw in ["abc", "1.5", "-2", " ", "9999999999999999999"] {
        let query = build(ListUsersParams {
            page: Some(raw.to_string()),
            ..Default::default()
        });
        assert_eq!(query.page, 1, "page {:?} should normalize to 1", raw);
    }
}

#[test]
fn test_oversized_page_size_clamps_to_maximum() {
    let query = build(ListUsersParams {
        limit: Some("1000".to_string()),
        ..Default::default()
    });
    assert_eq!(query.page_size, MAX_PAGE_SIZE);
}

#[test]
fn test_offset_is_page_minus_one_times_page_size() {
    let query = build(ListUsersParams {
        page: Some("4".to_string()),
        limit: Some("25".to_string()),
        ..Default::default()
    });
    assert_eq!(query.offset(), 75);
}

#[test]
fn test_descending_sort_prefix() {
    let query = build(ListUsersParams {
        sort: Some("-role".to_string()),
        ..Default::default()
    });
    assert_eq!(query.sort_field, SortField::Role);
    assert_eq!(query.sort_direction, SortDirection::Descending);
}

#[test]
fn test_unknown_sort_field_does_not_crash_and_falls_back() {
    for raw in ["password_hash", "id; --", "created_at OR 1=1", ""] {
        let query = build(ListUsersParams {
            sort: Some(raw.to_string()),
            ..Default::default()
        });
        assert_eq!(
            query.sort_field,
            SortField::CreatedAt,
            "sort {:?} should fall back to the default",
            raw
        );
        assert_eq!(query.sort_direction, SortDirection::Ascending);
    }
}

#[test]
fn test_role_filter_allow_list() {
    let query = build(ListUsersParams {
        role: Some("superadmin".to_string()),
        ..Default::default()
    });
    assert_eq!(query.role, Some(Role::Superadmin));

    // Values outside the closed role set are dropped, not forwarded
    let query = build(ListUsersParams {
        role: Some("{\"$ne\": null}".to_string()),
        ..Default::default()
    });
    assert_eq!(query.role, None);
}

#[test]
fn test_search_term_is_escaped_for_like() {
    let query = build(ListUsersParams {
        search: Some("100%_done".to_string()),
        ..Default::default()
    });
    assert_eq!(query.search_pattern().unwrap(), "%100\\%\\_done%");
}

#[test]
fn test_total_pages_rounds_up() {
    assert_eq!(total_pages(25, 10), 3);
    assert_eq!(total_pages(20, 10), 2);
    assert_eq!(total_pages(21, 10), 3);
    assert_eq!(total_pages(9, 10), 1);
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 1), 1);
}
