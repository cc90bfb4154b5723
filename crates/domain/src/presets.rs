//! Built-in suites.

use serde_json::json;

use crate::error::DomainResult;
use crate::testing::{Expectation, SuiteDefinition, TestCase};

/// Port the Lost & Found service listens on by default.
pub const LOST_AND_FOUND_PORT: u16 = 18080;

/// Default root of a locally running Lost & Found service.
pub const LOST_AND_FOUND_BASE_URL: &str = "http://localhost:18080";

/// Smoke suite for the airport Lost & Found reporting service.
///
/// Reports an item, searches for it by description and by id, then posts
/// a body that is not JSON and expects the service to reject it with 400.
///
/// # Errors
///
/// Only fails if one of the built-in cases is invalid.
pub fn lost_and_found() -> DomainResult<SuiteDefinition> {
    let cases = vec![
        TestCase::builder("report_ok")
            .post("/report")
            .header("Content-Type", "application/json")
            .json(json!({
                "id": 101,
                "description": "Test Lost Item - Black Wallet",
                "location": "Terminal A, Gate 5",
                "date": "2025-08-29",
                "isLost": true,
                "reportedBy": "John Doe",
                "contactInfo": "john.doe@example.com",
                "tags": "wallet, black, leather",
                "notes": "Contains ID cards and credit cards"
            }))
            .expect(Expectation::status(200))
            .build()?,
        TestCase::builder("search_by_desc")
            .post("/search")
            .header("Content-Type", "application/json")
            .json(json!({"description": "wallet"}))
            .expect(Expectation::status(200))
            .build()?,
        TestCase::builder("search_by_id")
            .post("/search")
            .header("Content-Type", "application/json")
            .json(json!({"id": 101}))
            .expect(Expectation::status(200))
            .build()?,
        TestCase::builder("bad_json")
            .post("/report")
            .header("Content-Type", "application/json")
            .raw("This is not valid JSON")
            .expect(Expectation::status(400))
            .build()?,
    ];

    Ok(SuiteDefinition {
        name: "Airport Lost & Found API".to_string(),
        base_url: None,
        timeout_ms: None,
        cases,
    })
}
