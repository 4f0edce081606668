// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    not_found = { ErrorCode::NotFound, 404 },
    conflict = { ErrorCode::Conflict, 409 },
    bad_request = { ErrorCode::BadRequest, 400 },
    timeout = { ErrorCode::Timeout, 504 },
    store_failure = { ErrorCode::StoreFailure, 502 },
    internal = { ErrorCode::Internal, 500 },
)]
fn http_status(code: ErrorCode, expected: u16) {
    assert_eq!(code.http_status(), expected);
}

#[test]
fn rejection_display_includes_code_and_message() {
    let rejection = Rejection::conflict("task is in_progress");
    assert_eq!(rejection.to_string(), "CONFLICT: task is in_progress");
}
