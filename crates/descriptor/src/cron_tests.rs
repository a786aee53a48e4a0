// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    all_wildcards = { "* * * * *" },
    literal = { "0 3 * * *" },
    ranges = { "0-15 9-17 * * 1-5" },
    lists = { "0,15,30,45 * * * *" },
    steps = { "*/5 * * * *" },
    range_step = { "10-50/10 * * * *" },
    literal_step = { "5/15 * * * *" },
    bounds = { "59 23 31 12 6" },
)]
fn accepts(expr: &str) {
    assert_eq!(validate_cron(expr), Ok(()), "{expr}");
}

#[parameterized(
    four_fields = { "* * * *" },
    six_fields = { "* * * * * *" },
    minute_out_of_range = { "60 * * * *" },
    hour_out_of_range = { "* 24 * * *" },
    dom_zero = { "* * 0 * *" },
    month_thirteen = { "* * * 13 *" },
    dow_seven = { "* * * * 7" },
    inverted_range = { "30-10 * * * *" },
    zero_step = { "*/0 * * * *" },
    word = { "every * * * *" },
    empty_list_item = { "1,,2 * * * *" },
)]
fn rejects(expr: &str) {
    assert!(validate_cron(expr).is_err(), "{expr}");
}

#[test]
fn error_names_the_field() {
    let err = validate_cron("* 99 * * *").unwrap_err();
    assert!(err.contains("hour"), "{err}");
}
