//! Tests for the route spec model: segment ordering, route spec
//! comparison, and the path string round-trip.

use http::Method;
use trellis::spec::{format_path, parse_path, MethodKey, PathSegment, RouteSpec};

mod common;

#[test]
fn test_compare_equal_iff_identical_segments_and_kinds() {
    let a = RouteSpec::parse(common::get(), "/w/{id}/x").unwrap();
    let b = RouteSpec::parse(common::get(), "/w/{id}/x").unwrap();
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    assert_eq!(a, b);

    // Same shape, different kind at position 1.
    let c = RouteSpec::parse(common::get(), "/w/id/x").unwrap();
    assert_ne!(a, c);
    assert_ne!(a.cmp(&c), std::cmp::Ordering::Equal);
}

#[test]
fn test_variable_sorts_before_literal_regardless_of_name() {
    let var = PathSegment::Variable("zzzz".to_string());
    let lit = PathSegment::Literal("aaaa".to_string());
    assert!(var < lit);

    let spec_var = RouteSpec::parse(common::get(), "/w/{zzzz}").unwrap();
    let spec_lit = RouteSpec::parse(common::get(), "/w/aaaa").unwrap();
    assert!(spec_var < spec_lit);
}

#[test]
fn test_two_variables_compare_by_name() {
    let a = RouteSpec::parse(common::get(), "/w/{alpha}").unwrap();
    let b = RouteSpec::parse(common::get(), "/w/{beta}").unwrap();
    assert!(a < b);
}

#[test]
fn test_prefix_sequence_sorts_first() {
    let short = RouteSpec::parse(common::get(), "/w").unwrap();
    let long = RouteSpec::parse(common::get(), "/w/{id}").unwrap();
    assert!(short < long);
}

#[test]
fn test_method_breaks_remaining_ties() {
    let get = RouteSpec::parse(common::get(), "/w").unwrap();
    let post = RouteSpec::parse(common::post(), "/w").unwrap();
    let any = RouteSpec::parse(MethodKey::Any, "/w").unwrap();
    assert!(get < post);
    assert!(any < get, "any-method marker sorts before concrete verbs");
}

#[test]
fn test_route_spec_string_round_trip() {
    for pattern in ["/", "/widgets", "/widgets/{id}", "/a/{b}/c/{d}", "/x/y/z"] {
        let spec = RouteSpec::parse(MethodKey::Method(Method::PUT), pattern).unwrap();
        let rendered = format_path(&spec.path);
        let reparsed = RouteSpec::parse(MethodKey::Method(Method::PUT), &rendered).unwrap();
        assert_eq!(spec, reparsed, "round trip failed for `{pattern}`");
    }
}

#[test]
fn test_display_form() {
    let spec = RouteSpec::parse(common::get(), "/widgets/{id}").unwrap();
    assert_eq!(spec.to_string(), "GET /widgets/{id}");
    assert_eq!(
        RouteSpec::parse(MethodKey::Any, "/").unwrap().to_string(),
        "* /"
    );
}

#[test]
fn test_variable_names_in_path_order() {
    let spec = RouteSpec::parse(common::get(), "/a/{b}/c/{d}").unwrap();
    assert_eq!(spec.variable_names(), vec!["b".to_string(), "d".to_string()]);
}

#[test]
fn test_parse_path_normalizes_slashes() {
    assert_eq!(parse_path("widgets").unwrap(), parse_path("/widgets/").unwrap());
}
