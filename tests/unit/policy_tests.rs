// Policy matching and request plan validation

use rstest::rstest;

use shukusho::error::ProxyError;
use shukusho::pipeline::RequestPlan;
use shukusho::policy::PolicyConfig;
use shukusho::resize::{Operation, ResampleMethod, Size};
use shukusho::router::match_route;

const NONE: [&str; 0] = [];

fn plan(
    path: &str,
    resample: Option<&str>,
    policy: &PolicyConfig,
) -> Result<RequestPlan, ProxyError> {
    let route = match_route(path).expect("path should match the resize route");
    RequestPlan::parse(&route, resample, policy)
}

#[rstest]
#[case::exact_host(r"example\.com/.*", "example.com/a.png", true)]
#[case::case_insensitive(r"example\.com/.*", "Example.COM/a.png", true)]
#[case::must_match_whole_origin(r"example\.com", "example.com/a.png", false)]
#[case::no_prefix_match(r"example\.com/.*", "evil.com/example.com/a.png", false)]
#[case::suffix_host(r"example\.com/.*", "example.com.evil.org/a.png", false)]
#[case::explicit_anchors(r"^example\.com/.*$", "example.com/a.png", true)]
#[case::alternation(r"a\.com/.*|b\.com/.*", "b.com/x.png", true)]
fn test_origin_matching(#[case] pattern: &str, #[case] origin: &str, #[case] allowed: bool) {
    let policy = PolicyConfig::new(&[pattern], &NONE, "").unwrap();
    assert_eq!(policy.origin_allowed(origin), allowed);
}

#[test]
fn test_alternation_is_anchored_as_a_whole() {
    let policy = PolicyConfig::new(&[r"a\.com/.*|b\.com/x\.png"], &NONE, "").unwrap();
    assert!(!policy.origin_allowed("b.com/x.png.evil"));
}

#[test]
fn test_plan_uses_configured_default_resample() {
    let policy = PolicyConfig::new(&NONE, &NONE, "nearest").unwrap();
    let plan = plan("/tn/10x10/a.com/x.png", None, &policy).unwrap();

    assert_eq!(plan.op, Operation::Thumbnail);
    assert_eq!(plan.size, Size::new(10, 10));
    assert_eq!(plan.origin_url, "http://a.com/x.png");
    assert_eq!(plan.resample, ResampleMethod::Nearest);
}

#[test]
fn test_query_resample_overrides_default() {
    let policy = PolicyConfig::new(&NONE, &NONE, "nearest").unwrap();
    let plan = plan("/tn/10x10/a.com/x.png", Some("bicubic"), &policy).unwrap();
    assert_eq!(plan.resample, ResampleMethod::Bicubic);
}

#[test]
fn test_origin_is_checked_before_size() {
    let policy = PolicyConfig::new(&[r"good\.com/.*"], &["1,1"], "").unwrap();
    let err = plan("/fit/2x2/bad.com/x.png", None, &policy).unwrap_err();
    assert_eq!(err, ProxyError::OriginNotAllowed("bad.com/x.png".to_string()));
}

#[test]
fn test_size_is_checked_before_resample() {
    let policy = PolicyConfig::new(&NONE, &["1,1"], "").unwrap();
    let err = plan("/fit/2x2/a.com/x.png", Some("bogus"), &policy).unwrap_err();
    assert_eq!(err, ProxyError::SizeNotAllowed(Size::new(2, 2)));
}

#[test]
fn test_size_pairs_are_ordered() {
    let policy = PolicyConfig::new(&NONE, &["100,50"], "").unwrap();
    assert!(plan("/scale/100x50/a.com/x.png", None, &policy).is_ok());
    assert_eq!(
        plan("/scale/50x100/a.com/x.png", None, &policy).unwrap_err(),
        ProxyError::SizeNotAllowed(Size::new(50, 100))
    );
}

#[test]
fn test_origin_with_port() {
    let policy = PolicyConfig::new(&[r"127\.0\.0\.1:\d+/.*"], &NONE, "").unwrap();
    let plan = plan("/fit/5x5/127.0.0.1:8080/img/a.png", None, &policy).unwrap();
    assert_eq!(plan.origin_url, "http://127.0.0.1:8080/img/a.png");
}
