use http::Method;
use pet_lookup::router::Router;
use pet_lookup::routes::{api_routes, RouteMeta, GET_PET};

#[test]
fn test_api_routes_resolve_get_pet() {
    let router = Router::new(api_routes()).unwrap();
    let m = router.route(Method::GET, "/api/pets/123").unwrap();
    assert_eq!(m.handler_name, GET_PET);
    assert_eq!(m.route.path_pattern, "/api/pets/{id}");
    assert_eq!(m.get_path_param("id"), Some("123"));
}

#[test]
fn test_raw_segment_is_passed_through() {
    let router = Router::new(api_routes()).unwrap();
    for raw in ["abc", "-1", "1.5", "007"] {
        let m = router.route(Method::GET, &format!("/api/pets/{raw}")).unwrap();
        assert_eq!(m.get_path_param("id"), Some(raw));
    }
}

#[test]
fn test_non_matching_requests() {
    let router = Router::new(api_routes()).unwrap();
    assert!(router.route(Method::GET, "/api/pets/").is_none());
    assert!(router.route(Method::GET, "/api/pets").is_none());
    assert!(router.route(Method::GET, "/api/pets/1/").is_none());
    assert!(router.route(Method::PUT, "/api/pets/1").is_none());
    assert!(router.route(Method::GET, "/API/PETS/1").is_none());
}

#[test]
fn test_multiple_routes_and_params() {
    let router = Router::new(vec![
        RouteMeta::new(Method::GET, "/api/pets/{id}", "get_pet"),
        RouteMeta::new(Method::GET, "/api/owners/{owner_id}/pets/{id}", "owner_pet"),
    ])
    .unwrap();
    let m = router.route(Method::GET, "/api/owners/7/pets/1").unwrap();
    assert_eq!(m.handler_name, "owner_pet");
    assert_eq!(m.get_path_param("owner_id"), Some("7"));
    assert_eq!(m.get_path_param("id"), Some("1"));
    assert_eq!(router.describe_routes().len(), 2);
}
