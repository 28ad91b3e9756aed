use super::*;

fn build(routes: &[&'static str]) -> Tree<&'static str> {
    let mut tree = Tree::new();
    for route in routes {
        if let Err(err) = tree.add_route(route, *route) {
            panic!("registering {:?} failed: {}", route, err);
        }
    }
    tree
}

struct Lookup {
    value: Option<&'static str>,
    tsr: bool,
    params: Vec<(String, String)>,
}

fn lookup(tree: &Tree<&'static str>, path: &str) -> Lookup {
    let mut params = Params::new();
    let mut skipped = Vec::new();
    let found = tree.get_value(path, Some(&mut params), &mut skipped, false);
    Lookup {
        value: found.value.copied(),
        tsr: found.tsr,
        params: params.iter().map(|p| (p.key.clone(), p.value.clone())).collect(),
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn static_routes() {
    let tree = build(&[
        "/hi",
        "/contact",
        "/co",
        "/c",
        "/a",
        "/ab",
        "/doc/",
        "/doc/go_faq.html",
        "/doc/go1.html",
        "/α",
        "/β",
    ]);

    for path in [
        "/a",
        "/hi",
        "/contact",
        "/co",
        "/ab",
        "/doc/",
        "/doc/go1.html",
        "/α",
        "/β",
    ] {
        let found = lookup(&tree, path);
        assert_eq!(found.value, Some(path), "lookup {:?}", path);
        assert!(found.params.is_empty());
    }

    for path in ["/", "/con", "/cona", "/no", "/γ"] {
        assert_eq!(lookup(&tree, path).value, None, "lookup {:?}", path);
    }
}

#[test]
fn wildcard_routes() {
    let tree = build(&[
        "/",
        "/cmd/:tool/",
        "/cmd/:tool/:sub",
        "/cmd/whoami",
        "/cmd/whoami/root",
        "/cmd/whoami/root/",
        "/src/*filepath",
        "/search/",
        "/search/:query",
        "/search/gin-gonic",
        "/search/google",
        "/user_:name",
        "/user_:name/about",
        "/files/:dir/*filepath",
        "/doc/",
        "/doc/go_faq.html",
        "/info/:user/public",
        "/info/:user/project/:project",
        "/info/:user/project/golang",
    ]);

    let cases: &[(&str, Option<&str>, &[(&str, &str)])] = &[
        ("/", Some("/"), &[]),
        ("/cmd/test", None, &[("tool", "test")]),
        ("/cmd/test/", Some("/cmd/:tool/"), &[("tool", "test")]),
        ("/cmd/test/3", Some("/cmd/:tool/:sub"), &[("tool", "test"), ("sub", "3")]),
        ("/cmd/who/", Some("/cmd/:tool/"), &[("tool", "who")]),
        ("/cmd/whoami", Some("/cmd/whoami"), &[]),
        ("/cmd/whoami/r", Some("/cmd/:tool/:sub"), &[("tool", "whoami"), ("sub", "r")]),
        ("/cmd/whoami/root", Some("/cmd/whoami/root"), &[]),
        ("/cmd/whoami/root/", Some("/cmd/whoami/root/"), &[]),
        ("/src/", Some("/src/*filepath"), &[("filepath", "/")]),
        ("/src/some/file.png", Some("/src/*filepath"), &[("filepath", "/some/file.png")]),
        ("/search/", Some("/search/"), &[]),
        (
            "/search/someth!ng+in+ünìcodé",
            Some("/search/:query"),
            &[("query", "someth!ng+in+ünìcodé")],
        ),
        ("/search/gin", Some("/search/:query"), &[("query", "gin")]),
        ("/search/gin-gonic", Some("/search/gin-gonic"), &[]),
        ("/search/google", Some("/search/google"), &[]),
        ("/user_gopher", Some("/user_:name"), &[("name", "gopher")]),
        ("/user_gopher/about", Some("/user_:name/about"), &[("name", "gopher")]),
        (
            "/files/js/inc/framework.js",
            Some("/files/:dir/*filepath"),
            &[("dir", "js"), ("filepath", "/inc/framework.js")],
        ),
        ("/info/gordon/public", Some("/info/:user/public"), &[("user", "gordon")]),
        (
            "/info/gordon/project/go",
            Some("/info/:user/project/:project"),
            &[("user", "gordon"), ("project", "go")],
        ),
        (
            "/info/gordon/project/golang",
            Some("/info/:user/project/golang"),
            &[("user", "gordon")],
        ),
    ];

    for (path, route, expected) in cases {
        let found = lookup(&tree, path);
        assert_eq!(found.value, *route, "lookup {:?}", path);
        if route.is_some() {
            assert_eq!(found.params, params(expected), "params of {:?}", path);
        }
    }
}

#[test]
fn static_and_param_siblings_both_resolve() {
    let tree = build(&["/users/new", "/users/:id", "/users/:id/edit"]);

    let found = lookup(&tree, "/users/new");
    assert_eq!(found.value, Some("/users/new"));
    assert!(found.params.is_empty());

    let found = lookup(&tree, "/users/42");
    assert_eq!(found.value, Some("/users/:id"));
    assert_eq!(found.params, params(&[("id", "42")]));

    let found = lookup(&tree, "/users/ne");
    assert_eq!(found.value, Some("/users/:id"));
    assert_eq!(found.params, params(&[("id", "ne")]));

    let found = lookup(&tree, "/users/new/edit");
    assert_eq!(found.value, Some("/users/:id/edit"));
    assert_eq!(found.params, params(&[("id", "new")]));
}

#[test]
fn full_path_reports_the_registered_route() {
    let tree = build(&["/users/:id", "/files/*path"]);
    let mut skipped = Vec::new();

    let found = tree.get_value("/users/7", None, &mut skipped, false);
    assert_eq!(found.full_path, "/users/:id");

    let found = tree.get_value("/files/a/b", None, &mut skipped, false);
    assert_eq!(found.full_path, "/files/*path");

    let found = tree.get_value("/nothing", None, &mut skipped, false);
    assert_eq!(found.full_path, "");
}

#[test]
fn unescapes_param_values_on_request() {
    let tree = build(&["/files/:name", "/raw/*rest"]);
    let mut params = Params::new();
    let mut skipped = Vec::new();

    tree.get_value("/files/a%20b", Some(&mut params), &mut skipped, true);
    assert_eq!(params.get("name"), Some("a b"));

    tree.get_value("/files/a%20b", Some(&mut params), &mut skipped, false);
    assert_eq!(params.get("name"), Some("a%20b"));

    tree.get_value("/raw/x%2Fy", Some(&mut params), &mut skipped, true);
    assert_eq!(params.get("rest"), Some("/x/y"));
}

#[test]
fn trailing_slash_recommendations() {
    let tree = build(&[
        "/hi",
        "/b/",
        "/search/:query",
        "/cmd/:tool/",
        "/src/*filepath",
        "/x",
        "/x/y",
        "/y/",
        "/y/z",
        "/0/:id",
        "/0/:id/1",
        "/1/:id/",
        "/1/:id/2",
        "/doc",
        "/doc/go_faq.html",
        "/ab",
        "/a/foo",
    ]);

    for path in [
        "/hi/",
        "/b",
        "/search/gopher/",
        "/cmd/vet",
        "/src",
        "/x/",
        "/y",
        "/0/go/",
        "/1/go",
        "/doc/",
    ] {
        let found = lookup(&tree, path);
        assert_eq!(found.value, None, "lookup {:?}", path);
        assert!(found.tsr, "expected a trailing slash redirect for {:?}", path);
    }

    // "/a/" shares a prefix with "/ab" and "/a/foo", but "/a" has no route.
    for path in ["/", "/no", "/no/", "/_", "/_/", "/api/world/abc", "/a/", "/a"] {
        let found = lookup(&tree, path);
        assert_eq!(found.value, None, "lookup {:?}", path);
        assert!(!found.tsr, "unexpected trailing slash redirect for {:?}", path);
    }
}

#[test]
fn no_redirect_suggestion_without_a_route_to_redirect_to() {
    let tree = build(&["/a/b", "/a/c", "/ad"]);

    for path in ["/a/", "/a"] {
        let found = lookup(&tree, path);
        assert_eq!(found.value, None, "lookup {:?}", path);
        assert!(!found.tsr, "unexpected trailing slash redirect for {:?}", path);
    }

    let found = lookup(&tree, "/a/b/");
    assert_eq!(found.value, None);
    assert!(found.tsr);
}

#[test]
fn param_lookup_with_extra_slash_suggests_redirect() {
    let tree = build(&["/users/:id"]);

    let found = lookup(&tree, "/users/42/");
    assert_eq!(found.value, None);
    assert!(found.tsr);
}

#[test]
fn conflicting_param_names_are_rejected() {
    let mut tree = build(&["/users/:id"]);

    let err = tree.add_route("/users/:name", "/users/:name").unwrap_err();
    assert_eq!(
        err,
        Error::WildcardConflict {
            segment: ":name".to_owned(),
            path: "/users/:name".to_owned(),
            wildcard: ":id".to_owned(),
            prefix: "/users/:id".to_owned(),
        }
    );

    let mut tree = build(&["/users/:name"]);
    let err = tree.add_route("/users/:names", "/users/:names").unwrap_err();
    assert!(matches!(err, Error::WildcardConflict { ref segment, .. } if segment == ":names"));
}

#[test]
fn catch_all_conflicts_are_rejected() {
    let mut tree = build(&["/src/*filepath"]);
    assert!(matches!(
        tree.add_route("/src/*filepathx", "x"),
        Err(Error::WildcardConflict { .. })
    ));
    assert!(matches!(
        tree.add_route("/src/x", "x"),
        Err(Error::WildcardConflict { .. })
    ));

    let mut tree = build(&["/src/"]);
    assert_eq!(
        tree.add_route("/src/*filepath", "x"),
        Err(Error::CatchAllConflict {
            wildcard: "*filepath".to_owned(),
            path: "/src/*filepath".to_owned(),
            segment: String::new(),
            prefix: "/src/".to_owned(),
        })
    );

    let mut tree = build(&["/src/a"]);
    assert_eq!(
        tree.add_route("/src/*filepath", "x"),
        Err(Error::CatchAllConflict {
            wildcard: "*filepath".to_owned(),
            path: "/src/*filepath".to_owned(),
            segment: "a".to_owned(),
            prefix: "/src/a".to_owned(),
        })
    );
}

#[test]
fn catch_all_must_be_last() {
    let mut tree = build(&["/a/*rest"]);
    assert_eq!(
        tree.add_route("/a/*rest/more", "more"),
        Err(Error::CatchAllNotAtEnd {
            path: "/a/*rest/more".to_owned()
        })
    );
}

#[test]
fn duplicate_routes_are_rejected() {
    let mut tree = build(&["/a", "/b/:id"]);
    assert!(matches!(tree.add_route("/a", "again"), Err(Error::DuplicateRoute { .. })));
    assert!(matches!(tree.add_route("/b/:id", "again"), Err(Error::DuplicateRoute { .. })));
    assert_eq!(lookup(&tree, "/a").value, Some("/a"));
}

#[test]
fn failed_insertion_leaves_the_tree_untouched() {
    let mut tree = build(&["/src/a", "/users/:id"]);
    let before_len = tree.len();
    let before_priority = tree.root().priority();

    assert!(tree.add_route("/src/*filepath", "x").is_err());
    assert!(tree.add_route("/users/:name", "x").is_err());
    assert!(tree.add_route("/src/a", "x").is_err());

    assert_eq!(tree.len(), before_len);
    assert_eq!(tree.root().priority(), before_priority);
    assert_eq!(lookup(&tree, "/src/a").value, Some("/src/a"));
    assert_eq!(lookup(&tree, "/users/3").value, Some("/users/:id"));
    assert_eq!(tree.routes().count(), 2);
}

#[test]
fn children_are_ordered_by_priority() {
    let tree = build(&["/a", "/b", "/c", "/c/x", "/:id", "/b/1", "/b/2", "/b/3"]);
    let root = tree.root();

    assert_eq!(root.indices(), &['b', 'c', 'a']);
    let priorities: Vec<u32> = root.children()[..3]
        .iter()
        .map(|&id| tree.node(id).unwrap().priority())
        .collect();
    assert_eq!(priorities, [4, 2, 1]);

    assert!(root.wild_child());
    let last = *root.children().last().unwrap();
    assert_eq!(tree.node(last).unwrap().kind(), NodeKind::Param);
}

#[test]
fn lists_every_route() {
    let tree = build(&["/", "/users/:id", "/users/new", "/files/*path"]);
    let mut routes: Vec<&str> = tree.routes().map(|(path, _)| path).collect();
    routes.sort_unstable();
    assert_eq!(routes, ["/", "/files/*path", "/users/:id", "/users/new"]);
}

#[test]
fn empty_tree_matches_nothing() {
    let tree: Tree<&'static str> = Tree::new();
    assert!(tree.is_empty());
    let found = lookup(&tree, "/");
    assert_eq!(found.value, None);
    assert!(!found.tsr);
}
