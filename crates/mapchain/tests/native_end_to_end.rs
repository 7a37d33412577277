//! Resolution against a real directory tree through NativeHost.

use mapchain::{ChainLink, ResolveOptions, open_portal, resolve_async};
use mapchain_runtime::NativeHost;
use std::fs;
use std::path::Path;

/// dist/bundle.js -> build/app.js -> src/app.ts
fn write_project(root: &Path) {
    for dir in ["dist", "build", "src"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(
        root.join("dist/bundle.js"),
        "f();\n//# sourceMappingURL=bundle.js.map\n",
    )
    .unwrap();
    fs::write(
        root.join("dist/bundle.js.map"),
        r#"{"version":3,"file":"bundle.js","sources":["../build/app.js"],"names":[],"mappings":"AAAA"}"#,
    )
    .unwrap();
    fs::write(
        root.join("build/app.js"),
        "f();\n//# sourceMappingURL=app.js.map\n",
    )
    .unwrap();
    fs::write(
        root.join("build/app.js.map"),
        r#"{"version":3,"sources":["../src/app.ts"],"names":["f"],"mappings":"AAAAA"}"#,
    )
    .unwrap();
    fs::write(root.join("src/app.ts"), "f();\n").unwrap();
}

#[test]
fn test_resolve_discovered_chain_from_disk() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());

    let options = ResolveOptions::new()
        .with_generated_file("bundle.js")
        .with_base_dir(temp.path());
    let map = pollster::block_on(resolve_async(
        [ChainLink::file("dist/bundle.js")],
        &options,
        &NativeHost::new(),
    ))
    .unwrap()
    .unwrap();

    insta::assert_snapshot!(map.to_json_pretty().unwrap(), @r#"
    {
      "version": 3,
      "file": "bundle.js",
      "sourceRoot": "",
      "sources": [
        "src/app.ts"
      ],
      "sourcesContent": [
        "f();\n"
      ],
      "names": [
        "f"
      ],
      "mappings": "AAAAA"
    }
    "#);
}

#[test]
fn test_portal_reads_origin_from_disk() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());

    let options = ResolveOptions::new().with_base_dir(temp.path());
    let portal = open_portal(
        [ChainLink::file("dist/bundle.js")],
        &options,
        &NativeHost::new(),
    )
    .unwrap();

    let position = portal.resolve_position(0, 0).unwrap();
    assert_eq!(position.source, Some(temp.path().join("src/app.ts")));
    assert_eq!((position.line, position.column), (0, 0));
    assert_eq!(position.name.as_deref(), Some("f"));

    // "f();" is 4 units long
    assert!(portal.resolve_position(0, 4).is_some());
    assert!(portal.resolve_position(0, 5).is_none());
}

#[test]
fn test_missing_origin_has_no_content() {
    let temp = tempfile::tempdir().unwrap();
    write_project(temp.path());
    fs::remove_file(temp.path().join("src/app.ts")).unwrap();

    let options = ResolveOptions::new().with_base_dir(temp.path());
    let map = pollster::block_on(resolve_async(
        [ChainLink::file("dist/bundle.js")],
        &options,
        &NativeHost::new(),
    ))
    .unwrap()
    .unwrap();
    assert_eq!(map.sources, vec![Some("src/app.ts".to_string())]);
    assert_eq!(map.sources_content, Some(vec![None]));
}
