use predicates::prelude::*;

use super::common::TestEnv;

const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Contents><Key>bottles/zlib-1.2.11.x86_64_linux.bottle.tar.gz</Key></Contents>
  <Contents><Key>bottles/README</Key></Contents>
</ListBucketResult>"#;

#[test]
fn audit_marks_unlisted_bottles() {
  let mut server = mockito::Server::new();
  server.mock("GET", "/").with_body(LISTING).create();

  let env = TestEnv::new();
  env.write_manifest(&format!("{}/bottles", server.url()), &[]);

  env
    .wrangle_cmd()
    .arg("audit")
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "bottles,zlib-1.2.11.x86_64_linux.bottle.tar.gz,2222222222222222222222222222222222222222222222222222222222222222",
    ))
    .stdout(predicate::str::contains("bottles,zlib-1.2.11.sierra.bottle.tar.gz"))
    .stdout(predicate::str::contains("_MISSING,--^^^^--"))
    .stderr(predicate::str::contains("1 declared bottle(s) missing"));
}

#[test]
fn audit_json_output_is_valid() {
  let mut server = mockito::Server::new();
  server.mock("GET", "/").with_body(LISTING).create();

  let env = TestEnv::new();

  let output = env
    .wrangle_cmd()
    .args(["-o", "json", "audit", "--listing-url"])
    .arg(format!("{}/bottles", server.url()))
    .output()
    .unwrap();
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let rows = value["rows"].as_array().unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().any(|r| r["distro"] == "x86_64_linux" && r["listed"] == true));
  assert!(rows.iter().any(|r| r["distro"] == "sierra" && r["listed"] == false));
}

#[test]
fn audit_unknown_host_fails() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);

  env
    .wrangle_cmd()
    .args(["audit", "--host", "mirror"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Host 'mirror' is not defined"));
}
