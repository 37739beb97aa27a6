use predicates::prelude::*;

use super::common::{BOTTLE_BODY, TestEnv, sha256_hex};

const ZLIB_LINUX: &str = "zlib-1.2.11.x86_64_linux.bottle.tar.gz";

#[test]
fn fetch_downloads_listed_bottle() {
  let mut server = mockito::Server::new();
  let mock = server
    .mock("GET", format!("/{}", ZLIB_LINUX).as_str())
    .with_body(BOTTLE_BODY)
    .expect(1)
    .create();

  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[(ZLIB_LINUX, &sha256_hex(BOTTLE_BODY))]);

  env
    .wrangle_cmd()
    .arg("fetch")
    .assert()
    .success()
    .stdout(predicate::str::contains(ZLIB_LINUX))
    .stdout(predicate::str::contains("Downloaded: 1"))
    .stdout(predicate::str::contains("Missing: 2"));

  mock.assert();
  let written = std::fs::read(env.dest_dir().join(ZLIB_LINUX)).unwrap();
  assert_eq!(written, BOTTLE_BODY);
}

#[test]
fn fetch_uses_cached_bottle() {
  let mut server = mockito::Server::new();
  let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create();

  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[(ZLIB_LINUX, &sha256_hex(BOTTLE_BODY))]);
  env.write_file(&format!("build/{}", ZLIB_LINUX), "already here");

  env
    .wrangle_cmd()
    .arg("fetch")
    .assert()
    .success()
    .stdout(predicate::str::contains("cached"))
    .stdout(predicate::str::contains("Cached: 1"));

  mock.assert();
}

#[test]
fn fetch_rejects_hash_mismatch() {
  let mut server = mockito::Server::new();
  server
    .mock("GET", format!("/{}", ZLIB_LINUX).as_str())
    .with_body(b"tampered")
    .create();

  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[(ZLIB_LINUX, &sha256_hex(BOTTLE_BODY))]);

  env
    .wrangle_cmd()
    .arg("fetch")
    .assert()
    .success()
    .stdout(predicate::str::contains("download(s) failed"))
    .stdout(predicate::str::contains("Missing: 3"));

  assert!(!env.dest_dir().join(ZLIB_LINUX).exists());
}

#[test]
fn fetch_no_verify_accepts_any_body() {
  let mut server = mockito::Server::new();
  server
    .mock("GET", format!("/{}", ZLIB_LINUX).as_str())
    .with_body(b"tampered")
    .create();

  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[(ZLIB_LINUX, &sha256_hex(BOTTLE_BODY))]);

  env
    .wrangle_cmd()
    .args(["fetch", "--no-verify"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Downloaded: 1"));
}

#[test]
fn fetch_reports_unknown_formulas() {
  let server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[]);
  env.write_file("provision/linux-formulas.csv", "tool,zlib\ntool,ghost\n");

  env
    .wrangle_cmd()
    .arg("fetch")
    .assert()
    .success()
    .stderr(predicate::str::contains("Formula file not found for 'ghost'"))
    .stdout(predicate::str::contains("Unknown formulas: 1"));
}

#[test]
fn fetch_hands_missing_to_build_tool() {
  let server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[]);
  env.write_file("provision/linux-formulas.csv", "dep,curl\n");

  env
    .wrangle_cmd()
    .args(["fetch", "--build-tool", "true"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built bottle curl"));
}

#[test]
fn fetch_lists_missing_without_build_tool() {
  let server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[]);

  env
    .wrangle_cmd()
    .arg("fetch")
    .assert()
    .success()
    .stdout(predicate::str::contains("Building bottle curl"))
    .stderr(predicate::str::contains("need a source build"));
}

#[test]
fn fetch_json_output_is_valid() {
  let server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[]);

  let output = env.wrangle_cmd().args(["-o", "json", "fetch"]).output().unwrap();
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(value["platform"], "linux");
  let outcomes = value["report"]["outcomes"].as_array().unwrap();
  let names: Vec<_> = outcomes.iter().map(|o| o["formula"]["name"].as_str().unwrap()).collect();
  assert_eq!(names, vec!["zlib", "curl", "mystery"]);
  assert_eq!(outcomes[2]["resolution"]["reason"]["kind"], "no_version");
  assert_eq!(value["builds"].as_array().unwrap().len(), 3);
}

#[test]
fn fetch_respects_types_filter() {
  let server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_manifest(&server.url(), &[]);

  let output = env
    .wrangle_cmd()
    .args(["-o", "json", "fetch", "--types", "dep"])
    .output()
    .unwrap();
  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(value["report"]["outcomes"].as_array().unwrap().len(), 1);
}

#[test]
fn fetch_without_platform_manifest_fails() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);

  env
    .wrangle_cmd()
    .env("WRANGLE_PLATFORM", "solaris")
    .arg("fetch")
    .assert()
    .failure()
    .stderr(predicate::str::contains("solaris-formulas.csv"));
}
