use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn filename_includes_revision() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);

  env
    .wrangle_cmd()
    .args(["filename", "curl"])
    .assert()
    .success()
    .stdout(predicate::str::contains("curl-7.61.0_1.x86_64_linux.bottle.tar.gz"))
    .stderr(predicate::str::contains("No hosted bottle"));
}

#[test]
fn filename_marks_listed_bottles() {
  let env = TestEnv::new();
  env.write_manifest(
    "http://127.0.0.1:1",
    &[("zlib-1.2.11.sierra.bottle.tar.gz", "1111111111111111111111111111111111111111111111111111111111111111")],
  );

  env
    .wrangle_cmd()
    .args(["filename", "zlib", "--platform", "darwin"])
    .assert()
    .success()
    .stdout(predicate::str::contains("✓ sierra"))
    .stdout(predicate::str::contains("zlib-1.2.11.mojave.bottle.tar.gz"))
    .stdout(predicate::str::contains("111111111111"));
}

#[test]
fn filename_tolerates_non_ascii_hash() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);
  env.write_file(
    "provision/formula/zlib.rb",
    "class Zlib < Formula\n  url \"https://zlib.net/zlib-1.2.11.tar.gz\"\n  bottle do\n    sha256 \"aéééééééééééé\" => :x86_64_linux\n  end\nend\n",
  );

  env
    .wrangle_cmd()
    .args(["filename", "zlib"])
    .assert()
    .success()
    .stdout(predicate::str::contains("zlib-1.2.11.x86_64_linux.bottle.tar.gz"))
    .stdout(predicate::str::contains("aééééééééééé\n"));
}

#[test]
fn filename_unknown_formula_fails() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);

  env
    .wrangle_cmd()
    .args(["filename", "ghost"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Formula file not found for 'ghost'"));
}

#[test]
fn filename_unversioned_formula_fails() {
  let env = TestEnv::new();
  env.write_manifest("http://127.0.0.1:1", &[]);

  env
    .wrangle_cmd()
    .args(["filename", "mystery"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("has no version"));
}

#[test]
fn platform_command_lists_distros() {
  let env = TestEnv::new();

  env
    .wrangle_cmd()
    .args(["platform", "--platform", "darwin"])
    .assert()
    .success()
    .stdout(predicate::str::contains("sierra, high_sierra, mojave"))
    .stdout(predicate::str::contains("darwin-formulas.csv"));
}

#[test]
fn platform_distro_override() {
  let env = TestEnv::new();

  env
    .wrangle_cmd()
    .args(["platform", "--distro", "mojave", "--distro", "sierra"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Distros: mojave, sierra"));
}
